//! User profile domain model.
//!
//! # Responsibility
//! - Define the acting-user record embedded by value into posts/comments.
//! - Derive the demo avatar reference from a username.
//!
//! # Invariants
//! - `id` and `username` are non-empty after trim.
//! - Profiles are immutable once created; copies embedded in posts never
//!   track later changes of the session profile.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Validation errors for persisted or constructed profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyId,
    EmptyUsername,
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "profile id must not be empty"),
            Self::EmptyUsername => write!(f, "profile username must not be empty"),
        }
    }
}

impl Error for ProfileValidationError {}

/// Author/actor record, serialized as `{id, username, avatar}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    /// Display name, unique per session.
    pub username: String,
    /// Avatar image URI.
    pub avatar: String,
}

impl UserProfile {
    /// Creates a profile with the generated demo avatar for `username`.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self, ProfileValidationError> {
        let username = username.into();
        let avatar = avatar_for(username.as_str());
        let profile = Self {
            id: id.into(),
            username,
            avatar,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Validates identity fields.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.id.trim().is_empty() {
            return Err(ProfileValidationError::EmptyId);
        }
        if self.username.trim().is_empty() {
            return Err(ProfileValidationError::EmptyUsername);
        }
        Ok(())
    }
}

/// Returns the demo avatar URI seeded by `username`.
pub fn avatar_for(username: &str) -> String {
    format!("{AVATAR_BASE_URL}{username}")
}

#[cfg(test)]
mod tests {
    use super::{avatar_for, ProfileValidationError, UserProfile};

    #[test]
    fn new_derives_avatar_from_username() {
        let profile = UserProfile::new("1", "traveler123").unwrap();
        assert_eq!(
            profile.avatar,
            "https://api.dicebear.com/7.x/avataaars/svg?seed=traveler123"
        );
        assert_eq!(profile.avatar, avatar_for("traveler123"));
    }

    #[test]
    fn new_rejects_blank_identity() {
        assert_eq!(
            UserProfile::new(" ", "name").unwrap_err(),
            ProfileValidationError::EmptyId
        );
        assert_eq!(
            UserProfile::new("1", "").unwrap_err(),
            ProfileValidationError::EmptyUsername
        );
    }
}
