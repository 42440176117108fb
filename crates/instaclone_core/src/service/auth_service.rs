//! Mock authentication over the session store.
//!
//! # Responsibility
//! - Restore the session at startup.
//! - Accept any username with a 6+ character password and persist the
//!   resulting profile.
//!
//! # Invariants
//! - Failed logins leave the current session untouched.
//! - Passwords are never stored or logged.

use crate::model::profile::UserProfile;
use crate::repo::session_repo::SessionStore;
use crate::service::notice::Notice;
use crate::store::KeyValueStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum accepted password length in UTF-16 code units.
pub const MIN_PASSWORD_CHARS: usize = 6;
/// Every demo login acts as the same user id.
pub const DEMO_USER_ID: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
}

impl AuthError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::InvalidCredentials => Notice::destructive(
                "Login failed",
                "Invalid username or password. Password must be at least 6 characters.",
            ),
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
        }
    }
}

impl Error for AuthError {}

pub struct AuthService<S: KeyValueStore> {
    session: SessionStore<S>,
    user: Option<UserProfile>,
}

impl<S: KeyValueStore> AuthService<S> {
    /// Creates the service and restores any persisted session.
    pub fn new(store: S) -> Self {
        let session = SessionStore::new(store);
        let user = session.current_user();
        Self { session, user }
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Logs in with demo credentials.
    ///
    /// # Errors
    /// - `InvalidCredentials` when the trimmed username is empty or the
    ///   password is shorter than `MIN_PASSWORD_CHARS`.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Notice, AuthError> {
        let username = username.trim();
        if password.encode_utf16().count() < MIN_PASSWORD_CHARS {
            info!("event=auth_login module=service status=error reason=password_too_short");
            return Err(AuthError::InvalidCredentials);
        }
        let profile = UserProfile::new(DEMO_USER_ID, username).map_err(|_| {
            info!("event=auth_login module=service status=error reason=empty_username");
            AuthError::InvalidCredentials
        })?;

        self.session.set_current_user(&profile);
        let notice = Notice::info(
            "Login successful",
            format!("Welcome back, {}!", profile.username),
        );
        info!(
            "event=auth_login module=service status=ok user_id={}",
            profile.id
        );
        self.user = Some(profile);
        Ok(notice)
    }

    /// Clears the session.
    pub fn logout(&mut self) -> Notice {
        self.session.clear_current_user();
        self.user = None;
        info!("event=auth_logout module=service status=ok");
        Notice::info("Logged out", "You have been logged out successfully")
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthError, AuthService};
    use crate::store::MemoryStore;

    #[test]
    fn short_password_is_rejected_without_touching_session() {
        let store = MemoryStore::new();
        let mut auth = AuthService::new(&store);

        let err = auth.login("alice", "12345").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(err.notice().is_destructive());
        assert!(!auth.is_authenticated());
        assert!(store.is_empty());
    }

    #[test]
    fn blank_username_is_rejected() {
        let store = MemoryStore::new();
        let mut auth = AuthService::new(&store);
        assert!(auth.login("   ", "secret123").is_err());
    }

    #[test]
    fn password_length_counts_utf16_units() {
        let store = MemoryStore::new();
        let mut auth = AuthService::new(&store);

        // Five code points, but the two emoji take two units each.
        assert!(auth.login("alice", "ab\u{1F600}\u{1F600}c").is_ok());
        auth.logout();
        // Three code points, four units.
        assert_eq!(
            auth.login("alice", "a\u{1F600}b").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert!(!auth.is_authenticated());
    }
}
