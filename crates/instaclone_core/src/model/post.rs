//! Post and comment domain model.
//!
//! # Responsibility
//! - Define the post/comment records persisted under the `posts` key.
//! - Keep like-count and liked-flag transitions in one place.
//! - Validate decoded collections before they reach the repository.
//!
//! # Invariants
//! - `likes` and `liked` change together; toggling moves `likes` by exactly 1.
//! - `liked == true` implies `likes >= 1`, so `likes` never underflows.
//! - `liked == false` implies `likes < u32::MAX`, so liking never overflows.
//! - Comment text is non-empty after trim.
//! - Post ids are unique within a collection; comment ids are unique across it.

use crate::model::profile::{ProfileValidationError, UserProfile};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Post identifier as stored (`"1"`, `"2"`, ...).
pub type PostId = String;

/// Comment identifier, `"c"` followed by epoch milliseconds.
pub type CommentId = String;

/// Validation errors for posts, comments and whole collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyPostId,
    EmptyCommentId { post_id: PostId },
    DuplicatePostId(PostId),
    DuplicateCommentId(CommentId),
    EmptyCommentText { comment_id: CommentId },
    InvalidTimestamp(String),
    LikedWithoutLikes { post_id: PostId },
    LikesAtCapacity { post_id: PostId },
    Author(ProfileValidationError),
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPostId => write!(f, "post id must not be empty"),
            Self::EmptyCommentId { post_id } => {
                write!(f, "comment id must not be empty (post {post_id})")
            }
            Self::DuplicatePostId(id) => write!(f, "duplicate post id `{id}`"),
            Self::DuplicateCommentId(id) => write!(f, "duplicate comment id `{id}`"),
            Self::EmptyCommentText { comment_id } => {
                write!(f, "comment `{comment_id}` has empty text")
            }
            Self::InvalidTimestamp(value) => write!(f, "invalid ISO-8601 timestamp `{value}`"),
            Self::LikedWithoutLikes { post_id } => {
                write!(f, "post `{post_id}` is liked but has zero likes")
            }
            Self::LikesAtCapacity { post_id } => {
                write!(f, "post `{post_id}` has no room for another like")
            }
            Self::Author(err) => write!(f, "invalid author: {err}"),
        }
    }
}

impl Error for PostValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Author(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProfileValidationError> for PostValidationError {
    fn from(value: ProfileValidationError) -> Self {
        Self::Author(value)
    }
}

/// Comment owned by exactly one post. Appended, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    /// Author snapshot taken at creation time.
    pub user: UserProfile,
    pub text: String,
    /// ISO-8601 creation timestamp; offset-less values read as UTC.
    pub created_at: String,
}

impl Comment {
    /// Creates a comment stamped with `created_at`.
    ///
    /// # Errors
    /// - `EmptyCommentText` when `text` is blank after trim.
    pub fn new(
        id: impl Into<CommentId>,
        user: UserProfile,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PostValidationError> {
        let comment = Self {
            id: id.into(),
            user,
            text: text.into(),
            created_at: format_timestamp(created_at),
        };
        comment.validate_in(None)?;
        Ok(comment)
    }

    fn validate_in(&self, post_id: Option<&str>) -> Result<(), PostValidationError> {
        if self.id.trim().is_empty() {
            return Err(PostValidationError::EmptyCommentId {
                post_id: post_id.unwrap_or_default().to_string(),
            });
        }
        if self.text.trim().is_empty() {
            return Err(PostValidationError::EmptyCommentText {
                comment_id: self.id.clone(),
            });
        }
        validate_timestamp(&self.created_at)?;
        self.user.validate()?;
        Ok(())
    }
}

/// Feed post. The author is embedded by value, not referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub user: UserProfile,
    pub image_url: String,
    /// May be empty.
    pub caption: String,
    pub likes: u32,
    /// Local to the viewing session; not a set of likers.
    pub liked: bool,
    pub comments: Vec<Comment>,
    /// ISO-8601 creation timestamp; offset-less values read as UTC.
    pub created_at: String,
}

impl Post {
    /// Flips `liked` and moves `likes` by exactly one in the same direction.
    pub fn toggle_like(&mut self) {
        if self.liked {
            self.liked = false;
            self.likes = self.likes.saturating_sub(1);
        } else {
            self.liked = true;
            self.likes = self.likes.saturating_add(1);
        }
    }

    /// Returns whether any comment on this post carries `comment_id`.
    pub fn has_comment(&self, comment_id: &str) -> bool {
        self.comments.iter().any(|comment| comment.id == comment_id)
    }

    /// Validates one post and its nested comments.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.id.trim().is_empty() {
            return Err(PostValidationError::EmptyPostId);
        }
        if self.liked && self.likes == 0 {
            return Err(PostValidationError::LikedWithoutLikes {
                post_id: self.id.clone(),
            });
        }
        if !self.liked && self.likes == u32::MAX {
            return Err(PostValidationError::LikesAtCapacity {
                post_id: self.id.clone(),
            });
        }
        validate_timestamp(&self.created_at)?;
        self.user.validate()?;
        for comment in &self.comments {
            comment.validate_in(Some(self.id.as_str()))?;
        }
        Ok(())
    }
}

/// Validates a whole collection, including cross-post uniqueness.
pub fn validate_collection(posts: &[Post]) -> Result<(), PostValidationError> {
    let mut post_ids = HashSet::new();
    let mut comment_ids = HashSet::new();

    for post in posts {
        post.validate()?;
        if !post_ids.insert(post.id.as_str()) {
            return Err(PostValidationError::DuplicatePostId(post.id.clone()));
        }
        for comment in &post.comments {
            if !comment_ids.insert(comment.id.as_str()) {
                return Err(PostValidationError::DuplicateCommentId(comment.id.clone()));
            }
        }
    }

    Ok(())
}

/// Formats a timestamp the way new records are stamped
/// (`2023-05-10T14:23:00.000Z`).
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored ISO-8601 timestamp into UTC.
///
/// Stamps without an offset (`2023-05-09T18:30:00`) are read as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, PostValidationError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| PostValidationError::InvalidTimestamp(value.to_string()))
}

fn validate_timestamp(value: &str) -> Result<(), PostValidationError> {
    parse_timestamp(value).map(|_| ())
}
