//! Feed presentation adapter.
//!
//! # Responsibility
//! - Hold the read-only snapshot rendered by the feed.
//! - Forward like/comment intents to the post repository.
//! - Own transient per-post UI state (comment input, comments expanded).
//!
//! # Invariants
//! - The snapshot is replaced wholesale after every successful intent.
//! - Transient UI state is never persisted.
//! - Only a logged-in viewer can act on the feed.

use crate::clock::{Clock, SystemClock};
use crate::model::post::{parse_timestamp, Post, PostId};
use crate::model::profile::UserProfile;
use crate::repo::post_repo::{PostRepository, RepoError};
use crate::service::notice::Notice;
use crate::store::KeyValueStore;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Debug)]
pub enum FeedError {
    NotAuthenticated,
    /// Submit was triggered with a blank comment input.
    EmptyComment(PostId),
    Repo(RepoError),
}

impl FeedError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::NotAuthenticated => {
                Notice::destructive("Not logged in", "Please log in to view the feed")
            }
            Self::EmptyComment(_) => {
                Notice::destructive("Empty comment", "Write something before posting")
            }
            Self::Repo(RepoError::NotFound(_)) => {
                Notice::destructive("Post not found", "This post is no longer available")
            }
            Self::Repo(RepoError::InvalidInput(reason)) => {
                Notice::destructive("Invalid input", reason.clone())
            }
            Self::Repo(RepoError::Persistence(_)) => {
                Notice::destructive("Storage error", "Your change could not be saved")
            }
        }
    }
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "feed requires a logged-in user"),
            Self::EmptyComment(post_id) => write!(f, "empty comment for post {post_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PostViewState {
    comment_input: String,
    comments_expanded: bool,
}

/// Render model for one post card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard<'a> {
    pub post: &'a Post,
    pub likes_label: String,
    pub comments_label: String,
    pub date_label: String,
    pub comments_expanded: bool,
    pub comment_input: &'a str,
    pub can_submit_comment: bool,
}

pub struct FeedService<S: KeyValueStore, C: Clock = SystemClock> {
    repo: PostRepository<S, C>,
    viewer: Option<UserProfile>,
    snapshot: Vec<Post>,
    view_state: HashMap<PostId, PostViewState>,
}

impl<S: KeyValueStore, C: Clock> FeedService<S, C> {
    pub fn new(repo: PostRepository<S, C>, viewer: Option<UserProfile>) -> Self {
        Self {
            repo,
            viewer,
            snapshot: Vec::new(),
            view_state: HashMap::new(),
        }
    }

    /// Loads the collection into the snapshot.
    pub fn mount(&mut self) -> FeedResult<&[Post]> {
        self.require_viewer()?;
        self.snapshot = self.repo.load_posts();
        Ok(&self.snapshot)
    }

    pub fn posts(&self) -> &[Post] {
        &self.snapshot
    }

    pub fn viewer(&self) -> Option<&UserProfile> {
        self.viewer.as_ref()
    }

    /// Handles one like click. Issue at most one call per click.
    pub fn like(&mut self, post_id: &str) -> FeedResult<Notice> {
        self.require_viewer()?;
        self.repo.toggle_like(post_id)?;
        self.refresh();
        Ok(Notice::info("Post liked", "Your like has been recorded"))
    }

    pub fn set_comment_input(&mut self, post_id: &str, text: impl Into<String>) {
        self.state_mut(post_id).comment_input = text.into();
    }

    pub fn comment_input(&self, post_id: &str) -> &str {
        self.view_state
            .get(post_id)
            .map_or("", |state| state.comment_input.as_str())
    }

    /// Submits the pending comment input of `post_id`.
    ///
    /// On success only that post's input is cleared.
    pub fn submit_comment(&mut self, post_id: &str) -> FeedResult<Notice> {
        let author = self.require_viewer()?.clone();
        let text = self.comment_input(post_id).to_string();
        if text.trim().is_empty() {
            return Err(FeedError::EmptyComment(post_id.to_string()));
        }

        self.repo.add_comment(post_id, &text, &author)?;
        self.state_mut(post_id).comment_input.clear();
        self.refresh();
        Ok(Notice::info("Comment added", "Your comment has been posted"))
    }

    /// Flips the comments-expanded flag and returns the new value.
    pub fn toggle_comments(&mut self, post_id: &str) -> bool {
        let state = self.state_mut(post_id);
        state.comments_expanded = !state.comments_expanded;
        state.comments_expanded
    }

    pub fn comments_expanded(&self, post_id: &str) -> bool {
        self.view_state
            .get(post_id)
            .is_some_and(|state| state.comments_expanded)
    }

    /// Builds render models for the current snapshot, in order.
    pub fn cards(&self) -> Vec<PostCard<'_>> {
        self.snapshot
            .iter()
            .map(|post| {
                let comment_input = self.comment_input(&post.id);
                PostCard {
                    post,
                    likes_label: format!("{} likes", post.likes),
                    comments_label: comments_label(post.comments.len()),
                    date_label: format_post_date(&post.created_at),
                    comments_expanded: self.comments_expanded(&post.id),
                    comment_input,
                    can_submit_comment: !comment_input.trim().is_empty(),
                }
            })
            .collect()
    }

    fn require_viewer(&self) -> FeedResult<&UserProfile> {
        self.viewer.as_ref().ok_or(FeedError::NotAuthenticated)
    }

    fn refresh(&mut self) {
        self.snapshot = self.repo.posts().to_vec();
    }

    fn state_mut(&mut self, post_id: &str) -> &mut PostViewState {
        self.view_state.entry(post_id.to_string()).or_default()
    }
}

/// `"1 comment"` / `"<n> comments"`.
pub fn comments_label(count: usize) -> String {
    if count == 1 {
        "1 comment".to_string()
    } else {
        format!("{count} comments")
    }
}

/// Formats a stored timestamp as `MAY 9, 2023`; unparseable input is
/// returned unchanged.
pub fn format_post_date(created_at: &str) -> String {
    parse_timestamp(created_at)
        .map(|value| value.format("%B %-d, %Y").to_string().to_uppercase())
        .unwrap_or_else(|_| created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::{comments_label, format_post_date};

    #[test]
    fn comments_label_pluralizes() {
        assert_eq!(comments_label(0), "0 comments");
        assert_eq!(comments_label(1), "1 comment");
        assert_eq!(comments_label(7), "7 comments");
    }

    #[test]
    fn post_date_is_uppercase_long_form() {
        assert_eq!(format_post_date("2023-05-09T18:30:00Z"), "MAY 9, 2023");
        assert_eq!(format_post_date("garbage"), "garbage");
    }
}
