//! Core feed logic for Instaclone.
//! This crate owns posts, likes, comments and the session record, and the
//! contracts under which they are persisted.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{Attachment, AttachmentKind, PostDraft, PostSettings, PublishedPost};
pub use model::post::{Comment, CommentId, Post, PostId, PostValidationError};
pub use model::profile::{ProfileValidationError, UserProfile};
pub use repo::post_repo::{PostRepository, RepoError, RepoResult, POSTS_KEY};
pub use repo::seed::seed_posts;
pub use repo::session_repo::{SessionStore, SESSION_KEY};
pub use repo::table_repo::{
    SqliteTablePostRepository, TablePost, TablePostError, TablePostRepository,
};
pub use service::auth_service::{AuthError, AuthService};
pub use service::compose_service::{ComposeError, ComposeService, ComposeStage};
pub use service::feed_service::{FeedError, FeedService, PostCard};
pub use service::notice::{Notice, NoticeVariant};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
