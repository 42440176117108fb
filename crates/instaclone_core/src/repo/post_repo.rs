//! Post repository: the owned feed collection and its persistence contract.
//!
//! # Responsibility
//! - Load the collection from storage, falling back to the seed set.
//! - Apply like-toggle and comment-append mutations.
//! - Rewrite the whole collection to storage after every mutation.
//!
//! # Invariants
//! - Mutations never reorder, insert or remove posts.
//! - Unreadable or invalid stored data is replaced by the seed collection.
//! - Write failures are logged and swallowed (fire-and-forget).
//! - Generated comment ids are unique across the collection and increase
//!   monotonically within one repository instance.
//!
//! Lookups scan the collection linearly; the collection is demo-sized.

use crate::clock::{Clock, SystemClock};
use crate::model::post::{validate_collection, Comment, CommentId, Post, PostId};
use crate::model::profile::UserProfile;
use crate::repo::seed::seed_posts;
use crate::store::{read_json, write_json, KeyValueStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized post collection.
pub const POSTS_KEY: &str = "posts";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// No post with this id exists in the collection.
    NotFound(PostId),
    /// Caller-supplied input was rejected.
    InvalidInput(String),
    /// Storage failed or held undecodable data.
    Persistence(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "post not found: {id}"),
            Self::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value)
    }
}

/// Single owner of the feed collection.
pub struct PostRepository<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    posts: Option<Vec<Post>>,
    last_comment_ms: Option<i64>,
}

impl<S: KeyValueStore> PostRepository<S> {
    /// Creates a repository stamping records with wall-clock time.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> PostRepository<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            posts: None,
            last_comment_ms: None,
        }
    }

    /// Loads the collection from storage and returns it in persisted order.
    ///
    /// When storage holds no collection, or one that cannot be decoded or
    /// validated, the seed collection is persisted and returned instead.
    pub fn load_posts(&mut self) -> Vec<Post> {
        let posts = match self.read_stored() {
            Ok(Some(posts)) => {
                info!(
                    "event=posts_load module=repo status=ok source=storage count={}",
                    posts.len()
                );
                posts
            }
            Ok(None) => {
                info!("event=posts_load module=repo status=ok source=seed reason=absent");
                self.write_seed()
            }
            Err(err) => {
                warn!("event=posts_load module=repo status=fallback source=seed error={err}");
                self.write_seed()
            }
        };

        self.posts = Some(posts.clone());
        posts
    }

    /// Returns the current snapshot, loading it first if needed.
    pub fn posts(&mut self) -> &[Post] {
        self.loaded_mut()
    }

    /// Flips the liked flag of `post_id` and moves its count by one.
    ///
    /// Not retry-safe: a repeated call flips the state back.
    ///
    /// # Errors
    /// - `NotFound` when no post has this id; the collection is unchanged.
    pub fn toggle_like(&mut self, post_id: &str) -> RepoResult<Post> {
        let posts = self.loaded_mut();
        let post = find_post_mut(posts, post_id)?;
        post.toggle_like();
        let updated = post.clone();

        info!(
            "event=post_like module=repo status=ok post_id={} liked={} likes={}",
            updated.id, updated.liked, updated.likes
        );
        self.persist();
        Ok(updated)
    }

    /// Appends a comment by `author` to `post_id`.
    ///
    /// `text` is stored as given; it only has to be non-blank after trim.
    ///
    /// # Errors
    /// - `NotFound` when no post has this id.
    /// - `InvalidInput` when `text` is blank after trim.
    pub fn add_comment(
        &mut self,
        post_id: &str,
        text: &str,
        author: &UserProfile,
    ) -> RepoResult<Post> {
        let now = self.clock.now();
        let floor_ms = self.last_comment_ms.map(|last| last + 1);

        let posts = self.loaded_mut();
        let index = find_index(posts, post_id)?;
        if text.trim().is_empty() {
            return Err(RepoError::InvalidInput(
                "comment text must not be empty".to_string(),
            ));
        }

        let start_ms = floor_ms.map_or(now.timestamp_millis(), |floor| {
            floor.max(now.timestamp_millis())
        });
        let (comment_id, id_ms) = next_comment_id(posts, start_ms);
        let comment = Comment::new(comment_id, author.clone(), text, now)
            .map_err(|err| RepoError::InvalidInput(err.to_string()))?;

        let post = &mut posts[index];
        post.comments.push(comment);
        let updated = post.clone();
        self.last_comment_ms = Some(id_ms);

        info!(
            "event=post_comment module=repo status=ok post_id={} comments={}",
            updated.id,
            updated.comments.len()
        );
        self.persist();
        Ok(updated)
    }

    fn read_stored(&self) -> RepoResult<Option<Vec<Post>>> {
        let Some(posts) = read_json::<Vec<Post>>(&self.store, POSTS_KEY)? else {
            return Ok(None);
        };
        validate_collection(&posts)
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        Ok(Some(posts))
    }

    fn write_seed(&self) -> Vec<Post> {
        let seed = seed_posts();
        self.write_collection(&seed);
        seed
    }

    fn persist(&self) {
        if let Some(posts) = self.posts.as_deref() {
            self.write_collection(posts);
        }
    }

    fn write_collection(&self, posts: &[Post]) {
        if let Err(err) = write_json(&self.store, POSTS_KEY, posts) {
            warn!(
                "event=posts_persist module=repo status=error count={} error={err}",
                posts.len()
            );
        }
    }

    fn loaded_mut(&mut self) -> &mut Vec<Post> {
        if self.posts.is_none() {
            self.load_posts();
        }
        self.posts.get_or_insert_with(Vec::new)
    }
}

fn find_index(posts: &[Post], post_id: &str) -> RepoResult<usize> {
    posts
        .iter()
        .position(|post| post.id == post_id)
        .ok_or_else(|| RepoError::NotFound(post_id.to_string()))
}

fn find_post_mut<'a>(posts: &'a mut [Post], post_id: &str) -> RepoResult<&'a mut Post> {
    let index = find_index(posts, post_id)?;
    Ok(&mut posts[index])
}

fn next_comment_id(posts: &[Post], start_ms: i64) -> (CommentId, i64) {
    let mut candidate = start_ms;
    loop {
        let id = format!("c{candidate}");
        if !posts.iter().any(|post| post.has_comment(&id)) {
            return (id, candidate);
        }
        candidate += 1;
    }
}
