//! Hosted `posts` table collaborator and its SQLite stand-in.
//!
//! # Responsibility
//! - Create, list and delete rows shaped like the hosted table
//!   (`id, user_id, username, avatar_url, content, created_at`).
//! - Enforce author-only deletion.
//!
//! # Invariants
//! - Lists are ordered by `created_at DESC, id ASC`.
//! - `created_at` is written in the millisecond RFC 3339 form, so text
//!   ordering matches time ordering.

use crate::clock::{Clock, SystemClock};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::post::format_timestamp;
use crate::model::profile::UserProfile;
use log::info;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TABLE_POST_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    username,
    avatar_url,
    content,
    created_at
FROM posts";

pub type TablePostResult<T> = Result<T, TablePostError>;

#[derive(Debug)]
pub enum TablePostError {
    EmptyContent,
    NotFound(Uuid),
    NotAuthor { post_id: Uuid, user_id: String },
    Uninitialized { expected: u32, actual: u32 },
    InvalidData(String),
    Db(DbError),
}

impl Display for TablePostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "post content must not be empty"),
            Self::NotFound(id) => write!(f, "table post not found: {id}"),
            Self::NotAuthor { post_id, user_id } => {
                write!(f, "user {user_id} is not the author of post {post_id}")
            }
            Self::Uninitialized { expected, actual } => write!(
                f,
                "storage schema version {actual} does not match required {expected}"
            ),
            Self::InvalidData(message) => write!(f, "invalid table post data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TablePostError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for TablePostError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TablePostError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One row of the hosted `posts` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePost {
    pub id: Uuid,
    pub user_id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub content: String,
    pub created_at: String,
}

impl TablePost {
    /// Letter shown when the avatar image is unavailable.
    pub fn avatar_fallback(&self) -> String {
        self.username
            .as_deref()
            .and_then(|name| name.chars().next())
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }

    /// Whether `user_id` may delete this row.
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

pub trait TablePostRepository {
    fn create_post(&self, author: &UserProfile, content: &str) -> TablePostResult<TablePost>;
    fn list_posts(&self) -> TablePostResult<Vec<TablePost>>;
    fn delete_post(&self, id: Uuid, acting_user_id: &str) -> TablePostResult<()>;
}

pub struct SqliteTablePostRepository<'conn, C: Clock = SystemClock> {
    conn: &'conn Connection,
    clock: C,
}

impl<'conn> SqliteTablePostRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> TablePostResult<Self> {
        Self::try_with_clock(conn, SystemClock)
    }
}

impl<'conn, C: Clock> SqliteTablePostRepository<'conn, C> {
    /// Wraps a migrated connection.
    pub fn try_with_clock(conn: &'conn Connection, clock: C) -> TablePostResult<Self> {
        let actual = current_user_version(conn)?;
        let expected = latest_version();
        if actual < expected {
            return Err(TablePostError::Uninitialized { expected, actual });
        }
        Ok(Self { conn, clock })
    }

    fn get_post(&self, id: Uuid) -> TablePostResult<Option<TablePost>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TABLE_POST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_table_post_row(row)?));
        }
        Ok(None)
    }
}

impl<C: Clock> TablePostRepository for SqliteTablePostRepository<'_, C> {
    fn create_post(&self, author: &UserProfile, content: &str) -> TablePostResult<TablePost> {
        if content.trim().is_empty() {
            return Err(TablePostError::EmptyContent);
        }

        let post = TablePost {
            id: Uuid::new_v4(),
            user_id: author.id.clone(),
            username: Some(author.username.clone()),
            avatar_url: Some(author.avatar.clone()).filter(|url| !url.is_empty()),
            content: content.to_string(),
            created_at: format_timestamp(self.clock.now()),
        };

        self.conn.execute(
            "INSERT INTO posts (id, user_id, username, avatar_url, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                post.id.to_string(),
                post.user_id.as_str(),
                post.username.as_deref(),
                post.avatar_url.as_deref(),
                post.content.as_str(),
                post.created_at.as_str(),
            ],
        )?;

        info!(
            "event=table_post_create module=repo status=ok post_id={}",
            post.id
        );
        Ok(post)
    }

    fn list_posts(&self) -> TablePostResult<Vec<TablePost>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TABLE_POST_SELECT_SQL} ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_table_post_row(row)?);
        }
        Ok(posts)
    }

    fn delete_post(&self, id: Uuid, acting_user_id: &str) -> TablePostResult<()> {
        let post = self.get_post(id)?.ok_or(TablePostError::NotFound(id))?;
        if !post.is_authored_by(acting_user_id) {
            return Err(TablePostError::NotAuthor {
                post_id: id,
                user_id: acting_user_id.to_string(),
            });
        }

        self.conn
            .execute("DELETE FROM posts WHERE id = ?1;", [id.to_string()])?;
        info!("event=table_post_delete module=repo status=ok post_id={id}");
        Ok(())
    }
}

fn parse_table_post_row(row: &Row<'_>) -> TablePostResult<TablePost> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        TablePostError::InvalidData(format!("invalid uuid value `{id_text}` in posts.id"))
    })?;

    Ok(TablePost {
        id,
        user_id: row.get("user_id")?,
        username: row.get("username")?,
        avatar_url: row.get("avatar_url")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}
