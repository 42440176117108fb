use chrono::{DateTime, Duration, TimeZone, Utc};
use instaclone_core::db::open_db_in_memory;
use instaclone_core::{
    Clock, SqliteTablePostRepository, TablePostError, TablePostRepository, UserProfile,
};
use rusqlite::Connection;
use std::cell::Cell;

struct StepClock {
    next: Cell<DateTime<Utc>>,
}

impl StepClock {
    fn new() -> Self {
        Self {
            next: Cell::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + Duration::seconds(1));
        now
    }
}

fn profile(id: &str, name: &str) -> UserProfile {
    UserProfile::new(id, name).unwrap()
}

#[test]
fn create_and_list_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTablePostRepository::try_with_clock(&conn, StepClock::new()).unwrap();

    let first = repo.create_post(&profile("u1", "ann"), "first").unwrap();
    let second = repo.create_post(&profile("u2", "ben"), "second").unwrap();

    let listed = repo.list_posts().unwrap();
    assert_eq!(listed, vec![second, first.clone()]);
    assert_eq!(first.username.as_deref(), Some("ann"));
    assert_eq!(first.created_at, "2024-01-01T00:00:00.000Z");
}

#[test]
fn blank_content_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTablePostRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.create_post(&profile("u1", "ann"), "  "),
        Err(TablePostError::EmptyContent)
    ));
}

#[test]
fn only_author_can_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTablePostRepository::try_new(&conn).unwrap();
    let post = repo.create_post(&profile("u1", "ann"), "mine").unwrap();

    let err = repo.delete_post(post.id, "u2").unwrap_err();
    assert!(matches!(err, TablePostError::NotAuthor { .. }));
    assert_eq!(repo.list_posts().unwrap().len(), 1);

    repo.delete_post(post.id, "u1").unwrap();
    assert!(repo.list_posts().unwrap().is_empty());
    assert!(matches!(
        repo.delete_post(post.id, "u1"),
        Err(TablePostError::NotFound(id)) if id == post.id
    ));
}

#[test]
fn rows_with_missing_username_render_fallback() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO posts (id, user_id, username, avatar_url, content, created_at)
         VALUES ('6f1c2a8e-8a55-4c1e-9a51-2f3c1d0b7e11', 'u9', NULL, NULL, 'hi', '2024-01-01T00:00:00.000Z');",
        [],
    )
    .unwrap();

    let repo = SqliteTablePostRepository::try_new(&conn).unwrap();
    let listed = repo.list_posts().unwrap();
    assert_eq!(listed[0].avatar_fallback(), "U");
    assert_eq!(listed[0].avatar_url, None);
}

#[test]
fn corrupt_row_id_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO posts (id, user_id, content, created_at)
         VALUES ('not-a-uuid', 'u1', 'x', '2024-01-01T00:00:00.000Z');",
        [],
    )
    .unwrap();

    let repo = SqliteTablePostRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.list_posts(),
        Err(TablePostError::InvalidData(_))
    ));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteTablePostRepository::try_new(&conn),
        Err(TablePostError::Uninitialized { actual: 0, .. })
    ));
}
