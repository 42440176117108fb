use instaclone_core::db::open_db;
use instaclone_core::store::StoreResult;
use instaclone_core::{
    seed_posts, KeyValueStore, MemoryStore, Post, PostRepository, SqliteStore, StoreError,
    UserProfile, POSTS_KEY,
};
use std::cell::Cell;

/// Store whose writes can be switched off, like a full browser quota.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    reject_writes: Cell<bool>,
}

impl KeyValueStore for FlakyStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.reject_writes.get() {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.inner.remove_item(key)
    }
}

#[test]
fn malformed_json_falls_back_to_seed_and_overwrites_it() {
    let store = MemoryStore::new();
    store.insert_raw(POSTS_KEY, "[{\"id\": ");

    let mut repo = PostRepository::new(&store);
    assert_eq!(repo.load_posts(), seed_posts());

    let stored: Vec<Post> = serde_json::from_str(&store.raw(POSTS_KEY).unwrap()).unwrap();
    assert_eq!(stored, seed_posts());
}

#[test]
fn schema_violations_fall_back_to_seed() {
    let mut duplicated = seed_posts();
    duplicated[1].id = "1".to_string();

    let mut liked_without_likes = seed_posts();
    liked_without_likes[0].likes = 0;
    liked_without_likes[0].liked = true;

    let mut blank_comment = seed_posts();
    blank_comment[0].comments[0].text = "  ".to_string();

    for invalid in [duplicated, liked_without_likes, blank_comment] {
        let store = MemoryStore::new();
        store.insert_raw(POSTS_KEY, serde_json::to_string(&invalid).unwrap());
        let mut repo = PostRepository::new(&store);
        assert_eq!(repo.load_posts(), seed_posts());
    }
}

#[test]
fn wrong_json_shape_falls_back_to_seed() {
    let store = MemoryStore::new();
    store.insert_raw(POSTS_KEY, r#"{"posts": []}"#);
    let mut repo = PostRepository::new(&store);
    assert_eq!(repo.load_posts(), seed_posts());
}

#[test]
fn empty_persisted_collection_is_respected() {
    let store = MemoryStore::new();
    store.insert_raw(POSTS_KEY, "[]");
    let mut repo = PostRepository::new(&store);
    assert!(repo.load_posts().is_empty());
}

#[test]
fn write_failures_do_not_fail_mutations() {
    let store = FlakyStore::default();
    let mut repo = PostRepository::new(&store);
    repo.load_posts();

    store.reject_writes.set(true);
    let updated = repo.toggle_like("1").unwrap();
    assert_eq!(updated.likes, 244);
    let commented = repo
        .add_comment("1", "offline", &UserProfile::new("1", "a").unwrap())
        .unwrap();
    assert_eq!(commented.comments.len(), 2);

    let stored: Vec<Post> =
        serde_json::from_str(&store.inner.raw(POSTS_KEY).unwrap()).unwrap();
    assert_eq!(stored[0].likes, 243);
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("instaclone.sqlite3");

    let expected = {
        let conn = open_db(&path).unwrap();
        let store = SqliteStore::try_new(&conn).unwrap();
        let mut repo = PostRepository::new(store);
        repo.load_posts();
        repo.toggle_like("1").unwrap();
        repo.add_comment("3", "Nice!", &UserProfile::new("1", "u").unwrap())
            .unwrap();
        repo.posts().to_vec()
    };

    let conn = open_db(&path).unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let mut repo = PostRepository::new(store);
    let reloaded = repo.load_posts();
    assert_eq!(reloaded, expected);
    assert_eq!(reloaded[0].likes, 244);
    assert_eq!(reloaded[2].comments[0].text, "Nice!");
}

#[test]
fn offset_less_timestamps_keep_user_data() {
    let store = MemoryStore::new();
    let mut stored = serde_json::to_value(seed_posts()).unwrap();
    stored[0]["caption"] = "user edited".into();
    stored[0]["createdAt"] = "2023-05-09T18:30:00".into();
    stored[1]["comments"][0]["createdAt"] = "2023-05-10T14:23:00.000".into();
    store.insert_raw(POSTS_KEY, &stored.to_string());

    let mut repo = PostRepository::new(&store);
    let posts = repo.load_posts();
    assert_eq!(posts[0].caption, "user edited");
    assert_eq!(posts[0].created_at, "2023-05-09T18:30:00");

    let raw: serde_json::Value = serde_json::from_str(&store.raw(POSTS_KEY).unwrap()).unwrap();
    assert_eq!(raw[0]["caption"], "user edited");
}

#[test]
fn unliked_post_at_like_capacity_falls_back_to_seed() {
    let store = MemoryStore::new();
    let mut stored = seed_posts();
    stored[0].likes = u32::MAX;
    stored[0].liked = false;
    store.insert_raw(POSTS_KEY, &serde_json::to_string(&stored).unwrap());

    let mut repo = PostRepository::new(&store);
    assert_eq!(repo.load_posts(), seed_posts());

    let liked = repo.toggle_like("1").unwrap();
    assert_eq!(liked.likes, 244);
    let unliked = repo.toggle_like("1").unwrap();
    assert_eq!(unliked.likes, 243);
}
