//! Session store for the logged-in user record.
//!
//! # Responsibility
//! - Read/write/clear the single `user` record in key-value storage.
//!
//! # Invariants
//! - A missing, unreadable or invalid record reads as "no session".
//! - Write failures are logged and swallowed; callers see no error path.
//! - There is no expiry and no token.

use crate::model::profile::UserProfile;
use crate::store::{read_json, write_json, KeyValueStore};
use log::{info, warn};

/// Storage key holding the serialized session profile.
pub const SESSION_KEY: &str = "user";

pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the persisted session profile, if any.
    pub fn current_user(&self) -> Option<UserProfile> {
        let profile = match read_json::<UserProfile>(&self.store, SESSION_KEY) {
            Ok(value) => value?,
            Err(err) => {
                warn!("event=session_read module=repo status=error error={err}");
                return None;
            }
        };

        if let Err(err) = profile.validate() {
            warn!("event=session_read module=repo status=error error={err}");
            return None;
        }
        Some(profile)
    }

    /// Persists `profile` as the active session.
    pub fn set_current_user(&self, profile: &UserProfile) {
        match write_json(&self.store, SESSION_KEY, profile) {
            Ok(()) => info!(
                "event=session_write module=repo status=ok user_id={}",
                profile.id
            ),
            Err(err) => warn!("event=session_write module=repo status=error error={err}"),
        }
    }

    /// Removes the persisted session record.
    pub fn clear_current_user(&self) {
        match self.store.remove_item(SESSION_KEY) {
            Ok(()) => info!("event=session_clear module=repo status=ok"),
            Err(err) => warn!("event=session_clear module=repo status=error error={err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionStore, SESSION_KEY};
    use crate::model::profile::UserProfile;
    use crate::store::MemoryStore;

    #[test]
    fn set_get_clear_roundtrip() {
        let store = MemoryStore::new();
        let session = SessionStore::new(&store);
        assert_eq!(session.current_user(), None);

        let profile = UserProfile::new("1", "alice").unwrap();
        session.set_current_user(&profile);
        assert_eq!(session.current_user(), Some(profile));

        session.clear_current_user();
        assert_eq!(session.current_user(), None);
        assert!(store.raw(SESSION_KEY).is_none());
    }

    #[test]
    fn unparseable_record_reads_as_absent() {
        let store = MemoryStore::new();
        store.insert_raw(SESSION_KEY, "not-json");
        assert_eq!(SessionStore::new(&store).current_user(), None);

        store.insert_raw(SESSION_KEY, r#"{"id":"","username":"x","avatar":""}"#);
        assert_eq!(SessionStore::new(&store).current_user(), None);
    }
}
