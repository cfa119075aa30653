use crate::models::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub(crate) const USER_KEY: &str = "habit_garden_user";
pub(crate) const THEME_KEY: &str = "theme";
pub(crate) const HABIT_ORDER_KEY: &str = "habit_order";

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("storage rejected write for `{key}`")]
    Rejected { key: String },
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key-value text storage (browser `localStorage` in production).
pub(crate) trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

pub(crate) type SharedStore = Arc<dyn KeyValueStore>;

/// `window.localStorage`. Looked up per call; private mode or a missing window
/// degrade to "absent" on reads and an error on writes.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserStorage;

impl BrowserStorage {
    pub fn shared() -> SharedStore {
        Arc::new(Self)
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| StorageError::Rejected {
                key: key.to_string(),
            })
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

pub(crate) fn load_json<T: for<'de> Deserialize<'de>>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let json = store.get(key)?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

pub(crate) fn save_user(store: &dyn KeyValueStore, user: &User) {
    if let Err(e) = save_json(store, USER_KEY, user) {
        log::debug!("user not cached: {e}");
    }
}

pub(crate) fn load_user(store: &dyn KeyValueStore) -> Option<User> {
    load_json(store, USER_KEY)
}

pub(crate) fn save_tokens(store: &dyn KeyValueStore, access: &str, refresh: Option<&str>) {
    let _ = store.set(ACCESS_TOKEN_KEY, access);
    if let Some(refresh) = refresh {
        let _ = store.set(REFRESH_TOKEN_KEY, refresh);
    }
}

pub(crate) fn clear_session(store: &dyn KeyValueStore) {
    store.remove(ACCESS_TOKEN_KEY);
    store.remove(REFRESH_TOKEN_KEY);
    store.remove(USER_KEY);
}

#[cfg(test)]
pub(crate) use memory::MemoryStorage;

#[cfg(test)]
mod memory {
    use super::{KeyValueStore, SharedStore, StorageError};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory store for native tests. `fail_writes` simulates quota errors.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryStorage {
        items: Arc<Mutex<BTreeMap<String, String>>>,
        fail_writes: Arc<AtomicBool>,
    }

    impl MemoryStorage {
        pub fn shared(&self) -> SharedStore {
            Arc::new(self.clone())
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.items.lock().ok()?.get(key).cloned()
        }

        pub fn put_raw(&self, key: &str, value: &str) {
            if let Ok(mut items) = self.items.lock() {
                items.insert(key.to_string(), value.to_string());
            }
        }
    }

    impl KeyValueStore for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.raw(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Rejected {
                    key: key.to_string(),
                });
            }
            self.put_raw(key, value);
            Ok(())
        }

        fn remove(&self, key: &str) {
            if let Ok(mut items) = self.items.lock() {
                items.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let mem = MemoryStorage::default();
        save_json(&mem, HABIT_ORDER_KEY, &vec![3_i64, 1, 2]).expect("write should succeed");
        let loaded: Option<Vec<i64>> = load_json(&mem, HABIT_ORDER_KEY);
        assert_eq!(loaded, Some(vec![3, 1, 2]));
    }

    #[test]
    fn test_corrupted_json_reads_as_absent() {
        let mem = MemoryStorage::default();
        mem.put_raw(HABIT_ORDER_KEY, "[1, 2,");
        let loaded: Option<Vec<i64>> = load_json(&mem, HABIT_ORDER_KEY);
        assert!(loaded.is_none());
    }

    #[test]
    fn test_rejected_write_reports_key() {
        let mem = MemoryStorage::default();
        mem.set_fail_writes(true);
        let err = save_json(&mem, THEME_KEY, &"dark").expect_err("write should fail");
        assert!(err.to_string().contains(THEME_KEY));
        assert!(mem.raw(THEME_KEY).is_none());
    }

    #[test]
    fn test_clear_session_removes_tokens_and_user() {
        let mem = MemoryStorage::default();
        save_tokens(&mem, "a", Some("r"));
        save_user(
            &mem,
            &User {
                id: 1,
                username: "u".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(load_user(&mem).map(|u| u.username), Some("u".to_string()));

        clear_session(&mem);
        assert!(mem.raw(ACCESS_TOKEN_KEY).is_none());
        assert!(mem.raw(REFRESH_TOKEN_KEY).is_none());
        assert!(load_user(&mem).is_none());
    }
}
