use crate::storage::{load_json, save_json, SharedStore};
use leptos::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// A value mirrored into storage as JSON. Missing or unreadable data yields
/// the default; failed writes leave the in-memory value untouched.
pub struct PersistedState<T> {
    store: SharedStore,
    key: String,
    value: T,
}

impl<T: Serialize + DeserializeOwned> PersistedState<T> {
    pub fn load(store: SharedStore, key: &str, default: T) -> Self {
        let value = load_json(store.as_ref(), key).unwrap_or(default);
        Self {
            store,
            key: key.to_string(),
            value,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        if let Err(e) = save_json(self.store.as_ref(), &self.key, &self.value) {
            log::debug!("`{}` kept in memory only: {e}", self.key);
        }
    }
}

/// Signal seeded from storage that writes every change back.
pub fn use_persisted<T>(store: SharedStore, key: &str, default: T) -> RwSignal<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let state = PersistedState::load(store, key, default);
    let signal = RwSignal::new(state.get().clone());
    let state = Arc::new(Mutex::new(state));

    Effect::new(move |_| {
        let value = signal.get();
        if let Ok(mut state) = state.lock() {
            state.set(value);
        }
    });

    signal
}
