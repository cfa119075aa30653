//! Tab-wide colour theme.
//!
//! The selected theme lives in localStorage under `theme` and is mirrored onto
//! `<html data-theme="...">` so the stylesheet can switch palettes.

use crate::storage::{BrowserStorage, SharedStore, THEME_KEY};
use leptos::prelude::*;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Forest,
    Light,
    Dark,
    Ocean,
    Sunset,
    Mountain,
    Classic,
}

impl Theme {
    pub fn label(self) -> &'static str {
        match self {
            Self::Forest => "Forest",
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::Ocean => "Ocean",
            Self::Sunset => "Sunset",
            Self::Mountain => "Mountain",
            Self::Classic => "Classic",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Forest => "🌲",
            Self::Light => "☀️",
            Self::Dark => "🌙",
            Self::Ocean => "🌊",
            Self::Sunset => "🌅",
            Self::Mountain => "⛰️",
            Self::Classic => "📜",
        }
    }
}

/// Where the active theme is rendered.
pub(crate) trait ThemeSurface: Send + Sync {
    fn apply(&self, theme: Theme);
}

/// Sets `data-theme` on the document element.
pub(crate) struct DocumentRoot;

impl ThemeSurface for DocumentRoot {
    fn apply(&self, theme: Theme) {
        let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        let _ = root.set_attribute("data-theme", theme.as_ref());
    }
}

type Listener = Arc<dyn Fn(Theme) + Send + Sync>;

struct Inner {
    current: Theme,
    next_listener: u64,
    listeners: Vec<(u64, Listener)>,
}

#[derive(Clone)]
pub(crate) struct ThemeStore {
    inner: Arc<Mutex<Inner>>,
    store: SharedStore,
    surface: Arc<dyn ThemeSurface>,
}

impl ThemeStore {
    /// Loads the saved theme (unknown or missing values mean the default) and
    /// applies it to the surface right away.
    pub fn init(store: SharedStore, surface: Arc<dyn ThemeSurface>) -> Self {
        let current = store
            .get(THEME_KEY)
            .and_then(|raw| Theme::from_str(raw.trim()).ok())
            .unwrap_or_default();
        surface.apply(current);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                current,
                next_listener: 0,
                listeners: Vec::new(),
            })),
            store,
            surface,
        }
    }

    pub fn browser() -> Self {
        Self::init(BrowserStorage::shared(), Arc::new(DocumentRoot))
    }

    pub fn current(&self) -> Theme {
        self.inner.lock().map(|i| i.current).unwrap_or_default()
    }

    pub fn is_dark(&self) -> bool {
        self.current() == Theme::Dark
    }

    /// Unknown names are ignored. Returns whether `value` named a theme.
    pub fn set_theme(&self, value: &str) -> bool {
        match Theme::from_str(value.trim()) {
            Ok(theme) => {
                self.select(theme);
                true
            }
            Err(_) => {
                log::debug!("ignoring unknown theme `{value}`");
                false
            }
        }
    }

    pub fn select(&self, theme: Theme) {
        let listeners: Vec<Listener> = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            if inner.current == theme {
                return;
            }
            inner.current = theme;
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        if let Err(e) = self.store.set(THEME_KEY, theme.as_ref()) {
            log::debug!("theme not persisted: {e}");
        }
        self.surface.apply(theme);
        for listener in listeners {
            listener(theme);
        }
    }

    /// Flips between the default forest palette and dark.
    pub fn toggle(&self) -> Theme {
        let next = if self.is_dark() {
            Theme::Forest
        } else {
            Theme::Dark
        };
        self.select(next);
        next
    }

    pub fn subscribe(&self, listener: impl Fn(Theme) + Send + Sync + 'static) -> u64 {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        inner.next_listener += 1;
        let id = inner.next_listener;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.retain(|(lid, _)| *lid != id);
        }
    }
}

/// Reactive handle for views: the store plus a signal that follows it.
#[derive(Clone)]
pub(crate) struct ThemeContext {
    pub store: ThemeStore,
    pub current: RwSignal<Theme>,
}

impl ThemeContext {
    pub fn new(store: ThemeStore) -> Self {
        let current = RwSignal::new(store.current());
        let id = store.subscribe(move |theme| {
            let _ = current.try_set(theme);
        });
        let s2 = store.clone();
        on_cleanup(move || s2.unsubscribe(id));
        Self { store, current }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use strum::IntoEnumIterator;

    #[derive(Default)]
    struct Recorded(Mutex<Vec<Theme>>);

    impl ThemeSurface for Recorded {
        fn apply(&self, theme: Theme) {
            self.0.lock().unwrap().push(theme);
        }
    }

    fn store_with(mem: &MemoryStorage) -> (ThemeStore, Arc<Recorded>) {
        let surface = Arc::new(Recorded::default());
        (ThemeStore::init(mem.shared(), surface.clone()), surface)
    }

    #[test]
    fn test_defaults_to_forest_and_applies_on_init() {
        let mem = MemoryStorage::default();
        let (store, surface) = store_with(&mem);
        assert_eq!(store.current(), Theme::Forest);
        assert_eq!(*surface.0.lock().unwrap(), vec![Theme::Forest]);
    }

    #[test]
    fn test_unknown_theme_is_a_noop() {
        let mem = MemoryStorage::default();
        let (store, surface) = store_with(&mem);
        store.select(Theme::Ocean);

        assert!(!store.set_theme("neon"));
        assert_eq!(store.current(), Theme::Ocean);
        assert_eq!(mem.raw(THEME_KEY).as_deref(), Some("ocean"));
        assert_eq!(surface.0.lock().unwrap().last(), Some(&Theme::Ocean));
    }

    #[test]
    fn test_set_theme_persists_and_reloads() {
        let mem = MemoryStorage::default();
        let (store, _) = store_with(&mem);
        assert!(store.set_theme("sunset"));
        assert_eq!(mem.raw(THEME_KEY).as_deref(), Some("sunset"));

        let (reloaded, surface) = store_with(&mem);
        assert_eq!(reloaded.current(), Theme::Sunset);
        assert_eq!(*surface.0.lock().unwrap(), vec![Theme::Sunset]);
    }

    #[test]
    fn test_garbage_in_storage_falls_back_to_default() {
        let mem = MemoryStorage::default();
        mem.put_raw(THEME_KEY, "{\"not\":\"a theme\"}");
        let (store, _) = store_with(&mem);
        assert_eq!(store.current(), Theme::Forest);
    }

    #[test]
    fn test_listeners_fire_only_on_change() {
        let mem = MemoryStorage::default();
        let (store, _) = store_with(&mem);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s2 = seen.clone();
        let id = store.subscribe(move |t| s2.lock().unwrap().push(t));

        store.select(Theme::Light);
        store.select(Theme::Light);
        store.set_theme("bogus");
        assert_eq!(*seen.lock().unwrap(), vec![Theme::Light]);

        store.unsubscribe(id);
        store.select(Theme::Dark);
        assert_eq!(*seen.lock().unwrap(), vec![Theme::Light]);
    }

    #[test]
    fn test_toggle_switches_forest_and_dark() {
        let mem = MemoryStorage::default();
        let (store, _) = store_with(&mem);
        assert_eq!(store.toggle(), Theme::Dark);
        assert!(store.is_dark());
        assert_eq!(store.toggle(), Theme::Forest);

        store.select(Theme::Classic);
        assert_eq!(store.toggle(), Theme::Dark);
    }

    #[test]
    fn test_write_failure_still_switches_theme() {
        let mem = MemoryStorage::default();
        let (store, surface) = store_with(&mem);
        mem.set_fail_writes(true);
        store.select(Theme::Mountain);
        assert_eq!(store.current(), Theme::Mountain);
        assert_eq!(surface.0.lock().unwrap().last(), Some(&Theme::Mountain));
        assert!(mem.raw(THEME_KEY).is_none());
    }

    #[test]
    fn test_every_theme_name_round_trips() {
        for theme in Theme::iter() {
            assert_eq!(Theme::from_str(theme.as_ref()).ok(), Some(theme));
        }
    }
}
