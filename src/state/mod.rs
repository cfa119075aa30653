use crate::api::{ApiClient, ApiError, ApiErrorKind};
use crate::models::User;
use crate::notify::{Notifications, Notifier};
use crate::optimistic::{Keyed, Optimistic, ViewGuard};
use crate::storage::{load_user, save_user, SharedStore};
use crate::theme::{ThemeContext, ThemeStore};
use leptos::prelude::*;

/// Optimistic coordinator over a page-owned list, reporting through toasts.
pub(crate) type Coordinator<T> = Optimistic<T, RwSignal<Vec<T>>, Notifications>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: ApiClient,
    pub store: SharedStore,
    pub current_user: RwSignal<Option<User>>,
    pub notifications: Notifications,
    pub theme: ThemeContext,
}

impl AppState {
    pub fn new() -> Self {
        let api_client = ApiClient::load_from_storage();
        let store = api_client.store();
        let stored_user = if api_client.is_authenticated() {
            load_user(store.as_ref())
        } else {
            None
        };

        Self {
            api_client,
            store,
            current_user: RwSignal::new(stored_user),
            notifications: Notifications::new(),
            theme: ThemeContext::new(ThemeStore::browser()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_client.is_authenticated()
    }

    pub fn sign_in(&self, user: User) {
        save_user(self.store.as_ref(), &user);
        self.current_user.set(Some(user));
    }

    pub fn sign_out(&self) {
        self.api_client.logout();
        self.current_user.set(None);
    }

    /// Optimistic coordinator bound to the calling view's lifetime. Call it
    /// while the component body runs, not from an event handler.
    pub fn optimistic<T>(&self, cell: RwSignal<Vec<T>>) -> Coordinator<T>
    where
        T: Keyed + Clone + Send + Sync + 'static,
    {
        Optimistic::new(cell, self.notifications, ViewGuard::scoped())
    }

    /// Turns a failed request into one toast. An expired session also signs
    /// the user out so the route guard sends them to `/login`.
    pub fn report(&self, err: &ApiError, what: &str) {
        log::warn!("{what}: {err}");
        let message = match err.kind {
            ApiErrorKind::Unauthorized => {
                let _ = self.current_user.try_set(None);
                err.message.clone()
            }
            ApiErrorKind::Network => format!("{what}. Check your connection and try again."),
            ApiErrorKind::Http => format!("{what}: {}", err.message),
            ApiErrorKind::Parse => format!("{what}. Unexpected response from the server."),
        };
        self.notifications.show_error(&message);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

pub(crate) fn use_app() -> AppState {
    expect_context::<AppContext>().0
}
