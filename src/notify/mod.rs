use leptos::prelude::*;
use wasm_bindgen::JsCast;

pub(crate) const TOAST_TTL_MS: i32 = 4_000;
const MAX_VISIBLE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn class(self) -> &'static str {
        match self {
            Self::Success => "border-green-500/40 bg-green-50 text-green-900",
            Self::Error => "border-destructive/40 bg-destructive/10 text-destructive",
            Self::Info => "border-border bg-card text-card-foreground",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Newest last. Oldest toasts fall off once the queue is full.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
        });
        if self.toasts.len() > MAX_VISIBLE {
            let overflow = self.toasts.len() - MAX_VISIBLE;
            self.toasts.drain(..overflow);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        before != self.toasts.len()
    }

    pub fn items(&self) -> &[Toast] {
        &self.toasts
    }
}

/// User-visible notification surface.
pub(crate) trait Notifier {
    fn show_success(&self, message: &str);
    fn show_error(&self, message: &str);
}

/// Toast store shared through context. Each toast expires on its own timer.
#[derive(Clone, Copy)]
pub(crate) struct Notifications {
    queue: RwSignal<ToastQueue>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifications {
    pub fn new() -> Self {
        Self {
            queue: RwSignal::new(ToastQueue::default()),
        }
    }

    pub fn show(&self, kind: ToastKind, message: &str) -> u64 {
        let mut id = 0;
        self.queue.update(|q| id = q.push(kind, message));
        self.schedule_expiry(id);
        id
    }

    pub fn show_info(&self, message: &str) {
        self.show(ToastKind::Info, message);
    }

    pub fn dismiss(&self, id: u64) {
        self.queue.update(|q| {
            q.dismiss(id);
        });
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.queue.with(|q| q.items().to_vec())
    }

    fn schedule_expiry(&self, id: u64) {
        let Some(win) = web_sys::window() else {
            return;
        };
        let queue = self.queue;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            // The owning scope may be gone by the time this fires.
            let _ = queue.try_update(|q| q.dismiss(id));
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            TOAST_TTL_MS,
        );
    }
}

impl Notifier for Notifications {
    fn show_success(&self, message: &str) {
        self.show(ToastKind::Success, message);
    }

    fn show_error(&self, message: &str) {
        log::info!("error toast: {message}");
        self.show(ToastKind::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut q = ToastQueue::default();
        let a = q.push(ToastKind::Info, "one");
        let b = q.push(ToastKind::Error, "two");
        assert!(b > a);
        assert_eq!(q.items().len(), 2);
        assert_eq!(q.items()[1].kind, ToastKind::Error);
    }

    #[test]
    fn test_dismiss_only_removes_matching_toast() {
        let mut q = ToastQueue::default();
        let a = q.push(ToastKind::Success, "saved");
        let b = q.push(ToastKind::Success, "saved again");
        assert!(q.dismiss(a));
        assert!(!q.dismiss(a));
        assert_eq!(q.items().len(), 1);
        assert_eq!(q.items()[0].id, b);
    }

    #[test]
    fn test_queue_is_capped() {
        let mut q = ToastQueue::default();
        for i in 0..8 {
            q.push(ToastKind::Info, format!("toast {i}"));
        }
        assert_eq!(q.items().len(), MAX_VISIBLE);
        assert_eq!(q.items()[0].message, "toast 3");
    }
}
