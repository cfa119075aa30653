use crate::util::now_ms;
use leptos::prelude::*;
use std::sync::{Arc, Mutex};
use wasm_bindgen::JsCast;

pub const DEFAULT_DEBOUNCE_MS: i32 = 300;

/// Holds the latest value until it has been left alone for `delay_ms`.
/// Each `push` replaces the pending value and restarts the wait.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay_ms: i64,
    pending: Option<(T, i64)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms: delay_ms.max(0),
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now_ms: i64) -> i64 {
        let deadline = now_ms + self.delay_ms;
        self.pending = Some((value, deadline));
        deadline
    }

    pub fn deadline(&self) -> Option<i64> {
        self.pending.as_ref().map(|(_, d)| *d)
    }

    /// Releases the pending value once its deadline has passed.
    pub fn poll(&mut self, now_ms: i64) -> Option<T> {
        match self.deadline() {
            Some(d) if now_ms >= d => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }
}

type Shared<T> = Arc<Mutex<Debouncer<T>>>;

fn arm<T>(debouncer: Shared<T>, timer: Arc<Mutex<Option<i32>>>, out: RwSignal<T>, wait_ms: i32)
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let Some(win) = web_sys::window() else {
        return;
    };

    if let Ok(mut slot) = timer.lock() {
        if let Some(tid) = slot.take() {
            win.clear_timeout_with_handle(tid);
        }
    }

    let d2 = debouncer.clone();
    let t2 = timer.clone();
    let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
        let now = now_ms();
        let (ready, remaining) = match d2.lock() {
            Ok(mut d) => {
                let ready = d.poll(now);
                (ready, d.deadline().map(|dl| (dl - now).max(0) as i32))
            }
            Err(_) => (None, None),
        };
        match (ready, remaining) {
            (Some(value), _) => {
                if out.try_get_untracked().as_ref() != Some(&value) {
                    let _ = out.try_set(value);
                }
            }
            // Timers can fire a little early.
            (None, Some(rest)) => arm(d2, t2, out, rest),
            (None, None) => {}
        }
    });

    let tid = win
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            wait_ms,
        )
        .ok();

    if let Ok(mut slot) = timer.lock() {
        *slot = tid;
    }
}

/// Follows `source`, but only after it has been stable for `delay_ms`.
pub fn use_debounce<T>(source: Signal<T>, delay_ms: i32) -> Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let out = RwSignal::new(source.get_untracked());
    let debouncer: Shared<T> = Arc::new(Mutex::new(Debouncer::new(delay_ms as i64)));
    let timer: Arc<Mutex<Option<i32>>> = Arc::new(Mutex::new(None));

    let d2 = debouncer.clone();
    let t2 = timer.clone();
    Effect::new(move |_| {
        let value = source.get();
        if let Ok(mut d) = d2.lock() {
            d.push(value, now_ms());
        }
        arm(d2.clone(), t2.clone(), out, delay_ms);
    });

    on_cleanup(move || {
        if let (Some(win), Ok(mut slot)) = (web_sys::window(), timer.lock()) {
            if let Some(tid) = slot.take() {
                win.clear_timeout_with_handle(tid);
            }
        }
    });

    out.into()
}
