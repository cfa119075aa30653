//! Optimistic updates: mutate local state now, confirm or roll back when the
//! request settles.
//!
//! State is a list of keyed rows. Each call names the rows it touches and
//! snapshots only those, so a rollback never reaches rows owned by other
//! requests, refetches or reorders. Two overlapping calls on the same row are
//! not coalesced: a late failure restores that row as it was before its own
//! call (last revert wins).

use crate::notify::Notifier;
use leptos::prelude::*;
use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A row with a stable identity inside an optimistic list.
pub(crate) trait Keyed {
    type Key: Clone + PartialEq + 'static;

    fn key(&self) -> Self::Key;
}

/// Where a page keeps the list an optimistic call edits.
pub(crate) trait StateCell<T>: Clone + 'static {
    fn read<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> R;
    fn mutate(&self, f: impl FnOnce(&mut Vec<T>));
}

impl<T> StateCell<T> for RwSignal<Vec<T>>
where
    T: Send + Sync + 'static,
{
    fn read<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> R {
        self.with_untracked(f)
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<T>)) {
        let _ = self.try_update(f);
    }
}

/// The touched rows as they were before the mutation, with their positions.
struct RowSnapshot<T: Keyed> {
    keys: Vec<T::Key>,
    rows: Vec<(usize, T)>,
}

impl<T: Keyed + Clone> RowSnapshot<T> {
    fn take(list: &[T], keys: Vec<T::Key>) -> Self {
        let rows = list
            .iter()
            .enumerate()
            .filter(|(_, row)| keys.contains(&row.key()))
            .map(|(i, row)| (i, row.clone()))
            .collect();
        Self { keys, rows }
    }

    /// Puts the touched rows back. Rows that still exist are replaced in
    /// place, removed rows go back near their old index, and rows the
    /// mutation added are dropped. Everything else is left as it is now.
    fn restore(self, list: &mut Vec<T>) {
        let before: Vec<T::Key> = self.rows.iter().map(|(_, row)| row.key()).collect();
        list.retain(|row| {
            let key = row.key();
            !self.keys.contains(&key) || before.contains(&key)
        });
        for (index, row) in self.rows {
            let key = row.key();
            match list.iter().position(|r| r.key() == key) {
                Some(at) => list[at] = row,
                None => list.insert(index.min(list.len()), row),
            }
        }
    }
}

/// Tracks whether the view that started a request is still mounted.
#[derive(Clone, Debug)]
pub(crate) struct ViewGuard {
    alive: Arc<AtomicBool>,
}

impl Default for ViewGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewGuard {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Guard released when the current reactive owner is cleaned up.
    pub fn scoped() -> Self {
        let guard = Self::new();
        let g = guard.clone();
        on_cleanup(move || g.release());
        guard
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Messages {
    failure: String,
    success: Option<String>,
}

impl Messages {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            failure: message.into(),
            success: None,
        }
    }

    pub fn with_success(mut self, message: impl Into<String>) -> Self {
        self.success = Some(message.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Settlement<T> {
    Committed(T),
    RolledBack,
    /// The view went away first; nothing was touched.
    Abandoned,
}

impl<T> Settlement<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

pub(crate) struct Optimistic<T, C, N> {
    cell: C,
    notifier: N,
    guard: ViewGuard,
    _rows: PhantomData<fn() -> T>,
}

impl<T, C: Clone, N: Clone> Clone for Optimistic<T, C, N> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            notifier: self.notifier.clone(),
            guard: self.guard.clone(),
            _rows: PhantomData,
        }
    }
}

impl<T, C, N> Optimistic<T, C, N>
where
    T: Keyed + Clone + 'static,
    C: StateCell<T>,
    N: Notifier + Clone + 'static,
{
    pub fn new(cell: C, notifier: N, guard: ViewGuard) -> Self {
        Self {
            cell,
            notifier,
            guard,
            _rows: PhantomData,
        }
    }

    /// Applies `mutation` to the rows named by `keys` right away and returns
    /// the settlement future.
    pub fn apply<R, E, Fut>(
        &self,
        keys: impl IntoIterator<Item = T::Key>,
        mutation: impl FnOnce(&mut Vec<T>),
        remote: Fut,
        messages: Messages,
    ) -> impl Future<Output = Settlement<R>> + 'static
    where
        R: 'static,
        E: Display + 'static,
        Fut: Future<Output = Result<R, E>> + 'static,
    {
        self.apply_and_merge(keys, mutation, remote, |_, _| {}, messages)
    }

    /// Like [`apply`](Self::apply), then folds the server's answer into state.
    pub fn apply_and_merge<R, E, Fut>(
        &self,
        keys: impl IntoIterator<Item = T::Key>,
        mutation: impl FnOnce(&mut Vec<T>),
        remote: Fut,
        merge: impl FnOnce(&mut Vec<T>, &R) + 'static,
        messages: Messages,
    ) -> impl Future<Output = Settlement<R>> + 'static
    where
        R: 'static,
        E: Display + 'static,
        Fut: Future<Output = Result<R, E>> + 'static,
    {
        let keys: Vec<T::Key> = keys.into_iter().collect();
        let snapshot = self.cell.read(|list| RowSnapshot::take(list, keys));
        self.cell.mutate(mutation);

        let cell = self.cell.clone();
        let notifier = self.notifier.clone();
        let guard = self.guard.clone();

        async move {
            let result = remote.await;
            if !guard.is_alive() {
                return Settlement::Abandoned;
            }
            match result {
                Ok(value) => {
                    cell.mutate(|list| merge(list, &value));
                    if let Some(msg) = messages.success.as_deref() {
                        notifier.show_success(msg);
                    }
                    Settlement::Committed(value)
                }
                Err(e) => {
                    log::warn!("optimistic update rolled back: {e}");
                    cell.mutate(|list| snapshot.restore(list));
                    notifier.show_error(&messages.failure);
                    Settlement::RolledBack
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    impl Keyed for Row {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    fn row(id: u32, label: &'static str) -> Row {
        Row { id, label }
    }

    fn relabel(list: &mut [Row], id: u32, label: &'static str) {
        if let Some(r) = list.iter_mut().find(|r| r.id == id) {
            r.label = label;
        }
    }

    #[derive(Clone, Default)]
    struct Cell(Arc<Mutex<Vec<Row>>>);

    impl Cell {
        fn get(&self) -> Vec<Row> {
            self.0.lock().unwrap().clone()
        }

        fn set(&self, rows: Vec<Row>) {
            *self.0.lock().unwrap() = rows;
        }
    }

    impl StateCell<Row> for Cell {
        fn read<R>(&self, f: impl FnOnce(&Vec<Row>) -> R) -> R {
            f(&*self.0.lock().unwrap())
        }

        fn mutate(&self, f: impl FnOnce(&mut Vec<Row>)) {
            f(&mut *self.0.lock().unwrap());
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn seen(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Notifier for Recorder {
        fn show_success(&self, message: &str) {
            self.0.lock().unwrap().push(format!("ok: {message}"));
        }

        fn show_error(&self, message: &str) {
            self.0.lock().unwrap().push(format!("err: {message}"));
        }
    }

    fn coordinator() -> (Optimistic<Row, Cell, Recorder>, Cell, Recorder, ViewGuard) {
        let cell = Cell::default();
        let notes = Recorder::default();
        let guard = ViewGuard::new();
        (
            Optimistic::new(cell.clone(), notes.clone(), guard.clone()),
            cell,
            notes,
            guard,
        )
    }

    fn pending() -> (
        oneshot::Sender<Result<(), String>>,
        impl Future<Output = Result<(), String>>,
    ) {
        let (tx, rx) = oneshot::channel::<Result<(), String>>();
        (tx, async move { rx.await.unwrap_or_else(|_| Err("dropped".to_string())) })
    }

    #[test]
    fn test_mutation_is_visible_before_request_settles() {
        let (opt, cell, notes, _guard) = coordinator();
        cell.set(vec![row(1, "idle")]);
        let (tx, remote) = pending();

        let settle = opt.apply([1], |s| relabel(s, 1, "liked"), remote, Messages::failure("Could not like"));
        assert_eq!(cell.get(), vec![row(1, "liked")]);
        assert!(notes.seen().is_empty());

        tx.send(Ok(())).unwrap();
        assert!(block_on(settle).is_committed());
        assert_eq!(cell.get(), vec![row(1, "liked")]);
        assert!(notes.seen().is_empty());
    }

    #[test]
    fn test_failure_restores_touched_row_and_notifies_once() {
        let (opt, cell, notes, _guard) = coordinator();
        cell.set(vec![row(1, "existing"), row(2, "other")]);

        let outcome = block_on(opt.apply(
            [1],
            |s| relabel(s, 1, "commented"),
            async { Err::<(), _>("500 Internal Server Error") },
            Messages::failure("Could not post comment"),
        ));

        assert_eq!(outcome, Settlement::RolledBack);
        assert_eq!(cell.get(), vec![row(1, "existing"), row(2, "other")]);
        assert_eq!(notes.seen(), vec!["err: Could not post comment"]);
    }

    #[test]
    fn test_merge_applies_server_value_and_success_message() {
        let (opt, cell, notes, _guard) = coordinator();

        let outcome = block_on(opt.apply_and_merge(
            [0],
            |s| s.push(row(0, "tmp")),
            async { Ok::<_, String>(42u32) },
            |s, server_id| {
                if let Some(r) = s.iter_mut().find(|r| r.id == 0) {
                    r.id = *server_id;
                    r.label = "saved";
                }
            },
            Messages::failure("nope").with_success("Comment added"),
        ));

        assert_eq!(outcome, Settlement::Committed(42));
        assert_eq!(cell.get(), vec![row(42, "saved")]);
        assert_eq!(notes.seen(), vec!["ok: Comment added"]);
    }

    #[test]
    fn test_teardown_before_settlement_leaves_state_alone() {
        let (opt, cell, notes, guard) = coordinator();
        cell.set(vec![row(1, "todo")]);
        let (tx, remote) = pending();

        let settle = opt.apply([1], |s| relabel(s, 1, "done"), remote, Messages::failure("Could not complete habit"));
        guard.release();
        tx.send(Err("offline".to_string())).unwrap();

        assert_eq!(block_on(settle), Settlement::Abandoned);
        assert_eq!(cell.get(), vec![row(1, "done")]);
        assert!(notes.seen().is_empty());
    }

    #[test]
    fn test_late_failure_keeps_other_rows_committed_change() {
        let (opt, cell, notes, _guard) = coordinator();
        cell.set(vec![row(1, "a"), row(2, "b")]);
        let (tx_a, remote_a) = pending();
        let (tx_b, remote_b) = pending();

        let a = opt.apply([1], |s| relabel(s, 1, "a done"), remote_a, Messages::failure("a failed"));
        let b = opt.apply([2], |s| relabel(s, 2, "b done"), remote_b, Messages::failure("b failed"));
        assert_eq!(cell.get(), vec![row(1, "a done"), row(2, "b done")]);

        tx_b.send(Ok(())).unwrap();
        assert!(block_on(b).is_committed());

        tx_a.send(Err("boom".to_string())).unwrap();
        assert_eq!(block_on(a), Settlement::RolledBack);
        assert_eq!(cell.get(), vec![row(1, "a"), row(2, "b done")]);
        assert_eq!(notes.seen(), vec!["err: a failed"]);
    }

    #[test]
    fn test_failed_removal_reinserts_row_without_undoing_later_writes() {
        let (opt, cell, _notes, _guard) = coordinator();
        cell.set(vec![row(1, "a"), row(2, "b"), row(3, "c")]);
        let (tx, remote) = pending();

        let settle = opt.apply([2], |s| s.retain(|r| r.id != 2), remote, Messages::failure("Could not delete"));
        // A create and an edit land while the delete is in flight.
        cell.mutate(|s| {
            s.push(row(4, "new"));
            relabel(s, 3, "c edited");
        });

        tx.send(Err("409".to_string())).unwrap();
        assert_eq!(block_on(settle), Settlement::RolledBack);
        assert_eq!(
            cell.get(),
            vec![row(1, "a"), row(2, "b"), row(3, "c edited"), row(4, "new")]
        );
    }

    #[test]
    fn test_failed_insert_drops_placeholder_row() {
        let (opt, cell, _notes, _guard) = coordinator();
        cell.set(vec![row(1, "a")]);

        let outcome = block_on(opt.apply(
            [9],
            |s| s.insert(0, row(9, "tmp")),
            async { Err::<(), _>("offline") },
            Messages::failure("Could not add"),
        ));

        assert_eq!(outcome, Settlement::RolledBack);
        assert_eq!(cell.get(), vec![row(1, "a")]);
    }

    #[test]
    fn test_overlapping_calls_on_one_row_last_revert_wins() {
        let (opt, cell, _notes, _guard) = coordinator();
        cell.set(vec![row(1, "idle")]);
        let (tx_a, remote_a) = pending();
        let (tx_b, remote_b) = pending();

        let a = opt.apply([1], |s| relabel(s, 1, "first"), remote_a, Messages::failure("a failed"));
        let b = opt.apply([1], |s| relabel(s, 1, "second"), remote_b, Messages::failure("b failed"));

        tx_b.send(Err("boom".to_string())).unwrap();
        assert_eq!(block_on(b), Settlement::RolledBack);
        assert_eq!(cell.get(), vec![row(1, "first")]);

        tx_a.send(Ok(())).unwrap();
        assert!(block_on(a).is_committed());
        assert_eq!(cell.get(), vec![row(1, "first")]);
    }
}
