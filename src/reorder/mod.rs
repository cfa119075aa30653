//! Drag-and-drop reordering as a plain state machine.
//!
//! Input events (HTML5 drag events, keyboard, tests) drive the engine; the
//! canonical order only changes on a successful drop, and the new order is
//! handed back to the caller to emit upward.

mod selection;

pub(crate) use selection::SelectionSet;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum DragState<Id> {
    #[default]
    Idle,
    Dragging { dragged: Id, over: Option<Id> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ReorderEngine<Id> {
    order: Vec<Id>,
    state: DragState<Id>,
}

impl<Id: Clone + PartialEq> Default for ReorderEngine<Id> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn dedup_in_place<Id: PartialEq>(ids: &mut Vec<Id>) {
    let mut i = 0;
    while i < ids.len() {
        if ids[..i].contains(&ids[i]) {
            ids.remove(i);
        } else {
            i += 1;
        }
    }
}

impl<Id: Clone + PartialEq> ReorderEngine<Id> {
    pub fn new(order: impl IntoIterator<Item = Id>) -> Self {
        let mut order: Vec<Id> = order.into_iter().collect();
        dedup_in_place(&mut order);
        Self {
            order,
            state: DragState::Idle,
        }
    }

    pub fn order(&self) -> &[Id] {
        &self.order
    }

    pub fn state(&self) -> &DragState<Id> {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn hovered(&self) -> Option<&Id> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Unknown ids leave the engine idle. Returns whether a drag started.
    pub fn begin_drag(&mut self, id: Id) -> bool {
        if !self.order.contains(&id) {
            self.state = DragState::Idle;
            return false;
        }
        self.state = DragState::Dragging {
            dragged: id,
            over: None,
        };
        true
    }

    pub fn hover(&mut self, id: Id) {
        if !self.order.contains(&id) {
            return;
        }
        if let DragState::Dragging { over, .. } = &mut self.state {
            if over.as_ref() != Some(&id) {
                *over = Some(id);
            }
        }
    }

    pub fn cancel_drag(&mut self) {
        self.state = DragState::Idle;
    }

    /// Finishes the gesture on `target`. Returns the new order only when it
    /// actually changed; drag state is cleared either way.
    pub fn drop_on(&mut self, target: &Id) -> Option<Vec<Id>> {
        let dragged = match std::mem::take(&mut self.state) {
            DragState::Dragging { dragged, .. } => dragged,
            DragState::Idle => return None,
        };
        let next = move_before(&self.order, &dragged, target)?;
        self.order = next.clone();
        Some(next)
    }

    /// Drop on the tail zone below the last row.
    pub fn drop_at_end(&mut self) -> Option<Vec<Id>> {
        let dragged = match std::mem::take(&mut self.state) {
            DragState::Dragging { dragged, .. } => dragged,
            DragState::Idle => return None,
        };
        let next = move_to_end(&self.order, &dragged)?;
        self.order = next.clone();
        Some(next)
    }

    /// Syncs the canonical order with the current item set: vanished ids are
    /// dropped, new ids appended. A drag whose item vanished is cancelled.
    pub fn reconcile(&mut self, ids: impl IntoIterator<Item = Id>) {
        let mut current: Vec<Id> = ids.into_iter().collect();
        dedup_in_place(&mut current);

        let mut next: Vec<Id> = self
            .order
            .iter()
            .filter(|id| current.contains(id))
            .cloned()
            .collect();
        for id in current {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        self.order = next;

        let keep = match &self.state {
            DragState::Dragging { dragged, .. } => self.order.contains(dragged),
            DragState::Idle => true,
        };
        if !keep {
            self.cancel_drag();
        } else if let DragState::Dragging { over, .. } = &mut self.state {
            if over.as_ref().is_some_and(|o| !self.order.contains(o)) {
                *over = None;
            }
        }
    }
}

/// Removes `dragged` and reinserts it immediately before `target`.
/// `None` when either id is missing or they are the same item.
pub(crate) fn move_before<Id: Clone + PartialEq>(
    order: &[Id],
    dragged: &Id,
    target: &Id,
) -> Option<Vec<Id>> {
    if dragged == target {
        return None;
    }
    let from = order.iter().position(|id| id == dragged)?;
    order.iter().position(|id| id == target)?;

    let mut next = order.to_vec();
    let moved = next.remove(from);
    let to = next.iter().position(|id| id == target)?;
    next.insert(to, moved);

    if next.as_slice() == order {
        None
    } else {
        Some(next)
    }
}

pub(crate) fn move_to_end<Id: Clone + PartialEq>(order: &[Id], dragged: &Id) -> Option<Vec<Id>> {
    let from = order.iter().position(|id| id == dragged)?;
    if from + 1 == order.len() {
        return None;
    }
    let mut next = order.to_vec();
    let moved = next.remove(from);
    next.push(moved);
    Some(next)
}

/// Writes a reordered subset (a filtered view) back into the full order: the
/// slots the subset occupied are refilled in the subset's new order.
pub(crate) fn merge_subset_order<Id: Clone + PartialEq>(full: &[Id], subset: &[Id]) -> Vec<Id> {
    let mut next_from_subset = subset.iter();
    full.iter()
        .map(|id| {
            if subset.contains(id) {
                next_from_subset.next().cloned().unwrap_or_else(|| id.clone())
            } else {
                id.clone()
            }
        })
        .collect()
}

/// Sorts `items` by a saved id order. Items missing from `order` keep their
/// incoming relative order after the known ones.
pub(crate) fn apply_order<T, Id: PartialEq>(
    items: Vec<T>,
    order: &[Id],
    id_of: impl Fn(&T) -> &Id,
) -> Vec<T> {
    let rank = |item: &T| {
        order
            .iter()
            .position(|id| id == id_of(item))
            .unwrap_or(usize::MAX)
    };
    let mut indexed: Vec<(usize, usize, T)> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (rank(&item), i, item))
        .collect();
    indexed.sort_by_key(|(r, i, _)| (*r, *i));
    indexed.into_iter().map(|(_, _, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(ids: &[&'static str]) -> ReorderEngine<&'static str> {
        ReorderEngine::new(ids.iter().copied())
    }

    #[test]
    fn test_drag_last_onto_first() {
        let mut e = engine(&["A", "B", "C"]);
        assert!(e.begin_drag("C"));
        e.hover("A");
        assert_eq!(e.drop_on(&"A"), Some(vec!["C", "A", "B"]));
        assert_eq!(e.order(), &["C", "A", "B"]);
        assert_eq!(e.state(), &DragState::Idle);
    }

    #[test]
    fn test_drag_down_lands_before_target() {
        let mut e = engine(&["A", "B", "C", "D"]);
        e.begin_drag("A");
        assert_eq!(e.drop_on(&"C"), Some(vec!["B", "A", "C", "D"]));
    }

    #[test]
    fn test_drop_on_self_is_noop() {
        let mut e = engine(&["A", "B", "C"]);
        e.begin_drag("B");
        e.hover("B");
        assert_eq!(e.drop_on(&"B"), None);
        assert_eq!(e.order(), &["A", "B", "C"]);
        assert!(!e.is_dragging());
    }

    #[test]
    fn test_drop_onto_next_neighbour_does_not_emit() {
        // A already sits right before B.
        let mut e = engine(&["A", "B", "C"]);
        e.begin_drag("A");
        assert_eq!(e.drop_on(&"B"), None);
        assert_eq!(e.order(), &["A", "B", "C"]);
    }

    #[test]
    fn test_drop_on_unknown_target_is_noop() {
        let mut e = engine(&["A", "B"]);
        e.begin_drag("A");
        assert_eq!(e.drop_on(&"Z"), None);
        assert_eq!(e.order(), &["A", "B"]);
        assert!(!e.is_dragging());
    }

    #[test]
    fn test_begin_drag_unknown_stays_idle() {
        let mut e = engine(&["A", "B"]);
        assert!(!e.begin_drag("Z"));
        assert_eq!(e.state(), &DragState::Idle);
        assert_eq!(e.drop_on(&"A"), None);
    }

    #[test]
    fn test_drop_without_drag_is_noop() {
        let mut e = engine(&["A", "B"]);
        assert_eq!(e.drop_on(&"A"), None);
        assert_eq!(e.drop_at_end(), None);
    }

    #[test]
    fn test_hover_is_idempotent_and_does_not_reorder() {
        let mut e = engine(&["A", "B", "C"]);
        e.begin_drag("A");
        e.hover("C");
        let snapshot = e.clone();
        e.hover("C");
        assert_eq!(e, snapshot);
        assert_eq!(e.hovered(), Some(&"C"));
        assert_eq!(e.order(), &["A", "B", "C"]);
    }

    #[test]
    fn test_hover_while_idle_is_ignored() {
        let mut e = engine(&["A", "B"]);
        e.hover("B");
        assert_eq!(e.state(), &DragState::Idle);
    }

    #[test]
    fn test_cancel_restores_idle_without_reordering() {
        let mut e = engine(&["A", "B", "C"]);
        e.begin_drag("A");
        e.hover("B");
        e.hover("C");
        e.begin_drag("B");
        e.hover("A");
        e.cancel_drag();
        assert_eq!(e.state(), &DragState::Idle);
        assert_eq!(e.order(), &["A", "B", "C"]);
    }

    #[test]
    fn test_drop_at_end() {
        let mut e = engine(&["A", "B", "C"]);
        e.begin_drag("A");
        assert_eq!(e.drop_at_end(), Some(vec!["B", "C", "A"]));

        e.begin_drag("A");
        assert_eq!(e.drop_at_end(), None);
        assert!(!e.is_dragging());
    }

    #[test]
    fn test_dragged_item_removed_mid_gesture_cancels() {
        let mut e = engine(&["A", "B", "C"]);
        e.begin_drag("B");
        e.hover("C");
        e.reconcile(["A", "C"]);
        assert_eq!(e.state(), &DragState::Idle);
        assert_eq!(e.drop_on(&"A"), None);
        assert_eq!(e.order(), &["A", "C"]);
    }

    #[test]
    fn test_hover_target_removed_mid_gesture_is_cleared() {
        let mut e = engine(&["A", "B", "C"]);
        e.begin_drag("A");
        e.hover("C");
        e.reconcile(["A", "B"]);
        assert!(e.is_dragging());
        assert_eq!(e.hovered(), None);
    }

    #[test]
    fn test_reconcile_keeps_order_and_appends_new() {
        let mut e = engine(&["C", "A", "B"]);
        e.reconcile(["A", "B", "C", "D", "D"]);
        assert_eq!(e.order(), &["C", "A", "B", "D"]);
    }

    #[test]
    fn test_new_removes_duplicates() {
        let e = engine(&["A", "B", "A"]);
        assert_eq!(e.order(), &["A", "B"]);
    }

    #[test]
    fn test_every_move_is_a_permutation_with_dragged_before_target() {
        let ids: Vec<u32> = (0..6).collect();
        for a in &ids {
            for b in &ids {
                if a == b {
                    continue;
                }
                let mut e = ReorderEngine::new(ids.clone());
                e.begin_drag(*a);
                let next = e.drop_on(b).unwrap_or_else(|| ids.clone());

                let mut sorted = next.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, ids, "drag {a} onto {b} lost or duplicated ids");

                let pa = next.iter().position(|x| x == a).unwrap();
                let pb = next.iter().position(|x| x == b).unwrap();
                assert_eq!(pa + 1, pb, "drag {a} onto {b} should land right before it");
            }
        }
    }

    #[test]
    fn test_merge_subset_order_keeps_hidden_rows_in_place() {
        // Visible: 1, 3, 5 (say, only "health" habits). User moved 5 first.
        let full = [1, 2, 3, 4, 5];
        assert_eq!(merge_subset_order(&full, &[5, 1, 3]), vec![5, 2, 1, 4, 3]);
        assert_eq!(merge_subset_order(&full, &[]), full.to_vec());
    }

    #[test]
    fn test_apply_order_sorts_known_and_appends_unknown() {
        let items = vec![(1, "a"), (2, "b"), (3, "c"), (4, "d")];
        let ordered = apply_order(items, &[3, 1, 99], |x| &x.0);
        let ids: Vec<i32> = ordered.iter().map(|x| x.0).collect();
        assert_eq!(ids, vec![3, 1, 2, 4]);
    }
}
