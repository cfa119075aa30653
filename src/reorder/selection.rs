use std::collections::BTreeSet;

/// Ids marked for bulk actions. Always a subset of what is displayed once
/// `prune` has run against the current list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SelectionSet<Id: Ord> {
    ids: BTreeSet<Id>,
}

impl<Id: Ord> Default for SelectionSet<Id> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }
}

impl<Id: Ord + Clone> SelectionSet<Id> {
    pub fn toggle(&mut self, id: Id) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_all_selected(&self, displayed: &[Id]) -> bool {
        !displayed.is_empty() && displayed.iter().all(|id| self.ids.contains(id))
    }

    /// Selects everything displayed, or clears when that is already the case.
    pub fn toggle_all(&mut self, displayed: &[Id]) {
        if self.is_all_selected(displayed) {
            self.ids.clear();
        } else {
            self.ids = displayed.iter().cloned().collect();
        }
    }

    pub fn prune(&mut self, displayed: &[Id]) {
        self.ids.retain(|id| displayed.contains(id));
    }

    pub fn ids(&self) -> Vec<Id> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut s = SelectionSet::default();
        s.toggle(4);
        assert!(s.contains(&4));
        s.toggle(4);
        assert!(s.is_empty());
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let shown = [1, 2, 3];
        let mut s = SelectionSet::default();
        s.toggle(2);
        s.toggle_all(&shown);
        assert!(s.is_all_selected(&shown));
        assert_eq!(s.ids(), vec![1, 2, 3]);

        s.toggle_all(&shown);
        assert!(s.is_empty());
    }

    #[test]
    fn test_empty_list_is_never_all_selected() {
        let s: SelectionSet<i64> = SelectionSet::default();
        assert!(!s.is_all_selected(&[]));
    }

    #[test]
    fn test_prune_drops_removed_habits() {
        let mut s = SelectionSet::default();
        s.toggle_all(&[1, 2, 3]);
        s.prune(&[1, 3, 9]);
        assert_eq!(s.ids(), vec![1, 3]);
        assert_eq!(s.len(), 2);
    }
}
