use std::collections::HashSet;

use crate::models::{FoodRecord, RecordKey};

/// Whether anything is selected, as shown in the list header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    Selected(usize),
}

impl SelectionState {
    #[must_use]
    pub fn title(self) -> String {
        match self {
            SelectionState::Empty => "Foods".to_string(),
            SelectionState::Selected(n) => format!("{n} Foods Selected"),
        }
    }
}

/// Records the user has ticked, kept as value snapshots in the order they
/// were ticked.
///
/// While a transient view (search results, text filter) is open, additions
/// are also remembered separately so that closing the view without
/// committing can take them back out.
#[derive(Debug, Default)]
pub struct SelectionSet {
    order: Vec<RecordKey>,
    members: HashSet<RecordKey>,
    view: Option<HashSet<RecordKey>>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> SelectionState {
        if self.is_empty() {
            SelectionState::Empty
        } else {
            SelectionState::Selected(self.len())
        }
    }

    #[must_use]
    pub fn contains(&self, record: &FoodRecord) -> bool {
        self.members.contains(&RecordKey::new(record))
    }

    /// Add or remove the snapshot of `record`. Returns whether the set changed.
    pub fn toggle(&mut self, record: &FoodRecord, selected: bool) -> bool {
        let key = RecordKey::new(record);
        if selected {
            if self.members.contains(&key) {
                return false;
            }
            if let Some(view) = &mut self.view {
                view.insert(key.clone());
            }
            self.members.insert(key.clone());
            self.order.push(key);
            true
        } else {
            self.remove_key(&key)
        }
    }

    fn remove_key(&mut self, key: &RecordKey) -> bool {
        if !self.members.remove(key) {
            return false;
        }
        self.order.retain(|k| k != key);
        if let Some(view) = &mut self.view {
            view.remove(key);
        }
        true
    }

    /// Drop every selection whose record has the given store id.
    pub fn remove_id(&mut self, id: i64) -> usize {
        let doomed: Vec<RecordKey> = self
            .order
            .iter()
            .filter(|k| k.record().id == Some(id))
            .cloned()
            .collect();
        for key in &doomed {
            self.remove_key(key);
        }
        doomed.len()
    }

    /// Start tracking additions for a transient view. Already open views keep
    /// their tracked additions.
    pub fn open_view(&mut self) {
        if self.view.is_none() {
            self.view = Some(HashSet::new());
        }
    }

    /// Keep everything selected inside the current view and stop tracking.
    pub fn keep_view(&mut self) {
        self.view = None;
    }

    /// Close the current view, removing the selections made while it was open.
    /// Returns how many were dropped.
    pub fn discard_view(&mut self) -> usize {
        let Some(added) = self.view.take() else {
            return 0;
        };
        let before = self.order.len();
        self.order.retain(|k| !added.contains(k));
        self.members.retain(|k| !added.contains(k));
        before - self.order.len()
    }

    /// Snapshots in selection order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FoodRecord> {
        self.order.iter().map(|k| k.record().clone()).collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
        self.view = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrition;

    fn food(name: &str) -> FoodRecord {
        FoodRecord {
            name: name.to_string(),
            nutrition: Nutrition {
                calories: 10.0,
                ..Nutrition::default()
            },
            ..FoodRecord::default()
        }
    }

    #[test]
    fn test_toggle_roundtrip() {
        let mut sel = SelectionSet::new();
        sel.toggle(&food("Pear"), true);
        let before = sel.snapshot();

        assert!(sel.toggle(&food("Apple"), true));
        assert!(sel.toggle(&food("Apple"), false));
        assert_eq!(sel.snapshot(), before);
    }

    #[test]
    fn test_toggle_twice_is_noop() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(&food("Apple"), true));
        assert!(!sel.toggle(&food("Apple"), true));
        assert_eq!(sel.len(), 1);
        assert!(!sel.toggle(&food("Pear"), false));
    }

    #[test]
    fn test_selection_by_value_not_instance() {
        let mut sel = SelectionSet::new();
        let original = food("Apple");
        sel.toggle(&original, true);

        // A fresh copy of the same value (e.g. after a reload) is still selected
        let reloaded = food("Apple");
        assert!(sel.contains(&reloaded));

        // A changed value is a different snapshot
        let mut edited = food("Apple");
        edited.nutrition.calories = 11.0;
        assert!(!sel.contains(&edited));
    }

    #[test]
    fn test_preserves_selection_order() {
        let mut sel = SelectionSet::new();
        for name in ["c", "a", "b"] {
            sel.toggle(&food(name), true);
        }
        sel.toggle(&food("a"), false);
        sel.toggle(&food("a"), true);
        let names: Vec<String> = sel.snapshot().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_state_and_title() {
        let mut sel = SelectionSet::new();
        assert_eq!(sel.state(), SelectionState::Empty);
        assert_eq!(sel.state().title(), "Foods");
        sel.toggle(&food("a"), true);
        sel.toggle(&food("b"), true);
        assert_eq!(sel.state(), SelectionState::Selected(2));
        assert_eq!(sel.state().title(), "2 Foods Selected");
    }

    #[test]
    fn test_discard_view_drops_only_view_additions() {
        let mut sel = SelectionSet::new();
        sel.toggle(&food("kept"), true);

        sel.open_view();
        sel.toggle(&food("transient"), true);
        sel.toggle(&food("undone"), true);
        sel.toggle(&food("undone"), false);

        assert_eq!(sel.discard_view(), 1);
        // The view is closed now; a second discard finds nothing
        assert_eq!(sel.discard_view(), 0);
        let names: Vec<String> = sel.snapshot().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["kept"]);
    }

    #[test]
    fn test_unselect_prior_selection_inside_view_sticks() {
        let mut sel = SelectionSet::new();
        sel.toggle(&food("kept"), true);
        sel.open_view();
        sel.toggle(&food("kept"), false);
        assert_eq!(sel.discard_view(), 0);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_keep_view() {
        let mut sel = SelectionSet::new();
        sel.open_view();
        sel.toggle(&food("a"), true);
        sel.keep_view();
        assert_eq!(sel.discard_view(), 0);
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_reopening_view_keeps_tracking() {
        let mut sel = SelectionSet::new();
        sel.open_view();
        sel.toggle(&food("a"), true);
        sel.open_view();
        sel.toggle(&food("b"), true);
        assert_eq!(sel.discard_view(), 2);
    }

    #[test]
    fn test_remove_id() {
        let mut sel = SelectionSet::new();
        let mut stored = food("a");
        stored.id = Some(4);
        sel.toggle(&stored, true);
        sel.toggle(&food("b"), true);
        assert_eq!(sel.remove_id(4), 1);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.remove_id(4), 0);
    }
}
