//! Selection model for placed components.

use crate::page::ComponentId;
use std::collections::HashSet;

/// The set of selected component ids. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: HashSet<ComponentId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a selection click.
    ///
    /// `None` clears. Without `multi_select` the selection becomes exactly
    /// `{id}`; with it `id` is added. Re-selecting an id never removes it.
    pub fn select(&mut self, id: Option<ComponentId>, multi_select: bool) {
        match id {
            None => self.selected.clear(),
            Some(id) if multi_select => {
                self.selected.insert(id);
            }
            Some(id) => {
                self.selected.clear();
                self.selected.insert(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop an id, e.g. when its component is removed from the page.
    pub fn remove(&mut self, id: ComponentId) -> bool {
        self.selected.remove(&id)
    }

    /// Keep only ids for which `exists` holds.
    pub fn retain_existing(&mut self, exists: impl Fn(ComponentId) -> bool) {
        self.selected.retain(|&id| exists(id));
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.selected.contains(&id)
    }

    pub fn ids(&self) -> &HashSet<ComponentId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_single_select_replaces() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = SelectionModel::new();
        selection.select(Some(a), false);
        selection.select(Some(b), false);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(b));
        assert!(!selection.contains(a));
    }

    #[test]
    fn test_multi_select_adds() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = SelectionModel::new();
        selection.select(Some(a), false);
        selection.select(Some(b), true);
        let expected: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(selection.ids(), &expected);
    }

    #[test]
    fn test_multi_select_is_idempotent() {
        let a = Uuid::new_v4();
        let mut selection = SelectionModel::new();
        selection.select(Some(a), true);
        selection.select(Some(a), true);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(a));
    }

    #[test]
    fn test_select_none_clears() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = SelectionModel::new();
        selection.select(Some(a), false);
        selection.select(Some(b), true);
        selection.select(None, false);
        assert!(selection.is_empty());

        selection.select(Some(a), false);
        selection.select(None, true);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_existing() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = SelectionModel::new();
        selection.select(Some(a), true);
        selection.select(Some(b), true);
        selection.retain_existing(|id| id == a);
        assert!(selection.contains(a));
        assert!(!selection.contains(b));
        assert!(selection.remove(a));
        assert!(!selection.remove(a));
    }
}
