//! Category Manager - cached category forest
//!
//! The cache holds one immutable [`CategoryTree`] snapshot. Population builds
//! the complete snapshot first and swaps it in under the write lock, so
//! readers see either the previous tree or the new one, never a mix.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::{Category, CategoryTree};
use crate::types::CategoryId;

/// Shared handle to the cached category tree
#[derive(Clone, Default)]
pub struct CategoryManager {
    tree: Arc<RwLock<Option<Arc<CategoryTree>>>>,
}

impl std::fmt::Debug for CategoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryManager")
            .field("categories_count", &self.len())
            .finish()
    }
}

impl CategoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until a tree has been populated
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_none()
    }

    /// Replaces the whole cached tree
    pub fn populate(&self, tree: CategoryTree) {
        let count = tree.len();
        *self.tree.write() = Some(Arc::new(tree));
        tracing::info!("CategoryManager: loaded {} categories", count);
    }

    /// Forgets the cached tree
    pub fn reset(&self) {
        *self.tree.write() = None;
    }

    /// Current snapshot, if any
    pub fn snapshot(&self) -> Option<Arc<CategoryTree>> {
        self.tree.read().clone()
    }

    pub fn len(&self) -> usize {
        self.tree.read().as_ref().map(|t| t.len()).unwrap_or(0)
    }

    /// Root categories; with `active_only` a filtered copy holding only path-active nodes
    pub fn get_category_tree(&self, active_only: bool) -> Vec<Arc<Category>> {
        self.snapshot()
            .map(|tree| tree.roots(active_only))
            .unwrap_or_default()
    }

    /// Cached categories for `ids`, in request order; unknown ids are skipped
    pub fn get_categories(&self, ids: &[CategoryId], active_only: bool) -> Vec<Arc<Category>> {
        let Some(tree) = self.snapshot() else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| tree.get(*id))
            .filter(|c| !active_only || c.is_path_active())
            .cloned()
            .collect()
    }

    pub fn get_category(&self, id: CategoryId, active_only: bool) -> Option<Arc<Category>> {
        let tree = self.snapshot()?;
        tree.get(id)
            .filter(|c| !active_only || c.is_path_active())
            .cloned()
    }

    pub fn get_parent(&self, category: &Category) -> Option<Arc<Category>> {
        self.get_category(category.parent_id()?, false)
    }

    /// Ancestry from the root down to `id`; empty for unknown ids
    pub fn get_path(&self, id: CategoryId) -> Vec<Arc<Category>> {
        let Some(tree) = self.snapshot() else {
            return Vec::new();
        };
        let mut path = Vec::new();
        let mut current = tree.get(id).cloned();
        while let Some(category) = current {
            current = category.parent_id().and_then(|p| tree.get(p).cloned());
            path.push(category);
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::RawCategory;
    use serde_json::json;

    fn tree(json: serde_json::Value) -> CategoryTree {
        let raw: Vec<RawCategory> = serde_json::from_value(json).unwrap();
        CategoryTree::from_raw(raw).unwrap()
    }

    fn sample() -> CategoryTree {
        tree(json!([
            { "id": 1, "name": "Women", "active": true, "sub_categories": [
                { "id": 10, "name": "Shoes", "active": false, "sub_categories": [
                    { "id": 100, "name": "Boots", "active": true }
                ]},
                { "id": 11, "name": "Bags", "active": true }
            ]},
            { "id": 2, "name": "Men", "active": true }
        ]))
    }

    #[test]
    fn test_empty_manager() {
        let manager = CategoryManager::new();
        assert!(manager.is_empty());
        assert!(manager.get_category_tree(false).is_empty());
        assert!(manager.get_category(1, false).is_none());
        assert!(manager.get_categories(&[1, 2], false).is_empty());
    }

    #[test]
    fn test_active_tree_never_contains_inactive_paths() {
        let manager = CategoryManager::new();
        manager.populate(sample());

        fn walk(category: &Arc<Category>, seen: &mut Vec<CategoryId>) {
            assert!(category.is_path_active());
            seen.push(category.id());
            for child in category.sub_categories(false) {
                walk(&child, seen);
            }
        }

        let mut seen = Vec::new();
        for root in manager.get_category_tree(true) {
            walk(&root, &mut seen);
        }
        seen.sort();
        assert_eq!(seen, vec![1, 2, 11]);

        // cached tree untouched by filtering
        assert_eq!(manager.get_category(10, false).unwrap().sub_categories(false).len(), 1);
    }

    #[test]
    fn test_get_categories_order_and_missing_ids() {
        let manager = CategoryManager::new();
        manager.populate(sample());

        let ids: Vec<_> = manager
            .get_categories(&[11, 999, 1, 100], false)
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids, vec![11, 1, 100]);

        let active: Vec<_> = manager
            .get_categories(&[11, 999, 1, 100], true)
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(active, vec![11, 1]);

        assert!(manager.get_category(100, true).is_none());
        assert!(manager.get_category(100, false).is_some());
    }

    #[test]
    fn test_populate_replaces_whole_tree() {
        let manager = CategoryManager::new();
        manager.populate(sample());
        manager.populate(tree(json!([{ "id": 3, "name": "Kids" }])));

        assert_eq!(manager.len(), 1);
        assert!(manager.get_category(1, false).is_none());
        assert_eq!(manager.get_category(3, true).unwrap().name(), "Kids");

        manager.reset();
        assert!(manager.is_empty());
    }

    #[test]
    fn test_parent_and_path() {
        let manager = CategoryManager::new();
        manager.populate(sample());

        let boots = manager.get_category(100, false).unwrap();
        assert_eq!(manager.get_parent(&boots).unwrap().id(), 10);

        let path: Vec<_> = manager.get_path(100).iter().map(|c| c.id()).collect();
        assert_eq!(path, vec![1, 10, 100]);
        assert!(manager.get_path(12345).is_empty());
    }

    #[test]
    fn test_clones_share_cache() {
        let manager = CategoryManager::new();
        let handle = manager.clone();
        manager.populate(sample());
        assert!(!handle.is_empty());
    }
}
