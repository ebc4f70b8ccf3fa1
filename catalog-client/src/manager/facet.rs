//! Facet Manager - cached facets per facet group
//!
//! Unlike the category tree, facet groups are independent collections:
//! fetching a group replaces that group only.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::Facet;
use crate::types::{FacetGroupId, FacetId, IdList};

type FacetGroup = HashMap<FacetId, Arc<Facet>>;

/// Shared handle to the cached facet groups
#[derive(Clone, Default)]
pub struct FacetManager {
    groups: Arc<RwLock<HashMap<FacetGroupId, Arc<FacetGroup>>>>,
}

impl std::fmt::Debug for FacetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let groups = self.groups.read();
        f.debug_struct("FacetManager")
            .field("groups_count", &groups.len())
            .field("facets_count", &groups.values().map(|g| g.len()).sum::<usize>())
            .finish()
    }
}

impl FacetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until a facet group has been cached
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }

    /// Replaces the cached entries of every group in `fetched_groups` with the
    /// matching facets. An empty `fetched_groups` means "all groups", so the
    /// groups present in `facets` are replaced.
    pub fn populate(&self, fetched_groups: &[FacetGroupId], facets: Vec<Facet>) {
        let mut fresh: HashMap<FacetGroupId, FacetGroup> = fetched_groups
            .iter()
            .map(|group_id| (*group_id, FacetGroup::new()))
            .collect();
        let count = facets.len();
        for facet in facets {
            fresh
                .entry(facet.group_id)
                .or_default()
                .insert(facet.id, Arc::new(facet));
        }

        let mut groups = self.groups.write();
        for (group_id, facets) in fresh {
            groups.insert(group_id, Arc::new(facets));
        }
        drop(groups);
        tracing::info!("FacetManager: loaded {} facets", count);
    }

    /// Forgets every cached group
    pub fn reset(&self) {
        self.groups.write().clear();
    }

    /// Facet id -> facet for the requested groups; later groups win on id clashes
    pub fn get_facets_by_group_id(
        &self,
        group_ids: impl Into<IdList<FacetGroupId>>,
    ) -> BTreeMap<FacetId, Arc<Facet>> {
        let group_ids = group_ids.into();
        let groups = self.groups.read();
        let mut facets = BTreeMap::new();
        for group_id in group_ids.as_slice() {
            if let Some(group) = groups.get(group_id) {
                facets.extend(group.iter().map(|(id, f)| (*id, f.clone())));
            }
        }
        facets
    }

    pub fn get_facet(&self, group_id: FacetGroupId, facet_id: FacetId) -> Option<Arc<Facet>> {
        self.groups
            .read()
            .get(&group_id)
            .and_then(|group| group.get(&facet_id))
            .cloned()
    }

    pub fn has_group(&self, group_id: FacetGroupId) -> bool {
        self.groups.read().contains_key(&group_id)
    }

    /// Requested groups that are not cached yet, in request order
    pub fn missing_groups(&self, group_ids: &[FacetGroupId]) -> Vec<FacetGroupId> {
        let groups = self.groups.read();
        let mut missing = Vec::new();
        for group_id in group_ids {
            if !groups.contains_key(group_id) && !missing.contains(group_id) {
                missing.push(*group_id);
            }
        }
        missing
    }

    pub fn group_ids(&self) -> Vec<FacetGroupId> {
        let mut ids: Vec<_> = self.groups.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facet(group_id: FacetGroupId, id: FacetId, name: &str) -> Facet {
        Facet {
            id,
            group_id,
            name: name.to_string(),
            value: None,
            group_name: None,
            options: Vec::new(),
        }
    }

    #[test]
    fn test_populate_and_lookup() {
        let manager = FacetManager::new();
        assert!(manager.is_empty());

        manager.populate(&[], vec![facet(0, 264, "Nike"), facet(1, 570, "Rot"), facet(1, 571, "Blau")]);

        assert!(!manager.is_empty());
        assert_eq!(manager.get_facet(0, 264).unwrap().name, "Nike");
        assert!(manager.get_facet(0, 570).is_none());
        assert_eq!(manager.group_ids(), vec![0, 1]);

        let colors = manager.get_facets_by_group_id(1i64);
        assert_eq!(colors.keys().copied().collect::<Vec<_>>(), vec![570, 571]);

        let merged = manager.get_facets_by_group_id(vec![0i64, 1, 99]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_refetch_replaces_only_fetched_group() {
        let manager = FacetManager::new();
        manager.populate(&[], vec![facet(0, 264, "Nike"), facet(1, 570, "Rot")]);

        manager.populate(&[1], vec![facet(1, 572, "Gruen")]);

        assert!(manager.get_facet(1, 570).is_none());
        assert_eq!(manager.get_facet(1, 572).unwrap().name, "Gruen");
        assert_eq!(manager.get_facet(0, 264).unwrap().name, "Nike");
    }

    #[test]
    fn test_fetched_group_without_facets_is_cached_empty() {
        let manager = FacetManager::new();
        manager.populate(&[206], Vec::new());

        assert!(manager.has_group(206));
        assert!(manager.get_facets_by_group_id(206i64).is_empty());
        assert_eq!(manager.missing_groups(&[206, 5, 5, 0]), vec![5, 0]);
    }

    #[test]
    fn test_reset() {
        let manager = FacetManager::new();
        manager.populate(&[], vec![facet(0, 1, "Brand")]);
        manager.reset();
        assert!(manager.is_empty());
    }
}
