//! Category Model

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::types::CategoryId;

/// Default for accessors that filter by activity
pub const ACTIVE_ONLY: bool = true;

/// Raw category node of the `category_tree` section
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawCategory {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub sub_categories: Vec<RawCategory>,
}

fn default_true() -> bool {
    true
}

/// Category node.
///
/// Children are owned by their parent; the parent is referenced by id and
/// resolved through the category manager.
#[derive(Debug, Clone)]
pub struct Category {
    id: CategoryId,
    name: String,
    active: bool,
    position: i64,
    parent_id: Option<CategoryId>,
    path_active: bool,
    sub_categories: Vec<Arc<Category>>,
}

impl Category {
    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True iff this category and all of its ancestors are active
    pub fn is_path_active(&self) -> bool {
        self.path_active
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn sub_categories(&self, active_only: bool) -> Vec<Arc<Category>> {
        self.sub_categories
            .iter()
            .filter(|c| !active_only || c.path_active)
            .cloned()
            .collect()
    }

    pub fn has_sub_categories(&self, active_only: bool) -> bool {
        self.sub_categories
            .iter()
            .any(|c| !active_only || c.path_active)
    }

    /// Copy of this subtree without path-inactive nodes
    fn active_copy(&self) -> Option<Arc<Category>> {
        if !self.path_active {
            return None;
        }
        Some(Arc::new(Category {
            sub_categories: self
                .sub_categories
                .iter()
                .filter_map(|c| c.active_copy())
                .collect(),
            ..self.clone()
        }))
    }
}

/// Immutable snapshot of one fetched category forest
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    roots: Vec<Arc<Category>>,
    index: HashMap<CategoryId, Arc<Category>>,
}

impl CategoryTree {
    /// Builds the forest, deriving parent links and path activity.
    ///
    /// Fails on duplicate ids.
    pub(crate) fn from_raw(raw: Vec<RawCategory>) -> Result<Self, String> {
        let mut index = HashMap::new();
        let mut roots = Vec::with_capacity(raw.len());
        for node in raw {
            roots.push(build_node(node, None, true, &mut index)?);
        }
        roots.sort_by_key(|c| c.position);
        Ok(Self { roots, index })
    }

    pub fn roots(&self, active_only: bool) -> Vec<Arc<Category>> {
        if active_only {
            self.roots.iter().filter_map(|c| c.active_copy()).collect()
        } else {
            self.roots.clone()
        }
    }

    pub fn get(&self, id: CategoryId) -> Option<&Arc<Category>> {
        self.index.get(&id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of path-active root categories
    pub fn count_active_roots(&self) -> usize {
        self.roots.iter().filter(|c| c.path_active).count()
    }
}

fn build_node(
    raw: RawCategory,
    parent_id: Option<CategoryId>,
    parent_path_active: bool,
    index: &mut HashMap<CategoryId, Arc<Category>>,
) -> Result<Arc<Category>, String> {
    if index.contains_key(&raw.id) {
        return Err(format!("duplicate category id {}", raw.id));
    }
    let path_active = parent_path_active && raw.active;

    let mut sub_categories = Vec::with_capacity(raw.sub_categories.len());
    for child in raw.sub_categories {
        sub_categories.push(build_node(child, Some(raw.id), path_active, index)?);
    }
    sub_categories.sort_by_key(|c| c.position);

    let category = Arc::new(Category {
        id: raw.id,
        name: raw.name,
        active: raw.active,
        position: raw.position,
        parent_id,
        path_active,
        sub_categories,
    });
    // a descendant may have claimed the id while the subtree was built
    if index.insert(category.id, category.clone()).is_some() {
        return Err(format!("duplicate category id {}", category.id));
    }
    Ok(category)
}
