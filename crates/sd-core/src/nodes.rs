//! Render-side group membership.
//!
//! The renderer keeps one scene node per element, nested under the node of
//! the element's parent so it inherits the parent's transform. When the
//! engine detaches a child to the Ground (or undo re-attaches it) the
//! renderer must move that node too. The engine does this explicitly
//! through `NodeGroups::reattach`, so undo can call it in reverse.

use crate::id::ElementId;
use crate::scene::SceneStore;
use std::collections::HashMap;

/// Moves rendered nodes between parent groups.
pub trait NodeGroups {
    /// Move `child` from `from`'s group into `to`'s group.
    ///
    /// Idempotent: returns `false` and does nothing when the node is
    /// already under `to`.
    fn reattach(&mut self, child: ElementId, from: ElementId, to: ElementId) -> bool;
}

/// An explicit id → group registry.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    groups: HashMap<ElementId, ElementId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the parent links of every element in `store`.
    pub fn from_store(store: &dyn SceneStore) -> Self {
        let groups = store
            .element_ids()
            .into_iter()
            .filter_map(|id| store.parent_of(id).map(|parent| (id, parent)))
            .collect();
        Self { groups }
    }

    pub fn register(&mut self, child: ElementId, group: ElementId) {
        self.groups.insert(child, group);
    }

    /// The group `child` currently renders under.
    pub fn group_of(&self, child: ElementId) -> Option<ElementId> {
        self.groups.get(&child).copied()
    }
}

impl NodeGroups for NodeRegistry {
    fn reattach(&mut self, child: ElementId, from: ElementId, to: ElementId) -> bool {
        let current = self.group_of(child);
        if current == Some(to) {
            return false;
        }
        if current.is_some_and(|g| g != from) {
            log::warn!(
                "node {child} expected under {from} but found under {:?}",
                current
            );
        }
        log::trace!("reattach node {child}: {from} -> {to}");
        self.groups.insert(child, to);
        true
    }
}
