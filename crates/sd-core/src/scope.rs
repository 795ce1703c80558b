//! Scope resolution: which elements does a batch edit touch?
//!
//! A UI edit names an anchor element, a property, and a `Scope`. The
//! resolver expands that into the ordered list of element ids to mutate.
//! Group scopes never include locked elements; `OnlyThisObject` returns
//! the anchor as-is and leaves the locked check to the caller.

use crate::id::ElementId;
use crate::math::vec3_approx_eq;
use crate::model::{Element, ElementKind, ElementType, Property, PropertyValue};
use crate::scene::SceneStore;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which elements a batch edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    OnlyThisObject,
    AllSelectedObjectsOfThisType,
    AllObjectsOfThisType,
    /// Same `foundation_id` as the anchor.
    AllObjectsOfThisTypeAboveFoundation,
    /// Same parent as the anchor.
    OnlyThisSide,
    /// Walls joined to the anchor, transitively. Other types fall back
    /// to `OnlyThisSide`.
    AllConnectedObjects,
    /// Same parent and the same surface normal as the anchor.
    AllObjectsOfThisTypeOnSurface,
}

impl Scope {
    pub fn is_group(self) -> bool {
        self != Scope::OnlyThisObject
    }
}

/// A resolved scope: the ids to mutate plus the common ancestor that
/// names the group, if the scope has one.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub anchor: ElementId,
    pub scope: Scope,
    pub ids: Vec<ElementId>,
    pub group_id: Option<ElementId>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// `resolve_scope` plus the group id: the anchor's foundation for
/// foundation-wide scopes, its parent for side and surface scopes.
pub fn resolve(
    store: &dyn SceneStore,
    anchor: ElementId,
    scope: Scope,
    element_type: ElementType,
    tol: f64,
) -> Resolution {
    let ids = resolve_scope(store, anchor, scope, element_type, tol);
    let group_id = match scope {
        Scope::AllObjectsOfThisTypeAboveFoundation => {
            store.element(anchor).and_then(|e| e.foundation_id)
        }
        Scope::OnlyThisSide | Scope::AllConnectedObjects | Scope::AllObjectsOfThisTypeOnSurface => {
            store.parent_of(anchor)
        }
        _ => None,
    };
    Resolution {
        anchor,
        scope,
        ids,
        group_id,
    }
}

/// Resolve `scope` around `anchor` into the ids to mutate, in store order.
///
/// Returns an empty list if the anchor doesn't exist.
pub fn resolve_scope(
    store: &dyn SceneStore,
    anchor: ElementId,
    scope: Scope,
    element_type: ElementType,
    tol: f64,
) -> Vec<ElementId> {
    let Some(anchor_el) = store.element(anchor) else {
        return Vec::new();
    };
    let anchor_parent = store.parent_of(anchor);

    let candidates = |pred: &dyn Fn(&Element) -> bool| -> Vec<ElementId> {
        store
            .element_ids()
            .into_iter()
            .filter_map(|id| store.element(id))
            .filter(|e| !e.locked && e.element_type() == element_type && pred(e))
            .map(|e| e.id)
            .collect()
    };

    match scope {
        Scope::OnlyThisObject => vec![anchor],
        Scope::AllSelectedObjectsOfThisType => {
            let selected = store.selected_ids();
            candidates(&|e| selected.contains(&e.id))
        }
        Scope::AllObjectsOfThisType => candidates(&|_| true),
        Scope::AllObjectsOfThisTypeAboveFoundation => {
            let foundation = anchor_el.foundation_id;
            candidates(&|e| e.foundation_id == foundation)
        }
        Scope::OnlyThisSide => candidates(&|e| store.parent_of(e.id) == anchor_parent),
        Scope::AllConnectedObjects => {
            if anchor_el.element_type() == ElementType::Wall {
                let connected = connected_walls(store, anchor);
                candidates(&|e| connected.contains(&e.id))
            } else {
                candidates(&|e| store.parent_of(e.id) == anchor_parent)
            }
        }
        Scope::AllObjectsOfThisTypeOnSurface => {
            let normal = anchor_el.normal;
            candidates(&|e| {
                store.parent_of(e.id) == anchor_parent && vec3_approx_eq(&e.normal, &normal, tol)
            })
        }
    }
}

/// Every wall reachable from `anchor` through shared joins, the anchor
/// included.
pub fn connected_walls(store: &dyn SceneStore, anchor: ElementId) -> HashSet<ElementId> {
    let mut graph: UnGraph<ElementId, ()> = UnGraph::new_undirected();
    let mut index: HashMap<ElementId, NodeIndex> = HashMap::new();
    let mut node = |graph: &mut UnGraph<ElementId, ()>, id: ElementId| {
        *index.entry(id).or_insert_with(|| graph.add_node(id))
    };

    for id in store.element_ids() {
        let Some(ElementKind::Wall {
            left_join,
            right_join,
        }) = store.element(id).map(|e| &e.kind)
        else {
            continue;
        };
        let a = node(&mut graph, id);
        for joined in [left_join, right_join].into_iter().flatten() {
            if store.element(*joined).is_some() {
                let b = node(&mut graph, *joined);
                graph.update_edge(a, b, ());
            }
        }
    }

    let mut reached = HashSet::new();
    let Some(&start) = index.get(&anchor) else {
        return reached;
    };
    let mut bfs = Bfs::new(&graph, start);
    while let Some(nx) = bfs.next(&graph) {
        reached.insert(graph[nx]);
    }
    reached
}

/// Whether setting `property` to `value` would change at least one of
/// `ids`. Numbers compare within `tol`; flags and text exactly. Elements
/// that don't carry the property are ignored.
pub fn need_change(
    store: &dyn SceneStore,
    ids: &[ElementId],
    property: Property,
    value: &PropertyValue,
    tol: f64,
) -> bool {
    ids.iter()
        .filter_map(|id| store.element(*id))
        .filter_map(|e| e.property(property))
        .any(|current| !current.approx_eq(value, tol))
}
