//! The scene graph store.
//!
//! `SceneStore` is the narrow read/write capability the mutation engine
//! works against. Every write touches a single element and is idempotent;
//! the engine sequences them itself inside one synchronous mutation.
//!
//! `SceneGraph` is the in-memory implementation: a petgraph tree whose
//! edges go parent → child, rooted at the Ground node.

use crate::error::{Result, SceneError};
use crate::id::ElementId;
use crate::math::{Point2, Vec3};
use crate::model::{Attachment, Element, ElementKind, ElementType, Property, PropertyValue};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::{HashMap, HashSet};

// ─── Capability trait ────────────────────────────────────────────────────

/// Read/write access to the live element collection.
pub trait SceneStore {
    /// Look up an element. The Ground is not an element.
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// All elements, in insertion order.
    fn element_ids(&self) -> Vec<ElementId>;

    /// Direct children of `parent` (which may be the Ground).
    fn children(&self, parent: ElementId) -> Vec<ElementId>;

    /// The parent id, `GROUND_ID` for top-level elements.
    fn parent_of(&self, id: ElementId) -> Option<ElementId>;

    /// The current selection.
    fn selected_ids(&self) -> HashSet<ElementId>;

    fn set_position(&mut self, id: ElementId, position: Vec3) -> Result<()>;

    /// Move `id` under `attachment.parent` and cache its foundation link.
    fn set_parent(&mut self, id: ElementId, attachment: Attachment) -> Result<()>;

    fn set_extent(
        &mut self,
        id: ElementId,
        lx: Option<f64>,
        ly: Option<f64>,
        lz: Option<f64>,
    ) -> Result<()>;

    fn set_vertices(&mut self, id: ElementId, vertices: Vec<Point2>) -> Result<()>;

    fn set_property(&mut self, id: ElementId, property: Property, value: &PropertyValue)
    -> Result<()>;

    /// Parent plus cached foundation link.
    fn attachment(&self, id: ElementId) -> Option<Attachment> {
        let element = self.element(id)?;
        Some(Attachment {
            parent: self.parent_of(id)?,
            foundation: element.foundation_id,
        })
    }
}

// ─── In-memory graph ─────────────────────────────────────────────────────

/// A design as a tree of `Element`s.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// The underlying directed graph.
    pub graph: StableDiGraph<Element, ()>,

    /// The Ground node index.
    pub ground: NodeIndex,

    /// Index from ElementId → NodeIndex for fast lookup.
    id_index: HashMap<ElementId, NodeIndex>,

    /// Ids currently selected in the UI.
    selection: HashSet<ElementId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create an empty scene containing only the Ground.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let ground_id = ElementId::ground();
        let ground = graph.add_node(Element::new(ground_id, ElementKind::Ground).sized(0.0, 0.0, 0.0));

        let mut id_index = HashMap::new();
        id_index.insert(ground_id, ground);

        Self {
            graph,
            ground,
            id_index,
            selection: HashSet::new(),
        }
    }

    /// Add `element` under `parent`, deriving its foundation link.
    pub fn insert(&mut self, parent: ElementId, mut element: Element) -> Result<()> {
        if self.id_index.contains_key(&element.id) {
            return Err(SceneError::DuplicateElement(element.id));
        }
        let parent_idx = self
            .index_of(parent)
            .ok_or(SceneError::UnknownElement(parent))?;
        element.foundation_id = self.foundation_for_parent(parent_idx);

        let id = element.id;
        let idx = self.graph.add_node(element);
        self.graph.add_edge(parent_idx, idx, ());
        self.id_index.insert(id, idx);
        Ok(())
    }

    /// Get the index for an ElementId (the Ground included).
    pub fn index_of(&self, id: ElementId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Look up an element mutably. The Ground is not reachable here.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let idx = self.index_of(id).filter(|idx| *idx != self.ground)?;
        Some(&mut self.graph[idx])
    }

    pub fn select(&mut self, id: ElementId) {
        self.selection.insert(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> Result<()> {
        self.checked_mut(id)?.locked = locked;
        Ok(())
    }

    /// Number of elements, not counting the Ground.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parent_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// The foundation link a child of `parent_idx` should carry.
    fn foundation_for_parent(&self, parent_idx: NodeIndex) -> Option<ElementId> {
        let parent = &self.graph[parent_idx];
        match parent.element_type() {
            ElementType::Foundation => Some(parent.id),
            _ => parent.foundation_id,
        }
    }

    fn checked_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        if id.is_ground() {
            return Err(SceneError::GroundImmutable);
        }
        self.element_mut(id).ok_or(SceneError::UnknownElement(id))
    }
}

impl SceneStore for SceneGraph {
    fn element(&self, id: ElementId) -> Option<&Element> {
        let idx = self.index_of(id).filter(|idx| *idx != self.ground)?;
        Some(&self.graph[idx])
    }

    fn element_ids(&self) -> Vec<ElementId> {
        let mut indices: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| *idx != self.ground)
            .collect();
        indices.sort();
        indices.into_iter().map(|idx| self.graph[idx].id).collect()
    }

    /// Sorted by `NodeIndex`, which is insertion order.
    fn children(&self, parent: ElementId) -> Vec<ElementId> {
        let Some(parent_idx) = self.index_of(parent) else {
            return Vec::new();
        };
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(parent_idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children.into_iter().map(|idx| self.graph[idx].id).collect()
    }

    fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        let idx = self.index_of(id)?;
        self.parent_index(idx).map(|p| self.graph[p].id)
    }

    fn selected_ids(&self) -> HashSet<ElementId> {
        self.selection.clone()
    }

    fn set_position(&mut self, id: ElementId, position: Vec3) -> Result<()> {
        self.checked_mut(id)?.set_position(position);
        Ok(())
    }

    fn set_parent(&mut self, id: ElementId, attachment: Attachment) -> Result<()> {
        if id.is_ground() {
            return Err(SceneError::GroundImmutable);
        }
        let child = self.index_of(id).ok_or(SceneError::UnknownElement(id))?;
        let new_parent = self
            .index_of(attachment.parent)
            .ok_or(SceneError::UnknownElement(attachment.parent))?;

        if self.parent_index(child) != Some(new_parent) {
            if let Some(old_parent) = self.parent_index(child)
                && let Some(edge) = self.graph.find_edge(old_parent, child)
            {
                self.graph.remove_edge(edge);
            }
            self.graph.add_edge(new_parent, child, ());
        }
        self.graph[child].foundation_id = attachment.foundation;
        Ok(())
    }

    fn set_extent(
        &mut self,
        id: ElementId,
        lx: Option<f64>,
        ly: Option<f64>,
        lz: Option<f64>,
    ) -> Result<()> {
        let element = self.checked_mut(id)?;
        if let Some(lx) = lx {
            element.lx = lx;
        }
        if let Some(ly) = ly {
            element.ly = ly;
        }
        if let Some(lz) = lz {
            element.lz = lz;
        }
        Ok(())
    }

    fn set_vertices(&mut self, id: ElementId, vertices: Vec<Point2>) -> Result<()> {
        let element = self.checked_mut(id)?;
        match &mut element.kind {
            ElementKind::Polygon { vertices: v } => {
                *v = vertices;
                Ok(())
            }
            _ => Err(SceneError::NotPolygon(id)),
        }
    }

    fn set_property(
        &mut self,
        id: ElementId,
        property: Property,
        value: &PropertyValue,
    ) -> Result<()> {
        self.checked_mut(id)?.set_property(property, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    fn sample() -> SceneGraph {
        let mut scene = SceneGraph::new();
        scene
            .insert(
                ElementId::ground(),
                Element::new(id("scene_f"), ElementKind::foundation()).sized(10.0, 10.0, 1.0),
            )
            .unwrap();
        scene
            .insert(id("scene_f"), Element::new(id("scene_w"), ElementKind::wall()))
            .unwrap();
        scene
            .insert(
                id("scene_w"),
                Element::new(id("scene_win"), ElementKind::Window { u_value: 2.0 }),
            )
            .unwrap();
        scene
    }

    #[test]
    fn insert_derives_foundation_link() {
        let scene = sample();
        assert_eq!(scene.element(id("scene_f")).unwrap().foundation_id, None);
        assert_eq!(
            scene.element(id("scene_w")).unwrap().foundation_id,
            Some(id("scene_f"))
        );
        // Window on a wall on a foundation.
        assert_eq!(
            scene.element(id("scene_win")).unwrap().foundation_id,
            Some(id("scene_f"))
        );
        assert_eq!(scene.parent_of(id("scene_win")), Some(id("scene_w")));
    }

    #[test]
    fn duplicate_insert_fails() {
        let mut scene = sample();
        let err = scene
            .insert(
                ElementId::ground(),
                Element::new(id("scene_f"), ElementKind::Cuboid),
            )
            .unwrap_err();
        assert_eq!(err, SceneError::DuplicateElement(id("scene_f")));
    }

    #[test]
    fn ground_is_not_an_element() {
        let mut scene = sample();
        assert!(scene.element(ElementId::ground()).is_none());
        assert!(!scene.element_ids().contains(&ElementId::ground()));
        assert_eq!(
            scene.set_position(ElementId::ground(), Vec3::zeros()),
            Err(SceneError::GroundImmutable)
        );
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn set_parent_moves_edge_and_link() {
        let mut scene = sample();
        scene.set_parent(id("scene_w"), Attachment::ground()).unwrap();
        assert_eq!(scene.parent_of(id("scene_w")), Some(ElementId::ground()));
        assert_eq!(scene.element(id("scene_w")).unwrap().foundation_id, None);
        assert!(scene.children(id("scene_f")).is_empty());

        // Idempotent.
        scene.set_parent(id("scene_w"), Attachment::ground()).unwrap();
        assert_eq!(scene.children(ElementId::ground()).len(), 2);
    }

    #[test]
    fn children_in_insertion_order() {
        let mut scene = sample();
        scene
            .insert(id("scene_f"), Element::new(id("scene_t"), ElementKind::Tree))
            .unwrap();
        assert_eq!(
            scene.children(id("scene_f")),
            vec![id("scene_w"), id("scene_t")]
        );
    }

    #[test]
    fn set_vertices_requires_polygon() {
        let mut scene = sample();
        let err = scene.set_vertices(id("scene_w"), vec![]).unwrap_err();
        assert_eq!(err, SceneError::NotPolygon(id("scene_w")));
    }
}
