//! Container reshaping: legality gate and cascade planning.
//!
//! When a foundation (or cuboid) changes size or slope, its children must
//! be recomputed so they stay where they visually were:
//!
//! - footprint children (panels, batteries, reflectors, sensors) are
//!   denormalized against the old extent and re-normalized against the new
//!   one, so their absolute offset is unchanged. If any of them would no
//!   longer fit on the resized top face, the whole edit is rejected;
//! - polygons are handled vertex by vertex under the same rule;
//! - trees and people stuck to a face perpendicular to the resized axis
//!   follow that face; otherwise they fall off (detach to the Ground) once
//!   the face they stand on no longer reaches them;
//! - slope-following children re-run the height-on-slope formula.
//!
//! Locked children are neither checked nor moved.
//!
//! Planning is pure: `plan_cascade` reads the store and returns a
//! `Cascade` of old/new values, which is later replayed with
//! `Cascade::apply`. Nothing is written until the plan is accepted.

use crate::error::Result;
use crate::geometry::{
    Face, classify_face, denormalize_vertex, fits_within, footprint, ground_position,
    local_offset, normalize, normalize_vertex, slope_elevation,
};
use crate::id::ElementId;
use crate::math::{Point2, Vec2, Vec3};
use crate::model::{Attachment, Axis, ChildClass, Element, ElementType, Property, PropertyValue};
use crate::nodes::NodeGroups;
use crate::scene::SceneStore;
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Edits ───────────────────────────────────────────────────────────────

/// A container edit that cascades into children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryEdit {
    Resize { axis: Axis, value: f64 },
    Slope(f64),
    EnableSlope(bool),
}

impl GeometryEdit {
    /// Interpret a property write as a geometry edit, if it is one.
    pub fn from_property(property: Property, value: &PropertyValue) -> Option<Self> {
        match property {
            Property::Lx | Property::Ly | Property::Lz => Some(GeometryEdit::Resize {
                axis: property.axis()?,
                value: value.as_number()?,
            }),
            Property::Slope => Some(GeometryEdit::Slope(value.as_number()?)),
            Property::EnableSlope => Some(GeometryEdit::EnableSlope(value.as_flag()?)),
            _ => None,
        }
    }

    pub fn property(&self) -> Property {
        match self {
            GeometryEdit::Resize { axis: Axis::X, .. } => Property::Lx,
            GeometryEdit::Resize { axis: Axis::Y, .. } => Property::Ly,
            GeometryEdit::Resize { axis: Axis::Z, .. } => Property::Lz,
            GeometryEdit::Slope(_) => Property::Slope,
            GeometryEdit::EnableSlope(_) => Property::EnableSlope,
        }
    }

    pub fn value(&self) -> PropertyValue {
        match *self {
            GeometryEdit::Resize { value, .. } | GeometryEdit::Slope(value) => value.into(),
            GeometryEdit::EnableSlope(on) => on.into(),
        }
    }
}

/// A container edit refused because children would end up outside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub parent_id: ElementId,
    pub property: Property,
    pub attempted_value: PropertyValue,
    /// Children that would no longer fit.
    pub offending: SmallVec<[ElementId; 4]>,
}

// ─── Cascade ─────────────────────────────────────────────────────────────

/// Which half of a `Cascade` to write back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Before,
    After,
}

/// Per-child old/new values produced by one top-level edit.
///
/// Positions are in each child's stored frame for the parent it has on
/// that side of the edit. Only children that actually change appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cascade {
    pub old_positions: HashMap<ElementId, Vec3>,
    pub new_positions: HashMap<ElementId, Vec3>,
    pub old_parents: HashMap<ElementId, Attachment>,
    pub new_parents: HashMap<ElementId, Attachment>,
    pub old_vertices: HashMap<ElementId, Vec<Point2>>,
    pub new_vertices: HashMap<ElementId, Vec<Point2>>,
}

impl Cascade {
    pub fn is_empty(&self) -> bool {
        self.old_positions.is_empty() && self.old_parents.is_empty() && self.old_vertices.is_empty()
    }

    /// Fold another parent's cascade into this one.
    pub fn merge(&mut self, other: Cascade) {
        self.old_positions.extend(other.old_positions);
        self.new_positions.extend(other.new_positions);
        self.old_parents.extend(other.old_parents);
        self.new_parents.extend(other.new_parents);
        self.old_vertices.extend(other.old_vertices);
        self.new_vertices.extend(other.new_vertices);
    }

    /// Children this cascade moves to a different parent.
    pub fn reparented(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.new_parents.keys().copied().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    fn record_position(&mut self, id: ElementId, old: Vec3, new: Vec3) {
        if old != new {
            self.old_positions.insert(id, old);
            self.new_positions.insert(id, new);
        }
    }

    fn record_vertices(&mut self, id: ElementId, old: Vec<Point2>, new: Vec<Point2>) {
        if old != new {
            self.old_vertices.insert(id, old);
            self.new_vertices.insert(id, new);
        }
    }

    /// Write one side of the cascade back into the store. Parent links go
    /// first, together with the render-side node move, then positions and
    /// vertices. Pure replay: nothing is recomputed.
    pub fn apply(
        &self,
        store: &mut dyn SceneStore,
        nodes: &mut dyn NodeGroups,
        side: Snapshot,
    ) -> Result<()> {
        let (parents, positions, vertices) = match side {
            Snapshot::Before => (&self.old_parents, &self.old_positions, &self.old_vertices),
            Snapshot::After => (&self.new_parents, &self.new_positions, &self.new_vertices),
        };
        for (id, attachment) in parents {
            let from = store.parent_of(*id).unwrap_or_else(ElementId::ground);
            store.set_parent(*id, *attachment)?;
            nodes.reattach(*id, from, attachment.parent);
        }
        for (id, position) in positions {
            store.set_position(*id, *position)?;
        }
        for (id, verts) in vertices {
            store.set_vertices(*id, verts.clone())?;
        }
        Ok(())
    }
}

// ─── Planning ────────────────────────────────────────────────────────────

/// Plan how `edit` on `parent_id` cascades into its direct children.
///
/// Returns the rejection instead if any footprint or polygon child would
/// leave the parent's new top face. A missing or non-container parent
/// yields an empty cascade.
pub fn plan_cascade(
    store: &dyn SceneStore,
    parent_id: ElementId,
    edit: GeometryEdit,
    tol: f64,
) -> std::result::Result<Cascade, Rejection> {
    let Some(parent) = store.element(parent_id) else {
        return Ok(Cascade::default());
    };
    if !parent.element_type().is_container() {
        return Ok(Cascade::default());
    }

    let ctx = PlanContext::new(parent, edit);
    let mut cascade = Cascade::default();
    let mut offending = SmallVec::new();

    for child_id in store.children(parent_id) {
        let Some(child) = store.element(child_id) else {
            continue;
        };
        if child.locked {
            log::trace!("locked {child_id} left in place by {:?} on {parent_id}", edit);
            continue;
        }
        match child.element_type().child_class() {
            ChildClass::Footprint | ChildClass::Point => {
                let old_local = local_offset(child, parent);
                if ctx.checks_containment()
                    && !fits_within(
                        &footprint(child, old_local.xy()),
                        ctx.new_extent.x,
                        ctx.new_extent.y,
                        tol,
                    )
                {
                    offending.push(child_id);
                    continue;
                }
                let mut new_stored = normalize(child.element_type(), old_local, &ctx.new_extent);
                new_stored.z = ctx.child_elevation(child, new_stored.x);
                cascade.record_position(child_id, child.position(), new_stored);
            }
            ChildClass::Polygon => {
                let Some(vertices) = child.vertices() else {
                    continue;
                };
                let local: Vec<Vec2> = vertices
                    .iter()
                    .map(|v| denormalize_vertex(v, &ctx.old_extent))
                    .collect();
                if ctx.checks_containment()
                    && !fits_within(&local, ctx.new_extent.x, ctx.new_extent.y, tol)
                {
                    offending.push(child_id);
                    continue;
                }
                let renormalized: Vec<Point2> = local
                    .iter()
                    .map(|v| normalize_vertex(v, &ctx.new_extent))
                    .collect();
                cascade.record_vertices(child_id, vertices.to_vec(), renormalized);
                let mut position = child.position();
                position.z = ctx.child_elevation(child, position.x);
                cascade.record_position(child_id, child.position(), position);
            }
            ChildClass::Decor => {
                if let GeometryEdit::Resize { axis, value } = edit {
                    plan_decor(store, parent, child, axis, value, &ctx, tol, &mut cascade);
                }
            }
            ChildClass::Wall => {
                log::trace!("wall {child_id} left in place by {:?} on {parent_id}", edit);
            }
            ChildClass::Passive => {}
        }
    }

    if offending.is_empty() {
        Ok(cascade)
    } else {
        log::debug!(
            "rejecting {:?} on {parent_id}: {} children would fall outside ({:?})",
            edit,
            offending.len(),
            offending
        );
        Err(Rejection {
            parent_id,
            property: edit.property(),
            attempted_value: edit.value(),
            offending,
        })
    }
}

/// Old and new parent geometry for one edit.
struct PlanContext {
    edit: GeometryEdit,
    is_foundation: bool,
    old_extent: Vec3,
    new_extent: Vec3,
    old_slope: f64,
    new_slope: f64,
}

impl PlanContext {
    fn new(parent: &Element, edit: GeometryEdit) -> Self {
        let old_extent = parent.extent();
        let mut new_extent = old_extent;
        let old_slope = parent.effective_slope();
        let (enabled, slope) = parent.slope().unwrap_or((false, 0.0));
        let new_slope = match edit {
            GeometryEdit::Resize { axis, value } => {
                new_extent[axis.index()] = value;
                old_slope
            }
            GeometryEdit::Slope(value) if enabled => value,
            GeometryEdit::Slope(_) => 0.0,
            GeometryEdit::EnableSlope(true) => slope,
            GeometryEdit::EnableSlope(false) => 0.0,
        };
        Self {
            edit,
            is_foundation: parent.element_type() == ElementType::Foundation,
            old_extent,
            new_extent,
            old_slope,
            new_slope,
        }
    }

    /// Only a horizontal resize can push a child off the top face.
    fn checks_containment(&self) -> bool {
        matches!(
            self.edit,
            GeometryEdit::Resize {
                axis: Axis::X | Axis::Y,
                ..
            }
        )
    }

    /// New `cz` of a top-face child whose new normalized x is `new_cx`.
    fn child_elevation(&self, child: &Element, new_cx: f64) -> f64 {
        let slope_driven = self.is_foundation
            && child.element_type().follows_slope()
            && (self.old_slope != 0.0 || self.new_slope != 0.0);
        if slope_driven {
            return slope_elevation(self.new_extent.x, self.new_extent.z, self.new_slope, new_cx);
        }
        // Keep the height above the top face.
        child.cz + (self.new_extent.z - self.old_extent.z) / 2.0
    }
}

/// Trees and people: follow the face they are stuck to, or fall off.
#[allow(clippy::too_many_arguments)]
fn plan_decor(
    store: &dyn SceneStore,
    parent: &Element,
    child: &Element,
    axis: Axis,
    value: f64,
    ctx: &PlanContext,
    tol: f64,
    cascade: &mut Cascade,
) {
    let offset = child.position();
    let i = axis.index();
    let face = classify_face(&offset, &ctx.old_extent, tol);

    if face.normal_axis() == Some(axis) {
        let mut stuck = offset;
        stuck[i] = offset[i].signum() * value / 2.0;
        cascade.record_position(child.id, offset, stuck);
        return;
    }

    if offset[i].abs() > value / 2.0 + tol {
        let landing = ground_position(store, parent.id, offset);
        let from = Attachment {
            parent: parent.id,
            foundation: child.foundation_id,
        };
        log::debug!(
            "{} falls off {:?} face of {} -> ground at ({:.3}, {:.3})",
            child.id,
            face,
            parent.id,
            landing.x,
            landing.y
        );
        cascade.old_parents.insert(child.id, from);
        cascade.new_parents.insert(child.id, Attachment::ground());
        cascade.record_position(child.id, offset, landing);
    } else if face == Face::Inside {
        log::trace!("{} is not touching any face of {}", child.id, parent.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::height_on_slope;
    use crate::math::ZERO_TOLERANCE;
    use crate::model::ElementKind;
    use crate::nodes::NodeRegistry;
    use crate::scene::SceneGraph;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    fn foundation(name: &str, lx: f64, ly: f64, lz: f64) -> (SceneGraph, ElementId) {
        let mut s = SceneGraph::new();
        let f = id(name);
        s.insert(
            ElementId::ground(),
            Element::new(f, ElementKind::foundation())
                .at(20.0, 10.0, lz / 2.0)
                .sized(lx, ly, lz),
        )
        .unwrap();
        (s, f)
    }

    fn resize(axis: Axis, value: f64) -> GeometryEdit {
        GeometryEdit::Resize { axis, value }
    }

    #[test]
    fn panel_past_new_edge_rejects() {
        let (mut s, f) = foundation("tr_a_f", 10.0, 10.0, 1.0);
        s.insert(
            f,
            Element::new(id("tr_a_p"), ElementKind::solar_panel())
                .at(0.45, 0.0, 0.5)
                .sized(1.0, 2.0, 0.1),
        )
        .unwrap();

        let err = plan_cascade(&s, f, resize(Axis::X, 6.0), ZERO_TOLERANCE).unwrap_err();
        assert_eq!(err.parent_id, f);
        assert_eq!(err.attempted_value, PropertyValue::Number(6.0));
        assert_eq!(err.offending.as_slice(), &[id("tr_a_p")]);
    }

    #[test]
    fn panel_keeps_absolute_offset() {
        let (mut s, f) = foundation("tr_b_f", 10.0, 10.0, 1.0);
        let p = id("tr_b_p");
        s.insert(
            f,
            Element::new(p, ElementKind::solar_panel())
                .at(0.2, 0.1, 0.5)
                .sized(1.0, 1.0, 0.1),
        )
        .unwrap();

        let c = plan_cascade(&s, f, resize(Axis::X, 8.0), ZERO_TOLERANCE).unwrap();
        let new = c.new_positions[&p];
        // 0.2 * 10 = 2.0 absolute → 2.0 / 8 normalized.
        assert_relative_eq!(new.x, 0.25);
        assert_relative_eq!(new.y, 0.1);
        assert_relative_eq!(new.z, 0.5);
        assert!(c.new_parents.is_empty());
    }

    #[test]
    fn growing_never_rejects() {
        let (mut s, f) = foundation("tr_c_f", 10.0, 10.0, 1.0);
        s.insert(
            f,
            Element::new(id("tr_c_s"), ElementKind::Sensor).at(0.5, -0.5, 0.5),
        )
        .unwrap();
        assert!(plan_cascade(&s, f, resize(Axis::Y, 12.0), ZERO_TOLERANCE).is_ok());
    }

    #[test]
    fn polygon_vertices_renormalize_or_reject() {
        let (mut s, f) = foundation("tr_d_f", 10.0, 10.0, 1.0);
        let poly = id("tr_d_poly");
        s.insert(
            f,
            Element::new(
                poly,
                ElementKind::Polygon {
                    vertices: vec![
                        Point2::new(-0.1, -0.1),
                        Point2::new(0.3, -0.1),
                        Point2::new(0.3, 0.2),
                    ],
                },
            )
            .at(0.0, 0.0, 0.5),
        )
        .unwrap();

        let c = plan_cascade(&s, f, resize(Axis::X, 8.0), ZERO_TOLERANCE).unwrap();
        let v = &c.new_vertices[&poly];
        assert_relative_eq!(v[1].x, 3.0 / 8.0);
        assert_relative_eq!(v[2].y, 0.2);

        let err = plan_cascade(&s, f, resize(Axis::X, 5.0), ZERO_TOLERANCE).unwrap_err();
        assert_eq!(err.offending.as_slice(), &[poly]);
    }

    #[test]
    fn top_tree_at_edge_falls_off() {
        let (mut s, f) = foundation("tr_e_f", 8.0, 8.0, 3.0);
        let t = id("tr_e_t");
        s.insert(f, Element::new(t, ElementKind::Tree).at(4.0, 1.0, 1.5))
            .unwrap();

        let c = plan_cascade(&s, f, resize(Axis::X, 6.0), ZERO_TOLERANCE).unwrap();
        assert_eq!(c.new_parents[&t], Attachment::ground());
        assert_eq!(
            c.old_parents[&t],
            Attachment {
                parent: f,
                foundation: Some(f)
            }
        );
        let landing = c.new_positions[&t];
        assert_relative_eq!(landing.x, 24.0);
        assert_relative_eq!(landing.y, 11.0);
        assert_relative_eq!(landing.z, 0.0);
        assert_eq!(c.old_positions[&t], Vec3::new(4.0, 1.0, 1.5));
    }

    #[test]
    fn top_tree_inside_new_extent_stays() {
        let (mut s, f) = foundation("tr_f_f", 8.0, 8.0, 3.0);
        s.insert(f, Element::new(id("tr_f_t"), ElementKind::Human).at(2.0, 0.0, 1.5))
            .unwrap();
        let c = plan_cascade(&s, f, resize(Axis::X, 6.0), ZERO_TOLERANCE).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn side_tree_follows_face() {
        let (mut s, f) = foundation("tr_g_f", 8.0, 8.0, 3.0);
        let t = id("tr_g_t");
        // On the west face, halfway up.
        s.insert(f, Element::new(t, ElementKind::Tree).at(-4.0, 1.0, 0.0))
            .unwrap();
        let c = plan_cascade(&s, f, resize(Axis::X, 6.0), ZERO_TOLERANCE).unwrap();
        assert_eq!(c.new_positions[&t], Vec3::new(-3.0, 1.0, 0.0));
        assert!(c.new_parents.is_empty());
    }

    #[test]
    fn side_tree_detaches_when_height_shrinks() {
        let (mut s, f) = foundation("tr_h_f", 8.0, 8.0, 4.0);
        let t = id("tr_h_t");
        s.insert(f, Element::new(t, ElementKind::Tree).at(4.0, 0.0, 1.5))
            .unwrap();
        let c = plan_cascade(&s, f, resize(Axis::Z, 2.0), ZERO_TOLERANCE).unwrap();
        assert_eq!(c.new_parents[&t], Attachment::ground());

        let top = id("tr_h_top");
        s.insert(f, Element::new(top, ElementKind::Tree).at(0.0, 0.0, 2.0))
            .unwrap();
        let c = plan_cascade(&s, f, resize(Axis::Z, 3.0), ZERO_TOLERANCE).unwrap();
        assert_eq!(c.new_positions[&top], Vec3::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn height_resize_lifts_top_children() {
        let (mut s, f) = foundation("tr_i_f", 10.0, 10.0, 1.0);
        let b = id("tr_i_b");
        s.insert(f, Element::new(b, ElementKind::battery()).at(0.1, 0.1, 0.5))
            .unwrap();
        let c = plan_cascade(&s, f, resize(Axis::Z, 3.0), ZERO_TOLERANCE).unwrap();
        assert_relative_eq!(c.new_positions[&b].z, 1.5);
        assert_relative_eq!(c.new_positions[&b].x, 0.1);
    }

    #[test]
    fn slope_edits_recompute_elevation() {
        let (mut s, f) = foundation("tr_j_f", 10.0, 10.0, 2.0);
        let b = id("tr_j_b");
        let tree = id("tr_j_t");
        s.insert(f, Element::new(b, ElementKind::battery()).at(0.5, 0.0, 1.0))
            .unwrap();
        s.insert(f, Element::new(tree, ElementKind::Tree).at(0.0, 0.0, 1.0))
            .unwrap();
        s.set_property(f, Property::Slope, &0.1.into()).unwrap();

        let c = plan_cascade(&s, f, GeometryEdit::EnableSlope(true), ZERO_TOLERANCE).unwrap();
        assert_relative_eq!(c.new_positions[&b].z, 1.0 + 10.0 * 0.1_f64.tan());
        assert!(!c.new_positions.contains_key(&tree));

        // Changing the angle while disabled leaves everything flat.
        let c = plan_cascade(&s, f, GeometryEdit::Slope(0.3), ZERO_TOLERANCE).unwrap();
        assert!(c.is_empty());

        s.set_property(f, Property::EnableSlope, &true.into()).unwrap();
        s.set_position(b, Vec3::new(0.5, 0.0, 1.0 + 10.0 * 0.1_f64.tan()))
            .unwrap();
        let c = plan_cascade(&s, f, GeometryEdit::EnableSlope(false), ZERO_TOLERANCE).unwrap();
        assert_relative_eq!(c.new_positions[&b].z, 1.0);

        // Lengthening a sloped foundation re-runs the ramp.
        let c = plan_cascade(&s, f, resize(Axis::X, 20.0), ZERO_TOLERANCE).unwrap();
        let new = c.new_positions[&b];
        assert_relative_eq!(new.x, 0.25);
        assert_relative_eq!(new.z, 1.0 + 0.75 * 20.0 * 0.1_f64.tan(), epsilon = 1e-12);
    }

    #[test]
    fn height_resize_of_sloped_foundation_reruns_ramp() {
        let (mut s, f) = foundation("tr_m_f", 10.0, 10.0, 2.0);
        let b = id("tr_m_b");
        s.set_property(f, Property::Slope, &0.1.into()).unwrap();
        s.set_property(f, Property::EnableSlope, &true.into()).unwrap();
        s.insert(
            f,
            Element::new(b, ElementKind::battery())
                .at(0.2, 0.0, 1.0 + height_on_slope(10.0, 0.1, 0.2)),
        )
        .unwrap();

        let c = plan_cascade(&s, f, resize(Axis::Z, 4.0), ZERO_TOLERANCE).unwrap();
        assert_relative_eq!(
            c.new_positions[&b].z,
            2.0 + height_on_slope(10.0, 0.1, 0.2),
            epsilon = 1e-12
        );
        assert_relative_eq!(c.new_positions[&b].x, 0.2);
    }

    #[test]
    fn disabled_slope_angle_leaves_raised_children_alone() {
        let (mut s, f) = foundation("tr_n_f", 10.0, 10.0, 2.0);
        let b = id("tr_n_b");
        // Sitting on a box on top of the foundation.
        s.insert(f, Element::new(b, ElementKind::battery()).at(0.0, 0.0, 1.5))
            .unwrap();

        let c = plan_cascade(&s, f, GeometryEdit::Slope(0.3), ZERO_TOLERANCE).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn locked_children_are_not_cascaded() {
        let (mut s, f) = foundation("tr_o_f", 10.0, 10.0, 1.0);
        let p = id("tr_o_p");
        let t = id("tr_o_t");
        s.insert(
            f,
            Element::new(p, ElementKind::solar_panel())
                .at(0.2, 0.0, 0.5)
                .sized(1.0, 1.0, 0.1)
                .locked(),
        )
        .unwrap();
        s.insert(f, Element::new(t, ElementKind::Tree).at(4.0, 0.0, 0.5).locked())
            .unwrap();

        let c = plan_cascade(&s, f, resize(Axis::X, 8.0), ZERO_TOLERANCE).unwrap();
        assert!(c.is_empty());
        let c = plan_cascade(&s, f, resize(Axis::X, 6.0), ZERO_TOLERANCE).unwrap();
        assert!(c.reparented().is_empty());
    }

    #[test]
    fn walls_are_left_in_place() {
        let (mut s, f) = foundation("tr_k_f", 10.0, 10.0, 1.0);
        s.insert(f, Element::new(id("tr_k_w"), ElementKind::wall()).at(0.4, 0.0, 0.5))
            .unwrap();
        let c = plan_cascade(&s, f, resize(Axis::X, 2.0), ZERO_TOLERANCE).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn apply_replays_both_sides() {
        let (mut s, f) = foundation("tr_l_f", 8.0, 8.0, 3.0);
        let t = id("tr_l_t");
        s.insert(f, Element::new(t, ElementKind::Tree).at(4.0, 0.0, 1.5))
            .unwrap();
        let mut nodes = NodeRegistry::from_store(&s);

        let c = plan_cascade(&s, f, resize(Axis::X, 6.0), ZERO_TOLERANCE).unwrap();
        assert_eq!(c.reparented(), vec![t]);

        c.apply(&mut s, &mut nodes, Snapshot::After).unwrap();
        assert_eq!(s.parent_of(t), Some(ElementId::ground()));
        assert_eq!(s.element(t).unwrap().foundation_id, None);
        assert_eq!(nodes.group_of(t), Some(ElementId::ground()));

        c.apply(&mut s, &mut nodes, Snapshot::Before).unwrap();
        assert_eq!(s.parent_of(t), Some(f));
        assert_eq!(s.element(t).unwrap().foundation_id, Some(f));
        assert_eq!(s.element(t).unwrap().position(), Vec3::new(4.0, 0.0, 1.5));
        assert_eq!(nodes.group_of(t), Some(f));
    }

    #[test]
    fn edit_property_mapping() {
        let edit = GeometryEdit::from_property(Property::Ly, &3.0.into()).unwrap();
        assert_eq!(edit, resize(Axis::Y, 3.0));
        assert_eq!(edit.property(), Property::Ly);
        assert_eq!(GeometryEdit::from_property(Property::Color, &"red".into()), None);
        assert_eq!(
            GeometryEdit::from_property(Property::EnableSlope, &true.into()),
            Some(GeometryEdit::EnableSlope(true))
        );
    }
}
