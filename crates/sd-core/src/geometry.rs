//! Coordinate conversions and footprint tests.
//!
//! Three frames are in play:
//! - the *stored* frame: what an element keeps in `cx/cy/cz`, normalized
//!   to the parent's extent for most children of a container;
//! - the *parent-local* frame: absolute offsets from the parent's center,
//!   along the parent's unrotated axes;
//! - the *world* frame: Ground coordinates.

use crate::id::ElementId;
use crate::math::{Point2, Vec2, Vec3, approx_eq, rotate};
use crate::model::{Axis, ChildClass, Element, ElementKind, ElementType};
use crate::scene::SceneStore;

// ─── Frames ──────────────────────────────────────────────────────────────

/// Stored position of `child` → offset from `parent_extent`'s center.
pub fn denormalize(child_type: ElementType, stored: Vec3, parent_extent: &Vec3) -> Vec3 {
    if child_type.is_normalized_in_container() {
        Vec3::new(stored.x * parent_extent.x, stored.y * parent_extent.y, stored.z)
    } else {
        stored
    }
}

/// Inverse of `denormalize` against a (possibly new) parent extent.
pub fn normalize(child_type: ElementType, local: Vec3, parent_extent: &Vec3) -> Vec3 {
    if child_type.is_normalized_in_container() {
        Vec3::new(local.x / parent_extent.x, local.y / parent_extent.y, local.z)
    } else {
        local
    }
}

/// Parent-local offset of `child` inside the container `parent`.
pub fn local_offset(child: &Element, parent: &Element) -> Vec3 {
    if parent.element_type().is_container() {
        denormalize(child.element_type(), child.position(), &parent.extent())
    } else {
        child.position()
    }
}

pub fn denormalize_vertex(v: &Point2, parent_extent: &Vec3) -> Vec2 {
    Vec2::new(v.x * parent_extent.x, v.y * parent_extent.y)
}

pub fn normalize_vertex(v: &Vec2, parent_extent: &Vec3) -> Point2 {
    Point2::new(v.x / parent_extent.x, v.y / parent_extent.y)
}

/// World position of an element's reference point.
///
/// Walks up the parent chain, rotating each offset by the parent's azimuth
/// and translating by the parent's world position.
pub fn world_position(store: &dyn SceneStore, id: ElementId) -> Vec3 {
    let Some(element) = store.element(id) else {
        return Vec3::zeros();
    };
    let parent_id = store.parent_of(id).unwrap_or_else(ElementId::ground);
    if parent_id.is_ground() {
        return element.position();
    }
    let Some(parent) = store.element(parent_id) else {
        debug_assert!(false, "{id} references missing parent {parent_id}");
        return element.position();
    };
    let offset = local_offset(element, parent);
    parent_local_to_world(store, parent_id, offset)
}

/// Convert a parent-local offset to world coordinates.
pub fn parent_local_to_world(store: &dyn SceneStore, parent_id: ElementId, offset: Vec3) -> Vec3 {
    let Some(parent) = store.element(parent_id) else {
        return offset;
    };
    let origin = world_position(store, parent_id);
    let horizontal = rotate(offset.xy(), parent.azimuth());
    Vec3::new(origin.x + horizontal.x, origin.y + horizontal.y, origin.z + offset.z)
}

/// Where a child of `parent_id` lands when dropped onto the Ground: same
/// horizontal world position, at ground level.
pub fn ground_position(store: &dyn SceneStore, parent_id: ElementId, offset: Vec3) -> Vec3 {
    let world = parent_local_to_world(store, parent_id, offset);
    Vec3::new(world.x, world.y, 0.0)
}

// ─── Footprints ──────────────────────────────────────────────────────────

/// Corners (or the single point) a child occupies on its parent's top
/// face, in the parent-local frame, given its center `offset`.
pub fn footprint(child: &Element, offset: Vec2) -> Vec<Vec2> {
    match child.element_type().child_class() {
        ChildClass::Footprint => {
            let depth = match child.kind {
                ElementKind::SolarPanel { tilt_angle } => child.ly * tilt_angle.cos().abs(),
                _ => child.ly,
            };
            let hx = child.lx / 2.0;
            let hy = depth / 2.0;
            [(-hx, -hy), (hx, -hy), (hx, hy), (-hx, hy)]
                .into_iter()
                .map(|(x, y)| offset + rotate(Vec2::new(x, y), child.azimuth()))
                .collect()
        }
        _ => vec![offset],
    }
}

/// Whether every point lies within the centered rectangle of size
/// `lx × ly`, with `tol` slack.
pub fn fits_within(points: &[Vec2], lx: f64, ly: f64, tol: f64) -> bool {
    points
        .iter()
        .all(|p| p.x.abs() <= lx / 2.0 + tol && p.y.abs() <= ly / 2.0 + tol)
}

// ─── Slope ───────────────────────────────────────────────────────────────

/// Height of a sloped foundation's top surface above its flat top at the
/// normalized position `cx`. The ramp rises from the low edge (`cx = -0.5`)
/// to the high edge (`cx = 0.5`).
pub fn height_on_slope(lx: f64, slope: f64, cx: f64) -> f64 {
    (cx + 0.5) * lx * slope.tan()
}

/// Elevation of a slope-following child of `foundation` at `cx`.
pub fn slope_elevation(lx: f64, lz: f64, slope: f64, cx: f64) -> f64 {
    lz / 2.0 + height_on_slope(lx, slope, cx)
}

// ─── Faces ───────────────────────────────────────────────────────────────

/// The face of a box parent a decor child stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Top,
    Bottom,
    East,
    West,
    North,
    South,
    /// Not touching any face.
    Inside,
}

impl Face {
    /// The axis this face is perpendicular to.
    pub fn normal_axis(self) -> Option<Axis> {
        match self {
            Face::Top | Face::Bottom => Some(Axis::Z),
            Face::East | Face::West => Some(Axis::X),
            Face::North | Face::South => Some(Axis::Y),
            Face::Inside => None,
        }
    }
}

/// Classify a parent-local offset against a box of `extent`. The top face
/// wins ties, so a tree on the top edge counts as standing on top.
pub fn classify_face(offset: &Vec3, extent: &Vec3, tol: f64) -> Face {
    let (hx, hy, hz) = (extent.x / 2.0, extent.y / 2.0, extent.z / 2.0);
    if approx_eq(offset.z, hz, tol) {
        Face::Top
    } else if approx_eq(offset.z, -hz, tol) {
        Face::Bottom
    } else if approx_eq(offset.x, hx, tol) {
        Face::East
    } else if approx_eq(offset.x, -hx, tol) {
        Face::West
    } else if approx_eq(offset.y, hy, tol) {
        Face::North
    } else if approx_eq(offset.y, -hy, tol) {
        Face::South
    } else {
        Face::Inside
    }
}
