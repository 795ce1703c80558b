//! Structural diagnostics for a scene.
//!
//! Reports violated scene invariants without modifying anything. The
//! mutation engine never produces these; they flag corrupted input or a
//! misbehaving store.

use crate::geometry::{fits_within, footprint, local_offset};
use crate::id::ElementId;
use crate::math::ZERO_TOLERANCE;
use crate::model::{ChildClass, ElementType};
use crate::scene::SceneStore;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// A single finding for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub element_id: ElementId,
    pub message: String,
    /// Short rule identifier (e.g. "containment", "foundation-link").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all rules over the scene.
#[must_use]
pub fn validate_scene(store: &dyn SceneStore) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    validate_foundation_links(store, &mut diags);
    validate_containment(store, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

/// `foundation_id` must name the nearest Foundation ancestor; Ground
/// children have none.
fn validate_foundation_links(store: &dyn SceneStore, diags: &mut Vec<Diagnostic>) {
    for id in store.element_ids() {
        let Some(element) = store.element(id) else {
            continue;
        };
        let expected = nearest_foundation(store, id);
        if element.foundation_id == expected {
            continue;
        }
        let parent_is_ground = store.parent_of(id).is_none_or(|p| p.is_ground());
        let (rule, message) = if parent_is_ground {
            (
                "ground-foundation",
                format!("`{id}` sits on the ground but still links to a foundation"),
            )
        } else {
            (
                "foundation-link",
                format!(
                    "`{id}` links to {:?} but its nearest foundation is {:?}",
                    element.foundation_id, expected
                ),
            )
        };
        diags.push(Diagnostic {
            element_id: id,
            message,
            rule,
        });
    }
}

fn nearest_foundation(store: &dyn SceneStore, id: ElementId) -> Option<ElementId> {
    let mut current = store.parent_of(id)?;
    while !current.is_ground() {
        let element = store.element(current)?;
        if element.element_type() == ElementType::Foundation {
            return Some(current);
        }
        current = store.parent_of(current)?;
    }
    None
}

/// Footprint children must lie on their container's top face.
fn validate_containment(store: &dyn SceneStore, diags: &mut Vec<Diagnostic>) {
    for id in store.element_ids() {
        let Some(parent) = store.element(id) else {
            continue;
        };
        if !parent.element_type().is_container() {
            continue;
        }
        for child_id in store.children(id) {
            let Some(child) = store.element(child_id) else {
                continue;
            };
            let points = match child.element_type().child_class() {
                ChildClass::Footprint | ChildClass::Point => {
                    footprint(child, local_offset(child, parent).xy())
                }
                ChildClass::Polygon => child
                    .vertices()
                    .unwrap_or_default()
                    .iter()
                    .map(|v| crate::geometry::denormalize_vertex(v, &parent.extent()))
                    .collect(),
                _ => continue,
            };
            if !fits_within(&points, parent.lx, parent.ly, ZERO_TOLERANCE) {
                diags.push(Diagnostic {
                    element_id: child_id,
                    message: format!("`{child_id}` extends past the edge of `{id}`"),
                    rule: "containment",
                });
            }
        }
    }
}
