pub mod error;
pub mod geometry;
pub mod id;
pub mod math;
pub mod model;
pub mod nodes;
pub mod scene;
pub mod scope;
pub mod transform;
pub mod validate;

pub use error::SceneError;
pub use id::{ElementId, GROUND_ID};
pub use math::{Point2, Vec2, Vec3, ZERO_TOLERANCE};
pub use model::*;
pub use nodes::{NodeGroups, NodeRegistry};
pub use scene::{SceneGraph, SceneStore};
pub use scope::{Resolution, Scope, need_change, resolve, resolve_scope};
pub use transform::{Cascade, GeometryEdit, Rejection, Snapshot, plan_cascade};
pub use validate::{Diagnostic, validate_scene};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
