//! Error types for scene store writes.

use crate::id::ElementId;
use crate::model::{ElementType, Property};
use thiserror::Error;

/// Failures a scene store reports for a single-element write.
///
/// Expected outcomes such as containment rejections are not errors; see
/// `transform::Rejection`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// No element with this id exists.
    #[error("unknown element `{0}`")]
    UnknownElement(ElementId),

    /// An element with this id already exists.
    #[error("element `{0}` already exists")]
    DuplicateElement(ElementId),

    /// The element's kind does not carry the requested property.
    #[error("element `{id}` ({element_type:?}) has no {property:?} property")]
    MissingProperty {
        id: ElementId,
        element_type: ElementType,
        property: Property,
    },

    /// The supplied value has the wrong shape for the property.
    #[error("{property:?} expects a {expected} value")]
    WrongValue {
        property: Property,
        expected: &'static str,
    },

    /// The element carries no polygon vertices.
    #[error("element `{0}` is not a polygon")]
    NotPolygon(ElementId),

    /// The Ground element is fixed.
    #[error("the ground element cannot be modified")]
    GroundImmutable,
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
