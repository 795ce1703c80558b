//! Numeric primitives shared by the geometry engine.
//!
//! Thin aliases over nalgebra plus the tolerance used for every
//! "did this value actually change" and "does this face touch" test.

use nalgebra::{Rotation2, Vector2, Vector3};

/// A vector in 3D space (positions and extents).
pub type Vec3 = Vector3<f64>;

/// A vector in the horizontal plane.
pub type Vec2 = Vector2<f64>;

/// A polygon vertex, normalized to the parent's footprint.
pub type Point2 = nalgebra::Point2<f64>;

/// Default tolerance for numeric comparisons.
pub const ZERO_TOLERANCE: f64 = 1e-6;

/// `|a - b| < tol`.
#[inline]
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

/// Component-wise tolerance equality.
pub fn vec3_approx_eq(a: &Vec3, b: &Vec3, tol: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| approx_eq(*x, *y, tol))
}

/// Rotate a horizontal vector counter-clockwise by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    if angle == 0.0 {
        return v;
    }
    Rotation2::new(angle) * v
}
