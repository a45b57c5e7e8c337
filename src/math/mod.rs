pub mod aabb;
pub mod polygon_2d;
pub mod ray;

pub use aabb::Aabb;
pub use ray::{Ray, RayTriangleHit};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// World "up" axis. The floor plane is perpendicular to it.
pub const UP: Vector3 = Vector3::new(0.0, 1.0, 0.0);

/// Transforms a point by a 4x4 matrix (with translation).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Transforms a direction vector by a 4x4 matrix (ignoring translation).
#[must_use]
pub fn transform_direction(matrix: &Matrix4, dir: &Vector3) -> Vector3 {
    let v = matrix * nalgebra::Vector4::new(dir.x, dir.y, dir.z, 0.0);
    Vector3::new(v.x, v.y, v.z)
}

/// Normalizes `v`, returning `None` for zero-length or non-finite input.
#[must_use]
pub fn try_normalize(v: &Vector3) -> Option<Vector3> {
    let len = v.norm();
    if !len.is_finite() || len < TOLERANCE {
        return None;
    }
    Some(v / len)
}
