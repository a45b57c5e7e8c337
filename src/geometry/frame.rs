use nalgebra::Matrix3;

use crate::math::{transform_point, Matrix4, Point2, Point3, Vector3, UP};

/// Above this `|normal.y|` the world up axis is too close to the normal to
/// serve as the in-plane reference.
const NEAR_VERTICAL: f64 = 0.9;

/// Local orthonormal coordinate system on a surface.
///
/// `x_axis` and `y_axis` span the tangent plane, `normal` completes a
/// right-handed basis, and `origin` is the first touched point. Local
/// coordinates `(x, y, z)` map to `origin + x * x_axis + y * y_axis + z * normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
    matrix: Matrix4,
    inverse: Matrix4,
}

impl SurfaceFrame {
    /// Builds the frame at `origin` around a unit `normal`.
    ///
    /// The in-plane reference is world up, or world X when the normal is
    /// nearly vertical, so the cross products never degenerate. The caller
    /// supplies a finite unit normal (see
    /// [`NormalEstimator`](super::NormalEstimator)).
    #[must_use]
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        let reference = if normal.y.abs() < NEAR_VERTICAL {
            UP
        } else {
            Vector3::new(1.0, 0.0, 0.0)
        };
        let x_axis = reference.cross(&normal).normalize();
        let y_axis = normal.cross(&x_axis).normalize();

        let rotation = Matrix3::from_columns(&[x_axis, y_axis, normal]);
        let mut matrix = rotation.to_homogeneous();
        matrix.set_column(3, &origin.to_homogeneous());
        // Orthonormal basis: the inverse rotation is the transpose.
        let back = rotation.transpose();
        let mut inverse = back.to_homogeneous();
        inverse.set_column(3, &(-(back * origin.coords)).push(1.0));

        Self {
            origin,
            x_axis,
            y_axis,
            normal,
            matrix,
            inverse,
        }
    }

    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    #[must_use]
    pub fn x_axis(&self) -> &Vector3 {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &Vector3 {
        &self.y_axis
    }

    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Local-to-world matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix4 {
        &self.matrix
    }

    /// World-to-local matrix.
    #[must_use]
    pub fn inverse(&self) -> &Matrix4 {
        &self.inverse
    }

    /// Flattens a world point into the tangent plane.
    #[must_use]
    pub fn project(&self, world: &Point3) -> Point2 {
        let local = transform_point(&self.inverse, world);
        Point2::new(local.x, local.y)
    }

    /// Maps local coordinates back to world space.
    #[must_use]
    pub fn to_world(&self, local: &Point3) -> Point3 {
        transform_point(&self.matrix, local)
    }
}
