use std::f64::consts::TAU;

use crate::config::LatheParams;
use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};
use crate::mesh::TriangleMesh;

/// Sweeps a profile a full turn around the Y axis.
///
/// The points are sorted by height and each contributes a ring whose radius
/// is its distance from the axis, clamped to `min_radius`. The lowest and
/// highest rings are capped with fans so the result is closed.
pub struct Lathe<'a> {
    points: &'a [Point2],
    params: LatheParams,
}

impl<'a> Lathe<'a> {
    /// Creates a new `Lathe` operation.
    #[must_use]
    pub fn new(points: &'a [Point2], params: LatheParams) -> Self {
        Self { points, params }
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if fewer than two points are
    /// given, the profile has no height, or fewer than three segments are
    /// requested.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let segments = self.params.segments;
        if segments < 3 {
            return Err(GeometryError::Degenerate("lathe needs at least 3 segments".into()).into());
        }
        let profile = self.profile();
        if profile.len() < 2 {
            return Err(GeometryError::Degenerate("lathe profile needs 2 points".into()).into());
        }
        let (y_min, y_max) = (profile[0].1, profile[profile.len() - 1].1);
        if y_max - y_min < TOLERANCE {
            return Err(GeometryError::Degenerate("lathe profile has no height".into()).into());
        }

        let mut mesh = TriangleMesh::default();
        for &(radius, y) in &profile {
            for j in 0..segments {
                let phi = TAU * j as f64 / segments as f64;
                let pos = Point3::new(radius * phi.sin(), y, radius * phi.cos());
                mesh.push_vertex(pos, Vector3::zeros());
            }
        }

        let ring = |i: usize, j: usize| (i * segments + j % segments) as u32;
        for i in 0..profile.len() - 1 {
            for j in 0..segments {
                let (a, b) = (ring(i, j), ring(i, j + 1));
                let (c, d) = (ring(i + 1, j + 1), ring(i + 1, j));
                mesh.push_triangle(a, b, c);
                mesh.push_triangle(a, c, d);
            }
        }

        let bottom = mesh.push_vertex(Point3::new(0.0, y_min, 0.0), Vector3::zeros());
        let top = mesh.push_vertex(Point3::new(0.0, y_max, 0.0), Vector3::zeros());
        let last = profile.len() - 1;
        for j in 0..segments {
            mesh.push_triangle(bottom, ring(0, j + 1), ring(0, j));
            mesh.push_triangle(top, ring(last, j), ring(last, j + 1));
        }

        mesh.compute_vertex_normals();
        Ok(mesh)
    }

    /// `(radius, height)` pairs sorted by height.
    fn profile(&self) -> Vec<(f64, f64)> {
        let mut profile: Vec<(f64, f64)> = self
            .points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(|p| (p.x.abs().max(self.params.min_radius), p.y))
            .collect();
        profile.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        profile
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn cylinder_profile_is_closed_and_outward() {
        let pts = [p(1.0, 0.0), p(1.0, 2.0)];
        let mesh = Lathe::new(&pts, LatheParams { min_radius: 0.02, segments: 64 })
            .execute()
            .unwrap();
        assert!(mesh.is_watertight(1e-9));
        // Inscribed 64-gon prism is slightly smaller than the true cylinder.
        let expected = std::f64::consts::PI * 2.0;
        let volume = mesh.signed_volume();
        assert!(volume > 0.0);
        assert!((volume - expected).abs() / expected < 0.01, "volume {volume}");
    }

    #[test]
    fn unsorted_points_are_sorted_by_height() {
        let pts = [p(0.5, 1.0), p(-0.8, -1.0), p(0.3, 0.0)];
        let mesh = Lathe::new(&pts, LatheParams::default()).execute().unwrap();
        let bounds = mesh.bounding_box();
        assert_relative_eq!(bounds.min.y, -1.0);
        assert_relative_eq!(bounds.max.y, 1.0);
        // Widest ring comes from |-0.8|.
        assert_relative_eq!(bounds.max.z, 0.8, epsilon = 1e-12);
        assert!(mesh.is_watertight(1e-9));
    }

    #[test]
    fn radius_is_clamped_away_from_axis() {
        let pts = [p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)];
        let mesh = Lathe::new(&pts, LatheParams::default()).execute().unwrap();
        let bounds = mesh.bounding_box();
        assert_relative_eq!(bounds.max.z, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn flat_profile_is_an_error() {
        let pts = [p(1.0, 0.5), p(2.0, 0.5), p(3.0, 0.5)];
        assert!(Lathe::new(&pts, LatheParams::default()).execute().is_err());
    }
}
