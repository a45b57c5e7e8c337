use tracing::debug;

use crate::config::PatchParams;
use crate::error::{Result, SketchError};
use crate::geometry::{NormalEstimator, ResolvedNormal, SurfaceFrame};
use crate::math::polygon_2d::{close_loop, largest_simple_loop, signed_area};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};
use crate::mesh::TriangleMesh;
use crate::sampling::SurfaceSample;

use super::ExtrudeProfile;

/// A raised patch ready to be attached, in world coordinates.
#[derive(Debug, Clone)]
pub struct Patch {
    /// World-space geometry.
    pub mesh: TriangleMesh,
    /// The frame the stroke was flattened into.
    pub frame: SurfaceFrame,
    pub normal: ResolvedNormal,
}

/// Builds a patch solid from samples taken on a surface.
///
/// One normal is resolved for the whole stroke, the samples are flattened
/// into the frame anchored at the first sample, and the closed outline is
/// extruded along the normal, lifted slightly off the surface and mapped
/// back to world space.
pub struct BuildPatch<'a> {
    samples: &'a [SurfaceSample],
    params: PatchParams,
}

impl<'a> BuildPatch<'a> {
    /// Creates a new `BuildPatch` operation.
    #[must_use]
    pub fn new(samples: &'a [SurfaceSample], params: PatchParams) -> Self {
        Self { samples, params }
    }

    /// Executes the construction.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InsufficientSamples`] if fewer than
    /// `min_distinct_points` distinct points remain after projection, or if
    /// they enclose no area.
    pub fn execute(&self) -> Result<Patch> {
        let required = self.params.min_distinct_points.max(3);
        let Some(first) = self.samples.first() else {
            return Err(SketchError::InsufficientSamples { found: 0, required }.into());
        };

        let normals: Vec<Vector3> = self.samples.iter().map(|s| s.normal).collect();
        let points: Vec<Point3> = self.samples.iter().map(|s| s.point).collect();
        let normal = NormalEstimator::new(&normals, &points).execute();
        let frame = SurfaceFrame::new(first.point, normal.normal);

        let local: Vec<Point2> = points.iter().map(|p| frame.project(p)).collect();
        let closed = close_loop(&local, self.params.extrude.close_threshold);
        let profile = largest_simple_loop(&closed);
        if profile.len() < required || signed_area(&profile).abs() < TOLERANCE {
            return Err(SketchError::InsufficientSamples {
                found: profile.len(),
                required,
            }
            .into());
        }

        let mut mesh = ExtrudeProfile::new(&profile, self.params.extrude).execute()?;
        mesh.translate(&Vector3::new(0.0, 0.0, self.params.lift));
        mesh.transform(frame.matrix());

        debug!(
            samples = self.samples.len(),
            outline = profile.len(),
            origin = ?frame.origin(),
            "patch built"
        );
        Ok(Patch { mesh, frame, normal })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::NormalSource;

    fn sample(x: f64, y: f64, z: f64, normal: Vector3) -> SurfaceSample {
        SurfaceSample {
            point: Point3::new(x, y, z),
            normal,
        }
    }

    /// A small square drawn on the plane y = 1 with an upward normal.
    fn square_on_top() -> Vec<SurfaceSample> {
        let up = Vector3::y();
        vec![
            sample(0.0, 1.0, 0.0, up),
            sample(0.1, 1.0, 0.0, up),
            sample(0.1, 1.0, 0.1, up),
            sample(0.0, 1.0, 0.1, up),
        ]
    }

    #[test]
    fn patch_rises_along_the_normal() {
        let params = PatchParams::default();
        let patch = BuildPatch::new(&square_on_top(), params).execute().unwrap();
        assert_eq!(patch.normal.source, NormalSource::FirstSample);

        let bounds = patch.mesh.bounding_box();
        let e = params.extrude;
        assert_relative_eq!(bounds.min.y, 1.0 + params.lift - e.bevel_thickness, epsilon = 1e-9);
        assert_relative_eq!(
            bounds.max.y,
            1.0 + params.lift + e.depth + e.bevel_thickness,
            epsilon = 1e-9
        );
        assert!(bounds.min.x < 0.0 && bounds.max.x > 0.1);
        assert!(patch.mesh.is_watertight(1e-9));
        assert!(patch.mesh.signed_volume() > 0.0);
    }

    #[test]
    fn patch_on_a_side_wall_points_sideways() {
        let n = Vector3::x();
        let samples = vec![
            sample(1.0, 0.0, 0.0, n),
            sample(1.0, 0.1, 0.0, n),
            sample(1.0, 0.1, 0.1, n),
            sample(1.0, 0.0, 0.1, n),
        ];
        let patch = BuildPatch::new(&samples, PatchParams::default()).execute().unwrap();
        assert_relative_eq!(*patch.frame.normal(), n);
        assert!(patch.mesh.bounding_box().max.x > 1.05);
    }

    #[test]
    fn overshooting_stroke_is_trimmed_to_a_closed_patch() {
        let up = Vector3::y();
        let mut samples = square_on_top();
        // Back across the first edge, past the start.
        samples.push(sample(0.05, 1.0, -0.03, up));
        let patch = BuildPatch::new(&samples, PatchParams::default()).execute().unwrap();
        assert!(patch.mesh.is_watertight(1e-9));
        assert!(patch.mesh.signed_volume() > 0.0);
    }

    #[test]
    fn fewer_than_three_distinct_points_is_insufficient() {
        let up = Vector3::y();
        let samples = vec![
            sample(0.0, 1.0, 0.0, up),
            sample(0.1, 1.0, 0.0, up),
            sample(0.1, 1.0, 0.0, up),
        ];
        let err = BuildPatch::new(&samples, PatchParams::default()).execute().unwrap_err();
        assert!(matches!(
            err.as_sketch(),
            Some(SketchError::InsufficientSamples { found: 2, .. })
        ));
    }

    #[test]
    fn empty_stroke_is_insufficient() {
        let err = BuildPatch::new(&[], PatchParams::default()).execute().unwrap_err();
        assert!(matches!(
            err.as_sketch(),
            Some(SketchError::InsufficientSamples { found: 0, .. })
        ));
    }
}
