use tracing::debug;

use crate::config::{ExtrudeParams, LatheParams};
use crate::error::{Result, SketchError};
use crate::math::polygon_2d::{close_loop, fit_unit_square, largest_simple_loop, signed_area};
use crate::math::{Point2, TOLERANCE};
use crate::mesh::TriangleMesh;

use super::{ExtrudeProfile, Lathe};

/// Fewest screen samples a base stroke needs.
const MIN_POINTS: usize = 3;

/// How the first stroke becomes a solid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Linear extrusion of the outline.
    #[default]
    Extrude,
    /// Rotational sweep of the outline around the vertical axis.
    Lathe,
}

impl BuildMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Extrude => Self::Lathe,
            Self::Lathe => Self::Extrude,
        }
    }
}

/// Builds the base solid from a screen-space stroke.
///
/// The stroke is fitted into the `[-1, 1]` square (aspect preserved, screen Y
/// flipped to world Y), turned into a solid by the chosen mode, and
/// re-centered on its bounding-box center. An extruded outline that crosses
/// itself keeps only its largest simple lobe.
pub struct BuildBase<'a> {
    points: &'a [Point2],
    mode: BuildMode,
    extrude: ExtrudeParams,
    lathe: LatheParams,
}

impl<'a> BuildBase<'a> {
    /// Creates a new `BuildBase` operation.
    #[must_use]
    pub fn new(
        points: &'a [Point2],
        mode: BuildMode,
        extrude: ExtrudeParams,
        lathe: LatheParams,
    ) -> Self {
        Self {
            points,
            mode,
            extrude,
            lathe,
        }
    }

    /// Executes the construction.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InsufficientSamples`] when the stroke has fewer
    /// than three points or collapses to a line (extrude) or to a single
    /// height (lathe).
    pub fn execute(&self) -> Result<TriangleMesh> {
        let found = self.points.len();
        if found < MIN_POINTS {
            return Err(insufficient(found));
        }
        let normalized = fit_unit_square(self.points, true);

        let mut mesh = match self.mode {
            BuildMode::Extrude => {
                let closed = close_loop(&normalized, self.extrude.close_threshold);
                let profile = largest_simple_loop(&closed);
                if profile.len() < MIN_POINTS || signed_area(&profile).abs() < TOLERANCE {
                    return Err(insufficient(profile.len()));
                }
                ExtrudeProfile::new(&profile, self.extrude).execute()?
            }
            BuildMode::Lathe => {
                let (lo, hi) = normalized.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), p| (lo.min(p.y), hi.max(p.y)),
                );
                if hi - lo < TOLERANCE {
                    return Err(insufficient(found));
                }
                Lathe::new(&normalized, self.lathe).execute()?
            }
        };

        mesh.center();
        debug!(
            mode = ?self.mode,
            points = found,
            triangles = mesh.triangle_count(),
            "base solid built"
        );
        Ok(mesh)
    }
}

fn insufficient(found: usize) -> crate::error::StrokeformError {
    SketchError::InsufficientSamples {
        found,
        required: MIN_POINTS,
    }
    .into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn build(points: &[Point2], mode: BuildMode) -> Result<TriangleMesh> {
        BuildBase::new(points, mode, ExtrudeParams::base(), LatheParams::default()).execute()
    }

    /// Pentagon in screen pixels (Y down).
    fn pentagon() -> Vec<Point2> {
        (0..5)
            .map(|i| {
                let a = f64::from(i) * std::f64::consts::TAU / 5.0 - std::f64::consts::FRAC_PI_2;
                p(400.0 + 120.0 * a.cos(), 300.0 + 120.0 * a.sin())
            })
            .collect()
    }

    #[test]
    fn extruded_pentagon_is_centered_and_closed() {
        let mesh = build(&pentagon(), BuildMode::Extrude).unwrap();
        let bounds = mesh.bounding_box();
        assert!(!bounds.is_empty());
        assert_relative_eq!(bounds.center().coords.norm(), 0.0, epsilon = 1e-9);
        // Depth plus both bevels.
        assert_relative_eq!(bounds.size().z, 0.6, epsilon = 1e-9);
        assert!(mesh.is_watertight(1e-9));
    }

    #[test]
    fn lathe_pentagon_is_centered() {
        let mesh = build(&pentagon(), BuildMode::Lathe).unwrap();
        assert_relative_eq!(mesh.bounding_box().center().coords.norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn two_points_are_insufficient() {
        let err = build(&[p(0.0, 0.0), p(10.0, 10.0)], BuildMode::Extrude).unwrap_err();
        assert!(matches!(
            err.as_sketch(),
            Some(SketchError::InsufficientSamples { found: 2, required: 3 })
        ));
    }

    #[test]
    fn straight_line_is_insufficient() {
        let pts = [p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0), p(30.0, 0.0)];
        assert!(matches!(
            build(&pts, BuildMode::Extrude).unwrap_err().as_sketch(),
            Some(SketchError::InsufficientSamples { .. })
        ));
        assert!(build(&pts, BuildMode::Lathe).is_err());
    }

    // ── self-crossing strokes ──

    #[test]
    fn overshooting_closure_still_gives_a_closed_solid() {
        // The last point runs back across the first edge.
        let pts = [
            p(100.0, 100.0),
            p(300.0, 100.0),
            p(300.0, 300.0),
            p(100.0, 300.0),
            p(200.0, 50.0),
        ];
        let mesh = build(&pts, BuildMode::Extrude).unwrap();
        assert!(mesh.is_watertight(1e-9));
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn figure_eight_builds_from_one_lobe() {
        let symmetric = [p(100.0, 100.0), p(300.0, 300.0), p(300.0, 100.0), p(100.0, 300.0)];
        // Right lobe wider than the left, crossing between samples.
        let lopsided: Vec<Point2> = (0..60)
            .map(|i| {
                let a = (f64::from(i) + 0.5) * std::f64::consts::TAU / 60.0;
                let r = if a.sin() >= 0.0 { 150.0 } else { 60.0 };
                p(400.0 + r * a.sin(), 300.0 + r * (2.0 * a).sin() * 0.5)
            })
            .collect();
        for pts in [&symmetric[..], &lopsided[..]] {
            let mesh = build(pts, BuildMode::Extrude).unwrap();
            assert!(mesh.is_watertight(1e-9));
            assert!(mesh.signed_volume() > 0.0);
        }
    }

    #[test]
    fn toggle_flips_mode() {
        assert_eq!(BuildMode::Extrude.toggled(), BuildMode::Lathe);
        assert_eq!(BuildMode::default().toggled().toggled(), BuildMode::Extrude);
    }
}
