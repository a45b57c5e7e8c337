use nalgebra::Matrix3;
use tracing::debug;

use crate::math::{try_normalize, Point3, Vector3, TOLERANCE, UP};

const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
const FRAC_1_SQRT_3: f64 = 0.577_350_269_189_625_8;

/// Sampled normals cancel when their sum is shorter than this fraction of
/// their summed lengths.
const CANCEL_RATIO: f64 = 1e-6;

/// Directions tried by the coarse principal-component fit: the three axes,
/// the six face diagonals and the four body diagonals (up to sign).
const PCA_CANDIDATES: [[f64; 3]; 13] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0],
    [FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0],
    [FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2],
    [FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2],
    [0.0, FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
    [FRAC_1_SQRT_3, FRAC_1_SQRT_3, FRAC_1_SQRT_3],
    [FRAC_1_SQRT_3, FRAC_1_SQRT_3, -FRAC_1_SQRT_3],
    [FRAC_1_SQRT_3, -FRAC_1_SQRT_3, FRAC_1_SQRT_3],
    [-FRAC_1_SQRT_3, FRAC_1_SQRT_3, FRAC_1_SQRT_3],
];

/// Which step of the fallback chain produced a normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    /// The face normal hit by the first sample.
    FirstSample,
    /// The normalized sum of all sampled normals.
    Average,
    /// The least-variance direction of the sampled points.
    PrincipalAxis,
    /// World up, used when everything else degenerates.
    Vertical,
}

/// A resolved plane normal and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedNormal {
    /// Finite unit normal.
    pub normal: Vector3,
    pub source: NormalSource,
}

/// Resolves one plane normal for a whole surface stroke.
///
/// The chain is tried strictly in order: first-sample normal, average of
/// all normals, principal-axis fit over the points, world up. The result is
/// always a finite unit vector.
pub struct NormalEstimator<'a> {
    normals: &'a [Vector3],
    points: &'a [Point3],
}

impl<'a> NormalEstimator<'a> {
    /// Creates a new `NormalEstimator` over per-sample normals and points.
    #[must_use]
    pub fn new(normals: &'a [Vector3], points: &'a [Point3]) -> Self {
        Self { normals, points }
    }

    /// Executes the fallback chain.
    #[must_use]
    pub fn execute(&self) -> ResolvedNormal {
        let resolved = self
            .first_sample()
            .map(|n| (n, NormalSource::FirstSample))
            .or_else(|| self.average().map(|n| (n, NormalSource::Average)))
            .or_else(|| self.principal_axis().map(|n| (n, NormalSource::PrincipalAxis)))
            .unwrap_or((UP, NormalSource::Vertical));

        if resolved.1 == NormalSource::Vertical {
            debug!("normal estimation degenerated, using vertical");
        } else {
            debug!(source = ?resolved.1, normal = ?resolved.0, "resolved patch normal");
        }
        ResolvedNormal {
            normal: resolved.0,
            source: resolved.1,
        }
    }

    fn first_sample(&self) -> Option<Vector3> {
        self.normals.first().and_then(try_normalize)
    }

    fn average(&self) -> Option<Vector3> {
        let (sum, magnitude) = self
            .normals
            .iter()
            .filter(|n| n.iter().all(|c| c.is_finite()))
            .fold((Vector3::zeros(), 0.0), |(acc, len), n| (acc + n, len + n.norm()));
        if sum.norm() < magnitude * CANCEL_RATIO {
            return None;
        }
        try_normalize(&sum)
    }

    /// Coarse least-variance direction: the candidate minimizing `vᵀ C v`
    /// for the point covariance `C`, oriented to agree with the first
    /// finite sampled normal.
    fn principal_axis(&self) -> Option<Vector3> {
        let finite: Vec<&Point3> = self
            .points
            .iter()
            .filter(|p| p.iter().all(|c| c.is_finite()))
            .collect();
        if finite.len() < 3 {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let count = finite.len() as f64;
        let mean = finite.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / count;
        let mut cov = Matrix3::zeros();
        for p in &finite {
            let d = p.coords - mean;
            cov += d * d.transpose();
        }
        cov /= count;
        if cov.trace() < TOLERANCE {
            return None;
        }

        let best = PCA_CANDIDATES
            .iter()
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .min_by(|a, b| {
                quadratic_form(&cov, a)
                    .partial_cmp(&quadratic_form(&cov, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;

        let reference = self
            .normals
            .iter()
            .find(|n| n.iter().all(|c| c.is_finite()) && n.norm() > TOLERANCE);
        match reference {
            Some(r) if best.dot(r) < 0.0 => Some(-best),
            _ => Some(best),
        }
    }
}

fn quadratic_form(m: &Matrix3<f64>, v: &Vector3) -> f64 {
    v.dot(&(m * v))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn square_on_z_plane() -> Vec<Point3> {
        vec![p(0.0, 0.0, 0.5), p(1.0, 0.0, 0.5), p(1.0, 1.0, 0.5), p(0.0, 1.0, 0.5)]
    }

    // ── first sample ──

    #[test]
    fn first_sample_normal_wins() {
        let normals = [v(0.0, 0.0, 2.0), v(1.0, 0.0, 0.0), v(1.0, 0.0, 0.0)];
        let pts = square_on_z_plane();
        let r = NormalEstimator::new(&normals, &pts).execute();
        assert_eq!(r.source, NormalSource::FirstSample);
        assert_relative_eq!(r.normal, v(0.0, 0.0, 1.0));
    }

    // ── average ──

    #[test]
    fn degenerate_first_falls_back_to_average() {
        let normals = [v(f64::NAN, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)];
        let pts = square_on_z_plane();
        let r = NormalEstimator::new(&normals, &pts).execute();
        assert_eq!(r.source, NormalSource::Average);
        assert_relative_eq!(r.normal, v(1.0, 1.0, 0.0).normalize(), epsilon = 1e-12);
    }

    // ── principal axis ──

    #[test]
    fn canceling_normals_use_principal_axis() {
        let normals = [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(-1.0, 0.0, 0.0)];
        let pts = square_on_z_plane();
        let r = NormalEstimator::new(&normals, &pts).execute();
        assert_eq!(r.source, NormalSource::PrincipalAxis);
        assert_relative_eq!(r.normal.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.normal.z.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nearly_canceling_normals_use_principal_axis() {
        // The sum is 1e-9 long: float noise, not a direction.
        let normals = [v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(-1.0, 1e-9, 0.0)];
        let pts = square_on_z_plane();
        let r = NormalEstimator::new(&normals, &pts).execute();
        assert_eq!(r.source, NormalSource::PrincipalAxis);
        assert_relative_eq!(r.normal.z.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn principal_axis_agrees_with_sampled_normal_sign() {
        // Points spread in x/z, flat in y; the only finite normal points down.
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)];
        let normals = [v(f64::INFINITY, 0.0, 0.0), v(0.0, -1.0, 0.0), v(0.0, 1.0, 0.0)];
        let r = NormalEstimator::new(&normals, &pts).execute();
        assert_eq!(r.source, NormalSource::PrincipalAxis);
        assert_relative_eq!(r.normal, v(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn diagonal_plane_picks_diagonal_candidate() {
        // Plane x + y = 0 spanned by (1, -1, 0) and (0, 0, 1).
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, -1.0, 0.0), p(1.0, -1.0, 1.0), p(0.0, 0.0, 1.0)];
        let r = NormalEstimator::new(&[], &pts).execute();
        assert_eq!(r.source, NormalSource::PrincipalAxis);
        assert_relative_eq!(r.normal, v(1.0, 1.0, 0.0).normalize(), epsilon = 1e-12);
    }

    // ── vertical ──

    #[test]
    fn nothing_usable_is_vertical() {
        let pts = vec![p(1.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 1.0)];
        let r = NormalEstimator::new(&[Vector3::zeros()], &pts).execute();
        assert_eq!(r.source, NormalSource::Vertical);
        assert_eq!(r.normal, UP);
    }

    #[test]
    fn empty_input_is_vertical() {
        let r = NormalEstimator::new(&[], &[]).execute();
        assert_eq!(r.source, NormalSource::Vertical);
    }
}
