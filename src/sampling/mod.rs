mod input;
mod trace;

pub use input::{InputEvent, PointerPhase, StrokeInput};
pub use trace::{NullTrace, StrokeTrace};

use crate::math::{Point2, Point3, Vector3};

/// A client-space pointer position in pixels (Y down).
pub type ScreenPoint = Point2;

/// A point on a solid's surface with the face normal there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub point: Point3,
    /// Unit normal in world space.
    pub normal: Vector3,
}

/// Distance used to thin out a stroke.
pub trait SampleDistance {
    fn distance_to(&self, other: &Self) -> f64;
}

impl SampleDistance for Point2 {
    fn distance_to(&self, other: &Self) -> f64 {
        (self - other).norm()
    }
}

impl SampleDistance for SurfaceSample {
    fn distance_to(&self, other: &Self) -> f64 {
        (self.point - other.point).norm()
    }
}

/// Accumulates the samples of one stroke in arrival order.
///
/// A sample is kept only if it lies farther than `min_distance` from the
/// last kept sample. Kept samples are never removed or reordered until the
/// stroke ends.
#[derive(Debug, Clone)]
pub struct StrokeSampler<S> {
    samples: Vec<S>,
    min_distance: f64,
}

impl<S: SampleDistance> StrokeSampler<S> {
    #[must_use]
    pub fn new(min_distance: f64) -> Self {
        Self {
            samples: Vec::new(),
            min_distance,
        }
    }

    /// Resets the buffer and records the first sample.
    pub fn begin(&mut self, sample: S) {
        self.samples.clear();
        self.samples.push(sample);
    }

    /// Appends `sample` if it is far enough from the last one.
    ///
    /// Returns `true` if the sample was kept. Without a prior
    /// [`begin`](Self::begin) the sample starts the stroke.
    pub fn extend(&mut self, sample: S) -> bool {
        match self.samples.last() {
            Some(last) if last.distance_to(&sample) <= self.min_distance => false,
            _ => {
                self.samples.push(sample);
                true
            }
        }
    }

    /// Finishes the stroke, returning its samples and clearing the buffer.
    pub fn end(&mut self) -> Vec<S> {
        std::mem::take(&mut self.samples)
    }

    /// Samples kept so far.
    #[must_use]
    pub fn samples(&self) -> &[S] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn close_screen_samples_are_dropped() {
        let mut sampler = StrokeSampler::new(2.0);
        sampler.begin(p(0.0, 0.0));
        assert!(!sampler.extend(p(1.0, 1.0)));
        assert!(!sampler.extend(p(2.0, 0.0)));
        assert!(sampler.extend(p(2.5, 0.0)));
        assert!(!sampler.extend(p(3.0, 0.0)));
        assert_eq!(sampler.samples(), &[p(0.0, 0.0), p(2.5, 0.0)]);
    }

    #[test]
    fn begin_resets_and_end_clears() {
        let mut sampler = StrokeSampler::new(2.0);
        sampler.begin(p(0.0, 0.0));
        sampler.extend(p(10.0, 0.0));
        sampler.begin(p(5.0, 5.0));
        assert_eq!(sampler.len(), 1);

        sampler.extend(p(15.0, 5.0));
        let stroke = sampler.end();
        assert_eq!(stroke, vec![p(5.0, 5.0), p(15.0, 5.0)]);
        assert!(sampler.is_empty());
    }

    #[test]
    fn surface_samples_use_world_distance() {
        let s = |x: f64| SurfaceSample {
            point: Point3::new(x, 0.0, 0.0),
            normal: Vector3::z(),
        };
        let mut sampler = StrokeSampler::new(0.003);
        sampler.begin(s(0.0));
        assert!(!sampler.extend(s(0.002)));
        assert!(sampler.extend(s(0.004)));
        assert_eq!(sampler.len(), 2);
    }
}
