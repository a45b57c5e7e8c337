use crate::math::Point2;

/// Receives the raw screen path of the stroke in progress, for immediate
/// on-screen feedback independent of the 3D pipeline.
pub trait StrokeTrace {
    /// Replaces the drawn path.
    fn redraw(&mut self, path: &[Point2]);

    /// Removes the drawn path.
    fn clear(&mut self);
}

/// A trace that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrace;

impl StrokeTrace for NullTrace {
    fn redraw(&mut self, _path: &[Point2]) {}

    fn clear(&mut self) {}
}
