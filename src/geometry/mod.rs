mod frame;
mod normal;

pub use frame::SurfaceFrame;
pub use normal::{NormalEstimator, NormalSource, ResolvedNormal};
