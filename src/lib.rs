pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod sampling;
pub mod scene;
pub mod session;
pub mod view;

pub use config::SketchConfig;
pub use error::{Result, SketchError, StrokeformError};
pub use session::{InteractionMode, Notice, SessionPhase, SketchSession, StrokeOutcome};
