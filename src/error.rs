use thiserror::Error;

/// Top-level error type for the sketching core.
#[derive(Debug, Error)]
pub enum StrokeformError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Sketch(#[from] SketchError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Recoverable outcomes of a stroke or scene action that discard the
/// in-progress work and leave the scene untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SketchError {
    #[error("stroke has {found} usable points, at least {required} are needed")]
    InsufficientSamples { found: usize, required: usize },

    #[error("stroke did not start on the model")]
    OffModelStart,

    #[error("patch does not touch any existing solid")]
    NoAttachment,

    #[error("nothing to export")]
    EmptyExport,
}

/// Errors related to the scene model.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("solid not found")]
    SolidNotFound,

    #[error("a base solid can only be added to an empty scene")]
    BaseNotFirst,

    #[error("the base solid cannot be removed while other solids remain")]
    BaseInUse,
}

/// Errors related to configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

/// Errors reported by an export collaborator.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export sink failed: {0}")]
    Sink(String),
}

/// Convenience type alias for results using [`StrokeformError`].
pub type Result<T> = std::result::Result<T, StrokeformError>;

impl StrokeformError {
    /// Returns the sketch-level rejection if this error is one.
    #[must_use]
    pub fn as_sketch(&self) -> Option<&SketchError> {
        match self {
            Self::Sketch(e) => Some(e),
            _ => None,
        }
    }
}
