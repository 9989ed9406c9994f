use std::fmt;
use std::path::PathBuf;

/// Startup failures while loading the serialized artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt or incompatible artifact {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("unsupported artifact format for {}: expected .onnx or .json", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("transformer produces {transformer_width} features but classifier expects {classifier_width}")]
    Incompatible {
        transformer_width: usize,
        classifier_width: usize,
    },
}

/// Failures raised by the transformer or the classifier for one input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("schema mismatch on column '{column}': {reason}")]
    SchemaMismatch { column: String, reason: String },

    #[error("unseen category '{value}' in column '{column}'")]
    UnseenCategory { column: String, value: String },

    #[error("feature shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("transform failed: {0}")]
    TransformFailure(String),

    #[error("prediction failed: {0}")]
    PredictFailure(String),

    #[error("invalid class probabilities {0:?}")]
    InvalidProbabilities([f64; 2]),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

/// An inference failure together with the input that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionError {
    pub kind: InferenceError,
    pub shape: (usize, usize),
    pub columns: Vec<String>,
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (input shape: ({}, {}); input columns: [{}])",
            self.kind,
            self.shape.0,
            self.shape.1,
            self.columns.join(", ")
        )
    }
}

impl std::error::Error for PredictionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
