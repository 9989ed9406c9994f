//! Employee attrition inference.
//!
//! A [`PredictionRequest`] is assembled into a single-row [`Record`],
//! mapped into feature space by a fitted [`Transformer`] and classified
//! by a [`Classifier`]. Both are loaded once from their artifacts and
//! shared through an [`InferenceService`].

pub mod artifacts;
pub mod classifier;
pub mod error;
pub mod inference;
pub mod schema;
pub mod transformer;
pub mod types;

pub use artifacts::{ArtifactPaths, Artifacts};
pub use classifier::Classifier;
pub use error::{ArtifactError, InferenceError, PredictionError};
pub use inference::{InferenceService, ModelInfo};
pub use transformer::Transformer;
pub use types::{JobRole, Label, MaritalStatus, OverTime, PredictionRequest, PredictionResult, Record, Value};
