//! Loading of the serialized transformer and classifier.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classifier::{Classifier, LogisticClassifier, OnnxClassifier};
use crate::error::ArtifactError;
use crate::transformer::{ColumnTransformer, Transformer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub transformer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    pub fn new(transformer: impl Into<PathBuf>, classifier: impl Into<PathBuf>) -> Self {
        Self {
            transformer: transformer.into(),
            classifier: classifier.into(),
        }
    }
}

/// Loaded, read-only artifacts.
pub struct Artifacts {
    pub transformer: Arc<dyn Transformer>,
    pub classifier: Arc<dyn Classifier>,
}

fn read_to_string(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ArtifactError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn corrupt(path: &Path, reason: impl ToString) -> ArtifactError {
    ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

pub fn load_transformer(path: &Path) -> Result<ColumnTransformer, ArtifactError> {
    let json = read_to_string(path)?;
    ColumnTransformer::from_json(&json).map_err(|e| corrupt(path, e))
}

/// Load the classifier, picking the format from the file extension.
pub fn load_classifier(path: &Path, width: usize) -> Result<Arc<dyn Classifier>, ArtifactError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("onnx") => {
            if !path.exists() {
                return Err(ArtifactError::Missing {
                    path: path.to_path_buf(),
                });
            }
            let model = OnnxClassifier::load(path, width).map_err(|e| corrupt(path, format!("{e:#}")))?;
            Ok(Arc::new(model))
        }
        Some("json") => {
            let json = read_to_string(path)?;
            let model = LogisticClassifier::from_json(&json).map_err(|e| corrupt(path, e))?;
            Ok(Arc::new(model))
        }
        _ => Err(ArtifactError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load both artifacts and check they agree on the feature width.
pub fn load(paths: &ArtifactPaths) -> Result<Artifacts, ArtifactError> {
    let transformer = load_transformer(&paths.transformer)?;
    let width = transformer.output_width();
    log::info!(
        "Transformer loaded from {} ({} input columns, {} features)",
        paths.transformer.display(),
        transformer.input_columns().len(),
        width
    );

    let classifier = load_classifier(&paths.classifier, width)?;
    if classifier.input_width() != width {
        return Err(ArtifactError::Incompatible {
            transformer_width: width,
            classifier_width: classifier.input_width(),
        });
    }
    log::info!(
        "Classifier loaded from {} ({}, {} features)",
        paths.classifier.display(),
        classifier.kind(),
        classifier.input_width()
    );

    Ok(Artifacts {
        transformer: Arc::new(transformer),
        classifier,
    })
}
