use std::sync::Arc;

use serde::Serialize;

use crate::artifacts::Artifacts;
use crate::classifier::Classifier;
use crate::error::{InferenceError, InferenceResult, PredictionError};
use crate::schema::{self, FieldSpec};
use crate::transformer::Transformer;
use crate::types::{Label, PredictionResult, Record};

const PROBA_TOLERANCE: f64 = 1e-6;

/// Transformer and classifier pair, loaded once and shared read-only.
#[derive(Clone)]
pub struct InferenceService {
    transformer: Arc<dyn Transformer>,
    classifier: Arc<dyn Classifier>,
}

impl From<Artifacts> for InferenceService {
    fn from(artifacts: Artifacts) -> Self {
        Self::new(artifacts.transformer, artifacts.classifier)
    }
}

impl InferenceService {
    pub fn new(transformer: Arc<dyn Transformer>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            transformer,
            classifier,
        }
    }

    /// Transform the record and classify it.
    pub fn predict(&self, record: &Record) -> Result<PredictionResult, PredictionError> {
        self.run(record).map_err(|kind| PredictionError {
            kind,
            shape: record.shape(),
            columns: record.columns().into_iter().map(String::from).collect(),
        })
    }

    fn run(&self, record: &Record) -> InferenceResult<PredictionResult> {
        let features = self.transformer.transform(record)?;
        let (label, proba) = self.classifier.classify(&features)?;
        check_probabilities(proba)?;

        Ok(PredictionResult {
            label,
            stay_probability: proba[0],
            leave_probability: proba[1],
        })
    }

    pub fn describe(&self) -> ModelInfo {
        ModelInfo {
            classifier: self.classifier.kind().to_string(),
            input_shape: vec![1, self.classifier.input_width()],
            classes: vec![Label::Stay, Label::Leave],
            features: schema::fields(),
        }
    }
}

fn check_probabilities(proba: [f64; 2]) -> InferenceResult<()> {
    let in_unit = proba.iter().all(|p| (0.0..=1.0).contains(p));
    if !in_unit || (proba[0] + proba[1] - 1.0).abs() > PROBA_TOLERANCE {
        return Err(InferenceError::InvalidProbabilities(proba));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub classifier: String,
    pub input_shape: Vec<usize>,
    pub classes: Vec<Label>,
    pub features: Vec<FieldSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobRole, PredictionRequest};
    use ndarray::Array2;

    struct Echo;

    impl Transformer for Echo {
        fn transform(&self, _: &Record) -> InferenceResult<Array2<f32>> {
            Ok(Array2::zeros((1, 2)))
        }

        fn output_width(&self) -> usize {
            2
        }
    }

    struct Fixed([f64; 2]);

    impl Classifier for Fixed {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn input_width(&self) -> usize {
            2
        }

        fn predict(&self, _: &Array2<f32>) -> InferenceResult<Label> {
            Ok(if self.0[1] > 0.5 { Label::Leave } else { Label::Stay })
        }

        fn predict_proba(&self, _: &Array2<f32>) -> InferenceResult<[f64; 2]> {
            Ok(self.0)
        }
    }

    struct Picky;

    impl Transformer for Picky {
        fn transform(&self, record: &Record) -> InferenceResult<Array2<f32>> {
            Err(InferenceError::UnseenCategory {
                column: "JobRole".into(),
                value: record.get("JobRole").map(|v| v.to_string()).unwrap_or_default(),
            })
        }

        fn output_width(&self) -> usize {
            2
        }
    }

    fn service(transformer: impl Transformer + 'static, proba: [f64; 2]) -> InferenceService {
        InferenceService::new(Arc::new(transformer), Arc::new(Fixed(proba)))
    }

    #[test]
    fn stay_prediction() {
        let result = service(Echo, [0.7, 0.3])
            .predict(&PredictionRequest::default().to_record())
            .unwrap();
        assert_eq!(result.label, Label::Stay);
        assert_eq!(result.probabilities(), [0.7, 0.3]);
    }

    #[test]
    fn leave_prediction() {
        let result = service(Echo, [0.2, 0.8])
            .predict(&PredictionRequest::default().to_record())
            .unwrap();
        assert_eq!(result.label, Label::Leave);
        assert_eq!(result.leave_probability, 0.8);
    }

    #[test]
    fn failures_carry_input_diagnostics() {
        let request = PredictionRequest {
            job_role: JobRole::Manager,
            ..PredictionRequest::default()
        };
        let err = service(Picky, [0.5, 0.5]).predict(&request.to_record()).unwrap_err();
        assert_eq!(
            err.kind,
            InferenceError::UnseenCategory {
                column: "JobRole".into(),
                value: "Manager".into()
            }
        );
        assert_eq!(err.shape, (1, 12));
        assert_eq!(err.columns, schema::COLUMNS.to_vec());
    }

    #[test]
    fn unnormalised_probabilities_are_rejected() {
        let err = service(Echo, [0.6, 0.6])
            .predict(&PredictionRequest::default().to_record())
            .unwrap_err();
        assert_eq!(err.kind, InferenceError::InvalidProbabilities([0.6, 0.6]));
    }

    #[test]
    fn describe_reports_width_and_schema() {
        let info = service(Echo, [0.5, 0.5]).describe();
        assert_eq!(info.classifier, "fixed");
        assert_eq!(info.input_shape, vec![1, 2]);
        assert_eq!(info.features.len(), 12);
    }
}
