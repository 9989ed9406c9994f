//! Binary classifiers over the transformed feature row.

use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;
use tract_onnx::prelude::*;

use crate::error::{InferenceError, InferenceResult};
use crate::types::Label;

pub trait Classifier: Send + Sync {
    /// Short name of the model family, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Number of features expected per row.
    fn input_width(&self) -> usize;

    fn predict(&self, features: &Array2<f32>) -> InferenceResult<Label>;

    /// `[p_stay, p_leave]`.
    fn predict_proba(&self, features: &Array2<f32>) -> InferenceResult<[f64; 2]>;

    /// Label and probabilities together. Implementations that compute
    /// both in one pass should override this.
    fn classify(&self, features: &Array2<f32>) -> InferenceResult<(Label, [f64; 2])> {
        Ok((self.predict(features)?, self.predict_proba(features)?))
    }
}

fn check_width(features: &Array2<f32>, expected: usize) -> InferenceResult<()> {
    if features.ncols() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: features.ncols(),
        });
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Argmax over `[p_stay, p_leave]`; an exact tie is class 0.
fn label_of(proba: [f64; 2]) -> Label {
    if proba[1] > proba[0] {
        Label::Leave
    } else {
        Label::Stay
    }
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX classifier executed with tract.
pub struct OnnxClassifier {
    model: Plan,
    width: usize,
}

impl OnnxClassifier {
    pub fn load<P: AsRef<Path>>(model_path: P, width: usize) -> TractResult<Self> {
        Self::from_model(tract_onnx::onnx().model_for_path(model_path)?, width)
    }

    /// Build from an already decoded ONNX protobuf.
    pub fn from_proto(proto: &tract_onnx::pb::ModelProto, width: usize) -> TractResult<Self> {
        Self::from_model(tract_onnx::onnx().model_for_proto_model(proto)?, width)
    }

    fn from_model(model: InferenceModel, width: usize) -> TractResult<Self> {
        let model = model
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, width)))?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, width })
    }

    fn run(&self, features: &Array2<f32>) -> InferenceResult<(Label, [f64; 2])> {
        check_width(features, self.width)?;
        let row: Vec<f32> = features.iter().copied().collect();
        self.run_row(&row)
            .map_err(|e| InferenceError::PredictFailure(format!("{e:#}")))
    }

    fn run_row(&self, row: &[f32]) -> TractResult<(Label, [f64; 2])> {
        let input = Tensor::from_shape(&[1, self.width], row)?;
        let outputs = self.model.run(tvec!(input.into()))?;

        let mut class = None;
        let mut proba = None;
        let mut logit = None;
        for output in outputs.iter() {
            match (output.datum_type(), output.len()) {
                (DatumType::I64, 1) => class = Some(output.as_slice::<i64>()?[0]),
                (DatumType::F32, 2) => {
                    let p = output.as_slice::<f32>()?;
                    proba = Some([p[0] as f64, p[1] as f64]);
                }
                (DatumType::F32, 1) => logit = Some(output.as_slice::<f32>()?[0]),
                _ => {}
            }
        }

        let proba = match (proba, logit) {
            (Some(p), _) => p,
            (None, Some(z)) => {
                let p = sigmoid(z as f64);
                [1.0 - p, p]
            }
            (None, None) => anyhow::bail!("model produced no probability output"),
        };
        let label = match class {
            Some(c) => Label::from_class(c).ok_or_else(|| anyhow::anyhow!("unexpected class label {c}"))?,
            None => label_of(proba),
        };
        Ok((label, proba))
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn input_width(&self) -> usize {
        self.width
    }

    fn predict(&self, features: &Array2<f32>) -> InferenceResult<Label> {
        self.run(features).map(|(label, _)| label)
    }

    fn predict_proba(&self, features: &Array2<f32>) -> InferenceResult<[f64; 2]> {
        self.run(features).map(|(_, proba)| proba)
    }

    fn classify(&self, features: &Array2<f32>) -> InferenceResult<(Label, [f64; 2])> {
        self.run(features)
    }
}

/// Logistic regression restored from `{"coefficients": [...], "intercept": b}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticClassifier {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Classifier for LogisticClassifier {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &Array2<f32>) -> InferenceResult<Label> {
        self.predict_proba(features).map(label_of)
    }

    fn predict_proba(&self, features: &Array2<f32>) -> InferenceResult<[f64; 2]> {
        check_width(features, self.input_width())?;
        let z: f64 = features
            .row(0)
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| *x as f64 * w)
            .sum::<f64>()
            + self.intercept;
        let leave = sigmoid(z);
        Ok([1.0 - leave, leave])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn logistic_threshold_at_half() {
        let clf = LogisticClassifier::new(vec![1.0, -1.0], 0.0);
        let even = Array2::from_shape_vec((1, 2), vec![0.5, 0.5]).unwrap();
        assert_eq!(clf.predict(&even).unwrap(), Label::Stay);
        assert_eq!(clf.predict_proba(&even).unwrap(), [0.5, 0.5]);

        let low = Array2::from_shape_vec((1, 2), vec![0.0, 3.0]).unwrap();
        let (label, proba) = clf.classify(&low).unwrap();
        assert_eq!(label, Label::Stay);
        assert!(proba[0] > 0.9);
    }

    #[test]
    fn ties_go_to_the_first_class() {
        assert_eq!(label_of([0.5, 0.5]), Label::Stay);
        assert_eq!(label_of([0.4999, 0.5001]), Label::Leave);
        assert_eq!(label_of([0.6, 0.4]), Label::Stay);
    }

    #[test]
    fn logistic_rejects_wrong_width() {
        let clf = LogisticClassifier::from_json(r#"{"coefficients": [0.1, 0.2, 0.3], "intercept": -1.0}"#).unwrap();
        let x = Array2::<f32>::zeros((1, 2));
        assert_eq!(
            clf.predict(&x),
            Err(InferenceError::ShapeMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn onnx_load_fails_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"definitely not protobuf").unwrap();
        assert!(OnnxClassifier::load(&path, 4).is_err());
    }

    proptest! {
        #[test]
        fn logistic_probabilities_sum_to_one(
            weights in prop::collection::vec(-5.0f64..5.0, 4),
            row in prop::collection::vec(-10.0f32..10.0, 4),
            intercept in -5.0f64..5.0,
        ) {
            let clf = LogisticClassifier::new(weights, intercept);
            let x = Array2::from_shape_vec((1, 4), row).unwrap();
            let [stay, leave] = clf.predict_proba(&x).unwrap();
            prop_assert!((stay + leave - 1.0).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&leave));
        }
    }
}
