//! Fitted feature transformer.
//!
//! The JSON artifact describes a fitted column transformer: one step per
//! input column, applied in order, with outputs concatenated into a
//! single feature row. Columns without a step are dropped.

use ndarray::Array2;
use serde::Deserialize;

use crate::error::{InferenceError, InferenceResult};
use crate::types::{Record, Value};

pub trait Transformer: Send + Sync {
    /// Map a raw record into the classifier's feature space.
    fn transform(&self, record: &Record) -> InferenceResult<Array2<f32>>;

    /// Number of features in a transformed row.
    fn output_width(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encoding {
    Passthrough,
    StandardScaler {
        mean: f64,
        scale: f64,
    },
    MinMaxScaler {
        min: f64,
        max: f64,
    },
    OneHot {
        categories: Vec<String>,
        #[serde(default)]
        drop_first: bool,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Ordinal {
        categories: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnStep {
    pub column: String,
    #[serde(flatten)]
    pub encoding: Encoding,
}

impl ColumnStep {
    fn width(&self) -> usize {
        match &self.encoding {
            Encoding::OneHot {
                categories,
                drop_first,
                ..
            } => categories.len().saturating_sub(usize::from(*drop_first)),
            _ => 1,
        }
    }

    fn numeric(&self, value: &Value) -> InferenceResult<f64> {
        match value {
            Value::Int(v) => Ok(*v as f64),
            Value::Text(s) => Err(InferenceError::SchemaMismatch {
                column: self.column.clone(),
                reason: format!("expected a number, got '{s}'"),
            }),
        }
    }

    fn category<'a>(&self, value: &'a Value) -> InferenceResult<&'a str> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Int(v) => Err(InferenceError::SchemaMismatch {
                column: self.column.clone(),
                reason: format!("expected a category, got {v}"),
            }),
        }
    }

    fn unseen(&self, value: &str) -> InferenceError {
        InferenceError::UnseenCategory {
            column: self.column.clone(),
            value: value.to_string(),
        }
    }

    fn encode(&self, value: &Value, out: &mut Vec<f32>) -> InferenceResult<()> {
        match &self.encoding {
            Encoding::Passthrough => out.push(self.numeric(value)? as f32),
            Encoding::StandardScaler { mean, scale } => {
                if *scale == 0.0 {
                    return Err(InferenceError::TransformFailure(format!(
                        "zero scale for column '{}'",
                        self.column
                    )));
                }
                out.push(((self.numeric(value)? - mean) / scale) as f32);
            }
            Encoding::MinMaxScaler { min, max } => {
                let range = max - min;
                if range == 0.0 {
                    return Err(InferenceError::TransformFailure(format!(
                        "empty range for column '{}'",
                        self.column
                    )));
                }
                out.push(((self.numeric(value)? - min) / range) as f32);
            }
            Encoding::OneHot {
                categories,
                drop_first,
                handle_unknown,
            } => {
                let value = self.category(value)?;
                let hit = categories.iter().position(|c| c == value);
                if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                    return Err(self.unseen(value));
                }
                let skip = usize::from(*drop_first);
                out.extend((skip..categories.len()).map(|i| if hit == Some(i) { 1.0 } else { 0.0 }));
            }
            Encoding::Ordinal { categories } => {
                let value = self.category(value)?;
                let idx = categories
                    .iter()
                    .position(|c| c == value)
                    .ok_or_else(|| self.unseen(value))?;
                out.push(idx as f32);
            }
        }
        Ok(())
    }
}

/// Column transformer restored from its JSON artifact.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnTransformer {
    steps: Vec<ColumnStep>,
}

impl ColumnTransformer {
    pub fn new(steps: Vec<ColumnStep>) -> Self {
        ColumnTransformer { steps }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Columns the transformer was fitted on.
    pub fn input_columns(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.column.as_str()).collect()
    }
}

impl Transformer for ColumnTransformer {
    fn transform(&self, record: &Record) -> InferenceResult<Array2<f32>> {
        let mut row = Vec::with_capacity(self.output_width());
        for step in &self.steps {
            let value = record
                .get(&step.column)
                .ok_or_else(|| InferenceError::SchemaMismatch {
                    column: step.column.clone(),
                    reason: "column missing from input".to_string(),
                })?;
            step.encode(value, &mut row)?;
        }

        if let Some(pos) = row.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::TransformFailure(format!(
                "non-finite feature at position {pos}"
            )));
        }

        let width = row.len();
        log::debug!("transformed record {:?} into (1, {})", record.shape(), width);
        Array2::from_shape_vec((1, width), row).map_err(|e| InferenceError::TransformFailure(e.to_string()))
    }

    fn output_width(&self) -> usize {
        self.steps.iter().map(ColumnStep::width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PredictionRequest;

    fn fitted() -> ColumnTransformer {
        ColumnTransformer::from_json(
            r#"{"steps": [
                {"column": "Age", "kind": "standard_scaler", "mean": 30.0, "scale": 10.0},
                {"column": "MonthlyIncome", "kind": "min_max_scaler", "min": 1000, "max": 51000},
                {"column": "JobLevel", "kind": "passthrough"},
                {"column": "MaritalStatus", "kind": "one_hot",
                 "categories": ["Divorced", "Married", "Single"]},
                {"column": "OverTime", "kind": "one_hot", "categories": ["No", "Yes"], "drop_first": true},
                {"column": "JobRole", "kind": "ordinal",
                 "categories": ["Healthcare Representative", "Manager", "Sales Executive"]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn transforms_defaults() {
        let t = fitted();
        assert_eq!(t.output_width(), 1 + 1 + 1 + 3 + 1 + 1);

        let x = t.transform(&PredictionRequest::default().to_record()).unwrap();
        assert_eq!(x.shape(), &[1, 8]);
        let expected = [0.0, 0.08, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        for (got, want) in x.row(0).iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn unseen_category_is_reported() {
        let t = fitted();
        let request = PredictionRequest {
            job_role: crate::types::JobRole::ResearchScientist,
            ..PredictionRequest::default()
        };
        let err = t.transform(&request.to_record()).unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnseenCategory {
                column: "JobRole".into(),
                value: "Research Scientist".into()
            }
        );
    }

    #[test]
    fn ignored_unknowns_encode_as_zeros() {
        let t = ColumnTransformer::from_json(
            r#"{"steps": [{"column": "JobRole", "kind": "one_hot",
                "categories": ["Manager"], "handle_unknown": "ignore"}]}"#,
        )
        .unwrap();
        let x = t.transform(&PredictionRequest::default().to_record()).unwrap();
        assert_eq!(x.row(0).to_vec(), vec![0.0]);
    }

    #[test]
    fn missing_column_is_a_schema_mismatch() {
        let t = fitted();
        let record = Record::new(vec![("Age", Value::Int(30))]);
        match t.transform(&record) {
            Err(InferenceError::SchemaMismatch { column, .. }) => assert_eq!(column, "MonthlyIncome"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_cell_type_is_a_schema_mismatch() {
        let t = ColumnTransformer::new(vec![ColumnStep {
            column: "Age".into(),
            encoding: Encoding::Passthrough,
        }]);
        let record = Record::new(vec![("Age", Value::Text("thirty".into()))]);
        assert!(matches!(
            t.transform(&record),
            Err(InferenceError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn zero_scale_fails_transform() {
        let t = ColumnTransformer::new(vec![ColumnStep {
            column: "Age".into(),
            encoding: Encoding::StandardScaler { mean: 1.0, scale: 0.0 },
        }]);
        assert!(matches!(
            t.transform(&PredictionRequest::default().to_record()),
            Err(InferenceError::TransformFailure(_))
        ));
    }
}
