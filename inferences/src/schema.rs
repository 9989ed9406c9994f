//! Column schema shared by the form and the fitted transformer.
//!
//! Column names and their order are the contract with the transformer
//! artifact: they must match the frame it was fitted on.

use serde::Serialize;

use crate::types::{JobRole, MaritalStatus, OverTime};

pub const AGE: &str = "Age";
pub const JOB_INVOLVEMENT: &str = "JobInvolvement";
pub const JOB_LEVEL: &str = "JobLevel";
pub const JOB_ROLE: &str = "JobRole";
pub const MARITAL_STATUS: &str = "MaritalStatus";
pub const MONTHLY_INCOME: &str = "MonthlyIncome";
pub const OVER_TIME: &str = "OverTime";
pub const STOCK_OPTION_LEVEL: &str = "StockOptionLevel";
pub const TOTAL_WORKING_YEARS: &str = "TotalWorkingYears";
pub const YEARS_AT_COMPANY: &str = "YearsAtCompany";
pub const YEARS_IN_CURRENT_ROLE: &str = "YearsInCurrentRole";
pub const YEARS_WITH_CURR_MANAGER: &str = "YearsWithCurrManager";

/// Record columns, in the order the transformer was fitted with.
pub const COLUMNS: [&str; 12] = [
    AGE,
    JOB_INVOLVEMENT,
    JOB_LEVEL,
    JOB_ROLE,
    MARITAL_STATUS,
    MONTHLY_INCOME,
    OVER_TIME,
    STOCK_OPTION_LEVEL,
    TOTAL_WORKING_YEARS,
    YEARS_AT_COMPANY,
    YEARS_IN_CURRENT_ROLE,
    YEARS_WITH_CURR_MANAGER,
];

/// Input control used to edit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Slider,
    Select,
    Number,
}

/// Values a field may take.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Domain {
    Range { min: i64, max: i64, step: i64 },
    Levels { values: Vec<i64> },
    Options { values: Vec<&'static str> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Int(i64),
    Text(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub column: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub domain: Domain,
    pub default: DefaultValue,
}

impl FieldSpec {
    fn slider(column: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            column,
            label,
            widget: Widget::Slider,
            domain: Domain::Range { min, max, step: 1 },
            default: DefaultValue::Int(default),
        }
    }

    fn levels(column: &'static str, label: &'static str, min: i64, max: i64) -> Self {
        Self {
            column,
            label,
            widget: Widget::Select,
            domain: Domain::Levels {
                values: (min..=max).collect(),
            },
            default: DefaultValue::Int(min),
        }
    }

    fn options(column: &'static str, label: &'static str, values: Vec<&'static str>) -> Self {
        let default = DefaultValue::Text(values[0]);
        Self {
            column,
            label,
            widget: Widget::Select,
            domain: Domain::Options { values },
            default,
        }
    }

    /// Inclusive integer bounds of a numeric field.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match &self.domain {
            Domain::Range { min, max, .. } => Some((*min, *max)),
            Domain::Levels { values } => Some((*values.first()?, *values.last()?)),
            Domain::Options { .. } => None,
        }
    }

    /// Widget-level range clamp. Categorical fields pass through.
    pub fn clamp(&self, value: i64) -> i64 {
        match self.bounds() {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.domain, Domain::Options { .. })
    }
}

/// Field declarations in record column order.
pub fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::slider(AGE, "Age", 18, 60, 30),
        FieldSpec::levels(JOB_INVOLVEMENT, "Job Involvement (1–4)", 1, 4),
        FieldSpec::levels(JOB_LEVEL, "Job Level (1–5)", 1, 5),
        FieldSpec::options(JOB_ROLE, "Job Role", JobRole::ALL.iter().map(|r| r.as_str()).collect()),
        FieldSpec::options(
            MARITAL_STATUS,
            "Marital Status",
            MaritalStatus::ALL.iter().map(|s| s.as_str()).collect(),
        ),
        FieldSpec {
            column: MONTHLY_INCOME,
            label: "Monthly Income",
            widget: Widget::Number,
            domain: Domain::Range {
                min: 1000,
                max: 50000,
                step: 100,
            },
            default: DefaultValue::Int(5000),
        },
        FieldSpec::options(OVER_TIME, "OverTime", OverTime::ALL.iter().map(|o| o.as_str()).collect()),
        FieldSpec::levels(STOCK_OPTION_LEVEL, "Stock Option Level", 0, 3),
        FieldSpec::slider(TOTAL_WORKING_YEARS, "Total Working Years", 0, 40, 10),
        FieldSpec::slider(YEARS_AT_COMPANY, "Years at Company", 0, 40, 5),
        FieldSpec::slider(YEARS_IN_CURRENT_ROLE, "Years in Current Role", 0, 20, 3),
        FieldSpec::slider(YEARS_WITH_CURR_MANAGER, "Years with Current Manager", 0, 20, 3),
    ]
}

/// Look up a single field by column name.
pub fn field(column: &str) -> Option<FieldSpec> {
    fields().into_iter().find(|f| f.column == column)
}
