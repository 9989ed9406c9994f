use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum JobRole {
    #[serde(rename = "Healthcare Representative")]
    HealthcareRepresentative,
    #[serde(rename = "Human Resources")]
    HumanResources,
    #[serde(rename = "Laboratory Technician")]
    LaboratoryTechnician,
    #[serde(rename = "Manager")]
    Manager,
    #[serde(rename = "Manufacturing Director")]
    ManufacturingDirector,
    #[serde(rename = "Research Director")]
    ResearchDirector,
    #[serde(rename = "Research Scientist")]
    ResearchScientist,
    #[serde(rename = "Sales Executive")]
    SalesExecutive,
    #[serde(rename = "Sales Representative")]
    SalesRepresentative,
}

impl FromStr for JobRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobRole::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown job role {s:?}"))
    }
}

impl JobRole {
    pub const ALL: [JobRole; 9] = [
        JobRole::HealthcareRepresentative,
        JobRole::HumanResources,
        JobRole::LaboratoryTechnician,
        JobRole::Manager,
        JobRole::ManufacturingDirector,
        JobRole::ResearchDirector,
        JobRole::ResearchScientist,
        JobRole::SalesExecutive,
        JobRole::SalesRepresentative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobRole::HealthcareRepresentative => "Healthcare Representative",
            JobRole::HumanResources => "Human Resources",
            JobRole::LaboratoryTechnician => "Laboratory Technician",
            JobRole::Manager => "Manager",
            JobRole::ManufacturingDirector => "Manufacturing Director",
            JobRole::ResearchDirector => "Research Director",
            JobRole::ResearchScientist => "Research Scientist",
            JobRole::SalesExecutive => "Sales Executive",
            JobRole::SalesRepresentative => "Sales Representative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MaritalStatus {
    Divorced,
    Married,
    Single,
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaritalStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown marital status {s:?}"))
    }
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 3] = [MaritalStatus::Divorced, MaritalStatus::Married, MaritalStatus::Single];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Married => "Married",
            MaritalStatus::Single => "Single",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum OverTime {
    No,
    Yes,
}

impl FromStr for OverTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OverTime::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown overtime answer {s:?}"))
    }
}

impl OverTime {
    pub const ALL: [OverTime; 2] = [OverTime::No, OverTime::Yes];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverTime::No => "No",
            OverTime::Yes => "Yes",
        }
    }
}

/// Employee attributes collected by the form.
///
/// Serialized names are the record column names, so the same struct
/// decodes the submitted form and documents the transformer contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionRequest {
    pub age: i64,
    pub job_involvement: i64,
    pub job_level: i64,
    pub job_role: JobRole,
    pub marital_status: MaritalStatus,
    pub monthly_income: i64,
    pub over_time: OverTime,
    pub stock_option_level: i64,
    pub total_working_years: i64,
    pub years_at_company: i64,
    pub years_in_current_role: i64,
    pub years_with_curr_manager: i64,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        PredictionRequest {
            age: 30,
            job_involvement: 1,
            job_level: 1,
            job_role: JobRole::HealthcareRepresentative,
            marital_status: MaritalStatus::Divorced,
            monthly_income: 5000,
            over_time: OverTime::No,
            stock_option_level: 0,
            total_working_years: 10,
            years_at_company: 5,
            years_in_current_role: 3,
            years_with_curr_manager: 3,
        }
    }
}

impl PredictionRequest {
    /// Apply the widget range clamps to every numeric field.
    pub fn clamped(&self) -> Self {
        let clamp = |column: &str, value: i64| {
            schema::field(column)
                .map(|f| f.clamp(value))
                .unwrap_or(value)
        };

        PredictionRequest {
            age: clamp(schema::AGE, self.age),
            job_involvement: clamp(schema::JOB_INVOLVEMENT, self.job_involvement),
            job_level: clamp(schema::JOB_LEVEL, self.job_level),
            monthly_income: clamp(schema::MONTHLY_INCOME, self.monthly_income),
            stock_option_level: clamp(schema::STOCK_OPTION_LEVEL, self.stock_option_level),
            total_working_years: clamp(schema::TOTAL_WORKING_YEARS, self.total_working_years),
            years_at_company: clamp(schema::YEARS_AT_COMPANY, self.years_at_company),
            years_in_current_role: clamp(schema::YEARS_IN_CURRENT_ROLE, self.years_in_current_role),
            years_with_curr_manager: clamp(schema::YEARS_WITH_CURR_MANAGER, self.years_with_curr_manager),
            ..self.clone()
        }
    }

    /// Decode submitted `(column, value)` pairs one field at a time.
    ///
    /// A field that is missing or does not parse keeps its default and is
    /// reported, so a rejected submission can be shown again with every
    /// value that did decode. Unknown columns are ignored.
    pub fn from_fields<'a, I>(fields: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut request = PredictionRequest::default();
        let mut seen: Vec<&str> = Vec::new();
        let mut problems = Vec::new();

        for (column, raw) in fields {
            let raw = raw.trim();
            let parsed = match column {
                schema::AGE => parse_into(raw, &mut request.age),
                schema::JOB_INVOLVEMENT => parse_into(raw, &mut request.job_involvement),
                schema::JOB_LEVEL => parse_into(raw, &mut request.job_level),
                schema::JOB_ROLE => parse_into(raw, &mut request.job_role),
                schema::MARITAL_STATUS => parse_into(raw, &mut request.marital_status),
                schema::MONTHLY_INCOME => parse_into(raw, &mut request.monthly_income),
                schema::OVER_TIME => parse_into(raw, &mut request.over_time),
                schema::STOCK_OPTION_LEVEL => parse_into(raw, &mut request.stock_option_level),
                schema::TOTAL_WORKING_YEARS => parse_into(raw, &mut request.total_working_years),
                schema::YEARS_AT_COMPANY => parse_into(raw, &mut request.years_at_company),
                schema::YEARS_IN_CURRENT_ROLE => parse_into(raw, &mut request.years_in_current_role),
                schema::YEARS_WITH_CURR_MANAGER => parse_into(raw, &mut request.years_with_curr_manager),
                _ => continue,
            };
            if !parsed {
                problems.push(format!("invalid value {raw:?} for {column}"));
            }
            seen.push(column);
        }

        for column in schema::COLUMNS {
            if !seen.contains(&column) {
                problems.push(format!("missing field {column}"));
            }
        }
        (request, problems)
    }

    /// Assemble the single-row record handed to the transformer.
    pub fn to_record(&self) -> Record {
        Record::new(vec![
            (schema::AGE, Value::Int(self.age)),
            (schema::JOB_INVOLVEMENT, Value::Int(self.job_involvement)),
            (schema::JOB_LEVEL, Value::Int(self.job_level)),
            (schema::JOB_ROLE, Value::Text(self.job_role.as_str().to_string())),
            (schema::MARITAL_STATUS, Value::Text(self.marital_status.as_str().to_string())),
            (schema::MONTHLY_INCOME, Value::Int(self.monthly_income)),
            (schema::OVER_TIME, Value::Text(self.over_time.as_str().to_string())),
            (schema::STOCK_OPTION_LEVEL, Value::Int(self.stock_option_level)),
            (schema::TOTAL_WORKING_YEARS, Value::Int(self.total_working_years)),
            (schema::YEARS_AT_COMPANY, Value::Int(self.years_at_company)),
            (schema::YEARS_IN_CURRENT_ROLE, Value::Int(self.years_in_current_role)),
            (schema::YEARS_WITH_CURR_MANAGER, Value::Int(self.years_with_curr_manager)),
        ])
    }
}

fn parse_into<T: FromStr>(raw: &str, slot: &mut T) -> bool {
    match raw.parse() {
        Ok(value) => {
            *slot = value;
            true
        }
        Err(_) => false,
    }
}

/// A single cell of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Single-row labeled record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    cells: Vec<(String, Value)>,
}

impl Record {
    pub fn new<S: Into<String>>(cells: Vec<(S, Value)>) -> Self {
        Record {
            cells: cells.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// `(rows, columns)`; a record is always one row.
    pub fn shape(&self) -> (usize, usize) {
        (1, self.cells.len())
    }

    pub fn columns(&self) -> Vec<&str> {
        self.cells.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Stay = 0,
    Leave = 1,
}

impl Label {
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Label::Stay),
            1 => Some(Label::Leave),
            _ => None,
        }
    }

    pub fn as_class(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: Label,
    pub stay_probability: f64,
    pub leave_probability: f64,
}

impl PredictionResult {
    pub fn probabilities(&self) -> [f64; 2] {
        [self.stay_probability, self.leave_probability]
    }
}
