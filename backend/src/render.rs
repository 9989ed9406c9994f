//! HTML rendering of the prediction page.

use attrition_inferences::schema::{self, Domain, FieldSpec, Widget};
use attrition_inferences::{Label, PredictionError, PredictionRequest, PredictionResult, Record};

const NUMERIC_LEFT: [&str; 5] = [
    schema::AGE,
    schema::JOB_INVOLVEMENT,
    schema::JOB_LEVEL,
    schema::MONTHLY_INCOME,
    schema::STOCK_OPTION_LEVEL,
];
const NUMERIC_RIGHT: [&str; 4] = [
    schema::TOTAL_WORKING_YEARS,
    schema::YEARS_AT_COMPANY,
    schema::YEARS_IN_CURRENT_ROLE,
    schema::YEARS_WITH_CURR_MANAGER,
];
const CATEGORICAL: [&str; 3] = [schema::JOB_ROLE, schema::MARITAL_STATUS, schema::OVER_TIME];

const COMPATIBILITY_HINT: &str =
    "Please check that your model and transformer files are compatible with the input data.";

/// What to show under the form.
#[derive(Debug)]
pub enum Outcome {
    Predicted(PredictionResult),
    Failed(PredictionError),
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Low,
}

/// Risk framing of a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub headline: &'static str,
    pub message: &'static str,
    pub headline_label: &'static str,
    pub headline_probability: f64,
    pub stay_probability: f64,
    pub leave_probability: f64,
}

impl From<&PredictionResult> for RiskAssessment {
    fn from(result: &PredictionResult) -> Self {
        let (level, headline, message, headline_label, headline_probability) = match result.label {
            Label::Leave => (
                RiskLevel::High,
                "High Risk",
                "This employee is likely to leave the company.",
                "Probability of Attrition",
                result.leave_probability,
            ),
            Label::Stay => (
                RiskLevel::Low,
                "Low Risk",
                "This employee is likely to stay with the company.",
                "Probability of Retention",
                result.stay_probability,
            ),
        };

        RiskAssessment {
            level,
            headline,
            message,
            headline_label,
            headline_probability,
            stay_probability: result.stay_probability,
            leave_probability: result.leave_probability,
        }
    }
}

impl RiskAssessment {
    pub fn headline_line(&self) -> String {
        format!("{}: {}", self.headline_label, percent(self.headline_probability))
    }

    pub fn stay_line(&self) -> String {
        format!("Stay Probability: {}", percent(self.stay_probability))
    }

    pub fn leave_line(&self) -> String {
        format!("Leave Probability: {}", percent(self.leave_probability))
    }
}

/// Probability as a percentage with two decimals.
pub fn percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_field(out: &mut String, spec: &FieldSpec, current: Option<String>) {
    let name = spec.column;
    let current = current.unwrap_or_default();
    out.push_str(&format!("<div class=\"field\"><label for=\"{name}\">{}</label>", escape(spec.label)));

    match (&spec.widget, &spec.domain) {
        (Widget::Slider, Domain::Range { min, max, step }) => {
            out.push_str(&format!(
                "<input type=\"range\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" \
                 value=\"{v}\" oninput=\"this.nextElementSibling.value=this.value\"><output>{v}</output>",
                v = escape(&current)
            ));
        }
        (_, Domain::Range { min, max, step }) => {
            out.push_str(&format!(
                "<input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{}\">",
                escape(&current)
            ));
        }
        (_, Domain::Levels { values }) => {
            let options: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            render_select(out, name, &options, &current);
        }
        (_, Domain::Options { values }) => {
            let options: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            render_select(out, name, &options, &current);
        }
    }
    out.push_str("</div>");
}

fn render_select(out: &mut String, name: &str, options: &[String], current: &str) {
    out.push_str(&format!("<select id=\"{name}\" name=\"{name}\">"));
    for option in options {
        let selected = if option == current { " selected" } else { "" };
        out.push_str(&format!("<option value=\"{o}\"{selected}>{o}</option>", o = escape(option)));
    }
    out.push_str("</select>");
}

fn render_group(out: &mut String, record: &Record, columns: &[&str]) {
    for column in columns {
        if let Some(spec) = schema::field(column) {
            render_field(out, &spec, record.get(column).map(|v| v.to_string()));
        }
    }
}

fn render_outcome(out: &mut String, outcome: &Outcome) {
    match outcome {
        Outcome::Predicted(result) => {
            let risk = RiskAssessment::from(result);
            let class = match risk.level {
                RiskLevel::High => "error",
                RiskLevel::Low => "success",
            };
            out.push_str(&format!(
                "<section class=\"result\"><h2>Prediction Result</h2>\
                 <p class=\"{class}\"><strong>{}</strong>: {}</p>\
                 <p><strong>{}</strong></p><hr>\
                 <div class=\"columns\"><div class=\"metric\">{}</div><div class=\"metric\">{}</div></div></section>",
                risk.headline,
                risk.message,
                risk.headline_line(),
                risk.stay_line(),
                risk.leave_line()
            ));
        }
        Outcome::Failed(err) => {
            out.push_str(&format!(
                "<section class=\"result\"><p class=\"error\">An error occurred during prediction: {}</p>\
                 <p>{COMPATIBILITY_HINT}</p>\
                 <p>Input data shape: ({}, {})</p><p>Input columns: [{}]</p></section>",
                escape(&err.kind.to_string()),
                err.shape.0,
                err.shape.1,
                escape(&err.columns.join(", "))
            ));
        }
        Outcome::Rejected(reason) => {
            out.push_str(&format!(
                "<section class=\"result\"><p class=\"error\">Invalid form submission: {}</p></section>",
                escape(reason)
            ));
        }
    }
}

/// Render the whole page for the current form values.
pub fn render_page(request: &PredictionRequest, outcome: Option<&Outcome>) -> String {
    let record = request.to_record();
    let mut out = String::with_capacity(8 * 1024);

    out.push_str(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Employee Attrition Prediction</title>\
         <link rel=\"stylesheet\" href=\"/static/style.css\"></head><body><main>\
         <h1>💼 Employee Attrition Prediction App</h1>\
         <p>Enter employee details below to predict whether the employee is likely to leave or stay.</p>\
         <form method=\"post\" action=\"/predict\">\
         <h3>Enter Employee Information</h3><div class=\"columns\"><div class=\"column\">",
    );
    render_group(&mut out, &record, &NUMERIC_LEFT);
    out.push_str("</div><div class=\"column\">");
    render_group(&mut out, &record, &NUMERIC_RIGHT);
    out.push_str("</div></div><h3>Select Job Role, Marital Status, and Overtime</h3>");
    render_group(&mut out, &record, &CATEGORICAL);
    out.push_str("<button type=\"submit\" class=\"primary\">Predict Attrition</button></form>");

    if let Some(outcome) = outcome {
        render_outcome(&mut out, outcome);
    }

    out.push_str(
        "<hr><p class=\"caption\">💡 This prediction is based on machine learning and should be used as a guide, \
         not a definitive answer.</p></main></body></html>",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition_inferences::{InferenceError, JobRole};
    use proptest::prelude::*;

    fn result(label: Label, proba: [f64; 2]) -> PredictionResult {
        PredictionResult {
            label,
            stay_probability: proba[0],
            leave_probability: proba[1],
        }
    }

    #[test]
    fn low_risk_shows_stay_probability() {
        let risk = RiskAssessment::from(&result(Label::Stay, [0.7, 0.3]));
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.headline, "Low Risk");
        assert_eq!(risk.headline_probability, 0.7);
        assert_eq!(risk.headline_line(), "Probability of Retention: 70.00%");
        assert_eq!(risk.stay_line(), "Stay Probability: 70.00%");
        assert_eq!(risk.leave_line(), "Leave Probability: 30.00%");
    }

    #[test]
    fn high_risk_shows_attrition_probability() {
        let risk = RiskAssessment::from(&result(Label::Leave, [0.2, 0.8]));
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.headline, "High Risk");
        assert_eq!(risk.headline_probability, 0.8);
        assert_eq!(risk.headline_line(), "Probability of Attrition: 80.00%");
        assert_eq!(risk.stay_line(), "Stay Probability: 20.00%");
    }

    #[test]
    fn percent_rounds_to_two_decimals() {
        assert_eq!(percent(0.12345), "12.35%");
        assert_eq!(percent(1.0), "100.00%");
        assert_eq!(percent(0.0), "0.00%");
    }

    #[test]
    fn idle_page_has_form_and_no_result() {
        let page = render_page(&PredictionRequest::default(), None);
        assert!(page.contains("Predict Attrition"));
        assert!(page.contains("name=\"MonthlyIncome\" min=\"1000\" max=\"50000\" step=\"100\" value=\"5000\""));
        assert!(page.contains("<option value=\"Healthcare Representative\" selected>"));
        assert!(!page.contains("Prediction Result"));
    }

    #[test]
    fn result_page_keeps_form_values() {
        let request = PredictionRequest {
            job_role: JobRole::SalesExecutive,
            ..PredictionRequest::default()
        };
        let outcome = Outcome::Predicted(result(Label::Leave, [0.2, 0.8]));
        let page = render_page(&request, Some(&outcome));
        assert!(page.contains("<option value=\"Sales Executive\" selected>"));
        assert!(page.contains("High Risk"));
        assert!(page.contains("Probability of Attrition: 80.00%"));
        assert!(page.contains("Stay Probability: 20.00%"));
        assert!(page.contains("Leave Probability: 80.00%"));
    }

    #[test]
    fn failure_page_lists_shape_and_columns() {
        let err = PredictionError {
            kind: InferenceError::UnseenCategory {
                column: "JobRole".into(),
                value: "<script>".into(),
            },
            shape: (1, 12),
            columns: schema::COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        let page = render_page(&PredictionRequest::default(), Some(&Outcome::Failed(err)));
        assert!(page.contains("An error occurred during prediction"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("Input data shape: (1, 12)"));
        assert!(page.contains("Input columns: [Age, JobInvolvement"));
        assert!(page.contains(COMPATIBILITY_HINT));
    }

    #[test]
    fn rejection_reason_is_escaped() {
        let outcome = Outcome::Rejected("invalid value \"<b>\" for JobRole".into());
        let page = render_page(&PredictionRequest::default(), Some(&outcome));
        assert!(page.contains("Invalid form submission: invalid value &quot;&lt;b&gt;&quot; for JobRole"));
        assert!(!page.contains("<b>"));
        assert!(!page.contains("Prediction Result"));
    }

    proptest! {
        #[test]
        fn headline_tracks_predicted_label(leave in 0.0f64..=1.0) {
            let proba = [1.0 - leave, leave];
            for label in [Label::Stay, Label::Leave] {
                let risk = RiskAssessment::from(&result(label, proba));
                prop_assert_eq!(risk.headline_probability, proba[label.as_class() as usize]);
                prop_assert_eq!(risk.stay_line(), format!("Stay Probability: {}", percent(proba[0])));
                prop_assert_eq!(risk.leave_line(), format!("Leave Probability: {}", percent(proba[1])));
            }
        }
    }
}
