//! Score request models

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::logic::model::{ModelKind, DEFAULT_THRESHOLD};
use crate::{AppError, AppResult};
use super::applicant::{Applicant, FORM_FIELDS};

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Session-wide choices that sit outside the applicant record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScoreControls {
    #[serde(default)]
    pub model: ModelKind,

    #[serde(default = "default_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,
}

impl Default for ScoreControls {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ScoreControls {
    pub fn check(&self) -> AppResult<()> {
        if !self.threshold.is_finite() {
            return Err(AppError::ValidationError("threshold must be a finite number".to_string()));
        }
        self.validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid controls: {}", e)))
    }
}

/// JSON body of `POST /api/v1/score`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(flatten)]
    pub controls: ScoreControls,
    #[serde(default)]
    pub applicant: Applicant,
}

/// Urlencoded body of the page form, read input by input so one bad value
/// does not discard the others
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreForm {
    pub controls: ScoreControls,
    pub applicant: Applicant,
    /// One entry per missing or unparseable input
    pub problems: Vec<String>,
}

impl ScoreForm {
    pub fn parse(fields: &HashMap<String, String>) -> Self {
        let mut form = ScoreForm {
            controls: ScoreControls::default(),
            applicant: Applicant::default(),
            problems: Vec::new(),
        };

        match fields.get("model") {
            Some(raw) => match ModelKind::ALL.into_iter().find(|kind| kind.as_str() == raw.trim()) {
                Some(kind) => form.controls.model = kind,
                None => form.problems.push(format!("model: unknown model '{}'", raw)),
            },
            None => form.problems.push("model: missing".to_string()),
        }

        match fields.get("threshold") {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(threshold) => form.controls.threshold = threshold,
                Err(_) => form.problems.push(format!("threshold: '{}' is not a number", raw)),
            },
            None => form.problems.push("threshold: missing".to_string()),
        }

        for spec in &FORM_FIELDS {
            match fields.get(spec.name) {
                Some(raw) => {
                    if let Err(msg) = form.applicant.set_field(spec, raw) {
                        form.problems.push(format!("{}: {}", spec.name, msg));
                    }
                }
                None => form.problems.push(format!("{}: missing", spec.name)),
            }
        }

        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_uses_defaults() {
        let req: ScoreRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.controls, ScoreControls::default());
        assert_eq!(req.controls.threshold, 0.40);
        assert_eq!(req.controls.model, ModelKind::Logistic);
        assert_eq!(req.applicant, Applicant::default());
    }

    #[test]
    fn test_request_reads_controls_and_applicant() {
        let req: ScoreRequest = serde_json::from_str(
            r#"{"model": "random_forest", "threshold": 0.25, "applicant": {"age": 70}}"#,
        )
        .unwrap();
        assert_eq!(req.controls.model, ModelKind::RandomForest);
        assert_eq!(req.controls.threshold, 0.25);
        assert_eq!(req.applicant.age, 70);
    }

    #[test]
    fn test_threshold_range() {
        assert!(ScoreControls { threshold: 0.0, ..Default::default() }.check().is_ok());
        assert!(ScoreControls { threshold: 1.0, ..Default::default() }.check().is_ok());
        assert!(ScoreControls { threshold: 1.01, ..Default::default() }.check().is_err());
        assert!(ScoreControls { threshold: -0.01, ..Default::default() }.check().is_err());
        assert!(ScoreControls { threshold: f64::NAN, ..Default::default() }.check().is_err());
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn complete_form() -> HashMap<String, String> {
        let mut map = fields(&[("model", "random_forest"), ("threshold", "0.25")]);
        let defaults = Applicant::default();
        for spec in &FORM_FIELDS {
            map.insert(spec.name.to_string(), defaults.value(spec.feature).to_string());
        }
        map
    }

    #[test]
    fn test_form_parses_every_input() {
        let mut map = complete_form();
        map.insert("age".to_string(), "70".to_string());

        let form = ScoreForm::parse(&map);
        assert!(form.problems.is_empty(), "{:?}", form.problems);
        assert_eq!(form.controls, ScoreControls { model: ModelKind::RandomForest, threshold: 0.25 });
        assert_eq!(form.applicant, Applicant { age: 70, ..Applicant::default() });
    }

    #[test]
    fn test_bad_input_keeps_the_rest() {
        let mut map = complete_form();
        map.insert("age".to_string(), "thirty".to_string());
        map.insert("monthly_income".to_string(), "7500".to_string());
        map.remove("dependents");

        let form = ScoreForm::parse(&map);
        assert_eq!(form.problems.len(), 2, "{:?}", form.problems);
        assert!(form.problems[0].starts_with("age:"));
        assert_eq!(form.problems[1], "dependents: missing");
        assert_eq!(form.controls.model, ModelKind::RandomForest);
        assert_eq!(form.controls.threshold, 0.25);
        assert_eq!(form.applicant.monthly_income, 7500.0);
        assert_eq!(form.applicant.age, Applicant::default().age);
    }

    #[test]
    fn test_unknown_model_is_reported() {
        let mut map = complete_form();
        map.insert("model".to_string(), "svm".to_string());

        let form = ScoreForm::parse(&map);
        assert_eq!(form.problems, vec!["model: unknown model 'svm'".to_string()]);
        assert_eq!(form.controls.model, ModelKind::Logistic);
    }
}
