//! Score Report
//!
//! Everything shown after a submission: probability, decision, the
//! contribution table when the model supports it, and the submitted record.
//! Built fresh per submission and never stored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::logic::explain::{self, ContributionRow, TOP_FACTORS};
use crate::logic::model::{Decision, ModelKind, Prediction};

/// Shown instead of the table for opaque models
pub const EXPLANATION_UNAVAILABLE: &str =
    "Top factors are only available for Logistic Regression (interpretable coefficients).";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Explanation {
    Available {
        top_factors: Vec<ContributionRow>,
        summary: String,
    },
    Unavailable {
        message: &'static str,
    },
}

/// One submitted value, layout order
#[derive(Debug, Clone, Serialize)]
pub struct RecordEntry {
    pub feature: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub submission_id: Uuid,
    pub scored_at: DateTime<Utc>,
    pub model: ModelKind,
    pub threshold: f64,
    pub probability: f64,
    pub probability_percent: f64,
    pub decision: Decision,
    pub decision_rule: String,
    pub explanation: Explanation,
    pub record: Vec<RecordEntry>,
    pub inference_time_us: u64,
}

impl ScoreReport {
    pub fn new(prediction: Prediction, threshold: f64) -> Self {
        let decision = Decision::from_probability(prediction.probability, threshold);

        let explanation = match &prediction.contributions {
            Some(rows) => {
                let top_factors = explain::top_contributions(rows, TOP_FACTORS);
                let summary = explain::summary(&top_factors);
                Explanation::Available { top_factors, summary }
            }
            None => Explanation::Unavailable {
                message: EXPLANATION_UNAVAILABLE,
            },
        };

        let record = prediction
            .input
            .raw
            .named_values()
            .map(|(feature, value)| RecordEntry { feature, value })
            .collect();

        Self {
            submission_id: Uuid::new_v4(),
            scored_at: Utc::now(),
            model: prediction.model,
            threshold,
            probability: prediction.probability,
            probability_percent: prediction.probability * 100.0,
            decision,
            decision_rule: decision.rule(threshold),
            explanation,
            record,
            inference_time_us: prediction.inference_time_us,
        }
    }

    /// Probability as a fraction, e.g. `0.123`
    pub fn probability_text(&self) -> String {
        format!("{:.3}", self.probability)
    }

    /// Probability as a percentage, e.g. `12.3%`
    pub fn percent_text(&self) -> String {
        format!("{:.1}%", self.probability_percent)
    }
}
