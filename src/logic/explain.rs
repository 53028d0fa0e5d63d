//! Contribution breakdown for linear models
//!
//! Each feature's share of the logit is `scaled value × coefficient`.
//! Rows are rebuilt on every submission from the active model and the
//! current scaled vector.

use serde::Serialize;

use crate::logic::features::{Feature, FEATURE_COUNT};
use crate::logic::model::ModelInput;

/// Rows shown in the top factors table
pub const TOP_FACTORS: usize = 5;

/// Sign of a contribution; zero counts as reducing risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    IncreasesRisk,
    DecreasesRisk,
}

impl Direction {
    pub fn of(contribution: f64) -> Self {
        if contribution > 0.0 {
            Direction::IncreasesRisk
        } else {
            Direction::DecreasesRisk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::IncreasesRisk => "increases risk",
            Direction::DecreasesRisk => "decreases risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionRow {
    pub feature: &'static str,
    pub input_value: f64,
    pub contribution: f64,
    pub direction: Direction,
}

/// One row per feature, layout order
pub fn contributions(coef: &[f64; FEATURE_COUNT], input: &ModelInput) -> Vec<ContributionRow> {
    Feature::ALL
        .iter()
        .map(|&feature| {
            let contribution = input.scaled.get(feature) * coef[feature.index()];
            ContributionRow {
                feature: feature.column(),
                input_value: input.raw.get(feature),
                contribution,
                direction: Direction::of(contribution),
            }
        })
        .collect()
}

/// The `k` rows with the largest |contribution|; ties keep layout order
pub fn top_contributions(rows: &[ContributionRow], k: usize) -> Vec<ContributionRow> {
    let mut sorted = rows.to_vec();
    // sort_by is stable
    sorted.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    sorted.truncate(k);
    sorted
}

/// Sentence naming the top features in rank order
pub fn summary(top: &[ContributionRow]) -> String {
    let names: Vec<&str> = top.iter().map(|row| row.feature).collect();
    format!(
        "The features that most influenced the decision were: {}.",
        names.join(", ")
    )
}
