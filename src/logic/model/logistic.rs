//! Logistic Regression
//!
//! Interpretable model: `p = σ(intercept + Σ coefᵢ · scaledᵢ)`.
//! Operates on the scaled vector and exposes its coefficients for the
//! contribution breakdown.

use serde::{Deserialize, Serialize};

use crate::logic::artifacts::{fixed_len, require_layout, require_positive_class, InvalidArtifact};
use crate::logic::explain::{self, ContributionRow};
use crate::logic::features::FEATURE_COUNT;
use super::inference::{CreditModel, InferenceError, ModelInput, ModelKind};

/// On-disk form of the logistic model (binary, one coefficient row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    coef: [f64; FEATURE_COUNT],
    intercept: f64,
}

impl LogisticModel {
    pub fn new(coef: [f64; FEATURE_COUNT], intercept: f64) -> Result<Self, InvalidArtifact> {
        if coef.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
            return Err(InvalidArtifact("coefficients must be finite".to_string()));
        }
        Ok(Self { coef, intercept })
    }

    /// Per-feature coefficients in layout order
    pub fn coefficients(&self) -> &[f64; FEATURE_COUNT] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Linear score before the sigmoid
    fn decision_function(&self, input: &ModelInput) -> f64 {
        self.coef
            .iter()
            .zip(input.scaled.as_array())
            .fold(self.intercept, |acc, (c, x)| acc + c * x)
    }
}

impl CreditModel for LogisticModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Logistic
    }

    fn predict_probability(&self, input: &ModelInput) -> Result<f64, InferenceError> {
        let z = self.decision_function(input);
        if !z.is_finite() {
            return Err(InferenceError::NonFiniteScore { model: self.kind() });
        }
        Ok(sigmoid(z))
    }

    fn explain(&self, input: &ModelInput) -> Option<Vec<ContributionRow>> {
        Some(explain::contributions(self.coefficients(), input))
    }
}

impl TryFrom<LogisticArtifact> for LogisticModel {
    type Error = InvalidArtifact;

    fn try_from(artifact: LogisticArtifact) -> Result<Self, Self::Error> {
        require_layout(&artifact.feature_names)?;
        // A binary model's single coefficient row scores the second class
        if artifact.classes.len() != 2 || require_positive_class(&artifact.classes)? != 1 {
            return Err(InvalidArtifact(format!(
                "expected classes [0, 1], found {:?}",
                artifact.classes
            )));
        }
        let coef = fixed_len("coef", artifact.coef)?;
        Self::new(coef, artifact.intercept)
    }
}

/// Numerically stable logistic function
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
