//! Inference Adapter
//!
//! Turns one applicant vector into a delinquency probability:
//! 1. scale the raw vector (always, the breakdown needs it)
//! 2. hand both vectors to the active model
//! 3. the model picks the one it was fit on and returns P(class = 1)
//!
//! Models are selected through [`CreditModel`] so callers never branch on
//! the concrete variant.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::logic::artifacts::Artifacts;
use crate::logic::explain::ContributionRow;
use crate::logic::features::{FeatureVector, ScaledFeatureVector};

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Failure while scoring a single submission
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("scaler produced a non-finite value for '{feature}'")]
    NonFiniteScaled { feature: &'static str },

    #[error("{model} produced a non-finite score")]
    NonFiniteScore { model: ModelKind },

    #[error("{model} returned probability {probability} outside [0, 1]")]
    ProbabilityOutOfRange { model: ModelKind, probability: f64 },
}

// ============================================================================
// MODEL VARIANTS
// ============================================================================

/// Which loaded classifier scores a submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Logistic,
    RandomForest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Logistic, ModelKind::RandomForest];

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            ModelKind::Logistic => "Logistic Regression",
            ModelKind::RandomForest => "Random Forest",
        }
    }

    /// Wire name, as accepted in requests
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Logistic => "logistic",
            ModelKind::RandomForest => "random_forest",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Both forms of one submission's features
#[derive(Debug, Clone, Copy)]
pub struct ModelInput {
    pub raw: FeatureVector,
    pub scaled: ScaledFeatureVector,
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// A loaded binary classifier
pub trait CreditModel: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Probability of the positive (delinquent) class
    fn predict_probability(&self, input: &ModelInput) -> Result<f64, InferenceError>;

    /// Per-feature contributions, for models that can attribute their score
    fn explain(&self, _input: &ModelInput) -> Option<Vec<ContributionRow>> {
        None
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// Prediction output
#[derive(Debug, Clone)]
pub struct Prediction {
    pub model: ModelKind,
    pub input: ModelInput,
    pub probability: f64,
    /// All features, layout order; `None` when the model is opaque
    pub contributions: Option<Vec<ContributionRow>>,
    pub inference_time_us: u64,
}

/// Score `raw` with the model selected by `kind`
pub fn predict(
    artifacts: &Artifacts,
    kind: ModelKind,
    raw: FeatureVector,
) -> Result<Prediction, InferenceError> {
    predict_with(&artifacts.scaler, artifacts.model(kind), raw)
}

/// Score `raw` with an explicit scaler and model
pub fn predict_with(
    scaler: &super::StandardScaler,
    model: &dyn CreditModel,
    raw: FeatureVector,
) -> Result<Prediction, InferenceError> {
    let start_time = Instant::now();

    let scaled = scaler.transform(&raw)?;
    let input = ModelInput { raw, scaled };

    let probability = model.predict_probability(&input)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(InferenceError::ProbabilityOutOfRange {
            model: model.kind(),
            probability,
        });
    }

    let contributions = model.explain(&input);
    let inference_time = start_time.elapsed().as_micros() as u64;

    tracing::debug!(
        model = model.kind().as_str(),
        probability,
        inference_time_us = inference_time,
        "prediction complete"
    );

    Ok(Prediction {
        model: model.kind(),
        input,
        probability,
        contributions,
        inference_time_us: inference_time,
    })
}
