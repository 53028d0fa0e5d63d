//! Standard Scaler
//!
//! `(x - mean) / scale` per feature, with the parameters fitted at training
//! time. Output feeds logistic regression and the contribution breakdown.

use serde::{Deserialize, Serialize};

use crate::logic::artifacts::{fixed_len, require_layout, InvalidArtifact};
use crate::logic::features::{FeatureVector, ScaledFeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
use super::inference::InferenceError;

/// On-disk form of the scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Fitted standardisation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Result<Self, InvalidArtifact> {
        for (name, (m, s)) in FEATURE_LAYOUT.iter().zip(mean.iter().zip(scale.iter())) {
            if !m.is_finite() {
                return Err(InvalidArtifact(format!("mean for '{}' is not finite", name)));
            }
            if !s.is_finite() || *s == 0.0 {
                return Err(InvalidArtifact(format!("scale for '{}' must be finite and non-zero", name)));
            }
        }
        Ok(Self { mean, scale })
    }

    /// Scale a raw vector
    pub fn transform(&self, raw: &FeatureVector) -> Result<ScaledFeatureVector, InferenceError> {
        let mut scaled = [0.0f64; FEATURE_COUNT];

        for (i, value) in raw.as_array().iter().enumerate() {
            let z = (value - self.mean[i]) / self.scale[i];
            if !z.is_finite() {
                return Err(InferenceError::NonFiniteScaled { feature: FEATURE_LAYOUT[i] });
            }
            scaled[i] = z;
        }

        Ok(ScaledFeatureVector::from_values(scaled))
    }
}

impl TryFrom<ScalerArtifact> for StandardScaler {
    type Error = InvalidArtifact;

    fn try_from(artifact: ScalerArtifact) -> Result<Self, Self::Error> {
        require_layout(&artifact.feature_names)?;
        let mean = fixed_len("mean", artifact.mean)?;
        let scale = fixed_len("scale", artifact.scale)?;
        Self::new(mean, scale)
    }
}
