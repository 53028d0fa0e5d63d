//! Feature Vector - Core data structure for model input
//!
//! Two shapes of the same ten numbers:
//! - [`FeatureVector`]: raw applicant values, consumed by the random forest
//! - [`ScaledFeatureVector`]: scaler output, consumed by logistic regression
//!   and by the contribution breakdown
//!
//! They are distinct types so a model can never be handed the wrong one.

use super::layout::{Feature, FEATURE_COUNT, FEATURE_LAYOUT};

// ============================================================================
// RAW FEATURE VECTOR
// ============================================================================

/// Raw feature values in [`FEATURE_LAYOUT`] order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create from raw values already in layout order
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Get values as array reference
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Get feature value
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Iterate `(column name, value)` pairs in layout order
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        let named: serde_json::Map<String, serde_json::Value> = self
            .named_values()
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();
        serde_json::Value::Object(named)
    }
}

// ============================================================================
// SCALED FEATURE VECTOR
// ============================================================================

/// Feature values after the fitted scaler, same order as [`FeatureVector`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledFeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl ScaledFeatureVector {
    /// Only the scaler builds scaled vectors outside tests
    pub(crate) fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }
}
