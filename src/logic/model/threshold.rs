//! Decision Threshold
//!
//! Operator-chosen cutoff turning a probability into a risk label.
//! The risky side is closed: `p == threshold` is risky.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default cutoff
pub const DEFAULT_THRESHOLD: f64 = 0.40;

/// Slider granularity
pub const THRESHOLD_STEP: f64 = 0.01;

pub const MIN_THRESHOLD: f64 = 0.0;
pub const MAX_THRESHOLD: f64 = 1.0;

/// Risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Risky,
    NotRisky,
}

impl Decision {
    /// Label `probability` against `threshold`
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Decision::Risky
        } else {
            Decision::NotRisky
        }
    }

    pub fn is_risky(self) -> bool {
        self == Decision::Risky
    }

    /// Comparison shown next to the label, e.g. `p ≥ 0.40`
    pub fn rule(self, threshold: f64) -> String {
        match self {
            Decision::Risky => format!("p \u{2265} {:.2}", threshold),
            Decision::NotRisky => format!("p < {:.2}", threshold),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Risky => f.write_str("RISKY"),
            Decision::NotRisky => f.write_str("NOT RISKY"),
        }
    }
}
