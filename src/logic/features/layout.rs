//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The scaler and both classifiers were fit on columns in exactly this
//! order. Every artifact records the names it was fit with and is checked
//! against [`FEATURE_LAYOUT`] when it is loaded; a reordered artifact is
//! rejected instead of silently producing wrong scores.

use serde::Serialize;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Total number of features
pub const FEATURE_COUNT: usize = 10;

/// Column names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "RevolvingUtilizationOfUnsecuredLines", // 0: balance / credit limit on revolving lines
    "age",                                  // 1: borrower age in years
    "NumberOfTime30-59DaysPastDueNotWorse", // 2: times 30-59 days late
    "DebtRatio",                            // 3: monthly debt payments / income
    "MonthlyIncome",                        // 4: monthly income
    "NumberOfOpenCreditLinesAndLoans",      // 5: open loans and lines of credit
    "NumberOfTimes90DaysLate",              // 6: times 90+ days late
    "NumberRealEstateLoansOrLines",         // 7: mortgage and real estate loans
    "NumberOfTime60-89DaysPastDueNotWorse", // 8: times 60-89 days late
    "NumberOfDependents",                   // 9: dependents excluding self
];

/// Index of each feature inside [`FEATURE_LAYOUT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    RevolvingUtilization = 0,
    Age = 1,
    Late30To59Days = 2,
    DebtRatio = 3,
    MonthlyIncome = 4,
    OpenCreditLines = 5,
    Late90PlusDays = 6,
    RealEstateLoans = 7,
    Late60To89Days = 8,
    Dependents = 9,
}

impl Feature {
    /// All features in layout order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::RevolvingUtilization,
        Feature::Age,
        Feature::Late30To59Days,
        Feature::DebtRatio,
        Feature::MonthlyIncome,
        Feature::OpenCreditLines,
        Feature::Late90PlusDays,
        Feature::RealEstateLoans,
        Feature::Late60To89Days,
        Feature::Dependents,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name the artifacts were fit with.
    pub fn column(self) -> &'static str {
        FEATURE_LAYOUT[self.index()]
    }
}

// ============================================================================
// LAYOUT CHECK
// ============================================================================

/// Reason an artifact's recorded columns do not match the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMismatch {
    Count { expected: usize, found: usize },
    Column { position: usize, expected: &'static str, found: String },
}

impl std::fmt::Display for LayoutMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutMismatch::Count { expected, found } => {
                write!(f, "expected {} features, found {}", expected, found)
            }
            LayoutMismatch::Column { position, expected, found } => {
                write!(f, "feature {} is '{}', expected '{}'", position, found, expected)
            }
        }
    }
}

/// Verify that `names` lists exactly the layout columns, in order.
pub fn check_layout<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatch> {
    if names.len() != FEATURE_COUNT {
        return Err(LayoutMismatch::Count {
            expected: FEATURE_COUNT,
            found: names.len(),
        });
    }

    for (position, (expected, found)) in FEATURE_LAYOUT.iter().zip(names).enumerate() {
        if *expected != found.as_ref() {
            return Err(LayoutMismatch::Column {
                position,
                expected,
                found: found.as_ref().to_string(),
            });
        }
    }

    Ok(())
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}
