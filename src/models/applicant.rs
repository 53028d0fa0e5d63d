//! Applicant model
//!
//! The ten values an operator enters for one applicant, with the ranges,
//! steps and defaults the form offers.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::logic::features::{Feature, FeatureVector, FEATURE_COUNT};
use crate::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Real,
    Integer,
}

/// How one input is presented and constrained
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    /// Form / JSON field name
    pub name: &'static str,
    pub feature: Feature,
    pub label: &'static str,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

/// Inputs in display order (differs from the feature layout)
pub const FORM_FIELDS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "revolving_utilization",
        feature: Feature::RevolvingUtilization,
        label: "Revolving utilization (may exceed 1)",
        kind: FieldKind::Real,
        min: 0.0,
        max: 10.0,
        default: 0.5,
        step: 0.01,
    },
    FieldSpec {
        name: "age",
        feature: Feature::Age,
        label: "Age",
        kind: FieldKind::Integer,
        min: 18.0,
        max: 100.0,
        default: 35.0,
        step: 1.0,
    },
    FieldSpec {
        name: "late_30_59_days",
        feature: Feature::Late30To59Days,
        label: "Times 30-59 days past due",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 20.0,
        default: 0.0,
        step: 1.0,
    },
    FieldSpec {
        name: "late_60_89_days",
        feature: Feature::Late60To89Days,
        label: "Times 60-89 days past due",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 20.0,
        default: 0.0,
        step: 1.0,
    },
    FieldSpec {
        name: "late_90_days",
        feature: Feature::Late90PlusDays,
        label: "Times 90+ days past due",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 20.0,
        default: 0.0,
        step: 1.0,
    },
    FieldSpec {
        name: "debt_ratio",
        feature: Feature::DebtRatio,
        label: "Debt ratio",
        kind: FieldKind::Real,
        min: 0.0,
        max: 10.0,
        default: 0.3,
        step: 0.01,
    },
    FieldSpec {
        name: "monthly_income",
        feature: Feature::MonthlyIncome,
        label: "Monthly income",
        kind: FieldKind::Real,
        min: 0.0,
        max: 200000.0,
        default: 4000.0,
        step: 100.0,
    },
    FieldSpec {
        name: "open_credit_lines",
        feature: Feature::OpenCreditLines,
        label: "Open credit lines and loans",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 50.0,
        default: 5.0,
        step: 1.0,
    },
    FieldSpec {
        name: "real_estate_loans",
        feature: Feature::RealEstateLoans,
        label: "Real estate loans or lines",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 20.0,
        default: 1.0,
        step: 1.0,
    },
    FieldSpec {
        name: "dependents",
        feature: Feature::Dependents,
        label: "Dependents",
        kind: FieldKind::Integer,
        min: 0.0,
        max: 20.0,
        default: 0.0,
        step: 1.0,
    },
];

/// One applicant record
///
/// Ranges mirror [`FORM_FIELDS`]. Counts are unsigned so negative or
/// fractional values fail at deserialization. Unknown keys are rejected
/// rather than silently scored as defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct Applicant {
    #[validate(range(min = 0.0, max = 10.0))]
    pub revolving_utilization: f64,

    #[validate(range(min = 18, max = 100))]
    pub age: u32,

    #[validate(range(max = 20))]
    pub late_30_59_days: u32,

    #[validate(range(min = 0.0, max = 10.0))]
    pub debt_ratio: f64,

    #[validate(range(min = 0.0, max = 200000.0))]
    pub monthly_income: f64,

    #[validate(range(max = 50))]
    pub open_credit_lines: u32,

    #[validate(range(max = 20))]
    pub late_90_days: u32,

    #[validate(range(max = 20))]
    pub real_estate_loans: u32,

    #[validate(range(max = 20))]
    pub late_60_89_days: u32,

    #[validate(range(max = 20))]
    pub dependents: u32,
}

impl Default for Applicant {
    fn default() -> Self {
        Self {
            revolving_utilization: 0.5,
            age: 35,
            late_30_59_days: 0,
            debt_ratio: 0.3,
            monthly_income: 4000.0,
            open_credit_lines: 5,
            late_90_days: 0,
            real_estate_loans: 1,
            late_60_89_days: 0,
            dependents: 0,
        }
    }
}

impl Applicant {
    /// Value of one feature as the models see it
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::RevolvingUtilization => self.revolving_utilization,
            Feature::Age => f64::from(self.age),
            Feature::Late30To59Days => f64::from(self.late_30_59_days),
            Feature::DebtRatio => self.debt_ratio,
            Feature::MonthlyIncome => self.monthly_income,
            Feature::OpenCreditLines => f64::from(self.open_credit_lines),
            Feature::Late90PlusDays => f64::from(self.late_90_days),
            Feature::RealEstateLoans => f64::from(self.real_estate_loans),
            Feature::Late60To89Days => f64::from(self.late_60_89_days),
            Feature::Dependents => f64::from(self.dependents),
        }
    }

    /// Set one input from its submitted text
    pub fn set_field(&mut self, spec: &FieldSpec, raw: &str) -> Result<(), String> {
        let raw = raw.trim();
        match spec.kind {
            FieldKind::Integer => {
                let value = raw
                    .parse::<u32>()
                    .map_err(|_| format!("'{}' is not a whole number", raw))?;
                let slot = self
                    .count_mut(spec.feature)
                    .ok_or_else(|| format!("{} is not a count", spec.name))?;
                *slot = value;
            }
            FieldKind::Real => {
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| format!("'{}' is not a number", raw))?;
                let slot = self
                    .real_mut(spec.feature)
                    .ok_or_else(|| format!("{} is not a real value", spec.name))?;
                *slot = value;
            }
        }
        Ok(())
    }

    fn count_mut(&mut self, feature: Feature) -> Option<&mut u32> {
        match feature {
            Feature::Age => Some(&mut self.age),
            Feature::Late30To59Days => Some(&mut self.late_30_59_days),
            Feature::OpenCreditLines => Some(&mut self.open_credit_lines),
            Feature::Late90PlusDays => Some(&mut self.late_90_days),
            Feature::RealEstateLoans => Some(&mut self.real_estate_loans),
            Feature::Late60To89Days => Some(&mut self.late_60_89_days),
            Feature::Dependents => Some(&mut self.dependents),
            Feature::RevolvingUtilization | Feature::DebtRatio | Feature::MonthlyIncome => None,
        }
    }

    fn real_mut(&mut self, feature: Feature) -> Option<&mut f64> {
        match feature {
            Feature::RevolvingUtilization => Some(&mut self.revolving_utilization),
            Feature::DebtRatio => Some(&mut self.debt_ratio),
            Feature::MonthlyIncome => Some(&mut self.monthly_income),
            _ => None,
        }
    }

    /// Assemble the record in feature layout order
    pub fn feature_vector(&self) -> FeatureVector {
        let mut values = [0.0f64; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = self.value(feature);
        }
        FeatureVector::from_values(values)
    }

    /// Reject anything the form would not have let through
    pub fn check(&self) -> AppResult<()> {
        for spec in &FORM_FIELDS {
            if !self.value(spec.feature).is_finite() {
                return Err(AppError::ValidationError(format!("{} must be a finite number", spec.name)));
            }
        }
        self.validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid applicant: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(spec: &FieldSpec, value: f64) -> Applicant {
        let mut json = serde_json::to_value(Applicant::default()).unwrap();
        json[spec.name] = match spec.kind {
            FieldKind::Integer => serde_json::json!(value as u32),
            FieldKind::Real => serde_json::json!(value),
        };
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_defaults_match_field_table() {
        let applicant = Applicant::default();
        for spec in &FORM_FIELDS {
            assert_eq!(applicant.value(spec.feature), spec.default, "{}", spec.name);
        }
        assert!(applicant.check().is_ok());
    }

    #[test]
    fn test_field_table_covers_every_feature_once() {
        for feature in Feature::ALL {
            assert_eq!(FORM_FIELDS.iter().filter(|s| s.feature == feature).count(), 1);
        }
    }

    #[test]
    fn test_bounds_are_inclusive_and_enforced() {
        for spec in &FORM_FIELDS {
            assert!(with(spec, spec.min).check().is_ok(), "{} at min", spec.name);
            assert!(with(spec, spec.max).check().is_ok(), "{} at max", spec.name);
            assert!(with(spec, spec.max + spec.step).check().is_err(), "{} above max", spec.name);
            if spec.min > 0.0 {
                assert!(with(spec, spec.min - spec.step).check().is_err(), "{} below min", spec.name);
            }
        }
    }

    #[test]
    fn test_negative_counts_fail_to_deserialize() {
        let result: Result<Applicant, _> = serde_json::from_str(r#"{"dependents": -1}"#);
        assert!(result.is_err());

        let result: Result<Applicant, _> = serde_json::from_str(r#"{"age": 35.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_real_fields_reject_negative_and_non_finite() {
        let mut applicant = Applicant { debt_ratio: -0.01, ..Applicant::default() };
        assert!(applicant.check().is_err());

        applicant.debt_ratio = f64::NAN;
        assert!(applicant.check().is_err());
    }

    #[test]
    fn test_feature_vector_uses_layout_order() {
        let applicant = Applicant {
            late_30_59_days: 3,
            late_60_89_days: 2,
            late_90_days: 1,
            ..Applicant::default()
        };

        let vector = applicant.feature_vector();
        assert_eq!(
            vector.as_array(),
            &[0.5, 35.0, 3.0, 0.3, 4000.0, 5.0, 1.0, 1.0, 2.0, 0.0]
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let applicant: Applicant = serde_json::from_str(r#"{"age": 60}"#).unwrap();
        assert_eq!(applicant, Applicant { age: 60, ..Applicant::default() });
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<Applicant, _> = serde_json::from_str(r#"{"agee": 90}"#);
        assert!(result.is_err());

        let result: Result<Applicant, _> = serde_json::from_str(r#"{"MonthlyIncome": 150000}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_field_from_text() {
        let mut applicant = Applicant::default();
        for spec in &FORM_FIELDS {
            applicant.set_field(spec, &format!(" {} ", spec.max)).unwrap();
            assert_eq!(applicant.value(spec.feature), spec.max, "{}", spec.name);
        }

        let age = FORM_FIELDS.iter().find(|s| s.feature == Feature::Age).unwrap();
        assert!(applicant.set_field(age, "thirty").is_err());
        assert!(applicant.set_field(age, "35.5").is_err());
        assert_eq!(applicant.age, 100);

        let income = FORM_FIELDS.iter().find(|s| s.feature == Feature::MonthlyIncome).unwrap();
        assert!(applicant.set_field(income, "lots").is_err());
    }
}
