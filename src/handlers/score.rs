//! Scoring handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::logic::artifacts::{ArtifactSummary, Artifacts};
use crate::logic::model::threshold::{DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD, THRESHOLD_STEP};
use crate::logic::model::{self, ModelKind};
use crate::logic::report::ScoreReport;
use crate::models::{Applicant, FieldSpec, ScoreControls, ScoreRequest, FORM_FIELDS};
use crate::{AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct ThresholdSpec {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

#[derive(Debug, Serialize)]
pub struct FormSchema {
    pub models: Vec<ModelKind>,
    pub default_model: ModelKind,
    pub threshold: ThresholdSpec,
    pub fields: Vec<FieldSpec>,
}

/// Validate, score and report one submission
pub fn score_applicant(
    artifacts: &Artifacts,
    controls: ScoreControls,
    applicant: Applicant,
) -> AppResult<ScoreReport> {
    controls.check()?;
    applicant.check()?;

    let raw = applicant.feature_vector();
    tracing::debug!(record = %raw.to_log_entry(), "scoring submission");

    let prediction = model::predict(artifacts, controls.model, raw)?;
    let report = ScoreReport::new(prediction, controls.threshold);

    tracing::info!(
        submission_id = %report.submission_id,
        model = controls.model.as_str(),
        threshold = controls.threshold,
        probability = report.probability,
        decision = ?report.decision,
        "submission scored"
    );

    Ok(report)
}

/// Score one applicant
pub async fn score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> AppResult<Json<ScoreReport>> {
    let report = score_applicant(&state.artifacts, req.controls, req.applicant)?;
    Ok(Json(report))
}

/// Loaded artifact metadata
pub async fn model_info(State(state): State<AppState>) -> Json<ArtifactSummary> {
    Json(state.artifacts.summary())
}

/// Inputs, ranges and defaults the form offers
pub async fn form_schema() -> Json<FormSchema> {
    Json(FormSchema {
        models: ModelKind::ALL.to_vec(),
        default_model: ModelKind::default(),
        threshold: ThresholdSpec {
            min: MIN_THRESHOLD,
            max: MAX_THRESHOLD,
            default: DEFAULT_THRESHOLD,
            step: THRESHOLD_STEP,
        },
        fields: FORM_FIELDS.to_vec(),
    })
}
