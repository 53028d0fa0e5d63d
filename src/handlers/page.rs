//! Page handlers

use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::Html,
    Form,
};

use crate::models::ScoreForm;
use crate::views::page::{self, Outcome, PageView};
use crate::AppState;
use super::score::score_applicant;

/// Empty form with defaults
pub async fn index() -> Html<String> {
    Html(page::render(&PageView::fresh()))
}

/// Form submission: re-render with the inputs kept and results below
pub async fn submit(
    State(state): State<AppState>,
    fields: Result<Form<HashMap<String, String>>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let Form(fields) = match fields {
        Ok(fields) => fields,
        Err(rejection) => {
            tracing::warn!("Rejected form submission: {}", rejection.body_text());
            let view = PageView {
                outcome: Outcome::Failed(format!("Invalid form submission: {}", rejection.body_text())),
                ..PageView::fresh()
            };
            return (StatusCode::BAD_REQUEST, Html(page::render(&view)));
        }
    };

    let ScoreForm { controls, applicant, problems } = ScoreForm::parse(&fields);
    if !problems.is_empty() {
        let message = problems.join("; ");
        tracing::warn!("Rejected form submission: {}", message);
        let view = PageView {
            controls,
            applicant,
            outcome: Outcome::Failed(format!("Invalid form submission: {}", message)),
        };
        return (StatusCode::BAD_REQUEST, Html(page::render(&view)));
    }

    let (status, outcome) = match score_applicant(&state.artifacts, controls, applicant) {
        Ok(report) => (StatusCode::OK, Outcome::Scored(report)),
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!("Submission failed: {:?}", err);
            }
            (err.status(), Outcome::Failed(err.public_message()))
        }
    };

    let view = PageView { controls, applicant, outcome };
    (status, Html(page::render(&view)))
}
