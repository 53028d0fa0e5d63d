//! Credit Scoring Server
//!
//! Scores a single credit applicant with models trained on the
//! *Give Me Some Credit* dataset and explains the logistic score.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CREDIT SCORING                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐ │
//! │  │  Page /   │  │  Inference   │  │  Decision &          │ │
//! │  │  JSON API │─▶│  Adapter     │─▶│  Explanation         │ │
//! │  │  (Axum)   │  │  (scaler +   │  │  (threshold, top-5)  │ │
//! │  └───────────┘  │   model)     │  └──────────────────────┘ │
//! │                 └──────┬───────┘                            │
//! │                        ▼                                    │
//! │            ┌────────────────────────┐                       │
//! │            │ Artifacts (read-only,  │                       │
//! │            │ loaded once at start)  │                       │
//! │            └────────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;
mod views;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::Artifacts;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "credit_scoring=debug,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Credit Scoring Server starting...");
    tracing::info!("Models directory: {}", config.models_dir.display());

    // Load artifacts once; nothing is served without all three
    let artifacts = match Artifacts::load(&config.models_dir) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            tracing::error!("{}", err);
            tracing::error!("{}", err.remediation());
            std::process::exit(1);
        }
    };

    // Build application state
    let state = AppState {
        artifacts: Arc::new(artifacts),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.addr();
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<Artifacts>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Page
    let page_routes = Router::new()
        .route("/", get(handlers::page::index).post(handlers::page::submit));

    // JSON API
    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/score", post(handlers::score::score))
        .route("/api/v1/model", get(handlers::score::model_info))
        .route("/api/v1/form", get(handlers::score::form_schema));

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .fallback(handlers::health::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::logic::artifacts::tests::fixture;
    use crate::logic::report::EXPLANATION_UNAVAILABLE;

    fn app() -> Router {
        let state = AppState {
            artifacts: Arc::new(fixture()),
            config: config::Config::from_env(),
        };
        create_router(state)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let json = serde_json::from_str(&body_string(response).await).unwrap();
        (status, json)
    }

    const DEFAULT_FORM: &str = "model=logistic&threshold=0.40&revolving_utilization=0.5&age=35\
        &late_30_59_days=0&late_60_89_days=0&late_90_days=0&debt_ratio=0.3\
        &monthly_income=4000&open_credit_lines=5&real_estate_loans=1&dependents=0";

    async fn post_form(body: String) -> (StatusCode, String) {
        let response = app()
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, body_string(response).await)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_index_renders_form_without_results() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("Calculate score"));
        assert!(!html.contains("<h2>Result</h2>"));
    }

    #[tokio::test]
    async fn test_api_score_logistic_defaults() {
        let (status, json) = post_json("/api/v1/score", json!({})).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(json["model"], "logistic");
        assert_eq!(json["threshold"], 0.4);
        let p = json["probability"].as_f64().unwrap();
        assert!((0.0..0.4).contains(&p));
        assert_eq!(json["decision"], "not-risky");
        assert_eq!(json["explanation"]["status"], "available");
        assert_eq!(json["explanation"]["top_factors"].as_array().unwrap().len(), 5);
        assert_eq!(json["record"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_api_score_random_forest() {
        let (status, json) = post_json(
            "/api/v1/score",
            json!({"model": "random_forest", "threshold": 0.1}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(json["model"], "random_forest");
        let p = json["probability"].as_f64().unwrap();
        assert!((p - 0.1).abs() < 1e-9);
        assert_eq!(json["decision"], "risky");
        assert_eq!(json["explanation"]["status"], "unavailable");
        assert_eq!(json["explanation"]["message"], EXPLANATION_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_api_rejects_out_of_range_values() {
        let (status, json) = post_json("/api/v1/score", json!({"applicant": {"age": 17}})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], 400);

        let (status, _) = post_json("/api/v1/score", json!({"threshold": 1.5})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_form_submission_renders_results() {
        let (status, html) = post_form(DEFAULT_FORM.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        assert!(html.contains("<h2>Result</h2>"));
        assert!(html.contains("Decision: NOT RISKY"));
        assert_eq!(html.matches("<tr><td>").count(), 5);
        assert!(html.contains("most influenced the decision"));
    }

    #[tokio::test]
    async fn test_form_submission_random_forest() {
        let body = DEFAULT_FORM.replace("model=logistic", "model=random_forest");
        let (status, html) = post_form(body).await;
        assert_eq!(status, StatusCode::OK);

        assert!(html.contains(EXPLANATION_UNAVAILABLE));
        assert!(!html.contains("most influenced the decision"));
    }

    #[tokio::test]
    async fn test_form_submission_out_of_range_shows_error() {
        let body = DEFAULT_FORM.replace("monthly_income=4000", "monthly_income=250000");
        let (status, html) = post_form(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("banner error"));
        assert!(!html.contains("<h2>Result</h2>"));
        // Inputs are kept for correction
        assert!(html.contains("value=\"250000\""));
    }

    #[tokio::test]
    async fn test_form_submission_unparseable_field() {
        let body = DEFAULT_FORM.replace("age=35", "age=thirty");
        let (status, html) = post_form(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("Invalid form submission"));
        assert!(html.contains("age: &#39;thirty&#39; is not a whole number"));
    }

    #[tokio::test]
    async fn test_form_submission_unparseable_field_keeps_other_inputs() {
        let body = DEFAULT_FORM
            .replace("model=logistic", "model=random_forest")
            .replace("threshold=0.40", "threshold=0.25")
            .replace("monthly_income=4000", "monthly_income=7500")
            .replace("age=35", "age=thirty");
        let (status, html) = post_form(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!html.contains("<h2>Result</h2>"));
        assert!(html.contains("<option value=\"random_forest\" selected>"));
        assert!(html.contains("value=\"0.25\""));
        assert!(html.contains("value=\"7500\""));
    }

    #[tokio::test]
    async fn test_api_rejects_unknown_applicant_keys() {
        for applicant in [json!({"agee": 90}), json!({"MonthlyIncome": 150000, "age": 40})] {
            let response = app()
                .oneshot(
                    Request::post("/api/v1/score")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(json!({"applicant": applicant}).to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert!(response.status().is_client_error(), "{}", applicant);
            assert!(body_string(response).await.contains("unknown field"));
        }
    }

    #[tokio::test]
    async fn test_model_and_form_metadata() {
        let response = app()
            .oneshot(Request::get("/api/v1/model").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["forest_trees"], 3);
        assert_eq!(json["layout"]["feature_count"], 10);

        let response = app()
            .oneshot(Request::get("/api/v1/form").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["fields"].as_array().unwrap().len(), 10);
        assert_eq!(json["threshold"]["default"], 0.4);
        assert_eq!(json["default_model"], "logistic");
    }
}
