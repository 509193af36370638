//! HTTP API for the prediction service.
//!
//! ## Endpoints
//!
//! - `POST /api/predict`: predict the closing price for a date
//! - `GET /api/health`: liveness check, independent of model state
//! - `POST /api/reload`: re-read artifacts and swap the snapshot
//! - `GET /api/schema`: feature list, price and feature statistics, clamp band
//!
//! Every error is returned as `{"error": "<message>"}`: 400 for invalid
//! input, 500 for everything else.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use aurum_forecast::builder::ImputationPolicy;
use aurum_forecast::error::ForecastError;
use aurum_forecast::request::{PredictionPayload, PredictionRequest, PredictionResult};
use aurum_forecast::schema::{FeatureStats, HistoricalPriceStats};

use crate::state::AppState;

/// Liveness message expected by existing clients.
pub const HEALTH_MESSAGE: &str = "Model server is running!";

/// Error returned by a handler, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::ValidationError(message) => Self::bad_request(message),
            err if err.is_client_error() => Self::bad_request(err.to_string()),
            err => {
                tracing::error!(error = %err, "request failed");
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// JSON response for `/api/health`.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// JSON response for `/api/reload`.
#[derive(Debug, Serialize)]
struct ReloadResponse {
    status: &'static str,
    model: String,
    features: usize,
    generation: u64,
}

/// Clamp band applied to corrected prices.
#[derive(Debug, Serialize)]
struct Bounds {
    min: f64,
    max: f64,
}

/// JSON response for `/api/schema`.
#[derive(Debug, Serialize)]
struct SchemaResponse {
    model: String,
    features: Vec<String>,
    unbacked_features: Vec<String>,
    price_stats: HistoricalPriceStats,
    feature_stats: BTreeMap<String, FeatureStats>,
    bounds: Bounds,
    imputation: ImputationPolicy,
    generation: u64,
}

/// Build the API router.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/predict", post(predict_handler))
        .route("/api/health", get(health_handler))
        .route("/api/reload", post(reload_handler))
        .route("/api/schema", get(schema_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /api/predict`: validate the body and predict.
///
/// Range checks run before the snapshot is consulted.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionPayload>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(payload) = payload?;
    let request = PredictionRequest::from_payload(&payload)?;

    let context = state.snapshot();
    let result = context.predict(&request)?;

    tracing::info!(
        year = result.year,
        month = result.month,
        day = result.day,
        inflation_rate = result.inflation_rate,
        predicted_price = result.predicted_price,
        "prediction served"
    );

    Ok(Json(result))
}

/// `GET /api/health`: liveness check.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_MESSAGE,
    })
}

/// `POST /api/reload`: rebuild the snapshot from disk.
///
/// Loading reads the dataset, so it runs on the blocking pool.
async fn reload_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let reloading = Arc::clone(&state);
    let context = tokio::task::spawn_blocking(move || reloading.reload())
        .await
        .map_err(|e| ApiError::internal(format!("reload task failed: {}", e)))??;

    Ok(Json(ReloadResponse {
        status: "reloaded",
        model: context.model_name().to_string(),
        features: context.schema().len(),
        generation: state.generation(),
    }))
}

/// `GET /api/schema`: describe the current snapshot.
async fn schema_handler(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let context = state.snapshot();
    let (min, max) = context.corrector().bounds();

    Json(SchemaResponse {
        model: context.model_name().to_string(),
        features: context.schema().names().to_vec(),
        unbacked_features: context
            .schema()
            .unbacked_features()
            .into_iter()
            .map(str::to_string)
            .collect(),
        price_stats: *context.price_stats(),
        feature_stats: context
            .schema()
            .feature_stats()
            .map(|(name, stats)| (name.to_string(), *stats))
            .collect(),
        bounds: Bounds { min, max },
        imputation: context.imputation(),
        generation: state.generation(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum_forecast::builder::FeatureVectorBuilder;
    use aurum_forecast::corrector::ExtrapolationSettings;
    use aurum_forecast::models::LinearRegressor;
    use aurum_forecast::pipeline::{ArtifactPaths, LoadOptions, PredictionContext};
    use aurum_forecast::schema::FeatureSchema;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn make_context(intercept: f64, coefficients: Vec<f64>) -> PredictionContext {
        let names = ["SPX", "year", "month", "day", "dayofweek"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let schema = FeatureSchema::new(names).unwrap().with_median("SPX", 2000.0);

        PredictionContext::new(
            schema,
            HistoricalPriceStats::new(1500.0, 250.0, 1000.0, 2000.0),
            Box::new(LinearRegressor::new(intercept, coefficients)),
            FeatureVectorBuilder::new(),
            ExtrapolationSettings::default(),
        )
        .unwrap()
    }

    fn make_state(context: PredictionContext, paths: ArtifactPaths) -> Arc<AppState> {
        Arc::new(AppState::new(context, paths, LoadOptions::default()))
    }

    fn flat_state() -> Arc<AppState> {
        make_state(make_context(1300.0, vec![0.0; 5]), ArtifactPaths::default())
    }

    fn predict_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = api_router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(flat_state(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "Model server is running!");
    }

    #[tokio::test]
    async fn test_predict_center_year() {
        let body = r#"{"year": 2015, "month": 6, "day": 15, "inflation_rate": 0.0}"#;
        let (status, json) = send(flat_state(), predict_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["predicted_price"], 1300.0);
        assert_eq!(json["year"], 2015);
        assert_eq!(json["month"], 6);
        assert_eq!(json["day"], 15);
        assert_eq!(json["inflation_rate"], 0.0);
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["unit"], "per troy ounce");
    }

    #[tokio::test]
    async fn test_predict_applies_defaults() {
        let (status, json) = send(flat_state(), predict_request(r#"{"year": 2030}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["month"], 6);
        assert_eq!(json["day"], 15);
        assert_eq!(json["inflation_rate"], 0.0);
    }

    #[tokio::test]
    async fn test_predict_validation_errors() {
        let cases = [
            (r#"{"year": 2024, "month": 13}"#, "Month must be between 1 and 12"),
            (r#"{"year": 2024, "day": 32}"#, "Day must be between 1 and 31"),
            (
                r#"{"year": 2024, "inflation_rate": 51}"#,
                "Inflation rate must be between -10% and 50%",
            ),
            (r#"{"month": 1}"#, "Year is required"),
            (r#"{"year": 2023, "month": 2, "day": 29}"#, "Invalid date: 2023-02-29"),
        ];

        for (body, message) in cases {
            let (status, json) = send(flat_state(), predict_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
            assert_eq!(json["error"], message);
        }
    }

    #[tokio::test]
    async fn test_predict_malformed_body() {
        for body in ["{not json", r#"{"year": "soon"}"#, r#"{"year": 2024.5}"#] {
            let (status, json) = send(flat_state(), predict_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_predict_non_finite_output_is_internal_error() {
        let state = make_state(
            make_context(f64::MAX, vec![f64::MAX, 0.0, 0.0, 0.0, 0.0]),
            ArtifactPaths::default(),
        );
        let (status, json) = send(state, predict_request(r#"{"year": 2015}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("non-finite"));
    }

    #[tokio::test]
    async fn test_schema_endpoint() {
        let req = Request::builder()
            .uri("/api/schema")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(flat_state(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["features"][0], "SPX");
        assert_eq!(json["features"].as_array().unwrap().len(), 5);
        assert_eq!(json["unbacked_features"].as_array().unwrap().len(), 0);
        assert_eq!(json["bounds"]["min"], 500.0);
        assert_eq!(json["bounds"]["max"], 6000.0);
        assert_eq!(json["imputation"], "medians");
        assert_eq!(json["generation"], 0);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_snapshot() {
        let missing = ArtifactPaths {
            model: "/nonexistent/model.json".into(),
            feature_list: "/nonexistent/feature_cols.json".into(),
            dataset: "/nonexistent/history.csv".into(),
        };
        let state = make_state(make_context(1300.0, vec![0.0; 5]), missing);

        let req = Request::builder()
            .method("POST")
            .uri("/api/reload")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(Arc::clone(&state), req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].is_string());
        assert_eq!(state.generation(), 0);

        let (status, json) = send(state, predict_request(r#"{"year": 2015}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["predicted_price"], 1300.0);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let req = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let resp = api_router(flat_state()).oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
