//! HTTP query surface: maps URL query parameters onto filter constraints and
//! serializes the analysis aggregates. Handlers are stateless and read-only
//! over the shared table; any number of requests may run in parallel.

use crate::analysis;
use crate::dataset;
use crate::filters::Filters;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use polars::prelude::DataFrame;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared handler state: the table loaded once at startup. Never mutated.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<DataFrame>,
}

impl AppState {
    pub fn new(table: DataFrame) -> Self {
        Self {
            table: Arc::new(table),
        }
    }
}

/// Client-visible error. Query-parameter problems are rejected here, before
/// any analysis function runs.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn invalid_param(name: &str, value: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_query_parameter",
            message: format!("invalid value for {name}: {value}"),
        }
    }

    pub fn internal(err: color_eyre::Report) -> Self {
        error!("analysis failed: {err:?}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: "analysis failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": { "code": self.code, "message": self.message }
        }));
        (self.status, body).into_response()
    }
}

/// Query parameters of `/filtered-analysis`. String-typed fields use the
/// `"all"` sentinel for "unconstrained", matching the dashboard front end.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilteredParams {
    pub age_min: i64,
    pub age_max: i64,
    pub gender: String,
    pub hypertension: String,
    pub heart_disease: String,
    pub stroke: String,
    pub ever_married: String,
    pub work_type: String,
    #[serde(rename = "Residence_type")]
    pub residence_type: String,
    pub smoking_status: String,
    pub glucose_min: Option<f64>,
    pub glucose_max: Option<f64>,
    pub bmi_min: Option<f64>,
    pub bmi_max: Option<f64>,
}

impl Default for FilteredParams {
    fn default() -> Self {
        Self {
            age_min: 0,
            age_max: 100,
            gender: "all".to_string(),
            hypertension: "all".to_string(),
            heart_disease: "all".to_string(),
            stroke: "all".to_string(),
            ever_married: "all".to_string(),
            work_type: "all".to_string(),
            residence_type: "all".to_string(),
            smoking_status: "all".to_string(),
            glucose_min: None,
            glucose_max: None,
            bmi_min: None,
            bmi_max: None,
        }
    }
}

impl FilteredParams {
    /// Validates the declared bounds and sentinels and produces filter
    /// constraints. Out-of-range ages and unrecognized boolean values are
    /// client errors.
    pub fn to_filters(&self) -> Result<Filters, ApiError> {
        if !(0..=100).contains(&self.age_min) {
            return Err(ApiError::invalid_param("age_min", self.age_min));
        }
        if !(0..=100).contains(&self.age_max) {
            return Err(ApiError::invalid_param("age_max", self.age_max));
        }

        let mut filters = Filters {
            age_min: self.age_min as f64,
            age_max: self.age_max as f64,
            ..Filters::default()
        };
        filters.gender = sentinel(&self.gender);
        filters.ever_married = sentinel(&self.ever_married);
        filters.work_type = sentinel(&self.work_type);
        filters.residence_type = sentinel(&self.residence_type);
        filters.smoking_status = sentinel(&self.smoking_status);
        filters.hypertension = bool_flag("hypertension", &self.hypertension)?;
        filters.heart_disease = bool_flag("heart_disease", &self.heart_disease)?;
        filters.stroke = match self.stroke.as_str() {
            "all" => None,
            "0" => Some(0),
            "1" => Some(1),
            other => return Err(ApiError::invalid_param("stroke", other)),
        };
        filters.glucose_min = self.glucose_min;
        filters.glucose_max = self.glucose_max;
        filters.bmi_min = self.bmi_min;
        filters.bmi_max = self.bmi_max;
        Ok(filters)
    }
}

fn sentinel(value: &str) -> Option<String> {
    if value == "all" {
        None
    } else {
        Some(value.to_string())
    }
}

fn bool_flag(name: &str, value: &str) -> Result<Option<i64>, ApiError> {
    match value {
        "all" => Ok(None),
        "true" => Ok(Some(1)),
        "false" => Ok(Some(0)),
        other => Err(ApiError::invalid_param(name, other)),
    }
}

/// Builds the service router. CORS is wide open when enabled; the dashboard
/// front end is served from a different origin.
pub fn build_router(state: AppState, cors_allow_any: bool) -> Router {
    let router = Router::new()
        .route("/", get(root_handler))
        .route("/detailed-analysis", get(detailed_analysis_handler))
        .route("/full-dataset", get(full_dataset_handler))
        .route("/filtered-analysis", get(filtered_analysis_handler))
        .with_state(state);
    if cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Stroke analysis service is running" }))
}

async fn detailed_analysis_handler(
    State(state): State<AppState>,
) -> Result<Json<analysis::DetailedAnalysis>, ApiError> {
    info!(route = "/detailed-analysis", rows = state.table.height(), "request");
    let result = analysis::detailed_analysis(&state.table).map_err(ApiError::internal)?;
    Ok(Json(result))
}

async fn full_dataset_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<serde_json::Map<String, serde_json::Value>>>, ApiError> {
    info!(route = "/full-dataset", rows = state.table.height(), "request");
    let rows = dataset::records(&state.table).map_err(ApiError::internal)?;
    Ok(Json(rows))
}

async fn filtered_analysis_handler(
    State(state): State<AppState>,
    Query(params): Query<FilteredParams>,
) -> Result<Json<analysis::DetailedAnalysis>, ApiError> {
    let filters = params.to_filters()?;
    info!(route = "/filtered-analysis", ?filters, "request");
    let result = analysis::filtered_analysis(&state.table, &filters).map_err(ApiError::internal)?;
    Ok(Json(result))
}
