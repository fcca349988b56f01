mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use color_eyre::Result;
use http_body_util::BodyExt;
use serde_json::Value;
use strokedash::{build_router, AppState};
use tower::ServiceExt;

fn test_router() -> Result<Router> {
    let table = common::stroke_table()?;
    Ok(build_router(AppState::new(table), true))
}

async fn get(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    Ok((status, body))
}

#[tokio::test]
async fn root_reports_running() -> Result<()> {
    let (status, body) = get(test_router()?, "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stroke analysis service is running");
    Ok(())
}

#[tokio::test]
async fn detailed_analysis_has_every_section() -> Result<()> {
    let (status, body) = get(test_router()?, "/detailed-analysis").await?;
    assert_eq!(status, StatusCode::OK);
    for key in [
        "overview",
        "stroke_distribution",
        "age_distribution",
        "categorical_distributions",
        "numerical_distributions",
        "correlation",
        "feature_importance",
        "glucose_categories",
        "bmi_categories",
        "risk_factor_comparison",
    ] {
        assert!(body.get(key).is_some(), "missing section {key}");
    }
    assert_eq!(body["overview"]["total_records"], 8);
    // Stroke groups serialize under their label values.
    assert_eq!(body["stroke_distribution"]["counts"]["0"], 5);
    assert_eq!(body["stroke_distribution"]["counts"]["1"], 3);
    // Quartiles keep the percent-style field names.
    assert!(body["numerical_distributions"]["age"].get("25%").is_some());
    Ok(())
}

#[tokio::test]
async fn full_dataset_returns_rows_with_source_names() -> Result<()> {
    let (status, body) = get(test_router()?, "/full-dataset").await?;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert!(rows[0].get("Residence_type").is_some());
    assert_eq!(rows[0]["gender"], "Male");
    Ok(())
}

#[tokio::test]
async fn filtered_without_params_matches_detailed() -> Result<()> {
    let (_, filtered) = get(test_router()?, "/filtered-analysis").await?;
    let (_, detailed) = get(test_router()?, "/detailed-analysis").await?;
    assert_eq!(filtered, detailed);
    Ok(())
}

#[tokio::test]
async fn filtered_applies_query_parameters() -> Result<()> {
    let (status, body) = get(
        test_router()?,
        "/filtered-analysis?gender=Female&hypertension=true",
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    // Female patients with hypertension: rows 2 and 6, one stroke case.
    assert_eq!(body["overview"]["total_records"], 2);
    assert_eq!(body["overview"]["stroke_cases"], 1);
    Ok(())
}

#[tokio::test]
async fn out_of_range_age_is_a_client_error() -> Result<()> {
    let (status, body) = get(test_router()?, "/filtered-analysis?age_min=200").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_query_parameter");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("age_min"));
    Ok(())
}

#[tokio::test]
async fn unrecognized_flag_value_is_a_client_error() -> Result<()> {
    let (status, body) = get(
        test_router()?,
        "/filtered-analysis?hypertension=banana",
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_query_parameter");
    Ok(())
}
