use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::{AppState, json_body};
use crate::models::{RecordPayload, WeatherRecord};
use crate::records::ExportFormat;
use crate::{Result, WeatherError};

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExportQuery {
    format: Option<String>,
}

#[derive(Serialize)]
pub(super) struct DeleteResponse {
    deleted: bool,
    id: u64,
}

/// Record ids are positive integers
fn parse_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| WeatherError::invalid_input("Invalid id."))
}

/// Missing or unparsable limits fall back to `default`; the rest are clamped to `1..=max`
fn parse_limit(raw: Option<&str>, default: usize, max: usize) -> usize {
    let Some(requested) = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
    else {
        return default;
    };

    requested.clamp(1.0, max as f64) as usize
}

pub(super) async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<WeatherRecord>>> {
    let limits = &state.config.records;
    let limit = parse_limit(query.limit.as_deref(), limits.default_limit, limits.max_limit);
    Ok(Json(state.records.list(limit).await?))
}

pub(super) async fn export_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let format: ExportFormat = query.format.as_deref().unwrap_or("json").parse()?;
    let records = state.records.list_all().await?;
    let body = format.render(&records)?;

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (header::CONTENT_DISPOSITION, format.content_disposition()),
    ];
    Ok((headers, body).into_response())
}

pub(super) async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WeatherRecord>> {
    let id = parse_id(&id)?;
    Ok(Json(state.records.get(id).await?))
}

pub(super) async fn create_record(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RecordPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<WeatherRecord>)> {
    let payload = json_body(payload)?;
    let record = state.records.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(super) async fn update_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<RecordPayload>, JsonRejection>,
) -> Result<Json<WeatherRecord>> {
    let id = parse_id(&id)?;
    let payload = json_body(payload)?;
    Ok(Json(state.records.update(id, &payload).await?))
}

pub(super) async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let id = parse_id(&id)?;
    state.records.delete(id).await?;
    Ok(Json(DeleteResponse { deleted: true, id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(1))]
    #[case("42", Some(42))]
    #[case("0", None)]
    #[case("-3", None)]
    #[case("abc", None)]
    #[case("1.5", None)]
    fn test_parse_id(#[case] raw: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_id(raw).ok(), expected);
    }

    #[rstest]
    #[case(None, 100)]
    #[case(Some(""), 100)]
    #[case(Some("abc"), 100)]
    #[case(Some("25"), 25)]
    #[case(Some("0"), 1)]
    #[case(Some("-10"), 1)]
    #[case(Some("9999"), 500)]
    #[case(Some("2.7"), 2)]
    fn test_parse_limit(#[case] raw: Option<&str>, #[case] expected: usize) {
        assert_eq!(parse_limit(raw, 100, 500), expected);
    }
}
