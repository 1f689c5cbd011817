//! Request handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::{CreateFrequencyTableRequest, FrequencyTableResponse, PingResponse};

/// `GET /ping`
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

/// `POST /frequency-tables`
///
/// The body is decoded by hand so that an empty body, a malformed one and an
/// invalid field each get their own detail.
pub async fn create_frequency_table(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<FrequencyTableResponse>)> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::validation("invalid request"));
    }

    let request: CreateFrequencyTableRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::validation(e.to_string()))?;
    let url = request.validate().map_err(ApiError::Validation)?;

    tracing::info!(url, "Creating frequency table");
    let table = state.create.create(url).await?;

    Ok((
        StatusCode::CREATED,
        Json(FrequencyTableResponse::summary(&table)),
    ))
}

/// `GET /frequency-tables/{id}`
pub async fn get_frequency_table(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FrequencyTableResponse>> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::validation(format!("invalid field 'id' with value {id}")))?;

    let table = state.tables.get(id).await?;
    Ok(Json(FrequencyTableResponse::detailed(table)))
}
