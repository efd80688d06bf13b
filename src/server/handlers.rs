use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::warn;

use crate::domain::errors::DomainError;
use crate::server::dto::{HealthResponse, ProcessVideoResponse};
use crate::server::error::ApiError;
use crate::server::upload::read_submission;
use crate::server::AppState;

/// `POST /api/process-video`
pub async fn process_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessVideoResponse>, ApiError> {
    // A body that is not a multipart form carries no file
    let multipart = multipart.map_err(|rejection| {
        warn!("Request is not a multipart form: {}", rejection);
        DomainError::MissingFile
    })?;

    let submission = read_submission(multipart, &state.upload_limits).await?;
    let result = state.interactor.execute(submission).await?;

    Ok(Json(result.into()))
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
