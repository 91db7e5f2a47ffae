use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::FeedbackRecord,
    routes::AppState,
};

/// Validates and persists one feedback submission
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(record): Json<FeedbackRecord>,
) -> AppResult<(StatusCode, Json<FeedbackRecord>)> {
    record.validate()?;

    if let Err(e) = state.feedback_store.append(record.clone()).await {
        tracing::error!(
            request_id = %request_id,
            anime = %record.anime,
            error = %e,
            "Failed to store feedback"
        );
        return Err(e);
    }

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<FeedbackRecord>>> {
    Ok(Json(state.feedback_store.list().await?))
}
