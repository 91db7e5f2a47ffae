use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    middleware::request_id::RequestId,
    models::{Anime, GenreFilter},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    pub count: Option<usize>,
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub title: String,
    pub genre: String,
    pub recommendations: Vec<Anime>,
}

/// Handler for recommendations endpoint.
///
/// `count` is clamped to `1..=max_recommendations`; an unknown title returns
/// an empty list rather than an error.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationQuery>,
) -> Json<RecommendationResponse> {
    let max = state.config.max_recommendations.max(1);
    let count = params.count.unwrap_or(max).clamp(1, max);
    let filter = GenreFilter::from(params.genre);

    let recommendations = state.engine.recommend(&params.title, count, &filter);

    tracing::info!(
        request_id = %request_id,
        title = %params.title,
        count,
        genre = %filter,
        returned = recommendations.len(),
        "Recommendations served"
    );

    Json(RecommendationResponse {
        title: params.title,
        genre: filter.to_string(),
        recommendations,
    })
}
