use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Anime, ALL_GENRES},
    routes::AppState,
};

const DEFAULT_TOP_LIMIT: usize = 10;
const MAX_TOP_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    limit: Option<usize>,
}

/// Genre selector options, "All" first
pub async fn genres(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let mut options = vec![ALL_GENRES.to_string()];
    options.extend(
        state
            .catalog
            .genre_universe()
            .into_iter()
            .filter(|genre| genre != ALL_GENRES),
    );
    Json(options)
}

/// Highest-rated titles by mean score
pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopQuery>,
) -> Json<Vec<Anime>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_TOP_LIMIT)
        .clamp(1, MAX_TOP_LIMIT);
    Json(state.catalog.top_rated(limit).into_iter().cloned().collect())
}

pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> AppResult<Json<Anime>> {
    state
        .catalog
        .get(&title)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No anime titled '{}'", title)))
}
