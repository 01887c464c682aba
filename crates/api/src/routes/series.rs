use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use flimix_core::content::model::{Series, SeriesInput, SeriesWithGenres};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/series", get(list).post(create))
        .route("/api/series/{id}", put(update).delete(remove))
        .route("/api/series/{id}/genres", put(set_genres))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<SeriesWithGenres>>> {
    Ok(Json(state.content().list_series().await?))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<SeriesInput>,
) -> ApiResult<Json<Series>> {
    Ok(Json(state.content().create_series(&input).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<SeriesInput>,
) -> ApiResult<Json<Series>> {
    Ok(Json(state.content().update_series(id, &input).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.content().delete_series(id).await?;
    Ok(Json(json!({ "deleted": id })))
}

#[derive(Debug, Deserialize)]
struct GenreIds {
    genre_ids: Vec<i64>,
}

/// Replace the series' genre tag list.
async fn set_genres(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<GenreIds>,
) -> ApiResult<Json<Value>> {
    state
        .content()
        .set_series_genres(id, &body.genre_ids)
        .await?;
    Ok(Json(json!({ "id": id, "genre_ids": body.genre_ids })))
}
