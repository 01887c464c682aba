use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use flimix_core::content::model::{Movie, MovieInput, MovieWithGenres};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/movies", get(list).post(create))
        .route("/api/movies/{id}", put(update).delete(remove))
        .route("/api/movies/{id}/genres", put(set_genres))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<MovieWithGenres>>> {
    Ok(Json(state.content().list_movies().await?))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<MovieInput>,
) -> ApiResult<Json<Movie>> {
    Ok(Json(state.content().create_movie(&input).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<MovieInput>,
) -> ApiResult<Json<Movie>> {
    Ok(Json(state.content().update_movie(id, &input).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.content().delete_movie(id).await?;
    Ok(Json(json!({ "deleted": id })))
}

#[derive(Debug, Deserialize)]
struct GenreIds {
    genre_ids: Vec<i64>,
}

/// Replace the movie's genre tag list.
async fn set_genres(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<GenreIds>,
) -> ApiResult<Json<Value>> {
    state.content().set_movie_genres(id, &body.genre_ids).await?;
    Ok(Json(json!({ "id": id, "genre_ids": body.genre_ids })))
}
