use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use flimix_core::content::Genre;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/genres", get(list).post(create))
        .route("/api/genres/{id}", delete(remove))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(state.content().list_genres().await?))
}

#[derive(Debug, Deserialize)]
struct CreateGenre {
    name: String,
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateGenre>,
) -> ApiResult<Json<Genre>> {
    Ok(Json(state.content().create_genre(&body.name).await?))
}

/// Deleting a genre detaches it from all content; automatic sections
/// filtering on it lose their filter rather than dangling.
async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.content().delete_genre(id).await?;
    Ok(Json(json!({ "deleted": id })))
}
