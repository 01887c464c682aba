pub mod genres;
pub mod health;
pub mod landing_pages;
pub mod movies;
pub mod page;
pub mod sections;
pub mod series;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(page::routes())
        .merge(movies::routes())
        .merge(series::routes())
        .merge(genres::routes())
        .merge(sections::routes())
        .merge(landing_pages::routes())
        .with_state(state)
}
