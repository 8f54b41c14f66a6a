use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::{PgPlaceRepository, PlaceRepository};
pub use repo_types::{NewPlace, Place, PlaceFilter, PlaceGone};

pub fn router() -> Router<AppState> {
    handlers::place_routes()
}
