use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::{PgUserRepository, UserRepository};
pub use repo_types::{DuplicateEmail, NewUser, User, UserFilter};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
