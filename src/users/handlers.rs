use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{LoginRequest, LoginResponse, SignupRequest, UserResponse, UsersResponse};
use super::services;
use crate::{error::AppError, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
}

#[instrument(skip(state))]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, AppError> {
    let users = services::list_users(&state).await?;
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.email = payload.email.trim().to_string();
    payload.validate()?;

    let user = services::signup(
        &state,
        payload.name.trim().to_string(),
        payload.email,
        &payload.password,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    services::login(&state, payload.email.trim(), &payload.password).await?;
    Ok(Json(LoginResponse {
        message: "Logged in!",
    }))
}
