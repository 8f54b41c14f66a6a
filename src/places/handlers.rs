use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    CreatePlaceRequest, MessageResponse, PlaceResponse, PlacesResponse, UpdatePlaceRequest,
};
use super::services::{self, CreatePlace};
use crate::{error::AppError, state::AppState};

pub fn place_routes() -> Router<AppState> {
    Router::new()
        .route("/places", post(create_place))
        .route("/places/user/:uid", get(get_places_by_user))
        .route(
            "/places/:pid",
            get(get_place).patch(update_place).delete(delete_place),
        )
}

#[instrument(skip(state))]
pub async fn get_place(
    State(state): State<AppState>,
    Path(pid): Path<Uuid>,
) -> Result<Json<PlaceResponse>, AppError> {
    let place = services::get_place(&state, pid).await?;
    Ok(Json(PlaceResponse { place }))
}

#[instrument(skip(state))]
pub async fn get_places_by_user(
    State(state): State<AppState>,
    Path(uid): Path<Uuid>,
) -> Result<Json<PlacesResponse>, AppError> {
    let places = services::places_by_owner(&state, uid).await?;
    Ok(Json(PlacesResponse { places }))
}

#[instrument(skip(state, payload))]
pub async fn create_place(
    State(state): State<AppState>,
    Json(payload): Json<CreatePlaceRequest>,
) -> Result<(StatusCode, Json<PlaceResponse>), AppError> {
    payload.validate()?;
    let place = services::create_place(
        &state,
        CreatePlace {
            owner_id: payload.creator,
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
            address: payload.address.trim().to_string(),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(PlaceResponse { place })))
}

#[instrument(skip(state, payload))]
pub async fn update_place(
    State(state): State<AppState>,
    Path(pid): Path<Uuid>,
    Json(payload): Json<UpdatePlaceRequest>,
) -> Result<Json<PlaceResponse>, AppError> {
    payload.validate()?;
    let place = services::update_place(
        &state,
        pid,
        payload.title.trim().to_string(),
        payload.description.trim().to_string(),
    )
    .await?;
    Ok(Json(PlaceResponse { place }))
}

#[instrument(skip(state))]
pub async fn delete_place(
    State(state): State<AppState>,
    Path(pid): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete_place(&state, pid).await?;
    Ok(Json(MessageResponse {
        message: "Deleted place.",
    }))
}
