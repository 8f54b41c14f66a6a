use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Place;
use crate::error::AppError;

const MIN_DESCRIPTION_LEN: usize = 5;

#[derive(Debug, Deserialize)]
pub struct CreatePlaceRequest {
    pub title: String,
    pub description: String,
    pub address: String,
    pub creator: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaceRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub place: Place,
}

#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub places: Vec<Place>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn check_title_and_description(title: &str, description: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title must not be empty."));
    }
    if description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(AppError::validation(format!(
            "Description must be at least {} characters.",
            MIN_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

impl CreatePlaceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_title_and_description(&self.title, &self.description)?;
        if self.address.trim().is_empty() {
            return Err(AppError::validation("Address must not be empty."));
        }
        Ok(())
    }
}

impl UpdatePlaceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_title_and_description(&self.title, &self.description)
    }
}
