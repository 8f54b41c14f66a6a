use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::geocoding::GeocodeError;

/// Failures surfaced by the services, each with a client-facing message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Resolution(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Persistence(String),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Login failures never say whether the email or the password was wrong.
    pub fn invalid_credentials() -> Self {
        Self::Auth("Invalid credentials".into())
    }

    /// Wraps a store failure; the cause is logged, not sent to the client.
    pub fn persistence(msg: &str, cause: anyhow::Error) -> Self {
        error!(error = %format!("{:#}", cause), "{}", msg);
        Self::Persistence(msg.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Resolution(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::NoMatch => {
                Self::Resolution("Could not find location for the specified address.".into())
            }
            GeocodeError::Unavailable(reason) => {
                error!(%reason, "geocoder unavailable");
                Self::Unavailable("Geocoding service is unavailable, try again later.".into())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        (status, Json(ErrorBody { message: &message })).into_response()
    }
}
