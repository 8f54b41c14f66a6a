use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // unique, exact match
    pub image: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub places: Vec<Uuid>,     // owned place ids, creation order
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub image: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Email(String),
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::All => true,
            Self::Email(email) => user.email == *email,
        }
    }
}

/// Raised by `create` when the email is already taken.
#[derive(Debug, thiserror::Error)]
#[error("email {0} already registered")]
pub struct DuplicateEmail(pub String);
