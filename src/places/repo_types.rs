use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::geocoding::Coordinates;

/// Place record as stored and returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub location: Coordinates,
    pub image: String,
    pub creator: Uuid, // owning user, never null
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A place built by the coordinator but not yet persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPlace {
    pub title: String,
    pub description: String,
    pub address: String,
    pub location: Coordinates,
    pub image: String,
    pub creator: Uuid,
}

/// Typed predicate for place lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceFilter {
    All,
    Creator(Uuid),
}

impl PlaceFilter {
    pub fn matches(&self, place: &Place) -> bool {
        match self {
            Self::All => true,
            Self::Creator(id) => place.creator == *id,
        }
    }
}

/// Raised by `save` when no row matched, e.g. after a concurrent delete.
#[derive(Debug, thiserror::Error)]
#[error("place {0} vanished during update")]
pub struct PlaceGone(pub Uuid);

#[derive(Debug, FromRow)]
pub struct PlaceRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub image: String,
    pub creator_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl From<PlaceRow> for Place {
    fn from(r: PlaceRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            address: r.address,
            location: Coordinates { lat: r.lat, lng: r.lng },
            image: r.image,
            creator: r.creator_id,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_serializes_location_as_numeric_pair() {
        let place = Place {
            id: Uuid::new_v4(),
            title: "Empire State".into(),
            description: "Tall building".into(),
            address: "350 5th Ave".into(),
            location: Coordinates { lat: 40.7484474, lng: -73.9871516 },
            image: "https://example.com/a.jpg".into(),
            creator: Uuid::new_v4(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["location"]["lat"], 40.7484474);
        assert_eq!(json["location"]["lng"], -73.9871516);
        assert_eq!(json["creator"], place.creator.to_string());
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn creator_filter_matches_owner_only() {
        let owner = Uuid::new_v4();
        let place = Place {
            id: Uuid::new_v4(),
            title: String::new(),
            description: String::new(),
            address: String::new(),
            location: Coordinates { lat: 0.0, lng: 0.0 },
            image: String::new(),
            creator: owner,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert!(PlaceFilter::All.matches(&place));
        assert!(PlaceFilter::Creator(owner).matches(&place));
        assert!(!PlaceFilter::Creator(Uuid::new_v4()).matches(&place));
    }
}
