//! Address to coordinate resolution.
//!
//! The resolver knows nothing about places or users; callers hold it as
//! `Arc<dyn GeocodingResolver>` and never branch on the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod fixed;
mod google;

pub use fixed::FixedGeocoder;
pub use google::GoogleGeocoder;

/// A resolved point, both components finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeocodeError {
    /// The address did not match any location.
    #[error("no location matches the address")]
    NoMatch,
    /// The lookup itself failed (network, HTTP status, malformed reply).
    #[error("geocoder unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait GeocodingResolver: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}
