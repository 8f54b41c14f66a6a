use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::config::{AppConfig, StoreBackend};
use crate::geocoding::{FixedGeocoder, GeocodingResolver, GoogleGeocoder};
use crate::locks::OwnerLocks;
use crate::places::{PgPlaceRepository, PlaceRepository};
use crate::store::{MemoryPlaceRepository, MemoryUserRepository};
use crate::users::{PgUserRepository, UserRepository};

/// Process-wide dependencies, built once at startup and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub places: Arc<dyn PlaceRepository>,
    pub users: Arc<dyn UserRepository>,
    pub geocoder: Arc<dyn GeocodingResolver>,
    pub owner_locks: Arc<OwnerLocks>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (places, users): (Arc<dyn PlaceRepository>, Arc<dyn UserRepository>) =
            match config.store {
                StoreBackend::Postgres => {
                    let url = config
                        .database_url
                        .as_deref()
                        .context("DATABASE_URL not set")?;
                    let db = PgPoolOptions::new()
                        .max_connections(config.max_connections)
                        .connect(url)
                        .await
                        .context("connect to database")?;

                    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                        warn!(error = %e, "migration failed; continuing");
                    }

                    (
                        Arc::new(PgPlaceRepository::new(db.clone())) as Arc<dyn PlaceRepository>,
                        Arc::new(PgUserRepository::new(db)) as Arc<dyn UserRepository>,
                    )
                }
                StoreBackend::Memory => {
                    warn!("using in-memory store; data is lost on restart");
                    (
                        Arc::new(MemoryPlaceRepository::new()) as Arc<dyn PlaceRepository>,
                        Arc::new(MemoryUserRepository::new()) as Arc<dyn UserRepository>,
                    )
                }
            };

        let geocoder: Arc<dyn GeocodingResolver> = match &config.geocoder.api_key {
            Some(key) => {
                info!("geocoding with google");
                Arc::new(GoogleGeocoder::new(
                    &config.geocoder.base_url,
                    key,
                    config.geocoder.timeout_secs,
                )?)
            }
            None => {
                info!("GOOGLE_API_KEY not set; geocoding to a fixed point");
                Arc::new(FixedGeocoder::new(
                    config.geocoder.fallback_lat,
                    config.geocoder.fallback_lng,
                ))
            }
        };

        Ok(Self::from_parts(config, places, users, geocoder))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        places: Arc<dyn PlaceRepository>,
        users: Arc<dyn UserRepository>,
        geocoder: Arc<dyn GeocodingResolver>,
    ) -> Self {
        Self {
            config,
            places,
            users,
            geocoder,
            owner_locks: Arc::new(OwnerLocks::new()),
        }
    }
}

/// Test wiring: in-memory stores with their fault switches still reachable.
#[cfg(test)]
pub struct Fake {
    pub state: AppState,
    pub places: Arc<MemoryPlaceRepository>,
    pub users: Arc<MemoryUserRepository>,
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Fake {
        Self::fake_with_geocoder(Arc::new(FixedGeocoder::new(40.7484474, -73.9871516)))
    }

    pub fn fake_with_geocoder(geocoder: Arc<dyn GeocodingResolver>) -> Fake {
        let places = Arc::new(MemoryPlaceRepository::new());
        let users = Arc::new(MemoryUserRepository::new());
        let state = Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            places.clone(),
            users.clone(),
            geocoder,
        );
        Fake {
            state,
            places,
            users,
        }
    }
}
