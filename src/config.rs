use serde::Deserialize;

pub const DEFAULT_IMAGE_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/1/10/Empire_State_Building_%28aerial_view%29.jpg/400px-Empire_State_Building_%28aerial_view%29.jpg";
pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => anyhow::bail!("unknown STORE_BACKEND `{}`", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Google API key; without one the fixed resolver is used.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub fallback_lat: f64,
    pub fallback_lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub geocoder: GeocoderConfig,
    pub default_image_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("STORE_BACKEND") {
            Ok(v) => StoreBackend::parse(&v)?,
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required when STORE_BACKEND=postgres");
        }
        let geocoder = GeocoderConfig {
            api_key: std::env::var("GOOGLE_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            base_url: std::env::var("GEOCODER_BASE_URL")
                .unwrap_or_else(|_| GOOGLE_GEOCODE_URL.into()),
            timeout_secs: std::env::var("GEOCODER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
            fallback_lat: 40.7484474,
            fallback_lng: -73.9871516,
        };
        Ok(Self {
            store,
            database_url,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            geocoder,
            default_image_url: std::env::var("DEFAULT_IMAGE_URL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_URL.into()),
        })
    }

    /// In-memory configuration with the fixed resolver, used by tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            store: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
            geocoder: GeocoderConfig {
                api_key: None,
                base_url: GOOGLE_GEOCODE_URL.into(),
                timeout_secs: 1,
                fallback_lat: 40.7484474,
                fallback_lng: -73.9871516,
            },
            default_image_url: DEFAULT_IMAGE_URL.into(),
        }
    }
}
