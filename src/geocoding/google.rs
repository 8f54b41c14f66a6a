use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::{Coordinates, GeocodeError, GeocodingResolver};

/// Google Geocoding API client.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

impl GoogleGeocoder {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

fn coordinates_from(body: GeocodeResponse) -> Result<Coordinates, GeocodeError> {
    match body.status.as_str() {
        "OK" => {
            let point = body
                .results
                .into_iter()
                .next()
                .map(|r| r.geometry.location)
                .ok_or(GeocodeError::NoMatch)?;
            if point.is_finite() {
                Ok(point)
            } else {
                Err(GeocodeError::NoMatch)
            }
        }
        "ZERO_RESULTS" => Err(GeocodeError::NoMatch),
        other => Err(GeocodeError::Unavailable(format!(
            "status {}: {}",
            other,
            body.error_message.unwrap_or_default()
        ))),
    }
}

#[async_trait]
impl GeocodingResolver for GoogleGeocoder {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::NoMatch);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                // the url carries the api key
                let e = e.without_url();
                error!(error = %e, "geocode request failed");
                GeocodeError::Unavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "geocode http error");
            return Err(GeocodeError::Unavailable(format!("HTTP {}", status)));
        }

        let body = response
            .json::<GeocodeResponse>()
            .await
            .map_err(|e| {
                GeocodeError::Unavailable(format!("malformed reply: {}", e.without_url()))
            })?;

        let point = coordinates_from(body)?;
        debug!(%address, lat = point.lat, lng = point.lng, "address geocoded");
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    const KEY: &str = "test-api-key-1234";

    fn geocoder_for(server: &MockServer) -> GoogleGeocoder {
        GoogleGeocoder::new(&server.url("/geocode/json"), KEY, 2).unwrap()
    }

    fn parse(raw: &str) -> GeocodeResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn ok_status_takes_first_result() {
        let body = parse(
            r#"{"status":"OK","results":[
                {"geometry":{"location":{"lat":40.7484474,"lng":-73.9871516}}},
                {"geometry":{"location":{"lat":0.0,"lng":0.0}}}
            ]}"#,
        );
        assert_eq!(
            coordinates_from(body).unwrap(),
            Coordinates { lat: 40.7484474, lng: -73.9871516 }
        );
    }

    #[test]
    fn zero_results_is_no_match() {
        let body = parse(r#"{"status":"ZERO_RESULTS","results":[]}"#);
        assert_eq!(coordinates_from(body).unwrap_err(), GeocodeError::NoMatch);
    }

    #[test]
    fn ok_without_results_is_no_match() {
        let body = parse(r#"{"status":"OK"}"#);
        assert_eq!(coordinates_from(body).unwrap_err(), GeocodeError::NoMatch);
    }

    #[test]
    fn other_status_is_unavailable() {
        let body = parse(r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#);
        match coordinates_from(body).unwrap_err() {
            GeocodeError::Unavailable(msg) => assert!(msg.contains("bad key")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn blank_address_short_circuits() {
        let geo = GoogleGeocoder::new("http://127.0.0.1:9", "k", 1).unwrap();
        assert_eq!(geo.resolve("").await.unwrap_err(), GeocodeError::NoMatch);
    }

    #[tokio::test]
    async fn sends_address_and_key_and_decodes_ok_reply() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/geocode/json")
                    .query_param("address", "350 5th Ave")
                    .query_param("key", KEY);
                then.status(200).json_body(json!({
                    "status": "OK",
                    "results": [{"geometry": {"location": {"lat": 40.7484474, "lng": -73.9871516}}}]
                }));
            })
            .await;

        let point = geocoder_for(&server).resolve("350 5th Ave").await.unwrap();

        m.assert_async().await;
        assert_eq!(point, Coordinates { lat: 40.7484474, lng: -73.9871516 });
    }

    #[tokio::test]
    async fn zero_results_reply_is_no_match() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/geocode/json");
                then.status(200)
                    .json_body(json!({"status": "ZERO_RESULTS", "results": []}));
            })
            .await;

        let err = geocoder_for(&server).resolve("nowhere at all").await.unwrap_err();
        assert_eq!(err, GeocodeError::NoMatch);
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/geocode/json");
                then.status(500).body("boom");
            })
            .await;

        let err = geocoder_for(&server).resolve("350 5th Ave").await.unwrap_err();
        match err {
            GeocodeError::Unavailable(msg) => assert!(msg.contains("500")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_reply_is_unavailable_without_key() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/geocode/json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("{not json");
            })
            .await;

        let err = geocoder_for(&server).resolve("350 5th Ave").await.unwrap_err();
        match err {
            GeocodeError::Unavailable(msg) => {
                assert!(msg.starts_with("malformed reply"));
                assert!(!msg.contains(KEY));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_failure_does_not_leak_key() {
        let geo = GoogleGeocoder::new("http://127.0.0.1:9/geocode", "SUPERSECRETKEY", 1).unwrap();
        match geo.resolve("350 5th Ave").await.unwrap_err() {
            GeocodeError::Unavailable(msg) => {
                assert!(!msg.contains("SUPERSECRETKEY"));
                assert!(!msg.contains("key="));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
