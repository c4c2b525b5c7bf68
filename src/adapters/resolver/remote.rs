use crate::domain::model::{Coordinate, ZipCode};
use crate::domain::ports::CoordinateResolver;
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

// zippopotam.us 回應格式；座標是字串
#[derive(Debug, Deserialize)]
struct LookupResponse {
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    latitude: String,
    longitude: String,
}

/// Resolves ZIPs over HTTP (`GET {endpoint}/{zip}`).
///
/// Every failure, timeouts included, is reported as `UnknownZip`: callers only need
/// accept/reject semantics.
#[derive(Debug, Clone)]
pub struct RemoteResolver {
    client: Client,
    endpoint: String,
}

impl RemoteResolver {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, zip: &ZipCode) -> Result<Coordinate> {
        let url = format!("{}/{}", self.endpoint, zip);
        tracing::debug!("Resolving {} via {}", zip, url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GateError::UnknownZip {
                zip: zip.to_string(),
            });
        }
        let body: LookupResponse = response.error_for_status()?.json().await?;

        let place = body.places.first().ok_or_else(|| GateError::UnknownZip {
            zip: zip.to_string(),
        })?;
        let latitude = parse_degrees("latitude", &place.latitude)?;
        let longitude = parse_degrees("longitude", &place.longitude)?;
        Coordinate::new(latitude, longitude)
    }
}

fn parse_degrees(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| GateError::ValidationError {
            message: format!("Invalid {} '{}': {}", field, raw, e),
        })
}

#[async_trait]
impl CoordinateResolver for RemoteResolver {
    async fn resolve(&self, zip: &ZipCode) -> Result<Coordinate> {
        self.fetch(zip).await.map_err(|e| {
            if !matches!(e, GateError::UnknownZip { .. }) {
                tracing::warn!("Remote lookup for {} failed: {}", zip, e);
            }
            GateError::UnknownZip {
                zip: zip.to_string(),
            }
        })
    }
}
