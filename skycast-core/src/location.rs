//! Location sources and the adapter that turns their failures into
//! [`LocationError`]s.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{error::LocationError, model::Coordinates};

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

const IP_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other,
}

/// Failure reported by a [`LocationSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionError {
    pub code: PositionErrorCode,
    pub message: String,
}

impl PositionError {
    pub fn new(code: PositionErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<PositionError> for LocationError {
    fn from(err: PositionError) -> Self {
        match err.code {
            PositionErrorCode::PermissionDenied => LocationError::PermissionDenied,
            PositionErrorCode::PositionUnavailable => LocationError::PositionUnavailable,
            PositionErrorCode::Timeout => LocationError::Timeout,
            PositionErrorCode::Other => LocationError::Unknown(err.message),
        }
    }
}

/// Something that can tell where the host is.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, PositionError>;
}

/// Wraps an optional [`LocationSource`]. No source means the host has no
/// location capability at all.
#[derive(Debug, Clone, Default)]
pub struct LocationAdapter {
    source: Option<Arc<dyn LocationSource>>,
}

impl LocationAdapter {
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self { source: Some(source) }
    }

    pub fn unsupported() -> Self {
        Self { source: None }
    }

    pub fn is_supported(&self) -> bool {
        self.source.is_some()
    }

    /// Single attempt; retrying is up to the caller.
    pub async fn acquire_coordinates(&self) -> Result<Coordinates, LocationError> {
        let source = self.source.as_ref().ok_or(LocationError::NotSupported)?;

        match source.current_position().await {
            Ok(coords) => {
                tracing::debug!(%coords, "acquired coordinates");
                Ok(coords)
            }
            Err(err) => {
                tracing::warn!(code = ?err.code, message = %err.message, "location lookup failed");
                Err(err.into())
            }
        }
    }
}

/// Coordinates supplied up front, e.g. from flags or the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        Ok(self.0)
    }
}

/// Approximates the host position from its public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpLocation {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(url, Duration::from_secs(IP_LOOKUP_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { url: url.into(), http })
    }
}

fn transport_failure(err: reqwest::Error) -> PositionError {
    if err.is_timeout() {
        PositionError::new(PositionErrorCode::Timeout, err.to_string())
    } else if err.is_connect() {
        PositionError::new(PositionErrorCode::PositionUnavailable, err.to_string())
    } else {
        PositionError::new(PositionErrorCode::Other, err.to_string())
    }
}

#[async_trait]
impl LocationSource for IpLocation {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = res.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PositionError::new(
                PositionErrorCode::PermissionDenied,
                format!("lookup refused with status {status}"),
            ));
        }
        if !status.is_success() {
            return Err(PositionError::new(
                PositionErrorCode::PositionUnavailable,
                format!("lookup failed with status {status}"),
            ));
        }

        let body: IpLookupResponse = res.json().await.map_err(|e| {
            PositionError::new(PositionErrorCode::Other, format!("Unreadable lookup reply: {e}"))
        })?;

        if body.status != "success" {
            return Err(PositionError::new(
                PositionErrorCode::PositionUnavailable,
                body.message.unwrap_or(body.status),
            ));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(PositionError::new(
                PositionErrorCode::PositionUnavailable,
                "lookup reply carried no coordinates",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Failing(PositionError);

    #[async_trait]
    impl LocationSource for Failing {
        async fn current_position(&self) -> Result<Coordinates, PositionError> {
            Err(self.0.clone())
        }
    }

    async fn failure(code: PositionErrorCode, message: &str) -> LocationError {
        let adapter = LocationAdapter::new(Arc::new(Failing(PositionError::new(code, message))));
        adapter.acquire_coordinates().await.unwrap_err()
    }

    #[tokio::test]
    async fn fixed_location_is_returned() {
        let adapter = LocationAdapter::new(Arc::new(FixedLocation(Coordinates::new(40.0, -75.0))));
        let coords = adapter.acquire_coordinates().await.unwrap();
        assert_eq!(coords, Coordinates::new(40.0, -75.0));
    }

    #[tokio::test]
    async fn missing_capability_is_not_supported() {
        let adapter = LocationAdapter::unsupported();
        assert!(!adapter.is_supported());
        let err = adapter.acquire_coordinates().await.unwrap_err();
        assert!(matches!(err, LocationError::NotSupported));
    }

    #[tokio::test]
    async fn failure_codes_map_to_categories() {
        assert!(matches!(
            failure(PositionErrorCode::PermissionDenied, "nope").await,
            LocationError::PermissionDenied
        ));
        assert!(matches!(
            failure(PositionErrorCode::PositionUnavailable, "").await,
            LocationError::PositionUnavailable
        ));
        assert!(matches!(
            failure(PositionErrorCode::Timeout, "").await,
            LocationError::Timeout
        ));
        match failure(PositionErrorCode::Other, "gps on fire").await {
            LocationError::Unknown(detail) => assert_eq!(detail, "gps on fire"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
