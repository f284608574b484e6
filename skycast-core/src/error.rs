//! Error taxonomy for a report cycle.
//!
//! Every failure a cycle can hit ends up as a [`ReportError`], and every
//! [`ReportError`] knows the message shown to the user in the error state.

use thiserror::Error;

const PROVIDER_MESSAGE: &str =
    "Oops! We couldn't fetch the latest weather report. Please try again later.";
const PARSE_MESSAGE: &str =
    "There was an issue understanding the weather data from the server. Please try again.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("coordinates out of range: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::MissingApiKey => {
                "API key is missing. Please set GEMINI_API_KEY or run `skycast configure`.".into()
            }
            ConfigError::InvalidCoordinates { latitude, longitude } => format!(
                "The configured location ({latitude}, {longitude}) is not a valid position."
            ),
            ConfigError::HttpClient(_) => "Could not set up a network client on this host.".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("location lookup failed: {0}")]
    Unknown(String),

    #[error("no location capability on this host")]
    NotSupported,
}

impl LocationError {
    pub fn user_message(&self) -> String {
        match self {
            LocationError::PermissionDenied => "Location access was denied. To use this app, \
                please enable location services and try again."
                .into(),
            LocationError::PositionUnavailable => "Your location information is currently \
                unavailable. Please ensure location services are enabled, or try again later."
                .into(),
            LocationError::Timeout => "The request to get your location timed out. \
                Please check your connection and try again."
                .into(),
            LocationError::Unknown(detail) if !detail.trim().is_empty() => {
                format!("Could not retrieve your location. {}", detail.trim())
            }
            LocationError::Unknown(_) => {
                "Could not retrieve your location. An unknown error occurred.".into()
            }
            LocationError::NotSupported => "Geolocation is not supported on this host. \
                Configure fixed coordinates to use this app."
                .into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider reported an error: {0}")]
    Provider(String),

    #[error("provider returned no content{}", blocked_suffix(.reason))]
    Empty { reason: Option<String> },

    #[error("could not decode provider envelope: {0}")]
    Envelope(String),
}

fn blocked_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {r})"))
        .unwrap_or_default()
}

/// Well-formed JSON that lacks the load-bearing parts of a report.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("report is missing `current`")]
    MissingCurrent,

    #[error("report is missing `forecast`")]
    MissingForecast,

    #[error("`forecast` has {found} entries, expected at least {expected}")]
    ForecastTooShort { found: usize, expected: usize },

    #[error("report has the wrong shape: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("report is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ReportError {
    /// Message for the error state.
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Configuration(e) => e.user_message(),
            ReportError::Location(e) => e.user_message(),
            ReportError::Provider(_) => PROVIDER_MESSAGE.into(),
            ReportError::Parse(_) | ReportError::Schema(_) => PARSE_MESSAGE.into(),
        }
    }

    /// Configuration problems end the session; everything else can be retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ReportError::Configuration(_))
    }
}
