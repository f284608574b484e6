//! Core library for the `skycast` weather report.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location sources and the generative report provider
//! - The extract → validate → normalize pipeline for model output
//! - The report cycle state machine, theming and display helpers
//!
//! It is used by `skycast-cli`, but render sinks other than a terminal can
//! drive it just as well.

pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod location;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod theme;
pub mod validate;

pub use config::Config;
pub use error::{ConfigError, LocationError, ProviderError, ReportError, SchemaError};
pub use extract::extract_json_candidate;
pub use location::{FixedLocation, IpLocation, LocationAdapter, LocationSource};
pub use model::{Coordinates, WeatherReport};
pub use orchestrator::{ForecastOrchestrator, Phase, RenderSink, Snapshot, UiState};
pub use provider::ReportProvider;
pub use theme::{ThemeTokens, derive_theme};
pub use validate::parse_and_validate;
