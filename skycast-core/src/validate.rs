//! Shallow structural validation of a JSON candidate.
//!
//! Only the load-bearing parts are checked: `current` must exist and
//! `forecast` must be an array holding at least a week of entries. Fields
//! inside them and the optional sections are sorted out by
//! [`crate::normalize`].

use serde_json::Value;

use crate::{
    error::{ReportError, SchemaError},
    model::WeatherReport,
    normalize::{FORECAST_DAYS, RawReport, normalize},
};

pub fn parse_and_validate(candidate: &str) -> Result<WeatherReport, ReportError> {
    let value: Value = serde_json::from_str(candidate)?;
    check_shape(&value)?;

    let raw: RawReport =
        serde_json::from_value(value).map_err(|e| SchemaError::Malformed(e.to_string()))?;

    Ok(normalize(raw))
}

fn check_shape(value: &Value) -> Result<(), SchemaError> {
    let present = |key: &str| value.get(key).filter(|v| !v.is_null());

    if present("current").is_none() {
        return Err(SchemaError::MissingCurrent);
    }

    let forecast = present("forecast").ok_or(SchemaError::MissingForecast)?;
    let days = forecast
        .as_array()
        .ok_or_else(|| SchemaError::Malformed("`forecast` is not an array".into()))?;

    if days.len() < FORECAST_DAYS {
        return Err(SchemaError::ForecastTooShort {
            found: days.len(),
            expected: FORECAST_DAYS,
        });
    }

    Ok(())
}
