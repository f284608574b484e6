//! Maps the loosely-typed provider payload onto the canonical [`WeatherReport`].

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::model::{
    ActivitySuggestions, CurrentConditions, DailyForecast, HourlyForecast, WeatherReport,
};

pub const FORECAST_DAYS: usize = 7;

/// Payload after shape validation. Required sections are decoded field by
/// field: a missing or mistyped field takes its default instead of failing
/// the report. Optional sections stay raw.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    #[serde(deserialize_with = "or_default")]
    pub current: RawCurrent,
    #[serde(deserialize_with = "each_or_default")]
    pub forecast: Vec<RawDaily>,
    #[serde(default)]
    pub hourly_forecast_today: Option<Value>,
    #[serde(default)]
    pub activity_suggestions: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCurrent {
    #[serde(deserialize_with = "text")]
    pub location_name: String,
    #[serde(deserialize_with = "number")]
    pub temperature_celsius: f64,
    #[serde(deserialize_with = "text")]
    pub condition: String,
    #[serde(deserialize_with = "text")]
    pub condition_emoji: String,
    #[serde(deserialize_with = "number")]
    pub humidity_percent: f64,
    #[serde(deserialize_with = "number")]
    pub wind_speed_kmh: f64,
    #[serde(deserialize_with = "text")]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDaily {
    #[serde(deserialize_with = "text")]
    pub date: String,
    #[serde(deserialize_with = "text")]
    pub day_of_week: String,
    #[serde(deserialize_with = "number")]
    pub temp_max_celsius: f64,
    #[serde(deserialize_with = "number")]
    pub temp_min_celsius: f64,
    #[serde(deserialize_with = "text")]
    pub condition: String,
    #[serde(deserialize_with = "text")]
    pub condition_emoji: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawHourly {
    #[serde(deserialize_with = "text")]
    time: String,
    #[serde(deserialize_with = "number")]
    temperature_celsius: f64,
    #[serde(deserialize_with = "text")]
    condition: String,
    #[serde(deserialize_with = "text")]
    condition_emoji: String,
    #[serde(deserialize_with = "optional_number")]
    precipitation_chance_percent: Option<f64>,
}

/// JSON number or numeric string. Anything else is `None`.
fn as_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(as_number(&Value::deserialize(de)?).unwrap_or_default())
}

fn optional_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(as_number(&Value::deserialize(de)?))
}

fn text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(de)?).unwrap_or_default())
}

fn each_or_default<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = Vec::<Value>::deserialize(de)?;
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Numbers are trusted as given; only rounded to whole units.
fn whole(value: f64) -> i32 {
    value.round() as i32
}

pub fn normalize(raw: RawReport) -> WeatherReport {
    let RawReport {
        current,
        forecast,
        hourly_forecast_today,
        activity_suggestions,
    } = raw;

    if forecast.len() > FORECAST_DAYS {
        tracing::debug!(days = forecast.len(), "dropping forecast days past the first week");
    }

    WeatherReport {
        current: CurrentConditions {
            location_name: current.location_name,
            temperature_celsius: current.temperature_celsius,
            condition: current.condition,
            condition_emoji: current.condition_emoji,
            humidity_percent: whole(current.humidity_percent),
            wind_speed_kmh: whole(current.wind_speed_kmh),
            description: current.description,
        },
        forecast: forecast
            .into_iter()
            .take(FORECAST_DAYS)
            .map(|day| DailyForecast {
                date: day.date,
                day_of_week: day.day_of_week,
                temp_max_celsius: whole(day.temp_max_celsius),
                temp_min_celsius: whole(day.temp_min_celsius),
                condition: day.condition,
                condition_emoji: day.condition_emoji,
            })
            .collect(),
        hourly_forecast_today: normalize_hourly(hourly_forecast_today),
        activity_suggestions: normalize_activities(activity_suggestions),
    }
}

fn normalize_hourly(value: Option<Value>) -> Vec<HourlyForecast> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Vec::new();
    };

    match serde_json::from_value::<Vec<RawHourly>>(value) {
        Ok(hours) => hours
            .into_iter()
            .map(|h| HourlyForecast {
                time: h.time,
                temperature_celsius: whole(h.temperature_celsius),
                condition: h.condition,
                condition_emoji: h.condition_emoji,
                precipitation_chance_percent: h.precipitation_chance_percent.map(whole),
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed hourly forecast");
            Vec::new()
        }
    }
}

fn normalize_activities(value: Option<Value>) -> Option<ActivitySuggestions> {
    let value = value.filter(|v| !v.is_null())?;

    match serde_json::from_value::<ActivitySuggestions>(value) {
        Ok(suggestions) => Some(suggestions),
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed activity suggestions");
            None
        }
    }
}
