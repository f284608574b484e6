use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub location_name: String,
    /// As reported, unrounded. Theming compares it against exact thresholds.
    pub temperature_celsius: f64,
    pub condition: String,
    pub condition_emoji: String,
    pub humidity_percent: i32,
    pub wind_speed_kmh: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    /// Full weekday name, e.g. "Monday".
    pub day_of_week: String,
    pub temp_max_celsius: i32,
    pub temp_min_celsius: i32,
    pub condition: String,
    pub condition_emoji: String,
}

impl DailyForecast {
    /// High below low. Shown as-is, never rejected.
    pub fn has_inverted_range(&self) -> bool {
        self.temp_max_celsius < self.temp_min_celsius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    /// 24h `HH:00` token.
    pub time: String,
    pub temperature_celsius: i32,
    pub condition: String,
    pub condition_emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_chance_percent: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityName {
    Running,
    Biking,
    #[serde(rename = "Car Travel")]
    CarTravel,
    Jogging,
    #[serde(rename = "Outdoor Play")]
    OutdoorPlay,
}

impl ActivityName {
    pub const ALL: [ActivityName; 5] = [
        ActivityName::Running,
        ActivityName::Biking,
        ActivityName::CarTravel,
        ActivityName::Jogging,
        ActivityName::OutdoorPlay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityName::Running => "Running",
            ActivityName::Biking => "Biking",
            ActivityName::CarTravel => "Car Travel",
            ActivityName::Jogging => "Jogging",
            ActivityName::OutdoorPlay => "Outdoor Play",
        }
    }
}

impl fmt::Display for ActivityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityRating {
    Good,
    Fair,
    Poor,
    #[serde(rename = "Caution Advised")]
    CautionAdvised,
    #[serde(rename = "Not Recommended")]
    NotRecommended,
}

impl ActivityRating {
    pub const ALL: [ActivityRating; 5] = [
        ActivityRating::Good,
        ActivityRating::Fair,
        ActivityRating::Poor,
        ActivityRating::CautionAdvised,
        ActivityRating::NotRecommended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityRating::Good => "Good",
            ActivityRating::Fair => "Fair",
            ActivityRating::Poor => "Poor",
            ActivityRating::CautionAdvised => "Caution Advised",
            ActivityRating::NotRecommended => "Not Recommended",
        }
    }

    /// Lowercase, hyphen-separated label, e.g. `caution-advised`.
    pub fn slug(&self) -> String {
        self.as_str().to_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for ActivityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAssessment {
    pub name: ActivityName,
    pub rating: ActivityRating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySuggestions {
    #[serde(default)]
    pub overall_summary: String,
    #[serde(default)]
    pub activities: Vec<ActivityAssessment>,
}

/// Validated, normalized weather report. Replaced wholesale on every
/// successful cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub current: CurrentConditions,
    /// Seven days, index 0 is today.
    pub forecast: Vec<DailyForecast>,
    pub hourly_forecast_today: Vec<HourlyForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_suggestions: Option<ActivitySuggestions>,
}

impl WeatherReport {
    pub fn today(&self) -> Option<&DailyForecast> {
        self.forecast.first()
    }

    pub fn has_hourly(&self) -> bool {
        !self.hourly_forecast_today.is_empty()
    }

    pub fn has_activities(&self) -> bool {
        self.activity_suggestions
            .as_ref()
            .is_some_and(|s| !s.activities.is_empty())
    }
}
