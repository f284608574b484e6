use crate::{
    model::{ActivityName, ActivityRating, Coordinates},
    normalize::FORECAST_DAYS,
};

fn quoted_list(items: impl IntoIterator<Item = &'static str>) -> String {
    items
        .into_iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the report request for a position.
///
/// The JSON shape spelled out here is the contract `validate` and
/// `normalize` depend on; change them together.
pub fn build_prompt(at: Coordinates) -> String {
    let names = quoted_list(ActivityName::ALL.iter().map(ActivityName::as_str));
    let ratings = quoted_list(ActivityRating::ALL.iter().map(ActivityRating::as_str));
    let activity_rows = ActivityName::ALL
        .iter()
        .skip(1)
        .map(|name| format!(r#"      {{ "name": "{name}", "rating": "...", "advice": "..." }}"#))
        .collect::<Vec<_>>()
        .join(",\n");
    let days = FORECAST_DAYS;
    let more_days = FORECAST_DAYS - 1;
    let (latitude, longitude) = (at.latitude, at.longitude);

    format!(
        r#"Provide a comprehensive weather forecast for latitude {latitude} and longitude {longitude}.
Return the response strictly as a JSON object only, with no surrounding text or markdown.
The JSON object must adhere to the following structure:
{{
  "current": {{
    "locationName": "City, Region",
    "temperatureCelsius": "number (integer)",
    "condition": "e.g., Sunny, Partly Cloudy, Rainy",
    "conditionEmoji": "appropriate emoji",
    "humidityPercent": "number (integer, 0-100)",
    "windSpeedKmh": "number (integer)",
    "description": "A concise, friendly, and engaging current weather summary, 20-30 words max."
  }},
  "forecast": [ // Array of {days} days, starting with today (forecast[0] is today)
    {{
      "date": "YYYY-MM-DD",
      "dayOfWeek": "Full name e.g., Monday",
      "tempMaxCelsius": "number (integer)",
      "tempMinCelsius": "number (integer)",
      "condition": "Daily overall condition e.g., Sunny, Showers, Cloudy",
      "conditionEmoji": "appropriate emoji for the day's overall condition"
    }}
    // ...{more_days} more days
  ],
  "hourlyForecastToday": [ // Next 8-12 hours of today, or empty if not available
    {{
      "time": "HH:00", // 24-hour format, e.g., "14:00"
      "temperatureCelsius": "number (integer)",
      "condition": "Hourly specific condition",
      "conditionEmoji": "appropriate emoji",
      "precipitationChancePercent": "number (integer, 0-100, optional, default to 0 if not relevant)"
    }}
    // ...more hours
  ],
  "activitySuggestions": {{ // Optional, can be omitted if not applicable
    "overallSummary": "A general suggestion for activities based on today's overall weather (max 30 words).",
    "activities": [ // Array of {activity_count} specific activities
      {{
        "name": "{first}", // Must be one of: {names}
        "rating": "{good}", // Must be one of: {ratings}
        "advice": "Optional short advice, e.g., 'Stay hydrated during afternoon hours.' (max 15 words)"
      }},
{activity_rows}
    ]
  }}
}}
Ensure all temperatures are in Celsius. For conditions, use common, concise terms.
The 'forecast' array must contain {days} entries.
'hourlyForecastToday' should cover significant parts of the current day. If it's late, provide the remaining hours or an empty array.
'activitySuggestions' ratings should be practical. 'Car Travel' advice could relate to visibility or road conditions.
Prioritize accuracy for locationName."#,
        activity_count = ActivityName::ALL.len(),
        first = ActivityName::Running,
        good = ActivityRating::Good,
    )
}
