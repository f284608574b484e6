//! Colour palette derived from the current condition and temperature.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ThemeTokens {
    pub gradient_start: &'static str,
    pub gradient_end: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub card_background: &'static str,
}

impl ThemeTokens {
    /// Clear/mild palette used when no condition keyword matches.
    pub const DEFAULT: ThemeTokens = ThemeTokens {
        gradient_start: "#74ebd5",
        gradient_end: "#ACB6E5",
        text_primary: "#333",
        text_secondary: "#555",
        card_background: "rgba(255, 255, 255, 0.85)",
    };

    /// Palette for the error state.
    pub const ERROR: ThemeTokens = ThemeTokens {
        gradient_start: "#A9A9A9",
        gradient_end: "#696969",
        text_primary: "#FFFFFF",
        text_secondary: "#DDDDDD",
        card_background: "rgba(100, 100, 100, 0.8)",
    };

    /// Custom-property names and values, in a fixed order.
    pub fn css_properties(&self) -> [(&'static str, &'static str); 5] {
        [
            ("gradient-start", self.gradient_start),
            ("gradient-end", self.gradient_end),
            ("text-primary", self.text_primary),
            ("text-secondary", self.text_secondary),
            ("card-background", self.card_background),
        ]
    }
}

struct ConditionRule {
    keywords: &'static [&'static str],
    gradient: (&'static str, &'static str),
    text_primary: &'static str,
    text_secondary: Option<&'static str>,
    card_background: &'static str,
}

const SUNNY: &[&str] = &["sunny", "clear"];

// Order matters: the first rule with a matching keyword wins.
const CONDITION_RULES: &[ConditionRule] = &[
    ConditionRule {
        keywords: SUNNY,
        gradient: ("#FFDA7B", "#FFB347"),
        text_primary: "#4A4A4A",
        text_secondary: None,
        card_background: "rgba(255, 248, 225, 0.9)",
    },
    ConditionRule {
        keywords: &["cloudy", "partly cloudy"],
        gradient: ("#B0C4DE", "#8E9EAB"),
        text_primary: "#404040",
        text_secondary: None,
        card_background: "rgba(240, 248, 255, 0.9)",
    },
    ConditionRule {
        keywords: &["rain", "drizzle", "thunderstorm"],
        gradient: ("#607D8B", "#455A64"),
        text_primary: "#FFFFFF",
        text_secondary: Some("#E0E0E0"),
        card_background: "rgba(100, 120, 130, 0.85)",
    },
    ConditionRule {
        keywords: &["snow", "sleet"],
        gradient: ("#E6E9F0", "#E0E7FF"),
        text_primary: "#334E68",
        text_secondary: None,
        card_background: "rgba(250, 250, 255, 0.92)",
    },
    ConditionRule {
        keywords: &["fog", "mist"],
        gradient: ("#D3D3D3", "#A9A9A9"),
        text_primary: "#333",
        text_secondary: None,
        card_background: "rgba(235, 235, 235, 0.9)",
    },
];

const HOT_GRADIENT: (&str, &str) = ("#FF8C42", "#FF6220");
const COLD_GRADIENT: (&str, &str) = ("#A7C7E7", "#8DA8C5");

fn mentions(condition: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| condition.contains(k))
}

/// Derives the palette for a lowercased condition and a temperature in °C.
pub fn derive_theme(condition: &str, temperature_celsius: f64) -> ThemeTokens {
    let mut tokens = ThemeTokens::DEFAULT;

    if let Some(rule) = CONDITION_RULES
        .iter()
        .find(|rule| mentions(condition, rule.keywords))
    {
        (tokens.gradient_start, tokens.gradient_end) = rule.gradient;
        tokens.text_primary = rule.text_primary;
        if let Some(secondary) = rule.text_secondary {
            tokens.text_secondary = secondary;
        }
        tokens.card_background = rule.card_background;
    }

    if temperature_celsius > 30.0 && mentions(condition, SUNNY) {
        (tokens.gradient_start, tokens.gradient_end) = HOT_GRADIENT;
    } else if temperature_celsius < 0.0 {
        (tokens.gradient_start, tokens.gradient_end) = COLD_GRADIENT;
    }

    tokens
}
