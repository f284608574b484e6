//! Terminal rendering of report snapshots.

use chrono::{Local, NaiveTime};
use crossterm::style::{Color, Stylize};
use skycast_core::{
    RenderSink, Snapshot, ThemeTokens, UiState, WeatherReport,
    format::{format_forecast_date, format_hour_time, short_day_name},
    model::{DailyForecast, HourlyForecast},
};
use std::io::{self, Write};

pub const NO_HOURLY: &str = "Hourly forecast data is not available for today.";
pub const NO_ACTIVITIES: &str = "Activity suggestions are not available at this time.";

/// Writes each snapshot to `out` as plain text, optionally tinted with the
/// snapshot's theme.
pub struct TerminalSink<W: Write> {
    out: W,
    color: bool,
    last_theme: ThemeTokens,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color, last_theme: ThemeTokens::DEFAULT }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        // Loading keeps the previous palette.
        if let Some(theme) = snapshot.theme() {
            self.last_theme = theme;
        }
        let accent = self.color.then_some(self.last_theme.gradient_start);

        match &snapshot.ui {
            UiState::Loading(message) => writeln!(self.out, "{}", paint(message, accent)),
            UiState::Error(message) => {
                writeln!(self.out)?;
                writeln!(self.out, "{}", paint("Something went wrong", accent))?;
                writeln!(self.out, "  {message}")
            }
            UiState::Rendered(report) => {
                write_report(&mut self.out, report, accent, Local::now().time())
            }
        }
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn render(&mut self, snapshot: &Snapshot) {
        if let Err(err) = self.write_snapshot(snapshot).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %err, "failed to write to terminal");
        }
    }
}

/// Full report view. `accent` is the header colour, `None` for plain output.
pub fn write_report(
    out: &mut impl Write,
    report: &WeatherReport,
    accent: Option<&str>,
    updated: NaiveTime,
) -> io::Result<()> {
    let current = &report.current;

    writeln!(out)?;
    writeln!(
        out,
        "{}",
        paint(&format!("{} {}", current.condition_emoji, current.location_name), accent)
    )?;
    writeln!(
        out,
        "  {}°C  {}",
        whole_degrees(current.temperature_celsius),
        current.condition
    )?;
    if !current.description.is_empty() {
        writeln!(out, "  {}", current.description)?;
    }
    writeln!(
        out,
        "  Humidity {}%  ·  Wind {} km/h",
        current.humidity_percent, current.wind_speed_kmh
    )?;
    if let Some(today) = report.today() {
        writeln!(
            out,
            "  Today: H {}° / L {}°",
            today.temp_max_celsius, today.temp_min_celsius
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Today's hourly")?;
    if report.has_hourly() {
        for hour in &report.hourly_forecast_today {
            writeln!(out, "  {}", hourly_line(hour))?;
        }
    } else {
        writeln!(out, "  {NO_HOURLY}")?;
    }

    writeln!(out)?;
    writeln!(out, "7-day forecast")?;
    for day in &report.forecast {
        writeln!(out, "  {}", daily_line(day))?;
    }

    writeln!(out)?;
    writeln!(out, "Activities")?;
    match &report.activity_suggestions {
        Some(suggestions) if report.has_activities() => {
            if !suggestions.overall_summary.is_empty() {
                writeln!(out, "  {}", suggestions.overall_summary)?;
            }
            for activity in &suggestions.activities {
                write!(out, "  - {}: {} [{}]", activity.name, activity.rating, activity.rating.slug())?;
                match &activity.advice {
                    Some(advice) if !advice.is_empty() => writeln!(out, " {advice}")?,
                    _ => writeln!(out)?,
                }
            }
        }
        _ => writeln!(out, "  {NO_ACTIVITIES}")?,
    }

    writeln!(out)?;
    writeln!(out, "Updated at {}", updated.format("%H:%M"))
}

fn hourly_line(hour: &HourlyForecast) -> String {
    let mut line = format!(
        "{:>5}  {} {:>3}°C  {}",
        format_hour_time(&hour.time),
        hour.condition_emoji,
        hour.temperature_celsius,
        hour.condition
    );
    if let Some(chance) = hour.precipitation_chance_percent.filter(|&c| c > 0) {
        line.push_str(&format!("  ({chance}% precip.)"));
    }
    line
}

/// Rounded for display; `-0.4` shows as `0`.
fn whole_degrees(celsius: f64) -> i64 {
    celsius.round() as i64
}

fn daily_line(day: &DailyForecast) -> String {
    let mut line = format!(
        "{:<3}  {:<6}  {} {:<16}  {:>3}° / {:>3}°",
        short_day_name(&day.day_of_week),
        format_forecast_date(&day.date),
        day.condition_emoji,
        day.condition,
        day.temp_max_celsius,
        day.temp_min_celsius
    );
    if day.has_inverted_range() {
        line.push_str("  (high/low reported inverted)");
    }
    line
}

/// Bold 24-bit foreground colour. Unparsable colours and `None` leave the
/// text as is.
fn paint(text: &str, accent: Option<&str>) -> String {
    match accent.and_then(parse_hex_color) {
        Some((r, g, b)) => text.with(Color::Rgb { r, g, b }).bold().to_string(),
        None => text.to_string(),
    }
}

/// `#RGB` or `#RRGGBB` into its channels.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((digits.next()??, digits.next()??, digits.next()??))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

/// Theme tokens as a block of CSS custom properties.
pub fn theme_css(theme: &ThemeTokens) -> String {
    let mut css = String::from(":root {\n");
    for (name, value) in theme.css_properties() {
        css.push_str(&format!("  --{name}: {value};\n"));
    }
    css.push('}');
    css
}
