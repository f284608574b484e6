use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Text};
use skycast_core::{
    Config, Coordinates, FixedLocation, ForecastOrchestrator, IpLocation, LocationAdapter, Phase,
    derive_theme, orchestrator::drive,
};
use std::{
    io::{self, IsTerminal},
    process::ExitCode,
    sync::Arc,
};

use crate::render::{TerminalSink, theme_css};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Generated weather reports for where you are")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and show a weather report.
    Show {
        /// Latitude; overrides the configured location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; overrides the configured location.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the final state as JSON instead of the terminal view.
        #[arg(long)]
        json: bool,

        /// Never offer to retry after a failure.
        #[arg(long)]
        no_retry: bool,
    },

    /// Interactively set the API key, model and location.
    Configure,

    /// Print the palette for a condition and temperature as CSS custom properties.
    Theme {
        /// Condition text, e.g. "Partly cloudy".
        condition: String,

        /// Temperature in °C.
        #[arg(allow_negative_numbers = true)]
        temperature: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Show { lat, lon, json, no_retry } => {
                let flags = match (lat, lon) {
                    (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
                    _ => None,
                };
                show(flags, json, no_retry).await
            }
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Theme { condition, temperature } => {
                let theme = derive_theme(&condition.to_lowercase(), temperature);
                println!("{}", theme_css(&theme));
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(flags: Option<Coordinates>, json: bool, no_retry: bool) -> anyhow::Result<ExitCode> {
    let config = Config::load()?.with_env_api_key(Config::api_key_from_env());
    let location = location_adapter(&config, flags)?;
    let orchestrator = ForecastOrchestrator::from_config(&config, location);

    if json {
        orchestrator.start().await?;
        let snapshot = orchestrator.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(exit_code(snapshot.phase));
    }

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut sink = TerminalSink::new(stdout.lock(), color);
    let mut updates = orchestrator.subscribe();

    drive(orchestrator.start(), &mut updates, &mut sink).await?;

    let interactive = !no_retry && io::stdin().is_terminal();
    loop {
        let snapshot = orchestrator.snapshot();
        if snapshot.phase != Phase::Failed || !snapshot.retryable || !interactive {
            return Ok(exit_code(snapshot.phase));
        }
        if !Confirm::new("Try again?").with_default(true).prompt()? {
            return Ok(exit_code(snapshot.phase));
        }
        drive(orchestrator.retry(), &mut updates, &mut sink).await?;
    }
}

fn exit_code(phase: Phase) -> ExitCode {
    if phase == Phase::Failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Flags first, then the configured location, then an IP lookup if allowed.
fn location_adapter(config: &Config, flags: Option<Coordinates>) -> anyhow::Result<LocationAdapter> {
    if let Some(coords) = flags {
        if !coords.is_valid() {
            bail!("coordinates out of range: {coords}");
        }
        tracing::debug!(%coords, "using coordinates from flags");
        return Ok(LocationAdapter::new(Arc::new(FixedLocation(coords))));
    }

    if let Some(coords) = config.fixed_location().map_err(|e| anyhow!(e.user_message()))? {
        tracing::debug!(%coords, "using configured coordinates");
        return Ok(LocationAdapter::new(Arc::new(FixedLocation(coords))));
    }

    if config.ip_lookup {
        let source = IpLocation::new(config.ip_lookup_url())
            .context("Failed to build the location lookup client")?;
        tracing::debug!(url = config.ip_lookup_url(), "using IP lookup");
        return Ok(LocationAdapter::new(Arc::new(source)));
    }

    Ok(LocationAdapter::unsupported())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("Gemini API key (leave empty to keep the current one):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    if !key.trim().is_empty() {
        config.set_api_key(key.trim().to_string());
    }

    let model = Text::new("Model:").with_default(config.model()).prompt()?;
    config.model = Some(model.trim().to_string());

    let use_fixed = Confirm::new("Use fixed coordinates instead of locating this host?")
        .with_default(config.location.is_some())
        .prompt()?;

    if use_fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number between -90 and 90")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number between -180 and 180")
            .prompt()?;

        let coords = Coordinates::new(latitude, longitude);
        if !coords.is_valid() {
            bail!("coordinates out of range: {coords}");
        }
        config.location = Some(coords);
    } else {
        config.location = None;
        config.ip_lookup = Confirm::new("Look up your approximate location from your IP address?")
            .with_default(config.ip_lookup)
            .prompt()?;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
