//! Report cycle state machine.
//!
//! The orchestrator owns the one [`Snapshot`] a render sink looks at. Every
//! transition replaces it in a single `watch` update, so a sink never sees a
//! half-applied state. Each cycle carries the generation it started; once a
//! newer cycle has begun, the older one's late results are dropped.

use serde::Serialize;
use std::{future::Future, sync::Arc};
use thiserror::Error;
use tokio::sync::watch;

use crate::{
    Config,
    error::{ConfigError, ReportError},
    extract::extract_json_candidate,
    location::LocationAdapter,
    model::{Coordinates, WeatherReport},
    prompt::build_prompt,
    provider::{ReportProvider, provider_from_config},
    theme::{ThemeTokens, derive_theme},
    validate::parse_and_validate,
};

pub const START_MESSAGE: &str = "Finding your location & fetching detailed weather...";
pub const RETRY_MESSAGE: &str = "Retrying...";
pub const FETCH_MESSAGE: &str = "Crafting your weather report...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Locating,
    Fetching,
    Rendered,
    Failed,
}

impl Phase {
    /// Edges a running cycle may take. Starting or retrying a cycle is
    /// checked separately.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Locating, Fetching) | (Locating, Failed) | (Fetching, Rendered) | (Fetching, Failed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum UiState {
    Loading(String),
    Rendered(Box<WeatherReport>),
    Error(String),
}

impl UiState {
    /// Theme for this state. `None` while loading: keep whatever is shown.
    pub fn theme(&self) -> Option<ThemeTokens> {
        match self {
            UiState::Loading(_) => None,
            UiState::Rendered(report) => Some(derive_theme(
                &report.current.condition.to_lowercase(),
                report.current.temperature_celsius,
            )),
            UiState::Error(_) => Some(ThemeTokens::ERROR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub phase: Phase,
    pub ui: UiState,
    /// Whether a failure may be retried. Meaningless outside `Failed`.
    pub retryable: bool,
}

impl Snapshot {
    fn idle() -> Self {
        Self {
            generation: 0,
            phase: Phase::Idle,
            ui: UiState::Loading(START_MESSAGE.to_string()),
            retryable: true,
        }
    }

    pub fn theme(&self) -> Option<ThemeTokens> {
        self.ui.theme()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("cannot {action} while {phase:?}")]
    InvalidPhase { action: &'static str, phase: Phase },

    #[error("the last failure cannot be retried")]
    NotRetryable,
}

/// How a cycle ended from its own point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle's final transition was applied.
    Settled(Phase),
    /// A newer cycle started first; nothing from this one was applied after that.
    Superseded,
}

/// Runs the fetch → extract → validate → normalize pipeline once.
pub async fn fetch_report(
    provider: &dyn ReportProvider,
    at: Coordinates,
) -> Result<WeatherReport, ReportError> {
    let raw = provider.generate(&build_prompt(at)).await?;
    let candidate = extract_json_candidate(&raw);
    parse_and_validate(candidate)
}

#[derive(Debug)]
pub struct ForecastOrchestrator {
    location: LocationAdapter,
    provider: Result<Arc<dyn ReportProvider>, ConfigError>,
    state: watch::Sender<Snapshot>,
}

impl ForecastOrchestrator {
    /// A provider that failed to configure makes `start` end in a terminal error.
    pub fn new(
        location: LocationAdapter,
        provider: Result<Arc<dyn ReportProvider>, ConfigError>,
    ) -> Self {
        let (state, _) = watch::channel(Snapshot::idle());
        Self { location, provider, state }
    }

    pub fn with_provider(location: LocationAdapter, provider: Arc<dyn ReportProvider>) -> Self {
        Self::new(location, Ok(provider))
    }

    pub fn from_config(config: &Config, location: LocationAdapter) -> Self {
        Self::new(location, provider_from_config(config).map(Arc::from))
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Begins the first cycle. Only valid from `Idle`.
    pub async fn start(&self) -> Result<CycleOutcome, OrchestratorError> {
        let provider = match &self.provider {
            Ok(provider) => Arc::clone(provider),
            Err(err) => {
                tracing::error!(error = %err, "cannot start without a usable configuration");
                self.begin(accept_start, Phase::Failed, UiState::Error(err.user_message()), false)?;
                return Ok(CycleOutcome::Settled(Phase::Failed));
            }
        };

        let generation = self.begin(
            accept_start,
            Phase::Locating,
            UiState::Loading(START_MESSAGE.to_string()),
            true,
        )?;
        Ok(self.run_cycle(generation, provider).await)
    }

    /// Begins a fresh cycle after a failure. A retry while a cycle is still
    /// in flight supersedes that cycle.
    pub async fn retry(&self) -> Result<CycleOutcome, OrchestratorError> {
        let provider = self
            .provider
            .as_ref()
            .map(Arc::clone)
            .map_err(|_| OrchestratorError::NotRetryable)?;

        let generation = self.begin(
            accept_retry,
            Phase::Locating,
            UiState::Loading(RETRY_MESSAGE.to_string()),
            true,
        )?;
        Ok(self.run_cycle(generation, provider).await)
    }

    async fn run_cycle(&self, generation: u64, provider: Arc<dyn ReportProvider>) -> CycleOutcome {
        let coords = match self.location.acquire_coordinates().await {
            Ok(coords) => coords,
            Err(err) => return self.fail(generation, err.into()),
        };

        if !self.advance(generation, Phase::Fetching, UiState::Loading(FETCH_MESSAGE.to_string()), true) {
            return CycleOutcome::Superseded;
        }

        match fetch_report(provider.as_ref(), coords).await {
            Ok(report) => {
                let ui = UiState::Rendered(Box::new(report));
                if self.advance(generation, Phase::Rendered, ui, true) {
                    CycleOutcome::Settled(Phase::Rendered)
                } else {
                    CycleOutcome::Superseded
                }
            }
            Err(err) => self.fail(generation, err),
        }
    }

    fn fail(&self, generation: u64, err: ReportError) -> CycleOutcome {
        tracing::error!(error = %err, generation, "report cycle failed");
        let retryable = err.is_retryable();
        if self.advance(generation, Phase::Failed, UiState::Error(err.user_message()), retryable) {
            CycleOutcome::Settled(Phase::Failed)
        } else {
            CycleOutcome::Superseded
        }
    }

    /// Opens a new generation if `accept` allows it from the current snapshot.
    fn begin(
        &self,
        accept: fn(&Snapshot) -> Result<(), OrchestratorError>,
        phase: Phase,
        ui: UiState,
        retryable: bool,
    ) -> Result<u64, OrchestratorError> {
        let mut outcome = Ok(0);
        self.state.send_if_modified(|snap| {
            if let Err(err) = accept(snap) {
                outcome = Err(err);
                return false;
            }
            snap.generation += 1;
            tracing::info!(from = ?snap.phase, to = ?phase, generation = snap.generation, "cycle started");
            snap.phase = phase;
            snap.ui = ui;
            snap.retryable = retryable;
            outcome = Ok(snap.generation);
            true
        });
        outcome
    }

    /// Applies a transition for `generation`. Returns false when the cycle is stale.
    fn advance(&self, generation: u64, next: Phase, ui: UiState, retryable: bool) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|snap| {
            if snap.generation != generation {
                tracing::debug!(generation, current = snap.generation, to = ?next, "dropping stale transition");
                return false;
            }
            if !snap.phase.can_transition_to(next) {
                tracing::warn!(from = ?snap.phase, to = ?next, "rejected transition");
                return false;
            }
            tracing::info!(from = ?snap.phase, to = ?next, generation, "transition");
            snap.phase = next;
            snap.ui = ui;
            snap.retryable = retryable;
            applied = true;
            true
        });
        applied
    }
}

fn accept_start(snap: &Snapshot) -> Result<(), OrchestratorError> {
    match snap.phase {
        Phase::Idle => Ok(()),
        phase => Err(OrchestratorError::InvalidPhase { action: "start", phase }),
    }
}

fn accept_retry(snap: &Snapshot) -> Result<(), OrchestratorError> {
    match snap.phase {
        Phase::Failed if snap.retryable => Ok(()),
        Phase::Failed => Err(OrchestratorError::NotRetryable),
        Phase::Locating | Phase::Fetching => Ok(()),
        phase => Err(OrchestratorError::InvalidPhase { action: "retry", phase }),
    }
}

/// Consumer of UI snapshots.
pub trait RenderSink {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Polls `work` to completion, handing every snapshot published meanwhile to
/// `sink`. The snapshot current when `work` finishes is always rendered.
pub async fn drive<F: Future>(
    work: F,
    updates: &mut watch::Receiver<Snapshot>,
    sink: &mut dyn RenderSink,
) -> F::Output {
    tokio::pin!(work);
    loop {
        tokio::select! {
            // Pending updates go out before the work is polled again.
            biased;
            changed = updates.changed() => {
                if changed.is_err() {
                    return work.await;
                }
                sink.render(&updates.borrow_and_update());
            }
            output = &mut work => {
                if updates.has_changed().unwrap_or(false) {
                    sink.render(&updates.borrow_and_update());
                }
                return output;
            }
        }
    }
}
