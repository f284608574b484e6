//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use skycast_core::{
    Coordinates, ProviderError, ReportProvider,
    location::{LocationSource, PositionError, PositionErrorCode},
};
use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::oneshot;

pub fn current(condition: &str, temperature: i64) -> Value {
    json!({
        "locationName": "Philadelphia, Pennsylvania",
        "temperatureCelsius": temperature,
        "condition": condition,
        "conditionEmoji": "🌤️",
        "humidityPercent": 55,
        "windSpeedKmh": 14,
        "description": "Pleasant with a light breeze."
    })
}

pub fn week() -> Vec<Value> {
    let days = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    ];
    days.iter()
        .enumerate()
        .map(|(i, day)| {
            json!({
                "date": format!("2024-06-{:02}", 3 + i),
                "dayOfWeek": day,
                "tempMaxCelsius": 26,
                "tempMinCelsius": 15,
                "condition": "Sunny",
                "conditionEmoji": "☀️"
            })
        })
        .collect()
}

/// Minimal valid report: `current` and a week of forecast, nothing optional.
pub fn report_json(condition: &str, temperature: i64) -> String {
    json!({ "current": current(condition, temperature), "forecast": week() }).to_string()
}

pub fn fenced(body: &str) -> String {
    format!("```json\n{body}\n```")
}

pub enum Step {
    Reply(String),
    Fail(String),
    Gated(oneshot::Receiver<String>),
}

/// Provider that plays back a fixed script, one step per call.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Reply(_) => f.write_str("Reply"),
            Step::Fail(_) => f.write_str("Fail"),
            Step::Gated(_) => f.write_str("Gated"),
        }
    }
}

impl ScriptedProvider {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        assert!(prompt.contains("latitude"), "prompt should carry coordinates");
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(message)) => Err(ProviderError::Provider(message)),
            Some(Step::Gated(gate)) => gate
                .await
                .map_err(|_| ProviderError::Provider("gate dropped".into())),
            None => panic!("provider called more often than scripted"),
        }
    }
}

/// Location source that plays back one result per call.
#[derive(Debug)]
pub struct ScriptedLocation {
    results: Mutex<VecDeque<Result<Coordinates, PositionError>>>,
}

impl ScriptedLocation {
    pub fn new(results: impl IntoIterator<Item = Result<Coordinates, PositionError>>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
        }
    }
}

#[async_trait]
impl LocationSource for ScriptedLocation {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .expect("location asked more often than scripted")
    }
}

/// Location source whose first lookup waits on a gate. Later lookups answer
/// with `fallback` straight away.
#[derive(Debug)]
pub struct GatedLocation {
    gate: Mutex<Option<oneshot::Receiver<Coordinates>>>,
    fallback: Coordinates,
    calls: AtomicUsize,
}

impl GatedLocation {
    pub fn new(gate: oneshot::Receiver<Coordinates>, fallback: Coordinates) -> Self {
        Self {
            gate: Mutex::new(Some(gate)),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationSource for GatedLocation {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        match gate {
            Some(gate) => gate
                .await
                .map_err(|_| PositionError::new(PositionErrorCode::Other, "gate dropped")),
            None => Ok(self.fallback),
        }
    }
}
