//! Append-only decision event log
//!
//! Every oracle consultation and every fallback can be written out as one
//! JSON object per line for offline inspection. Recording is best-effort:
//! sinks swallow their own failures so a full disk or a bad path never
//! changes the decision that gets played.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::battle::ai::decision_context::{DecisionContext, StateSummary};
use crate::battle::ai::llm_gateway::Decision;
use crate::core::types::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEventKind {
    /// Bad output was forced by configuration
    LlmForcedBad,
    /// The reply held no usable JSON object
    LlmBadJson,
    /// The reply parsed but failed validation
    LlmBadDecision,
    /// The reply was accepted
    LlmOk,
    /// A fallback rule picked the action
    FallbackException,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub event: TraceEventKind,
    pub turn: Turn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Value>,
}

impl TraceEvent {
    pub fn new(event: TraceEventKind, turn: Turn) -> Self {
        Self {
            event,
            turn,
            raw: None,
            parsed: None,
            error: None,
            decision: None,
            state: None,
            rows: None,
        }
    }

    pub fn with_raw(mut self, raw: &str) -> Self {
        self.raw = Some(raw.to_string());
        self
    }

    pub fn with_parsed(mut self, parsed: &Value) -> Self {
        self.parsed = Some(parsed.clone());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_decision(mut self, decision: &Decision) -> Self {
        self.decision = Some(decision.clone());
        self
    }

    pub fn with_state(mut self, ctx: &DecisionContext) -> Self {
        self.state = Some(ctx.state.clone());
        self
    }

    pub fn with_rows(mut self, ctx: &DecisionContext) -> Self {
        self.rows = serde_json::to_value(ctx.rows()).ok();
        self
    }
}

/// Where decision events go
pub trait TraceSink: Send + Sync {
    /// Record one event. Must not panic and must not report failure.
    fn record(&self, event: &TraceEvent);
}

impl<T: TraceSink + ?Sized> TraceSink for Arc<T> {
    fn record(&self, event: &TraceEvent) {
        (**self).record(event)
    }
}

impl<T: TraceSink + ?Sized> TraceSink for Box<T> {
    fn record(&self, event: &TraceEvent) {
        (**self).record(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn record(&self, _event: &TraceEvent) {}
}

/// JSON Lines file, opened in append mode for each event
#[derive(Debug, Clone)]
pub struct JsonlTrace {
    path: PathBuf,
}

impl JsonlTrace {
    /// Creates the parent directory if needed; failure to do so only
    /// means later writes will fail quietly too.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!("Could not create trace directory {:?}: {}", parent, e);
            }
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, event: &TraceEvent) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl TraceSink for JsonlTrace {
    fn record(&self, event: &TraceEvent) {
        if let Err(e) = self.append(event) {
            tracing::debug!("Dropped trace event {:?}: {}", event.event, e);
        }
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemoryTrace {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<TraceEventKind> {
        self.events().iter().map(|e| e.event).collect()
    }
}

impl TraceSink for MemoryTrace {
    fn record(&self, event: &TraceEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

/// Sink for an optional event-log path
pub fn sink_for(path: Option<&Path>) -> Box<dyn TraceSink> {
    match path {
        Some(path) => Box::new(JsonlTrace::new(path)),
        None => Box::new(NullTrace),
    }
}
