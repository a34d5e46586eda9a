//! Decision oracles
//!
//! An oracle turns a system prompt plus the JSON user message into raw
//! reply text. Parsing and validation happen in the commander, so an
//! oracle never needs to know the reply schema.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use crate::core::error::{AgentError, Result};

/// Source of raw decision text for a turn
pub trait DecisionOracle {
    fn ask(&self, system: &str, user: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Oracle used when no service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOracle;

impl DecisionOracle for DisabledOracle {
    async fn ask(&self, _system: &str, _user: &str) -> Result<String> {
        Err(AgentError::OracleUnavailable)
    }
}

/// An optional oracle is unavailable when absent
impl<O: DecisionOracle + Sync> DecisionOracle for Option<O> {
    async fn ask(&self, system: &str, user: &str) -> Result<String> {
        match self {
            Some(oracle) => oracle.ask(system, user).await,
            None => Err(AgentError::OracleUnavailable),
        }
    }
}

/// Replays canned replies in order; unavailable once they run out
///
/// Useful for replaying recorded model output against new snapshots.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedOracle {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl DecisionOracle for ScriptedOracle {
    async fn ask(&self, _system: &str, _user: &str) -> Result<String> {
        let next = match self.replies.lock() {
            Ok(mut replies) => replies.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.ok_or(AgentError::OracleUnavailable)
    }
}
