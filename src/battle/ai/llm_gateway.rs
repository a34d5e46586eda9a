//! LLM Gateway
//!
//! Adapters for converting between the encoded turn and LLM text/JSON.
//! Defines the schema for LLM inputs (PromptContext) and outputs (Decision).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::ai::decision_context::{CandidateRow, DecisionContext, StateSummary};

// =========================================================================
//  INPUT SCHEMA (Rust -> LLM)
// =========================================================================

/// System prompt sent with every oracle request
pub const SYSTEM_PROMPT: &str = "You are a Pokémon battle assistant. Choose exactly one action from the candidates.\n\
Prefer higher expected damage ≈ base_power * accuracy * (1.5 if is_stab else 1). \
If state.force_switch is true, you MUST choose switch/force_switch.\n\
Reply with ONLY this JSON: {\"action\":\"move|switch|force_switch\",\"index\":0-based integer,\"reason\":\"short\"}";

/// Structured user message for the LLM prompt
#[derive(Debug, Serialize)]
pub struct PromptContext<'a> {
    pub state: &'a StateSummary,
    pub candidates: Vec<CandidateRow<'a>>,
}

impl<'a> PromptContext<'a> {
    pub fn from_decision_context(ctx: &'a DecisionContext) -> Self {
        Self {
            state: &ctx.state,
            candidates: ctx.rows(),
        }
    }

    /// Compact JSON for the request body
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Indented JSON for console output
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// =========================================================================
//  OUTPUT SCHEMA (LLM -> Rust)
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Move,
    Switch,
    /// Move-list index chosen while a switch was requested; treated as a move
    ForceSwitch,
}

impl DecisionAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "move" => Some(Self::Move),
            "switch" => Some(Self::Switch),
            "force_switch" => Some(Self::ForceSwitch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Switch => "switch",
            Self::ForceSwitch => "force_switch",
        }
    }

    /// Whether the index refers to the move list
    pub fn targets_moves(&self) -> bool {
        matches!(self, Self::Move | Self::ForceSwitch)
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn's decision, from the oracle or from a fallback rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: DecisionAction,
    pub index: usize,
    /// Advisory only
    #[serde(default)]
    pub reason: String,
}

impl Decision {
    pub fn new(action: DecisionAction, index: usize, reason: impl Into<String>) -> Self {
        Self {
            action,
            index,
            reason: reason.into(),
        }
    }

    pub fn move_at(index: usize, reason: impl Into<String>) -> Self {
        Self::new(DecisionAction::Move, index, reason)
    }

    pub fn switch_to(index: usize, reason: impl Into<String>) -> Self {
        Self::new(DecisionAction::Switch, index, reason)
    }
}
