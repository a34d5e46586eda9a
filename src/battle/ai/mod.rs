//! Turn decision AI
//!
//! Architecture: encode -> oracle -> validate -> fallback
//! - DecisionContext flattens the battle into a candidate table
//! - DecisionOracle produces raw reply text (LLM, scripted, or none)
//! - validation checks the parsed reply against the legal actions
//! - AiCommander drives the pipeline and never fails to produce an order

pub mod commander;
pub mod decision_context;
pub mod display;
pub mod extract;
pub mod llm_gateway;
pub mod oracle;
pub mod scoring;
pub mod trace;
pub mod validation;

pub use commander::{fallback_decision, resolve_order, AiCommander, DecisionSource, Order, TurnOutcome};
pub use decision_context::{
    CandidateRow, DecisionContext, MoveCandidate, PokemonSummary, StateSummary, SwitchCandidate,
};
pub use llm_gateway::{Decision, DecisionAction, PromptContext};
pub use oracle::{DecisionOracle, DisabledOracle, ScriptedOracle};
pub use trace::{JsonlTrace, MemoryTrace, NullTrace, TraceEvent, TraceEventKind, TraceSink};
pub use validation::{validate_decision, RejectReason};
