//! Checks a parsed oracle reply against this turn's legal actions

use serde_json::Value;
use thiserror::Error;

use crate::battle::ai::decision_context::DecisionContext;
use crate::battle::ai::llm_gateway::{Decision, DecisionAction};

/// Why a parsed decision was rejected. The display form is the stable
/// reason code written to the event log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("not_object")]
    NotObject,

    #[error("bad_action:{0}")]
    BadAction(String),

    #[error("index_not_int")]
    IndexNotInt,

    /// The active Pokémon has to leave the field this turn
    #[error("must_switch")]
    MustSwitch,

    #[error("index_out_of_range_move")]
    IndexOutOfRangeMove,

    #[error("index_out_of_range_switch")]
    IndexOutOfRangeSwitch,
}

/// Validate a parsed reply, producing a typed decision
///
/// Rules are applied in order: shape (`action` and integer `index`),
/// forced switch, then index range for the declared action.
pub fn validate_decision(
    parsed: &Value,
    ctx: &DecisionContext,
) -> Result<Decision, RejectReason> {
    let Some(obj) = parsed.as_object() else {
        return Err(RejectReason::NotObject);
    };

    let action = match obj.get("action") {
        Some(Value::String(s)) => {
            DecisionAction::parse(s).ok_or_else(|| RejectReason::BadAction(s.clone()))?
        }
        Some(other) => return Err(RejectReason::BadAction(other.to_string())),
        None => return Err(RejectReason::BadAction("null".into())),
    };

    let index = match obj.get("index") {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {
            n.as_i64().unwrap_or(i64::MAX)
        }
        _ => return Err(RejectReason::IndexNotInt),
    };

    if ctx.state.force_switch && action == DecisionAction::Move {
        return Err(RejectReason::MustSwitch);
    }

    let (limit, out_of_range) = if action.targets_moves() {
        (ctx.move_count(), RejectReason::IndexOutOfRangeMove)
    } else {
        (ctx.switch_count(), RejectReason::IndexOutOfRangeSwitch)
    };
    if index < 0 || index as u64 >= limit as u64 {
        return Err(out_of_range);
    }

    let reason = match obj.get("reason") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    Ok(Decision::new(action, index as usize, reason))
}
