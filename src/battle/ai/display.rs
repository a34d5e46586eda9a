//! Console rendering of a turn for compact and full log modes

use std::fmt::Write;

use crate::battle::ai::decision_context::{DecisionContext, PokemonSummary};
use crate::battle::ai::llm_gateway::Decision;

/// `--- TURN n ---`
pub fn turn_header(ctx: &DecisionContext) -> String {
    format!("--- TURN {} ---", ctx.turn())
}

pub fn field_line(ctx: &DecisionContext) -> String {
    format!(
        "My: {} Opp: {} Weather: {} Terrain: {}",
        pokemon_label(&ctx.state.my_active),
        pokemon_label(&ctx.state.opp_active),
        ctx.state.weather,
        ctx.state.terrain
    )
}

fn pokemon_label(p: &PokemonSummary) -> String {
    let types = if p.types.is_empty() {
        "-".to_string()
    } else {
        p.types.join("/")
    };
    let hp = p
        .hp_pct
        .map(|hp| format!("{}%", hp))
        .unwrap_or_else(|| "?".to_string());
    match &p.status {
        Some(status) => format!("{} [{}] {} {}", p.species, types, hp, status),
        None => format!("{} [{}] {}", p.species, types, hp),
    }
}

/// Fixed-width table of every candidate
pub fn candidate_table(ctx: &DecisionContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:>3}  {:<18} {:<17} {:>4} {:>4}  {}",
        "kind", "idx", "name/species", "type(s)", "bp", "acc", "stab"
    );
    for m in &ctx.moves {
        let _ = writeln!(
            out,
            "{:<6} {:>3}  {:<18} {:<17} {:>4} {:>4.1}  {}",
            "move",
            m.index,
            m.name,
            m.move_type,
            m.base_power,
            m.accuracy,
            if m.is_stab { "✓" } else { "" }
        );
    }
    for s in &ctx.switches {
        let types = if s.types.is_empty() {
            "-".to_string()
        } else {
            s.types.join("/")
        };
        let _ = writeln!(
            out,
            "{:<6} {:>3}  {:<18} {:<17} {:>4} {:>4}  {}",
            "switch", s.index, s.species, types, "-", "-", "-"
        );
    }
    out
}

/// `[DECIDE] MOVE idx=1 (thunderbolt) | reason=...`
pub fn decision_line(decision: &Decision, ctx: &DecisionContext) -> String {
    if decision.action.targets_moves() {
        let name = ctx
            .moves
            .get(decision.index)
            .map(|m| m.name.as_str())
            .unwrap_or("?");
        format!(
            "[DECIDE] MOVE idx={} ({}) | reason={}",
            decision.index, name, decision.reason
        )
    } else {
        let name = ctx
            .switches
            .get(decision.index)
            .map(|s| s.species.as_str())
            .unwrap_or("?");
        format!(
            "[DECIDE] SWITCH idx={} ({}) | reason={}",
            decision.index, name, decision.reason
        )
    }
}
