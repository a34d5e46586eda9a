//! Expected-damage heuristic
//!
//! Ranks move candidates when the oracle can't be trusted. Type
//! effectiveness and stats are deliberately left out.

use crate::battle::ai::decision_context::MoveCandidate;

/// Multiplier for a same-type attack
pub const STAB_MULTIPLIER: f64 = 1.5;

/// `base_power × accuracy × (1.5 if STAB)`; status moves score 0
pub fn expected_damage(candidate: &MoveCandidate) -> f64 {
    let stab = if candidate.is_stab { STAB_MULTIPLIER } else { 1.0 };
    candidate.base_power as f64 * candidate.accuracy.clamp(0.0, 1.0) * stab
}

/// Index of the highest-scoring move; the earliest wins ties
pub fn best_move_index(moves: &[MoveCandidate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for candidate in moves {
        let score = expected_damage(candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate.index, score)),
        }
    }
    best.map(|(index, _)| index)
}
