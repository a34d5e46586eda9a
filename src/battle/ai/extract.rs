//! Read-or-default accessors over the battle view
//!
//! Each accessor reads exactly one field and returns a fixed fallback
//! when the client left it out or reported something unusable. None of
//! them fail: a bad field costs precision, never a candidate.

use crate::battle::view::{MoveView, PokemonView};
use crate::core::types::MoveCategory;

/// Rendered when a move's type is unknown
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Rendered when a summarised Pokémon is missing entirely
pub const UNKNOWN_SPECIES: &str = "unknown";

/// Rendered for absent weather or terrain
pub const NO_FIELD_EFFECT: &str = "none";

/// Hit chance in `[0, 1]`
///
/// `None` and `0` mean "never misses" in the client's convention. Values
/// above 1 are read as a 0-100 percentage; that rescale is a guess about
/// some clients' representation and has not been checked against all of
/// them.
pub fn accuracy(m: &impl MoveView) -> f64 {
    match m.accuracy() {
        None => 1.0,
        Some(acc) if !acc.is_finite() || acc == 0.0 => 1.0,
        Some(acc) if acc > 1.0 => (acc / 100.0).clamp(0.0, 1.0),
        Some(acc) => acc.clamp(0.0, 1.0),
    }
}

pub fn base_power(m: &impl MoveView) -> u32 {
    m.base_power()
        .map(|bp| bp.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

pub fn priority(m: &impl MoveView) -> i32 {
    m.priority()
        .map(|p| p.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        .unwrap_or(0)
}

pub fn category(m: &impl MoveView) -> MoveCategory {
    m.category()
        .and_then(|c| MoveCategory::parse(&c))
        .unwrap_or(MoveCategory::Status)
}

/// Remaining uses, falling back to the maximum
pub fn pp(m: &impl MoveView) -> u32 {
    m.current_pp()
        .or_else(|| m.max_pp())
        .map(|pp| pp.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

pub fn move_type(m: &impl MoveView) -> String {
    non_blank(m.move_type())
        .map(|t| t.to_uppercase())
        .unwrap_or_else(|| UNKNOWN_TYPE.to_string())
}

pub fn move_id(m: &impl MoveView, index: usize) -> String {
    non_blank(m.id())
        .or_else(|| non_blank(m.name()))
        .unwrap_or_else(|| format!("move{}", index))
        .to_lowercase()
}

pub fn move_name(m: &impl MoveView, index: usize) -> String {
    non_blank(m.name())
        .or_else(|| non_blank(m.id()))
        .unwrap_or_else(|| format!("move{}", index))
        .to_lowercase()
}

/// Uppercased type names; empty when unknown
pub fn types(p: &impl PokemonView) -> Vec<String> {
    p.types()
        .unwrap_or_default()
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().to_uppercase())
        .collect()
}

/// Health as a whole percentage in `[0, 100]`; full health when unknown
pub fn hp_pct(p: &impl PokemonView) -> u8 {
    match (p.current_hp(), p.max_hp()) {
        (Some(current), Some(max)) if max > 0 => {
            let pct = (100.0 * current as f64 / max as f64).round();
            pct.clamp(0.0, 100.0) as u8
        }
        _ => 100,
    }
}

pub fn status(p: &impl PokemonView) -> Option<String> {
    non_blank(p.status()).map(|s| s.to_uppercase())
}

/// Lowercased species, falling back to the nickname and then `fallback`
pub fn species(p: &impl PokemonView, fallback: &str) -> String {
    non_blank(p.species())
        .or_else(|| non_blank(p.name()))
        .unwrap_or_else(|| fallback.to_string())
        .to_lowercase()
}

/// Same-type attack bonus: the move's type is one of the user's types
pub fn is_stab(m: &impl MoveView, user: Option<&impl PokemonView>) -> bool {
    let Some(user) = user else {
        return false;
    };
    let Some(move_type) = non_blank(m.move_type()) else {
        return false;
    };
    let move_type = move_type.trim().to_uppercase();
    types(user).iter().any(|t| *t == move_type)
}

/// Weather or terrain name, `"none"` when absent
pub fn field_effect(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| NO_FIELD_EFFECT.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
