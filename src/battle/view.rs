//! The agent's read-only view of a live battle
//!
//! These traits are the narrow surface the decision pipeline consumes from
//! the battle client. Every field is optional: clients report partial or
//! malformed data often enough that the encoder treats each read as
//! fallible and falls back to a documented default.

/// A move the acting Pokémon may legally use this turn
pub trait MoveView {
    /// Showdown move id (`thunderbolt`)
    fn id(&self) -> Option<String>;
    /// Display name (`Thunderbolt`)
    fn name(&self) -> Option<String>;
    /// Elemental type name
    fn move_type(&self) -> Option<String>;
    fn base_power(&self) -> Option<i64>;
    /// Hit chance. Clients use `None` or `0` for moves that never miss.
    fn accuracy(&self) -> Option<f64>;
    fn priority(&self) -> Option<i64>;
    /// Damage class name (physical / special / status)
    fn category(&self) -> Option<String>;
    fn current_pp(&self) -> Option<i64>;
    fn max_pp(&self) -> Option<i64>;
}

/// A Pokémon on either side of the field
pub trait PokemonView {
    fn species(&self) -> Option<String>;
    fn name(&self) -> Option<String>;
    fn types(&self) -> Option<Vec<String>>;
    fn current_hp(&self) -> Option<i64>;
    fn max_hp(&self) -> Option<i64>;
    /// Non-volatile status condition (`PAR`, `BRN`, ...)
    fn status(&self) -> Option<String>;
}

/// One side's view of the battle at the moment a decision is requested
pub trait BattleView {
    type Move: MoveView;
    type Pokemon: PokemonView;

    fn active_pokemon(&self) -> Option<&Self::Pokemon>;
    fn opponent_active_pokemon(&self) -> Option<&Self::Pokemon>;
    /// Legal moves, in the client's order
    fn available_moves(&self) -> &[Self::Move];
    /// Legal switch targets, in the client's order
    fn available_switches(&self) -> &[Self::Pokemon];
    fn weather(&self) -> Option<String>;
    fn terrain(&self) -> Option<String>;
    fn turn(&self) -> Option<i64>;
    /// Set when the active Pokémon fainted or must otherwise leave the field
    fn force_switch(&self) -> bool;
}
