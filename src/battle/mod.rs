//! Battle-facing side of the agent
//!
//! The battle client owns rules, protocol and turn sequencing. This module
//! only reads what the client exposes and hands back one order per turn.

pub mod ai;
pub mod snapshot;
pub mod view;

pub use snapshot::{BattleSnapshot, MoveSnapshot, PokemonSnapshot, RawAccuracy};
pub use view::{BattleView, MoveView, PokemonView};
