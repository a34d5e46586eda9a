//! Owned battle snapshots
//!
//! A plain-data implementation of [`BattleView`] that can be loaded from
//! JSON. The CLI decides turns from snapshot files, and tests build them
//! by hand.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::battle::view::{BattleView, MoveView, PokemonView};
use crate::core::error::Result;

/// Accuracy as clients report it: a number, or `true` for never-miss moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAccuracy {
    AlwaysHits(bool),
    Value(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSnapshot {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub move_type: Option<String>,
    pub base_power: Option<i64>,
    pub accuracy: Option<RawAccuracy>,
    pub priority: Option<i64>,
    pub category: Option<String>,
    pub current_pp: Option<i64>,
    pub max_pp: Option<i64>,
}

impl MoveSnapshot {
    /// A damaging move with the fields the heuristic reads
    pub fn new(id: &str, move_type: &str, base_power: i64, accuracy: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(id.to_string()),
            move_type: Some(move_type.to_string()),
            base_power: Some(base_power),
            accuracy: Some(RawAccuracy::Value(accuracy)),
            priority: Some(0),
            category: Some(if base_power > 0 { "PHYSICAL" } else { "STATUS" }.to_string()),
            current_pp: None,
            max_pp: None,
        }
    }
}

impl MoveView for MoveSnapshot {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn move_type(&self) -> Option<String> {
        self.move_type.clone()
    }

    fn base_power(&self) -> Option<i64> {
        self.base_power
    }

    fn accuracy(&self) -> Option<f64> {
        match self.accuracy? {
            RawAccuracy::AlwaysHits(_) => None,
            RawAccuracy::Value(v) => Some(v),
        }
    }

    fn priority(&self) -> Option<i64> {
        self.priority
    }

    fn category(&self) -> Option<String> {
        self.category.clone()
    }

    fn current_pp(&self) -> Option<i64> {
        self.current_pp
    }

    fn max_pp(&self) -> Option<i64> {
        self.max_pp
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PokemonSnapshot {
    pub species: Option<String>,
    pub name: Option<String>,
    pub types: Option<Vec<String>>,
    pub current_hp: Option<i64>,
    pub max_hp: Option<i64>,
    pub status: Option<String>,
}

impl PokemonSnapshot {
    pub fn new(species: &str, types: &[&str]) -> Self {
        Self {
            species: Some(species.to_string()),
            name: Some(species.to_string()),
            types: Some(types.iter().map(|t| t.to_string()).collect()),
            current_hp: None,
            max_hp: None,
            status: None,
        }
    }

    pub fn with_hp(mut self, current: i64, max: i64) -> Self {
        self.current_hp = Some(current);
        self.max_hp = Some(max);
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }
}

impl PokemonView for PokemonSnapshot {
    fn species(&self) -> Option<String> {
        self.species.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn types(&self) -> Option<Vec<String>> {
        self.types.clone()
    }

    fn current_hp(&self) -> Option<i64> {
        self.current_hp
    }

    fn max_hp(&self) -> Option<i64> {
        self.max_hp
    }

    fn status(&self) -> Option<String> {
        self.status.clone()
    }
}

/// Everything the agent sees when asked for a decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSnapshot {
    pub turn: Option<i64>,
    pub force_switch: bool,
    pub active_pokemon: Option<PokemonSnapshot>,
    pub opponent_active_pokemon: Option<PokemonSnapshot>,
    pub available_moves: Vec<MoveSnapshot>,
    pub available_switches: Vec<PokemonSnapshot>,
    pub weather: Option<String>,
    pub terrain: Option<String>,
}

impl BattleSnapshot {
    pub fn new(turn: i64) -> Self {
        Self {
            turn: Some(turn),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }
}

impl BattleView for BattleSnapshot {
    type Move = MoveSnapshot;
    type Pokemon = PokemonSnapshot;

    fn active_pokemon(&self) -> Option<&PokemonSnapshot> {
        self.active_pokemon.as_ref()
    }

    fn opponent_active_pokemon(&self) -> Option<&PokemonSnapshot> {
        self.opponent_active_pokemon.as_ref()
    }

    fn available_moves(&self) -> &[MoveSnapshot] {
        &self.available_moves
    }

    fn available_switches(&self) -> &[PokemonSnapshot] {
        &self.available_switches
    }

    fn weather(&self) -> Option<String> {
        self.weather.clone()
    }

    fn terrain(&self) -> Option<String> {
        self.terrain.clone()
    }

    fn turn(&self) -> Option<i64> {
        self.turn
    }

    fn force_switch(&self) -> bool {
        self.force_switch
    }
}
