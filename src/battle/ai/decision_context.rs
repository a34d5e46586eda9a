//! The agent's encoded view of one turn
//!
//! Flattens the live battle into an ordered candidate table (legal moves
//! first, then legal switches, each indexed from 0) plus a compact state
//! summary. Built fresh every turn and dropped once the decision is made.

use serde::{Deserialize, Serialize};

use crate::battle::ai::extract;
use crate::battle::view::{BattleView, PokemonView};
use crate::core::types::{MoveCategory, Turn};

/// A legal move this turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCandidate {
    /// Position in the client's legal-moves list, not a global move id
    pub index: usize,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub base_power: u32,
    /// Always within `[0, 1]`
    pub accuracy: f64,
    pub priority: i32,
    pub category: MoveCategory,
    pub pp: u32,
    pub is_stab: bool,
}

/// A legal switch target this turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCandidate {
    /// Position in the client's legal-switches list
    pub index: usize,
    pub species: String,
    pub types: Vec<String>,
    pub hp_pct: u8,
    pub status: Option<String>,
}

/// One row of the candidate table as the oracle sees it
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CandidateRow<'a> {
    Move(&'a MoveCandidate),
    Switch(&'a SwitchCandidate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub species: String,
    pub types: Vec<String>,
    pub hp_pct: Option<u8>,
    pub status: Option<String>,
}

impl PokemonSummary {
    pub fn from_pokemon(pokemon: Option<&impl PokemonView>) -> Self {
        match pokemon {
            Some(p) => Self {
                species: extract::species(p, extract::UNKNOWN_SPECIES),
                types: extract::types(p),
                hp_pct: Some(extract::hp_pct(p)),
                status: extract::status(p),
            },
            None => Self::unknown(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            species: extract::UNKNOWN_SPECIES.to_string(),
            types: Vec::new(),
            hp_pct: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub turn: Turn,
    pub force_switch: bool,
    pub my_active: PokemonSummary,
    pub opp_active: PokemonSummary,
    pub weather: String,
    pub terrain: String,
}

/// Candidate table plus state summary for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionContext {
    pub state: StateSummary,
    pub moves: Vec<MoveCandidate>,
    pub switches: Vec<SwitchCandidate>,
}

impl DecisionContext {
    /// Encode the current turn. Never fails and never drops a candidate.
    pub fn from_battle<B: BattleView>(battle: &B) -> Self {
        let me = battle.active_pokemon();

        let moves = battle
            .available_moves()
            .iter()
            .enumerate()
            .map(|(i, m)| MoveCandidate {
                index: i,
                id: extract::move_id(m, i),
                name: extract::move_name(m, i),
                move_type: extract::move_type(m),
                base_power: extract::base_power(m),
                accuracy: extract::accuracy(m),
                priority: extract::priority(m),
                category: extract::category(m),
                pp: extract::pp(m),
                is_stab: extract::is_stab(m, me),
            })
            .collect();

        let switches = battle
            .available_switches()
            .iter()
            .enumerate()
            .map(|(i, p)| SwitchCandidate {
                index: i,
                species: extract::species(p, &format!("p{}", i)),
                types: extract::types(p),
                hp_pct: extract::hp_pct(p),
                status: extract::status(p),
            })
            .collect();

        let turn = battle
            .turn()
            .map(|t| t.clamp(0, Turn::MAX as i64) as Turn)
            .unwrap_or(0);

        let state = StateSummary {
            turn,
            force_switch: battle.force_switch(),
            my_active: PokemonSummary::from_pokemon(me),
            opp_active: PokemonSummary::from_pokemon(battle.opponent_active_pokemon()),
            weather: extract::field_effect(battle.weather()),
            terrain: extract::field_effect(battle.terrain()),
        };

        Self {
            state,
            moves,
            switches,
        }
    }

    /// Moves followed by switches, in index order
    pub fn rows(&self) -> Vec<CandidateRow<'_>> {
        self.moves
            .iter()
            .map(CandidateRow::Move)
            .chain(self.switches.iter().map(CandidateRow::Switch))
            .collect()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    /// No legal action at all
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.switches.is_empty()
    }

    pub fn turn(&self) -> Turn {
        self.state.turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::snapshot::{BattleSnapshot, MoveSnapshot, PokemonSnapshot};

    fn sample_battle() -> BattleSnapshot {
        let mut battle = BattleSnapshot::new(4);
        battle.active_pokemon =
            Some(PokemonSnapshot::new("Pikachu", &["ELECTRIC"]).with_hp(30, 60));
        battle.opponent_active_pokemon = Some(PokemonSnapshot::new("Gyarados", &["WATER", "FLYING"]));
        battle.available_moves = vec![
            MoveSnapshot::new("thunderbolt", "ELECTRIC", 90, 1.0),
            MoveSnapshot::new("quickattack", "NORMAL", 40, 1.0),
            MoveSnapshot::new("thunderwave", "ELECTRIC", 0, 0.9),
        ];
        battle.available_switches = vec![
            PokemonSnapshot::new("Snorlax", &["NORMAL"]).with_hp(100, 200),
            PokemonSnapshot::new("Gengar", &["GHOST", "POISON"]).with_status("psn"),
        ];
        battle.weather = Some("RAINDANCE".into());
        battle
    }

    #[test]
    fn test_moves_then_switches_indexed_independently() {
        let ctx = DecisionContext::from_battle(&sample_battle());

        assert_eq!(ctx.move_count(), 3);
        assert_eq!(ctx.switch_count(), 2);
        assert_eq!(
            ctx.moves.iter().map(|m| m.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(
            ctx.switches.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(ctx.switches[0].species, "snorlax");
        assert_eq!(ctx.switches[0].hp_pct, 50);
        assert_eq!(ctx.switches[1].status.as_deref(), Some("PSN"));
    }

    #[test]
    fn test_stab_flags() {
        let ctx = DecisionContext::from_battle(&sample_battle());
        assert!(ctx.moves[0].is_stab);
        assert!(!ctx.moves[1].is_stab);
        assert!(ctx.moves[2].is_stab);
    }

    #[test]
    fn test_state_summary() {
        let ctx = DecisionContext::from_battle(&sample_battle());
        assert_eq!(ctx.turn(), 4);
        assert!(!ctx.state.force_switch);
        assert_eq!(ctx.state.my_active.species, "pikachu");
        assert_eq!(ctx.state.my_active.hp_pct, Some(50));
        assert_eq!(ctx.state.opp_active.types, vec!["WATER", "FLYING"]);
        assert_eq!(ctx.state.weather, "RAINDANCE");
        assert_eq!(ctx.state.terrain, "none");
    }

    #[test]
    fn test_missing_active_pokemon_summarised_as_unknown() {
        let ctx = DecisionContext::from_battle(&BattleSnapshot::default());
        assert_eq!(ctx.state.my_active, PokemonSummary::unknown());
        assert_eq!(ctx.state.opp_active.species, "unknown");
        assert_eq!(ctx.turn(), 0);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_negative_turn_clamped() {
        let ctx = DecisionContext::from_battle(&BattleSnapshot::new(-3));
        assert_eq!(ctx.turn(), 0);
    }

    #[test]
    fn test_rows_serialize_with_kind_tag() {
        let ctx = DecisionContext::from_battle(&sample_battle());
        let rows = serde_json::to_value(ctx.rows()).unwrap();
        let rows = rows.as_array().unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["kind"], "move");
        assert_eq!(rows[0]["type"], "ELECTRIC");
        assert_eq!(rows[0]["category"], "PHYSICAL");
        assert_eq!(rows[3]["kind"], "switch");
        assert_eq!(rows[3]["index"], 0);
        assert_eq!(rows[4]["types"], serde_json::json!(["GHOST", "POISON"]));
    }

    #[test]
    fn test_encoding_is_stable() {
        let battle = sample_battle();
        assert_eq!(
            DecisionContext::from_battle(&battle),
            DecisionContext::from_battle(&battle)
        );
    }
}
