//! Property tests for the row encoder, scoring and validation

use proptest::prelude::*;
use serde_json::json;

use showdown_llm_agent::battle::ai::scoring::expected_damage;
use showdown_llm_agent::battle::ai::{validate_decision, DecisionContext, RejectReason};
use showdown_llm_agent::battle::{BattleSnapshot, MoveSnapshot, PokemonSnapshot, RawAccuracy};

fn arb_accuracy() -> impl Strategy<Value = Option<RawAccuracy>> {
    prop_oneof![
        Just(None),
        Just(Some(RawAccuracy::AlwaysHits(true))),
        Just(Some(RawAccuracy::Value(0.0))),
        Just(Some(RawAccuracy::Value(f64::NAN))),
        Just(Some(RawAccuracy::Value(f64::INFINITY))),
        (-1000.0f64..1000.0).prop_map(|v| Some(RawAccuracy::Value(v))),
    ]
}

fn arb_move() -> impl Strategy<Value = MoveSnapshot> {
    (
        proptest::option::of("[a-z]{1,12}"),
        proptest::option::of(prop_oneof![Just("FIRE"), Just("WATER"), Just("NORMAL")]),
        proptest::option::of(-50i64..250),
        arb_accuracy(),
        proptest::option::of(-7i64..6),
    )
        .prop_map(|(id, move_type, base_power, accuracy, priority)| MoveSnapshot {
            id,
            move_type: move_type.map(str::to_string),
            base_power,
            accuracy,
            priority,
            ..MoveSnapshot::default()
        })
}

fn arb_switch() -> impl Strategy<Value = PokemonSnapshot> {
    (
        proptest::option::of("[A-Za-z]{1,10}"),
        proptest::option::of(-100i64..400),
        proptest::option::of(-10i64..400),
    )
        .prop_map(|(species, current_hp, max_hp)| PokemonSnapshot {
            species,
            current_hp,
            max_hp,
            ..PokemonSnapshot::default()
        })
}

fn arb_battle() -> impl Strategy<Value = BattleSnapshot> {
    (
        proptest::collection::vec(arb_move(), 0..6),
        proptest::collection::vec(arb_switch(), 0..6),
        any::<bool>(),
        proptest::option::of(-5i64..200),
    )
        .prop_map(|(moves, switches, force_switch, turn)| BattleSnapshot {
            turn,
            force_switch,
            active_pokemon: Some(PokemonSnapshot::new("Arcanine", &["FIRE"])),
            available_moves: moves,
            available_switches: switches,
            ..BattleSnapshot::default()
        })
}

proptest! {
    #[test]
    fn accuracy_always_within_unit_interval(battle in arb_battle()) {
        let ctx = DecisionContext::from_battle(&battle);
        for m in &ctx.moves {
            prop_assert!((0.0..=1.0).contains(&m.accuracy), "accuracy {}", m.accuracy);
            prop_assert!(expected_damage(m) >= 0.0);
        }
    }

    #[test]
    fn indices_contiguous_and_stable(battle in arb_battle()) {
        let ctx = DecisionContext::from_battle(&battle);

        prop_assert_eq!(ctx.moves.len(), battle.available_moves.len());
        prop_assert_eq!(ctx.switches.len(), battle.available_switches.len());
        for (i, m) in ctx.moves.iter().enumerate() {
            prop_assert_eq!(m.index, i);
        }
        for (i, s) in ctx.switches.iter().enumerate() {
            prop_assert_eq!(s.index, i);
            prop_assert!(s.hp_pct <= 100);
        }
        prop_assert_eq!(&ctx, &DecisionContext::from_battle(&battle));
    }

    #[test]
    fn validator_accepts_exactly_in_range_indices(battle in arb_battle(), index in -3i64..10) {
        let ctx = DecisionContext::from_battle(&battle);
        let n_moves = ctx.move_count() as i64;
        let n_switches = ctx.switch_count() as i64;

        let as_move = validate_decision(&json!({"action": "move", "index": index}), &ctx);
        if ctx.state.force_switch {
            prop_assert_eq!(as_move, Err(RejectReason::MustSwitch));
        } else if (0..n_moves).contains(&index) {
            prop_assert!(as_move.is_ok());
        } else {
            prop_assert_eq!(as_move, Err(RejectReason::IndexOutOfRangeMove));
        }

        let as_forced = validate_decision(&json!({"action": "force_switch", "index": index}), &ctx);
        prop_assert_eq!(as_forced.is_ok(), (0..n_moves).contains(&index));

        let as_switch = validate_decision(&json!({"action": "switch", "index": index}), &ctx);
        if (0..n_switches).contains(&index) {
            prop_assert!(as_switch.is_ok());
        } else {
            prop_assert_eq!(as_switch, Err(RejectReason::IndexOutOfRangeSwitch));
        }
    }
}

#[test]
fn test_heuristic_reference_values() {
    let mut battle = BattleSnapshot::new(1);
    battle.active_pokemon = Some(PokemonSnapshot::new("Arcanine", &["FIRE"]));
    battle.available_moves = vec![
        MoveSnapshot::new("willowisp", "FIRE", 0, 0.85),
        MoveSnapshot::new("firepunch", "FIRE", 100, 1.0),
        MoveSnapshot::new("bodyslam", "NORMAL", 100, 1.0),
    ];
    let ctx = DecisionContext::from_battle(&battle);

    assert_eq!(expected_damage(&ctx.moves[0]), 0.0);
    assert_eq!(expected_damage(&ctx.moves[1]), 150.0);
    assert_eq!(expected_damage(&ctx.moves[2]), 100.0);
}
