//! AI Commander - per-turn decision pipeline
//!
//! Encodes the turn, consults the oracle, validates its reply and, when
//! any of that fails, falls through a fixed chain of safe defaults. The
//! commander always produces an order; failures only change which one.

use crate::battle::ai::decision_context::DecisionContext;
use crate::battle::ai::display;
use crate::battle::ai::llm_gateway::{Decision, DecisionAction, PromptContext, SYSTEM_PROMPT};
use crate::battle::ai::oracle::DecisionOracle;
use crate::battle::ai::scoring;
use crate::battle::ai::trace::{self, TraceEvent, TraceEventKind, TraceSink};
use crate::battle::ai::validation::validate_decision;
use crate::battle::view::{BattleView, MoveView, PokemonView};
use crate::core::config::AgentConfig;
use crate::core::error::{AgentError, Result};
use crate::llm::parser::extract_json;

/// Who picked the action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// The oracle's reply passed validation
    Oracle,
    /// A fallback rule picked the action
    Fallback,
}

/// What to submit to the battle client, referencing the client's own
/// legal-move or legal-switch entry
#[derive(Debug, Clone, PartialEq)]
pub enum Order<'a, M, P> {
    Move { index: usize, target: &'a M },
    Switch { index: usize, target: &'a P },
    /// Nothing legal was offered; let the client choose at random
    Default,
}

impl<'a, M: MoveView, P: PokemonView> Order<'a, M, P> {
    /// Showdown `/choose` command for this order
    ///
    /// Targets are named by id; when the client gave no usable name the
    /// 1-based position in the legal list is used instead.
    pub fn to_choice(&self) -> String {
        match self {
            Order::Move { index, target } => {
                let id = choice_id(target.id())
                    .or_else(|| choice_id(target.name()))
                    .unwrap_or_else(|| (index + 1).to_string());
                format!("/choose move {}", id)
            }
            Order::Switch { index, target } => {
                let id = choice_id(target.species())
                    .or_else(|| choice_id(target.name()))
                    .unwrap_or_else(|| (index + 1).to_string());
                format!("/choose switch {}", id)
            }
            Order::Default => "/choose default".to_string(),
        }
    }
}

/// Showdown id of one naming source, or `None` when nothing usable is left
fn choice_id(source: Option<String>) -> Option<String> {
    source.map(|s| to_id(&s)).filter(|id| !id.is_empty())
}

/// Showdown id: lowercase ASCII alphanumerics only
fn to_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Everything produced for one turn
#[derive(Debug, Clone)]
pub struct TurnOutcome<'a, M, P> {
    pub context: DecisionContext,
    pub decision: Decision,
    pub source: DecisionSource,
    pub order: Order<'a, M, P>,
}

/// Decision agent driving one side of a battle
///
/// Holds no per-battle state, so one commander can serve any number of
/// concurrent battles.
pub struct AiCommander<O> {
    oracle: O,
    config: AgentConfig,
    trace: Box<dyn TraceSink>,
}

impl<O: DecisionOracle> AiCommander<O> {
    /// Create a commander; the event log follows `config.trace_file`
    pub fn new(oracle: O, config: AgentConfig) -> Self {
        let trace = trace::sink_for(config.trace_file.as_deref());
        Self {
            oracle,
            config,
            trace,
        }
    }

    /// Replace the event log sink
    pub fn with_trace(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Box::new(sink);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Decide this turn and map the decision onto the client's legal lists
    pub async fn choose_move<'b, B: BattleView>(
        &self,
        battle: &'b B,
    ) -> TurnOutcome<'b, B::Move, B::Pokemon> {
        let context = DecisionContext::from_battle(battle);
        self.narrate_turn(&context);

        let (decision, source) = self.decide(&context).await;
        if self.config.log_mode.is_compact() {
            tracing::info!("{}", display::decision_line(&decision, &context));
        }

        let order = resolve_order(battle, &decision);
        TurnOutcome {
            context,
            decision,
            source,
            order,
        }
    }

    /// Oracle decision if it survives validation, fallback otherwise
    pub async fn decide(&self, ctx: &DecisionContext) -> (Decision, DecisionSource) {
        match self.consult_oracle(ctx).await {
            Ok(decision) => (decision, DecisionSource::Oracle),
            Err(e) => {
                let decision = fallback_decision(ctx, &e);
                tracing::debug!(turn = ctx.turn(), error = %e, "Falling back");
                self.trace.record(
                    &TraceEvent::new(TraceEventKind::FallbackException, ctx.turn())
                        .with_error(&e)
                        .with_decision(&decision)
                        .with_state(ctx),
                );
                (decision, DecisionSource::Fallback)
            }
        }
    }

    async fn consult_oracle(&self, ctx: &DecisionContext) -> Result<Decision> {
        let turn = ctx.turn();

        if self.config.force_bad_output {
            if self.config.log_mode.is_full() {
                tracing::info!("[LLM] (forced) RAW OUTPUT: MOVE 1");
            }
            self.trace
                .record(&TraceEvent::new(TraceEventKind::LlmForcedBad, turn));
            return Err(AgentError::MalformedResponse("forced_bad_output".into()));
        }

        if !self.config.enabled {
            return Err(AgentError::OracleUnavailable);
        }

        let prompt = PromptContext::from_decision_context(ctx);
        if self.config.log_mode.is_full() {
            tracing::info!("[LLM] === PROMPT ===\n{}\n{}", SYSTEM_PROMPT, prompt.to_pretty_json());
        }

        let raw = self.oracle.ask(SYSTEM_PROMPT, &prompt.to_json()).await?;
        if self.config.log_mode.is_full() {
            tracing::info!("[LLM] RAW OUTPUT: {}", raw);
        }

        let parsed = match extract_json(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.trace.record(
                    &TraceEvent::new(TraceEventKind::LlmBadJson, turn)
                        .with_raw(&raw)
                        .with_error(&e)
                        .with_state(ctx),
                );
                return Err(e);
            }
        };

        match validate_decision(&parsed, ctx) {
            Ok(decision) => {
                self.trace.record(
                    &TraceEvent::new(TraceEventKind::LlmOk, turn)
                        .with_raw(&raw)
                        .with_parsed(&parsed)
                        .with_state(ctx)
                        .with_rows(ctx),
                );
                Ok(decision)
            }
            Err(reason) => {
                self.trace.record(
                    &TraceEvent::new(TraceEventKind::LlmBadDecision, turn)
                        .with_raw(&raw)
                        .with_parsed(&parsed)
                        .with_error(&reason)
                        .with_state(ctx)
                        .with_rows(ctx),
                );
                Err(reason.into())
            }
        }
    }

    fn narrate_turn(&self, ctx: &DecisionContext) {
        if !self.config.log_mode.is_compact() {
            return;
        }
        tracing::info!("{}", display::turn_header(ctx));
        tracing::info!("{}", display::field_line(ctx));
        tracing::info!("\n{}", display::candidate_table(ctx));
    }
}

/// Safe default for a turn the oracle couldn't decide
///
/// Forced switch with a switch available → first switch; otherwise the
/// best expected-damage move; otherwise move 0 even if no move exists.
pub fn fallback_decision(ctx: &DecisionContext, error: &AgentError) -> Decision {
    if ctx.state.force_switch && !ctx.switches.is_empty() {
        return Decision::switch_to(0, format!("fallback:force_switch ({})", error));
    }
    if let Some(best) = scoring::best_move_index(&ctx.moves) {
        return Decision::move_at(best, format!("fallback:expected-damage ({})", error));
    }
    Decision::move_at(0, format!("fallback:default ({})", error))
}

/// Map a decision onto the client's legal lists, clamping the index
///
/// A list that turns out to be empty falls back to the first legal move,
/// and with no legal move at all the client's default choice is used.
pub fn resolve_order<'b, B: BattleView>(
    battle: &'b B,
    decision: &Decision,
) -> Order<'b, B::Move, B::Pokemon> {
    let moves = battle.available_moves();
    let switches = battle.available_switches();

    if decision.action.targets_moves() && !moves.is_empty() {
        let index = decision.index.min(moves.len() - 1);
        return Order::Move {
            index,
            target: &moves[index],
        };
    }
    if decision.action == DecisionAction::Switch && !switches.is_empty() {
        let index = decision.index.min(switches.len() - 1);
        return Order::Switch {
            index,
            target: &switches[index],
        };
    }
    match moves.first() {
        Some(first) => Order::Move {
            index: 0,
            target: first,
        },
        None => Order::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::ai::oracle::{DisabledOracle, ScriptedOracle};
    use crate::battle::ai::trace::MemoryTrace;
    use crate::battle::snapshot::{BattleSnapshot, MoveSnapshot, PokemonSnapshot};
    use std::sync::Arc;

    fn battle() -> BattleSnapshot {
        let mut battle = BattleSnapshot::new(3);
        battle.active_pokemon = Some(PokemonSnapshot::new("Pikachu", &["ELECTRIC"]));
        battle.available_moves = vec![
            MoveSnapshot::new("tackle", "NORMAL", 40, 1.0),
            MoveSnapshot::new("thunderbolt", "ELECTRIC", 90, 1.0),
        ];
        battle.available_switches = vec![
            PokemonSnapshot::new("Snorlax", &["NORMAL"]),
            PokemonSnapshot::new("Mr. Mime", &["PSYCHIC", "FAIRY"]),
        ];
        battle
    }

    fn commander<O: DecisionOracle>(oracle: O) -> (AiCommander<O>, Arc<MemoryTrace>) {
        let memory = Arc::new(MemoryTrace::new());
        let commander =
            AiCommander::new(oracle, AgentConfig::default()).with_trace(Arc::clone(&memory));
        (commander, memory)
    }

    #[tokio::test]
    async fn test_valid_oracle_reply_is_played() {
        let (commander, memory) =
            commander(ScriptedOracle::new([r#"{"action":"switch","index":1,"reason":"safer"}"#]));
        let battle = battle();
        let outcome = commander.choose_move(&battle).await;

        assert_eq!(outcome.source, DecisionSource::Oracle);
        assert_eq!(outcome.decision, Decision::switch_to(1, "safer"));
        assert_eq!(outcome.order.to_choice(), "/choose switch mrmime");
        assert_eq!(memory.kinds(), vec![TraceEventKind::LlmOk]);
    }

    #[tokio::test]
    async fn test_unavailable_oracle_falls_back_to_best_move() {
        let (commander, memory) = commander(DisabledOracle);
        let battle = battle();
        let outcome = commander.choose_move(&battle).await;

        assert_eq!(outcome.source, DecisionSource::Fallback);
        assert_eq!(outcome.decision.action, DecisionAction::Move);
        assert_eq!(outcome.decision.index, 1);
        assert!(outcome
            .decision
            .reason
            .starts_with("fallback:expected-damage"));
        assert_eq!(outcome.order.to_choice(), "/choose move thunderbolt");
        assert_eq!(memory.kinds(), vec![TraceEventKind::FallbackException]);
    }

    #[tokio::test]
    async fn test_bad_json_is_traced_then_falls_back() {
        let (commander, memory) = commander(ScriptedOracle::new(["MOVE 1"]));
        let battle = battle();
        let outcome = commander.choose_move(&battle).await;

        assert_eq!(outcome.source, DecisionSource::Fallback);
        assert_eq!(
            memory.kinds(),
            vec![TraceEventKind::LlmBadJson, TraceEventKind::FallbackException]
        );
        let events = memory.events();
        assert_eq!(events[0].raw.as_deref(), Some("MOVE 1"));
        assert_eq!(events[0].error.as_deref(), Some("no_json_object_found"));
    }

    #[tokio::test]
    async fn test_invalid_decision_is_traced_with_reason() {
        let (commander, memory) =
            commander(ScriptedOracle::new([r#"{"action":"move","index":"1"}"#]));
        let battle = battle();
        let outcome = commander.choose_move(&battle).await;

        assert_eq!(outcome.source, DecisionSource::Fallback);
        let events = memory.events();
        assert_eq!(events[0].event, TraceEventKind::LlmBadDecision);
        assert_eq!(events[0].error.as_deref(), Some("index_not_int"));
        assert!(events[0].rows.is_some());
        assert_eq!(
            events[1].decision.as_ref().map(|d| d.reason.as_str()),
            Some("fallback:expected-damage (index_not_int)")
        );
    }

    #[tokio::test]
    async fn test_forced_bad_output_skips_oracle() {
        let oracle = ScriptedOracle::new([r#"{"action":"move","index":0}"#]);
        let config = AgentConfig {
            force_bad_output: true,
            ..AgentConfig::default()
        };
        let memory = Arc::new(MemoryTrace::new());
        let commander = AiCommander::new(oracle, config).with_trace(Arc::clone(&memory));

        let battle = battle();
        let outcome = commander.choose_move(&battle).await;

        assert_eq!(outcome.source, DecisionSource::Fallback);
        assert_eq!(
            memory.kinds(),
            vec![TraceEventKind::LlmForcedBad, TraceEventKind::FallbackException]
        );
        assert_eq!(commander.oracle.remaining(), 1);
    }

    #[tokio::test]
    async fn test_disabled_config_skips_oracle() {
        let config = AgentConfig {
            enabled: false,
            ..AgentConfig::default()
        };
        let commander = AiCommander::new(ScriptedOracle::new(["{}"]), config).with_trace(trace::NullTrace);
        let battle = battle();
        let outcome = commander.choose_move(&battle).await;

        assert_eq!(outcome.source, DecisionSource::Fallback);
        assert!(outcome.decision.reason.contains("oracle_unavailable"));
        assert_eq!(commander.oracle.remaining(), 1);
    }

    #[test]
    fn test_blank_id_falls_through_to_name() {
        let bolt = MoveSnapshot {
            id: Some(String::new()),
            name: Some("Thunderbolt".into()),
            ..MoveSnapshot::default()
        };
        let order: Order<'_, MoveSnapshot, PokemonSnapshot> = Order::Move {
            index: 0,
            target: &bolt,
        };
        assert_eq!(order.to_choice(), "/choose move thunderbolt");

        let punctuation_only = MoveSnapshot {
            id: Some("--".into()),
            name: Some("Hidden Power".into()),
            ..MoveSnapshot::default()
        };
        let order: Order<'_, MoveSnapshot, PokemonSnapshot> = Order::Move {
            index: 2,
            target: &punctuation_only,
        };
        assert_eq!(order.to_choice(), "/choose move hiddenpower");
    }

    #[test]
    fn test_blank_species_falls_through_to_name() {
        let mime = PokemonSnapshot {
            species: Some("  ".into()),
            name: Some("Mr. Mime".into()),
            ..PokemonSnapshot::default()
        };
        let order: Order<'_, MoveSnapshot, PokemonSnapshot> = Order::Switch {
            index: 1,
            target: &mime,
        };
        assert_eq!(order.to_choice(), "/choose switch mrmime");
    }

    #[test]
    fn test_fallback_force_switch_picks_first_switch() {
        let mut battle = battle();
        battle.force_switch = true;
        let ctx = DecisionContext::from_battle(&battle);

        let decision = fallback_decision(&ctx, &AgentError::OracleUnavailable);
        assert_eq!(decision.action, DecisionAction::Switch);
        assert_eq!(decision.index, 0);
        assert_eq!(decision.reason, "fallback:force_switch (oracle_unavailable)");
    }

    #[test]
    fn test_fallback_force_switch_without_switches_uses_moves() {
        let mut battle = battle();
        battle.force_switch = true;
        battle.available_switches.clear();
        let ctx = DecisionContext::from_battle(&battle);

        let decision = fallback_decision(&ctx, &AgentError::OracleUnavailable);
        assert_eq!(decision, Decision::move_at(1, "fallback:expected-damage (oracle_unavailable)"));
    }

    #[test]
    fn test_fallback_with_nothing_legal() {
        let ctx = DecisionContext::from_battle(&BattleSnapshot::new(9));
        let decision = fallback_decision(&ctx, &AgentError::OracleUnavailable);
        assert_eq!(decision, Decision::move_at(0, "fallback:default (oracle_unavailable)"));
    }

    #[test]
    fn test_resolve_order_clamps_index() {
        let battle = battle();
        match resolve_order(&battle, &Decision::move_at(7, "")) {
            Order::Move { index, target } => {
                assert_eq!(index, 1);
                assert_eq!(target.id.as_deref(), Some("thunderbolt"));
            }
            other => panic!("expected a move, got {:?}", other),
        }
        match resolve_order(&battle, &Decision::switch_to(9, "")) {
            Order::Switch { index, .. } => assert_eq!(index, 1),
            other => panic!("expected a switch, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_order_force_switch_action_uses_moves() {
        let battle = battle();
        let decision = Decision::new(DecisionAction::ForceSwitch, 0, "");
        assert!(matches!(
            resolve_order(&battle, &decision),
            Order::Move { index: 0, .. }
        ));
    }

    #[test]
    fn test_resolve_order_switch_without_switches_uses_first_move() {
        let mut battle = battle();
        battle.available_switches.clear();
        assert!(matches!(
            resolve_order(&battle, &Decision::switch_to(0, "")),
            Order::Move { index: 0, .. }
        ));
    }

    #[test]
    fn test_resolve_order_defers_when_nothing_legal() {
        let battle = BattleSnapshot::new(1);
        let order = resolve_order(&battle, &Decision::move_at(0, ""));
        assert_eq!(order, Order::Default);
        assert_eq!(order.to_choice(), "/choose default");
    }

    #[test]
    fn test_choice_falls_back_to_slot_number() {
        let mut battle = BattleSnapshot::new(1);
        battle.available_moves = vec![MoveSnapshot::default(), MoveSnapshot::default()];
        let order = resolve_order(&battle, &Decision::move_at(1, ""));
        assert_eq!(order.to_choice(), "/choose move 2");
    }
}
