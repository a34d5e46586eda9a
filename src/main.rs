//! Showdown LLM Agent - Entry Point
//!
//! Decides one turn per battle snapshot file and prints the resulting
//! Showdown `/choose` command. Connecting to a server and sequencing turns
//! is left to the battle client that produced the snapshots.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use showdown_llm_agent::battle::ai::{AiCommander, Decision, DecisionSource};
use showdown_llm_agent::battle::BattleSnapshot;
use showdown_llm_agent::core::config::{AgentConfig, FlagOverrides, LogMode};
use showdown_llm_agent::core::error::Result;
use showdown_llm_agent::llm::LlmClient;

/// LLM-driven move selection with a heuristic fallback
#[derive(Parser, Debug)]
#[command(name = "llm-agent")]
#[command(about = "Decide Pokemon Showdown turns from battle snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide one turn per snapshot file and print the `/choose` command
    Decide(DecideArgs),
}

#[derive(clap::Args, Debug)]
struct DecideArgs {
    /// Battle snapshot JSON files, one turn each
    #[arg(required = true)]
    snapshots: Vec<PathBuf>,

    /// TOML config file (environment variables override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Console narration level
    #[arg(long, value_enum)]
    log_mode: Option<LogMode>,

    /// Append decision events to this JSON Lines file
    #[arg(long)]
    trace_file: Option<PathBuf>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Force malformed oracle output to exercise the fallback path
    #[arg(long)]
    force_bad_output: bool,

    /// Decide with the heuristic fallback only
    #[arg(long)]
    no_llm: bool,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

impl DecideArgs {
    fn flags(&self) -> FlagOverrides {
        FlagOverrides {
            log_mode: self.log_mode,
            trace_file: self.trace_file.clone(),
            model: self.model.clone(),
            force_bad_output: self.force_bad_output,
            no_llm: self.no_llm,
        }
    }
}

/// JSON output structure
#[derive(Serialize)]
struct TurnReport {
    snapshot: String,
    turn: u32,
    decision: Decision,
    source: &'static str,
    choice: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("showdown_llm_agent=info,llm_agent=info")),
        )
        .init();

    match Cli::parse().command {
        Command::Decide(args) => decide(&args),
    }
}

fn decide(args: &DecideArgs) -> Result<()> {
    let config = AgentConfig::layered(
        args.config.as_deref(),
        |key| std::env::var(key).ok(),
        &args.flags(),
    )?;
    config.validate()?;

    let oracle = if args.no_llm {
        None
    } else {
        match LlmClient::from_config(&config) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Oracle unavailable ({}) - using heuristic fallback only", e);
                None
            }
        }
    };

    let rt = Runtime::new()?;
    let commander = AiCommander::new(oracle, config);

    for path in &args.snapshots {
        let battle = match BattleSnapshot::from_file(path) {
            Ok(battle) => battle,
            Err(e) => {
                tracing::error!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let outcome = rt.block_on(commander.choose_move(&battle));
        let choice = outcome.order.to_choice();

        if args.format == "json" {
            let report = TurnReport {
                snapshot: path.display().to_string(),
                turn: outcome.context.turn(),
                decision: outcome.decision,
                source: match outcome.source {
                    DecisionSource::Oracle => "oracle",
                    DecisionSource::Fallback => "fallback",
                },
                choice,
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", choice);
        }
    }

    Ok(())
}
