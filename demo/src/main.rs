//! MIMIC synthetic-user runtime demo CLI
//!
//! Runs the scripted storefront scenarios, or a live run where hosted models
//! drive a persona through a flow on the simulated storefront.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- checkout
//!   cargo run -p demo -- guardrail-recovery
//!   cargo run -p demo -- run --persona shopper --flow checkout

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mimic_config::ConfigRoot;
use mimic_contracts::{error::MimicResult, execution::RunId};
use mimic_core::{AgentLoop, LoopConfig};
use mimic_guardrails::GuardrailChecker;
use mimic_recording::RunLogger;
use mimic_ref_storefront::{
    scenarios::{checkout, flaky_selector, guardrail_recovery, step_budget, unparseable_response},
    Storefront, BASE_URL,
};
use mimic_router::{Credentials, Router};

// ── CLI definition ────────────────────────────────────────────────────────────

/// MIMIC: synthetic users with guardrails.
///
/// The scenario subcommands replay scripted decisions against the reference
/// storefront. `run` asks real models for every decision.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "MIMIC synthetic-user runtime demo",
    long_about = "Runs MIMIC storefront scenarios showing the agent loop, guardrail\n\
                  blocking and feedback, parser fallback, and step budgets."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all five storefront scenarios in sequence.
    RunAll,
    /// Scenario 1: Checkout (flow override lets "Place order" through).
    Checkout,
    /// Scenario 2: Guardrail Recovery (blocked selector and domain, with feedback).
    GuardrailRecovery,
    /// Scenario 3: Unparseable Response (fallback decision).
    UnparseableResponse,
    /// Scenario 4: Flaky Selector (fail-open, execution error feedback).
    FlakySelector,
    /// Scenario 5: Step Budget (max_steps exit).
    StepBudget,
    /// Drive a persona through a flow with the configured models.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Persona id, loaded from <config-dir>/personas/<id>.toml|json.
    #[arg(long)]
    persona: String,

    /// Flow name, loaded from <config-dir>/flows/<name>.toml|json.
    #[arg(long)]
    flow: String,

    /// Configuration root.
    #[arg(long, default_value = "crates/mimic-ref-storefront/fixtures")]
    config_dir: PathBuf,

    /// Override the flow's step budget.
    #[arg(long)]
    max_steps: Option<u32>,

    /// Origin the flow's start path is appended to.
    #[arg(long, env = "MIMIC_BASE_URL", default_value = BASE_URL)]
    base_url: String,

    /// Directory run logs are written under.
    #[arg(long, default_value = "runs")]
    runs_dir: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all().await,
        Command::Checkout => checkout::run_scenario().await,
        Command::GuardrailRecovery => guardrail_recovery::run_scenario().await,
        Command::UnparseableResponse => unparseable_response::run_scenario().await,
        Command::FlakySelector => flaky_selector::run_scenario().await,
        Command::StepBudget => step_budget::run_scenario().await,
        Command::Run(args) => run_live(args).await,
    };

    match result {
        Ok(()) => {
            println!("All selected runs completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

async fn run_all() -> MimicResult<()> {
    checkout::run_scenario().await?;
    guardrail_recovery::run_scenario().await?;
    unparseable_response::run_scenario().await?;
    flaky_selector::run_scenario().await?;
    step_budget::run_scenario().await?;
    Ok(())
}

// ── Live run ──────────────────────────────────────────────────────────────────

async fn run_live(args: RunArgs) -> MimicResult<()> {
    let root = ConfigRoot::new(&args.config_dir);
    let persona = root.persona(&args.persona)?;
    let mut flow = root.flow(&args.flow)?;
    if let Some(max_steps) = args.max_steps {
        flow.max_steps = max_steps;
    }
    let guardrails = GuardrailChecker::new(root.guardrails()?);
    let router = Router::from_config(&root.models()?, &Credentials::from_env())?;

    let run_id = RunId::new(&persona.id, &flow.name);
    let run_dir = args.runs_dir.join(run_id.to_string());
    let logger = RunLogger::new(run_id.clone());

    println!("=== Run {} ===", run_id);
    println!("  Persona: {} ({})", persona.name, persona.id);
    println!("  Flow:    {} (max {} steps)", flow.name, flow.max_steps);
    println!();

    let agent = AgentLoop::new(
        Box::new(router),
        Box::new(guardrails),
        Box::new(logger.clone()),
        LoopConfig::with_base_url(args.base_url),
    );
    let page = Storefront::new();
    let outcome = agent.run(&page, &persona, &flow).await;
    let result = logger.finish(&run_dir, outcome)?;
    info!(run_id = %run_id, dir = %run_dir.display(), "run complete");

    println!("  Exit reason:   {}", result.exit_reason);
    println!("  Total steps:   {}", result.total_steps);
    println!("  Final message: {}", result.final_message);
    println!("  Logs:          {}", run_dir.display());
    println!();
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("MIMIC: Synthetic Users with Guardrails");
    println!("Storefront Reference Demo");
    println!("=======================================");
    println!();
    println!("Agent loop pipeline per step:");
    println!("  [1] Capture the screen and have the vision model describe it");
    println!("  [2] Reasoning model picks the next action as the persona");
    println!("  [3] Parser validates the action (fallback: confused + blocked)");
    println!("  [4] Guardrail checks the action; a block becomes next-step feedback");
    println!("  [5] Decision recorded, then the action is executed on the page");
    println!();
}
