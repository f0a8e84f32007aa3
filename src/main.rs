//! MarketPanel - LLM-powered market-participant panel simulator
//!
//! A CLI tool that samples a panel of synthetic market-participant
//! personas and has each one answer a question twice: once independently
//! and once after seeing the rest of the panel's answers.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, empty persona set, etc.)

mod cli;
mod client;
mod config;
mod error;
mod models;
mod panel;
mod persona;
mod prompt;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::{PanelReport, RunInput, RunMetadata};
use panel::{PanelConfig, PanelRunner, RoundConfig};
use persona::PersonaStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("MarketPanel v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the panel
    match run_panel(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Panel run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .marketpanel.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".marketpanel.toml");

    if path.exists() {
        eprintln!("⚠️  .marketpanel.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .marketpanel.toml")?;

    println!("✅ Created .marketpanel.toml with default settings.");
    println!("   Edit it to customize models, the API endpoint, and the personas directory.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete panel workflow. Returns exit code 0 on success.
async fn run_panel(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = RunInput {
        question: args.question.clone().unwrap_or_default(),
        num_personas: args.num_personas.unwrap_or(0),
    };

    // Resolve the personas directory
    let base_dir = PathBuf::from(&config.personas.base_dir);
    let personas_dir = persona::resolve_personas_dir(&base_dir, &config.personas.namespace);
    info!("Personas directory: {}", personas_dir.display());

    let store = PersonaStore::new(personas_dir, args.seed);

    // Handle --dry-run: sample personas and exit
    if args.dry_run {
        return handle_dry_run(&store, input.num_personas);
    }

    println!("🎭 Assembling panel of {} personas...", input.num_personas);
    println!("   Question: {}", input.question);
    println!("   API: {}", config.api.base_url);
    println!(
        "   Round 1: {} (t={}) | Round 2: {} (t={})",
        config.rounds.individual.model,
        config.rounds.individual.temperature,
        config.rounds.collective.model,
        config.rounds.collective.temperature
    );

    if config.api.api_key.is_empty() {
        warn!("No API key set; proceeding without Authorization header");
    }

    // Build the completion client and the runner
    let client = client::OpenAiClient::new(
        config.api.base_url.clone(),
        config.api.api_key.clone(),
        config.api.timeout_seconds,
    )?;

    let panel_config = PanelConfig {
        individual: RoundConfig {
            model: config.rounds.individual.model.clone(),
            temperature: config.rounds.individual.temperature,
        },
        collective: RoundConfig {
            model: config.rounds.collective.model.clone(),
            temperature: config.rounds.collective.temperature,
        },
        concurrency: config.general.concurrency,
        show_progress: !args.quiet,
    };

    let runner = PanelRunner::new(panel_config, Arc::new(client));

    // Run both rounds
    println!("\n🗣️  Running panel discussion (two rounds)...\n");
    let result = runner.run(&store, &input).await?;

    // Build and save the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let report = PanelReport {
        metadata: RunMetadata {
            question: input.question.clone(),
            run_date: Utc::now(),
            individual_model: config.rounds.individual.model.clone(),
            collective_model: config.rounds.collective.model.clone(),
            personas_answered: result.persona_count(),
            duration_seconds: duration,
        },
        result,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Panel Summary:");
    println!("   Personas answered: {}", report.metadata.personas_answered);
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Panel complete! Report saved to: {}",
        args.output.display()
    );

    Ok(0)
}

/// Handle --dry-run: sample personas, print who would answer, exit.
fn handle_dry_run(store: &PersonaStore, num_personas: usize) -> Result<i32> {
    println!("\n🔍 Dry run: sampling personas (no LLM calls)...\n");

    let personas = store.load(num_personas)?;

    if personas.is_empty() {
        println!("   No persona files found in {}.", store.dir().display());
    } else {
        println!("   Sampled {} personas:\n", personas.len());
        for persona in &personas {
            println!("     🎭 {} ({})", persona.name, persona.role);
        }
    }

    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .marketpanel.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
