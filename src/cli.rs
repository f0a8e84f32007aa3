//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// MarketPanel - LLM-powered market-participant panel simulator
///
/// Pose a question to a randomly sampled panel of synthetic market
/// participants. Each persona answers independently first, then revises
/// its opinion after seeing the rest of the panel's answers.
///
/// Examples:
///   marketpanel --question "Will rates rise this quarter?" --num-personas 5
///   marketpanel -Q "Is BTC overbought?" -n 3 --format json -o run.json
///   marketpanel -Q "..." -n 4 --api-url http://localhost:11434/v1
///   marketpanel -Q "..." -n 4 --dry-run
///   marketpanel --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// The question the panel answers
    #[arg(
        short = 'Q',
        long,
        value_name = "TEXT",
        required_unless_present = "init_config"
    )]
    pub question: Option<String>,

    /// Number of personas to sample for the panel
    ///
    /// Capped at the number of persona files available in the directory.
    #[arg(
        short = 'n',
        long,
        value_name = "COUNT",
        required_unless_present = "init_config"
    )]
    pub num_personas: Option<usize>,

    /// Base directory holding the persona files
    ///
    /// Files are looked up under `personas/<namespace>/` relative to this
    /// directory unless the path already contains the namespace segment.
    #[arg(short, long, value_name = "DIR")]
    pub personas_dir: Option<PathBuf>,

    /// OpenAI-compatible API base URL
    #[arg(
        long,
        default_value = "https://api.openai.com/v1",
        env = "OPENAI_BASE_URL"
    )]
    pub api_url: String,

    /// API key for the completion endpoint
    ///
    /// Leave empty for local servers that need no auth.
    #[arg(long, default_value = "", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model for the independent round
    #[arg(long, default_value = "gpt-4", value_name = "MODEL")]
    pub individual_model: String,

    /// Model for the collective round
    #[arg(long, default_value = "gpt-4o-mini", value_name = "MODEL")]
    pub collective_model: String,

    /// Sampling temperature for the independent round (0.0 - 2.0)
    #[arg(long, default_value = "0.7", value_name = "TEMP")]
    pub individual_temperature: f32,

    /// Sampling temperature for the collective round (0.0 - 2.0)
    #[arg(long, default_value = "0.6", value_name = "TEMP")]
    pub collective_temperature: f32,

    /// Output file path for the report
    #[arg(short, long, default_value = "panel_report.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .marketpanel.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Completions in flight at once within a round
    ///
    /// 1 (the default) issues one call at a time; higher values fan a round
    /// out across personas. The collective round still waits for the whole
    /// independent round to finish.
    #[arg(long, default_value = "1", value_name = "NUM")]
    pub concurrency: usize,

    /// RNG seed for reproducible persona sampling
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: sample and list personas without calling the LLM
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .marketpanel.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self
            .question
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
        {
            return Err("Question must not be empty".to_string());
        }

        if self.num_personas.unwrap_or(0) == 0 {
            return Err("Number of personas must be at least 1".to_string());
        }

        // API URL is only contacted on a real run
        if !self.dry_run
            && !self.api_url.starts_with("http://")
            && !self.api_url.starts_with("https://")
        {
            return Err("API URL must start with 'http://' or 'https://'".to_string());
        }

        for temperature in [self.individual_temperature, self.collective_temperature] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if self.concurrency == 0 {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref dir) = self.personas_dir {
            if !dir.exists() {
                return Err(format!("Personas directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Personas path is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
