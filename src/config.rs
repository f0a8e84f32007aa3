//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.marketpanel.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Completion API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Per-round model settings.
    #[serde(default)]
    pub rounds: RoundsConfig,

    /// Persona directory settings.
    #[serde(default)]
    pub personas: PersonasConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Completions in flight at once within a round (1 = sequential).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "panel_report.md".to_string()
}

fn default_concurrency() -> usize {
    1
}

/// Completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (empty for local servers that need no auth).
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Model and temperature for both rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundsConfig {
    /// Independent round settings.
    #[serde(default = "default_individual_round")]
    pub individual: RoundModelConfig,

    /// Collective round settings.
    #[serde(default = "default_collective_round")]
    pub collective: RoundModelConfig,
}

impl Default for RoundsConfig {
    fn default() -> Self {
        Self {
            individual: default_individual_round(),
            collective: default_collective_round(),
        }
    }
}

/// Model name and sampling temperature for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundModelConfig {
    pub model: String,
    pub temperature: f32,
}

fn default_individual_round() -> RoundModelConfig {
    RoundModelConfig {
        model: "gpt-4".to_string(),
        temperature: 0.7,
    }
}

fn default_collective_round() -> RoundModelConfig {
    RoundModelConfig {
        model: "gpt-4o-mini".to_string(),
        temperature: 0.6,
    }
}

/// Persona directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonasConfig {
    /// Base directory; the `personas/<namespace>` suffix is appended when
    /// the path does not already contain the namespace segment.
    #[serde(default = "default_personas_dir")]
    pub base_dir: String,

    /// Namespace subdirectory holding the persona files.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for PersonasConfig {
    fn default() -> Self {
        Self {
            base_dir: default_personas_dir(),
            namespace: default_namespace(),
        }
    }
}

fn default_personas_dir() -> String {
    "./market_agents_personas".to_string()
}

fn default_namespace() -> String {
    crate::persona::DEFAULT_NAMESPACE.to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".marketpanel.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Round settings - always override since they have defaults in CLI
        self.rounds.individual.model = args.individual_model.clone();
        self.rounds.individual.temperature = args.individual_temperature;
        self.rounds.collective.model = args.collective_model.clone();
        self.rounds.collective.temperature = args.collective_temperature;

        // API settings
        self.api.base_url = args.api_url.clone();
        if !args.api_key.is_empty() {
            self.api.api_key = args.api_key.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        // Persona settings - only override if provided
        if let Some(ref dir) = args.personas_dir {
            self.personas.base_dir = dir.display().to_string();
        }

        // General settings
        self.general.concurrency = args.concurrency;

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
