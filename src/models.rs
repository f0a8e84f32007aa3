//! Data models for the panel simulator.
//!
//! This module contains the core data structures used throughout the
//! application for representing personas, run inputs, and run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A synthetic market-participant identity loaded from a YAML file.
///
/// Immutable after load and scoped to a single run. The `name` is assumed
/// unique within a run; the persona store skips sampled duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Display name, used as the key in both response mappings.
    pub name: String,
    /// Free-text background and personality description.
    pub persona: String,
    /// Ordered list of the persona's objectives.
    pub objectives: Vec<String>,
    /// Market role (e.g. "day trader", "institutional investor").
    pub role: String,
    /// Descriptive trader-characteristic tags.
    pub trader_type: Vec<String>,
}

/// Validated input for one panel run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInput {
    /// The question every persona answers.
    pub question: String,
    /// Number of personas to sample for the panel.
    pub num_personas: usize,
}

/// The sole output of the two-round workflow.
///
/// Invariant: on success both mappings hold exactly one entry per loaded
/// persona, with identical key sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Round-1 answers, keyed by persona name.
    pub individual_responses: HashMap<String, String>,
    /// Round-2 answers (after seeing peers), keyed by persona name.
    pub collective_responses: HashMap<String, String>,
}

impl RunResult {
    /// Number of personas that answered (both rounds hold the same set).
    pub fn persona_count(&self) -> usize {
        self.individual_responses.len()
    }
}

/// Metadata about a completed panel run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// The question posed to the panel.
    pub question: String,
    /// Date and time the run completed.
    pub run_date: DateTime<Utc>,
    /// Model used for the independent round.
    pub individual_model: String,
    /// Model used for the collective round.
    pub collective_model: String,
    /// Number of personas that answered.
    pub personas_answered: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete panel report: metadata plus both response rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelReport {
    /// Metadata about the run.
    pub metadata: RunMetadata,
    /// The run's response mappings.
    #[serde(flatten)]
    pub result: RunResult,
}
