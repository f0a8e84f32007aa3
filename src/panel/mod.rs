//! Two-round panel aggregator.
//!
//! The run is a straight-line sequence of phases: load personas, collect an
//! independent answer from each, then collect a collective answer from each
//! after showing it the peers' independent answers. The collective round
//! never starts until the independent round holds a result for every
//! persona, and a single completion failure aborts the whole run with no
//! partial result.

use crate::client::CompletionBackend;
use crate::error::{Error, Result};
use crate::models::{Persona, RunInput, RunResult};
use crate::persona::PersonaStore;
use crate::prompt::{
    collective_prompt, individual_prompt, COLLECTIVE_SYSTEM_PROMPT, INDIVIDUAL_SYSTEM_PROMPT,
};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Model and sampling temperature for one round.
#[derive(Debug, Clone)]
pub struct RoundConfig {
    pub model: String,
    pub temperature: f32,
}

/// Configuration for the panel runner.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Round-1 policy.
    pub individual: RoundConfig,
    /// Round-2 policy.
    pub collective: RoundConfig,
    /// Completions in flight at once within a phase. 1 = fully sequential.
    pub concurrency: usize,
    /// Show a per-phase progress bar on stderr.
    pub show_progress: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            individual: RoundConfig {
                model: "gpt-4".to_string(),
                temperature: 0.7,
            },
            collective: RoundConfig {
                model: "gpt-4o-mini".to_string(),
                temperature: 0.6,
            },
            concurrency: 1,
            show_progress: false,
        }
    }
}

/// Drives the two-round workflow against a completion backend.
pub struct PanelRunner {
    config: PanelConfig,
    backend: Arc<dyn CompletionBackend>,
}

impl PanelRunner {
    /// Create a runner over an injected completion backend.
    pub fn new(config: PanelConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { config, backend }
    }

    /// Run the full workflow for one question.
    ///
    /// Fails with [`Error::EmptyPersonaSet`] if the store yields zero
    /// personas; any later failure surfaces unmodified with no partial
    /// [`RunResult`].
    pub async fn run(&self, store: &PersonaStore, input: &RunInput) -> Result<RunResult> {
        info!("Starting panel run");
        info!("Question: {}", input.question);
        info!("Number of personas requested: {}", input.num_personas);

        let personas = store.load(input.num_personas)?;
        if personas.is_empty() {
            return Err(Error::EmptyPersonaSet {
                path: store.dir().to_path_buf(),
            });
        }

        info!("Starting first round: individual responses");
        let individual_responses = self.independent_round(&personas, &input.question).await?;
        info!(
            "Completed individual responses for {} personas",
            individual_responses.len()
        );

        // Phase barrier: every persona has a round-1 answer before any
        // round-2 call is issued.
        info!("Starting second round: collective responses");
        let collective_responses = self
            .collective_round(&personas, &input.question, &individual_responses)
            .await?;
        info!(
            "Completed collective responses for {} personas",
            collective_responses.len()
        );

        info!("Completed panel run");
        Ok(RunResult {
            individual_responses,
            collective_responses,
        })
    }

    /// Round 1: each persona answers without seeing the others.
    async fn independent_round(
        &self,
        personas: &[Persona],
        question: &str,
    ) -> Result<HashMap<String, String>> {
        let pb = self.progress_bar(personas.len());
        let round = &self.config.individual;

        let calls = personas.iter().map(|persona| {
            let backend = Arc::clone(&self.backend);
            async move {
                info!("Getting individual response from persona: {}", persona.name);
                let prompt = individual_prompt(persona, question)?;
                let text = backend
                    .complete(INDIVIDUAL_SYSTEM_PROMPT, &prompt, &round.model, round.temperature)
                    .await?;
                debug!("Received response for {}", persona.name);
                Ok::<(String, String), Error>((persona.name.clone(), text))
            }
        });

        self.collect_round(calls, &pb).await
    }

    /// Round 2: each persona answers after seeing every peer's round-1
    /// answer (its own excluded).
    async fn collective_round(
        &self,
        personas: &[Persona],
        question: &str,
        individual_responses: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>> {
        let pb = self.progress_bar(personas.len());
        let round = &self.config.collective;

        let calls = personas.iter().map(|persona| {
            let backend = Arc::clone(&self.backend);
            // Peers in load order, acting persona excluded
            let peers: Vec<String> = personas
                .iter()
                .filter(|p| p.name != persona.name)
                .filter_map(|p| individual_responses.get(&p.name).cloned())
                .collect();

            async move {
                info!("Getting collective response from persona: {}", persona.name);
                let prompt = collective_prompt(persona, question, &peers)?;
                let text = backend
                    .complete(COLLECTIVE_SYSTEM_PROMPT, &prompt, &round.model, round.temperature)
                    .await?;
                debug!("Received collective response for {}", persona.name);
                Ok::<(String, String), Error>((persona.name.clone(), text))
            }
        });

        self.collect_round(calls, &pb).await
    }

    /// Drive one round's calls, bounded by the configured concurrency, and
    /// collect results in load order. The first error aborts the round and
    /// drops the remaining in-flight calls.
    async fn collect_round<I, F>(&self, calls: I, pb: &ProgressBar) -> Result<HashMap<String, String>>
    where
        I: Iterator<Item = F>,
        F: std::future::Future<Output = Result<(String, String)>>,
    {
        let in_order = stream::iter(calls).buffered(self.config.concurrency.max(1));
        futures::pin_mut!(in_order);

        let mut responses = HashMap::new();
        while let Some(result) = in_order.next().await {
            let (name, text) = result?;
            pb.inc(1);
            responses.insert(name, text);
        }

        pb.finish_and_clear();
        Ok(responses)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} personas")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    }
}
