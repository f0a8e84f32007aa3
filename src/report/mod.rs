//! Report generation for completed panel runs.
//!
//! Supports JSON (the serialized run report) and Markdown (one section per
//! persona with both rounds side by side).

use crate::models::PanelReport;
use anyhow::Result;

/// Generate a JSON report.
pub fn generate_json_report(report: &PanelReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &PanelReport) -> String {
    let mut output = String::new();

    output.push_str("# Market Panel Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_persona_sections(report));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &PanelReport) -> String {
    let metadata = &report.metadata;
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Question:** {}\n", metadata.question));
    section.push_str(&format!(
        "- **Run Date:** {}\n",
        metadata.run_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Individual Round Model:** `{}`\n",
        metadata.individual_model
    ));
    section.push_str(&format!(
        "- **Collective Round Model:** `{}`\n",
        metadata.collective_model
    ));
    section.push_str(&format!("- **Personas:** {}\n", metadata.personas_answered));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate one section per persona, covering both rounds.
fn generate_persona_sections(report: &PanelReport) -> String {
    let mut section = String::new();
    section.push_str("## Panel Responses\n\n");

    // Stable section order regardless of map iteration order
    let mut names: Vec<&String> = report.result.individual_responses.keys().collect();
    names.sort();

    for name in names {
        section.push_str(&format!("### {}\n\n", name));

        if let Some(answer) = report.result.individual_responses.get(name) {
            section.push_str("**Independent view:**\n\n");
            section.push_str(answer);
            section.push_str("\n\n");
        }

        if let Some(answer) = report.result.collective_responses.get(name) {
            section.push_str("**After hearing the panel:**\n\n");
            section.push_str(answer);
            section.push_str("\n\n");
        }
    }

    section
}

fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by MarketPanel v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunMetadata, RunResult};
    use chrono::Utc;

    fn make_report() -> PanelReport {
        let mut result = RunResult::default();
        result
            .individual_responses
            .insert("Alice".to_string(), "Rates will rise.".to_string());
        result
            .collective_responses
            .insert("Alice".to_string(), "Still think rates will rise.".to_string());

        PanelReport {
            metadata: RunMetadata {
                question: "Will rates rise?".to_string(),
                run_date: Utc::now(),
                individual_model: "gpt-4".to_string(),
                collective_model: "gpt-4o-mini".to_string(),
                personas_answered: 1,
                duration_seconds: 12.3,
            },
            result,
        }
    }

    #[test]
    fn test_markdown_report_sections() {
        let markdown = generate_markdown_report(&make_report());

        assert!(markdown.contains("# Market Panel Report"));
        assert!(markdown.contains("- **Question:** Will rates rise?"));
        assert!(markdown.contains("### Alice"));
        assert!(markdown.contains("**Independent view:**\n\nRates will rise."));
        assert!(markdown.contains("**After hearing the panel:**"));
    }

    #[test]
    fn test_json_report_keys() {
        let json = generate_json_report(&make_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["individual_responses"]["Alice"], "Rates will rise.");
        assert_eq!(
            value["collective_responses"]["Alice"],
            "Still think rates will rise."
        );
        assert_eq!(value["metadata"]["personas_answered"], 1);
    }

    #[test]
    fn test_persona_sections_sorted_by_name() {
        let mut report = make_report();
        report
            .result
            .individual_responses
            .insert("Bob".to_string(), "Down.".to_string());
        report
            .result
            .collective_responses
            .insert("Bob".to_string(), "Down still.".to_string());

        let markdown = generate_markdown_report(&report);
        let alice = markdown.find("### Alice").unwrap();
        let bob = markdown.find("### Bob").unwrap();
        assert!(alice < bob);
    }
}
