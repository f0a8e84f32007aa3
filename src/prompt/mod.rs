//! Prompt templates for the two panel rounds.
//!
//! Rendering is deterministic: the same persona and question always produce
//! the same prompt. A persona with an empty required field is rejected up
//! front rather than silently producing a degraded prompt.

use crate::error::{Error, Result};
use crate::models::Persona;

/// System prompt for the independent round.
pub const INDIVIDUAL_SYSTEM_PROMPT: &str = "You are a market participant with specific personality traits, background, and objectives.
Analyze the given question from your persona's perspective, considering their unique characteristics, experience, and goals.
Provide a detailed response that reflects your persona's viewpoint, knowledge level, and decision-making style.";

/// System prompt for the collective round.
pub const COLLECTIVE_SYSTEM_PROMPT: &str = "You are a market participant in a group discussion.
Consider both your unique perspective and the insights shared by others when forming your final opinion.
Maintain your persona's characteristics while engaging with others' viewpoints.";

/// Render a persona into its instruction block.
///
/// Fails with [`Error::PersonaValidation`] if any required field is empty.
pub fn format_persona(persona: &Persona) -> Result<String> {
    validate(persona)?;

    let objectives = persona
        .objectives
        .iter()
        .map(|obj| format!("- {}", obj))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "You are {}.\n\n\
         Background and Personality:\n{}\n\n\
         Your objectives are:\n{}\n\n\
         You are a {} with the following trader characteristics:\n{}\n\n\
         Please analyze the question from your unique perspective, considering your background, objectives, and personality traits.",
        persona.name,
        persona.persona,
        objectives,
        persona.role,
        persona.trader_type.join(", "),
    ))
}

/// Build the round-1 user prompt for a persona.
pub fn individual_prompt(persona: &Persona, question: &str) -> Result<String> {
    Ok(format!(
        "{}\n\nQuestion: {}\n\n\
         Provide your analysis and opinion on this question, staying true to your persona's characteristics.",
        format_persona(persona)?,
        question,
    ))
}

/// Build the round-2 user prompt for a persona, including the peer answers
/// from the independent round.
pub fn collective_prompt(
    persona: &Persona,
    question: &str,
    peer_responses: &[String],
) -> Result<String> {
    let peers = peer_responses
        .iter()
        .map(|resp| format!("- {}", resp))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "{}\n\nQuestion: {}\n\n\
         Other participants have shared these perspectives:\n{}\n\n\
         Considering these viewpoints and your own characteristics, provide your final analysis and opinion.",
        format_persona(persona)?,
        question,
        peers,
    ))
}

fn validate(persona: &Persona) -> Result<()> {
    let invalid = |field| Error::PersonaValidation {
        name: persona.name.clone(),
        field,
    };

    if persona.name.trim().is_empty() {
        return Err(invalid("name"));
    }
    if persona.persona.trim().is_empty() {
        return Err(invalid("persona"));
    }
    if persona.objectives.is_empty() {
        return Err(invalid("objectives"));
    }
    if persona.role.trim().is_empty() {
        return Err(invalid("role"));
    }
    if persona.trader_type.is_empty() {
        return Err(invalid("trader_type"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_persona() -> Persona {
        Persona {
            name: "Alice Wu".to_string(),
            persona: "Veteran options trader.".to_string(),
            objectives: vec!["Preserve capital".to_string(), "Beat the index".to_string()],
            role: "options trader".to_string(),
            trader_type: vec!["contrarian".to_string(), "risk-averse".to_string()],
        }
    }

    #[test]
    fn test_format_persona_template() {
        let rendered = format_persona(&make_persona()).unwrap();

        assert!(rendered.starts_with("You are Alice Wu."));
        assert!(rendered.contains("Background and Personality:\nVeteran options trader."));
        assert!(rendered.contains("- Preserve capital\n- Beat the index"));
        assert!(rendered.contains("You are a options trader"));
        assert!(rendered.contains("contrarian, risk-averse"));
    }

    #[test]
    fn test_format_persona_is_deterministic() {
        let persona = make_persona();
        assert_eq!(
            format_persona(&persona).unwrap(),
            format_persona(&persona).unwrap()
        );
    }

    #[test]
    fn test_empty_field_fails_fast() {
        let mut persona = make_persona();
        persona.objectives.clear();

        let err = format_persona(&persona).unwrap_err();
        assert!(matches!(
            err,
            Error::PersonaValidation {
                field: "objectives",
                ..
            }
        ));
    }

    #[test]
    fn test_individual_prompt_contains_question() {
        let prompt = individual_prompt(&make_persona(), "Will rates rise?").unwrap();
        assert!(prompt.contains("Question: Will rates rise?"));
        assert!(prompt.contains("staying true to your persona's characteristics"));
    }

    #[test]
    fn test_collective_prompt_lists_peers() {
        let peers = vec!["Bob says up".to_string(), "Carol says down".to_string()];
        let prompt = collective_prompt(&make_persona(), "Will rates rise?", &peers).unwrap();

        assert!(prompt.contains("Other participants have shared these perspectives:"));
        assert!(prompt.contains("- Bob says up\n- Carol says down"));
        assert!(prompt.contains("provide your final analysis and opinion"));
    }
}
