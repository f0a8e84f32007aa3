//! Error types for the panel workflow.
//!
//! Only per-file parse errors are recovered (the persona store logs and
//! skips the file); every other variant aborts the entire run and surfaces
//! to the caller unmodified. No partial run result is ever returned.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for panel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the panel workflow.
#[derive(Debug, Error)]
pub enum Error {
    /// The persona directory is missing or inaccessible.
    #[error("persona directory not found: {}", path.display())]
    PersonaDirNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single persona file failed to parse. Recovered by the store:
    /// logged and skipped, never fatal on its own.
    #[error("failed to parse persona file {}: {source}", path.display())]
    PersonaParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A persona record has an empty required field. Fatal: the prompt
    /// formatter refuses to produce a degraded prompt.
    #[error("persona '{name}' has an empty required field: {field}")]
    PersonaValidation { name: String, field: &'static str },

    /// An upstream completion call failed. Fatal, no retry.
    #[error("completion request failed: {message}")]
    Completion { message: String },

    /// Zero personas were available after sampling.
    #[error("no personas available in {}", path.display())]
    EmptyPersonaSet { path: PathBuf },
}

impl Error {
    /// Shorthand for a completion failure with a formatted message.
    pub fn completion(message: impl Into<String>) -> Self {
        Error::Completion {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PersonaValidation {
            name: "Alice".to_string(),
            field: "objectives",
        };
        assert_eq!(
            err.to_string(),
            "persona 'Alice' has an empty required field: objectives"
        );

        let err = Error::completion("boom");
        assert_eq!(err.to_string(), "completion request failed: boom");
    }
}
