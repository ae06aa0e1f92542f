use crate::execute::ExecuteError;
use thiserror::Error;

/// Errors surfaced by extraction and rewriting
#[derive(Debug, Error)]
pub enum ParameteriseError {
    /// Language name contains characters other than word characters
    #[error("Invalid driver name: {0:?}. Driver names may only contain letters, digits and '_'")]
    InvalidDriverName(String),

    /// No driver registered under a valid name
    #[error("Unsupported language: {name}. Registered drivers: {}", .available.join(", "))]
    UnsupportedLanguage { name: String, available: Vec<String> },

    /// No code cell carries the tag and the notebook has no code cells at all
    #[error("No parameters cell found: no code cell tagged {tag:?} and no code cells to fall back on")]
    NoParametersCell { tag: String },

    /// The executor collaborator failed
    #[error("Notebook execution failed: {0}")]
    Execution(#[from] ExecuteError),
}

pub type Result<T> = std::result::Result<T, ParameteriseError>;
