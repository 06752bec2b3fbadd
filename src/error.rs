//! Error types for spectral

use thiserror::Error;

/// Result type alias for highlighting operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting error types
///
/// Every error is scoped to the block (or registration call) that raised it.
/// None of them poison the registry or other blocks in flight.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown base language: {0}")]
    UnknownBaseLanguage(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Pattern `{pattern}` failed: {reason}")]
    PatternExecution { pattern: String, reason: String },

    #[error("Placeholder #{0} is missing from the replacement store")]
    ResolutionIntegrity(u32),

    #[error("Invalid language file {path}: {reason}")]
    InvalidLanguageFile { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Highlight was cancelled before completing")]
    Cancelled,
}
