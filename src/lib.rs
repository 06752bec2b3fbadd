//! spectral - pattern-rule syntax highlighting
//!
//! Languages are ordered lists of regex rules. Each match is swapped for
//! a placeholder so later rules never re-tag it, and the placeholders are
//! expanded into nested `<span>` markup once every rule has run.
//!
//! Highlighting is cooperative: blocks yield to the tokio runtime between
//! rules, so many blocks can be highlighted on one thread.

pub mod config;
pub mod error;
pub mod highlighter;
pub mod scheduler;
pub mod syntax;
pub mod terminal;

pub use config::Config;
pub use error::{HighlightError, Result};
pub use highlighter::{CodeBlock, HighlightEvent, HighlightOptions, Highlighter, PendingHighlight};
pub use syntax::{GroupAction, LanguageDefinition, Pattern, Registry, Rule};
