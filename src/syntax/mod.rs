//! Pattern-rule syntax highlighting
//!
//! This module provides the highlighting core:
//! - Rules and language definitions
//! - The registry that resolves a language to its ordered rule list
//! - The match engine and the placeholder store it writes into
//! - Styles for terminal output

mod style;
mod tokens;
mod rules;
mod language;
mod registry;
mod store;
mod markup;
mod engine;
mod loader;
mod builtin;

pub use style::{Color, Style};
pub use tokens::TokenType;
pub use rules::{Flags, GroupAction, Pattern, Rule, RuleAction};
pub use language::LanguageDefinition;
pub use registry::Registry;
pub use store::{placeholder_token, Fragment, PlaceholderId, ReplacementStore, Slot};
pub use markup::{class_list, escape_html, unescape_html, Node};
pub use engine::{Engine, DEFAULT_MAX_DEPTH};
pub use loader::{load_language_dir, load_language_file, parse_language};
