//! Language definitions for syntax highlighting
//!
//! A LanguageDefinition is a named, ordered rule list with an optional
//! base language whose rules take priority over its own.

use std::rc::Rc;

use super::rules::Rule;

/// A complete language definition
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    /// Language name (e.g., "rust", "python")
    pub name: String,
    /// File extensions (e.g., ["rs"], ["py", "pyw"])
    pub extensions: Vec<String>,
    /// Alternate names that redirect here
    pub aliases: Vec<String>,
    /// Language whose rules are applied before this one's
    pub base: Option<String>,
    /// Own rules, in priority order
    pub rules: Vec<Rc<Rule>>,
}

impl LanguageDefinition {
    /// Create a new empty language definition
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extensions: Vec::new(),
            aliases: Vec::new(),
            base: None,
            rules: Vec::new(),
        }
    }

    /// Builder: inherit from a base language
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// Add an alternate name
    pub fn add_alias(&mut self, alias: &str) {
        self.aliases.push(alias.to_string());
    }

    /// Append a rule; it gets lower priority than every rule already present
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(Rc::new(rule));
    }
}
