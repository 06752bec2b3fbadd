//! Pattern rules for syntax highlighting
//!
//! This module defines the rule types used to match and tag
//! source text. A rule either tags its whole match or hands
//! individual capture groups to their own actions.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use regex::{Regex, RegexBuilder};

use crate::error::{HighlightError, Result};

/// Regex modifiers, spelled the way a pattern literal carries them (`gim`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Repeat across the whole text (`g`). Without it only the first match is tagged.
    pub global: bool,
    /// Case-insensitive matching (`i`)
    pub case_insensitive: bool,
    /// `^` and `$` match at line boundaries (`m`)
    pub multi_line: bool,
    /// `.` also matches newlines (`s`)
    pub dot_all: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            global: true,
            case_insensitive: false,
            multi_line: false,
            dot_all: false,
        }
    }
}

impl Flags {
    /// Flags with every modifier off, including `g`
    pub fn none() -> Self {
        Self {
            global: false,
            ..Self::default()
        }
    }

    /// Parse a flag string such as `"gi"`
    ///
    /// Returns None on an unknown flag character.
    pub fn parse(flags: &str) -> Option<Self> {
        let mut parsed = Self::none();
        for ch in flags.chars() {
            match ch {
                'g' => parsed.global = true,
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                _ => return None,
            }
        }
        Some(parsed)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, ch) in [
            (self.global, 'g'),
            (self.case_insensitive, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
        ] {
            if on {
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

/// A regular expression plus its modifiers
///
/// Compilation is deferred to the first match attempt, so a malformed
/// pattern only fails the rule application that uses it.
#[derive(Debug)]
pub struct Pattern {
    source: String,
    flags: Flags,
    compiled: OnceCell<std::result::Result<Regex, String>>,
}

impl Pattern {
    /// Create a global pattern
    pub fn new(source: &str) -> Self {
        Self::with_flags(source, Flags::default())
    }

    /// Create a pattern that only tags its first occurrence
    pub fn first_only(source: &str) -> Self {
        Self::with_flags(source, Flags::none())
    }

    /// Create a pattern with explicit modifiers
    pub fn with_flags(source: &str, flags: Flags) -> Self {
        Self {
            source: source.to_string(),
            flags,
            compiled: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.global
    }

    /// Get the compiled regex, compiling it on first use
    pub fn regex(&self) -> Result<&Regex> {
        let compiled = self.compiled.get_or_init(|| {
            RegexBuilder::new(&self.source)
                .case_insensitive(self.flags.case_insensitive)
                .multi_line(self.flags.multi_line)
                .dot_matches_new_line(self.flags.dot_all)
                .build()
                .map_err(|e| e.to_string())
        });
        compiled.as_ref().map_err(|reason| HighlightError::PatternExecution {
            pattern: self.source.clone(),
            reason: reason.clone(),
        })
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Pattern::new(source)
    }
}

/// What to do with one capture group
#[derive(Debug, Clone)]
pub enum GroupAction {
    /// Wrap the group in a tag
    Tag(String),
    /// Run a nested rule list over the group's text
    Rules(Vec<Rc<Rule>>),
    /// Run another language's effective rule list over the group's text
    Language(String),
}

impl GroupAction {
    pub fn tag(name: &str) -> Self {
        GroupAction::Tag(name.to_string())
    }

    pub fn rules(rules: Vec<Rule>) -> Self {
        GroupAction::Rules(rules.into_iter().map(Rc::new).collect())
    }

    pub fn language(name: &str) -> Self {
        GroupAction::Language(name.to_string())
    }
}

/// How a rule tags what it matches
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Tag the entire match
    Tag(String),
    /// Act on individual capture groups, keyed by group index
    Groups(BTreeMap<usize, GroupAction>),
}

/// A single pattern rule
///
/// Rules are applied in list order. Earlier rules claim text first.
#[derive(Debug)]
pub struct Rule {
    pub pattern: Pattern,
    pub action: RuleAction,
}

impl Rule {
    /// Create a rule tagging the whole match
    pub fn tag(tag: &str, pattern: impl Into<Pattern>) -> Self {
        Self {
            pattern: pattern.into(),
            action: RuleAction::Tag(tag.to_string()),
        }
    }

    /// Create a rule acting on capture groups
    pub fn groups(
        pattern: impl Into<Pattern>,
        groups: impl IntoIterator<Item = (usize, GroupAction)>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            action: RuleAction::Groups(groups.into_iter().collect()),
        }
    }

    /// Short label for log output
    pub fn label(&self) -> String {
        match &self.action {
            RuleAction::Tag(tag) => format!("{} /{}/{}", tag, self.pattern.source, self.pattern.flags),
            RuleAction::Groups(groups) => format!(
                "groups{:?} /{}/{}",
                groups.keys().collect::<Vec<_>>(),
                self.pattern.source,
                self.pattern.flags
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let flags = Flags::parse("gi").unwrap();
        assert!(flags.global);
        assert!(flags.case_insensitive);
        assert!(!flags.multi_line);

        let flags = Flags::parse("").unwrap();
        assert!(!flags.global);

        assert_eq!(Flags::parse("gq"), None);
    }

    #[test]
    fn test_flags_display() {
        assert_eq!(Flags::parse("mig").unwrap().to_string(), "gim");
        assert_eq!(Flags::none().to_string(), "");
    }

    #[test]
    fn test_pattern_compiles_lazily() {
        let pattern = Pattern::new(r"\d+");
        let regex = pattern.regex().unwrap();
        assert_eq!(regex.find("abc 123").map(|m| m.as_str()), Some("123"));
        assert!(pattern.is_global());
        assert!(!Pattern::first_only("x").is_global());
    }

    #[test]
    fn test_pattern_case_insensitive() {
        let pattern = Pattern::with_flags("select", Flags::parse("gi").unwrap());
        assert!(pattern.regex().unwrap().is_match("SELECT *"));
    }

    #[test]
    fn test_malformed_pattern() {
        let pattern = Pattern::new(r"(unclosed");
        match pattern.regex() {
            Err(HighlightError::PatternExecution { pattern, .. }) => {
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("expected pattern error, got {:?}", other.map(|r| r.as_str().to_string())),
        }
        // The failure is remembered, not retried
        assert!(pattern.regex().is_err());
    }

    #[test]
    fn test_rule_constructors() {
        let rule = Rule::tag("constant.numeric", r"\b\d+\b");
        assert!(matches!(rule.action, RuleAction::Tag(ref t) if t == "constant.numeric"));

        let rule = Rule::groups(
            r"(def) (\w+)",
            [(1, GroupAction::tag("keyword")), (2, GroupAction::language("python"))],
        );
        match rule.action {
            RuleAction::Groups(groups) => {
                assert_eq!(groups.len(), 2);
                assert!(matches!(groups[&2], GroupAction::Language(ref l) if l == "python"));
            }
            RuleAction::Tag(_) => panic!("expected group rule"),
        }
    }
}
