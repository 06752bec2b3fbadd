//! Built-in language definitions
//!
//! This module provides highlighting rules for common languages.
//! Rule patterns expect HTML-escaped input (`&lt;`, `&gt;`, `&amp;`).

mod generic;
mod c;
mod rust;
mod python;
mod javascript;
mod css;
mod html;
mod shell;

use super::language::LanguageDefinition;
use super::rules::{Flags, Pattern};

/// Get all built-in language definitions
///
/// Base languages come before the languages that inherit from them.
pub fn all_languages() -> Vec<LanguageDefinition> {
    vec![
        generic::generic_language(),
        c::c_language(),
        rust::rust_language(),
        python::python_language(),
        javascript::javascript_language(),
        css::css_language(),
        html::html_language(),
        shell::shell_language(),
    ]
}

/// Global pattern where `^` and `$` match at line boundaries
fn multi_line(source: &str) -> Pattern {
    Pattern::with_flags(
        source,
        Flags {
            multi_line: true,
            ..Flags::default()
        },
    )
}

/// Global, case-insensitive pattern
fn ignore_case(source: &str) -> Pattern {
    Pattern::with_flags(
        source,
        Flags {
            case_insensitive: true,
            ..Flags::default()
        },
    )
}

/// Run a built-in language over `text` synchronously
#[cfg(test)]
fn highlight(language: &str, text: &str) -> String {
    use super::{Engine, Fragment, Registry, ReplacementStore, DEFAULT_MAX_DEPTH};

    let registry = Registry::with_builtins();
    let rules = registry.resolve(language).unwrap();
    let mut store = ReplacementStore::new();
    let out = Engine::new(&registry, &mut store, DEFAULT_MAX_DEPTH).apply_rules(
        &rules,
        Fragment::from_text(text),
        0,
    );
    store.resolve(&out).unwrap().to_html(None)
}
