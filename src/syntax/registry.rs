//! Language registry
//!
//! The Registry owns every language definition, the generic rules that
//! apply to all languages, and the alias table. It resolves a language
//! name to the flattened, priority-ordered rule list the engine runs.
//!
//! There is no internal locking. The highlighter shares one registry on a
//! single thread; mutating a language while a block that resolves the same
//! language is in flight leaves it unspecified which rules that block sees.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use super::builtin;
use super::language::LanguageDefinition;
use super::rules::Rule;
use crate::error::{HighlightError, Result};

/// Registry of languages, generic rules and aliases
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Rules registered without a language, prepended to every language
    generic: Vec<Rc<Rule>>,
    /// Loaded language definitions, by canonical name
    languages: HashMap<String, LanguageDefinition>,
    /// Alternate name to canonical name (one hop only)
    aliases: HashMap<String, String>,
    /// Extension to language name mapping
    extension_map: HashMap<String, String>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in languages loaded
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for lang in builtin::all_languages() {
            // Built-ins are ordered so every base precedes its dependants
            if let Err(e) = registry.add_language(lang) {
                debug!("skipping built-in language: {}", e);
            }
        }
        registry
    }

    /// Register or append rules
    ///
    /// With no name the rules become generic rules. A given base must
    /// already be registered; on failure the registry is left unchanged.
    pub fn extend(&mut self, name: Option<&str>, rules: Vec<Rule>, base: Option<&str>) -> Result<()> {
        let name = match name {
            Some(name) => self.canonical_name(name).to_string(),
            None => {
                self.generic.extend(rules.into_iter().map(Rc::new));
                return Ok(());
            }
        };
        let base = self.checked_base(base)?;

        let lang = self
            .languages
            .entry(name.clone())
            .or_insert_with(|| LanguageDefinition::new(&name));
        if base.is_some() {
            lang.base = base;
        }
        lang.rules.extend(rules.into_iter().map(Rc::new));
        debug!(language = %name, rules = lang.rules.len(), "extended language");
        Ok(())
    }

    /// Register rules for a language, discarding its existing own rules
    pub fn replace(&mut self, name: &str, rules: Vec<Rule>, base: Option<&str>) -> Result<()> {
        let name = self.canonical_name(name).to_string();
        let base = self.checked_base(base)?;

        let lang = self
            .languages
            .entry(name.clone())
            .or_insert_with(|| LanguageDefinition::new(&name));
        lang.base = base;
        lang.rules = rules.into_iter().map(Rc::new).collect();
        debug!(language = %name, rules = lang.rules.len(), "replaced language");
        Ok(())
    }

    /// Add a full language definition, merging into any existing one
    pub fn add_language(&mut self, lang: LanguageDefinition) -> Result<()> {
        let name = self.canonical_name(&lang.name).to_string();
        let base = self.checked_base(lang.base.as_deref())?;

        for ext in &lang.extensions {
            self.extension_map.insert(ext.to_lowercase(), name.clone());
        }
        for alias in &lang.aliases {
            self.add_alias(alias, &name);
        }

        let entry = self
            .languages
            .entry(name.clone())
            .or_insert_with(|| LanguageDefinition::new(&name));
        if base.is_some() {
            entry.base = base;
        }
        entry.extensions.extend(lang.extensions);
        entry.aliases.extend(lang.aliases);
        entry.rules.extend(lang.rules);
        Ok(())
    }

    /// Remove a language's own rules
    ///
    /// Generic rules are unaffected. Returns whether the language existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let name = self.canonical_name(name).to_string();
        self.extension_map.retain(|_, lang| *lang != name);
        self.languages.remove(&name).is_some()
    }

    /// Register a one-hop redirect from `alias` to `canonical`
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        if alias != canonical {
            self.aliases.insert(alias.to_string(), canonical.to_string());
        }
    }

    /// Follow at most one alias hop
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(|s| s.as_str()).unwrap_or(name)
    }

    /// Resolve a language name to its effective ordered rule list
    ///
    /// Generic rules come first, then the base chain (base before
    /// derived), then the language's own rules.
    pub fn resolve(&self, name: &str) -> Result<Vec<Rc<Rule>>> {
        let canonical = self.canonical_name(name);
        if !self.languages.contains_key(canonical) {
            return Err(HighlightError::UnknownLanguage(name.to_string()));
        }

        let mut rules = self.generic.clone();
        let mut visited = Vec::new();
        self.collect_rules(canonical, &mut visited, &mut rules);
        Ok(rules)
    }

    /// Resolve a language, falling back to generic rules for unknown names
    pub fn effective_rules(&self, name: &str) -> Vec<Rc<Rule>> {
        match self.resolve(name) {
            Ok(rules) => rules,
            Err(e) => {
                debug!("{}; using generic rules only", e);
                self.generic.clone()
            }
        }
    }

    /// Detect language from filename
    pub fn detect_language(&self, filename: &Path) -> Option<&str> {
        let ext = filename.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(&ext).map(|s| s.as_str())
    }

    /// Get a language definition by name (aliases followed)
    pub fn get_language(&self, name: &str) -> Option<&LanguageDefinition> {
        self.languages.get(self.canonical_name(name))
    }

    /// Whether a language (or alias of one) is registered
    pub fn contains(&self, name: &str) -> bool {
        self.get_language(name).is_some()
    }

    /// List available languages
    pub fn list_languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.languages.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    fn checked_base(&self, base: Option<&str>) -> Result<Option<String>> {
        match base {
            None => Ok(None),
            Some(base) => {
                let canonical = self.canonical_name(base);
                if self.languages.contains_key(canonical) {
                    Ok(Some(canonical.to_string()))
                } else {
                    Err(HighlightError::UnknownBaseLanguage(base.to_string()))
                }
            }
        }
    }

    /// Append the rules of `name`, base chain first
    ///
    /// A language contributes at most once, which also cuts base cycles.
    fn collect_rules(&self, name: &str, visited: &mut Vec<String>, out: &mut Vec<Rc<Rule>>) {
        if visited.iter().any(|v| v == name) {
            return;
        }
        visited.push(name.to_string());

        if let Some(lang) = self.languages.get(name) {
            if let Some(base) = &lang.base {
                self.collect_rules(self.canonical_name(base), visited, out);
            }
            out.extend(lang.rules.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(rules: &[Rc<Rule>]) -> Vec<&str> {
        rules.iter().map(|r| r.pattern.source()).collect()
    }

    #[test]
    fn test_extend_appends() {
        let mut registry = Registry::new();
        registry.extend(Some("lang"), vec![Rule::tag("a", "a")], None).unwrap();
        registry.extend(Some("lang"), vec![Rule::tag("b", "b")], None).unwrap();

        let rules = registry.resolve("lang").unwrap();
        assert_eq!(sources(&rules), vec!["a", "b"]);
    }

    #[test]
    fn test_replace_discards_existing() {
        let mut registry = Registry::new();
        registry.extend(Some("lang"), vec![Rule::tag("a", "a")], None).unwrap();
        registry.replace("lang", vec![Rule::tag("b", "b")], None).unwrap();

        assert_eq!(sources(&registry.resolve("lang").unwrap()), vec!["b"]);
    }

    #[test]
    fn test_generic_rules_come_first() {
        let mut registry = Registry::new();
        registry.extend(Some("lang"), vec![Rule::tag("own", "own")], None).unwrap();
        registry.extend(None, vec![Rule::tag("generic", "generic")], None).unwrap();

        assert_eq!(sources(&registry.resolve("lang").unwrap()), vec!["generic", "own"]);
    }

    #[test]
    fn test_base_rules_take_priority() {
        let mut registry = Registry::new();
        registry.extend(Some("base"), vec![Rule::tag("b", "base")], None).unwrap();
        registry.extend(Some("derived"), vec![Rule::tag("d", "derived")], Some("base")).unwrap();
        // Later additions to the base still show up in the derived language
        registry.extend(Some("base"), vec![Rule::tag("b2", "base2")], None).unwrap();

        assert_eq!(
            sources(&registry.resolve("derived").unwrap()),
            vec!["base", "base2", "derived"]
        );
    }

    #[test]
    fn test_unknown_base_leaves_registry_unchanged() {
        let mut registry = Registry::new();
        let result = registry.extend(Some("lang"), vec![Rule::tag("a", "a")], Some("missing"));

        assert!(matches!(result, Err(HighlightError::UnknownBaseLanguage(ref b)) if b == "missing"));
        assert!(!registry.contains("lang"));
    }

    #[test]
    fn test_unknown_language() {
        let mut registry = Registry::new();
        registry.extend(None, vec![Rule::tag("g", "g")], None).unwrap();

        assert!(matches!(registry.resolve("nope"), Err(HighlightError::UnknownLanguage(_))));
        assert_eq!(sources(&registry.effective_rules("nope")), vec!["g"]);
    }

    #[test]
    fn test_remove_keeps_generic() {
        let mut registry = Registry::new();
        registry.extend(None, vec![Rule::tag("g", "g")], None).unwrap();
        registry.extend(Some("lang"), vec![Rule::tag("a", "a")], None).unwrap();

        assert!(registry.remove("lang"));
        assert!(!registry.remove("lang"));
        assert_eq!(sources(&registry.effective_rules("lang")), vec!["g"]);
    }

    #[test]
    fn test_alias_single_hop() {
        let mut registry = Registry::new();
        registry.extend(Some("canonical"), vec![Rule::tag("a", "a")], None).unwrap();
        registry.add_alias("first", "canonical");
        registry.add_alias("second", "first");

        assert_eq!(sources(&registry.resolve("first").unwrap()), vec!["a"]);
        // Alias chains are not followed
        assert!(registry.resolve("second").is_err());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut registry = Registry::new();
        registry.extend(None, vec![Rule::tag("g", "g")], None).unwrap();
        registry.extend(Some("lang"), vec![Rule::tag("a", "a"), Rule::tag("b", "b")], None).unwrap();

        let first = registry.resolve("lang").unwrap();
        let second = registry.resolve("lang").unwrap();
        assert_eq!(first.len(), second.len());
        assert!(first.iter().zip(&second).all(|(a, b)| Rc::ptr_eq(a, b)));
    }

    #[test]
    fn test_base_cycle_is_cut() {
        let mut registry = Registry::new();
        registry.extend(Some("a"), vec![Rule::tag("a", "a")], None).unwrap();
        registry.extend(Some("b"), vec![Rule::tag("b", "b")], Some("a")).unwrap();
        registry.extend(Some("a"), vec![], Some("b")).unwrap();

        assert_eq!(sources(&registry.resolve("a").unwrap()), vec!["b", "a"]);
    }

    #[test]
    fn test_detect_language() {
        let registry = Registry::with_builtins();

        assert_eq!(registry.detect_language(Path::new("main.rs")), Some("rust"));
        assert_eq!(registry.detect_language(Path::new("test.py")), Some("python"));
        assert_eq!(registry.detect_language(Path::new("index.HTML")), Some("html"));
        assert_eq!(registry.detect_language(Path::new("main.c")), Some("c"));
        assert_eq!(registry.detect_language(Path::new("no_extension")), None);
    }

    #[test]
    fn test_builtin_aliases() {
        let registry = Registry::with_builtins();
        assert!(registry.contains("js"));
        assert_eq!(registry.canonical_name("py"), "python");
        assert!(registry.list_languages().contains(&"css"));
    }
}
