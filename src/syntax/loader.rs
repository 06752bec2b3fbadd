//! TOML language files
//!
//! A language file describes one language as data:
//!
//! ```text
//! name = "ini"
//! base = "generic"            # optional
//! extensions = ["ini", "cfg"]
//! aliases = ["conf"]
//!
//! [[rule]]
//! tag = "comment"
//! pattern = ';.*$'
//! flags = "gm"                # defaults to "g"
//!
//! [[rule]]
//! pattern = '^(\[)(.*?)(\])'
//! flags = "gm"
//! [rule.groups]
//! 1 = "punctuation"
//! 2 = { rules = [{ tag = "entity.name.section", pattern = '\w+' }] }
//! 3 = { language = "other" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::language::LanguageDefinition;
use super::registry::Registry;
use super::rules::{Flags, GroupAction, Pattern, Rule};
use crate::error::{HighlightError, Result};

/// Parse a language definition from TOML source
///
/// `origin` names the source in error messages.
pub fn parse_language(source: &str, origin: &str) -> Result<LanguageDefinition> {
    let invalid = |reason: String| HighlightError::InvalidLanguageFile {
        path: origin.to_string(),
        reason,
    };

    let table: toml::Table = source
        .parse()
        .map_err(|e: toml::de::Error| invalid(e.message().to_string()))?;

    let name = table
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("missing `name`".to_string()))?;
    let mut lang = LanguageDefinition::new(name);

    if let Some(base) = table.get("base") {
        let base = base.as_str().ok_or_else(|| invalid("`base` must be a string".to_string()))?;
        lang = lang.with_base(base);
    }
    for ext in string_list(&table, "extensions").map_err(invalid)? {
        lang.add_extension(ext);
    }
    for alias in string_list(&table, "aliases").map_err(invalid)? {
        lang.add_alias(alias);
    }

    if let Some(rules) = table.get("rule") {
        let rules = rules
            .as_array()
            .ok_or_else(|| invalid("`rule` must be an array of tables".to_string()))?;
        for (idx, value) in rules.iter().enumerate() {
            let rule = parse_rule(value).map_err(|e| invalid(format!("rule {}: {}", idx + 1, e)))?;
            lang.add_rule(rule);
        }
    }

    Ok(lang)
}

/// Load a language definition from a file
pub fn load_language_file(path: &Path) -> Result<LanguageDefinition> {
    let source = fs::read_to_string(path)?;
    parse_language(&source, &path.display().to_string())
}

/// Load every `*.toml` language file in a directory into the registry
///
/// Files are loaded in name order; a file whose base language is not
/// loaded yet is retried after the others. Returns the number of
/// languages added.
pub fn load_language_dir(registry: &mut Registry, dir: &Path) -> Result<usize> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut pending = Vec::with_capacity(paths.len());
    for path in &paths {
        pending.push(load_language_file(path)?);
    }

    let mut loaded = 0;
    while !pending.is_empty() {
        let before = pending.len();
        let mut waiting = Vec::new();
        for lang in pending {
            let ready = lang.base.as_deref().map_or(true, |base| registry.contains(base));
            if ready {
                debug!(language = %lang.name, "loaded language file");
                registry.add_language(lang)?;
                loaded += 1;
            } else {
                waiting.push(lang);
            }
        }
        if waiting.len() == before {
            for lang in &waiting {
                warn!(
                    language = %lang.name,
                    base = lang.base.as_deref().unwrap_or_default(),
                    "base language never loaded"
                );
            }
            let base = waiting[0].base.clone().unwrap_or_default();
            return Err(HighlightError::UnknownBaseLanguage(base));
        }
        pending = waiting;
    }

    Ok(loaded)
}

fn string_list<'a>(table: &'a toml::Table, key: &str) -> std::result::Result<Vec<&'a str>, String> {
    match table.get(key) {
        None => Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .and_then(|items| items.iter().map(|v| v.as_str()).collect::<Option<Vec<_>>>())
            .ok_or_else(|| format!("`{}` must be an array of strings", key)),
    }
}

fn parse_rule(value: &toml::Value) -> std::result::Result<Rule, String> {
    let table = value.as_table().ok_or("rule must be a table")?;
    let source = table
        .get("pattern")
        .and_then(|v| v.as_str())
        .ok_or("missing `pattern`")?;

    let flags = match table.get("flags") {
        None => Flags::default(),
        Some(v) => {
            let flags = v.as_str().ok_or("`flags` must be a string")?;
            Flags::parse(flags).ok_or_else(|| format!("unknown flag in {:?}", flags))?
        }
    };
    let pattern = Pattern::with_flags(source, flags);

    match (table.get("tag"), table.get("groups")) {
        (Some(tag), None) => {
            let tag = tag.as_str().ok_or("`tag` must be a string")?;
            Ok(Rule::tag(tag, pattern))
        }
        (None, Some(groups)) => {
            let groups = groups.as_table().ok_or("`groups` must be a table")?;
            let mut actions = Vec::with_capacity(groups.len());
            for (key, action) in groups {
                let idx: usize = key
                    .parse()
                    .map_err(|_| format!("group key {:?} is not an index", key))?;
                actions.push((idx, parse_group_action(action)?));
            }
            Ok(Rule::groups(pattern, actions))
        }
        (Some(_), Some(_)) => Err("rule has both `tag` and `groups`".to_string()),
        (None, None) => Err("rule needs `tag` or `groups`".to_string()),
    }
}

fn parse_group_action(value: &toml::Value) -> std::result::Result<GroupAction, String> {
    if let Some(tag) = value.as_str() {
        return Ok(GroupAction::tag(tag));
    }
    let table = value.as_table().ok_or("group must be a string or a table")?;

    if let Some(tag) = table.get("tag").and_then(|v| v.as_str()) {
        Ok(GroupAction::tag(tag))
    } else if let Some(language) = table.get("language").and_then(|v| v.as_str()) {
        Ok(GroupAction::language(language))
    } else if let Some(rules) = table.get("rules").and_then(|v| v.as_array()) {
        let rules = rules.iter().map(parse_rule).collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(GroupAction::rules(rules))
    } else {
        Err("group table needs `tag`, `language` or `rules`".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rules::RuleAction;

    const INI: &str = r#"
name = "ini"
extensions = ["ini", "cfg"]
aliases = ["conf"]

[[rule]]
tag = "comment"
pattern = ';.*$'
flags = "gm"

[[rule]]
pattern = '^(\[)(.*?)(\])'
flags = "gm"
[rule.groups]
1 = "punctuation"
2 = { rules = [{ tag = "entity.name.section", pattern = '\w+' }] }
3 = { language = "other" }
"#;

    #[test]
    fn test_parse_language() {
        let lang = parse_language(INI, "ini.toml").unwrap();
        assert_eq!(lang.name, "ini");
        assert_eq!(lang.extensions, vec!["ini", "cfg"]);
        assert_eq!(lang.aliases, vec!["conf"]);
        assert_eq!(lang.rules.len(), 2);

        let comment = &lang.rules[0];
        assert!(comment.pattern.flags().multi_line);
        assert!(matches!(comment.action, RuleAction::Tag(ref t) if t == "comment"));

        match &lang.rules[1].action {
            RuleAction::Groups(groups) => {
                assert!(matches!(groups[&1], GroupAction::Tag(ref t) if t == "punctuation"));
                assert!(matches!(groups[&2], GroupAction::Rules(ref r) if r.len() == 1));
                assert!(matches!(groups[&3], GroupAction::Language(ref l) if l == "other"));
            }
            RuleAction::Tag(_) => panic!("expected group rule"),
        }
    }

    #[test]
    fn test_default_flags_are_global() {
        let lang = parse_language("name = \"x\"\n[[rule]]\ntag = \"a\"\npattern = \"a\"", "x").unwrap();
        assert!(lang.rules[0].pattern.is_global());
    }

    #[test]
    fn test_rule_with_tag_and_groups_is_rejected() {
        let source = r#"
name = "bad"
[[rule]]
tag = "a"
pattern = "(a)"
groups = { 1 = "b" }
"#;
        match parse_language(source, "bad.toml") {
            Err(HighlightError::InvalidLanguageFile { path, reason }) => {
                assert_eq!(path, "bad.toml");
                assert!(reason.contains("both"));
            }
            other => panic!("expected invalid file, got {:?}", other.map(|l| l.name)),
        }
    }

    #[test]
    fn test_missing_name() {
        assert!(parse_language("[[rule]]\ntag = \"a\"\npattern = \"a\"", "x").is_err());
    }

    #[test]
    fn test_unknown_flag() {
        let source = "name = \"x\"\n[[rule]]\ntag = \"a\"\npattern = \"a\"\nflags = \"gz\"";
        assert!(parse_language(source, "x").is_err());
    }

    #[test]
    fn test_load_dir_orders_by_base() {
        let dir = tempfile::tempdir().unwrap();
        // "a-derived" sorts first but depends on "z-base"
        fs::write(
            dir.path().join("a-derived.toml"),
            "name = \"derived\"\nbase = \"zbase\"\nextensions = [\"drv\"]\n[[rule]]\ntag = \"d\"\npattern = \"d\"",
        )
        .unwrap();
        fs::write(
            dir.path().join("z-base.toml"),
            "name = \"zbase\"\n[[rule]]\ntag = \"b\"\npattern = \"b\"",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = Registry::new();
        assert_eq!(load_language_dir(&mut registry, dir.path()).unwrap(), 2);

        let rules = registry.resolve("derived").unwrap();
        let sources: Vec<_> = rules.iter().map(|r| r.pattern.source()).collect();
        assert_eq!(sources, vec!["b", "d"]);
        assert_eq!(registry.detect_language(Path::new("x.drv")), Some("derived"));
    }

    #[test]
    fn test_load_dir_missing_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.toml"), "name = \"x\"\nbase = \"nowhere\"").unwrap();

        let mut registry = Registry::new();
        assert!(matches!(
            load_language_dir(&mut registry, dir.path()),
            Err(HighlightError::UnknownBaseLanguage(ref b)) if b == "nowhere"
        ));
    }
}
