//! HTML language definition
//!
//! Embedded `<style>` and `<script>` bodies are handed to the css and
//! javascript languages.

use super::ignore_case;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

fn attribute_rules() -> Vec<Rule> {
    vec![
        Rule::groups(
            r#"([\w:-]+)(=)("[^"]*"|'[^']*')"#,
            [
                (1, GroupAction::tag("entity.other.attribute-name")),
                (3, GroupAction::tag("string.quoted")),
            ],
        ),
        Rule::tag("entity.other.attribute-name", r"[\w:-]+"),
    ]
}

/// Rules for a single open or close tag
fn tag_rules() -> Vec<Rule> {
    vec![Rule::groups(
        r"(&lt;/?)([\w-]+)((?:[^&]|&amp;)*?)(/?&gt;)",
        [
            (1, GroupAction::tag("support.tag.open")),
            (2, GroupAction::tag("entity.name.tag")),
            (3, GroupAction::rules(attribute_rules())),
            (4, GroupAction::tag("support.tag.close")),
        ],
    )]
}

/// A block whose body belongs to another language
fn embedded(element: &str, language: &str) -> Rule {
    let pattern = format!(
        r"(&lt;{el}\b(?:[^&]|&amp;)*?&gt;)([\s\S]*?)(&lt;/{el}&gt;)",
        el = element
    );
    Rule::groups(
        ignore_case(&pattern),
        [
            (1, GroupAction::rules(tag_rules())),
            (2, GroupAction::language(language)),
            (3, GroupAction::rules(tag_rules())),
        ],
    )
}

/// Create HTML language definition
pub fn html_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("html");
    lang.add_extension("html");
    lang.add_extension("htm");
    lang.add_extension("xhtml");
    lang.add_alias("xml");

    lang.add_rule(Rule::tag("comment.html", r"&lt;!--[\s\S]*?--&gt;"));
    lang.add_rule(Rule::tag("meta.doctype", ignore_case(r"&lt;!doctype[\s\S]*?&gt;")));

    lang.add_rule(embedded("style", "css"));
    lang.add_rule(embedded("script", "javascript"));

    for rule in tag_rules() {
        lang.add_rule(rule);
    }

    lang.add_rule(Rule::tag("constant.character.entity", r"&amp;#?\w+;"));

    lang
}
