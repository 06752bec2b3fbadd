//! CSS language definition

use super::ignore_case;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

/// Rules applied inside a `{ ... }` declaration block
fn declaration_rules() -> Vec<Rule> {
    vec![
        Rule::groups(r"([\w-]+)(\s*:)", [(1, GroupAction::tag("support.property"))]),
        Rule::tag("constant.hex-color", ignore_case(r"#(?:[\da-f]{8}|[\da-f]{6}|[\da-f]{3,4})\b")),
        Rule::groups(
            r"(-?(?:\d+\.?\d*|\.\d+))(px|em|rem|%|vh|vw|ch|ex|pt|s|ms|deg|fr)?\b",
            [
                (1, GroupAction::tag("constant.numeric")),
                (2, GroupAction::tag("keyword.unit")),
            ],
        ),
        Rule::tag("keyword.important", r"!important\b"),
        Rule::groups(r"\b([\w-]+)\(", [(1, GroupAction::tag("support.function"))]),
    ]
}

/// Create CSS language definition
pub fn css_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("css");
    lang.add_extension("css");

    lang.add_rule(Rule::tag("comment", r"/\*[\s\S]*?\*/"));
    lang.add_rule(Rule::tag("string", r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#));
    lang.add_rule(Rule::tag("keyword.at-rule", r"@[\w-]+"));

    // Declaration blocks claim their content before selector rules run
    lang.add_rule(Rule::groups(
        r"\{([^{}]*)\}",
        [(1, GroupAction::rules(declaration_rules()))],
    ));

    // Selectors: whatever remains outside declaration blocks
    lang.add_rule(Rule::tag("entity.other.pseudo", r"::?[\w-]+"));
    lang.add_rule(Rule::tag("entity.name.class", r"\.[\w-]+"));
    lang.add_rule(Rule::tag("entity.name.id", r"#[\w-]+"));
    lang.add_rule(Rule::tag("entity.name.tag", r"\b[a-zA-Z][\w-]*\b"));

    lang
}
