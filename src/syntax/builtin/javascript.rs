//! JavaScript language definition

use super::generic::function_call;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

/// Create JavaScript language definition
pub fn javascript_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("javascript").with_base("generic");
    lang.add_extension("js");
    lang.add_extension("mjs");
    lang.add_extension("cjs");
    lang.add_extension("jsx");
    lang.add_alias("js");

    lang.add_rule(Rule::tag("string.template", r"`(?:[^`\\]|\\[\s\S])*`"));

    lang.add_rule(Rule::groups(
        r"\b(function)\s*(\w*)\s*\(",
        [
            (1, GroupAction::tag("storage.function")),
            (2, GroupAction::tag("entity.name.function")),
        ],
    ));
    lang.add_rule(Rule::groups(
        r"\b(class)\s+(\w+)(?:\s+(extends)\s+(\w+))?",
        [
            (1, GroupAction::tag("storage.class")),
            (2, GroupAction::tag("entity.name.class")),
            (3, GroupAction::tag("storage.modifier.extends")),
            (4, GroupAction::tag("entity.other.inherited-class")),
        ],
    ));

    let keywords = r"\b(?:async|await|debugger|export|from|in|instanceof|let|of|super|typeof|with|yield)\b";
    lang.add_rule(Rule::tag("keyword", keywords));
    lang.add_rule(Rule::tag("variable.language.this", r"\bthis\b"));
    lang.add_rule(Rule::tag("constant.language", r"\b(?:undefined|NaN|Infinity)\b"));
    lang.add_rule(Rule::tag(
        "support.class",
        r"\b(?:console|window|document|Math|JSON|Promise|Object|Array|Map|Set)\b",
    ));
    lang.add_rule(Rule::tag("storage.function.arrow", r"=&gt;"));
    lang.add_rule(function_call());

    lang
}
