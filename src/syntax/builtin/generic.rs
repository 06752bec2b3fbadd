//! Generic rules shared by C-like languages

use super::{ignore_case, multi_line};
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

/// Call-site rule; derived languages add it after their own rules
pub fn function_call() -> Rule {
    Rule::groups(r"\b(\w+)\(", [(1, GroupAction::tag("function.call"))])
}

/// Create the generic base language
pub fn generic_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("generic");

    // Comments before strings so quotes inside comments stay comments
    lang.add_rule(Rule::tag("comment", multi_line(r"/\*[\s\S]*?\*/|//.*$")));
    lang.add_rule(Rule::tag("string", r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#));

    lang.add_rule(Rule::tag(
        "constant.numeric",
        ignore_case(r"\b(?:0x[\da-f]+|\d+(?:\.\d+)?(?:e[+-]?\d+)?[fd]?)\b"),
    ));
    lang.add_rule(Rule::tag("constant.language", r"\b(?:true|false|null)\b"));

    // Base rules win over derived ones, so words that derived languages
    // tag more precisely (function, class, extends, this) are left out
    let keywords = r"\b(?:and|as|break|case|catch|const|continue|default|delete|do|else|finally|for|if|import|new|or|return|static|switch|throw|try|var|void|while)\b";
    lang.add_rule(Rule::tag("keyword", keywords));

    // Escaped `<`, `>` and `&` are left to derived languages
    lang.add_rule(Rule::tag("keyword.operator", r"[+\-!|*=]+"));

    lang
}
