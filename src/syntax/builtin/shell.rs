//! Shell script language definition

use super::multi_line;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

/// Create shell language definition
pub fn shell_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("shell");
    lang.add_extension("sh");
    lang.add_extension("bash");
    lang.add_extension("zsh");
    lang.add_alias("sh");
    lang.add_alias("bash");
    lang.add_alias("zsh");

    lang.add_rule(Rule::tag("meta.shebang", multi_line(r"\A#!.*$")));

    // Single quotes first: nothing expands inside them
    lang.add_rule(Rule::tag("string.single", r"'[^']*'"));
    lang.add_rule(Rule::tag("string", r#""(?:[^"\\]|\\[\s\S])*""#));

    // `#` only starts a comment at the start of a word
    lang.add_rule(Rule::groups(
        multi_line(r"(?:^|[ \t;])(#.*)$"),
        [(1, GroupAction::tag("comment"))],
    ));

    lang.add_rule(Rule::tag(
        "variable",
        r"\$(?:\{[^}]*\}|\w+|[@#?$!*-])",
    ));

    lang.add_rule(Rule::groups(
        multi_line(r"^[ \t]*(?:(function)[ \t]+)?(\w+)[ \t]*\(\)"),
        [
            (1, GroupAction::tag("storage.function")),
            (2, GroupAction::tag("entity.name.function")),
        ],
    ));

    let keywords = r"\b(?:if|then|else|elif|fi|for|while|until|do|done|case|esac|in|function|select|return|local|export|readonly)\b";
    lang.add_rule(Rule::tag("keyword", keywords));

    let builtins = r"\b(?:echo|printf|read|cd|pwd|test|source|exit|shift|set|unset|trap|eval|exec|alias)\b";
    lang.add_rule(Rule::tag("support.function", builtins));

    lang.add_rule(Rule::tag("constant.numeric", r"\b\d+\b"));
    lang.add_rule(Rule::tag("keyword.operator", r"&amp;&amp;|\|\||[|;=]"));

    lang
}
