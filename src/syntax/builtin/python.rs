//! Python language definition

use super::multi_line;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

/// Create Python language definition
pub fn python_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("python");
    lang.add_extension("py");
    lang.add_extension("pyw");
    lang.add_extension("pyi");
    lang.add_alias("py");

    // Triple-quoted strings (docstrings) span lines
    lang.add_rule(Rule::tag("string.doc", r#"(?i:[rbuf]{0,2})(?:"""[\s\S]*?"""|'''[\s\S]*?''')"#));
    lang.add_rule(Rule::tag(
        "string",
        r#"(?i:[rbuf]{0,2})(?:"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')"#,
    ));
    // After strings, so a '#' inside quotes is not a comment
    lang.add_rule(Rule::tag("comment", multi_line(r"#.*$")));

    // Decorators
    lang.add_rule(Rule::tag("meta.decorator", multi_line(r"^[ \t]*@[\w.]+")));

    lang.add_rule(Rule::groups(
        r"\b(def|class)\s+(\w+)",
        [
            (1, GroupAction::tag("storage")),
            (2, GroupAction::tag("entity.name")),
        ],
    ));

    // Keywords
    let keywords = r"\b(?:False|None|True|and|as|assert|async|await|break|continue|del|elif|else|except|finally|for|from|global|if|import|in|is|lambda|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b";
    lang.add_rule(Rule::tag("keyword", keywords));

    // self/cls
    lang.add_rule(Rule::tag("variable.language", r"\b(?:self|cls)\b"));

    // Built-in functions
    let builtins = r"\b(?:abs|all|any|ascii|bin|bool|bytearray|bytes|callable|chr|classmethod|compile|complex|delattr|dict|dir|divmod|enumerate|eval|exec|filter|float|format|frozenset|getattr|globals|hasattr|hash|help|hex|id|input|int|isinstance|issubclass|iter|len|list|locals|map|max|memoryview|min|next|object|oct|open|ord|pow|print|property|range|repr|reversed|round|set|setattr|slice|sorted|staticmethod|str|sum|super|tuple|type|vars|zip)\b";
    lang.add_rule(Rule::tag("support.function", builtins));

    // Numbers
    lang.add_rule(Rule::tag(
        "constant.numeric",
        r"\b(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?j?)\b",
    ));

    lang.add_rule(Rule::tag(
        "keyword.operator",
        r"(?:[+\-*/%|^!=@~]|&amp;|&lt;|&gt;)+",
    ));

    lang
}
