//! Rust language definition

use super::multi_line;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

/// Create Rust language definition
pub fn rust_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("rust");
    lang.add_extension("rs");
    lang.add_alias("rs");

    // Block comments (can nest, but we'll handle simple case)
    lang.add_rule(Rule::tag("comment", r"/\*[\s\S]*?\*/"));
    // Doc comments before line comments, same prefix
    lang.add_rule(Rule::tag("comment.doc", multi_line(r"//[/!].*$")));
    lang.add_rule(Rule::tag("comment", multi_line(r"//.*$")));

    // Character literals, before escapes so '\n' stays one token
    lang.add_rule(Rule::tag("string.char", r"b?'(?:[^'\\\n]|\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{1,6}\}|.))'"));
    // Lifetimes (after char to avoid conflict)
    lang.add_rule(Rule::tag("storage.modifier.lifetime", r"'\w+"));

    // Escapes get tagged first and then wrapped by the string rule
    lang.add_rule(Rule::tag(
        "constant.character.escape",
        r#"\\(?:[nrt0\\'"]|x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{1,6}\})"#,
    ));
    lang.add_rule(Rule::tag("string", r##"b?r(#*)"[\s\S]*?"#*|b?"(?:[^"\\]|\\[\s\S])*""##));

    // Attributes
    lang.add_rule(Rule::tag("meta.attribute", r"#!?\[[^\]]*\]"));

    // Macros (ending with !)
    lang.add_rule(Rule::tag("support.macro", r"\b[a-z_]\w*!"));

    // Function definitions
    lang.add_rule(Rule::groups(
        r"\b(fn)\s+(\w+)",
        [
            (1, GroupAction::tag("storage.function")),
            (2, GroupAction::tag("entity.name.function")),
        ],
    ));

    // Keywords
    let keywords = r"\b(?:as|async|await|break|const|continue|crate|dyn|else|enum|extern|false|fn|for|if|impl|in|let|loop|match|mod|move|mut|pub|ref|return|self|Self|static|struct|super|trait|true|type|union|unsafe|use|where|while)\b";
    lang.add_rule(Rule::tag("keyword", keywords));

    // Built-in types
    let types = r"\b(?:bool|char|str|u8|u16|u32|u64|u128|usize|i8|i16|i32|i64|i128|isize|f32|f64|String|Vec|Box|Rc|Arc|Option|Result|Some|None|Ok|Err)\b";
    lang.add_rule(Rule::tag("storage.type", types));

    // Type names (capitalized identifiers)
    lang.add_rule(Rule::tag("entity.name.type", r"\b[A-Z][a-zA-Z0-9_]*\b"));

    // Numbers: hex, binary, octal, then decimal with optional suffix
    lang.add_rule(Rule::tag(
        "constant.numeric",
        r"\b(?:0x[0-9a-fA-F_]+|0b[01_]+|0o[0-7_]+|\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?(?:u8|u16|u32|u64|u128|usize|i8|i16|i32|i64|i128|isize|f32|f64)?)\b",
    ));

    // Operators
    lang.add_rule(Rule::tag(
        "keyword.operator",
        r"(?:[+\-*/%|^!=@]|&amp;|&lt;|&gt;)+",
    ));

    lang
}

#[cfg(test)]
mod tests {
    use super::super::highlight;

    #[test]
    fn test_rust_fn_definition() {
        assert_eq!(
            highlight("rust", "pub fn main() {}"),
            "<span class=\"keyword\">pub</span> <span class=\"storage function\">fn</span> <span class=\"entity name function\">main</span>() {}"
        );
    }

    #[test]
    fn test_rust_string_with_escape() {
        assert_eq!(
            highlight("rust", r#"let s = "a\n";"#),
            r#"<span class="keyword">let</span> s <span class="keyword operator">=</span> <span class="string">"a<span class="constant character escape">\n</span>"</span>;"#
        );
    }

    #[test]
    fn test_rust_comment() {
        assert_eq!(
            highlight("rust", "// let x = 1;"),
            "<span class=\"comment\">// let x = 1;</span>"
        );
    }

    #[test]
    fn test_rust_macro_and_lifetime() {
        let html = highlight("rust", "fn f<'a>(s: &'a str) { println!(\"{}\", s) }");
        assert!(html.contains("<span class=\"storage modifier lifetime\">'a</span>"));
        assert!(html.contains("<span class=\"support macro\">println!</span>"));
    }
}
