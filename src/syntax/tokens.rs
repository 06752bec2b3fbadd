//! Token types for terminal highlighting
//!
//! Rule tags are dotted class names (`entity.name.function`). For ANSI
//! output each tag is folded into one of a small set of semantic token
//! types, which carry the default visual style.

use super::style::{Color, Style};

/// Semantic token types for syntax highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Source code comments (// or /* */)
    Comment,
    /// String literals ("..." or '...')
    String,
    /// Numeric literals (integers, floats)
    Number,
    /// Language keywords (if, else, fn, let, etc.)
    Keyword,
    /// Type names (String, i32, etc.)
    Type,
    /// Function names
    Function,
    /// Operators (+, -, *, /, etc.)
    Operator,
    /// Preprocessor directives (#include, #define)
    Preprocessor,
    /// Macros (println!, vec!)
    Macro,
    /// Constants and enum variants
    Constant,
    /// Special tokens (escape sequences, etc.)
    Special,
    /// Attributes (#[derive], @decorator)
    Attribute,
    /// Lifetime annotations ('a)
    Lifetime,
    /// Variables and parameters
    Variable,
    /// Markup tag names
    Label,
    /// Default/plain text (no special highlighting)
    Default,
}

/// Tag prefixes, most specific first
const CLASS_MAP: &[(&str, TokenType)] = &[
    ("comment", TokenType::Comment),
    ("string.escape", TokenType::Special),
    ("constant.character.escape", TokenType::Special),
    ("constant.character.entity", TokenType::Special),
    ("string", TokenType::String),
    ("constant.numeric", TokenType::Number),
    ("constant", TokenType::Constant),
    ("keyword.operator", TokenType::Operator),
    ("keyword", TokenType::Keyword),
    ("storage.type", TokenType::Type),
    ("storage.modifier.lifetime", TokenType::Lifetime),
    ("storage", TokenType::Keyword),
    ("meta.preprocessor", TokenType::Preprocessor),
    ("meta.attribute", TokenType::Attribute),
    ("meta.decorator", TokenType::Attribute),
    ("meta", TokenType::Special),
    ("support.macro", TokenType::Macro),
    ("support.function", TokenType::Function),
    ("support.tag", TokenType::Operator),
    ("support.type", TokenType::Type),
    ("support.class", TokenType::Type),
    ("support.property", TokenType::Variable),
    ("entity.name.function", TokenType::Function),
    ("entity.name.tag", TokenType::Label),
    ("entity.name", TokenType::Type),
    ("entity.other.attribute-name", TokenType::Attribute),
    ("entity.other.inherited-class", TokenType::Type),
    ("entity", TokenType::Type),
    ("function", TokenType::Function),
    ("variable", TokenType::Variable),
    ("escape", TokenType::Special),
];

impl TokenType {
    /// Map a dotted rule tag onto a token type
    ///
    /// A prefix matches whole segments only: `string` covers
    /// `string.quoted` but not `stringy`.
    pub fn from_class(tag: &str) -> Self {
        CLASS_MAP
            .iter()
            .find(|(prefix, _)| {
                tag.strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
            })
            .map(|(_, token_type)| *token_type)
            .unwrap_or(TokenType::Default)
    }

    /// Get the default style for this token type
    pub fn default_style(&self) -> Style {
        match self {
            TokenType::Comment => Style::fg(Color::BrightBlack).with_italic(),
            TokenType::String => Style::fg(Color::Green),
            TokenType::Number => Style::fg(Color::Cyan),
            TokenType::Keyword => Style::fg(Color::Magenta).with_bold(),
            TokenType::Type => Style::fg(Color::Yellow),
            TokenType::Function => Style::fg(Color::Blue),
            TokenType::Operator => Style::fg(Color::BrightWhite),
            TokenType::Preprocessor => Style::fg(Color::BrightMagenta),
            TokenType::Macro => Style::fg(Color::BrightCyan),
            TokenType::Constant => Style::fg(Color::BrightRed),
            TokenType::Special => Style::fg(Color::BrightYellow),
            TokenType::Attribute => Style::fg(Color::BrightBlue),
            TokenType::Lifetime => Style::fg(Color::BrightMagenta),
            TokenType::Variable => Style::fg(Color::BrightCyan),
            TokenType::Label => Style::fg(Color::Yellow).with_underline(),
            TokenType::Default => Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles_not_empty() {
        assert!(!TokenType::Comment.default_style().is_default());
        assert!(!TokenType::String.default_style().is_default());
        assert!(!TokenType::Keyword.default_style().is_default());
        assert!(TokenType::Default.default_style().is_default());
    }

    #[test]
    fn test_from_class() {
        assert_eq!(TokenType::from_class("comment"), TokenType::Comment);
        assert_eq!(TokenType::from_class("comment.doc"), TokenType::Comment);
        assert_eq!(TokenType::from_class("string.quoted"), TokenType::String);
        assert_eq!(TokenType::from_class("constant.numeric"), TokenType::Number);
        assert_eq!(TokenType::from_class("constant.language"), TokenType::Constant);
        assert_eq!(TokenType::from_class("keyword.operator"), TokenType::Operator);
        assert_eq!(TokenType::from_class("entity.name.function"), TokenType::Function);
        assert_eq!(TokenType::from_class("entity.name.class"), TokenType::Type);
        assert_eq!(TokenType::from_class("function.call"), TokenType::Function);
        assert_eq!(TokenType::from_class("storage.modifier.lifetime"), TokenType::Lifetime);
    }

    #[test]
    fn test_from_class_whole_segments() {
        assert_eq!(TokenType::from_class("stringy"), TokenType::Default);
        assert_eq!(TokenType::from_class(""), TokenType::Default);
        assert_eq!(TokenType::from_class("unknown.tag"), TokenType::Default);
    }
}
