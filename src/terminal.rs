//! ANSI terminal rendering using crossterm
//!
//! Walks a resolved span tree and writes it with escape sequences,
//! mapping each tag to a [`TokenType`] style. Nested spans without a
//! style of their own inherit their parent's.

use std::io::Write;

use crossterm::{
    queue,
    style::{Attribute, Print, SetAttribute, SetForegroundColor},
};

use crate::error::Result;
use crate::syntax::{unescape_html, Node, Style, TokenType};

/// Render a span tree to `out` with ANSI styling
pub fn render_ansi<W: Write>(tree: &Node, out: &mut W) -> Result<()> {
    let mut renderer = AnsiRenderer {
        out,
        stack: vec![Style::default()],
    };
    renderer.node(tree)?;
    renderer.apply(Style::default())?;
    renderer.out.flush()?;
    Ok(())
}

struct AnsiRenderer<'w, W: Write> {
    out: &'w mut W,
    /// Active styles, innermost last
    stack: Vec<Style>,
}

impl<W: Write> AnsiRenderer<'_, W> {
    fn current(&self) -> Style {
        self.stack.last().copied().unwrap_or_default()
    }

    fn node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Text(text) => {
                queue!(self.out, Print(unescape_html(text)))?;
            }
            Node::Span { tag, children } => {
                let style = TokenType::from_class(tag).default_style();
                let style = if style.is_default() { self.current() } else { style };
                let outer = self.current();

                self.stack.push(style);
                if style != outer {
                    self.apply(style)?;
                }
                for child in children {
                    self.node(child)?;
                }
                self.stack.pop();
                if style != outer {
                    self.apply(outer)?;
                }
            }
            Node::Group(children) => {
                for child in children {
                    self.node(child)?;
                }
            }
        }
        Ok(())
    }

    /// Switch the terminal to `style` from any previous state
    fn apply(&mut self, style: Style) -> Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        if style.is_default() {
            return Ok(());
        }
        queue!(self.out, SetForegroundColor(style.fg.to_crossterm()))?;
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.italic {
            queue!(self.out, SetAttribute(Attribute::Italic))?;
        }
        if style.underline {
            queue!(self.out, SetAttribute(Attribute::Underlined))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tree: &Node) -> String {
        let mut out = Vec::new();
        render_ansi(tree, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn span(tag: &str, children: Vec<Node>) -> Node {
        Node::Span {
            tag: tag.to_string(),
            children,
        }
    }

    #[test]
    fn test_plain_text_is_unescaped() {
        let out = render(&Node::Text("a &lt; b".to_string()));
        assert!(out.starts_with("a < b"));
        assert!(!out.contains("&lt;"));
    }

    #[test]
    fn test_span_is_styled_and_reset() {
        let out = render(&Node::Group(vec![
            span("keyword", vec![Node::Text("fn".to_string())]),
            Node::Text(" main".to_string()),
        ]));
        let keyword = out.find("fn").unwrap();
        let plain = out.find(" main").unwrap();
        // Bold magenta before the keyword, a reset between the two
        assert!(out[..keyword].contains("\x1b[1m"));
        assert!(out[keyword..plain].contains("\x1b[0m"));
    }

    #[test]
    fn test_unknown_tag_inherits_parent_style() {
        let tree = span(
            "string",
            vec![span("unknown.tag", vec![Node::Text("x".to_string())])],
        );
        let nested = render(&tree);
        let flat = render(&span("string", vec![Node::Text("x".to_string())]));
        assert_eq!(nested, flat);
    }
}
