//! Output markup
//!
//! The resolved span tree and its HTML rendering. Tags become
//! `<span class="...">` elements; a dotted tag name such as
//! `constant.numeric` yields one class per segment.

/// A node of the resolved span tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal (already escaped) source text
    Text(String),
    /// A tagged span
    Span { tag: String, children: Vec<Node> },
    /// Untagged sequence, e.g. a match whose groups carry the tags
    Group(Vec<Node>),
}

impl Node {
    /// Render as HTML markup, appending `global_class` to every span
    pub fn to_html(&self, global_class: Option<&str>) -> String {
        let mut out = String::new();
        self.write_html(&mut out, global_class);
        out
    }

    fn write_html(&self, out: &mut String, global_class: Option<&str>) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Span { tag, children } => {
                out.push_str("<span class=\"");
                out.push_str(&class_list(tag, global_class));
                out.push_str("\">");
                for child in children {
                    child.write_html(out, global_class);
                }
                out.push_str("</span>");
            }
            Node::Group(children) => {
                for child in children {
                    child.write_html(out, global_class);
                }
            }
        }
    }
}

/// Build the class attribute for a tag name
pub fn class_list(tag: &str, global_class: Option<&str>) -> String {
    let mut classes = tag.replace('.', " ");
    if let Some(global) = global_class.filter(|g| !g.is_empty()) {
        classes.push(' ');
        classes.push_str(global);
    }
    classes
}

/// Escape `&`, `<` and `>` the way rule patterns expect their input
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Undo `escape_html`, for display surfaces that are not HTML
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}
