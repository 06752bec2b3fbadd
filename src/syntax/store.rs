//! Placeholder bookkeeping
//!
//! While rules run, every claimed region of the working text is replaced
//! by a fixed-width placeholder token and its markup is parked in the
//! ReplacementStore. Tokens are built from private-use code points so
//! patterns rarely touch them, but identity never depends on that: each
//! Fragment records where its real placeholders sit, and resolution only
//! trusts those recorded positions. Token-shaped text in the input stays
//! literal text.

use std::ops::Range;

use super::markup::Node;
use crate::error::{HighlightError, Result};

/// Sequence id of a placeholder, in creation order
pub type PlaceholderId = u32;

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';
/// First of 16 consecutive private-use digits
const TOKEN_DIGIT_BASE: u32 = 0xE010;
const TOKEN_DIGITS: u32 = 8;

/// Render the sentinel string for a placeholder id
pub fn placeholder_token(id: PlaceholderId) -> String {
    let mut token = String::with_capacity(token_len());
    token.push(TOKEN_OPEN);
    for shift in (0..TOKEN_DIGITS).rev() {
        let nibble = (id >> (shift * 4)) & 0xF;
        // TOKEN_DIGIT_BASE + 0..16 stays inside the private-use block
        token.push(char::from_u32(TOKEN_DIGIT_BASE + nibble).unwrap_or(TOKEN_CLOSE));
    }
    token.push(TOKEN_CLOSE);
    token
}

/// Byte length of every placeholder token
pub fn token_len() -> usize {
    // Each private-use char is three bytes in UTF-8
    (TOKEN_DIGITS as usize + 2) * 3
}

/// A placeholder's position inside a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub range: Range<usize>,
    pub id: PlaceholderId,
}

/// Text with tracked placeholder positions
///
/// Slots are sorted and never overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    text: String,
    slots: Vec<Slot>,
}

impl Fragment {
    /// Plain text without placeholders
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            slots: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check that `pos` does not fall strictly inside a placeholder
    pub fn is_boundary(&self, pos: usize) -> bool {
        let idx = self.slots.partition_point(|slot| slot.range.end <= pos);
        match self.slots.get(idx) {
            Some(slot) => slot.range.start >= pos,
            None => true,
        }
    }

    /// Whether `range` is exactly one existing placeholder
    pub fn is_placeholder(&self, range: &Range<usize>) -> bool {
        let idx = self.slots.partition_point(|slot| slot.range.start < range.start);
        self.slots.get(idx).is_some_and(|slot| slot.range == *range)
    }

    /// Whether a match over `range` may claim that text
    ///
    /// It may not cut through a placeholder, and may not consist of
    /// nothing but one already-claimed placeholder.
    pub fn is_claimable(&self, range: &Range<usize>) -> bool {
        !range.is_empty()
            && self.is_boundary(range.start)
            && self.is_boundary(range.end)
            && !self.is_placeholder(range)
    }

    /// Copy out a sub-range, keeping the placeholders it contains
    ///
    /// Both ends must be boundaries.
    pub fn slice(&self, range: Range<usize>) -> Fragment {
        let first = self.slots.partition_point(|slot| slot.range.start < range.start);
        let slots = self.slots[first..]
            .iter()
            .take_while(|slot| slot.range.end <= range.end)
            .map(|slot| Slot {
                range: slot.range.start - range.start..slot.range.end - range.start,
                id: slot.id,
            })
            .collect();
        Fragment {
            text: self.text[range].to_string(),
            slots,
        }
    }

    /// Append literal text
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append a placeholder token
    pub fn push_placeholder(&mut self, id: PlaceholderId) {
        let start = self.text.len();
        self.text.push_str(&placeholder_token(id));
        self.slots.push(Slot {
            range: start..self.text.len(),
            id,
        });
    }

    /// Append another fragment, shifting its placeholders
    pub fn push_fragment(&mut self, other: Fragment) {
        let offset = self.text.len();
        self.text.push_str(&other.text);
        self.slots.extend(other.slots.into_iter().map(|slot| Slot {
            range: slot.range.start + offset..slot.range.end + offset,
            id: slot.id,
        }));
    }

    /// Append a sub-range of another fragment
    pub fn push_slice(&mut self, source: &Fragment, range: Range<usize>) {
        if !range.is_empty() {
            self.push_fragment(source.slice(range));
        }
    }
}

/// Stored markup for one placeholder
#[derive(Debug)]
struct Replacement {
    /// Tag wrapping the body, if any
    tag: Option<String>,
    /// Original text with any inner placeholders
    body: Fragment,
}

/// Per-block table of placeholder replacements
#[derive(Debug, Default)]
pub struct ReplacementStore {
    entries: Vec<Replacement>,
}

impl ReplacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a replacement and get its placeholder id
    pub fn insert(&mut self, tag: Option<String>, body: Fragment) -> PlaceholderId {
        let id = self.entries.len() as PlaceholderId;
        self.entries.push(Replacement { tag, body });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand every placeholder in `root` into a span tree
    ///
    /// A placeholder can only contain placeholders created before it, so
    /// entries are expanded in creation order: by the time an entry is
    /// built, everything nested inside it is already complete. Each
    /// expanded entry is consumed by exactly one parent.
    pub fn resolve(self, root: &Fragment) -> Result<Node> {
        let mut built: Vec<Option<Node>> = Vec::with_capacity(self.entries.len());

        for (id, entry) in self.entries.into_iter().enumerate() {
            let children = expand(&entry.body, &mut built)?;
            let node = match entry.tag {
                Some(tag) => Node::Span { tag, children },
                None => Node::Group(children),
            };
            debug_assert_eq!(built.len(), id);
            built.push(Some(node));
        }

        Ok(Node::Group(expand(root, &mut built)?))
    }
}

/// Turn a fragment into nodes, taking its placeholders from `built`
fn expand(fragment: &Fragment, built: &mut [Option<Node>]) -> Result<Vec<Node>> {
    let mut children = Vec::with_capacity(fragment.slots.len() * 2 + 1);
    let mut cursor = 0;

    for slot in &fragment.slots {
        if slot.range.start > cursor {
            children.push(Node::Text(fragment.text[cursor..slot.range.start].to_string()));
        }
        let node = built
            .get_mut(slot.id as usize)
            .and_then(Option::take)
            .ok_or(HighlightError::ResolutionIntegrity(slot.id))?;
        children.push(node);
        cursor = slot.range.end;
    }
    if cursor < fragment.text.len() {
        children.push(Node::Text(fragment.text[cursor..].to_string()));
    }

    Ok(children)
}
