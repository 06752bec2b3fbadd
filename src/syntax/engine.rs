//! Match engine
//!
//! Applies one rule to a working fragment. Every accepted match is parked
//! in the ReplacementStore and replaced by a placeholder, so later rules
//! (and later matches of the same rule) cannot re-tag inside it.

use std::ops::Range;
use std::rc::Rc;

use regex::Captures;
use tracing::{trace, warn};

use super::registry::Registry;
use super::rules::{GroupAction, Rule, RuleAction};
use super::store::{Fragment, PlaceholderId, ReplacementStore};
use crate::error::Result;

/// Default bound on nested rule-list / language delegation
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Rule application context for one block
pub struct Engine<'a> {
    registry: &'a Registry,
    store: &'a mut ReplacementStore,
    max_depth: usize,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a Registry, store: &'a mut ReplacementStore, max_depth: usize) -> Self {
        Self {
            registry,
            store,
            max_depth,
        }
    }

    /// Apply a single rule, returning the updated text
    ///
    /// Fails only when the rule's pattern cannot be compiled. The input
    /// fragment is left untouched either way.
    pub fn apply_rule(&mut self, rule: &Rule, text: &Fragment) -> Result<Fragment> {
        self.apply_rule_at(rule, text, 0)
    }

    /// Apply a rule list in order, skipping rules whose pattern fails
    pub fn apply_rules(&mut self, rules: &[Rc<Rule>], text: Fragment, depth: usize) -> Fragment {
        let mut text = text;
        for rule in rules {
            match self.apply_rule_at(rule, &text, depth) {
                Ok(next) => text = next,
                Err(e) => warn!("skipping rule {}: {}", rule.label(), e),
            }
        }
        text
    }

    fn apply_rule_at(&mut self, rule: &Rule, text: &Fragment, depth: usize) -> Result<Fragment> {
        let regex = rule.pattern.regex()?;
        let mut out = Fragment::default();
        let mut last = 0;

        for caps in regex.captures_iter(text.text()) {
            let whole = match caps.get(0) {
                Some(m) => m.range(),
                None => continue,
            };
            // Zero-width matches never claim anything
            if !text.is_claimable(&whole) {
                continue;
            }

            let id = match &rule.action {
                RuleAction::Tag(tag) => self.store.insert(Some(tag.clone()), text.slice(whole.clone())),
                RuleAction::Groups(groups) => {
                    let body = self.tag_groups(groups.iter(), &caps, whole.clone(), text, depth);
                    self.store.insert(None, body)
                }
            };
            trace!(placeholder = id, start = whole.start, end = whole.end, "claimed match");

            out.push_slice(text, last..whole.start);
            out.push_placeholder(id);
            last = whole.end;

            if !rule.pattern.is_global() {
                break;
            }
        }

        out.push_slice(text, last..text.len());
        Ok(out)
    }

    /// Rebuild a match with its capture groups handled
    ///
    /// Groups are taken in order of position. Text between groups is
    /// copied as-is. A group that is empty, starts inside an earlier
    /// group, or cuts through a placeholder is left alone.
    fn tag_groups<'r>(
        &mut self,
        groups: impl Iterator<Item = (&'r usize, &'r GroupAction)>,
        caps: &Captures<'_>,
        whole: Range<usize>,
        text: &Fragment,
        depth: usize,
    ) -> Fragment {
        let mut present: Vec<(Range<usize>, &GroupAction)> = groups
            .filter_map(|(idx, action)| caps.get(*idx).map(|m| (m.range(), action)))
            .collect();
        present.sort_by_key(|(range, _)| range.start);

        let mut body = Fragment::default();
        let mut cursor = whole.start;

        for (range, action) in present {
            if range.is_empty()
                || range.start < cursor
                || !text.is_boundary(range.start)
                || !text.is_boundary(range.end)
            {
                continue;
            }

            body.push_slice(text, cursor..range.start);
            let group_text = text.slice(range.clone());
            match action {
                GroupAction::Tag(tag) => {
                    let id: PlaceholderId = self.store.insert(Some(tag.clone()), group_text);
                    body.push_placeholder(id);
                }
                GroupAction::Rules(rules) => {
                    let tagged = self.delegate(rules, group_text, depth);
                    body.push_fragment(tagged);
                }
                GroupAction::Language(name) => {
                    let rules = self.registry.effective_rules(name);
                    let tagged = self.delegate(&rules, group_text, depth);
                    body.push_fragment(tagged);
                }
            }
            cursor = range.end;
        }

        body.push_slice(text, cursor..whole.end);
        body
    }

    fn delegate(&mut self, rules: &[Rc<Rule>], text: Fragment, depth: usize) -> Fragment {
        if depth + 1 > self.max_depth {
            warn!(depth, "delegation depth limit reached; leaving group untagged");
            return text;
        }
        self.apply_rules(rules, text, depth + 1)
    }
}
