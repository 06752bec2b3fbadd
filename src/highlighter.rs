//! Public highlighting facade
//!
//! A [`Highlighter`] owns a registry and drives blocks through the
//! scheduler. All entry points spawn onto the current `LocalSet`, so
//! they must be called from inside one (see `main.rs`).

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{HighlightError, Result};
use crate::scheduler::{Block, Scheduler, YieldPolicy};
use crate::syntax::{Node, Registry, Rule};

/// Per-call options: the language plus an optional extra class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    pub language: String,
    /// Appended to every span's class list; overrides the configured one
    pub global_class: Option<String>,
}

impl HighlightOptions {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            global_class: None,
        }
    }

    pub fn with_global_class(mut self, class: &str) -> Self {
        self.global_class = Some(class.to_string());
        self
    }
}

impl From<&str> for HighlightOptions {
    fn from(language: &str) -> Self {
        Self::new(language)
    }
}

impl From<String> for HighlightOptions {
    fn from(language: String) -> Self {
        Self {
            language,
            global_class: None,
        }
    }
}

/// A unit of batch input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language marker; blocks without one are left alone
    pub language: Option<String>,
    /// Escaped source text, replaced by markup once highlighted
    pub text: String,
    pub highlighted: bool,
}

impl CodeBlock {
    pub fn new(language: Option<&str>, text: &str) -> Self {
        Self {
            language: language.map(str::to_string),
            text: text.to_string(),
            highlighted: false,
        }
    }
}

/// Fired when a batch block finishes
#[derive(Debug, Clone, Copy)]
pub struct HighlightEvent<'a> {
    /// Position of the block in the batch
    pub index: usize,
    pub language: &'a str,
    pub markup: &'a str,
}

type Listener = Rc<dyn Fn(&HighlightEvent<'_>)>;

struct Inner {
    registry: Rc<RefCell<Registry>>,
    scheduler: Scheduler,
    config: Config,
    listeners: RefCell<Vec<Listener>>,
    next_block: Cell<u64>,
}

/// Highlighting coordinator
///
/// Cheap to clone; clones share the registry and listeners.
#[derive(Clone)]
pub struct Highlighter {
    inner: Rc<Inner>,
}

impl Highlighter {
    /// Create a highlighter with the built-in languages
    pub fn new(config: Config) -> Self {
        Self::with_registry(Registry::with_builtins(), config)
    }

    /// Create a highlighter over an existing registry
    pub fn with_registry(registry: Registry, config: Config) -> Self {
        let registry = Rc::new(RefCell::new(registry));
        let scheduler = Scheduler::new(
            registry.clone(),
            YieldPolicy::from(&config),
            config.max_depth,
        );
        Self {
            inner: Rc::new(Inner {
                registry,
                scheduler,
                config,
                listeners: RefCell::new(Vec::new()),
                next_block: Cell::new(0),
            }),
        }
    }

    pub fn registry(&self) -> Ref<'_, Registry> {
        self.inner.registry.borrow()
    }

    /// Mutable registry access; do not hold across an `.await`
    pub fn registry_mut(&self) -> RefMut<'_, Registry> {
        self.inner.registry.borrow_mut()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Register rules for `name`, or generic rules when `name` is `None`
    pub fn extend(&self, name: Option<&str>, rules: Vec<Rule>, base: Option<&str>) -> Result<()> {
        self.registry_mut().extend(name, rules, base)
    }

    /// Register rules for `name`, discarding its existing own rules
    pub fn replace(&self, name: &str, rules: Vec<Rule>, base: Option<&str>) -> Result<()> {
        self.registry_mut().replace(name, rules, base)
    }

    pub fn remove(&self, name: &str) -> bool {
        self.registry_mut().remove(name)
    }

    pub fn add_alias(&self, alias: &str, canonical: &str) {
        self.registry_mut().add_alias(alias, canonical)
    }

    /// Register a listener for finished batch blocks
    ///
    /// Listeners may register further listeners; those are called from
    /// the next event on.
    pub fn on_highlight<F>(&self, listener: F)
    where
        F: Fn(&HighlightEvent<'_>) + 'static,
    {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Highlight `text` and return the span tree
    ///
    /// An unregistered language falls back to the generic rules.
    pub async fn highlight_tree(&self, text: &str, language: &str) -> Result<Node> {
        let id = self.inner.next_block.get();
        self.inner.next_block.set(id + 1);
        self.inner.scheduler.run(Block::new(id, language, text)).await
    }

    /// Highlight `text` and return HTML markup
    ///
    /// `text` must already be HTML-escaped.
    pub async fn highlight(&self, text: &str, options: impl Into<HighlightOptions>) -> Result<String> {
        let options = options.into();
        let tree = self.highlight_tree(text, &options.language).await?;
        let global_class = options
            .global_class
            .as_deref()
            .or(self.inner.config.global_class.as_deref());
        Ok(tree.to_html(global_class))
    }

    /// Start highlighting in the background
    ///
    /// Dropping the returned handle discards the result; the work still
    /// runs to completion.
    pub fn submit(&self, text: &str, options: impl Into<HighlightOptions>) -> PendingHighlight {
        let (tx, rx) = oneshot::channel();
        let this = self.clone();
        let text = text.to_string();
        let options = options.into();
        tokio::task::spawn_local(async move {
            let result = this.highlight(&text, options).await;
            if tx.send(result).is_err() {
                debug!("highlight result dropped, nobody waiting");
            }
        });
        PendingHighlight { rx }
    }

    /// Highlight in the background and hand the result to `on_complete`
    ///
    /// The callback runs exactly once, never before this call returns.
    pub fn highlight_with<F>(&self, text: &str, options: impl Into<HighlightOptions>, on_complete: F)
    where
        F: FnOnce(Result<String>) + 'static,
    {
        let this = self.clone();
        let text = text.to_string();
        let options = options.into();
        tokio::task::spawn_local(async move {
            on_complete(this.highlight(&text, options).await);
        });
    }

    /// Highlight every pending block that carries a language marker
    ///
    /// Blocks run interleaved. Each finished block has its text replaced
    /// by markup, is marked highlighted, and is announced to listeners.
    /// Returns the number of blocks highlighted.
    pub async fn highlight_all(&self, blocks: &mut [CodeBlock]) -> usize {
        let mut tasks = JoinSet::new();
        let mut pending = HashSet::new();

        for (index, block) in blocks.iter().enumerate() {
            if block.highlighted {
                continue;
            }
            let Some(language) = block.language.clone() else {
                continue;
            };
            let this = self.clone();
            let text = block.text.clone();
            pending.insert(index);
            tasks.spawn_local(async move {
                let result = this.highlight(&text, language.as_str()).await;
                (index, language, result)
            });
        }
        debug!(blocks = pending.len(), "batch started");

        let mut highlighted = 0;
        while let Some(joined) = tasks.join_next().await {
            let (index, language, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!("highlight task failed: {}", e);
                    continue;
                }
            };
            pending.remove(&index);

            match result {
                Ok(markup) => {
                    let block = &mut blocks[index];
                    block.text = markup;
                    block.highlighted = true;
                    highlighted += 1;
                    self.notify(&HighlightEvent {
                        index,
                        language: &language,
                        markup: &block.text,
                    });
                }
                Err(e) => warn!(index, %language, "highlight failed: {}", e),
            }
        }

        if !pending.is_empty() {
            warn!(remaining = pending.len(), "batch finished with unhighlighted blocks");
        }
        highlighted
    }

    fn notify(&self, event: &HighlightEvent<'_>) {
        // Snapshot so listeners can call back into the highlighter
        let listeners: Vec<Listener> = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener(event);
        }
    }
}

/// Result of [`Highlighter::submit`]
///
/// Resolves to `Cancelled` if the task went away without a result.
pub struct PendingHighlight {
    rx: oneshot::Receiver<Result<String>>,
}

impl Future for PendingHighlight {
    type Output = Result<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(HighlightError::Cancelled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{placeholder_token, GroupAction};
    use proptest::prelude::*;
    use tokio::task::LocalSet;

    fn highlighter() -> Highlighter {
        let mut registry = Registry::new();
        registry
            .extend(
                Some("lang"),
                vec![
                    Rule::tag("comment", r"#.*"),
                    Rule::tag("keyword", r"\b(?:if|else)\b"),
                    Rule::tag("constant.numeric", r"\b\d+\b"),
                ],
                None,
            )
            .unwrap();
        Highlighter::with_registry(registry, Config::default())
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        LocalSet::new().block_on(&runtime, future)
    }

    #[tokio::test]
    async fn test_highlight() {
        let hl = highlighter();
        let html = hl.highlight("if 1 # else", "lang").await.unwrap();
        assert_eq!(
            html,
            "<span class=\"keyword\">if</span> <span class=\"constant numeric\">1</span> <span class=\"comment\"># else</span>"
        );
    }

    #[tokio::test]
    async fn test_no_match_is_identity() {
        let hl = highlighter();
        assert_eq!(hl.highlight("x y z", "lang").await.unwrap(), "x y z");
    }

    #[tokio::test]
    async fn test_alias_is_byte_identical() {
        let hl = Highlighter::new(Config::default());
        let source = "function f(a) { return a + 1; } // done";
        let canonical = hl.highlight(source, "javascript").await.unwrap();
        let aliased = hl.highlight(source, "js").await.unwrap();
        assert_eq!(canonical, aliased);
        assert!(canonical.contains("<span"));
    }

    #[tokio::test]
    async fn test_remove_leaves_generic_rules() {
        let hl = highlighter();
        hl.extend(None, vec![Rule::tag("constant.language", r"\bnull\b")], None)
            .unwrap();
        assert!(hl.remove("lang"));

        let html = hl.highlight("if null", "lang").await.unwrap();
        assert_eq!(html, "if <span class=\"constant language\">null</span>");
    }

    #[tokio::test]
    async fn test_unknown_language_uses_generic_rules() {
        let hl = highlighter();
        hl.extend(None, vec![Rule::tag("constant.language", r"\bnull\b")], None)
            .unwrap();
        let html = hl.highlight("if null", "nope").await.unwrap();
        assert_eq!(html, "if <span class=\"constant language\">null</span>");
    }

    #[tokio::test]
    async fn test_global_class() {
        let hl = highlighter();
        let options = HighlightOptions::new("lang").with_global_class("hl");
        assert_eq!(
            hl.highlight("if", options).await.unwrap(),
            "<span class=\"keyword hl\">if</span>"
        );

        let config = Config {
            global_class: Some("cfg".to_string()),
            ..Config::default()
        };
        let hl = Highlighter::with_registry(highlighter().registry().clone(), config);
        assert_eq!(
            hl.highlight("42", "lang").await.unwrap(),
            "<span class=\"constant numeric cfg\">42</span>"
        );
    }

    #[tokio::test]
    async fn test_group_delegation_keeps_inter_group_text() {
        let hl = Highlighter::new(Config::default());
        hl.extend(
            Some("pair"),
            vec![Rule::groups(
                r"(\w+) = (.*)",
                [
                    (1, GroupAction::tag("variable")),
                    (2, GroupAction::language("generic")),
                ],
            )],
            None,
        )
        .unwrap();

        let html = hl.highlight("x = 42 // note", "pair").await.unwrap();
        assert_eq!(
            html,
            "<span class=\"variable\">x</span> = <span class=\"constant numeric\">42</span> <span class=\"comment\">// note</span>"
        );
    }

    #[tokio::test]
    async fn test_highlight_with_is_async_and_called_once() {
        LocalSet::new()
            .run_until(async {
                let hl = highlighter();
                let calls = Rc::new(RefCell::new(Vec::new()));
                let seen = calls.clone();
                hl.highlight_with("if", "lang", move |result| {
                    seen.borrow_mut().push(result.unwrap());
                });
                assert!(calls.borrow().is_empty());

                while calls.borrow().is_empty() {
                    tokio::task::yield_now().await;
                }
                for _ in 0..8 {
                    tokio::task::yield_now().await;
                }
                assert_eq!(*calls.borrow(), vec!["<span class=\"keyword\">if</span>".to_string()]);
            })
            .await;
    }

    #[tokio::test]
    async fn test_submit() {
        LocalSet::new()
            .run_until(async {
                let hl = highlighter();
                let html = hl.submit("else", "lang").await.unwrap();
                assert_eq!(html, "<span class=\"keyword\">else</span>");
            })
            .await;
    }

    #[tokio::test]
    async fn test_dropped_submit_completes_silently() {
        LocalSet::new()
            .run_until(async {
                let hl = highlighter();
                drop(hl.submit("if 1", "lang"));
                let html = hl.submit("2", "lang").await.unwrap();
                assert_eq!(html, "<span class=\"constant numeric\">2</span>");
            })
            .await;
    }

    #[tokio::test]
    async fn test_highlight_all() {
        LocalSet::new()
            .run_until(async {
                let hl = highlighter();
                let events = Rc::new(RefCell::new(Vec::new()));
                let seen = events.clone();
                hl.on_highlight(move |event| {
                    seen.borrow_mut().push((
                        event.index,
                        event.language.to_string(),
                        event.markup.to_string(),
                    ));
                });

                let mut done = CodeBlock::new(Some("lang"), "<b>kept</b>");
                done.highlighted = true;
                let mut blocks = vec![
                    CodeBlock::new(Some("lang"), "if"),
                    CodeBlock::new(None, "if"),
                    done,
                    CodeBlock::new(Some("lang"), "7"),
                ];

                let count = hl.highlight_all(&mut blocks).await;
                assert_eq!(count, 2);

                assert_eq!(blocks[0].text, "<span class=\"keyword\">if</span>");
                assert!(blocks[0].highlighted);
                assert_eq!(blocks[1].text, "if");
                assert!(!blocks[1].highlighted);
                assert_eq!(blocks[2].text, "<b>kept</b>");
                assert_eq!(blocks[3].text, "<span class=\"constant numeric\">7</span>");

                let mut events = events.borrow().clone();
                events.sort();
                assert_eq!(
                    events,
                    vec![
                        (0, "lang".to_string(), blocks[0].text.clone()),
                        (3, "lang".to_string(), blocks[3].text.clone()),
                    ]
                );

                // Nothing left to do on a second pass
                assert_eq!(hl.highlight_all(&mut blocks).await, 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_listener_can_register_listener() {
        LocalSet::new()
            .run_until(async {
                let hl = highlighter();
                let late_calls = Rc::new(Cell::new(0));
                let registered = Cell::new(false);

                let inner_hl = hl.clone();
                let counter = late_calls.clone();
                hl.on_highlight(move |_| {
                    if !registered.replace(true) {
                        let counter = counter.clone();
                        inner_hl.on_highlight(move |_| counter.set(counter.get() + 1));
                    }
                });

                let mut blocks = vec![CodeBlock::new(Some("lang"), "if")];
                assert_eq!(hl.highlight_all(&mut blocks).await, 1);
                assert_eq!(late_calls.get(), 0);

                let mut blocks = vec![CodeBlock::new(Some("lang"), "else")];
                assert_eq!(hl.highlight_all(&mut blocks).await, 1);
                assert_eq!(late_calls.get(), 1);
            })
            .await;
    }

    proptest! {
        #[test]
        fn prop_unmatched_text_is_unchanged(text in "[a-d ,.]{0,40}") {
            let hl = highlighter();
            let html = block_on(hl.highlight(&text, "lang")).unwrap();
            prop_assert_eq!(html, text);
        }

        #[test]
        fn prop_forged_tokens_stay_literal(
            prefix in "[a-z ]{0,10}",
            suffix in "[a-z ]{0,10}",
            id in 0u32..4,
        ) {
            let hl = Highlighter::with_registry(Registry::new(), Config::default());
            hl.extend(Some("all"), vec![Rule::tag("all", r"(?s).+")], None).unwrap();

            let input = format!("{}{}{}", prefix, placeholder_token(id), suffix);
            let html = block_on(hl.highlight(&input, "all")).unwrap();
            prop_assert_eq!(html, format!("<span class=\"all\">{}</span>", input));
        }
    }
}
