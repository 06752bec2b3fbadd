//! Highlight scheduler
//!
//! Drives a block's rule list through the match engine one rule at a
//! time, yielding to the async runtime between rules so that many blocks
//! can share one thread. Matching within a single rule is never
//! interrupted.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::Result;
use crate::syntax::{Engine, Fragment, Node, Registry, ReplacementStore, Rule};

/// Lifecycle of a highlighted block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Pending,
    Running { rule_index: usize },
    Resolving,
    Done,
}

/// When the scheduler gives control back to the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldPolicy {
    /// Yield after this many rule applications (0 leaves it to the time slice)
    pub rules_per_yield: usize,
    /// Yield once this much time has passed since the last yield
    pub time_slice: Option<Duration>,
}

impl Default for YieldPolicy {
    fn default() -> Self {
        Self {
            rules_per_yield: 1,
            time_slice: None,
        }
    }
}

impl YieldPolicy {
    /// A policy that is guaranteed to yield
    ///
    /// With neither a rule count nor a time slice a block would run to
    /// completion in one go, so the count falls back to one rule.
    pub fn normalized(self) -> Self {
        if self.rules_per_yield == 0 && self.time_slice.is_none() {
            warn!("rules-per-yield = 0 needs a time slice; yielding after every rule");
            return Self {
                rules_per_yield: 1,
                ..self
            };
        }
        self
    }
}

impl From<&Config> for YieldPolicy {
    fn from(config: &Config) -> Self {
        Self {
            rules_per_yield: config.rules_per_yield,
            time_slice: config.time_slice,
        }
        .normalized()
    }
}

/// One unit of input carried through the pipeline
pub struct Block {
    id: u64,
    language: String,
    rules: Vec<Rc<Rule>>,
    text: Fragment,
    store: ReplacementStore,
    state: BlockState,
}

impl Block {
    /// Create a pending block
    pub fn new(id: u64, language: &str, text: &str) -> Self {
        Self {
            id,
            language: language.to_string(),
            rules: Vec::new(),
            text: Fragment::from_text(text),
            store: ReplacementStore::new(),
            state: BlockState::Pending,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Snapshot the effective rule list and start running
    pub fn start(&mut self, registry: &Registry) {
        if self.state == BlockState::Pending {
            self.rules = registry.effective_rules(&self.language);
            self.state = BlockState::Running { rule_index: 0 };
            debug!(block = self.id, language = %self.language, rules = self.rules.len(), "block started");
        }
    }

    /// Apply the next rule
    ///
    /// Returns false once every rule has been applied, at which point
    /// the block is ready to resolve.
    pub fn step(&mut self, registry: &Registry, max_depth: usize) -> bool {
        let rule_index = match self.state {
            BlockState::Running { rule_index } => rule_index,
            _ => return false,
        };
        let Some(rule) = self.rules.get(rule_index).cloned() else {
            self.state = BlockState::Resolving;
            return false;
        };

        let mut engine = Engine::new(registry, &mut self.store, max_depth);
        let text = std::mem::take(&mut self.text);
        self.text = engine.apply_rules(std::slice::from_ref(&rule), text, 0);

        self.state = BlockState::Running {
            rule_index: rule_index + 1,
        };
        true
    }

    /// Expand all placeholders into the final span tree
    pub fn resolve(&mut self) -> Result<Node> {
        self.state = BlockState::Resolving;
        let store = std::mem::take(&mut self.store);
        let text = std::mem::take(&mut self.text);
        let placeholders = store.len();
        let tree = store.resolve(&text)?;
        self.state = BlockState::Done;
        debug!(block = self.id, placeholders, "block resolved");
        Ok(tree)
    }
}

/// Runs blocks cooperatively against a shared registry
#[derive(Clone)]
pub struct Scheduler {
    registry: Rc<RefCell<Registry>>,
    policy: YieldPolicy,
    max_depth: usize,
}

impl Scheduler {
    pub fn new(registry: Rc<RefCell<Registry>>, policy: YieldPolicy, max_depth: usize) -> Self {
        Self {
            registry,
            policy: policy.normalized(),
            max_depth,
        }
    }

    /// Run a block to completion
    ///
    /// Registry borrows are released before every yield point.
    pub async fn run(&self, mut block: Block) -> Result<Node> {
        block.start(&self.registry.borrow());

        let mut since_yield = 0;
        let mut slice_start = Instant::now();
        loop {
            let applied = block.step(&self.registry.borrow(), self.max_depth);
            if !applied {
                break;
            }

            since_yield += 1;
            let count_reached =
                self.policy.rules_per_yield > 0 && since_yield >= self.policy.rules_per_yield;
            let slice_spent = self
                .policy
                .time_slice
                .is_some_and(|slice| slice_start.elapsed() >= slice);
            if count_reached || slice_spent {
                trace!(
                    block = block.id(),
                    language = block.language(),
                    state = ?block.state(),
                    "yielding"
                );
                tokio::task::yield_now().await;
                since_yield = 0;
                slice_start = Instant::now();
            }
        }

        block.resolve()
    }
}
