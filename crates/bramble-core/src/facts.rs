//! Fact database and pattern matching.
//!
//! The database holds the structurally deduplicated fact set of the current frame, plus two
//! registries that persist across frames:
//!
//! - [`Listener`]s react to new facts matching their pattern with side effects on cards.
//! - [`Responder`]s behave like virtual fact sources. A query that fits a responder's pattern
//!   runs the responder, which may derive new facts; those become visible to later queries.
//!
//! Facts are rebuilt from scratch every frame. [`FactsDb::begin_frame`] returns a [`FrameScope`]
//! guard that clears the per-frame state on entry and advances the frame counter on every exit
//! path.

use crate::card::Card;
use crate::tree::CellId;
use crate::value::Value;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// A name-to-value association produced by a placeholder match.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Placeholder name.
    pub name: String,
    /// Bound value.
    pub value: Value,
}

/// First binding named `name`.
pub fn find_binding<'a>(bindings: &'a [Binding], name: &str) -> Option<&'a Value> {
    bindings.iter().find(|b| b.name == name).map(|b| &b.value)
}

/// Match `value` against `pattern`, appending placeholder bindings to `bindings`.
///
/// Kinds must be equal unless the pattern is a placeholder. Lists match position by position
/// and need equal lengths. Repeated placeholders bind independently. Floats compare by bit
/// pattern, so a NaN fact still deduplicates.
pub fn match_value_against_pattern(
    value: &Value,
    pattern: &Value,
    bindings: &mut Vec<Binding>,
) -> bool {
    match (pattern, value) {
        (Value::Placeholder(name), _) => {
            bindings.push(Binding {
                name: name.clone(),
                value: value.clone(),
            });
            true
        }
        (Value::Symbol(p), Value::Symbol(v)) | (Value::String(p), Value::String(v)) => p == v,
        (Value::U64(p), Value::U64(v)) => p == v,
        (Value::F64(p), Value::F64(v)) => p.to_bits() == v.to_bits(),
        (Value::Card(p), Value::Card(v)) => p == v,
        (Value::List(p), Value::List(v)) => {
            p.len() == v.len()
                && v
                    .iter()
                    .zip(p)
                    .all(|(child, pat)| match_value_against_pattern(child, pat, bindings))
        }
        _ => false,
    }
}

/// A derived fact.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    /// The fact's value tree (always a list).
    pub root: Value,
    /// Iteration in which the fact was first derived.
    pub iteration: u32,
}

/// One fact matched by a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Index of the matched fact in [`FactsDb::facts`].
    pub fact: usize,
    /// Iteration of the matched fact.
    pub iteration: u32,
    /// Bindings produced by the match.
    pub bindings: Vec<Binding>,
}

/// A side-effecting reaction to facts.
pub trait Listener {
    /// Pattern selecting the facts to react to.
    fn pattern(&self) -> &Value;

    /// Called once per new matching fact.
    fn on_match(&self, fact: &Value, bindings: &[Binding], cards: &mut [Card], frame: u32);
}

/// A virtual fact source.
pub trait Responder {
    /// Pattern of the queries this responder answers.
    fn pattern(&self) -> &Value;

    /// Answer `query`. `bindings` come from matching the query against [`Responder::pattern`].
    /// Returns the children of facts to push.
    fn respond(
        &self,
        query: &Value,
        bindings: &[Binding],
        cards: &mut [Card],
        frame: u32,
    ) -> Vec<Vec<Value>>;
}

struct ListenerSlot {
    listener: Box<dyn Listener>,
    last_run: u32,
}

/// The fact database.
pub struct FactsDb {
    facts: Vec<Fact>,
    listeners: Vec<ListenerSlot>,
    responders: Vec<Box<dyn Responder>>,
    when_stamps: HashMap<CellId, u32>,
    frame: u32,
    iteration: u32,
}

impl FactsDb {
    /// An empty database whose first frame is `first_frame`.
    pub fn new(first_frame: u32) -> Self {
        Self {
            facts: Vec::new(),
            listeners: Vec::new(),
            responders: Vec::new(),
            when_stamps: HashMap::new(),
            frame: first_frame,
            iteration: 1,
        }
    }

    /// Register a listener.
    pub fn add_listener(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(ListenerSlot {
            listener,
            last_run: 0,
        });
    }

    /// Register a responder.
    pub fn add_responder(&mut self, responder: Box<dyn Responder>) {
        self.responders.push(responder);
    }

    /// The current fact set.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Number of facts.
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Frame being (or about to be) interpreted.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Current iteration counter.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Advance the iteration counter.
    pub fn bump_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Start a frame: clears facts, resets the iteration counter and every listener's stamp.
    pub fn begin_frame(&mut self) -> FrameScope<'_> {
        self.facts.clear();
        self.when_stamps.clear();
        self.iteration = 1;
        for slot in &mut self.listeners {
            slot.last_run = 0;
        }
        FrameScope { db: self }
    }

    /// Match `pattern` against the fact set only.
    pub fn match_pattern_against_facts(&self, pattern: &Value) -> Vec<Match> {
        self.facts
            .iter()
            .enumerate()
            .filter_map(|(index, fact)| {
                let mut bindings = Vec::new();
                match_value_against_pattern(&fact.root, pattern, &mut bindings).then(|| Match {
                    fact: index,
                    iteration: fact.iteration,
                    bindings,
                })
            })
            .collect()
    }

    /// Run every responder whose pattern fits `pattern`, then match the fact set.
    ///
    /// Facts derived by responders are pushed before the scan, so they are part of the result.
    pub fn match_pattern(&mut self, pattern: &Value, cards: &mut [Card]) -> Vec<Match> {
        let mut derived = Vec::new();
        for responder in &self.responders {
            let mut bindings = Vec::new();
            if match_value_against_pattern(pattern, responder.pattern(), &mut bindings) {
                derived.extend(responder.respond(pattern, &bindings, cards, self.frame));
            }
        }
        for children in derived {
            self.push_fact(children);
        }
        self.match_pattern_against_facts(pattern)
    }

    /// Push the fact `(children...)` unless a structurally matching fact exists.
    ///
    /// Returns `true` if the fact was added.
    pub fn push_fact(&mut self, children: Vec<Value>) -> bool {
        let root = Value::List(children);
        if !self.match_pattern_against_facts(&root).is_empty() {
            return false;
        }
        trace!(fact = %root, iteration = self.iteration, "new fact");
        self.facts.push(Fact {
            root,
            iteration: self.iteration,
        });
        true
    }

    /// Last iteration a `when` cell ran in this frame (0 if it has not run yet).
    pub fn when_stamp(&self, cell: CellId) -> u32 {
        self.when_stamps.get(&cell).copied().unwrap_or(0)
    }

    /// Record the iteration a `when` cell last ran in.
    pub fn set_when_stamp(&mut self, cell: CellId, iteration: u32) {
        self.when_stamps.insert(cell, iteration);
    }

    /// Run every listener once over the facts derived since its last run.
    pub fn run_listeners(&mut self, cards: &mut [Card]) {
        for index in 0..self.listeners.len() {
            let pattern = self.listeners[index].listener.pattern().clone();
            let matches = self.match_pattern(&pattern, cards);
            let slot = &self.listeners[index];
            for m in matches.iter().filter(|m| m.iteration > slot.last_run) {
                slot.listener
                    .on_match(&self.facts[m.fact].root, &m.bindings, cards, self.frame);
            }
            self.listeners[index].last_run = self.iteration;
            self.iteration += 1;
        }
    }
}

impl Default for FactsDb {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Guard over one frame of interpretation. Dropping it advances the frame counter.
pub struct FrameScope<'a> {
    db: &'a mut FactsDb,
}

impl Deref for FrameScope<'_> {
    type Target = FactsDb;

    fn deref(&self) -> &FactsDb {
        self.db
    }
}

impl DerefMut for FrameScope<'_> {
    fn deref_mut(&mut self) -> &mut FactsDb {
        self.db
    }
}

impl Drop for FrameScope<'_> {
    fn drop(&mut self) {
        self.db.when_stamps.clear();
        self.db.frame += 1;
    }
}
