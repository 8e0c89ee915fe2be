//! Rule interpreter and fixed-point driver.
//!
//! Every top-level cell of every card is a form headed by a keyword:
//!
//! - `(claim expr...)` pushes the fact `(expr...)`.
//! - `(wish expr...)` pushes `(self wishes expr...)`.
//! - `(when pattern body...)` matches `pattern` and interprets `body` once per match on a fact
//!   derived after the last time this `when` ran.
//!
//! A frame repeats full passes (all cards, then all listeners) until a pass adds no fact.
//!
//! ## Visibility
//!
//! A global iteration counter advances after every interpreted cell and after every listener.
//! Facts carry the iteration they were derived in and `when` cells remember the iteration they
//! last ran at. As a result a `when` sees every fact pushed earlier in the same pass, while a
//! fact pushed later in the pass is seen on the next pass.

use crate::builtins::{HighlightListener, LabelListener, PointsResponder};
use crate::card::{Card, CardId};
use crate::facts::{Binding, FactsDb, find_binding};
use crate::tree::{CellId, CellKind, CellTree};
use crate::value::Value;
use bramble_lang::Keyword;
use tracing::{debug, trace, warn};

/// Interpreter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramConfig {
    /// Length of the whiskers used by the `points` responder.
    pub whisker_size: f32,
    /// Stop a frame after this many passes (`None` runs to the fixed point).
    pub max_passes: Option<usize>,
    /// Number of the first frame.
    pub first_frame: u32,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            whisker_size: 100.0,
            max_passes: None,
            first_frame: 1,
        }
    }
}

/// Outcome of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointReport {
    /// Frame that was interpreted.
    pub frame: u32,
    /// Number of passes run, including the final pass that added nothing.
    pub passes: usize,
    /// Facts at the end of the frame.
    pub fact_count: usize,
    /// `true` if the pass limit stopped the frame before the fixed point.
    pub truncated: bool,
}

/// Evaluate `cell` into a value.
///
/// Lists evaluate element-wise, `self` evaluates to `card`, numbers and strings to their
/// literal values. Placeholders evaluate to their binding when bound, otherwise to a placeholder
/// value. Any other cell evaluates to the binding named by its text, or to a symbol.
pub fn eval_pattern(tree: &CellTree, card: CardId, cell: CellId, bindings: &[Binding]) -> Value {
    let Some(c) = tree.get(cell) else {
        return Value::List(Vec::new());
    };
    match c.kind {
        CellKind::List => Value::List(
            c.children()
                .iter()
                .filter(|&&child| tree[child].kind != CellKind::Comment)
                .map(|&child| eval_pattern(tree, card, child, bindings))
                .collect(),
        ),
        CellKind::Keyword if c.keyword == Some(Keyword::SelfCard) => Value::Card(card),
        CellKind::Float => Value::F64(c.float_value),
        CellKind::Int => Value::U64(c.int_value),
        CellKind::String => Value::String(c.text.clone()),
        CellKind::Placeholder => {
            let sigil = c.text.chars().next().map_or(0, char::len_utf8);
            let name = &c.text[sigil..];
            find_binding(bindings, name)
                .cloned()
                .unwrap_or_else(|| Value::placeholder(name))
        }
        _ => find_binding(bindings, &c.text)
            .cloned()
            .unwrap_or_else(|| Value::symbol(c.text.clone())),
    }
}

/// Rule program: the fact database plus the interpreter configuration.
pub struct Program {
    db: FactsDb,
    config: ProgramConfig,
}

impl Program {
    /// A program with no listeners or responders.
    pub fn new(config: ProgramConfig) -> Self {
        Self {
            db: FactsDb::new(config.first_frame),
            config,
        }
    }

    /// A program with the built-in label and highlight listeners and the `points` responder.
    pub fn with_builtins(config: ProgramConfig) -> Self {
        let mut program = Self::new(config);
        program.db.add_listener(Box::new(LabelListener::new()));
        program.db.add_listener(Box::new(HighlightListener::new()));
        program
            .db
            .add_responder(Box::new(PointsResponder::new(config.whisker_size)));
        program
    }

    /// The fact database.
    pub fn db(&self) -> &FactsDb {
        &self.db
    }

    /// Mutable access to the fact database (to register listeners or responders).
    pub fn db_mut(&mut self) -> &mut FactsDb {
        &mut self.db
    }

    /// Configuration.
    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Frame most recently interpreted, if any. Stamps written during it are current.
    pub fn last_frame(&self) -> Option<u32> {
        let frame = self.db.frame();
        (frame > self.config.first_frame).then(|| frame - 1)
    }

    /// Interpret every card to a fixed point.
    pub fn update(&mut self, tree: &CellTree, cards: &mut [Card]) -> FixedPointReport {
        let max_passes = self.config.max_passes;
        let mut db = self.db.begin_frame();
        let frame = db.frame();

        let mut passes = 0;
        let mut truncated = false;
        loop {
            let before = db.fact_count();
            passes += 1;

            for index in 0..cards.len() {
                let (card, root) = (cards[index].id, cards[index].root);
                let forms = tree.get(root).map(|r| r.children().to_vec()).unwrap_or_default();
                for cell in forms {
                    interpret_cell(&mut db, tree, cards, card, cell, &[]);
                }
            }
            db.run_listeners(cards);

            trace!(frame, pass = passes, facts = db.fact_count(), "pass done");
            if db.fact_count() == before {
                break;
            }
            if max_passes.is_some_and(|max| passes >= max) {
                warn!(frame, passes, "pass limit reached before fixed point");
                truncated = true;
                break;
            }
        }

        for fact in db.facts() {
            trace!(frame, fact = %fact.root, iteration = fact.iteration, "fact");
        }
        let report = FixedPointReport {
            frame,
            passes,
            fact_count: db.fact_count(),
            truncated,
        };
        debug!(frame, passes, facts = report.fact_count, "frame done");
        report
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::with_builtins(ProgramConfig::default())
    }
}

/// Interpret one cell of `card` with `bindings`.
pub fn interpret_cell(
    db: &mut FactsDb,
    tree: &CellTree,
    cards: &mut [Card],
    card: CardId,
    cell: CellId,
    bindings: &[Binding],
) {
    interpret_form(db, tree, cards, card, cell, bindings);
    db.bump_iteration();
}

fn interpret_form(
    db: &mut FactsDb,
    tree: &CellTree,
    cards: &mut [Card],
    card: CardId,
    cell: CellId,
    bindings: &[Binding],
) {
    let Some(c) = tree.get(cell) else {
        return;
    };
    if c.kind != CellKind::List {
        return;
    }
    let forms: Vec<CellId> = c
        .children()
        .iter()
        .copied()
        .filter(|&child| tree[child].kind != CellKind::Comment)
        .collect();
    let Some((&head, args)) = forms.split_first() else {
        return;
    };

    match tree[head].keyword {
        Some(Keyword::Claim) => {
            let children = args
                .iter()
                .map(|&arg| eval_pattern(tree, card, arg, bindings))
                .collect();
            db.push_fact(children);
        }
        Some(Keyword::Wish) => {
            let mut children = vec![Value::Card(card), Value::symbol("wishes")];
            children.extend(
                args.iter()
                    .map(|&arg| eval_pattern(tree, card, arg, bindings)),
            );
            db.push_fact(children);
        }
        Some(Keyword::When) => {
            let Some((&pattern_cell, body)) = args.split_first() else {
                return;
            };
            let last_run = db.when_stamp(cell);
            let pattern = eval_pattern(tree, card, pattern_cell, bindings);
            let matches = db.match_pattern(&pattern, cards);

            for m in matches.iter().filter(|m| m.iteration > last_run) {
                trace!(fact = %db.facts()[m.fact].root, "matched fact");
                for &child in body {
                    interpret_cell(db, tree, cards, card, child, &m.bindings);
                }
            }
            db.set_when_stamp(cell, db.iteration());
        }
        _ => {}
    }
}
