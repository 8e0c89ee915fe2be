#![warn(missing_docs)]
//! Bramble Core - headless kernel of a structure editor for a small rule language
//!
//! # Overview
//!
//! `bramble-core` edits programs as trees of cells rather than as flat text, and runs them on a
//! board of cards. Each card holds a list of top-level forms; the forms `claim` facts, `wish` for
//! effects, and react to facts with `when` rules. Every frame the whole board is re-evaluated to
//! a fixed point, and built-in listeners turn the resulting facts into visible card state
//! (labels, highlights, whiskers).
//!
//! Nothing here renders. Hosts feed input events in and pull a plain-data [`BoardSnapshot`] out.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workspace (cards, focus, frame driver)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Snapshot (BoardSnapshot)                   │  ← Rendering Data
//! ├──────────────────────┬──────────────────────┤
//! │  Editor + Commands   │  Interpreter         │
//! │  Layout              │  Facts + Builtins    │
//! ├──────────────────────┴──────────────────────┤
//! │  Points, Spans, Lexer                       │  ← Navigation
//! ├─────────────────────────────────────────────┤
//! │  Cell Tree Arena                            │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use bramble_core::{InputEvent, Rect, Workspace};
//!
//! let mut ws = Workspace::new();
//! let card = ws.add_card(Rect::new(0.0, 0.0, 300.0, 200.0));
//! ws.focus_card(card).unwrap();
//!
//! // Typing builds the tree: `(` opens a list, space starts a new cell, `"` a string.
//! ws.handle_input(&InputEvent::Text("(wish self is labeled \"hi".into())).unwrap();
//!
//! ws.update_frame();
//! let snapshot = ws.snapshot();
//! assert_eq!(snapshot.card(card).unwrap().label.as_deref(), Some("hi"));
//! ```
//!
//! # Module Description
//!
//! - [`tree`] - cell arena with stable ids
//! - [`point`] - cursor positions and boundary stepping
//! - [`lexer`] - tokenizer and incremental re-lexing of edited cells
//! - [`span`] - resolving two points into a sibling range
//! - [`layout`] - measuring and positioning cells
//! - [`commands`] - key bindings, input events, results and errors
//! - [`editor`] - cursor/mark editing operations
//! - [`value`], [`facts`] - fact values, pattern matching and the fact database
//! - [`interpreter`] - `claim`/`wish`/`when` evaluation to a fixed point
//! - [`builtins`] - label, highlight and `points` rules
//! - [`card`], [`snapshot`], [`workspace`] - the board

pub mod builtins;
pub mod card;
pub mod commands;
pub mod editor;
pub mod facts;
pub mod geometry;
pub mod interpreter;
pub mod layout;
pub mod lexer;
pub mod point;
pub mod snapshot;
pub mod span;
mod text;
pub mod tree;
pub mod value;
pub mod workspace;

pub use bramble_lang::{Keyword, LanguageConfig};
pub use builtins::{HighlightListener, LabelListener, PointsResponder};
pub use card::{Card, CardId, CardStamps, Color, Direction, Stamp, Whisker};
pub use commands::{
    Action, CommandError, CommandFlags, CommandResult, CommandSpec, CommandTable, InputEvent, Key,
    Modifiers, Motion, MoveDirection, Movement, Trigger,
};
pub use editor::Editor;
pub use facts::{
    Binding, Fact, FactsDb, FrameScope, Listener, Match, Responder, find_binding,
    match_value_against_pattern,
};
pub use geometry::{Rect, Vec2};
pub use interpreter::{FixedPointReport, Program, ProgramConfig, eval_pattern, interpret_cell};
pub use layout::{CellLayout, LayoutEngine, ListShape, MonospaceMetrics, TextExtent, TextMetrics};
pub use lexer::{Lexeme, RelexOutcome, lex_next, relex, tokenize};
pub use point::Point;
pub use snapshot::{BoardSnapshot, CardSnapshot, CellSnapshot, CursorSnapshot, WhiskerSnapshot};
pub use span::CellSpan;
pub use tree::{Cell, CellId, CellKind, CellTree, TreeError};
pub use value::Value;
pub use workspace::{CARD_CONTENT_ORIGIN, Workspace};
