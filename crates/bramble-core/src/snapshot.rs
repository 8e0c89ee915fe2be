//! Render snapshot.
//!
//! A [`BoardSnapshot`] is a plain-data copy of everything a renderer needs for one frame: card
//! rectangles, the stamps that are current for the last interpreted frame, the laid-out cells of
//! every card, and the cursor. Renderers never touch the cell arena directly.
//!
//! Cell rectangles are in card-local coordinates; add the card's rectangle origin to place them
//! on the board.

use crate::card::{Card, CardId, Color, Direction};
use crate::geometry::{Rect, Vec2};
use crate::tree::{CellId, CellKind, CellTree};

/// One laid-out cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSnapshot {
    /// Cell identity.
    pub id: CellId,
    /// Cell kind.
    pub kind: CellKind,
    /// Text payload.
    pub text: String,
    /// Layout rectangle.
    pub rect: Rect,
    /// Width of the last line.
    pub last_line_width: f32,
    /// Nesting depth below the card root (top-level forms are at depth 1).
    pub depth: usize,
}

/// Whisker state for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WhiskerSnapshot {
    /// Draw the whisker.
    pub shown: bool,
    /// Draw it emphasized (it touches another card).
    pub bold: bool,
}

/// One card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSnapshot {
    /// Card identity.
    pub id: CardId,
    /// Board rectangle.
    pub rect: Rect,
    /// Whether the card is being edited.
    pub edited: bool,
    /// Current label.
    pub label: Option<String>,
    /// Current highlight.
    pub highlight: Option<Color>,
    /// Whiskers, indexed by [`Direction::index`].
    pub whiskers: [WhiskerSnapshot; 4],
    /// Cells in pre-order.
    pub cells: Vec<CellSnapshot>,
}

/// Cursor of the edited card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSnapshot {
    /// Card being edited.
    pub card: CardId,
    /// Card-local display position of the cursor.
    pub cursor: Vec2,
    /// Card-local display position of the mark.
    pub mark: Vec2,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardSnapshot {
    /// Frame whose stamps are shown.
    pub frame: Option<u32>,
    /// Cards, in board order.
    pub cards: Vec<CardSnapshot>,
    /// Cursor, when a card is being edited.
    pub cursor: Option<CursorSnapshot>,
}

impl BoardSnapshot {
    /// Card snapshot by id.
    pub fn card(&self, id: CardId) -> Option<&CardSnapshot> {
        self.cards.iter().find(|c| c.id == id)
    }
}

impl CardSnapshot {
    /// Capture `card` from `tree`, showing stamps written during `frame`.
    pub fn capture(tree: &CellTree, card: &Card, frame: Option<u32>, edited: bool) -> Self {
        let stamps = &card.stamps;
        let mut whiskers = [WhiskerSnapshot::default(); 4];
        if let Some(frame) = frame {
            for dir in Direction::ALL {
                whiskers[dir.index()] = WhiskerSnapshot {
                    shown: stamps.whisker_shown_at(dir, frame),
                    bold: stamps.whisker_bold_at(dir, frame),
                };
            }
        }

        let cells = tree
            .walk(card.root)
            .into_iter()
            .filter(|&(_, depth)| depth > 0)
            .map(|(id, depth)| {
                let c = &tree[id];
                CellSnapshot {
                    id,
                    kind: c.kind,
                    text: c.text.clone(),
                    rect: c.rect,
                    last_line_width: c.last_line_width,
                    depth,
                }
            })
            .collect();

        Self {
            id: card.id,
            rect: card.rect,
            edited,
            label: frame.and_then(|f| stamps.label_at(f)).map(str::to_string),
            highlight: frame.and_then(|f| stamps.highlight_at(f)),
            whiskers,
            cells,
        }
    }
}
