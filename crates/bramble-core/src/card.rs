//! Cards: the unit of program text and of on-board geometry.
//!
//! Each card owns the root of a cell tree and a rectangle on the board. Built-in listeners and
//! responders write *stamps* onto cards (a label, a highlight, whiskers). A stamp records the frame
//! in which it was written and is only shown while that frame is the most recently interpreted
//! one, so a rule that stops firing makes its stamp disappear on the next frame.

use crate::geometry::{Rect, Vec2};
use crate::tree::CellId;
use std::fmt;

/// Stable identity of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub u64);

impl CardId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Create an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Highlight colors nameable from rules.
pub const HIGHLIGHT_COLORS: &[(&str, Color)] = &[
    ("red", Color::rgb(1.0, 0.0, 0.0)),
    ("green", Color::rgb(0.0, 1.0, 0.0)),
    ("blue", Color::rgb(0.0, 0.0, 1.0)),
];

/// Look up a highlight color by name.
pub fn highlight_color(name: &str) -> Option<Color> {
    HIGHLIGHT_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, c)| c)
}

/// The four whisker directions, in stamp-array order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Above the card.
    Up,
    /// Left of the card.
    Left,
    /// Below the card.
    Down,
    /// Right of the card.
    Right,
}

impl Direction {
    /// All directions, in stamp-array order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Symbol spelling used in facts.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Down => "down",
            Direction::Right => "right",
        }
    }

    /// Index into per-direction arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tip of a whisker of length `size` sticking out of `rect` in this direction.
    pub fn whisker_tip(self, rect: &Rect, size: f32) -> Vec2 {
        let center = rect.center();
        match self {
            Direction::Up => Vec2::new(center.x, rect.y - size),
            Direction::Left => Vec2::new(rect.x - size, center.y),
            Direction::Down => Vec2::new(center.x, rect.bottom() + size),
            Direction::Right => Vec2::new(rect.right() + size, center.y),
        }
    }
}

/// A value written by a built-in, valid for the frame it was written in.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp<T> {
    /// The stamped value.
    pub value: T,
    /// Frame in which the value was written.
    pub frame: u32,
}

impl<T> Stamp<T> {
    /// Stamp `value` at `frame`.
    pub fn new(value: T, frame: u32) -> Self {
        Self { value, frame }
    }

    /// The value, if it was written during `frame`.
    pub fn current(&self, frame: u32) -> Option<&T> {
        (self.frame == frame).then_some(&self.value)
    }
}

/// Per-direction whisker frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Whisker {
    /// Frame in which the whisker was last shown.
    pub shown_frame: Option<u32>,
    /// Frame in which the whisker last touched another card.
    pub bold_frame: Option<u32>,
}

/// Side-effect stamps written onto a card by built-ins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardStamps {
    /// Label text.
    pub label: Option<Stamp<String>>,
    /// Highlight color.
    pub highlight: Option<Stamp<Color>>,
    /// Whiskers, indexed by [`Direction::index`].
    pub whiskers: [Whisker; 4],
}

impl CardStamps {
    /// Label written during `frame`.
    pub fn label_at(&self, frame: u32) -> Option<&str> {
        self.label
            .as_ref()
            .and_then(|s| s.current(frame))
            .map(String::as_str)
    }

    /// Highlight written during `frame`.
    pub fn highlight_at(&self, frame: u32) -> Option<Color> {
        self.highlight.as_ref().and_then(|s| s.current(frame)).copied()
    }

    /// Whether the whisker in `dir` was shown during `frame`.
    pub fn whisker_shown_at(&self, dir: Direction, frame: u32) -> bool {
        self.whiskers[dir.index()].shown_frame == Some(frame)
    }

    /// Whether the whisker in `dir` touched another card during `frame`.
    pub fn whisker_bold_at(&self, dir: Direction, frame: u32) -> bool {
        self.whiskers[dir.index()].bold_frame == Some(frame)
    }
}

/// A card on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Identity, also the value of `self` in the card's rules.
    pub id: CardId,
    /// Board rectangle.
    pub rect: Rect,
    /// Root list cell of the card's program.
    pub root: CellId,
    /// Side-effect stamps.
    pub stamps: CardStamps,
}

impl Card {
    /// Create a card.
    pub fn new(id: CardId, rect: Rect, root: CellId) -> Self {
        Self {
            id,
            rect,
            root,
            stamps: CardStamps::default(),
        }
    }
}
