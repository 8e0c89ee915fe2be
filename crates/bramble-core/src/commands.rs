//! Input commands.
//!
//! Key handling is table driven: a [`CommandSpec`] maps a trigger (a key plus modifier mask, or a
//! typed code point) to an optional cursor motion and an optional editing [`Action`]. The table is
//! immutable static data handed to the editor; [`CommandTable::standard`] is the built-in one.

use crate::card::CardId;
use crate::tree::TreeError;
use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Keyboard modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CTRL  = 1 << 1;
        /// Alt / Option.
        const ALT   = 1 << 2;
        /// Command / Super.
        const CMD   = 1 << 3;
    }
}

/// Non-text keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Backspace.
    Backspace,
    /// Semicolon (used with [`Modifiers::CMD`] to insert a comment).
    Semicolon,
    /// Any other host key code.
    Other(u32),
}

/// What fires a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// A key press with an exact modifier mask.
    Key(Key, Modifiers),
    /// A typed code point (modifiers ignored).
    Char(char),
}

/// Direction of a cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    /// Towards the start of the tree.
    Prev,
    /// Towards the end of the tree.
    Next,
}

/// Kind of cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    /// One boundary step.
    One,
    /// To the adjacent display line.
    Vertical,
}

/// A cursor motion attached to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Motion {
    /// Kind of motion.
    pub movement: Movement,
    /// Direction of motion.
    pub direction: MoveDirection,
    /// Collapse the mark onto the cursor after moving.
    pub set_mark: bool,
}

/// Editing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Insert (or reuse) a hole.
    InsertHole,
    /// Insert an empty list.
    InsertList,
    /// Insert an empty comment.
    InsertComment,
    /// Insert an empty string literal.
    InsertString,
    /// Delete the selection.
    Delete,
}

bitflags! {
    /// Follow-up work a host should schedule after a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u8 {
        /// Scroll the cursor into view.
        const FOCUS_CURSOR      = 1 << 0;
        /// Re-run layout.
        const REBUILD           = 1 << 1;
        /// Refresh completion candidates.
        const UPDATE_COMPLETION = 1 << 2;
    }
}

/// One row of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandSpec {
    /// What fires the command.
    pub trigger: Trigger,
    /// Cursor motion, run before the action.
    pub motion: Option<Motion>,
    /// Editing action.
    pub action: Option<Action>,
    /// Follow-up flags.
    pub flags: CommandFlags,
}

const fn motion(movement: Movement, direction: MoveDirection, set_mark: bool) -> Option<Motion> {
    Some(Motion {
        movement,
        direction,
        set_mark,
    })
}

const fn key_move(key: Key, mods: Modifiers, m: Option<Motion>) -> CommandSpec {
    CommandSpec {
        trigger: Trigger::Key(key, mods),
        motion: m,
        action: None,
        flags: CommandFlags::empty(),
    }
}

const fn char_insert(ch: char, action: Action) -> CommandSpec {
    CommandSpec {
        trigger: Trigger::Char(ch),
        motion: None,
        action: Some(action),
        flags: CommandFlags::FOCUS_CURSOR
            .union(CommandFlags::REBUILD)
            .union(CommandFlags::UPDATE_COMPLETION),
    }
}

use MoveDirection::{Next, Prev};
use Movement::{One, Vertical};

static STANDARD_COMMANDS: [CommandSpec; 13] = [
    key_move(Key::Left, Modifiers::empty(), motion(One, Prev, true)),
    key_move(Key::Right, Modifiers::empty(), motion(One, Next, true)),
    key_move(Key::Up, Modifiers::empty(), motion(Vertical, Prev, true)),
    key_move(Key::Down, Modifiers::empty(), motion(Vertical, Next, true)),
    key_move(Key::Left, Modifiers::SHIFT, motion(One, Prev, false)),
    key_move(Key::Right, Modifiers::SHIFT, motion(One, Next, false)),
    key_move(Key::Up, Modifiers::SHIFT, motion(Vertical, Prev, false)),
    key_move(Key::Down, Modifiers::SHIFT, motion(Vertical, Next, false)),
    CommandSpec {
        trigger: Trigger::Key(Key::Semicolon, Modifiers::CMD),
        motion: None,
        action: Some(Action::InsertComment),
        flags: CommandFlags::FOCUS_CURSOR.union(CommandFlags::REBUILD),
    },
    char_insert('(', Action::InsertList),
    char_insert(' ', Action::InsertHole),
    char_insert('"', Action::InsertString),
    CommandSpec {
        trigger: Trigger::Key(Key::Backspace, Modifiers::empty()),
        motion: motion(One, Prev, false),
        action: Some(Action::Delete),
        flags: CommandFlags::FOCUS_CURSOR
            .union(CommandFlags::REBUILD)
            .union(CommandFlags::UPDATE_COMPLETION),
    },
];

/// An immutable command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTable {
    commands: &'static [CommandSpec],
}

impl CommandTable {
    /// Wrap a static table.
    pub const fn new(commands: &'static [CommandSpec]) -> Self {
        Self { commands }
    }

    /// The built-in table: arrows (plain moves collapse the selection, shifted moves extend
    /// it), `(`, space and `"` insertions, Cmd+`;` for comments, and backspace.
    pub fn standard() -> Self {
        Self::new(&STANDARD_COMMANDS)
    }

    /// All rows.
    pub fn commands(&self) -> &'static [CommandSpec] {
        self.commands
    }

    /// First row bound to `key` with exactly `mods`.
    pub fn find_key(&self, key: Key, mods: Modifiers) -> Option<&'static CommandSpec> {
        self.commands
            .iter()
            .find(|c| c.trigger == Trigger::Key(key, mods))
    }

    /// First row bound to the code point `ch`.
    pub fn find_char(&self, ch: char) -> Option<&'static CommandSpec> {
        self.commands.iter().find(|c| c.trigger == Trigger::Char(ch))
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// An input event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press (or repeat).
    Key {
        /// The key.
        key: Key,
        /// Active modifiers.
        mods: Modifiers,
    },
    /// Committed text input.
    Text(String),
}

/// Outcome of dispatching input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// A command ran.
    Success {
        /// Follow-up work for the host.
        flags: CommandFlags,
    },
    /// Text was spliced into a cell.
    TextInserted {
        /// Number of bytes inserted.
        bytes: usize,
    },
    /// No command is bound to the input.
    Unhandled,
}

/// Errors raised by input dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No card is being edited.
    #[error("no card is being edited")]
    NoEditedCard,
    /// The card does not exist.
    #[error("unknown card {0}")]
    UnknownCard(CardId),
    /// A tree edit broke an arena invariant.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
