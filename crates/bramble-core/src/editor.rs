//! The cell editor: cursor, mark, and every tree edit driven by input.
//!
//! [`Editor`] owns the session's [`CellTree`] together with the cursor and mark [`Point`]s.
//! Structural edits (cell insertion, span deletion) and text edits (splice then re-lex) all go
//! through here, and so does command dispatch from a [`CommandTable`].
//!
//! Display positions come from the rectangles written by the last [`LayoutEngine::layout`] pass,
//! so hosts lay out after every rebuild-flagged command.

use crate::commands::{
    Action, CommandError, CommandResult, CommandSpec, CommandTable, InputEvent, Key, Modifiers,
    MoveDirection, Motion, Movement,
};
use crate::geometry::Vec2;
use crate::layout::{CellLayout, LayoutEngine, MonospaceMetrics, TextMetrics};
use crate::lexer;
use crate::point::Point;
use crate::text::floor_char_boundary;
use crate::tree::{CellId, CellKind, CellTree, TreeError};
use bramble_lang::LanguageConfig;
use tracing::{debug, trace};

/// Editing session state.
pub struct Editor {
    tree: CellTree,
    cursor: Point,
    mark: Point,
    lang: LanguageConfig,
    commands: CommandTable,
    metrics: Box<dyn TextMetrics>,
    scratch: CellId,
}

impl Editor {
    /// Create an editor with the given language, command table and text metrics.
    ///
    /// The editor starts with a scratch root: a detached empty list holding the cursor, so a
    /// standalone editor accepts input before any card root exists. A workspace moves the
    /// cursor into a card root on focus and leaves the scratch root empty and detached.
    pub fn new(
        lang: LanguageConfig,
        commands: CommandTable,
        metrics: Box<dyn TextMetrics>,
    ) -> Self {
        let mut tree = CellTree::new();
        let scratch = tree.alloc(CellKind::List);
        let cursor = Point::between(scratch, None);
        Self {
            tree,
            cursor,
            mark: cursor,
            lang,
            commands,
            metrics,
            scratch,
        }
    }

    /// The detached list the cursor starts in.
    pub fn scratch_root(&self) -> CellId {
        self.scratch
    }

    /// An editor with the standard language, command table and monospace metrics.
    pub fn with_defaults() -> Self {
        Self::new(
            LanguageConfig::default(),
            CommandTable::standard(),
            Box::new(MonospaceMetrics::default()),
        )
    }

    /// The cell arena.
    pub fn tree(&self) -> &CellTree {
        &self.tree
    }

    /// Mutable access to the cell arena.
    pub fn tree_mut(&mut self) -> &mut CellTree {
        &mut self.tree
    }

    /// Current cursor.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Current mark.
    pub fn mark(&self) -> Point {
        self.mark
    }

    /// Place the cursor and collapse the mark onto it.
    pub fn set_cursor(&mut self, point: Point) {
        self.cursor = point;
        self.mark = point;
    }

    /// Set cursor and mark independently.
    pub fn set_selection(&mut self, cursor: Point, mark: Point) {
        self.cursor = cursor;
        self.mark = mark;
    }

    /// Language configuration used for lexing.
    pub fn language(&self) -> &LanguageConfig {
        &self.lang
    }

    /// Command table used for dispatch.
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Allocate a fresh, detached root list.
    pub fn new_root(&mut self) -> CellId {
        self.tree.alloc(CellKind::List)
    }

    /// A layout engine over the editor's metrics.
    pub fn layout_engine(&self) -> LayoutEngine<'_> {
        LayoutEngine::new(self.metrics.as_ref())
    }

    /// Lay out the tree under `root` at `origin`.
    pub fn layout(&mut self, root: CellId, origin: Vec2) -> CellLayout {
        let engine = LayoutEngine::new(self.metrics.as_ref());
        engine.layout(&mut self.tree, root, origin)
    }

    /// Display position of `point` from the last layout.
    pub fn point_to_display_pos(&self, point: Point) -> Vec2 {
        self.layout_engine().point_to_display_pos(&self.tree, point)
    }

    /// Attach the detached `cell` at the cursor, then put cursor and mark at its start.
    ///
    /// In a list the cell goes before the cursor's right neighbor (or at the end). A hole under
    /// the cursor is replaced. Inside a text cell the new cell goes before it when the cursor is
    /// at offset 0, after it otherwise.
    pub fn insert_at_cursor(&mut self, cell: CellId) -> Result<(), TreeError> {
        let start = self.point_to_display_pos(self.cursor);
        if let Some(c) = self.tree.get_mut(cell) {
            c.rect.x = start.x;
            c.rect.y = start.y;
        }

        let parent = self.cursor.parent;
        let parent_kind = self
            .tree
            .get(parent)
            .ok_or(TreeError::StaleCell(parent))?
            .kind;

        if parent_kind.has_children() {
            match self.cursor.left_from {
                Some(right) => self.tree.insert_before(right, cell)?,
                None => self.tree.push_child(parent, cell)?,
            }
        } else if parent_kind == CellKind::Hole {
            self.tree.insert_after(parent, cell)?;
            self.tree.recycle(parent);
        } else if self.cursor.offset == 0 {
            self.tree.insert_before(parent, cell)?;
        } else {
            self.tree.insert_after(parent, cell)?;
        }

        self.set_cursor(Point::in_text(cell, 0));
        Ok(())
    }

    /// Allocate a cell of `kind` and insert it at the cursor.
    pub fn insert_cell(&mut self, kind: CellKind) -> Result<CellId, TreeError> {
        let cell = self.tree.alloc(kind);
        if let Err(err) = self.insert_at_cursor(cell) {
            self.tree.recycle(cell);
            return Err(err);
        }
        Ok(cell)
    }

    /// Move into the hole right after the cursor if there is one, otherwise insert a new hole.
    pub fn insert_hole(&mut self) -> Result<CellId, TreeError> {
        let parent = self.cursor.parent;
        let next = if self.tree.get(parent).is_some_and(|c| c.has_text()) {
            self.tree.next_sibling(parent)
        } else {
            self.cursor.left_from
        };

        match next {
            Some(hole) if self.tree[hole].kind == CellKind::Hole => {
                self.set_cursor(Point::in_text(hole, 0));
                Ok(hole)
            }
            _ => self.insert_cell(CellKind::Hole),
        }
    }

    /// Insert an empty list.
    pub fn insert_list(&mut self) -> Result<CellId, TreeError> {
        self.insert_cell(CellKind::List)
    }

    /// Insert an empty comment.
    pub fn insert_comment(&mut self) -> Result<CellId, TreeError> {
        self.insert_cell(CellKind::Comment)
    }

    /// Insert an empty string literal.
    pub fn insert_string(&mut self) -> Result<CellId, TreeError> {
        self.insert_cell(CellKind::String)
    }

    /// Re-lex `cell` with `text`, seeding positions for split-off cells and remapping the cursor.
    pub fn relex_cell(&mut self, cell: CellId, text: &str) -> Result<(), TreeError> {
        let origin = self.point_to_display_pos(Point::in_text(cell, 0));
        let outcome = lexer::relex(&mut self.tree, cell, text, &self.lang, self.cursor)?;

        let engine = LayoutEngine::new(self.metrics.as_ref());
        let mut start = 0;
        for &piece in &outcome.cells {
            if piece != cell {
                let x = origin.x + engine.offset_width(text, start);
                let rect = &mut self.tree[piece].rect;
                rect.x = x;
                rect.y = origin.y;
            }
            start += self.tree[piece].text.len();
        }

        self.set_cursor(outcome.cursor);
        Ok(())
    }

    /// Replace the text between cursor and mark in the cursor's cell with `input`, leaving the
    /// cursor after the inserted bytes. A hole is replaced entirely.
    pub fn replace_text_selection(&mut self, input: &str) -> Result<(), TreeError> {
        let cell = self.cursor.parent;
        let Some(c) = self.tree.get(cell).filter(|c| c.has_text()) else {
            return Ok(());
        };

        let (mut sel_start, mut sel_end) = if c.kind == CellKind::Hole {
            (0, c.text.len())
        } else {
            (
                self.cursor.offset.min(self.mark.offset),
                self.cursor.offset.max(self.mark.offset),
            )
        };
        sel_start = floor_char_boundary(&c.text, sel_start);
        sel_end = floor_char_boundary(&c.text, sel_end);

        let mut text = String::with_capacity(c.text.len() + input.len());
        text.push_str(&c.text[..sel_start]);
        text.push_str(input);
        text.push_str(&c.text[sel_end..]);

        self.cursor.offset = sel_start + input.len();
        self.mark = self.cursor;
        self.relex_cell(cell, &text)
    }

    /// Delete the selection.
    ///
    /// When cursor and mark address different gaps, every cell of the span between them is
    /// recycled and the cursor lands just before the first cell after the span. When they share a
    /// text cell, the text between their offsets is removed.
    pub fn delete(&mut self) -> Result<(), TreeError> {
        if !self.cursor.same_cell(&self.mark) {
            let Some(span) = self.tree.span_from_points(self.cursor, self.mark) else {
                return Ok(());
            };
            let parent = self
                .tree
                .parent(span.start)
                .ok_or(TreeError::NoParent(span.start))?;
            let stop = self.tree.next_sibling(span.end);
            let cells = self.tree.span_cells(span);
            debug!(count = cells.len(), "deleting span");
            for cell in cells {
                self.tree.recycle(cell);
            }
            self.set_cursor(Point::between(parent, stop));
        } else if self.cursor.left_from.is_none()
            && self.tree.get(self.cursor.parent).is_some_and(|c| c.has_text())
        {
            self.replace_text_selection("")?;
        }
        Ok(())
    }

    /// Step the cursor one boundary.
    pub fn move_one(&mut self, direction: MoveDirection) {
        self.cursor = match direction {
            MoveDirection::Prev => self.tree.prev_point(self.cursor),
            MoveDirection::Next => self.tree.next_point(self.cursor),
        };
    }

    /// Move the cursor to the adjacent display line, at or past its current column.
    ///
    /// Walks boundaries until one lands on the next line at a suitable x. If the walk crosses two
    /// lines without finding one, the cursor stops at the last point of the adjacent line.
    pub fn move_vertical(&mut self, direction: MoveDirection) {
        let engine = self.layout_engine();
        let mut point = self.cursor;
        let old_pos = engine.point_to_display_pos(&self.tree, point);
        let mut line_y = old_pos.y;
        let mut line_count = 0;

        let target = loop {
            let old_point = point;
            point = match direction {
                MoveDirection::Prev => self.tree.prev_point(point),
                MoveDirection::Next => self.tree.next_point(point),
            };
            if point == old_point {
                break point;
            }

            let pos = engine.point_to_display_pos(&self.tree, point);
            let new_line = match direction {
                MoveDirection::Prev => pos.y < line_y,
                MoveDirection::Next => pos.y > line_y,
            };
            if new_line {
                line_y = pos.y;
                line_count += 1;
            }
            if line_count > 1 {
                break old_point;
            }

            let reached = match direction {
                MoveDirection::Prev => pos.y < old_pos.y && pos.x <= old_pos.x,
                MoveDirection::Next => pos.y > old_pos.y && pos.x >= old_pos.x,
            };
            if reached {
                break point;
            }
        };
        self.cursor = target;
    }

    fn apply_motion(&mut self, motion: Motion) {
        match motion.movement {
            Movement::One => self.move_one(motion.direction),
            Movement::Vertical => self.move_vertical(motion.direction),
        }
    }

    fn apply_action(&mut self, action: Action) -> Result<(), TreeError> {
        match action {
            Action::InsertHole => self.insert_hole().map(drop),
            Action::InsertList => self.insert_list().map(drop),
            Action::InsertComment => self.insert_comment().map(drop),
            Action::InsertString => self.insert_string().map(drop),
            Action::Delete => self.delete(),
        }
    }

    /// Run one command: its motion, then its action.
    ///
    /// Deleting commands are special-cased. With an active selection they delete it without
    /// moving. With a collapsed cursor between cells they only move, which selects the adjacent
    /// cell for the next delete.
    pub fn run_command(&mut self, command: &CommandSpec) -> Result<(), TreeError> {
        trace!(trigger = ?command.trigger, "run command");
        if let Some(motion) = command.motion {
            if command.action == Some(Action::Delete) {
                if self.cursor == self.mark {
                    let in_text = self
                        .tree
                        .get(self.cursor.parent)
                        .is_some_and(|c| c.has_text());
                    if !in_text {
                        self.apply_motion(motion);
                        return Ok(());
                    }
                } else {
                    return self.delete();
                }
            }

            self.apply_motion(motion);
            if motion.set_mark {
                self.mark = self.cursor;
            }
        }

        if let Some(action) = command.action {
            self.apply_action(action)?;
        }
        Ok(())
    }

    /// Dispatch a key press through the command table.
    pub fn handle_key(&mut self, key: Key, mods: Modifiers) -> Result<CommandResult, CommandError> {
        let Some(command) = self.commands.find_key(key, mods) else {
            return Ok(CommandResult::Unhandled);
        };
        self.run_command(command)?;
        Ok(CommandResult::Success {
            flags: command.flags,
        })
    }

    /// Feed committed text, one code point at a time.
    ///
    /// Outside string, char and comment cells, code points bound in the command table run their
    /// command. Everything else is spliced into the cursor's cell (a hole is inserted first when
    /// the cursor sits between cells).
    pub fn handle_text(&mut self, text: &str) -> Result<CommandResult, CommandError> {
        let mut inserted = 0;
        let mut flags = None;
        let mut buf = [0u8; 4];

        for ch in text.chars() {
            let parent_kind = self.tree.get(self.cursor.parent).map(|c| c.kind);
            let literal = matches!(
                parent_kind,
                Some(CellKind::String | CellKind::Char | CellKind::Comment)
            );
            if !literal && let Some(command) = self.commands.find_char(ch) {
                self.run_command(command)?;
                flags = Some(flags.unwrap_or_default() | command.flags);
                continue;
            }

            if !parent_kind.is_some_and(CellKind::has_text) {
                self.insert_hole()?;
            }
            if self.cursor.parent == self.mark.parent {
                let encoded = ch.encode_utf8(&mut buf);
                self.replace_text_selection(encoded)?;
                inserted += encoded.len();
            }
        }

        Ok(match (inserted, flags) {
            (0, None) => CommandResult::Unhandled,
            (0, Some(flags)) => CommandResult::Success { flags },
            (bytes, _) => CommandResult::TextInserted { bytes },
        })
    }

    /// Dispatch any input event.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<CommandResult, CommandError> {
        match event {
            InputEvent::Key { key, mods } => self.handle_key(*key, *mods),
            InputEvent::Text(text) => self.handle_text(text),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_defaults()
    }
}
