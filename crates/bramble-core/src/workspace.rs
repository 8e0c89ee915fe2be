//! Board workspace.
//!
//! [`Workspace`] ties the pieces together: it owns the [`Editor`] (cell arena, cursor and mark),
//! the cards laid out on the board, and the rule [`Program`]. A host drives it once per frame:
//!
//! 1. [`Workspace::update_frame`] interprets every card to a fixed point.
//! 2. [`Workspace::handle_input`] applies input to the edited card.
//! 3. [`Workspace::snapshot`] lays cards out and hands plain data to the renderer.

use crate::card::{Card, CardId};
use crate::commands::{CommandError, CommandFlags, CommandResult, InputEvent};
use crate::editor::Editor;
use crate::geometry::{Rect, Vec2};
use crate::interpreter::{FixedPointReport, Program, ProgramConfig};
use crate::point::Point;
use crate::snapshot::{BoardSnapshot, CardSnapshot, CursorSnapshot};
use tracing::debug;

/// Card-local origin of a card's first cell.
pub const CARD_CONTENT_ORIGIN: Vec2 = Vec2::new(10.0, 20.0);

/// Cards, editor and rule program of one board.
pub struct Workspace {
    editor: Editor,
    program: Program,
    cards: Vec<Card>,
    edited: Option<CardId>,
    next_card_id: u64,
}

impl Workspace {
    /// A workspace with default editor settings and the built-in rules.
    pub fn new() -> Self {
        Self::with_parts(Editor::with_defaults(), ProgramConfig::default())
    }

    /// A workspace over a configured editor and program configuration.
    pub fn with_parts(editor: Editor, config: ProgramConfig) -> Self {
        Self {
            editor,
            program: Program::with_builtins(config),
            cards: Vec::new(),
            edited: None,
            next_card_id: 1,
        }
    }

    /// The editor.
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Mutable access to the editor.
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// The rule program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Mutable access to the rule program.
    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    /// All cards, in board order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Card by id.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    fn card_mut(&mut self, id: CardId) -> Result<&mut Card, CommandError> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CommandError::UnknownCard(id))
    }

    /// Add an empty card at `rect`.
    pub fn add_card(&mut self, rect: Rect) -> CardId {
        let id = CardId(self.next_card_id);
        self.next_card_id += 1;
        let root = self.editor.new_root();
        self.cards.push(Card::new(id, rect, root));
        debug!(card = %id, "card added");
        id
    }

    /// Move or resize a card.
    pub fn set_card_rect(&mut self, id: CardId, rect: Rect) -> Result<(), CommandError> {
        self.card_mut(id)?.rect = rect;
        Ok(())
    }

    /// Card being edited.
    pub fn edited_card(&self) -> Option<CardId> {
        self.edited
    }

    /// Start editing `id`, with the cursor before its first top-level form.
    pub fn focus_card(&mut self, id: CardId) -> Result<(), CommandError> {
        let root = self.card_mut(id)?.root;
        let first = self.editor.tree().first_child(root);
        self.editor.set_cursor(Point::between(root, first));
        self.edited = Some(id);
        self.layout_card(id)?;
        Ok(())
    }

    /// Stop editing.
    pub fn unfocus(&mut self) {
        self.edited = None;
    }

    /// Apply input to the edited card, re-running layout when the tree changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<CommandResult, CommandError> {
        let id = self.edited.ok_or(CommandError::NoEditedCard)?;
        let result = self.editor.handle_input(event)?;
        let relayout = match result {
            CommandResult::Success { flags } => flags.contains(CommandFlags::REBUILD),
            CommandResult::TextInserted { .. } => true,
            CommandResult::Unhandled => false,
        };
        if relayout {
            self.layout_card(id)?;
        }
        Ok(result)
    }

    /// Interpret every card to a fixed point.
    pub fn update_frame(&mut self) -> FixedPointReport {
        self.program.update(self.editor.tree(), &mut self.cards)
    }

    /// Lay out one card's cells in card-local coordinates.
    pub fn layout_card(&mut self, id: CardId) -> Result<(), CommandError> {
        let root = self.card(id).ok_or(CommandError::UnknownCard(id))?.root;
        self.editor.layout(root, CARD_CONTENT_ORIGIN);
        Ok(())
    }

    /// Lay out every card.
    pub fn layout_all(&mut self) {
        for index in 0..self.cards.len() {
            let root = self.cards[index].root;
            self.editor.layout(root, CARD_CONTENT_ORIGIN);
        }
    }

    /// Lay out every card and capture the board for rendering.
    pub fn snapshot(&mut self) -> BoardSnapshot {
        self.layout_all();
        let frame = self.program.last_frame();
        let tree = self.editor.tree();
        let cards = self
            .cards
            .iter()
            .map(|card| CardSnapshot::capture(tree, card, frame, Some(card.id) == self.edited))
            .collect();
        let cursor = self.edited.map(|card| CursorSnapshot {
            card,
            cursor: self.editor.point_to_display_pos(self.editor.cursor()),
            mark: self.editor.point_to_display_pos(self.editor.mark()),
        });
        BoardSnapshot {
            frame,
            cards,
            cursor,
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Key, Modifiers};

    fn type_text(ws: &mut Workspace, text: &str) {
        ws.handle_input(&InputEvent::Text(text.to_string())).unwrap();
    }

    #[test]
    fn test_input_requires_edited_card() {
        let mut ws = Workspace::new();
        ws.add_card(Rect::new(0.0, 0.0, 200.0, 200.0));
        let err = ws.handle_input(&InputEvent::Text("a".into())).unwrap_err();
        assert_eq!(err, CommandError::NoEditedCard);
        assert_eq!(
            ws.focus_card(CardId(42)).unwrap_err(),
            CommandError::UnknownCard(CardId(42))
        );
    }

    #[test]
    fn test_focus_puts_cursor_before_first_form() {
        let mut ws = Workspace::new();
        let id = ws.add_card(Rect::new(0.0, 0.0, 200.0, 200.0));
        ws.focus_card(id).unwrap();
        type_text(&mut ws, "(claim a");
        ws.unfocus();
        ws.focus_card(id).unwrap();

        let root = ws.card(id).unwrap().root;
        let first = ws.editor().tree().first_child(root);
        assert!(first.is_some());
        assert_eq!(ws.editor().cursor(), Point::between(root, first));
    }

    #[test]
    fn test_typed_label_rule_stamps_card() {
        let mut ws = Workspace::new();
        let id = ws.add_card(Rect::new(0.0, 0.0, 200.0, 200.0));
        ws.focus_card(id).unwrap();
        type_text(&mut ws, "(wish self is labeled \"hello");

        let report = ws.update_frame();
        assert_eq!(report.fact_count, 1);
        let snapshot = ws.snapshot();
        assert_eq!(snapshot.frame, Some(report.frame));
        let card = snapshot.card(id).unwrap();
        assert_eq!(card.label.as_deref(), Some("hello"));
        assert!(card.edited);
        assert!(snapshot.cursor.is_some());
    }

    #[test]
    fn test_stamps_expire_when_rule_is_deleted() {
        let mut ws = Workspace::new();
        let id = ws.add_card(Rect::new(0.0, 0.0, 200.0, 200.0));
        ws.focus_card(id).unwrap();
        type_text(&mut ws, "(wish self is labeled \"x");
        ws.update_frame();
        assert!(ws.snapshot().card(id).unwrap().label.is_some());

        // Select the whole form from the end of the root and delete it.
        let root = ws.card(id).unwrap().root;
        ws.editor_mut().set_cursor(Point::between(root, None));
        let backspace = InputEvent::Key {
            key: Key::Backspace,
            mods: Modifiers::empty(),
        };
        ws.handle_input(&backspace).unwrap();
        ws.handle_input(&backspace).unwrap();
        assert!(ws.editor().tree().first_child(root).is_none());

        ws.update_frame();
        assert_eq!(ws.snapshot().card(id).unwrap().label, None);
    }
}
