//! Built-in listeners and responders.
//!
//! - `($p wishes $q is labeled $s)` labels card `q` with string `s`.
//! - `($p wishes $q is highlighted $s)` highlights card `q` with the color named by `s`.
//! - `($p points $dir at $q)` answers spatial queries from card geometry: a card points in a
//!   direction at every card containing the tip of its whisker in that direction.

use crate::card::{Card, CardId, Direction, Stamp, highlight_color};
use crate::facts::{Binding, Listener, Responder, find_binding};
use crate::list;
use crate::value::Value;

fn wishes_pattern(verb: &str) -> Value {
    list!["$p", "wishes", "$q", "is", verb, "$s"]
}

/// Target card and string argument of a `wishes ... is <verb> $s` match.
fn target_and_text(bindings: &[Binding]) -> Option<(CardId, &str)> {
    let q = find_binding(bindings, "q")?.as_card()?;
    match find_binding(bindings, "s")? {
        Value::String(s) => Some((q, s)),
        _ => None,
    }
}

/// Sets card labels.
#[derive(Debug, Clone)]
pub struct LabelListener {
    pattern: Value,
}

impl LabelListener {
    /// Create the listener.
    pub fn new() -> Self {
        Self {
            pattern: wishes_pattern("labeled"),
        }
    }
}

impl Default for LabelListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for LabelListener {
    fn pattern(&self) -> &Value {
        &self.pattern
    }

    fn on_match(&self, _fact: &Value, bindings: &[Binding], cards: &mut [Card], frame: u32) {
        let Some((target, label)) = target_and_text(bindings) else {
            return;
        };
        for card in cards.iter_mut().filter(|c| c.id == target) {
            card.stamps.label = Some(Stamp::new(label.to_string(), frame));
        }
    }
}

/// Sets card highlights. Unknown color names are ignored.
#[derive(Debug, Clone)]
pub struct HighlightListener {
    pattern: Value,
}

impl HighlightListener {
    /// Create the listener.
    pub fn new() -> Self {
        Self {
            pattern: wishes_pattern("highlighted"),
        }
    }
}

impl Default for HighlightListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for HighlightListener {
    fn pattern(&self) -> &Value {
        &self.pattern
    }

    fn on_match(&self, _fact: &Value, bindings: &[Binding], cards: &mut [Card], frame: u32) {
        let Some((target, name)) = target_and_text(bindings) else {
            return;
        };
        let Some(color) = highlight_color(name) else {
            return;
        };
        for card in cards.iter_mut().filter(|c| c.id == target) {
            card.stamps.highlight = Some(Stamp::new(color, frame));
        }
    }
}

/// Answers `($p points $dir at $q)` from card rectangles.
#[derive(Debug, Clone)]
pub struct PointsResponder {
    pattern: Value,
    whisker_size: f32,
}

impl PointsResponder {
    /// Create the responder with whiskers of length `whisker_size`.
    pub fn new(whisker_size: f32) -> Self {
        Self {
            pattern: list!["$p", "points", "$dir", "at", "$q"],
            whisker_size,
        }
    }
}

fn selects_card(selector: &Value, id: CardId) -> bool {
    match selector {
        Value::Placeholder(_) => true,
        Value::Card(c) => *c == id,
        _ => false,
    }
}

fn selects_direction(selector: &Value, dir: Direction) -> bool {
    match selector {
        Value::Placeholder(_) => true,
        Value::Symbol(name) => name == dir.name(),
        _ => false,
    }
}

impl Responder for PointsResponder {
    fn pattern(&self) -> &Value {
        &self.pattern
    }

    fn respond(
        &self,
        _query: &Value,
        bindings: &[Binding],
        cards: &mut [Card],
        frame: u32,
    ) -> Vec<Vec<Value>> {
        let (Some(p), Some(dir), Some(q)) = (
            find_binding(bindings, "p"),
            find_binding(bindings, "dir"),
            find_binding(bindings, "q"),
        ) else {
            return Vec::new();
        };

        let targets: Vec<_> = cards.iter().map(|c| (c.id, c.rect)).collect();
        let mut facts = Vec::new();

        for pointer in cards.iter_mut().filter(|c| selects_card(p, c.id)) {
            for direction in Direction::ALL.into_iter().filter(|&d| selects_direction(dir, d)) {
                let whisker = &mut pointer.stamps.whiskers[direction.index()];
                whisker.shown_frame = Some(frame);

                let tip = direction.whisker_tip(&pointer.rect, self.whisker_size);
                for &(target, rect) in targets.iter().filter(|(id, _)| selects_card(q, *id)) {
                    if rect.contains(tip) {
                        whisker.bold_frame = Some(frame);
                        facts.push(vec![
                            Value::Card(pointer.id),
                            Value::symbol("points"),
                            Value::symbol(direction.name()),
                            Value::symbol("at"),
                            Value::Card(target),
                        ]);
                    }
                }
            }
        }
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Color;
    use crate::facts::FactsDb;
    use crate::geometry::Rect;
    use crate::tree::CellTree;
    use pretty_assertions::assert_eq;

    fn cards() -> Vec<Card> {
        let mut tree = CellTree::new();
        let a = tree.alloc(crate::tree::CellKind::List);
        let b = tree.alloc(crate::tree::CellKind::List);
        vec![
            Card::new(CardId(1), Rect::new(0.0, 0.0, 100.0, 100.0), a),
            Card::new(CardId(2), Rect::new(150.0, 0.0, 100.0, 100.0), b),
        ]
    }

    #[test]
    fn test_label_listener() {
        let mut cards = cards();
        let mut db = FactsDb::new(7);
        db.add_listener(Box::new(LabelListener::new()));
        db.push_fact(vec![
            Value::Card(CardId(1)),
            Value::symbol("wishes"),
            Value::Card(CardId(2)),
            Value::symbol("is"),
            Value::symbol("labeled"),
            Value::string("hi"),
        ]);
        db.run_listeners(&mut cards);
        assert_eq!(cards[1].stamps.label_at(7), Some("hi"));
        assert_eq!(cards[0].stamps.label_at(7), None);
    }

    #[test]
    fn test_highlight_listener_ignores_unknown_colors() {
        let mut cards = cards();
        let mut db = FactsDb::new(1);
        db.add_listener(Box::new(HighlightListener::new()));
        for color in ["purple", "blue"] {
            db.push_fact(vec![
                Value::Card(CardId(2)),
                Value::symbol("wishes"),
                Value::Card(CardId(1)),
                Value::symbol("is"),
                Value::symbol("highlighted"),
                Value::string(color),
            ]);
        }
        db.run_listeners(&mut cards);
        assert_eq!(cards[0].stamps.highlight_at(1), Some(Color::rgb(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_points_responder_hits_neighbor() {
        let mut cards = cards();
        let mut db = FactsDb::new(4);
        db.add_responder(Box::new(PointsResponder::new(100.0)));

        let query = list![CardId(1), "points", "$d", "at", "$x"];
        let matches = db.match_pattern(&query, &mut cards);
        assert_eq!(matches.len(), 1);
        assert_eq!(
            db.facts()[0].root,
            list![CardId(1), "points", "right", "at", CardId(2)]
        );

        let stamps = &cards[0].stamps;
        for dir in Direction::ALL {
            assert!(stamps.whisker_shown_at(dir, 4));
        }
        assert!(stamps.whisker_bold_at(Direction::Right, 4));
        assert!(!stamps.whisker_bold_at(Direction::Left, 4));
        assert!(!cards[1].stamps.whisker_shown_at(Direction::Right, 4));
    }

    #[test]
    fn test_points_responder_respects_direction() {
        let mut cards = cards();
        let mut db = FactsDb::new(1);
        db.add_responder(Box::new(PointsResponder::new(100.0)));
        let query = list!["$p", "points", "up", "at", "$q"];
        assert!(db.match_pattern(&query, &mut cards).is_empty());
        assert!(cards[0].stamps.whisker_shown_at(Direction::Up, 1));
        assert!(!cards[0].stamps.whisker_shown_at(Direction::Right, 1));
    }
}
