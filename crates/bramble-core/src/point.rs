//! Boundary-based cursor addressing over the hybrid tree/text structure.
//!
//! A [`Point`] sits *between* things: between two sibling cells of a list, or between two
//! grapheme clusters of a text cell. [`CellTree::prev_point`] and [`CellTree::next_point`]
//! implement an in-order walk over every such boundary of a tree.

use crate::text::{next_boundary, prev_boundary};
use crate::tree::{CellId, CellKind, CellTree};

/// A cursor position.
///
/// - `parent`: the cell the point lives in.
/// - `left_from`: the child of `parent` immediately to the right of the point, or `None` if the
///   point is after the last child.
/// - `offset`: byte offset into `parent`'s text; only meaningful when `parent` has text and
///   `left_from` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// Cell containing the point.
    pub parent: CellId,
    /// Sibling immediately to the right of the point.
    pub left_from: Option<CellId>,
    /// Byte offset in `parent`'s text.
    pub offset: usize,
}

impl Point {
    /// Point just before `left_from` (or at the end of `parent` when `None`).
    pub fn between(parent: CellId, left_from: Option<CellId>) -> Self {
        Self {
            parent,
            left_from,
            offset: 0,
        }
    }

    /// Point at byte `offset` inside a text cell.
    pub fn in_text(cell: CellId, offset: usize) -> Self {
        Self {
            parent: cell,
            left_from: None,
            offset,
        }
    }

    /// Returns `true` if both points address the same gap, ignoring text offsets.
    pub fn same_cell(&self, other: &Point) -> bool {
        self.parent == other.parent && self.left_from == other.left_from
    }
}

impl CellTree {
    /// Cell immediately to the left of `point`, if any.
    pub fn point_left_cell(&self, point: Point) -> Option<CellId> {
        match point.left_from {
            Some(right) => self.prev_sibling(right),
            None => self.last_child(point.parent),
        }
    }

    /// Cell immediately to the right of `point`, if any.
    pub fn point_right_cell(&self, point: Point) -> Option<CellId> {
        point.left_from
    }

    /// Point just before `cell`, within its parent.
    pub fn point_before(&self, cell: CellId) -> Option<Point> {
        self.parent(cell).map(|p| Point::between(p, Some(cell)))
    }

    /// Point just after `cell`, within its parent.
    pub fn point_after(&self, cell: CellId) -> Option<Point> {
        self.parent(cell)
            .map(|p| Point::between(p, self.next_sibling(cell)))
    }

    /// Step one boundary to the left. At the leftmost point of a root, returns `point` unchanged.
    pub fn prev_point(&self, point: Point) -> Point {
        let Some(parent) = self.get(point.parent) else {
            return point;
        };

        if parent.has_text() && point.offset > 0 {
            return Point {
                offset: prev_boundary(&parent.text, point.offset),
                ..point
            };
        }

        if let Some(left) = self.point_left_cell(point) {
            let cell = &self[left];
            // Every leaf carries text, so the walk always enters the left sibling at its end.
            let offset = if cell.kind == CellKind::Hole {
                0
            } else {
                cell.text.len()
            };
            return Point::in_text(left, offset);
        }

        match parent.parent() {
            Some(grand) => Point::between(grand, Some(point.parent)),
            None => point,
        }
    }

    /// Step one boundary to the right. At the rightmost point of a root, returns `point` unchanged.
    pub fn next_point(&self, point: Point) -> Point {
        let Some(parent) = self.get(point.parent) else {
            return point;
        };

        if parent.has_text() && parent.kind != CellKind::Hole && point.offset < parent.text.len() {
            return Point {
                offset: next_boundary(&parent.text, point.offset),
                ..point
            };
        }

        if let Some(right) = point.left_from {
            return Point::between(right, self.first_child(right));
        }

        match parent.parent() {
            Some(grand) => Point::between(grand, self.next_sibling(point.parent)),
            None => point,
        }
    }
}
