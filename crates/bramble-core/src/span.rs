//! Span resolution: turning two points into a contiguous range of sibling cells.
//!
//! Given a cursor and a mark anywhere in a tree, [`CellTree::span_from_points`] finds the
//! smallest run of siblings `[start, end]` such that one point lies directly left of `start` (or
//! inside it) and the other lies directly right of `end` (or inside it). Three cases:
//!
//! 1. Both points share a parent: the span runs from the first point's right neighbor to the
//!    second point's left neighbor.
//! 2. One point sits between children of the common ancestor, the other inside one of those
//!    children: the span runs between that child and the first point's neighbor.
//! 3. Both points sit inside two distinct children of the common ancestor: the span is exactly
//!    those two children.
//!
//! Ordering always comes from a single left-to-right scan of the common ancestor's children, so
//! `start` precedes `end` regardless of which argument was the cursor.

use crate::point::Point;
use crate::tree::{CellId, CellTree};

/// An inclusive run of sibling cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSpan {
    /// First cell of the run.
    pub start: CellId,
    /// Last cell of the run (may equal `start`).
    pub end: CellId,
}

impl CellTree {
    /// Resolve the sibling span bounded by `point` and `mark`.
    ///
    /// Returns `None` when the points bound no cell (same gap, both inside one text cell, or
    /// points in unrelated trees).
    pub fn span_from_points(&self, point: Point, mark: Point) -> Option<CellSpan> {
        if point.parent == mark.parent {
            return self.span_same_parent(point, mark);
        }

        let point_chain = self.ancestors(point.parent);
        let mark_chain = self.ancestors(mark.parent);
        if point_chain.last() != mark_chain.last() {
            return None;
        }

        // Walk both chains from the root end; `depth` is the number of shared ancestors.
        let depth = point_chain
            .iter()
            .rev()
            .zip(mark_chain.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let common = point_chain[point_chain.len() - depth];

        // The child of `common` containing each point, or `common` itself if the point sits
        // directly between `common`'s children.
        let subtree_of = |chain: &[CellId]| -> CellId {
            if chain.len() > depth {
                chain[chain.len() - depth - 1]
            } else {
                common
            }
        };
        let point_subtree = subtree_of(&point_chain);
        let mark_subtree = subtree_of(&mark_chain);

        let children = self.get(common)?.children();

        if point.parent == common || mark.parent == common {
            let (p0, subtree) = if point.parent == common {
                (point, mark_subtree)
            } else {
                (mark, point_subtree)
            };
            for &child in children {
                if Some(child) == p0.left_from {
                    return Some(CellSpan {
                        start: child,
                        end: subtree,
                    });
                }
                if child == subtree {
                    return Some(CellSpan {
                        start: subtree,
                        end: self.point_left_cell(p0)?,
                    });
                }
            }
            None
        } else {
            for &child in children {
                if child == point_subtree {
                    return Some(CellSpan {
                        start: point_subtree,
                        end: mark_subtree,
                    });
                }
                if child == mark_subtree {
                    return Some(CellSpan {
                        start: mark_subtree,
                        end: point_subtree,
                    });
                }
            }
            None
        }
    }

    fn span_same_parent(&self, point: Point, mark: Point) -> Option<CellSpan> {
        if point.left_from == mark.left_from {
            return None;
        }
        for &child in self.get(point.parent)?.children() {
            if Some(child) == point.left_from {
                return Some(CellSpan {
                    start: child,
                    end: self.point_left_cell(mark)?,
                });
            }
            if Some(child) == mark.left_from {
                return Some(CellSpan {
                    start: child,
                    end: self.point_left_cell(point)?,
                });
            }
        }
        None
    }

    /// The cells of `span`, in order.
    pub fn span_cells(&self, span: CellSpan) -> Vec<CellId> {
        let mut out = Vec::new();
        let mut current = Some(span.start);
        while let Some(cell) = current {
            out.push(cell);
            if cell == span.end {
                break;
            }
            current = self.next_sibling(cell);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CellKind;

    struct Fixture {
        tree: CellTree,
        root: CellId,
        a: CellId,
        list: CellId,
        inner: [CellId; 2],
        d: CellId,
    }

    // (a (x y) d)
    fn fixture() -> Fixture {
        let mut tree = CellTree::new();
        let root = tree.alloc(CellKind::List);
        let a = tree.alloc_text(CellKind::Symbol, "a");
        let list = tree.alloc(CellKind::List);
        let x = tree.alloc_text(CellKind::Symbol, "x");
        let y = tree.alloc_text(CellKind::Symbol, "y");
        let d = tree.alloc_text(CellKind::Symbol, "d");
        tree.push_child(root, a).unwrap();
        tree.push_child(root, list).unwrap();
        tree.push_child(list, x).unwrap();
        tree.push_child(list, y).unwrap();
        tree.push_child(root, d).unwrap();
        Fixture {
            tree,
            root,
            a,
            list,
            inner: [x, y],
            d,
        }
    }

    #[test]
    fn same_parent_is_order_independent() {
        let f = fixture();
        let p = Point::between(f.root, Some(f.a));
        let m = Point::between(f.root, Some(f.d));
        let expected = Some(CellSpan {
            start: f.a,
            end: f.list,
        });
        assert_eq!(f.tree.span_from_points(p, m), expected);
        assert_eq!(f.tree.span_from_points(m, p), expected);
        assert_eq!(f.tree.span_from_points(p, p), None);
    }

    #[test]
    fn one_point_in_common_ancestor() {
        let f = fixture();
        let outside = Point::between(f.root, Some(f.d));
        let inside = Point::between(f.list, Some(f.inner[1]));
        let span = f.tree.span_from_points(outside, inside);
        assert_eq!(
            span,
            Some(CellSpan {
                start: f.list,
                end: f.list
            })
        );

        let at_start = Point::between(f.root, Some(f.a));
        assert_eq!(
            f.tree.span_from_points(inside, at_start),
            Some(CellSpan {
                start: f.a,
                end: f.list
            })
        );
    }

    #[test]
    fn points_in_two_subtrees() {
        let f = fixture();
        let in_a = Point::in_text(f.a, 1);
        let in_x = Point::in_text(f.inner[0], 0);
        let expected = Some(CellSpan {
            start: f.a,
            end: f.list,
        });
        assert_eq!(f.tree.span_from_points(in_x, in_a), expected);
        assert_eq!(f.tree.span_from_points(in_a, in_x), expected);
        assert_eq!(f.tree.span_cells(expected.unwrap()), vec![f.a, f.list]);
    }

    #[test]
    fn unrelated_trees_have_no_span() {
        let mut f = fixture();
        let other = f.tree.alloc(CellKind::List);
        let p = Point::between(other, None);
        let m = Point::between(f.root, Some(f.a));
        assert_eq!(f.tree.span_from_points(p, m), None);
    }
}
