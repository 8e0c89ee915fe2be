//! Cell tree arena.
//!
//! Every cell of an editing session lives in a single [`CellTree`]. Cells are addressed by a
//! stable [`CellId`] that is never reused, even after the cell is recycled. Ownership is strictly
//! parent-to-child: a list cell owns an ordered `Vec` of child ids, and each child keeps a
//! non-owning parent id plus its index in that `Vec`, so sibling navigation is O(1).
//!
//! The arena grows for the whole session. The only way cells are released is
//! [`CellTree::recycle`], which detaches a cell and frees its entire subtree.

use crate::geometry::Rect;
use bramble_lang::Keyword;
use std::ops::{Index, IndexMut};
use thiserror::Error;

/// Stable identity of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u64);

impl CellId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }

    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// The kind of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Empty placeholder for "nothing typed yet".
    Hole,
    /// A keyword from the language's keyword table.
    Keyword,
    /// A symbol (identifier, or a run of unrecognized characters).
    Symbol,
    /// A character literal.
    Char,
    /// A string literal.
    String,
    /// An unsigned integer literal.
    Int,
    /// A float literal.
    Float,
    /// A comment.
    Comment,
    /// A pattern variable (`$name`).
    Placeholder,
    /// A list of child cells.
    List,
}

impl CellKind {
    /// Returns `true` if cells of this kind own child cells.
    pub fn has_children(self) -> bool {
        self == CellKind::List
    }

    /// Returns `true` if cells of this kind carry a text payload.
    pub fn has_text(self) -> bool {
        self != CellKind::List
    }
}

/// A node of the cell tree.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    parent: Option<CellId>,
    index_in_parent: usize,
    children: Vec<CellId>,

    /// Kind of the cell.
    pub kind: CellKind,
    /// Raw text payload (empty for lists and holes).
    pub text: String,
    /// Keyword token, for [`CellKind::Keyword`] cells.
    pub keyword: Option<Keyword>,
    /// Parsed integer value, for [`CellKind::Int`] cells.
    pub int_value: u64,
    /// Parsed float value, for [`CellKind::Float`] cells.
    pub float_value: f64,

    /// Layout rectangle (written by layout, relative positions resolved to absolute).
    pub rect: Rect,
    /// Width of the last line of a multi-line cell (written by layout).
    pub last_line_width: f32,
}

impl Cell {
    fn new(id: CellId, kind: CellKind) -> Self {
        Self {
            id,
            parent: None,
            index_in_parent: 0,
            children: Vec::new(),
            kind,
            text: String::new(),
            keyword: None,
            int_value: 0,
            float_value: 0.0,
            rect: Rect::default(),
            last_line_width: 0.0,
        }
    }

    /// Stable identity of the cell.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Parent cell, if attached.
    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    /// Ordered children (always empty for non-list cells).
    pub fn children(&self) -> &[CellId] {
        &self.children
    }

    /// Returns `true` if the cell carries a text payload.
    pub fn has_text(&self) -> bool {
        self.kind.has_text()
    }

    /// Returns `true` if the cell owns child cells.
    pub fn has_children(&self) -> bool {
        self.kind.has_children()
    }
}

/// Errors raised when an attach operation would break the tree invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The id refers to a recycled (or never allocated) cell.
    #[error("cell {0:?} is not live")]
    StaleCell(CellId),
    /// The inserted cell is an ancestor of (or equal to) the target parent.
    #[error("attaching cell {cell:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// Cell being attached.
        cell: CellId,
        /// Target parent.
        parent: CellId,
    },
    /// The inserted cell already has a parent.
    #[error("cell {0:?} is already attached")]
    AlreadyAttached(CellId),
    /// The sibling anchor has no parent, so nothing can be inserted next to it.
    #[error("cell {0:?} has no parent")]
    NoParent(CellId),
    /// The target parent cannot own children.
    #[error("cell {0:?} cannot hold children")]
    NotAList(CellId),
}

/// Session-scoped arena owning every cell.
#[derive(Debug, Clone, Default)]
pub struct CellTree {
    slots: Vec<Option<Cell>>,
    live: usize,
}

impl CellTree {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached cell of `kind`.
    pub fn alloc(&mut self, kind: CellKind) -> CellId {
        let id = CellId(self.slots.len() as u64);
        self.slots.push(Some(Cell::new(id, kind)));
        self.live += 1;
        id
    }

    /// Allocate a detached cell of `kind` with a text payload.
    pub fn alloc_text(&mut self, kind: CellKind, text: impl Into<String>) -> CellId {
        let id = self.alloc(kind);
        self[id].text = text.into();
        id
    }

    /// Number of live cells.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no cell is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns `true` if `id` refers to a live cell.
    pub fn contains(&self, id: CellId) -> bool {
        self.get(id).is_some()
    }

    /// Fallible lookup.
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    /// Fallible mutable lookup.
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    fn live(&self, id: CellId) -> Result<&Cell, TreeError> {
        self.get(id).ok_or(TreeError::StaleCell(id))
    }

    /// Parent of `id`.
    pub fn parent(&self, id: CellId) -> Option<CellId> {
        self.get(id).and_then(|c| c.parent)
    }

    /// First child of `id`.
    pub fn first_child(&self, id: CellId) -> Option<CellId> {
        self.get(id).and_then(|c| c.children.first().copied())
    }

    /// Last child of `id`.
    pub fn last_child(&self, id: CellId) -> Option<CellId> {
        self.get(id).and_then(|c| c.children.last().copied())
    }

    /// Sibling immediately after `id`.
    pub fn next_sibling(&self, id: CellId) -> Option<CellId> {
        let cell = self.get(id)?;
        let parent = self.get(cell.parent?)?;
        parent.children.get(cell.index_in_parent + 1).copied()
    }

    /// Sibling immediately before `id`.
    pub fn prev_sibling(&self, id: CellId) -> Option<CellId> {
        let cell = self.get(id)?;
        let parent = self.get(cell.parent?)?;
        let index = cell.index_in_parent.checked_sub(1)?;
        parent.children.get(index).copied()
    }

    /// Index of `id` within its parent's children.
    pub fn index_in_parent(&self, id: CellId) -> Option<usize> {
        let cell = self.get(id)?;
        cell.parent.map(|_| cell.index_in_parent)
    }

    /// Ancestor chain of `id`, starting with `id` itself and ending with its root.
    pub fn ancestors(&self, id: CellId) -> Vec<CellId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).map(|c| c.id);
        while let Some(cell) = current {
            chain.push(cell);
            current = self.parent(cell);
        }
        chain
    }

    /// Root of the tree containing `id`.
    pub fn root_of(&self, id: CellId) -> CellId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Returns `true` if `ancestor` is `cell` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: CellId, cell: CellId) -> bool {
        let mut current = Some(cell);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Attach detached `cell` as the last child of `parent`.
    pub fn push_child(&mut self, parent: CellId, cell: CellId) -> Result<(), TreeError> {
        let index = self.live(parent)?.children.len();
        self.attach(parent, index, cell)
    }

    /// Attach detached `cell` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: CellId, cell: CellId) -> Result<(), TreeError> {
        let anchor = self.live(sibling)?;
        let parent = anchor.parent.ok_or(TreeError::NoParent(sibling))?;
        let index = anchor.index_in_parent;
        self.attach(parent, index, cell)
    }

    /// Attach detached `cell` immediately after `sibling`.
    pub fn insert_after(&mut self, sibling: CellId, cell: CellId) -> Result<(), TreeError> {
        let anchor = self.live(sibling)?;
        let parent = anchor.parent.ok_or(TreeError::NoParent(sibling))?;
        let index = anchor.index_in_parent + 1;
        self.attach(parent, index, cell)
    }

    fn attach(&mut self, parent: CellId, index: usize, cell: CellId) -> Result<(), TreeError> {
        let target = self.live(parent)?;
        if !target.kind.has_children() {
            return Err(TreeError::NotAList(parent));
        }
        if self.live(cell)?.parent.is_some() {
            return Err(TreeError::AlreadyAttached(cell));
        }
        if self.is_ancestor_or_self(cell, parent) {
            return Err(TreeError::WouldCycle { cell, parent });
        }

        self[parent].children.insert(index, cell);
        self[cell].parent = Some(parent);
        self.reindex_children(parent, index);
        Ok(())
    }

    /// Detach `cell` from its parent. Detaching a root (or a stale id) is a no-op.
    pub fn detach(&mut self, cell: CellId) {
        let Some((parent, index)) = self
            .get(cell)
            .and_then(|c| c.parent.map(|p| (p, c.index_in_parent)))
        else {
            return;
        };

        if let Some(p) = self.get_mut(parent) {
            p.children.remove(index);
        }
        self.reindex_children(parent, index);
        self[cell].parent = None;
        self[cell].index_in_parent = 0;
    }

    /// Detach `cell`, then free it together with all of its descendants.
    pub fn recycle(&mut self, cell: CellId) {
        if !self.contains(cell) {
            return;
        }
        self.detach(cell);

        let mut pending = vec![cell];
        while let Some(id) = pending.pop() {
            if let Some(freed) = self.slots.get_mut(id.slot()).and_then(Option::take) {
                self.live -= 1;
                pending.extend(freed.children);
            }
        }
    }

    fn reindex_children(&mut self, parent: CellId, from: usize) {
        let children = match self.get(parent) {
            Some(p) => p.children[from.min(p.children.len())..].to_vec(),
            None => return,
        };
        for (offset, child) in children.into_iter().enumerate() {
            if let Some(c) = self.get_mut(child) {
                c.index_in_parent = from + offset;
            }
        }
    }

    /// Depth-first pre-order walk of the subtree rooted at `root`, with depths.
    pub fn walk(&self, root: CellId) -> Vec<(CellId, usize)> {
        let mut out = Vec::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(cell) = self.get(id) else {
                continue;
            };
            out.push((id, depth));
            for &child in cell.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

impl Index<CellId> for CellTree {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Cell {
        match self.get(id) {
            Some(cell) => cell,
            None => panic!("cell {:?} is not live", id),
        }
    }
}

impl IndexMut<CellId> for CellTree {
    fn index_mut(&mut self, id: CellId) -> &mut Cell {
        match self.get_mut(id) {
            Some(cell) => cell,
            None => panic!("cell {:?} is not live", id),
        }
    }
}
