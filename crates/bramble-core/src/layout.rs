//! Headless layout of cell trees.
//!
//! Layout assigns every cell a rectangle and a "last line width" (the width of the final line of
//! a multi-line list, used to place the closing decorator and a trailing cursor). Text is
//! measured through the host-provided [`TextMetrics`]; [`MonospaceMetrics`] is a grid-based
//! implementation using UAX #11 character widths.
//!
//! Lists lay out horizontally unless their head keyword asks for a vertical shape, or a child is
//! already vertical. Vertical lists run in three phases: an *inline* group on the first line, then
//! *aligned* groups lined up under the first inline argument, then *indented* groups.

use crate::geometry::{Rect, Vec2};
use crate::point::Point;
use crate::tree::{CellId, CellKind, CellTree};
use bramble_lang::Keyword;
use unicode_width::UnicodeWidthStr;

/// Extent of a measured string.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    /// Logical advance width.
    pub width: f32,
    /// Distance from baseline to top.
    pub ascent: f32,
    /// Distance from baseline to bottom.
    pub descent: f32,
}

/// Font metrics provided by the rendering host.
pub trait TextMetrics {
    /// Measure `text` with the editor font.
    fn measure(&self, text: &str) -> TextExtent;

    /// Width of a single space.
    fn space_width(&self) -> f32 {
        self.measure(" ").width
    }

    /// Height of one line of text.
    fn line_height(&self) -> f32 {
        let extent = self.measure(" ");
        extent.ascent + extent.descent
    }
}

/// Fixed-grid metrics: every terminal column is `cell_width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    /// Width of one column.
    pub cell_width: f32,
    /// Ascent of the font.
    pub ascent: f32,
    /// Descent of the font.
    pub descent: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            cell_width: 1.0,
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, text: &str) -> TextExtent {
        TextExtent {
            width: UnicodeWidthStr::width(text) as f32 * self.cell_width,
            ascent: self.ascent,
            descent: self.descent,
        }
    }
}

/// Shape options for a list, derived from its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListShape {
    /// Lay children out on several lines.
    pub vertical: bool,
    /// Children kept on the first line after the head.
    pub inline_count: usize,
    /// Number of aligned groups (`None` = all remaining children).
    pub aligned_group_count: Option<usize>,
    /// Children per aligned group.
    pub aligned_group_size: usize,
    /// Children per indented group.
    pub indented_group_size: usize,
    /// Leave a blank line after this list when it ends a vertical group.
    pub end_gap: bool,
}

impl ListShape {
    /// Shape of `cell` in `tree`: the root is one form per line, `when` lists keep their pattern
    /// inline and indent their body.
    pub fn for_cell(tree: &CellTree, cell: CellId) -> Self {
        let Some(c) = tree.get(cell) else {
            return Self::default();
        };
        if c.kind != CellKind::List {
            return Self::default();
        }
        if c.parent().is_none() {
            return Self {
                vertical: true,
                aligned_group_count: None,
                aligned_group_size: 1,
                ..Self::default()
            };
        }
        let head = c.children().first().and_then(|&h| tree.get(h));
        match head.and_then(|h| h.keyword) {
            Some(Keyword::When) => Self {
                vertical: true,
                inline_count: 1,
                aligned_group_count: Some(1),
                aligned_group_size: 1,
                indented_group_size: 1,
                end_gap: false,
            },
            _ => Self::default(),
        }
    }
}

/// Output of laying out one cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellLayout {
    /// Rectangle relative to the parent's content origin.
    pub rect: Rect,
    /// Width of the last line.
    pub last_line_width: f32,
    /// Whether the cell spans several lines.
    pub vertical: bool,
    /// Whether a blank line should follow the cell.
    pub end_gap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Inline,
    Aligned,
    Indented,
}

/// Lays out cell trees against a [`TextMetrics`] implementation.
pub struct LayoutEngine<'m> {
    metrics: &'m dyn TextMetrics,
    space_width: f32,
    line_height: f32,
}

impl<'m> LayoutEngine<'m> {
    /// Create an engine over `metrics`.
    pub fn new(metrics: &'m dyn TextMetrics) -> Self {
        Self {
            metrics,
            space_width: metrics.space_width(),
            line_height: metrics.line_height(),
        }
    }

    /// Width of one space.
    pub fn space_width(&self) -> f32 {
        self.space_width
    }

    /// Height of one line.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Width of the opening decorator: `(` for nested lists, `"` for strings, `;;` for comments.
    pub fn left_decorator_width(&self, tree: &CellTree, cell: CellId) -> f32 {
        match tree.get(cell) {
            Some(c) if c.kind == CellKind::List && c.parent().is_some() => self.space_width,
            Some(c) if c.kind == CellKind::String => self.space_width,
            Some(c) if c.kind == CellKind::Comment => 2.0 * self.space_width,
            _ => 0.0,
        }
    }

    /// Width of the closing decorator.
    pub fn right_decorator_width(&self, tree: &CellTree, cell: CellId) -> f32 {
        self.left_decorator_width(tree, cell)
    }

    /// Width of the first `offset` bytes of `text`.
    pub fn offset_width(&self, text: &str, offset: usize) -> f32 {
        let offset = crate::text::floor_char_boundary(text, offset);
        self.metrics.measure(&text[..offset]).width
    }

    /// Lay out the tree rooted at `root` with its top-left corner at `origin`, writing absolute
    /// rectangles into every cell.
    pub fn layout(&self, tree: &mut CellTree, root: CellId, origin: Vec2) -> CellLayout {
        let result = self.layout_cell(tree, root, Vec2::default());
        self.offset_rects(tree, root, origin);
        result
    }

    fn layout_cell(&self, tree: &mut CellTree, cell: CellId, pos: Vec2) -> CellLayout {
        let mut result = CellLayout {
            rect: Rect::new(pos.x, pos.y, 0.0, self.line_height),
            ..CellLayout::default()
        };

        let Some(kind) = tree.get(cell).map(|c| c.kind) else {
            return result;
        };

        if kind.has_text() {
            let text = &tree[cell].text;
            let measured = if text.is_empty() { " " } else { text.as_str() };
            result.rect.w = self.metrics.measure(measured).width
                + self.left_decorator_width(tree, cell)
                + self.right_decorator_width(tree, cell);
            result.last_line_width = result.rect.w;
        } else {
            self.layout_list(tree, cell, &mut result);
        }

        let target = &mut tree[cell];
        target.rect = result.rect;
        target.last_line_width = result.last_line_width;
        result
    }

    fn layout_list(&self, tree: &mut CellTree, cell: CellId, result: &mut CellLayout) {
        let children = tree[cell].children().to_vec();

        // First pass: lay every child out on a single line.
        let mut child_results = Vec::with_capacity(children.len());
        let mut child_pos = Vec2::default();
        for (i, &child) in children.iter().enumerate() {
            let r = self.layout_cell(tree, child, child_pos);
            child_pos.x += r.rect.w;
            result.rect.w += r.rect.w;
            if i + 1 < children.len() {
                result.rect.w += self.space_width;
                child_pos.x += self.space_width;
            }
            result.rect.h = result.rect.h.max(r.rect.h);
            result.vertical |= r.vertical;
            child_results.push(r);
        }
        result.last_line_width = result.rect.w;

        let shape = ListShape::for_cell(tree, cell);
        result.end_gap = shape.end_gap;

        if shape.vertical || result.vertical {
            result.vertical = true;
            self.layout_vertical(tree, &children, &child_results, shape, result);
        }

        let left = self.left_decorator_width(tree, cell);
        let right = self.right_decorator_width(tree, cell);
        if result.last_line_width >= result.rect.w {
            result.rect.w += right;
        }
        result.rect.w += left;
        result.last_line_width += left + right;
    }

    fn layout_vertical(
        &self,
        tree: &mut CellTree,
        children: &[CellId],
        child_results: &[CellLayout],
        shape: ListShape,
        result: &mut CellLayout,
    ) {
        let mut phase = Phase::Inline;
        let mut group_size = 0usize;
        let mut group_count = 0usize;
        let mut max_group_size = shape.inline_count;

        let mut align = 0.0f32;
        let mut max_width = 0.0f32;
        let mut line_height = self.line_height;
        let mut pos = Vec2::default();

        for (index, &child) in children.iter().enumerate() {
            if index > 0 {
                group_size += 1;
                if phase == Phase::Inline {
                    align = pos.x + self.space_width;
                }
            }

            let mut end_of_line = false;
            if group_size == max_group_size {
                group_size = 0;
                group_count += 1;
                end_of_line = matches!(phase, Phase::Aligned | Phase::Indented);

                if phase == Phase::Inline {
                    group_count = 0;
                    max_group_size = shape.aligned_group_size;
                    phase = Phase::Aligned;
                }

                if phase == Phase::Aligned && Some(group_count) == shape.aligned_group_count {
                    group_count = 0;
                    max_group_size = shape.indented_group_size;
                    phase = Phase::Indented;
                    align = 2.0 * self.space_width;
                    end_of_line = true;
                }
            }

            if end_of_line {
                max_width = max_width.max(pos.x);
                pos.x = align;
                pos.y += line_height;
                line_height = self.line_height;

                if index > 0 && child_results[index - 1].vertical && child_results[index - 1].end_gap
                {
                    pos.y += line_height;
                }
            } else if index > 0 {
                pos.x += self.space_width;
            }

            let rect = &mut tree[child].rect;
            rect.x = pos.x;
            rect.y = pos.y;

            pos.x += child_results[index].rect.w;
            line_height = line_height.max(child_results[index].rect.h);
            max_width = max_width.max(pos.x);
        }

        result.rect.w = max_width;
        result.rect.h = pos.y + line_height;
        result.last_line_width = pos.x;
    }

    fn offset_rects(&self, tree: &mut CellTree, cell: CellId, origin: Vec2) {
        let left = self.left_decorator_width(tree, cell);
        let Some(c) = tree.get_mut(cell) else {
            return;
        };
        c.rect.x += origin.x;
        c.rect.y += origin.y;
        let child_origin = Vec2::new(c.rect.x + left, c.rect.y);
        for child in c.children().to_vec() {
            self.offset_rects(tree, child, child_origin);
        }
    }

    /// Content box of `cell`: its rectangle without decorators.
    pub fn contents_box(&self, tree: &CellTree, cell: CellId) -> Rect {
        let Some(c) = tree.get(cell) else {
            return Rect::default();
        };
        let left = self.left_decorator_width(tree, cell);
        let right = self.right_decorator_width(tree, cell);
        let mut r = c.rect;
        r.x += left;
        r.w -= left + right;
        if c.rect.w > c.last_line_width {
            r.w = c.rect.right() - r.x;
        }
        r
    }

    /// Display position of `point`, from the rectangles of the last layout.
    pub fn point_to_display_pos(&self, tree: &CellTree, point: Point) -> Vec2 {
        if let Some(right) = point.left_from.and_then(|r| tree.get(r)) {
            return Vec2::new(right.rect.x, right.rect.y);
        }
        let Some(parent) = tree.get(point.parent) else {
            return Vec2::default();
        };
        if parent.has_text() {
            let b = self.contents_box(tree, point.parent);
            return Vec2::new(b.x + self.offset_width(&parent.text, point.offset), b.y);
        }
        if let Some(last) = parent.children().last().and_then(|&l| tree.get(l)) {
            return Vec2::new(
                last.rect.x + last.last_line_width,
                last.rect.bottom() - self.line_height,
            );
        }
        let b = self.contents_box(tree, point.parent);
        Vec2::new(b.x, b.y)
    }
}
