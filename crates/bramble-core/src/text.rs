use unicode_segmentation::UnicodeSegmentation;

/// Byte offset of the grapheme boundary before `offset`, or `0` at the start of `text`.
pub(crate) fn prev_boundary(text: &str, offset: usize) -> usize {
    let offset = floor_char_boundary(text, offset);
    text[..offset]
        .grapheme_indices(true)
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

/// Byte offset of the grapheme boundary after `offset`, or `text.len()` at the end.
pub(crate) fn next_boundary(text: &str, offset: usize) -> usize {
    let offset = floor_char_boundary(text, offset);
    text[offset..]
        .graphemes(true)
        .next()
        .map(|g| offset + g.len())
        .unwrap_or(text.len())
}

/// Clamp `offset` into `text` and move it back onto a `char` boundary.
pub(crate) fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
