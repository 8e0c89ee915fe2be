//! Incremental lexer.
//!
//! Text typed into a cell is re-tokenized from byte 0 on every keystroke. The first token
//! overwrites the edited cell in place; every further token becomes a new sibling inserted right
//! after the previous one. There is no separate parse phase: classifying a token as keyword,
//! symbol, number, or placeholder *is* the parse.
//!
//! Lexing never fails. Text that matches no rule becomes an atomic symbol token, and empty text
//! becomes a hole.

use crate::point::Point;
use crate::tree::{CellId, CellKind, CellTree, TreeError};
use bramble_lang::{Keyword, LanguageConfig};

/// One token produced by [`lex_next`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lexeme {
    /// Cell kind of the token.
    pub kind: CellKind,
    /// Byte range of the token in the lexed text.
    pub start: usize,
    /// Exclusive end of the token.
    pub end: usize,
    /// Keyword token, for keyword lexemes.
    pub keyword: Option<Keyword>,
    /// Integer value, for int lexemes.
    pub int_value: u64,
    /// Float value, for float lexemes.
    pub float_value: f64,
}

impl Lexeme {
    fn new(kind: CellKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            keyword: None,
            int_value: 0,
            float_value: 0.0,
        }
    }

    /// Length of the token in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for the zero-length end-of-text hole token.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Lex the token starting at byte `offset` of `text`.
///
/// `src_kind` is the kind of the cell being re-lexed: string and comment cells are never split,
/// their remaining text is a single token of the same kind.
pub fn lex_next(text: &str, offset: usize, src_kind: CellKind, lang: &LanguageConfig) -> Lexeme {
    if matches!(src_kind, CellKind::String | CellKind::Comment) {
        return Lexeme::new(src_kind, offset, text.len());
    }

    let Some(first) = text.get(offset..).and_then(|rest| rest.chars().next()) else {
        return Lexeme::new(CellKind::Hole, offset, offset);
    };

    if first == lang.placeholder_sigil {
        lex_placeholder(text, offset, lang)
    } else if lang.is_identifier_start(first) {
        lex_identifier_or_keyword(text, offset, lang)
    } else if first.is_ascii_digit() {
        lex_number(text, offset)
    } else {
        lex_other(text, offset, lang)
    }
}

fn scan_while(text: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    text[from..]
        .char_indices()
        .find(|&(_, ch)| !pred(ch))
        .map(|(idx, _)| from + idx)
        .unwrap_or(text.len())
}

fn lex_placeholder(text: &str, offset: usize, lang: &LanguageConfig) -> Lexeme {
    let body = offset + lang.placeholder_sigil.len_utf8();
    let end = scan_while(text, body, |ch| lang.is_placeholder_continue(ch));
    Lexeme::new(CellKind::Placeholder, offset, end)
}

fn lex_identifier_or_keyword(text: &str, offset: usize, lang: &LanguageConfig) -> Lexeme {
    let end = scan_while(text, offset, |ch| lang.is_identifier_continue(ch));
    let mut lexeme = Lexeme::new(CellKind::Symbol, offset, end);
    if let Some(keyword) = lang.keywords.lookup(&text[offset..end]) {
        lexeme.kind = CellKind::Keyword;
        lexeme.keyword = Some(keyword);
    }
    lexeme
}

fn lex_number(text: &str, offset: usize) -> Lexeme {
    let int_end = scan_while(text, offset, |ch| ch.is_ascii_digit());
    let int_value = text[offset..int_end]
        .bytes()
        .fold(0u64, |acc, b| acc.saturating_mul(10).saturating_add(u64::from(b - b'0')));

    let bytes = text.as_bytes();
    let has_fraction = bytes.get(int_end) == Some(&b'.')
        && bytes.get(int_end + 1).is_some_and(u8::is_ascii_digit);

    if !has_fraction {
        let mut lexeme = Lexeme::new(CellKind::Int, offset, int_end);
        lexeme.int_value = int_value;
        return lexeme;
    }

    let frac_start = int_end + 1;
    let frac_end = scan_while(text, frac_start, |ch| ch.is_ascii_digit());

    // Digits, a dot and digits always parse; very long integer parts round to infinity.
    let mut lexeme = Lexeme::new(CellKind::Float, offset, frac_end);
    lexeme.float_value = text[offset..frac_end].parse().unwrap_or(f64::INFINITY);
    lexeme
}

fn lex_other(text: &str, offset: usize, lang: &LanguageConfig) -> Lexeme {
    // The first character is always consumed, so lexing makes progress.
    let first_len = text[offset..].chars().next().map_or(0, char::len_utf8);
    let end = scan_while(text, offset + first_len, |ch| !lang.starts_token(ch));
    Lexeme::new(CellKind::Symbol, offset, end)
}

/// Tokenize a whole string, as [`relex`] would split it.
pub fn tokenize(text: &str, src_kind: CellKind, lang: &LanguageConfig) -> Vec<Lexeme> {
    let mut out = Vec::new();
    let mut offset = 0;
    loop {
        let lexeme = lex_next(text, offset, src_kind, lang);
        offset = lexeme.end;
        out.push(lexeme);
        if offset >= text.len() {
            break;
        }
    }
    out
}

/// Result of [`relex`].
#[derive(Debug, Clone, PartialEq)]
pub struct RelexOutcome {
    /// The cells now holding the tokens, in order. The first is always the re-lexed cell.
    pub cells: Vec<CellId>,
    /// The cursor remapped onto the new cells.
    pub cursor: Point,
}

/// Re-tokenize `text` into `cell`, splitting it into sibling cells as needed.
///
/// `cursor` is the caret expressed against `text` (i.e. `cursor.parent == cell` and
/// `cursor.offset` is a byte offset into `text`); it is remapped to the cell and local offset
/// where that byte now lives. A cursor elsewhere in the tree is returned unchanged.
pub fn relex(
    tree: &mut CellTree,
    cell: CellId,
    text: &str,
    lang: &LanguageConfig,
    cursor: Point,
) -> Result<RelexOutcome, TreeError> {
    let src_kind = tree.get(cell).ok_or(TreeError::StaleCell(cell))?.kind;
    if !src_kind.has_text() {
        return Ok(RelexOutcome {
            cells: vec![cell],
            cursor,
        });
    }
    let tracks_cursor = cursor.parent == cell && cursor.left_from.is_none();

    let mut next_cursor = cursor;
    let mut cells = Vec::new();
    let mut current = cell;

    for lexeme in tokenize(text, src_kind, lang) {
        if lexeme.start > 0 {
            let fresh = tree.alloc(CellKind::Symbol);
            tree.insert_after(current, fresh)?;
            current = fresh;

            if tracks_cursor && cursor.offset >= lexeme.start {
                next_cursor = Point::in_text(current, cursor.offset - lexeme.start);
            }
        }

        let target = &mut tree[current];
        target.kind = lexeme.kind;
        target.text = text[lexeme.start..lexeme.end].to_string();
        target.keyword = lexeme.keyword;
        target.int_value = lexeme.int_value;
        target.float_value = lexeme.float_value;
        cells.push(current);
    }

    Ok(RelexOutcome {
        cells,
        cursor: next_cursor,
    })
}
