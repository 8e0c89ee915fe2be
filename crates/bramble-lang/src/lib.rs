#![warn(missing_docs)]
//! `bramble-lang` - data-driven language tables for the `bramble` structure editor.
//!
//! This crate intentionally stays dependency-free. It holds the small, immutable tables the
//! lexer and interpreter consult (keywords, the placeholder sigil, identifier character
//! classes), so hosts pass them explicitly instead of relying on ambient globals.

/// Keywords recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `when <pattern> <body>...`
    When,
    /// `claim <expr>...`
    Claim,
    /// `wish <expr>...`
    Wish,
    /// `self`, the identity of the enclosing card.
    SelfCard,
}

impl Keyword {
    /// The token name attached to keyword cells (e.g. `KW_WHEN`).
    pub fn token_name(self) -> &'static str {
        match self {
            Keyword::When => "KW_WHEN",
            Keyword::Claim => "KW_CLAIM",
            Keyword::Wish => "KW_WISH",
            Keyword::SelfCard => "KW_SELF",
        }
    }
}

/// A single keyword table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordEntry {
    /// Keyword token.
    pub keyword: Keyword,
    /// Source spelling.
    pub text: &'static str,
}

/// The keyword set of the language.
pub const STANDARD_KEYWORDS: &[KeywordEntry] = &[
    KeywordEntry {
        keyword: Keyword::When,
        text: "when",
    },
    KeywordEntry {
        keyword: Keyword::Claim,
        text: "claim",
    },
    KeywordEntry {
        keyword: Keyword::Wish,
        text: "wish",
    },
    KeywordEntry {
        keyword: Keyword::SelfCard,
        text: "self",
    },
];

/// A closed, immutable keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordTable {
    entries: &'static [KeywordEntry],
}

impl KeywordTable {
    /// Create a table over a static entry list.
    pub const fn new(entries: &'static [KeywordEntry]) -> Self {
        Self { entries }
    }

    /// The standard `when`/`claim`/`wish`/`self` table.
    pub const fn standard() -> Self {
        Self::new(STANDARD_KEYWORDS)
    }

    /// Look up the keyword spelled exactly `text`.
    pub fn lookup(&self, text: &str) -> Option<Keyword> {
        self.entries
            .iter()
            .find(|entry| entry.text == text)
            .map(|entry| entry.keyword)
    }

    /// Source spelling of `keyword`, if the table contains it.
    pub fn spelling(&self, keyword: Keyword) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.keyword == keyword)
            .map(|entry| entry.text)
    }

    /// All entries, in table order.
    pub fn entries(&self) -> &'static [KeywordEntry] {
        self.entries
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lexical configuration consumed by the incremental lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Keyword table.
    pub keywords: KeywordTable,
    /// Sigil that starts a placeholder token (e.g. `$x`).
    pub placeholder_sigil: char,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordTable::standard(),
            placeholder_sigil: '$',
        }
    }
}

impl LanguageConfig {
    /// Returns `true` if `ch` can start an identifier.
    pub fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    /// Returns `true` if `ch` can continue an identifier (`:` allows `ns:name` symbols).
    pub fn is_identifier_continue(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_' || ch == ':'
    }

    /// Returns `true` if `ch` can continue a placeholder name.
    pub fn is_placeholder_continue(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }

    /// Returns `true` if `ch` starts some recognized token, which ends a run of
    /// unrecognized characters.
    pub fn starts_token(&self, ch: char) -> bool {
        ch == self.placeholder_sigil || self.is_identifier_start(ch) || ch.is_ascii_digit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_resolves_every_keyword() {
        let table = KeywordTable::standard();
        assert_eq!(table.lookup("when"), Some(Keyword::When));
        assert_eq!(table.lookup("claim"), Some(Keyword::Claim));
        assert_eq!(table.lookup("wish"), Some(Keyword::Wish));
        assert_eq!(table.lookup("self"), Some(Keyword::SelfCard));
        assert_eq!(table.lookup("whenever"), None);
        assert_eq!(table.lookup("When"), None);
    }

    #[test]
    fn token_names_and_spellings() {
        let table = KeywordTable::default();
        assert_eq!(Keyword::When.token_name(), "KW_WHEN");
        assert_eq!(table.spelling(Keyword::Wish), Some("wish"));
        assert_eq!(table.entries().len(), 4);
    }

    #[test]
    fn character_classes() {
        let lang = LanguageConfig::default();
        assert!(lang.starts_token('$'));
        assert!(lang.starts_token('_'));
        assert!(lang.starts_token('7'));
        assert!(!lang.starts_token('+'));
        assert!(!lang.starts_token('é'));
        assert!(lang.is_identifier_continue(':'));
        assert!(!lang.is_placeholder_continue(':'));
    }
}
