//! Evaluated values: the data facts are made of.

use crate::card::CardId;
use std::fmt;

/// An evaluated cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A bare symbol.
    Symbol(String),
    /// A string literal.
    String(String),
    /// An unsigned integer.
    U64(u64),
    /// A float.
    F64(f64),
    /// A card reference.
    Card(CardId),
    /// A list of values.
    List(Vec<Value>),
    /// An unbound pattern variable, by name (without the sigil).
    Placeholder(String),
}

impl Value {
    /// A symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// A string value.
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    /// A placeholder value.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Value::Placeholder(name.into())
    }

    /// Returns `true` for placeholders.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::Placeholder(_))
    }

    /// Children of a list value, or an empty slice.
    pub fn children(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            _ => &[],
        }
    }

    /// Text of a symbol, string or placeholder.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) | Value::String(s) | Value::Placeholder(s) => Some(s),
            _ => None,
        }
    }

    /// Card referenced by a card value.
    pub fn as_card(&self) -> Option<CardId> {
        match self {
            Value::Card(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns `true` if both values have the same kind.
    pub fn same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Symbol(s) => f.write_str(s),
            Value::Placeholder(s) => write!(f, "${s}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Card(id) => write!(f, "{id}"),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Build a list value from anything convertible into values.
#[macro_export]
macro_rules! list {
    ($($item:expr),* $(,)?) => {
        $crate::value::Value::List(vec![$($crate::value::Value::from($item)),*])
    };
}

impl From<CardId> for Value {
    fn from(id: CardId) -> Self {
        Value::Card(id)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

/// Bare `&str` converts to a symbol; `$name` converts to a placeholder.
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        match s.strip_prefix('$') {
            Some(name) => Value::placeholder(name),
            None => Value::symbol(s),
        }
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
