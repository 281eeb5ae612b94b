//! The table-driven grammar state machine shared by the reader and the
//! writer.
//!
//! Validity is pure data: a fixed 2D lookup indexed by (token class,
//! current state). The writer takes both its validity answer and its next
//! state from [`next`]; the reader consults the same table through
//! [`is_valid`] and keeps its own post-value bookkeeping. Formatting never
//! participates; it only decides whether delimiters and indentation are
//! emitted, not whether a token is legal.
//!
//! Close tokens are not in the table: closing is validated against the
//! kind of the currently open container frame.

use crate::token::TokenKind;

/// Grammar states shared by both sides. The writer never leaves the first
/// eight except for `Closed`/`Error`; `Error` doubles as the table's
/// "invalid transition" cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub(crate) enum State {
    Start = 0,
    Property = 1,
    ObjectStart = 2,
    Object = 3,
    ArrayStart = 4,
    Array = 5,
    ConstructorStart = 6,
    Constructor = 7,
    Closed = 8,
    Error = 9,
}

/// Row index into the transition table. All value-producing token kinds
/// share the single `Value` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub(crate) enum TokenClass {
    StartObject = 0,
    StartArray = 1,
    StartConstructor = 2,
    PropertyName = 3,
    Comment = 4,
    Raw = 5,
    Value = 6,
}

impl TokenClass {
    /// Maps a token kind to its table row. Close tokens and `None` have no
    /// row and return `None`.
    pub(crate) fn of(kind: TokenKind) -> Option<TokenClass> {
        match kind {
            TokenKind::StartObject => Some(TokenClass::StartObject),
            TokenKind::StartArray => Some(TokenClass::StartArray),
            TokenKind::StartConstructor => Some(TokenClass::StartConstructor),
            TokenKind::PropertyName => Some(TokenClass::PropertyName),
            TokenKind::Comment => Some(TokenClass::Comment),
            TokenKind::Raw => Some(TokenClass::Raw),
            k if k.is_value() => Some(TokenClass::Value),
            _ => None,
        }
    }
}

const STATE_COUNT: usize = 10;
const CLASS_COUNT: usize = 7;

/// cell = `TRANSITIONS[class][current state]`; `Error` marks an invalid
/// transition. A value at `Start` returns to `Start`, which is what lets
/// concatenated root documents be written.
#[rustfmt::skip]
static TRANSITIONS: [[State; STATE_COUNT]; CLASS_COUNT] = {
    use State::{
        Array, ArrayStart, Constructor, ConstructorStart, Error, Object, ObjectStart, Property,
        Start,
    };
    [
        //                    Start             Property          ObjectStart  Object    ArrayStart        Array             ConstructorStart  Constructor       Closed  Error
        /* StartObject      */ [ObjectStart,      ObjectStart,      Error,       Error,    ObjectStart,      ObjectStart,      ObjectStart,      ObjectStart,      Error,  Error],
        /* StartArray       */ [ArrayStart,       ArrayStart,       Error,       Error,    ArrayStart,       ArrayStart,       ArrayStart,       ArrayStart,       Error,  Error],
        /* StartConstructor */ [ConstructorStart, ConstructorStart, Error,       Error,    ConstructorStart, ConstructorStart, ConstructorStart, ConstructorStart, Error,  Error],
        /* PropertyName     */ [Property,         Error,            Property,    Property, Error,            Error,            Error,            Error,            Error,  Error],
        /* Comment          */ [Start,            Property,         ObjectStart, Object,   ArrayStart,       Array,            Constructor,      Constructor,      Error,  Error],
        /* Raw              */ [Start,            Property,         ObjectStart, Object,   ArrayStart,       Array,            Constructor,      Constructor,      Error,  Error],
        /* Value            */ [Start,            Object,           Error,       Error,    Array,            Array,            Constructor,      Constructor,      Error,  Error],
    ]
};

/// The transition function: `Some(next)` for a legal token in the current
/// state, `None` where the table marks the transition invalid.
pub(crate) fn next(state: State, class: TokenClass) -> Option<State> {
    match TRANSITIONS[class as usize][state as usize] {
        State::Error => None,
        s => Some(s),
    }
}

/// Validity lookup against the same table, for callers that keep their own
/// next-state bookkeeping.
pub(crate) fn is_valid(state: State, class: TokenClass) -> bool {
    next(state, class).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_row_is_shared_by_all_value_kinds() {
        for kind in [
            TokenKind::Integer,
            TokenKind::Float,
            TokenKind::String,
            TokenKind::Boolean,
            TokenKind::Null,
            TokenKind::Undefined,
            TokenKind::Date,
            TokenKind::Bytes,
        ] {
            assert_eq!(TokenClass::of(kind), Some(TokenClass::Value));
        }
        assert_eq!(TokenClass::of(TokenKind::EndObject), None);
        assert_eq!(TokenClass::of(TokenKind::None), None);
    }

    #[test]
    fn property_name_only_inside_objects_or_at_root() {
        assert!(is_valid(State::ObjectStart, TokenClass::PropertyName));
        assert!(is_valid(State::Object, TokenClass::PropertyName));
        assert!(!is_valid(State::ArrayStart, TokenClass::PropertyName));
        assert!(!is_valid(State::Property, TokenClass::PropertyName));
    }

    #[test]
    fn values_not_legal_where_a_property_name_is_required() {
        assert!(!is_valid(State::ObjectStart, TokenClass::Value));
        assert!(!is_valid(State::Object, TokenClass::Value));
        assert_eq!(next(State::Property, TokenClass::Value), Some(State::Object));
        assert_eq!(next(State::ArrayStart, TokenClass::Value), Some(State::Array));
    }

    #[test]
    fn closed_state_rejects_everything() {
        for class in [
            TokenClass::StartObject,
            TokenClass::StartArray,
            TokenClass::StartConstructor,
            TokenClass::PropertyName,
            TokenClass::Comment,
            TokenClass::Raw,
            TokenClass::Value,
        ] {
            assert!(!is_valid(State::Closed, class));
            assert!(!is_valid(State::Error, class));
        }
    }

    #[test]
    fn root_value_returns_to_start() {
        assert_eq!(next(State::Start, TokenClass::Value), Some(State::Start));
    }

    #[test]
    fn comments_do_not_change_state() {
        assert_eq!(next(State::Array, TokenClass::Comment), Some(State::Array));
        assert_eq!(next(State::Property, TokenClass::Comment), Some(State::Property));
    }
}
