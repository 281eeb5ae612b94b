//! Token types produced by [`JsonReader`](crate::JsonReader) and consumed by
//! [`JsonWriter`](crate::JsonWriter).

use std::sync::Arc;

use crate::date::JsonDate;

/// One atomic unit of JSON grammar, together with its decoded payload.
///
/// Exactly one token is materialized at a time per reader or writer
/// instance; there is no internal buffering of token sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    /// `{`
    StartObject,
    /// `[`
    StartArray,
    /// `new Name(`, constructor syntax from the documented JSON superset.
    StartConstructor(Arc<str>),
    /// A property name inside an object, with the `:` already consumed.
    PropertyName(Arc<str>),
    /// A `/*...*/` or `//` comment, surfaced only when the reader is
    /// configured to load comments.
    Comment(String),
    /// Raw JSON text passed through without interpretation.
    Raw(String),
    /// An integer literal that fits in 64 bits.
    Integer(i64),
    /// An integer literal too large for 64 bits, kept as its canonical
    /// decimal digit string.
    BigInteger(String),
    /// A floating point literal, including `NaN` and `±Infinity`.
    Float(f64),
    /// A string literal with all escapes decoded.
    String(String),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// `undefined`, from the documented JSON superset.
    Undefined,
    /// `}`
    EndObject,
    /// `]`
    EndArray,
    /// `)` closing a constructor.
    EndConstructor,
    /// A date value, produced by typed reads and written as ISO 8601 text.
    Date(JsonDate),
    /// A byte sequence, produced by typed reads and written as Base64 text.
    Bytes(Vec<u8>),
}

/// The payload-free discriminant of a [`JsonToken`], used for grammar
/// lookups and cheap dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// No token has been read yet.
    None,
    /// An object opened.
    StartObject,
    /// An array opened.
    StartArray,
    /// A constructor opened.
    StartConstructor,
    /// A property name inside an object.
    PropertyName,
    /// A comment.
    Comment,
    /// Pre-serialized text passed through verbatim.
    Raw,
    /// An integer number.
    Integer,
    /// A floating-point number.
    Float,
    /// A string.
    String,
    /// A boolean.
    Boolean,
    /// A null value.
    Null,
    /// An undefined value.
    Undefined,
    /// An object closed.
    EndObject,
    /// An array closed.
    EndArray,
    /// A constructor closed.
    EndConstructor,
    /// A date value.
    Date,
    /// A byte sequence value.
    Bytes,
}

impl JsonToken {
    /// The discriminant of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        match self {
            JsonToken::StartObject => TokenKind::StartObject,
            JsonToken::StartArray => TokenKind::StartArray,
            JsonToken::StartConstructor(_) => TokenKind::StartConstructor,
            JsonToken::PropertyName(_) => TokenKind::PropertyName,
            JsonToken::Comment(_) => TokenKind::Comment,
            JsonToken::Raw(_) => TokenKind::Raw,
            // The big-integer fallback is still an integer token.
            JsonToken::Integer(_) | JsonToken::BigInteger(_) => TokenKind::Integer,
            JsonToken::Float(_) => TokenKind::Float,
            JsonToken::String(_) => TokenKind::String,
            JsonToken::Boolean(_) => TokenKind::Boolean,
            JsonToken::Null => TokenKind::Null,
            JsonToken::Undefined => TokenKind::Undefined,
            JsonToken::EndObject => TokenKind::EndObject,
            JsonToken::EndArray => TokenKind::EndArray,
            JsonToken::EndConstructor => TokenKind::EndConstructor,
            JsonToken::Date(_) => TokenKind::Date,
            JsonToken::Bytes(_) => TokenKind::Bytes,
        }
    }
}

impl TokenKind {
    /// Whether this kind opens a container scope.
    #[must_use]
    pub fn is_start(self) -> bool {
        matches!(
            self,
            TokenKind::StartObject | TokenKind::StartArray | TokenKind::StartConstructor
        )
    }

    /// Whether this kind closes a container scope.
    #[must_use]
    pub fn is_end(self) -> bool {
        matches!(
            self,
            TokenKind::EndObject | TokenKind::EndArray | TokenKind::EndConstructor
        )
    }

    /// Whether this kind produces a value (all value kinds share one row of
    /// the grammar table).
    #[must_use]
    pub fn is_value(self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::Boolean
                | TokenKind::Null
                | TokenKind::Undefined
                | TokenKind::Date
                | TokenKind::Bytes
        )
    }
}
