//! The tokenizing reader.
//!
//! `JsonReader` scans its character buffer to produce one token per call.
//! The scan code is written once and shared by both execution paths: a
//! blocking source resolves every refill inline, while a feed source can
//! report pending input, in which case the reader unwinds without side
//! effects and the next attempt re-scans the current token from its saved
//! start inside the retained buffer region. Suspension therefore happens
//! only at buffer-refill points and a token is atomic to the caller.
//!
//! Commit discipline: `token_start` marks the earliest uncommitted buffer
//! index. It advances (`commit`) only once consumed characters can never
//! be re-scanned: after whitespace runs, consumed delimiters, and finished
//! tokens. Buffer compaction keeps everything at and after `token_start`,
//! so a rescan always finds the token's text intact.

mod scan;

use std::io;
use std::sync::Arc;

use crate::buffer::CharBuffer;
use crate::date::JsonDate;
use crate::error::{Error, LinePosition, Result};
use crate::grammar::{self, TokenClass};
use crate::intern::NameTable;
use crate::number;
use crate::options::{
    CommentHandling, DEFAULT_MAX_DEPTH, FloatParseHandling, ReaderOptions,
};
use crate::position::{JsonContainerType, JsonPosition};
use crate::source::{BlockingSource, CharSource, Fetched, IoSource, StrSource};
use crate::token::{JsonToken, TokenKind};

/// Reader scan states. The shapes shared with the writer map onto
/// [`grammar::State`]; `PostValue` is reader-only bookkeeping for "value
/// finished, delimiter expected".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Start,
    Property,
    ObjectStart,
    Object,
    ArrayStart,
    Array,
    ConstructorStart,
    Constructor,
    PostValue,
    Closed,
}

/// Outcome of one token attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    HasToken,
    EndOfDocument,
    /// The source is pending; re-attempt after feeding more input.
    NeedMore,
}

/// Refill result seen by scanning code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Io {
    Ready,
    End,
    Pending,
}

/// Target representation for the next numeric literal, set by the typed
/// reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ReadTarget {
    #[default]
    Default,
    Int32,
    Double,
    Decimal,
    StringValue,
}

/// A pull-based tokenizing JSON reader over a character source.
pub struct JsonReader<S> {
    source: S,
    buf: CharBuffer,

    state: ReadState,
    stack: Vec<JsonPosition>,
    current_position: JsonPosition,
    token: Option<JsonToken>,

    /// Scratch for string content that diverges from the source text;
    /// unescaped strings are collected straight from the buffer instead.
    pub(crate) scratch: String,
    /// Earliest uncommitted buffer index; the rescan anchor.
    pub(crate) token_start: usize,
    /// Line/column state valid at `token_start`.
    anchor_line: usize,
    anchor_column: usize,

    pub(crate) read_target: ReadTarget,
    max_depth: usize,
    comment_handling: CommentHandling,
    pub(crate) float_parse_handling: FloatParseHandling,
    support_multiple_content: bool,
    name_table: Option<NameTable>,

    /// Latched when the depth bound is first exceeded so the error is
    /// reported once per crossing, not once per nested container.
    depth_exceeded: bool,
}

impl<'a> JsonReader<StrSource<'a>> {
    /// Creates a reader over in-memory text with default options.
    #[must_use]
    pub fn from_str(text: &'a str) -> Self {
        Self::build(StrSource::new(text), ReaderOptions::default())
    }
}

impl<R: io::Read> JsonReader<IoSource<R>> {
    /// Creates a reader decoding UTF-8 from a byte stream, with default
    /// options.
    pub fn from_reader(inner: R) -> Self {
        Self::build(IoSource::new(inner), ReaderOptions::default())
    }
}

impl<S: CharSource> JsonReader<S> {
    /// Creates a reader over `source`. Fails when `options.max_depth` is
    /// zero.
    pub fn new(source: S, options: ReaderOptions) -> Result<Self> {
        if options.max_depth == Some(0) {
            return Err(Error::grammar("MaxDepth must be a positive integer", "", None));
        }
        Ok(Self::build(source, options))
    }

    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub(crate) fn build(source: S, options: ReaderOptions) -> Self {
        let max_depth = options.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        Self {
            source,
            buf: CharBuffer::new(),
            state: ReadState::Start,
            stack: Vec::new(),
            current_position: JsonPosition::default(),
            token: None,
            scratch: String::new(),
            token_start: 0,
            anchor_line: 1,
            anchor_column: 0,
            read_target: ReadTarget::Default,
            max_depth,
            comment_handling: options.comment_handling,
            float_parse_handling: options.float_parse_handling,
            support_multiple_content: options.support_multiple_content,
            name_table: options.name_table,
            depth_exceeded: false,
        }
    }

    /// The kind of the current token; `TokenKind::None` before the first
    /// read and after the end of the document.
    #[must_use]
    pub fn token_type(&self) -> TokenKind {
        self.token.as_ref().map_or(TokenKind::None, JsonToken::kind)
    }

    /// The current token with its payload, if any.
    #[must_use]
    pub fn value(&self) -> Option<&JsonToken> {
        self.token.as_ref()
    }

    /// Number of open ancestor containers. On a container-start token the
    /// container itself is not yet counted.
    #[must_use]
    pub fn depth(&self) -> usize {
        let depth = self.stack.len();
        if self.token_type().is_start() || self.current_position.container_type == JsonContainerType::None
        {
            depth
        } else {
            depth + 1
        }
    }

    /// The current JSON path, rebuilt on demand for diagnostics.
    #[must_use]
    pub fn path(&self) -> String {
        let current = (self.current_position.container_type != JsonContainerType::None)
            .then_some(&self.current_position);
        JsonPosition::build_path(&self.stack, current)
    }

    /// Configured nesting bound.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// One-based line number at the scan position.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_info().line
    }

    /// Zero-based character position within the current line.
    #[must_use]
    pub fn line_position(&self) -> usize {
        self.line_info().position
    }

    /// Closes the reader; further reads report end of document.
    pub fn close(&mut self) {
        self.state = ReadState::Closed;
        self.token = None;
    }

    // ---------------------------------------------------------------
    // Line tracking and commits
    // ---------------------------------------------------------------

    /// Line/column at the scan position, derived by walking the
    /// uncommitted region from the anchor.
    pub(crate) fn line_info(&self) -> LinePosition {
        let mut line = self.anchor_line;
        let mut column = self.anchor_column;
        for i in self.token_start..self.buf.pos {
            if self.buf.char_at(i) == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        LinePosition { line, position: column }
    }

    /// Commits everything scanned so far: the region before the scan
    /// position can no longer be re-scanned, so the anchor advances over
    /// it.
    pub(crate) fn commit(&mut self) {
        let info = self.line_info();
        self.anchor_line = info.line;
        self.anchor_column = info.position;
        self.token_start = self.buf.pos;
    }

    /// Guarantees at least one unread character at the scan position, or
    /// reports end-of-input / pending.
    pub(crate) fn ensure(&mut self) -> Result<Io> {
        self.ensure_ahead(1)
    }

    /// Guarantees `n` characters are available at the scan position.
    pub(crate) fn ensure_ahead(&mut self, n: usize) -> Result<Io> {
        loop {
            let available = self.buf.high_water() - self.buf.pos;
            if available >= n {
                return Ok(Io::Ready);
            }
            if self.buf.end_of_input() {
                return Ok(Io::End);
            }
            let shift = self.buf.make_room(self.token_start, n - available);
            self.token_start -= shift;
            match self.buf.fill(&mut self.source)? {
                Fetched::Chars(_) => {}
                Fetched::Eof => return Ok(Io::End),
                Fetched::Pending => return Ok(Io::Pending),
            }
        }
    }

    // ---------------------------------------------------------------
    // Errors
    // ---------------------------------------------------------------

    pub(crate) fn data_error(&self, message: impl Into<String>) -> Error {
        Error::data(message, self.path(), Some(self.line_info()))
    }

    pub(crate) fn grammar_error(&self, message: impl Into<String>) -> Error {
        Error::grammar(message, self.path(), Some(self.line_info()))
    }

    fn unexpected_end(&self) -> Error {
        self.grammar_error("Unexpected end of content while reading JSON")
    }

    // ---------------------------------------------------------------
    // Token bookkeeping
    // ---------------------------------------------------------------

    /// Funnels a produced token through the shared grammar table before
    /// accepting it.
    fn validate(&self, kind: TokenKind) -> Result<()> {
        let Some(class) = TokenClass::of(kind) else {
            return Ok(());
        };
        if grammar::is_valid(self.grammar_state(), class) {
            Ok(())
        } else {
            Err(self.grammar_error(format!(
                "Token {kind:?} would result in invalid JSON in state {:?}",
                self.state
            )))
        }
    }

    fn grammar_state(&self) -> grammar::State {
        match self.state {
            ReadState::Start => grammar::State::Start,
            ReadState::Property => grammar::State::Property,
            ReadState::ObjectStart => grammar::State::ObjectStart,
            ReadState::Object => grammar::State::Object,
            ReadState::ArrayStart => grammar::State::ArrayStart,
            ReadState::Array => grammar::State::Array,
            ReadState::ConstructorStart => grammar::State::ConstructorStart,
            ReadState::Constructor => grammar::State::Constructor,
            ReadState::PostValue => match self.current_position.container_type {
                JsonContainerType::Object => grammar::State::Object,
                JsonContainerType::Array => grammar::State::Array,
                JsonContainerType::Constructor => grammar::State::Constructor,
                JsonContainerType::None => grammar::State::Start,
            },
            ReadState::Closed => grammar::State::Closed,
        }
    }

    /// Accepts a scalar value token: validates, counts the element in the
    /// enclosing frame, and moves to the post-value state.
    pub(crate) fn set_value_token(&mut self, token: JsonToken) -> Result<()> {
        self.validate(token.kind())?;
        if self.current_position.has_index {
            self.current_position.position += 1;
        }
        self.token = Some(token);
        self.state = ReadState::PostValue;
        self.commit();
        Ok(())
    }

    /// Accepts a comment token; comments never change the scan state.
    pub(crate) fn set_comment_token(&mut self, text: String) -> Result<()> {
        self.validate(TokenKind::Comment)?;
        self.token = Some(JsonToken::Comment(text));
        self.commit();
        Ok(())
    }

    pub(crate) fn set_property_token(&mut self, name: Arc<str>) -> Result<()> {
        self.validate(TokenKind::PropertyName)?;
        self.current_position.property_name = Some(Arc::clone(&name));
        self.token = Some(JsonToken::PropertyName(name));
        self.state = ReadState::Property;
        self.commit();
        Ok(())
    }

    /// Opens a container frame. The depth bound is enforced after the
    /// token is in place, so the error is reported with the reader still
    /// usable and repeats only once per crossing while the stack unwinds.
    pub(crate) fn begin_container(&mut self, token: JsonToken) -> Result<()> {
        let (kind, state) = match token.kind() {
            TokenKind::StartObject => (JsonContainerType::Object, ReadState::ObjectStart),
            TokenKind::StartArray => (JsonContainerType::Array, ReadState::ArrayStart),
            _ => (JsonContainerType::Constructor, ReadState::ConstructorStart),
        };
        self.validate(token.kind())?;
        if self.current_position.has_index {
            self.current_position.position += 1;
        }
        if self.current_position.container_type != JsonContainerType::None {
            self.stack.push(std::mem::take(&mut self.current_position));
        }
        self.current_position = JsonPosition::new(kind);
        self.token = Some(token);
        self.state = state;
        self.commit();
        if self.stack.len() + 1 > self.max_depth && !self.depth_exceeded {
            self.depth_exceeded = true;
            return Err(self.grammar_error(format!(
                "The reader's MaxDepth of {} has been exceeded",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Closes the innermost container, checking that its kind matches the
    /// close token.
    pub(crate) fn end_container(&mut self, token: JsonToken) -> Result<()> {
        let expected = match token.kind() {
            TokenKind::EndObject => JsonContainerType::Object,
            TokenKind::EndArray => JsonContainerType::Array,
            _ => JsonContainerType::Constructor,
        };
        if self.current_position.container_type != expected {
            return Err(self.grammar_error(format!(
                "JsonToken {:?} is not valid for closing JsonType {:?}",
                token.kind(),
                self.current_position.container_type
            )));
        }
        self.current_position = self.stack.pop().unwrap_or_default();
        if self.stack.len() + 1 <= self.max_depth {
            self.depth_exceeded = false;
        }
        self.token = Some(token);
        self.state = ReadState::PostValue;
        self.commit();
        Ok(())
    }

    // ---------------------------------------------------------------
    // The read loop
    // ---------------------------------------------------------------

    /// Attempts to advance one token. The only `NeedMore` producer is a
    /// pending source; everything else resolves to a token, the end of
    /// the document, or an error.
    pub(crate) fn try_read(&mut self) -> Result<ReadOutcome> {
        // Resume point: re-scan the uncommitted region from its start.
        self.buf.pos = self.token_start;
        loop {
            let step = match self.state {
                ReadState::Closed => return Ok(ReadOutcome::EndOfDocument),
                ReadState::Start
                | ReadState::Property
                | ReadState::ArrayStart
                | ReadState::Array
                | ReadState::ConstructorStart
                | ReadState::Constructor => self.parse_value_position()?,
                ReadState::ObjectStart | ReadState::Object => self.parse_object_position()?,
                ReadState::PostValue => self.parse_post_value()?,
            };
            match step {
                Some(outcome) => return Ok(outcome),
                None => continue,
            }
        }
    }

    /// Handles the state after a completed value: consume a delimiter,
    /// close a container, surface a comment, or finish the document.
    fn parse_post_value(&mut self) -> Result<Option<ReadOutcome>> {
        match self.skip_whitespace()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => {
                if self.current_position.container_type == JsonContainerType::None {
                    self.token = None;
                    return Ok(Some(ReadOutcome::EndOfDocument));
                }
                return Err(self.unexpected_end());
            }
            Io::Ready => {}
        }
        let c = self.buf.current();
        match c {
            '}' => {
                self.buf.bump();
                self.end_container(JsonToken::EndObject)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            ']' => {
                self.buf.bump();
                self.end_container(JsonToken::EndArray)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            ')' => {
                self.buf.bump();
                self.end_container(JsonToken::EndConstructor)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            ',' => {
                let next_state = match self.current_position.container_type {
                    JsonContainerType::Object => ReadState::Object,
                    JsonContainerType::Array => ReadState::Array,
                    JsonContainerType::Constructor => ReadState::Constructor,
                    JsonContainerType::None => {
                        return Err(self.grammar_error(
                            "After parsing a value an unexpected character was encountered: ,",
                        ));
                    }
                };
                self.buf.bump();
                self.commit();
                self.state = next_state;
                Ok(None)
            }
            '/' => self.parse_comment(),
            _ if self.current_position.container_type == JsonContainerType::None => {
                if self.support_multiple_content {
                    // A fresh top-level document begins here.
                    self.state = ReadState::Start;
                    self.current_position = JsonPosition::default();
                    Ok(None)
                } else {
                    Err(self.grammar_error(format!(
                        "Additional text encountered after finished reading JSON content: {c}"
                    )))
                }
            }
            _ => Err(self.grammar_error(format!(
                "After parsing a value an unexpected character was encountered: {c}"
            ))),
        }
    }
}

impl<S: BlockingSource> JsonReader<S> {
    /// Advances to the next token. Returns `false` at the end of the
    /// document (or of all documents with multiple content enabled).
    pub fn read(&mut self) -> Result<bool> {
        match self.try_read()? {
            ReadOutcome::HasToken => Ok(true),
            ReadOutcome::EndOfDocument => Ok(false),
            // Blocking sources resolve every refill; a pending report here
            // means the source broke its contract.
            ReadOutcome::NeedMore => Err(self.unexpected_end()),
        }
    }

    /// Skips the children of the current container or property without
    /// materializing them.
    pub fn skip(&mut self) -> Result<()> {
        if self.token_type() == TokenKind::PropertyName {
            self.read()?;
        }
        if self.token_type().is_start() {
            let depth = self.depth();
            while self.read()? && depth < self.depth() {}
        }
        Ok(())
    }

    /// Reads the next token with a numeric target, skipping comments the
    /// way all typed reads do.
    fn read_for(&mut self, target: ReadTarget) -> Result<bool> {
        self.read_target = target;
        let result = loop {
            match self.read() {
                Ok(true) if self.token_type() == TokenKind::Comment => {}
                other => break other,
            }
        };
        self.read_target = ReadTarget::Default;
        result
    }

    /// Reads the next token as a 32-bit integer.
    pub fn read_as_i32(&mut self) -> Result<Option<i32>> {
        if !self.read_for(ReadTarget::Int32)? {
            return Ok(None);
        }
        match self.token.clone() {
            Some(JsonToken::Integer(v)) => i32::try_from(v).map(Some).map_err(|_| {
                self.data_error(format!("JSON integer {v} is too large or small for an Int32"))
            }),
            Some(JsonToken::BigInteger(s)) => {
                Err(self.data_error(format!("JSON integer {s} is too large or small for an Int32")))
            }
            Some(JsonToken::String(s)) => {
                if s.is_empty() {
                    self.token = Some(JsonToken::Null);
                    return Ok(None);
                }
                let v = number::parse_i32(&s).map_err(|e| self.data_error(e.to_string()))?;
                self.token = Some(JsonToken::Integer(i64::from(v)));
                Ok(Some(v))
            }
            Some(JsonToken::Null | JsonToken::Undefined | JsonToken::EndArray) | None => Ok(None),
            Some(other) => Err(self.data_error(format!(
                "Error reading integer. Unexpected token: {:?}",
                other.kind()
            ))),
        }
    }

    /// Reads the next token as a 64-bit float.
    pub fn read_as_f64(&mut self) -> Result<Option<f64>> {
        if !self.read_for(ReadTarget::Double)? {
            return Ok(None);
        }
        match self.token.clone() {
            #[allow(clippy::cast_precision_loss)]
            Some(JsonToken::Integer(v)) => {
                let v = v as f64;
                self.token = Some(JsonToken::Float(v));
                Ok(Some(v))
            }
            Some(JsonToken::Float(v)) => Ok(Some(v)),
            Some(JsonToken::String(s)) => {
                if s.is_empty() {
                    self.token = Some(JsonToken::Null);
                    return Ok(None);
                }
                let v = number::parse_f64(&s).map_err(|e| self.data_error(e.to_string()))?;
                self.token = Some(JsonToken::Float(v));
                Ok(Some(v))
            }
            Some(JsonToken::Null | JsonToken::Undefined | JsonToken::EndArray) | None => Ok(None),
            Some(other) => Err(self.data_error(format!(
                "Error reading double. Unexpected token: {:?}",
                other.kind()
            ))),
        }
    }

    /// Reads the next token as a canonical plain-decimal string.
    pub fn read_as_decimal_str(&mut self) -> Result<Option<String>> {
        if !self.read_for(ReadTarget::Decimal)? {
            return Ok(None);
        }
        match self.token.clone() {
            Some(JsonToken::String(s)) => {
                if s.is_empty() {
                    self.token = Some(JsonToken::Null);
                    return Ok(None);
                }
                let v = number::parse_decimal(&s).map_err(|e| self.data_error(e.to_string()))?;
                self.token = Some(JsonToken::String(v.clone()));
                Ok(Some(v))
            }
            Some(JsonToken::Integer(v)) => Ok(Some(v.to_string())),
            Some(JsonToken::BigInteger(s)) => Ok(Some(s)),
            Some(JsonToken::Null | JsonToken::Undefined | JsonToken::EndArray) | None => Ok(None),
            Some(other) => Err(self.data_error(format!(
                "Error reading decimal. Unexpected token: {:?}",
                other.kind()
            ))),
        }
    }

    /// Reads the next token as a string, converting scalar tokens to
    /// their text form.
    pub fn read_as_string(&mut self) -> Result<Option<String>> {
        if !self.read_for(ReadTarget::StringValue)? {
            return Ok(None);
        }
        let converted = match self.token.clone() {
            Some(JsonToken::String(s)) => s,
            Some(JsonToken::Integer(v)) => v.to_string(),
            Some(JsonToken::BigInteger(s)) => s,
            Some(JsonToken::Float(v)) => {
                let mut out = String::new();
                if v.is_finite() {
                    number::format_finite_f64(v, &mut out);
                } else if v.is_nan() {
                    out.push_str("NaN");
                } else if v > 0.0 {
                    out.push_str("Infinity");
                } else {
                    out.push_str("-Infinity");
                }
                out
            }
            Some(JsonToken::Boolean(b)) => String::from(if b { "true" } else { "false" }),
            Some(JsonToken::Date(d)) => d.to_string(),
            Some(JsonToken::Bytes(b)) => crate::bytes::to_base64(&b),
            Some(JsonToken::Null | JsonToken::Undefined | JsonToken::EndArray) | None => {
                return Ok(None);
            }
            Some(other) => {
                return Err(self.data_error(format!(
                    "Error reading string. Unexpected token: {:?}",
                    other.kind()
                )));
            }
        };
        self.token = Some(JsonToken::String(converted.clone()));
        Ok(Some(converted))
    }

    /// Reads the next token as a boolean.
    pub fn read_as_bool(&mut self) -> Result<Option<bool>> {
        if !self.read_for(ReadTarget::Default)? {
            return Ok(None);
        }
        let converted = match self.token.clone() {
            Some(JsonToken::Boolean(b)) => b,
            Some(JsonToken::Integer(v)) => v != 0,
            Some(JsonToken::Float(v)) => v != 0.0,
            Some(JsonToken::String(s)) => {
                if s.is_empty() {
                    self.token = Some(JsonToken::Null);
                    return Ok(None);
                }
                match s.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(
                            self.data_error(format!("Could not convert string to boolean: {s}"))
                        );
                    }
                }
            }
            Some(JsonToken::Null | JsonToken::Undefined | JsonToken::EndArray) | None => {
                return Ok(None);
            }
            Some(other) => {
                return Err(self.data_error(format!(
                    "Error reading boolean. Unexpected token: {:?}",
                    other.kind()
                )));
            }
        };
        self.token = Some(JsonToken::Boolean(converted));
        Ok(Some(converted))
    }

    /// Reads the next token as a byte sequence: a Base64 string, a
    /// GUID-shaped string, or an array of integers in 0–255.
    pub fn read_as_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.read_for(ReadTarget::Default)? {
            return Ok(None);
        }
        let converted = match self.token.clone() {
            Some(JsonToken::Bytes(b)) => b,
            Some(JsonToken::String(s)) => {
                if s.is_empty() {
                    Vec::new()
                } else if let Some(guid) = crate::bytes::guid_bytes(&s) {
                    guid.to_vec()
                } else if let Some(decoded) = crate::bytes::from_base64(&s) {
                    decoded
                } else {
                    return Err(self.data_error(format!("Error decoding Base64 string: {s}")));
                }
            }
            Some(JsonToken::StartArray) => self.read_byte_array()?,
            Some(JsonToken::Null | JsonToken::Undefined | JsonToken::EndArray) | None => {
                return Ok(None);
            }
            Some(other) => {
                return Err(self.data_error(format!(
                    "Error reading bytes. Unexpected token: {:?}",
                    other.kind()
                )));
            }
        };
        self.token = Some(JsonToken::Bytes(converted.clone()));
        Ok(Some(converted))
    }

    /// Materializes an integer array into bytes, reading until the
    /// matching end of array.
    fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            if !self.read()? {
                return Err(self.unexpected_end());
            }
            match self.token.clone() {
                Some(JsonToken::Integer(v)) => {
                    let byte = u8::try_from(v).map_err(|_| {
                        self.data_error(format!("Value {v} is outside the valid range of a byte"))
                    })?;
                    out.push(byte);
                }
                Some(JsonToken::EndArray) => return Ok(out),
                Some(JsonToken::Comment(_)) => {}
                Some(other) => {
                    return Err(self.data_error(format!(
                        "Unexpected token when reading bytes: {:?}",
                        other.kind()
                    )));
                }
                None => return Err(self.unexpected_end()),
            }
        }
    }

    /// Reads the next token as a date, parsing ISO 8601 strings.
    pub fn read_as_date(&mut self) -> Result<Option<JsonDate>> {
        if !self.read_for(ReadTarget::Default)? {
            return Ok(None);
        }
        let converted = match self.token.clone() {
            Some(JsonToken::Date(d)) => d,
            Some(JsonToken::String(s)) => {
                if s.is_empty() {
                    self.token = Some(JsonToken::Null);
                    return Ok(None);
                }
                JsonDate::parse(&s).ok_or_else(|| {
                    self.data_error(format!("Could not convert string to DateTime: {s}"))
                })?
            }
            Some(JsonToken::Null | JsonToken::Undefined | JsonToken::EndArray) | None => {
                return Ok(None);
            }
            Some(other) => {
                return Err(self.data_error(format!(
                    "Error reading date. Unexpected token: {:?}",
                    other.kind()
                )));
            }
        };
        self.token = Some(JsonToken::Date(converted));
        Ok(Some(converted))
    }
}

impl<S: CharSource> JsonReader<S> {
    /// Interns a property name through the configured table, or allocates
    /// a fresh shared string.
    pub(crate) fn resolve_name(&mut self, start: usize, end: usize, escaped: bool) -> Arc<str> {
        if let Some(table) = self.name_table.as_mut() {
            if escaped {
                let owned: String = std::mem::take(&mut self.scratch);
                let interned = table.add(&owned);
                self.scratch = owned;
                interned
            } else {
                let slice = self.buf.slice(start, end);
                if let Some(hit) = table.get(slice) {
                    hit
                } else {
                    let owned: String = slice.iter().collect();
                    table.add(&owned)
                }
            }
        } else if escaped {
            Arc::from(self.scratch.as_str())
        } else {
            let owned: String = self.buf.slice(start, end).iter().collect();
            Arc::from(owned)
        }
    }
}
