//! The push-based incremental writer.
//!
//! Every emission funnels through the shared grammar table before any
//! bytes leave: `auto_complete` looks up the transition for the token
//! class, writes the structural glue the transition implies (sibling
//! delimiter, indentation), and advances the state. An invalid transition
//! produces one grammar error and poisons the writer.
//!
//! Formatting is cosmetic only: whether output is indented never changes
//! which tokens are legal.

mod escape;

use std::io;
use std::sync::Arc;

use crate::date::JsonDate;
use crate::error::{Error, Result};
use crate::grammar::{self, State, TokenClass};
use crate::number;
use crate::options::{
    DEFAULT_MAX_DEPTH, FloatFormatHandling, Formatting, StringEscapeHandling, WriterOptions,
};
use crate::position::{JsonContainerType, JsonPosition};
use crate::token::JsonToken;

/// A grammar-checked streaming JSON writer over a byte sink.
pub struct JsonWriter<W: io::Write> {
    out: W,
    state: State,
    stack: Vec<JsonPosition>,
    current_position: JsonPosition,

    formatting: Formatting,
    indent_char: char,
    indentation: usize,
    quote_char: char,
    string_escape_handling: StringEscapeHandling,
    float_format_handling: FloatFormatHandling,
    auto_complete_on_close: bool,
    close_output: bool,
    max_depth: usize,

    escape_flags: [bool; 128],
    scratch: String,
    depth_exceeded: bool,
}

/// A writer accumulating output in memory, drained with
/// [`take_output`](JsonWriter::take_output).
pub type JsonStringWriter = JsonWriter<Vec<u8>>;

impl JsonStringWriter {
    /// Creates an in-memory writer with default options.
    #[must_use]
    pub fn string_writer() -> Self {
        Self::build(Vec::new(), WriterOptions::default())
    }
}

impl<W: io::Write> JsonWriter<W> {
    /// Creates a writer over `out`. Fails on a zero `max_depth` or a quote
    /// character other than `"` or `'`.
    pub fn new(out: W, options: WriterOptions) -> Result<Self> {
        if options.max_depth == Some(0) {
            return Err(Error::grammar("MaxDepth must be a positive integer", "", None));
        }
        if !matches!(options.quote_char, '"' | '\'') {
            return Err(Error::grammar(
                "Invalid JavaScript string quote character. Valid quote characters are ' and \"",
                "",
                None,
            ));
        }
        Ok(Self::build(out, options))
    }

    /// Creates a writer with default options.
    pub fn from_writer(out: W) -> Self {
        Self::build(out, WriterOptions::default())
    }

    fn build(out: W, options: WriterOptions) -> Self {
        Self {
            out,
            state: State::Start,
            stack: Vec::new(),
            current_position: JsonPosition::default(),
            formatting: options.formatting,
            indent_char: options.indent_char,
            indentation: options.indentation,
            quote_char: options.quote_char,
            string_escape_handling: options.string_escape_handling,
            float_format_handling: options.float_format_handling,
            auto_complete_on_close: options.auto_complete_on_close,
            close_output: options.close_output,
            max_depth: options.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            escape_flags: escape::escape_table(
                options.quote_char,
                options.string_escape_handling,
            ),
            scratch: String::new(),
            depth_exceeded: false,
        }
    }

    /// The underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Mutable access to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Number of open container frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.top()
    }

    /// The current JSON path, rebuilt on demand for diagnostics.
    #[must_use]
    pub fn path(&self) -> String {
        let current = (self.current_position.container_type != JsonContainerType::None)
            .then_some(&self.current_position);
        JsonPosition::build_path(&self.stack, current)
    }

    fn top(&self) -> usize {
        self.stack.len()
            + usize::from(self.current_position.container_type != JsonContainerType::None)
    }

    fn grammar_error(&self, message: impl Into<String>) -> Error {
        Error::grammar(message, self.path(), None)
    }

    fn data_error(&self, message: impl Into<String>) -> Error {
        Error::data(message, self.path(), None)
    }

    // ---------------------------------------------------------------
    // Grammar plumbing
    // ---------------------------------------------------------------

    /// Validates the transition for `class`, writes the structural glue it
    /// implies, and advances the state. The single entry point for every
    /// grammar-relevant emission.
    fn auto_complete(&mut self, class: TokenClass) -> Result<()> {
        let Some(next) = grammar::next(self.state, class) else {
            let err = self.grammar_error(format!(
                "Token {class:?} in state {:?} would result in an invalid JSON object",
                self.state
            ));
            self.state = State::Error;
            return Err(err);
        };
        if matches!(self.state, State::Object | State::Array | State::Constructor)
            && class != TokenClass::Comment
        {
            self.out.write_all(b",")?;
        }
        if self.formatting == Formatting::Indented {
            if self.state == State::Property {
                self.out.write_all(b" ")?;
            }
            let indent = matches!(
                self.state,
                State::Array | State::ArrayStart | State::Constructor | State::ConstructorStart
            ) || (class == TokenClass::PropertyName && self.state != State::Start);
            if indent {
                self.write_indent(self.top())?;
            }
        }
        if matches!(
            class,
            TokenClass::Value
                | TokenClass::StartObject
                | TokenClass::StartArray
                | TokenClass::StartConstructor
        ) && self.current_position.has_index
        {
            self.current_position.position += 1;
        }
        self.state = next;
        Ok(())
    }

    fn write_indent(&mut self, levels: usize) -> io::Result<()> {
        self.scratch.clear();
        self.scratch.push('\n');
        for _ in 0..levels * self.indentation {
            self.scratch.push(self.indent_char);
        }
        self.out.write_all(self.scratch.as_bytes())
    }

    /// Opens a container frame after the grammar glue, enforcing the depth
    /// bound once per crossing.
    fn push_frame(&mut self, kind: JsonContainerType) -> Result<()> {
        if self.current_position.container_type != JsonContainerType::None {
            self.stack.push(std::mem::take(&mut self.current_position));
        }
        self.current_position = JsonPosition::new(kind);
        if self.stack.len() + 1 > self.max_depth && !self.depth_exceeded {
            self.depth_exceeded = true;
            return Err(self.grammar_error(format!(
                "The writer's MaxDepth of {} has been exceeded",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Closes containers down to and including the innermost frame of
    /// `kind`, completing a dangling property with a null on the way.
    fn auto_complete_close(&mut self, kind: JsonContainerType) -> Result<()> {
        if matches!(self.state, State::Error | State::Closed) {
            return Err(self.grammar_error(format!(
                "Closing {kind:?} in state {:?} would result in an invalid JSON object",
                self.state
            )));
        }
        let levels = if self.current_position.container_type == kind {
            1
        } else {
            let found = self
                .stack
                .iter()
                .rev()
                .position(|frame| frame.container_type == kind);
            match found {
                Some(above) => above + 2,
                None => return Err(self.grammar_error("No token to close")),
            }
        };
        for _ in 0..levels {
            if self.state == State::Property {
                self.auto_complete(TokenClass::Value)?;
                self.out.write_all(b"null")?;
            }
            let close: &[u8] = match self.current_position.container_type {
                JsonContainerType::Object => b"}",
                JsonContainerType::Array => b"]",
                JsonContainerType::Constructor => b")",
                JsonContainerType::None => {
                    return Err(self.grammar_error("No token to close"));
                }
            };
            if self.formatting == Formatting::Indented
                && matches!(self.state, State::Object | State::Array | State::Constructor)
            {
                self.write_indent(self.top() - 1)?;
            }
            self.out.write_all(close)?;
            self.current_position = self.stack.pop().unwrap_or_default();
            if self.stack.len() + 1 <= self.max_depth {
                self.depth_exceeded = false;
            }
            self.state = match self.current_position.container_type {
                JsonContainerType::Object => State::Object,
                JsonContainerType::Array => State::Array,
                JsonContainerType::Constructor => State::Constructor,
                JsonContainerType::None => State::Start,
            };
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Structural tokens
    // ---------------------------------------------------------------

    /// Opens an object scope.
    pub fn write_start_object(&mut self) -> Result<()> {
        self.auto_complete(TokenClass::StartObject)?;
        self.out.write_all(b"{")?;
        self.push_frame(JsonContainerType::Object)
    }

    /// Opens an array scope.
    pub fn write_start_array(&mut self) -> Result<()> {
        self.auto_complete(TokenClass::StartArray)?;
        self.out.write_all(b"[")?;
        self.push_frame(JsonContainerType::Array)
    }

    /// Opens a `new Name(` constructor scope.
    pub fn write_start_constructor(&mut self, name: &str) -> Result<()> {
        self.auto_complete(TokenClass::StartConstructor)?;
        self.out.write_all(b"new ")?;
        self.out.write_all(name.as_bytes())?;
        self.out.write_all(b"(")?;
        self.push_frame(JsonContainerType::Constructor)
    }

    /// Closes the nearest open object, auto-completing anything inside.
    pub fn write_end_object(&mut self) -> Result<()> {
        self.auto_complete_close(JsonContainerType::Object)
    }

    /// Closes the nearest open array, auto-completing anything inside.
    pub fn write_end_array(&mut self) -> Result<()> {
        self.auto_complete_close(JsonContainerType::Array)
    }

    /// Closes the nearest open constructor, auto-completing anything
    /// inside.
    pub fn write_end_constructor(&mut self) -> Result<()> {
        self.auto_complete_close(JsonContainerType::Constructor)
    }

    /// Closes the innermost open container, whatever its kind.
    pub fn write_end(&mut self) -> Result<()> {
        let kind = self.current_position.container_type;
        if kind == JsonContainerType::None {
            return Err(self.grammar_error("No token to close"));
        }
        self.auto_complete_close(kind)
    }

    /// Writes a property name and its `:` separator.
    pub fn write_property_name(&mut self, name: &str) -> Result<()> {
        self.auto_complete(TokenClass::PropertyName)?;
        self.current_position.property_name = Some(Arc::from(name));
        self.write_quoted(name)?;
        self.out.write_all(b":")?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Values
    // ---------------------------------------------------------------

    fn write_value_text(&mut self, text: &str) -> Result<()> {
        self.auto_complete(TokenClass::Value)?;
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_quoted(&mut self, text: &str) -> Result<()> {
        let mut quote = [0u8; 4];
        let quote = self.quote_char.encode_utf8(&mut quote).as_bytes();
        self.out.write_all(quote)?;
        escape::write_escaped(
            &mut self.out,
            text,
            self.quote_char,
            self.string_escape_handling,
            &self.escape_flags,
        )?;
        self.out.write_all(quote)?;
        Ok(())
    }

    /// Writes a `null` value.
    pub fn write_null(&mut self) -> Result<()> {
        self.write_value_text("null")
    }

    /// Writes an `undefined` value.
    pub fn write_undefined(&mut self) -> Result<()> {
        self.write_value_text("undefined")
    }

    /// Writes a boolean value.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_value_text(if value { "true" } else { "false" })
    }

    /// Writes an integer value.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.auto_complete(TokenClass::Value)?;
        let mut buf = [0u8; 20];
        self.out.write_all(number::format_i64(value, &mut buf).as_bytes())?;
        Ok(())
    }

    /// Writes an integer value.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_i64(i64::from(value))
    }

    /// Writes an unsigned integer value.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.auto_complete(TokenClass::Value)?;
        let mut buf = [0u8; 20];
        self.out.write_all(number::format_u64(value, &mut buf).as_bytes())?;
        Ok(())
    }

    /// Writes an arbitrary-precision integer from its canonical digit
    /// string.
    pub fn write_big_integer(&mut self, digits: &str) -> Result<()> {
        let valid = {
            let unsigned = digits.strip_prefix('-').unwrap_or(digits);
            !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit())
        };
        if !valid {
            return Err(self.data_error(format!("Input string '{digits}' is not a valid integer")));
        }
        self.write_value_text(digits)
    }

    /// Writes a floating-point value. Finite values keep a shortest
    /// rescannable form; NaN and the infinities follow the configured
    /// policy.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        if value.is_finite() {
            self.auto_complete(TokenClass::Value)?;
            self.scratch.clear();
            number::format_finite_f64(value, &mut self.scratch);
            self.out.write_all(self.scratch.as_bytes())?;
            return Ok(());
        }
        let symbol = if value.is_nan() {
            "NaN"
        } else if value > 0.0 {
            "Infinity"
        } else {
            "-Infinity"
        };
        self.write_float_special(symbol)
    }

    /// Writes a floating-point value.
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        if value.is_finite() {
            self.auto_complete(TokenClass::Value)?;
            self.scratch.clear();
            number::format_finite_f32(value, &mut self.scratch);
            self.out.write_all(self.scratch.as_bytes())?;
            return Ok(());
        }
        self.write_f64(f64::from(value))
    }

    /// NaN and the infinities, which standard JSON cannot carry, follow
    /// the configured policy.
    fn write_float_special(&mut self, symbol: &str) -> Result<()> {
        match self.float_format_handling {
            FloatFormatHandling::String => {
                self.auto_complete(TokenClass::Value)?;
                self.write_quoted(symbol)
            }
            FloatFormatHandling::Symbol => self.write_value_text(symbol),
            FloatFormatHandling::DefaultValue => self.write_value_text("0.0"),
        }
    }

    /// Writes a quoted, escaped string value.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.auto_complete(TokenClass::Value)?;
        self.write_quoted(text)
    }

    /// Writes a date as a quoted ISO 8601 string.
    pub fn write_date(&mut self, date: JsonDate) -> Result<()> {
        self.auto_complete(TokenClass::Value)?;
        self.write_quoted(&date.to_string())
    }

    /// Writes binary data as a quoted base64 string.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.auto_complete(TokenClass::Value)?;
        self.write_quoted(&crate::bytes::to_base64(bytes))
    }

    // ---------------------------------------------------------------
    // Raw output, comments, whitespace
    // ---------------------------------------------------------------

    /// Writes text verbatim with no grammar participation.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Writes pre-serialized JSON as a value: delimiters and state follow
    /// the value transition, the text itself is trusted.
    pub fn write_raw_value(&mut self, text: &str) -> Result<()> {
        self.write_value_text(text)
    }

    /// Writes a `/* */` comment; no delimiter is emitted around it.
    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        self.auto_complete(TokenClass::Comment)?;
        self.out.write_all(b"/*")?;
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"*/")?;
        Ok(())
    }

    /// Writes inter-token whitespace, rejecting anything that is not
    /// whitespace.
    pub fn write_whitespace(&mut self, ws: &str) -> Result<()> {
        if !ws.chars().all(char::is_whitespace) {
            return Err(self.data_error("Only white space characters should be used"));
        }
        self.out.write_all(ws.as_bytes())?;
        Ok(())
    }

    /// Replays a reader token through the corresponding write operation.
    pub fn write_token(&mut self, token: &JsonToken) -> Result<()> {
        match token {
            JsonToken::StartObject => self.write_start_object(),
            JsonToken::StartArray => self.write_start_array(),
            JsonToken::StartConstructor(name) => self.write_start_constructor(name),
            JsonToken::PropertyName(name) => self.write_property_name(name),
            JsonToken::Comment(text) => self.write_comment(text),
            JsonToken::Raw(text) => self.write_raw_value(text),
            JsonToken::Integer(v) => self.write_i64(*v),
            JsonToken::BigInteger(digits) => self.write_big_integer(digits),
            JsonToken::Float(v) => self.write_f64(*v),
            JsonToken::String(text) => self.write_string(text),
            JsonToken::Boolean(v) => self.write_bool(*v),
            JsonToken::Null => self.write_null(),
            JsonToken::Undefined => self.write_undefined(),
            JsonToken::EndObject => self.write_end_object(),
            JsonToken::EndArray => self.write_end_array(),
            JsonToken::EndConstructor => self.write_end_constructor(),
            JsonToken::Date(d) => self.write_date(*d),
            JsonToken::Bytes(b) => self.write_bytes(b),
        }
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Finishes the document. With `auto_complete_on_close`, open
    /// containers are closed innermost-first, a dangling property value
    /// completing as null. The sink is flushed when `close_output` is set,
    /// and the writer rejects all further tokens.
    pub fn close(&mut self) -> Result<()> {
        if self.auto_complete_on_close && self.state != State::Error {
            while self.current_position.container_type != JsonContainerType::None {
                let kind = self.current_position.container_type;
                self.auto_complete_close(kind)?;
            }
        }
        if self.close_output {
            self.out.flush()?;
        }
        self.state = State::Closed;
        Ok(())
    }
}

impl JsonWriter<Vec<u8>> {
    /// Drains everything written so far, leaving the writer running.
    pub fn take_output(&mut self) -> String {
        let bytes = std::mem::take(&mut self.out);
        String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}
