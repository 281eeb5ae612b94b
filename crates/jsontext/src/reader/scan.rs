//! Character-level scanning: whitespace, strings, numbers, keywords,
//! comments, constructors.
//!
//! Every routine here is restartable: when the source reports pending
//! input the routine unwinds with no token produced and no commit, and the
//! next attempt re-scans from the committed anchor. Buffer refills may
//! compact or grow the arena, shifting indices; locals held across a
//! refill are therefore derived from `token_start`, which the refill path
//! adjusts.

use std::sync::Arc;

use super::{Io, JsonReader, ReadOutcome, ReadState, ReadTarget};
use crate::error::Result;
use crate::number::{self, NumberError, ParsedInteger};
use crate::options::{CommentHandling, FloatParseHandling};
use crate::source::CharSource;
use crate::token::JsonToken;

/// Characters that may legally follow a keyword literal.
fn is_separator(c: char) -> bool {
    matches!(c, ',' | '}' | ']' | ')' | '/') || c.is_whitespace()
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Location of scanned string content inside the buffer, valid until the
/// next refill. `escaped` means the decoded text lives in the scratch
/// buffer instead.
struct StringBody {
    start: usize,
    end: usize,
    escaped: bool,
}

impl<S: CharSource> JsonReader<S> {
    /// Skips whitespace without committing; used inside multi-part tokens
    /// where the committed anchor must stay at the token start.
    fn skip_whitespace_inner(&mut self) -> Result<Io> {
        loop {
            match self.buf.current() {
                '\0' if self.buf.exhausted() => match self.ensure()? {
                    Io::Ready => {}
                    other => return Ok(other),
                },
                c if c.is_whitespace() => self.buf.bump(),
                _ => return Ok(Io::Ready),
            }
        }
    }

    /// Skips and commits whitespace at a token boundary.
    pub(super) fn skip_whitespace(&mut self) -> Result<Io> {
        let io = self.skip_whitespace_inner()?;
        self.commit();
        Ok(io)
    }

    /// Scans one token at a value position.
    pub(super) fn parse_value_position(&mut self) -> Result<Option<ReadOutcome>> {
        match self.skip_whitespace()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => {
                if self.state == ReadState::Start {
                    self.token = None;
                    return Ok(Some(ReadOutcome::EndOfDocument));
                }
                return Err(self.unexpected_end());
            }
            Io::Ready => {}
        }
        let c = self.buf.current();
        match c {
            '"' | '\'' => self.parse_string_value(c),
            '{' => {
                self.buf.bump();
                self.begin_container(JsonToken::StartObject)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            '[' => {
                self.buf.bump();
                self.begin_container(JsonToken::StartArray)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            ']' if self.state == ReadState::ArrayStart => {
                self.buf.bump();
                self.end_container(JsonToken::EndArray)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            ')' if matches!(self.state, ReadState::ConstructorStart | ReadState::Constructor) => {
                self.buf.bump();
                self.end_container(JsonToken::EndConstructor)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            't' => self.finish_keyword("true", JsonToken::Boolean(true), "Error parsing boolean value"),
            'f' => self.finish_keyword("false", JsonToken::Boolean(false), "Error parsing boolean value"),
            'n' => self.parse_null_or_constructor(),
            'u' => self.finish_keyword("undefined", JsonToken::Undefined, "Error parsing undefined value"),
            'N' => self.finish_float_keyword("NaN", f64::NAN, "Cannot read NaN value"),
            'I' => self.finish_float_keyword("Infinity", f64::INFINITY, "Cannot read Infinity value"),
            '-' => {
                if self.ensure_ahead(2)? == Io::Pending {
                    return Ok(Some(ReadOutcome::NeedMore));
                }
                let available = self.buf.high_water() - self.buf.pos;
                if available >= 2 && self.buf.char_at(self.buf.pos + 1) == 'I' {
                    self.finish_float_keyword("-Infinity", f64::NEG_INFINITY, "Cannot read Infinity value")
                } else {
                    self.parse_number()
                }
            }
            '0'..='9' | '.' => self.parse_number(),
            ',' => {
                // An array hole. The comma is left for the post-value
                // state to consume as the element delimiter.
                self.set_value_token(JsonToken::Undefined)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            '/' => self.parse_comment(),
            _ => Err(self.grammar_error(format!(
                "Unexpected character encountered while parsing value: {c}"
            ))),
        }
    }

    /// Scans one token at a property-name position.
    pub(super) fn parse_object_position(&mut self) -> Result<Option<ReadOutcome>> {
        match self.skip_whitespace()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => return Err(self.unexpected_end()),
            Io::Ready => {}
        }
        let c = self.buf.current();
        match c {
            '}' if self.state == ReadState::ObjectStart => {
                self.buf.bump();
                self.end_container(JsonToken::EndObject)?;
                Ok(Some(ReadOutcome::HasToken))
            }
            '/' => self.parse_comment(),
            '"' | '\'' => self.parse_property_name(Some(c)),
            _ if is_name_start(c) => self.parse_property_name(None),
            _ => Err(self.grammar_error(format!("Invalid property identifier character: {c}"))),
        }
    }

    /// Scans a property name (quoted or bare identifier) through its
    /// terminating colon.
    fn parse_property_name(&mut self, quote: Option<char>) -> Result<Option<ReadOutcome>> {
        let (start, end, escaped) = match quote {
            Some(q) => {
                let Some(body) = self.scan_string(q)? else {
                    return Ok(Some(ReadOutcome::NeedMore));
                };
                (body.start, body.end, body.escaped)
            }
            None => {
                // Bare identifier; the anchor sits on its first character.
                loop {
                    let c = self.buf.current();
                    if c == '\0' && self.buf.exhausted() {
                        match self.ensure()? {
                            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
                            Io::End => break,
                            Io::Ready => {}
                        }
                        continue;
                    }
                    if is_name_char(c) {
                        self.buf.bump();
                        continue;
                    }
                    if c == ':' || c.is_whitespace() {
                        break;
                    }
                    return Err(self.grammar_error(format!(
                        "Invalid JavaScript property identifier character: {c}"
                    )));
                }
                (self.token_start, self.buf.pos, false)
            }
        };
        // Materialize the name before any further refill can shift the
        // buffer under the recorded indices.
        let name = self.resolve_name(start, end, escaped);
        match self.skip_whitespace_inner()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => return Err(self.unexpected_end()),
            Io::Ready => {}
        }
        let c = self.buf.current();
        if c != ':' {
            return Err(self.grammar_error(format!(
                "Invalid character after parsing property name. Expected ':' but got: {c}"
            )));
        }
        self.buf.bump();
        self.set_property_token(name)?;
        Ok(Some(ReadOutcome::HasToken))
    }

    /// Scans a quoted string value.
    fn parse_string_value(&mut self, quote: char) -> Result<Option<ReadOutcome>> {
        let Some(body) = self.scan_string(quote)? else {
            return Ok(Some(ReadOutcome::NeedMore));
        };
        let text: String = if body.escaped {
            std::mem::take(&mut self.scratch)
        } else {
            self.buf.slice(body.start, body.end).iter().collect()
        };
        self.set_value_token(JsonToken::String(text))?;
        Ok(Some(ReadOutcome::HasToken))
    }

    /// Scans string content between quotes, decoding escapes into the
    /// scratch buffer only once the text diverges from the source.
    fn scan_string(&mut self, quote: char) -> Result<Option<StringBody>> {
        self.scratch.clear();
        let mut escaped = false;
        self.buf.bump();
        loop {
            let c = self.buf.current();
            if c == '\0' && self.buf.exhausted() {
                match self.ensure()? {
                    Io::Pending => return Ok(None),
                    Io::End => {
                        return Err(self.data_error(format!(
                            "Unterminated string. Expected delimiter: {quote}"
                        )));
                    }
                    Io::Ready => {}
                }
                continue;
            }
            if c == quote {
                self.buf.bump();
                return Ok(Some(StringBody {
                    start: self.token_start + 1,
                    end: self.buf.pos - 1,
                    escaped,
                }));
            }
            if c == '\\' {
                if !escaped {
                    let prefix: String =
                        self.buf.slice(self.token_start + 1, self.buf.pos).iter().collect();
                    self.scratch.push_str(&prefix);
                    escaped = true;
                }
                self.buf.bump();
                match self.ensure()? {
                    Io::Pending => return Ok(None),
                    Io::End => {
                        return Err(self.data_error(format!(
                            "Unterminated string. Expected delimiter: {quote}"
                        )));
                    }
                    Io::Ready => {}
                }
                let esc = self.buf.current();
                match esc {
                    'b' => {
                        self.scratch.push('\u{8}');
                        self.buf.bump();
                    }
                    't' => {
                        self.scratch.push('\t');
                        self.buf.bump();
                    }
                    'n' => {
                        self.scratch.push('\n');
                        self.buf.bump();
                    }
                    'f' => {
                        self.scratch.push('\u{c}');
                        self.buf.bump();
                    }
                    'r' => {
                        self.scratch.push('\r');
                        self.buf.bump();
                    }
                    '\\' | '/' | '"' | '\'' => {
                        self.scratch.push(esc);
                        self.buf.bump();
                    }
                    'u' => {
                        self.buf.bump();
                        if self.push_unicode_escape()?.is_none() {
                            return Ok(None);
                        }
                    }
                    _ => {
                        return Err(self.data_error(format!("Bad JSON escape sequence: \\{esc}")));
                    }
                }
                continue;
            }
            if escaped {
                self.scratch.push(c);
            }
            self.buf.bump();
        }
    }

    /// Reads four hex digits of a `\u` escape.
    fn read_hex4(&mut self) -> Result<Option<u32>> {
        match self.ensure_ahead(4)? {
            Io::Pending => return Ok(None),
            Io::End => {
                return Err(
                    self.data_error("Unexpected end while parsing Unicode escape sequence")
                );
            }
            Io::Ready => {}
        }
        let mut code: u32 = 0;
        for _ in 0..4 {
            let c = self.buf.current();
            let digit = c.to_digit(16).ok_or_else(|| {
                self.data_error(format!("Invalid Unicode escape sequence character: {c}"))
            })?;
            code = code * 16 + digit;
            self.buf.bump();
        }
        Ok(Some(code))
    }

    /// Decodes one `\u` escape (the `\u` itself already consumed) into the
    /// scratch buffer, pairing surrogates.
    ///
    /// A high surrogate pairs only with an immediately following `\u` low
    /// surrogate. Anything unpaired becomes U+FFFD: a bare low surrogate,
    /// a high surrogate at the end of the string, and each high surrogate
    /// in a run of consecutive highs, which are reconsidered one by one.
    fn push_unicode_escape(&mut self) -> Result<Option<()>> {
        let Some(first) = self.read_hex4()? else {
            return Ok(None);
        };
        let mut code = first;
        loop {
            if (0xDC00..0xE000).contains(&code) {
                self.scratch.push('\u{FFFD}');
                return Ok(Some(()));
            }
            if !(0xD800..0xDC00).contains(&code) {
                match char::from_u32(code) {
                    Some(c) => self.scratch.push(c),
                    None => self.scratch.push('\u{FFFD}'),
                }
                return Ok(Some(()));
            }
            // High surrogate: look for a paired escape.
            if self.ensure_ahead(2)? == Io::Pending {
                return Ok(None);
            }
            let paired = self.buf.high_water() - self.buf.pos >= 2
                && self.buf.current() == '\\'
                && self.buf.char_at(self.buf.pos + 1) == 'u';
            if !paired {
                self.scratch.push('\u{FFFD}');
                return Ok(Some(()));
            }
            self.buf.bump();
            self.buf.bump();
            let Some(low) = self.read_hex4()? else {
                return Ok(None);
            };
            if (0xDC00..0xE000).contains(&low) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                match char::from_u32(combined) {
                    Some(c) => self.scratch.push(c),
                    None => self.scratch.push('\u{FFFD}'),
                }
                return Ok(Some(()));
            }
            // Not a low surrogate: replace the dangling high and
            // reconsider the new unit on its own.
            self.scratch.push('\u{FFFD}');
            code = low;
        }
    }

    /// Collects the maximal run of number characters and converts it for
    /// the active read target.
    fn parse_number(&mut self) -> Result<Option<ReadOutcome>> {
        loop {
            let c = self.buf.current();
            if c == '\0' && self.buf.exhausted() {
                match self.ensure()? {
                    Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
                    Io::End => break,
                    Io::Ready => {}
                }
                continue;
            }
            if number::is_number_char(c) {
                self.buf.bump();
            } else {
                break;
            }
        }
        let text: String = self.buf.slice(self.token_start, self.buf.pos).iter().collect();
        let token = self.number_token(&text)?;
        self.set_value_token(token)?;
        Ok(Some(ReadOutcome::HasToken))
    }

    fn number_token(&self, text: &str) -> Result<JsonToken> {
        let map = |e: NumberError| self.data_error(e.to_string());
        match self.read_target {
            ReadTarget::Int32 => number::parse_i32(text)
                .map(|v| JsonToken::Integer(i64::from(v)))
                .map_err(map),
            ReadTarget::Double => number::parse_f64(text).map(JsonToken::Float).map_err(map),
            ReadTarget::Decimal => number::parse_decimal(text).map(JsonToken::String).map_err(map),
            ReadTarget::StringValue => {
                // Validate the literal, then surface its source text.
                if number::has_float_markers(text) {
                    number::parse_f64(text).map_err(map)?;
                } else {
                    number::parse_integer(text).map_err(map)?;
                }
                Ok(JsonToken::String(text.to_owned()))
            }
            ReadTarget::Default => {
                if number::has_float_markers(text) {
                    number::parse_f64(text).map(JsonToken::Float).map_err(map)
                } else {
                    match number::parse_integer(text) {
                        Ok(ParsedInteger::I64(v)) => Ok(JsonToken::Integer(v)),
                        Ok(ParsedInteger::Big(s)) => Ok(JsonToken::BigInteger(s)),
                        // A malformed integer may still be a valid float
                        // literal; anything else is not a number at all.
                        Err(NumberError::InvalidInteger(_)) => number::parse_f64(text)
                            .map(JsonToken::Float)
                            .map_err(|_| map(NumberError::InvalidNumber(text.to_owned()))),
                        Err(e) => Err(map(e)),
                    }
                }
            }
        }
    }

    fn finish_keyword(
        &mut self,
        keyword: &'static str,
        token: JsonToken,
        error: &'static str,
    ) -> Result<Option<ReadOutcome>> {
        if self.match_keyword(keyword, error)?.is_none() {
            return Ok(Some(ReadOutcome::NeedMore));
        }
        self.set_value_token(token)?;
        Ok(Some(ReadOutcome::HasToken))
    }

    fn finish_float_keyword(
        &mut self,
        keyword: &'static str,
        value: f64,
        reject: &'static str,
    ) -> Result<Option<ReadOutcome>> {
        if self.match_keyword(keyword, reject)?.is_none() {
            return Ok(Some(ReadOutcome::NeedMore));
        }
        if self.float_parse_handling == FloatParseHandling::Reject {
            return Err(self.data_error(reject));
        }
        self.set_value_token(JsonToken::Float(value))?;
        Ok(Some(ReadOutcome::HasToken))
    }

    /// Matches a keyword literal and checks it terminates at a separator,
    /// so `truek` is rejected rather than read as `true`.
    fn match_keyword(
        &mut self,
        keyword: &'static str,
        error: &'static str,
    ) -> Result<Option<()>> {
        for expected in keyword.chars() {
            match self.ensure()? {
                Io::Pending => return Ok(None),
                Io::End => return Err(self.data_error(error)),
                Io::Ready => {}
            }
            if self.buf.current() != expected {
                return Err(self.data_error(error));
            }
            self.buf.bump();
        }
        match self.ensure()? {
            Io::Pending => Ok(None),
            Io::End => Ok(Some(())),
            Io::Ready => {
                let c = self.buf.current();
                if is_separator(c) {
                    Ok(Some(()))
                } else {
                    Err(self.data_error(error))
                }
            }
        }
    }

    fn parse_null_or_constructor(&mut self) -> Result<Option<ReadOutcome>> {
        if self.ensure_ahead(2)? == Io::Pending {
            return Ok(Some(ReadOutcome::NeedMore));
        }
        let available = self.buf.high_water() - self.buf.pos;
        if available >= 2 && self.buf.char_at(self.buf.pos + 1) == 'e' {
            return self.parse_constructor();
        }
        self.finish_keyword("null", JsonToken::Null, "Error parsing null value")
    }

    /// Scans `new Name(` and opens a constructor frame.
    fn parse_constructor(&mut self) -> Result<Option<ReadOutcome>> {
        const ERROR: &str = "Unexpected content while parsing JSON";
        for expected in "new".chars() {
            match self.ensure()? {
                Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
                Io::End => return Err(self.data_error(ERROR)),
                Io::Ready => {}
            }
            if self.buf.current() != expected {
                return Err(self.data_error(ERROR));
            }
            self.buf.bump();
        }
        match self.ensure()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => return Err(self.data_error(ERROR)),
            Io::Ready => {}
        }
        if !self.buf.current().is_whitespace() {
            return Err(self.data_error(ERROR));
        }
        match self.skip_whitespace_inner()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => return Err(self.data_error("Unexpected end while parsing constructor")),
            Io::Ready => {}
        }
        // The anchor stays at `new`; the name is tracked relative to it.
        let name_offset = self.buf.pos - self.token_start;
        loop {
            let c = self.buf.current();
            if c == '\0' && self.buf.exhausted() {
                match self.ensure()? {
                    Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
                    Io::End => {
                        return Err(
                            self.data_error("Unexpected end while parsing constructor")
                        );
                    }
                    Io::Ready => {}
                }
                continue;
            }
            if is_name_char(c) {
                self.buf.bump();
                continue;
            }
            break;
        }
        let name_end_offset = self.buf.pos - self.token_start;
        if name_end_offset == name_offset {
            return Err(self.data_error(ERROR));
        }
        match self.skip_whitespace_inner()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => return Err(self.data_error("Unexpected end while parsing constructor")),
            Io::Ready => {}
        }
        let c = self.buf.current();
        if c != '(' {
            return Err(self.data_error(format!(
                "Unexpected character while parsing constructor: {c}"
            )));
        }
        self.buf.bump();
        let name: String = self
            .buf
            .slice(self.token_start + name_offset, self.token_start + name_end_offset)
            .iter()
            .collect();
        self.begin_container(JsonToken::StartConstructor(Arc::from(name)))?;
        Ok(Some(ReadOutcome::HasToken))
    }

    /// Scans a line or block comment. Returns a token with `Load`
    /// handling, or signals the read loop to continue with `Ignore`.
    pub(super) fn parse_comment(&mut self) -> Result<Option<ReadOutcome>> {
        self.buf.bump();
        match self.ensure()? {
            Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
            Io::End => return Err(self.data_error("Unexpected end while parsing comment")),
            Io::Ready => {}
        }
        let block = match self.buf.current() {
            '*' => true,
            '/' => false,
            c => {
                return Err(self.data_error(format!("Error parsing comment. Expected: *, got {c}")));
            }
        };
        self.buf.bump();
        let content_offset = self.buf.pos - self.token_start;
        let content_end_offset;
        if block {
            loop {
                let c = self.buf.current();
                if c == '\0' && self.buf.exhausted() {
                    match self.ensure()? {
                        Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
                        Io::End => {
                            return Err(self.data_error("Unexpected end while parsing comment"));
                        }
                        Io::Ready => {}
                    }
                    continue;
                }
                if c == '*' {
                    if self.ensure_ahead(2)? == Io::Pending {
                        return Ok(Some(ReadOutcome::NeedMore));
                    }
                    if self.buf.high_water() - self.buf.pos >= 2
                        && self.buf.char_at(self.buf.pos + 1) == '/'
                    {
                        content_end_offset = self.buf.pos - self.token_start;
                        self.buf.bump();
                        self.buf.bump();
                        break;
                    }
                }
                self.buf.bump();
            }
        } else {
            loop {
                let c = self.buf.current();
                if c == '\0' && self.buf.exhausted() {
                    match self.ensure()? {
                        Io::Pending => return Ok(Some(ReadOutcome::NeedMore)),
                        Io::End => {
                            content_end_offset = self.buf.pos - self.token_start;
                            break;
                        }
                        Io::Ready => {}
                    }
                    continue;
                }
                if c == '\n' || c == '\r' {
                    // The terminator stays for whitespace handling.
                    content_end_offset = self.buf.pos - self.token_start;
                    break;
                }
                self.buf.bump();
            }
        }
        if self.comment_handling == CommentHandling::Ignore {
            self.commit();
            return Ok(None);
        }
        let text: String = self
            .buf
            .slice(self.token_start + content_offset, self.token_start + content_end_offset)
            .iter()
            .collect();
        self.set_comment_token(text)?;
        Ok(Some(ReadOutcome::HasToken))
    }
}
