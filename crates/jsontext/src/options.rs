//! Configuration for the reader and the writer.
//!
//! These are plain data: each policy is an enum with a documented default,
//! and both options structs implement `Default`. Validation that cannot be
//! expressed in the type (positive depth, a legal quote character) happens
//! at reader/writer construction.

use crate::intern::NameTable;

/// Default nesting depth bound for both the reader and the writer.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How the reader treats comments in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentHandling {
    /// Surface each comment as a [`Comment`](crate::JsonToken::Comment)
    /// token.
    #[default]
    Load,
    /// Skip comments silently; `read` never yields a comment token.
    Ignore,
}

/// How the reader treats the non-standard `NaN`, `Infinity` and
/// `-Infinity` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatParseHandling {
    /// Materialize them as the corresponding `f64` special values.
    #[default]
    Float,
    /// Reject them with a data-format error naming the offending token.
    Reject,
}

/// Options controlling [`JsonReader`](crate::JsonReader) behavior.
#[derive(Debug, Default)]
pub struct ReaderOptions {
    /// Maximum container nesting depth. `None` means the default of 64.
    /// Must be positive.
    pub max_depth: Option<usize>,
    /// Whether comments are surfaced or skipped.
    pub comment_handling: CommentHandling,
    /// Policy for `NaN`/`Infinity`/`-Infinity` keywords.
    pub float_parse_handling: FloatParseHandling,
    /// Accept multiple concatenated top-level JSON documents.
    pub support_multiple_content: bool,
    /// Property-name interner. When present, repeated property names are
    /// resolved to canonical shared strings.
    pub name_table: Option<NameTable>,
}

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formatting {
    /// No extra whitespace.
    #[default]
    None,
    /// Child tokens are newline-separated and indented.
    Indented,
}

/// Which characters the writer escapes inside string literals, beyond the
/// set JSON always requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringEscapeHandling {
    /// Escape control characters only.
    #[default]
    Default,
    /// Escape control characters and everything outside ASCII.
    EscapeNonAscii,
    /// Escape control characters and HTML-sensitive characters
    /// (`<`, `>`, `&`, `'`, `"`).
    EscapeHtml,
}

/// How the writer renders `NaN` and `±Infinity`, which standard JSON
/// cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatFormatHandling {
    /// As quoted strings: `"NaN"`, `"Infinity"`, `"-Infinity"`.
    #[default]
    String,
    /// As bare symbols (non-standard JSON).
    Symbol,
    /// As the substituted default value `0.0`.
    DefaultValue,
}

/// Options controlling [`JsonWriter`](crate::JsonWriter) behavior.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Output formatting mode.
    pub formatting: Formatting,
    /// Character used for indentation. Default space.
    pub indent_char: char,
    /// Number of `indent_char`s per depth level. Default 2.
    pub indentation: usize,
    /// Quote character for strings and quoted names: `"` or `'`.
    pub quote_char: char,
    /// Escaping policy for string content.
    pub string_escape_handling: StringEscapeHandling,
    /// Rendering policy for float special values.
    pub float_format_handling: FloatFormatHandling,
    /// On `close`, auto-complete any still-open containers, writing a
    /// null for a dangling property value. Default true.
    pub auto_complete_on_close: bool,
    /// Flush the underlying sink on `close`. Default true.
    pub close_output: bool,
    /// Maximum container nesting depth. `None` means the default of 64.
    /// Must be positive.
    pub max_depth: Option<usize>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            formatting: Formatting::None,
            indent_char: ' ',
            indentation: 2,
            quote_char: '"',
            string_escape_handling: StringEscapeHandling::Default,
            float_format_handling: FloatFormatHandling::String,
            auto_complete_on_close: true,
            close_output: true,
            max_depth: None,
        }
    }
}
