//! A streaming JSON token codec: a pull-based tokenizing reader and a
//! push-based incremental writer sharing one table-driven grammar.
//!
//! The reader scans text (or UTF-8 bytes, or fed chunks) into a stream of
//! [`JsonToken`]s with position and path diagnostics; the writer replays
//! tokens (or explicit `write_*` calls) into serialized text, with the
//! same grammar table deciding validity on both sides.
//!
//! ```
//! use jsontext::{JsonReader, JsonStringWriter};
//!
//! # fn main() -> jsontext::Result<()> {
//! let mut reader = JsonReader::from_str(r#"{"name":"glyph","sizes":[1,2]}"#);
//! let mut writer = JsonStringWriter::string_writer();
//! while reader.read()? {
//!     let token = reader.value().cloned().expect("token after read");
//!     writer.write_token(&token)?;
//! }
//! writer.close()?;
//! assert_eq!(writer.take_output(), r#"{"name":"glyph","sizes":[1,2]}"#);
//! # Ok(())
//! # }
//! ```

mod buffer;
mod bytes;
mod date;
mod grammar;
mod intern;
mod number;
mod position;

mod error;
mod feed;
mod options;
mod reader;
mod source;
mod token;
mod writer;

pub use date::JsonDate;
pub use error::{Diagnostic, Error, LinePosition, Result};
pub use feed::JsonFeedReader;
pub use intern::NameTable;
pub use options::{
    CommentHandling, DEFAULT_MAX_DEPTH, FloatFormatHandling, FloatParseHandling, Formatting,
    ReaderOptions, StringEscapeHandling, WriterOptions,
};
pub use position::JsonContainerType;
pub use reader::JsonReader;
pub use source::{BlockingSource, CharSource, FeedSource, Fetched, IoSource, StrSource};
pub use token::{JsonToken, TokenKind};
pub use writer::{JsonStringWriter, JsonWriter};
