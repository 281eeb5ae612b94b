//! The incremental execution path.
//!
//! [`JsonFeedReader`] drives the same scan implementation as the blocking
//! reader over a [`FeedSource`]: callers push text chunks with [`feed`]
//! and poll for tokens; a poll that runs out of buffered input returns
//! [`Poll::Pending`] with no token consumed, and the next poll re-scans
//! the interrupted token from its saved start. Token boundaries never
//! depend on chunk boundaries, so the sequence of tokens is identical to
//! a single-shot read of the concatenated input.
//!
//! The writing side needs no suspension machinery: [`JsonStringWriter`]
//! accumulates output in memory for the caller to drain between tokens.
//!
//! [`feed`]: JsonFeedReader::feed
//! [`JsonStringWriter`]: crate::JsonStringWriter

use core::task::Poll;

use crate::error::Result;
use crate::options::ReaderOptions;
use crate::reader::{JsonReader, ReadOutcome};
use crate::source::FeedSource;
use crate::token::{JsonToken, TokenKind};

/// A push-based tokenizing reader: feed chunks in, poll tokens out.
pub struct JsonFeedReader {
    inner: JsonReader<FeedSource>,
}

impl JsonFeedReader {
    /// Creates a feed reader with default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: JsonReader::build(FeedSource::new(), ReaderOptions::default()),
        }
    }

    /// Creates a feed reader with the given options. Fails when
    /// `options.max_depth` is zero.
    pub fn with_options(options: ReaderOptions) -> Result<Self> {
        Ok(Self {
            inner: JsonReader::new(FeedSource::new(), options)?,
        })
    }

    /// Appends a chunk of input text. Chunks may split the text anywhere,
    /// including inside a token.
    pub fn feed(&mut self, chunk: &str) {
        self.inner.source_mut().push_str(chunk);
    }

    /// Marks the end of input. Pending polls then resolve to an end of
    /// document or an unexpected-end error instead of `Pending`.
    pub fn finish(&mut self) {
        self.inner.source_mut().close();
    }

    /// Attempts to advance one token.
    ///
    /// `Ready(Ok(true))` means a token is available via [`value`],
    /// `Ready(Ok(false))` means the document is complete, and `Pending`
    /// means more input is required; feed and poll again.
    ///
    /// [`value`]: JsonFeedReader::value
    pub fn poll_token(&mut self) -> Poll<Result<bool>> {
        match self.inner.try_read() {
            Ok(ReadOutcome::HasToken) => Poll::Ready(Ok(true)),
            Ok(ReadOutcome::EndOfDocument) => Poll::Ready(Ok(false)),
            Ok(ReadOutcome::NeedMore) => Poll::Pending,
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    /// The kind of the current token.
    #[must_use]
    pub fn token_type(&self) -> TokenKind {
        self.inner.token_type()
    }

    /// The current token with its payload, if any.
    #[must_use]
    pub fn value(&self) -> Option<&JsonToken> {
        self.inner.value()
    }

    /// Number of open ancestor containers. On a container-start token the
    /// container itself is not yet counted.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.inner.depth()
    }

    /// The current JSON path, rebuilt on demand for diagnostics.
    #[must_use]
    pub fn path(&self) -> String {
        self.inner.path()
    }

    /// One-based line number at the scan position.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.inner.line_number()
    }

    /// Zero-based character position within the current line.
    #[must_use]
    pub fn line_position(&self) -> usize {
        self.inner.line_position()
    }
}

impl Default for JsonFeedReader {
    fn default() -> Self {
        Self::new()
    }
}
