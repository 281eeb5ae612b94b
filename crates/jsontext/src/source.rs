//! Character sources feeding the reader's buffer.
//!
//! A [`CharSource`] hands characters to the buffer on demand. Blocking
//! sources (`&str`, `io::Read`) always resolve to characters or
//! end-of-input; the feed source additionally reports [`Fetched::Pending`]
//! when its queue runs dry before being closed, which is the reader's only
//! suspension point.

use std::collections::VecDeque;
use std::io;

use crate::error::Result;

/// Outcome of one fetch from a character source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// This many characters were written to the destination.
    Chars(usize),
    /// The source is exhausted; no more characters will ever arrive.
    Eof,
    /// No characters are available right now, but more may be fed later.
    /// Only non-blocking sources report this.
    Pending,
}

/// A pull source of characters.
pub trait CharSource {
    /// Fetches up to `dst.len()` characters into `dst`.
    fn read_chars(&mut self, dst: &mut [char]) -> Result<Fetched>;
}

/// Marker for sources that never report [`Fetched::Pending`]. The
/// synchronous read API is only available over these.
pub trait BlockingSource: CharSource {}

/// A source over an in-memory string slice.
#[derive(Debug)]
pub struct StrSource<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    /// Wraps `text` as a character source.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { chars: text.chars() }
    }
}

impl CharSource for StrSource<'_> {
    fn read_chars(&mut self, dst: &mut [char]) -> Result<Fetched> {
        let mut n = 0;
        while n < dst.len() {
            match self.chars.next() {
                Some(c) => {
                    dst[n] = c;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 { Ok(Fetched::Eof) } else { Ok(Fetched::Chars(n)) }
    }
}

impl BlockingSource for StrSource<'_> {}

/// Expected length of a UTF-8 sequence from its first byte. Continuation
/// and invalid bytes count as one so they surface as replacement
/// characters instead of stalling the decoder.
fn utf8_sequence_len(first: u8) -> usize {
    match first {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xFF => 4,
        _ => 1,
    }
}

/// A source decoding UTF-8 incrementally from any [`io::Read`].
///
/// Invalid sequences decode to U+FFFD; a sequence split across two reads
/// is carried over and completed by the next read.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    /// Undecoded byte carry-over between reads.
    pending: Vec<u8>,
    done: bool,
}

impl<R: io::Read> IoSource<R> {
    /// Wraps a byte reader as a character source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            done: false,
        }
    }

    fn drain_pending(&mut self, dst: &mut [char], n: &mut usize) {
        let mut offset = 0;
        while *n < dst.len() {
            let rest = &self.pending[offset..];
            if rest.is_empty() {
                break;
            }
            // A valid-so-far prefix shorter than its sequence may still be
            // completed by the next read; only at end-of-stream is it
            // lossily decoded.
            if rest.len() < utf8_sequence_len(rest[0]) && !self.done {
                break;
            }
            let (ch, size) = bstr::decode_utf8(rest);
            if size == 0 {
                break;
            }
            dst[*n] = ch.unwrap_or(char::REPLACEMENT_CHARACTER);
            *n += 1;
            offset += size;
        }
        self.pending.drain(..offset);
    }
}

impl<R: io::Read> CharSource for IoSource<R> {
    fn read_chars(&mut self, dst: &mut [char]) -> Result<Fetched> {
        if dst.is_empty() {
            return Ok(Fetched::Chars(0));
        }
        let mut n = 0;
        self.drain_pending(dst, &mut n);
        if n > 0 {
            return Ok(Fetched::Chars(n));
        }
        loop {
            if !self.done {
                let mut chunk = [0u8; 4096];
                match self.inner.read(&mut chunk) {
                    Ok(0) => self.done = true,
                    Ok(read) => self.pending.extend_from_slice(&chunk[..read]),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            self.drain_pending(dst, &mut n);
            if n > 0 {
                return Ok(Fetched::Chars(n));
            }
            if self.done && self.pending.is_empty() {
                return Ok(Fetched::Eof);
            }
        }
    }
}

impl<R: io::Read> BlockingSource for IoSource<R> {}

/// A push-based source: chunks are fed in, characters are pulled out.
/// Reports [`Fetched::Pending`] when drained before [`close`](Self::close)
/// has been called.
#[derive(Debug, Default)]
pub struct FeedSource {
    queue: VecDeque<char>,
    closed: bool,
}

impl FeedSource {
    /// An empty, open source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of input.
    pub fn push_str(&mut self, text: &str) {
        self.queue.extend(text.chars());
    }

    /// Marks the end of input; subsequent drains report end-of-input
    /// instead of pending.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl CharSource for FeedSource {
    fn read_chars(&mut self, dst: &mut [char]) -> Result<Fetched> {
        if self.queue.is_empty() {
            return Ok(if self.closed { Fetched::Eof } else { Fetched::Pending });
        }
        let mut n = 0;
        while n < dst.len() {
            match self.queue.pop_front() {
                Some(c) => {
                    dst[n] = c;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(Fetched::Chars(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &mut impl CharSource) -> String {
        let mut out = String::new();
        let mut dst = ['\0'; 8];
        loop {
            match source.read_chars(&mut dst).unwrap() {
                Fetched::Chars(n) => out.extend(&dst[..n]),
                Fetched::Eof => return out,
                Fetched::Pending => panic!("unexpected pending"),
            }
        }
    }

    #[test]
    fn str_source_round_trips() {
        let mut src = StrSource::new("héllo 🎈");
        assert_eq!(collect(&mut src), "héllo 🎈");
    }

    #[test]
    fn io_source_decodes_utf8_split_across_reads() {
        // Reader yielding one byte at a time forces every multi-byte
        // sequence to straddle a read boundary.
        struct OneByte<'a>(&'a [u8]);
        impl io::Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }
        let mut src = IoSource::new(OneByte("é🎈".as_bytes()));
        assert_eq!(collect(&mut src), "é🎈");
    }

    #[test]
    fn io_source_replaces_invalid_bytes() {
        let mut src = IoSource::new(&[0x61, 0xFF, 0x62][..]);
        assert_eq!(collect(&mut src), "a\u{fffd}b");
    }

    #[test]
    fn io_source_replaces_truncated_tail() {
        // 0xE2 opens a three-byte sequence that never completes.
        let mut src = IoSource::new(&[0x61, 0xE2][..]);
        assert_eq!(collect(&mut src), "a\u{fffd}");
    }

    #[test]
    fn feed_source_pends_until_closed() {
        let mut src = FeedSource::new();
        let mut dst = ['\0'; 4];
        assert_eq!(src.read_chars(&mut dst).unwrap(), Fetched::Pending);
        src.push_str("ab");
        assert_eq!(src.read_chars(&mut dst).unwrap(), Fetched::Chars(2));
        assert_eq!(src.read_chars(&mut dst).unwrap(), Fetched::Pending);
        src.close();
        assert_eq!(src.read_chars(&mut dst).unwrap(), Fetched::Eof);
    }
}
