//! The character buffer backing the reader's scanner.
//!
//! An owned char arena with three cursors: the scan position, the
//! high-water mark of filled characters, and an end-of-input flag. The
//! filled region is always terminated with a `'\0'` sentinel so scanning
//! loops can treat "sentinel encountered at the high-water mark" as "need
//! more data" without a separate bounds check. Refilling is an exclusive
//! operation on the owning buffer; no view of the data survives a refill.

use crate::error::Result;
use crate::source::{CharSource, Fetched};

const DEFAULT_CAPACITY: usize = 1024;
/// Above this capacity, compaction is always preferred over growing.
const LARGE_BUFFER_LENGTH: usize = 16 * 1024;

#[derive(Debug)]
pub(crate) struct CharBuffer {
    chars: Vec<char>,
    /// High-water mark: number of filled characters. Invariant:
    /// `pos <= used <= chars.len() - 1`; the last slot is reserved so a
    /// sentinel can always be written.
    used: usize,
    /// Scan cursor.
    pub(crate) pos: usize,
    end_of_input: bool,
}

impl CharBuffer {
    pub(crate) fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            chars: vec!['\0'; capacity.max(16)],
            used: 0,
            pos: 0,
            end_of_input: false,
        }
    }

    /// The character at the scan position; the `'\0'` sentinel when the
    /// filled region is exhausted.
    #[inline]
    pub(crate) fn current(&self) -> char {
        self.chars[self.pos]
    }

    #[inline]
    pub(crate) fn char_at(&self, index: usize) -> char {
        self.chars[index]
    }

    #[inline]
    pub(crate) fn slice(&self, start: usize, end: usize) -> &[char] {
        &self.chars[start..end]
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    /// Whether the scan position has reached the high-water mark.
    #[inline]
    pub(crate) fn exhausted(&self) -> bool {
        self.pos >= self.used
    }

    #[inline]
    pub(crate) fn end_of_input(&self) -> bool {
        self.end_of_input
    }

    #[inline]
    pub(crate) fn high_water(&self) -> usize {
        self.used
    }

    /// Makes room for at least `required` more characters while keeping
    /// everything at and after `retain`.
    ///
    /// Once free space drops under 10% of capacity, or the buffer has
    /// grown large, unread characters are compacted to offset 0 instead of
    /// growing; otherwise capacity doubles (overflow-checked) to amortize.
    /// Returns the number of characters discarded from the front, which
    /// the caller must subtract from any indices it holds.
    pub(crate) fn make_room(&mut self, retain: usize, required: usize) -> usize {
        debug_assert!(retain <= self.pos);
        let capacity = self.chars.len();
        let free = capacity - self.used - 1;
        if free >= required {
            return 0;
        }

        let keep = self.used - retain;
        if retain > 0
            && keep + required + 1 <= capacity
            && (free < capacity / 10 || capacity >= LARGE_BUFFER_LENGTH)
        {
            self.chars.copy_within(retain..self.used, 0);
            self.pos -= retain;
            self.used -= retain;
            self.chars[self.used] = '\0';
            return retain;
        }

        // Grow, compacting away the released prefix at the same time.
        let needed = keep + required + 1;
        let new_capacity = capacity.checked_mul(2).map_or(needed, |d| d.max(needed));
        let mut grown = vec!['\0'; new_capacity];
        grown[..keep].copy_from_slice(&self.chars[retain..self.used]);
        self.chars = grown;
        self.pos -= retain;
        self.used = keep;
        retain
    }

    /// Reads more characters from `source`, appending after the high-water
    /// mark. A short read at end-of-stream latches the end-of-input flag;
    /// once latched, no further reads are attempted.
    pub(crate) fn fill(&mut self, source: &mut impl CharSource) -> Result<Fetched> {
        if self.end_of_input {
            return Ok(Fetched::Eof);
        }
        debug_assert!(self.used < self.chars.len() - 1, "make_room before fill");
        let end = self.chars.len() - 1;
        match source.read_chars(&mut self.chars[self.used..end])? {
            Fetched::Chars(n) => {
                self.used += n;
                self.chars[self.used] = '\0';
                Ok(Fetched::Chars(n))
            }
            Fetched::Eof => {
                self.end_of_input = true;
                self.chars[self.used] = '\0';
                Ok(Fetched::Eof)
            }
            Fetched::Pending => Ok(Fetched::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;

    fn filled(text: &str, capacity: usize) -> CharBuffer {
        let mut buf = CharBuffer::with_capacity(capacity);
        let mut src = StrSource::new(text);
        loop {
            match buf.fill(&mut src).unwrap() {
                Fetched::Chars(_) => {}
                Fetched::Eof => break,
                Fetched::Pending => unreachable!("str sources never suspend"),
            }
            if buf.high_water() == text.chars().count() {
                break;
            }
        }
        buf
    }

    #[test]
    fn sentinel_terminates_the_filled_region() {
        let buf = filled("ab", 16);
        assert_eq!(buf.char_at(0), 'a');
        assert_eq!(buf.char_at(1), 'b');
        assert_eq!(buf.char_at(2), '\0');
        assert_eq!(buf.high_water(), 2);
    }

    #[test]
    fn short_read_latches_end_of_input() {
        let mut buf = CharBuffer::with_capacity(16);
        let mut src = StrSource::new("x");
        assert!(matches!(buf.fill(&mut src).unwrap(), Fetched::Chars(1)));
        assert!(matches!(buf.fill(&mut src).unwrap(), Fetched::Eof));
        assert!(buf.end_of_input());
        // Latched: further fills report Eof without consulting the source.
        assert!(matches!(buf.fill(&mut src).unwrap(), Fetched::Eof));
    }

    #[test]
    fn make_room_grows_by_doubling() {
        let mut buf = filled("abcdefghijklmn", 16);
        assert_eq!(buf.make_room(0, 8), 0);
        assert!(buf.chars.len() >= 23);
        // Contents survive the growth.
        assert_eq!(buf.char_at(0), 'a');
        assert_eq!(buf.char_at(13), 'n');
        assert_eq!(buf.char_at(14), '\0');
    }

    #[test]
    fn make_room_compacts_a_large_consumed_prefix() {
        let text: String = std::iter::repeat('z').take(LARGE_BUFFER_LENGTH - 1).collect();
        let mut buf = filled(&text, LARGE_BUFFER_LENGTH);
        buf.pos = LARGE_BUFFER_LENGTH - 16;
        let shift = buf.make_room(buf.pos, 64);
        assert_eq!(shift, LARGE_BUFFER_LENGTH - 16);
        assert_eq!(buf.pos, 0);
        assert_eq!(buf.chars.len(), LARGE_BUFFER_LENGTH);
        assert_eq!(buf.char_at(buf.high_water()), '\0');
    }

    #[test]
    fn retained_region_survives_compaction() {
        let text: String = ('a'..='z').cycle().take(LARGE_BUFFER_LENGTH - 1).collect();
        let mut buf = filled(&text, LARGE_BUFFER_LENGTH);
        let retain = LARGE_BUFFER_LENGTH - 32;
        let expected: Vec<char> = buf.slice(retain, buf.high_water()).to_vec();
        buf.pos = retain + 8;
        let shift = buf.make_room(retain, 64);
        assert_eq!(shift, retain);
        assert_eq!(buf.pos, 8);
        assert_eq!(buf.slice(0, expected.len()), expected.as_slice());
    }
}
