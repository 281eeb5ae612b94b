//! String escaping for the writer.
//!
//! A 128-slot flag table, precomputed per (quote character, escape policy)
//! at writer construction, answers "does this ASCII character need an
//! escape" with one index. Non-ASCII characters never consult the table:
//! the line separators U+0085/U+2028/U+2029 are always escaped, everything
//! else only under `EscapeNonAscii`.

use std::io;

use crate::options::StringEscapeHandling;

/// Builds the escape-flag table for one quote character and policy.
pub(super) fn escape_table(quote: char, handling: StringEscapeHandling) -> [bool; 128] {
    let mut table = [false; 128];
    for slot in table.iter_mut().take(0x20) {
        *slot = true;
    }
    table['\\' as usize] = true;
    table[quote as usize] = true;
    if handling == StringEscapeHandling::EscapeHtml {
        for c in ['<', '>', '&', '\'', '"'] {
            table[c as usize] = true;
        }
    }
    table
}

/// Writes `text` with escapes applied, without the surrounding quotes.
///
/// The active quote character escapes as `\"` or `\'`; other flagged
/// characters take their short escape where JSON has one and `\uXXXX`
/// otherwise. Astral code points escaped under `EscapeNonAscii` are
/// written as a surrogate pair.
pub(super) fn write_escaped<W: io::Write>(
    out: &mut W,
    text: &str,
    quote: char,
    handling: StringEscapeHandling,
    table: &[bool; 128],
) -> io::Result<()> {
    let mut utf8 = [0u8; 4];
    for c in text.chars() {
        let cp = u32::from(c);
        let escape = match cp {
            0..=127 => table[cp as usize],
            0x85 | 0x2028 | 0x2029 => true,
            _ => handling == StringEscapeHandling::EscapeNonAscii,
        };
        if !escape {
            out.write_all(c.encode_utf8(&mut utf8).as_bytes())?;
            continue;
        }
        match c {
            '\u{8}' => out.write_all(b"\\b")?,
            '\t' => out.write_all(b"\\t")?,
            '\n' => out.write_all(b"\\n")?,
            '\u{c}' => out.write_all(b"\\f")?,
            '\r' => out.write_all(b"\\r")?,
            '\\' => out.write_all(b"\\\\")?,
            '"' if quote == '"' => out.write_all(b"\\\"")?,
            '\'' if quote == '\'' => out.write_all(b"\\'")?,
            _ if cp >= 0x10000 => {
                let v = cp - 0x10000;
                write!(out, "\\u{:04x}\\u{:04x}", 0xD800 + (v >> 10), 0xDC00 + (v & 0x3FF))?;
            }
            _ => write!(out, "\\u{cp:04x}")?,
        }
    }
    Ok(())
}
