//! ISO 8601 date literals.
//!
//! Dates travel as strings on the wire; [`JsonDate`] is the decoded form
//! used by the `Date` token. Only the ISO 8601 shapes produced by JSON
//! emitters are accepted: `YYYY-MM-DD`, optionally followed by
//! `THH:MM:SS`, a fractional second, and a `Z` or `±HH:MM` offset.

use std::fmt;

/// A date value: milliseconds since the Unix epoch, plus the UTC offset
/// the literal carried (when it carried one) so formatting round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonDate {
    /// Milliseconds since 1970-01-01T00:00:00Z.
    pub epoch_millis: i64,
    /// Offset from UTC in minutes; `None` for literals without a zone.
    pub offset_minutes: Option<i16>,
}

/// Days from the epoch for a civil date (proleptic Gregorian).
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = year - i64::from(month <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = i64::from(if month > 2 { month - 3 } else { month + 9 });
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (y + i64::from(month <= 2), month, day)
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl JsonDate {
    /// Parses an ISO 8601 date or date-time literal. Returns `None` for
    /// anything else; the caller decides whether that is an error.
    #[must_use]
    pub fn parse(text: &str) -> Option<JsonDate> {
        if text.len() < 10 || !text.is_char_boundary(10) {
            return None;
        }
        let (date, rest) = text.split_at(10);
        let bytes = date.as_bytes();
        if bytes[4] != b'-' || bytes[7] != b'-' {
            return None;
        }
        let year = i64::from(digits(&date[..4])?);
        let month = digits(&date[5..7])?;
        let day = digits(&date[8..10])?;
        if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
            return None;
        }

        let mut millis = days_from_civil(year, month, day) * 86_400_000;
        let mut offset_minutes = None;

        let mut rest = rest;
        if let Some(time) = rest.strip_prefix('T') {
            if time.len() < 8
                || !time.is_char_boundary(8)
                || time.as_bytes()[2] != b':'
                || time.as_bytes()[5] != b':'
            {
                return None;
            }
            let hour = digits(&time[..2])?;
            let minute = digits(&time[3..5])?;
            let second = digits(&time[6..8])?;
            if hour > 23 || minute > 59 || second > 59 {
                return None;
            }
            millis += i64::from(hour * 3_600_000 + minute * 60_000 + second * 1000);
            rest = &time[8..];

            if let Some(frac) = rest.strip_prefix('.') {
                let end = frac
                    .bytes()
                    .position(|b| !b.is_ascii_digit())
                    .unwrap_or(frac.len());
                if end == 0 {
                    return None;
                }
                // Fractional seconds beyond millisecond precision are
                // truncated.
                let mut ms = 0u32;
                for (i, b) in frac[..end].bytes().enumerate().take(3) {
                    ms += u32::from(b - b'0') * 10u32.pow(2 - i as u32);
                }
                millis += i64::from(ms);
                rest = &frac[end..];
            }
        }

        match rest {
            "" => {}
            "Z" => offset_minutes = Some(0),
            _ => {
                let sign = match rest.as_bytes()[0] {
                    b'+' => 1i32,
                    b'-' => -1i32,
                    _ => return None,
                };
                let zone = &rest[1..];
                if zone.len() != 5 || zone.as_bytes()[2] != b':' {
                    return None;
                }
                let hours = digits(&zone[..2])?;
                let minutes = digits(&zone[3..5])?;
                if hours > 14 || minutes > 59 {
                    return None;
                }
                let offset = sign * (hours * 60 + minutes) as i32;
                offset_minutes = Some(offset as i16);
                // The literal is local time; shift to UTC.
                millis -= i64::from(offset) * 60_000;
            }
        }

        Some(JsonDate { epoch_millis: millis, offset_minutes })
    }
}

impl fmt::Display for JsonDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.epoch_millis + i64::from(self.offset_minutes.unwrap_or(0)) * 60_000;
        let days = local.div_euclid(86_400_000);
        let of_day = local.rem_euclid(86_400_000);
        let (year, month, day) = civil_from_days(days);
        let (hour, minute) = (of_day / 3_600_000, of_day % 3_600_000 / 60_000);
        let (second, millis) = (of_day % 60_000 / 1000, of_day % 1000);
        write!(f, "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}")?;
        if millis != 0 {
            write!(f, ".{millis:03}")?;
        }
        match self.offset_minutes {
            None => Ok(()),
            Some(0) => write!(f, "Z"),
            Some(offset) => {
                let sign = if offset < 0 { '-' } else { '+' };
                let magnitude = offset.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", magnitude / 60, magnitude % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1970-01-01T00:00:00Z", 0)]
    #[case("2000-02-29T12:00:00Z", 951_825_600_000)]
    #[case("2026-08-29T10:15:30.250Z", 1_787_998_530_250)]
    fn parses_utc_instants(#[case] text: &str, #[case] millis: i64) {
        let date = JsonDate::parse(text).unwrap();
        assert_eq!(date.epoch_millis, millis);
        assert_eq!(date.offset_minutes, Some(0));
    }

    #[test]
    fn offset_shifts_to_utc_and_round_trips() {
        let date = JsonDate::parse("2020-06-01T12:00:00+02:00").unwrap();
        assert_eq!(date.epoch_millis, 1_591_005_600_000);
        assert_eq!(date.offset_minutes, Some(120));
        assert_eq!(date.to_string(), "2020-06-01T12:00:00+02:00");
    }

    #[test]
    fn date_only_and_unzoned_forms() {
        let date = JsonDate::parse("1999-12-31").unwrap();
        assert_eq!(date.offset_minutes, None);
        assert_eq!(date.to_string(), "1999-12-31T00:00:00");
        assert!(JsonDate::parse("1999-13-01").is_none());
        assert!(JsonDate::parse("1999-02-29").is_none());
        assert!(JsonDate::parse("not a date").is_none());
    }

    #[test]
    fn multibyte_tails_are_rejected_not_sliced() {
        assert!(JsonDate::parse("1970-01-01T00:00:0\u{939}").is_none());
        assert!(JsonDate::parse("1970-01-01T\u{939}0:00:00").is_none());
        assert!(JsonDate::parse("1970-01-\u{939}1").is_none());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for text in ["1970-01-01T00:00:00Z", "2026-08-29T10:15:30.250Z", "2020-06-01T12:00:00-05:30"] {
            let date = JsonDate::parse(text).unwrap();
            assert_eq!(JsonDate::parse(&date.to_string()), Some(date));
        }
    }
}
