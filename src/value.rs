//! Metadata Value Types
//!
//! A directory property is typed: extraction yields strings, integers,
//! booleans, date-times, durations, or pixel dimensions. Comparison against a
//! query literal is type-aware: the stored value's kind decides how the
//! literal text is parsed.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::cmp::Ordering;

/// A single extracted property value.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Value {
    /// Free-form text (titles, class names, protocol info, ...)
    String(String),
    /// Counted quantities (sizes, bitrates, track numbers, child counts)
    Integer(i64),
    /// Flags (restricted, searchable)
    Boolean(bool),
    /// Calendar timestamps (dc:date and friends)
    DateTime(NaiveDateTime),
    /// Playback durations (res@duration)
    Duration(TimeDelta),
    /// Pixel dimensions (res@resolution), width by height
    Dimension(u32, u32),
}

impl Value {
    /// Canonical string form, used by the substring and prefix operators and
    /// by sort criteria over mixed-kind properties.
    pub fn string_value(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Value::Duration(d) => format_duration(*d),
            Value::Dimension(w, h) => format!("{}x{}", w, h),
        }
    }

    /// Test exact equivalence against a literal, parsing the literal according
    /// to this value's kind. Returns `None` when the literal cannot be parsed
    /// as this kind (the caller reports which operator was involved).
    pub fn equivalent(&self, literal: &str, ignore_case: bool) -> Option<bool> {
        match self {
            Value::String(s) => Some(if ignore_case {
                s.eq_ignore_ascii_case(literal)
            } else {
                s == literal
            }),
            Value::Integer(n) => literal.trim().parse::<i64>().ok().map(|l| *n == l),
            Value::Boolean(b) => parse_boolean(literal).map(|l| *b == l),
            Value::DateTime(dt) => parse_date_time(literal).map(|l| *dt == l),
            Value::Duration(d) => parse_duration(literal).map(|l| *d == l),
            Value::Dimension(w, h) => parse_dimension(literal).map(|(lw, lh)| *w == lw && *h == lh),
        }
    }

    /// Total order over values for sort criteria. Values of the same kind
    /// compare natively; mixed kinds fall back to their string forms.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Duration(a), Value::Duration(b)) => a.cmp(b),
            (Value::Dimension(aw, ah), Value::Dimension(bw, bh)) => {
                (aw, ah).cmp(&(bw, bh))
            }
            _ => self.string_value().cmp(&other.string_value()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Parse a boolean literal. The wire grammar uses `true`/`false`; `1`/`0`
/// appear in the wild and are accepted.
fn parse_boolean(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse an ISO 8601 timestamp or bare date (bare dates mean midnight).
fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse an `H+:MM:SS[.F]` duration string.
fn parse_duration(s: &str) -> Option<TimeDelta> {
    let mut parts = s.trim().splitn(3, ':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds = parts.next()?;
    if minutes >= 60 {
        return None;
    }
    let (whole, millis) = match seconds.split_once('.') {
        Some((w, frac)) => {
            // Normalize the fraction to milliseconds
            let padded = format!("{:0<3.3}", frac);
            (w.parse::<i64>().ok()?, padded.parse::<i64>().ok()?)
        }
        None => (seconds.parse::<i64>().ok()?, 0),
    };
    if whole >= 60 {
        return None;
    }
    Some(TimeDelta::milliseconds(
        ((hours * 60 + minutes) * 60 + whole) * 1000 + millis,
    ))
}

/// Parse a `WxH` dimension string.
fn parse_dimension(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn format_duration(d: TimeDelta) -> String {
    let total_millis = d.num_milliseconds();
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let (h, m, s) = (total_secs / 3600, total_secs / 60 % 60, total_secs % 60);
    if millis == 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}:{:02}.{:03}", h, m, s, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_equivalence() {
        let v = Value::from("The Beatles");
        assert_eq!(v.equivalent("The Beatles", false), Some(true));
        assert_eq!(v.equivalent("the beatles", false), Some(false));
        assert_eq!(v.equivalent("the beatles", true), Some(true));
    }

    #[test]
    fn test_integer_equivalence() {
        let v = Value::Integer(44100);
        assert_eq!(v.equivalent("44100", false), Some(true));
        assert_eq!(v.equivalent("48000", false), Some(false));
        assert_eq!(v.equivalent("fast", false), None);
    }

    #[test]
    fn test_boolean_equivalence() {
        let v = Value::Boolean(true);
        assert_eq!(v.equivalent("true", false), Some(true));
        assert_eq!(v.equivalent("1", false), Some(true));
        assert_eq!(v.equivalent("maybe", false), None);
    }

    #[test]
    fn test_date_time_equivalence() {
        let v = Value::DateTime(parse_date_time("2005-03-12T10:00:00").unwrap());
        assert_eq!(v.equivalent("2005-03-12T10:00:00", false), Some(true));
        // A bare date is midnight
        assert_eq!(v.equivalent("2005-03-12", false), Some(false));
        assert_eq!(v.equivalent("last tuesday", false), None);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(
            parse_duration("1:02:30"),
            Some(TimeDelta::seconds(3750))
        );
        assert_eq!(
            parse_duration("0:00:01.5"),
            Some(TimeDelta::milliseconds(1500))
        );
        assert_eq!(parse_duration("0:99:00"), None);
        assert_eq!(parse_duration("90"), None);
    }

    #[test]
    fn test_dimension_round_trip() {
        let v = Value::Dimension(1920, 1080);
        assert_eq!(v.string_value(), "1920x1080");
        assert_eq!(v.equivalent("1920x1080", false), Some(true));
        assert_eq!(v.equivalent("1280x720", false), Some(false));
    }

    #[test]
    fn test_duration_format() {
        assert_eq!(format_duration(TimeDelta::seconds(3750)), "1:02:30");
        assert_eq!(
            format_duration(TimeDelta::milliseconds(1500)),
            "0:00:01.500"
        );
    }

    #[test]
    fn test_mixed_kind_compare_falls_back_to_strings() {
        let a = Value::Integer(2);
        let b = Value::from("10");
        // Lexical fallback: "10" < "2"
        assert_eq!(a.compare(&b), Ordering::Greater);
    }
}
