use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::job::{IntValue, SessionDate};

/// Parses an integer leaf the lenient way: leading whitespace and an optional
/// sign, then as many decimal digits as there are. Anything that yields no
/// digits is kept as its raw token and reported.
pub fn parse_int(value: Option<&Value>, field: &str) -> IntValue {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => parse_int_prefix(s),
        _ => None,
    };

    match parsed {
        Some(n) => IntValue::Int(n),
        None => {
            let raw = raw_token(value);
            log::warn!("failed parsing {} {:?} as integer", field, raw);
            IntValue::Raw(raw)
        }
    }
}

/// A null or absent list is empty. Each element is parsed on its own.
pub fn parse_int_list(value: Option<&Value>, field: &str) -> Vec<IntValue> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(|v| parse_int(Some(v), field)).collect(),
        Some(other) => {
            log::warn!("expected a list for {}, got {}", field, other);
            Vec::new()
        }
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let n: i64 = rest[..end].parse().ok()?;
    Some(if negative { -n } else { n })
}

fn raw_token(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Reads a string-ish leaf. Numbers and booleans keep their JSON text, absent
/// or null leaves become empty.
pub fn label_field(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Accepts RFC 3339, a few ISO-like variants, and millisecond epoch numbers.
pub fn parse_time(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_time_str(s.trim()),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        _ => None,
    }
}

fn parse_time_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Zero-valued dates (year 1 or the Unix epoch) and unreadable ones are the
/// missing sentinel.
pub fn parse_date(value: Option<&Value>) -> SessionDate {
    match parse_time(value) {
        Some(d) if is_zero_date(&d) => SessionDate::Missing,
        Some(d) => SessionDate::Known(d),
        None => {
            if !matches!(value, None | Some(Value::Null)) {
                log::warn!("failed parsing date {:?}", raw_token(value));
            }
            SessionDate::Missing
        }
    }
}

fn is_zero_date(d: &DateTime<Utc>) -> bool {
    use chrono::Datelike;
    d.year() <= 1 || d.timestamp_millis() == 0
}
