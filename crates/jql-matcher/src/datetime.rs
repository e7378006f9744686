use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

/// Parse a candidate string as a datetime, loosely, to Unix nanoseconds.
///
/// Accepted forms: all-digit epoch values (seconds, milliseconds,
/// microseconds or nanoseconds by digit count), RFC 3339 with `T`, `t` or
/// space separators, zone-less datetimes (taken as UTC), short dates, and
/// RFC 2822. Anything else is not a datetime and the candidate is skipped.
pub(crate) fn loose_nanos(input: &str) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return epoch_by_digits(s);
    }
    if s.len() == 10 {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return date.and_time(NaiveTime::MIN).and_utc().timestamp_nanos_opt();
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalize_rfc3339(s)) {
        return dt.timestamp_nanos_opt();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return naive.and_utc().timestamp_nanos_opt();
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return dt.timestamp_nanos_opt();
    }
    None
}

/// Epoch heuristics for JSON numbers: magnitude decides the unit.
pub(crate) fn nanos_from_number(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return scale_epoch(i);
    }
    let f = n.as_f64()?;
    if !f.is_finite() {
        return None;
    }
    // fractional epochs are seconds
    Some((f * 1e9) as i64)
}

fn epoch_by_digits(s: &str) -> Option<i64> {
    let n: i64 = s.parse().ok()?;
    match s.len() {
        0..=11 => n.checked_mul(1_000_000_000),
        12..=14 => n.checked_mul(1_000_000),
        15..=17 => n.checked_mul(1_000),
        _ => Some(n),
    }
}

fn scale_epoch(n: i64) -> Option<i64> {
    let magnitude = n.unsigned_abs();
    if magnitude < 100_000_000_000 {
        n.checked_mul(1_000_000_000)
    } else if magnitude < 100_000_000_000_000 {
        n.checked_mul(1_000_000)
    } else if magnitude < 100_000_000_000_000_000 {
        n.checked_mul(1_000)
    } else {
        Some(n)
    }
}

fn normalize_rfc3339(s: &str) -> String {
    let mut out: Vec<char> = s.chars().collect();
    if let Some(c) = out.get_mut(10) {
        if *c == 't' || *c == ' ' {
            *c = 'T';
        }
    }
    if let Some(c) = out.last_mut() {
        if *c == 'z' {
            *c = 'Z';
        }
    }
    out.into_iter().collect()
}
