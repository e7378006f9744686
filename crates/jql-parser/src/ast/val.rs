use crate::net::Ipv4Net;
use crate::pos::Pos;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use ordered_float::OrderedFloat;
use regex::Regex;

/// A typed literal value attached to a comparison.
///
/// Values are parsed into their native form during grammar reduction;
/// construction fails if the native form is invalid (bad regex, bad CIDR,
/// bad date), and the parser reports that failure at the value's position.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Int(IntVal),
    Float(FloatVal),
    Str(StrVal),
    Bool(BoolVal),
    Regexp(RegexpVal),
    Net(NetVal),
    Time(TimeVal),
}

impl Val {
    pub fn pos(&self) -> Pos {
        match self {
            Val::Int(v) => v.pos,
            Val::Float(v) => v.pos,
            Val::Str(v) => v.pos,
            Val::Bool(v) => v.pos,
            Val::Regexp(v) => v.pos,
            Val::Net(v) => v.pos,
            Val::Time(v) => v.pos,
        }
    }

    /// Human-readable type name, used in validator messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Int(_) => "integer",
            Val::Float(_) => "float",
            Val::Str(_) => "string",
            Val::Bool(_) => "boolean",
            Val::Regexp(_) => "regular expression",
            Val::Net(_) => "net block",
            Val::Time(_) => "timestamp",
        }
    }

    /// Canonical textual rendering. Duplicate-argument detection compares
    /// these, so `2kb` and `2048` collide.
    pub fn render(&self) -> String {
        match self {
            Val::Int(v) => v.value.to_string(),
            Val::Float(v) => v.value.to_string(),
            Val::Str(v) => format!("{:?}", v.value),
            Val::Bool(v) => v.value.to_string(),
            Val::Regexp(v) => format!("/{}/", v.pattern),
            Val::Net(v) => v.raw.clone(),
            Val::Time(v) => v.raw.clone(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Val::Int(_) | Val::Float(_))
    }

    /// Numeric value for ordering checks, when there is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Val::Int(v) => Some(v.value as f64),
            Val::Float(v) => Some(v.value.into_inner()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVal {
    pub value: i64,
    pub raw: String,
    pub pos: Pos,
}

impl IntVal {
    pub fn parse(literal: &str, pos: Pos) -> Result<Self, String> {
        let (digits, multiplier) = split_size_suffix(literal);
        let base: i64 = digits.parse().map_err(|e| format!("{e}"))?;
        let value = base
            .checked_mul(multiplier)
            .ok_or_else(|| "integer value out of range".to_string())?;
        Ok(Self {
            value,
            raw: literal.to_string(),
            pos,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatVal {
    pub value: OrderedFloat<f64>,
    pub raw: String,
    pub pos: Pos,
}

impl FloatVal {
    pub fn parse(literal: &str, pos: Pos) -> Result<Self, String> {
        let (digits, multiplier) = split_size_suffix(literal);
        let base: f64 = digits.parse().map_err(|e| format!("{e}"))?;
        Ok(Self {
            value: OrderedFloat(base * multiplier as f64),
            raw: literal.to_string(),
            pos,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrVal {
    pub value: String,
    pub pos: Pos,
}

impl StrVal {
    pub fn new(value: impl Into<String>, pos: Pos) -> Self {
        Self {
            value: value.into(),
            pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVal {
    pub value: bool,
    pub pos: Pos,
}

impl BoolVal {
    pub fn parse(literal: &str, pos: Pos) -> Self {
        Self {
            value: literal.eq_ignore_ascii_case("true"),
            pos,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegexpVal {
    regex: Regex,
    pub pattern: String,
    pub pos: Pos,
}

impl RegexpVal {
    pub fn parse(pattern: &str, pos: Pos) -> Result<Self, String> {
        let regex = Regex::new(pattern).map_err(|e| regex_reason(&e))?;
        Ok(Self {
            regex,
            pattern: pattern.to_string(),
            pos,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for RegexpVal {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.pos == other.pos
    }
}

impl Eq for RegexpVal {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetVal {
    pub net: Ipv4Net,
    pub raw: String,
    pub pos: Pos,
}

impl NetVal {
    pub fn parse(literal: &str, pos: Pos) -> Result<Self, String> {
        let net: Ipv4Net = literal.parse()?;
        Ok(Self {
            net,
            raw: literal.to_string(),
            pos,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeVal {
    /// Unix nanoseconds.
    pub nanos: i64,
    /// Whether the literal was a short `YYYY-MM-DD` date.
    pub day_only: bool,
    pub raw: String,
    pub pos: Pos,
}

impl TimeVal {
    pub fn parse(literal: &str, pos: Pos) -> Result<Self, String> {
        let (nanos, day_only) = if literal.len() == 10 {
            let date =
                NaiveDate::parse_from_str(literal, "%Y-%m-%d").map_err(|e| format!("{e}"))?;
            let nanos = date
                .and_time(NaiveTime::MIN)
                .and_utc()
                .timestamp_nanos_opt()
                .ok_or_else(|| "timestamp out of range".to_string())?;
            (nanos, true)
        } else {
            let dt = DateTime::parse_from_rfc3339(&normalize_rfc3339(literal))
                .map_err(|e| format!("{e}"))?;
            let nanos = dt
                .timestamp_nanos_opt()
                .ok_or_else(|| "timestamp out of range".to_string())?;
            (nanos, false)
        };
        Ok(Self {
            nanos,
            day_only,
            raw: literal.to_string(),
            pos,
        })
    }
}

/// The lexer admits `t`/space separators and a lowercase zone designator;
/// chrono's RFC 3339 parser wants the uppercase forms.
fn normalize_rfc3339(literal: &str) -> String {
    let mut out: Vec<char> = literal.chars().collect();
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

/// `kb`/`mb`/`gb` size suffixes on numeric literals, case-insensitive.
fn split_size_suffix(literal: &str) -> (&str, i64) {
    if literal.len() < 2 || !literal.is_char_boundary(literal.len() - 2) {
        return (literal, 1);
    }
    let (head, tail) = literal.split_at(literal.len() - 2);
    match tail.to_ascii_lowercase().as_str() {
        "kb" => (head, 1 << 10),
        "mb" => (head, 1 << 20),
        "gb" => (head, 1 << 30),
        _ => (literal, 1),
    }
}

/// The regex crate renders errors over several lines with the pattern and a
/// caret; reduce that to the final reason for neutral diagnostics.
fn regex_reason(err: &regex::Error) -> String {
    let rendered = err.to_string();
    let last = rendered.lines().last().unwrap_or(&rendered);
    last.trim().trim_start_matches("error: ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_suffixes() {
        assert_eq!(IntVal::parse("42", Pos::NONE).unwrap().value, 42);
        assert_eq!(IntVal::parse("2kb", Pos::NONE).unwrap().value, 2048);
        assert_eq!(IntVal::parse("2KB", Pos::NONE).unwrap().value, 2048);
        assert_eq!(IntVal::parse("1mb", Pos::NONE).unwrap().value, 1 << 20);
        assert_eq!(IntVal::parse("3gb", Pos::NONE).unwrap().value, 3 << 30);
        assert_eq!(IntVal::parse("-2kb", Pos::NONE).unwrap().value, -2048);
        assert!(IntVal::parse("abc", Pos::NONE).is_err());
    }

    #[test]
    fn float_suffixes() {
        assert_eq!(
            FloatVal::parse("1.5kb", Pos::NONE).unwrap().value.into_inner(),
            1536.0
        );
        assert_eq!(
            FloatVal::parse("-1.4", Pos::NONE).unwrap().value.into_inner(),
            -1.4
        );
    }

    #[test]
    fn regex_errors_are_stripped() {
        let err = RegexpVal::parse("*", Pos::NONE).unwrap_err();
        assert!(!err.contains('\n'), "multi-line reason: {err}");
        assert!(!err.starts_with("error:"), "unstripped reason: {err}");
    }

    #[test]
    fn timestamps() {
        let day = TimeVal::parse("1979-10-03", Pos::NONE).unwrap();
        assert!(day.day_only);

        let precise = TimeVal::parse("2021-06-08T20:56:33+00:00", Pos::NONE).unwrap();
        assert!(!precise.day_only);

        let lower = TimeVal::parse("1985-04-12t23:20:50.52z", Pos::NONE).unwrap();
        assert!(!lower.day_only);
        assert!(lower.nanos > 0);

        assert!(TimeVal::parse("1979-13-03", Pos::NONE).is_err());
        assert!(TimeVal::parse("2021-06-08T20:74:33+00:00", Pos::NONE).is_err());
    }

    #[test]
    fn day_and_midnight_agree() {
        let day = TimeVal::parse("1979-10-03", Pos::NONE).unwrap();
        let midnight = TimeVal::parse("1979-10-03T00:00:00Z", Pos::NONE).unwrap();
        assert_eq!(day.nanos, midnight.nanos);
    }

    #[test]
    fn renderings() {
        let val = Val::Int(IntVal::parse("2kb", Pos::NONE).unwrap());
        assert_eq!(val.render(), "2048");
        let val = Val::Str(StrVal::new("hi", Pos::NONE));
        assert_eq!(val.render(), r#""hi""#);
        let val = Val::Regexp(RegexpVal::parse("^And", Pos::NONE).unwrap());
        assert_eq!(val.render(), "/^And/");
    }
}
