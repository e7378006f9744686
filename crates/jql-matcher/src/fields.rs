use crate::datetime;

use jql_parser::ast::FieldPath;
use jql_parser::ast::PathSegment;

use serde_json::Value;

/// The values a field path resolved to within one document.
pub(crate) struct Candidates<'a> {
    pub values: Vec<&'a Value>,
}

impl<'a> Candidates<'a> {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The candidates usable by per-value comparators: scalars pass
    /// through, a final array contributes its immediate scalar elements,
    /// objects and nested containers are skipped.
    pub fn scalar_values(&self) -> Vec<&'a Value> {
        let mut out = Vec::with_capacity(self.values.len());
        for &value in &self.values {
            match value {
                Value::Object(_) => continue,
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::Object(_) | Value::Array(_) => continue,
                            _ => out.push(item),
                        }
                    }
                }
                _ => out.push(value),
            }
        }
        out
    }

    /// True when every resolved value is an explicit JSON null.
    pub fn all_null(&self) -> bool {
        self.values.iter().all(|v| v.is_null())
    }
}

/// Resolve a dotted path against a parsed JSON value.
///
/// Objects are looked up by key, index segments select into arrays, and
/// arrays met mid-path are traversed transparently: `a.b` against
/// `{"a":[{"b":1},{"b":2}]}` yields both values. A scalar met before the
/// path is exhausted dead-ends.
pub(crate) fn resolve<'a>(path: &FieldPath, root: &'a Value) -> Candidates<'a> {
    let mut values = Vec::new();
    collect(&path.segments, root, &mut values);
    Candidates { values }
}

fn collect<'a>(segments: &[PathSegment], value: &'a Value, out: &mut Vec<&'a Value>) {
    let Some(segment) = segments.first() else {
        return;
    };
    match value {
        Value::Object(map) => {
            if let PathSegment::Key(key) = segment {
                if let Some(child) = map.get(key) {
                    if segments.len() == 1 {
                        out.push(child);
                    } else {
                        collect(&segments[1..], child, out);
                    }
                }
            }
        }
        Value::Array(items) => match segment {
            PathSegment::Index(idx) => {
                if let Some(child) = items.get(*idx) {
                    if segments.len() == 1 {
                        out.push(child);
                    } else {
                        collect(&segments[1..], child, out);
                    }
                }
            }
            PathSegment::Key(_) => {
                // same segment, one level down, for every container element
                for child in items {
                    if matches!(child, Value::Object(_) | Value::Array(_)) {
                        collect(segments, child, out);
                    }
                }
            }
        },
        _ => {}
    }
}

/// Candidate-side string coercion: strings pass through, numbers render
/// with trailing zeros trimmed. Everything else is not stringy.
pub(crate) fn string_val(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format_number(n)),
        _ => None,
    }
}

/// Candidate-side numeric coercion: JSON numbers directly, numeric strings
/// by parsing. Unparseable strings are skipped, not errors.
pub(crate) fn number_val(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn bool_val(value: &Value) -> Option<bool> {
    value.as_bool()
}

/// Truthiness for `~` on a boolean operand.
///
/// true:  boolean true, number != 0, string outside {"", "0", "false"}
/// false: boolean false, number 0, null, string in the set above
/// ("false" case-insensitive)
pub(crate) fn truthy_val(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64() != Some(0.0)),
        Value::Null => Some(false),
        Value::String(s) => {
            Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
        }
        _ => None,
    }
}

/// Candidate-side datetime coercion to Unix nanoseconds, via the loose
/// parser for strings and epoch heuristics for numbers.
pub(crate) fn datetime_val(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => datetime::loose_nanos(s),
        Value::Number(n) => datetime::nanos_from_number(n),
        _ => None,
    }
}

pub(crate) fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f == f.trunc() && f.abs() < 1e15 => {
            format!("{:.0}", f)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
