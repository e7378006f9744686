use crate::fields::bool_val;
use crate::fields::datetime_val;
use crate::fields::number_val;
use crate::fields::string_val;
use crate::fields::truthy_val;
use crate::fields::Candidates;
use crate::strings::FuzzyPattern;

use jql_parser::ast::Op;
use jql_parser::Ipv4Net;

use once_cell::sync::Lazy;
use regex::Regex;

use std::net::Ipv4Addr;

/// Dotted-quad and CIDR substrings embedded in candidate strings.
static EMBEDDED_NETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}(?:/\d{1,2})?").expect("net scanner must compile")
});

/// A type-specialized comparator attached to a leaf matcher node.
///
/// Each comparator ORs over the candidate list with short-circuiting;
/// candidates of the wrong shape are skipped silently.
pub(crate) enum FieldExpr {
    Regexp { re: Regex },
    Float { values: [f64; 2], op: Op },
    Datetime { values: [i64; 2], op: Op },
    Bool { value: bool, op: Op },
    Net { net: Ipv4Net },
    Fuzzy { pat: FuzzyPattern },
    Exists,
    Null,
}

impl FieldExpr {
    pub fn matches(&self, field: &Candidates) -> bool {
        match self {
            FieldExpr::Regexp { re } => field
                .scalar_values()
                .into_iter()
                .filter_map(|v| string_val(v))
                .any(|s| re.is_match(&s)),
            FieldExpr::Float { values, op } => field
                .scalar_values()
                .into_iter()
                .filter_map(|v| number_val(v))
                .any(|fv| ordered_compare(*op, fv, values[0], values[1])),
            FieldExpr::Datetime { values, op } => field
                .scalar_values()
                .into_iter()
                .filter_map(|v| datetime_val(v))
                .any(|dv| ordered_compare(*op, dv, values[0], values[1])),
            FieldExpr::Bool { value, op } => field.scalar_values().into_iter().any(|v| {
                let coerced = match op {
                    Op::Eq => bool_val(v),
                    Op::Sim => truthy_val(v),
                    // backstop
                    _ => panic!("invalid op for boolean comparison: {op}"),
                };
                coerced == Some(*value)
            }),
            FieldExpr::Net { net } => field
                .scalar_values()
                .into_iter()
                .filter_map(|v| string_val(v))
                .any(|s| scan_for_nets(net, &s)),
            FieldExpr::Fuzzy { pat } => field
                .scalar_values()
                .into_iter()
                .filter_map(|v| string_val(v))
                .any(|s| pat.is_match(&s)),
            FieldExpr::Exists => !field.is_empty(),
            FieldExpr::Null => !field.is_empty() && field.all_null(),
        }
    }
}

/// `==`, the orderings, and inclusive BETWEEN over any ordered scalar.
fn ordered_compare<T: PartialOrd + Copy>(op: Op, candidate: T, low: T, high: T) -> bool {
    match op {
        Op::Eq => candidate == low,
        Op::Lt => candidate < low,
        Op::Lte => candidate <= low,
        Op::Gt => candidate > low,
        Op::Gte => candidate >= low,
        Op::Between => candidate >= low && candidate <= high,
        // backstop
        _ => panic!("invalid op for ordered comparison: {op}"),
    }
}

/// Scan a candidate string for embedded addresses: a plain address passes
/// on containment, a CIDR passes on overlap. Unparseable hits are skipped.
fn scan_for_nets(net: &Ipv4Net, haystack: &str) -> bool {
    for found in EMBEDDED_NETS.find_iter(haystack) {
        let text = found.as_str();
        if text.contains('/') {
            if let Ok(block) = text.parse::<Ipv4Net>() {
                if net.overlaps(&block) {
                    return true;
                }
            }
        } else if let Ok(addr) = text.parse::<Ipv4Addr>() {
            if net.contains(addr) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_json::Value;

    fn candidates(values: &[&'static str]) -> Vec<Value> {
        values.iter().map(|s| json!(s)).collect()
    }

    fn field(values: &[Value]) -> Candidates<'_> {
        Candidates {
            values: values.iter().collect(),
        }
    }

    #[test]
    fn net_scanning() {
        let net: Ipv4Net = "192.168.1.0/24".parse().unwrap();
        let expr = FieldExpr::Net { net };

        let values = candidates(&["192.168.1.0"]);
        assert!(expr.matches(&field(&values)));

        let values = candidates(&["router at 192.168.1.77 is down"]);
        assert!(expr.matches(&field(&values)));

        let values = candidates(&["192.168.0.0/16"]);
        assert!(expr.matches(&field(&values)));

        let values = candidates(&["10.0.0.1", "999.1.1.1"]);
        assert!(!expr.matches(&field(&values)));
    }

    #[test]
    fn numeric_strings_count() {
        let expr = FieldExpr::Float {
            values: [5.0, 0.0],
            op: Op::Gt,
        };
        let values = vec![json!("7")];
        assert!(expr.matches(&field(&values)));
        let values = vec![json!("not a number"), json!(3)];
        assert!(!expr.matches(&field(&values)));
    }

    #[test]
    fn between_is_inclusive() {
        let expr = FieldExpr::Float {
            values: [1.0, 2.0],
            op: Op::Between,
        };
        for (value, want) in [(1.0, true), (1.5, true), (2.0, true), (2.5, false)] {
            let values = vec![json!(value)];
            assert_eq!(expr.matches(&field(&values)), want, "value {value}");
        }
    }

    #[test]
    fn regex_sees_rendered_numbers() {
        let expr = FieldExpr::Regexp {
            re: regex::Regex::new(r"^1$").unwrap(),
        };
        let values = vec![json!(1.0)];
        assert!(expr.matches(&field(&values)));
    }

    #[test]
    fn null_requires_all_null() {
        let values = vec![json!(null), json!(null)];
        assert!(FieldExpr::Null.matches(&field(&values)));
        let values = vec![json!(null), json!(1)];
        assert!(!FieldExpr::Null.matches(&field(&values)));
        let values: Vec<Value> = Vec::new();
        assert!(!FieldExpr::Null.matches(&field(&values)));
        assert!(!FieldExpr::Exists.matches(&field(&values)));
    }
}
