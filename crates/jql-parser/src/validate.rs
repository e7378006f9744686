use crate::ast::ExprNode;
use crate::ast::Node;
use crate::ast::Op;
use crate::ast::Val;
use crate::error::ParseError;
use crate::message::MessageTape;
use crate::pos::Pos;
use crate::visitor::Flow;

use std::collections::HashSet;

/// The default operator validator, installed by [`QueryParser::new`].
///
/// Checks every leaf expression for operator arity, argument types,
/// duplicate and conflicting values, and BETWEEN ordering. The first
/// violation lands on the tape as an error and stops the walk.
///
/// [`QueryParser::new`]: crate::parser::QueryParser::new
pub fn op_validator(node: &Node, tape: &mut MessageTape) -> Result<Flow, ParseError> {
    let Node::Expr(expr) = node else {
        return Ok(Flow::Continue);
    };
    let checks = [check_arity, check_value_types, check_rvals, check_between];
    for check in checks {
        if let Some((pos, msg)) = check(expr) {
            tape.error_at(pos, msg);
            return Ok(Flow::SkipAll);
        }
    }
    Ok(Flow::Continue)
}

fn check_arity(expr: &ExprNode) -> Option<(Pos, String)> {
    let n = expr.values.len();
    let msg = match expr.op.arity() {
        (0, Some(0)) => (n > 0).then(|| "does not accept arguments".to_string()),
        (min, Some(max)) if min == max => {
            (n != min).then(|| format!("requires exactly {min} arguments"))
        }
        (min, Some(max)) => {
            (n < min || n > max).then(|| format!("requires between {min} and {max} arguments"))
        }
        (min, None) => (n < min).then(|| format!("requires at least {min} arguments")),
    };
    msg.map(|m| (expr.pos, format!("[{}] operation {m}", expr.op)))
}

fn check_value_types(expr: &ExprNode) -> Option<(Pos, String)> {
    let (accepts, fail_msg): (fn(&Val) -> bool, &str) = match expr.op {
        Op::Lt | Op::Lte | Op::Gt | Op::Gte | Op::Between => (
            |v| matches!(v, Val::Int(_) | Val::Float(_) | Val::Time(_)),
            "needs numeric arguments",
        ),
        Op::Sim => (
            |v| matches!(v, Val::Str(_) | Val::Regexp(_) | Val::Bool(_) | Val::Net(_)),
            "needs string, boolean, or net arguments",
        ),
        _ => return None,
    };
    expr.values
        .iter()
        .find(|v| !accepts(v))
        .map(|bad| (bad.pos(), format!("[{}] operation {fail_msg}", expr.op)))
}

/// Duplicate arguments are always an error; for equality, `true` and
/// `false` together are a conflict.
fn check_rvals(expr: &ExprNode) -> Option<(Pos, String)> {
    if expr.values.len() <= 1 {
        return None;
    }
    let total = expr.values.len();
    let mut seen: HashSet<String> = HashSet::new();
    for (i, value) in expr.values.iter().enumerate() {
        let rendered = value.render();
        if seen.contains(&rendered) {
            return Some((
                value.pos(),
                format!("duplicate argument [{rendered}] (value {}/{total})", i + 1),
            ));
        }
        if expr.op == Op::Eq && (rendered == "true" || rendered == "false") {
            let opposite = if rendered == "true" { "false" } else { "true" };
            if seen.contains(opposite) {
                return Some((
                    value.pos(),
                    format!(
                        "conflicting boolean value [{rendered}] (value {}/{total})",
                        i + 1
                    ),
                ));
            }
        }
        seen.insert(rendered);
    }
    None
}

fn check_between(expr: &ExprNode) -> Option<(Pos, String)> {
    if expr.op != Op::Between || expr.values.len() != 2 {
        return None;
    }
    if let Val::Time(first) = &expr.values[0] {
        return match &expr.values[1] {
            Val::Time(second) => (second.nanos <= first.nanos).then(|| {
                (
                    second.pos,
                    "[><] operation requires the second argument be greater".to_string(),
                )
            }),
            other => Some((
                other.pos(),
                "second argument must also be a datetime value".to_string(),
            )),
        };
    }
    let first = expr.values[0].as_f64().unwrap_or(0.0);
    let second = expr.values[1].as_f64().unwrap_or(0.0);
    (second <= first).then(|| {
        (
            expr.values[1].pos(),
            "[><] operation requires the second argument be greater".to_string(),
        )
    })
}
