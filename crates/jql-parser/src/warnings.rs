use crate::ast::ExprNode;
use crate::ast::Node;
use crate::ast::Op;
use crate::ast::RegexpVal;
use crate::ast::Val;
use crate::error::ParseError;
use crate::message::MessageTape;
use crate::visitor::Flow;

use regex_syntax::hir::HirKind;

/// The hint/warning visitor: non-fatal advice about regex shapes, unicode
/// case-insensitivity and operator choices. Pair it with
/// [`MessageVisitor::new`] and hand it to the parser.
///
/// [`MessageVisitor::new`]: crate::visitor::MessageVisitor::new
pub fn warning_visitor(node: &Node, tape: &mut MessageTape) -> Result<Flow, ParseError> {
    let Node::Expr(expr) = node else {
        return Ok(Flow::Continue);
    };
    for value in &expr.values {
        match value {
            Val::Str(sv) if expr.op == Op::Sim => {
                tape.warning_at(
                    sv.pos,
                    format!(
                        "similarity comparison is deprecated for string values; \
                         use the normal comparison operator - {}:\"<string>\"",
                        expr.field
                    ),
                );
            }
            Val::Regexp(rv) => regex_messages(expr, rv, tape),
            Val::Time(tv) => {
                if expr.op == Op::Eq && !tv.day_only {
                    tape.warning_at(
                        tv.pos,
                        "exact matches on full datetime values match the time EXACTLY, \
                         consider a short date (YYYY-MM-DD) to match the day",
                    );
                }
            }
            _ => {}
        }
    }
    Ok(Flow::Continue)
}

fn regex_messages(expr: &ExprNode, rv: &RegexpVal, tape: &mut MessageTape) {
    if expr.op == Op::Sim {
        tape.warning_at(
            rv.pos,
            "similarity comparison is no longer necessary for regular expressions; \
             use the normal comparison operator - field:/<regular expression>/",
        );
    }

    let pattern = rv.pattern.as_str();
    if pattern.starts_with("(?i)") && !pattern.is_ascii() {
        tape.warning_at(
            rv.pos,
            format!(
                "case-insensitive regular expression /{pattern}/ contains unicode \
                 characters; this may not work as intended, consider a fuzzy match - \
                 field:~\"<value>\""
            ),
        );
    }

    let trimmed = pattern.strip_prefix("(?i)").unwrap_or(pattern);
    if trimmed.starts_with(".*") || trimmed.ends_with(".*") {
        tape.hint_at(
            rv.pos,
            format!(
                "regular expression /{pattern}/ does not need to begin or end with \
                 \".*\", as this is redundant"
            ),
        );
    }

    // Shape analysis on the compiled syntax; the pattern already compiled
    // once, so a parse failure here only skips the hints.
    let Ok(hir) = regex_syntax::Parser::new().parse(pattern) else {
        return;
    };
    let top = match hir.kind() {
        HirKind::Capture(cap) => {
            tape.hint_at(
                rv.pos,
                format!(
                    "unnecessary outer capturing group \"()\", consider /{}/",
                    cap.sub
                ),
            );
            cap.sub.as_ref()
        }
        _ => &hir,
    };
    if let HirKind::Alternation(branches) = top.kind() {
        if branches
            .iter()
            .all(|b| matches!(b.kind(), HirKind::Literal(_)))
        {
            tape.hint_at(
                rv.pos,
                format!(
                    "if you are doing large string alternations, consider using a \
                     multi-string match: {}:(\"one\", \"two\")",
                    expr.field
                ),
            );
        }
    }
}
