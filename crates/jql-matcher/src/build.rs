use crate::expr::FieldExpr;
use crate::nodes::MatcherNode;
use crate::stats::FieldStats;
use crate::stats::NodeStats;
use crate::strings::has_wildcard;
use crate::strings::search_regex;
use crate::strings::FuzzyPattern;

use jql_parser::ast::ExprNode;
use jql_parser::ast::Node;
use jql_parser::ast::Op;
use jql_parser::ast::Val;

/// Transforms a validated AST into the matcher tree. The validators have
/// already enforced arity and argument types; anything that slips past them
/// is a programming error and hits a backstop panic here.
pub(crate) struct Builder {
    collect_stats: bool,
}

impl Builder {
    pub fn new(collect_stats: bool) -> Self {
        Self { collect_stats }
    }

    pub fn build(&self, node: &Node) -> MatcherNode {
        match node {
            Node::And { left, right } => MatcherNode::And {
                left: Box::new(self.build(left)),
                right: Box::new(self.build(right)),
                stats: self.stats("AND"),
            },
            Node::Or { left, right } => MatcherNode::Or {
                left: Box::new(self.build(left)),
                right: Box::new(self.build(right)),
                stats: self.stats("OR"),
            },
            Node::Not { expr } => MatcherNode::Not {
                sub: Box::new(self.build(expr)),
                stats: self.stats("NOT"),
            },
            Node::Subdoc { prefix, expr } => MatcherNode::Subdoc {
                prefix: prefix.clone(),
                sub: Box::new(self.build(expr)),
                stats: self.stats(format!("{prefix}{{}}")),
            },
            Node::Expr(expr) => MatcherNode::Expr {
                path: expr.field.clone(),
                exprs: field_exprs(expr),
                stats: self.stats(expr.friendly()),
                field_stats: self.collect_stats.then(FieldStats::new),
            },
        }
    }

    fn stats(&self, name: impl Into<String>) -> Option<NodeStats> {
        self.collect_stats.then(|| NodeStats::new(name))
    }
}

fn field_exprs(expr: &ExprNode) -> Vec<FieldExpr> {
    match expr.op {
        Op::Exists => vec![FieldExpr::Exists],
        Op::Null => vec![FieldExpr::Null],
        Op::Lt | Op::Lte | Op::Gt | Op::Gte => vec![ordered_expr(expr)],
        Op::Between => vec![between_expr(expr)],
        Op::Eq => expr.values.iter().map(eq_expr).collect(),
        Op::Sim => expr.values.iter().map(sim_expr).collect(),
    }
}

fn ordered_expr(expr: &ExprNode) -> FieldExpr {
    let value = match expr.values.as_slice() {
        [value] => value,
        // backstop
        other => panic!(
            "ordered comparison expects one constant value - got {}",
            other.len()
        ),
    };
    match value {
        Val::Int(_) | Val::Float(_) => FieldExpr::Float {
            values: [value.as_f64().unwrap_or_default(), 0.0],
            op: expr.op,
        },
        Val::Time(t) => FieldExpr::Datetime {
            values: [t.nanos, 0],
            op: expr.op,
        },
        // backstop
        other => panic!(
            "bad value type for ordered comparison: {}",
            other.type_name()
        ),
    }
}

fn between_expr(expr: &ExprNode) -> FieldExpr {
    let (first, second) = match expr.values.as_slice() {
        [first, second] => (first, second),
        // backstop
        other => panic!(
            "between comparison expects two constant values - got {}",
            other.len()
        ),
    };
    match (first, second) {
        (Val::Time(low), Val::Time(high)) => FieldExpr::Datetime {
            values: [low.nanos, high.nanos],
            op: Op::Between,
        },
        _ => FieldExpr::Float {
            // ordering and types guaranteed by the validator
            values: [
                first.as_f64().unwrap_or_default(),
                second.as_f64().unwrap_or_default(),
            ],
            op: Op::Between,
        },
    }
}

fn eq_expr(value: &Val) -> FieldExpr {
    match value {
        Val::Str(s) => string_match_expr(&s.value),
        Val::Regexp(r) => FieldExpr::Regexp {
            re: r.regex().clone(),
        },
        Val::Int(_) | Val::Float(_) => FieldExpr::Float {
            values: [value.as_f64().unwrap_or_default(), 0.0],
            op: Op::Eq,
        },
        Val::Bool(b) => FieldExpr::Bool {
            value: b.value,
            op: Op::Eq,
        },
        Val::Time(t) => FieldExpr::Datetime {
            values: [t.nanos, 0],
            op: Op::Eq,
        },
        Val::Net(n) => FieldExpr::Net { net: n.net },
    }
}

fn sim_expr(value: &Val) -> FieldExpr {
    match value {
        Val::Str(s) => string_match_expr(&s.value),
        Val::Bool(b) => FieldExpr::Bool {
            value: b.value,
            op: Op::Sim,
        },
        Val::Net(n) => FieldExpr::Net { net: n.net },
        // same as equality, kept for legacy queries
        Val::Regexp(r) => FieldExpr::Regexp {
            re: r.regex().clone(),
        },
        // backstop
        other => panic!(
            "bad value type for similarity comparison: {}",
            other.type_name()
        ),
    }
}

/// Wildcard-free unicode strings use the fuzzy engine; everything else
/// compiles to a case-insensitive search regex.
fn string_match_expr(s: &str) -> FieldExpr {
    if !s.is_ascii() && !has_wildcard(s) {
        FieldExpr::Fuzzy {
            pat: FuzzyPattern::new(s),
        }
    } else {
        FieldExpr::Regexp {
            re: search_regex(s),
        }
    }
}
