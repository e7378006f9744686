use crate::expr::FieldExpr;
use crate::fields::resolve;
use crate::stats::FieldStats;
use crate::stats::FieldStatsSnapshot;
use crate::stats::MatchStats;
use crate::stats::NodeStats;

use jql_parser::ast::FieldPath;

use serde_json::Value;

/// One node of the compiled matcher tree. Immutable after build; only the
/// optional statistics counters mutate during evaluation, atomically.
pub(crate) enum MatcherNode {
    And {
        left: Box<MatcherNode>,
        right: Box<MatcherNode>,
        stats: Option<NodeStats>,
    },
    Or {
        left: Box<MatcherNode>,
        right: Box<MatcherNode>,
        stats: Option<NodeStats>,
    },
    Not {
        sub: Box<MatcherNode>,
        stats: Option<NodeStats>,
    },
    Subdoc {
        prefix: FieldPath,
        sub: Box<MatcherNode>,
        stats: Option<NodeStats>,
    },
    Expr {
        path: FieldPath,
        exprs: Vec<FieldExpr>,
        stats: Option<NodeStats>,
        field_stats: Option<FieldStats>,
    },
}

impl MatcherNode {
    pub fn result(&self, doc: &Value) -> bool {
        match self {
            MatcherNode::And { left, right, stats } => {
                let matched = left.result(doc) && right.result(doc);
                mark(stats, matched);
                matched
            }
            MatcherNode::Or { left, right, stats } => {
                let matched = left.result(doc) || right.result(doc);
                mark(stats, matched);
                matched
            }
            MatcherNode::Not { sub, stats } => {
                let matched = !sub.result(doc);
                mark(stats, matched);
                matched
            }
            MatcherNode::Subdoc { prefix, sub, stats } => {
                // the inner expression is re-rooted at every match of the
                // prefix individually; an array of subdocuments re-roots at
                // each element
                let roots = resolve(prefix, doc);
                let matched = roots.values.iter().any(|&root| match root {
                    Value::Array(items) => items.iter().any(|item| sub.result(item)),
                    other => sub.result(other),
                });
                mark(stats, matched);
                matched
            }
            MatcherNode::Expr {
                path,
                exprs,
                stats,
                field_stats,
            } => {
                let field = resolve(path, doc);
                if let Some(fs) = field_stats {
                    fs.observe(&field.values);
                }
                let matched = !field.is_empty() && exprs.iter().any(|e| e.matches(&field));
                mark(stats, matched);
                matched
            }
        }
    }

    /// Snapshot of this subtree's counters, depth-first. `None` when the
    /// matcher was built without statistics.
    pub fn stats(&self) -> Option<MatchStats> {
        match self {
            MatcherNode::And { left, right, stats }
            | MatcherNode::Or { left, right, stats } => stats.as_ref().map(|s| {
                let children = [left.stats(), right.stats()].into_iter().flatten().collect();
                s.snapshot(children)
            }),
            MatcherNode::Not { sub, stats } | MatcherNode::Subdoc { sub, stats, .. } => {
                stats.as_ref().map(|s| {
                    let children = sub.stats().into_iter().collect();
                    s.snapshot(children)
                })
            }
            MatcherNode::Expr { stats, .. } => stats.as_ref().map(|s| s.snapshot(Vec::new())),
        }
    }

    /// Collect field-type histograms, depth-first.
    pub fn collect_field_stats(&self, out: &mut Vec<(String, FieldStatsSnapshot)>) {
        match self {
            MatcherNode::And { left, right, .. } | MatcherNode::Or { left, right, .. } => {
                left.collect_field_stats(out);
                right.collect_field_stats(out);
            }
            MatcherNode::Not { sub, .. } | MatcherNode::Subdoc { sub, .. } => {
                sub.collect_field_stats(out);
            }
            MatcherNode::Expr {
                path, field_stats, ..
            } => {
                if let Some(fs) = field_stats {
                    out.push((path.to_string(), fs.snapshot()));
                }
            }
        }
    }
}

fn mark(stats: &Option<NodeStats>, matched: bool) {
    if let Some(stats) = stats {
        stats.mark(matched);
    }
}
