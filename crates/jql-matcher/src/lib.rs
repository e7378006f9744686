#![doc = include_str!("../README.md")]

mod build;
mod datetime;
mod expr;
mod fields;
mod nodes;
mod stats;
mod strings;

pub use crate::stats::FieldStatsSnapshot;
pub use crate::stats::FieldTypeStats;
pub use crate::stats::MatchStats;

pub use jql_parser::MessageVisitor;
pub use jql_parser::ParseError;
pub use jql_parser::ParserMessage;
pub use jql_parser::Pos;
pub use jql_parser::Severity;

use crate::build::Builder;
use crate::nodes::MatcherNode;

use jql_parser::warning_visitor;
use jql_parser::QueryParser;

use serde_json::Value;

/// An error from [`compile`] or from matching.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The query failed to compile; carries the position of the first
    /// failure.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The document handed to [`Matcher::match_bytes`] was not valid JSON.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for [`compile`].
#[derive(Default)]
pub struct MatcherOptions {
    /// Attach per-node match counters and per-field type histograms.
    pub collect_stats: bool,
    /// Retain the compiled query plan, exposed via
    /// [`Matcher::query_plan`].
    pub debug: bool,
    /// Additional message visitors to run over the parsed query.
    pub visitors: Vec<MessageVisitor>,
}

/// Compile a query into a [`Matcher`].
///
/// Returns the matcher along with any hints and warnings the validators
/// produced; the first error fails compilation instead.
pub fn compile(
    query: &str,
    options: MatcherOptions,
) -> Result<(Matcher, Vec<ParserMessage>), Error> {
    let mut parser = QueryParser::new().with_visitor(MessageVisitor::new(warning_visitor));
    for visitor in options.visitors {
        parser = parser.with_visitor(visitor);
    }
    let (root, messages) = parser.parse(query)?;
    let matcher = Matcher {
        plan: options.debug.then(|| root.to_string()),
        root: Builder::new(options.collect_stats).build(&root),
    };
    Ok((matcher, messages))
}

/// A compiled query, ready to evaluate JSON documents to a boolean match.
///
/// Matchers are immutable after build and safe to share across threads;
/// repeated calls with the same document return the same answer.
pub struct Matcher {
    root: MatcherNode,
    plan: Option<String>,
}

impl Matcher {
    /// Compile `query` with default options.
    pub fn new(query: &str) -> Result<(Matcher, Vec<ParserMessage>), Error> {
        compile(query, MatcherOptions::default())
    }

    /// Parse `json` and evaluate it. Errors only on invalid JSON.
    pub fn match_bytes(&self, json: &[u8]) -> Result<bool, Error> {
        let doc: Value = serde_json::from_slice(json)?;
        Ok(self.root.result(&doc))
    }

    /// Evaluate an externally parsed document. Lets callers pool or reuse
    /// their JSON parsing machinery.
    pub fn match_parsed(&self, doc: &Value) -> bool {
        self.root.result(doc)
    }

    /// Per-node `{checked, matched}` counters in depth-first order, when
    /// the matcher was compiled with `collect_stats`.
    pub fn stats(&self) -> Option<MatchStats> {
        self.root.stats()
    }

    /// Per-field histograms of the JSON types observed at each leaf's
    /// path, when compiled with `collect_stats`.
    pub fn field_stats(&self) -> Vec<(String, FieldStatsSnapshot)> {
        let mut out = Vec::new();
        self.root.collect_field_stats(&mut out);
        out
    }

    /// The compiled query's s-expression rendering, when compiled with
    /// `debug`.
    pub fn query_plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }
}
