use crate::error::ParseError;
use crate::pos::Pos;

use serde::Serialize;

use std::fmt;

/// Severity of a [`ParserMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Hint => "HINT",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// A diagnostic produced while validating a query.
///
/// Serializes to the wire form
/// `{"type":"hint"|"warning"|"error","msg":…,"position":{…}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserMessage {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub msg: String,
    pub position: Pos,
}

impl ParserMessage {
    pub fn new(severity: Severity, position: Pos, msg: impl Into<String>) -> Self {
        Self {
            severity,
            msg: msg.into(),
            position,
        }
    }
}

impl fmt::Display for ParserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position.is_none() {
            write!(f, "{}: {}", self.severity.label(), self.msg)
        } else {
            write!(
                f,
                "{} [{}:{}({})]: {}",
                self.severity.label(),
                self.position.line,
                self.position.column,
                self.position.offset,
                self.msg
            )
        }
    }
}

impl From<&ParserMessage> for ParseError {
    fn from(message: &ParserMessage) -> Self {
        ParseError::new(message.position, message.msg.clone())
    }
}

/// The ordered accumulator visitors append diagnostics to.
///
/// The tape remembers the first error it sees; compilation fails with that
/// error once the walk is over, while warnings and hints flow through to the
/// caller.
#[derive(Debug, Default)]
pub struct MessageTape {
    messages: Vec<ParserMessage>,
    first_error: Option<usize>,
}

impl MessageTape {
    pub fn new() -> Self {
        Self::default()
    }

    /// An informational message that is neither a warning nor an error, yet
    /// might be helpful: a less efficient regex, a redundant construct.
    pub fn hint(&mut self, msg: impl Into<String>) {
        self.push(Severity::Hint, Pos::NONE, msg);
    }

    /// A hint with a query position attached for printing or highlighting.
    pub fn hint_at(&mut self, pos: Pos, msg: impl Into<String>) {
        self.push(Severity::Hint, pos, msg);
    }

    /// A more notable message, still not an error.
    pub fn warning(&mut self, msg: impl Into<String>) {
        self.push(Severity::Warning, Pos::NONE, msg);
    }

    /// A warning with a query position attached.
    pub fn warning_at(&mut self, pos: Pos, msg: impl Into<String>) {
        self.push(Severity::Warning, pos, msg);
    }

    /// A validation failure. The first error recorded on the tape fails
    /// compilation.
    pub fn error(&mut self, msg: impl Into<String>) {
        self.push(Severity::Error, Pos::NONE, msg);
    }

    /// An error with a query position attached.
    pub fn error_at(&mut self, pos: Pos, msg: impl Into<String>) {
        self.push(Severity::Error, pos, msg);
    }

    pub fn messages(&self) -> &[ParserMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ParserMessage> {
        self.messages
    }

    /// The first error recorded, if any.
    pub fn first_error(&self) -> Option<&ParserMessage> {
        self.first_error.map(|i| &self.messages[i])
    }

    fn push(&mut self, severity: Severity, pos: Pos, msg: impl Into<String>) {
        if severity == Severity::Error && self.first_error.is_none() {
            self.first_error = Some(self.messages.len());
        }
        self.messages.push(ParserMessage::new(severity, pos, msg));
    }
}
