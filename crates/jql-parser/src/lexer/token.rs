use crate::pos::Pos;

use std::fmt;

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A token the lexer could not make sense of. The token's `err` field
    /// carries the description.
    Illegal,
    Eof,

    // Identifiers & literals
    Ident,
    Int,
    Float,
    Str,
    Regexp,
    Bool,
    Timestamp,
    Net,

    // Delimiters
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,

    // Operators - logical
    And,
    Or,
    Not,
    Bang,

    // Operators - comparison
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
    Sim,
    Exists,
    Null,

    // Operators - residual
    Minus,
    Slash,
}

impl TokenKind {
    /// Whether a `/` immediately after a token of this kind is a slash
    /// operator rather than the start of a regex literal.
    pub(crate) fn is_value_like(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Str
                | TokenKind::Regexp
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Timestamp
                | TokenKind::Net
        )
    }

    /// The name used when rendering "found/wanted" parse errors.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::Str => "STRING",
            TokenKind::Regexp => "REGEXP",
            TokenKind::Bool => "BOOL",
            TokenKind::Timestamp => "TIMESTAMP",
            TokenKind::Net => "NET",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Bang => "!",
            TokenKind::Eq => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Lte => "<=",
            TokenKind::Gt => ">",
            TokenKind::Gte => ">=",
            TokenKind::Between => "><",
            TokenKind::Sim => "~",
            TokenKind::Exists => "exists",
            TokenKind::Null => "null",
            TokenKind::Minus => "-",
            TokenKind::Slash => "/",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token with its source position.
///
/// For enclosed literals (strings, regexes) the `literal` holds the inner
/// text with escapes resolved, while the position covers the delimiters.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub pos: Pos,
    /// Description of what went wrong, for [`TokenKind::Illegal`] tokens.
    pub err: Option<String>,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, literal: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            literal: literal.into(),
            pos,
            err: None,
        }
    }

    pub(crate) fn illegal(literal: impl Into<String>, pos: Pos, err: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Illegal,
            literal: literal.into(),
            pos,
            err: Some(err.into()),
        }
    }

    pub(crate) fn eof(pos: Pos) -> Self {
        Self::new(TokenKind::Eof, "", pos)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.pos.offset;
        let end = self.pos.offset + i64::from(self.pos.length);
        match &self.err {
            Some(err) => write!(f, "ILLEGAL@{start}:{end} {:?} <{err}>", self.literal),
            None => write!(f, "{}@{start}:{end} {:?}", self.kind.name(), self.literal),
        }
    }
}
