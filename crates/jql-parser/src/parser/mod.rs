use crate::ast::BoolVal;
use crate::ast::ExprNode;
use crate::ast::FieldPath;
use crate::ast::FloatVal;
use crate::ast::IntVal;
use crate::ast::NetVal;
use crate::ast::Node;
use crate::ast::Op;
use crate::ast::PathSegment;
use crate::ast::RegexpVal;
use crate::ast::StrVal;
use crate::ast::TimeVal;
use crate::ast::Val;
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::message::ParserMessage;
use crate::pos::Pos;
use crate::validate::op_validator;
use crate::visitor::walk;
use crate::visitor::MessageVisitor;

/// Parse a query and run the default validators over it.
///
/// On success, returns the root [`Node`] along with any hints and warnings
/// the validators produced. The first error - lexical, syntactic, value or
/// semantic - aborts with a positioned [`ParseError`].
///
/// ```rust
/// use jql_parser::parse_query;
///
/// let (node, messages) = parse_query(r#"name:"Hans" AND age:>9000"#).unwrap();
/// assert!(messages.is_empty());
/// assert_eq!(node.to_string(), r#"(&& (== name "Hans") (> age 9000))"#);
/// ```
pub fn parse_query(query: &str) -> Result<(Node, Vec<ParserMessage>), ParseError> {
    QueryParser::new().parse(query)
}

/// Parse a query into an AST without running any validators.
pub fn parse(query: &str) -> Result<Node, ParseError> {
    Parser::new(query).parse_root()
}

/// A configurable front door to the parser: grammar plus a sequence of
/// validating visitors.
///
/// The operator validator is always installed. Additional
/// [`MessageVisitor`]s run in the order they were added; each visitor's
/// first tape error fails the parse.
pub struct QueryParser {
    visitors: Vec<MessageVisitor>,
}

impl QueryParser {
    pub fn new() -> Self {
        Self {
            visitors: vec![MessageVisitor::new(op_validator)],
        }
    }

    /// Add a visitor to the parsing pass.
    pub fn with_visitor(mut self, visitor: MessageVisitor) -> Self {
        self.visitors.push(visitor);
        self
    }

    pub fn parse(self, query: &str) -> Result<(Node, Vec<ParserMessage>), ParseError> {
        let root = parse(query)?;
        let mut messages = Vec::new();
        for mut visitor in self.visitors {
            walk(&mut visitor, &root)?;
            if let Some(err) = visitor.first_error() {
                return Err(err.into());
            }
            messages.extend(visitor.into_messages());
        }
        Ok((root, messages))
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

/// The grammar walker. Owns the lexer and a single token of lookahead.
struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
}

impl<'a> Parser<'a> {
    fn new(query: &'a str) -> Self {
        let mut lexer = Lexer::new(query);
        let cur = lexer.next_token();
        Self { lexer, cur }
    }

    fn parse_root(mut self) -> Result<Node, ParseError> {
        if self.at(TokenKind::Eof) {
            return Err(ParseError::new(self.cur.pos, "empty query"));
        }
        let node = self.parse_or()?;
        if !self.at(TokenKind::Eof) {
            return Err(self.unexpected("extra token at query end", &[TokenKind::Eof]));
        }
        Ok(node)
    }

    // Precedence, low to high: OR, AND, NOT, comparison, primary.

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and()?;
        while self.at(TokenKind::Or) {
            self.bump();
            let right = self.parse_and()?;
            left = Node::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_not()?;
        while self.at(TokenKind::And) {
            self.bump();
            let right = self.parse_not()?;
            left = Node::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if matches!(self.cur.kind, TokenKind::Bang | TokenKind::Not) {
            self.bump();
            let expr = self.parse_not()?;
            return Ok(Node::not(expr));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        match self.cur.kind {
            TokenKind::LParen => {
                self.bump();
                let node = self.parse_or()?;
                self.expect(TokenKind::RParen, "missing closing parenthesis")?;
                Ok(node)
            }
            TokenKind::Ident | TokenKind::Str => {
                let field = self.parse_field()?;
                match self.cur.kind {
                    TokenKind::LBrace => {
                        self.bump();
                        let expr = self.parse_or()?;
                        self.expect(TokenKind::RBrace, "missing closing brace")?;
                        Ok(Node::subdoc(field, expr))
                    }
                    TokenKind::Colon => self.parse_comparison(field),
                    _ => Err(self.unexpected(
                        "expected a comparison or subdocument after field",
                        &[TokenKind::Colon, TokenKind::LBrace],
                    )),
                }
            }
            _ => Err(self.unexpected("expected a query expression", &[])),
        }
    }

    fn parse_field(&mut self) -> Result<FieldPath, ParseError> {
        if !matches!(self.cur.kind, TokenKind::Ident | TokenKind::Str) {
            return Err(self.unexpected(
                "field needs to begin with string or identifier",
                &[TokenKind::Ident, TokenKind::Str],
            ));
        }
        let first = self.bump();
        let mut segments = vec![PathSegment::Key(first.literal)];
        loop {
            match self.cur.kind {
                TokenKind::Dot => {
                    self.bump();
                    if !matches!(self.cur.kind, TokenKind::Ident | TokenKind::Str) {
                        return Err(self.unexpected(
                            "was looking for a field piece",
                            &[TokenKind::Ident, TokenKind::Str],
                        ));
                    }
                    let segment = self.bump();
                    segments.push(PathSegment::Key(segment.literal));
                }
                TokenKind::LBracket => {
                    self.bump();
                    if !self.at(TokenKind::Int) {
                        return Err(self.unexpected("invalid index", &[TokenKind::Int]));
                    }
                    let index = self.bump();
                    let idx: usize = index
                        .literal
                        .parse()
                        .map_err(|_| ParseError::new(index.pos, "invalid index"))?;
                    self.expect(TokenKind::RBracket, "missing index terminator")?;
                    segments.push(PathSegment::Index(idx));
                }
                _ => break,
            }
        }
        Ok(FieldPath::new(segments))
    }

    fn parse_comparison(&mut self, field: FieldPath) -> Result<Node, ParseError> {
        let colon = self.bump();
        let op = match self.cur.kind {
            TokenKind::Eq => Some(Op::Eq),
            TokenKind::Lt => Some(Op::Lt),
            TokenKind::Lte => Some(Op::Lte),
            TokenKind::Gt => Some(Op::Gt),
            TokenKind::Gte => Some(Op::Gte),
            TokenKind::Between => Some(Op::Between),
            TokenKind::Sim => Some(Op::Sim),
            TokenKind::Exists => Some(Op::Exists),
            TokenKind::Null => Some(Op::Null),
            _ => None,
        };
        let (op, pos) = match op {
            Some(op) => {
                let token = self.bump();
                (op, token.pos)
            }
            // a bare `:` is an implicit equality
            None => (Op::Eq, colon.pos),
        };

        let values = if matches!(op, Op::Exists | Op::Null) && !self.at_value_start() {
            Vec::new()
        } else {
            self.parse_values()?
        };
        Ok(Node::Expr(ExprNode {
            op,
            field,
            values,
            pos,
        }))
    }

    /// Whether the current token can begin a value or a value list. Used to
    /// let stray arguments after `exists`/`null` reach the arity validator.
    fn at_value_start(&self) -> bool {
        matches!(
            self.cur.kind,
            TokenKind::LParen
                | TokenKind::Str
                | TokenKind::Regexp
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Bool
                | TokenKind::Timestamp
                | TokenKind::Net
                | TokenKind::Minus
        )
    }

    fn parse_values(&mut self) -> Result<Vec<Val>, ParseError> {
        if !self.at(TokenKind::LParen) {
            return Ok(vec![self.parse_value()?]);
        }
        let lparen = self.bump();
        if self.at(TokenKind::RParen) {
            return Err(ParseError::new(
                self.cur.pos,
                "unexpected closing parenthesis, expecting values",
            ));
        }
        let mut values = vec![self.parse_value()?];
        loop {
            match self.cur.kind {
                TokenKind::Comma => {
                    self.bump();
                    values.push(self.parse_value()?);
                }
                TokenKind::RParen => {
                    self.bump();
                    break;
                }
                _ => {
                    return Err(self.unexpected(
                        "expected a comma or closing parenthesis in value list",
                        &[TokenKind::Comma, TokenKind::RParen],
                    ))
                }
            }
        }
        if values.len() == 1 {
            return Err(ParseError::new(
                lparen.pos,
                "unnecessary parenthesis for only one value",
            ));
        }
        Ok(values)
    }

    fn parse_value(&mut self) -> Result<Val, ParseError> {
        match self.cur.kind {
            TokenKind::Str => {
                let token = self.bump();
                Ok(Val::Str(StrVal::new(token.literal, token.pos)))
            }
            TokenKind::Bool => {
                let token = self.bump();
                Ok(Val::Bool(BoolVal::parse(&token.literal, token.pos)))
            }
            TokenKind::Int => {
                let token = self.bump();
                IntVal::parse(&token.literal, token.pos)
                    .map(Val::Int)
                    .map_err(|reason| value_error("integer value", &token.literal, token.pos, reason))
            }
            TokenKind::Float => {
                let token = self.bump();
                FloatVal::parse(&token.literal, token.pos)
                    .map(Val::Float)
                    .map_err(|reason| value_error("float value", &token.literal, token.pos, reason))
            }
            TokenKind::Regexp => {
                let token = self.bump();
                RegexpVal::parse(&token.literal, token.pos)
                    .map(Val::Regexp)
                    .map_err(|reason| {
                        value_error(
                            "regular expression",
                            &format!("/{}/", token.literal),
                            token.pos,
                            reason,
                        )
                    })
            }
            TokenKind::Net => {
                let token = self.bump();
                NetVal::parse(&token.literal, token.pos)
                    .map(Val::Net)
                    .map_err(|reason| value_error("net value", &token.literal, token.pos, reason))
            }
            TokenKind::Timestamp => {
                let token = self.bump();
                TimeVal::parse(&token.literal, token.pos)
                    .map(Val::Time)
                    .map_err(|reason| value_error("date value", &token.literal, token.pos, reason))
            }
            TokenKind::Minus => {
                let minus = self.bump();
                if !matches!(self.cur.kind, TokenKind::Int | TokenKind::Float) {
                    return Err(self.unexpected(
                        "expected a numeric value after `-`",
                        &[TokenKind::Int, TokenKind::Float],
                    ));
                }
                let token = self.bump();
                let literal = format!("-{}", token.literal);
                let length = (token.pos.offset + i64::from(token.pos.length) - minus.pos.offset)
                    .max(0) as u32;
                let pos = Pos::new(minus.pos.line, minus.pos.column, minus.pos.offset, length);
                match token.kind {
                    TokenKind::Int => IntVal::parse(&literal, pos)
                        .map(Val::Int)
                        .map_err(|reason| value_error("integer value", &literal, pos, reason)),
                    _ => FloatVal::parse(&literal, pos)
                        .map(Val::Float)
                        .map_err(|reason| value_error("float value", &literal, pos, reason)),
                }
            }
            _ => Err(self.unexpected("expected a value", &[])),
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    /// Consume the current token, returning it, and pull the next one.
    fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.cur, next)
    }

    fn expect(&mut self, kind: TokenKind, msg: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(msg, &[kind]))
        }
    }

    /// A positioned error describing the offending token and, optionally,
    /// what would have been accepted instead.
    fn unexpected(&self, msg: &str, wanted: &[TokenKind]) -> ParseError {
        let token = &self.cur;
        let mut out = String::from(msg);
        out.push_str(" -- found: ");
        match &token.err {
            Some(err) => {
                out.push('<');
                out.push_str(err);
                out.push('>');
            }
            None => {
                out.push_str(&format!("{:?}", token.literal));
                if token.kind.name() != token.literal {
                    out.push_str(&format!("({})", token.kind.name()));
                }
            }
        }
        if !wanted.is_empty() {
            out.push_str(" wanted: ");
            for (i, kind) in wanted.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                out.push_str(kind.name());
            }
        }
        ParseError::new(token.pos, out)
    }
}

fn value_error(kind: &str, text: &str, pos: Pos, reason: String) -> ParseError {
    ParseError::new(pos, format!("invalid {kind} [{text}]: {reason}"))
}
