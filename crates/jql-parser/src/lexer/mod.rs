mod classify;
mod token;

pub use token::Token;
pub use token::TokenKind;

use crate::pos::Pos;

use classify::classify_alpha;
use classify::classify_numeric;

/// The jql lexer. Produces one [`Token`] per call to [`Lexer::next_token`],
/// with an `Eof` token once the input is exhausted.
///
/// ```rust
/// use jql_parser::{Lexer, TokenKind};
///
/// let mut lexer = Lexer::new(r#"name:"siegfried""#);
/// assert_eq!(lexer.next_token().kind, TokenKind::Ident);
/// assert_eq!(lexer.next_token().kind, TokenKind::Colon);
/// assert_eq!(lexer.next_token().kind, TokenKind::Str);
/// assert_eq!(lexer.next_token().kind, TokenKind::Eof);
/// ```
pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset and character pairs, in order.
    chars: Vec<(usize, char)>,
    index: usize,
    line: u32,
    column: u32,
    /// The kind of the previously emitted token. `/` after a value-like
    /// token is a slash operator, not the start of a regex literal. This is
    /// the only state carried across calls.
    prev_kind: TokenKind,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            index: 0,
            line: 1,
            column: 1,
            prev_kind: TokenKind::Eof,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_ignored();

        let token = match self.ch() {
            None => Token::eof(self.here(0)),
            Some('.') => self.single(TokenKind::Dot),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some('[') => self.single(TokenKind::LBracket),
            Some(']') => self.single(TokenKind::RBracket),
            Some('{') => self.single(TokenKind::LBrace),
            Some('}') => self.single(TokenKind::RBrace),
            Some(',') => self.single(TokenKind::Comma),
            Some(':') => self.single(TokenKind::Colon),
            Some('~') => self.single(TokenKind::Sim),
            Some('-') => self.single(TokenKind::Minus),
            Some('!') => match self.peek() {
                Some('=') => self.double(TokenKind::Neq),
                _ => self.single(TokenKind::Bang),
            },
            Some('=') => match self.peek() {
                Some('=') => self.double(TokenKind::Eq),
                _ => self.unexpected('='),
            },
            Some('<') => match self.peek() {
                Some('=') => self.double(TokenKind::Lte),
                _ => self.single(TokenKind::Lt),
            },
            Some('>') => match self.peek() {
                Some('=') => self.double(TokenKind::Gte),
                Some('<') => self.double(TokenKind::Between),
                _ => self.single(TokenKind::Gt),
            },
            Some('"') => self.enclosed('"', TokenKind::Str),
            Some('/') => {
                if self.prev_kind.is_value_like() {
                    self.single(TokenKind::Slash)
                } else {
                    self.enclosed('/', TokenKind::Regexp)
                }
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.alpha_literal(),
            Some(c) if c.is_ascii_digit() => self.numeric_literal(),
            Some(c) => self.unexpected(c),
        };

        self.prev_kind = token.kind;
        token
    }

    fn ch(&self) -> Option<char> {
        self.chars.get(self.index).map(|&(_, c)| c)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index + 1).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.index)
            .map_or(self.input.len(), |&(off, _)| off)
    }

    fn bump(&mut self) {
        if let Some(&(_, c)) = self.chars.get(self.index) {
            self.index += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// A position starting at the current character.
    fn here(&self, length: usize) -> Pos {
        Pos::new(self.line, self.column, self.offset() as i64, length as u32)
    }

    fn skip_ignored(&mut self) {
        loop {
            while matches!(self.ch(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            if self.ch() == Some('#') {
                while !matches!(self.ch(), None | Some('\n')) {
                    self.bump();
                }
                continue;
            }
            break;
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let c = self.ch().expect("single() called at end of input");
        let pos = self.here(c.len_utf8());
        self.bump();
        Token::new(kind, c, pos)
    }

    fn double(&mut self, kind: TokenKind) -> Token {
        let pos = self.here(kind.name().len());
        self.bump();
        self.bump();
        Token::new(kind, kind.name(), pos)
    }

    fn unexpected(&mut self, c: char) -> Token {
        let pos = self.here(c.len_utf8());
        self.bump();
        Token::illegal(c, pos, format!("unexpected character `{c}`"))
    }

    fn alpha_literal(&mut self) -> Token {
        let start = self.here(0);
        let start_offset = self.offset();
        while matches!(self.ch(), Some(c) if c.is_alphanumeric() || c == '_' || c == '-') {
            self.bump();
        }
        let literal = &self.input[start_offset..self.offset()];
        let pos = Pos::new(start.line, start.column, start.offset, literal.len() as u32);
        Token::new(classify_alpha(literal), literal, pos)
    }

    fn numeric_literal(&mut self) -> Token {
        let start = self.here(0);
        let start_offset = self.offset();
        while matches!(self.ch(), Some(c) if !is_delimiter(c)) {
            self.bump();
        }
        let literal = &self.input[start_offset..self.offset()];
        let pos = Pos::new(start.line, start.column, start.offset, literal.len() as u32);
        Token::new(classify_numeric(literal), literal, pos)
    }

    fn enclosed(&mut self, marker: char, kind: TokenKind) -> Token {
        let start = self.here(0);
        let start_offset = self.offset();
        self.bump();

        let mut literal = String::new();
        loop {
            match self.ch() {
                None => {
                    let friendly = match kind {
                        TokenKind::Regexp => "regular expression",
                        _ => "string",
                    };
                    let pos = Pos::new(
                        start.line,
                        start.column,
                        start.offset,
                        (self.offset() - start_offset) as u32,
                    );
                    return Token::illegal(
                        literal,
                        pos,
                        format!("unterminated {friendly} literal"),
                    );
                }
                Some('\\') if self.peek() == Some(marker) => {
                    literal.push(marker);
                    self.bump();
                    self.bump();
                }
                Some(c) if c == marker => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    literal.push(c);
                    self.bump();
                }
            }
        }
        let pos = Pos::new(
            start.line,
            start.column,
            start.offset,
            (self.offset() - start_offset) as u32,
        );
        Token::new(kind, literal, pos)
    }
}

/// Stops numeric literal runs from getting too long, specifically for
/// operands of the form `a.b[1]` and value lists.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | '{' | '}' | ',')
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn lex(input: &str) -> String {
        let mut lexer = Lexer::new(input);
        let mut out = String::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            out.push_str(&format!("{token:?}\n"));
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn simple_comparison() {
        expect![[r#"
            IDENT@0:4 "name"
            :@4:5 ":"
            STRING@5:16 "siegfried"
            EOF@16:16 ""
        "#]]
        .assert_eq(&lex(r#"name:"siegfried""#));
    }

    #[test]
    fn operators_and_values() {
        expect![[r#"
            IDENT@0:4 "date"
            :@4:5 ":"
            ><@5:7 "><"
            (@7:8 "("
            TIMESTAMP@8:18 "1970-01-01"
            ,@18:19 ","
            TIMESTAMP@19:29 "1980-01-01"
            )@29:30 ")"
            EOF@30:30 ""
        "#]]
        .assert_eq(&lex("date:><(1970-01-01,1980-01-01)"));
    }

    #[test]
    fn regex_vs_slash() {
        // after a value-like token, `/` is a slash operator
        let mut lexer = Lexer::new("a:/re/ /x/");
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
            let t = lexer.next_token();
            (t.kind != TokenKind::Eof).then_some(t.kind)
        })
        .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Regexp,
                TokenKind::Slash,
                TokenKind::Ident,
                TokenKind::Slash,
            ]
        );
    }

    #[test]
    fn escaped_delimiters() {
        let mut lexer = Lexer::new(r#""Given\"Name""#);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Str);
        assert_eq!(token.literal, r#"Given"Name"#);

        let mut lexer = Lexer::new(r"/a\/b/");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Regexp);
        assert_eq!(token.literal, "a/b");
    }

    #[test]
    fn unterminated_literals() {
        let mut lexer = Lexer::new(r#"name:"oops"#);
        lexer.next_token();
        lexer.next_token();
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Illegal);
        assert_eq!(token.err.as_deref(), Some("unterminated string literal"));

        let mut lexer = Lexer::new("/oops");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Illegal);
        assert_eq!(
            token.err.as_deref(),
            Some("unterminated regular expression literal")
        );
    }

    #[test]
    fn comments_and_newlines() {
        let mut lexer = Lexer::new("# leading comment\nname:1 # trailing\n");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.pos.line, 2);
        assert_eq!(token.pos.column, 1);
        lexer.next_token();
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Int);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn line_and_column_tracking() {
        let mut lexer = Lexer::new("a:1\n  AND b:2");
        for _ in 0..3 {
            lexer.next_token();
        }
        let and = lexer.next_token();
        assert_eq!(and.kind, TokenKind::And);
        assert_eq!(and.pos.line, 2);
        assert_eq!(and.pos.column, 3);
    }

    #[test]
    fn keyword_classification() {
        let mut lexer = Lexer::new("a:true and b:exists or not c:null");
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
            let t = lexer.next_token();
            (t.kind != TokenKind::Eof).then_some(t.kind)
        })
        .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Bool,
                TokenKind::And,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Exists,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Null,
            ]
        );
    }

    #[test]
    fn size_suffixes_and_nets() {
        let mut lexer = Lexer::new("size:>2kb AND router:192.168.1.0/24");
        let mut kinds = Vec::new();
        let mut literals = Vec::new();
        loop {
            let t = lexer.next_token();
            if t.kind == TokenKind::Eof {
                break;
            }
            kinds.push(t.kind);
            literals.push(t.literal);
        }
        assert_eq!(kinds[3], TokenKind::Int);
        assert_eq!(literals[3], "2kb");
        assert_eq!(kinds[7], TokenKind::Net);
        assert_eq!(literals[7], "192.168.1.0/24");
    }
}
