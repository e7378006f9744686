use crate::lexer::TokenKind;

use once_cell::sync::Lazy;
use regex::Regex;

/// Classifies a literal run against an ordered set of anchored patterns.
/// The first pattern matching the whole run wins.
struct Classifier {
    re: Regex,
    kinds: Vec<TokenKind>,
}

impl Classifier {
    fn new(patterns: &[(&str, TokenKind)]) -> Self {
        let mut re_str = String::from("^(?:");
        let mut kinds = Vec::with_capacity(patterns.len());
        for (i, (pattern, kind)) in patterns.iter().enumerate() {
            re_str.push('(');
            re_str.push_str(pattern);
            re_str.push(')');
            if i < patterns.len() - 1 {
                re_str.push('|');
            }
            kinds.push(*kind);
        }
        re_str.push_str(")$");
        Self {
            re: Regex::new(&re_str).expect("classifier pattern must compile"),
            kinds,
        }
    }

    fn classify(&self, literal: &str) -> TokenKind {
        if let Some(caps) = self.re.captures(literal) {
            for (i, kind) in self.kinds.iter().enumerate() {
                if caps.get(i + 1).is_some() {
                    return *kind;
                }
            }
        }
        TokenKind::Illegal
    }
}

static ALPHA: Lazy<Classifier> = Lazy::new(|| {
    Classifier::new(&[
        (r"(?i)true|false", TokenKind::Bool),
        (r"(?i)and", TokenKind::And),
        (r"(?i)or", TokenKind::Or),
        (r"(?i)not", TokenKind::Not),
        (r"(?i)exists", TokenKind::Exists),
        (r"(?i)null", TokenKind::Null),
        (r"[\p{L}\p{N}_-]+", TokenKind::Ident),
    ])
});

static NUMERIC: Lazy<Classifier> = Lazy::new(|| {
    Classifier::new(&[
        (r"-?\d+(?i:kb|mb|gb)?", TokenKind::Int),
        (r"-?\d*\.\d+(?i:kb|mb|gb)?", TokenKind::Float),
        (r"(?:\d{1,3}\.){3}\d{1,3}(?:/\d{1,2})?", TokenKind::Net),
        (
            r"\d{4}-\d{2}-\d{2}(?:[Tt ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:[Zz]|[+-]\d{2}:\d{2}))?",
            TokenKind::Timestamp,
        ),
    ])
});

/// Classify a run starting with a letter or underscore.
pub(crate) fn classify_alpha(literal: &str) -> TokenKind {
    ALPHA.classify(literal)
}

/// Classify a run starting with a digit.
pub(crate) fn classify_numeric(literal: &str) -> TokenKind {
    NUMERIC.classify(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_keywords() {
        assert_eq!(classify_alpha("true"), TokenKind::Bool);
        assert_eq!(classify_alpha("FALSE"), TokenKind::Bool);
        assert_eq!(classify_alpha("and"), TokenKind::And);
        assert_eq!(classify_alpha("Or"), TokenKind::Or);
        assert_eq!(classify_alpha("NOT"), TokenKind::Not);
        assert_eq!(classify_alpha("exists"), TokenKind::Exists);
        assert_eq!(classify_alpha("null"), TokenKind::Null);
    }

    #[test]
    fn alpha_idents() {
        assert_eq!(classify_alpha("android"), TokenKind::Ident);
        assert_eq!(classify_alpha("nothing"), TokenKind::Ident);
        assert_eq!(classify_alpha("truely"), TokenKind::Ident);
        assert_eq!(classify_alpha("na-me"), TokenKind::Ident);
        assert_eq!(classify_alpha("_name"), TokenKind::Ident);
        assert_eq!(classify_alpha("größe"), TokenKind::Ident);
    }

    #[test]
    fn numeric_kinds() {
        assert_eq!(classify_numeric("42"), TokenKind::Int);
        assert_eq!(classify_numeric("2kb"), TokenKind::Int);
        assert_eq!(classify_numeric("10MB"), TokenKind::Int);
        assert_eq!(classify_numeric("1.4"), TokenKind::Float);
        assert_eq!(classify_numeric(".5"), TokenKind::Float);
        assert_eq!(classify_numeric("192.168.1.0"), TokenKind::Net);
        assert_eq!(classify_numeric("192.168.1.0/24"), TokenKind::Net);
        assert_eq!(classify_numeric("1979-10-03"), TokenKind::Timestamp);
        assert_eq!(
            classify_numeric("2021-06-08T20:56:33+00:00"),
            TokenKind::Timestamp
        );
        assert_eq!(
            classify_numeric("1985-04-12T23:20:50.52Z"),
            TokenKind::Timestamp
        );
        assert_eq!(classify_numeric("12foo"), TokenKind::Illegal);
        assert_eq!(classify_numeric("1.2.3"), TokenKind::Illegal);
    }
}
