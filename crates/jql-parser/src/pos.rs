use serde::Serialize;

/// A source position within a query string.
///
/// Every token and every diagnostic carries one of these, so downstream
/// formatters can index into the original query by offset instead of
/// re-tokenizing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pos {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, counted in characters.
    pub column: u32,
    /// 0-based byte offset into the query, or `-1` for [`Pos::NONE`].
    pub offset: i64,
    /// Length of the covered span in bytes.
    pub length: u32,
}

impl Pos {
    /// The "no position" sentinel used for diagnostics without a source
    /// span. Renderers should skip the caret indicator for these.
    pub const NONE: Pos = Pos {
        line: 0,
        column: 0,
        offset: -1,
        length: 0,
    };

    pub fn new(line: u32, column: u32, offset: i64, length: u32) -> Self {
        Self {
            line,
            column,
            offset,
            length,
        }
    }

    /// Whether this is the [`Pos::NONE`] sentinel.
    pub fn is_none(&self) -> bool {
        self.offset < 0
    }
}

impl Default for Pos {
    fn default() -> Self {
        Pos::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel() {
        assert!(Pos::NONE.is_none());
        assert!(!Pos::new(1, 1, 0, 3).is_none());
    }

    #[test]
    fn wire_form() {
        let pos = Pos::new(2, 5, 14, 3);
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(
            json,
            r#"{"line":2,"column":5,"offset":14,"length":3}"#
        );
    }
}
