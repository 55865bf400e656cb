use thiserror::Error;

/// Errors raised while reading query text.
///
/// Positions are byte offsets into the source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string literal starting at position {pos}")]
    UnterminatedString { pos: usize },

    #[error("expected {expected} at position {pos}, found '{found}'")]
    Unexpected {
        expected: &'static str,
        found: String,
        pos: usize,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unmatched ')' at position {pos}")]
    UnmatchedClose { pos: usize },

    #[error("{open} parenthesis scope(s) left open at end of condition list")]
    UnclosedScope { open: u32 },

    #[error("invalid LIMIT value '{value}' at position {pos}")]
    InvalidLimit { value: String, pos: usize },
}

/// Errors raised when a serialized chain breaks the chain invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClauseError {
    #[error("a where clause needs at least one condition")]
    Empty,

    #[error("condition {index} is missing the join operator to its successor")]
    MissingJoin { index: usize },

    #[error("condition {index} is the last one but carries a join operator")]
    TrailingJoin { index: usize },
}
