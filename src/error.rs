use thiserror::Error;

/// Errors surfaced by compilation and by the matching entry points.
///
/// Ordinary match failure is never an error; it is reported as `None` or as an
/// unsuccessful [`MatchOutcome`](crate::MatchOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("invalid quantifier {{{min},{max}}}: minimum exceeds maximum")]
    InvalidQuantifier { min: usize, max: usize },

    #[error("invalid region {start}..{end} for input of length {len}")]
    InvalidRegion { start: usize, end: usize, len: usize },

    /// A match position was requested from a matcher with no current match.
    #[error("no match available")]
    NoMatch,

    #[error("backtracking step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    #[error("backtracking depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Error {
        Error::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Returns true if the error came from a backtracking limit rather than
    /// from the pattern or the caller.
    pub fn is_limit(&self) -> bool {
        matches!(self, Error::StepLimitExceeded(_) | Error::DepthLimitExceeded(_))
    }
}
