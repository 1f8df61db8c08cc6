use crate::diagnostic::{ReasonCode, Severity};
use thiserror::Error as ThisError;

///
/// DirectiveError
///
/// Failure of a single directive. Reported as one diagnostic; it disables
/// that directive's output and nothing else.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DirectiveError {
    #[error("{0}")]
    Schema(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Consistency(String),

    #[error("{0}")]
    Coverage(String),

    #[error("{0}")]
    Ambiguity(String),

    /// The directive is meaningless where it stands; it is dropped with a
    /// warning instead of an error.
    #[error("{0}")]
    Ignored(String),
}

impl DirectiveError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    pub fn coverage(msg: impl Into<String>) -> Self {
        Self::Coverage(msg.into())
    }

    pub fn ambiguity(msg: impl Into<String>) -> Self {
        Self::Ambiguity(msg.into())
    }

    pub fn ignored(msg: impl Into<String>) -> Self {
        Self::Ignored(msg.into())
    }

    #[must_use]
    pub const fn code(&self) -> ReasonCode {
        match self {
            Self::Schema(_) => ReasonCode::Schema,
            Self::Conflict(_) => ReasonCode::Conflict,
            Self::Consistency(_) | Self::Ignored(_) => ReasonCode::Consistency,
            Self::Coverage(_) => ReasonCode::Coverage,
            Self::Ambiguity(_) => ReasonCode::Ambiguity,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Ignored(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
