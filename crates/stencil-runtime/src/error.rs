use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error as ThisError;

static NEXT_FAILURE: AtomicU64 = AtomicU64::new(1);

///
/// Failure
///
/// A thrown failure as generated code sees it. Identity survives cloning,
/// so a failure that passes through a rethrow wrapper is still the same
/// failure.
///

#[derive(Clone, Debug, ThisError)]
#[error("{kind}: {message}")]
pub struct Failure {
    id: u64,
    kind: String,
    message: String,
    argument: Option<String>,
    cause: Option<Box<Failure>>,
    suppressed: Vec<Failure>,
}

impl Failure {
    pub const INVALID_ARGUMENT: &'static str = "InvalidArgument";
    pub const INTERNAL: &'static str = "InternalError";

    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: NEXT_FAILURE.fetch_add(1, Ordering::Relaxed),
            kind: kind.into(),
            message: message.into(),
            argument: None,
            cause: None,
            suppressed: Vec::new(),
        }
    }

    /// Null passed where a non-null value was required.
    pub fn invalid_argument(name: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            argument: Some(name.clone()),
            ..Self::new(
                Self::INVALID_ARGUMENT,
                format!("{name} is marked non-null but is null"),
            )
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: Self) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn add_suppressed(&mut self, other: Self) {
        self.suppressed.push(other);
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the offending argument, for invalid-argument failures.
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        self.cause.as_deref()
    }

    #[must_use]
    pub fn suppressed(&self) -> &[Self] {
        &self.suppressed
    }

    /// Same thrown object, not merely an equal one.
    #[must_use]
    pub const fn same(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

///
/// Reentrant
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("lazy value is already being initialized by this thread")]
pub struct Reentrant;

///
/// RuntimeError
///

#[derive(Debug, ThisError)]
pub enum RuntimeError {
    #[error(transparent)]
    Failure(#[from] Failure),

    #[error("'{class}' has no method '{name}' taking {arity} argument(s)")]
    NoMethod {
        class: String,
        name: String,
        arity: usize,
    },

    #[error("'{class}' has no constructor taking {arity} argument(s)")]
    NoConstructor { class: String, arity: usize },

    #[error("'{0}' needs a receiver")]
    NoReceiver(String),

    #[error(transparent)]
    Reentrant(#[from] Reentrant),

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unbound name '{0}'")]
    Unbound(String),

    #[error("class '{0}' is not loaded")]
    UnknownClass(String),
}

impl RuntimeError {
    /// The thrown failure, when this error is one.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure(f) => Some(f),
            _ => None,
        }
    }

    /// This error as a thrown failure; interpreter errors become internal
    /// failures carrying their message.
    #[must_use]
    pub fn into_failure(self) -> Failure {
        match self {
            Self::Failure(f) => f,
            other => Failure::new(Failure::INTERNAL, other.to_string()),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_the_parameter() {
        let f = Failure::invalid_argument("name");

        assert_eq!(f.kind(), Failure::INVALID_ARGUMENT);
        assert_eq!(f.argument(), Some("name"));
        assert_eq!(f.message(), "name is marked non-null but is null");
    }

    #[test]
    fn identity_survives_clone_but_not_construction() {
        let a = Failure::new("IOException", "disk");
        let b = Failure::new("IOException", "disk");

        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
    }

    #[test]
    fn interpreter_errors_become_internal_failures() {
        let f = RuntimeError::Unbound("x".to_string()).into_failure();

        assert_eq!(f.kind(), Failure::INTERNAL);
        assert_eq!(f.message(), "unbound name 'x'");

        let thrown = Failure::new("IOException", "disk");
        let id = thrown.id();
        assert_eq!(RuntimeError::from(thrown).into_failure().id(), id);
    }
}
