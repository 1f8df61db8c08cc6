use crate::error::{Failure, RuntimeError};

///
/// Suppress
///
/// Attach a secondary failure to the one already propagating.
///

pub trait Suppress {
    fn suppress(&mut self, other: Self);
}

impl Suppress for Failure {
    fn suppress(&mut self, other: Self) {
        self.add_suppressed(other);
    }
}

// a primary that is not a thrown failure is turned into one, so it has
// somewhere to keep the secondary
impl Suppress for RuntimeError {
    fn suppress(&mut self, other: Self) {
        let secondary = other.into_failure();

        if let Self::Failure(primary) = self {
            primary.add_suppressed(secondary);
        } else {
            let mut primary = Failure::new(Failure::INTERNAL, self.to_string());
            primary.add_suppressed(secondary);
            *self = Self::Failure(primary);
        }
    }
}

/// Run `body` with an acquired resource, then `release` it exactly once.
///
/// A release failure after a normal exit propagates; during a propagating
/// failure it is attached to that failure as suppressed.
pub fn run_scoped<T, R, E>(
    resource: T,
    body: impl FnOnce(&T) -> Result<R, E>,
    release: impl FnOnce(T) -> Result<(), E>,
) -> Result<R, E>
where
    E: Suppress,
{
    let out = body(&resource);
    let released = release(resource);

    match (out, released) {
        (Ok(v), Ok(())) => Ok(v),
        (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(mut e), Err(r)) => {
            e.suppress(r);
            Err(e)
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn release_runs_once_on_success() {
        let released = Cell::new(0);

        let out: Result<u8, Failure> = run_scoped(
            "file",
            |_| Ok(5),
            |_| {
                released.set(released.get() + 1);
                Ok(())
            },
        );

        assert_eq!(out.ok(), Some(5));
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn release_failure_is_suppressed_under_body_failure() {
        let body_failure = Failure::new("IOException", "read");
        let id = body_failure.id();

        let out: Result<(), Failure> = run_scoped(
            (),
            |()| Err(body_failure),
            |()| Err(Failure::new("IOException", "close")),
        );

        let err = out.unwrap_err();
        assert_eq!(err.id(), id);
        assert_eq!(err.suppressed().len(), 1);
        assert_eq!(err.suppressed()[0].message(), "close");
    }

    #[test]
    fn release_failure_survives_an_interpreter_error() {
        let out: Result<(), RuntimeError> = run_scoped(
            (),
            |()| Err(RuntimeError::Unbound("x".to_string())),
            |()| Err(Failure::new("IOException", "close").into()),
        );

        let err = out.unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.kind(), Failure::INTERNAL);
        assert_eq!(failure.message(), "unbound name 'x'");
        assert_eq!(failure.suppressed().len(), 1);
        assert_eq!(failure.suppressed()[0].message(), "close");
    }

    #[test]
    fn interpreter_release_error_is_suppressed_under_body_failure() {
        let body_failure = Failure::new("IOException", "read");
        let id = body_failure.id();

        let out: Result<(), RuntimeError> = run_scoped(
            (),
            |()| Err(body_failure.into()),
            |()| {
                Err(RuntimeError::NoMethod {
                    class: "Stream".to_string(),
                    name: "close".to_string(),
                    arity: 0,
                })
            },
        );

        let err = out.unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.id(), id);
        assert_eq!(failure.suppressed()[0].kind(), Failure::INTERNAL);
    }

    #[test]
    fn release_failure_after_normal_exit_propagates() {
        let out: Result<(), Failure> =
            run_scoped((), |()| Ok(()), |()| Err(Failure::new("IOException", "close")));

        assert_eq!(out.unwrap_err().message(), "close");
    }
}
