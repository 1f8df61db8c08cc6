use crate::error::Reentrant;
use parking_lot::{Condvar, Mutex};
use std::{
    fmt,
    sync::{
        OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, ThreadId},
};

///
/// State
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Uninitialized,
    Initializing(ThreadId),
    Ready,
}

///
/// LazySlot
///
/// Per-instance cache behind a lazy getter. The initializer runs at most
/// once; every other reader blocks until it finishes and then sees the same
/// value. A failed initializer leaves the slot empty for the next reader.
///

pub struct LazySlot<T> {
    ready: AtomicBool,
    value: OnceLock<T>,
    state: Mutex<State>,
    cond: Condvar,
}

impl<T> Default for LazySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazySlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySlot")
            .field("value", &self.value.get())
            .finish()
    }
}

impl<T> LazySlot<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            value: OnceLock::new(),
            state: Mutex::new(State::Uninitialized),
            cond: Condvar::new(),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    // finish
    // publish the outcome and wake every waiter
    fn finish(&self, next: State) {
        let mut state = self.state.lock();
        *state = next;
        if next == State::Ready {
            self.ready.store(true, Ordering::Release);
        }
        self.cond.notify_all();
    }
}

impl<T: Clone> LazySlot<T> {
    /// Cached value, if initialization already completed.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        if self.is_ready() {
            self.value.get().cloned()
        } else {
            None
        }
    }

    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Reentrant>,
    {
        if let Some(v) = self.get() {
            return Ok(v);
        }

        let me = thread::current().id();
        {
            let mut state = self.state.lock();
            loop {
                // re-check under the lock
                if let Some(v) = self.value.get() {
                    return Ok(v.clone());
                }
                match *state {
                    State::Initializing(owner) if owner == me => return Err(Reentrant.into()),
                    State::Initializing(_) => self.cond.wait(&mut state),
                    State::Uninitialized | State::Ready => break,
                }
            }
            *state = State::Initializing(me);
        }

        // resets the slot if init fails or unwinds
        let reset = ResetGuard { slot: self };
        let value = init()?;
        std::mem::forget(reset);

        let stored = self.value.get_or_init(|| value).clone();
        self.finish(State::Ready);

        Ok(stored)
    }
}

///
/// ResetGuard
///

struct ResetGuard<'a, T> {
    slot: &'a LazySlot<T>,
}

impl<T> Drop for ResetGuard<'_, T> {
    fn drop(&mut self) {
        self.slot.finish(State::Uninitialized);
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, PartialEq)]
    enum TestError {
        Boom,
        Reentrant,
    }

    impl From<Reentrant> for TestError {
        fn from(_: Reentrant) -> Self {
            Self::Reentrant
        }
    }

    #[test]
    fn initializer_runs_once_across_threads() {
        let slot = Arc::new(LazySlot::new());
        let calls = Arc::new(AtomicUsize::new(0));

        thread::scope(|s| {
            for _ in 0..16 {
                let slot = Arc::clone(&slot);
                let calls = Arc::clone(&calls);
                s.spawn(move || {
                    let v: Result<u64, TestError> = slot.get_or_try_init(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        Ok(42)
                    });
                    assert_eq!(v, Ok(42));
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(slot.get(), Some(42));
    }

    #[test]
    fn failure_leaves_the_slot_empty() {
        let slot = LazySlot::new();

        let first: Result<u8, _> = slot.get_or_try_init(|| Err(TestError::Boom));
        assert_eq!(first, Err(TestError::Boom));
        assert!(!slot.is_ready());

        let second: Result<u8, TestError> = slot.get_or_try_init(|| Ok(7));
        assert_eq!(second, Ok(7));
    }

    #[test]
    fn same_thread_recursion_is_reported() {
        let slot: LazySlot<u8> = LazySlot::new();

        let out = slot.get_or_try_init(|| slot.get_or_try_init(|| Ok(1)));
        assert_eq!(out, Err(TestError::Reentrant));
        assert!(!slot.is_ready());
    }

    #[test]
    fn none_is_cached_like_any_other_value() {
        let slot = LazySlot::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let v: Result<Option<u8>, TestError> = slot.get_or_try_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            });
            assert_eq!(v, Ok(None));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
