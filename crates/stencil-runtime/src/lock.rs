use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::{collections::BTreeMap, sync::Arc};
use stencil_schema::member::LockMode;

///
/// LockTable
///
/// Locks owned by one instance, or by a class for static methods. Guards
/// are scoped to the closure, so release happens on every exit path.
///

#[derive(Debug, Default)]
pub struct LockTable {
    exclusive: ReentrantMutex<()>,
    shared: RwLock<()>,
    named: Mutex<BTreeMap<String, Arc<ReentrantMutex<()>>>>,
}

impl LockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` under the implicit lock in the given mode.
    pub fn with<R>(&self, mode: LockMode, f: impl FnOnce() -> R) -> R {
        match mode {
            LockMode::Exclusive => {
                let _guard = self.exclusive.lock();
                f()
            }
            // readers may nest on the same thread
            LockMode::Read => {
                let _guard = self.shared.read_recursive();
                f()
            }
            LockMode::Write => {
                let _guard = self.shared.write();
                f()
            }
        }
    }

    /// Run `f` under the lock stored in field `name`.
    pub fn with_named<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let lock = Arc::clone(self.named.lock().entry(name.to_string()).or_default());
        let _guard = lock.lock();

        f()
    }
}

///
/// TESTS
///
