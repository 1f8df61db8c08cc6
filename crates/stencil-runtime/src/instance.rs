use crate::{error::RuntimeError, lazy::LazySlot, lock::LockTable, value::Value};
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

///
/// Instance
///
/// One live object: its field values, lazy slots and lock table. Shared
/// between threads behind an `Arc`.
///

pub struct Instance {
    id: u64,
    class: String,
    fields: RwLock<BTreeMap<String, Value>>,
    lazy: BTreeMap<String, LazySlot<Value>>,
    locks: LockTable,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl Instance {
    pub fn new(
        class: impl Into<String>,
        fields: BTreeMap<String, Value>,
        lazy: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            class: class.into(),
            fields: RwLock::new(fields),
            lazy: lazy.into_iter().map(|name| (name, LazySlot::new())).collect(),
            locks: LockTable::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub const fn locks(&self) -> &LockTable {
        &self.locks
    }

    #[must_use]
    pub fn lazy(&self, field: &str) -> Option<&LazySlot<Value>> {
        self.lazy.get(field)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields.read().get(field).cloned()
    }

    pub fn field(&self, field: &str) -> Result<Value, RuntimeError> {
        self.get(field)
            .ok_or_else(|| RuntimeError::Unbound(format!("{}.{field}", self.class)))
    }

    pub fn set(&self, field: &str, value: Value) {
        self.fields.write().insert(field.to_string(), value);
    }

    /// Mutate a field in place under the write lock.
    pub fn update<R>(&self, field: &str, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut fields = self.fields.write();

        f(fields.entry(field.to_string()).or_insert(Value::Null))
    }
}
