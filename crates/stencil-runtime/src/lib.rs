//! Run-time support for generated members.
//!
//! The primitives generated bodies rely on (lazy slots, class and named
//! locks, scoped release, failures and the hash policy) plus an
//! [`Interpreter`](eval::Interpreter) that executes the instruction
//! sequences of an [`EmissionResult`](stencil_schema::result::EmissionResult).

pub mod error;
pub mod eval;
pub mod hash;
pub mod host;
pub mod instance;
pub mod lazy;
pub mod lock;
pub mod scope;
pub mod value;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        error::{Failure, Reentrant, RuntimeError},
        eval::{Frame, Interpreter},
        host::{Bodies, Host},
        instance::Instance,
        lazy::LazySlot,
        lock::LockTable,
        scope::{Suppress, run_scoped},
        value::Value,
    };
}
