//! Class model for the stencil synthesis engine.
//!
//! Everything in here is plain data: the class snapshot handed in by a
//! front-end, the directive invocations attached to it, the generated member
//! IR produced by the engine, and the diagnostics reported alongside.

pub mod diagnostic;
pub mod error;
pub mod expr;
pub mod member;
pub mod node;
pub mod result;
pub mod target;
pub mod types;

/// Maximum length for class, field and method identifiers.
pub const MAX_IDENT_LEN: usize = 255;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        diagnostic::{Diagnostic, ReasonCode, Severity},
        error::DirectiveError,
        expr::{Expr, Literal},
        member::{
            Compare, GeneratedMember, Instruction, LockMode, LockRef, MemberKind, Operand, Param,
            Priority, Section, Signature,
        },
        node::*,
        result::EmissionResult,
        target::{DirectiveRef, Target},
        types::{Access, TypeRef, Visibility},
    };
    pub use serde::{Deserialize, Serialize};
}
