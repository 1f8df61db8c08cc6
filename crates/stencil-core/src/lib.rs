//! Directive registry, generators, conflict resolution and assembly.
//!
//! [`Engine::process`](engine::Engine::process) is the entry point: it takes
//! an immutable [`ClassSpec`](stencil_schema::node::ClassSpec) and returns an
//! [`EmissionResult`](stencil_schema::result::EmissionResult).

pub mod assemble;
pub mod config;
pub mod directive_kind;
pub mod engine;
pub mod imp;
pub mod naming;
pub mod registry;
pub mod resolve;
pub mod view;

pub use stencil_schema as schema;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::{AccessorConfig, BuilderConfig, ConfigError, EngineConfig},
        directive_kind::DirectiveKind,
        engine::Engine,
        registry::{Directive, DirectiveSchema, ParamSchema, ParamType, Registry, SchemaError},
    };
    pub use stencil_schema::prelude::*;
}
