//! ## Crate layout
//! - `schema`: the class model, generated member IR and diagnostics.
//! - `core`: directive registry, generators, conflict resolution and the
//!   [`Engine`](core::engine::Engine).
//! - `runtime`: lazy slots, locks, scoped release, failures and the
//!   interpreter that runs generated members.
//!
//! The `prelude` module covers what a front-end needs to build a class,
//! process it and run the result.

pub use stencil_core as core;
pub use stencil_runtime as runtime;
pub use stencil_schema as schema;

use log::debug;
use stencil_core::{config::ConfigError, engine::Engine};
use stencil_schema::{node::ClassSpec, result::EmissionResult};
use std::path::Path;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process one class with the built-in catalog and default configuration.
#[must_use]
pub fn process(class: &ClassSpec) -> EmissionResult {
    Engine::new().process(class)
}

/// Engine configured from a `stencil.toml` file.
pub fn engine_from_file(path: impl AsRef<Path>) -> Result<Engine, ConfigError> {
    let path = path.as_ref();
    let config = stencil_core::config::EngineConfig::load(path)?;
    debug!("stencil: loaded config from {}", path.display());

    Ok(Engine::new().with_config(config))
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::runtime::prelude::*;
}
