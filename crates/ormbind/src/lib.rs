//! ## Crate layout
//! - `schema`: declarative tags, class metadata, the metadata index and the
//!   hierarchy builder.
//! - `core`: binding contexts, domain nodes, the entity descriptor builder,
//!   table and cache resolution, global binders and the metamodel registry.
//! - `config`: [`BindingOptions`], read from TOML.
//! - `bootstrap`: the Index -> Hierarchies -> Bind -> Registry pipeline.
//!
//! Most callers only need [`bootstrap()`] and the `prelude`.

pub use ormbind_core as core;
pub use ormbind_schema as schema;

pub mod bootstrap;
pub mod config;
pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use bootstrap::{Bootstrap, bootstrap};
pub use config::{BindingOptions, ConfigError};
pub use error::Error;

///
/// Prelude
/// Metadata input, options and the resulting metamodel.
///

pub mod prelude {
    pub use crate::{
        Error,
        bootstrap::{Bootstrap, bootstrap},
        config::BindingOptions,
    };
    pub use ormbind_core::prelude::*;
    pub use ormbind_schema::prelude::*;
}
