//! Module: bootstrap
//! Responsibility: run one metamodel build end to end.
//! Does not own: indexing (the caller hands over a frozen `Index`) or any
//! file I/O.
//! Boundary: Index -> HierarchySet -> bind each hierarchy -> registry ->
//! global binders -> frozen `Metamodel` with generated identifiers linked.
//!
//! Invariants:
//! - The first error aborts the whole build; no partial metamodel escapes.
//! - Each bootstrap owns its registry, so independent builds can run side
//!   by side in one process.

use crate::{
    Error,
    config::{BindingOptions, ConfigError},
};
use ormbind_core::{
    bind::bind_hierarchy,
    context::BindingContext,
    global::{GlobalBinder, GlobalMetadata, default_binders},
    registry::{Metamodel, MetamodelRegistry},
};
use ormbind_schema::{
    MappingError,
    hierarchy::{Hierarchy, build_hierarchies},
    index::Index,
};
use rayon::prelude::*;
use tracing::debug;

/// Build the metamodel for `index` with `options`.
pub fn bootstrap(index: &Index, options: &BindingOptions) -> Result<Metamodel, Error> {
    Bootstrap::new(index, options.clone()).run()
}

///
/// Bootstrap
///
/// One metamodel build. Global binders default to the standard four when
/// `global_binders` is enabled; extra binders run after them in the order
/// they were added.
///

pub struct Bootstrap<'a> {
    index: &'a Index,
    options: BindingOptions,
    binders: Vec<Box<dyn GlobalBinder>>,
}

impl<'a> Bootstrap<'a> {
    #[must_use]
    pub fn new(index: &'a Index, options: BindingOptions) -> Self {
        let binders = if options.global_binders {
            default_binders()
        } else {
            Vec::new()
        };

        Self {
            index,
            options,
            binders,
        }
    }

    /// Read the options from a TOML document.
    pub fn from_toml(index: &'a Index, source: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(index, BindingOptions::from_toml_str(source)?))
    }

    #[must_use]
    pub fn binder(mut self, binder: impl GlobalBinder + 'static) -> Self {
        self.binders.push(Box::new(binder));
        self
    }

    #[must_use]
    pub const fn options(&self) -> &BindingOptions {
        &self.options
    }

    pub fn run(self) -> Result<Metamodel, Error> {
        let ctx = BindingContext::root(
            self.index,
            &self.options.defaults,
            self.options.shared_cache_mode,
        );

        let hierarchies = build_hierarchies(self.index)?;
        debug!(
            classes = self.index.len(),
            hierarchies = hierarchies.len(),
            parallel = self.options.parallel,
            "hierarchies built"
        );

        let registry = MetamodelRegistry::new();
        if self.options.parallel {
            hierarchies
                .as_slice()
                .par_iter()
                .try_for_each(|hierarchy| bind_into(hierarchy, &ctx, &registry))?;
        } else {
            for hierarchy in hierarchies.iter() {
                bind_into(hierarchy, &ctx, &registry)?;
            }
        }

        let mut global = GlobalMetadata::default();
        for binder in &self.binders {
            binder.bind(&ctx, &mut global)?;
            debug!(binder = binder.name(), "global binder finished");
        }

        Ok(registry.freeze(global)?)
    }
}

fn bind_into(
    hierarchy: &Hierarchy,
    ctx: &BindingContext<'_>,
    registry: &MetamodelRegistry,
) -> Result<(), MappingError> {
    let bound = bind_hierarchy(hierarchy, ctx)?;

    registry.register(bound)
}
