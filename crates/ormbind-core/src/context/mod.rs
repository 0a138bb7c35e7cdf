//! Module: context
//! Responsibility: read-only default resolution threaded through binding.
//! Does not own: the metadata index (borrowed) or any descriptor state.
//! Boundary: binders read naming rules and defaults only through
//! [`BindingContext`]; overrides always create a new nested context.
//!
//! Scopes layer as `global -> package -> class`. A nested scope answers a
//! lookup from its own overrides when set and falls through to its parent
//! otherwise; the root scope answers from [`MappingDefaults`].


use crate::declaration::Declarations;
use ormbind_schema::{
    MappingError,
    index::Index,
    node::{ClassMetadata, DefaultsTag, Tag, TagKind},
    types::{AccessMode, AccessType, SharedCacheMode},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier column name used when nothing else is configured.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Discriminator column name used when nothing else is configured.
pub const DEFAULT_DISCRIMINATOR_COLUMN: &str = "DTYPE";

/// Cascade style used when nothing else is configured.
pub const DEFAULT_CASCADE: &str = "none";

///
/// MappingDefaults
///
/// Global default-mapping configuration, the outermost scope of every
/// binding context.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MappingDefaults {
    pub schema: Option<String>,
    pub catalog: Option<String>,
    pub id_column_name: String,
    pub discriminator_column_name: String,
    pub cascade: String,
    pub access: AccessType,
    pub lazy_associations: bool,
    pub cache_access_mode: AccessMode,
}

impl Default for MappingDefaults {
    fn default() -> Self {
        Self {
            schema: None,
            catalog: None,
            id_column_name: DEFAULT_ID_COLUMN.to_string(),
            discriminator_column_name: DEFAULT_DISCRIMINATOR_COLUMN.to_string(),
            cascade: DEFAULT_CASCADE.to_string(),
            access: AccessType::default(),
            lazy_associations: true,
            cache_access_mode: AccessMode::default(),
        }
    }
}

///
/// Scope
///

#[derive(Debug)]
enum Scope<'a> {
    Root(&'a MappingDefaults),
    Nested {
        parent: &'a BindingContext<'a>,
        name: String,
        overrides: DefaultsTag,
    },
}

///
/// BindingContext
///
/// Immutable, per-scope facade over naming rules, defaults and class
/// reference resolution. Cheap to nest; never mutated once built.
///

#[derive(Debug)]
pub struct BindingContext<'a> {
    index: &'a Index,
    shared_cache_mode: SharedCacheMode,
    scope: Scope<'a>,
}

impl<'a> BindingContext<'a> {
    /// The outermost context of one bootstrap.
    #[must_use]
    pub const fn root(
        index: &'a Index,
        defaults: &'a MappingDefaults,
        shared_cache_mode: SharedCacheMode,
    ) -> Self {
        Self {
            index,
            shared_cache_mode,
            scope: Scope::Root(defaults),
        }
    }

    /// Layer `overrides` atop this context.
    #[must_use]
    pub fn nested(&self, name: impl Into<String>, overrides: DefaultsTag) -> BindingContext<'_> {
        BindingContext {
            index: self.index,
            shared_cache_mode: self.shared_cache_mode,
            scope: Scope::Nested {
                parent: self,
                name: name.into(),
                overrides,
            },
        }
    }

    /// Nested context for the package `class` lives in, carrying the
    /// package's `Defaults` declaration when it has one.
    pub fn package_scope(&self, class: &ClassMetadata) -> Result<BindingContext<'_>, MappingError> {
        let package = self.index.package_of(class);
        let overrides = match package {
            Some(package) => defaults_of(Declarations::new(&package.name, &package.tags))?,
            None => DefaultsTag::default(),
        };
        let name = class.package().unwrap_or_default();

        Ok(self.nested(name, overrides))
    }

    /// Nested context for `class` itself.
    pub fn class_scope(&self, class: &ClassMetadata) -> Result<BindingContext<'_>, MappingError> {
        let overrides = defaults_of(Declarations::new(&class.name, &class.tags))?;

        Ok(self.nested(class.name.as_str(), overrides))
    }

    #[must_use]
    pub const fn index(&self) -> &'a Index {
        self.index
    }

    #[must_use]
    pub const fn shared_cache_mode(&self) -> SharedCacheMode {
        self.shared_cache_mode
    }

    /// Name of this scope; `None` for the global scope.
    #[must_use]
    pub fn scope_name(&self) -> Option<&str> {
        match &self.scope {
            Scope::Root(_) => None,
            Scope::Nested { name, .. } => Some(name.as_str()),
        }
    }

    /// Number of scopes above the global one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Scope::Nested { parent, .. } = &current.scope {
            depth += 1;
            current = *parent;
        }

        depth
    }

    /// The global defaults at the bottom of the scope stack.
    #[must_use]
    pub fn defaults(&self) -> &'a MappingDefaults {
        let mut current = self;
        loop {
            match &current.scope {
                Scope::Root(defaults) => return *defaults,
                Scope::Nested { parent, .. } => current = *parent,
            }
        }
    }

    #[must_use]
    pub fn default_schema(&self) -> Option<String> {
        self.lookup(|o| o.schema.clone().map(Some), |d| d.schema.clone())
    }

    #[must_use]
    pub fn default_catalog(&self) -> Option<String> {
        self.lookup(|o| o.catalog.clone().map(Some), |d| d.catalog.clone())
    }

    #[must_use]
    pub fn access(&self) -> AccessType {
        self.lookup(|o| o.access, |d| d.access)
    }

    #[must_use]
    pub fn cascade(&self) -> String {
        self.lookup(|o| o.cascade.clone(), |d| d.cascade.clone())
    }

    #[must_use]
    pub fn lazy_associations(&self) -> bool {
        self.lookup(|o| o.lazy_associations, |d| d.lazy_associations)
    }

    #[must_use]
    pub fn cache_access_mode(&self) -> AccessMode {
        self.lookup(|o| o.cache_access_mode, |d| d.cache_access_mode)
    }

    #[must_use]
    pub fn id_column_name(&self) -> String {
        self.lookup(|o| o.id_column_name.clone(), |d| d.id_column_name.clone())
    }

    #[must_use]
    pub fn discriminator_column_name(&self) -> String {
        self.lookup(
            |o| o.discriminator_column_name.clone(),
            |d| d.discriminator_column_name.clone(),
        )
    }

    /// Resolve a class reference made by `requester`. Unqualified names are
    /// also tried inside the requester's package.
    pub fn resolve_class(
        &self,
        name: &str,
        requester: &ClassMetadata,
    ) -> Result<&'a Arc<ClassMetadata>, MappingError> {
        if let Some(class) = self.index.get_class_info(name) {
            return Ok(class);
        }

        if !name.contains('.')
            && let Some(package) = requester.package()
            && let Some(class) = self.index.get_class_info(&format!("{package}.{name}"))
        {
            return Ok(class);
        }

        Err(MappingError::reference(name, &requester.name))
    }

    // Walk outwards until a scope answers.
    fn lookup<T>(
        &self,
        local: impl Fn(&DefaultsTag) -> Option<T>,
        global: impl FnOnce(&MappingDefaults) -> T,
    ) -> T {
        let mut current = self;
        loop {
            match &current.scope {
                Scope::Root(defaults) => return global(*defaults),
                Scope::Nested {
                    parent, overrides, ..
                } => {
                    if let Some(value) = local(overrides) {
                        return value;
                    }
                    current = *parent;
                }
            }
        }
    }
}

fn defaults_of(declarations: Declarations<'_>) -> Result<DefaultsTag, MappingError> {
    let defaults = declarations.pick(TagKind::Defaults, |tag| match tag {
        Tag::Defaults(defaults) => Some(defaults.clone()),
        _ => None,
    })?;

    Ok(defaults.unwrap_or_default())
}
