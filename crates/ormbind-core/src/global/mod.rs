//! Module: global
//! Responsibility: unit-wide definitions declared on packages and classes
//! (type definitions, identifier generators, named queries, filters).
//! Does not own: entity binding; these binders run after every hierarchy is
//! bound and only read the index.
//!
//! Every definition name is unique within its kind. Packages are scanned
//! before classes, both in name order, so the first declarer is stable.

mod filter;
mod generator;
mod query;
mod type_def;


pub use filter::*;
pub use generator::*;
pub use query::*;
pub use type_def::*;

use crate::context::BindingContext;
use ormbind_schema::{MappingError, index::Index, node::Tag};
use std::collections::{BTreeMap, btree_map::Entry};

///
/// GlobalBinder
///

pub trait GlobalBinder: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    fn bind(
        &self,
        ctx: &BindingContext<'_>,
        metadata: &mut GlobalMetadata,
    ) -> Result<(), MappingError>;
}

/// The four standard binders, in the order they run.
#[must_use]
pub fn default_binders() -> Vec<Box<dyn GlobalBinder>> {
    vec![
        Box::new(TypeDefBinder),
        Box::new(GeneratorBinder),
        Box::new(NamedQueryBinder),
        Box::new(FilterDefBinder),
    ]
}

///
/// Registered
/// A definition together with the package or class that declared it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Registered<T> {
    pub declared_by: String,
    pub value: T,
}

///
/// GlobalMetadata
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalMetadata {
    pub type_defs: BTreeMap<String, Registered<TypeDefinition>>,
    pub generators: BTreeMap<String, Registered<IdGenerator>>,
    pub named_queries: BTreeMap<String, Registered<NamedQuery>>,
    pub filter_defs: BTreeMap<String, Registered<FilterDefinition>>,
}

impl GlobalMetadata {
    #[must_use]
    pub fn type_def(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_defs.get(name).map(|entry| &entry.value)
    }

    #[must_use]
    pub fn generator(&self, name: &str) -> Option<&IdGenerator> {
        self.generators.get(name).map(|entry| &entry.value)
    }

    #[must_use]
    pub fn named_query(&self, name: &str) -> Option<&NamedQuery> {
        self.named_queries.get(name).map(|entry| &entry.value)
    }

    #[must_use]
    pub fn filter_def(&self, name: &str) -> Option<&FilterDefinition> {
        self.filter_defs.get(name).map(|entry| &entry.value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_defs.is_empty()
            && self.generators.is_empty()
            && self.named_queries.is_empty()
            && self.filter_defs.is_empty()
    }
}

// Insert a named definition; a second declaration of the name is an error
// naming both declarers.
fn register<T>(
    map: &mut BTreeMap<String, Registered<T>>,
    what: &str,
    name: &str,
    declared_by: &str,
    value: T,
) -> Result<(), MappingError> {
    match map.entry(name.to_string()) {
        Entry::Occupied(existing) => Err(MappingError::configuration(
            declared_by,
            format!(
                "{what} '{name}' is already declared by '{}'",
                existing.get().declared_by
            ),
        )),
        Entry::Vacant(slot) => {
            slot.insert(Registered {
                declared_by: declared_by.to_string(),
                value,
            });
            Ok(())
        }
    }
}

// Every (declarer, tag) pair of the index, packages first.
fn declared_tags(index: &Index) -> impl Iterator<Item = (&str, &Tag)> {
    let packages = index.packages().flat_map(|package| {
        package
            .tags
            .iter()
            .map(move |declared| (package.name.as_str(), &declared.tag))
    });
    let classes = index.classes().flat_map(|class| {
        class
            .tags
            .iter()
            .map(move |declared| (class.name.as_str(), &declared.tag))
    });

    packages.chain(classes)
}
