//! Binding core for ormbind: layered binding contexts, domain nodes and
//! entity descriptors, the entity descriptor builder, table and caching
//! resolution, global metadata binders and the metamodel registry.
//!
//! Everything here consumes a frozen [`ormbind_schema::index::Index`] and a
//! [`ormbind_schema::hierarchy::HierarchySet`]; nothing performs I/O.

pub mod bind;
pub mod cache;
pub mod context;
pub mod declaration;
pub mod global;
pub mod node;
pub mod registry;
pub mod table;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use ormbind_schema::{MappingError, MappingErrorKind};

///
/// Prelude
///
/// Domain vocabulary only; binders and registries are reached through their
/// modules.
///

pub mod prelude {
    pub use crate::{
        bind::BoundHierarchy,
        cache::CachingPolicy,
        context::{BindingContext, MappingDefaults},
        global::{GlobalBinder, GlobalMetadata, IdGenerator},
        node::{
            Attribute, AttributeRole, CustomSql, DomainNode, EntityDescriptor, EntityKind,
            EntityNode, GeneratedId, IdType, NonEntityNode, RootEntityDescriptor,
            SubclassDescriptor, SuperclassNode,
        },
        registry::{Metamodel, MetamodelRegistry},
        table::{TableDescriptor, UniqueConstraint},
    };
}
