use crate::{cache::CachingPolicy, table::TableDescriptor};
use derive_more::Display;
use ormbind_schema::{
    node::CustomSqlTag,
    types::{GenerationType, InheritanceType, OptimisticLockStyle, ResultCheckStyle},
};
use std::collections::BTreeSet;

///
/// EntityDescriptor
///
/// Fully resolved, entity-level behaviour shared by root and non-root
/// entities. Root-only state lives in [`RootEntityDescriptor`].
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityDescriptor {
    /// Fully qualified class name; the registry key.
    pub entity_name: String,

    /// Name used by queries: explicit entity name, else the simple class name.
    pub public_name: String,

    /// Strategy declared on the root of the family.
    pub inheritance: InheritanceType,
    pub lazy: bool,
    pub proxy: Option<String>,
    pub persister: Option<String>,
    pub tuplizer: Option<String>,
    pub batch_size: Option<u32>,
    pub dynamic_insert: bool,
    pub dynamic_update: bool,
    pub select_before_update: bool,
    pub custom_insert: Option<CustomSql>,
    pub custom_update: Option<CustomSql>,
    pub custom_delete: Option<CustomSql>,
    pub custom_loader: Option<String>,
    pub synchronized_tables: BTreeSet<String>,
    pub discriminator_value: Option<String>,
    pub kind: EntityKind,
}

impl EntityDescriptor {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self.kind, EntityKind::Root(_))
    }

    #[must_use]
    pub const fn as_root(&self) -> Option<&RootEntityDescriptor> {
        match &self.kind {
            EntityKind::Root(root) => Some(root),
            EntityKind::Subclass(_) => None,
        }
    }

    #[must_use]
    pub const fn as_subclass(&self) -> Option<&SubclassDescriptor> {
        match &self.kind {
            EntityKind::Subclass(subclass) => Some(subclass),
            EntityKind::Root(_) => None,
        }
    }

    /// Entity name of the root of this entity's family.
    #[must_use]
    pub fn root_entity_name(&self) -> &str {
        match &self.kind {
            EntityKind::Root(_) => &self.entity_name,
            EntityKind::Subclass(subclass) => &subclass.root_entity,
        }
    }

    /// The table this entity owns, if it owns one.
    #[must_use]
    pub const fn table(&self) -> Option<&TableDescriptor> {
        match &self.kind {
            EntityKind::Root(root) => Some(&root.table),
            EntityKind::Subclass(subclass) => subclass.table.as_ref(),
        }
    }
}

///
/// EntityKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Root(RootEntityDescriptor),
    Subclass(SubclassDescriptor),
}

///
/// RootEntityDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RootEntityDescriptor {
    pub mutable: bool,
    pub explicit_polymorphism: bool,
    pub where_clause: Option<String>,
    pub row_id: Option<String>,
    pub caching: Option<CachingPolicy>,
    pub optimistic_lock: OptimisticLockStyle,
    pub table: TableDescriptor,
    pub id_type: IdType,
    pub generated_id: Option<GeneratedId>,
    pub discriminator_column: Option<String>,
}

///
/// SubclassDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubclassDescriptor {
    pub root_entity: String,

    /// Own table under joined and table-per-class inheritance; single-table
    /// subclasses share the root's.
    pub table: Option<TableDescriptor>,
}

///
/// IdType
/// Shape of an entity's identifier.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum IdType {
    Composite,
    Embedded,
    #[default]
    None,
    Simple,
}

///
/// GeneratedId
///
/// Request for a generated identifier value. A named generator is checked
/// against the unit's generators when the metamodel is frozen.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedId {
    pub member: String,
    pub strategy: GenerationType,
    pub generator: Option<String>,
}

///
/// CustomSql
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CustomSql {
    pub sql: String,
    pub callable: bool,
    pub check: ResultCheckStyle,
}

impl From<&CustomSqlTag> for CustomSql {
    fn from(tag: &CustomSqlTag) -> Self {
        let fallback = if tag.callable {
            ResultCheckStyle::None
        } else {
            ResultCheckStyle::Count
        };

        Self {
            sql: tag.sql.clone(),
            callable: tag.callable,
            check: tag.check.unwrap_or(fallback),
        }
    }
}
