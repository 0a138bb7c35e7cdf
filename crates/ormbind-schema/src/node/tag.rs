use crate::types::{
    AccessMode, AccessType, GenerationType, InheritanceType, OptimisticLockStyle,
    PolymorphismType, ResultCheckStyle,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// DeclarationSource
///
/// Where a tag was declared. Tags merged from an external mapping definition
/// are more specific than tags written on the class itself.
///

#[derive(Clone, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationSource {
    #[default]
    #[display("annotation")]
    Annotation,
    #[display("mapping file '{_0}'")]
    MappingFile(String),
}

impl DeclarationSource {
    #[must_use]
    pub const fn specificity(&self) -> u8 {
        match self {
            Self::Annotation => 0,
            Self::MappingFile(_) => 1,
        }
    }
}

///
/// DeclaredTag
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeclaredTag {
    pub tag: Tag,

    #[serde(default)]
    pub source: DeclarationSource,
}

impl DeclaredTag {
    #[must_use]
    pub const fn new(tag: Tag, source: DeclarationSource) -> Self {
        Self { tag, source }
    }
}

///
/// Tag
///
/// Class- and package-level declarative metadata, already extracted by the
/// indexing collaborator.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum Tag {
    Access {
        access: AccessType,
    },
    BatchSize {
        size: u32,
    },
    Cache(CacheTag),
    Cacheable {
        #[serde(default = "default_true")]
        value: bool,
    },
    Check {
        constraint: String,
    },
    Defaults(DefaultsTag),
    DiscriminatorColumn {
        name: String,
    },
    DiscriminatorValue {
        value: String,
    },
    Embeddable,
    Entity(EntityTag),
    EntityOptions(EntityOptionsTag),
    FilterDef(FilterDefTag),
    GenericGenerator(GeneratorTag),
    Immutable,
    Inheritance {
        strategy: InheritanceType,
    },
    Loader {
        named_query: String,
    },
    MappedSuperclass,
    NamedNativeQuery(NamedQueryTag),
    NamedQuery(NamedQueryTag),
    Persister {
        implementation: String,
    },
    Proxy(ProxyTag),
    RowId {
        column: String,
    },
    SequenceGenerator(SequenceGeneratorTag),
    SqlDelete(CustomSqlTag),
    SqlDeleteAll(CustomSqlTag),
    SqlInsert(CustomSqlTag),
    SqlUpdate(CustomSqlTag),
    Synchronize {
        tables: Vec<String>,
    },
    Table(TableTag),
    Tuplizer {
        implementation: String,
    },
    TypeDef(TypeDefTag),
    Where {
        clause: String,
    },
}

const fn default_true() -> bool {
    true
}

impl Tag {
    #[must_use]
    pub const fn kind(&self) -> TagKind {
        match self {
            Self::Access { .. } => TagKind::Access,
            Self::BatchSize { .. } => TagKind::BatchSize,
            Self::Cache(_) => TagKind::Cache,
            Self::Cacheable { .. } => TagKind::Cacheable,
            Self::Check { .. } => TagKind::Check,
            Self::Defaults(_) => TagKind::Defaults,
            Self::DiscriminatorColumn { .. } => TagKind::DiscriminatorColumn,
            Self::DiscriminatorValue { .. } => TagKind::DiscriminatorValue,
            Self::Embeddable => TagKind::Embeddable,
            Self::Entity(_) => TagKind::Entity,
            Self::EntityOptions(_) => TagKind::EntityOptions,
            Self::FilterDef(_) => TagKind::FilterDef,
            Self::GenericGenerator(_) => TagKind::GenericGenerator,
            Self::Immutable => TagKind::Immutable,
            Self::Inheritance { .. } => TagKind::Inheritance,
            Self::Loader { .. } => TagKind::Loader,
            Self::MappedSuperclass => TagKind::MappedSuperclass,
            Self::NamedNativeQuery(_) => TagKind::NamedNativeQuery,
            Self::NamedQuery(_) => TagKind::NamedQuery,
            Self::Persister { .. } => TagKind::Persister,
            Self::Proxy(_) => TagKind::Proxy,
            Self::RowId { .. } => TagKind::RowId,
            Self::SequenceGenerator(_) => TagKind::SequenceGenerator,
            Self::SqlDelete(_) => TagKind::SqlDelete,
            Self::SqlDeleteAll(_) => TagKind::SqlDeleteAll,
            Self::SqlInsert(_) => TagKind::SqlInsert,
            Self::SqlUpdate(_) => TagKind::SqlUpdate,
            Self::Synchronize { .. } => TagKind::Synchronize,
            Self::Table(_) => TagKind::Table,
            Self::Tuplizer { .. } => TagKind::Tuplizer,
            Self::TypeDef(_) => TagKind::TypeDef,
            Self::Where { .. } => TagKind::Where,
        }
    }

    #[must_use]
    pub fn entity() -> Self {
        Self::Entity(EntityTag::default())
    }

    #[must_use]
    pub fn entity_named(name: impl Into<String>) -> Self {
        Self::Entity(EntityTag {
            name: Some(name.into()),
        })
    }

    #[must_use]
    pub const fn cacheable(value: bool) -> Self {
        Self::Cacheable { value }
    }
}

///
/// TagKind
/// Fieldless discriminant of [`Tag`], used for lookups and diagnostics.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum TagKind {
    Access,
    BatchSize,
    Cache,
    Cacheable,
    Check,
    Defaults,
    DiscriminatorColumn,
    DiscriminatorValue,
    Embeddable,
    Entity,
    EntityOptions,
    FilterDef,
    GenericGenerator,
    Immutable,
    Inheritance,
    Loader,
    MappedSuperclass,
    NamedNativeQuery,
    NamedQuery,
    Persister,
    Proxy,
    RowId,
    SequenceGenerator,
    SqlDelete,
    SqlDeleteAll,
    SqlInsert,
    SqlUpdate,
    Synchronize,
    Table,
    Tuplizer,
    TypeDef,
    Where,
}

///
/// EntityTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityTag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

///
/// EntityOptionsTag
/// Vendor entity options; every unset value falls back to its default.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EntityOptionsTag {
    pub mutable: Option<bool>,
    pub dynamic_insert: Option<bool>,
    pub dynamic_update: Option<bool>,
    pub select_before_update: Option<bool>,
    pub polymorphism: Option<PolymorphismType>,
    pub optimistic_lock: Option<OptimisticLockStyle>,
    pub persister: Option<String>,
}

///
/// TableTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TableTag {
    pub schema: Option<String>,
    pub catalog: Option<String>,
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unique_constraints: Vec<UniqueConstraintTag>,
}

///
/// UniqueConstraintTag
///
/// Column set that must be unique within a table. Constraints sharing a
/// name are one constraint.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UniqueConstraintTag {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

///
/// CacheTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CacheTag {
    pub region: Option<String>,
    pub usage: Option<AccessMode>,

    /// `"all"` or `"non-lazy"`; absent means `"all"`.
    pub include: Option<String>,
}

///
/// ProxyTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ProxyTag {
    pub lazy: Option<bool>,
    pub proxy_class: Option<String>,
}

///
/// CustomSqlTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CustomSqlTag {
    pub sql: String,

    #[serde(default)]
    pub callable: bool,

    #[serde(default)]
    pub check: Option<ResultCheckStyle>,
}

///
/// DefaultsTag
///
/// Scoped mapping defaults declared on a package or a class. Anything left
/// unset falls through to the enclosing scope.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DefaultsTag {
    pub schema: Option<String>,
    pub catalog: Option<String>,
    pub access: Option<AccessType>,
    pub cascade: Option<String>,
    pub lazy_associations: Option<bool>,
    pub cache_access_mode: Option<AccessMode>,
    pub id_column_name: Option<String>,
    pub discriminator_column_name: Option<String>,
}

///
/// TypeDefTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDefTag {
    pub name: String,
    pub type_class: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

///
/// GeneratorTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GeneratorTag {
    pub name: String,
    pub strategy: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

///
/// SequenceGeneratorTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SequenceGeneratorTag {
    pub name: String,

    #[serde(default)]
    pub sequence_name: Option<String>,

    #[serde(default)]
    pub allocation_size: Option<u32>,
}

///
/// NamedQueryTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NamedQueryTag {
    pub name: String,
    pub query: String,
}

///
/// FilterDefTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterDefTag {
    pub name: String,

    #[serde(default)]
    pub default_condition: Option<String>,

    /// Parameter name to type name.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

///
/// MemberTag
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum MemberTag {
    Access { access: AccessType },
    EmbeddedId,
    GeneratedValue(GeneratedValueTag),
    Id,
    Transient,
    Version,
}

///
/// GeneratedValueTag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GeneratedValueTag {
    pub strategy: Option<GenerationType>,

    /// Name of a generator declared elsewhere in the unit.
    pub generator: Option<String>,
}
