use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// ClassRole
///
/// The declarative role a class plays, resolved once from its tags during
/// hierarchy classification and carried by the hierarchy from then on.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ClassRole {
    Embeddable,
    Entity,
    MappedSuperclass,
    Plain,
}

impl ClassRole {
    /// Entity and mapped-superclass classes take part in entity hierarchies.
    #[must_use]
    pub const fn is_persistable(self) -> bool {
        matches!(self, Self::Entity | Self::MappedSuperclass)
    }
}

///
/// AccessMode
/// Second-level cache concurrency access mode.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[remain::sorted]
pub enum AccessMode {
    #[display("nonstrict-read-write")]
    NonstrictReadWrite,
    #[display("read-only")]
    ReadOnly,
    #[default]
    #[display("read-write")]
    ReadWrite,
    #[display("transactional")]
    Transactional,
}

///
/// SharedCacheMode
///
/// Unit-wide switch deciding which entities are cached when no explicit
/// cache declaration is present.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[remain::sorted]
pub enum SharedCacheMode {
    #[display("ALL")]
    All,
    #[display("DISABLE_SELECTIVE")]
    DisableSelective,
    #[display("ENABLE_SELECTIVE")]
    EnableSelective,
    #[display("NONE")]
    None,
    #[default]
    #[display("UNSPECIFIED")]
    Unspecified,
}

impl SharedCacheMode {
    /// Decide whether an entity without an explicit cache declaration is
    /// cached. `cacheable` is the value of the cacheable marker, `None` when
    /// the marker is absent.
    #[must_use]
    pub const fn caches(self, cacheable: Option<bool>) -> bool {
        match self {
            Self::All => true,
            Self::EnableSelective => matches!(cacheable, Some(true) | None),
            Self::DisableSelective => !matches!(cacheable, Some(false)),
            Self::None | Self::Unspecified => false,
        }
    }
}

///
/// InheritanceType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum InheritanceType {
    Joined,
    #[default]
    SingleTable,
    TablePerClass,
}

impl InheritanceType {
    /// Whether a non-root entity under this strategy owns its own table.
    #[must_use]
    pub const fn subclass_owns_table(self) -> bool {
        !matches!(self, Self::SingleTable)
    }
}

///
/// OptimisticLockStyle
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum OptimisticLockStyle {
    All,
    Dirty,
    None,
    #[default]
    Version,
}

///
/// PolymorphismType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum PolymorphismType {
    Explicit,
    #[default]
    Implicit,
}

///
/// ResultCheckStyle
/// How the row count of a custom write statement is verified.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum ResultCheckStyle {
    Count,
    None,
    Param,
}

///
/// AccessType
/// Whether persistent state is read through fields or through properties.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum AccessType {
    #[default]
    #[display("field")]
    Field,
    #[display("property")]
    Property,
}

///
/// MemberKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum MemberKind {
    #[default]
    Field,
    Property,
}

impl MemberKind {
    /// The access type implied by placing an identifier on this kind of member.
    #[must_use]
    pub const fn access(self) -> AccessType {
        match self {
            Self::Field => AccessType::Field,
            Self::Property => AccessType::Property,
        }
    }
}

///
/// GenerationType
/// How an identifier value is produced when a member asks for one.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum GenerationType {
    #[default]
    #[display("auto")]
    Auto,
    #[display("identity")]
    Identity,
    #[display("sequence")]
    Sequence,
    #[display("table")]
    Table,
}

impl GenerationType {
    /// Strategy name of the generator synthesized when no named generator is
    /// referenced.
    #[must_use]
    pub const fn strategy_name(self) -> &'static str {
        match self {
            Self::Auto => "native",
            Self::Identity => "identity",
            Self::Sequence => "sequence",
            Self::Table => "table",
        }
    }

    /// Whether a named generator with `strategy` can serve this request.
    /// `Auto` leaves the choice to the generator.
    #[must_use]
    pub fn accepts(self, strategy: &str) -> bool {
        self == Self::Auto || self.strategy_name() == strategy
    }
}
