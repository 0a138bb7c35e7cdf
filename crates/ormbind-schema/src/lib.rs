//! Declarative class metadata, the frozen metadata index, and the partition
//! of persistable classes into entity hierarchies.
//!
//! Nothing here binds descriptors; that is `ormbind-core`. This crate stops
//! once every persistable class sits in exactly one [`hierarchy::Hierarchy`].

pub mod error;
pub mod hierarchy;
pub mod index;
pub mod node;
pub mod types;

pub use error::{MappingError, MappingErrorKind};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        error::{MappingError, MappingErrorKind},
        hierarchy::{ClassRoles, Hierarchy, HierarchyMember, HierarchySet},
        index::{ClassSource, Index, IndexBuilder},
        node::*,
        types::*,
    };
}
