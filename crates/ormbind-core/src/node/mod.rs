//! Domain nodes produced by binding.
//!
//! Parent links form a tree. A merged ancestor is one node shared through
//! `Arc` by every chain below it, so identity comparison with
//! [`Arc::ptr_eq`] tells whether two entities really share an ancestor.

mod attribute;
mod descriptor;

pub use attribute::*;
pub use descriptor::*;

use derive_more::Display;
use ormbind_schema::types::AccessType;
use std::sync::Arc;

///
/// NodeKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum NodeKind {
    Entity,
    NonEntity,
    Superclass,
}

///
/// DomainNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DomainNode {
    Entity(EntityNode),
    NonEntity(NonEntityNode),
    Superclass(SuperclassNode),
}

impl DomainNode {
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Entity(_) => NodeKind::Entity,
            Self::NonEntity(_) => NodeKind::NonEntity,
            Self::Superclass(_) => NodeKind::Superclass,
        }
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        match self {
            Self::Entity(node) => &node.class_name,
            Self::NonEntity(node) => &node.class_name,
            Self::Superclass(node) => &node.class_name,
        }
    }

    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        match self {
            Self::Entity(node) => node.parent.as_ref(),
            Self::NonEntity(node) => node.parent.as_ref(),
            Self::Superclass(node) => node.parent.as_ref(),
        }
    }

    /// Attributes declared by this node's own class.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::Entity(node) => &node.attributes,
            Self::Superclass(node) => &node.attributes,
            Self::NonEntity(_) => &[],
        }
    }

    /// Parent, grandparent and so on up to the top of the tree.
    pub fn ancestors(&self) -> impl Iterator<Item = &Arc<Self>> {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// Attributes of this node and every ancestor, top-most first.
    #[must_use]
    pub fn all_attributes(&self) -> Vec<&Attribute> {
        let mut chain: Vec<&Self> = self.ancestors().map(|node| &**node).collect();
        chain.reverse();
        chain.push(self);

        chain.into_iter().flat_map(Self::attributes).collect()
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&EntityNode> {
        match self {
            Self::Entity(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_superclass(&self) -> Option<&SuperclassNode> {
        match self {
            Self::Superclass(node) => Some(node),
            _ => None,
        }
    }

    /// Nearest ancestor that is an entity.
    #[must_use]
    pub fn parent_entity(&self) -> Option<&EntityNode> {
        self.ancestors().find_map(|node| node.as_entity())
    }
}

///
/// EntityNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityNode {
    pub class_name: String,
    pub parent: Option<Arc<DomainNode>>,
    pub access: AccessType,
    pub attributes: Vec<Attribute>,
    pub descriptor: EntityDescriptor,
}

///
/// SuperclassNode
/// Contributes attributes to its descendants; owns no table or identity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuperclassNode {
    pub class_name: String,
    pub parent: Option<Arc<DomainNode>>,
    pub access: AccessType,
    pub attributes: Vec<Attribute>,
}

///
/// NonEntityNode
/// Untagged class sitting between persistent classes.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NonEntityNode {
    pub class_name: String,
    pub parent: Option<Arc<DomainNode>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn superclass(name: &str, parent: Option<Arc<DomainNode>>, attrs: &[&str]) -> Arc<DomainNode> {
        Arc::new(DomainNode::Superclass(SuperclassNode {
            class_name: name.to_string(),
            parent,
            access: AccessType::Field,
            attributes: attrs
                .iter()
                .map(|name| Attribute::basic(*name, "String", AccessType::Field))
                .collect(),
        }))
    }

    #[test]
    fn ancestors_walk_to_the_top() {
        let base = superclass("m.Base", None, &["id"]);
        let plain = Arc::new(DomainNode::NonEntity(NonEntityNode {
            class_name: "m.Plain".to_string(),
            parent: Some(Arc::clone(&base)),
        }));
        let leaf = superclass("m.Leaf", Some(Arc::clone(&plain)), &["name"]);

        let names: Vec<&str> = leaf.ancestors().map(|n| n.class_name()).collect();
        assert_eq!(names, vec!["m.Plain", "m.Base"]);
        assert_eq!(leaf.kind(), NodeKind::Superclass);
        assert_eq!(plain.kind(), NodeKind::NonEntity);
        assert!(plain.attributes().is_empty());

        let attrs: Vec<&str> = leaf
            .all_attributes()
            .into_iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(attrs, vec!["id", "name"]);
        assert!(leaf.parent_entity().is_none());
    }
}
