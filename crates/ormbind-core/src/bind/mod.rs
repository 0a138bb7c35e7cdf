//! Module: bind
//! Responsibility: turn one hierarchy into domain nodes and entity
//! descriptors, root-first.
//! Does not own: hierarchy construction (schema crate) or registration
//! (see `registry`).
//! Boundary: input is a `Hierarchy` plus a `BindingContext`; output is a
//! private `BoundHierarchy` that touches no shared state.
//!
//! Invariants:
//! - A class is bound at most once per hierarchy; siblings below a merged
//!   ancestor receive the same `Arc` node.
//! - Untagged classes between two bound classes become `NonEntity` nodes so
//!   the parent chain is complete.
//! - The inheritance strategy is read from the root entity only.

mod entity;


use crate::{
    context::BindingContext,
    node::{DomainNode, EntityNode, NonEntityNode, SuperclassNode},
};
use entity::Family;
use ormbind_schema::{
    MappingError,
    hierarchy::Hierarchy,
    node::ClassMetadata,
    types::{AccessType, ClassRole},
};
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

///
/// BoundHierarchy
///
/// Nodes of one bound hierarchy in binding order: every node appears after
/// its parent.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BoundHierarchy {
    nodes: Vec<Arc<DomainNode>>,
}

impl BoundHierarchy {
    #[must_use]
    pub const fn nodes(&self) -> &[Arc<DomainNode>] {
        self.nodes.as_slice()
    }

    #[must_use]
    pub fn get(&self, class_name: &str) -> Option<&Arc<DomainNode>> {
        self.nodes.iter().find(|node| node.class_name() == class_name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityNode> {
        self.nodes.iter().filter_map(|node| node.as_entity())
    }

    pub fn root_entities(&self) -> impl Iterator<Item = &EntityNode> {
        self.entities().filter(|entity| entity.descriptor.is_root())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn into_nodes(self) -> Vec<Arc<DomainNode>> {
        self.nodes
    }
}

/// Bind every member of `hierarchy`, root-first.
pub fn bind_hierarchy(
    hierarchy: &Hierarchy,
    ctx: &BindingContext<'_>,
) -> Result<BoundHierarchy, MappingError> {
    HierarchyBinder::new(hierarchy, ctx).bind()
}

///
/// HierarchyBinder
///

struct HierarchyBinder<'h, 'c> {
    hierarchy: &'h Hierarchy,
    ctx: &'h BindingContext<'c>,
    nodes: HashMap<String, Arc<DomainNode>>,
    order: Vec<Arc<DomainNode>>,
    families: HashMap<String, Family>,

    // access implied by the hierarchy's identifier, found before binding
    id_placement: Option<AccessType>,
}

impl<'h, 'c> HierarchyBinder<'h, 'c> {
    fn new(hierarchy: &'h Hierarchy, ctx: &'h BindingContext<'c>) -> Self {
        Self {
            hierarchy,
            ctx,
            nodes: HashMap::new(),
            order: Vec::new(),
            families: HashMap::new(),
            id_placement: entity::hierarchy_id_placement(hierarchy, ctx.index()),
        }
    }

    fn bind(mut self) -> Result<BoundHierarchy, MappingError> {
        let hierarchy = self.hierarchy;
        let ctx = self.ctx;

        for member in hierarchy.members() {
            let class = member.class();
            let parent = self.parent_of(class)?;
            let package_ctx = ctx.package_scope(class)?;
            let class_ctx = package_ctx.class_scope(class)?;

            let node = match member.role() {
                ClassRole::MappedSuperclass => self.bind_superclass(class, parent, &class_ctx)?,
                ClassRole::Entity => self.bind_entity(class, parent, &class_ctx)?,
                role => {
                    return Err(MappingError::assertion(format!(
                        "'{}' has role {role} and cannot be a hierarchy member",
                        class.name
                    )));
                }
            };
            self.insert(node);
        }

        debug!(
            root = hierarchy.root().map_or("", |root| root.name()),
            nodes = self.order.len(),
            "hierarchy bound"
        );

        Ok(BoundHierarchy { nodes: self.order })
    }

    fn insert(&mut self, node: Arc<DomainNode>) {
        self.nodes
            .insert(node.class_name().to_string(), Arc::clone(&node));
        self.order.push(node);
    }

    // Nearest bound ancestor, with NonEntity nodes materialized for the
    // untagged classes in between. `None` when nothing above is bound.
    fn parent_of(
        &mut self,
        class: &ClassMetadata,
    ) -> Result<Option<Arc<DomainNode>>, MappingError> {
        let index = self.ctx.index();
        let mut plain = Vec::new();
        let mut bound = None;

        for ancestor in index.ancestors(class) {
            if let Some(node) = self.nodes.get(&ancestor.name) {
                bound = Some(Arc::clone(node));
                break;
            }
            if self.hierarchy.contains(&ancestor.name) {
                return Err(MappingError::assertion(format!(
                    "ancestor '{}' of '{}' was not bound before its descendant",
                    ancestor.name, class.name
                )));
            }
            plain.push(ancestor);
        }

        let Some(mut current) = bound else {
            return Ok(None);
        };

        for intermediate in plain.into_iter().rev() {
            let node = Arc::new(DomainNode::NonEntity(NonEntityNode {
                class_name: intermediate.name.clone(),
                parent: Some(current),
            }));
            debug!(class = %intermediate.name, "non-entity intermediate materialized");

            self.insert(Arc::clone(&node));
            current = node;
        }

        Ok(Some(current))
    }

    fn bind_superclass(
        &self,
        class: &ClassMetadata,
        parent: Option<Arc<DomainNode>>,
        ctx: &BindingContext<'_>,
    ) -> Result<Arc<DomainNode>, MappingError> {
        let access = entity::resolve_access(class, ctx, self.id_placement)?;

        Ok(Arc::new(DomainNode::Superclass(SuperclassNode {
            class_name: class.name.clone(),
            parent,
            access,
            attributes: entity::attributes(class, access),
        })))
    }

    fn bind_entity(
        &mut self,
        class: &ClassMetadata,
        parent: Option<Arc<DomainNode>>,
        ctx: &BindingContext<'_>,
    ) -> Result<Arc<DomainNode>, MappingError> {
        let root_entity = parent
            .as_ref()
            .and_then(|node| node.as_entity().or_else(|| node.parent_entity()))
            .map(|entity| entity.descriptor.root_entity_name().to_string());

        let (family, access) = match root_entity {
            None => {
                let family = entity::root_family(
                    class,
                    self.has_subclasses(class),
                    ctx,
                    self.id_placement,
                )?;
                self.families
                    .insert(class.name.clone(), family.clone());
                let access = family.access;
                (family, access)
            }
            Some(root) => {
                let family = self.families.get(&root).cloned().ok_or_else(|| {
                    MappingError::assertion(format!(
                        "root entity '{root}' of '{}' has not been bound",
                        class.name
                    ))
                })?;
                let access = entity::subclass_access(class, &family)?;
                (family, access)
            }
        };

        let descriptor = entity::entity_descriptor(class, ctx, &family)?;
        debug!(
            entity = %descriptor.entity_name,
            root = descriptor.is_root(),
            inheritance = %descriptor.inheritance,
            "entity bound"
        );

        Ok(Arc::new(DomainNode::Entity(EntityNode {
            class_name: class.name.clone(),
            parent,
            access,
            attributes: entity::attributes(class, access),
            descriptor,
        })))
    }

    // Whether another entity of this hierarchy descends from `class`.
    fn has_subclasses(&self, class: &ClassMetadata) -> bool {
        let index = self.ctx.index();

        self.hierarchy.entities().any(|member| {
            member.name() != class.name
                && index
                    .ancestors(member.class())
                    .any(|ancestor| ancestor.name == class.name)
        })
    }
}
