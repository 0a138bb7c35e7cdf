//! Module: registry
//! Responsibility: collect bound hierarchies, possibly from many threads,
//! and freeze them into the read-only metamodel.
//! Does not own: binding itself; callers hand over finished hierarchies.
//! Boundary: `register` is the only mutation and is atomic per hierarchy.
//! `freeze` links generated identifiers to the unit's generators.
//!
//! Invariants:
//! - Entity names, public names and class names are unique across the
//!   whole registry.
//! - A rejected hierarchy leaves the registry untouched.
//! - Every generated identifier of a frozen metamodel has a generator.

use crate::{
    bind::BoundHierarchy,
    global::{GlobalMetadata, IdGenerator, resolve_generated_id},
    node::{DomainNode, EntityNode, NodeKind, SuperclassNode},
};
use ormbind_schema::MappingError;
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};
use tracing::debug;

///
/// RegistryState
///

#[derive(Debug, Default)]
struct RegistryState {
    entities: BTreeMap<String, Arc<DomainNode>>,
    public_names: BTreeMap<String, String>,
    superclasses: BTreeMap<String, Arc<DomainNode>>,
    non_entities: BTreeMap<String, Arc<DomainNode>>,

    // class name -> kind, across every node
    classes: BTreeMap<String, NodeKind>,
    hierarchies: usize,
}

impl RegistryState {
    fn validate(&self, hierarchy: &BoundHierarchy) -> Result<(), MappingError> {
        let mut classes = HashSet::new();
        let mut entity_names = HashSet::new();
        let mut public_names = HashSet::new();

        for node in hierarchy.nodes() {
            let class_name = node.class_name();
            if self.classes.contains_key(class_name) || !classes.insert(class_name) {
                return Err(MappingError::configuration(
                    class_name,
                    "class is bound more than once",
                ));
            }

            let Some(entity) = node.as_entity() else {
                continue;
            };
            let descriptor = &entity.descriptor;

            if let Some(existing) = self.entities.get(&descriptor.entity_name) {
                return Err(MappingError::configuration(
                    class_name,
                    format!(
                        "entity name '{}' is already used by '{}'",
                        descriptor.entity_name,
                        existing.class_name()
                    ),
                ));
            }
            if !entity_names.insert(descriptor.entity_name.as_str()) {
                return Err(MappingError::configuration(
                    class_name,
                    format!("entity name '{}' is used twice", descriptor.entity_name),
                ));
            }

            if let Some(existing) = self.public_names.get(&descriptor.public_name) {
                return Err(MappingError::configuration(
                    class_name,
                    format!(
                        "entity public name '{}' is already used by '{existing}'",
                        descriptor.public_name
                    ),
                ));
            }
            if !public_names.insert(descriptor.public_name.as_str()) {
                return Err(MappingError::configuration(
                    class_name,
                    format!("entity public name '{}' is used twice", descriptor.public_name),
                ));
            }
        }

        Ok(())
    }

    fn insert(&mut self, hierarchy: BoundHierarchy) {
        for node in hierarchy.into_nodes() {
            let class_name = node.class_name().to_string();
            self.classes.insert(class_name.clone(), node.kind());

            match &*node {
                DomainNode::Entity(entity) => {
                    let descriptor = &entity.descriptor;
                    self.public_names
                        .insert(descriptor.public_name.clone(), descriptor.entity_name.clone());
                    self.entities
                        .insert(descriptor.entity_name.clone(), Arc::clone(&node));
                }
                DomainNode::Superclass(_) => {
                    self.superclasses.insert(class_name, Arc::clone(&node));
                }
                DomainNode::NonEntity(_) => {
                    self.non_entities.insert(class_name, Arc::clone(&node));
                }
            }
        }
        self.hierarchies += 1;
    }
}

///
/// MetamodelRegistry
///
/// Shared sink for bound hierarchies. Registration takes a write lock for
/// the validate-then-insert step only, so binding itself stays parallel.
///

#[derive(Debug, Default)]
pub struct MetamodelRegistry {
    inner: RwLock<RegistryState>,
}

impl MetamodelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every node of `hierarchy`, or none of them.
    pub fn register(&self, hierarchy: BoundHierarchy) -> Result<(), MappingError> {
        let mut state = self.inner.write();
        state.validate(&hierarchy)?;

        let nodes = hierarchy.len();
        state.insert(hierarchy);
        debug!(nodes, total = state.classes.len(), "hierarchy registered");

        Ok(())
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entities.is_empty()
    }

    #[must_use]
    pub fn contains_entity(&self, entity_name: &str) -> bool {
        self.inner.read().entities.contains_key(entity_name)
    }

    /// Finish registration, attach the unit-wide metadata and resolve the
    /// generator of every generated identifier against it.
    pub fn freeze(self, global: GlobalMetadata) -> Result<Metamodel, MappingError> {
        let state = self.inner.into_inner();

        let mut id_generators = BTreeMap::new();
        for entity in state.entities.values().filter_map(|node| node.as_entity()) {
            let Some(request) = entity
                .descriptor
                .as_root()
                .and_then(|root| root.generated_id.as_ref())
            else {
                continue;
            };

            let generator = resolve_generated_id(&entity.class_name, request, &global)?;
            id_generators.insert(entity.descriptor.entity_name.clone(), generator);
        }

        debug!(
            hierarchies = state.hierarchies,
            entities = state.entities.len(),
            generated_ids = id_generators.len(),
            "metamodel frozen"
        );

        Ok(Metamodel {
            entities: state.entities,
            public_names: state.public_names,
            superclasses: state.superclasses,
            non_entities: state.non_entities,
            id_generators,
            hierarchies: state.hierarchies,
            global,
        })
    }
}

///
/// Metamodel
///
/// Immutable result of binding one persistence unit. Entities are keyed by
/// entity name; nodes keep their shared parent links.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metamodel {
    entities: BTreeMap<String, Arc<DomainNode>>,
    public_names: BTreeMap<String, String>,
    superclasses: BTreeMap<String, Arc<DomainNode>>,
    non_entities: BTreeMap<String, Arc<DomainNode>>,
    id_generators: BTreeMap<String, IdGenerator>,
    hierarchies: usize,
    global: GlobalMetadata,
}

impl Metamodel {
    #[must_use]
    pub fn entity(&self, entity_name: &str) -> Option<&EntityNode> {
        self.entities
            .get(entity_name)
            .and_then(|node| node.as_entity())
    }

    /// The entity's node, for identity checks and ancestor walks.
    #[must_use]
    pub fn entity_node(&self, entity_name: &str) -> Option<&Arc<DomainNode>> {
        self.entities.get(entity_name)
    }

    #[must_use]
    pub fn entity_by_public_name(&self, public_name: &str) -> Option<&EntityNode> {
        self.public_names
            .get(public_name)
            .and_then(|entity_name| self.entity(entity_name))
    }

    #[must_use]
    pub fn superclass(&self, class_name: &str) -> Option<&SuperclassNode> {
        self.superclasses
            .get(class_name)
            .and_then(|node| node.as_superclass())
    }

    #[must_use]
    pub fn non_entity(&self, class_name: &str) -> Option<&Arc<DomainNode>> {
        self.non_entities.get(class_name)
    }

    /// Entities in entity-name order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityNode> {
        self.entities.values().filter_map(|node| node.as_entity())
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn root_entities(&self) -> impl Iterator<Item = &EntityNode> {
        self.entities().filter(|entity| entity.descriptor.is_root())
    }

    /// Generator of a root entity whose identifier is generated.
    #[must_use]
    pub fn id_generator(&self, entity_name: &str) -> Option<&IdGenerator> {
        self.id_generators.get(entity_name)
    }

    #[must_use]
    pub const fn hierarchy_count(&self) -> usize {
        self.hierarchies
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub const fn global(&self) -> &GlobalMetadata {
        &self.global
    }
}

///
/// TESTS
///
