//! Module: hierarchy
//! Responsibility: classify every indexed class once and partition the
//! persistable ones into root-first inheritance chains.
//! Does not own: descriptor construction or default resolution.
//! Boundary: consumes a frozen `Index`, produces a `HierarchySet`.
//!
//! Invariants:
//! - Every entity-tagged class belongs to exactly one hierarchy.
//! - No class appears in two hierarchies; a shared ancestor is recorded once
//!   and later chains are spliced onto the chain that already holds it.
//! - Within a hierarchy, ancestors always precede their descendants.
//! - Untagged classes are never members but do not stop the upward walk.

#[cfg(test)]
mod tests;

use crate::{
    error::MappingError,
    index::Index,
    node::{ClassMetadata, TagKind},
    types::ClassRole,
};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    sync::Arc,
};
use tracing::debug;

/// Resolve the declarative role of a class from its tags.
pub fn classify(class: &ClassMetadata) -> Result<ClassRole, MappingError> {
    let entity = class.has_tag(TagKind::Entity);
    let mapped = class.has_tag(TagKind::MappedSuperclass);
    let embeddable = class.has_tag(TagKind::Embeddable);

    if entity && mapped {
        return Err(MappingError::configuration(
            &class.name,
            "declared as both Entity and MappedSuperclass",
        ));
    }
    if (entity || mapped) && embeddable {
        let role = if entity { "Entity" } else { "MappedSuperclass" };
        return Err(MappingError::configuration(
            &class.name,
            format!("declared as both {role} and Embeddable"),
        ));
    }

    Ok(if entity {
        ClassRole::Entity
    } else if mapped {
        ClassRole::MappedSuperclass
    } else if embeddable {
        ClassRole::Embeddable
    } else {
        ClassRole::Plain
    })
}

///
/// ClassRoles
///
/// The role of every indexed class, resolved once by [`classify_index`] and
/// carried by the [`HierarchySet`] so later phases never classify again.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassRoles {
    roles: BTreeMap<String, ClassRole>,
}

impl ClassRoles {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClassRole> {
        self.roles.get(name).copied()
    }

    /// Role of `name`; classes outside the index are plain.
    #[must_use]
    pub fn role_of(&self, name: &str) -> ClassRole {
        self.get(name).unwrap_or(ClassRole::Plain)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ClassRole)> {
        self.roles.iter().map(|(name, role)| (name.as_str(), *role))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<(String, ClassRole)> for ClassRoles {
    fn from_iter<I: IntoIterator<Item = (String, ClassRole)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

/// Classify every class of the index, failing on the first contradiction.
pub fn classify_index(index: &Index) -> Result<ClassRoles, MappingError> {
    index
        .classes()
        .map(|class| classify(class).map(|role| (class.name.clone(), role)))
        .collect()
}

///
/// HierarchyMember
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HierarchyMember {
    class: Arc<ClassMetadata>,
    role: ClassRole,
}

impl HierarchyMember {
    #[must_use]
    pub const fn new(class: Arc<ClassMetadata>, role: ClassRole) -> Self {
        Self { class, role }
    }

    #[must_use]
    pub const fn class(&self) -> &Arc<ClassMetadata> {
        &self.class
    }

    #[must_use]
    pub const fn role(&self) -> ClassRole {
        self.role
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.class.name
    }
}

///
/// Hierarchy
///
/// Root-first sequence of the persistable classes of one inheritance
/// family. After merging, one hierarchy may hold several sibling entity
/// chains below a shared ancestor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hierarchy {
    members: Vec<HierarchyMember>,
}

impl Hierarchy {
    #[must_use]
    pub const fn members(&self) -> &[HierarchyMember] {
        self.members.as_slice()
    }

    #[must_use]
    pub fn root(&self) -> Option<&HierarchyMember> {
        self.members.first()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HierarchyMember> {
        self.members.iter().find(|member| member.name() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(HierarchyMember::name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &HierarchyMember> {
        self.members
            .iter()
            .filter(|member| member.role == ClassRole::Entity)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

///
/// HierarchySet
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HierarchySet {
    hierarchies: Vec<Hierarchy>,
    roles: ClassRoles,
}

impl HierarchySet {
    /// Roles resolved while building, for every indexed class.
    #[must_use]
    pub const fn roles(&self) -> &ClassRoles {
        &self.roles
    }

    /// Embeddable chain of `name`, reusing the roles of this set.
    pub fn embeddable_hierarchy(
        &self,
        index: &Index,
        name: &str,
    ) -> Result<Hierarchy, MappingError> {
        embeddable_hierarchy(index, &self.roles, name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hierarchy> {
        self.hierarchies.iter()
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[Hierarchy] {
        self.hierarchies.as_slice()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.hierarchies.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.hierarchies.is_empty()
    }

    /// The hierarchy holding `class`, if it is a member of any.
    #[must_use]
    pub fn hierarchy_of(&self, class: &str) -> Option<&Hierarchy> {
        self.hierarchies.iter().find(|h| h.contains(class))
    }
}

impl IntoIterator for HierarchySet {
    type Item = Hierarchy;
    type IntoIter = std::vec::IntoIter<Hierarchy>;

    fn into_iter(self) -> Self::IntoIter {
        self.hierarchies.into_iter()
    }
}

/// Partition every entity class of the index into hierarchies.
pub fn build_hierarchies(index: &Index) -> Result<HierarchySet, MappingError> {
    HierarchyBuilder::new(index).build()
}

///
/// HierarchyBuilder
///

struct HierarchyBuilder<'a> {
    index: &'a Index,
    roles: ClassRoles,
    chains: Vec<Vec<HierarchyMember>>,
    chain_of: HashMap<&'a str, usize>,
}

impl<'a> HierarchyBuilder<'a> {
    fn new(index: &'a Index) -> Self {
        Self {
            index,
            roles: ClassRoles::default(),
            chains: Vec::new(),
            chain_of: HashMap::new(),
        }
    }

    fn build(mut self) -> Result<HierarchySet, MappingError> {
        let index = self.index;

        // Phase 1: classify everything before any chain work.
        self.roles = classify_index(index)?;

        // Phase 2: walk up from every entity not already recorded.
        for class in index.classes() {
            if self.role_of(&class.name) != ClassRole::Entity
                || self.chain_of.contains_key(class.name.as_str())
            {
                continue;
            }
            self.record(class)?;
        }

        // Phase 3: many classes point at the same chain; keep each chain once.
        let ids: BTreeSet<usize> = self.chain_of.values().copied().collect();
        let mut chains: Vec<Option<Vec<HierarchyMember>>> =
            self.chains.into_iter().map(Some).collect();
        let hierarchies: Vec<Hierarchy> = ids
            .into_iter()
            .filter_map(|id| chains.get_mut(id).and_then(Option::take))
            .map(|members| Hierarchy { members })
            .collect();

        debug!(hierarchies = hierarchies.len(), "entity hierarchies built");

        Ok(HierarchySet {
            hierarchies,
            roles: self.roles,
        })
    }

    fn role_of(&self, name: &str) -> ClassRole {
        self.roles.role_of(name)
    }

    // Walk from `leaf` towards the root, collecting persistable classes until
    // an ancestor that already belongs to a chain is met; then splice.
    fn record(&mut self, leaf: &'a Arc<ClassMetadata>) -> Result<(), MappingError> {
        let mut prefix: Vec<&'a Arc<ClassMetadata>> = Vec::new();
        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut target = None;
        let mut current = Some(leaf);

        while let Some(class) = current {
            if !visited.insert(class.name.as_str()) {
                return Err(MappingError::configuration(
                    &class.name,
                    "superclass chain is cyclic",
                ));
            }
            if let Some(&id) = self.chain_of.get(class.name.as_str()) {
                target = Some(id);
                break;
            }
            if self.role_of(&class.name).is_persistable() {
                prefix.push(class);
            }
            current = self.index.superclass_of(class);
        }

        let id = target.unwrap_or_else(|| {
            self.chains.push(Vec::new());
            self.chains.len() - 1
        });

        for class in prefix.into_iter().rev() {
            let role = self.role_of(&class.name);
            self.chain_of.insert(class.name.as_str(), id);
            self.chains[id].push(HierarchyMember::new(Arc::clone(class), role));
        }

        debug!(
            class = %leaf.name,
            chain = id,
            merged = target.is_some(),
            "entity chain recorded"
        );

        Ok(())
    }
}

/// Root-first chain of an embeddable and its embeddable or mapped-superclass
/// ancestors, read from already resolved `roles`. No merging takes place.
pub fn embeddable_hierarchy(
    index: &Index,
    roles: &ClassRoles,
    name: &str,
) -> Result<Hierarchy, MappingError> {
    let class = index
        .get_class_info(name)
        .ok_or_else(|| MappingError::reference(name, "embeddable hierarchy"))?;

    if roles.role_of(name) != ClassRole::Embeddable {
        return Err(MappingError::assertion(format!(
            "an embeddable hierarchy was requested for '{name}', which is not embeddable"
        )));
    }

    let mut members = vec![HierarchyMember::new(Arc::clone(class), ClassRole::Embeddable)];
    let mut visited = HashSet::from([class.name.as_str()]);

    for ancestor in index.ancestors(class) {
        if !visited.insert(ancestor.name.as_str()) {
            return Err(MappingError::configuration(
                &ancestor.name,
                "superclass chain is cyclic",
            ));
        }
        let role = roles.role_of(&ancestor.name);
        if matches!(role, ClassRole::Embeddable | ClassRole::MappedSuperclass) {
            members.push(HierarchyMember::new(Arc::clone(ancestor), role));
        }
    }
    members.reverse();

    Ok(Hierarchy { members })
}
