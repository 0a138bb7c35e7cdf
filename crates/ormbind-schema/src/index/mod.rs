//! Module: index
//! Responsibility: class-name → metadata lookup, built once and frozen.
//! Does not own: extracting metadata from compiled classes (the `ClassSource`
//! collaborator does that), or any role classification.
//! Boundary: everything downstream reads the frozen [`Index`] only.
//!
//! Invariants:
//! - A class or package name appears at most once.
//! - Once frozen the index is never mutated and is safe to share across
//!   threads without locking.


use crate::{
    error::MappingError,
    node::{ClassMetadata, DeclarationSource, MappingDocument, MemberMetadata, PackageMetadata},
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

///
/// ClassSource
///
/// The indexing collaborator. Implementations read compiled-class
/// resources, run a scan, or parse a configuration file; the binder only
/// asks for already-extracted metadata by name.
///

pub trait ClassSource {
    fn locate_class(&self, name: &str) -> Option<ClassMetadata>;

    fn locate_package(&self, name: &str) -> Option<PackageMetadata>;
}

///
/// InMemoryClassSource
///

#[derive(Clone, Debug, Default)]
pub struct InMemoryClassSource {
    classes: BTreeMap<String, ClassMetadata>,
    packages: BTreeMap<String, PackageMetadata>,
}

impl InMemoryClassSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_class(mut self, class: ClassMetadata) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    #[must_use]
    pub fn with_package(mut self, package: PackageMetadata) -> Self {
        self.packages.insert(package.name.clone(), package);
        self
    }

    /// Every class name this source can produce.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Every package name this source can produce.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}

impl ClassSource for InMemoryClassSource {
    fn locate_class(&self, name: &str) -> Option<ClassMetadata> {
        self.classes.get(name).cloned()
    }

    fn locate_package(&self, name: &str) -> Option<PackageMetadata> {
        self.packages.get(name).cloned()
    }
}

///
/// IndexBuilder
/// Mutable staging area; [`IndexBuilder::freeze`] ends the mutable phase.
///

#[derive(Debug, Default)]
pub struct IndexBuilder {
    classes: BTreeMap<String, ClassMetadata>,
    packages: BTreeMap<String, PackageMetadata>,
}

impl IndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class from the primary stream. Indexing the same class twice is
    /// an authoring error; use [`Self::merge`] for overlay definitions.
    pub fn add_class(&mut self, class: ClassMetadata) -> Result<(), MappingError> {
        if self.classes.contains_key(&class.name) {
            return Err(MappingError::configuration(
                &class.name,
                "class is indexed more than once",
            ));
        }
        self.classes.insert(class.name.clone(), class);

        Ok(())
    }

    pub fn add_package(&mut self, package: PackageMetadata) -> Result<(), MappingError> {
        if self.packages.contains_key(&package.name) {
            return Err(MappingError::configuration(
                &package.name,
                "package is indexed more than once",
            ));
        }
        self.packages.insert(package.name.clone(), package);

        Ok(())
    }

    /// Pull the named classes and packages out of `source`.
    pub fn index_classes<S, C, P>(
        &mut self,
        source: &S,
        classes: C,
        packages: P,
    ) -> Result<&mut Self, MappingError>
    where
        S: ClassSource + ?Sized,
        C: IntoIterator,
        C::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        for name in classes {
            let name = name.as_ref();
            let class = source
                .locate_class(name)
                .ok_or_else(|| MappingError::indexing(name))?;
            self.add_class(class)?;
        }

        for name in packages {
            let name = name.as_ref();
            let package = source
                .locate_package(name)
                .ok_or_else(|| MappingError::indexing(name))?;
            self.add_package(package)?;
        }

        Ok(self)
    }

    /// Merge a mapping-definition class. Unknown classes are inserted;
    /// known classes gain the extra tags and members.
    pub fn merge(&mut self, class: ClassMetadata) -> Result<(), MappingError> {
        let Some(existing) = self.classes.get_mut(&class.name) else {
            debug!(class = %class.name, "mapping-only class added to index");
            self.classes.insert(class.name.clone(), class);
            return Ok(());
        };

        if let Some(other) = class.superclass {
            if let Some(current) = existing.superclass.as_ref().filter(|c| **c != other) {
                return Err(MappingError::configuration(
                    &class.name,
                    format!(
                        "mapping declares superclass '{other}' but the class extends '{current}'"
                    ),
                ));
            }
            existing.superclass = Some(other);
        }

        existing.tags.extend(class.tags);
        for member in class.members {
            merge_member(&mut existing.members, member);
        }

        Ok(())
    }

    pub fn merge_package(&mut self, package: PackageMetadata) {
        match self.packages.get_mut(&package.name) {
            Some(existing) => existing.tags.extend(package.tags),
            None => {
                self.packages.insert(package.name.clone(), package);
            }
        }
    }

    /// Merge a whole mapping document. Tags without an explicit source are
    /// attributed to the document.
    pub fn merge_document(&mut self, document: MappingDocument) -> Result<(), MappingError> {
        let source = DeclarationSource::MappingFile(document.name);

        for mut class in document.classes {
            for declared in &mut class.tags {
                if declared.source == DeclarationSource::Annotation {
                    declared.source = source.clone();
                }
            }
            self.merge(class)?;
        }

        for mut package in document.packages {
            for declared in &mut package.tags {
                if declared.source == DeclarationSource::Annotation {
                    declared.source = source.clone();
                }
            }
            self.merge_package(package);
        }

        Ok(())
    }

    #[must_use]
    pub fn freeze(self) -> Index {
        debug!(
            classes = self.classes.len(),
            packages = self.packages.len(),
            "metadata index frozen"
        );

        Index {
            classes: self
                .classes
                .into_iter()
                .map(|(name, class)| (name, Arc::new(class)))
                .collect(),
            packages: self
                .packages
                .into_iter()
                .map(|(name, package)| (name, Arc::new(package)))
                .collect(),
        }
    }
}

// Members are matched by name; a repeated member only contributes new tags.
fn merge_member(members: &mut Vec<MemberMetadata>, member: MemberMetadata) {
    match members.iter_mut().find(|m| m.name == member.name) {
        Some(existing) => {
            for tag in member.tags {
                if !existing.tags.contains(&tag) {
                    existing.tags.push(tag);
                }
            }
        }
        None => members.push(member),
    }
}

/// Index the named classes and packages from `source` and freeze the result.
pub fn index_classes<S, C, P>(source: &S, classes: C, packages: P) -> Result<Index, MappingError>
where
    S: ClassSource + ?Sized,
    C: IntoIterator,
    C::Item: AsRef<str>,
    P: IntoIterator,
    P::Item: AsRef<str>,
{
    let mut builder = IndexBuilder::new();
    builder.index_classes(source, classes, packages)?;

    Ok(builder.freeze())
}

///
/// Index
///
/// Frozen, read-only class lookup. Iteration order is by class name so every
/// pass over the index is deterministic.
///

#[derive(Clone, Debug, Default)]
pub struct Index {
    classes: BTreeMap<String, Arc<ClassMetadata>>,
    packages: BTreeMap<String, Arc<PackageMetadata>>,
}

impl Index {
    #[must_use]
    pub fn get_class_info(&self, name: &str) -> Option<&Arc<ClassMetadata>> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn get_package_info(&self, name: &str) -> Option<&Arc<PackageMetadata>> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassMetadata>> {
        self.classes.values()
    }

    pub fn packages(&self) -> impl Iterator<Item = &Arc<PackageMetadata>> {
        self.packages.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Package metadata for the package a class lives in.
    #[must_use]
    pub fn package_of(&self, class: &ClassMetadata) -> Option<&Arc<PackageMetadata>> {
        class.package().and_then(|name| self.packages.get(name))
    }

    /// The indexed superclass, or `None` at the top of the chain or when the
    /// superclass lies outside the index.
    #[must_use]
    pub fn superclass_of(&self, class: &ClassMetadata) -> Option<&Arc<ClassMetadata>> {
        class
            .superclass
            .as_deref()
            .and_then(|name| self.classes.get(name))
    }

    /// Indexed ancestors of `class`, nearest first. Stops at the first
    /// superclass outside the index and never yields more than `len()`
    /// classes, so a cyclic superclass declaration cannot loop forever.
    pub fn ancestors<'a>(
        &'a self,
        class: &'a ClassMetadata,
    ) -> impl Iterator<Item = &'a Arc<ClassMetadata>> + 'a {
        let mut current = self.superclass_of(class);

        std::iter::from_fn(move || {
            let next = current?;
            current = self.superclass_of(next);
            Some(next)
        })
        .take(self.classes.len())
    }
}
