use crate::{
    node::{DeclarationSource, DeclaredTag, GeneratedValueTag, MemberTag, Tag, TagKind},
    types::{AccessType, MemberKind},
};
use serde::{Deserialize, Serialize};

///
/// ClassMetadata
///
/// Already-extracted declarative metadata for one class: its name, its
/// superclass reference, the tags it declares and its member accessors.
/// Immutable once handed to the index.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClassMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DeclaredTag>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberMetadata>,
}

impl ClassMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            tags: Vec::new(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add a tag declared on the class itself.
    #[must_use]
    pub fn tag(self, tag: Tag) -> Self {
        self.tag_from(tag, DeclarationSource::Annotation)
    }

    #[must_use]
    pub fn tag_from(mut self, tag: Tag, source: DeclarationSource) -> Self {
        self.tags.push(DeclaredTag::new(tag, source));
        self
    }

    #[must_use]
    pub fn member(mut self, member: MemberMetadata) -> Self {
        self.members.push(member);
        self
    }

    /// Last dotted segment of the class name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Dotted prefix of the class name, if any.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(package, _)| package)
    }

    #[must_use]
    pub fn has_tag(&self, kind: TagKind) -> bool {
        self.tags.iter().any(|declared| declared.tag.kind() == kind)
    }

    /// All declarations of one tag kind, in declaration order.
    pub fn declarations(&self, kind: TagKind) -> impl Iterator<Item = &DeclaredTag> {
        self.tags
            .iter()
            .filter(move |declared| declared.tag.kind() == kind)
    }

    #[must_use]
    pub fn get_member(&self, name: &str) -> Option<&MemberMetadata> {
        self.members.iter().find(|member| member.name == name)
    }
}

/// Last dotted segment of a class name.
#[must_use]
pub fn simple_name(class_name: &str) -> &str {
    class_name
        .rsplit_once('.')
        .map_or(class_name, |(_, simple)| simple)
}

///
/// MemberMetadata
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemberMetadata {
    pub name: String,

    #[serde(default)]
    pub kind: MemberKind,

    pub type_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<MemberTag>,
}

impl MemberMetadata {
    #[must_use]
    pub fn field(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            type_name: type_name.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn property(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Property,
            ..Self::field(name, type_name)
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: MemberTag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag: &MemberTag) -> bool {
        self.tags.contains(tag)
    }

    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.has_tag(&MemberTag::Id) || self.has_tag(&MemberTag::EmbeddedId)
    }

    #[must_use]
    pub fn generated_value(&self) -> Option<&GeneratedValueTag> {
        self.tags.iter().find_map(|tag| match tag {
            MemberTag::GeneratedValue(generated) => Some(generated),
            _ => None,
        })
    }

    /// Explicit per-member access override.
    #[must_use]
    pub fn explicit_access(&self) -> Option<AccessType> {
        self.tags.iter().find_map(|tag| match tag {
            MemberTag::Access { access } => Some(*access),
            _ => None,
        })
    }
}

///
/// PackageMetadata
/// Package-level tags (scoped defaults and global definitions).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PackageMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DeclaredTag>,
}

impl PackageMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags
            .push(DeclaredTag::new(tag, DeclarationSource::Annotation));
        self
    }
}

///
/// MappingDocument
///
/// A parsed external mapping definition: classes and packages to merge into
/// the index before it is frozen.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MappingDocument {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub classes: Vec<ClassMetadata>,

    #[serde(default)]
    pub packages: Vec<PackageMetadata>,
}
