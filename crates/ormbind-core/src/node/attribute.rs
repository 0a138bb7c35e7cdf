use derive_more::Display;
use ormbind_schema::{
    node::{MemberMetadata, MemberTag},
    types::AccessType,
};

///
/// AttributeRole
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum AttributeRole {
    #[default]
    Basic,
    EmbeddedId,
    Id,
    Version,
}

///
/// Attribute
/// One persistent member contributed by a class.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    pub access: AccessType,
    pub role: AttributeRole,
}

impl Attribute {
    #[must_use]
    pub fn basic(
        name: impl Into<String>,
        type_name: impl Into<String>,
        access: AccessType,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            access,
            role: AttributeRole::Basic,
        }
    }

    /// Build the attribute for `member` when it is persistent under the
    /// class access type `access`.
    ///
    /// Transient members are skipped. A member with an explicit access tag is
    /// always persistent; any other member only when its kind matches.
    #[must_use]
    pub fn from_member(member: &MemberMetadata, access: AccessType) -> Option<Self> {
        if member.has_tag(&MemberTag::Transient) {
            return None;
        }

        let member_access = match member.explicit_access() {
            Some(explicit) => explicit,
            None if member.kind.access() == access => access,
            None => return None,
        };

        let role = if member.has_tag(&MemberTag::EmbeddedId) {
            AttributeRole::EmbeddedId
        } else if member.has_tag(&MemberTag::Id) {
            AttributeRole::Id
        } else if member.has_tag(&MemberTag::Version) {
            AttributeRole::Version
        } else {
            AttributeRole::Basic
        };

        Some(Self {
            name: member.name.clone(),
            type_name: member.type_name.clone(),
            access: member_access,
            role,
        })
    }

    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self.role, AttributeRole::Id | AttributeRole::EmbeddedId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_follow_the_class_access_type() {
        let field = MemberMetadata::field("name", "String");
        let property = MemberMetadata::property("label", "String");

        assert!(Attribute::from_member(&field, AccessType::Field).is_some());
        assert!(Attribute::from_member(&property, AccessType::Field).is_none());
        assert!(Attribute::from_member(&property, AccessType::Property).is_some());
    }

    #[test]
    fn explicit_member_access_overrides_the_class() {
        let property = MemberMetadata::property("label", "String").tag(MemberTag::Access {
            access: AccessType::Property,
        });

        let attr = Attribute::from_member(&property, AccessType::Field).expect("explicit access");
        assert_eq!(attr.access, AccessType::Property);
    }

    #[test]
    fn transient_members_are_skipped() {
        let member = MemberMetadata::field("cache", "Map").tag(MemberTag::Transient);

        assert!(Attribute::from_member(&member, AccessType::Field).is_none());
    }

    #[test]
    fn roles_come_from_member_tags() {
        let id = MemberMetadata::field("id", "long").tag(MemberTag::Id);
        let version = MemberMetadata::field("version", "int").tag(MemberTag::Version);

        let id = Attribute::from_member(&id, AccessType::Field).expect("persistent");
        let version = Attribute::from_member(&version, AccessType::Field).expect("persistent");
        assert_eq!(id.role, AttributeRole::Id);
        assert!(id.is_identifier());
        assert_eq!(version.role, AttributeRole::Version);
    }
}
