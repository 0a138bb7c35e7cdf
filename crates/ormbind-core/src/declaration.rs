//! Effective declaration lookup for single-valued tags.
//!
//! A tag kind may be declared on a class (or package) by more than one
//! source once external mapping definitions are merged into the index. The
//! rules below pick one declaration:
//!
//! - the more specific source wins (a mapping file over an on-class
//!   annotation), and a warning is logged when the values differ;
//! - two distinct sources of equal specificity are ambiguous: the last
//!   declaration wins and a warning is logged;
//! - the same source declaring a kind twice is a configuration error.

use ormbind_schema::{
    MappingError,
    node::{DeclaredTag, Tag, TagKind},
};
use std::cmp::Ordering;
use tracing::warn;

///
/// Declarations
/// Borrowed view over the tags of one declaring class or package.
///

#[derive(Clone, Copy, Debug)]
pub struct Declarations<'t> {
    owner: &'t str,
    tags: &'t [DeclaredTag],
}

impl<'t> Declarations<'t> {
    #[must_use]
    pub const fn new(owner: &'t str, tags: &'t [DeclaredTag]) -> Self {
        Self { owner, tags }
    }

    #[must_use]
    pub const fn owner(&self) -> &'t str {
        self.owner
    }

    /// The effective declaration of `kind`, if any.
    pub fn find(&self, kind: TagKind) -> Result<Option<&'t Tag>, MappingError> {
        let mut chosen: Option<&'t DeclaredTag> = None;

        for declared in self.tags.iter().filter(|d| d.tag.kind() == kind) {
            let Some(current) = chosen else {
                chosen = Some(declared);
                continue;
            };

            if current.source == declared.source {
                return Err(MappingError::configuration(
                    self.owner,
                    format!("{kind} is declared more than once by {}", declared.source),
                ));
            }

            let ordering = declared
                .source
                .specificity()
                .cmp(&current.source.specificity());

            if current.tag == declared.tag {
                if ordering == Ordering::Greater {
                    chosen = Some(declared);
                }
                continue;
            }

            match ordering {
                Ordering::Greater => {
                    warn!(
                        class = %self.owner,
                        tag = %kind,
                        kept = %declared.source,
                        overridden = %current.source,
                        "conflicting declarations, the more specific source wins"
                    );
                    chosen = Some(declared);
                }
                Ordering::Less => {
                    warn!(
                        class = %self.owner,
                        tag = %kind,
                        kept = %current.source,
                        overridden = %declared.source,
                        "conflicting declarations, the more specific source wins"
                    );
                }
                Ordering::Equal => {
                    warn!(
                        class = %self.owner,
                        tag = %kind,
                        kept = %declared.source,
                        overridden = %current.source,
                        "ambiguous declarations of equal specificity, the last one wins"
                    );
                    chosen = Some(declared);
                }
            }
        }

        Ok(chosen.map(|declared| &declared.tag))
    }

    /// Whether `kind` is effectively declared.
    pub fn has(&self, kind: TagKind) -> Result<bool, MappingError> {
        Ok(self.find(kind)?.is_some())
    }

    /// Find `kind` and project its payload.
    pub fn pick<T>(
        &self,
        kind: TagKind,
        project: impl FnOnce(&'t Tag) -> Option<T>,
    ) -> Result<Option<T>, MappingError> {
        Ok(self.find(kind)?.and_then(project))
    }

    /// Every declaration of `kind` regardless of source, for repeatable tags.
    pub fn all(&self, kind: TagKind) -> impl Iterator<Item = &'t Tag> + 't {
        self.tags
            .iter()
            .filter(move |declared| declared.tag.kind() == kind)
            .map(|declared| &declared.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::capture_warnings;
    use ormbind_schema::{MappingErrorKind, node::DeclarationSource};

    fn mapping(name: &str) -> DeclarationSource {
        DeclarationSource::MappingFile(name.to_string())
    }

    #[test]
    fn single_declaration_is_effective() {
        let tags = vec![DeclaredTag::new(
            Tag::BatchSize { size: 8 },
            DeclarationSource::Annotation,
        )];
        let decls = Declarations::new("shop.Order", &tags);

        let (found, warnings) = capture_warnings(|| decls.find(TagKind::BatchSize));

        assert_eq!(found.expect("no conflict"), Some(&Tag::BatchSize { size: 8 }));
        assert!(!decls.has(TagKind::Cache).expect("no conflict"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn mapping_file_beats_annotation_in_either_order() {
        let annotated = DeclaredTag::new(Tag::cacheable(true), DeclarationSource::Annotation);
        let mapped = DeclaredTag::new(Tag::cacheable(false), mapping("orm.xml"));

        for tags in [
            vec![annotated.clone(), mapped.clone()],
            vec![mapped.clone(), annotated.clone()],
        ] {
            let decls = Declarations::new("shop.Order", &tags);
            let (found, warnings) = capture_warnings(|| decls.find(TagKind::Cacheable));

            assert_eq!(
                found.expect("conflict is not fatal"),
                Some(&Tag::cacheable(false))
            );
            assert_eq!(warnings.len(), 1, "the conflict is reported once");
            let warning = &warnings[0];
            assert_eq!(
                warning.message,
                "conflicting declarations, the more specific source wins"
            );
            assert_eq!(warning.field("class"), Some("shop.Order"));
            assert_eq!(warning.field("tag"), Some("Cacheable"));
            assert_eq!(warning.field("kept"), Some("mapping file 'orm.xml'"));
            assert_eq!(warning.field("overridden"), Some("annotation"));
        }
    }

    #[test]
    fn agreeing_declarations_are_not_reported() {
        let tags = vec![
            DeclaredTag::new(Tag::Immutable, DeclarationSource::Annotation),
            DeclaredTag::new(Tag::Immutable, mapping("orm.xml")),
        ];
        let decls = Declarations::new("shop.Order", &tags);

        let (found, warnings) = capture_warnings(|| decls.has(TagKind::Immutable));

        assert!(found.expect("agreement is not a conflict"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn equal_specificity_takes_the_last_declaration() {
        let tags = vec![
            DeclaredTag::new(Tag::BatchSize { size: 4 }, mapping("a.xml")),
            DeclaredTag::new(Tag::BatchSize { size: 16 }, mapping("b.xml")),
        ];
        let decls = Declarations::new("shop.Order", &tags);

        let (size, warnings) = capture_warnings(|| {
            decls.pick(TagKind::BatchSize, |tag| match tag {
                Tag::BatchSize { size } => Some(*size),
                _ => None,
            })
        });

        assert_eq!(size.expect("ambiguity is not fatal"), Some(16));
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "ambiguous declarations of equal specificity, the last one wins"
        );
        assert_eq!(warnings[0].field("kept"), Some("mapping file 'b.xml'"));
        assert_eq!(warnings[0].field("overridden"), Some("mapping file 'a.xml'"));
    }

    #[test]
    fn same_source_twice_is_a_configuration_error() {
        let tags = vec![
            DeclaredTag::new(Tag::BatchSize { size: 4 }, DeclarationSource::Annotation),
            DeclaredTag::new(Tag::BatchSize { size: 4 }, DeclarationSource::Annotation),
        ];
        let err = Declarations::new("shop.Order", &tags)
            .find(TagKind::BatchSize)
            .expect_err("duplicate annotation must fail");

        assert_eq!(err.kind(), MappingErrorKind::Configuration);
        assert_eq!(err.class(), Some("shop.Order"));
    }

    #[test]
    fn all_returns_repeatable_declarations() {
        let tags = vec![
            DeclaredTag::new(Tag::Immutable, DeclarationSource::Annotation),
            DeclaredTag::new(Tag::Immutable, mapping("orm.xml")),
        ];

        assert_eq!(
            Declarations::new("shop.Order", &tags)
                .all(TagKind::Immutable)
                .count(),
            2
        );
    }
}
