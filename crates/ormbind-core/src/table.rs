//! Table descriptor resolution.
//!
//! An explicit, non-empty value always wins. A missing schema or catalog
//! falls back to the binding context; a missing table name stays unset for
//! the physical naming step downstream. No table name is ever invented here.
//! Unique constraints that share a name are merged into one; a constraint
//! without columns is rejected.

use crate::context::BindingContext;
use ormbind_schema::{
    MappingError,
    node::{TableTag, UniqueConstraintTag},
};

///
/// TableDescriptor
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TableDescriptor {
    pub schema: Option<String>,
    pub catalog: Option<String>,
    pub name: Option<String>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub check_constraint: Option<String>,

    /// Entity name of the owning entity.
    pub owner: String,
}

///
/// UniqueConstraint
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UniqueConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Resolve the table of `owner` from its (possibly absent) table declaration
/// and check constraint.
pub fn resolve_table(
    owner: &str,
    explicit: Option<&TableTag>,
    check: Option<&str>,
    ctx: &BindingContext<'_>,
) -> Result<TableDescriptor, MappingError> {
    let explicit = explicit.cloned().unwrap_or_default();

    Ok(TableDescriptor {
        schema: non_empty(explicit.schema).or_else(|| ctx.default_schema()),
        catalog: non_empty(explicit.catalog).or_else(|| ctx.default_catalog()),
        name: non_empty(explicit.name),
        unique_constraints: unique_constraints(owner, explicit.unique_constraints)?,
        check_constraint: check
            .filter(|check| !check.trim().is_empty())
            .map(str::to_string),
        owner: owner.to_string(),
    })
}

fn unique_constraints(
    owner: &str,
    declared: Vec<UniqueConstraintTag>,
) -> Result<Vec<UniqueConstraint>, MappingError> {
    let mut constraints: Vec<UniqueConstraint> = Vec::new();

    for constraint in declared {
        let name = non_empty(constraint.name);
        let columns: Vec<String> = constraint
            .columns
            .into_iter()
            .filter(|column| !column.trim().is_empty())
            .collect();
        if columns.is_empty() {
            return Err(MappingError::configuration(
                owner,
                format!(
                    "unique constraint '{}' lists no columns",
                    name.as_deref().unwrap_or("<unnamed>")
                ),
            ));
        }

        let existing = name.as_ref().and_then(|name| {
            constraints
                .iter()
                .position(|c| c.name.as_ref() == Some(name))
        });
        let at = match existing {
            Some(at) => at,
            None => {
                constraints.push(UniqueConstraint {
                    name,
                    columns: Vec::new(),
                });
                constraints.len() - 1
            }
        };

        let target = &mut constraints[at].columns;
        for column in columns {
            if !target.contains(&column) {
                target.push(column);
            }
        }
    }

    Ok(constraints)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::MappingDefaults, test_support::index_of};
    use ormbind_schema::{MappingErrorKind, types::SharedCacheMode};

    fn defaults() -> MappingDefaults {
        MappingDefaults {
            schema: Some("PUBLIC".to_string()),
            catalog: Some("MAIN".to_string()),
            ..MappingDefaults::default()
        }
    }

    #[test]
    fn explicit_schema_wins_and_catalog_falls_back() {
        let index = index_of(Vec::new());
        let defaults = defaults();
        let ctx = BindingContext::root(&index, &defaults, SharedCacheMode::Unspecified);

        let table = resolve_table(
            "sales.Customer",
            Some(&TableTag {
                schema: Some("SALES".to_string()),
                ..TableTag::default()
            }),
            None,
            &ctx,
        )
        .expect("table resolves");

        assert_eq!(table.schema.as_deref(), Some("SALES"));
        assert_eq!(table.catalog.as_deref(), Some("MAIN"));
        assert_eq!(table.name, None);
        assert_eq!(table.owner, "sales.Customer");
    }

    #[test]
    fn absent_declaration_takes_context_defaults_and_no_name() {
        let index = index_of(Vec::new());
        let defaults = defaults();
        let ctx = BindingContext::root(&index, &defaults, SharedCacheMode::Unspecified);

        let table = resolve_table("shop.Order", None, None, &ctx)
            .expect("table resolves");

        assert_eq!(table.schema.as_deref(), Some("PUBLIC"));
        assert_eq!(table.catalog.as_deref(), Some("MAIN"));
        assert_eq!(table.name, None, "table names are never invented");
        assert!(table.unique_constraints.is_empty());
        assert_eq!(table.check_constraint, None);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let index = index_of(Vec::new());
        let defaults = MappingDefaults::default();
        let ctx = BindingContext::root(&index, &defaults, SharedCacheMode::Unspecified);

        let table = resolve_table(
            "shop.Order",
            Some(&TableTag {
                schema: Some(String::new()),
                catalog: None,
                name: Some(String::new()),
                unique_constraints: Vec::new(),
            }),
            None,
            &ctx,
        )
        .expect("table resolves");

        assert_eq!(table.schema, None);
        assert_eq!(table.catalog, None);
        assert_eq!(table.name, None);
    }

    #[test]
    fn explicit_name_is_kept_verbatim() {
        let index = index_of(Vec::new());
        let defaults = MappingDefaults::default();
        let ctx = BindingContext::root(&index, &defaults, SharedCacheMode::Unspecified);

        let table = resolve_table(
            "shop.Order",
            Some(&TableTag {
                name: Some("T_ORDER".to_string()),
                ..TableTag::default()
            }),
            None,
            &ctx,
        )
        .expect("table resolves");

        assert_eq!(table.name.as_deref(), Some("T_ORDER"));
    }

    fn unique(name: Option<&str>, columns: &[&str]) -> UniqueConstraintTag {
        UniqueConstraintTag {
            name: name.map(str::to_string),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    #[test]
    fn unique_constraints_sharing_a_name_are_merged() {
        let index = index_of(Vec::new());
        let defaults = MappingDefaults::default();
        let ctx = BindingContext::root(&index, &defaults, SharedCacheMode::Unspecified);

        let table = resolve_table(
            "crm.Contact",
            Some(&TableTag {
                unique_constraints: vec![
                    unique(Some("uk_email"), &["email"]),
                    unique(None, &["first_name", "last_name"]),
                    unique(Some("uk_email"), &["tenant_id", "email"]),
                ],
                ..TableTag::default()
            }),
            Some("age >= 0"),
            &ctx,
        )
        .expect("table resolves");

        assert_eq!(
            table.unique_constraints,
            vec![
                UniqueConstraint {
                    name: Some("uk_email".to_string()),
                    columns: vec!["email".to_string(), "tenant_id".to_string()],
                },
                UniqueConstraint {
                    name: None,
                    columns: vec!["first_name".to_string(), "last_name".to_string()],
                },
            ]
        );
        assert_eq!(table.check_constraint.as_deref(), Some("age >= 0"));
    }

    #[test]
    fn unique_constraint_without_columns_is_rejected() {
        let index = index_of(Vec::new());
        let defaults = MappingDefaults::default();
        let ctx = BindingContext::root(&index, &defaults, SharedCacheMode::Unspecified);

        let err = resolve_table(
            "crm.Contact",
            Some(&TableTag {
                unique_constraints: vec![unique(Some("uk_nothing"), &["  "])],
                ..TableTag::default()
            }),
            None,
            &ctx,
        )
        .expect_err("an empty constraint must fail");

        assert_eq!(err.kind(), MappingErrorKind::Configuration);
        assert_eq!(err.class(), Some("crm.Contact"));
        assert!(err.to_string().contains("'uk_nothing'"));
    }

    #[test]
    fn blank_check_constraint_counts_as_absent() {
        let index = index_of(Vec::new());
        let defaults = MappingDefaults::default();
        let ctx = BindingContext::root(&index, &defaults, SharedCacheMode::Unspecified);

        let table = resolve_table("shop.Order", None, Some(" "), &ctx)
            .expect("table resolves");

        assert_eq!(table.check_constraint, None);
    }
}
