use super::{GlobalBinder, GlobalMetadata, declared_tags, register};
use crate::context::BindingContext;
use ormbind_schema::{MappingError, node::Tag};
use tracing::debug;

///
/// NamedQuery
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamedQuery {
    pub query: String,

    /// Native SQL rather than the entity query language.
    pub native: bool,
}

///
/// NamedQueryBinder
/// Named queries and named native queries share one namespace.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NamedQueryBinder;

impl GlobalBinder for NamedQueryBinder {
    fn name(&self) -> &'static str {
        "named queries"
    }

    fn bind(
        &self,
        ctx: &BindingContext<'_>,
        metadata: &mut GlobalMetadata,
    ) -> Result<(), MappingError> {
        for (owner, tag) in declared_tags(ctx.index()) {
            let (def, native) = match tag {
                Tag::NamedQuery(def) => (def, false),
                Tag::NamedNativeQuery(def) => (def, true),
                _ => continue,
            };
            if def.query.trim().is_empty() {
                return Err(MappingError::configuration(
                    owner,
                    format!("named query '{}' has no query text", def.name),
                ));
            }

            register(
                &mut metadata.named_queries,
                "named query",
                &def.name,
                owner,
                NamedQuery {
                    query: def.query.clone(),
                    native,
                },
            )?;
        }

        debug!(count = metadata.named_queries.len(), "named queries bound");

        Ok(())
    }
}
