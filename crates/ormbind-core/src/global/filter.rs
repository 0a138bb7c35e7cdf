use super::{GlobalBinder, GlobalMetadata, declared_tags, register};
use crate::context::BindingContext;
use ormbind_schema::{MappingError, node::Tag};
use std::collections::BTreeMap;
use tracing::debug;

///
/// FilterDefinition
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterDefinition {
    pub default_condition: Option<String>,

    /// Parameter name to type name.
    pub parameters: BTreeMap<String, String>,
}

///
/// FilterDefBinder
///

#[derive(Clone, Copy, Debug, Default)]
pub struct FilterDefBinder;

impl GlobalBinder for FilterDefBinder {
    fn name(&self) -> &'static str {
        "filter definitions"
    }

    fn bind(
        &self,
        ctx: &BindingContext<'_>,
        metadata: &mut GlobalMetadata,
    ) -> Result<(), MappingError> {
        for (owner, tag) in declared_tags(ctx.index()) {
            let Tag::FilterDef(def) = tag else {
                continue;
            };

            register(
                &mut metadata.filter_defs,
                "filter definition",
                &def.name,
                owner,
                FilterDefinition {
                    default_condition: def.default_condition.clone(),
                    parameters: def.parameters.clone(),
                },
            )?;
        }

        debug!(count = metadata.filter_defs.len(), "filter definitions bound");

        Ok(())
    }
}
