use super::{GlobalBinder, GlobalMetadata, declared_tags, register};
use crate::context::BindingContext;
use ormbind_schema::{MappingError, node::Tag};
use std::collections::BTreeMap;
use tracing::debug;

///
/// TypeDefinition
/// Named custom value type with its configuration parameters.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDefinition {
    pub type_class: String,
    pub parameters: BTreeMap<String, String>,
}

///
/// TypeDefBinder
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TypeDefBinder;

impl GlobalBinder for TypeDefBinder {
    fn name(&self) -> &'static str {
        "type definitions"
    }

    fn bind(
        &self,
        ctx: &BindingContext<'_>,
        metadata: &mut GlobalMetadata,
    ) -> Result<(), MappingError> {
        for (owner, tag) in declared_tags(ctx.index()) {
            let Tag::TypeDef(def) = tag else {
                continue;
            };
            if def.name.is_empty() {
                return Err(MappingError::configuration(
                    owner,
                    "type definition has no name",
                ));
            }

            register(
                &mut metadata.type_defs,
                "type definition",
                &def.name,
                owner,
                TypeDefinition {
                    type_class: def.type_class.clone(),
                    parameters: def.parameters.clone(),
                },
            )?;
        }

        debug!(count = metadata.type_defs.len(), "type definitions bound");

        Ok(())
    }
}
