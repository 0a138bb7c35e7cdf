use super::{GlobalBinder, GlobalMetadata, declared_tags, register};
use crate::{context::BindingContext, node::GeneratedId};
use ormbind_schema::{MappingError, node::Tag, types::GenerationType};
use std::collections::BTreeMap;
use tracing::debug;

/// Allocation size of a sequence generator that does not declare one.
pub const DEFAULT_ALLOCATION_SIZE: u32 = 50;

///
/// IdGenerator
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IdGenerator {
    Generic {
        strategy: String,
        parameters: BTreeMap<String, String>,
    },
    Sequence {
        sequence_name: String,
        allocation_size: u32,
    },
}

impl IdGenerator {
    #[must_use]
    pub fn strategy(&self) -> &str {
        match self {
            Self::Generic { strategy, .. } => strategy.as_str(),
            Self::Sequence { .. } => GenerationType::Sequence.strategy_name(),
        }
    }
}

/// The generator serving `request` on the root entity `entity`. Without a
/// generator name one is synthesized from the requested strategy.
pub fn resolve_generated_id(
    entity: &str,
    request: &GeneratedId,
    metadata: &GlobalMetadata,
) -> Result<IdGenerator, MappingError> {
    let Some(name) = &request.generator else {
        return Ok(IdGenerator::Generic {
            strategy: request.strategy.strategy_name().to_string(),
            parameters: BTreeMap::new(),
        });
    };

    let generator = metadata.generator(name).ok_or_else(|| {
        MappingError::configuration(
            entity,
            format!(
                "GeneratedValue on '{}' refers to undefined generator '{name}'",
                request.member
            ),
        )
    })?;
    if !request.strategy.accepts(generator.strategy()) {
        return Err(MappingError::configuration(
            entity,
            format!(
                "GeneratedValue strategy {} on '{}' is inconsistent with generator '{name}' ({})",
                request.strategy,
                request.member,
                generator.strategy()
            ),
        ));
    }

    Ok(generator.clone())
}

///
/// GeneratorBinder
///

#[derive(Clone, Copy, Debug, Default)]
pub struct GeneratorBinder;

impl GlobalBinder for GeneratorBinder {
    fn name(&self) -> &'static str {
        "identifier generators"
    }

    fn bind(
        &self,
        ctx: &BindingContext<'_>,
        metadata: &mut GlobalMetadata,
    ) -> Result<(), MappingError> {
        for (owner, tag) in declared_tags(ctx.index()) {
            let (name, generator) = match tag {
                Tag::GenericGenerator(def) => (
                    &def.name,
                    IdGenerator::Generic {
                        strategy: def.strategy.clone(),
                        parameters: def.parameters.clone(),
                    },
                ),
                Tag::SequenceGenerator(def) => {
                    let allocation_size = def.allocation_size.unwrap_or(DEFAULT_ALLOCATION_SIZE);
                    if allocation_size == 0 {
                        return Err(MappingError::configuration(
                            owner,
                            format!(
                                "sequence generator '{}' has an allocation size of 0",
                                def.name
                            ),
                        ));
                    }

                    (
                        &def.name,
                        IdGenerator::Sequence {
                            sequence_name: def
                                .sequence_name
                                .clone()
                                .unwrap_or_else(|| def.name.clone()),
                            allocation_size,
                        },
                    )
                }
                _ => continue,
            };

            register(
                &mut metadata.generators,
                "identifier generator",
                name,
                owner,
                generator,
            )?;
        }

        debug!(count = metadata.generators.len(), "identifier generators bound");

        Ok(())
    }
}
