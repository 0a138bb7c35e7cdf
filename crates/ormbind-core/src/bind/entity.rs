use crate::{
    cache::resolve_caching,
    context::BindingContext,
    declaration::Declarations,
    node::{
        Attribute, CustomSql, EntityDescriptor, EntityKind, GeneratedId, IdType,
        RootEntityDescriptor, SubclassDescriptor,
    },
    table::resolve_table,
};
use ormbind_schema::{
    MappingError,
    hierarchy::Hierarchy,
    index::Index,
    node::{ClassMetadata, EntityOptionsTag, MemberMetadata, MemberTag, Tag, TagKind},
    types::{AccessType, InheritanceType, PolymorphismType},
};
use std::{collections::BTreeSet, iter};
use tracing::warn;

// Declarations that only mean something on the root entity of a family.
const ROOT_ONLY: [TagKind; 6] = [
    TagKind::Cache,
    TagKind::DiscriminatorColumn,
    TagKind::Immutable,
    TagKind::Inheritance,
    TagKind::RowId,
    TagKind::Where,
];

///
/// Family
/// State fixed by the root entity and inherited by every subclass entity.
///

#[derive(Clone, Debug)]
pub(super) struct Family {
    pub root_entity: String,
    pub inheritance: InheritanceType,
    pub access: AccessType,
    pub discriminator_column: Option<String>,
}

pub(super) fn root_family(
    class: &ClassMetadata,
    has_subclasses: bool,
    ctx: &BindingContext<'_>,
    id_placement: Option<AccessType>,
) -> Result<Family, MappingError> {
    let decls = Declarations::new(&class.name, &class.tags);

    let inheritance = decls
        .pick(TagKind::Inheritance, |tag| match tag {
            Tag::Inheritance { strategy } => Some(*strategy),
            _ => None,
        })?
        .unwrap_or_default();

    let explicit_column = decls.pick(TagKind::DiscriminatorColumn, |tag| match tag {
        Tag::DiscriminatorColumn { name } => Some(name.clone()),
        _ => None,
    })?;
    let discriminator_column = match explicit_column {
        Some(column) => Some(column),
        None if inheritance == InheritanceType::SingleTable && has_subclasses => {
            Some(ctx.discriminator_column_name())
        }
        None => None,
    };

    Ok(Family {
        root_entity: class.name.clone(),
        inheritance,
        access: resolve_access(class, ctx, id_placement)?,
        discriminator_column,
    })
}

/// Class access tag, else placement of the identifier among the class and
/// its ancestors, else `id_placement` of the whole hierarchy, else the
/// context default.
pub(super) fn resolve_access(
    class: &ClassMetadata,
    ctx: &BindingContext<'_>,
    id_placement: Option<AccessType>,
) -> Result<AccessType, MappingError> {
    if let Some(access) = explicit_access(class)? {
        return Ok(access);
    }

    let placed = identifier_access(lineage(class, ctx.index()));

    Ok(placed.or(id_placement).unwrap_or_else(|| ctx.access()))
}

/// Access implied by the first identifier member anywhere in `hierarchy`.
/// A mapped superclass above the id-bearing entity takes its access from
/// here.
pub(super) fn hierarchy_id_placement(hierarchy: &Hierarchy, index: &Index) -> Option<AccessType> {
    identifier_access(
        hierarchy
            .members()
            .iter()
            .flat_map(move |member| lineage(member.class(), index)),
    )
}

fn identifier_access<'a>(classes: impl Iterator<Item = &'a ClassMetadata>) -> Option<AccessType> {
    classes
        .flat_map(|class| class.members.iter())
        .find(|member| member.is_identifier())
        .map(|member| member.kind.access())
}

pub(super) fn subclass_access(
    class: &ClassMetadata,
    family: &Family,
) -> Result<AccessType, MappingError> {
    Ok(explicit_access(class)?.unwrap_or(family.access))
}

fn explicit_access(class: &ClassMetadata) -> Result<Option<AccessType>, MappingError> {
    Declarations::new(&class.name, &class.tags).pick(TagKind::Access, |tag| match tag {
        Tag::Access { access } => Some(*access),
        _ => None,
    })
}

/// Persistent attributes declared by `class` itself.
pub(super) fn attributes(class: &ClassMetadata, access: AccessType) -> Vec<Attribute> {
    class
        .members
        .iter()
        .filter_map(|member| Attribute::from_member(member, access))
        .collect()
}

/// Identifier shape from the members of `class` and all its ancestors.
pub(super) fn id_type(class: &ClassMetadata, index: &Index) -> Result<IdType, MappingError> {
    let members: Vec<&MemberMetadata> = lineage(class, index)
        .flat_map(|class| class.members.iter())
        .collect();

    let embedded = members
        .iter()
        .filter(|member| member.has_tag(&MemberTag::EmbeddedId))
        .count();
    let simple = members
        .iter()
        .filter(|member| member.has_tag(&MemberTag::Id) && !member.has_tag(&MemberTag::EmbeddedId))
        .count();

    match (simple, embedded) {
        (0, 0) => Ok(IdType::None),
        (1, 0) => Ok(IdType::Simple),
        (_, 0) => Ok(IdType::Composite),
        (0, 1) => Ok(IdType::Embedded),
        (0, _) => Err(MappingError::configuration(
            &class.name,
            format!("declares {embedded} EmbeddedId members, at most one is allowed"),
        )),
        _ => Err(MappingError::configuration(
            &class.name,
            "declares both Id and EmbeddedId members",
        )),
    }
}

pub(super) fn entity_descriptor(
    class: &ClassMetadata,
    ctx: &BindingContext<'_>,
    family: &Family,
) -> Result<EntityDescriptor, MappingError> {
    let decls = Declarations::new(&class.name, &class.tags);
    let is_root = family.root_entity == class.name;

    let public_name = decls
        .pick(TagKind::Entity, |tag| match tag {
            Tag::Entity(entity) => entity.name.clone(),
            _ => None,
        })?
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| class.simple_name().to_string());

    let options = decls
        .pick(TagKind::EntityOptions, |tag| match tag {
            Tag::EntityOptions(options) => Some(options.clone()),
            _ => None,
        })?
        .unwrap_or_default();

    let (lazy, proxy) = proxy(class, decls, ctx)?;

    let tuplizer = decls
        .pick(TagKind::Tuplizer, |tag| match tag {
            Tag::Tuplizer { implementation } => Some(implementation.as_str()),
            _ => None,
        })?
        .map(|name| ctx.resolve_class(name, class).map(|found| found.name.clone()))
        .transpose()?;

    let custom_sql = |kind| {
        decls.pick(kind, |tag| match tag {
            Tag::SqlInsert(sql)
            | Tag::SqlUpdate(sql)
            | Tag::SqlDelete(sql)
            | Tag::SqlDeleteAll(sql) => Some(CustomSql::from(sql)),
            _ => None,
        })
    };
    let custom_delete = match custom_sql(TagKind::SqlDeleteAll)? {
        Some(all) => Some(all),
        None => custom_sql(TagKind::SqlDelete)?,
    };

    let synchronized_tables: BTreeSet<String> = decls
        .pick(TagKind::Synchronize, |tag| match tag {
            Tag::Synchronize { tables } => Some(tables.iter().cloned().collect()),
            _ => None,
        })?
        .unwrap_or_default();

    let discriminator_value = decls
        .pick(TagKind::DiscriminatorValue, |tag| match tag {
            Tag::DiscriminatorValue { value } => Some(value.clone()),
            _ => None,
        })?
        .or_else(|| {
            family
                .discriminator_column
                .as_ref()
                .map(|_| public_name.clone())
        });

    let kind = if is_root {
        EntityKind::Root(root_descriptor(class, decls, &options, ctx, family)?)
    } else {
        EntityKind::Subclass(subclass_descriptor(class, decls, ctx, family)?)
    };

    Ok(EntityDescriptor {
        entity_name: class.name.clone(),
        public_name,
        inheritance: family.inheritance,
        lazy,
        proxy,
        persister: persister(class, decls, &options, ctx)?,
        tuplizer,
        batch_size: decls.pick(TagKind::BatchSize, |tag| match tag {
            Tag::BatchSize { size } => Some(*size),
            _ => None,
        })?,
        dynamic_insert: options.dynamic_insert.unwrap_or(false),
        dynamic_update: options.dynamic_update.unwrap_or(false),
        select_before_update: options.select_before_update.unwrap_or(false),
        custom_insert: custom_sql(TagKind::SqlInsert)?,
        custom_update: custom_sql(TagKind::SqlUpdate)?,
        custom_delete,
        custom_loader: decls.pick(TagKind::Loader, |tag| match tag {
            Tag::Loader { named_query } => Some(named_query.clone()),
            _ => None,
        })?,
        synchronized_tables,
        discriminator_value,
        kind,
    })
}

fn root_descriptor(
    class: &ClassMetadata,
    decls: Declarations<'_>,
    options: &EntityOptionsTag,
    ctx: &BindingContext<'_>,
    family: &Family,
) -> Result<RootEntityDescriptor, MappingError> {
    let immutable = decls.has(TagKind::Immutable)?;

    let cache = decls.pick(TagKind::Cache, |tag| match tag {
        Tag::Cache(cache) => Some(cache),
        _ => None,
    })?;
    let cacheable = decls.pick(TagKind::Cacheable, |tag| match tag {
        Tag::Cacheable { value } => Some(*value),
        _ => None,
    })?;
    let table = decls.pick(TagKind::Table, |tag| match tag {
        Tag::Table(table) => Some(table),
        _ => None,
    })?;
    let id_type = id_type(class, ctx.index())?;

    Ok(RootEntityDescriptor {
        mutable: !immutable && options.mutable.unwrap_or(true),
        explicit_polymorphism: options.polymorphism == Some(PolymorphismType::Explicit),
        where_clause: decls.pick(TagKind::Where, |tag| match tag {
            Tag::Where { clause } => Some(clause.clone()),
            _ => None,
        })?,
        row_id: decls.pick(TagKind::RowId, |tag| match tag {
            Tag::RowId { column } => Some(column.clone()),
            _ => None,
        })?,
        caching: resolve_caching(&class.name, cache, cacheable, ctx)?,
        optimistic_lock: options.optimistic_lock.unwrap_or_default(),
        table: resolve_table(&class.name, table, check(decls)?, ctx)?,
        id_type,
        generated_id: generated_id(class, ctx.index(), id_type)?,
        discriminator_column: family.discriminator_column.clone(),
    })
}

fn subclass_descriptor(
    class: &ClassMetadata,
    decls: Declarations<'_>,
    ctx: &BindingContext<'_>,
    family: &Family,
) -> Result<SubclassDescriptor, MappingError> {
    for kind in ROOT_ONLY {
        if decls.has(kind)? {
            warn!(
                class = %class.name,
                root = %family.root_entity,
                tag = %kind,
                "declaration only applies to the root entity and is ignored"
            );
        }
    }

    let table = decls.pick(TagKind::Table, |tag| match tag {
        Tag::Table(table) => Some(table),
        _ => None,
    })?;

    let check = check(decls)?;

    let table = if family.inheritance.subclass_owns_table() {
        Some(resolve_table(&class.name, table, check, ctx)?)
    } else {
        if table.is_some() || check.is_some() {
            warn!(
                class = %class.name,
                inheritance = %family.inheritance,
                "table declaration on a single-table subclass is ignored"
            );
        }
        None
    };

    Ok(SubclassDescriptor {
        root_entity: family.root_entity.clone(),
        table,
    })
}

fn check<'a>(decls: Declarations<'a>) -> Result<Option<&'a str>, MappingError> {
    decls.pick(TagKind::Check, |tag| match tag {
        Tag::Check { constraint } => Some(constraint.as_str()),
        _ => None,
    })
}

// Only the single Id member of a simple identifier may ask for a generated
// value.
fn generated_id(
    class: &ClassMetadata,
    index: &Index,
    id_type: IdType,
) -> Result<Option<GeneratedId>, MappingError> {
    let requests: Vec<_> = lineage(class, index)
        .flat_map(|class| class.members.iter())
        .filter_map(|member| member.generated_value().map(|tag| (member, tag)))
        .collect();

    if let Some((member, _)) = requests
        .iter()
        .find(|(member, _)| !member.has_tag(&MemberTag::Id))
    {
        return Err(MappingError::configuration(
            &class.name,
            format!("member '{}' has GeneratedValue but is not an Id", member.name),
        ));
    }
    let Some((member, tag)) = requests.first() else {
        return Ok(None);
    };
    if id_type != IdType::Simple {
        return Err(MappingError::configuration(
            &class.name,
            format!("GeneratedValue on '{}' needs a single Id member", member.name),
        ));
    }

    Ok(Some(GeneratedId {
        member: member.name.clone(),
        strategy: tag.strategy.unwrap_or_default(),
        generator: tag.generator.clone().filter(|name| !name.is_empty()),
    }))
}

// No proxy declaration: lazy, proxied by the class itself.
fn proxy(
    class: &ClassMetadata,
    decls: Declarations<'_>,
    ctx: &BindingContext<'_>,
) -> Result<(bool, Option<String>), MappingError> {
    let declared = decls.pick(TagKind::Proxy, |tag| match tag {
        Tag::Proxy(proxy) => Some(proxy),
        _ => None,
    })?;

    let Some(declared) = declared else {
        return Ok((true, Some(class.name.clone())));
    };
    if !declared.lazy.unwrap_or(true) {
        return Ok((false, None));
    }

    let proxy = match &declared.proxy_class {
        Some(name) => ctx.resolve_class(name, class)?.name.clone(),
        None => class.name.clone(),
    };

    Ok((true, Some(proxy)))
}

fn persister(
    class: &ClassMetadata,
    decls: Declarations<'_>,
    options: &EntityOptionsTag,
    ctx: &BindingContext<'_>,
) -> Result<Option<String>, MappingError> {
    let declared = decls.pick(TagKind::Persister, |tag| match tag {
        Tag::Persister { implementation } => Some(implementation.as_str()),
        _ => None,
    })?;

    let chosen = match (declared, options.persister.as_deref()) {
        (Some(declared), Some(option)) if declared != option => {
            warn!(
                class = %class.name,
                kept = %declared,
                overridden = %option,
                "persister declared twice, the Persister declaration wins"
            );
            Some(declared)
        }
        (declared, option) => declared.or(option),
    };

    chosen
        .map(|name| ctx.resolve_class(name, class).map(|found| found.name.clone()))
        .transpose()
}

// The class followed by its indexed ancestors, nearest first.
fn lineage<'a>(
    class: &'a ClassMetadata,
    index: &'a Index,
) -> impl Iterator<Item = &'a ClassMetadata> + 'a {
    iter::once(class).chain(index.ancestors(class).map(|ancestor| &**ancestor))
}
