//! Second-level caching policy for root entities.
//!
//! Only the policy is resolved here (region, access mode, scope); the cache
//! engine itself lives downstream.

use crate::context::BindingContext;
use ormbind_schema::{MappingError, node::CacheTag, types::AccessMode};

const INCLUDE_ALL: &str = "all";
const INCLUDE_NON_LAZY: &str = "non-lazy";

///
/// CachingPolicy
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CachingPolicy {
    pub region: String,
    pub access_mode: AccessMode,

    /// `false` when lazy properties are left out of the cached state.
    pub include_all: bool,
}

/// Resolve the caching policy of a root entity.
///
/// An explicit cache declaration wins outright. Otherwise the shared cache
/// mode decides from the cacheable marker (`None` when absent), and a
/// cached entity gets a policy synthesized from the context defaults.
pub fn resolve_caching(
    entity_name: &str,
    explicit: Option<&CacheTag>,
    cacheable: Option<bool>,
    ctx: &BindingContext<'_>,
) -> Result<Option<CachingPolicy>, MappingError> {
    if let Some(cache) = explicit {
        let include_all = match cache.include.as_deref() {
            None | Some(INCLUDE_ALL) => true,
            Some(INCLUDE_NON_LAZY) => false,
            Some(other) => {
                return Err(MappingError::configuration(
                    entity_name,
                    format!(
                        "cache include '{other}' must be '{INCLUDE_ALL}' or '{INCLUDE_NON_LAZY}'"
                    ),
                ));
            }
        };

        return Ok(Some(CachingPolicy {
            region: cache
                .region
                .clone()
                .filter(|region| !region.is_empty())
                .unwrap_or_else(|| entity_name.to_string()),
            access_mode: cache.usage.unwrap_or_else(|| ctx.cache_access_mode()),
            include_all,
        }));
    }

    if !ctx.shared_cache_mode().caches(cacheable) {
        return Ok(None);
    }

    Ok(Some(CachingPolicy {
        region: entity_name.to_string(),
        access_mode: ctx.cache_access_mode(),
        include_all: true,
    }))
}
