use ormbind_core::context::MappingDefaults;
use ormbind_schema::types::SharedCacheMode;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid binding options: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// BindingOptions
///
/// Settings for one bootstrap. Every field is optional in TOML; reading the
/// file is left to the caller.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct BindingOptions {
    pub shared_cache_mode: SharedCacheMode,

    /// Bind hierarchies on the rayon pool instead of the calling thread.
    pub parallel: bool,

    /// Run the type, generator, query and filter binders after entities.
    pub global_binders: bool,

    pub defaults: MappingDefaults,
}

impl BindingOptions {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    #[must_use]
    pub const fn with_shared_cache_mode(mut self, mode: SharedCacheMode) -> Self {
        self.shared_cache_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: MappingDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            shared_cache_mode: SharedCacheMode::default(),
            parallel: false,
            global_binders: true,
            defaults: MappingDefaults::default(),
        }
    }
}

///
/// TESTS
///
