use crate::config::ConfigError;
use ormbind_schema::{MappingError, MappingErrorKind};
use thiserror::Error as ThisError;

///
/// Error
/// Everything a bootstrap can fail with.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl Error {
    /// Classification of a mapping failure; `None` for option errors.
    #[must_use]
    pub const fn mapping_kind(&self) -> Option<MappingErrorKind> {
        match self {
            Self::Mapping(err) => Some(err.kind()),
            Self::Config(_) => None,
        }
    }
}
