use derive_more::Display;
use thiserror::Error as ThisError;

///
/// MappingError
///
/// Every failure the binder can raise. All of them are deterministic
/// authoring mistakes (or internal misuse), so a single error aborts the
/// whole bootstrap and nothing is retried.
///

#[derive(Debug, ThisError)]
pub enum MappingError {
    #[error("assertion failure: {message}")]
    AssertionFailure { message: String },

    #[error("configuration error in '{class}': {message}")]
    Configuration { class: String, message: String },

    #[error("unable to locate class resource '{class}'")]
    Indexing { class: String },

    #[error("unable to resolve class reference '{class}' (referenced from '{context}')")]
    ReferenceResolution { class: String, context: String },
}

impl MappingError {
    /// Contradictory or invalid declarations on one class.
    pub fn configuration(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            class: class.into(),
            message: message.into(),
        }
    }

    /// A named class could not be located from `context`.
    pub fn reference(class: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ReferenceResolution {
            class: class.into(),
            context: context.into(),
        }
    }

    /// The indexing collaborator could not produce a class resource.
    pub fn indexing(class: impl Into<String>) -> Self {
        Self::Indexing {
            class: class.into(),
        }
    }

    /// Caller violated an internal contract.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailure {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MappingErrorKind {
        match self {
            Self::AssertionFailure { .. } => MappingErrorKind::AssertionFailure,
            Self::Configuration { .. } => MappingErrorKind::Configuration,
            Self::Indexing { .. } => MappingErrorKind::Indexing,
            Self::ReferenceResolution { .. } => MappingErrorKind::ReferenceResolution,
        }
    }

    /// The class the error is about, when there is one.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        match self {
            Self::Configuration { class, .. }
            | Self::Indexing { class }
            | Self::ReferenceResolution { class, .. } => Some(class),
            Self::AssertionFailure { .. } => None,
        }
    }
}

///
/// MappingErrorKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum MappingErrorKind {
    AssertionFailure,
    Configuration,
    Indexing,
    ReferenceResolution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_the_class() {
        let err = MappingError::configuration("zoo.Dog", "declared as both entity and embeddable");

        assert_eq!(err.kind(), MappingErrorKind::Configuration);
        assert_eq!(err.class(), Some("zoo.Dog"));
        assert_eq!(
            err.to_string(),
            "configuration error in 'zoo.Dog': declared as both entity and embeddable"
        );
    }

    #[test]
    fn reference_error_names_both_ends() {
        let err = MappingError::reference("zoo.DogProxy", "zoo.Dog");

        assert_eq!(err.kind(), MappingErrorKind::ReferenceResolution);
        assert!(
            err.to_string().contains("'zoo.DogProxy'") && err.to_string().contains("'zoo.Dog'"),
            "reference errors should name the missing class and its referrer"
        );
    }

    #[test]
    fn assertion_failure_has_no_class() {
        let err = MappingError::assertion("not embeddable");

        assert_eq!(err.kind(), MappingErrorKind::AssertionFailure);
        assert_eq!(err.class(), None);
    }
}
