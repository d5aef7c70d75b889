use crate::classify::TypeTag;

/// Error types for sqlx-cast-bind
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value could not be classified or cast
    #[error("Type of {0} is unknown")]
    UnknownType(String),

    /// A parameter map violated its schema
    #[error("Parameter validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The backend cannot perform the requested capability
    #[error("Operation not supported by {backend}: {operation}")]
    UnsupportedOperation {
        backend: &'static str,
        operation: &'static str,
    },

    /// Text casting needs a live connection and auto-connect is disabled
    #[error("A live connection is required to escape text values")]
    ConnectionRequired,

    /// A schema description could not be read
    #[error("Invalid schema description: {0}")]
    Schema(#[from] serde_json::Error),

    /// Error during SQL template parsing
    #[error("Failed to parse SQL template: {0}")]
    Parse(#[from] regex::Error),

    /// Error from SQLx database operations
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Placeholder was referenced but no value was registered for it
    #[error("Placeholder '{0}' was not bound to a value")]
    UnboundPlaceholder(String),
}

/// Schema contract violations reported by [`validate`](crate::mapper::validate)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Keys present in the parameters but not declared in the schema
    #[error("surplus parameters: {}", .0.join(", "))]
    SurplusParameter(Vec<String>),

    /// A mandatory parameter is missing
    #[error("parameter '{0}' is missing but mandatory")]
    MissingMandatory(String),

    /// An optional parameter is missing and declares no default
    #[error("missing parameter '{0}' has no default")]
    MissingNoDefault(String),

    /// A parameter's runtime type differs from the declared one
    #[error("parameter '{name}' is of type {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: TypeTag,
        found: TypeTag,
    },
}

/// Result type alias for sqlx-cast-bind operations
pub type Result<T> = std::result::Result<T, Error>;
