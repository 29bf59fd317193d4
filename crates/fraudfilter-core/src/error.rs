//! Error types for FraudFilter

/// Result type alias using FraudFilter's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for FraudFilter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model registry failed to load; every request is refused until restart
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Required review-text column missing from tabular input
    #[error("schema error: {0}")]
    Schema(String),

    /// No usable review records after filtering
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Transform or predict failure on a single record
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model-unavailable error
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new empty-input error
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Errors that abort the whole request with no partial payload
    pub fn is_request_fatal(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable(_) | Self::Schema(_) | Self::EmptyInput(_)
        )
    }

    /// Short machine-readable kind, used for metric labels and error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::Schema(_) => "schema_error",
            Self::EmptyInput(_) => "empty_input",
            Self::Classifier(_) => "classifier_error",
            Self::Config(_) => "configuration_error",
            Self::Io(_) => "io_error",
            Self::Serialization(_) => "serialization_error",
            Self::Internal(_) => "internal_error",
        }
    }
}
