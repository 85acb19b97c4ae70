use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuarryError {
    /// Missing primary key, missing binding, or an entity graph whose shape
    /// disagrees with a binding
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// More than one result column matched a column by name and table
    #[error("Ambiguous column `{column}` (table `{table}`): {matches} result columns match")]
    AmbiguousColumn {
        column: String,
        table: String,
        matches: usize,
    },

    /// The formatter has no rendering rule for this statement shape
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A non-forced write hit a read-only property
    #[error("Property `{property}` is read-only")]
    ReadOnlyProperty { property: String },

    /// A value could not be converted to the requested type
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Error executing a statement or reading its results
    #[error("Execution error: {0}")]
    Execution(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl QuarryError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    pub(crate) fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }
}

/// Result type for quarry operations
pub type Result<T> = std::result::Result<T, QuarryError>;
