//! Error types with credential sanitization.
//!
//! Errors raised while dumping a schema never carry passwords. Connection
//! failures keep the data source name and the driver message, which Oracle
//! does not populate with credentials.

use thiserror::Error;

/// Main error type for oradump operations.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Database connection failed
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A catalog query or metadata call failed
    #[error("Catalog query failed: {context}")]
    Catalog {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A catalog query returned rows that cannot be formatted
    #[error("Unexpected catalog result: {context}")]
    UnexpectedResult { context: String },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Object type outside the dumpable set
    #[error("Unsupported object: {object_type} {object_name}")]
    UnsupportedObject {
        object_type: String,
        object_name: String,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with `DumpError`
pub type Result<T> = std::result::Result<T, DumpError>;

impl DumpError {
    /// Creates a connection error for a data source.
    ///
    /// Only the data source name is kept as context; user and password are
    /// deliberately not accepted here.
    pub fn connection_failed<E>(data_source: &str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: format!("could not connect to '{data_source}'"),
            source: Box::new(error),
        }
    }

    /// Creates a catalog query error with context
    pub fn query_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Catalog {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for a catalog result with an unexpected shape
    pub fn unexpected_result(context: impl Into<String>) -> Self {
        Self::UnexpectedResult {
            context: context.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an unsupported object error
    pub fn unsupported_object(
        object_type: impl Into<String>,
        object_name: impl Into<String>,
    ) -> Self {
        Self::UnsupportedObject {
            object_type: object_type.into(),
            object_name: object_name.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error came from opening the database connection.
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Renders the error with its full source chain on one line.
    ///
    /// Used for log entries, where the driver message (e.g. `ORA-00942`)
    /// matters more than the outer context.
    pub fn detailed(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
