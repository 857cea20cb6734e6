//! Common error types used throughout octopunch.
//!
//! Backends raise these errors and every layer above propagates them
//! unchanged, so the variants describe storage outcomes rather than
//! transport concerns.

/// Common error type for octopunch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No record matches the requested identifier.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "vcenter").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A uniqueness or other schema constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backend could not reach or operate the store.
    #[error("Database error: {0}")]
    Database(String),

    /// The configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error for an entity kind and identifier.
    pub fn not_found<E: Into<String>, I: ToString>(entity: E, id: I) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new Conflict error.
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("vcenter", "abc");
        assert_eq!(err.to_string(), "vcenter not found: abc");

        let err = Error::conflict("name already registered");
        assert_eq!(err.to_string(), "Conflict: name already registered");

        let err = Error::invalid_input("port out of range");
        assert_eq!(err.to_string(), "Invalid input: port out of range");

        let err = Error::database("connection refused");
        assert_eq!(err.to_string(), "Database error: connection refused");

        let err = Error::config("bad toml");
        assert_eq!(err.to_string(), "Configuration error: bad toml");

        let err = Error::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::not_found("vcenter", 1).is_not_found());
        assert!(!Error::database("down").is_not_found());
        assert!(!Error::conflict("dup").is_not_found());
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::database("query failed");
        assert!(matches!(err, Error::Database(_)));

        let err = Error::invalid_input("bad data");
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = Error::conflict("dup");
        assert!(matches!(err, Error::Conflict(_)));

        let err = Error::internal("bug");
        assert!(matches!(err, Error::Internal(_)));
    }
}
