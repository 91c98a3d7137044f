use thiserror::Error;

/// Application error types for better error handling and diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// Errors related to the blob storage backend
    #[error("storage error: {0}")]
    Storage(String),
    /// Filesystem errors from the file-backed store
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Blob encode/decode errors
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Errors reported by the notification service collaborator
    #[error("notification error: {0}")]
    Notify(String),
}

// Convenience constructors
impl Error {
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Error::Storage(msg.into())
    }

    pub fn notify<S: Into<String>>(msg: S) -> Self {
        Error::Notify(msg.into())
    }
}

/// Result type alias for store and scheduler operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::storage("file not found");
        assert_eq!(err.to_string(), "storage error: file not found");
    }

    #[test]
    fn test_error_constructors() {
        let storage_err = Error::storage("test");
        assert!(matches!(storage_err, Error::Storage(_)));

        let notify_err = Error::notify("test");
        assert!(matches!(notify_err, Error::Notify(_)));
    }

    #[test]
    fn test_serde_error_conversion() {
        let bad = serde_json::from_str::<Vec<String>>("not json");
        let err: Error = bad.unwrap_err().into();
        assert!(matches!(err, Error::Serialize(_)));
    }
}
