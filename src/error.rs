//! Error types for bookalign.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookalignError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Manifest errors
    #[error("Failed to open manifest at {path}: {message}")]
    ManifestOpen { path: String, message: String },

    #[error("Failed to parse manifest record at line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    #[error("Failed to write manifest record: {message}")]
    ManifestWrite { message: String },

    // Reference book errors
    #[error("Failed to read reference book at {path}: {message}")]
    BookRead { path: String, message: String },

    // Batch construction errors
    #[error(
        "Query token count mismatch: documents hold {expected} tokens but the \
         boundary table reports {actual}"
    )]
    TokenCountMismatch { expected: usize, actual: usize },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, BookalignError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = BookalignError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = BookalignError::ConfigInvalidValue {
            key: "min_duration".to_string(),
            message: "must be less than max_duration".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for min_duration: must be less than max_duration"
        );
    }

    #[test]
    fn test_manifest_parse_display() {
        let error = BookalignError::ManifestParse {
            line: 17,
            message: "missing field `id`".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse manifest record at line 17: missing field `id`"
        );
    }

    #[test]
    fn test_book_read_display() {
        let error = BookalignError::BookRead {
            path: "/books/moby_dick.txt".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to read reference book at /books/moby_dick.txt: permission denied"
        );
    }

    #[test]
    fn test_token_count_mismatch_display() {
        let error = BookalignError::TokenCountMismatch {
            expected: 120,
            actual: 118,
        };
        let text = error.to_string();
        assert!(text.contains("120"));
        assert!(text.contains("118"));
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: BookalignError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: BookalignError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<BookalignError>();
        assert_sync::<BookalignError>();
    }
}
