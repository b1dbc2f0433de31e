//! Store error types

use thiserror::Error;

/// Errors produced by validating a template before it is written
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing mandatory field: {field}")]
    MissingField { field: &'static str },

    #[error("Unknown question type: {value}")]
    UnknownQuestionType { value: String },

    #[error("Question type '{question_type}' requires a non-empty options list")]
    OptionsRequired { question_type: String },

    #[error("Question type '{question_type}' does not take options")]
    OptionsNotAllowed { question_type: String },

    #[error("Order index {order_index} is already taken in category '{category}'")]
    DuplicateOrderIndex { category: String, order_index: i64 },
}

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Question template not found: {id}")]
    NotFound { id: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check if this error refers to a missing template
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if this error was rejected before any write was attempted
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound { id: 42 };
        assert!(err.to_string().contains("42"));
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_message() {
        let err = StoreError::Validation(ValidationError::OptionsRequired {
            question_type: "scale".to_string(),
        });
        assert!(err.to_string().contains("scale"));
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_duplicate_order_index_message() {
        let err = ValidationError::DuplicateOrderIndex {
            category: "digestive".to_string(),
            order_index: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("digestive"));
        assert!(msg.contains("3"));
    }
}
