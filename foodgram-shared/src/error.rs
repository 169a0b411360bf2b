/// Error type for the recipe core
///
/// Every failure of the Association Writer or the Shopping List Aggregator
/// is one of these variants. Validation and missing references are kept apart:
/// the former means the request itself is malformed, the latter that it points
/// at rows that no longer exist.

use uuid::Uuid;

/// Result alias used throughout the recipe core
pub type RecipeResult<T> = Result<T, RecipeError>;

/// Recipe core error
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// Malformed or inconsistent input, correctable by the caller
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending input field
        field: &'static str,

        /// Human-readable reason
        message: String,
    },

    /// One or more referenced rows do not exist
    #[error("{entity} not found: {}", format_ids(.ids))]
    NotFound {
        /// Kind of the missing row ("recipe", "ingredient", "tag")
        entity: &'static str,

        /// Identities that could not be resolved
        ids: Vec<Uuid>,
    },

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RecipeError {
    /// Builds a validation error for `field`
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        RecipeError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Builds a not-found error for a single row
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        RecipeError::NotFound {
            entity,
            ids: vec![id],
        }
    }

    /// Whether this is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, RecipeError::Validation { .. })
    }

    /// Whether this is a missing-reference failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecipeError::NotFound { .. })
    }
}

fn format_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
