// ==========================================
// Fieldwork costing - API layer errors
// ==========================================
// Responsibility: one error type for the facade, mapping lower
// layers into user-facing kinds
// User-facing kinds: validation failure, rate-card resolution
// ==========================================

use crate::catalogue::error::{CatalogueError, RateCardAxis};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Process exit codes of the headless CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION: i32 = 2;
    pub const CATALOGUE: i32 = 3;
}

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // User-facing
    // ==========================================
    #[error("validation failed ({field}): {message}")]
    ValidationFailure { field: String, message: String },

    #[error("rate card unavailable ({axis}): {detail}")]
    RateCardUnavailable { axis: RateCardAxis, detail: String },

    // ==========================================
    // Lower layers
    // ==========================================
    #[error("catalogue error: {0}")]
    Catalogue(CatalogueError),

    #[error("element-costs store error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error("project document error ({path}): {message}")]
    Document { path: String, message: String },

    #[error("export failed: {0}")]
    Export(String),

    // ==========================================
    // Generic
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationFailure {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 2 = validation, 3 = catalogue resolution, 1 = anything else
    pub fn exit_code(&self) -> i32 {
        match self {
            ApiError::ValidationFailure { .. } => exit_codes::VALIDATION,
            ApiError::RateCardUnavailable { .. } | ApiError::Catalogue(_) => exit_codes::CATALOGUE,
            _ => exit_codes::FAILURE,
        }
    }
}

// ==========================================
// From CatalogueError
// ==========================================
// Rate-card misses keep their axis; load failures stay wrapped
impl From<CatalogueError> for ApiError {
    fn from(err: CatalogueError) -> Self {
        match err {
            CatalogueError::RateCardUnavailable { axis, detail } => {
                ApiError::RateCardUnavailable { axis, detail }
            }
            other => ApiError::Catalogue(other),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::Export(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ApiError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ApiError::Export(err.to_string())
    }
}

/// Result alias
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ApiError::validation("symphony", "bad").exit_code(), 2);

        let err: ApiError = CatalogueError::unavailable(RateCardAxis::Level, "no L3").into();
        assert!(matches!(err, ApiError::RateCardUnavailable { axis: RateCardAxis::Level, .. }));
        assert_eq!(err.exit_code(), 3);

        let err: ApiError = CatalogueError::FileNotFound("rate_cards.json".to_string()).into();
        assert_eq!(err.exit_code(), 3);

        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert_eq!(err.exit_code(), 1);
    }
}
