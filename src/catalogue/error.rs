// ==========================================
// Fieldwork costing - catalogue error types
// ==========================================
// Tool: thiserror derive
// ==========================================

use thiserror::Error;

/// Axis of the rate-card lookup that had no matching row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCardAxis {
    ProjectType,
    Level,
    InterviewLength,
}

impl std::fmt::Display for RateCardAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RateCardAxis::ProjectType => "project_type",
            RateCardAxis::Level => "level",
            RateCardAxis::InterviewLength => "interview_length",
        };
        f.write_str(s)
    }
}

/// Catalogue layer errors
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("rate card unavailable ({axis}): {detail}")]
    RateCardUnavailable { axis: RateCardAxis, detail: String },

    #[error("catalogue file not found: {0}")]
    FileNotFound(String),

    #[error("catalogue read failed ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("catalogue parse failed ({path}): {message}")]
    ParseError { path: String, message: String },
}

impl CatalogueError {
    pub fn unavailable(axis: RateCardAxis, detail: impl Into<String>) -> Self {
        CatalogueError::RateCardUnavailable {
            axis,
            detail: detail.into(),
        }
    }
}

/// Result alias
pub type CatalogueResult<T> = Result<T, CatalogueError>;
