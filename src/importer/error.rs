// ==========================================
// Fieldwork costing - importer error type
// ==========================================
// thiserror enum; row numbers are 1-based sheet rows
// (the header is row 1)
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    #[error("JSON parse failed: {0}")]
    JsonParseError(String),

    // ===== Mapping =====
    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("field mapping failed (row {row}): {message}")]
    FieldMappingError { row: usize, message: String },

    #[error("type conversion failed (row {row}, field {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    // ===== Store =====
    #[error(transparent)]
    Repository(#[from] crate::repository::error::RepositoryError),

    // ===== General =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonParseError(err.to_string())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
