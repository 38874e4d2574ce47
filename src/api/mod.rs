// ==========================================
// Fieldwork costing - API layer
// ==========================================
// Responsibility: validation, cost estimate facade, report export
// ==========================================

pub mod error;
pub mod estimate_api;
pub mod export;
pub mod validator;

// Re-exports
pub use error::{exit_codes, ApiError, ApiResult};
pub use estimate_api::{CostEstimate, EstimateApi};
pub use export::{export_csv, export_report, export_xlsx, write_csv_report, write_xlsx_report};
pub use validator::{ProjectValidator, ValidationOutcome};
