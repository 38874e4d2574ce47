// ==========================================
// Fieldwork costing - application layer
// ==========================================
// Responsibility: project model + shared catalogue state
// ==========================================

pub mod project_model;
pub mod state;

// Re-exports
pub use project_model::ProjectModel;
pub use state::{get_default_db_path, open_store, AppState, CataloguePaths};
