// ==========================================
// Fieldwork costing - repository layer
// ==========================================
// Rule: no pricing logic in repositories
// All queries are parameterised
// ==========================================

pub mod element_cost_repo;
pub mod error;

pub use element_cost_repo::{
    ElementCostLookup, ElementCostRecord, ElementCostRepository, ElementCostValue, ProjectMetadata,
};
pub use error::{RepositoryError, RepositoryResult};
