// ==========================================
// Fieldwork costing - core library
// ==========================================
// Market-research fieldwork cost estimation:
// project document -> sample plan -> flattened cost rows
// Stack: Rust + SQLite + JSON catalogues
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - project document and output rows
pub mod domain;

// Catalogue layer - rate cards, industries, cost hierarchy
pub mod catalogue;

// Repository layer - element-costs store
pub mod repository;

// Engine layer - pricing rules
pub mod engine;

// Importer layer - element-cost sheets
pub mod importer;

// Configuration layer
pub mod config;

// Database infrastructure (connection PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// API layer - validation, estimate, export
pub mod api;

// Application layer - project model, shared state
pub mod app;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::types::{DeviceChoice, PriceType, ProjectType, SampleType, StaffLevel};

// Domain entities
pub use domain::{Audience, CostElement, CostNode, CostRow, CostToggles, GeneralInfo, Project, SamplesMap};

// Catalogues
pub use catalogue::{CatalogueError, CostHierarchy, IndustriesCatalogue, RateCardCatalogue};

// Engine
pub use engine::{EstimateContext, HierarchyFlattener, SamplePlanBuilder};

// API
pub use api::{ApiError, ApiResult, CostEstimate, EstimateApi, ProjectValidator};

// Application
pub use app::{AppState, CataloguePaths, ProjectModel};

// ==========================================
// Constants
// ==========================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name (also the data-dir folder name)
pub const APP_NAME: &str = "fieldwork-costing";
