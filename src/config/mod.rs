// ==========================================
// Fieldwork costing - configuration layer
// ==========================================
// Static catalogues + estimator settings over config_kv
// ==========================================

pub mod catalogues;
pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager, EstimatorConfig, StationeryFeeTable};
