// ==========================================
// Fieldwork costing - configuration manager
// ==========================================
// Responsibility: load, query and override estimator settings
// Storage: config_kv table (key-value + scope)
// Missing keys fall back to config::catalogues defaults
// ==========================================

use crate::config::catalogues;
use crate::db::open_sqlite_connection;
use crate::domain::project::ProjectSettings;
use crate::domain::travel::TravelCostTable;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// province -> stationery description -> unit price
pub type StationeryFeeTable = BTreeMap<String, BTreeMap<String, Decimal>>;

// ==========================================
// EstimatorConfig - snapshot gathered once at startup
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub parking_fee: Decimal,
    pub travel_costs: TravelCostTable,
    pub stationery_fees: StationeryFeeTable,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            parking_fee: catalogues::DEFAULT_PARKING_FEE,
            travel_costs: catalogues::default_travel_costs(),
            stationery_fees: StationeryFeeTable::new(),
        }
    }
}

impl EstimatorConfig {
    /// Project settings seeded from this snapshot on reset
    pub fn project_settings(&self) -> ProjectSettings {
        ProjectSettings {
            parking_fee: self.parking_fee,
            travel_cost_by_level: self.travel_costs.clone(),
        }
    }
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open a ConfigManager on a database file
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build from a shared connection (PRAGMAs are re-applied, idempotent)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Read a global-scope value
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        self.get_config_value(key)
    }

    /// Upsert a global-scope value
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, "config value updated");
        Ok(())
    }

    /// All global values, ordered by key
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// Read a JSON value; malformed JSON logs a warning and yields the default
    fn get_json_or<T>(&self, key: &str, default: impl FnOnce() -> T) -> RepositoryResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let raw = match self.get_config_value(key)? {
            Some(raw) => raw,
            None => return Ok(default()),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(config_key = key, error = %e, "malformed config JSON, using default");
                Ok(default())
            }
        }
    }

    // ===== Typed getters =====

    /// Parking fee per sample (default 5 000)
    pub fn get_parking_fee(&self) -> RepositoryResult<Decimal> {
        let value = self.get_config_value(config_keys::PARKING_FEE)?;
        Ok(value
            .and_then(|v| Decimal::from_str(v.trim()).ok())
            .unwrap_or(catalogues::DEFAULT_PARKING_FEE))
    }

    /// Travel cost per staff level
    pub fn get_travel_costs(&self) -> RepositoryResult<TravelCostTable> {
        self.get_json_or(config_keys::TRAVEL_COSTS, catalogues::default_travel_costs)
    }

    /// Stationery fee tables by province (empty when unconfigured)
    pub fn get_stationery_fees(&self) -> RepositoryResult<StationeryFeeTable> {
        self.get_json_or(config_keys::STATIONERY_FEES, StationeryFeeTable::new)
    }

    pub fn set_travel_costs(&self, table: &TravelCostTable) -> RepositoryResult<()> {
        let raw = serde_json::to_string(table).map_err(|e| RepositoryError::MalformedJson {
            key: config_keys::TRAVEL_COSTS.to_string(),
            message: e.to_string(),
        })?;
        self.set_config_value(config_keys::TRAVEL_COSTS, &raw)
    }

    pub fn set_stationery_fees(&self, table: &StationeryFeeTable) -> RepositoryResult<()> {
        let raw = serde_json::to_string(table).map_err(|e| RepositoryError::MalformedJson {
            key: config_keys::STATIONERY_FEES.to_string(),
            message: e.to_string(),
        })?;
        self.set_config_value(config_keys::STATIONERY_FEES, &raw)
    }

    /// Snapshot every estimator setting in one pass
    pub fn load_estimator_config(&self) -> RepositoryResult<EstimatorConfig> {
        Ok(EstimatorConfig {
            parking_fee: self.get_parking_fee()?,
            travel_costs: self.get_travel_costs()?,
            stationery_fees: self.get_stationery_fees()?,
        })
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    pub const PARKING_FEE: &str = "parking_fee";
    /// JSON: {"Junior": {allowance_per_day, accommodation_per_night, flight_ticket}, ...}
    pub const TRAVEL_COSTS: &str = "travel_cost_by_level";
    /// JSON: {"<province>": {"<description>": price}}
    pub const STATIONERY_FEES: &str = "stationery_fees";
}
