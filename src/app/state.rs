// ==========================================
// Fieldwork costing - application state
// ==========================================
// Responsibility: load immutable catalogues once, open the
// element-costs store and config, hand out models and facades
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::api::error::{ApiError, ApiResult};
use crate::api::estimate_api::EstimateApi;
use crate::app::project_model::ProjectModel;
use crate::catalogue::hierarchy::CostHierarchy;
use crate::catalogue::industries::IndustriesCatalogue;
use crate::catalogue::rate_card::RateCardCatalogue;
use crate::config::config_manager::{ConfigManager, EstimatorConfig};
use crate::db::open_sqlite_connection;
use crate::repository::element_cost_repo::ElementCostRepository;
use crate::repository::error::RepositoryError;

/// Catalogue and store locations
#[derive(Debug, Clone, Default)]
pub struct CataloguePaths {
    pub hierarchy: PathBuf,
    pub rate_cards: Option<PathBuf>,
    pub industries: Option<PathBuf>,
    /// Element-costs + config database
    pub db: Option<PathBuf>,
}

/// Application state
///
/// Catalogues are immutable for the session; the store is read-only
/// during cost computation.
pub struct AppState {
    pub hierarchy: Arc<CostHierarchy>,
    /// None: sample plans are taken from the document as saved
    pub rate_cards: Option<Arc<RateCardCatalogue>>,
    pub industries: Arc<IndustriesCatalogue>,
    pub element_costs: Option<Arc<ElementCostRepository>>,
    pub config: EstimatorConfig,
}

impl AppState {
    /// Load every catalogue eagerly
    ///
    /// - no rate-card path: sample plans are not rebuilt
    /// - no industries path: no price overrides
    /// - no db path: compiled-in config defaults, catalogue costs only
    pub fn new(paths: &CataloguePaths) -> ApiResult<Self> {
        tracing::info!(hierarchy = %paths.hierarchy.display(), "loading catalogues");

        let hierarchy = CostHierarchy::load(&paths.hierarchy)?;
        let rate_cards = paths.rate_cards.as_ref().map(RateCardCatalogue::load).transpose()?;
        let industries = match &paths.industries {
            Some(path) => IndustriesCatalogue::load(path)?,
            None => IndustriesCatalogue::new(),
        };

        let (element_costs, config) = match &paths.db {
            Some(db) => {
                let (repo, config) = open_store(db)?;
                (Some(Arc::new(repo)), config)
            }
            None => (None, EstimatorConfig::default()),
        };

        Ok(Self::from_parts(hierarchy, rate_cards, industries, element_costs, config))
    }

    pub fn from_parts(
        hierarchy: CostHierarchy,
        rate_cards: Option<RateCardCatalogue>,
        industries: IndustriesCatalogue,
        element_costs: Option<Arc<ElementCostRepository>>,
        config: EstimatorConfig,
    ) -> Self {
        Self {
            hierarchy: Arc::new(hierarchy),
            rate_cards: rate_cards.map(Arc::new),
            industries: Arc::new(industries),
            element_costs,
            config,
        }
    }

    /// Fresh project model over the shared catalogues
    pub fn project_model(&self) -> ProjectModel {
        ProjectModel::new(
            self.rate_cards.clone().unwrap_or_default(),
            self.industries.clone(),
            self.config.clone(),
        )
    }

    /// Cost-estimate facade over the shared catalogues
    pub fn estimate_api(&self) -> EstimateApi {
        EstimateApi::new(
            self.hierarchy.clone(),
            self.rate_cards.clone(),
            self.industries.clone(),
            self.element_costs.clone(),
            self.config.stationery_fees.clone(),
        )
    }
}

/// Open the store (schema created if missing) and read config from it
pub fn open_store(db: &Path) -> ApiResult<(ElementCostRepository, EstimatorConfig)> {
    let db_path = db.to_string_lossy();
    let conn = open_sqlite_connection(&db_path)
        .map_err(|e| ApiError::Repository(RepositoryError::DatabaseConnectionError(e.to_string())))?;
    let conn = Arc::new(Mutex::new(conn));

    let repo = ElementCostRepository::from_connection(conn.clone())?;
    let config = ConfigManager::from_connection(conn)?.load_estimator_config()?;
    tracing::info!(db = %db_path, "element-costs store opened");
    Ok((repo, config))
}

/// Default database path
///
/// - FIELDWORK_COSTING_DB_PATH when set
/// - otherwise <user data dir>/fieldwork-costing/fieldwork_costing.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("FIELDWORK_COSTING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./fieldwork_costing.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("fieldwork-costing");
        // best-effort: fall back to the working directory
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("fieldwork_costing.db");
        }
    }
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_missing_hierarchy_is_catalogue_error() {
        let paths = CataloguePaths {
            hierarchy: PathBuf::from("/nonexistent/hierarchy.json"),
            ..Default::default()
        };
        let err = AppState::new(&paths).err().unwrap();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_store_seeds_config_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (repo, config) = open_store(file.path()).unwrap();
        assert!(repo.list_project_types().unwrap().is_empty());
        assert_eq!(config, EstimatorConfig::default());
    }
}
