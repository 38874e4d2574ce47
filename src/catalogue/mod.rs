// ==========================================
// Fieldwork costing - catalogue layer
// ==========================================
// Immutable JSON catalogues loaded once at startup:
// rate cards, industries overrides, cost hierarchy
// ==========================================

pub mod error;
pub mod hierarchy;
pub mod industries;
pub mod length_band;
pub mod rate_card;

pub use error::{CatalogueError, CatalogueResult, RateCardAxis};
pub use hierarchy::{element_base_cost, CostHierarchy, BASE_BAND, BASE_LEVEL};
pub use industries::{IndustriesCatalogue, IndustryAudience, IndustryPricing};
pub use length_band::{parse_length_band, LengthRange};
pub use rate_card::{select_level, RateCardCatalogue, RateCardResolution, RateCardRow, RatePricing};

use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a JSON catalogue file
pub(crate) fn load_json_file<T: DeserializeOwned>(path: &Path) -> CatalogueResult<T> {
    if !path.exists() {
        return Err(CatalogueError::FileNotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path).map_err(|e| CatalogueError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| CatalogueError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
