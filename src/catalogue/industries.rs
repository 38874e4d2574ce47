// ==========================================
// Fieldwork costing - industries catalogue
// ==========================================
// industry -> id -> { target_audience, pricing }
// Per-target-audience price overrides; the Sample Plan Builder
// prefers these over the rate card when present.
// ==========================================

use crate::catalogue::error::{CatalogueError, CatalogueResult};
use crate::catalogue::load_json_file;
use crate::domain::audience::PriceEntry;
use crate::domain::ordered::OrderedMap;
use crate::domain::types::{PriceType, SampleType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustryMainPricing {
    pub recruit: Option<Decimal>,
    pub location: Option<Decimal>,
    pub booster: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustryPricing {
    pub pilot: Option<Decimal>,
    pub non: Option<Decimal>,
    pub main: IndustryMainPricing,
}

impl IndustryPricing {
    /// Override entries for one sample type, if the industry prices it
    ///
    /// Main needs both recruit and location to count as an override.
    pub fn entries_for(&self, sample_type: SampleType) -> Option<Vec<PriceEntry>> {
        match sample_type {
            SampleType::Pilot => self.pilot.map(|p| vec![PriceEntry::new(p, PriceType::Pilot)]),
            SampleType::Non => self.non.map(|p| vec![PriceEntry::new(p, PriceType::Non)]),
            SampleType::Main => match (self.main.recruit, self.main.location) {
                (Some(recruit), Some(location)) => Some(vec![
                    PriceEntry::new(recruit, PriceType::Recruit),
                    PriceEntry::new(location, PriceType::Location),
                ]),
                _ => None,
            },
            SampleType::Booster => self.main.booster.map(|b| {
                vec![
                    PriceEntry::new(b, PriceType::Recruit),
                    PriceEntry::new(b, PriceType::Location),
                ]
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryAudience {
    pub target_audience: String,
    #[serde(default)]
    pub pricing: IndustryPricing,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndustriesCatalogue {
    industries: OrderedMap<OrderedMap<IndustryAudience>>,
}

impl IndustriesCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CatalogueResult<Self> {
        let catalogue: Self = load_json_file(path.as_ref())?;
        tracing::info!(
            path = %path.as_ref().display(),
            industries = catalogue.industries.len(),
            "industries catalogue loaded"
        );
        Ok(catalogue)
    }

    pub fn from_json_str(json: &str) -> CatalogueResult<Self> {
        serde_json::from_str(json).map_err(|e| CatalogueError::ParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn industry_names(&self) -> impl Iterator<Item = &str> {
        self.industries.keys()
    }

    /// Target-audience names defined for an industry
    pub fn target_audiences(&self, industry: &str) -> Vec<&str> {
        self.industries
            .get(industry.trim())
            .map(|entries| entries.values().map(|e| e.target_audience.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn insert(&mut self, industry: &str, id: &str, entry: IndustryAudience) {
        if !self.industries.contains_key(industry) {
            self.industries.insert(industry, OrderedMap::new());
        }
        if let Some(entries) = self.industries.get_mut(industry) {
            entries.insert(id, entry);
        }
    }

    /// Exact (industry, target audience) match, then the sample-type override
    pub fn lookup(
        &self,
        industry: &str,
        target_audience: &str,
        sample_type: SampleType,
    ) -> Option<Vec<PriceEntry>> {
        let entries = self.industries.get(industry.trim())?;
        let entry = entries
            .values()
            .find(|e| e.target_audience.trim() == target_audience.trim())?;
        entry.pricing.entries_for(sample_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dairy() -> IndustriesCatalogue {
        IndustriesCatalogue::from_json_str(
            r#"{
              "Dairy": {
                "1": {"target_audience": "Mothers 25–40",
                      "pricing": {"main": {"booster": 500000}}},
                "2": {"target_audience": "Kids 6-12",
                      "pricing": {"pilot": 90000,
                                  "main": {"recruit": 210000, "location": 40000}}}
              }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_booster_override() {
        let entries = dairy()
            .lookup("Dairy", "Mothers 25–40", SampleType::Booster)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.price == dec!(500000)));
    }

    #[test]
    fn test_missing_facet_is_not_an_override() {
        let catalogue = dairy();
        assert!(catalogue.lookup("Dairy", "Mothers 25–40", SampleType::Main).is_none());
        assert!(catalogue.lookup("Dairy", "Kids 6-12", SampleType::Main).is_some());
        assert!(catalogue.lookup("Dairy", "kids 6-12", SampleType::Main).is_none());
        assert!(catalogue.lookup("Beer", "Kids 6-12", SampleType::Pilot).is_none());
    }
}
