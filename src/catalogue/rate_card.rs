// ==========================================
// Fieldwork costing - rate-card catalogue
// ==========================================
// project type -> level (L1..Ln) -> interview-length rows
// Each row: pricing schedule + target schedule
// ==========================================
// Level selection partitions incident rate 0..100 into n equal
// intervals: level = min(n, floor(IR / (100/n)) + 1)
// ==========================================

use crate::catalogue::error::{CatalogueError, CatalogueResult, RateCardAxis};
use crate::catalogue::load_json_file;
use crate::domain::audience::{PriceEntry, TargetSchedule};
use crate::domain::ordered::OrderedMap;
use crate::domain::types::{PriceType, ProjectType, SampleType};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on the number of levels per project type
pub const MAX_LEVELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MainPricing {
    pub recruit: Decimal,
    pub location: Decimal,
    pub booster: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RatePricing {
    pub pilot: Decimal,
    pub non: Decimal,
    pub main: MainPricing,
}

impl RatePricing {
    /// Pricing entries for one sample type
    pub fn entries_for(&self, sample_type: SampleType) -> Vec<PriceEntry> {
        match sample_type {
            SampleType::Pilot => vec![PriceEntry::new(self.pilot, PriceType::Pilot)],
            SampleType::Non => vec![PriceEntry::new(self.non, PriceType::Non)],
            SampleType::Main => vec![
                PriceEntry::new(self.main.recruit, PriceType::Recruit),
                PriceEntry::new(self.main.location, PriceType::Location),
            ],
            SampleType::Booster => vec![
                PriceEntry::new(self.main.booster, PriceType::Recruit),
                PriceEntry::new(self.main.booster, PriceType::Location),
            ],
        }
    }
}

/// One interview-length row of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCardRow {
    pub interview_length_range: [u32; 2],
    #[serde(default)]
    pub pricing: RatePricing,
    #[serde(default)]
    pub daily_interview_target: Decimal,
    #[serde(default)]
    pub target_for_interviewer: Decimal,
    #[serde(default)]
    pub interviewers_per_supervisor: Decimal,
}

impl RateCardRow {
    pub fn covers(&self, interview_length: u32) -> bool {
        let [min, max] = self.interview_length_range;
        min <= interview_length && interview_length <= max
    }

    pub fn target_schedule(&self) -> TargetSchedule {
        TargetSchedule {
            daily_interview_target: self.daily_interview_target,
            target_for_interviewer: self.target_for_interviewer,
            interviewers_per_supervisor: self.interviewers_per_supervisor,
            daily_sup_target: Decimal::ZERO,
            custom: false,
        }
    }
}

/// Result of a rate-card lookup
#[derive(Debug, Clone, PartialEq)]
pub struct RateCardResolution {
    pub level: usize,
    pub pricing: Vec<PriceEntry>,
    pub target: TargetSchedule,
}

/// Choose the level for an incident rate given `n` levels
///
/// IR outside 0..100 is clamped into [1, n].
pub fn select_level(level_count: usize, incident_rate: Decimal) -> usize {
    if level_count == 0 {
        return 0;
    }
    let n = Decimal::from(level_count as u64);
    // floor(r / (100/n)) == floor(r × n / 100), without the repeating fraction
    let bucket = (incident_rate * n / Decimal::ONE_HUNDRED).floor();
    if bucket < Decimal::ZERO {
        return 1;
    }
    let bucket = bucket.to_usize().unwrap_or(level_count);
    (bucket + 1).min(level_count)
}

// ==========================================
// RateCardCatalogue
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateCardCatalogue {
    cards: OrderedMap<OrderedMap<Vec<RateCardRow>>>,
}

impl RateCardCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CatalogueResult<Self> {
        let catalogue: Self = load_json_file(path.as_ref())?;
        tracing::info!(
            path = %path.as_ref().display(),
            project_types = catalogue.cards.len(),
            "rate-card catalogue loaded"
        );
        Ok(catalogue)
    }

    pub fn from_json_str(json: &str) -> CatalogueResult<Self> {
        serde_json::from_str(json).map_err(|e| CatalogueError::ParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Builder helper: append a row under (project type, level)
    pub fn insert_row(&mut self, project_type: ProjectType, level: &str, row: RateCardRow) {
        let key = project_type.as_str();
        if self.cards.get(key).is_none() {
            self.cards.insert(key, OrderedMap::new());
        }
        if let Some(levels) = self.cards.get_mut(key) {
            match levels.get_mut(level) {
                Some(rows) => rows.push(row),
                None => {
                    levels.insert(level, vec![row]);
                }
            }
        }
    }

    /// Number of levels defined for a project type
    pub fn level_count(&self, project_type: ProjectType) -> usize {
        self.cards
            .get(project_type.as_str())
            .map(|levels| levels.len().min(MAX_LEVELS))
            .unwrap_or(0)
    }

    /// Resolve pricing entries and target schedule for one audience
    ///
    /// # Errors
    /// - RateCardUnavailable(project_type): no card for the project type
    /// - RateCardUnavailable(level): no rows under the chosen level
    /// - RateCardUnavailable(interview_length): no row covers the length
    pub fn resolve(
        &self,
        project_type: ProjectType,
        sample_type: SampleType,
        interview_length: u32,
        incident_rate: Decimal,
    ) -> CatalogueResult<RateCardResolution> {
        let levels = self.cards.get(project_type.as_str()).ok_or_else(|| {
            CatalogueError::unavailable(
                RateCardAxis::ProjectType,
                format!("no rate card for project type {}", project_type),
            )
        })?;

        let level = select_level(levels.len().min(MAX_LEVELS), incident_rate);
        let level_key = format!("L{}", level);
        let rows = levels.get(&level_key).ok_or_else(|| {
            CatalogueError::unavailable(
                RateCardAxis::Level,
                format!(
                    "{}: no {} rows (incident rate {})",
                    project_type, level_key, incident_rate
                ),
            )
        })?;

        let row = rows.iter().find(|r| r.covers(interview_length)).ok_or_else(|| {
            CatalogueError::unavailable(
                RateCardAxis::InterviewLength,
                format!(
                    "{} {}: no row covers interview length {} min",
                    project_type, level_key, interview_length
                ),
            )
        })?;

        tracing::debug!(
            %project_type, %sample_type, level, interview_length,
            "rate card resolved"
        );

        Ok(RateCardResolution {
            level,
            pricing: row.pricing.entries_for(sample_type),
            target: row.target_schedule(),
        })
    }
}
