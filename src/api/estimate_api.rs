// ==========================================
// Fieldwork costing - cost estimate API
// ==========================================
// compute(project):
//   1. validate (first failure aborts)
//   2. rebuild the sample plan when rate cards are loaded,
//      carrying user edits forward
//   3. flatten the cost hierarchy
// The caller's project is never mutated.
// ==========================================

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::error::ApiResult;
use crate::api::validator::{ProjectValidator, ValidationOutcome};
use crate::catalogue::hierarchy::CostHierarchy;
use crate::catalogue::industries::IndustriesCatalogue;
use crate::catalogue::rate_card::RateCardCatalogue;
use crate::config::config_manager::StationeryFeeTable;
use crate::domain::cost::CostRow;
use crate::domain::project::Project;
use crate::engine::context::EstimateContext;
use crate::engine::flattener::{grand_total, HierarchyFlattener};
use crate::engine::sample_plan::SamplePlanBuilder;
use crate::repository::element_cost_repo::ElementCostRepository;

/// One computed estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    /// Project as priced (sample plan refreshed)
    pub project: Project,
    pub rows: Vec<CostRow>,
    pub grand_total: Decimal,
}

pub struct EstimateApi {
    hierarchy: Arc<CostHierarchy>,
    rate_cards: Option<Arc<RateCardCatalogue>>,
    industries: Arc<IndustriesCatalogue>,
    element_costs: Option<Arc<ElementCostRepository>>,
    stationery_fees: StationeryFeeTable,
    validator: ProjectValidator,
}

impl EstimateApi {
    pub fn new(
        hierarchy: Arc<CostHierarchy>,
        rate_cards: Option<Arc<RateCardCatalogue>>,
        industries: Arc<IndustriesCatalogue>,
        element_costs: Option<Arc<ElementCostRepository>>,
        stationery_fees: StationeryFeeTable,
    ) -> Self {
        Self {
            hierarchy,
            rate_cards,
            industries,
            element_costs,
            stationery_fees,
            validator: ProjectValidator::new(),
        }
    }

    pub fn validate(&self, project: &Project) -> ValidationOutcome {
        self.validator.validate(project)
    }

    /// Compute the cost breakdown of a project
    ///
    /// # Errors
    /// - ValidationFailure: project not ready
    /// - RateCardUnavailable: sample plan cannot be resolved
    pub fn compute(&self, project: &Project) -> ApiResult<CostEstimate> {
        self.validator.ensure_ready(project)?;

        let mut prepared = project.clone();
        if let Some(rate_cards) = &self.rate_cards {
            prepared.samples = SamplePlanBuilder::new(rate_cards, &self.industries).build(
                &prepared.general,
                &prepared.sampling_methods,
                &project.samples,
            )?;
        }

        let rows = self.flatten(&prepared);
        let grand_total = grand_total(&rows);
        tracing::info!(
            project = %prepared.general.project_name,
            rows = rows.len(),
            %grand_total,
            "estimate computed"
        );
        Ok(CostEstimate {
            project: prepared,
            rows,
            grand_total,
        })
    }

    /// Flatten without validation or sample-plan refresh
    pub fn flatten(&self, project: &Project) -> Vec<CostRow> {
        let mut ctx = EstimateContext::new(project, &self.stationery_fees);
        if let Some(store) = &self.element_costs {
            ctx = ctx.with_element_costs(store.as_ref());
        }
        HierarchyFlattener::new().flatten(&ctx, &self.hierarchy)
    }
}
