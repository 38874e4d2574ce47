// ==========================================
// Fieldwork costing - estimate context
// ==========================================
// Immutable inputs shared by the dispatchers during one pass
// ==========================================

use crate::config::config_manager::StationeryFeeTable;
use crate::domain::project::Project;
use crate::repository::element_cost_repo::ElementCostLookup;

#[derive(Clone, Copy)]
pub struct EstimateContext<'a> {
    pub project: &'a Project,
    pub stationery_fees: &'a StationeryFeeTable,
    /// Element-costs store; catalogue costs are used when absent
    pub element_costs: Option<&'a dyn ElementCostLookup>,
}

impl<'a> EstimateContext<'a> {
    pub fn new(project: &'a Project, stationery_fees: &'a StationeryFeeTable) -> Self {
        Self {
            project,
            stationery_fees,
            element_costs: None,
        }
    }

    pub fn with_element_costs(mut self, store: &'a dyn ElementCostLookup) -> Self {
        self.element_costs = Some(store);
        self
    }
}

/// Where a line sits in the hierarchy
#[derive(Debug, Clone, Copy)]
pub struct LinePosition<'a> {
    pub path: &'a [String],
    pub province: &'a str,
}

impl<'a> LinePosition<'a> {
    pub fn root(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or("")
    }

    pub fn second(&self) -> &str {
        self.path.get(1).map(String::as_str).unwrap_or("")
    }

    /// True when any segment below the root equals `name`
    pub fn under(&self, name: &str) -> bool {
        self.path.iter().skip(1).any(|s| s.trim() == name)
    }
}
