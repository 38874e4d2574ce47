// ==========================================
// Fieldwork costing - engine layer
// ==========================================
// Responsibility: sample plan, dispatchers, hierarchy flattening
// Rule: engine never touches SQL; anomalies become breadcrumbs
// ==========================================

pub mod context;
pub mod description;
pub mod events;
pub mod flattener;
pub mod price;
pub mod quantity;
pub mod sample_math;
pub mod sample_plan;
pub mod travel;

// Re-export core engine types
pub use context::{EstimateContext, LinePosition};
pub use description::{CostCategory, CostDescription};
pub use events::{NoOpObserver, ObserverList, ProjectChange, ProjectObserver, ProjectSection};
pub use flattener::{grand_total, HierarchyFlattener};
pub use price::{base_cost, element_price};
pub use quantity::{dp_coding_quantity, element_quantity, fallback_quantity, price_entry_quantity};
pub use sample_math::{core_sample, sample_sum, total_sample, Breadcrumbs};
pub use sample_plan::SamplePlanBuilder;
pub use travel::{fulltime_lines, TravelLine};
