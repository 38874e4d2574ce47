// ==========================================
// Fieldwork costing - domain model layer
// ==========================================
// Responsibility: project document, catalogue shapes, output rows
// Rule: no data access, no pricing logic
// ==========================================

pub mod audience;
pub mod cost;
pub mod ordered;
pub mod project;
pub mod travel;
pub mod types;

// Re-export core types
pub use audience::{
    audience_key, render_comments, Audience, CommentKey, CommentMap, PriceEntry, SamplesMap,
    TargetSchedule,
};
pub use cost::{CostElement, CostMatrix, CostNode, CostRow, PATH_SEPARATOR};
pub use ordered::OrderedMap;
pub use project::{
    is_unselected, toggle_groups, AdditionalCost, Assignment, CltSettings, CostToggles,
    DataProcessing, GeneralInfo, HutSettings, PrinterCounters, Project, ProjectSettings,
    QcMethodEntry, SamplingMethodEntry, Subcontract, SELECT_SENTINEL,
};
pub use travel::{FulltimeTravel, ParttimeSlots, ProvinceTravel, TravelCost, TravelCostTable, TravelPlan};
pub use types::{
    Complexity, DeviceChoice, Gender, Platform, PriceType, ProjectType, QcTeam, SampleType,
    StaffLevel, TransportationType, TravelRole,
};
