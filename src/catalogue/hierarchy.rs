// ==========================================
// Fieldwork costing - cost hierarchy catalogue
// ==========================================
// { "<project-type>": {"children": {...}, "elements": [...]} }
// ==========================================

use crate::catalogue::error::{CatalogueError, CatalogueResult};
use crate::catalogue::length_band::parse_length_band;
use crate::catalogue::load_json_file;
use crate::domain::cost::{CostElement, CostNode};
use crate::domain::ordered::OrderedMap;
use crate::domain::types::ProjectType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Level whose costs are the element's base cost
pub const BASE_LEVEL: &str = "L1";

/// Duration band read first for the base cost
pub const BASE_BAND: &str = "< 30 phút";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostHierarchy {
    roots: OrderedMap<CostNode>,
}

impl CostHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CatalogueResult<Self> {
        let hierarchy: Self = load_json_file(path.as_ref())?;
        tracing::info!(
            path = %path.as_ref().display(),
            project_types = hierarchy.roots.len(),
            "cost hierarchy loaded"
        );
        Ok(hierarchy)
    }

    pub fn from_json_str(json: &str) -> CatalogueResult<Self> {
        serde_json::from_str(json).map_err(|e| CatalogueError::ParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn insert(&mut self, project_type: ProjectType, root: CostNode) {
        self.roots.insert(project_type.as_str(), root);
    }

    /// Subtree for a project type (label lookup is case-insensitive)
    pub fn for_project_type(&self, project_type: ProjectType) -> Option<&CostNode> {
        self.roots.get(project_type.as_str()).or_else(|| {
            self.roots
                .iter()
                .find(|(label, _)| ProjectType::from_label(label) == Some(project_type))
                .map(|(_, node)| node)
        })
    }
}

/// Base unit cost of an element
///
/// Order: L1 at "< 30 phút", then the L1 band whose range covers the
/// interview length. None when neither exists.
pub fn element_base_cost(element: &CostElement, interview_length: u32) -> Option<Decimal> {
    let bands = element.costs.get(BASE_LEVEL)?;
    if let Some(cost) = bands.get(BASE_BAND) {
        return Some(*cost);
    }
    bands
        .iter()
        .find(|(band, _)| parse_length_band(band).contains(interview_length))
        .map(|(_, cost)| *cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_children_keep_document_order() {
        let hierarchy = CostHierarchy::from_json_str(
            r#"{"CATI": {"children": {
                  "INTERVIEWER": {"children": {}, "elements": []},
                  "COMMUNICATION": {"children": {}, "elements": [
                     {"code": "C01", "unit": "Phiếu", "description": "Điện thoại bàn",
                      "costs": {"L1": {"< 15 phút": 3000}}}
                  ]},
                  "DP": {}
               }, "elements": []}}"#,
        )
        .unwrap();

        let root = hierarchy.for_project_type(ProjectType::Cati).unwrap();
        let names: Vec<&str> = root.children.keys().collect();
        assert_eq!(names, vec!["INTERVIEWER", "COMMUNICATION", "DP"]);
        assert_eq!(root.element_count(), 1);
        assert!(hierarchy.for_project_type(ProjectType::Hut).is_none());
    }

    #[test]
    fn test_base_cost_lookup_order() {
        let element = CostElement::new("X", "Ngày", "Thuê địa điểm")
            .with_cost("L1", "15-30 phút", dec!(2000))
            .with_cost("L1", "30-45 phút", dec!(3000));
        assert_eq!(element_base_cost(&element, 40), Some(dec!(3000)));
        assert_eq!(element_base_cost(&element, 90), None);

        let element = element.with_cost("L1", BASE_BAND, dec!(1500));
        assert_eq!(element_base_cost(&element, 40), Some(dec!(1500)));
    }
}
