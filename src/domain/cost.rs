// ==========================================
// Fieldwork costing - cost catalogue & output rows
// ==========================================
// CostHierarchy: project-type -> named subtree -> ...
// Every node is {children, elements[]}; elements carry
// level -> duration-band -> unit cost.
// ==========================================

use crate::domain::ordered::OrderedMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// level -> duration band -> unit cost
pub type CostMatrix = BTreeMap<String, BTreeMap<String, Decimal>>;

// ==========================================
// CostElement - one priced line in the catalogue
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostElement {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub unit: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_audience: String,
    #[serde(default)]
    pub costs: CostMatrix,
}

impl CostElement {
    pub fn new(code: impl Into<String>, unit: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            unit: unit.into(),
            description: description.into(),
            target_audience: String::new(),
            costs: CostMatrix::new(),
        }
    }

    /// Builder helper: set one (level, band) cell
    pub fn with_cost(mut self, level: &str, band: &str, value: Decimal) -> Self {
        self.costs
            .entry(level.to_string())
            .or_default()
            .insert(band.to_string(), value);
        self
    }
}

// ==========================================
// CostNode - hierarchy node
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostNode {
    #[serde(default)]
    pub children: OrderedMap<CostNode>,
    #[serde(default)]
    pub elements: Vec<CostElement>,
}

impl CostNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn with_child(mut self, name: &str, child: CostNode) -> Self {
        self.children.insert(name, child);
        self
    }

    pub fn with_element(mut self, element: CostElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Number of elements in this subtree
    pub fn element_count(&self) -> usize {
        self.elements.len() + self.children.values().map(CostNode::element_count).sum::<usize>()
    }
}

// ==========================================
// CostRow - one flattened output line
// ==========================================
// Column order: subtitle_path, province, description, target_audience,
// code, unit, unit_cost, quantity, total, comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub subtitle_path: String,
    pub province: String,
    pub description: String,
    pub target_audience: String,
    pub code: String,
    pub unit: String,
    pub unit_cost: Decimal,
    pub quantity: Decimal,
    pub total: Decimal,
    pub comment: String,
}

impl CostRow {
    pub const HEADERS: [&'static str; 10] = [
        "subtitle_path",
        "province",
        "description",
        "target_audience",
        "code",
        "unit",
        "unit_cost",
        "quantity",
        "total",
        "comment",
    ];
}

/// Separator used when joining hierarchy segments into a subtitle path
pub const PATH_SEPARATOR: &str = " / ";
