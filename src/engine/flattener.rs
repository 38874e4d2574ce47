// ==========================================
// Fieldwork costing - Hierarchy Flattener
// ==========================================
// Input:  EstimateContext (project snapshot + fee tables + store)
//         CostHierarchy (catalogue for the active project type)
// Output: Vec<CostRow>, depth-first preorder × province
//
// Emission at every node with elements:
//   for province in samples (insertion order):
//     1. leaves under INTERVIEWER only:
//        audience pricing rows, Pilot < Main < Booster < Non
//     2. catalogue elements, toggle-filtered
// A leaf has no children and at least one element. Nodes with
// children emit their own elements only.
// TRAVEL is skipped unless some province has a travel entry.
// Additional costs then subcontracts follow the hierarchy rows.
// ==========================================

use crate::catalogue::hierarchy::CostHierarchy;
use crate::domain::audience::{render_comments, Audience, CommentMap};
use crate::domain::cost::{CostElement, CostNode, CostRow, PATH_SEPARATOR};
use crate::domain::project::toggle_groups;
use crate::engine::context::{EstimateContext, LinePosition};
use crate::engine::description::{CostCategory, CostDescription};
use crate::engine::price::element_price;
use crate::engine::quantity::{element_quantity, price_entry_quantity};
use crate::engine::sample_math::Breadcrumbs;
use crate::engine::travel::fulltime_lines;
use rust_decimal::Decimal;
use tracing::instrument;

/// Description prefix of audience pricing rows
pub const PRICING_LINE_PREFIX: &str = "Chi phí Phiếu PV - ";
/// Code and unit of audience pricing rows
pub const PRICING_LINE_CODE: &str = "0";
pub const PRICING_LINE_UNIT: &str = "Phiếu";

pub const TRAVEL_SEGMENT: &str = "TRAVEL";
pub const ADDITIONAL_COST_SEGMENT: &str = "ADDITIONAL COST";
pub const SUBCONTRACT_SEGMENT: &str = "SUBCONTRACT";

// ==========================================
// HierarchyFlattener
// ==========================================
#[derive(Debug, Default)]
pub struct HierarchyFlattener {}

/// Walk state shared across the traversal
struct Walk<'c, 'a> {
    ctx: &'c EstimateContext<'a>,
    provinces: Vec<&'a str>,
    rows: Vec<CostRow>,
}

impl HierarchyFlattener {
    pub fn new() -> Self {
        Self {}
    }

    /// Flatten the catalogue of the active project type into cost rows
    ///
    /// No project type or no catalogue for it yields an empty sequence.
    #[instrument(skip_all, fields(
        project_type = ?ctx.project.project_type(),
        provinces = ctx.project.general.provinces.len()
    ))]
    pub fn flatten(&self, ctx: &EstimateContext<'_>, hierarchy: &CostHierarchy) -> Vec<CostRow> {
        let Some(project_type) = ctx.project.project_type() else {
            tracing::debug!("project type not selected, nothing to flatten");
            return Vec::new();
        };
        let Some(root) = hierarchy.for_project_type(project_type) else {
            tracing::warn!(%project_type, "no cost hierarchy for project type");
            return Vec::new();
        };

        let mut walk = Walk {
            ctx,
            provinces: ctx.project.samples.provinces().collect(),
            rows: Vec::new(),
        };

        let travel_on = ctx.project.travel.has_any_entry();
        let mut path = Vec::new();
        for (name, child) in root.children.iter() {
            if name.trim() == TRAVEL_SEGMENT && !travel_on {
                tracing::debug!("no travel entries, TRAVEL skipped");
                continue;
            }
            path.push(name.to_string());
            walk.visit(&mut path, child);
            path.pop();
        }

        let hierarchy_rows = walk.rows.len();
        let mut rows = walk.rows;
        rows.extend(extra_rows(ctx));

        tracing::info!(
            %project_type,
            hierarchy_rows,
            total_rows = rows.len(),
            "cost hierarchy flattened"
        );
        rows
    }
}

impl<'c, 'a> Walk<'c, 'a> {
    fn visit(&mut self, path: &mut Vec<String>, node: &CostNode) {
        if !node.elements.is_empty() {
            self.emit_node(path, node);
        }
        for (name, child) in node.children.iter() {
            path.push(name.to_string());
            self.visit(path, child);
            path.pop();
        }
    }

    fn emit_node(&mut self, path: &[String], node: &CostNode) {
        let subtitle_path = path.join(PATH_SEPARATOR);
        let with_pricing = node.is_leaf()
            && CostCategory::from_segment(path.first().map(String::as_str).unwrap_or(""))
                == CostCategory::Interviewer;

        for province in self.provinces.clone() {
            let pos = LinePosition { path, province };
            if with_pricing {
                self.emit_pricing(&subtitle_path, province);
            }
            for element in &node.elements {
                self.emit_element(&subtitle_path, element, &pos);
            }
        }
    }

    fn emit_pricing(&mut self, subtitle_path: &str, province: &str) {
        let mut audiences: Vec<&Audience> = self.ctx.project.samples.audiences(province).collect();
        audiences.sort_by_key(|a| a.sample_type.emission_order());

        for audience in audiences {
            let quantity = price_entry_quantity(audience);
            for entry in &audience.pricing {
                let unit_cost = entry.effective_price();
                self.rows.push(CostRow {
                    subtitle_path: subtitle_path.to_string(),
                    province: province.to_string(),
                    description: format!("{}{}", PRICING_LINE_PREFIX, entry.price_type.line_label()),
                    target_audience: audience.target_audience.clone(),
                    code: PRICING_LINE_CODE.to_string(),
                    unit: PRICING_LINE_UNIT.to_string(),
                    unit_cost,
                    quantity,
                    total: unit_cost * quantity,
                    comment: render_comments(&entry.comment),
                });
            }
        }
    }

    fn emit_element(&mut self, subtitle_path: &str, element: &CostElement, pos: &LinePosition<'_>) {
        let ctx = self.ctx;
        let project = ctx.project;
        let group = toggle_group(pos, &element.description);
        if !project.cost_toggles.is_enabled(&element.description, group) {
            tracing::debug!(description = %element.description, ?group, "toggled off");
            return;
        }

        let description = CostDescription::parse(&element.description);
        if description == CostDescription::DpCoding && project.has_manual_dp_coding() {
            tracing::debug!(province = pos.province, "DP coding replaced by additional cost");
            return;
        }

        if matches!(
            description,
            CostDescription::TravelAllowance | CostDescription::Accommodation | CostDescription::TravelTransport
        ) {
            for line in fulltime_lines(ctx, description, element, pos.province) {
                self.rows.push(CostRow {
                    subtitle_path: subtitle_path.to_string(),
                    province: pos.province.to_string(),
                    description: element.description.clone(),
                    target_audience: line.traveller,
                    code: element.code.clone(),
                    unit: element.unit.clone(),
                    unit_cost: line.unit_cost,
                    quantity: line.quantity,
                    total: line.unit_cost * line.quantity,
                    comment: line.crumbs.append_to(""),
                });
            }
            return;
        }

        let mut crumbs = Breadcrumbs::new();
        let unit_cost = element_price(ctx, description, element, pos, &mut crumbs);
        let quantity = element_quantity(ctx, description, pos, &mut crumbs);
        let comment = match description {
            CostDescription::SupervisorRecruit => supervisor_comment(ctx, pos.province),
            _ => String::new(),
        };

        self.rows.push(CostRow {
            subtitle_path: subtitle_path.to_string(),
            province: pos.province.to_string(),
            description: element.description.clone(),
            target_audience: element.target_audience.clone(),
            code: element.code.clone(),
            unit: element.unit.clone(),
            unit_cost,
            quantity,
            total: unit_cost * quantity,
            comment: crumbs.append_to(&comment),
        });
    }
}

/// Toggle group consulted for an element
///
/// - QC root, description without "IDI" -> qc_method_costs
/// - COMMUNICATION / QC -> qc_communication_cost
/// - otherwise every group is searched
fn toggle_group(pos: &LinePosition<'_>, description: &str) -> Option<&'static str> {
    match CostCategory::from_segment(pos.root()) {
        CostCategory::Qc if !description.contains("IDI") => Some(toggle_groups::QC_METHOD_COSTS),
        CostCategory::Communication if pos.second().trim() == "QC" => {
            Some(toggle_groups::QC_COMMUNICATION_COST)
        }
        _ => None,
    }
}

/// Per-audience comment maps of a province, one segment per audience
fn supervisor_comment(ctx: &EstimateContext<'_>, province: &str) -> String {
    let mut audiences: Vec<&Audience> = ctx.project.samples.audiences(province).collect();
    audiences.sort_by_key(|a| a.sample_type.emission_order());

    audiences
        .into_iter()
        .filter_map(|audience| {
            let mut merged = CommentMap::new();
            for entry in &audience.pricing {
                merged.extend(entry.comment.iter().map(|(k, v)| (*k, v.clone())));
            }
            merged.extend(audience.comment.iter().map(|(k, v)| (*k, v.clone())));

            let rendered = render_comments(&merged);
            (!rendered.is_empty()).then(|| format!("{} ({})", audience.key(), rendered))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

// ==========================================
// Additional costs / subcontracts
// ==========================================

fn extra_rows(ctx: &EstimateContext<'_>) -> Vec<CostRow> {
    let project = ctx.project;
    let mut rows = Vec::new();

    for cost in &project.additional_costs {
        let subtitle_path = format!("{}{}{}", ADDITIONAL_COST_SEGMENT, PATH_SEPARATOR, cost.category.trim());
        for province in provinces_or_blank(&cost.provinces) {
            rows.push(CostRow {
                subtitle_path: subtitle_path.clone(),
                province: province.to_string(),
                description: cost.name.clone(),
                target_audience: String::new(),
                code: String::new(),
                unit: String::new(),
                unit_cost: cost.unit_price,
                quantity: cost.quantity,
                total: cost.unit_price * cost.quantity,
                comment: cost.description.clone(),
            });
        }
    }

    for sub in &project.subcontracts {
        let subtitle_path = format!("{}{}{}", SUBCONTRACT_SEGMENT, PATH_SEPARATOR, sub.vendor.trim());
        for province in provinces_or_blank(&sub.provinces) {
            rows.push(CostRow {
                subtitle_path: subtitle_path.clone(),
                province: province.to_string(),
                description: sub.description.clone(),
                target_audience: String::new(),
                code: String::new(),
                unit: sub.unit.clone(),
                unit_cost: sub.unit_price,
                quantity: sub.quantity,
                total: sub.unit_price * sub.quantity,
                comment: String::new(),
            });
        }
    }

    rows
}

fn provinces_or_blank(provinces: &[String]) -> Vec<&str> {
    if provinces.is_empty() {
        vec![""]
    } else {
        provinces.iter().map(String::as_str).collect()
    }
}

/// Sum of row totals
pub fn grand_total(rows: &[CostRow]) -> Decimal {
    rows.iter().map(|r| r.total).sum()
}
