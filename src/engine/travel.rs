// ==========================================
// Fieldwork costing - fulltime travel lines
// ==========================================
// One row per assigned person for:
//   "Công tác phí"       travel_days   × allowance_per_day
//   "Chi phí lưu trú"    travel_nights × accommodation_per_night
//   "Chi phí di chuyển"  1 × (ground: element base cost,
//                             air: flight_ticket of the level)
// Rates come from project settings (travel_cost_by_level).
// ==========================================

use crate::domain::cost::CostElement;
use crate::domain::travel::TravelCost;
use crate::domain::types::TransportationType;
use crate::engine::context::EstimateContext;
use crate::engine::description::CostDescription;
use crate::engine::price::base_cost;
use crate::engine::sample_math::Breadcrumbs;
use rust_decimal::Decimal;

/// One traveller's line
#[derive(Debug, Clone, PartialEq)]
pub struct TravelLine {
    /// Assignment email of the traveller
    pub traveller: String,
    pub unit_cost: Decimal,
    pub quantity: Decimal,
    pub crumbs: Breadcrumbs,
}

/// Expand a fulltime travel element for one province
///
/// Non-fulltime descriptions and provinces without travellers yield no lines.
pub fn fulltime_lines(
    ctx: &EstimateContext<'_>,
    description: CostDescription,
    element: &CostElement,
    province: &str,
) -> Vec<TravelLine> {
    let Some(travel) = ctx.project.travel.get(province) else {
        return Vec::new();
    };
    let fulltime = &travel.fulltime;

    fulltime
        .assigned_people
        .iter()
        .filter_map(|email| {
            let mut crumbs = Breadcrumbs::new();
            let rates = level_rates(ctx, email, &mut crumbs);

            let (quantity, unit_cost) = match description {
                CostDescription::TravelAllowance => (
                    Decimal::from(fulltime.travel_days),
                    rates.map(|r| r.allowance_per_day).unwrap_or_default(),
                ),
                CostDescription::Accommodation => (
                    Decimal::from(fulltime.travel_nights),
                    rates.map(|r| r.accommodation_per_night).unwrap_or_default(),
                ),
                CostDescription::TravelTransport => {
                    let cost = match fulltime.transportation_type {
                        TransportationType::Ground => base_cost(ctx, element, &mut crumbs),
                        TransportationType::Air => rates.map(|r| r.flight_ticket).unwrap_or_default(),
                    };
                    (Decimal::ONE, cost)
                }
                _ => return None,
            };

            Some(TravelLine {
                traveller: email.clone(),
                unit_cost,
                quantity,
                crumbs,
            })
        })
        .collect()
}

fn level_rates<'a>(ctx: &EstimateContext<'a>, email: &str, crumbs: &mut Breadcrumbs) -> Option<&'a TravelCost> {
    let project = ctx.project;
    let Some(assignment) = project.assignment(email) else {
        crumbs.push(format!("unknown assignment {}", email));
        return None;
    };
    let rates = project.settings.travel_cost_by_level.get(&assignment.level);
    if rates.is_none() {
        crumbs.push(format!("no travel cost for level {}", assignment.level));
    }
    rates
}
