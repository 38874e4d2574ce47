// ==========================================
// Fieldwork costing - price dispatcher
// ==========================================
// Default: the element's base cost
//   1. element-costs store (L1, interview length), when attached
//   2. catalogue L1 at "< 30 phút"
//   3. catalogue L1 band covering the interview length
//   4. zero + breadcrumb
// Overrides:
//   tablet < 9 inch   5 000 when usage is "<= 15 phút", else 8 000
//   parking fee       project settings
//   stationery        province fee table when configured
// ==========================================

use crate::catalogue::hierarchy::{element_base_cost, BASE_LEVEL};
use crate::config::catalogues::SHORT_TABLET_USAGE;
use crate::domain::cost::CostElement;
use crate::engine::context::{EstimateContext, LinePosition};
use crate::engine::description::CostDescription;
use crate::engine::sample_math::Breadcrumbs;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const SHORT_TABLET_PRICE: Decimal = dec!(5000);
pub const LONG_TABLET_PRICE: Decimal = dec!(8000);

/// Unit price of a catalogue-sourced line
pub fn element_price(
    ctx: &EstimateContext<'_>,
    description: CostDescription,
    element: &CostElement,
    pos: &LinePosition<'_>,
    crumbs: &mut Breadcrumbs,
) -> Decimal {
    match description {
        CostDescription::TabletUnder9 => {
            if ctx.project.general.tablet_usage_duration.trim() == SHORT_TABLET_USAGE {
                SHORT_TABLET_PRICE
            } else {
                LONG_TABLET_PRICE
            }
        }
        CostDescription::ParkingFee => ctx.project.settings.parking_fee,
        d if d.is_stationery() => stationery_price(ctx, element, pos, crumbs),
        _ => base_cost(ctx, element, crumbs),
    }
}

/// Base unit cost of an element (store, then catalogue)
pub fn base_cost(ctx: &EstimateContext<'_>, element: &CostElement, crumbs: &mut Breadcrumbs) -> Decimal {
    let interview_length = ctx.project.general.interview_length;

    if let (Some(store), Some(project_type)) = (ctx.element_costs, ctx.project.project_type()) {
        if !element.code.trim().is_empty() {
            match store.find_cost(project_type, &element.code, BASE_LEVEL, interview_length) {
                Ok(Some(cost)) => return cost,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(code = %element.code, error = %e, "element-costs lookup failed, using catalogue");
                }
            }
        }
    }

    match element_base_cost(element, interview_length) {
        Some(cost) => cost,
        None => {
            crumbs.push(format!(
                "no {} cost for {} at {} min",
                BASE_LEVEL, element.description, interview_length
            ));
            Decimal::ZERO
        }
    }
}

/// Province fee table price for stationery
///
/// Unconfigured table -> base cost; configured table without the
/// line -> zero + breadcrumb.
fn stationery_price(
    ctx: &EstimateContext<'_>,
    element: &CostElement,
    pos: &LinePosition<'_>,
    crumbs: &mut Breadcrumbs,
) -> Decimal {
    match ctx.stationery_fees.get(pos.province) {
        Some(table) => match table.get(&element.description) {
            Some(price) => *price,
            None => {
                crumbs.push(format!(
                    "no stationery fee for {} in {}",
                    element.description, pos.province
                ));
                Decimal::ZERO
            }
        },
        None => base_cost(ctx, element, crumbs),
    }
}
