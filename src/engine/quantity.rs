// ==========================================
// Fieldwork costing - quantity dispatcher
// ==========================================
// CostDescription -> quantity for (project, province, path)
// Notation:
//   S(v, excl)  effective sample sum, see sample_math
//   S*          S(v, {Pilot, Non})
//   D           clt sample_size_per_day
//   OE          open_ended_main + open_ended_booster
// Unmatched descriptions fall back on the path's root category:
//   OTHER -> 1, anything else -> S(v, ∅)
// ==========================================

use crate::domain::audience::Audience;
use crate::domain::types::{ProjectType, SampleType};
use crate::engine::context::{EstimateContext, LinePosition};
use crate::engine::description::{CostCategory, CostDescription};
use crate::engine::sample_math::{
    core_sample, open_ended_total, safe_div, sample_sum, sample_type_total, total_sample,
    Breadcrumbs,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixed supervisor days added on top of recruit/desk days
const SUPERVISOR_BASE_DAYS: Decimal = dec!(2);

/// IDI recruits handled by one supervisor
const IDI_PER_SUPERVISOR: Decimal = dec!(15);

/// Quantity of a catalogue-sourced line
pub fn element_quantity(
    ctx: &EstimateContext<'_>,
    description: CostDescription,
    pos: &LinePosition<'_>,
    crumbs: &mut Breadcrumbs,
) -> Decimal {
    use CostDescription as C;

    let project = ctx.project;
    let province = pos.province;
    let clt = &project.clt_settings;
    let printer = &project.general.printer;
    let project_type = project.project_type();
    let category = CostCategory::from_segment(pos.root());

    let s_star = || core_sample(project, province);
    let per_day = |crumbs: &mut Breadcrumbs| {
        safe_div(s_star(), clt.sample_size_per_day, "sample_size_per_day", crumbs).round_dp(2)
    };
    let desk = Decimal::from(clt.desk_interviewers_in(province));
    let idi = Decimal::from(clt.sample_recruit_idi);

    match description {
        // ===== device rental =====
        C::TabletUnder9 | C::TabletAtLeast9 | C::Laptop => match category {
            CostCategory::Qc => per_day(crumbs),
            _ => s_star(),
        },

        // ===== field logistics =====
        C::ParkingFee => total_sample(project, province),
        C::FailureRate => {
            (total_sample(project, province) * clt.failure_rate / Decimal::ONE_HUNDRED).round_dp(1)
        }
        C::RecruitIdi => idi,

        // ===== supervisor / assistant =====
        C::SupervisorOnField => Decimal::ONE,
        C::SupervisorRecruit => {
            let sup_days: Decimal = core_audiences(ctx, province)
                .map(|a| a.target.daily_sup_target)
                .sum();
            (SUPERVISOR_BASE_DAYS + sup_days).round_dp(2)
        }
        C::SupervisorDesk => desk_days(ctx, province, crumbs) + SUPERVISOR_BASE_DAYS,
        C::AssistantSetup => clt.assistant_setup_days,
        C::AssistantOnField => desk_days(ctx, province, crumbs),
        C::SupervisorIdi => (idi / IDI_PER_SUPERVISOR).round_dp(2),

        // ===== qc =====
        C::QcOnField => match project_type {
            Some(ProjectType::Clt) => s_star() / dec!(50) + Decimal::ONE,
            _ => s_star() / Decimal::ONE_HUNDRED,
        },
        C::QcInHome => (s_star() * dec!(0.20)).round_dp(2),
        C::QcInLocation => Decimal::ONE,
        C::QcIdi => idi,

        // ===== dp =====
        C::DpCoding => dp_coding_quantity(s_star(), open_ended_total(project)),
        C::DpInput => sample_sum(project, province, &[SampleType::Pilot]),
        C::DpCleanData => Decimal::ONE,

        // ===== incentive =====
        C::Incentive(sample_type) => sample_type_total(project, province, sample_type),

        // ===== communication =====
        C::Landline => match project_type {
            Some(ProjectType::Cati) => total_sample(project, province),
            _ => (s_star() * dec!(0.75)).round_dp(2),
        },
        C::PhoneCard => match project_type {
            Some(ProjectType::Clt) if pos.under("FW") => (s_star() / dec!(75)).round_dp(2),
            Some(ProjectType::Clt) if pos.under("QC") => (s_star() / dec!(150)).round_dp(2),
            _ => Decimal::ZERO,
        },

        // ===== stationery =====
        C::BlackWhitePhoto => s_star() * dec!(1.30) * Decimal::from(printer.bw_page_count),
        C::ShowPhoto => desk * Decimal::from(printer.showphoto_page_count),
        C::ShowCard => Decimal::from(printer.showcard_page_count),
        C::DropCard => desk * Decimal::from(printer.dropcard_page_count),
        C::ColorPrint => desk * Decimal::from(printer.color_page_count),
        C::Decal => safe_div(
            s_star(),
            Decimal::from(printer.decal_page_count),
            "decal_page_count",
            crumbs,
        ),
        C::Lamination => desk * Decimal::from(printer.laminated_page_count),
        C::FormPackage => s_star(),
        C::Binding => Decimal::from(printer.stimulus_material_production_count),

        // ===== other =====
        C::Transport | C::SetupLocation => dec!(2),
        C::LocationRental | C::FridgeRental | C::TvRental | C::PartitionRental => per_day(crumbs),
        C::Drink | C::Tissue | C::Snack => s_star(),

        // ===== travel (aggregate form; fulltime rows are expanded per person) =====
        C::TravelAllowance | C::Accommodation | C::TravelTransport => {
            fulltime_aggregate(ctx, description, province)
        }
        C::DistantAllowance(role) => project
            .travel
            .get(province)
            .and_then(|t| t.parttime.get(&role))
            .map(|slots| Decimal::from(slots.distant_total()))
            .unwrap_or(Decimal::ZERO),
        C::NearbyAllowance(role) => project
            .travel
            .get(province)
            .and_then(|t| t.parttime.get(&role))
            .map(|slots| Decimal::from(slots.nearby_total()))
            .unwrap_or(Decimal::ZERO),

        C::Unmatched => fallback_quantity(ctx, category, province),
    }
}

/// Category fallback for descriptions without a formula
pub fn fallback_quantity(ctx: &EstimateContext<'_>, category: CostCategory, province: &str) -> Decimal {
    match category {
        CostCategory::Other => Decimal::ONE,
        _ => total_sample(ctx.project, province),
    }
}

/// Quantity of a pricing-sourced line: the audience's effective size
pub fn price_entry_quantity(audience: &Audience) -> Decimal {
    audience.effective_size()
}

/// DP coding days, piecewise in S* and OE, rounded to an integer
///
/// | S*      | OE=0   | 1..=2  | 3..=5  | >5     |
/// |---------|--------|--------|--------|--------|
/// | <100    | S*/100 | 1      | 1      | S*/100 |
/// | 100-200 | S*/100 | 1      | S*/100 | S*/100 |
/// | >200    | S*/100 | S*/200 | S*/150 | S*/100 |
pub fn dp_coding_quantity(s_star: Decimal, open_ended: u32) -> Decimal {
    let per_hundred = s_star / Decimal::ONE_HUNDRED;
    let quantity = if open_ended == 0 {
        per_hundred
    } else if s_star < dec!(100) {
        match open_ended {
            1..=5 => Decimal::ONE,
            _ => per_hundred,
        }
    } else if s_star <= dec!(200) {
        match open_ended {
            1..=2 => Decimal::ONE,
            _ => per_hundred,
        }
    } else {
        match open_ended {
            1..=2 => s_star / dec!(200),
            3..=5 => s_star / dec!(150),
            _ => per_hundred,
        }
    };
    quantity.round_dp(0)
}

fn core_audiences<'a>(ctx: &EstimateContext<'a>, province: &'a str) -> impl Iterator<Item = &'a Audience> {
    ctx.project
        .samples
        .audiences(province)
        .filter(|a| a.sample_type.is_core())
}

/// Σ round(effective_size / daily_interview_target, 2) over core audiences
fn desk_days(ctx: &EstimateContext<'_>, province: &str, crumbs: &mut Breadcrumbs) -> Decimal {
    let mut days = Decimal::ZERO;
    for audience in core_audiences(ctx, province) {
        let what = format!("daily_interview_target of {}", audience.key());
        days += safe_div(
            audience.effective_size(),
            audience.target.daily_interview_target,
            &what,
            crumbs,
        )
        .round_dp(2);
    }
    days
}

fn fulltime_aggregate(ctx: &EstimateContext<'_>, description: CostDescription, province: &str) -> Decimal {
    let Some(travel) = ctx.project.travel.get(province) else {
        return Decimal::ZERO;
    };
    let people = Decimal::from(travel.fulltime.assigned_people.len() as u64);
    match description {
        CostDescription::TravelAllowance => people * Decimal::from(travel.fulltime.travel_days),
        CostDescription::Accommodation => people * Decimal::from(travel.fulltime.travel_nights),
        _ => people,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_manager::StationeryFeeTable;
    use crate::domain::audience::Audience;
    use crate::domain::project::Project;

    fn project(project_type: ProjectType) -> Project {
        let mut project = Project::default();
        project.general.project_type = Some(project_type);
        project
    }

    fn qty(project: &Project, description: &str, path: &[&str], province: &str) -> (Decimal, Breadcrumbs) {
        let fees = StationeryFeeTable::new();
        let ctx = EstimateContext::new(project, &fees);
        let path: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        let pos = LinePosition { path: &path, province };
        let mut crumbs = Breadcrumbs::new();
        let q = element_quantity(&ctx, CostDescription::parse(description), &pos, &mut crumbs);
        (q, crumbs)
    }

    #[test]
    fn test_landline_cati_uses_full_sample() {
        let mut p = project(ProjectType::Cati);
        let mut main = Audience::new(SampleType::Main, "Mothers", 100);
        main.extra_rate = dec!(10);
        p.samples.insert("Hà Nội", main);
        assert_eq!(qty(&p, "Điện thoại bàn", &["COMMUNICATION"], "Hà Nội").0, dec!(110));

        p.general.project_type = Some(ProjectType::F2fD2d);
        assert_eq!(qty(&p, "Điện thoại bàn", &["COMMUNICATION"], "Hà Nội").0, dec!(82.50));
    }

    #[test]
    fn test_bw_photo_excludes_pilot() {
        let mut p = project(ProjectType::F2fD2d);
        p.general.printer.bw_page_count = 3;
        for (t, n) in [(SampleType::Pilot, 20), (SampleType::Main, 100), (SampleType::Booster, 50)] {
            p.samples.insert("Cần Thơ", Audience::new(t, "Shoppers", n));
        }
        assert_eq!(qty(&p, "Photo trắng đen", &["STATIONERY"], "Cần Thơ").0, dec!(585));
    }

    #[test]
    fn test_failure_rate_and_desk_stationery() {
        let mut p = project(ProjectType::Clt);
        p.clt_settings.failure_rate = dec!(20);
        p.clt_settings.desk_interviewers.insert("Hà Nội".to_string(), 5);
        p.general.printer.color_page_count = 4;
        p.samples.insert("Hà Nội", Audience::new(SampleType::Main, "Mothers", 100));

        assert_eq!(qty(&p, "Chi phí failure rate", &["OTHER"], "Hà Nội").0, dec!(20.0));
        assert_eq!(qty(&p, "In màu / Concept", &["STATIONERY"], "Hà Nội").0, dec!(20));
    }

    #[test]
    fn test_dp_coding_brackets() {
        assert_eq!(dp_coding_quantity(dec!(150), 0), dec!(2));
        assert_eq!(dp_coding_quantity(dec!(80), 4), dec!(1));
        assert_eq!(dp_coding_quantity(dec!(80), 7), dec!(1)); // 0.8 -> 1
        assert_eq!(dp_coding_quantity(dec!(100), 2), dec!(1));
        assert_eq!(dp_coding_quantity(dec!(200), 3), dec!(2));
        assert_eq!(dp_coding_quantity(dec!(450), 2), dec!(2)); // 2.25
        assert_eq!(dp_coding_quantity(dec!(450), 4), dec!(3));
        assert_eq!(dp_coding_quantity(dec!(450), 9), dec!(4)); // 4.5 -> 4, half-even
    }

    #[test]
    fn test_zero_divisor_leaves_breadcrumb() {
        let mut p = project(ProjectType::Clt);
        p.samples.insert("Hà Nội", Audience::new(SampleType::Main, "Mothers", 100));
        let (q, crumbs) = qty(&p, "Thuê địa điểm", &["OTHER"], "Hà Nội");
        assert_eq!(q, Decimal::ZERO);
        assert_eq!(crumbs.notes(), ["sample_size_per_day is 0".to_string()]);

        p.clt_settings.sample_size_per_day = dec!(30);
        assert_eq!(qty(&p, "Thuê địa điểm", &["OTHER"], "Hà Nội").0, dec!(3.33));
    }

    #[test]
    fn test_supervisor_lines() {
        let mut p = project(ProjectType::F2fD2d);
        let mut main = Audience::new(SampleType::Main, "Mothers", 100);
        main.target.daily_sup_target = dec!(3.33);
        main.target.daily_interview_target = dec!(6);
        let mut pilot = Audience::new(SampleType::Pilot, "Mothers", 10);
        pilot.target.daily_sup_target = dec!(9);
        p.samples.insert("Hà Nội", main);
        p.samples.insert("Hà Nội", pilot);

        let path = ["SUPERVISOR/ ASSISTANT"];
        assert_eq!(qty(&p, "Chi phí Quản lý recruit - On-field", &path, "Hà Nội").0, dec!(5.33));
        assert_eq!(qty(&p, "Chi phí Quản lý ngồi bàn - On-field", &path, "Hà Nội").0, dec!(18.67));
        assert_eq!(qty(&p, "Chi phí Assistant - On-field", &path, "Hà Nội").0, dec!(16.67));
        assert_eq!(qty(&p, "Chi phí Assistant - Set up", &path, "Hà Nội").0, Decimal::ONE);
    }

    #[test]
    fn test_phone_card_by_subtree() {
        let mut p = project(ProjectType::Clt);
        p.samples.insert("Hà Nội", Audience::new(SampleType::Main, "Mothers", 150));
        assert_eq!(qty(&p, "Thẻ điện thoại", &["COMMUNICATION", "FW"], "Hà Nội").0, dec!(2));
        assert_eq!(qty(&p, "Thẻ điện thoại", &["COMMUNICATION", "QC"], "Hà Nội").0, dec!(1));

        p.general.project_type = Some(ProjectType::Hut);
        assert_eq!(qty(&p, "Thẻ điện thoại", &["COMMUNICATION", "FW"], "Hà Nội").0, Decimal::ZERO);
    }

    /// Hà Nội: Pilot 20, Main 100 (+10%), Booster 40, Non 10
    /// S* = 150, S(∅) = 180, D = 40, 5 desk interviewers, 40 IDI recruits
    fn worked_project(project_type: ProjectType) -> Project {
        let mut p = project(project_type);
        let mut main = Audience::new(SampleType::Main, "Mothers", 100);
        main.extra_rate = dec!(10);
        p.samples.insert("Hà Nội", Audience::new(SampleType::Pilot, "Mothers", 20));
        p.samples.insert("Hà Nội", main);
        p.samples.insert("Hà Nội", Audience::new(SampleType::Booster, "Mothers", 40));
        p.samples.insert("Hà Nội", Audience::new(SampleType::Non, "Mothers", 10));

        let clt = &mut p.clt_settings;
        clt.sample_size_per_day = dec!(40);
        clt.desk_interviewers.insert("Hà Nội".to_string(), 5);
        clt.sample_recruit_idi = 40;

        let printer = &mut p.general.printer;
        printer.showphoto_page_count = 2;
        printer.showcard_page_count = 7;
        printer.dropcard_page_count = 3;
        printer.decal_page_count = 20;
        printer.laminated_page_count = 4;
        printer.stimulus_material_production_count = 6;
        p
    }

    #[test]
    fn test_formula_table() {
        use ProjectType::{Clt, F2fD2d};

        let cases: &[(ProjectType, &str, &[&str], Decimal)] = &[
            // qc
            (Clt, "Chi phí QC - On-field", &["QC"], dec!(4)),
            (F2fD2d, "Chi phí QC - On-field", &["QC"], dec!(1.5)),
            (Clt, "Chi phí QC - IDI", &["QC"], dec!(40)),
            // idi
            (Clt, "Chi phí Quản lý IDI", &["SUPERVISOR/ ASSISTANT"], dec!(2.67)),
            (Clt, "Recruit IDI", &["INTERVIEWER"], dec!(40)),
            // dp: pilot excluded from input
            (Clt, "Chi phí Nhập liệu", &["DP"], dec!(160)),
            (Clt, "Chi phí hỗ trợ clean data", &["DP"], dec!(1)),
            // incentives per sample type
            (Clt, "Quà Phiếu PV - Main", &["OTHER"], dec!(110)),
            (Clt, "Quà Phiếu PV - Booster", &["OTHER"], dec!(40)),
            (Clt, "Quà Phiếu PV - Pilot", &["OTHER"], dec!(20)),
            (Clt, "Quà Phiếu PV - Non", &["OTHER"], dec!(10)),
            // stationery
            (Clt, "Showphoto", &["STATIONERY"], dec!(10)),
            (Clt, "Dropcard", &["STATIONERY"], dec!(15)),
            (Clt, "Ép plastic", &["STATIONERY"], dec!(20)),
            (Clt, "Decal", &["STATIONERY"], dec!(7.5)),
            (Clt, "Showcard", &["STATIONERY"], dec!(7)),
            (Clt, "Đóng cuốn", &["STATIONERY"], dec!(6)),
            (Clt, "Biểu mẫu", &["STATIONERY"], dec!(150)),
            // device rental: S* for interviewers, S*/D for qc
            (Clt, "Thuê tablet >= 9 inch", &["INTERVIEWER"], dec!(150)),
            (Clt, "Thuê tablet < 9 inch", &["QC"], dec!(3.75)),
            (Clt, "Thuê laptop", &["QC"], dec!(3.75)),
            // other
            (Clt, "Chi phí vận chuyển", &["OTHER"], dec!(2)),
            (Clt, "Set up địa điểm", &["OTHER"], dec!(2)),
            (Clt, "Nước uống", &["OTHER"], dec!(150)),
            (Clt, "Khăn giấy", &["OTHER"], dec!(150)),
            (Clt, "Snack", &["OTHER"], dec!(150)),
            // parking counts every sample type
            (Clt, "Phí gửi xe", &["INTERVIEWER"], dec!(180)),
        ];

        for (project_type, description, path, expected) in cases {
            let p = worked_project(*project_type);
            let (q, crumbs) = qty(&p, description, path, "Hà Nội");
            assert_eq!(q, *expected, "{description} under {path:?} for {project_type:?}");
            assert!(crumbs.is_empty(), "{description}: {:?}", crumbs.notes());
        }
    }

    #[test]
    fn test_decal_without_page_count() {
        let mut p = worked_project(ProjectType::Clt);
        p.general.printer.decal_page_count = 0;
        let (q, crumbs) = qty(&p, "Decal", &["STATIONERY"], "Hà Nội");
        assert_eq!(q, Decimal::ZERO);
        assert_eq!(crumbs.notes(), ["decal_page_count is 0".to_string()]);
    }

    #[test]
    fn test_fallback_by_category() {
        let mut p = project(ProjectType::F2fD2d);
        p.samples.insert("Hà Nội", Audience::new(SampleType::Pilot, "Mothers", 12));
        assert_eq!(qty(&p, "Something new", &["OTHER"], "Hà Nội").0, Decimal::ONE);
        assert_eq!(qty(&p, "Something new", &["DP"], "Hà Nội").0, dec!(12));
    }
}
