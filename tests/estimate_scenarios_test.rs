// ==========================================
// Cost estimate end-to-end scenarios
// ==========================================
// Project document -> sample plan -> flattened rows, through
// EstimateApi::compute with the shared fixture catalogues
// ==========================================


use fieldwork_costing::api::ApiError;
use fieldwork_costing::domain::project::{AdditionalCost, Assignment, Subcontract};
use fieldwork_costing::domain::travel::{ParttimeSlots, ProvinceTravel};
use fieldwork_costing::domain::types::{PriceType, ProjectType, SampleType, StaffLevel, TravelRole};
use fieldwork_costing::domain::CostNode;
use fieldwork_costing::config::catalogues::default_travel_costs;
use fieldwork_costing::config::StationeryFeeTable;
use fieldwork_costing::{CostHierarchy, EstimateApi};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::Arc;
use test_helpers::*;

// ==========================================
// Seed scenarios
// ==========================================

#[test]
fn test_cati_landline_uses_full_sample() {
    let mut main = audience(SampleType::Main, "Subscribers", 100);
    main.extra_rate = dec!(10);
    let mut project = ready_project(ProjectType::Cati, &["Hà Nội"], vec![main]);
    project.general.data_processing.open_ended_main_count = 3;

    let estimate = estimate_api().compute(&project).expect("compute");

    let landline = rows_for(&estimate.rows, "Điện thoại bàn");
    assert_eq!(landline.len(), 1);
    assert_eq!(landline[0].subtitle_path, "COMMUNICATION");
    assert_eq!(landline[0].province, "Hà Nội");
    assert_eq!(landline[0].quantity, dec!(110));
    assert_eq!(landline[0].total, dec!(165000));

    let plan = estimate.project.samples.audience("Hà Nội", "Main - Subscribers").unwrap();
    assert_eq!(plan.target.daily_sup_target, dec!(5));
}

#[test]
fn test_f2f_black_white_photo_excludes_pilot() {
    let mut project = ready_project(
        ProjectType::F2fD2d,
        &["Hồ Chí Minh", "Cần Thơ"],
        vec![
            audience(SampleType::Pilot, "Mothers", 20),
            audience(SampleType::Main, "Mothers", 100),
            audience(SampleType::Booster, "Mothers", 50),
        ],
    );
    project.general.printer.bw_page_count = 3;

    let estimate = estimate_api().compute(&project).expect("compute");

    let photo = rows_for(&estimate.rows, "Photo trắng đen");
    let provinces: Vec<&str> = photo.iter().map(|r| r.province.as_str()).collect();
    assert_eq!(provinces, vec!["Hồ Chí Minh", "Cần Thơ"]);
    for row in photo {
        assert_eq!(row.quantity, dec!(585));
        assert_eq!(row.unit_cost, dec!(300));
        assert_eq!(row.total, dec!(175500));
    }
}

#[test]
fn test_clt_failure_rate_line() {
    let mut project = ready_project(
        ProjectType::Clt,
        &["Hà Nội"],
        vec![audience(SampleType::Main, "Shoppers", 100)],
    );
    project.clt_settings.failure_rate = dec!(20);

    let estimate = estimate_api().compute(&project).expect("compute");

    let failure = row_in(&estimate.rows, "Chi phí failure rate", "Hà Nội");
    assert_eq!(failure.quantity, dec!(20.0));
    assert_eq!(failure.total, dec!(1000000));
}

#[test]
fn test_clt_colour_print_per_desk_interviewer() {
    let mut project = ready_project(
        ProjectType::Clt,
        &["Đà Nẵng"],
        vec![audience(SampleType::Main, "Shoppers", 100)],
    );
    project.clt_settings.desk_interviewers.insert("Đà Nẵng".to_string(), 5);
    project.general.printer.color_page_count = 4;

    let estimate = estimate_api().compute(&project).expect("compute");

    let colour = row_in(&estimate.rows, "In màu / Concept", "Đà Nẵng");
    assert_eq!(colour.quantity, dec!(20));
    assert_eq!(colour.total, dec!(100000));
}

#[test]
fn test_dp_coding_dead_band_rounds_up() {
    let project = ready_project(
        ProjectType::F2fD2d,
        &["Hà Nội"],
        vec![audience(SampleType::Main, "Mothers", 150)],
    );

    let estimate = estimate_api().compute(&project).expect("compute");

    let coding = row_in(&estimate.rows, "Chi phí Coding", "Hà Nội");
    assert_eq!(coding.quantity, dec!(2));
    assert_eq!(coding.total, dec!(600000));
}

#[test]
fn test_industry_override_prices_booster() {
    let mut main = audience(SampleType::Main, "Mothers 25–40", 100);
    main.industry = "Dairy".to_string();
    let mut booster = audience(SampleType::Booster, "Mothers 25–40", 50);
    booster.industry = "Dairy".to_string();
    let project = ready_project(ProjectType::F2fD2d, &["Hà Nội"], vec![main, booster]);

    let estimate = estimate_api().compute(&project).expect("compute");

    let plan = estimate
        .project
        .samples
        .audience("Hà Nội", "Booster - Mothers 25–40")
        .unwrap();
    assert!(plan.pricing.iter().all(|p| p.price == dec!(500000)));

    let booster_rows: Vec<_> = estimate
        .rows
        .iter()
        .filter(|r| r.code == "0" && r.quantity == dec!(50))
        .collect();
    assert_eq!(booster_rows.len(), 2);
    assert!(booster_rows.iter().all(|r| r.unit_cost == dec!(500000)));
    assert_eq!(booster_rows[0].description, "Chi phí Phiếu PV - Recruit");
    assert_eq!(booster_rows[0].subtitle_path, "INTERVIEWER / FIELDWORK");

    // main keeps the rate card
    let main_plan = estimate.project.samples.audience("Hà Nội", "Main - Mothers 25–40").unwrap();
    assert_eq!(main_plan.price_entry(PriceType::Recruit).unwrap().price, dec!(200000));
}

// ==========================================
// Supplemented behaviour
// ==========================================

#[test]
fn test_validation_failure_aborts_compute() {
    let mut project = ready_project(
        ProjectType::Clt,
        &["Hà Nội", "Huế"],
        vec![audience(SampleType::Main, "Shoppers", 100)],
    );
    project.clt_settings.desk_interviewers.remove("Huế");

    let err = estimate_api().compute(&project).unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailure { ref field, .. } if field == "clt_desk_interviewers_count"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_missing_rate_card_exit_code() {
    let project = ready_project(
        ProjectType::Hut,
        &["Hà Nội"],
        vec![audience(SampleType::Main, "Families", 80)],
    );
    let err = estimate_api().compute(&project).unwrap_err();
    assert!(matches!(err, ApiError::RateCardUnavailable { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_additional_costs_follow_hierarchy_rows() {
    let mut project = ready_project(
        ProjectType::F2fD2d,
        &["Hà Nội", "Huế"],
        vec![audience(SampleType::Main, "Mothers", 100)],
    );
    project.additional_costs.push(AdditionalCost {
        category: "DP".to_string(),
        name: "Coding thủ công".to_string(),
        unit_price: dec!(250000),
        quantity: dec!(3),
        is_dp_coding: true,
        provinces: vec!["Hà Nội".to_string(), "Huế".to_string()],
        ..Default::default()
    });
    project.subcontracts.push(Subcontract {
        vendor: "Acme Panel".to_string(),
        description: "Online boost".to_string(),
        unit: "Phiếu".to_string(),
        unit_price: dec!(40000),
        quantity: dec!(25),
        provinces: Vec::new(),
    });

    let estimate = estimate_api().compute(&project).expect("compute");
    let rows = &estimate.rows;

    assert!(rows_for(rows, "Chi phí Coding").is_empty());

    let n = rows.len();
    let tail: Vec<(&str, &str)> = rows[n - 3..]
        .iter()
        .map(|r| (r.subtitle_path.as_str(), r.province.as_str()))
        .collect();
    assert_eq!(
        tail,
        vec![
            ("ADDITIONAL COST / DP", "Hà Nội"),
            ("ADDITIONAL COST / DP", "Huế"),
            ("SUBCONTRACT / Acme Panel", ""),
        ]
    );
    assert_eq!(rows[n - 1].total, dec!(1000000));
}

#[test]
fn test_travel_rows_per_traveller_and_role() {
    let mut project = ready_project(
        ProjectType::F2fD2d,
        &["Đà Nẵng"],
        vec![audience(SampleType::Main, "Mothers", 100)],
    );
    project.settings.travel_cost_by_level = default_travel_costs();
    project.assignments.push(Assignment {
        level: StaffLevel::Senior,
        email: "lan.tran@example.com".to_string(),
    });
    let mut travel = ProvinceTravel::default();
    travel.fulltime.travel_days = 3;
    travel.fulltime.travel_nights = 2;
    travel.fulltime.assigned_people = vec!["lan.tran@example.com".to_string()];
    travel.parttime.insert(
        TravelRole::Interviewer,
        ParttimeSlots {
            distant: 2,
            recruit_distant: 1,
            nearby: 4,
            ..Default::default()
        },
    );
    project.travel.provinces.insert("Đà Nẵng".to_string(), travel);

    let travel_node = CostNode::default()
        .with_element(element("T01", "Ngày", "Công tác phí", dec!(0)))
        .with_element(element("T02", "Đêm", "Chi phí lưu trú", dec!(0)))
        .with_element(element("T03", "Người", "Phụ cấp công tác xa - Interviewer", dec!(100000)))
        .with_element(element("T04", "Người", "Phụ cấp công tác gần - Interviewer", dec!(50000)));
    let mut hierarchy = CostHierarchy::new();
    hierarchy.insert(ProjectType::F2fD2d, project_root().with_child("TRAVEL", travel_node));
    let api = EstimateApi::new(
        Arc::new(hierarchy),
        Some(Arc::new(rate_cards())),
        Arc::new(industries()),
        None,
        StationeryFeeTable::new(),
    );

    let estimate = api.compute(&project).expect("compute");
    let rows = &estimate.rows;

    let allowance = row_in(rows, "Công tác phí", "Đà Nẵng");
    assert_eq!(allowance.target_audience, "lan.tran@example.com");
    assert_eq!(allowance.subtitle_path, "TRAVEL");
    assert_eq!(allowance.quantity, dec!(3));
    assert_eq!(allowance.unit_cost, dec!(200000));

    let lodging = row_in(rows, "Chi phí lưu trú", "Đà Nẵng");
    assert_eq!(lodging.total, dec!(1000000));

    assert_eq!(row_in(rows, "Phụ cấp công tác xa - Interviewer", "Đà Nẵng").quantity, dec!(3));
    assert_eq!(row_in(rows, "Phụ cấp công tác gần - Interviewer", "Đà Nẵng").quantity, dec!(4));
}

#[test]
fn test_stationery_fee_table_overrides_base_cost() {
    let mut project = ready_project(
        ProjectType::F2fD2d,
        &["Hà Nội", "Huế", "Cần Thơ"],
        vec![audience(SampleType::Main, "Mothers", 100)],
    );
    project.general.printer.bw_page_count = 1;

    let mut fees = StationeryFeeTable::new();
    fees.insert(
        "Hà Nội".to_string(),
        BTreeMap::from([("Photo trắng đen".to_string(), dec!(450))]),
    );
    fees.insert(
        "Huế".to_string(),
        BTreeMap::from([("In màu / Concept".to_string(), dec!(6000))]),
    );
    let estimate = estimate_api_with(None, fees).compute(&project).expect("compute");
    let rows = &estimate.rows;

    assert_eq!(row_in(rows, "Photo trắng đen", "Hà Nội").unit_cost, dec!(450));

    let hue = row_in(rows, "Photo trắng đen", "Huế");
    assert_eq!(hue.unit_cost, Decimal::ZERO);
    assert!(hue.comment.contains("no stationery fee"));

    assert_eq!(row_in(rows, "Photo trắng đen", "Cần Thơ").unit_cost, dec!(300));
}

#[test]
fn test_supervisor_recruit_quantity_and_comment() {
    let project = ready_project(
        ProjectType::F2fD2d,
        &["Hà Nội"],
        vec![
            audience(SampleType::Main, "Mothers", 90),
            audience(SampleType::Booster, "Mothers", 30),
        ],
    );
    let mut estimate = estimate_api().compute(&project).expect("compute");

    // 2 + 90/3/10 + 30/3/10
    let recruit = row_in(&estimate.rows, "Chi phí Quản lý recruit - On-field", "Hà Nội");
    assert_eq!(recruit.quantity, dec!(6));
    assert!(recruit.comment.is_empty());

    // comment flows through once the document carries one
    let main = estimate
        .project
        .samples
        .audience_mut("Hà Nội", "Main - Mothers")
        .unwrap();
    main.comment.insert(
        fieldwork_costing::domain::CommentKey::DailySupTarget,
        "khu vực rộng".to_string(),
    );
    let rows = estimate_api().flatten(&estimate.project);
    let recruit = row_in(&rows, "Chi phí Quản lý recruit - On-field", "Hà Nội");
    assert_eq!(recruit.comment, "Main - Mothers (daily_sup_target: khu vực rộng)");
}
