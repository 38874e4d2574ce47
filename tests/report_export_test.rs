// ==========================================
// Catalogue files -> estimate -> XLSX / CSV report
// ==========================================


use std::fs;
use std::path::{Path, PathBuf};

use fieldwork_costing::api::export::REPORT_TITLE;
use calamine::{open_workbook, Reader, Xlsx};
use fieldwork_costing::api::{export_csv, export_report, ApiError};
use fieldwork_costing::app::{AppState, CataloguePaths};
use fieldwork_costing::domain::types::{ProjectType, SampleType};
use fieldwork_costing::domain::CostRow;
use test_helpers::*;

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().to_path_buf();
        fs::write(root.join("hierarchy.json"), serde_json::to_string(&hierarchy()).unwrap()).unwrap();
        fs::write(root.join("rate_cards.json"), RATE_CARDS).unwrap();
        fs::write(root.join("industries.json"), INDUSTRIES).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn paths(&self, with_rate_cards: bool) -> CataloguePaths {
        CataloguePaths {
            hierarchy: self.path("hierarchy.json"),
            rate_cards: with_rate_cards.then(|| self.path("rate_cards.json")),
            industries: Some(self.path("industries.json")),
            db: None,
        }
    }
}

fn read_records(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .expect("open report");
    reader
        .records()
        .map(|r| r.expect("record").iter().map(String::from).collect())
        .collect()
}

#[test]
fn test_saved_project_priced_and_exported() {
    fieldwork_costing::logging::init_test();
    let ws = Workspace::new();
    let state = AppState::new(&ws.paths(true)).expect("catalogues load");

    let mut project = ready_project(
        ProjectType::F2fD2d,
        &["Hồ Chí Minh", "Cần Thơ"],
        vec![audience(SampleType::Main, "Mothers", 100)],
    );
    project.general.printer.bw_page_count = 2;
    let project_path = ws.path("project.json");
    fs::write(&project_path, serde_json::to_string_pretty(&project).unwrap()).unwrap();

    let mut model = state.project_model();
    model.load_from_file(&project_path).expect("load project");
    let estimate = state.estimate_api().compute(model.project()).expect("compute");
    assert!(!estimate.rows.is_empty());

    let report = ws.path("estimate.csv");
    export_csv(&report, &estimate).expect("export");
    let records = read_records(&report);

    assert_eq!(records[0], vec![REPORT_TITLE.to_string()]);
    assert_eq!(records[1], vec!["Project Name".to_string(), "Milk U&A".to_string()]);
    assert_eq!(records[3][1], "F2F/D2D");

    let header_at = records
        .iter()
        .position(|r| r.first().map(String::as_str) == Some(CostRow::HEADERS[0]))
        .expect("cost table header");
    let cost_records = &records[header_at + 1..records.len() - 1];
    assert_eq!(cost_records.len(), estimate.rows.len());

    let last = records.last().unwrap();
    assert_eq!(last[9], "grand total");
    assert_eq!(last[8], estimate.grand_total.normalize().to_string());
}

fn read_sheet(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("open workbook");
    let names = workbook.sheet_names();
    let range = workbook.worksheet_range(REPORT_TITLE).expect("report sheet");
    let rows = range
        .rows()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();
    (names, rows)
}

#[test]
fn test_xlsx_report_sections() {
    let ws = Workspace::new();
    let state = AppState::new(&ws.paths(true)).unwrap();
    let mut project = ready_project(
        ProjectType::F2fD2d,
        &["Hồ Chí Minh", "Cần Thơ"],
        vec![audience(SampleType::Main, "Mothers", 100)],
    );
    project.general.printer.bw_page_count = 2;
    let estimate = state.estimate_api().compute(&project).expect("compute");

    let report = ws.path("estimate.xlsx");
    export_report(&report, &estimate).expect("export");
    let (names, rows) = read_sheet(&report);

    assert_eq!(names, vec![REPORT_TITLE.to_string()]);
    assert_eq!(rows[0][0], REPORT_TITLE);
    assert_eq!(rows[1][..2], ["Project Name".to_string(), "Milk U&A".to_string()]);
    assert_eq!(rows[3][1], "F2F/D2D");

    // sample table: one line per province × audience
    assert_eq!(rows[5][0], "province");
    assert_eq!(rows[6][0], "Hồ Chí Minh");
    assert_eq!(rows[7][0], "Cần Thơ");
    assert_eq!(rows[6][3], "100");

    let header_at = rows
        .iter()
        .position(|r| r.first().map(String::as_str) == Some(CostRow::HEADERS[0]))
        .expect("cost table header");
    assert_eq!(header_at, 9);
    assert_eq!(rows.len() - header_at - 2, estimate.rows.len());
    assert_eq!(rows[header_at + 1][2], estimate.rows[0].description);

    let last = rows.last().unwrap();
    assert_eq!(last[9], "grand total");
    let total: f64 = last[8].parse().expect("numeric grand total");
    let expected: f64 = estimate.grand_total.to_string().parse().unwrap();
    assert!((total - expected).abs() < 0.01);
}

#[test]
fn test_without_rate_cards_saved_plan_is_priced_as_is() {
    let ws = Workspace::new();

    // plan built once with the rate cards, then saved
    let planned = AppState::new(&ws.paths(true))
        .unwrap()
        .estimate_api()
        .compute(&ready_project(
            ProjectType::Cati,
            &["Hà Nội"],
            vec![audience(SampleType::Main, "Subscribers", 100)],
        ))
        .unwrap();

    let state = AppState::new(&ws.paths(false)).expect("catalogues load");
    assert!(state.rate_cards.is_none());
    let estimate = state.estimate_api().compute(&planned.project).expect("compute");
    assert_eq!(estimate.project.samples, planned.project.samples);
    assert_eq!(estimate.rows, planned.rows);
}

#[test]
fn test_export_rejects_unknown_format_and_bad_catalogue() {
    let ws = Workspace::new();
    let state = AppState::new(&ws.paths(true)).unwrap();
    let estimate = state
        .estimate_api()
        .compute(&ready_project(
            ProjectType::Clt,
            &["Hà Nội"],
            vec![audience(SampleType::Main, "Shoppers", 60)],
        ))
        .unwrap();

    let err = export_report(ws.path("estimate.txt"), &estimate).unwrap_err();
    assert!(matches!(err, ApiError::Export(_)));
    assert!(!ws.path("estimate.txt").exists());

    let err = export_csv(ws.path("estimate.xlsx"), &estimate).unwrap_err();
    assert!(matches!(err, ApiError::Export(_)));
    assert!(!ws.path("estimate.xlsx").exists());

    fs::write(ws.path("hierarchy.json"), "{ not json").unwrap();
    let err = AppState::new(&ws.paths(true)).err().expect("broken hierarchy");
    assert_eq!(err.exit_code(), 3);
}
