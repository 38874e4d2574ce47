// ==========================================
// Fieldwork costing - report export
// ==========================================
// "Estimate Cost" report, XLSX (primary) or CSV:
//   header block    Project Name / Internal Job / Method
//   sample table    one line per province × audience
//   cost rows       CostRow::HEADERS column order
// Sections are separated by an empty row.
// ==========================================

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::api::error::{ApiError, ApiResult};
use crate::api::estimate_api::CostEstimate;
use crate::domain::cost::CostRow;

pub const REPORT_TITLE: &str = "Estimate Cost";

pub const SAMPLE_TABLE_HEADERS: [&str; 7] = [
    "province",
    "audience",
    "sample_type",
    "sample_size",
    "extra_rate",
    "effective_size",
    "daily_sup_target",
];

fn amount(value: Decimal) -> String {
    value.normalize().to_string()
}

fn method_label(estimate: &CostEstimate) -> String {
    estimate
        .project
        .general
        .project_type
        .map(|t| t.as_str().to_string())
        .unwrap_or_default()
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

fn row_record(row: &CostRow) -> [String; 10] {
    [
        row.subtitle_path.clone(),
        row.province.clone(),
        row.description.clone(),
        row.target_audience.clone(),
        row.code.clone(),
        row.unit.clone(),
        amount(row.unit_cost),
        amount(row.quantity),
        amount(row.total),
        row.comment.clone(),
    ]
}

/// Write the report to any writer
pub fn write_csv_report<W: Write>(writer: W, estimate: &CostEstimate) -> ApiResult<()> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
    let general = &estimate.project.general;
    let method = method_label(estimate);

    // ===== header block =====
    wtr.write_record([REPORT_TITLE])?;
    wtr.write_record(["Project Name", general.project_name.as_str()])?;
    wtr.write_record(["Internal Job", general.internal_job.as_str()])?;
    wtr.write_record(["Method", method.as_str()])?;
    wtr.write_record(None::<&str>)?;

    // ===== sample table =====
    wtr.write_record(SAMPLE_TABLE_HEADERS)?;
    for (province, audience) in estimate.project.samples.iter() {
        wtr.write_record([
            province.to_string(),
            audience.target_audience.clone(),
            audience.sample_type.to_string(),
            audience.sample_size.to_string(),
            amount(audience.extra_rate),
            amount(audience.effective_size()),
            amount(audience.target.daily_sup_target),
        ])?;
    }
    wtr.write_record(None::<&str>)?;

    // ===== cost rows =====
    wtr.write_record(CostRow::HEADERS)?;
    for row in &estimate.rows {
        wtr.write_record(row_record(row))?;
    }
    let total = amount(estimate.grand_total);
    wtr.write_record(["", "", "", "", "", "", "", "", total.as_str(), "grand total"])?;

    wtr.flush().map_err(|e| ApiError::Export(e.to_string()))?;
    Ok(())
}

// ==========================================
// XLSX
// ==========================================

fn write_amount(sheet: &mut Worksheet, row: u32, col: u16, value: Decimal) -> Result<(), XlsxError> {
    sheet.write_number(row, col, value.to_f64().unwrap_or_default())?;
    Ok(())
}

fn write_header_row(sheet: &mut Worksheet, row: u32, headers: &[&str], bold: &Format) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *header, bold)?;
    }
    Ok(())
}

/// Lay the report out on a single "Estimate Cost" worksheet
pub fn build_xlsx_report(estimate: &CostEstimate) -> ApiResult<Workbook> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let general = &estimate.project.general;
    let method = method_label(estimate);

    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_TITLE)?;

    // ===== header block =====
    sheet.write_string_with_format(0, 0, REPORT_TITLE, &bold)?;
    for (row, (label, value)) in [
        ("Project Name", general.project_name.as_str()),
        ("Internal Job", general.internal_job.as_str()),
        ("Method", method.as_str()),
    ]
    .into_iter()
    .enumerate()
    {
        sheet.write_string_with_format(row as u32 + 1, 0, label, &bold)?;
        sheet.write_string(row as u32 + 1, 1, value)?;
    }

    // ===== sample table =====
    let mut row: u32 = 5;
    write_header_row(sheet, row, &SAMPLE_TABLE_HEADERS, &bold)?;
    for (province, audience) in estimate.project.samples.iter() {
        row += 1;
        sheet.write_string(row, 0, province)?;
        sheet.write_string(row, 1, audience.target_audience.as_str())?;
        sheet.write_string(row, 2, audience.sample_type.to_string())?;
        sheet.write_number(row, 3, audience.sample_size)?;
        write_amount(sheet, row, 4, audience.extra_rate)?;
        write_amount(sheet, row, 5, audience.effective_size())?;
        write_amount(sheet, row, 6, audience.target.daily_sup_target)?;
    }

    // ===== cost rows =====
    row += 2;
    write_header_row(sheet, row, &CostRow::HEADERS, &bold)?;
    for cost in &estimate.rows {
        row += 1;
        for (col, text) in [
            &cost.subtitle_path,
            &cost.province,
            &cost.description,
            &cost.target_audience,
            &cost.code,
            &cost.unit,
        ]
        .into_iter()
        .enumerate()
        {
            sheet.write_string(row, col as u16, text.as_str())?;
        }
        write_amount(sheet, row, 6, cost.unit_cost)?;
        write_amount(sheet, row, 7, cost.quantity)?;
        write_amount(sheet, row, 8, cost.total)?;
        sheet.write_string(row, 9, cost.comment.as_str())?;
    }
    row += 1;
    write_amount(sheet, row, 8, estimate.grand_total)?;
    sheet.write_string_with_format(row, 9, "grand total", &bold)?;

    sheet.set_column_width(0, 32.0)?;
    sheet.set_column_width(2, 40.0)?;
    sheet.set_column_width(9, 48.0)?;

    Ok(workbook)
}

/// Write the XLSX report to any writer
pub fn write_xlsx_report<W: Write>(mut writer: W, estimate: &CostEstimate) -> ApiResult<()> {
    let bytes = build_xlsx_report(estimate)?.save_to_buffer()?;
    writer
        .write_all(&bytes)
        .map_err(|e| ApiError::Export(e.to_string()))?;
    Ok(())
}

/// Write the report to a `.xlsx` file
pub fn export_xlsx<P: AsRef<Path>>(path: P, estimate: &CostEstimate) -> ApiResult<()> {
    let path = path.as_ref();
    if !has_extension(path, "xlsx") {
        return Err(ApiError::Export(format!(
            "{}: expected an .xlsx path",
            path.display()
        )));
    }

    build_xlsx_report(estimate)?
        .save(path)
        .map_err(|e| ApiError::Export(format!("{}: {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), rows = estimate.rows.len(), "xlsx report exported");
    Ok(())
}

/// Write the report, format chosen by extension (.xlsx or .csv)
pub fn export_report<P: AsRef<Path>>(path: P, estimate: &CostEstimate) -> ApiResult<()> {
    let path = path.as_ref();
    if has_extension(path, "xlsx") {
        export_xlsx(path, estimate)
    } else if has_extension(path, "csv") {
        export_csv(path, estimate)
    } else {
        Err(ApiError::Export(format!(
            "{}: only .xlsx and .csv output are supported",
            path.display()
        )))
    }
}

/// Write the report to a `.csv` file
pub fn export_csv<P: AsRef<Path>>(path: P, estimate: &CostEstimate) -> ApiResult<()> {
    let path = path.as_ref();
    if !has_extension(path, "csv") {
        return Err(ApiError::Export(format!(
            "{}: only .csv output is supported",
            path.display()
        )));
    }

    let file = File::create(path).map_err(|e| ApiError::Export(format!("{}: {}", path.display(), e)))?;
    write_csv_report(file, estimate)?;
    tracing::info!(path = %path.display(), rows = estimate.rows.len(), "report exported");
    Ok(())
}
