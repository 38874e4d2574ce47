// ==========================================
// Fieldwork costing - element-cost sheet importer
// ==========================================
// Columns: subtitle_code, subtitle_1..subtitle_5, unit,
//          then one "<level>|<duration band>" column per cost cell
// Pipeline: parse sheet -> map rows -> replace store rows
//           -> save level/length metadata
// ==========================================

use crate::catalogue::length_band::parse_length_band;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawSheet, UniversalFileParser};
use crate::repository::element_cost_repo::{
    ElementCostRecord, ElementCostRepository, ElementCostValue, ProjectMetadata, SUBTITLE_DEPTH,
};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

pub const COST_COLUMN_SEPARATOR: char = '|';

/// Outcome of one import run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub project_type: String,
    pub rows_imported: usize,
    pub levels: Vec<String>,
    pub lengths: Vec<String>,
}

/// One cost column: header position, level and band
#[derive(Debug, Clone, PartialEq)]
struct CostColumn {
    index: usize,
    level: String,
    band: String,
}

struct ColumnLayout {
    code: usize,
    subtitles: Vec<Option<usize>>,
    unit: Option<usize>,
    costs: Vec<CostColumn>,
}

impl ColumnLayout {
    fn detect(sheet: &RawSheet) -> ImportResult<Self> {
        let code = sheet
            .column("subtitle_code")
            .ok_or_else(|| ImportError::MissingColumn("subtitle_code".to_string()))?;

        let subtitles = (1..=SUBTITLE_DEPTH)
            .map(|n| sheet.column(&format!("subtitle_{}", n)))
            .collect::<Vec<_>>();
        if subtitles.iter().all(Option::is_none) {
            return Err(ImportError::MissingColumn("subtitle_1".to_string()));
        }

        let costs = sheet
            .headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                let (level, band) = header.split_once(COST_COLUMN_SEPARATOR)?;
                let (level, band) = (level.trim(), band.trim());
                if level.is_empty() || band.is_empty() {
                    return None;
                }
                Some(CostColumn {
                    index,
                    level: level.to_string(),
                    band: band.to_string(),
                })
            })
            .collect();

        Ok(Self {
            code,
            subtitles,
            unit: sheet.column("unit"),
            costs,
        })
    }
}

pub struct ElementCostImporter<'a> {
    repo: &'a ElementCostRepository,
}

impl<'a> ElementCostImporter<'a> {
    pub fn new(repo: &'a ElementCostRepository) -> Self {
        Self { repo }
    }

    /// Parse a CSV/XLSX sheet and replace the project type's rows
    pub fn import_file<P: AsRef<Path>>(&self, project_type: &str, path: P) -> ImportResult<ImportSummary> {
        let path = path.as_ref();
        tracing::info!(project_type, path = %path.display(), "element-cost import started");

        let sheet = UniversalFileParser.parse(path)?;
        self.import_sheet(project_type, &sheet)
    }

    /// Map an already parsed sheet and persist it
    pub fn import_sheet(&self, project_type: &str, sheet: &RawSheet) -> ImportResult<ImportSummary> {
        let (records, metadata) = map_sheet(sheet)?;

        let rows_imported = self.repo.replace_elements(project_type, &records)?;
        self.repo.save_metadata(project_type, &metadata)?;

        tracing::info!(
            project_type,
            rows = rows_imported,
            levels = metadata.levels.len(),
            lengths = metadata.lengths.len(),
            "element-cost import finished"
        );

        Ok(ImportSummary {
            project_type: project_type.trim().to_string(),
            rows_imported,
            levels: metadata.levels,
            lengths: metadata.lengths,
        })
    }
}

/// Sheet -> store records plus ordered level/length labels
pub fn map_sheet(sheet: &RawSheet) -> ImportResult<(Vec<ElementCostRecord>, ProjectMetadata)> {
    let layout = ColumnLayout::detect(sheet)?;

    let mut metadata = ProjectMetadata::default();
    for column in &layout.costs {
        if !metadata.levels.contains(&column.level) {
            metadata.levels.push(column.level.clone());
        }
        if !metadata.lengths.contains(&column.band) {
            metadata.lengths.push(column.band.clone());
        }
    }

    let mut records = Vec::with_capacity(sheet.rows.len());
    for (order, row) in sheet.rows.iter().enumerate() {
        let subtitle_code = row.cell(layout.code).to_string();
        let subtitles: Vec<String> = layout
            .subtitles
            .iter()
            .map(|col| col.map(|c| row.cell(c).to_string()).unwrap_or_default())
            .collect();

        if subtitles.iter().all(|s| s.is_empty()) {
            return Err(ImportError::FieldMappingError {
                row: row.row_number,
                message: format!("row {} has no subtitle", subtitle_code),
            });
        }

        let mut values = Vec::new();
        for column in &layout.costs {
            let raw = row.cell(column.index);
            if raw.is_empty() {
                continue;
            }
            let cost_value = parse_cost_cell(raw).ok_or_else(|| ImportError::TypeConversionError {
                row: row.row_number,
                field: sheet.headers[column.index].clone(),
                message: format!("not a number: {}", raw),
            })?;
            let range = parse_length_band(&column.band);
            values.push(ElementCostValue {
                level: column.level.clone(),
                length_min: range.min,
                length_max: range.max,
                cost_value,
            });
        }

        records.push(ElementCostRecord {
            subtitle_code,
            subtitles,
            row_order: order as i64 + 1,
            unit: layout.unit.map(|c| row.cell(c).to_string()).unwrap_or_default(),
            values,
        });
    }

    Ok((records, metadata))
}

/// Accepts "3000", "3,000", "3 000" and "3000.5"
fn parse_cost_cell(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | ' ' | '\u{a0}')).collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}
