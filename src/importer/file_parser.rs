// ==========================================
// Fieldwork costing - sheet parsers
// ==========================================
// Excel (.xlsx/.xls) / CSV (.csv) -> RawSheet
// RawSheet keeps column order: cost columns are positional.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// One non-blank data row
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based sheet row (header is row 1)
    pub row_number: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Neutral tabular form shared by every parser
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    /// Column index by header (case-insensitive, trimmed)
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers.iter().position(|h| h.trim().to_lowercase() == wanted)
    }

    fn push_row(&mut self, row_number: usize, cells: Vec<String>) {
        // skip fully blank rows
        if cells.iter().all(|c| c.is_empty()) {
            return;
        }
        self.rows.push(RawRow { row_number, cells });
    }
}

pub trait SheetParser {
    fn parse_sheet(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV parser
// ==========================================
pub struct CsvParser;

impl SheetParser for CsvParser {
    fn parse_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(file_path)?;

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
            }
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // rows may be shorter than the header
            .from_reader(file);

        let mut sheet = RawSheet {
            headers: reader
                .headers()?
                .iter()
                .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
                .collect(),
            rows: Vec::new(),
        };

        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells = record.iter().map(|v| v.trim().to_string()).collect();
            sheet.push_row(idx + 2, cells);
        }

        Ok(sheet)
    }
}

// ==========================================
// Excel parser (first worksheet)
// ==========================================
pub struct ExcelParser;

impl SheetParser for ExcelParser {
    fn parse_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        ensure_exists(file_path)?;

        let ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("xlsx") && !ext.eq_ignore_ascii_case("xls") {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no worksheet".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("worksheet has no header row".to_string()))?;

        let mut sheet = RawSheet {
            headers: header_row.iter().map(|c| c.to_string().trim().to_string()).collect(),
            rows: Vec::new(),
        };

        for (idx, data_row) in rows.enumerate() {
            let cells = data_row.iter().map(|c| c.to_string().trim().to_string()).collect();
            sheet.push_row(idx + 2, cells);
        }

        Ok(sheet)
    }
}

// ==========================================
// Extension-dispatching parser
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawSheet> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_sheet(path),
            "xlsx" | "xls" => ExcelParser.parse_sheet(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_keeps_order_and_skips_blank_rows() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "subtitle_code,subtitle_1,unit,L1|< 15 phút").unwrap();
        writeln!(file, "C01, COMMUNICATION ,Phiếu,3000").unwrap();
        writeln!(file, ",,,").unwrap();
        writeln!(file, "C02,COMMUNICATION,Phiếu").unwrap();
        file.flush().unwrap();

        let sheet = UniversalFileParser.parse(file.path()).unwrap();
        assert_eq!(sheet.headers[3], "L1|< 15 phút");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].cell(1), "COMMUNICATION");
        assert_eq!(sheet.rows[1].row_number, 4);
        assert_eq!(sheet.rows[1].cell(3), "");
        assert_eq!(sheet.column("UNIT"), Some(2));
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let err = UniversalFileParser.parse("/no/such/sheet.csv").unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));

        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let err = UniversalFileParser.parse(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}
