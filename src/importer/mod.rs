// ==========================================
// Fieldwork costing - importer layer
// ==========================================
// CSV/XLSX element-cost sheets -> element-costs store
// ==========================================

pub mod element_cost_importer;
pub mod error;
pub mod file_parser;

pub use element_cost_importer::{map_sheet, ElementCostImporter, ImportSummary};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawSheet, SheetParser, UniversalFileParser};
