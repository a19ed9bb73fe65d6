//! Excel conversion module
//!
//! This module provides bidirectional widget ↔ Excel conversion:
//! - Export: widget sheets → dense tables → Excel (.xlsx)
//! - Import: Excel (.xlsx) → sparse tables → widget load data
//! - Assembly: widget sheets → sparse Excel buffer for upload

pub mod address;
mod assembler;
mod exporter;
mod importer;
mod reader;
pub mod table;
mod writer;

pub use assembler::{build_file, build_workbook};
pub use exporter::{
    display_value, parse_display_date, resolve_value, TableExporter, SELECTED_RANGE_SHEET,
};
pub use importer::{LoadSheet, TableImporter};
pub use reader::read_workbook;
pub use table::{
    CellData, ColumnWidth, MergeSpan, RawCell, SparseSheet, SparseWorkbook, TableFile, TableSheet,
    TableValue, TypeTag,
};
pub use writer::{write_sparse_workbook, write_table_file};
