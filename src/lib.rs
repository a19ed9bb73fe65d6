//! SheetBridge - spreadsheet widget ↔ Excel conversion
//!
//! This library converts a spreadsheet widget's cell model to and from
//! `.xlsx` workbooks, and moves saved workbooks to and from a backend.
//!
//! # Features
//!
//! - Dense grid export with merged regions, column widths, dates and percentages
//! - Sparse import into the widget's load format
//! - Raw upload workbooks for backend persistence
//! - Async HTTP store for one saved workbook per activity and user
//!
//! # Example
//!
//! ```no_run
//! use sheetbridge::excel::{write_table_file, TableExporter};
//! use sheetbridge::widget::WidgetDocument;
//!
//! let json = std::fs::read_to_string("budget.json")?;
//! let collection = WidgetDocument::from_json(&json)?.to_collection()?;
//!
//! let file = TableExporter::new().export_collection(&collection)?;
//! let bytes = write_table_file(&file)?;
//! std::fs::write("budget.xlsx", bytes)?;
//! # Ok::<(), sheetbridge::error::BridgeError>(())
//! ```

pub mod backend;
pub mod cli;
pub mod error;
pub mod excel;
pub mod json_export;
pub mod session;
pub mod types;
pub mod widget;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult};
pub use types::{
    BoundingRange, CellAddress, CellKind, CellValue, MergeRegion, RawValue, Sheet, SheetCollection,
};
