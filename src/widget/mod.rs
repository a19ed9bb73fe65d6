//! Spreadsheet widget interface
//!
//! The widget owns the live cell model. Everything else in the crate reaches
//! it through [`SpreadsheetWidget`], so the session can run against the
//! in-memory implementation as easily as against a real UI host.

pub mod json;
mod memory;

pub use json::{
    CellFormat, CellPayload, DocumentInfo, MergeEntry, SheetConfig, SheetIndex, WidgetCell,
    WidgetDocument, WidgetSheet,
};
pub use memory::MemoryWidget;

use serde::{Deserialize, Serialize};

use crate::types::{BoundingRange, CellValue};

/// Capabilities the conversions need from the widget
pub trait SpreadsheetWidget {
    /// Every sheet with cells, merge config and column widths
    fn get_all_sheets(&self) -> Vec<WidgetSheet>;

    /// The sheet the user is currently looking at
    fn get_sheet_data(&self) -> Option<WidgetSheet>;

    /// Selected rectangle, if any
    fn get_range(&self) -> Option<BoundingRange>;

    /// Values inside the selection, row-major; `None` for blank cells
    fn get_range_value(&self) -> Option<Vec<Vec<Option<CellValue>>>>;

    /// Full document
    fn to_json(&self) -> WidgetDocument;

    /// (Re)initialize, optionally with load data
    fn create(&mut self, options: WidgetOptions);

    fn destroy(&mut self);
}

/// Initialization options passed to [`SpreadsheetWidget::create`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    pub container: String,
    pub plugins: Vec<String>,
    pub showinfobar: bool,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<WidgetSheet>>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            container: "luckysheet".to_string(),
            plugins: vec!["chart".to_string()],
            showinfobar: false,
            title: String::new(),
            data: None,
        }
    }
}

impl WidgetOptions {
    /// Default options carrying load data
    pub fn with_data(data: Vec<WidgetSheet>) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }
}
