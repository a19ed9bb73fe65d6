//! In-memory widget backed by a [`WidgetDocument`]

use std::path::Path;

use crate::error::BridgeResult;
use crate::types::{BoundingRange, CellAddress, CellValue};
use crate::widget::json::{WidgetDocument, WidgetSheet};
use crate::widget::{SpreadsheetWidget, WidgetOptions};

/// Widget state held in memory: the document plus the current selection
#[derive(Debug, Clone, Default)]
pub struct MemoryWidget {
    document: WidgetDocument,
    selection: Option<BoundingRange>,
    options: Option<WidgetOptions>,
}

impl MemoryWidget {
    pub fn new(document: WidgetDocument) -> Self {
        Self {
            document,
            selection: None,
            options: None,
        }
    }

    /// Parse a document (or a bare sheet array) from JSON text
    pub fn from_json(json: &str) -> BridgeResult<Self> {
        Ok(Self::new(WidgetDocument::from_json_lenient(json)?))
    }

    pub fn from_file(path: &Path) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Select a rectangle of the current sheet
    pub fn select(&mut self, range: BoundingRange) {
        self.selection = Some(range);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn document(&self) -> &WidgetDocument {
        &self.document
    }

    /// Options from the last `create`, until `destroy`
    pub fn options(&self) -> Option<&WidgetOptions> {
        self.options.as_ref()
    }

    /// Active sheet, else the first one
    fn current_position(&self) -> Option<usize> {
        if self.document.sheets.is_empty() {
            return None;
        }
        Some(
            self.document
                .sheets
                .iter()
                .position(|s| s.status == 1)
                .unwrap_or(0),
        )
    }
}

impl SpreadsheetWidget for MemoryWidget {
    fn get_all_sheets(&self) -> Vec<WidgetSheet> {
        self.document.sheets.clone()
    }

    fn get_sheet_data(&self) -> Option<WidgetSheet> {
        self.current_position()
            .map(|pos| self.document.sheets[pos].clone())
    }

    fn get_range(&self) -> Option<BoundingRange> {
        self.selection
    }

    fn get_range_value(&self) -> Option<Vec<Vec<Option<CellValue>>>> {
        let range = self.selection?;
        let pos = self.current_position()?;
        let sheet = self.document.sheets[pos].to_sheet(pos);

        let rows = (range.min_row..=range.max_row)
            .map(|row| {
                (range.min_col..=range.max_col)
                    .map(|col| sheet.cells.get(&CellAddress::new(row, col)).cloned())
                    .collect()
            })
            .collect();
        Some(rows)
    }

    fn to_json(&self) -> WidgetDocument {
        self.document.clone()
    }

    fn create(&mut self, options: WidgetOptions) {
        self.document.sheets = options.data.clone().unwrap_or_default();
        if !options.title.is_empty() {
            self.document.info.name = options.title.clone();
        }
        self.selection = None;
        self.options = Some(options);
    }

    fn destroy(&mut self) {
        self.document.sheets.clear();
        self.selection = None;
        self.options = None;
    }
}
