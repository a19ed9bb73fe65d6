//! Grid exporter: widget sheets → dense tables

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::excel::table::{ColumnWidth, MergeSpan, TableFile, TableSheet, TableValue};
use crate::types::{
    BoundingRange, CellAddress, CellKind, CellValue, MergeRegion, RawValue, Sheet, SheetCollection,
};

/// Sheet name used by range-only exports
pub const SELECTED_RANGE_SHEET: &str = "SelectedRange";

/// Pixels per character of column width
const PX_PER_CHAR: f64 = 7.0;

/// Width (in characters) for columns without a recorded width
const DEFAULT_COLUMN_CHARS: f64 = 10.0;

const DATE_TIME_FORMATS: [&str; 2] = ["%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M"];

/// Years an Excel date cell can hold
const EXCEL_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Converts the widget's sheets into dense, display-ready tables
pub struct TableExporter {
    px_per_char: f64,
    default_column_chars: f64,
}

impl Default for TableExporter {
    fn default() -> Self {
        Self {
            px_per_char: PX_PER_CHAR,
            default_column_chars: DEFAULT_COLUMN_CHARS,
        }
    }
}

impl TableExporter {
    /// Create a new exporter with the standard width conversion
    pub fn new() -> Self {
        Self::default()
    }

    /// Export every sheet, preserving order.
    ///
    /// Fails with `NoData` when the collection is empty or no sheet has a
    /// populated cell.
    pub fn export_collection(&self, collection: &SheetCollection) -> BridgeResult<TableFile> {
        if collection.is_empty() || !collection.has_data() {
            return Err(BridgeError::NoData);
        }

        let mut file = TableFile::new();
        for (idx, sheet) in collection.sheets.iter().enumerate() {
            let name = sheet_name(sheet, idx);
            file.add_sheet(self.convert_sheet(sheet, name));
        }

        Ok(file)
    }

    /// Export one externally supplied sheet (the widget's current sheet)
    pub fn export_sheet(&self, sheet: &Sheet) -> BridgeResult<TableFile> {
        if sheet.is_empty() {
            return Err(BridgeError::NoData);
        }

        let mut file = TableFile::new();
        file.add_sheet(self.convert_sheet(sheet, sheet_name(sheet, 0)));
        Ok(file)
    }

    /// Export the sheet at a zero-based position of the collection
    pub fn export_sheet_at(
        &self,
        collection: &SheetCollection,
        index: usize,
    ) -> BridgeResult<TableFile> {
        let sheet = collection.sheets.get(index).ok_or_else(|| {
            BridgeError::InvalidSheet(format!(
                "index {} out of range ({} sheets)",
                index,
                collection.len()
            ))
        })?;

        let mut file = TableFile::new();
        file.add_sheet(self.convert_sheet(sheet, sheet_name(sheet, index)));
        Ok(file)
    }

    /// Export a selected region whose values the caller already resolved.
    ///
    /// The result has a single sheet and no merge or width metadata.
    pub fn export_range(&self, selection: Option<&[Vec<TableValue>]>) -> BridgeResult<TableFile> {
        let rows = match selection {
            Some(rows) if rows.iter().any(|r| !r.is_empty()) => rows,
            _ => return Err(BridgeError::NoSelection),
        };

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let dense: Vec<Vec<TableValue>> = rows
            .iter()
            .map(|row| {
                let mut padded = row.clone();
                padded.resize(width, TableValue::Empty);
                padded
            })
            .collect();

        let mut file = TableFile::new();
        file.add_sheet(TableSheet::new(
            SELECTED_RANGE_SHEET,
            CellAddress::new(0, 0),
            dense,
        ));
        Ok(file)
    }

    /// Convert one sheet into a dense table spanning its bounding range
    fn convert_sheet(&self, sheet: &Sheet, name: String) -> TableSheet {
        let range = sheet.bounding_range();
        let width = range.width() as usize;

        let mut rows = vec![vec![TableValue::Empty; width]; range.height() as usize];
        for (addr, cell) in &sheet.cells {
            let r = (addr.row - range.min_row) as usize;
            let c = (addr.col - range.min_col) as usize;
            rows[r][c] = resolve_value(cell);
        }

        debug!(
            sheet = %name,
            cells = sheet.cells.len(),
            rows = rows.len(),
            cols = width,
            merges = sheet.merges.len(),
            "converted sheet to dense table"
        );

        let mut table = TableSheet::new(name, range.origin(), rows);
        table.merges = sheet.merges.iter().map(convert_merge).collect();
        table.column_widths = self.convert_column_widths(sheet, &range);
        table
    }

    /// Character widths for every column in range
    fn convert_column_widths(&self, sheet: &Sheet, range: &BoundingRange) -> Vec<ColumnWidth> {
        (range.min_col..=range.max_col)
            .map(|col| {
                let chars = match sheet.column_widths.get(&col) {
                    Some(&px) if px > 0.0 => (px / self.px_per_char).round(),
                    _ => self.default_column_chars,
                };
                ColumnWidth { col, chars }
            })
            .collect()
    }
}

/// Sheet name, or `Sheet{N}` (1-based) when the sheet has none
fn sheet_name(sheet: &Sheet, index: usize) -> String {
    sheet
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Sheet{}", index + 1))
}

/// Anchor + spans → inclusive start/end
fn convert_merge(region: &MergeRegion) -> MergeSpan {
    MergeSpan {
        first_row: region.anchor.row,
        first_col: region.anchor.col,
        last_row: region.last_row(),
        last_col: region.last_col(),
    }
}

/// Resolve the value written for a populated cell.
///
/// Dates come from the display string, percentages from the raw number;
/// everything else goes through [`display_value`]. A date Excel cannot hold
/// (before 1900) stays as its display string.
pub fn resolve_value(cell: &CellValue) -> TableValue {
    match cell.kind {
        CellKind::Date => {
            if let Some(date) = cell
                .display
                .as_deref()
                .and_then(parse_display_date)
                .filter(|d| EXCEL_YEARS.contains(&d.year()))
            {
                return TableValue::Date(date);
            }
        }
        CellKind::Percentage => {
            if let Some(n) = cell.raw.as_ref().and_then(RawValue::as_number) {
                return TableValue::Number(n / 100.0);
            }
        }
        CellKind::Number | CellKind::String => {}
    }

    display_value(cell)
}

/// Display string, else raw value, else empty text; no date or percentage
/// handling. Used as-is for selected ranges.
pub fn display_value(cell: &CellValue) -> TableValue {
    match (cell.display_or_raw(), cell.raw.as_ref()) {
        // A display that is just the number itself keeps the cell numeric
        (Some(RawValue::Text(shown)), Some(RawValue::Number(n)))
            if shown.trim().parse::<f64>().ok() == Some(*n) =>
        {
            TableValue::Number(*n)
        }
        (Some(value), _) => table_value(value),
        (None, _) => TableValue::Text(String::new()),
    }
}

fn table_value(raw: RawValue) -> TableValue {
    match raw {
        RawValue::Number(n) => TableValue::Number(n),
        RawValue::Bool(b) => TableValue::Bool(b),
        RawValue::Text(s) => TableValue::Text(s),
    }
}

/// Parse a displayed date such as `2024-01-15` or `2024/01/15 08:30`
pub fn parse_display_date(display: &str) -> Option<NaiveDateTime> {
    let normalized = display.trim().replace('-', "/");

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y/%m/%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
