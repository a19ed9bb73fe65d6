//! Tabular file representations
//!
//! Two shapes are used on purpose:
//! - [`TableFile`]: dense row-major arrays per sheet plus merge and column
//!   width metadata, produced by the grid exporter for display-ready files.
//! - [`SparseWorkbook`]: a declared occupied range plus a map of present
//!   cells per sheet. It is what a parsed `.xlsx` looks like and what the
//!   upload assembler builds.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{format_number, CellAddress};

//==============================================================================
// Dense tables
//==============================================================================

/// Resolved value of one position in a dense table
#[derive(Debug, Clone, PartialEq)]
pub enum TableValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
}

impl TableValue {
    pub fn is_empty(&self) -> bool {
        match self {
            TableValue::Empty => true,
            TableValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Inclusive merge bounds in absolute sheet coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSpan {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl MergeSpan {
    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }
}

/// Column width in character units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidth {
    pub col: u32,
    pub chars: f64,
}

/// One dense sheet ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct TableSheet {
    pub name: String,
    /// Absolute position of `rows[0][0]`
    pub origin: CellAddress,
    pub rows: Vec<Vec<TableValue>>,
    pub merges: Vec<MergeSpan>,
    pub column_widths: Vec<ColumnWidth>,
}

impl TableSheet {
    pub fn new(name: impl Into<String>, origin: CellAddress, rows: Vec<Vec<TableValue>>) -> Self {
        Self {
            name: name.into(),
            origin,
            rows,
            merges: Vec::new(),
            column_widths: Vec::new(),
        }
    }

    /// Value at an absolute address, `None` outside the array
    pub fn value_at(&self, row: u32, col: u32) -> Option<&TableValue> {
        let r = row.checked_sub(self.origin.row)? as usize;
        let c = col.checked_sub(self.origin.col)? as usize;
        self.rows.get(r)?.get(c)
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }
}

/// Ordered dense sheets of one output file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFile {
    pub sheets: Vec<TableSheet>,
}

impl TableFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: TableSheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet(&self, name: &str) -> Option<&TableSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

//==============================================================================
// Sparse tables
//==============================================================================

/// Cell type tag as carried by tabular files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    #[serde(rename = "n")]
    Number,
    #[serde(rename = "s")]
    Text,
    #[serde(rename = "b")]
    Bool,
    #[serde(rename = "d")]
    Date,
    #[serde(rename = "e")]
    Error,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Number => "n",
            TypeTag::Text => "s",
            TypeTag::Bool => "b",
            TypeTag::Date => "d",
            TypeTag::Error => "e",
        }
    }
}

/// Raw scalar stored in a tabular cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellData {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellData {
    pub fn to_text(&self) -> String {
        match self {
            CellData::Number(n) => format_number(*n),
            CellData::Bool(true) => "TRUE".to_string(),
            CellData::Bool(false) => "FALSE".to_string(),
            CellData::Text(s) => s.clone(),
        }
    }
}

/// One present cell of a sparse sheet
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    pub value: CellData,
    pub tag: TypeTag,
}

impl RawCell {
    pub fn number(n: f64) -> Self {
        Self {
            value: CellData::Number(n),
            tag: TypeTag::Number,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self {
            value: CellData::Text(s.into()),
            tag: TypeTag::Text,
        }
    }

    pub fn boolean(b: bool) -> Self {
        Self {
            value: CellData::Bool(b),
            tag: TypeTag::Bool,
        }
    }
}

/// Sheet with a declared range and only its present cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseSheet {
    pub name: String,
    /// Declared occupied range, e.g. `A1:C3`
    pub dimensions: Option<String>,
    pub cells: BTreeMap<CellAddress, RawCell>,
}

impl SparseSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&RawCell> {
        self.cells.get(&CellAddress::new(row, col))
    }
}

/// Ordered sparse sheets, as parsed from or assembled for a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseWorkbook {
    pub sheets: Vec<SparseSheet>,
}

impl SparseWorkbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&SparseSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sheet_value_at_uses_origin() {
        let sheet = TableSheet::new(
            "Data",
            CellAddress::new(2, 3),
            vec![vec![TableValue::Number(1.0), TableValue::Empty]],
        );
        assert_eq!(sheet.value_at(2, 3), Some(&TableValue::Number(1.0)));
        assert_eq!(sheet.value_at(2, 4), Some(&TableValue::Empty));
        assert_eq!(sheet.value_at(0, 0), None);
        assert_eq!(sheet.value_at(3, 3), None);
    }

    #[test]
    fn test_table_value_is_empty() {
        assert!(TableValue::Empty.is_empty());
        assert!(TableValue::Text(String::new()).is_empty());
        assert!(!TableValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_type_tag_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&TypeTag::Number).unwrap(), "\"n\"");
        assert_eq!(serde_json::to_string(&TypeTag::Text).unwrap(), "\"s\"");
        assert_eq!(TypeTag::Error.as_str(), "e");
    }

    #[test]
    fn test_cell_data_to_text() {
        assert_eq!(CellData::Number(5.0).to_text(), "5");
        assert_eq!(CellData::Bool(true).to_text(), "TRUE");
        assert_eq!(CellData::Text("hi".to_string()).to_text(), "hi");
    }
}
