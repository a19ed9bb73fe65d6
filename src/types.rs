use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{BridgeError, BridgeResult};

//==============================================================================
// Cell addressing
//==============================================================================

/// Zero-based (row, column) position of a cell within a sheet.
///
/// Ordering is row-major so a `BTreeMap<CellAddress, _>` iterates the way a
/// worksheet is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::excel::address::encode_cell(*self))
    }
}

//==============================================================================
// Cell values
//==============================================================================

/// How a cell's value should be interpreted on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Number,
    String,
    Date,
    Percentage,
}

/// Underlying scalar stored by the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl RawValue {
    /// Numeric view of the value. Text is parsed leniently, the way the
    /// widget stores numbers typed into a cell as strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
            RawValue::Bool(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, RawValue::Number(_))
    }

    /// Text rendering used when a value has to be written as a string
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Number(n) => format_number(*n),
            RawValue::Bool(true) => "TRUE".to_string(),
            RawValue::Bool(false) => "FALSE".to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }

    /// Empty strings count as "no value" the same way the widget treats them
    fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.is_empty())
    }
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A typed cell value. The kind is fixed when the value is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellValue {
    pub kind: CellKind,
    pub raw: Option<RawValue>,
    pub display: Option<String>,
}

impl CellValue {
    pub fn number(raw: f64) -> Self {
        Self {
            kind: CellKind::Number,
            raw: Some(RawValue::Number(raw)),
            display: None,
        }
    }

    pub fn text(raw: impl Into<String>) -> Self {
        Self {
            kind: CellKind::String,
            raw: Some(RawValue::Text(raw.into())),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Build a value from the widget's format type tag (`ct.t`).
    ///
    /// `d` marks a date, `n` with a `%` in the display marks a percentage;
    /// everything else is classified by the raw value.
    pub fn from_format(
        format_tag: Option<&str>,
        raw: Option<RawValue>,
        display: Option<String>,
    ) -> Self {
        let numeric = raw.as_ref().and_then(RawValue::as_number).is_some();
        let kind = match format_tag {
            Some("d") => CellKind::Date,
            Some("n") if numeric && display.as_deref().is_some_and(|m| m.contains('%')) => {
                CellKind::Percentage
            }
            _ if raw.as_ref().is_some_and(RawValue::is_number) => CellKind::Number,
            _ => CellKind::String,
        };
        Self { kind, raw, display }
    }

    /// Display string if non-empty, else the raw value, else nothing
    pub fn display_or_raw(&self) -> Option<RawValue> {
        if let Some(display) = self.display.as_deref().filter(|m| !m.is_empty()) {
            return Some(RawValue::Text(display.to_string()));
        }
        self.raw.clone().filter(|raw| !raw.is_blank())
    }
}

//==============================================================================
// Sheets
//==============================================================================

/// Rectangular block of cells fused into one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRegion {
    pub anchor: CellAddress,
    pub row_span: u32,
    pub col_span: u32,
}

impl MergeRegion {
    pub fn new(anchor: CellAddress, row_span: u32, col_span: u32) -> Self {
        Self {
            anchor,
            row_span,
            col_span,
        }
    }

    pub fn last_row(&self) -> u32 {
        self.anchor.row + self.row_span.max(1) - 1
    }

    pub fn last_col(&self) -> u32 {
        self.anchor.col + self.col_span.max(1) - 1
    }

    pub fn overlaps(&self, other: &MergeRegion) -> bool {
        self.anchor.row <= other.last_row()
            && other.anchor.row <= self.last_row()
            && self.anchor.col <= other.last_col()
            && other.anchor.col <= self.last_col()
    }
}

/// Minimal rectangle covering the populated cells of a sheet (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRange {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl Default for BoundingRange {
    /// The origin cell `A1`
    fn default() -> Self {
        Self::single(CellAddress::new(0, 0))
    }
}

impl BoundingRange {
    pub fn single(addr: CellAddress) -> Self {
        Self {
            min_row: addr.row,
            min_col: addr.col,
            max_row: addr.row,
            max_col: addr.col,
        }
    }

    /// Range over a set of addresses; `None` when there are none
    pub fn covering<'a>(addrs: impl IntoIterator<Item = &'a CellAddress>) -> Option<Self> {
        let mut iter = addrs.into_iter();
        let mut range = Self::single(*iter.next()?);
        for addr in iter {
            range.extend(*addr);
        }
        Some(range)
    }

    pub fn extend(&mut self, addr: CellAddress) {
        self.min_row = self.min_row.min(addr.row);
        self.min_col = self.min_col.min(addr.col);
        self.max_row = self.max_row.max(addr.row);
        self.max_col = self.max_col.max(addr.col);
    }

    pub fn height(&self) -> u32 {
        self.max_row - self.min_row + 1
    }

    pub fn width(&self) -> u32 {
        self.max_col - self.min_col + 1
    }

    pub fn contains(&self, addr: CellAddress) -> bool {
        (self.min_row..=self.max_row).contains(&addr.row)
            && (self.min_col..=self.max_col).contains(&addr.col)
    }

    pub fn origin(&self) -> CellAddress {
        CellAddress::new(self.min_row, self.min_col)
    }
}

/// One sheet of the widget's in-memory model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: Option<String>,
    pub order: u32,
    pub active: bool,
    pub cells: BTreeMap<CellAddress, CellValue>,
    pub merges: Vec<MergeRegion>,
    /// Column widths in pixels
    pub column_widths: BTreeMap<u32, f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn set_cell(&mut self, row: u32, col: u32, value: CellValue) {
        self.cells.insert(CellAddress::new(row, col), value);
    }

    pub fn add_merge(&mut self, region: MergeRegion) {
        self.merges.push(region);
    }

    pub fn set_column_width(&mut self, col: u32, px: f64) {
        self.column_widths.insert(col, px);
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounding range of the populated cells, the origin cell when empty
    pub fn bounding_range(&self) -> BoundingRange {
        BoundingRange::covering(self.cells.keys()).unwrap_or_default()
    }
}

/// Ordered sheets of one workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetCollection {
    pub sheets: Vec<Sheet>,
}

impl SheetCollection {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// True when at least one sheet has a populated cell
    pub fn has_data(&self) -> bool {
        self.sheets.iter().any(|s| !s.is_empty())
    }

    pub fn active(&self) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.active)
    }

    /// Check order uniqueness, the single-active rule and merge geometry
    pub fn validate(&self) -> BridgeResult<()> {
        let mut orders = HashSet::new();
        let mut active = 0;

        for (idx, sheet) in self.sheets.iter().enumerate() {
            let label = sheet.name.clone().unwrap_or_else(|| format!("#{}", idx));

            if !orders.insert(sheet.order) {
                return Err(BridgeError::InvalidSheet(format!(
                    "{}: duplicate order {}",
                    label, sheet.order
                )));
            }
            if sheet.active {
                active += 1;
            }

            for (i, merge) in sheet.merges.iter().enumerate() {
                if merge.row_span == 0 || merge.col_span == 0 {
                    return Err(BridgeError::InvalidSheet(format!(
                        "{}: merge at {} has a zero span",
                        label, merge.anchor
                    )));
                }
                if let Some(other) = sheet.merges[i + 1..].iter().find(|m| m.overlaps(merge)) {
                    return Err(BridgeError::InvalidSheet(format!(
                        "{}: merges at {} and {} overlap",
                        label, merge.anchor, other.anchor
                    )));
                }
            }
        }

        if active > 1 {
            return Err(BridgeError::InvalidSheet(format!(
                "{} sheets are marked active",
                active
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_format_date() {
        let value = CellValue::from_format(
            Some("d"),
            Some(RawValue::Number(45306.0)),
            Some("2024-01-15".to_string()),
        );
        assert_eq!(value.kind, CellKind::Date);
    }

    #[test]
    fn test_from_format_percentage_needs_numeric_raw() {
        let pct = CellValue::from_format(
            Some("n"),
            Some(RawValue::Number(50.0)),
            Some("50%".to_string()),
        );
        assert_eq!(pct.kind, CellKind::Percentage);

        let text = CellValue::from_format(
            Some("n"),
            Some(RawValue::Text("n/a".to_string())),
            Some("n/a %".to_string()),
        );
        assert_eq!(text.kind, CellKind::String);
    }

    #[test]
    fn test_from_format_general() {
        let num = CellValue::from_format(Some("g"), Some(RawValue::Number(3.0)), None);
        assert_eq!(num.kind, CellKind::Number);

        let s = CellValue::from_format(None, Some(RawValue::Text("x".to_string())), None);
        assert_eq!(s.kind, CellKind::String);
    }

    #[test]
    fn test_display_or_raw() {
        let shown = CellValue::number(1234.5).with_display("1,234.50");
        assert_eq!(
            shown.display_or_raw(),
            Some(RawValue::Text("1,234.50".to_string()))
        );

        let bare = CellValue::number(7.0).with_display("");
        assert_eq!(bare.display_or_raw(), Some(RawValue::Number(7.0)));

        let blank = CellValue::text("");
        assert_eq!(blank.display_or_raw(), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_bounding_range_empty_sheet_is_origin() {
        let sheet = Sheet::new("Empty");
        assert_eq!(sheet.bounding_range(), BoundingRange::default());
        assert_eq!(sheet.bounding_range().width(), 1);
    }

    #[test]
    fn test_bounding_range_covers_cells() {
        let mut sheet = Sheet::new("Data");
        sheet.set_cell(2, 5, CellValue::number(1.0));
        sheet.set_cell(4, 1, CellValue::number(2.0));

        let range = sheet.bounding_range();
        assert_eq!(range.min_row, 2);
        assert_eq!(range.min_col, 1);
        assert_eq!(range.max_row, 4);
        assert_eq!(range.max_col, 5);
        assert_eq!(range.height(), 3);
        assert_eq!(range.width(), 5);
        assert!(range.contains(CellAddress::new(3, 3)));
        assert!(!range.contains(CellAddress::new(0, 0)));
    }

    #[test]
    fn test_merge_overlap() {
        let a = MergeRegion::new(CellAddress::new(0, 0), 2, 2);
        let b = MergeRegion::new(CellAddress::new(1, 1), 1, 1);
        let c = MergeRegion::new(CellAddress::new(2, 0), 1, 3);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_validate_rejects_duplicate_order() {
        let mut s1 = Sheet::new("A");
        let mut s2 = Sheet::new("B");
        s1.order = 0;
        s2.order = 0;
        let result = SheetCollection::new(vec![s1, s2]).validate();
        assert!(matches!(result, Err(BridgeError::InvalidSheet(_))));
    }

    #[test]
    fn test_validate_rejects_two_active_sheets() {
        let mut s1 = Sheet::new("A");
        let mut s2 = Sheet::new("B");
        s2.order = 1;
        s1.active = true;
        s2.active = true;
        let result = SheetCollection::new(vec![s1, s2]).validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_overlapping_merges() {
        let mut sheet = Sheet::new("A");
        sheet.add_merge(MergeRegion::new(CellAddress::new(0, 0), 2, 2));
        sheet.add_merge(MergeRegion::new(CellAddress::new(1, 1), 2, 2));
        assert!(SheetCollection::new(vec![sheet]).validate().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_collection() {
        let mut s1 = Sheet::new("A");
        s1.active = true;
        s1.add_merge(MergeRegion::new(CellAddress::new(0, 0), 1, 2));
        s1.add_merge(MergeRegion::new(CellAddress::new(1, 0), 1, 2));
        let mut s2 = Sheet::new("B");
        s2.order = 1;
        assert!(SheetCollection::new(vec![s1, s2]).validate().is_ok());
    }
}
