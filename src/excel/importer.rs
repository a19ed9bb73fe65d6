//! Table importer: parsed tabular file → widget load data

use tracing::debug;

use crate::error::BridgeResult;
use crate::excel::address::decode_range;
use crate::excel::reader::read_workbook;
use crate::excel::table::{CellData, RawCell, SparseSheet, SparseWorkbook};
use crate::types::RawValue;
use crate::widget::json::{CellPayload, SheetIndex, WidgetCell, WidgetSheet};

/// A sheet in the widget's load format: sparse `{r, c, v: {v, t}}` cells.
/// [`WidgetSheet::to_sheet`] turns it back into the data model.
pub type LoadSheet = WidgetSheet;

/// Range assumed for a sheet that declares none
const DEFAULT_DIMENSIONS: &str = "A1:A1";

/// Converts parsed tabular sheets into the widget's sparse load format
#[derive(Debug, Default)]
pub struct TableImporter;

impl TableImporter {
    /// Create a new importer
    pub fn new() -> Self {
        Self
    }

    /// Parse `.xlsx` bytes and import them
    pub fn import_bytes(&self, bytes: &[u8]) -> BridgeResult<Vec<LoadSheet>> {
        let workbook = read_workbook(bytes)?;
        self.import(&workbook)
    }

    /// Import every sheet in file order. The first sheet becomes active and
    /// each sheet's order is its position.
    pub fn import(&self, workbook: &SparseWorkbook) -> BridgeResult<Vec<LoadSheet>> {
        workbook
            .sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| self.process_sheet(index, sheet))
            .collect()
    }

    /// Walk the declared range of one sheet, keeping only present cells
    fn process_sheet(&self, index: usize, sheet: &SparseSheet) -> BridgeResult<LoadSheet> {
        let dimensions = sheet.dimensions.as_deref().unwrap_or(DEFAULT_DIMENSIONS);
        let range = decode_range(dimensions)?;

        let mut celldata = Vec::new();
        for row in range.min_row..=range.max_row {
            for col in range.min_col..=range.max_col {
                if let Some(cell) = sheet.get(row, col) {
                    celldata.push(WidgetCell {
                        r: row,
                        c: col,
                        v: load_payload(cell),
                    });
                }
            }
        }

        debug!(
            sheet = %sheet.name,
            index,
            dimensions,
            cells = celldata.len(),
            "imported sheet"
        );

        Ok(WidgetSheet {
            name: Some(sheet.name.clone()),
            index: Some(SheetIndex::Number(index as u32)),
            status: u8::from(index == 0),
            order: Some(index as u32),
            celldata,
            data: None,
            config: None,
        })
    }
}

/// `{v: raw, t: tag}` body of a load cell
fn load_payload(cell: &RawCell) -> CellPayload {
    let v = match &cell.value {
        CellData::Number(n) => RawValue::Number(*n),
        CellData::Bool(b) => RawValue::Bool(*b),
        CellData::Text(s) => RawValue::Text(s.clone()),
    };
    CellPayload {
        v: Some(v),
        t: Some(cell.tag.as_str().to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::types::CellAddress;
    use pretty_assertions::assert_eq;

    fn sheet(name: &str, dimensions: Option<&str>, cells: &[(u32, u32, RawCell)]) -> SparseSheet {
        let mut sheet = SparseSheet::new(name);
        sheet.dimensions = dimensions.map(str::to_string);
        for (r, c, cell) in cells {
            sheet.cells.insert(CellAddress::new(*r, *c), cell.clone());
        }
        sheet
    }

    #[test]
    fn test_import_is_sparse() {
        let workbook = SparseWorkbook {
            sheets: vec![sheet(
                "Data",
                Some("A1:C3"),
                &[(0, 0, RawCell::text("a")), (2, 2, RawCell::number(9.0))],
            )],
        };

        let sheets = TableImporter::new().import(&workbook).unwrap();
        let celldata = &sheets[0].celldata;

        assert_eq!(celldata.len(), 2);
        assert_eq!((celldata[0].r, celldata[0].c), (0, 0));
        assert_eq!(celldata[0].v.v, Some(RawValue::Text("a".to_string())));
        assert_eq!(celldata[0].v.t.as_deref(), Some("s"));
        assert_eq!((celldata[1].r, celldata[1].c), (2, 2));
        assert_eq!(celldata[1].v.t.as_deref(), Some("n"));
        assert!(sheets[0].data.is_none());
    }

    #[test]
    fn test_import_marks_first_sheet_active_and_orders_by_position() {
        let workbook = SparseWorkbook {
            sheets: vec![
                sheet("One", Some("A1:A1"), &[]),
                sheet("Two", Some("A1:A1"), &[]),
                sheet("Three", Some("A1:A1"), &[]),
            ],
        };

        let sheets = TableImporter::new().import(&workbook).unwrap();
        let summary: Vec<(u8, Option<u32>)> = sheets.iter().map(|s| (s.status, s.order)).collect();
        assert_eq!(summary, vec![(1, Some(0)), (0, Some(1)), (0, Some(2))]);
        assert_eq!(sheets[2].name.as_deref(), Some("Three"));
    }

    #[test]
    fn test_import_ignores_cells_outside_declared_range() {
        let workbook = SparseWorkbook {
            sheets: vec![sheet(
                "Data",
                Some("A1:B2"),
                &[(0, 0, RawCell::number(1.0)), (5, 5, RawCell::number(2.0))],
            )],
        };

        let sheets = TableImporter::new().import(&workbook).unwrap();
        assert_eq!(sheets[0].celldata.len(), 1);
    }

    #[test]
    fn test_import_missing_dimensions_defaults_to_origin() {
        let workbook = SparseWorkbook {
            sheets: vec![sheet(
                "Data",
                None,
                &[(0, 0, RawCell::boolean(true)), (0, 1, RawCell::number(2.0))],
            )],
        };

        let sheets = TableImporter::new().import(&workbook).unwrap();
        assert_eq!(sheets[0].celldata.len(), 1);
        assert_eq!(sheets[0].celldata[0].v.v, Some(RawValue::Bool(true)));
        assert_eq!(sheets[0].celldata[0].v.t.as_deref(), Some("b"));
    }

    #[test]
    fn test_import_malformed_range() {
        let workbook = SparseWorkbook {
            sheets: vec![sheet("Bad", Some("not-a-range"), &[])],
        };

        let result = TableImporter::new().import(&workbook);
        assert!(matches!(result, Err(BridgeError::MalformedRange(_))));
    }

    #[test]
    fn test_import_empty_workbook() {
        let sheets = TableImporter::new()
            .import(&SparseWorkbook::default())
            .unwrap();
        assert!(sheets.is_empty());
    }
}
