//! `.xlsx` bytes → sparse workbook (calamine)

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::io::Cursor;
use tracing::debug;

use crate::error::BridgeResult;
use crate::excel::address::encode_range;
use crate::excel::table::{CellData, RawCell, SparseSheet, SparseWorkbook, TypeTag};
use crate::types::{BoundingRange, CellAddress};

/// Parse an in-memory `.xlsx` buffer
pub fn read_workbook(bytes: &[u8]) -> BridgeResult<SparseWorkbook> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;

    let mut sparse = SparseWorkbook::default();
    for name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&name)?;
        sparse.sheets.push(process_sheet(&name, &range));
    }

    debug!(sheets = sparse.sheets.len(), bytes = bytes.len(), "parsed workbook");
    Ok(sparse)
}

/// Collect the present cells of a worksheet and its used range
fn process_sheet(name: &str, range: &Range<Data>) -> SparseSheet {
    let mut sheet = SparseSheet::new(name);

    let bounds = match (range.start(), range.end()) {
        (Some((r0, c0)), Some((r1, c1))) => BoundingRange {
            min_row: r0,
            min_col: c0,
            max_row: r1,
            max_col: c1,
        },
        _ => BoundingRange::default(),
    };
    sheet.dimensions = Some(encode_range(&bounds));

    for (row, col, data) in range.used_cells() {
        if let Some(cell) = convert_cell(data) {
            let addr = CellAddress::new(bounds.min_row + row as u32, bounds.min_col + col as u32);
            sheet.cells.insert(addr, cell);
        }
    }

    sheet
}

/// Map a calamine value to a raw cell. Date-times keep their serial number
/// and numeric tag.
fn convert_cell(data: &Data) -> Option<RawCell> {
    let cell = match data {
        Data::Empty => return None,
        Data::Int(i) => RawCell::number(*i as f64),
        Data::Float(f) => RawCell::number(*f),
        Data::String(s) => RawCell::text(s.clone()),
        Data::Bool(b) => RawCell::boolean(*b),
        Data::DateTime(dt) => RawCell::number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::text(s.clone()),
        Data::Error(e) => RawCell {
            value: CellData::Text(e.to_string()),
            tag: TypeTag::Error,
        },
    };
    Some(cell)
}
