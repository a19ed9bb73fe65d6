//! Upload assembly: widget sheets → sparse workbook → `.xlsx` bytes
//!
//! Unlike the grid exporter this keeps cells sparse and writes raw values
//! as-is, without the date and percentage handling.

use tracing::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::excel::address::encode_range;
use crate::excel::table::{RawCell, SparseSheet, SparseWorkbook};
use crate::excel::writer::write_sparse_workbook;
use crate::types::{BoundingRange, RawValue, Sheet, SheetCollection};

/// Build the upload buffer for a whole collection
pub fn build_file(collection: &SheetCollection) -> BridgeResult<Vec<u8>> {
    if collection.is_empty() {
        return Err(BridgeError::NoData);
    }
    write_sparse_workbook(&build_workbook(collection))
}

/// Sparse workbook with one sheet per input sheet, in order
pub fn build_workbook(collection: &SheetCollection) -> SparseWorkbook {
    SparseWorkbook {
        sheets: collection
            .sheets
            .iter()
            .enumerate()
            .map(|(idx, sheet)| build_sheet(sheet, idx))
            .collect(),
    }
}

fn build_sheet(sheet: &Sheet, index: usize) -> SparseSheet {
    let name = sheet
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Sheet{}", index + 1));
    let mut sparse = SparseSheet::new(name);

    // The declared range always starts at A1 and grows with the cells
    let mut range = BoundingRange::default();
    for (addr, cell) in &sheet.cells {
        let raw = match &cell.raw {
            Some(RawValue::Number(n)) => RawCell::number(*n),
            Some(other) => RawCell::text(other.to_text()),
            None => RawCell::text(""),
        };
        sparse.cells.insert(*addr, raw);
        range.extend(*addr);
    }
    sparse.dimensions = Some(encode_range(&range));

    debug!(
        sheet = %sparse.name,
        cells = sparse.cells.len(),
        dimensions = sparse.dimensions.as_deref().unwrap_or_default(),
        "assembled sparse sheet"
    );
    sparse
}
