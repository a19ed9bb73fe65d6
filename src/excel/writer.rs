//! Tables → `.xlsx` bytes (rust_xlsxwriter)

use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::excel::address::decode_range;
use crate::excel::table::{CellData, SparseWorkbook, TableFile, TableSheet, TableValue};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Serialize dense tables with merges and column widths
pub fn write_table_file(file: &TableFile) -> BridgeResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    for sheet in &file.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name).map_err(|e| {
            BridgeError::Serialization(format!("Failed to set worksheet name {:?}: {}", sheet.name, e))
        })?;
        write_table_sheet(worksheet, sheet)?;
    }

    save(&mut workbook)
}

/// Serialize sparse sheets cell by cell
pub fn write_sparse_workbook(sparse: &SparseWorkbook) -> BridgeResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    for sheet in &sparse.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name).map_err(|e| {
            BridgeError::Serialization(format!("Failed to set worksheet name {:?}: {}", sheet.name, e))
        })?;

        if let Some(declared) = sheet.dimensions.as_deref() {
            let range = decode_range(declared)?;
            if let Some(outside) = sheet.cells.keys().find(|addr| !range.contains(**addr)) {
                return Err(BridgeError::Serialization(format!(
                    "Cell {} lies outside declared range {} of sheet {:?}",
                    outside, declared, sheet.name
                )));
            }
        }

        // Empty strings have no cell representation in the file
        for (addr, cell) in &sheet.cells {
            if matches!(&cell.value, CellData::Text(s) if s.is_empty()) {
                continue;
            }
            let col = column(addr.col)?;
            match &cell.value {
                CellData::Number(n) => worksheet.write_number(addr.row, col, *n),
                CellData::Bool(b) => worksheet.write_boolean(addr.row, col, *b),
                CellData::Text(s) => worksheet.write_string(addr.row, col, s),
            }
            .map_err(|e| {
                BridgeError::Serialization(format!("Failed to write cell {}: {}", addr, e))
            })?;
        }
    }

    save(&mut workbook)
}

fn save(workbook: &mut Workbook) -> BridgeResult<Vec<u8>> {
    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| BridgeError::Serialization(format!("Failed to build Excel buffer: {}", e)))?;
    debug!(bytes = buffer.len(), "serialized workbook");
    Ok(buffer)
}

/// Merges go first so the anchor values written afterwards replace the
/// blank placeholder `merge_range` leaves in the first cell.
fn write_table_sheet(worksheet: &mut Worksheet, sheet: &TableSheet) -> BridgeResult<()> {
    let merge_format = Format::new();
    for merge in sheet.merges.iter().filter(|m| !m.is_single_cell()) {
        worksheet
            .merge_range(
                merge.first_row,
                column(merge.first_col)?,
                merge.last_row,
                column(merge.last_col)?,
                "",
                &merge_format,
            )
            .map_err(|e| BridgeError::Serialization(format!("Failed to merge cells: {}", e)))?;
    }

    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let date_time_format = Format::new().set_num_format(DATE_TIME_FORMAT);

    for (r, values) in sheet.rows.iter().enumerate() {
        let row = sheet.origin.row + r as u32;
        for (c, value) in values.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col = column(sheet.origin.col + c as u32)?;
            match value {
                TableValue::Empty => {}
                TableValue::Number(n) => {
                    worksheet.write_number(row, col, *n).map_err(|e| {
                        BridgeError::Serialization(format!("Failed to write number: {}", e))
                    })?;
                }
                TableValue::Text(s) => {
                    worksheet.write_string(row, col, s).map_err(|e| {
                        BridgeError::Serialization(format!("Failed to write text: {}", e))
                    })?;
                }
                TableValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b).map_err(|e| {
                        BridgeError::Serialization(format!("Failed to write boolean: {}", e))
                    })?;
                }
                TableValue::Date(dt) => {
                    let format = if has_time(dt) {
                        &date_time_format
                    } else {
                        &date_format
                    };
                    worksheet
                        .write_datetime_with_format(row, col, &excel_datetime(dt)?, format)
                        .map_err(|e| {
                            BridgeError::Serialization(format!("Failed to write date: {}", e))
                        })?;
                }
            }
        }
    }

    for width in &sheet.column_widths {
        worksheet
            .set_column_width(column(width.col)?, width.chars)
            .map_err(|e| {
                BridgeError::Serialization(format!("Failed to set column width: {}", e))
            })?;
    }

    Ok(())
}

fn has_time(dt: &NaiveDateTime) -> bool {
    dt.hour() != 0 || dt.minute() != 0 || dt.second() != 0
}

fn excel_datetime(dt: &NaiveDateTime) -> BridgeResult<ExcelDateTime> {
    let year = u16::try_from(dt.year())
        .map_err(|_| BridgeError::Serialization(format!("Date out of range: {}", dt)))?;
    ExcelDateTime::from_ymd(year, dt.month() as u8, dt.day() as u8)
        .and_then(|d| d.and_hms(dt.hour() as u16, dt.minute() as u8, dt.second()))
        .map_err(|e| BridgeError::Serialization(format!("Invalid date {}: {}", dt, e)))
}

/// Worksheet column index (Excel columns fit in u16)
fn column(col: u32) -> BridgeResult<u16> {
    u16::try_from(col)
        .map_err(|_| BridgeError::Serialization(format!("Column {} out of range", col)))
}
