//! Widget → .xlsx → widget round-trip tests
//!
//! These go through the real writer and reader, so they cover what actually
//! lands in the file rather than the in-memory tables.

use pretty_assertions::assert_eq;
use sheetbridge::excel::{
    build_file, read_workbook, write_table_file, TableExporter, TableImporter,
};
use sheetbridge::widget::WidgetDocument;
use sheetbridge::{CellAddress, CellValue, RawValue, Sheet, SheetCollection};
use std::collections::BTreeMap;

/// Export the collection, re-read the file and import it back
fn export_and_reload(collection: &SheetCollection) -> SheetCollection {
    let file = TableExporter::new().export_collection(collection).unwrap();
    let bytes = write_table_file(&file).unwrap();
    let sheets = TableImporter::new().import_bytes(&bytes).unwrap();
    WidgetDocument {
        sheets,
        ..Default::default()
    }
    .to_collection()
    .unwrap()
}

fn raw_values(sheet: &Sheet) -> BTreeMap<CellAddress, Option<RawValue>> {
    sheet
        .cells
        .iter()
        .map(|(addr, cell)| (*addr, cell.raw.clone()))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// VALUE PRESERVATION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_roundtrip_preserves_raw_values() {
    let mut sheet = Sheet::new("Budget");
    sheet.set_cell(0, 0, CellValue::text("Item"));
    sheet.set_cell(0, 1, CellValue::text("Amount"));
    sheet.set_cell(1, 0, CellValue::text("Rent"));
    sheet.set_cell(1, 1, CellValue::number(1200.0).with_display("1200"));
    sheet.set_cell(2, 0, CellValue::text("Food"));
    sheet.set_cell(2, 1, CellValue::number(310.5));

    let original = SheetCollection::new(vec![sheet]);
    let reloaded = export_and_reload(&original);

    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.sheets[0].name.as_deref(), Some("Budget"));
    assert_eq!(raw_values(&reloaded.sheets[0]), raw_values(&original.sheets[0]));
}

#[test]
fn test_roundtrip_keeps_absolute_positions() {
    let mut sheet = Sheet::new("Offset");
    sheet.set_cell(4, 3, CellValue::number(1.0));
    sheet.set_cell(6, 5, CellValue::text("corner"));

    let reloaded = export_and_reload(&SheetCollection::new(vec![sheet]));
    let cells = &reloaded.sheets[0].cells;

    assert_eq!(cells.len(), 2);
    assert_eq!(
        cells[&CellAddress::new(4, 3)].raw,
        Some(RawValue::Number(1.0))
    );
    assert_eq!(
        cells[&CellAddress::new(6, 5)].raw,
        Some(RawValue::Text("corner".to_string()))
    );
}

#[test]
fn test_roundtrip_date_keeps_serial() {
    let mut sheet = Sheet::new("Dates");
    sheet.set_cell(
        0,
        0,
        CellValue::from_format(
            Some("d"),
            Some(RawValue::Number(45306.0)),
            Some("2024-01-15".to_string()),
        ),
    );

    let reloaded = export_and_reload(&SheetCollection::new(vec![sheet]));
    let raw = reloaded.sheets[0].cells[&CellAddress::new(0, 0)].raw.clone();
    assert_eq!(raw, Some(RawValue::Number(45306.0)));
}

#[test]
fn test_roundtrip_percentage_reads_back_as_fraction() {
    let mut sheet = Sheet::new("Rates");
    sheet.set_cell(
        0,
        0,
        CellValue::from_format(Some("n"), Some(RawValue::Number(25.0)), Some("25%".into())),
    );

    let reloaded = export_and_reload(&SheetCollection::new(vec![sheet]));
    assert_eq!(
        reloaded.sheets[0].cells[&CellAddress::new(0, 0)].raw,
        Some(RawValue::Number(0.25))
    );
}

#[test]
fn test_roundtrip_merged_anchor_value_survives() {
    let mut sheet = Sheet::new("Merged");
    sheet.set_cell(0, 0, CellValue::text("Quarterly report"));
    sheet.set_cell(1, 0, CellValue::number(1.0));
    sheet.set_cell(1, 2, CellValue::number(3.0));
    sheet.add_merge(sheetbridge::MergeRegion::new(CellAddress::new(0, 0), 1, 3));

    let reloaded = export_and_reload(&SheetCollection::new(vec![sheet]));
    let cells = &reloaded.sheets[0].cells;

    assert_eq!(
        cells[&CellAddress::new(0, 0)].raw,
        Some(RawValue::Text("Quarterly report".to_string()))
    );
    assert!(!cells.contains_key(&CellAddress::new(0, 1)));
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEET STRUCTURE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_roundtrip_three_sheets_active_and_order() {
    let sheets = ["North", "South", "West"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut sheet = Sheet::new(*name);
            sheet.order = i as u32;
            sheet.set_cell(0, 0, CellValue::number(i as f64));
            sheet
        })
        .collect();

    let reloaded = export_and_reload(&SheetCollection::new(sheets));
    let summary: Vec<(Option<&str>, bool, u32)> = reloaded
        .sheets
        .iter()
        .map(|s| (s.name.as_deref(), s.active, s.order))
        .collect();

    assert_eq!(
        summary,
        vec![
            (Some("North"), true, 0),
            (Some("South"), false, 1),
            (Some("West"), false, 2),
        ]
    );
}

#[test]
fn test_selected_range_file_has_single_sheet() {
    let rows = vec![
        vec![sheetbridge::excel::TableValue::Text("a".into())],
        vec![
            sheetbridge::excel::TableValue::Number(2.0),
            sheetbridge::excel::TableValue::Bool(true),
        ],
    ];
    let file = TableExporter::new().export_range(Some(rows.as_slice())).unwrap();
    let workbook = read_workbook(&write_table_file(&file).unwrap()).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["SelectedRange"]);
    let sheet = &workbook.sheets[0];
    assert_eq!(sheet.dimensions.as_deref(), Some("A1:B2"));
    assert_eq!(sheet.cells.len(), 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// UPLOAD FILE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_upload_file_reimports_raw_values() {
    let mut sheet = Sheet::new("Saved");
    sheet.set_cell(0, 0, CellValue::text("label"));
    sheet.set_cell(2, 3, CellValue::number(42.0).with_display("42.00"));
    let collection = SheetCollection::new(vec![sheet, Sheet::new("Blank")]);

    let bytes = build_file(&collection).unwrap();
    let sheets = TableImporter::new().import_bytes(&bytes).unwrap();

    assert_eq!(sheets.len(), 2);
    let saved = sheets[0].to_sheet(0);
    assert_eq!(
        saved.cells[&CellAddress::new(2, 3)].raw,
        Some(RawValue::Number(42.0))
    );
    assert_eq!(
        saved.cells[&CellAddress::new(0, 0)].raw,
        Some(RawValue::Text("label".to_string()))
    );
    assert!(sheets[1].celldata.is_empty());
}
