//! JSON downloads of the widget state and file naming helpers

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::widget::{CellPayload, SheetConfig, SheetIndex, WidgetCell, WidgetDocument, WidgetSheet};

/// Per-sheet entry of the raw data export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSheetData<'a> {
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a Vec<Vec<Option<CellPayload>>>>,
    #[serde(skip_serializing_if = "no_cells")]
    pub celldata: &'a [WidgetCell],
    pub config: Option<&'a SheetConfig>,
    pub index: Option<&'a SheetIndex>,
}

fn no_cells(cells: &&[WidgetCell]) -> bool {
    cells.is_empty()
}

/// Full document as pretty JSON. A document without a name takes `fallback_name`.
pub fn document_json(document: &WidgetDocument, fallback_name: &str) -> BridgeResult<String> {
    let mut document = document.clone();
    if document.info.name.is_empty() {
        document.info.name = fallback_name.to_string();
    }
    document.to_json_pretty()
}

/// Name, cells, config and index of every sheet as pretty JSON
pub fn raw_data_json(sheets: &[WidgetSheet]) -> BridgeResult<String> {
    if sheets.is_empty() {
        return Err(BridgeError::NoData);
    }

    let entries: Vec<RawSheetData<'_>> = sheets
        .iter()
        .map(|sheet| RawSheetData {
            name: sheet.name.as_deref(),
            data: sheet.data.as_ref(),
            celldata: &sheet.celldata,
            config: sheet.config.as_ref(),
            index: sheet.index.as_ref(),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&entries)?)
}

/// `{stem}_{YYYYMMDDTHHMMSS}`
pub fn timestamped_name(stem: &str, now: NaiveDateTime) -> String {
    format!("{}_{}", stem, now.format("%Y%m%dT%H%M%S"))
}

/// Write a finished buffer to disk
pub fn write_download(path: &Path, bytes: &[u8]) -> BridgeResult<()> {
    fs::write(path, bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote download");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_timestamped_name() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap();
        assert_eq!(
            timestamped_name("luckysheet_export", now),
            "luckysheet_export_20240305T140709"
        );
    }

    #[test]
    fn test_document_json_fills_missing_name() {
        let json = document_json(&WidgetDocument::default(), "backup").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["info"]["name"], "backup");
        assert_eq!(value["info"]["creator"], "Luckysheet");
        assert!(value["sheets"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_document_json_keeps_existing_name() {
        let mut document = WidgetDocument::default();
        document.info.name = "budget".to_string();
        let json = document_json(&document, "backup").unwrap();
        assert!(json.contains("\"budget\""));
    }

    #[test]
    fn test_raw_data_json_fields() {
        let sheet = WidgetSheet {
            name: Some("Data".to_string()),
            index: Some(SheetIndex::Number(0)),
            ..Default::default()
        };
        let json = raw_data_json(&[sheet]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["name"], "Data");
        assert_eq!(value[0]["index"], 0);
        assert!(value[0]["config"].is_null());
        assert!(value[0].get("celldata").is_none());
    }

    #[test]
    fn test_raw_data_json_empty() {
        assert!(matches!(raw_data_json(&[]), Err(BridgeError::NoData)));
    }

    #[test]
    fn test_write_download() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        write_download(&path, b"PK\x03\x04").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04");
    }
}
