//! The widget's JSON document format
//!
//! Cells are `{r, c, v: {v, m, ct: {fa, t}}}`, merges live under
//! `config.merge["r_c"]` and column widths under `config.columnlen["col"]`.
//! The same sheet shape is the widget's load contract, where cells carry a
//! bare type tag instead: `{r, c, v: {v, t}}`.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::BridgeResult;
use crate::types::{CellAddress, CellValue, MergeRegion, RawValue, Sheet, SheetCollection};

/// Whole widget document as returned by `toJson`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetDocument {
    #[serde(default)]
    pub info: DocumentInfo,
    #[serde(default)]
    pub sheets: Vec<WidgetSheet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            creator: "Luckysheet".to_string(),
        }
    }
}

/// Sheet identifier; the widget uses numbers or opaque strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetIndex {
    Number(u32),
    Text(String),
}

/// One sheet in widget JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetSheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<SheetIndex>,
    /// 1 for the active sheet
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: u8,
    #[serde(
        default,
        deserialize_with = "lenient_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<u32>,
    #[serde(default)]
    pub celldata: Vec<WidgetCell>,
    /// Dense rows, as `getAllSheets` reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<Option<CellPayload>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SheetConfig>,
}

/// Integer fields some widget versions write as strings (`"status": "1"`)
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Number(u64),
    Text(String),
}

impl LenientInt {
    fn parse<T: TryFrom<u64>, E: de::Error>(self) -> Result<T, E> {
        let n = match self {
            LenientInt::Number(n) => n,
            LenientInt::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| E::custom(format!("expected an integer, got {:?}", s)))?,
        };
        T::try_from(n).map_err(|_| E::custom(format!("integer {} out of range", n)))
    }
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    LenientInt::deserialize(deserializer)?.parse()
}

fn lenient_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Option::<LenientInt>::deserialize(deserializer)?
        .map(|v| v.parse())
        .transpose()
}

/// Sparse cell entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetCell {
    pub r: u32,
    pub c: u32,
    pub v: CellPayload,
}

/// Cell body: raw value, display string, format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct: Option<CellFormat>,
    /// Bare type tag used by load data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub merge: BTreeMap<String, MergeEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columnlen: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeEntry {
    pub r: u32,
    pub c: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cs: Option<u32>,
}

impl CellPayload {
    /// Typed value; the format tag (`ct.t`, else `t`) decides the kind
    pub fn to_cell_value(&self) -> CellValue {
        let tag = self
            .ct
            .as_ref()
            .and_then(|ct| ct.t.as_deref())
            .or(self.t.as_deref());
        CellValue::from_format(tag, self.v.clone(), self.m.clone())
    }

    pub fn from_cell_value(value: &CellValue) -> Self {
        use crate::types::CellKind;

        let t = match value.kind {
            CellKind::Date => "d",
            CellKind::Number | CellKind::Percentage => "n",
            CellKind::String => "s",
        };
        Self {
            v: value.raw.clone(),
            m: value.display.clone(),
            ct: Some(CellFormat {
                fa: Some("General".to_string()),
                t: Some(t.to_string()),
            }),
            t: None,
        }
    }
}

impl WidgetSheet {
    /// Convert into the in-memory model. `position` backs a missing `order`.
    pub fn to_sheet(&self, position: usize) -> Sheet {
        let mut sheet = Sheet {
            name: self.name.clone(),
            order: self.order.unwrap_or(position as u32),
            active: self.status == 1,
            ..Default::default()
        };

        if let Some(rows) = &self.data {
            for (r, row) in rows.iter().enumerate() {
                for (c, payload) in row.iter().enumerate() {
                    if let Some(payload) = payload {
                        sheet.set_cell(r as u32, c as u32, payload.to_cell_value());
                    }
                }
            }
        }
        for cell in &self.celldata {
            sheet.set_cell(cell.r, cell.c, cell.v.to_cell_value());
        }

        if let Some(config) = &self.config {
            for entry in config.merge.values() {
                sheet.add_merge(MergeRegion::new(
                    CellAddress::new(entry.r, entry.c),
                    entry.rs.unwrap_or(1),
                    entry.cs.unwrap_or(1),
                ));
            }
            for (col, px) in &config.columnlen {
                if let Ok(col) = col.parse::<u32>() {
                    sheet.set_column_width(col, *px);
                }
            }
        }

        sheet
    }

    /// Convert from the in-memory model (sparse cells only)
    pub fn from_sheet(sheet: &Sheet, index: usize) -> Self {
        let celldata = sheet
            .cells
            .iter()
            .map(|(addr, value)| WidgetCell {
                r: addr.row,
                c: addr.col,
                v: CellPayload::from_cell_value(value),
            })
            .collect();

        let config = SheetConfig {
            merge: sheet
                .merges
                .iter()
                .map(|m| {
                    (
                        format!("{}_{}", m.anchor.row, m.anchor.col),
                        MergeEntry {
                            r: m.anchor.row,
                            c: m.anchor.col,
                            rs: Some(m.row_span),
                            cs: Some(m.col_span),
                        },
                    )
                })
                .collect(),
            columnlen: sheet
                .column_widths
                .iter()
                .map(|(col, px)| (col.to_string(), *px))
                .collect(),
        };

        Self {
            name: sheet.name.clone(),
            index: Some(SheetIndex::Number(index as u32)),
            status: u8::from(sheet.active),
            order: Some(sheet.order),
            celldata,
            data: None,
            config: Some(config),
        }
    }
}

impl WidgetDocument {
    pub fn from_json(json: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Accept either a full document or a bare array of sheets
    pub fn from_json_lenient(json: &str) -> BridgeResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            let sheets: Vec<WidgetSheet> = serde_json::from_value(value)?;
            return Ok(Self {
                sheets,
                ..Default::default()
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validated in-memory collection
    pub fn to_collection(&self) -> BridgeResult<SheetCollection> {
        let collection = SheetCollection::new(
            self.sheets
                .iter()
                .enumerate()
                .map(|(idx, s)| s.to_sheet(idx))
                .collect(),
        );
        collection.validate()?;
        Ok(collection)
    }

    pub fn from_collection(name: impl Into<String>, collection: &SheetCollection) -> Self {
        Self {
            info: DocumentInfo {
                name: name.into(),
                ..Default::default()
            },
            sheets: collection
                .sheets
                .iter()
                .enumerate()
                .map(|(idx, s)| WidgetSheet::from_sheet(s, idx))
                .collect(),
        }
    }
}
