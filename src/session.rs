//! Load and save flows tying the widget, the converters and the backend together

use tracing::{info, warn};

use crate::backend::{ActivityKey, FetchOutcome, SpreadsheetStore};
use crate::error::{BridgeError, BridgeResult};
use crate::excel::{
    build_file, display_value, write_table_file, TableExporter, TableImporter, TableValue,
};
use crate::types::{Sheet, SheetCollection};
use crate::widget::{SpreadsheetWidget, WidgetOptions};

/// Identifiers taken from the hosting page's query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionParams {
    pub activity_id: Option<String>,
    pub user_id: Option<String>,
}

impl SessionParams {
    pub fn new(activity_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            activity_id: Some(activity_id.into()),
            user_id: Some(user_id.into()),
        }
    }

    /// Read `activityId` and `user` from a query string (leading `?` optional)
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut params = Self::default();

        let Ok(url) = reqwest::Url::parse(&format!("http://localhost/?{}", query)) else {
            return params;
        };
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "activityId" => params.activity_id = Some(value.into_owned()),
                "user" => params.user_id = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Both identifiers, when present and non-empty
    pub fn key(&self) -> Option<ActivityKey> {
        match (self.activity_id.as_deref(), self.user_id.as_deref()) {
            (Some(a), Some(u)) if !a.is_empty() && !u.is_empty() => Some(ActivityKey::new(a, u)),
            _ => None,
        }
    }
}

/// What `load_existing` ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A saved file was imported into the widget
    Loaded { sheets: usize },
    /// The widget starts empty
    Empty(EmptyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    MissingIdentifiers,
    NotFound,
    Unreachable(String),
    Failed(String),
    NoSheets,
}

/// One user's spreadsheet session against a widget and a backend store
pub struct Session<W, S> {
    widget: W,
    store: S,
    params: SessionParams,
    exporter: TableExporter,
    importer: TableImporter,
}

impl<W: SpreadsheetWidget, S: SpreadsheetStore> Session<W, S> {
    pub fn new(widget: W, store: S, params: SessionParams) -> Self {
        Self {
            widget,
            store,
            params,
            exporter: TableExporter::new(),
            importer: TableImporter::new(),
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn into_widget(self) -> W {
        self.widget
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// Fetch the saved file and load it into the widget.
    ///
    /// Never fails: anything short of a usable file leaves the widget
    /// initialized without data, and the reason is returned.
    pub async fn load_existing(&mut self) -> LoadOutcome {
        let Some(key) = self.params.key() else {
            info!("no activity/user identifiers, starting empty");
            return self.start_empty(EmptyReason::MissingIdentifiers);
        };

        let bytes = match self.store.fetch(&key).await {
            Ok(FetchOutcome::Found(bytes)) => bytes,
            Ok(FetchOutcome::NotFound) => {
                info!(activity = %key.activity_id, user = %key.user_id, "no saved spreadsheet");
                return self.start_empty(EmptyReason::NotFound);
            }
            Ok(FetchOutcome::Unreachable(reason)) => {
                warn!(%reason, "backend unreachable, starting empty");
                return self.start_empty(EmptyReason::Unreachable(reason));
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch saved spreadsheet");
                return self.start_empty(EmptyReason::Failed(e.to_string()));
            }
        };

        let sheets = match self.importer.import_bytes(&bytes) {
            Ok(sheets) => sheets,
            Err(e) => {
                warn!(error = %e, "saved spreadsheet could not be read");
                return self.start_empty(EmptyReason::Failed(e.to_string()));
            }
        };
        if sheets.is_empty() {
            warn!("saved spreadsheet has no sheets");
            return self.start_empty(EmptyReason::NoSheets);
        }

        let count = sheets.len();
        self.widget.destroy();
        self.widget.create(WidgetOptions::with_data(sheets));
        info!(sheets = count, activity = %key.activity_id, "loaded saved spreadsheet");
        LoadOutcome::Loaded { sheets: count }
    }

    fn start_empty(&mut self, reason: EmptyReason) -> LoadOutcome {
        self.widget.create(WidgetOptions::default());
        LoadOutcome::Empty(reason)
    }

    /// Assemble the widget's sheets and upload them, returning the backend's reply
    pub async fn save(&self) -> BridgeResult<String> {
        let collection = self.collection()?;
        let bytes = build_file(&collection)?;
        let key = self.params.key().ok_or(BridgeError::MissingIdentifiers)?;

        let reply = self.store.upload(&key, bytes).await?;
        info!(
            sheets = collection.len(),
            activity = %key.activity_id,
            user = %key.user_id,
            "saved spreadsheet"
        );
        Ok(reply)
    }

    /// All sheets as an `.xlsx` buffer
    pub fn export_all(&self) -> BridgeResult<Vec<u8>> {
        let file = self.exporter.export_collection(&self.collection()?)?;
        write_table_file(&file)
    }

    /// The current sheet as an `.xlsx` buffer
    pub fn export_current(&self) -> BridgeResult<Vec<u8>> {
        let sheet = self.current_sheet().ok_or(BridgeError::NoData)?;
        write_table_file(&self.exporter.export_sheet(&sheet)?)
    }

    /// The selected range as a single-sheet `.xlsx` buffer.
    ///
    /// Cells are written as displayed (`50%` stays text), not through the
    /// date and percentage rules of the sheet exports.
    pub fn export_selected_range(&self) -> BridgeResult<Vec<u8>> {
        if self.widget.get_range().is_none() {
            return Err(BridgeError::NoSelection);
        }
        let values = match self.widget.get_range_value() {
            Some(values) if !values.is_empty() => values,
            _ => return Err(BridgeError::NoData),
        };

        let rows: Vec<Vec<TableValue>> = values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(display_value).unwrap_or(TableValue::Empty))
                    .collect()
            })
            .collect();

        write_table_file(&self.exporter.export_range(Some(rows.as_slice()))?)
    }

    /// One sheet, by zero-based position, as an `.xlsx` buffer
    pub fn export_sheet_at(&self, index: usize) -> BridgeResult<Vec<u8>> {
        let file = self.exporter.export_sheet_at(&self.collection()?, index)?;
        write_table_file(&file)
    }

    /// Validated model of every sheet the widget holds
    pub fn collection(&self) -> BridgeResult<SheetCollection> {
        let collection = SheetCollection::new(
            self.widget
                .get_all_sheets()
                .iter()
                .enumerate()
                .map(|(idx, s)| s.to_sheet(idx))
                .collect(),
        );
        collection.validate()?;
        Ok(collection)
    }

    fn current_sheet(&self) -> Option<Sheet> {
        self.widget.get_sheet_data().map(|s| s.to_sheet(0))
    }
}
