use crate::backend::{BackendConfig, HttpStore};
use crate::error::BridgeResult;
use crate::excel::{address, build_file, TableImporter};
use crate::json_export::{document_json, raw_data_json, timestamped_name, write_download};
use crate::session::{EmptyReason, LoadOutcome, Session, SessionParams};
use crate::widget::{MemoryWidget, SpreadsheetWidget, WidgetDocument};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Append `ext` when the path has no extension
fn with_default_extension(path: PathBuf, ext: &str) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(ext)
    }
}

/// File stem used as a document name
fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheetbridge".to_string())
}

fn open_session(
    input: &Path,
    backend: &BackendConfig,
    params: SessionParams,
) -> BridgeResult<Session<MemoryWidget, HttpStore>> {
    let widget = MemoryWidget::from_file(input)?;
    Ok(Session::new(widget, HttpStore::new(backend.clone()), params))
}

/// Execute the export command
pub fn export(
    input: PathBuf,
    output: PathBuf,
    sheet: Option<usize>,
    current: bool,
    timestamp: bool,
    verbose: bool,
) -> BridgeResult<()> {
    println!("{}", "📊 SheetBridge - Excel Export".bold().green());
    println!("   Input:  {}", input.display());

    let mut output = with_default_extension(output, "xlsx");
    if timestamp {
        let name = timestamped_name(&stem_of(&output), chrono::Local::now().naive_local());
        output.set_file_name(format!("{}.xlsx", name));
    }
    println!("   Output: {}\n", output.display());

    let session = open_session(&input, &BackendConfig::default(), SessionParams::default())?;
    if verbose {
        println!(
            "   Found {} sheets\n",
            session.widget().get_all_sheets().len()
        );
    }

    let bytes = match (sheet, current) {
        (Some(index), _) => {
            if verbose {
                println!("{}", format!("📄 Exporting sheet #{}...", index).cyan());
            }
            session.export_sheet_at(index)?
        }
        (None, true) => {
            if verbose {
                println!("{}", "📄 Exporting current sheet...".cyan());
            }
            session.export_current()?
        }
        (None, false) => {
            if verbose {
                println!("{}", "📄 Exporting all sheets...".cyan());
            }
            session.export_all()?
        }
    };

    write_download(&output, &bytes)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Excel file: {}\n", output.display());
    Ok(())
}

/// Execute the export-range command
pub fn export_range(
    input: PathBuf,
    output: PathBuf,
    range: String,
    verbose: bool,
) -> BridgeResult<()> {
    println!("{}", "📊 SheetBridge - Range Export".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Range:  {}", range.bright_yellow());

    let output = with_default_extension(output, "xlsx");
    println!("   Output: {}\n", output.display());

    let selection = address::decode_range(&range)?;
    let mut session = open_session(&input, &BackendConfig::default(), SessionParams::default())?;
    session.widget_mut().select(selection);

    if verbose {
        println!(
            "   {} rows × {} columns\n",
            selection.height(),
            selection.width()
        );
    }

    let bytes = session.export_selected_range()?;
    write_download(&output, &bytes)?;

    println!("{}", "✅ Range Export Complete!".bold().green());
    println!("   Excel file: {}\n", output.display());
    Ok(())
}

/// Execute the import command
pub fn import(input: PathBuf, output: PathBuf, verbose: bool) -> BridgeResult<()> {
    println!("{}", "📊 SheetBridge - Excel Import".bold().green());
    println!("   Input:  {}", input.display());

    let output = with_default_extension(output, "json");
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Reading Excel file...".cyan());
    }

    let bytes = fs::read(&input)?;
    let sheets = TableImporter::new().import_bytes(&bytes)?;

    if verbose {
        for sheet in &sheets {
            println!(
                "   📄 Sheet: {} ({} cells)",
                sheet.name.as_deref().unwrap_or("?").bright_blue(),
                sheet.celldata.len()
            );
        }
        println!();
    }

    let document = WidgetDocument {
        sheets,
        ..Default::default()
    };
    let json = document_json(&document, &stem_of(&input))?;
    write_download(&output, json.as_bytes())?;

    println!("{}", "✅ Import Complete!".bold().green());
    println!("   JSON file: {}\n", output.display());
    Ok(())
}

/// Execute the pack command
pub fn pack(input: PathBuf, output: PathBuf, verbose: bool) -> BridgeResult<()> {
    println!("{}", "📦 SheetBridge - Pack".bold().green());
    println!("   Input:  {}", input.display());

    let output = with_default_extension(output, "xlsx");
    println!("   Output: {}\n", output.display());

    let session = open_session(&input, &BackendConfig::default(), SessionParams::default())?;
    let collection = session.collection()?;
    if verbose {
        println!("   Packing {} sheets\n", collection.len());
    }

    let bytes = build_file(&collection)?;
    write_download(&output, &bytes)?;

    println!("{}", "✅ Pack Complete!".bold().green());
    println!("   Excel file: {} ({} bytes)\n", output.display(), bytes.len());
    Ok(())
}

/// Execute the load command
pub async fn load(query: String, output: PathBuf, backend: BackendConfig) -> BridgeResult<()> {
    println!("{}", "⬇️  SheetBridge - Load".bold().green());
    println!("   Backend: {}", backend.save_url());

    let output = with_default_extension(output, "json");
    println!("   Output:  {}\n", output.display());

    let params = SessionParams::from_query(&query);
    let mut session = Session::new(MemoryWidget::default(), HttpStore::new(backend), params);

    match session.load_existing().await {
        LoadOutcome::Loaded { sheets } => {
            println!("{} {} sheets", "✅ Loaded".bold().green(), sheets);
        }
        LoadOutcome::Empty(reason) => {
            let why = match reason {
                EmptyReason::MissingIdentifiers => "activityId and user are missing".to_string(),
                EmptyReason::NotFound => "no saved spreadsheet".to_string(),
                EmptyReason::Unreachable(msg) => format!("backend unreachable ({})", msg),
                EmptyReason::Failed(msg) => format!("load failed ({})", msg),
                EmptyReason::NoSheets => "saved file has no sheets".to_string(),
            };
            println!("{} {}", "⚠️  Starting empty:".bold().yellow(), why);
        }
    }

    let json = document_json(&session.widget().to_json(), &stem_of(&output))?;
    write_download(&output, json.as_bytes())?;
    println!("   JSON file: {}\n", output.display());
    Ok(())
}

/// Execute the save command
pub async fn save(query: String, input: PathBuf, backend: BackendConfig) -> BridgeResult<()> {
    println!("{}", "⬆️  SheetBridge - Save".bold().green());
    println!("   Input:   {}", input.display());
    println!("   Backend: {}\n", backend.save_url());

    let session = open_session(&input, &backend, SessionParams::from_query(&query))?;
    let reply = session.save().await?;

    println!("{}", "✅ Saved!".bold().green());
    if !reply.trim().is_empty() {
        println!("   Response: {}\n", reply.trim());
    }
    Ok(())
}

/// Execute the json command
pub fn json(input: PathBuf, output: PathBuf, raw: bool, verbose: bool) -> BridgeResult<()> {
    println!("{}", "📝 SheetBridge - JSON Export".bold().green());
    println!("   Input:  {}", input.display());

    let output = with_default_extension(output, "json");
    println!("   Output: {}\n", output.display());

    let widget = MemoryWidget::from_file(&input)?;
    let json = if raw {
        if verbose {
            println!("{}", "📄 Exporting raw sheet data...".cyan());
        }
        raw_data_json(&widget.get_all_sheets())?
    } else {
        if verbose {
            println!("{}", "📄 Exporting full document...".cyan());
        }
        document_json(&widget.to_json(), &stem_of(&output))?
    };
    write_download(&output, json.as_bytes())?;

    println!("{}", "✅ JSON Export Complete!".bold().green());
    println!("   JSON file: {}\n", output.display());
    Ok(())
}
