use clap::{Parser, Subcommand};
use sheetbridge::backend::BackendConfig;
use sheetbridge::backend::config::DEFAULT_BASE_URL;
use sheetbridge::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(about = "Spreadsheet widget ↔ Excel (.xlsx) conversion and backend sync")]
#[command(long_about = "SheetBridge - Spreadsheet widget ↔ Excel conversion

Converts the widget's JSON document to Excel workbooks and back, and syncs
the saved workbook of an activity with the backend.

COMMANDS:
  export       - Widget document to Excel (all sheets, one sheet, or current)
  export-range - Selected range to a single-sheet workbook
  import       - Excel to widget load data (JSON)
  pack         - Widget document to the upload workbook
  load         - Fetch the saved workbook from the backend
  save         - Upload the widget document to the backend
  json         - Full document or raw sheet data as JSON

EXAMPLES:
  sheetbridge export budget.json budget.xlsx
  sheetbridge export budget.json q1.xlsx --sheet 0
  sheetbridge export-range budget.json pick.xlsx --range B2:D10
  sheetbridge import budget.xlsx budget.json
  sheetbridge load --query 'activityId=42&user=alice' budget.json
  sheetbridge save --query 'activityId=42&user=alice' budget.json")]
#[command(version)]
struct Cli {
    /// Backend origin
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL, env = "SHEETBRIDGE_BACKEND")]
    backend: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export a widget document to Excel .xlsx format.

Each sheet becomes a worksheet spanning the bounding range of its populated
cells. Merged regions and column widths are carried over.

VALUE HANDLING:
  Date cells      → Excel dates (yyyy-mm-dd)
  Percentages     → fractions (50% → 0.5)
  Everything else → the displayed text, else the raw value

EXAMPLES:
  sheetbridge export budget.json budget.xlsx
  sheetbridge export budget.json q1.xlsx --sheet 0
  sheetbridge export budget.json now.xlsx --current --timestamp")]
    /// Export widget document to Excel .xlsx
    Export {
        /// Widget document (JSON)
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        /// Export only the sheet at this 0-based position
        #[arg(short, long, conflicts_with = "current")]
        sheet: Option<usize>,

        /// Export only the active sheet
        #[arg(short, long)]
        current: bool,

        /// Append a _YYYYMMDDTHHMMSS timestamp to the file name
        #[arg(short, long)]
        timestamp: bool,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Export a selected range of the active sheet
    ExportRange {
        /// Widget document (JSON)
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        /// Range to export, e.g. A1:C3
        #[arg(short, long)]
        range: String,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Import an Excel .xlsx file as widget load data.

Every worksheet becomes a sheet with sparse cell data ({r, c, v: {v, t}}).
The first worksheet is active; order follows the workbook.

EXAMPLE:
  sheetbridge import budget.xlsx budget.json")]
    /// Import Excel .xlsx file to widget JSON
    Import {
        /// Path to Excel file (.xlsx)
        input: PathBuf,

        /// Output JSON file path
        output: PathBuf,

        /// Show verbose import steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Build the workbook that `save` would upload
    Pack {
        /// Widget document (JSON)
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Fetch the saved workbook of an activity from the backend.

Identifiers are read from a page query string (activityId and user).
When nothing is saved, or the backend is unreachable, an empty document
is written.

EXAMPLE:
  sheetbridge load --query 'activityId=42&user=alice' budget.json")]
    /// Load the saved workbook from the backend
    Load {
        /// Page query string carrying activityId and user
        #[arg(short, long)]
        query: String,

        /// Output JSON file path
        output: PathBuf,
    },

    /// Upload a widget document to the backend
    Save {
        /// Page query string carrying activityId and user
        #[arg(short, long)]
        query: String,

        /// Widget document (JSON)
        input: PathBuf,
    },

    /// Export the full document or raw sheet data as JSON
    Json {
        /// Widget document (JSON)
        input: PathBuf,

        /// Output JSON file path
        output: PathBuf,

        /// Only name, cells, config and index of each sheet
        #[arg(long)]
        raw: bool,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbridge=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let backend = BackendConfig::with_base_url(cli.backend);

    match cli.command {
        Commands::Export {
            input,
            output,
            sheet,
            current,
            timestamp,
            verbose,
        } => cli::export(input, output, sheet, current, timestamp, verbose)?,

        Commands::ExportRange {
            input,
            output,
            range,
            verbose,
        } => cli::export_range(input, output, range, verbose)?,

        Commands::Import {
            input,
            output,
            verbose,
        } => cli::import(input, output, verbose)?,

        Commands::Pack {
            input,
            output,
            verbose,
        } => cli::pack(input, output, verbose)?,

        Commands::Load { query, output } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::load(query, output, backend))?
        }

        Commands::Save { query, input } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::save(query, input, backend))?
        }

        Commands::Json {
            input,
            output,
            raw,
            verbose,
        } => cli::json(input, output, raw, verbose)?,
    }

    Ok(())
}
