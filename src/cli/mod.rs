pub mod columns;
pub mod config;
pub mod dashboard;
#[cfg(feature = "pdf")]
pub mod export;
pub mod summary;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::error::{DashError, Result};
use crate::filter::FilterSpec;
use crate::loader::load_table;
use crate::models::ExpenseTable;
use crate::settings::{load_settings, shellexpand_path};

#[derive(Parser)]
#[command(
    name = "expdash",
    about = "Filterable dashboard and PDF report for spreadsheet expense sheets."
)]
pub struct Cli {
    /// Spreadsheet (.xlsx/.xls/.ods) or CSV file (default: from settings)
    #[arg(long, global = true)]
    pub file: Option<String>,
    /// Sheet name inside the workbook (default: from settings)
    #[arg(long, global = true)]
    pub sheet: Option<String>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (default).
    Dashboard,
    /// Print the filtered aggregations as text tables.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        /// Also print the filtered rows
        #[arg(long)]
        rows: bool,
    },
    /// Export the filtered top categories to expense_report.pdf.
    #[cfg(feature = "pdf")]
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file or directory (default: <export_dir>/expense_report.pdf)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the detected columns, row count and price range.
    Columns,
    /// Show or change saved settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print a shell completion script.
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings.
    Show,
    /// Set the default source file.
    SetFile { path: String },
    /// Set the default sheet name.
    SetSheet { name: String },
    /// Set the directory PDF reports are written to.
    SetExportDir { path: String },
}

/// Filter flags shared by `summary` and `export`. Omitted flags select everything.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Lowest price to include (default: observed minimum)
    #[arg(long)]
    pub min: Option<f64>,
    /// Highest price to include (default: observed maximum)
    #[arg(long)]
    pub max: Option<f64>,
    /// Date label to include; repeat for several (default: all)
    #[arg(long = "date")]
    pub dates: Vec<String>,
    /// Module label to include; repeat for several (default: all)
    #[arg(long = "module")]
    pub modules: Vec<String>,
}

impl FilterArgs {
    pub fn to_spec(&self, table: &ExpenseTable) -> Result<FilterSpec> {
        let (lo, hi) = table.price_bounds().unwrap_or((0.0, 0.0));
        let mut spec = FilterSpec::new(table, self.min.unwrap_or(lo), self.max.unwrap_or(hi))?;
        if !self.dates.is_empty() {
            spec.allowed_dates = selection(&self.dates, &table.distinct_dates(), "date");
        }
        if !self.modules.is_empty() {
            spec.allowed_modules = selection(&self.modules, &table.distinct_modules(), "module");
        }
        Ok(spec)
    }
}

fn selection(wanted: &[String], known: &[String], kind: &str) -> BTreeSet<String> {
    wanted
        .iter()
        .map(|w| w.trim().to_string())
        .inspect(|w| {
            if !known.contains(w) {
                log::warn!("{kind} '{w}' does not occur in the sheet");
            }
        })
        .collect()
}

/// Resolve the source file and sheet from flags, falling back to settings.
pub(crate) fn source(file: Option<String>, sheet: Option<String>) -> Result<(PathBuf, String)> {
    let settings = load_settings();
    let file = file.unwrap_or(settings.source_file);
    if file.trim().is_empty() {
        return Err(DashError::Other(
            "No source file. Pass --file <path> or run `expdash config set-file <path>`".into(),
        ));
    }
    let sheet = sheet.unwrap_or(settings.sheet_name);
    Ok((PathBuf::from(shellexpand_path(&file)), sheet))
}

fn load(path: &Path, sheet: &str) -> anyhow::Result<ExpenseTable> {
    let table = load_table(path, sheet)
        .with_context(|| format!("loading sheet '{sheet}' from {}", path.display()))?;
    if table.is_empty() {
        log::warn!("{} has a header row but no data rows", path.display());
    }
    Ok(table)
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        file,
        sheet,
        command,
    } = cli;
    match command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => {
            let (path, sheet) = source(file, sheet)?;
            let table = load(&path, &sheet)?;
            dashboard::run(table, &path)?;
        }
        Commands::Summary { filters, rows } => {
            let (path, sheet) = source(file, sheet)?;
            let table = load(&path, &sheet)?;
            println!("{}", summary::run(table, &filters, rows)?);
        }
        #[cfg(feature = "pdf")]
        Commands::Export { filters, output } => {
            let (path, sheet) = source(file, sheet)?;
            let table = load(&path, &sheet)?;
            export::run(&table, &filters, output)?;
        }
        Commands::Columns => {
            let (path, sheet) = source(file, sheet)?;
            let table = load(&path, &sheet)?;
            println!("{}", columns::describe(&path, &sheet, &table));
        }
        Commands::Config { command } => config::run(command)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "expdash", &mut std::io::stdout());
        }
    }
    Ok(())
}
