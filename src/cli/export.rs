use std::path::{Path, PathBuf};

use crate::aggregate::{by_module, top_n, TOP_CATEGORIES};
use crate::cli::FilterArgs;
use crate::error::Result;
use crate::filter::{apply, FilterSpec};
use crate::models::ExpenseTable;
use crate::pdf::{render_report, REPORT_FILE_NAME, REPORT_MEDIA_TYPE};
use crate::settings::load_settings;

/// Where the report goes: an explicit file, a file inside an explicit directory,
/// or the configured export directory.
pub fn output_path(output: Option<String>, export_dir: &str) -> PathBuf {
    match output {
        Some(o) => {
            let p = PathBuf::from(o);
            if p.is_dir() {
                p.join(REPORT_FILE_NAME)
            } else {
                p
            }
        }
        None => PathBuf::from(export_dir).join(REPORT_FILE_NAME),
    }
}

/// Render the report for `spec` and write it to `path`.
pub fn write_report(table: &ExpenseTable, spec: &FilterSpec, path: &Path) -> Result<()> {
    let rows = apply(&table.records, spec);
    let top = top_n(&by_module(rows), TOP_CATEGORIES);
    let mut buffer = render_report(spec, &top)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::File::create(path)?;
    std::io::copy(&mut buffer, &mut file)?;
    log::info!("Wrote {} ({REPORT_MEDIA_TYPE})", path.display());
    Ok(())
}

pub fn run(table: &ExpenseTable, filters: &FilterArgs, output: Option<String>) -> Result<PathBuf> {
    let spec = filters.to_spec(table)?;
    let path = output_path(output, &load_settings().export_dir);
    write_report(table, &spec, &path)?;
    println!("Wrote {}", path.display());
    Ok(path)
}
