use std::path::Path;

use crate::error::LoadError;
use crate::models::{ExpenseRecord, ExpenseTable, ParseWarning};

// ---------------------------------------------------------------------------
// Raw sheet representation
// ---------------------------------------------------------------------------

/// A cell as read from the source file, before columns are typed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    /// Excel serial date.
    Date(f64),
}

static EMPTY: RawCell = RawCell::Empty;

struct RawSheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

/// Positions of the typed columns within a sheet row.
struct Columns {
    date: usize,
    module: usize,
    priority: usize,
    price: usize,
    extra: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn excel_serial_to_date(serial: f64) -> Option<String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(chrono::Duration::days(serial.floor() as i64))?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Render a numeric cell used as a label: `3.0` becomes `"3"`.
pub fn number_label(val: f64) -> String {
    if val.fract() == 0.0 && val.abs() < 1e15 {
        format!("{}", val as i64)
    } else {
        val.to_string()
    }
}

/// Numeric coercion of a price cell. Anything that is not a finite number is missing.
pub fn parse_price(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(v) => Some(*v).filter(|v| v.is_finite()),
        RawCell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        RawCell::Empty | RawCell::Date(_) => None,
    }
}

fn label(cell: &RawCell, trim: bool) -> Option<String> {
    let s = match cell {
        RawCell::Empty => return None,
        RawCell::Text(s) if trim => s.trim().to_string(),
        RawCell::Text(s) => s.clone(),
        RawCell::Number(v) => number_label(*v),
        RawCell::Date(v) => excel_serial_to_date(*v).unwrap_or_else(|| number_label(*v)),
    };
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn display(cell: &RawCell) -> String {
    label(cell, false).unwrap_or_default()
}

/// Find the requested sheet: exact name first, then ignoring surrounding whitespace.
pub fn resolve_sheet<'a>(names: &'a [String], wanted: &str) -> Option<&'a String> {
    names
        .iter()
        .find(|n| n.as_str() == wanted)
        .or_else(|| names.iter().find(|n| n.trim() == wanted.trim()))
}

fn locate_columns(headers: &[String]) -> Result<Columns, LoadError> {
    let find = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(LoadError::MissingColumn(name))
    };
    let date = find("Date")?;
    let module = find("Module")?;
    let priority = find("Priority")?;
    let price = find("Price")?;
    let extra = (0..headers.len())
        .filter(|i| ![date, module, priority, price].contains(i))
        .collect();
    Ok(Columns {
        date,
        module,
        priority,
        price,
        extra,
    })
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

fn read_csv(file_path: &Path) -> Result<RawSheet, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(file_path)?;

    let mut records = reader.records();
    let name = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let headers = match records.next() {
        Some(header) => header?.iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(LoadError::EmptySheet(name)),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawSheet {
        name,
        headers,
        rows,
    })
}

#[cfg(feature = "xlsx")]
fn convert_cell(cell: &calamine::Data) -> RawCell {
    use calamine::Data;
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Error(e) => RawCell::Text(e.to_string()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => RawCell::Date(dt.as_f64()),
    }
}

#[cfg(feature = "xlsx")]
fn read_workbook(file_path: &Path, sheet: &str) -> Result<RawSheet, LoadError> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let names = workbook.sheet_names();
    let Some(name) = resolve_sheet(&names, sheet).cloned() else {
        return Err(LoadError::SheetNotFound {
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    };
    let range = workbook.worksheet_range(&name)?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| display(&convert_cell(c)).trim().to_string())
            .collect(),
        None => return Err(LoadError::EmptySheet(name)),
    };
    let rows = rows.map(|r| r.iter().map(convert_cell).collect()).collect();
    Ok(RawSheet {
        name,
        headers,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalize(sheet: RawSheet) -> Result<ExpenseTable, LoadError> {
    let columns = locate_columns(&sheet.headers)?;
    let extra_headers = columns
        .extra
        .iter()
        .map(|&i| {
            let h = &sheet.headers[i];
            if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.clone()
            }
        })
        .collect();

    let mut records = Vec::with_capacity(sheet.rows.len());
    let mut warnings = Vec::new();
    for (i, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|c| *c == RawCell::Empty) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY);

        let raw_price = cell(columns.price);
        let price = parse_price(raw_price);
        if price.is_none() && *raw_price != RawCell::Empty {
            let warning = ParseWarning {
                row: i + 1,
                raw: display(raw_price),
            };
            log::debug!("row {}: price {:?} is not numeric", warning.row, warning.raw);
            warnings.push(warning);
        }

        records.push(ExpenseRecord {
            date: label(cell(columns.date), true),
            module: label(cell(columns.module), true),
            priority: label(cell(columns.priority), false),
            price,
            extra: columns.extra.iter().map(|&idx| display(cell(idx))).collect(),
        });
    }

    if !warnings.is_empty() {
        log::warn!(
            "{} price value(s) in '{}' could not be parsed and are excluded from totals",
            warnings.len(),
            sheet.name
        );
    }
    log::info!("Loaded {} rows from '{}'", records.len(), sheet.name);

    Ok(ExpenseTable {
        extra_headers,
        records,
        warnings,
    })
}

/// Load and normalize the expense sheet. The sheet name is ignored for CSV sources.
pub fn load_table(file_path: &Path, sheet: &str) -> Result<ExpenseTable, LoadError> {
    if !file_path.is_file() {
        return Err(LoadError::FileNotFound(file_path.display().to_string()));
    }
    let ext = file_path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let raw = match ext.as_str() {
        "csv" => read_csv(file_path)?,
        #[cfg(feature = "xlsx")]
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(file_path, sheet)?,
        _ => return Err(LoadError::UnsupportedFormat(ext)),
    };
    #[cfg(not(feature = "xlsx"))]
    let _ = sheet;
    normalize(raw)
}
