use std::path::Path;

use crate::fmt::{amount, number};
use crate::models::ExpenseTable;

pub fn describe(path: &Path, sheet: &str, table: &ExpenseTable) -> String {
    let mut columns = vec!["Date", "Module", "Priority", "Price"];
    columns.extend(table.extra_headers.iter().map(String::as_str));
    let range = match table.price_bounds() {
        Some((lo, hi)) => format!("{} to {}", amount(lo), amount(hi)),
        None => "(no numeric prices)".to_string(),
    };

    let mut lines = vec![
        format!("Source:       {}", path.display()),
        format!("Sheet:        {sheet}"),
        format!("Columns:      {}", columns.join(", ")),
        format!("Rows:         {}", number(table.len() as i64)),
        format!("Price range:  {range}"),
        format!("Months:       {}", table.distinct_dates().len()),
        format!("Modules:      {}", table.distinct_modules().len()),
        format!("Bad prices:   {}", number(table.warnings.len() as i64)),
    ];
    for w in table.warnings.iter().take(10) {
        lines.push(format!("  row {}: {:?}", w.row, w.raw));
    }
    if table.warnings.len() > 10 {
        lines.push(format!("  ... and {} more", table.warnings.len() - 10));
    }
    lines.join("\n")
}
