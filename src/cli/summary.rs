use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregate::{Aggregation, TOP_CATEGORIES};
use crate::cli::FilterArgs;
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::fmt::{amount, label_list, number};
use crate::models::ExpenseTable;
use crate::state::{recompute, AppState, DashboardView};

pub fn run(table: ExpenseTable, filters: &FilterArgs, with_rows: bool) -> Result<String> {
    let spec = filters.to_spec(&table)?;
    let state = AppState { table, spec };
    let view = recompute(&state);
    let mut out = format_summary(&state.spec, &view, state.table.len());
    if with_rows {
        out.push_str("\n\n");
        out.push_str(&format_rows(&state.table.extra_headers, &view));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Pure formatting functions (view → String)
// ---------------------------------------------------------------------------

pub fn format_filters(spec: &FilterSpec) -> String {
    format!(
        "Selected Price Range: {} to {}\nSelected Months: {}\nSelected Modules: {}",
        amount(spec.price_min()),
        amount(spec.price_max()),
        label_list(&spec.selected_dates()),
        label_list(&spec.selected_modules()),
    )
}

fn format_aggregation(title: &str, key_header: &str, agg: &Aggregation, with_share: bool) -> String {
    let mut table = Table::new();
    if with_share {
        table.set_header(vec![key_header, "Total Expense", "%"]);
    } else {
        table.set_header(vec![key_header, "Total Expense"]);
    }
    for (key, total) in agg.iter() {
        let mut row = vec![Cell::new(key), Cell::new(amount(total))];
        if with_share {
            row.push(Cell::new(format!("{:.1}%", agg.share(key))));
        }
        table.add_row(row);
    }
    format!("{}\n{table}", title.bold())
}

fn format_top(top: &[(String, f64)]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Total Expense"]);
    for (module, total) in top {
        table.add_row(vec![Cell::new(module), Cell::new(amount(*total))]);
    }
    format!("{}\n{table}", format!("Top {TOP_CATEGORIES} Categories by Expense").bold())
}

pub fn format_summary(spec: &FilterSpec, view: &DashboardView, total_rows: usize) -> String {
    let sections = [
        format_filters(spec),
        format!(
            "Filtered rows: {} of {}   Total expense: {}",
            number(view.rows.len() as i64),
            number(total_rows as i64),
            amount(view.total)
        ),
        format_aggregation("Total Monthly Expense", "Month", &view.by_date, false),
        format_aggregation("Category Breakdown", "Module", &view.by_module, true),
        format_aggregation("Priority Analysis", "Priority Level", &view.by_priority, false),
        format_top(&view.top_modules),
    ];
    sections.join("\n\n")
}

pub fn format_rows(extra_headers: &[String], view: &DashboardView) -> String {
    let mut table = Table::new();
    let mut header = vec!["Date".to_string(), "Module".into(), "Priority".into(), "Price".into()];
    header.extend(extra_headers.iter().cloned());
    table.set_header(header);
    for r in &view.rows {
        let mut row = vec![
            Cell::new(r.date.as_deref().unwrap_or("")),
            Cell::new(r.module.as_deref().unwrap_or("")),
            Cell::new(r.priority.as_deref().unwrap_or("")),
            Cell::new(r.price.map(amount).unwrap_or_default()),
        ];
        row.extend(r.extra.iter().map(Cell::new));
        table.add_row(row);
    }
    format!("{}\n{table}", "Filtered Expense Data Table".bold())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record;

    fn table() -> ExpenseTable {
        let mut rent = record("Feb", "Rent", "Low", Some(500.0));
        rent.extra = vec!["landlord".to_string()];
        let mut food = record("Jan", "Food", "High", Some(100.0));
        food.extra = vec!["groceries".to_string()];
        let mut bad = record("Jan", "Food", "High", None);
        bad.extra = vec![String::new()];
        ExpenseTable {
            extra_headers: vec!["Notes".to_string()],
            records: vec![food, bad, rent],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_summary_full_selection() {
        let out = run(table(), &FilterArgs::default(), false).unwrap();
        assert!(out.contains("Selected Price Range: 100.00 to 500.00"));
        assert!(out.contains("Selected Months: Jan, Feb"));
        assert!(out.contains("Filtered rows: 2 of 3"));
        assert!(out.contains("Total expense: 600.00"));
        assert!(out.contains("Category Breakdown"));
        assert!(out.contains("83.3%"));
        assert!(!out.contains("Filtered Expense Data Table"));
    }

    #[test]
    fn test_summary_narrowed_range_drops_food() {
        let args = FilterArgs {
            min: Some(200.0),
            max: Some(600.0),
            ..Default::default()
        };
        let out = run(table(), &args, true).unwrap();
        assert!(out.contains("Filtered rows: 1 of 3"));
        assert!(out.contains("landlord"));
        assert!(!out.contains("groceries"));
        let after_filters = out.split_once("Filtered rows").unwrap().1;
        assert!(!after_filters.contains("Food"));
    }

    #[test]
    fn test_summary_with_empty_selection() {
        let args = FilterArgs {
            modules: vec!["Travel".to_string()],
            ..Default::default()
        };
        let out = run(table(), &args, true).unwrap();
        assert!(out.contains("Filtered rows: 0 of 3"));
        assert!(out.contains("Total expense: 0.00"));
    }
}
