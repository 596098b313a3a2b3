use crate::aggregate::{by_date, by_module, by_priority, top_n, Aggregation, TOP_CATEGORIES};
use crate::filter::{apply, FilterSpec};
use crate::models::{ExpenseRecord, ExpenseTable};

/// The loaded table plus the current selections. The table never changes after load.
pub struct AppState {
    pub table: ExpenseTable,
    pub spec: FilterSpec,
}

impl AppState {
    pub fn new(table: ExpenseTable) -> Self {
        let spec = FilterSpec::full(&table);
        Self { table, spec }
    }

    pub fn reset_filters(&mut self) {
        self.spec = FilterSpec::full(&self.table);
    }
}

/// Everything the dashboard draws for one filter state.
pub struct DashboardView<'a> {
    pub rows: Vec<&'a ExpenseRecord>,
    pub by_date: Aggregation,
    pub by_module: Aggregation,
    pub by_priority: Aggregation,
    pub top_modules: Vec<(String, f64)>,
    pub total: f64,
}

pub fn recompute(state: &AppState) -> DashboardView<'_> {
    let rows = apply(&state.table.records, &state.spec);
    let by_date = by_date(rows.iter().copied());
    let by_module = by_module(rows.iter().copied());
    let by_priority = by_priority(rows.iter().copied());
    let top_modules = top_n(&by_module, TOP_CATEGORIES);
    let total: f64 = rows.iter().filter_map(|r| r.price).sum();
    log::debug!(
        "recompute: {} of {} rows, total {total}",
        rows.len(),
        state.table.len()
    );
    DashboardView {
        rows,
        by_date,
        by_module,
        by_priority,
        top_modules,
        total,
    }
}
