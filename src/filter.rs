use std::collections::BTreeSet;

use crate::error::{DashError, Result};
use crate::models::{ExpenseRecord, ExpenseTable};

/// The active dashboard filters. Rebuilt from the current selections on every recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    price_min: f64,
    price_max: f64,
    pub allowed_dates: BTreeSet<String>,
    pub allowed_modules: BTreeSet<String>,
    /// Every label of the sheet in first-seen order, for display.
    date_order: Vec<String>,
    module_order: Vec<String>,
}

impl FilterSpec {
    /// Every date and module of `table` selected, prices limited to `price_min..=price_max`.
    pub fn new(table: &ExpenseTable, price_min: f64, price_max: f64) -> Result<Self> {
        if !price_min.is_finite() || !price_max.is_finite() || price_min > price_max {
            return Err(DashError::InvalidRange {
                min: price_min,
                max: price_max,
            });
        }
        Ok(Self::with_range(table, price_min, price_max))
    }

    /// Everything selected: the observed price range and every date and module label.
    pub fn full(table: &ExpenseTable) -> Self {
        let (price_min, price_max) = table.price_bounds().unwrap_or((0.0, 0.0));
        Self::with_range(table, price_min, price_max)
    }

    fn with_range(table: &ExpenseTable, price_min: f64, price_max: f64) -> Self {
        let date_order = table.distinct_dates();
        let module_order = table.distinct_modules();
        Self {
            price_min,
            price_max,
            allowed_dates: date_order.iter().cloned().collect(),
            allowed_modules: module_order.iter().cloned().collect(),
            date_order,
            module_order,
        }
    }

    /// Selected dates in sheet order.
    pub fn selected_dates(&self) -> Vec<&str> {
        in_sheet_order(&self.allowed_dates, &self.date_order)
    }

    /// Selected modules in sheet order.
    pub fn selected_modules(&self) -> Vec<&str> {
        in_sheet_order(&self.allowed_modules, &self.module_order)
    }

    pub fn price_min(&self) -> f64 {
        self.price_min
    }

    pub fn price_max(&self) -> f64 {
        self.price_max
    }

    /// Replace the price bounds, keeping `min <= max`.
    pub fn set_price_range(&mut self, min: f64, max: f64) -> Result<()> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(DashError::InvalidRange { min, max });
        }
        self.price_min = min;
        self.price_max = max;
        Ok(())
    }

    /// Rows without a usable price never match.
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        let in_range = record
            .price
            .is_some_and(|p| self.price_min <= p && p <= self.price_max);
        let date_ok = record
            .date
            .as_ref()
            .is_some_and(|d| self.allowed_dates.contains(d));
        let module_ok = record
            .module
            .as_ref()
            .is_some_and(|m| self.allowed_modules.contains(m));
        in_range && date_ok && module_ok
    }
}

/// Labels the sheet does not contain go last, sorted.
fn in_sheet_order<'a>(selected: &'a BTreeSet<String>, order: &'a [String]) -> Vec<&'a str> {
    let mut out: Vec<&str> = order
        .iter()
        .filter(|l| selected.contains(*l))
        .map(String::as_str)
        .collect();
    out.extend(
        selected
            .iter()
            .filter(|l| !order.contains(l))
            .map(String::as_str),
    );
    out
}

/// Rows passing every filter, in input order.
pub fn apply<'a, I>(rows: I, spec: &FilterSpec) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    rows.into_iter().filter(|r| spec.matches(r)).collect()
}
