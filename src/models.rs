use std::collections::HashSet;

/// One row of the expense sheet after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub date: Option<String>,
    pub module: Option<String>,
    pub priority: Option<String>,
    pub price: Option<f64>,
    /// Pass-through columns, aligned with `ExpenseTable::extra_headers`.
    pub extra: Vec<String>,
}

/// A price cell that could not be coerced to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    /// 1-based data row (header excluded).
    pub row: usize,
    pub raw: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseTable {
    pub extra_headers: Vec<String>,
    pub records: Vec<ExpenseRecord>,
    pub warnings: Vec<ParseWarning>,
}

impl ExpenseTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest present price, or `None` when no row has one.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.price)
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }

    /// Distinct date labels in first-seen order.
    pub fn distinct_dates(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.date.as_deref()))
    }

    /// Distinct module labels in first-seen order.
    pub fn distinct_modules(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.module.as_deref()))
    }
}

fn distinct<'a>(labels: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for label in labels.flatten() {
        if seen.insert(label) {
            out.push(label.to_string());
        }
    }
    out
}

#[cfg(test)]
pub(crate) fn record(date: &str, module: &str, priority: &str, price: Option<f64>) -> ExpenseRecord {
    ExpenseRecord {
        date: Some(date.to_string()),
        module: Some(module.to_string()),
        priority: Some(priority.to_string()),
        price,
        extra: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(records: Vec<ExpenseRecord>) -> ExpenseTable {
        ExpenseTable {
            records,
            ..Default::default()
        }
    }

    #[test]
    fn test_price_bounds_skip_missing() {
        let t = table(vec![
            record("Jan", "Food", "High", Some(100.0)),
            record("Jan", "Food", "High", None),
            record("Feb", "Rent", "Low", Some(500.0)),
            record("Feb", "Fuel", "Low", Some(-20.0)),
        ]);
        assert_eq!(t.price_bounds(), Some((-20.0, 500.0)));
    }

    #[test]
    fn test_price_bounds_none_when_all_missing() {
        let t = table(vec![record("Jan", "Food", "High", None)]);
        assert_eq!(t.price_bounds(), None);
        assert_eq!(ExpenseTable::default().price_bounds(), None);
    }

    #[test]
    fn test_distinct_labels_keep_first_seen_order() {
        let mut missing = record("Mar", "Food", "High", Some(1.0));
        missing.module = None;
        let t = table(vec![
            record("Feb", "Rent", "High", Some(1.0)),
            record("Jan", "Food", "High", Some(1.0)),
            record("Feb", "Food", "High", Some(1.0)),
            missing,
        ]);
        assert_eq!(t.distinct_dates(), vec!["Feb", "Jan", "Mar"]);
        assert_eq!(t.distinct_modules(), vec!["Rent", "Food"]);
    }
}
