use std::collections::BTreeMap;

use crate::models::ExpenseRecord;

/// How many modules the top-categories view and report show.
pub const TOP_CATEGORIES: usize = 5;

/// Group label for rows whose key column is empty.
pub const BLANK_LABEL: &str = "(blank)";

/// Summed price per group key, iterated in ascending key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    groups: BTreeMap<String, f64>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.groups.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total(&self) -> f64 {
        self.groups.values().sum()
    }

    /// Percentage of the total held by `key`; 0 when the total is 0.
    pub fn share(&self, key: &str) -> f64 {
        let total = self.total();
        match self.get(key) {
            Some(v) if total != 0.0 => v / total * 100.0,
            _ => 0.0,
        }
    }
}

/// Group rows by `key` and sum their prices. Missing prices add nothing.
pub fn group_sum<'a, I, F>(rows: I, key: F) -> Aggregation
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
    F: Fn(&ExpenseRecord) -> Option<&str>,
{
    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        let label = key(row).unwrap_or(BLANK_LABEL);
        *groups.entry(label.to_string()).or_default() += row.price.unwrap_or(0.0);
    }
    Aggregation { groups }
}

pub fn by_date<'a>(rows: impl IntoIterator<Item = &'a ExpenseRecord>) -> Aggregation {
    group_sum(rows, |r| r.date.as_deref())
}

pub fn by_module<'a>(rows: impl IntoIterator<Item = &'a ExpenseRecord>) -> Aggregation {
    group_sum(rows, |r| r.module.as_deref())
}

pub fn by_priority<'a>(rows: impl IntoIterator<Item = &'a ExpenseRecord>) -> Aggregation {
    group_sum(rows, |r| r.priority.as_deref())
}

/// The `n` largest groups, descending. Ties keep aggregation order.
pub fn top_n(agg: &Aggregation, n: usize) -> Vec<(String, f64)> {
    let mut items: Vec<(String, f64)> = agg.iter().map(|(k, v)| (k.to_string(), v)).collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));
    items.truncate(n);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply, FilterSpec};
    use crate::models::{record, ExpenseTable};

    fn scenario() -> ExpenseTable {
        ExpenseTable {
            records: vec![
                record("Jan", "Food", "High", Some(100.0)),
                record("Jan", "Food", "High", None),
                record("Feb", "Rent", "Low", Some(500.0)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_full_selection() {
        let table = scenario();
        let spec = FilterSpec::full(&table);
        let subset = apply(&table.records, &spec);
        let modules = by_module(subset.iter().copied());
        assert_eq!(modules.len(), 2);
        assert_eq!(modules.get("Food"), Some(100.0));
        assert_eq!(modules.get("Rent"), Some(500.0));
        assert_eq!(
            top_n(&modules, TOP_CATEGORIES),
            vec![("Rent".to_string(), 500.0), ("Food".to_string(), 100.0)]
        );
    }

    #[test]
    fn test_scenario_narrowed_range_drops_food_everywhere() {
        let table = scenario();
        let mut spec = FilterSpec::full(&table);
        spec.set_price_range(200.0, 600.0).unwrap();
        let subset = apply(&table.records, &spec);

        let dates = by_date(subset.iter().copied());
        assert_eq!(dates.iter().collect::<Vec<_>>(), vec![("Feb", 500.0)]);
        let modules = by_module(subset.iter().copied());
        assert_eq!(modules.get("Food"), None);
        assert_eq!(modules.len(), 1);
        assert_eq!(by_priority(subset.iter().copied()).get("High"), None);
    }

    #[test]
    fn test_empty_subset_yields_empty_aggregations() {
        let rows: Vec<&ExpenseRecord> = Vec::new();
        assert!(by_date(rows.iter().copied()).is_empty());
        assert!(by_priority(rows.iter().copied()).is_empty());
        let modules = by_module(rows.iter().copied());
        assert!(modules.is_empty());
        assert_eq!(modules.total(), 0.0);
        assert!(top_n(&modules, TOP_CATEGORIES).is_empty());
    }

    #[test]
    fn test_group_totals_match_subset_total() {
        let mut no_priority = record("Mar", "Fuel", "", Some(12.5));
        no_priority.priority = None;
        let rows = vec![
            record("Jan", "Food", "High", Some(10.0)),
            record("Jan", "Rent", "Low", Some(700.0)),
            record("Feb", "Food", "High", None),
            record("Feb", "Fuel", "Mid", Some(45.25)),
            no_priority,
        ];
        let expected: f64 = rows.iter().filter_map(|r| r.price).sum();
        for agg in [by_date(&rows), by_module(&rows), by_priority(&rows)] {
            assert!((agg.total() - expected).abs() < 1e-9);
        }
        assert_eq!(by_priority(&rows).get(BLANK_LABEL), Some(12.5));
    }

    #[test]
    fn test_top_n_length_and_order() {
        let rows: Vec<ExpenseRecord> = [
            ("A", 5.0),
            ("B", 60.0),
            ("C", 30.0),
            ("D", 60.0),
            ("E", 1.0),
            ("F", 90.0),
            ("G", 2.0),
        ]
        .iter()
        .map(|(m, p)| record("Jan", m, "High", Some(*p)))
        .collect();
        let modules = by_module(&rows);
        let top = top_n(&modules, TOP_CATEGORIES);
        assert_eq!(top.len(), 5);
        let names: Vec<&str> = top.iter().map(|(m, _)| m.as_str()).collect();
        // B and D tie; B comes first in key order
        assert_eq!(names, vec!["F", "B", "D", "C", "A"]);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));

        let few = by_module(&rows[..2]);
        assert_eq!(top_n(&few, TOP_CATEGORIES).len(), 2);
    }

    #[test]
    fn test_share() {
        let rows = vec![
            record("Jan", "Food", "High", Some(25.0)),
            record("Jan", "Rent", "High", Some(75.0)),
        ];
        let modules = by_module(&rows);
        assert_eq!(modules.share("Rent"), 75.0);
        assert_eq!(modules.share("Missing"), 0.0);
        assert_eq!(Aggregation::default().share("Rent"), 0.0);
    }
}
