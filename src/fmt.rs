fn with_commas(int_part: &str) -> String {
    let mut out = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Format a float with thousands separators and two decimals: 1,234.56
pub fn amount(val: f64) -> String {
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if val < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{dec_part}", with_commas(int_part))
}

/// Format an integer count with thousands separators: 1,234
pub fn number(val: i64) -> String {
    let s = with_commas(&val.unsigned_abs().to_string());
    if val < 0 {
        format!("-{s}")
    } else {
        s
    }
}

/// Join selected labels for display, or "(none)" when nothing is selected.
pub fn label_list(labels: &[&str]) -> String {
    if labels.is_empty() {
        "(none)".to_string()
    } else {
        labels.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(1234.56), "1,234.56");
        assert_eq!(amount(-500.00), "-500.00");
        assert_eq!(amount(0.0), "0.00");
        assert_eq!(amount(-0.001), "0.00");
        assert_eq!(amount(1000000.99), "1,000,000.99");
        assert_eq!(amount(42.10), "42.10");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(0), "0");
        assert_eq!(number(999), "999");
        assert_eq!(number(1234567), "1,234,567");
        assert_eq!(number(-4200), "-4,200");
    }

    #[test]
    fn test_label_list() {
        assert_eq!(label_list(&["Rent", "Food"]), "Rent, Food");
        assert_eq!(label_list(&[]), "(none)");
    }
}
