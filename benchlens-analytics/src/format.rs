//! Number formatting for tooltips and labels

/// Format a number with thousands separators and a fixed number of decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let nonzero = formatted.chars().any(|c| c != '0' && c != '.');
    let sign = if value < 0.0 && nonzero { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format a metric reading with its unit. Large values drop decimals.
pub fn format_metric(value: f64, unit: &str) -> String {
    let decimals = if value.abs() >= 100.0 { 0 } else { 2 };
    let number = format_number(value, decimals);
    if unit.is_empty() {
        number
    } else {
        format!("{} {}", number, unit)
    }
}

/// Format an optional reading, `N/A` when absent
pub fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format_metric(value, unit),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-45000.0, 0), "-45,000");
        assert_eq!(format_number(-0.001, 1), "0.0");
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(1200.0, "IOPS"), "1,200 IOPS");
        assert_eq!(format_metric(0.456, "ms"), "0.46 ms");
        assert_eq!(format_metric(3.0, ""), "3.00");
        assert_eq!(format_optional(None, "MB/s"), "N/A");
    }
}
