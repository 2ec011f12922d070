//! Number formatting for the summary table.

/// Format a percentage with adaptive precision.
/// - >= 10%: 1 decimal (e.g., "95.2")
/// - < 10%: 2 decimals (e.g., "9.99", "0.01")
pub fn format_pct(value: f64) -> String {
    if value >= 10.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format a solve time given in seconds with autoscaling.
/// - < 60s: "X.Xs" (e.g., "4.2s")
/// - 1m - 59m: "X.Xm" (e.g., "2.5m")
/// - >= 1h: "X.Xh" (e.g., "1.5h")
pub fn format_secs(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3_600.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}h", secs / 3_600.0)
    }
}

/// Format a gas amount with SI suffixes.
/// - < 1K: raw number
/// - 1K - 999.9K: "XXX.XK"
/// - >= 1M: "X.XM"
pub fn format_gas(value: f64) -> String {
    if value.abs() < 1_000.0 {
        format!("{:.0}", value)
    } else if value.abs() < 1_000_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.1}M", value / 1_000_000.0)
    }
}

/// Optional value, or "-" when absent.
pub fn or_dash(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(95.23), "95.2");
        assert_eq!(format_pct(100.0), "100.0");
        assert_eq!(format_pct(9.99), "9.99");
        assert_eq!(format_pct(0.0), "0.00");
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(4.24), "4.2s");
        assert_eq!(format_secs(150.0), "2.5m");
        assert_eq!(format_secs(5_400.0), "1.5h");
    }

    #[test]
    fn test_format_gas() {
        assert_eq!(format_gas(42.0), "42");
        assert_eq!(format_gas(1_500.0), "1.5K");
        assert_eq!(format_gas(2_300_000.0), "2.3M");
        assert_eq!(format_gas(-1_500.0), "-1.5K");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None, format_secs), "-");
        assert_eq!(or_dash(Some(1.0), format_secs), "1.0s");
    }
}
