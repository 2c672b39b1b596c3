pub(crate) fn format_rate(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.0}")
    } else {
        "0".to_string()
    }
}

/// Renders a millisecond value with a unit that keeps it short: `850us`, `12.40ms`, `3.20s`.
pub(crate) fn format_ms(ms: f64) -> String {
    if !ms.is_finite() || ms <= 0.0 {
        return "0ms".to_string();
    }
    if ms >= 1000.0 {
        return format!("{:.2}s", ms / 1000.0);
    }
    if ms >= 1.0 {
        return format!("{ms:.2}ms");
    }
    format!("{:.0}us", ms * 1000.0)
}

/// Signed value with an explicit `+` for growth.
pub(crate) fn format_signed(v: f64, unit: &str) -> String {
    if v > 0.0 {
        format!("+{v:.2}{unit}")
    } else {
        format!("{v:.2}{unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_picks_a_readable_unit() {
        assert_eq!(format_ms(0.85), "850us");
        assert_eq!(format_ms(12.4), "12.40ms");
        assert_eq!(format_ms(3200.0), "3.20s");
        assert_eq!(format_ms(0.0), "0ms");
        assert_eq!(format_ms(f64::NAN), "0ms");
    }

    #[test]
    fn rate_handles_non_finite() {
        assert_eq!(format_rate(1234.4), "1234");
        assert_eq!(format_rate(f64::INFINITY), "0");
    }

    #[test]
    fn signed_marks_growth() {
        assert_eq!(format_signed(2.5, "MiB"), "+2.50MiB");
        assert_eq!(format_signed(-1.0, "MiB"), "-1.00MiB");
        assert_eq!(format_signed(0.0, ""), "0.00");
    }
}
