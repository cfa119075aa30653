/// `12.345` with 1 digit -> `"12.3%"`. Non-finite input renders as zero.
pub(crate) fn format_percent(n: f64, digits: usize) -> String {
    let n = if n.is_finite() { n } else { 0.0 };
    format!("{n:.digits$}%")
}

/// Thousands-grouped integer, e.g. `1234567` -> `"1,234,567"`.
pub(crate) fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn clamp(v: f64, min: f64, max: f64) -> f64 {
    v.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent_digits() {
        assert_eq!(format_percent(42.0, 0), "42%");
        assert_eq!(format_percent(12.345, 1), "12.3%");
        assert_eq!(format_percent(f64::NAN, 0), "0%");
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-98765), "-98,765");
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(150.0, 0.0, 100.0), 100.0);
        assert_eq!(clamp(-3.0, 0.0, 100.0), 0.0);
        assert_eq!(clamp(55.5, 0.0, 100.0), 55.5);
    }
}
