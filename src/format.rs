/// Format milliseconds as "MM:SS.d".
///
/// Tenths are truncated, never rounded, and the minutes field keeps growing
/// past 59 instead of rolling over into hours.
pub fn format_millis(ms: u64) -> String {
    let tenths = ms / 100;
    format!(
        "{:02}:{:02}.{}",
        tenths / 600,
        (tenths / 10) % 60,
        tenths % 10
    )
}

/// Format a split difference with an explicit sign, e.g. "+00:01.5".
pub fn format_signed_millis(diff_ms: i64) -> String {
    let sign = if diff_ms < 0 { '-' } else { '+' };
    format!("{}{}", sign, format_millis(diff_ms.unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_millis(0), "00:00.0");
    }

    #[test]
    fn test_format_one_minute() {
        assert_eq!(format_millis(60_000), "01:00.0");
    }

    #[test]
    fn test_format_no_hour_rollover() {
        assert_eq!(format_millis(3_661_400), "61:01.4");
    }

    #[test]
    fn test_format_truncates_tenths() {
        assert_eq!(format_millis(1_999), "00:01.9");
        assert_eq!(format_millis(99), "00:00.0");
        assert_eq!(format_millis(59_999), "00:59.9");
    }

    #[test]
    fn test_format_is_stable() {
        let first = format_millis(123_456);
        assert_eq!(first, format_millis(123_456));
        assert_eq!(first, "02:03.4");
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed_millis(1_500), "+00:01.5");
        assert_eq!(format_signed_millis(-2_000), "-00:02.0");
        assert_eq!(format_signed_millis(0), "+00:00.0");
    }
}
