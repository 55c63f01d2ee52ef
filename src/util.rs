/// Round to two decimal places, the precision elapsed times are stored at.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format seconds the way the timer and result dialog show them.
pub fn format_secs(secs: f64) -> String {
    format!("{secs:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_hundredths() {
        assert_eq!(round_to_hundredths(1.234), 1.23);
        assert_eq!(round_to_hundredths(1.235_1), 1.24);
        assert_eq!(round_to_hundredths(0.0), 0.0);
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(0.0), "0.00");
        assert_eq!(format_secs(12.5), "12.50");
    }
}
