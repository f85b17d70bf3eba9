/// Format a coin amount for display, truncated to whole coins (e.g. "1,234").
pub fn format_coins(amount: f64) -> String {
    let whole = if amount.is_finite() { amount.max(0.0).floor() as u64 } else { 0 };
    let s = whole.to_string();
    let mut result = String::new();
    let digits: Vec<char> = s.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coins() {
        assert_eq!(format_coins(0.0), "0");
        assert_eq!(format_coins(500.0), "500");
        assert_eq!(format_coins(1234.0), "1,234");
        assert_eq!(format_coins(1_000_000.0), "1,000,000");
    }

    #[test]
    fn test_format_coins_truncates_fractions() {
        assert_eq!(format_coins(999.99), "999");
        assert_eq!(format_coins(1000.5), "1,000");
    }

    #[test]
    fn test_format_coins_rejects_garbage() {
        assert_eq!(format_coins(-5.0), "0");
        assert_eq!(format_coins(f64::NAN), "0");
    }
}
