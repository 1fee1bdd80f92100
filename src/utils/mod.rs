use chrono::Utc;
use std::num::ParseFloatError;

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn parse_decimal(value: &str) -> Result<f64, ParseFloatError> {
    value.trim().replace(',', ".").parse::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_decimals() {
        assert_eq!(parse_decimal("12,50").unwrap(), 12.5);
        assert_eq!(parse_decimal(" 3.25 ").unwrap(), 3.25);
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("").is_err());
    }
}
