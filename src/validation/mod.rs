use bigdecimal::BigDecimal;
use std::fmt;

pub const WALLET_ADDRESS_MAX_LEN: usize = 128;
pub const CURRENCY_MAX_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_wallet_address(field: &'static str, address: &str) -> ValidationResult {
    let address = sanitize_string(address);
    validate_required(field, &address)?;
    validate_max_len(field, &address, WALLET_ADDRESS_MAX_LEN)?;

    if address.contains(' ') {
        return Err(ValidationError::new(field, "must not contain whitespace"));
    }

    Ok(())
}

pub fn validate_currency(currency: &str) -> ValidationResult {
    let currency = sanitize_string(currency);
    validate_required("currency", &currency)?;
    validate_max_len("currency", &currency, CURRENCY_MAX_LEN)?;

    if !currency
        .chars()
        .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
    {
        return Err(ValidationError::new(
            "currency",
            "must contain only uppercase letters and digits",
        ));
    }

    Ok(())
}

pub fn validate_positive_amount(amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_wallet_address() {
        assert!(validate_wallet_address("fromWallet", "0xABCDEF123456").is_ok());
        assert!(validate_wallet_address("fromWallet", "  0xA  ").is_ok());
        assert!(validate_wallet_address("fromWallet", "").is_err());
        assert!(validate_wallet_address("fromWallet", "   ").is_err());
        assert!(validate_wallet_address("fromWallet", "0x12 34").is_err());
        assert!(validate_wallet_address("fromWallet", &"A".repeat(129)).is_err());
    }

    #[test]
    fn validates_currency() {
        assert!(validate_currency("ETH").is_ok());
        assert!(validate_currency("  USDC  ").is_ok());
        assert!(validate_currency("eth").is_err());
        assert!(validate_currency("").is_err());
        assert!(validate_currency("ET H").is_err());
        assert!(validate_currency(&"A".repeat(13)).is_err());
    }

    #[test]
    fn validates_positive_amount() {
        let positive = BigDecimal::from_str("1.23").expect("valid decimal");
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-1);

        assert!(validate_positive_amount(&positive).is_ok());
        assert!(validate_positive_amount(&zero).is_err());
        assert!(validate_positive_amount(&negative).is_err());
    }
}
