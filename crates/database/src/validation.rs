//! Input validation for client, agent and user fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Invalid phone number or country code.
    InvalidPhone(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::InvalidPhone(msg) => write!(f, "Invalid phone: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} is required", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum digits in a local phone number (E.164 total is 15).
pub const MAX_PHONE_DIGITS: usize = 15;

/// Maximum digits in a country calling code.
pub const MAX_COUNTRY_CODE_DIGITS: usize = 4;

/// Maximum allowed length for short names (agent, client, company).
pub const MAX_NAME_LENGTH: usize = 128;

/// Require a non-blank value no longer than `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: len,
        });
    }

    Ok(())
}

/// Validate an email address (basic format check).
///
/// Requires exactly one `@`, a non-empty local part, and a dotted domain
/// that neither starts nor ends with a dot.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(
            "must contain an @ symbol".to_string(),
        ));
    };

    if domain.contains('@') {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must be dotted, e.g. example.com".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

/// Validate a local phone number: digits only, no country code.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Empty("phone".to_string()));
    }

    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone(
            "phone must contain digits only".to_string(),
        ));
    }

    if phone.len() > MAX_PHONE_DIGITS {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_DIGITS,
            actual: phone.len(),
        });
    }

    Ok(())
}

/// Validate a country calling code such as `+1` or `351`.
pub fn validate_country_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Empty("countryCode".to_string()));
    }

    let digits = code.strip_prefix('+').unwrap_or(code);
    if digits.is_empty()
        || digits.len() > MAX_COUNTRY_CODE_DIGITS
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidPhone(format!(
            "'{}' is not a country code",
            code
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ops@acme.com").is_ok());
        assert!(validate_email(" ops@acme.co.uk ").is_ok());

        assert!(matches!(validate_email(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_email("ops.acme.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b@c.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("ops@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("ops@acme..com"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("5550100").is_ok());
        assert!(matches!(validate_phone(" "), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_phone("555-0100"),
            Err(ValidationError::InvalidPhone(_))
        ));
        assert!(matches!(
            validate_phone(&"1".repeat(16)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_country_code() {
        assert!(validate_country_code("+1").is_ok());
        assert!(validate_country_code("351").is_ok());
        assert!(validate_country_code("+").is_err());
        assert!(validate_country_code("+12345").is_err());
        assert!(validate_country_code("+4a").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Greeter", MAX_NAME_LENGTH).is_ok());
        assert_eq!(
            validate_required("name", "  ", MAX_NAME_LENGTH).unwrap_err().to_string(),
            "name is required"
        );
        assert!(matches!(
            validate_required("name", "abcdef", 3),
            Err(ValidationError::TooLong { max: 3, actual: 6, .. })
        ));
    }
}
