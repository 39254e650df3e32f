use crate::errors::{AuthError, AuthResult};
use std::fmt;

/// Where a one-time password is delivered.
///
/// Always normalized: emails are trimmed and lowercased, phones are E.164.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OtpTarget {
    Email(String),
    Phone(String),
}

impl OtpTarget {
    /// Parse a login identifier as typed by the user.
    ///
    /// Anything containing `@` is treated as an email. Everything else must
    /// be a phone number; bare national numbers get `default_country_code`.
    pub fn parse(input: &str, default_country_code: &str) -> AuthResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AuthError::InvalidOtpTarget("identifier is empty".to_string()));
        }

        if input.contains('@') {
            normalize_email(input).map(OtpTarget::Email)
        } else {
            normalize_phone(input, default_country_code).map(OtpTarget::Phone)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OtpTarget::Email(v) | OtpTarget::Phone(v) => v,
        }
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, OtpTarget::Phone(_))
    }

    /// Identifier safe for logs: keeps enough to correlate, hides the rest.
    pub fn masked(&self) -> String {
        match self {
            OtpTarget::Email(email) => match email.split_once('@') {
                Some((local, domain)) => {
                    let first: String = local.chars().take(1).collect();
                    format!("{}***@{}", first, domain)
                },
                None => "***".to_string(),
            },
            OtpTarget::Phone(phone) => {
                let tail: String = phone
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("***{}", tail)
            },
        }
    }
}

impl fmt::Display for OtpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn normalize_email(input: &str) -> AuthResult<String> {
    let email = input.trim().to_lowercase();
    let invalid = || AuthError::InvalidOtpTarget(format!("'{}' is not a valid email address", input));

    if email.chars().any(char::is_whitespace) || email.matches('@').count() != 1 {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.starts_with('.')
        || domain.ends_with('.')
        || !domain.contains('.')
        || domain.contains("..")
    {
        return Err(invalid());
    }

    Ok(email)
}

/// Normalize a phone number to E.164.
///
/// Accepted shapes (with spaces, dashes, dots and parentheses ignored):
/// - `+<8..15 digits>` or `00<8..15 digits>`
/// - 10-digit national number, prefixed with the default country code
/// - 11 digits with a leading trunk `0`, which is dropped
/// - country code digits followed by a 10-digit national number
pub fn normalize_phone(input: &str, default_country_code: &str) -> AuthResult<String> {
    let invalid = || AuthError::InvalidOtpTarget(format!("'{}' is not a valid phone number", input));

    let cleaned: String = input
        .chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')' | '.')))
        .collect();

    let cleaned = match cleaned.strip_prefix("00") {
        Some(rest) => format!("+{}", rest),
        None => cleaned,
    };

    if let Some(digits) = cleaned.strip_prefix('+') {
        return if is_e164_digits(digits) {
            Ok(cleaned)
        } else {
            Err(invalid())
        };
    }

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let cc_digits = default_country_code.trim_start_matches('+');
    let e164 = if cleaned.len() == 10 {
        format!("+{}{}", cc_digits, cleaned)
    } else if cleaned.len() == 11 && cleaned.starts_with('0') {
        format!("+{}{}", cc_digits, &cleaned[1..])
    } else if cleaned.len() == cc_digits.len() + 10 && cleaned.starts_with(cc_digits) {
        format!("+{}", cleaned)
    } else {
        return Err(invalid());
    };

    if is_e164_digits(&e164[1..]) {
        Ok(e164)
    } else {
        Err(invalid())
    }
}

fn is_e164_digits(digits: &str) -> bool {
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(input: &str) -> AuthResult<String> {
        normalize_phone(input, "+91")
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(phone("98765 43210").unwrap(), "+919876543210");
        assert_eq!(phone("098765-43210").unwrap(), "+919876543210");
        assert_eq!(phone("919876543210").unwrap(), "+919876543210");
        assert_eq!(phone("+91 (98765) 43210").unwrap(), "+919876543210");
        assert_eq!(phone("0044 20 7946 0958").unwrap(), "+442079460958");
        assert_eq!(phone("+1.415.555.0100").unwrap(), "+14155550100");
    }

    #[test]
    fn test_phone_rejections() {
        assert!(phone("12345").is_err());
        assert!(phone("+12").is_err());
        assert!(phone("+1234567890123456").is_err());
        assert!(phone("98765x3210").is_err());
        assert!(phone("+91 98765 4321a").is_err());
        assert!(phone("1234567890123").is_err());
    }

    #[test]
    fn test_other_default_country_code() {
        assert_eq!(normalize_phone("4155550100", "+1").unwrap(), "+14155550100");
        assert_eq!(normalize_phone("14155550100", "+1").unwrap(), "+14155550100");
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Asha@Example.IN ").unwrap(), "asha@example.in");
        assert!(normalize_email("asha@example").is_err());
        assert!(normalize_email("@example.in").is_err());
        assert!(normalize_email("a@b@example.in").is_err());
        assert!(normalize_email("a b@example.in").is_err());
        assert!(normalize_email("a@.example.in").is_err());
    }

    #[test]
    fn test_parse_dispatches_on_at_sign() {
        assert_eq!(
            OtpTarget::parse("asha@example.in", "+91").unwrap(),
            OtpTarget::Email("asha@example.in".to_string())
        );
        assert_eq!(
            OtpTarget::parse("9876543210", "+91").unwrap(),
            OtpTarget::Phone("+919876543210".to_string())
        );
        assert!(matches!(
            OtpTarget::parse("   ", "+91"),
            Err(AuthError::InvalidOtpTarget(_))
        ));
    }

    #[test]
    fn test_masked() {
        assert_eq!(OtpTarget::Email("asha@example.in".into()).masked(), "a***@example.in");
        assert_eq!(OtpTarget::Phone("+919876543210".into()).masked(), "***3210");
    }
}
