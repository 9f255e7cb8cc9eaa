//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Lowercase and trim an email address for lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Please enter a valid email address".to_string());
    }

    Ok(())
}

/// Validate a login identifier (email or ID number)
pub fn validate_identifier(identifier: &str) -> Result<(), String> {
    let identifier = identifier.trim();

    if identifier.is_empty() {
        return Err("Email or ID number is required".to_string());
    }

    if identifier.len() > 254 {
        return Err("Email or ID number is too long".to_string());
    }

    Ok(())
}

/// Whether an identifier should be looked up as an email address
pub fn is_email_identifier(identifier: &str) -> bool {
    identifier.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.Cruz@School.EDU "), "ana.cruz@school.edu");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@school.edu").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email(&format!("{}@x.io", "a".repeat(260))).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("2021-00042").is_ok());
        assert!(validate_identifier("   ").is_err());
        assert!(is_email_identifier("ana@school.edu"));
        assert!(!is_email_identifier("2021-00042"));
    }
}
