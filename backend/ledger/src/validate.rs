use std::sync::OnceLock;

use regex::Regex;

use crate::LedgerError;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
    })
}

fn spaces_pattern() -> &'static Regex {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    SPACES.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"))
}

/// Trims and collapses inner whitespace. Case is preserved.
pub fn sanitize(input: &str) -> String {
    spaces_pattern().replace_all(input.trim(), " ").into_owned()
}

pub fn required(field: &'static str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::MissingField(field));
    }

    Ok(())
}

pub fn email(field: &'static str, value: &str) -> Result<(), LedgerError> {
    required(field, value)?;

    if !email_pattern().is_match(value.trim()) {
        return Err(LedgerError::InvalidField {
            field,
            reason: format!("'{value}' is not an email address"),
        });
    }

    Ok(())
}

pub fn optional_email(field: &'static str, value: Option<&str>) -> Result<(), LedgerError> {
    match value {
        Some(value) if !value.trim().is_empty() => email(field, value),
        _ => Ok(()),
    }
}
