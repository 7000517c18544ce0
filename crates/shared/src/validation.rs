//! Common validation utilities for portal payloads.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Highest year level the portal accepts.
const MAX_YEAR_LEVEL: i64 = 6;

lazy_static! {
    /// Section labels like "BSIT-3A": letters, digits and dashes only.
    static ref SECTION_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{0,49}$").unwrap();
}

/// Validates that a password meets the minimum length requirement.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() >= MIN_PASSWORD_LENGTH {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_length");
        err.message = Some(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH).into());
        Err(err)
    }
}

/// Validates that a year level is within the accepted range (1 to 6).
pub fn validate_year_level(year_level: i64) -> Result<(), ValidationError> {
    if (1..=MAX_YEAR_LEVEL).contains(&year_level) {
        Ok(())
    } else {
        let mut err = ValidationError::new("year_level_range");
        err.message = Some(format!("Year level must be between 1 and {}", MAX_YEAR_LEVEL).into());
        Err(err)
    }
}

/// Validates a section label (e.g. "3A", "BSIT-2B").
pub fn validate_section(section: &str) -> Result<(), ValidationError> {
    if SECTION_RE.is_match(section) {
        Ok(())
    } else {
        let mut err = ValidationError::new("section_format");
        err.message = Some("Section may only contain letters, digits, spaces and dashes".into());
        Err(err)
    }
}

/// Validates a report date bound in `YYYY-MM-DD` form.
///
/// Report date-range filtering compares dates lexically, so the only hard
/// requirement is the zero-padded digit layout.
pub fn validate_report_date(date: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    if DATE_RE.is_match(date) {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_format");
        err.message = Some("Date must be in YYYY-MM-DD format".into());
        Err(err)
    }
}
