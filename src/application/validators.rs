use chrono::{Datelike, NaiveDate};
use validator::ValidateEmail;

use crate::app_error::{AppError, AppResult};

pub const NAME_MAX_LEN: usize = 100;
pub const NOTES_MAX_LEN: usize = 500;
pub const CONTACT_NAME_MAX_LEN: usize = 100;
pub const RELATIONSHIP_MAX_LEN: usize = 50;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Digits, spaces, `+`, `-` and parentheses only.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    !phone.is_empty()
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}

/// Trims and drops angle brackets so stored text can't carry markup.
pub fn sanitize_text(input: &str) -> String {
    input.trim().chars().filter(|c| *c != '<' && *c != '>').collect()
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(input: &str, field: &str) -> AppResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!("{field} must be a date in YYYY-MM-DD format"))
    })?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(AppError::InvalidInput(format!(
            "{field} must be between {MIN_YEAR} and {MAX_YEAR}"
        )));
    }
    Ok(date)
}

/// Parses a `YYYY-MM` month into (year, month).
pub fn parse_month(input: &str) -> AppResult<(i32, u32)> {
    let invalid = || AppError::InvalidInput("month must be in YYYY-MM format".into());
    let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(invalid());
    }
    Ok((year, month))
}
