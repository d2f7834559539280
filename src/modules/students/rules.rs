//! Atomic field rules shared by the student schemas.
//!
//! Every rule is a pure function over a raw value that returns either the
//! normalized value or a client-facing message. Field names are attached by
//! the schema layer, not here, so the same rule can serve several fields
//! (e.g. the person-name rule covers father, mother, and guardian names).

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateEmail;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("valid regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("valid regex"));

/// Required student name: trimmed, 2..=100 characters, letters/spaces/
/// hyphens/apostrophes only.
pub fn student_name(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.chars().count() < 2 {
        return Err("Student name must be at least 2 characters long".into());
    }
    if value.chars().count() > 100 {
        return Err("Student name cannot exceed 100 characters".into());
    }
    if !NAME_RE.is_match(value) {
        return Err("Student name can only contain letters, spaces, hyphens, and apostrophes".into());
    }
    Ok(value.to_string())
}

/// Optional person name (father/mother/guardian): max 100 characters plus
/// the name charset. `label` is the capitalized field label, e.g.
/// "Father's name".
pub fn person_name(value: &str, label: &str) -> Result<String, String> {
    if value.chars().count() > 100 {
        return Err(format!("{label} cannot exceed 100 characters"));
    }
    if !NAME_RE.is_match(value) {
        return Err(format!(
            "{label} can only contain letters, spaces, hyphens, and apostrophes"
        ));
    }
    Ok(value.to_string())
}

/// Phone number: digits, spaces, hyphens, parentheses, and plus only, max 20
/// characters. `label` is the lowercase field label, e.g. "phone number" or
/// "father's phone number".
pub fn phone(value: &str, label: &str) -> Result<String, String> {
    if !PHONE_RE.is_match(value) {
        return Err(format!("Invalid {label} format"));
    }
    if value.chars().count() > 20 {
        return Err(format!("{} cannot exceed 20 characters", capitalize(label)));
    }
    Ok(value.to_string())
}

/// Email address: trimmed, local@domain grammar, max 100 characters.
pub fn email(value: &str) -> Result<String, String> {
    let value = value.trim();
    if !value.validate_email() {
        return Err("Invalid email format".into());
    }
    if value.chars().count() > 100 {
        return Err("Email cannot exceed 100 characters".into());
    }
    Ok(value.to_string())
}

/// Closed-set membership. The message must name the allowed set.
pub fn one_of(value: &str, allowed: &[&str], message: &str) -> Result<String, String> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(message.into())
    }
}

/// Class name: non-empty, max 50 characters.
pub fn class_name(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("Class is required".into());
    }
    if value.chars().count() > 50 {
        return Err("Class name cannot exceed 50 characters".into());
    }
    Ok(value.to_string())
}

/// Free-text field with a maximum length only.
pub fn max_length(value: &str, max: usize, message: &str) -> Result<String, String> {
    if value.chars().count() > max {
        Err(message.into())
    } else {
        Ok(value.to_string())
    }
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn date(value: &str, message: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| message.into())
}

/// Date of birth: parseable, and the implied age must be 3..=25 years at
/// validation time. Age is a plain year difference, so the boundary ages 3
/// and 25 are accepted for any day within the boundary year.
pub fn date_of_birth(value: &str) -> Result<NaiveDate, String> {
    date_of_birth_at(value, Utc::now().date_naive())
}

pub fn date_of_birth_at(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let dob = date(value, "Invalid date format. Use YYYY-MM-DD")?;
    let age = today.year() - dob.year();
    if !(3..=25).contains(&age) {
        return Err("Student age must be between 3 and 25 years".into());
    }
    Ok(dob)
}

/// Admission date: parseable and not in the future.
pub fn admission_date(value: &str) -> Result<NaiveDate, String> {
    admission_date_at(value, Utc::now().date_naive())
}

pub fn admission_date_at(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let admitted = date(value, "Invalid admission date format. Use YYYY-MM-DD")?;
    if admitted > today {
        return Err("Admission date cannot be in the future".into());
    }
    Ok(admitted)
}

/// Roll number from the request body: positive integer, max 999.
pub fn roll_number(value: i64) -> Result<i32, String> {
    if value < 1 {
        return Err("Roll number must be positive".into());
    }
    if value > 999 {
        return Err("Roll number cannot exceed 999".into());
    }
    Ok(value as i32)
}

/// String-to-integer coercion for query and path values: must parse as a
/// positive integer.
pub fn positive_int(raw: &str, message: &str) -> Result<i64, String> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(message.into()),
    }
}

/// String-to-integer coercion with an inclusive bound.
pub fn bounded_int(raw: &str, min: i64, max: i64, message: &str) -> Result<i64, String> {
    match raw.trim().parse::<i64>() {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(message.into()),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
