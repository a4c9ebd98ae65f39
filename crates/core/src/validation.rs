//! Field-level validation helpers shared by every entity input.
//!
//! Each helper returns [`CoreError::InvalidField`] naming the offending
//! field so both the service and the console can attach the message to it.

use validator::{ValidateEmail, ValidateUrl};

use crate::error::CoreError;

/// Trim `value` and reject it when nothing is left.
pub fn require_text(field: &'static str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid(field, "Ce champ est obligatoire."));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional value, mapping blank input to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a user-typed number. Accepts a decimal comma.
pub fn parse_number(field: &'static str, raw: &str) -> Result<f64, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::invalid(field, "Ce champ est obligatoire."));
    }
    let value: f64 = raw
        .replace(',', ".")
        .parse()
        .map_err(|_| CoreError::invalid(field, "Veuillez saisir un nombre valide."))?;
    require_finite(field, value)
}

/// Parse an optional user-typed number; blank input is `None`.
pub fn parse_optional_number(field: &'static str, raw: &str) -> Result<Option<f64>, CoreError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_number(field, raw).map(Some)
}

/// Parse a user-typed whole number.
pub fn parse_integer(field: &'static str, raw: &str) -> Result<i64, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::invalid(field, "Ce champ est obligatoire."));
    }
    raw.parse()
        .map_err(|_| CoreError::invalid(field, "Veuillez saisir un nombre entier."))
}

pub fn require_finite(field: &'static str, value: f64) -> Result<f64, CoreError> {
    if !value.is_finite() {
        return Err(CoreError::invalid(field, "Veuillez saisir un nombre valide."));
    }
    Ok(value)
}

pub fn require_non_negative(field: &'static str, value: f64) -> Result<f64, CoreError> {
    let value = require_finite(field, value)?;
    if value < 0.0 {
        return Err(CoreError::invalid(field, "La valeur doit être positive ou nulle."));
    }
    Ok(value)
}

/// Reject values outside `[min, max]` (inclusive).
pub fn require_in_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, CoreError> {
    let value = require_finite(field, value)?;
    if value < min || value > max {
        return Err(CoreError::invalid(
            field,
            format!("La valeur doit être comprise entre {min} et {max}."),
        ));
    }
    Ok(value)
}

pub fn require_email(field: &'static str, value: &str) -> Result<String, CoreError> {
    let email = require_text(field, value)?.to_lowercase();
    if !email.validate_email() {
        return Err(CoreError::invalid(field, "Adresse e-mail invalide."));
    }
    Ok(email)
}

/// Require an absolute `http`/`https` URL.
pub fn require_http_url(field: &'static str, value: &str) -> Result<String, CoreError> {
    let url = require_text(field, value)?;
    let lower = url.to_lowercase();
    let has_scheme = lower.starts_with("http://") || lower.starts_with("https://");
    if !has_scheme || !url.validate_url() {
        return Err(CoreError::invalid(
            field,
            "Veuillez saisir une URL valide (http ou https).",
        ));
    }
    Ok(url)
}
