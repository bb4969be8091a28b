//! Field validators and aggregate patient payload validation.
//!
//! # Design Decisions
//! - Validators return booleans or a `ValidationResult`, never errors
//! - Aggregate validation collects every failing message, in a fixed order
//! - Messages are user-facing and shown verbatim as inline form errors

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::security::rut::validate_rut;

/// Maximum accepted email length, in UTF-16 code units.
pub const MAX_EMAIL_LEN: usize = 100;

pub const ERR_NOMBRE: &str = "El nombre debe tener al menos 2 caracteres";
pub const ERR_APELLIDO: &str = "El apellido debe tener al menos 2 caracteres";
pub const ERR_RUT: &str = "El RUT no es válido";
pub const ERR_CORREO: &str = "El email no es válido";
pub const ERR_TELEFONO: &str = "El teléfono no es válido";

static EMAIL: OnceLock<Regex> = OnceLock::new();
static PHONE: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

fn phone_pattern() -> &'static Regex {
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]{8,15}$").expect("valid phone pattern"))
}

/// Outcome of an aggregate validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Length as counted by browsers: characters outside the BMP count twice.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

pub fn validate_email(email: &str) -> bool {
    utf16_len(email) <= MAX_EMAIL_LEN && email_pattern().is_match(email)
}

/// Optional leading `+`, then 8 to 15 digits, spaces, hyphens or parentheses.
pub fn validate_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone)
}

/// A field counts as present unless it is missing, null, false, 0 or "".
fn present<'a>(data: &'a Value, field: &str) -> Option<&'a Value> {
    match data.get(field)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        v => Some(v),
    }
}

/// Text form of a scalar for pattern checks: strings as-is, numbers in
/// their decimal form. Anything else has no text form.
fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn has_min_len(value: Option<&Value>, min: usize) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| s.trim().chars().count() >= min)
}

/// Validate a patient ("cliente") payload.
///
/// Checks `nombre`, `apellido` and `rut` unconditionally, `correo` and
/// `telefono` only when present. All failures are reported.
pub fn validate_cliente_data(data: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    if !has_min_len(present(data, "nombre"), 2) {
        errors.push(ERR_NOMBRE.to_string());
    }

    if !has_min_len(present(data, "apellido"), 2) {
        errors.push(ERR_APELLIDO.to_string());
    }

    let rut_ok = present(data, "rut")
        .and_then(Value::as_str)
        .is_some_and(validate_rut);
    if !rut_ok {
        errors.push(ERR_RUT.to_string());
    }

    if let Some(correo) = present(data, "correo") {
        if !as_text(correo).is_some_and(|s| validate_email(&s)) {
            errors.push(ERR_CORREO.to_string());
        }
    }

    if let Some(telefono) = present(data, "telefono") {
        if !as_text(telefono).is_some_and(|s| validate_phone(&s)) {
            errors.push(ERR_TELEFONO.to_string());
        }
    }

    ValidationResult::from_errors(errors)
}
