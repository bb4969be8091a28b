//! Chilean RUT (Rol Único Tributario) handling.
//!
//! A RUT is a 7-8 digit body followed by a verifier character that is
//! either a digit or `k`, e.g. `12.345.678-5`.

use std::sync::OnceLock;

use regex::Regex;

static RUT_FORMAT: OnceLock<Regex> = OnceLock::new();

fn rut_format() -> &'static Regex {
    RUT_FORMAT.get_or_init(|| {
        Regex::new(r"^[0-9]{1,2}\.?[0-9]{3}\.?[0-9]{3}-[0-9kK]$").expect("valid RUT pattern")
    })
}

fn is_separator(c: char) -> bool {
    c == '.' || c == '-' || c.is_whitespace()
}

/// Compute the verifier character for a RUT body made of ASCII digits.
///
/// Weights 2..=7 cycle from the rightmost digit leftwards.
pub fn verifier_digit(body: &str) -> Option<char> {
    let mut sum = 0u32;
    let mut multiplier = 2u32;

    for c in body.chars().rev() {
        sum += c.to_digit(10)? * multiplier;
        multiplier = if multiplier == 7 { 2 } else { multiplier + 1 };
    }

    Some(match sum % 11 {
        0 => '0',
        1 => 'k',
        r => char::from_digit(11 - r, 10)?,
    })
}

/// Validate format and verifier digit.
pub fn validate_rut(rut: &str) -> bool {
    if !rut_format().is_match(rut) {
        return false;
    }

    let clean: String = rut.chars().filter(|c| *c != '.' && *c != '-').collect();
    let Some(dv) = clean.chars().last() else {
        return false;
    };
    let body = &clean[..clean.len() - dv.len_utf8()];

    verifier_digit(body) == Some(dv.to_ascii_lowercase())
}

/// Re-group a RUT as `XX.XXX.XXX-V`.
///
/// Values shorter than 8 characters after stripping separators are
/// returned stripped but otherwise untouched.
pub fn format_rut(rut: &str) -> String {
    let clean: Vec<char> = rut.chars().filter(|c| !is_separator(*c)).collect();
    if clean.len() < 8 {
        return clean.into_iter().collect();
    }

    let (body, dv) = clean.split_at(clean.len() - 1);
    let mut grouped = String::with_capacity(clean.len() + 4);
    for (i, c) in body.iter().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }
    grouped.push('-');
    grouped.push(dv[0]);
    grouped
}
