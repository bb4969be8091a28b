//! Input sanitization for free-text form fields.
//!
//! # Responsibilities
//! - Strip markup delimiters (`<`, `>`)
//! - Strip `javascript:` URL schemes
//! - Strip inline event handler attributes (`onclick=`, `onload=`, ...)
//! - Recurse through arrays and objects, preserving their shape
//!
//! # Design Decisions
//! - Removal, not encoding: values are stored already cleaned
//! - Removals repeat until the string is stable, so output never contains
//!   a pattern that a single pass would have re-assembled
//! - Never fails; non-string leaves pass through untouched

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

struct Patterns {
    angle_brackets: Regex,
    javascript_scheme: Regex,
    event_handler: Regex,
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        angle_brackets: Regex::new(r"[<>]").expect("valid angle bracket pattern"),
        javascript_scheme: Regex::new(r"(?i-u)javascript:").expect("valid scheme pattern"),
        event_handler: Regex::new(r"(?i-u)on[a-z0-9_]+=").expect("valid event handler pattern"),
    })
}

/// Clean a single string.
pub fn sanitize_str(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let p = patterns();
    let mut current = input.to_string();

    loop {
        let next = {
            let stripped = p.angle_brackets.replace_all(&current, "");
            let stripped = p.javascript_scheme.replace_all(&stripped, "");
            p.event_handler.replace_all(&stripped, "").into_owned()
        };

        if next == current {
            break;
        }
        current = next;
    }

    current.trim().to_string()
}

/// Clean every string reachable inside `input`.
///
/// Arrays keep their order and length, objects keep all of their keys.
pub fn sanitize_input(input: Value) -> Value {
    match input {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_input).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize_input(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Escape text so it renders literally when inserted into HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
