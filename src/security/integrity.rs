//! Detection of injection attempts in raw input and submitted payloads.
//!
//! Detection only reports; cleaning is `sanitize`'s job.

use std::sync::OnceLock;

use regex::RegexSet;
use serde_json::Value;

static SUSPICIOUS: OnceLock<RegexSet> = OnceLock::new();
static MALICIOUS: OnceLock<RegexSet> = OnceLock::new();

fn suspicious_patterns() -> &'static RegexSet {
    SUSPICIOUS.get_or_init(|| {
        RegexSet::new([
            r"(?i)<script",
            r"(?i)javascript:",
            r"(?i-u)on[a-z0-9_]+=",
            r"(?i)eval\(",
            r"(?i)document\.",
            r"(?i)window\.",
            r"'.*[<>].*'",
            r#"".*[<>].*""#,
        ])
        .expect("valid suspicious input patterns")
    })
}

fn malicious_patterns() -> &'static RegexSet {
    MALICIOUS.get_or_init(|| {
        RegexSet::new([
            r"(?i)<script",
            r"(?i)javascript:",
            r"(?i-u)on[a-z0-9_]+=",
            r"(?i)data:text/html",
            r"(?i)vbscript:",
        ])
        .expect("valid payload integrity patterns")
    })
}

/// True when a raw field value looks like an injection attempt.
pub fn detect_suspicious_input(value: &str) -> bool {
    suspicious_patterns().is_match(value)
}

/// True when the serialized payload carries no script-bearing content.
pub fn check_data_integrity(data: &Value) -> bool {
    match serde_json::to_string(data) {
        Ok(json) => !malicious_patterns().is_match(&json),
        Err(_) => false,
    }
}
