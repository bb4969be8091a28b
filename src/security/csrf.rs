//! Anti-forgery tokens.
//!
//! Tokens are opaque: 32 bytes from the OS CSPRNG rendered as lowercase
//! hex. Storage and lifetime belong to the caller (one per session).

use std::fmt::Write;

use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a token.
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Generate a fresh 64-character hex token.
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; CSRF_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    bytes.iter().fold(
        String::with_capacity(CSRF_TOKEN_BYTES * 2),
        |mut out, byte| {
            let _ = write!(out, "{:02x}", byte);
            out
        },
    )
}

/// Compare a presented token against the expected one in constant time.
///
/// Empty tokens never verify.
pub fn verify_csrf_token(expected: &str, presented: &str) -> bool {
    !expected.is_empty() && constant_time_eq(expected, presented)
}

/// Equality whose running time depends only on the lengths involved.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
