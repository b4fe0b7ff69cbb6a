use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a client-supplied API key against the configured one.
///
/// A missing header never matches, even when the expected key is empty.
pub fn api_key_matches(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(key) if !expected.is_empty() => constant_time_compare(key, expected),
        _ => false,
    }
}
