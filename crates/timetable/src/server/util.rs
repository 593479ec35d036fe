//! Small helpers shared by the endpoint handlers.

use regex::Regex;
use std::sync::OnceLock;

/// Codes and usernames: alphanumeric with interior `_`/`-`, 2..=32 chars.
pub fn is_valid_code(code: &str) -> bool {
    static CODE_RE: OnceLock<Regex> = OnceLock::new();
    let re = CODE_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{1,31}$").unwrap());
    re.is_match(code)
}
