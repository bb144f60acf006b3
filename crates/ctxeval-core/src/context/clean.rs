//! Free-text cleaning.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Word characters, whitespace and basic punctuation survive
    static ref DISALLOWED: Regex = Regex::new(r"[^\w\s.,!?-]").unwrap();
}

/// Clean and normalize free text.
///
/// Collapses whitespace runs to a single space, strips characters other than
/// word characters, whitespace and `.,!?-`, then trims.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let stripped = DISALLOWED.replace_all(&collapsed, "");
    stripped.trim().to_string()
}
