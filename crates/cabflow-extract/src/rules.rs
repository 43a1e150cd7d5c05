//! Ordered-pattern field rules.
//!
//! Every extracted field is defined as an ordered list of regular
//! expressions. The first pattern that matches wins and later patterns are
//! never consulted — there is no merging across patterns for one field.

use regex::Regex;

/// One pattern in a field's ordered rule list. Capture group 1 is the value.
pub struct FieldRule {
    pattern: Regex,
}

/// Compiles an ordered rule list from pattern strings.
///
/// # Panics
///
/// Panics if a pattern is not a valid regular expression; rule tables are
/// compile-time constants, so this is a programming error.
#[must_use]
pub fn rules(patterns: &[&str]) -> Vec<FieldRule> {
    patterns
        .iter()
        .map(|p| FieldRule {
            pattern: Regex::new(p).expect("valid field pattern"),
        })
        .collect()
}

/// Runs an ordered rule list against `text`; the first match wins.
#[must_use]
pub fn first_match(rule_list: &[FieldRule], text: &str) -> Option<String> {
    first_match_where(rule_list, text, |_| true)
}

/// Like [`first_match`], but a captured value must also satisfy `accept`.
///
/// A rejected capture does not fail the field: later matches of the same
/// pattern and later patterns are still tried in order.
#[must_use]
pub fn first_match_where<F>(rule_list: &[FieldRule], text: &str, accept: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    for rule in rule_list {
        for captures in rule.pattern.captures_iter(text) {
            if let Some(value) = captures.get(1) {
                let trimmed = value.as_str().trim();
                if !trimmed.is_empty() && accept(trimmed) {
                    return Some(trimmed.to_owned());
                }
            }
        }
    }
    None
}
