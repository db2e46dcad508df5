use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static MENTION: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"@([A-Za-z0-9_]+)").ok());

/// Distinct `@name` tokens in `text`, without the `@`. Names are ASCII
/// word characters and matching is case-sensitive.
pub fn extract_mentions(text: &str) -> BTreeSet<String> {
    let Some(pattern) = MENTION.as_ref() else {
        return BTreeSet::new();
    };
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
