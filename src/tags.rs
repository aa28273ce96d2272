//! Penn Treebank tag classes used by resolution.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Personal, possessive, wh- and possessive wh-pronoun tags
const PRONOUN_TAG_LIST: &[&str] = &["PRP", "PRP$", "WP", "WP$"];

/// The resolution pronoun tag set, built once on first use
pub static PRONOUN_TAGS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| PRONOUN_TAG_LIST.iter().copied().collect());

/// Check whether a POS tag marks a token as a substitution candidate
pub fn is_pronoun_tag(tag: &str) -> bool {
    PRONOUN_TAGS.contains(tag)
}
