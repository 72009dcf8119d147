//! Naming utilities for schema_tidy
//!
//! The rewrite engine depends on this narrow surface only; the casing and
//! pluralization library stays an implementation detail of this module.

use inflector::Inflector;

/// Convert an identifier to camelCase (`user_id` -> `userId`).
pub fn to_camel(name: &str) -> String {
    name.to_camel_case()
}

/// Convert an identifier to PascalCase (`committee_member` -> `CommitteeMember`).
pub fn to_pascal(name: &str) -> String {
    name.to_pascal_case()
}

/// Whether a word is already in plural form.
///
/// Pluralizing an already-plural word leaves it unchanged, which is exactly
/// the check the engine needs to avoid double-pluralizing relation fields.
pub fn is_plural(word: &str) -> bool {
    word.to_plural() == word
}

/// Convert a word to its plural form.
pub fn pluralize(word: &str) -> String {
    word.to_plural()
}
