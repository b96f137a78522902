use crate::models::Listing;

/// Build the lowercase text that skills and keywords are searched in
///
/// Title and description joined by a single space. Missing fields are
/// empty strings, so this never fails.
#[inline]
pub fn searchable_text(listing: &Listing) -> String {
    format!("{} {}", listing.title, listing.description).to_lowercase()
}

/// Case-insensitive substring check
#[inline]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Count how many terms occur in an already-lowercased text
#[inline]
pub fn count_matching_terms(lowercase_text: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|term| lowercase_text.contains(&term.to_lowercase()))
        .count()
}

/// Check a structured field target against a listing
///
/// Matches when the target appears in the field itself or anywhere in
/// the description.
#[inline]
pub fn matches_field_or_description(target: &str, field: &str, description: &str) -> bool {
    contains_ignore_case(field, target) || contains_ignore_case(description, target)
}
