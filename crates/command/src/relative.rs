/// Ellipsis cues that imply reliance on a previously stated item or unit
/// ("5 more", "another one", "same as before").
const RELATIVE_TERMS: &[&str] = &[
    "more",
    "another",
    "additional",
    "extra",
    "same",
    "again",
    "also",
    "too",
    "as well",
    "like before",
];

/// Case-insensitive substring check against the fixed ellipsis vocabulary.
///
/// Advisory only: a hit means context-based completion is worth attempting
/// even when confidence is otherwise low. It never alters merging logic.
pub fn contains_relative_term(fragment: &str) -> bool {
    let lower = fragment.to_lowercase();
    RELATIVE_TERMS.iter().any(|term| lower.contains(term))
}
