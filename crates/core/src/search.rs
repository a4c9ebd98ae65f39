//! Local free-text filtering of loaded table rows.

use crate::slug::fold_diacritics;

/// Whether any of `fields` contains `query`, ignoring case and accents.
///
/// A blank query matches every row.
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = fold_diacritics(query.trim());
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| fold_diacritics(field).contains(&needle))
}

/// Keep the rows whose display fields match `query`.
pub fn filter_rows<'a, T, F>(rows: &'a [T], query: &str, fields: F) -> Vec<&'a T>
where
    F: Fn(&T) -> Vec<&str>,
{
    rows.iter()
        .filter(|row| matches_query(query, &fields(row)))
        .collect()
}
