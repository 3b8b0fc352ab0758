//! Statement splitting over normalized SQL
//!
//! Only valid on [`normalize`](crate::normalize) output: literal content that
//! could hide a `;` has already been removed.

/// Split normalized SQL on `;` into trimmed, non-empty statements
pub fn split_statements(normalized: &str) -> Vec<&str> {
    normalized
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .collect()
}
