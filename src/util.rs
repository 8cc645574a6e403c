//! Identifier quoting helpers

/// Remove the identifier quoting characters `[` and `]`.
pub fn strip_object_name_chars(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '[' | ']')).collect()
}

/// Wrap an identifier in brackets unless it is empty or already quoted.
pub fn bracket(name: &str) -> String {
    if name.is_empty() || name.starts_with('[') {
        name.to_string()
    } else {
        format!("[{}]", name)
    }
}
