//! Column Sanitizer - turns arbitrary header text into a safe identifier

/// Prefix for identifiers that would otherwise start with a digit or be empty.
pub const COLUMN_PREFIX: &str = "col_";

/// Map a header to a lowercase identifier made of `[a-z0-9_]`.
///
/// Steps: lower-case, replace anything outside `[a-z0-9_]` with `_`, trim
/// underscores at both ends, collapse underscore runs, then prefix a leading
/// digit with `col_`. A header with no usable characters yields an empty
/// string; the caller decides the fallback name.
///
/// Examples:
/// - "Full Name" -> "full_name"
/// - "3rd Col" -> "col_3rd_col"
/// - "__Total  (USD)__" -> "total_usd"
pub fn sanitize(header: &str) -> String {
    let replaced: String = header
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' { c } else { '_' })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.trim_matches('_').chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    if collapsed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{COLUMN_PREFIX}{collapsed}")
    } else {
        collapsed
    }
}

/// Name used for a header that sanitizes to nothing, by 1-based position.
pub fn fallback_name(position: usize) -> String {
    format!("{COLUMN_PREFIX}{position}")
}
