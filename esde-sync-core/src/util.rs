/// Format a byte count with fractional KB/MB/GB (e.g., "1.5 KB", "2.3 MB").
///
/// Used for copy totals in run summaries, where sizes are arbitrary.
pub fn format_bytes_approx(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Join category names (or any displayable list) for console output,
/// using `(none)` for an empty list.
pub fn join_or_none<T: AsRef<str>>(items: &[T]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
