//! Stem handling: splitting file names and building comparison keys.

/// Split a file name into `(stem, extension)`.
///
/// The extension is everything after the last dot, without the dot. A
/// leading dot does not start an extension (`.hidden` has no extension),
/// matching `Path::file_stem` semantics.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => (&file_name[..pos], &file_name[pos + 1..]),
        _ => (file_name, ""),
    }
}

/// Map a stem to the key used by the normalized matching tier.
///
/// Lowercases, turns every character outside ASCII letters and digits into a
/// separator, collapses separator runs and trims them from both ends. Only
/// ASCII rules are applied so the key never depends on locale:
///
/// `"Zelda: Link's Awakening (USA)"` → `"zelda link s awakening usa"`
pub fn normalize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut pending_sep = false;

    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push(' ');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    out
}

/// ASCII case-insensitive check that `prefix` starts `s`. Non-ASCII
/// letters must match exactly.
pub(crate) fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Length in characters of the ASCII case-insensitive common prefix of two
/// stems.
pub(crate) fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x.eq_ignore_ascii_case(y))
        .count()
}
