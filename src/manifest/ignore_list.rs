//! Line-oriented ignore files (`.gitignore`, `.npmignore`, ...).

/// Append `entry` (trimmed) unless a trimmed line already equals it.
///
/// ```
/// use uplift::manifest::add_ignore_entry;
///
/// assert_eq!(add_ignore_entry("", "/dist"), "/dist\n");
/// assert_eq!(add_ignore_entry("/dist\n", " /dist "), "/dist\n");
/// ```
pub fn add_ignore_entry(text: &str, entry: &str) -> String {
    let entry = entry.trim();
    if entry.is_empty() || text.lines().any(|line| line.trim() == entry) {
        return text.to_string();
    }
    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(entry);
    out.push('\n');
    out
}

/// Remove every line whose trimmed text equals `entry`.
///
/// Text without such a line is returned byte-identical.
pub fn remove_ignore_entry(text: &str, entry: &str) -> String {
    let entry = entry.trim();
    let total = text.lines().count();
    let kept: Vec<&str> = text.lines().filter(|line| line.trim() != entry).collect();
    if kept.len() == total {
        return text.to_string();
    }
    let mut out = kept.join("\n");
    if text.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_round_trip() {
        let once = add_ignore_entry("", "/dist");
        assert_eq!(once, "/dist\n");
        assert_eq!(add_ignore_entry(&once, "/dist"), "/dist\n");
        assert_eq!(add_ignore_entry("node_modules", "/dist"), "node_modules\n/dist\n");
    }

    #[test]
    fn remove_absent_entry_is_byte_identical() {
        let text = "node_modules\n/dist";
        assert_eq!(remove_ignore_entry(text, "/tmp"), text);
    }

    #[test]
    fn remove_every_matching_line() {
        assert_eq!(
            remove_ignore_entry("node_modules\n/dist\n  /dist  \n.cache\n", "/dist"),
            "node_modules\n.cache\n"
        );
        assert_eq!(remove_ignore_entry("/dist\n", "/dist"), "");
    }
}
