/// Drop `@import`, `@use` and `@forward` lines that reference `needle`.
///
/// ```
/// use uplift::manifest::strip_stylesheet_references;
///
/// let scss = "@use 'sass:math';\n@import '~@acme/legacy-theme/theme';\nbody { margin: 0; }\n";
/// assert_eq!(
///     strip_stylesheet_references(scss, "@acme/legacy-theme"),
///     "@use 'sass:math';\nbody { margin: 0; }\n"
/// );
/// ```
pub fn strip_stylesheet_references(text: &str, needle: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| {
            let trimmed = line.trim_start();
            let is_rule = ["@import", "@use", "@forward"]
                .iter()
                .any(|rule| trimmed.starts_with(rule));
            !(is_rule && trimmed.contains(needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_unrelated_rules() {
        let text = "@import 'other';\n.a { content: '@acme/legacy-theme'; }";
        assert_eq!(strip_stylesheet_references(text, "@acme/legacy-theme"), text);
    }

    #[test]
    fn is_idempotent() {
        let text = "  @forward \"@acme/legacy-theme\";\n@use 'x';\n";
        let once = strip_stylesheet_references(text, "@acme/legacy-theme");
        assert_eq!(once, "@use 'x';\n");
        assert_eq!(strip_stylesheet_references(&once, "@acme/legacy-theme"), once);
    }
}
