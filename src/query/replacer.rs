use crate::edit::{self, Edit};
use crate::query::matcher::{find_all, Match};
use crate::query::selector::Selector;
use crate::syntax::{validate_edit, SourceLang, SyntaxTree};
use std::ops::Range;
use tracing::{debug, warn};

/// Rewrite every match of `selector` in `source`.
///
/// `produce` is called for each match in document order; `None` leaves the
/// match untouched. Matches nested inside an already accepted replacement
/// are skipped. When every accepted replacement is empty, separators left
/// dangling in comma-separated lists are cleaned up.
///
/// Never fails: if the input does not parse, the edits are inconsistent, or
/// the output has more syntax errors than the input, the input is returned
/// unchanged and a warning is logged.
pub fn replace_matches<F>(source: &str, lang: SourceLang, selector: &Selector, mut produce: F) -> String
where
    F: FnMut(&Match<'_>) -> Option<String>,
{
    let tree = match SyntaxTree::parse(source, lang) {
        Ok(tree) => tree,
        Err(err) => {
            warn!(%err, %selector, "cannot parse input, leaving it unchanged");
            return source.to_string();
        }
    };

    let mut accepted: Vec<(Range<usize>, String)> = Vec::new();
    for m in find_all(&tree, selector) {
        if accepted
            .last()
            .is_some_and(|(span, _)| m.byte_start < span.end)
        {
            debug!(kind = m.kind(), start = m.byte_start, "skipping match nested in a replacement");
            continue;
        }
        if let Some(text) = produce(&m) {
            accepted.push((m.byte_start..m.byte_end, text));
        }
    }

    if accepted.is_empty() {
        return source.to_string();
    }

    let removal_only = accepted.iter().all(|(_, text)| text.is_empty());
    let edits = accepted
        .iter()
        .map(|(span, text)| Edit::new(span.start, span.end, text.as_str(), &source[span.clone()]))
        .collect();

    let mut output = match edit::apply_batch(source, edits) {
        Ok(output) => output,
        Err(err) => {
            warn!(%err, %selector, "inconsistent replacements, leaving input unchanged");
            return source.to_string();
        }
    };

    if removal_only {
        let mut removed = 0;
        let points: Vec<usize> = accepted
            .iter()
            .map(|(span, _)| {
                let point = span.start - removed;
                removed += span.len();
                point
            })
            .collect();
        output = clean_separators(&output, &points);
    }

    if let Err(err) = validate_edit(&tree, &output) {
        warn!(%err, %selector, "replacement breaks the file, leaving input unchanged");
        return source.to_string();
    }

    output
}

/// Remove separators orphaned at removal points (offsets into `text`,
/// ascending).
fn clean_separators(text: &str, points: &[usize]) -> String {
    let mut out = text.to_string();

    for &point in points.iter().rev() {
        let point = point.min(out.len());
        let left = out[..point]
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_whitespace());
        let right = out[point..]
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(idx, c)| (point + idx, c));

        match (left, right) {
            // `a, <removed> , b` keeps one comma
            (Some((l, ',')), Some((r, ','))) => out.replace_range(l + 1..r + 1, ""),
            // `[ <removed> , b` drops the comma and the gap before `b`
            (Some((_, '[' | '(' | '{')), Some((r, ','))) => {
                let next = out[r + 1..]
                    .char_indices()
                    .find(|(_, c)| !c.is_whitespace())
                    .map_or(out.len(), |(idx, _)| r + 1 + idx);
                out.replace_range(point..next, "");
            }
            // `a , <removed> ]`
            (Some((l, ',')), Some((_, ']' | ')' | '}'))) => out.replace_range(l..point, ""),
            _ => {}
        }
    }

    out
}
