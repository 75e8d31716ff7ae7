//! Root `.gitignore` matching.
//!
//! Supports comments, `!` negation, `\` escapes, anchored patterns
//! (containing `/`), directory-only patterns (trailing `/`), bracket
//! classes, and the `*`, `?` and `**` wildcards. `**` is only special as a
//! whole path component; elsewhere it is a plain `*`. Later rules win.

use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    negated: bool,
    anchored: bool,
    dir_only: bool,
}

impl IgnoreRules {
    pub fn parse(text: &str) -> Self {
        let rules = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                let (negated, line) = match line.strip_prefix('!') {
                    Some(rest) => (true, rest),
                    None => (false, line),
                };
                let (dir_only, line) = match line.strip_suffix('/') {
                    Some(rest) => (true, rest),
                    None => (false, line),
                };
                let anchored = line.contains('/');
                Rule {
                    pattern: line.trim_start_matches('/').to_string(),
                    negated,
                    anchored,
                    dir_only,
                }
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a project-relative path is ignored, either itself or through
    /// an ignored parent directory.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let parts: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        (1..=parts.len()).any(|len| {
            let prefix = parts[..len].join("/");
            let prefix_is_dir = len < parts.len() || is_dir;
            self.matches(&prefix, &parts[len - 1], prefix_is_dir)
        })
    }

    fn matches(&self, path: &str, basename: &str, is_dir: bool) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            let hit = if rule.anchored {
                glob_match(&rule.pattern, path)
            } else {
                glob_match(&rule.pattern, basename)
            };
            if hit {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

/// One element of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    /// `?`
    AnyChar,
    /// `*`, never crossing `/`
    Star,
    /// `**/`, zero or more whole directories
    AnyDirs,
    /// Trailing `**`, everything that remains
    Rest,
    /// `[a-z]` or `[!a-z]`
    Class { negated: bool, ranges: Vec<(char, char)> },
}

fn compile(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                let run = chars[i..].iter().take_while(|c| **c == '*').count();
                let at_boundary = i == 0 || chars[i - 1] == '/';
                let next = chars.get(i + run);
                if run == 2 && at_boundary && next.is_none() {
                    tokens.push(Token::Rest);
                    i += 2;
                } else if run == 2 && at_boundary && next == Some(&'/') {
                    tokens.push(Token::AnyDirs);
                    i += 3;
                } else {
                    tokens.push(Token::Star);
                    i += run;
                }
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => match compile_class(&chars[i + 1..]) {
                Some((token, used)) => {
                    tokens.push(token);
                    i += used + 1;
                }
                None => {
                    tokens.push(Token::Literal('['));
                    i += 1;
                }
            },
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Literal(chars[i + 1]));
                i += 2;
            }
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    tokens
}

/// Parse the body of a bracket expression, returning the token and the
/// number of characters consumed including the closing `]`.
fn compile_class(chars: &[char]) -> Option<(Token, usize)> {
    let mut i = 0;
    let negated = matches!(chars.first(), Some('!' | '^'));
    if negated {
        i += 1;
    }
    let mut ranges = Vec::new();
    let body_start = i;
    loop {
        let c = *chars.get(i)?;
        if c == ']' && i > body_start {
            return Some((Token::Class { negated, ranges }, i + 1));
        }
        match (chars.get(i + 1), chars.get(i + 2)) {
            (Some('-'), Some(&hi)) if hi != ']' => {
                ranges.push((c, hi));
                i += 3;
            }
            _ => {
                ranges.push((c, c));
                i += 1;
            }
        }
    }
}

/// Match `pattern` against the whole of `text`.
///
/// Runs as a set-of-positions simulation, so `*` and `**` never backtrack.
fn glob_match(pattern: &str, text: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let len = text.len();
    let mut reach = vec![false; len + 1];
    reach[0] = true;

    for token in compile(pattern) {
        let mut next = vec![false; len + 1];
        match token {
            Token::Literal(_) | Token::AnyChar | Token::Class { .. } => {
                for pos in 0..len {
                    if reach[pos] && single(&token, text[pos]) {
                        next[pos + 1] = true;
                    }
                }
            }
            Token::Star => {
                let mut open = false;
                for pos in 0..=len {
                    open |= reach[pos];
                    next[pos] = open;
                    if text.get(pos) == Some(&'/') {
                        open = false;
                    }
                }
            }
            Token::AnyDirs => {
                let mut seen = false;
                for pos in 0..=len {
                    if seen && pos > 0 && text[pos - 1] == '/' {
                        next[pos] = true;
                    }
                    if reach[pos] {
                        next[pos] = true;
                        seen = true;
                    }
                }
            }
            Token::Rest => {
                let mut seen = false;
                for pos in 0..=len {
                    seen |= reach[pos];
                    next[pos] = seen;
                }
            }
        }
        if !next.contains(&true) {
            return false;
        }
        reach = next;
    }
    reach[len]
}

fn single(token: &Token, c: char) -> bool {
    match token {
        Token::Literal(expected) => c == *expected,
        Token::AnyChar => c != '/',
        Token::Class { negated, ranges } => {
            c != '/' && ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&c)) != *negated
        }
        _ => false,
    }
}
