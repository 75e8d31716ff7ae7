//! Thread-local caches for parsed selectors and compiled ast-grep patterns.
//!
//! A migration evaluates the same handful of selectors against every file of
//! a project, so each selector string is parsed once per thread. Both caches
//! are capped at 256 entries; when full they are cleared and rebuilt on
//! demand.

use crate::query::errors::{QueryError, SelectorError};
use crate::query::selector::Selector;
use crate::syntax::SourceLang;
use ast_grep_core::Pattern;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    static SELECTOR_CACHE: RefCell<HashMap<String, Selector>> = RefCell::new(HashMap::new());

    // Keyed by "<lang>:<pattern>": the same pattern text parses differently
    // per grammar.
    static PATTERN_CACHE: RefCell<HashMap<String, Pattern>> = RefCell::new(HashMap::new());
}

/// Get a parsed selector from cache, or parse and cache it.
pub fn get_or_parse_selector(selector: &str) -> Result<Selector, SelectorError> {
    SELECTOR_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(parsed) = cache.get(selector) {
            return Ok(parsed.clone());
        }
        let parsed: Selector = selector.parse()?;
        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(selector.to_string(), parsed.clone());
        Ok(parsed)
    })
}

/// Get a compiled ast-grep pattern from cache, or compile and cache it.
pub fn get_or_compile_pattern(pattern: &str, lang: SourceLang) -> Result<Pattern, QueryError> {
    let cache_key = format!("{lang:?}:{pattern}");

    PATTERN_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(compiled) = cache.get(&cache_key) {
            return Ok(compiled.clone());
        }
        let compiled = Pattern::try_new(pattern, lang.support_lang()).map_err(|err| {
            QueryError::InvalidPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            }
        })?;
        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(cache_key, compiled.clone());
        Ok(compiled)
    })
}

/// Clear both caches (mainly for testing).
pub fn clear_cache() {
    SELECTOR_CACHE.with(|cache| cache.borrow_mut().clear());
    PATTERN_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of cached selectors and patterns.
pub fn cache_size() -> usize {
    SELECTOR_CACHE.with(|cache| cache.borrow().len())
        + PATTERN_CACHE.with(|cache| cache.borrow().len())
}
