use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every rewrite in the engine (selector replacements, import insertion,
/// registration entries) compiles down to a batch of these applied against
/// the exact text the spans were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("before-text verification failed at byte {byte_start}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in text of length {text_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        text_len: usize,
    },

    #[error("edits overlap at bytes {first_end} > {second_start}")]
    Overlap {
        second_start: usize,
        first_end: usize,
    },

    #[error("byte offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },
}

impl Edit {
    /// Create a replacement edit, verifying `expected_before` at apply time.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before),
        }
    }

    /// Create a zero-width insertion at `offset`.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset, offset, text, "")
    }

    /// Whether this edit removes text without inserting anything.
    pub fn is_removal(&self) -> bool {
        self.new_text.is_empty() && self.byte_end > self.byte_start
    }

    fn validate(&self, content: &str) -> Result<(), EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                text_len: content.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !content.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        let current = &content[self.byte_start..self.byte_end];
        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(())
    }

    /// Apply this single edit to `content`, returning the new text.
    pub fn apply(&self, content: &str) -> Result<String, EditError> {
        apply_batch(content, vec![self.clone()])
    }
}

/// Apply a batch of edits computed against the same `content`.
///
/// Edits are sorted by byte_start descending and spliced bottom-to-top so
/// earlier spans stay valid. All edits are verified before any is applied.
pub fn apply_batch(content: &str, mut edits: Vec<Edit>) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(content.to_string());
    }

    for edit in &edits {
        edit.validate(content)?;
    }

    edits.sort_by(|a, b| {
        b.byte_start
            .cmp(&a.byte_start)
            .then(b.byte_end.cmp(&a.byte_end))
    });

    // Sorted descending: earlier edit's end must not pass the later edit's start
    for window in edits.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        if earlier.byte_end > later.byte_start {
            return Err(EditError::Overlap {
                second_start: later.byte_start,
                first_end: earlier.byte_end,
            });
        }
    }

    let mut output = content.to_string();
    for edit in &edits {
        output.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
    }

    Ok(output)
}
