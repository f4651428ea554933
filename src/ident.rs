//! External identifier format: a fixed prefix followed by zero-padded digits.
//!
//! Parsing and formatting are pure so the edge cases (foreign prefixes,
//! non-digit suffixes, values wider than the padding) can be checked without
//! a datastore.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest padding width accepted. Any `u64` fits in 20 digits; 18 keeps
/// formatted values comfortably inside SQLite's TEXT affinity rules.
pub const MAX_WIDTH: usize = 18;

/// A human-facing identifier such as `EMP0042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    /// Wraps an identifier read back from storage.
    ///
    /// No format check is applied: stored values may predate the current
    /// prefix, and the allocator treats those through its fallback path.
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrows the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a prior identifier could not yield a numeric suffix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The identifier does not start with the expected prefix.
    #[error("identifier {raw:?} does not start with prefix {prefix:?}")]
    MissingPrefix {
        /// The identifier text.
        raw: String,
        /// The prefix that was expected.
        prefix: String,
    },
    /// Nothing follows the prefix.
    #[error("identifier {raw:?} has no numeric suffix")]
    EmptySuffix {
        /// The identifier text.
        raw: String,
    },
    /// The suffix contains something other than ASCII digits.
    #[error("identifier {raw:?} has a non-numeric suffix")]
    InvalidDigits {
        /// The identifier text.
        raw: String,
    },
    /// The suffix does not fit in a `u64`.
    #[error("identifier {raw:?} has a suffix too large to increment")]
    Overflow {
        /// The identifier text.
        raw: String,
    },
}

/// Rejected prefix/width combinations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Prefix is empty.
    #[error("identifier prefix must not be empty")]
    EmptyPrefix,
    /// Prefix contains a digit, which would make suffix parsing ambiguous.
    #[error("identifier prefix {0:?} must not contain digits")]
    DigitInPrefix(String),
    /// Width is zero or above [`MAX_WIDTH`].
    #[error("identifier width {0} must be between 1 and {MAX_WIDTH}")]
    Width(usize),
}

/// Prefix and padding width for one identifier sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFormat {
    prefix: String,
    width: usize,
}

impl IdFormat {
    /// Builds a format after checking the prefix and width.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the prefix is empty or contains digits,
    /// or the width is outside `1..=MAX_WIDTH`.
    pub fn new(prefix: impl Into<String>, width: usize) -> Result<Self, FormatError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(FormatError::EmptyPrefix);
        }
        if prefix.chars().any(|c| c.is_ascii_digit()) {
            return Err(FormatError::DigitInPrefix(prefix));
        }
        if width == 0 || width > MAX_WIDTH {
            return Err(FormatError::Width(width));
        }
        Ok(Self { prefix, width })
    }

    /// The identifier prefix, e.g. `EMP`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The minimum number of digits after the prefix.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Renders `value` with zero padding. Values wider than the padding are
    /// written in full, never truncated.
    #[must_use]
    pub fn format(&self, value: u64) -> ExternalId {
        ExternalId(format!("{}{value:0width$}", self.prefix, width = self.width))
    }

    /// Extracts the numeric suffix of an identifier in this format.
    ///
    /// The suffix may be wider than the padding (`EMP10000` parses as
    /// 10000), but must consist only of ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for a foreign prefix, an empty or non-numeric
    /// suffix, or a suffix that overflows `u64`.
    pub fn parse_suffix(&self, raw: &str) -> Result<u64, ParseError> {
        let digits = raw.strip_prefix(self.prefix.as_str()).ok_or_else(|| {
            ParseError::MissingPrefix { raw: raw.to_string(), prefix: self.prefix.clone() }
        })?;
        if digits.is_empty() {
            return Err(ParseError::EmptySuffix { raw: raw.to_string() });
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidDigits { raw: raw.to_string() });
        }
        digits.parse::<u64>().map_err(|_| ParseError::Overflow { raw: raw.to_string() })
    }
}

impl Default for IdFormat {
    fn default() -> Self {
        Self { prefix: "EMP".to_string(), width: 4 }
    }
}
