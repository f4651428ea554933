//! Shared behavior for closed-set fields stored as text labels.

use thiserror::Error;

/// A stored label did not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {label:?}")]
pub struct UnknownChoice {
    /// Field the label belongs to.
    pub kind: &'static str,
    /// The offending label.
    pub label: String,
}

/// A closed set of variants with one canonical text label each.
pub trait Choice: Sized + Copy + 'static {
    /// Field name used in error messages.
    const KIND: &'static str;
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// The stored label.
    fn label(self) -> &'static str;

    /// Looks a variant up by its label.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownChoice`] when no variant carries `label`.
    fn from_label(label: &str) -> Result<Self, UnknownChoice> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label() == label)
            .ok_or_else(|| UnknownChoice { kind: Self::KIND, label: label.to_string() })
    }
}
