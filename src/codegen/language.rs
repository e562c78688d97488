//! Target-language plumbing. Spec.md treats "the target programming
//! language" as a parameter of the whole system; this crate keeps that
//! seam explicit via [`TargetLanguage`] even though only [`Go`] ships —
//! spec.md §1's stated non-goal is "generation for languages not in the
//! configured emitter set", and Go is the only language in that set here.

use crate::names::reserved::{GoReservedWords, ReservedWordTable};

/// Everything a calculator needs to know about one target language.
pub trait TargetLanguage {
    /// Short identifier used in CLI flags and diagnostics (`"go"`).
    fn id(&self) -> &'static str;

    /// The reserved-word table consulted by the Name Calculator.
    fn reserved_words(&self) -> &dyn ReservedWordTable;

    /// Source file extension, without a leading dot.
    fn file_extension(&self) -> &'static str;
}

/// Go, the only shipped target language.
#[derive(Debug, Clone, Copy, Default)]
pub struct Go;

impl TargetLanguage for Go {
    fn id(&self) -> &'static str {
        "go"
    }

    fn reserved_words(&self) -> &dyn ReservedWordTable {
        &GoReservedWords
    }

    fn file_extension(&self) -> &'static str {
        "go"
    }
}

/// `Go` doubles as its own [`crate::names::calculator::NameCalculator`]:
/// the two traits happen to need the same two facts about a language (its
/// reserved words, its file extension), so there is no separate
/// `GoNameCalculator` type to keep in sync with `Go` itself.
impl crate::names::calculator::NameCalculator for Go {
    fn reserved_words(&self) -> &dyn ReservedWordTable {
        TargetLanguage::reserved_words(self)
    }

    fn file_extension(&self) -> &str {
        TargetLanguage::file_extension(self)
    }
}

/// Parses a `--target` CLI flag into a [`TargetLanguage`].
///
/// # Errors
///
/// Returns [`UnknownTargetLanguage`] for anything other than `"go"`.
pub fn parse_target(id: &str) -> Result<Go, UnknownTargetLanguage> {
    match id {
        "go" => Ok(Go),
        other => Err(UnknownTargetLanguage(other.to_string())),
    }
}

/// Raised when `--target` names a language outside the configured emitter
/// set (spec.md §1 non-goals).
#[derive(Debug, thiserror::Error)]
#[error("unknown target language `{0}` (only `go` is configured)")]
pub struct UnknownTargetLanguage(pub String);
