//! Name Calculator: maps [`Name`]s to target-language-legal identifiers.
//!
//! Every method is a pure function of its input name (and, for `private`,
//! of the reserved-word table), so that two runs over the same model
//! produce byte-identical renderings — the determinism property the
//! Orchestrator relies on (spec testable property 3/4).

use crate::names::nomenclature::Name;
use crate::names::reserved::ReservedWordTable;

/// A target-language identifier, already legal to emit verbatim.
pub type Identifier = String;

/// A target-language file path, relative to a package directory.
pub type FilePath = String;

/// The wire (JSON) rendering of a name.
pub type WireString = String;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Computes `Public`, `Private`, `File`, and `Tag` renderings of a [`Name`]
/// for one target language.
pub trait NameCalculator {
    /// The language's reserved-word table, consulted by `private`.
    fn reserved_words(&self) -> &dyn ReservedWordTable;

    /// The file extension this language's source files carry, without a
    /// leading dot (e.g. `"go"`).
    fn file_extension(&self) -> &str;

    /// Each word capitalized and concatenated: `IdentityProvider`.
    fn public(&self, name: &Name) -> Identifier {
        name.words().iter().map(|w| capitalize(w)).collect()
    }

    /// First word lowercase, the rest capitalized: `identityProvider`.
    /// If the result collides with a reserved word, an underscore is
    /// appended so the mapping stays total and deterministic.
    fn private(&self, name: &Name) -> Identifier {
        let mut words = name.words().iter();
        let mut out = match words.next() {
            Some(first) => first.clone(),
            None => String::new(),
        };
        for w in words {
            out.push_str(&capitalize(w));
        }
        if self.reserved_words().is_reserved(&out) {
            out.push('_');
        }
        out
    }

    /// Lowercase words joined by underscore, plus this language's file
    /// extension: `identity_provider.go`.
    fn file(&self, name: &Name) -> FilePath {
        format!("{}.{}", name.words().join("_"), self.file_extension())
    }

    /// Underscored lowercase: the wire format used in JSON field names.
    fn tag(&self, name: &Name) -> WireString {
        name.words().join("_")
    }
}
