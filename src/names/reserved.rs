//! Reserved-word table: avoids collisions between target-language-legal
//! names and the target language's own keywords and predeclared
//! identifiers.

/// Go's reserved keywords (cannot be used as identifiers under any
/// circumstance) plus the predeclared identifiers most likely to shadow a
/// generated field or method name in confusing ways.
const GO_KEYWORDS: &[&str] = &[
    "break", "default", "func", "interface", "select", "case", "defer", "go", "map", "struct",
    "chan", "else", "goto", "package", "switch", "const", "fallthrough", "if", "range", "type",
    "continue", "for", "import", "return", "var",
];

const GO_PREDECLARED: &[&str] = &[
    "bool", "byte", "complex64", "complex128", "error", "float32", "float64", "int", "int8",
    "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64",
    "uintptr", "true", "false", "iota", "nil", "append", "cap", "close", "complex", "copy",
    "delete", "imag", "len", "make", "new", "panic", "print", "println", "real", "recover",
];

/// Table of words a target language reserves, consulted by the Name
/// Calculator before emitting a private identifier.
pub trait ReservedWordTable {
    /// Returns `true` if `word` cannot be used as an unqualified identifier.
    fn is_reserved(&self, word: &str) -> bool;
}

/// Go's reserved-word table: keywords plus predeclared identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoReservedWords;

impl ReservedWordTable for GoReservedWords {
    fn is_reserved(&self, word: &str) -> bool {
        GO_KEYWORDS.contains(&word) || GO_PREDECLARED.contains(&word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_keywords_and_predeclared_identifiers() {
        let table = GoReservedWords;
        assert!(table.is_reserved("type"));
        assert!(table.is_reserved("func"));
        assert!(table.is_reserved("string"));
        assert!(table.is_reserved("len"));
        assert!(!table.is_reserved("identity"));
    }
}
