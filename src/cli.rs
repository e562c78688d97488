//! Command-line interface: assembles a [`GeneratorConfig`] from process
//! arguments (spec.md §6's CLI surface). Parsing is hand-rolled
//! `env::args()` matching, the same style the base crate's own `cli.rs`
//! used — no argument-parsing crate is introduced. All path validation
//! happens here, once, at the system boundary; everything downstream
//! works with an already-validated [`GeneratorConfig`].

use crate::codegen::language::{self, Go, UnknownTargetLanguage};
use crate::infrastructure::types::{Directory, Exists, MaybeExists, PathBuilder, PathError, TypedPath};
use std::env;
use std::path::PathBuf;

/// Fully validated configuration for one generator run, built only through
/// [`GeneratorConfig::from_args`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory the model would be read from. The model-file DSL is out
    /// of scope for this crate (spec.md §1), so nothing reads this path
    /// yet; it is validated and carried so the flag has a stable meaning
    /// once a parser is wired in.
    pub model_dir: TypedPath<Directory, Exists>,
    /// Directory emitted source is written under. Need not exist yet; its
    /// parent must, so a typo in the output root is caught before any
    /// emitter runs.
    pub output_dir: TypedPath<Directory, MaybeExists>,
    /// The target language, concrete to `Go` in this implementation.
    pub target: Go,
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while assembling a [`GeneratorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required or malformed command-line arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// `--model` or `--output` named an invalid path.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// `--target` named a language this generator doesn't support.
    #[error(transparent)]
    UnknownTarget(#[from] UnknownTargetLanguage),
}

const USAGE: &str = "Usage: apimodel-codegen --model <dir> --output <dir> [--target <lang>]";

impl GeneratorConfig {
    /// Parses `std::env::args()` into a validated [`GeneratorConfig`].
    pub fn from_args() -> Result<Self> {
        Self::from_args_iter(env::args().skip(1))
    }

    /// Parses an arbitrary argument iterator (exposed so tests don't need
    /// a real process's `argv`).
    pub fn from_args_iter(args: impl Iterator<Item = String>) -> Result<Self> {
        let args: Vec<String> = args.collect();

        let mut model_dir = None;
        let mut output_dir = None;
        let mut target = "go".to_string();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--model" => {
                    let value = args
                        .get(i + 1)
                        .ok_or_else(|| ConfigError::InvalidArguments(format!("--model requires a value\n{USAGE}")))?;
                    model_dir = Some(PathBuf::from(value));
                    i += 2;
                }
                "--output" => {
                    let value = args
                        .get(i + 1)
                        .ok_or_else(|| ConfigError::InvalidArguments(format!("--output requires a value\n{USAGE}")))?;
                    output_dir = Some(PathBuf::from(value));
                    i += 2;
                }
                "--target" => {
                    let value = args
                        .get(i + 1)
                        .ok_or_else(|| ConfigError::InvalidArguments(format!("--target requires a value\n{USAGE}")))?;
                    target = value.clone();
                    i += 2;
                }
                other => {
                    return Err(ConfigError::InvalidArguments(format!(
                        "unrecognized argument `{other}`\n{USAGE}"
                    )));
                }
            }
        }

        let model_dir = model_dir.ok_or_else(|| ConfigError::InvalidArguments(format!("--model is required\n{USAGE}")))?;
        let output_dir =
            output_dir.ok_or_else(|| ConfigError::InvalidArguments(format!("--output is required\n{USAGE}")))?;

        let model_dir = PathBuilder::parse_input_directory(model_dir)?;
        let output_dir = PathBuilder::parse_output_directory(output_dir)?;
        let target = language::parse_target(&target)?;

        Ok(GeneratorConfig { model_dir, output_dir, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::language::TargetLanguage;

    fn args(items: &[&str]) -> impl Iterator<Item = String> {
        items.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn requires_model_and_output() {
        let err = GeneratorConfig::from_args_iter(args(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArguments(_)));
    }

    #[test]
    fn rejects_unknown_target() {
        let model = std::env::temp_dir();
        let err = GeneratorConfig::from_args_iter(args(&[
            "--model",
            model.to_str().unwrap(),
            "--output",
            "/tmp/does-not-need-to-exist-yet",
            "--target",
            "rust",
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget(_)));
    }

    #[test]
    fn rejects_nonexistent_model_directory() {
        let err = GeneratorConfig::from_args_iter(args(&[
            "--model",
            "/no/such/directory/apimodel_codegen_test",
            "--output",
            "/tmp/does-not-need-to-exist-yet",
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath(_)));
    }

    #[test]
    fn accepts_a_well_formed_invocation() {
        let model = std::env::temp_dir();
        let config = GeneratorConfig::from_args_iter(args(&[
            "--model",
            model.to_str().unwrap(),
            "--output",
            "/tmp/apimodel_codegen_test_output_dir",
        ]))
        .unwrap();
        assert_eq!(config.target.id(), "go");
    }
}
