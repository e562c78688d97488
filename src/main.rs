// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! A type-directed code generator for REST API metamodels.
//!
//! This binary parses `--model`/`--output`/`--target` into a
//! [`GeneratorConfig`](cli::GeneratorConfig), builds a `Model` (today, only
//! through the library's [`model::ModelBuilder`] API — a model-file DSL
//! parser is out of scope, spec.md §1), and runs the full emitter pipeline
//! through [`codegen::Orchestrator`].
//!
//! ## Module Overview
//!
//! - [`cli`] - configuration assembly and argument parsing
//! - [`codegen`] - the emission engine: emitters, Template Buffer, Orchestrator
//! - [`model`] - the Model Graph and its typestate builder
//! - [`names`] - the Name Calculator
//! - [`packages`] - the Packages Calculator
//! - [`reporter`] - shared error/warning collection
//! - [`types_calc`] - the Types Calculator

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod codegen;
pub mod infrastructure;
pub mod model;
pub mod names;
pub mod packages;
pub mod reporter;
pub mod types_calc;

use cli::{ConfigError, GeneratorConfig};
use codegen::language::TargetLanguage;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        tracing::error!(%e, "generator run failed");
        process::exit(1);
    }
}

fn run() -> Result<(), ConfigError> {
    let config = GeneratorConfig::from_args()?;

    // Model-file parsing is out of scope for this crate (spec.md §1): the
    // `--model` directory is validated above but nothing reads it here.
    // Callers that need real generation construct a `model::Model` through
    // `model::ModelBuilder` and drive `codegen::Orchestrator` directly.
    tracing::info!(
        model = %config.model_dir.as_path_buf().display(),
        output = %config.output_dir.as_path_buf().display(),
        target = config.target.id(),
        "configuration valid",
    );
    tracing::warn!("model-file parsing is not implemented; nothing to generate");

    Ok(())
}
