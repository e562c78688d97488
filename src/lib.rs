// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! A type-directed code generator for REST API metamodels.
//!
//! Given a Model Graph describing services, versions, resources, and their
//! types, this crate emits typed Go source: types, builders, JSON
//! readers/writers, an HTTP server dispatch adapter, and an HTTP client SDK.
//! The generator itself does not parse a model-file DSL or invoke the Go
//! toolchain; callers assemble a [`model::Model`] through
//! [`model::ModelBuilder`] and drive the whole pipeline through
//! [`codegen::Orchestrator`].

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

/// The version of this generator, reported by `--version` and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line interface: configuration assembly and argument parsing.
pub mod cli;

/// The type-directed emission engine: emitters, the Template Buffer, the
/// Formatter collaborator, and the Orchestrator that drives them all.
pub mod codegen;

/// Type-safety helpers shared by the CLI and the Model Graph.
pub mod infrastructure;

/// The Model Graph: services, versions, resources, types, and the
/// typestate builder API used to construct one.
pub mod model;

/// Name Calculator: the language-specific naming contract (spec.md §4.2).
pub mod names;

/// Packages Calculator: output package/path layout (spec.md §4.3).
pub mod packages;

/// Shared error/warning collection used by every component (spec.md §4.8).
pub mod reporter;

/// Types Calculator: reference-form selection for attributes and
/// parameters (spec.md §4.4).
pub mod types_calc;
