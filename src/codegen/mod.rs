// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! The type-directed emission engine (spec.md §2): target-language
//! plumbing, the Template Buffer, the formatter collaborator, one module
//! per emitter kind, and the Orchestrator that drives them all.

pub mod buffer;
pub mod emit_builders;
pub mod emit_client;
pub mod emit_json;
pub mod emit_metadata;
pub mod emit_server;
pub mod emit_support;
pub mod emit_types;
pub mod formatter;
pub mod language;
pub mod orchestrator;

pub use buffer::{Bindings, EmitError, FileRegistry, TemplateBuffer, Value};
pub use emit_builders::BuildersEmitter;
pub use emit_client::ClientEmitter;
pub use emit_json::JsonEmitter;
pub use emit_metadata::MetadataEmitter;
pub use emit_server::ServerEmitter;
pub use emit_support::SupportEmitter;
pub use emit_types::TypesEmitter;
pub use formatter::{Formatter, GoFormatter};
pub use language::{Go, TargetLanguage};
pub use orchestrator::{GenerationError, Orchestrator};
