// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! The Model Graph: the in-memory analyzed model of services, versions,
//! types, resources, and methods (spec.md §3). Populated once by
//! [`builder::ModelBuilder`] (standing in for the external model-file
//! lexer/parser, which is out of scope for this crate) and thereafter
//! treated as immutable by every calculator and emitter.

pub mod builder;
pub mod graph;
pub mod resource;
pub mod types;

pub use builder::{ModelBuilder, ModelError, ModelErrors, ServiceBuilder, VersionBuilder};
pub use graph::{Model, Service, Version};
pub use resource::{DefaultValue, Direction, Locator, Method, MethodKind, Parameter, Resource};
pub use types::{Attribute, Declaration, Enum, EnumValue, Scalar, Struct, Type, TypeRef};
