//! The analyzed Model Graph: services, versions, types, and resources,
//! held as a navigable, immutable-after-construction graph (spec.md §3).
//!
//! Constructed once by [`crate::model::builder::ModelBuilder`] and
//! thereafter treated as a read-only projection target for every
//! calculator in the crate (spec.md §3 "Lifecycle", §5).

use indexmap::IndexMap;

use crate::model::resource::Resource;
use crate::model::types::{Declaration, Type, TypeRef};
use crate::names::nomenclature::Name;

/// One API version: owns an ordered set of type declarations and
/// resources, and designates exactly one of those resources as the root
/// (spec.md invariant 5).
#[derive(Debug, Clone)]
pub struct Version {
    pub name: Name,
    types: IndexMap<Name, Declaration>,
    resources: IndexMap<Name, Resource>,
    root_resource: Name,
}

impl Version {
    pub(crate) fn new(
        name: Name,
        types: IndexMap<Name, Declaration>,
        resources: IndexMap<Name, Resource>,
        root_resource: Name,
    ) -> Self {
        Self {
            name,
            types,
            resources,
            root_resource,
        }
    }

    /// Declarations (Enums and Structs) in declaration order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.types.values()
    }

    pub fn declaration(&self, name: &Name) -> Option<&Declaration> {
        self.types.get(name)
    }

    /// Resources in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn resource(&self, name: &Name) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// The Version's single root Resource (spec.md invariant 5).
    pub fn root_resource(&self) -> &Resource {
        self.resources
            .get(&self.root_resource)
            .expect("root_resource name is validated to exist at construction")
    }

    /// Resolves a [`TypeRef`] to its fully resolved [`Type`], following
    /// `Named` references into this Version's declaration table and
    /// leaving `List`/`Map` element references unresolved until the
    /// caller asks for them (spec.md §9 "Cyclic references").
    pub fn resolve<'a>(&'a self, type_ref: &'a TypeRef) -> Option<Type<'a>> {
        match type_ref {
            TypeRef::Scalar(s) => Some(Type::Scalar(*s)),
            TypeRef::Named(name) => match self.types.get(name)? {
                Declaration::Enum(e) => Some(Type::Enum(e)),
                Declaration::Struct(s) => Some(Type::Struct(s)),
            },
            TypeRef::List(elem) => Some(Type::List(elem)),
            TypeRef::Map(elem) => Some(Type::Map(elem)),
        }
    }
}

/// A named API product: owns an ordered set of [`Version`]s.
#[derive(Debug, Clone)]
pub struct Service {
    pub name: Name,
    versions: IndexMap<Name, Version>,
}

impl Service {
    pub(crate) fn new(name: Name, versions: IndexMap<Name, Version>) -> Self {
        Self { name, versions }
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.versions.values()
    }

    pub fn version(&self, name: &Name) -> Option<&Version> {
        self.versions.get(name)
    }
}

/// The root of the Model Graph: owns an ordered set of [`Service`]s.
#[derive(Debug, Clone)]
pub struct Model {
    services: IndexMap<Name, Service>,
}

impl Model {
    pub(crate) fn new(services: IndexMap<Name, Service>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn service(&self, name: &Name) -> Option<&Service> {
        self.services.get(name)
    }
}
