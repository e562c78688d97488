//! Construction API for the Model Graph.
//!
//! The model-file lexer/parser is an external collaborator, out of scope
//! for this crate (spec.md §1) — but the Model Graph still needs *some*
//! seam an external parser (or a test) calls to populate it. This module
//! is that seam: a typestate builder, grounded in the same pattern the
//! base crate used for `EntityRegistry<W, C, E, P, Q, A>`, generalized
//! from "which entity kinds have been added" to "has this Version's
//! required root Resource been set" (spec.md invariant 5), which is the
//! one structural rule this crate can usefully enforce at compile time.
//! The rest of spec.md §3's invariants (name uniqueness, type-reference
//! resolution, the `link` restriction, locator targets) depend on the
//! fully assembled graph and are therefore checked at [`ModelBuilder::build`]
//! time, accumulating one [`ModelError`] per violation rather than
//! failing on the first (spec.md §7: "reported per occurrence").

use std::marker::PhantomData;

use indexmap::IndexMap;
use thiserror::Error;

use crate::model::graph::{Model, Service, Version};
use crate::model::resource::{Locator, MethodKind, Resource};
use crate::model::types::{Declaration, Enum, Struct, Type, TypeRef};
use crate::names::nomenclature::Name;

/// Errors raised while assembling or validating a Model Graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate {kind} name `{name}` in {scope}")]
    DuplicateName {
        kind: &'static str,
        name: String,
        scope: String,
    },

    #[error("type reference `{reference}` in {scope} does not resolve to a type in the same version or a built-in scalar")]
    UnresolvedTypeRef { reference: String, scope: String },

    #[error("attribute `{attribute}` on struct `{struct_name}` is marked `link` but is not list- or struct-typed")]
    LinkOnNonContainer {
        struct_name: String,
        attribute: String,
    },

    #[error("locator `{locator}` on resource `{resource}` targets unknown resource `{target}`")]
    UnknownLocatorTarget {
        resource: String,
        locator: String,
        target: String,
    },

    #[error("version `{version}` declares root resource `{root}` which was never added")]
    MissingRootResource { version: String, root: String },
}

/// All structural errors accumulated validating one Model Graph.
#[derive(Debug, Error)]
#[error("model has {} structural error(s)", .0.len())]
pub struct ModelErrors(pub Vec<ModelError>);

/// Typestate marker: a Version under construction has no root Resource yet.
pub struct NoRoot;
/// Typestate marker: a Version under construction has its root Resource.
pub struct HasRoot;

fn display_name(n: &Name) -> String {
    n.words().join("_")
}

/// Builds one [`Version`]: its type declarations, non-root resources, and
/// exactly one root resource.
pub struct VersionBuilder<R> {
    name: Name,
    types: IndexMap<Name, Declaration>,
    resources: IndexMap<Name, Resource>,
    root_resource: Option<Name>,
    _phantom: PhantomData<R>,
}

impl VersionBuilder<NoRoot> {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            types: IndexMap::new(),
            resources: IndexMap::new(),
            root_resource: None,
            _phantom: PhantomData,
        }
    }

    /// Adds the Version's root Resource, and moves the builder into the
    /// `HasRoot` typestate, after which `add_resource` becomes available
    /// and this method is no longer callable — enforcing "exactly one
    /// root resource" (spec.md invariant 5) at compile time.
    pub fn set_root_resource(mut self, resource: Resource) -> Result<VersionBuilder<HasRoot>, ModelError> {
        let name = resource.name.clone();
        insert_unique(&mut self.resources, name.clone(), resource, "resource", &display_name(&self.name))?;
        Ok(VersionBuilder {
            name: self.name,
            types: self.types,
            resources: self.resources,
            root_resource: Some(name),
            _phantom: PhantomData,
        })
    }
}

impl VersionBuilder<HasRoot> {
    /// Adds a non-root Resource to the Version.
    pub fn add_resource(mut self, resource: Resource) -> Result<Self, ModelError> {
        let name = resource.name.clone();
        insert_unique(&mut self.resources, name, resource, "resource", &display_name(&self.name))?;
        Ok(self)
    }
}

impl<R> VersionBuilder<R> {
    /// Adds an Enum declaration. Available regardless of root-resource
    /// state: types and resources are independent axes of construction.
    pub fn add_enum(mut self, e: Enum) -> Result<Self, ModelError> {
        let name = e.name.clone();
        insert_unique(&mut self.types, name, Declaration::Enum(e), "type", &display_name(&self.name))?;
        Ok(self)
    }

    /// Adds a Struct declaration.
    pub fn add_struct(mut self, s: Struct) -> Result<Self, ModelError> {
        let name = s.name.clone();
        insert_unique(&mut self.types, name, Declaration::Struct(s), "type", &display_name(&self.name))?;
        Ok(self)
    }
}

impl VersionBuilder<HasRoot> {
    /// Finalizes this Version. Structural cross-checks (type-reference
    /// resolution, the `link` restriction, locator targets) are deferred
    /// to [`ModelBuilder::build`], which has visibility into the whole
    /// graph; this method only has visibility into one Version, which is
    /// enough for the root-resource invariant the typestate already
    /// enforces.
    fn finish(self) -> Version {
        let root = self.root_resource.expect("HasRoot guarantees root_resource is set");
        Version::new(self.name, self.types, self.resources, root)
    }
}

fn insert_unique<V>(
    map: &mut IndexMap<Name, V>,
    name: Name,
    value: V,
    kind: &'static str,
    scope: &str,
) -> Result<(), ModelError> {
    if map.contains_key(&name) {
        return Err(ModelError::DuplicateName {
            kind,
            name: display_name(&name),
            scope: scope.to_string(),
        });
    }
    map.insert(name, value);
    Ok(())
}

/// Builds one [`Service`]: its ordered set of [`Version`]s.
pub struct ServiceBuilder {
    name: Name,
    versions: IndexMap<Name, Version>,
}

impl ServiceBuilder {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            versions: IndexMap::new(),
        }
    }

    pub fn add_version(mut self, version: Version) -> Result<Self, ModelError> {
        let name = version.name.clone();
        insert_unique(&mut self.versions, name, version, "version", &display_name(&self.name))?;
        Ok(self)
    }

    fn finish(self) -> Service {
        Service::new(self.name, self.versions)
    }
}

/// Builds the root [`Model`]: its ordered set of [`Service`]s, then
/// validates the assembled graph as a whole.
#[derive(Default)]
pub struct ModelBuilder {
    services: IndexMap<Name, Service>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_service_built(mut self, builder: ServiceBuilder) -> Result<Self, ModelError> {
        let service = builder.finish();
        let name = service.name.clone();
        insert_unique(&mut self.services, name, service, "service", "model")?;
        Ok(self)
    }

    /// Finalizes one Version and adds it to a service-in-progress. A thin
    /// convenience so callers don't need to reach for `VersionBuilder::finish`
    /// (private) to hand a `Version` to a `ServiceBuilder`.
    pub fn finish_version(builder: VersionBuilder<HasRoot>) -> Version {
        builder.finish()
    }

    /// Assembles and validates the Model Graph. Accumulates every
    /// structural violation rather than stopping at the first, matching
    /// spec.md §7's "reported per occurrence, run fails at end" for
    /// model-structural errors.
    pub fn build(self) -> Result<Model, ModelErrors> {
        let model = Model::new(self.services);
        let errors = validate(&model);
        if errors.is_empty() {
            Ok(model)
        } else {
            Err(ModelErrors(errors))
        }
    }
}

fn validate(model: &Model) -> Vec<ModelError> {
    let mut errors = Vec::new();
    for service in model.services() {
        for version in service.versions() {
            validate_version(version, &mut errors);
        }
    }
    errors
}

fn validate_version(version: &Version, errors: &mut Vec<ModelError>) {
    let scope = display_name(&version.name);

    for decl in version.declarations() {
        if let Declaration::Struct(s) = decl {
            for attr in &s.attributes {
                check_type_ref(version, &attr.type_ref, &scope, errors);
                if attr.link {
                    match version.resolve(&attr.type_ref) {
                        Some(Type::List(_)) | Some(Type::Struct(_)) => {}
                        _ => errors.push(ModelError::LinkOnNonContainer {
                            struct_name: display_name(&s.name),
                            attribute: display_name(&attr.name),
                        }),
                    }
                }
            }
        }
    }

    for resource in version.resources() {
        for method in &resource.methods {
            if method.kind == MethodKind::Action {
                debug_assert!(!method.name.words().is_empty());
            }
            for param in &method.parameters {
                check_type_ref(version, &param.type_ref, &scope, errors);
            }
        }
        for locator in &resource.locators {
            check_locator(version, resource.name.clone(), locator, errors);
        }
    }

    // Root resource presence is already guaranteed by the `HasRoot`
    // typestate at construction time, so no runtime check is needed here.
}

fn check_type_ref(version: &Version, type_ref: &TypeRef, scope: &str, errors: &mut Vec<ModelError>) {
    match type_ref {
        TypeRef::Scalar(_) => {}
        TypeRef::Named(name) => {
            if version.declaration(name).is_none() {
                errors.push(ModelError::UnresolvedTypeRef {
                    reference: display_name(name),
                    scope: scope.to_string(),
                });
            }
        }
        TypeRef::List(elem) | TypeRef::Map(elem) => check_type_ref(version, elem, scope, errors),
    }
}

fn check_locator(version: &Version, resource_name: Name, locator: &Locator, errors: &mut Vec<ModelError>) {
    if version.resource(&locator.target).is_none() {
        errors.push(ModelError::UnknownLocatorTarget {
            resource: display_name(&resource_name),
            locator: display_name(&locator.name),
            target: display_name(&locator.target),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::resource::{Direction, Method, Parameter};
    use crate::model::types::{Attribute, Scalar};

    fn n(s: &str) -> Name {
        Name::word(s).unwrap()
    }

    fn cluster_struct() -> Struct {
        Struct {
            name: n("cluster"),
            attributes: vec![Attribute {
                name: n("name"),
                type_ref: TypeRef::Scalar(Scalar::String),
                doc: None,
                link: false,
            }],
            class: true,
        }
    }

    fn clusters_resource() -> Resource {
        Resource {
            name: n("clusters"),
            methods: vec![Method {
                name: n("list"),
                kind: MethodKind::List,
                parameters: vec![Parameter {
                    name: n("page"),
                    type_ref: TypeRef::Scalar(Scalar::Integer),
                    direction: Direction::In,
                    default: None,
                }],
            }],
            locators: vec![],
        }
    }

    #[test]
    fn builds_a_minimal_valid_model() {
        let version = VersionBuilder::new(n("v1"))
            .add_struct(cluster_struct())
            .unwrap()
            .set_root_resource(clusters_resource())
            .unwrap();
        let version = ModelBuilder::finish_version(version);
        let service = ServiceBuilder::new(n("clusters_service"))
            .add_version(version)
            .unwrap();
        let model = ModelBuilder::new().add_service_built(service).unwrap().build().unwrap();

        let svc = model.service(&n("clusters_service")).unwrap();
        let v1 = svc.version(&n("v1")).unwrap();
        assert!(v1.declaration(&n("cluster")).is_some());
        assert_eq!(v1.root_resource().name, n("clusters"));
    }

    #[test]
    fn rejects_duplicate_struct_names() {
        let err = VersionBuilder::new(n("v1"))
            .add_struct(cluster_struct())
            .unwrap()
            .add_struct(cluster_struct())
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateName { kind: "type", .. }));
    }

    #[test]
    fn rejects_unresolved_type_ref() {
        let bad_struct = Struct {
            name: n("cluster"),
            attributes: vec![Attribute {
                name: n("owner"),
                type_ref: TypeRef::Named(n("account")),
                doc: None,
                link: false,
            }],
            class: true,
        };
        let version = VersionBuilder::new(n("v1"))
            .add_struct(bad_struct)
            .unwrap()
            .set_root_resource(clusters_resource())
            .unwrap();
        let version = ModelBuilder::finish_version(version);
        let service = ServiceBuilder::new(n("svc")).add_version(version).unwrap();
        let errs = ModelBuilder::new().add_service_built(service).unwrap().build().unwrap_err();
        assert!(matches!(errs.0[0], ModelError::UnresolvedTypeRef { .. }));
    }

    #[test]
    fn rejects_link_on_scalar_attribute() {
        let bad_struct = Struct {
            name: n("cluster"),
            attributes: vec![Attribute {
                name: n("name"),
                type_ref: TypeRef::Scalar(Scalar::String),
                doc: None,
                link: true,
            }],
            class: true,
        };
        let version = VersionBuilder::new(n("v1"))
            .add_struct(bad_struct)
            .unwrap()
            .set_root_resource(clusters_resource())
            .unwrap();
        let version = ModelBuilder::finish_version(version);
        let service = ServiceBuilder::new(n("svc")).add_version(version).unwrap();
        let errs = ModelBuilder::new().add_service_built(service).unwrap().build().unwrap_err();
        assert!(matches!(errs.0[0], ModelError::LinkOnNonContainer { .. }));
    }

    #[test]
    fn rejects_locator_to_unknown_resource() {
        let with_locator = Resource {
            locators: vec![Locator {
                name: n("identity_providers"),
                target: n("identity_providers"),
                identified: true,
            }],
            ..clusters_resource()
        };
        let version = VersionBuilder::new(n("v1"))
            .add_struct(cluster_struct())
            .unwrap()
            .set_root_resource(with_locator)
            .unwrap();
        let version = ModelBuilder::finish_version(version);
        let service = ServiceBuilder::new(n("svc")).add_version(version).unwrap();
        let errs = ModelBuilder::new().add_service_built(service).unwrap().build().unwrap_err();
        assert!(matches!(errs.0[0], ModelError::UnknownLocatorTarget { .. }));
    }
}
