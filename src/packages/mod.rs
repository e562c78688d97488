// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Packages Calculator: stable package identifiers for versions and for
//! cross-version utility locations (spec.md §4.3).
//!
//! A package identifier doubles as an import specifier: whatever the
//! Template Buffer hands a generated file's `import` block is exactly what
//! this calculator returns, so there is no second translation step between
//! "where a file lives" and "what another file imports to reach it".

use crate::model::graph::{Service, Version};

/// A package path, directly usable as a Go import specifier.
pub type PackagePath = String;

/// Computes package paths for one generator run, rooted at a single
/// `<output-root>`. Constructed once per run and shared read-only across
/// every emitter (spec.md §5: "the read-only Model Graph, Name Calculator,
/// and Packages Calculator may be shared without locking").
#[derive(Debug, Clone)]
pub struct PackagesCalculator {
    output_root: String,
    helpers_suffix: &'static str,
    errors_suffix: &'static str,
}

impl PackagesCalculator {
    /// Builds a calculator rooted at `output_root`, using this crate's
    /// default suffix rules for the helpers and errors sub-packages.
    pub fn new(output_root: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            helpers_suffix: "helpers",
            errors_suffix: "errors",
        }
    }

    /// Overrides the default suffix rules, for callers that need a
    /// different sub-package layout than this crate's default.
    pub fn with_suffixes(mut self, helpers_suffix: &'static str, errors_suffix: &'static str) -> Self {
        self.helpers_suffix = helpers_suffix;
        self.errors_suffix = errors_suffix;
        self
    }

    /// `<output-root>/<service>/<version>`, the package every type,
    /// resource, and metadata file for this version is emitted into.
    pub fn version_package(&self, service: &Service, version: &Version) -> PackagePath {
        format!(
            "{}/{}/{}",
            self.output_root,
            service.name.words().join("_"),
            version.name.words().join("_")
        )
    }

    /// Cross-version package for shared client/server helper code (query
    /// encoding, URL composition) that every version's emitted code reuses
    /// rather than duplicating per version.
    pub fn helpers_package(&self) -> PackagePath {
        format!("{}/{}", self.output_root, self.helpers_suffix)
    }

    /// Cross-version package for the shared `{"kind":"Error",...}` error
    /// type emitted once and referenced by every server adapter (spec.md §7).
    pub fn errors_package(&self) -> PackagePath {
        format!("{}/{}", self.output_root, self.errors_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelBuilder, Resource, ServiceBuilder, VersionBuilder};
    use crate::names::nomenclature::Name;

    fn n(s: &str) -> Name {
        Name::word(s).unwrap()
    }

    fn sample_service_and_version() -> (Service, Version) {
        let root = Resource {
            name: n("root"),
            methods: vec![],
            locators: vec![],
        };
        let version = VersionBuilder::new(n("v1")).set_root_resource(root).unwrap();
        let version = ModelBuilder::finish_version(version);
        let service_builder = ServiceBuilder::new(n("clusters_mgmt")).add_version(version.clone()).unwrap();
        let model = ModelBuilder::new().add_service_built(service_builder).unwrap().build().unwrap();
        let service = model.service(&n("clusters_mgmt")).unwrap().clone();
        (service, version)
    }

    #[test]
    fn version_package_follows_output_root_service_version_layout() {
        let (service, version) = sample_service_and_version();
        let calc = PackagesCalculator::new("generated/go");
        assert_eq!(
            calc.version_package(&service, &version),
            "generated/go/clusters_mgmt/v1"
        );
    }

    #[test]
    fn helpers_and_errors_packages_are_stable_and_distinct() {
        let calc = PackagesCalculator::new("generated/go");
        assert_eq!(calc.helpers_package(), "generated/go/helpers");
        assert_eq!(calc.errors_package(), "generated/go/errors");
        assert_ne!(calc.helpers_package(), calc.errors_package());
    }

    #[test]
    fn two_calls_over_the_same_model_are_byte_identical() {
        let (service, version) = sample_service_and_version();
        let calc = PackagesCalculator::new("out");
        assert_eq!(
            calc.version_package(&service, &version),
            calc.version_package(&service, &version)
        );
    }
}
