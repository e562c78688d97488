// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Metadata Emitter (spec.md §4.6.1, "For each Version: a `Metadata`
//! struct…"): emits one `metadata_type.go` per Version. Kept separate from
//! the Types Emitter since it is keyed by Version rather than by any
//! declared Enum/Struct, and spec.md's file-layout table lists it as its
//! own output file.

use crate::codegen::buffer::{Bindings, EmitError, FileRegistry, TemplateBuffer, Value};
use crate::codegen::formatter::Formatter;
use crate::model::graph::Model;
use crate::names::calculator::NameCalculator;
use crate::packages::PackagesCalculator;
use crate::reporter::Reporter;

const COMPONENT: &str = "metadata_emitter";

/// Emits one `metadata_type.go` file per Version.
pub struct MetadataEmitter<'a, N: NameCalculator> {
    names: &'a N,
    packages: &'a PackagesCalculator,
}

impl<'a, N: NameCalculator> MetadataEmitter<'a, N> {
    pub fn new(names: &'a N, packages: &'a PackagesCalculator) -> Self {
        Self { names, packages }
    }

    pub fn run(&self, model: &Model, registry: &FileRegistry, formatter: &dyn Formatter, reporter: &Reporter) {
        let _ = &self.names;
        for service in model.services() {
            for version in service.versions() {
                let package = self.packages.version_package(service, version);
                if let Err(e) = self.emit_metadata(&package, registry, formatter) {
                    reporter.error(COMPONENT, e.to_string());
                }
            }
        }
    }

    fn emit_metadata(&self, package: &str, registry: &FileRegistry, formatter: &dyn Formatter) -> Result<(), EmitError> {
        let body = r#"// Metadata describes the generator-reported state of one API version.
type Metadata struct {
	serverVersion *string
}

// ServerVersion returns the server version this metadata describes, or
// the empty string if it has not been set.
func (m *Metadata) ServerVersion() string {
	if m != nil && m.serverVersion != nil {
		return *m.serverVersion
	}
	return ""
}

// GetServerVersion returns the server version and whether it was set.
func (m *Metadata) GetServerVersion() (value string, ok bool) {
	ok = m != nil && m.serverVersion != nil
	if ok {
		value = *m.serverVersion
	}
	return
}
"#
        .to_string();

        let mut bindings = Bindings::new();
        bindings.insert("body".to_string(), Value::Str(body));

        TemplateBuffer::new(package.to_string(), "metadata_type.go".to_string())
            .emit("{{body}}", &bindings)?
            .write(formatter, registry)
            .map_err(|e| match e {
                crate::codegen::buffer::BufferError::Emit(emit_err) => emit_err,
                other => EmitError::Malformed(other.to_string()),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::formatter::GoFormatter;
    use crate::codegen::language::Go;
    use crate::model::{ModelBuilder, Resource, ServiceBuilder, VersionBuilder};
    use crate::names::nomenclature::Name;
    use std::fs;

    fn n(s: &str) -> Name {
        Name::word(s).unwrap()
    }

    const NAMES: Go = Go;

    fn tmp_root(label: &str) -> String {
        format!(
            "{}/apimodel_codegen_test_metadata_{}_{}",
            std::env::temp_dir().display(),
            label,
            std::process::id()
        )
    }

    #[test]
    fn emits_metadata_type_per_version() {
        let root = tmp_root("per_version");
        let _ = fs::remove_dir_all(&root);

        let version = VersionBuilder::new(n("v1"))
            .set_root_resource(Resource {
                name: n("root"),
                methods: vec![],
                locators: vec![],
            })
            .unwrap();
        let version = ModelBuilder::finish_version(version);
        let service_builder = ServiceBuilder::new(n("clusters_mgmt")).add_version(version).unwrap();
        let model = ModelBuilder::new().add_service_built(service_builder).unwrap().build().unwrap();

        let packages = PackagesCalculator::new(root.as_str());
        let emitter = MetadataEmitter::new(&NAMES, &packages);
        let registry = FileRegistry::new();
        let reporter = Reporter::new();
        emitter.run(&model, &registry, &GoFormatter, &reporter);

        assert!(!reporter.has_errors(), "{:?}", reporter.records());
        let content = fs::read_to_string(format!("{root}/clusters_mgmt/v1/metadata_type.go")).unwrap();
        assert!(content.contains("type Metadata struct"));
        assert!(content.contains("func (m *Metadata) ServerVersion() string"));
        assert!(content.contains("func (m *Metadata) GetServerVersion() (value string, ok bool)"));

        fs::remove_dir_all(&root).ok();
    }
}
