// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Builders Emitter (spec.md §4.6.2): for every Struct, emits a
//! `<name>_builder.go` file holding a chainable builder type whose fields
//! mirror the struct's own field forms exactly — every field a builder
//! stores is already optional-capable by construction (a nullable pointer,
//! a nilable slice/map, or a zero-valued list container), so `Build()` is a
//! straight struct literal copy rather than a second round of
//! presence-tracking. Setters accept the *getter* form (spec.md: "Setters
//! accept the getter form; the builder internally stores the field form"),
//! which only differs from the field form for scalars and enums — there a
//! setter takes the bare value and takes its address once, matching
//! spec.md §9's design note that "partial configuration is a valid
//! intermediate state; `build()` produces a fully-owned value".

use crate::codegen::buffer::{Bindings, EmitError, FileRegistry, TemplateBuffer, Value};
use crate::codegen::formatter::Formatter;
use crate::model::graph::{Model, Version};
use crate::model::types::{Attribute, Declaration, Struct};
use crate::names::calculator::NameCalculator;
use crate::names::nomenclature::Name;
use crate::packages::PackagesCalculator;
use crate::reporter::Reporter;
use crate::types_calc::{GoTypesCalculator, ReferenceForm};

const COMPONENT: &str = "builders_emitter";

fn builder_file_name<N: NameCalculator>(names: &N, name: &Name) -> String {
    let suffixed = Name::cat(&[name, &Name::word("builder").expect("valid word")])
        .expect("concatenating a non-empty name with one more word never fails");
    names.file(&suffixed)
}

/// Emits one `<name>_builder.go` file per Struct.
pub struct BuildersEmitter<'a, N: NameCalculator> {
    names: &'a N,
    packages: &'a PackagesCalculator,
}

impl<'a, N: NameCalculator> BuildersEmitter<'a, N> {
    pub fn new(names: &'a N, packages: &'a PackagesCalculator) -> Self {
        Self { names, packages }
    }

    pub fn run(&self, model: &Model, registry: &FileRegistry, formatter: &dyn Formatter, reporter: &Reporter) {
        for service in model.services() {
            for version in service.versions() {
                let package = self.packages.version_package(service, version);
                for decl in version.declarations() {
                    if let Declaration::Struct(s) = decl {
                        if let Err(e) = self.emit_struct_builder(&package, version, s, registry, formatter) {
                            reporter.error(COMPONENT, e.to_string());
                        }
                    }
                }
            }
        }
    }

    fn emit_struct_builder(
        &self,
        package: &str,
        version: &Version,
        s: &Struct,
        registry: &FileRegistry,
        formatter: &dyn Formatter,
    ) -> Result<(), EmitError> {
        let calc = GoTypesCalculator::new(version, self.names);
        let public_name = self.names.public(&s.name);
        let builder_name = format!("{public_name}Builder");
        let file = builder_file_name(self.names, &s.name);

        let mut body = format!("type {builder_name} struct {{\n");
        if s.class {
            body.push_str("\tid string\n\thref string\n\tlink bool\n");
        }
        for attr in &s.attributes {
            let field_name = self.names.private(&attr.name);
            let field_type = calc.field_type(&attr.type_ref, attr.link);
            body.push_str(&format!("\t{field_name} {field_type}\n"));
        }
        body.push_str("}\n\n");

        body.push_str(&format!(
            "// New{builder_name} creates a builder for a {public_name} object.\nfunc New{builder_name}() *{builder_name} {{\n\treturn &{builder_name}{{}}\n}}\n\n"
        ));

        if s.class {
            body.push_str(&format!(
                "func (b *{builder_name}) ID(value string) *{builder_name} {{\n\tb.id = value\n\treturn b\n}}\n\n"
            ));
            body.push_str(&format!(
                "func (b *{builder_name}) HREF(value string) *{builder_name} {{\n\tb.href = value\n\treturn b\n}}\n\n"
            ));
            body.push_str(&format!(
                "func (b *{builder_name}) Link(value bool) *{builder_name} {{\n\tb.link = value\n\treturn b\n}}\n\n"
            ));
        }

        for attr in &s.attributes {
            body.push_str(&attribute_setter(self.names, &calc, &builder_name, attr));
        }

        body.push_str(&build_method(self.names, s, &builder_name, &public_name));

        let mut bindings = Bindings::new();
        bindings.insert("body".to_string(), Value::Str(body));

        TemplateBuffer::new(package.to_string(), file)
            .emit("{{body}}", &bindings)?
            .write(formatter, registry)
            .map_err(|e| match e {
                crate::codegen::buffer::BufferError::Emit(emit_err) => emit_err,
                other => EmitError::Malformed(other.to_string()),
            })?;
        Ok(())
    }
}

fn attribute_setter<N: NameCalculator>(
    names: &N,
    calc: &GoTypesCalculator<'_, N>,
    builder_name: &str,
    attr: &Attribute,
) -> String {
    let field_name = names.private(&attr.name);
    let setter_name = names.public(&attr.name);
    let getter_type = calc.getter_type(&attr.type_ref, attr.link);

    match calc.getter_form(&attr.type_ref, attr.link) {
        ReferenceForm::Value => format!(
            "func (b *{builder_name}) {setter_name}(value {getter_type}) *{builder_name} {{\n\tb.{field_name} = &value\n\treturn b\n}}\n\n"
        ),
        ReferenceForm::Nullable | ReferenceForm::ListContainer => format!(
            "func (b *{builder_name}) {setter_name}(value {getter_type}) *{builder_name} {{\n\tb.{field_name} = value\n\treturn b\n}}\n\n"
        ),
    }
}

fn build_method<N: NameCalculator>(names: &N, s: &Struct, builder_name: &str, public_name: &str) -> String {
    let mut out = format!(
        "// Build materializes a {public_name} value from the builder's current\n// configuration. The builder remains usable afterward, matching Go's\n// value-copy semantics rather than invalidating itself.\nfunc (b *{builder_name}) Build() *{public_name} {{\n\treturn &{public_name}{{\n"
    );
    if s.class {
        out.push_str("\t\tid:   b.id,\n\t\thref: b.href,\n\t\tlink: b.link,\n");
    }
    for attr in &s.attributes {
        let field_name = names.private(&attr.name);
        out.push_str(&format!("\t\t{field_name}: b.{field_name},\n"));
    }
    out.push_str("\t}\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::formatter::GoFormatter;
    use crate::codegen::language::Go;
    use crate::model::types::{Scalar, TypeRef};
    use crate::model::{ModelBuilder, Resource, ServiceBuilder, VersionBuilder};
    use std::fs;

    fn n(s: &str) -> Name {
        Name::word(s).unwrap()
    }

    const NAMES: Go = Go;

    fn tmp_root(label: &str) -> String {
        format!(
            "{}/apimodel_codegen_test_builders_{}_{}",
            std::env::temp_dir().display(),
            label,
            std::process::id()
        )
    }

    #[test]
    fn emits_chainable_builder_with_build_method() {
        let root = tmp_root("cluster");
        let _ = fs::remove_dir_all(&root);

        let cluster = Struct {
            name: n("cluster"),
            attributes: vec![Attribute {
                name: n("name"),
                type_ref: TypeRef::Scalar(Scalar::String),
                doc: None,
                link: false,
            }],
            class: true,
        };
        let version = VersionBuilder::new(n("v1"))
            .add_struct(cluster)
            .unwrap()
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
        let emitter = BuildersEmitter::new(&NAMES, &packages);
        let registry = FileRegistry::new();
        let reporter = Reporter::new();
        emitter.run(&model, &registry, &GoFormatter, &reporter);

        assert!(!reporter.has_errors(), "{:?}", reporter.records());
        let content = fs::read_to_string(format!("{root}/clusters_mgmt/v1/cluster_builder.go")).unwrap();
        assert!(content.contains("type ClusterBuilder struct {"));
        assert!(content.contains("func NewClusterBuilder() *ClusterBuilder"));
        assert!(content.contains("func (b *ClusterBuilder) Name(value string) *ClusterBuilder"));
        assert!(content.contains("b.name = &value"));
        assert!(content.contains("func (b *ClusterBuilder) Build() *Cluster"));
        assert!(content.contains("func (b *ClusterBuilder) ID(value string) *ClusterBuilder"));

        fs::remove_dir_all(&root).ok();
    }
}
