// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! JSON Readers/Writers Emitter (spec.md §4.6.3): for every Struct, emits a
//! `<name>_reader.go` holding `Unmarshal<Name>`/`Unmarshal<Name>List` and a
//! `<name>_writer.go` holding `Marshal<Name>`/`Marshal<Name>List`.
//!
//! Field dispatch is keyed by each attribute's Tag (spec.md §4.2), and the
//! writer omits any field whose value is the zero/absent value of its
//! reference form (spec.md testable property 5) — a `nil` check for every
//! `Nullable` form, an `Empty()` check for `ListContainer`. `class` structs
//! additionally read/write `kind`/`id`/`href`; `kind` round-trips through
//! the three kind constants the Types Emitter already generates, so a
//! struct decoded from a `*Link`/`*Nil` kind comes back with `link` set
//! accordingly (spec.md §4.6.1's `Link()`/`Kind()` accessors).

use crate::codegen::buffer::{Bindings, EmitError, FileRegistry, TemplateBuffer, Value};
use crate::codegen::formatter::Formatter;
use crate::model::graph::{Model, Version};
use crate::model::types::{Attribute, Declaration, Scalar, Struct, Type, TypeRef};
use crate::names::calculator::NameCalculator;
use crate::names::nomenclature::Name;
use crate::packages::PackagesCalculator;
use crate::reporter::Reporter;

const COMPONENT: &str = "json_emitter";

/// The shape of one attribute's JSON representation, classified from its
/// resolved [`Type`] and `link` flag. This is a narrower cut than
/// [`crate::types_calc::ReferenceForm`]: readers/writers additionally need
/// to know whether a container's element is a struct (recurse through its
/// own reader/writer) or a scalar (decode/encode directly).
enum AttrShape {
    /// A scalar or enum: read/written as the bare JSON value behind a
    /// nullable pointer.
    ScalarLike,
    /// A nullable reference to another struct: recurses into that
    /// struct's own reader/writer.
    Struct(String),
    /// A non-linked list of scalars: decoded/encoded as a plain JSON array.
    ListOfScalar,
    /// A non-linked list of structs: each element recurses into that
    /// struct's reader/writer.
    ListOfStruct(String),
    /// A linked list: the attribute itself is a `<Elem>List` container,
    /// with its own kind/href/items envelope (spec.md §4.6.3).
    ListLink(String),
    /// A string-keyed map; values are read/written directly (this emitter
    /// does not support map-of-struct or nested containers — see
    /// DESIGN.md).
    Map,
}

fn classify<N: NameCalculator>(version: &Version, names: &N, type_ref: &TypeRef, link: bool) -> AttrShape {
    let resolved = version
        .resolve(type_ref)
        .expect("type_ref is validated to resolve by ModelBuilder::build");
    match resolved {
        Type::Scalar(_) | Type::Enum(_) => AttrShape::ScalarLike,
        Type::Struct(s) => AttrShape::Struct(names.public(&s.name)),
        Type::Map(_) => AttrShape::Map,
        Type::List(elem) => {
            let elem_resolved = version
                .resolve(elem)
                .expect("list element type_ref is validated to resolve");
            match elem_resolved {
                Type::Struct(s) if link => AttrShape::ListLink(names.public(&s.name)),
                Type::Struct(s) => AttrShape::ListOfStruct(names.public(&s.name)),
                _ => AttrShape::ListOfScalar,
            }
        }
    }
}

fn reader_file_name<N: NameCalculator>(names: &N, name: &Name) -> String {
    let suffixed = Name::cat(&[name, &Name::word("reader").expect("valid word")]).expect("non-empty cat");
    names.file(&suffixed)
}

fn writer_file_name<N: NameCalculator>(names: &N, name: &Name) -> String {
    let suffixed = Name::cat(&[name, &Name::word("writer").expect("valid word")]).expect("non-empty cat");
    names.file(&suffixed)
}

/// Emits `<name>_reader.go` and `<name>_writer.go` for every Struct.
pub struct JsonEmitter<'a, N: NameCalculator> {
    names: &'a N,
    packages: &'a PackagesCalculator,
}

impl<'a, N: NameCalculator> JsonEmitter<'a, N> {
    pub fn new(names: &'a N, packages: &'a PackagesCalculator) -> Self {
        Self { names, packages }
    }

    pub fn run(&self, model: &Model, registry: &FileRegistry, formatter: &dyn Formatter, reporter: &Reporter) {
        for service in model.services() {
            for version in service.versions() {
                let package = self.packages.version_package(service, version);
                for decl in version.declarations() {
                    if let Declaration::Struct(s) = decl {
                        if let Err(e) = self.emit_reader(&package, version, s, registry, formatter) {
                            reporter.error(COMPONENT, e.to_string());
                        }
                        if let Err(e) = self.emit_writer(&package, version, s, registry, formatter) {
                            reporter.error(COMPONENT, e.to_string());
                        }
                    }
                }
            }
        }
    }

    fn emit_reader(
        &self,
        package: &str,
        version: &Version,
        s: &Struct,
        registry: &FileRegistry,
        formatter: &dyn Formatter,
    ) -> Result<(), EmitError> {
        let public_name = self.names.public(&s.name);
        let file = reader_file_name(self.names, &s.name);

        let mut body = format!(
            "// Unmarshal{public_name} decodes a single {public_name} object from its\n// JSON representation.\nfunc Unmarshal{public_name}(data []byte) (*{public_name}, error) {{\n\tvar raw map[string]json.RawMessage\n\tif err := json.Unmarshal(data, &raw); err != nil {{\n\t\treturn nil, err\n\t}}\n\tobj := &{public_name}{{}}\n"
        );
        if s.class {
            body.push_str(&format!(
                "\tif v, ok := raw[\"kind\"]; ok {{\n\t\tvar kind string\n\t\tif err := json.Unmarshal(v, &kind); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tobj.link = kind == {public_name}LinkKind\n\t}}\n\tif v, ok := raw[\"id\"]; ok {{\n\t\tif err := json.Unmarshal(v, &obj.id); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n\tif v, ok := raw[\"href\"]; ok {{\n\t\tif err := json.Unmarshal(v, &obj.href); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n"
            ));
        }
        for attr in &s.attributes {
            body.push_str(&read_attr(self.names, version, attr));
        }
        body.push_str("\treturn obj, nil\n}\n\n");

        body.push_str(&format!(
            "// Unmarshal{public_name}List decodes a {public_name}List envelope\n// (\"kind\", \"href\", \"items\") from its JSON representation.\nfunc Unmarshal{public_name}List(data []byte) (*{public_name}List, error) {{\n\tvar raw struct {{\n\t\tKind  string            `json:\"kind\"`\n\t\tHREF  string            `json:\"href\"`\n\t\tItems []json.RawMessage `json:\"items\"`\n\t}}\n\tif err := json.Unmarshal(data, &raw); err != nil {{\n\t\treturn nil, err\n\t}}\n\tlist := &{public_name}List{{href: raw.HREF, link: raw.Kind == {public_name}ListLinkKind}}\n\tfor _, item := range raw.Items {{\n\t\tparsed, err := Unmarshal{public_name}(item)\n\t\tif err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tlist.items = append(list.items, parsed)\n\t}}\n\treturn list, nil\n}}\n"
        ));

        emit_file(package, &file, body, None, registry, formatter)
    }

    fn emit_writer(
        &self,
        package: &str,
        version: &Version,
        s: &Struct,
        registry: &FileRegistry,
        formatter: &dyn Formatter,
    ) -> Result<(), EmitError> {
        let public_name = self.names.public(&s.name);
        let file = writer_file_name(self.names, &s.name);

        // `out` is a `*helpers.OrderedObject`, not a Go map: encoding/json
        // sorts map keys alphabetically, which would scramble the fixed
        // "kind"/"id"/"href" + declared-attribute-order fields (spec.md
        // §4.6.3, §6) that class objects and attribute writers require.
        let mut body = format!(
            "// Marshal{public_name} encodes a single {public_name} object to its JSON\n// representation, omitting any field that is absent or zero-valued.\nfunc Marshal{public_name}(obj *{public_name}) ([]byte, error) {{\n\tout := &helpers.OrderedObject{{}}\n"
        );
        if s.class {
            body.push_str(
                "\tif err := out.Set(\"kind\", obj.Kind()); err != nil {\n\t\treturn nil, err\n\t}\n\tif obj.id != \"\" {\n\t\tif err := out.Set(\"id\", obj.id); err != nil {\n\t\t\treturn nil, err\n\t\t}\n\t}\n\tif obj.href != \"\" {\n\t\tif err := out.Set(\"href\", obj.href); err != nil {\n\t\t\treturn nil, err\n\t\t}\n\t}\n",
            );
        }
        for attr in &s.attributes {
            body.push_str(&write_attr(self.names, version, attr));
        }
        body.push_str("\treturn out.MarshalJSON()\n}\n\n");

        body.push_str(&format!(
            "// Marshal{public_name}List encodes a {public_name}List envelope. When the\n// list is linked and carries no items, only \"kind\" and \"href\" are\n// emitted (spec: link containers with no items stay a bare reference).\nfunc Marshal{public_name}List(list *{public_name}List) ([]byte, error) {{\n\tout := &helpers.OrderedObject{{}}\n\tkind := {public_name}ListKind\n\tif list.link {{\n\t\tkind = {public_name}ListLinkKind\n\t}}\n\tif err := out.Set(\"kind\", kind); err != nil {{\n\t\treturn nil, err\n\t}}\n\tif err := out.Set(\"href\", list.href); err != nil {{\n\t\treturn nil, err\n\t}}\n\tif !list.link || list.Len() > 0 {{\n\t\titems := make([]json.RawMessage, 0, list.Len())\n\t\tfor _, item := range list.Slice() {{\n\t\t\tencoded, err := Marshal{public_name}(item)\n\t\t\tif err != nil {{\n\t\t\t\treturn nil, err\n\t\t\t}}\n\t\t\titems = append(items, encoded)\n\t\t}}\n\t\tif err := out.Set(\"items\", items); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n\treturn out.MarshalJSON()\n}}\n"
        ));

        emit_file(package, &file, body, Some(self.packages.helpers_package()), registry, formatter)
    }
}

fn read_attr<N: NameCalculator>(names: &N, version: &Version, attr: &Attribute) -> String {
    let field_name = names.private(&attr.name);
    let tag = names.tag(&attr.name);

    match classify(version, names, &attr.type_ref, attr.link) {
        AttrShape::ScalarLike | AttrShape::Map => format!(
            "\tif v, ok := raw[\"{tag}\"]; ok {{\n\t\tif err := json.Unmarshal(v, &obj.{field_name}); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n"
        ),
        AttrShape::Struct(elem) => format!(
            "\tif v, ok := raw[\"{tag}\"]; ok {{\n\t\tparsed, err := Unmarshal{elem}(v)\n\t\tif err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tobj.{field_name} = parsed\n\t}}\n"
        ),
        AttrShape::ListOfScalar => format!(
            "\tif v, ok := raw[\"{tag}\"]; ok {{\n\t\tif err := json.Unmarshal(v, &obj.{field_name}); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n"
        ),
        AttrShape::ListOfStruct(elem) => format!(
            "\tif v, ok := raw[\"{tag}\"]; ok {{\n\t\tvar rawItems []json.RawMessage\n\t\tif err := json.Unmarshal(v, &rawItems); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tfor _, item := range rawItems {{\n\t\t\tparsed, err := Unmarshal{elem}(item)\n\t\t\tif err != nil {{\n\t\t\t\treturn nil, err\n\t\t\t}}\n\t\t\tobj.{field_name} = append(obj.{field_name}, *parsed)\n\t\t}}\n\t}}\n"
        ),
        AttrShape::ListLink(elem) => format!(
            "\tif v, ok := raw[\"{tag}\"]; ok {{\n\t\tparsed, err := Unmarshal{elem}List(v)\n\t\tif err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tobj.{field_name} = *parsed\n\t}}\n"
        ),
    }
}

fn write_attr<N: NameCalculator>(names: &N, version: &Version, attr: &Attribute) -> String {
    let field_name = names.private(&attr.name);
    let tag = names.tag(&attr.name);

    match classify(version, names, &attr.type_ref, attr.link) {
        AttrShape::ScalarLike => format!(
            "\tif obj.{field_name} != nil {{\n\t\tif err := out.Set(\"{tag}\", *obj.{field_name}); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n"
        ),
        AttrShape::Map => format!(
            "\tif len(obj.{field_name}) > 0 {{\n\t\tif err := out.Set(\"{tag}\", obj.{field_name}); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n"
        ),
        AttrShape::Struct(elem) => format!(
            "\tif obj.{field_name} != nil {{\n\t\tencoded, err := Marshal{elem}(obj.{field_name})\n\t\tif err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tout.SetRaw(\"{tag}\", json.RawMessage(encoded))\n\t}}\n"
        ),
        AttrShape::ListOfScalar => format!(
            "\tif len(obj.{field_name}) > 0 {{\n\t\tif err := out.Set(\"{tag}\", obj.{field_name}); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n"
        ),
        AttrShape::ListOfStruct(elem) => format!(
            "\tif len(obj.{field_name}) > 0 {{\n\t\titems := make([]json.RawMessage, 0, len(obj.{field_name}))\n\t\tfor _, item := range obj.{field_name} {{\n\t\t\tencoded, err := Marshal{elem}(&item)\n\t\t\tif err != nil {{\n\t\t\t\treturn nil, err\n\t\t\t}}\n\t\t\titems = append(items, encoded)\n\t\t}}\n\t\tif err := out.Set(\"{tag}\", items); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t}}\n"
        ),
        AttrShape::ListLink(elem) => format!(
            "\tif !obj.{field_name}.Empty() {{\n\t\tencoded, err := Marshal{elem}List(&obj.{field_name})\n\t\tif err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tout.SetRaw(\"{tag}\", json.RawMessage(encoded))\n\t}}\n"
        ),
    }
}

fn emit_file(
    package: &str,
    file: &str,
    body: String,
    extra_import: Option<String>,
    registry: &FileRegistry,
    formatter: &dyn Formatter,
) -> Result<(), EmitError> {
    let mut bindings = Bindings::new();
    bindings.insert("body".to_string(), Value::Str(body));

    let mut buffer = TemplateBuffer::new(package.to_string(), file.to_string()).import("encoding/json", None);
    if let Some(pkg) = extra_import {
        buffer = buffer.import(&pkg, None);
    }

    buffer
        .emit("{{body}}", &bindings)?
        .write(formatter, registry)
        .map_err(|e| match e {
            crate::codegen::buffer::BufferError::Emit(emit_err) => emit_err,
            other => EmitError::Malformed(other.to_string()),
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::formatter::GoFormatter;
    use crate::codegen::language::Go;
    use crate::model::types::TypeRef;
    use crate::model::{ModelBuilder, Resource, ServiceBuilder, VersionBuilder};
    use std::fs;

    fn n(s: &str) -> Name {
        Name::word(s).unwrap()
    }

    const NAMES: Go = Go;

    fn tmp_root(label: &str) -> String {
        format!(
            "{}/apimodel_codegen_test_json_{}_{}",
            std::env::temp_dir().display(),
            label,
            std::process::id()
        )
    }

    #[test]
    fn emits_reader_and_writer_with_kind_dispatch() {
        let root = tmp_root("cluster");
        let _ = fs::remove_dir_all(&root);

        let idp = Struct {
            name: n("identity_provider"),
            attributes: vec![Attribute {
                name: n("name"),
                type_ref: TypeRef::Scalar(Scalar::String),
                doc: None,
                link: false,
            }],
            class: true,
        };
        let cluster = Struct {
            name: n("cluster"),
            attributes: vec![
                Attribute {
                    name: n("name"),
                    type_ref: TypeRef::Scalar(Scalar::String),
                    doc: None,
                    link: false,
                },
                Attribute {
                    name: n("identity_providers"),
                    type_ref: TypeRef::list_of(TypeRef::Named(n("identity_provider"))),
                    doc: None,
                    link: true,
                },
            ],
            class: true,
        };
        let version = VersionBuilder::new(n("v1"))
            .add_struct(idp)
            .unwrap()
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
        let emitter = JsonEmitter::new(&NAMES, &packages);
        let registry = FileRegistry::new();
        let reporter = Reporter::new();
        emitter.run(&model, &registry, &GoFormatter, &reporter);

        assert!(!reporter.has_errors(), "{:?}", reporter.records());

        let reader = fs::read_to_string(format!("{root}/clusters_mgmt/v1/cluster_reader.go")).unwrap();
        assert!(reader.contains("func UnmarshalCluster(data []byte) (*Cluster, error)"));
        assert!(reader.contains("obj.link = kind == ClusterLinkKind"));
        assert!(reader.contains("UnmarshalIdentityProviderList"));
        assert!(reader.contains("func UnmarshalClusterList(data []byte) (*ClusterList, error)"));

        let writer = fs::read_to_string(format!("{root}/clusters_mgmt/v1/cluster_writer.go")).unwrap();
        assert!(writer.contains("func MarshalCluster(obj *Cluster) ([]byte, error)"));
        assert!(writer.contains("out.Set(\"kind\", obj.Kind())"));
        assert!(writer.contains("if obj.id != \"\""));
        assert!(writer.contains("func MarshalClusterList(list *ClusterList) ([]byte, error)"));
        assert!(writer.contains("if !list.link || list.Len() > 0"));
        assert!(writer.contains("out.MarshalJSON()"));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn non_linked_list_of_struct_uses_value_slice_not_pointer_slice() {
        let root = tmp_root("value_slice");
        let _ = fs::remove_dir_all(&root);

        let item = Struct {
            name: n("cluster_resource"),
            attributes: vec![Attribute {
                name: n("name"),
                type_ref: TypeRef::Scalar(Scalar::String),
                doc: None,
                link: false,
            }],
            class: true,
        };
        let cluster = Struct {
            name: n("cluster"),
            attributes: vec![Attribute {
                name: n("resources"),
                type_ref: TypeRef::list_of(TypeRef::Named(n("cluster_resource"))),
                doc: None,
                link: false,
            }],
            class: true,
        };
        let version = VersionBuilder::new(n("v1"))
            .add_struct(item)
            .unwrap()
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
        let emitter = JsonEmitter::new(&NAMES, &packages);
        let registry = FileRegistry::new();
        let reporter = Reporter::new();
        emitter.run(&model, &registry, &GoFormatter, &reporter);

        assert!(!reporter.has_errors(), "{:?}", reporter.records());

        let reader = fs::read_to_string(format!("{root}/clusters_mgmt/v1/cluster_reader.go")).unwrap();
        assert!(reader.contains("obj.resources = append(obj.resources, *parsed)"));

        let writer = fs::read_to_string(format!("{root}/clusters_mgmt/v1/cluster_writer.go")).unwrap();
        assert!(writer.contains("MarshalClusterResource(&item)"));

        fs::remove_dir_all(&root).ok();
    }
}
