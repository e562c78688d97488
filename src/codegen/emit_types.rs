// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Types Emitter (spec.md §4.6.1): for every Enum and Struct declaration,
//! and once per Version, emits a `<name>_type.go` file holding the Go type
//! declaration, its accessors, and (for Structs) its companion List
//! container type.
//!
//! Each emitted unit is assembled as a single Go source block in Rust
//! (using the Model Graph, Name Calculator, and Types Calculator already
//! computed) and handed to the Template Buffer as one `{{body}}`
//! substitution — the Template Buffer's richer `{{#each}}`/`{{#if}}`
//! directives are exercised directly by its own unit tests
//! ([`crate::codegen::buffer`]); this emitter's templates are
//! intentionally flat so the generated Go's structure stays easy to read
//! and audit next to the spec it implements (see DESIGN.md).

use crate::codegen::buffer::{Bindings, EmitError, FileRegistry, TemplateBuffer, Value};
use crate::codegen::formatter::Formatter;
use crate::model::graph::{Model, Version};
use crate::model::types::{Attribute, Declaration, Enum, Struct};
use crate::names::calculator::NameCalculator;
use crate::names::nomenclature::Name;
use crate::packages::PackagesCalculator;
use crate::reporter::Reporter;
use crate::types_calc::{GoTypesCalculator, ReferenceForm};

const COMPONENT: &str = "types_emitter";

/// The `<name>_type.go` file path for a declared Enum or Struct (spec.md
/// §4.6.1's file-layout table names every type declaration's file this way).
fn type_file_name<N: NameCalculator>(names: &N, name: &Name) -> String {
    let suffixed = Name::cat(&[name, &Name::word("type").expect("\"type\" is a valid word")])
        .expect("concatenating a non-empty name with one more word never fails");
    names.file(&suffixed)
}

/// Emits one `<name>_type.go` file per Enum, Struct, and Version.
pub struct TypesEmitter<'a, N: NameCalculator> {
    names: &'a N,
    packages: &'a PackagesCalculator,
}

impl<'a, N: NameCalculator> TypesEmitter<'a, N> {
    pub fn new(names: &'a N, packages: &'a PackagesCalculator) -> Self {
        Self { names, packages }
    }

    /// Runs this emitter over the whole model, writing every file through
    /// `formatter` and claiming paths in `registry`. Errors are reported
    /// non-fatally to `reporter`; the caller (the Orchestrator) decides
    /// whether the run as a whole failed.
    pub fn run(
        &self,
        model: &Model,
        registry: &FileRegistry,
        formatter: &dyn Formatter,
        reporter: &Reporter,
    ) {
        for service in model.services() {
            for version in service.versions() {
                let package = self.packages.version_package(service, version);

                for decl in version.declarations() {
                    let result = match decl {
                        Declaration::Enum(e) => self.emit_enum(&package, e, registry, formatter),
                        Declaration::Struct(s) => {
                            self.emit_struct(&package, version, s, registry, formatter)
                        }
                    };
                    if let Err(e) = result {
                        reporter.error(COMPONENT, e.to_string());
                    }
                }
            }
        }
    }

    fn emit_enum(
        &self,
        package: &str,
        e: &Enum,
        registry: &FileRegistry,
        formatter: &dyn Formatter,
    ) -> Result<(), EmitError> {
        let public_name = self.names.public(&e.name);
        let file = type_file_name(self.names, &e.name);

        let mut body = format!("type {public_name} string\n\nconst (\n");
        for value in &e.values {
            if let Some(doc) = &value.doc {
                body.push_str(&format!("\t// {doc}\n"));
            }
            let const_name = format!("{public_name}{}", self.names.public(&value.name));
            let tag = self.names.tag(&value.name);
            body.push_str(&format!("\t{const_name} {public_name} = \"{tag}\"\n"));
        }
        body.push_str(")\n");

        emit_block(package, &file, body, registry, formatter)
    }

    fn emit_struct(
        &self,
        package: &str,
        version: &Version,
        s: &Struct,
        registry: &FileRegistry,
        formatter: &dyn Formatter,
    ) -> Result<(), EmitError> {
        let calc = GoTypesCalculator::new(version, self.names);
        let public_name = self.names.public(&s.name);
        let file = type_file_name(self.names, &s.name);

        let mut body = String::new();
        if s.class {
            body.push_str(&class_kind_constants(&public_name));
        }
        body.push_str(&struct_fields(self.names, &calc, s));
        body.push_str(&struct_empty_method(self.names, &calc, s));
        if s.class {
            body.push_str(&class_accessors(&public_name));
        }
        for attr in &s.attributes {
            body.push_str(&attribute_accessors(self.names, &calc, &public_name, attr));
        }
        body.push_str(&list_container(&public_name, s.class));

        emit_block(package, &file, body, registry, formatter)
    }
}

fn class_kind_constants(public_name: &str) -> String {
    format!(
        "const (\n\t{public_name}Kind = \"{public_name}\"\n\t{public_name}LinkKind = \"{public_name}Link\"\n\t{public_name}NilKind = \"{public_name}Nil\"\n)\n\n"
    )
}

fn struct_fields<N: NameCalculator>(names: &N, calc: &GoTypesCalculator<'_, N>, s: &Struct) -> String {
    let mut out = format!("type {} struct {{\n", names.public(&s.name));
    if s.class {
        out.push_str("\tid string\n\thref string\n\tlink bool\n");
    }
    for attr in &s.attributes {
        let field_name = names.private(&attr.name);
        let field_type = calc.field_type(&attr.type_ref, attr.link);
        out.push_str(&format!("\t{field_name} {field_type}\n"));
    }
    out.push_str("}\n\n");
    out
}

/// `Empty()`: absent or every field in its zero/empty state (spec.md
/// §4.6.1 point 3). List-typed fields use length-based emptiness,
/// nullable scalars/structs/maps use a nil-check.
fn struct_empty_method<N: NameCalculator>(
    names: &N,
    calc: &GoTypesCalculator<'_, N>,
    s: &Struct,
) -> String {
    let public_name = names.public(&s.name);
    let mut checks = Vec::new();
    if s.class {
        checks.push("obj.id == \"\"".to_string());
        checks.push("obj.href == \"\"".to_string());
        checks.push("!obj.link".to_string());
    }
    for attr in &s.attributes {
        let field_name = names.private(&attr.name);
        let check = match calc.field_form(&attr.type_ref, attr.link) {
            ReferenceForm::ListContainer => format!("obj.{field_name}.Empty()"),
            ReferenceForm::Value => format!("obj.{field_name} == {}", calc.zero_value(&attr.type_ref)),
            ReferenceForm::Nullable => format!("obj.{field_name} == nil"),
        };
        checks.push(check);
    }

    let condition = if checks.is_empty() {
        "true".to_string()
    } else {
        checks.join(" &&\n\t\t")
    };

    format!(
        "// Empty returns true if the receiver is absent or every field is in its zero/empty state.\nfunc (obj *{public_name}) Empty() bool {{\n\treturn obj == nil || (\n\t\t{condition}\n\t)\n}}\n\n"
    )
}

fn class_accessors(public_name: &str) -> String {
    format!(
        r#"// Kind returns the discriminator that identifies this object as a full
// object, a link, or absent.
func (obj *{public_name}) Kind() string {{
	if obj == nil {{
		return {public_name}NilKind
	}}
	if obj.link {{
		return {public_name}LinkKind
	}}
	return {public_name}Kind
}}

// ID returns the identifier of the object.
func (obj *{public_name}) ID() string {{
	if obj != nil {{
		return obj.id
	}}
	return ""
}}

// GetID returns the identifier of the object and whether it was set.
func (obj *{public_name}) GetID() (value string, ok bool) {{
	ok = obj != nil && obj.id != ""
	if ok {{
		value = obj.id
	}}
	return
}}

// Link returns true if this is a link rather than an embedded object.
func (obj *{public_name}) Link() bool {{
	return obj != nil && obj.link
}}

// HREF returns the link to the object.
func (obj *{public_name}) HREF() string {{
	if obj != nil {{
		return obj.href
	}}
	return ""
}}

// GetHREF returns the link to the object and whether it was set.
func (obj *{public_name}) GetHREF() (value string, ok bool) {{
	ok = obj != nil && obj.href != ""
	if ok {{
		value = obj.href
	}}
	return
}}

"#
    )
}

fn attribute_accessors<N: NameCalculator>(
    names: &N,
    calc: &GoTypesCalculator<'_, N>,
    public_name: &str,
    attr: &Attribute,
) -> String {
    let field_name = names.private(&attr.name);
    let accessor_name = names.public(&attr.name);
    let probing_name = format!("Get{accessor_name}");
    let getter_type = calc.getter_type(&attr.type_ref, attr.link);
    let mut out = String::new();

    if let Some(doc) = &attr.doc {
        out.push_str(&format!("// {accessor_name} {doc}\n"));
    }

    match calc.getter_form(&attr.type_ref, attr.link) {
        ReferenceForm::Value => {
            let zero = calc.zero_value(&attr.type_ref);
            out.push_str(&format!(
                "func (obj *{public_name}) {accessor_name}() {getter_type} {{\n\tif obj != nil && obj.{field_name} != nil {{\n\t\treturn *obj.{field_name}\n\t}}\n\treturn {zero}\n}}\n\n"
            ));
            out.push_str(&format!(
                "func (obj *{public_name}) {probing_name}() (value {getter_type}, ok bool) {{\n\tok = obj != nil && obj.{field_name} != nil\n\tif ok {{\n\t\tvalue = *obj.{field_name}\n\t}}\n\treturn\n}}\n\n"
            ));
        }
        ReferenceForm::ListContainer => {
            out.push_str(&format!(
                "func (obj *{public_name}) {accessor_name}() {getter_type} {{\n\tif obj == nil {{\n\t\treturn {getter_type}{{}}\n\t}}\n\treturn obj.{field_name}\n}}\n\n"
            ));
            out.push_str(&format!(
                "func (obj *{public_name}) {probing_name}() (value {getter_type}, ok bool) {{\n\tok = obj != nil && !obj.{field_name}.Empty()\n\tif ok {{\n\t\tvalue = obj.{field_name}\n\t}}\n\treturn\n}}\n\n"
            ));
        }
        ReferenceForm::Nullable => {
            out.push_str(&format!(
                "func (obj *{public_name}) {accessor_name}() {getter_type} {{\n\tif obj == nil {{\n\t\treturn nil\n\t}}\n\treturn obj.{field_name}\n}}\n\n"
            ));
            out.push_str(&format!(
                "func (obj *{public_name}) {probing_name}() (value {getter_type}, ok bool) {{\n\tok = obj != nil && obj.{field_name} != nil\n\tif ok {{\n\t\tvalue = obj.{field_name}\n\t}}\n\treturn\n}}\n\n"
            ));
        }
    }
    out
}

/// The companion `<Name>List` container type every Struct gets (spec.md
/// §4.6.1): `href`, `link`, `items`, with kind constants mirroring the
/// struct when it is `class`, and `Len`/`Empty`/`Get`/`Slice`/`Each`/`Range`.
fn list_container(public_name: &str, class: bool) -> String {
    let list_name = format!("{public_name}List");
    let mut out = format!("type {list_name} struct {{\n\thref string\n\tlink bool\n\titems []*{public_name}\n}}\n\n");

    if class {
        out.push_str(&format!(
            "const (\n\t{list_name}Kind = \"{public_name}List\"\n\t{list_name}LinkKind = \"{public_name}ListLink\"\n\t{list_name}NilKind = \"{public_name}ListNil\"\n)\n\n"
        ));
    }

    out.push_str(&format!(
        r#"// Len returns the number of items in the list.
func (list *{list_name}) Len() int {{
	if list == nil {{
		return 0
	}}
	return len(list.items)
}}

// Empty returns true if the list is nil or has no items.
func (list *{list_name}) Empty() bool {{
	return list == nil || len(list.items) == 0
}}

// Get returns the item at the given index, or nil if the index is out of range.
func (list *{list_name}) Get(i int) *{public_name} {{
	if list == nil || i < 0 || i >= len(list.items) {{
		return nil
	}}
	return list.items[i]
}}

// Slice returns a defensive copy of the list's items.
func (list *{list_name}) Slice() []*{public_name} {{
	if list == nil {{
		return nil
	}}
	slice := make([]*{public_name}, len(list.items))
	copy(slice, list.items)
	return slice
}}

// Each runs f for every item in the list, in order.
func (list *{list_name}) Each(f func(item *{public_name}) bool) {{
	if list == nil {{
		return
	}}
	for _, item := range list.items {{
		if !f(item) {{
			break
		}}
	}}
}}

// Range runs f for every item in the list, stopping early if f returns false.
func (list *{list_name}) Range(f func(index int, item *{public_name}) bool) {{
	if list == nil {{
		return
	}}
	for i, item := range list.items {{
		if !f(i, item) {{
			break
		}}
	}}
}}

"#
    ));
    out
}

fn emit_block(
    package: &str,
    file: &str,
    body: String,
    registry: &FileRegistry,
    formatter: &dyn Formatter,
) -> Result<(), EmitError> {
    let mut bindings = Bindings::new();
    bindings.insert("body".to_string(), Value::Str(body));

    let buffer = TemplateBuffer::new(package.to_string(), file.to_string())
        .import("time", None)
        .emit("{{body}}", &bindings)?;

    buffer
        .write(formatter, registry)
        .map_err(|e| match e {
            crate::codegen::buffer::BufferError::Emit(emit_err) => emit_err,
            other => EmitError::Malformed(other.to_string()),
        })?;
    Ok(())
}

/// Exposed for emitters in sibling modules that need the enum/struct
/// shared helpers without re-deriving them (JSON and builders emitters
/// use the same field/attribute naming rules).
pub fn attribute_field_name<N: NameCalculator>(names: &N, attr: &Attribute) -> String {
    names.private(&attr.name)
}

pub fn attribute_accessor_name<N: NameCalculator>(names: &N, attr: &Attribute) -> String {
    names.public(&attr.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::formatter::GoFormatter;
    use crate::codegen::language::Go;
    use crate::model::types::{EnumValue, Scalar, TypeRef};
    use crate::model::{ModelBuilder, Resource, ServiceBuilder, VersionBuilder};
    use std::fs;

    fn n(s: &str) -> Name {
        Name::word(s).unwrap()
    }

    const NAMES: Go = Go;

    fn tmp_root(label: &str) -> String {
        format!("{}/apimodel_codegen_test_{}_{}", std::env::temp_dir().display(), label, std::process::id())
    }

    #[test]
    fn emits_enum_type_file_with_tagged_constants() {
        let root = tmp_root("enum");
        let _ = fs::remove_dir_all(&root);

        let e = Enum {
            name: n("cluster_state"),
            values: vec![
                EnumValue {
                    name: n("ready"),
                    doc: Some("the cluster is ready".to_string()),
                },
                EnumValue {
                    name: n("error"),
                    doc: None,
                },
            ],
        };
        let version = VersionBuilder::new(n("v1"))
            .add_enum(e)
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
        let emitter = TypesEmitter::new(&NAMES, &packages);
        let registry = FileRegistry::new();
        let reporter = Reporter::new();
        emitter.run(&model, &registry, &GoFormatter, &reporter);

        assert!(!reporter.has_errors(), "{:?}", reporter.records());
        let content = fs::read_to_string(format!("{root}/clusters_mgmt/v1/cluster_state_type.go")).unwrap();
        assert!(content.contains("type ClusterState string"));
        assert!(content.contains("ClusterStateReady ClusterState = \"ready\""));
        assert!(content.contains("ClusterStateError ClusterState = \"error\""));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn emits_class_struct_with_implicit_fields_and_list_container() {
        let root = tmp_root("struct");
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
        let emitter = TypesEmitter::new(&NAMES, &packages);
        let registry = FileRegistry::new();
        let reporter = Reporter::new();
        emitter.run(&model, &registry, &GoFormatter, &reporter);

        assert!(!reporter.has_errors(), "{:?}", reporter.records());
        let content = fs::read_to_string(format!("{root}/clusters_mgmt/v1/cluster_type.go")).unwrap();
        assert!(content.contains("type Cluster struct {"));
        assert!(content.contains("id string"));
        assert!(content.contains("href string"));
        assert!(content.contains("func (obj *Cluster) Kind() string"));
        assert!(content.contains("func (obj *Cluster) Name() string"));
        assert!(content.contains("func (obj *Cluster) GetName() (value string, ok bool)"));
        assert!(content.contains("type ClusterList struct {"));
        assert!(content.contains("func (list *ClusterList) Len() int"));
        assert!(content.contains("func (list *ClusterList) Range("));

        fs::remove_dir_all(&root).ok();
    }
}
