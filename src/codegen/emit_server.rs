// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Server Adapter Emitter (spec.md §4.6.4): for every Resource, emits a
//! `<name>_server.go` holding a `<Name>Server` interface, one
//! `Dispatch<Name>` routing function, and request/response message types
//! per Method.
//!
//! Routing contract: `List`/`Get` answer `GET ""`, `Add` answers
//! `POST ""`, `Update` answers `PATCH ""`, `Delete` answers `DELETE ""`,
//! and `Action` answers `POST "/<action-name>"`. A Locator without an
//! identifier becomes a literal sub-path segment; one with an identifier
//! binds the next segment verbatim and passes it to the locator method
//! (spec.md §9: "pass the matched path segment verbatim"). The root
//! Resource additionally gets a `NewHandler` that performs the initial
//! `helpers.SplitPath` and the trailing-slash 404 check before handing
//! off to its own `Dispatch`.
//!
//! Request/response message types reuse the Types Calculator exactly as
//! Attributes do, with `link` fixed to `false` — Parameters carry no link
//! flag, so a Parameter typed as a list of structs is never a
//! `ListContainer`, only ever a plain nullable slice (spec.md §4.4's table
//! has no row for this combination; treating it as the `link=false` row
//! is the natural reading). Query decoding only covers `Integer`/`Long`/
//! `String` in-parameters and whole-body `Struct` in-parameters — the
//! shapes the evidence in spec.md §8 actually exercises; see DESIGN.md.

use crate::codegen::buffer::{Bindings, EmitError, FileRegistry, TemplateBuffer, Value};
use crate::codegen::formatter::Formatter;
use crate::model::graph::{Model, Version};
use crate::model::resource::{Direction, Method, MethodKind, Parameter, Resource};
use crate::model::types::{Scalar, Type, TypeRef};
use crate::names::calculator::NameCalculator;
use crate::names::nomenclature::Name;
use crate::packages::PackagesCalculator;
use crate::reporter::Reporter;
use crate::types_calc::{GoTypesCalculator, ReferenceForm};

const COMPONENT: &str = "server_emitter";

fn server_file_name<N: NameCalculator>(names: &N, name: &Name) -> String {
    let suffixed = Name::cat(&[name, &Name::word("server").expect("valid word")]).expect("non-empty cat");
    names.file(&suffixed)
}

/// Emits one `<name>_server.go` file per Resource.
pub struct ServerEmitter<'a, N: NameCalculator> {
    names: &'a N,
    packages: &'a PackagesCalculator,
}

impl<'a, N: NameCalculator> ServerEmitter<'a, N> {
    pub fn new(names: &'a N, packages: &'a PackagesCalculator) -> Self {
        Self { names, packages }
    }

    pub fn run(&self, model: &Model, registry: &FileRegistry, formatter: &dyn Formatter, reporter: &Reporter) {
        for service in model.services() {
            for version in service.versions() {
                let package = self.packages.version_package(service, version);
                for resource in version.resources() {
                    let is_root = resource.name.equals(&version.root_resource().name);
                    if let Err(e) = self.emit_resource(&package, version, resource, is_root, registry, formatter) {
                        reporter.error(COMPONENT, e.to_string());
                    }
                }
            }
        }
    }

    fn emit_resource(
        &self,
        package: &str,
        version: &Version,
        resource: &Resource,
        is_root: bool,
        registry: &FileRegistry,
        formatter: &dyn Formatter,
    ) -> Result<(), EmitError> {
        let calc = GoTypesCalculator::new(version, self.names);
        let resource_public = self.names.public(&resource.name);
        let file = server_file_name(self.names, &resource.name);

        let mut body = String::new();
        for method in &resource.methods {
            body.push_str(&message_struct(
                self.names,
                &calc,
                &resource_public,
                method,
                request_params(method),
                "ServerRequest",
            ));
            body.push_str(&message_struct(
                self.names,
                &calc,
                &resource_public,
                method,
                response_params(method),
                "ServerResponse",
            ));
        }

        body.push_str(&server_interface(self.names, &resource_public, resource));
        body.push_str(&dispatch_function(self.names, &resource_public, resource));
        for method in &resource.methods {
            body.push_str(&handler_function(self.names, version, &resource_public, method));
        }

        if is_root {
            body.push_str(&root_handler(&resource_public));
        }

        let mut bindings = Bindings::new();
        bindings.insert("body".to_string(), Value::Str(body));

        TemplateBuffer::new(package.to_string(), file)
            .import("context", None)
            .import("encoding/json", None)
            .import("io", None)
            .import("net/http", None)
            .import(self.packages.helpers_package(), None)
            .import(self.packages.errors_package(), None)
            .emit("{{body}}", &bindings)?
            .write(formatter, registry)
            .map_err(|e| match e {
                crate::codegen::buffer::BufferError::Emit(emit_err) => emit_err,
                other => EmitError::Malformed(other.to_string()),
            })?;
        Ok(())
    }
}

fn request_params(method: &Method) -> Vec<&Parameter> {
    method
        .parameters
        .iter()
        .filter(|p| matches!(p.direction, Direction::In | Direction::InOut))
        .collect()
}

fn response_params(method: &Method) -> Vec<&Parameter> {
    method
        .parameters
        .iter()
        .filter(|p| matches!(p.direction, Direction::Out | Direction::InOut))
        .collect()
}

/// The label used in a method's generated identifiers: the kind name for
/// the five fixed kinds, the method's own name for `Action` (spec.md
/// §4.6.4: action name becomes the sub-path segment, so it is also the
/// natural disambiguator when a resource has more than one action).
fn method_label<N: NameCalculator>(names: &N, method: &Method) -> String {
    match method.kind {
        MethodKind::List => "List".to_string(),
        MethodKind::Add => "Add".to_string(),
        MethodKind::Get => "Get".to_string(),
        MethodKind::Update => "Update".to_string(),
        MethodKind::Delete => "Delete".to_string(),
        MethodKind::Action => names.public(&method.name),
    }
}

fn message_struct<N: NameCalculator>(
    names: &N,
    calc: &GoTypesCalculator<'_, N>,
    resource_public: &str,
    method: &Method,
    params: Vec<&Parameter>,
    suffix: &str,
) -> String {
    let label = method_label(names, method);
    let struct_name = format!("{resource_public}{label}{suffix}");

    let mut out = format!("type {struct_name} struct {{\n");
    for p in &params {
        let field = names.private(&p.name);
        let ty = calc.field_type(&p.type_ref, false);
        out.push_str(&format!("\t{field} {ty}\n"));
    }
    out.push_str("}\n\n");

    for p in &params {
        out.push_str(&message_accessors(names, calc, &struct_name, p));
    }
    out
}

fn message_accessors<N: NameCalculator>(
    names: &N,
    calc: &GoTypesCalculator<'_, N>,
    struct_name: &str,
    p: &Parameter,
) -> String {
    let field = names.private(&p.name);
    let accessor = names.public(&p.name);
    let getter_type = calc.getter_type(&p.type_ref, false);

    match calc.getter_form(&p.type_ref, false) {
        ReferenceForm::Value => {
            let zero = calc.zero_value(&p.type_ref);
            format!(
                "func (r *{struct_name}) {accessor}() {getter_type} {{\n\tif r.{field} == nil {{\n\t\treturn {zero}\n\t}}\n\treturn *r.{field}\n}}\n\nfunc (r *{struct_name}) Get{accessor}() ({getter_type}, bool) {{\n\tif r.{field} == nil {{\n\t\treturn {zero}, false\n\t}}\n\treturn *r.{field}, true\n}}\n\nfunc (r *{struct_name}) Set{accessor}(value {getter_type}) {{\n\tr.{field} = &value\n}}\n\n"
            )
        }
        ReferenceForm::Nullable | ReferenceForm::ListContainer => format!(
            "func (r *{struct_name}) {accessor}() {getter_type} {{\n\treturn r.{field}\n}}\n\nfunc (r *{struct_name}) Get{accessor}() ({getter_type}, bool) {{\n\treturn r.{field}, r.{field} != nil\n}}\n\nfunc (r *{struct_name}) Set{accessor}(value {getter_type}) {{\n\tr.{field} = value\n}}\n\n"
        ),
    }
}

fn resolved<'v>(version: &'v Version, type_ref: &'v TypeRef) -> Type<'v> {
    version
        .resolve(type_ref)
        .expect("type_ref is validated to resolve by ModelBuilder::build")
}

fn integer_cast(version: &Version, type_ref: &TypeRef) -> Option<&'static str> {
    match resolved(version, type_ref) {
        Type::Scalar(Scalar::Integer) => Some("int32"),
        Type::Scalar(Scalar::Long) => Some("int64"),
        _ => None,
    }
}

fn struct_elem_name<N: NameCalculator>(names: &N, version: &Version, type_ref: &TypeRef) -> Option<String> {
    match resolved(version, type_ref) {
        Type::Struct(s) => Some(names.public(&s.name)),
        _ => None,
    }
}

fn list_of_struct_elem_name<N: NameCalculator>(names: &N, version: &Version, type_ref: &TypeRef) -> Option<String> {
    match resolved(version, type_ref) {
        Type::List(elem) => match version.resolve(elem) {
            Some(Type::Struct(s)) => Some(names.public(&s.name)),
            _ => None,
        },
        _ => None,
    }
}

fn server_interface<N: NameCalculator>(names: &N, resource_public: &str, resource: &Resource) -> String {
    let mut out = format!(
        "// {resource_public}Server is implemented by the application to serve the\n// {resource_public} resource.\ntype {resource_public}Server interface {{\n"
    );
    for method in &resource.methods {
        let label = method_label(names, method);
        out.push_str(&format!(
            "\t{label}(ctx context.Context, request *{resource_public}{label}ServerRequest, response *{resource_public}{label}ServerResponse) error\n"
        ));
    }
    for locator in &resource.locators {
        let public = names.public(&locator.name);
        let target_public = names.public(&locator.target);
        if locator.identified {
            out.push_str(&format!("\t{public}(id string) {target_public}Server\n"));
        } else {
            out.push_str(&format!("\t{public}() {target_public}Server\n"));
        }
    }
    out.push_str("}\n\n");
    out
}

fn dispatch_function<N: NameCalculator>(names: &N, resource_public: &str, resource: &Resource) -> String {
    let mut out = format!(
        "// Dispatch{resource_public} routes one HTTP request already trimmed to the\n// path segments addressing this resource (as produced by\n// helpers.SplitPath) to the matching Method, Locator, or a 404/405.\nfunc Dispatch{resource_public}(w http.ResponseWriter, r *http.Request, segments []string, server {resource_public}Server) {{\n\tif len(segments) == 0 {{\n\t\tswitch r.Method {{\n"
    );

    if let Some(method) = resource.method(MethodKind::List).or_else(|| resource.method(MethodKind::Get)) {
        let label = method_label(names, method);
        out.push_str(&format!(
            "\t\tcase http.MethodGet:\n\t\t\thandle{resource_public}{label}(w, r, server)\n\t\t\treturn\n"
        ));
    }
    if let Some(method) = resource.method(MethodKind::Add) {
        let label = method_label(names, method);
        out.push_str(&format!(
            "\t\tcase http.MethodPost:\n\t\t\thandle{resource_public}{label}(w, r, server)\n\t\t\treturn\n"
        ));
    }
    if let Some(method) = resource.method(MethodKind::Update) {
        let label = method_label(names, method);
        out.push_str(&format!(
            "\t\tcase http.MethodPatch:\n\t\t\thandle{resource_public}{label}(w, r, server)\n\t\t\treturn\n"
        ));
    }
    if let Some(method) = resource.method(MethodKind::Delete) {
        let label = method_label(names, method);
        out.push_str(&format!(
            "\t\tcase http.MethodDelete:\n\t\t\thandle{resource_public}{label}(w, r, server)\n\t\t\treturn\n"
        ));
    }
    out.push_str(
        "\t\t}\n\t\terrors.Write(w, http.StatusMethodNotAllowed, \"method not allowed\")\n\t\treturn\n\t}\n\n",
    );

    let actions: Vec<&Method> = resource.methods.iter().filter(|m| m.kind == MethodKind::Action).collect();
    let literal_locators: Vec<_> = resource.locators.iter().filter(|l| !l.identified).collect();
    let identified_locator = resource.locators.iter().find(|l| l.identified);
    let has_locators = !literal_locators.is_empty() || identified_locator.is_some();

    // `segment`/`rest` are only declared when something downstream actually
    // consumes them: a leaf resource (no actions, no locators) would
    // otherwise leave both unused, which Go rejects at compile time. Actions
    // only ever switch on `segment`; only a locator (literal or identified)
    // forwards `rest` onward.
    if !has_locators && actions.is_empty() {
        out.push_str("\terrors.Write(w, http.StatusNotFound, \"not found\")\n}\n\n");
        return out;
    }
    if has_locators {
        out.push_str("\tsegment := segments[0]\n\trest := segments[1:]\n\n");
    } else {
        out.push_str("\tsegment := segments[0]\n\n");
    }

    if !actions.is_empty() {
        out.push_str("\tswitch segment {\n");
        for action in &actions {
            let tag = names.tag(&action.name);
            let label = method_label(names, action);
            out.push_str(&format!(
                "\tcase \"{tag}\":\n\t\tif r.Method != http.MethodPost {{\n\t\t\terrors.Write(w, http.StatusMethodNotAllowed, \"method not allowed\")\n\t\t\treturn\n\t\t}}\n\t\thandle{resource_public}{label}(w, r, server)\n\t\treturn\n"
            ));
        }
        out.push_str("\t}\n\n");
    }

    if !literal_locators.is_empty() {
        out.push_str("\tswitch segment {\n");
        for locator in &literal_locators {
            let tag = names.tag(&locator.name);
            let public = names.public(&locator.name);
            let target_public = names.public(&locator.target);
            out.push_str(&format!(
                "\tcase \"{tag}\":\n\t\tDispatch{target_public}(w, r, rest, server.{public}())\n\t\treturn\n"
            ));
        }
        out.push_str("\t}\n\n");
    }

    match identified_locator {
        Some(locator) => {
            let public = names.public(&locator.name);
            let target_public = names.public(&locator.target);
            out.push_str(&format!(
                "\tDispatch{target_public}(w, r, rest, server.{public}(segment))\n}}\n\n"
            ));
        }
        None => {
            out.push_str("\terrors.Write(w, http.StatusNotFound, \"not found\")\n}\n\n");
        }
    }

    out
}

fn parse_in_param<N: NameCalculator>(names: &N, version: &Version, p: &Parameter) -> String {
    let tag = names.tag(&p.name);
    let accessor = names.public(&p.name);

    if let Some(goint) = integer_cast(version, &p.type_ref) {
        return format!(
            "\t{{\n\t\tparsed, ok := helpers.ParseIntQuery(r.URL.Query(), \"{tag}\")\n\t\tif !ok {{\n\t\t\terrors.Write(w, http.StatusBadRequest, \"malformed query parameter \\\"{tag}\\\"\")\n\t\t\treturn\n\t\t}}\n\t\trequest.Set{accessor}({goint}(parsed))\n\t}}\n"
        );
    }
    if let Some(elem) = struct_elem_name(names, version, &p.type_ref) {
        return format!(
            "\t{{\n\t\tpayload, err := io.ReadAll(r.Body)\n\t\tif err != nil {{\n\t\t\terrors.Write(w, http.StatusBadRequest, err.Error())\n\t\t\treturn\n\t\t}}\n\t\tparsed, err := Unmarshal{elem}(payload)\n\t\tif err != nil {{\n\t\t\terrors.Write(w, http.StatusBadRequest, err.Error())\n\t\t\treturn\n\t\t}}\n\t\trequest.Set{accessor}(parsed)\n\t}}\n"
        );
    }
    if matches!(resolved(version, &p.type_ref), Type::Scalar(Scalar::String)) {
        return format!("\trequest.Set{accessor}(r.URL.Query().Get(\"{tag}\"))\n");
    }
    String::new()
}

/// Builds, for each out-parameter in declaration order, the Go statements
/// that set one key of `var` (a `*helpers.OrderedObject`) — a list-of-struct
/// out-parameter is first encoded item-by-item into a `[]json.RawMessage`,
/// everything else is set directly. `var`'s keys therefore come out in
/// exactly the order the Method declares its out-parameters, never
/// reordered by Go's alphabetical `map` key serialization (spec.md §4.6.4(4),
/// §6).
fn envelope_sets<N: NameCalculator>(names: &N, version: &Version, out_params: &[&Parameter], var: &str) -> (String, String) {
    let mut items_decl = String::new();
    let mut sets = String::new();
    for p in out_params {
        let tag = names.tag(&p.name);
        let accessor = names.public(&p.name);
        if let Some(elem) = list_of_struct_elem_name(names, version, &p.type_ref) {
            let item_var = format!("items{accessor}");
            items_decl.push_str(&format!(
                "\t{item_var} := make([]json.RawMessage, 0, len(response.{accessor}()))\n\tfor _, item := range response.{accessor}() {{\n\t\tencoded, err := Marshal{elem}(&item)\n\t\tif err != nil {{\n\t\t\terrors.Write(w, http.StatusInternalServerError, err.Error())\n\t\t\treturn\n\t\t}}\n\t\t{item_var} = append({item_var}, encoded)\n\t}}\n"
            ));
            sets.push_str(&format!(
                "\tif err := {var}.Set(\"{tag}\", {item_var}); err != nil {{\n\t\terrors.Write(w, http.StatusInternalServerError, err.Error())\n\t\treturn\n\t}}\n"
            ));
        } else {
            sets.push_str(&format!(
                "\tif err := {var}.Set(\"{tag}\", response.{accessor}()); err != nil {{\n\t\terrors.Write(w, http.StatusInternalServerError, err.Error())\n\t\treturn\n\t}}\n"
            ));
        }
    }
    (items_decl, sets)
}

fn emit_success_response<N: NameCalculator>(names: &N, version: &Version, method: &Method) -> String {
    let out_params = response_params(method);

    if method.kind == MethodKind::List {
        let (items_decl, sets) = envelope_sets(names, version, &out_params, "envelope");
        return format!(
            "{items_decl}\tenvelope := &helpers.OrderedObject{{}}\n{sets}\tencoded, err := envelope.MarshalJSON()\n\tif err != nil {{\n\t\terrors.Write(w, http.StatusInternalServerError, err.Error())\n\t\treturn\n\t}}\n\tw.Header().Set(\"Content-Type\", \"application/json\")\n\tw.WriteHeader(http.StatusOK)\n\t_, _ = w.Write(encoded)\n"
        );
    }

    let body_param = out_params
        .iter()
        .find(|p| struct_elem_name(names, version, &p.type_ref).is_some());

    match body_param {
        Some(p) => {
            let accessor = names.public(&p.name);
            let elem = struct_elem_name(names, version, &p.type_ref).expect("checked by find above");
            format!(
                "\tencoded, err := Marshal{elem}(response.{accessor}())\n\tif err != nil {{\n\t\terrors.Write(w, http.StatusInternalServerError, err.Error())\n\t\treturn\n\t}}\n\tw.Header().Set(\"Content-Type\", \"application/json\")\n\tw.WriteHeader(http.StatusOK)\n\t_, _ = w.Write(encoded)\n"
            )
        }
        None if out_params.is_empty() => "\tw.WriteHeader(http.StatusOK)\n".to_string(),
        // Scalar/enum out-parameters with no struct body: still a JSON
        // object, built the same data-driven way as the List envelope, so
        // these values reach the caller instead of being silently dropped.
        None => {
            let (items_decl, sets) = envelope_sets(names, version, &out_params, "body");
            format!(
                "{items_decl}\tbody := &helpers.OrderedObject{{}}\n{sets}\tencoded, err := body.MarshalJSON()\n\tif err != nil {{\n\t\terrors.Write(w, http.StatusInternalServerError, err.Error())\n\t\treturn\n\t}}\n\tw.Header().Set(\"Content-Type\", \"application/json\")\n\tw.WriteHeader(http.StatusOK)\n\t_, _ = w.Write(encoded)\n"
            )
        }
    }
}

fn handler_function<N: NameCalculator>(names: &N, version: &Version, resource_public: &str, method: &Method) -> String {
    let label = method_label(names, method);
    let req_type = format!("{resource_public}{label}ServerRequest");
    let resp_type = format!("{resource_public}{label}ServerResponse");

    let mut out = format!(
        "func handle{resource_public}{label}(w http.ResponseWriter, r *http.Request, server {resource_public}Server) {{\n\trequest := &{req_type}{{}}\n"
    );
    for p in request_params(method) {
        out.push_str(&parse_in_param(names, version, p));
    }
    out.push_str(&format!(
        "\tresponse := &{resp_type}{{}}\n\tif err := server.{label}(r.Context(), request, response); err != nil {{\n\t\terrors.Write(w, http.StatusInternalServerError, err.Error())\n\t\treturn\n\t}}\n"
    ));
    out.push_str(&emit_success_response(names, version, method));
    out.push_str("}\n\n");
    out
}

fn root_handler(resource_public: &str) -> String {
    format!(
        "// NewHandler returns an http.Handler serving the {resource_public} resource\n// as the root of the API: it performs the initial path split and the\n// trailing-slash 404 check before handing off to Dispatch{resource_public}.\nfunc NewHandler(server {resource_public}Server) http.Handler {{\n\treturn http.HandlerFunc(func(w http.ResponseWriter, r *http.Request) {{\n\t\tsegments, ok := helpers.SplitPath(r.URL.Path)\n\t\tif !ok {{\n\t\t\terrors.Write(w, http.StatusNotFound, \"not found\")\n\t\t\treturn\n\t\t}}\n\t\tDispatch{resource_public}(w, r, segments, server)\n\t}})\n}}\n"
    )
}
