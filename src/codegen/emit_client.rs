// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Client Emitter (spec.md §4.6.5): mirror of the Server Adapter Emitter.
//! For every Resource, emits a `<name>_client.go` holding a `<Name>Client`
//! type, a constructor for the root resource, locator methods returning
//! sub-resource clients, and one call method per Method producing a typed
//! request and a typed response.
//!
//! Query parameter encoding, URL composition, and response-envelope
//! parsing mirror the server adapter's contract exactly (spec.md §4.6.5):
//! the same verb-per-`MethodKind` table, the same literal-vs-identified
//! locator path rule, and the same `{page,size,total,items}` envelope for
//! `List` methods decoded back into a response object field by field.

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

const COMPONENT: &str = "client_emitter";

fn client_file_name<N: NameCalculator>(names: &N, name: &Name) -> String {
    let suffixed = Name::cat(&[name, &Name::word("client").expect("valid word")]).expect("non-empty cat");
    names.file(&suffixed)
}

/// Emits one `<name>_client.go` file per Resource.
pub struct ClientEmitter<'a, N: NameCalculator> {
    names: &'a N,
    packages: &'a PackagesCalculator,
}

impl<'a, N: NameCalculator> ClientEmitter<'a, N> {
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
        let file = client_file_name(self.names, &resource.name);

        let mut body = String::new();
        for method in &resource.methods {
            body.push_str(&message_struct(
                self.names,
                &calc,
                &resource_public,
                method,
                request_params(method),
                "ClientRequest",
            ));
            body.push_str(&message_struct(
                self.names,
                &calc,
                &resource_public,
                method,
                response_params(method),
                "ClientResponse",
            ));
        }

        body.push_str(&client_type(&resource_public));
        body.push_str(&private_constructor(&resource_public));
        if is_root {
            body.push_str(&public_constructor(&resource_public));
        }
        body.push_str(&locator_methods(self.names, &resource_public, resource));
        for method in &resource.methods {
            body.push_str(&call_method(self.names, &calc, version, &resource_public, method));
        }

        let mut bindings = Bindings::new();
        bindings.insert("body".to_string(), Value::Str(body));

        TemplateBuffer::new(package.to_string(), file)
            .import("bytes", None)
            .import("context", None)
            .import("encoding/json", None)
            .import("fmt", None)
            .import("io", None)
            .import("net/http", None)
            .import("net/url", None)
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

fn http_method_for(kind: MethodKind) -> &'static str {
    match kind {
        MethodKind::List | MethodKind::Get => "http.MethodGet",
        MethodKind::Add | MethodKind::Action => "http.MethodPost",
        MethodKind::Update => "http.MethodPatch",
        MethodKind::Delete => "http.MethodDelete",
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

fn client_type(resource_public: &str) -> String {
    format!(
        "// {resource_public}Client calls the {resource_public} resource over HTTP. It\n// is never constructed directly except at the root; sub-resource clients\n// are obtained through locator methods.\ntype {resource_public}Client struct {{\n\thttpClient *http.Client\n\tbaseURL    string\n\tpath       string\n}}\n\n"
    )
}

fn private_constructor(resource_public: &str) -> String {
    let ctor = format!("new{resource_public}Client");
    format!(
        "func {ctor}(httpClient *http.Client, baseURL string, path string) *{resource_public}Client {{\n\treturn &{resource_public}Client{{httpClient: httpClient, baseURL: baseURL, path: path}}\n}}\n\n"
    )
}

fn public_constructor(resource_public: &str) -> String {
    format!(
        "// New{resource_public}Client constructs a client for the {resource_public}\n// resource at the root of an API served at baseURL.\nfunc New{resource_public}Client(httpClient *http.Client, baseURL string) *{resource_public}Client {{\n\treturn new{resource_public}Client(httpClient, baseURL, \"\")\n}}\n\n"
    )
}

fn locator_methods<N: NameCalculator>(names: &N, resource_public: &str, resource: &Resource) -> String {
    let mut out = String::new();
    for locator in &resource.locators {
        let public = names.public(&locator.name);
        let target_public = names.public(&locator.target);
        let tag = names.tag(&locator.name);
        if locator.identified {
            out.push_str(&format!(
                "func (c *{resource_public}Client) {public}(id string) *{target_public}Client {{\n\treturn new{target_public}Client(c.httpClient, c.baseURL, c.path+\"/\"+id)\n}}\n\n"
            ));
        } else {
            out.push_str(&format!(
                "func (c *{resource_public}Client) {public}() *{target_public}Client {{\n\treturn new{target_public}Client(c.httpClient, c.baseURL, c.path+\"/{tag}\")\n}}\n\n"
            ));
        }
    }
    out
}

fn encode_in_param<N: NameCalculator>(names: &N, version: &Version, p: &Parameter) -> String {
    let tag = names.tag(&p.name);
    let accessor = names.public(&p.name);

    if integer_cast(version, &p.type_ref).is_some() {
        return format!("\tquery.Set(\"{tag}\", fmt.Sprintf(\"%d\", request.{accessor}()))\n");
    }
    if matches!(resolved(version, &p.type_ref), Type::Scalar(Scalar::String)) {
        return format!("\tquery.Set(\"{tag}\", request.{accessor}())\n");
    }
    String::new()
}

fn build_request_body<N: NameCalculator>(names: &N, version: &Version, method: &Method) -> Option<(String, String)> {
    let body_param = request_params(method)
        .into_iter()
        .find(|p| struct_elem_name(names, version, &p.type_ref).is_some())?;
    let accessor = names.public(&body_param.name);
    let elem = struct_elem_name(names, version, &body_param.type_ref).expect("checked by find above");
    let code = format!(
        "\tpayload, err := Marshal{elem}(request.{accessor}())\n\tif err != nil {{\n\t\treturn nil, err\n\t}}\n\tbodyReader := bytes.NewReader(payload)\n"
    );
    Some((code, "bodyReader".to_string()))
}

fn parse_call_response<N: NameCalculator>(
    names: &N,
    calc: &GoTypesCalculator<'_, N>,
    version: &Version,
    resp_type: &str,
    method: &Method,
) -> String {
    let out_params = response_params(method);
    let mut out = format!("\tresponse := &{resp_type}{{}}\n");

    if out_params.is_empty() {
        out.push_str("\treturn response, nil\n");
        return out;
    }

    if method.kind == MethodKind::List {
        out.push_str(
            "\tvar envelope map[string]json.RawMessage\n\tif err := json.Unmarshal(body, &envelope); err != nil {\n\t\treturn nil, err\n\t}\n",
        );
        for p in &out_params {
            let tag = names.tag(&p.name);
            let accessor = names.public(&p.name);
            if let Some(elem) = list_of_struct_elem_name(names, version, &p.type_ref) {
                out.push_str(&format!(
                    "\tif raw, ok := envelope[\"{tag}\"]; ok {{\n\t\tvar rawItems []json.RawMessage\n\t\tif err := json.Unmarshal(raw, &rawItems); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\titems := make([]{elem}, 0, len(rawItems))\n\t\tfor _, item := range rawItems {{\n\t\t\tparsed, err := Unmarshal{elem}(item)\n\t\t\tif err != nil {{\n\t\t\t\treturn nil, err\n\t\t\t}}\n\t\t\titems = append(items, *parsed)\n\t\t}}\n\t\tresponse.Set{accessor}(items)\n\t}}\n"
                ));
            } else {
                let value_type = calc.getter_type(&p.type_ref, false);
                out.push_str(&format!(
                    "\tif raw, ok := envelope[\"{tag}\"]; ok {{\n\t\tvar value {value_type}\n\t\tif err := json.Unmarshal(raw, &value); err != nil {{\n\t\t\treturn nil, err\n\t\t}}\n\t\tresponse.Set{accessor}(value)\n\t}}\n"
                ));
            }
        }
        out.push_str("\treturn response, nil\n");
        return out;
    }

    let body_param = out_params
        .iter()
        .find(|p| struct_elem_name(names, version, &p.type_ref).is_some());
    match body_param {
        Some(p) => {
            let accessor = names.public(&p.name);
            let elem = struct_elem_name(names, version, &p.type_ref).expect("checked by find above");
            out.push_str(&format!(
                "\tparsed, err := Unmarshal{elem}(body)\n\tif err != nil {{\n\t\treturn nil, err\n\t}}\n\tresponse.Set{accessor}(parsed)\n\treturn response, nil\n"
            ));
        }
        None => out.push_str("\treturn response, nil\n"),
    }
    out
}

fn call_method<N: NameCalculator>(
    names: &N,
    calc: &GoTypesCalculator<'_, N>,
    version: &Version,
    resource_public: &str,
    method: &Method,
) -> String {
    let label = method_label(names, method);
    let req_type = format!("{resource_public}{label}ClientRequest");
    let resp_type = format!("{resource_public}{label}ClientResponse");
    let verb = http_method_for(method.kind);

    let mut out = format!(
        "// {label} calls the {resource_public} resource's {label} method over HTTP.\nfunc (c *{resource_public}Client) {label}(ctx context.Context, request *{req_type}) (*{resp_type}, error) {{\n"
    );

    let query_params: Vec<&Parameter> = request_params(method)
        .into_iter()
        .filter(|p| struct_elem_name(names, version, &p.type_ref).is_none())
        .collect();

    let body = build_request_body(names, version, method);

    if !query_params.is_empty() {
        out.push_str("\tquery := url.Values{}\n");
        for p in &query_params {
            out.push_str(&encode_in_param(names, version, p));
        }
    }

    let (body_code, body_arg) = match body {
        Some((code, arg)) => (code, arg),
        None => (String::new(), "nil".to_string()),
    };
    out.push_str(&body_code);

    out.push_str("\trequestURL := c.baseURL + c.path\n");
    if method.kind == MethodKind::Action {
        let tag = names.tag(&method.name);
        out.push_str(&format!("\trequestURL = requestURL + \"/{tag}\"\n"));
    }
    if !query_params.is_empty() {
        out.push_str("\tif len(query) > 0 {\n\t\trequestURL = requestURL + \"?\" + query.Encode()\n\t}\n");
    }

    out.push_str(&format!(
        "\thttpReq, err := http.NewRequestWithContext(ctx, {verb}, requestURL, {body_arg})\n\tif err != nil {{\n\t\treturn nil, err\n\t}}\n"
    ));
    if body_arg != "nil" {
        out.push_str("\thttpReq.Header.Set(\"Content-Type\", \"application/json\")\n");
    }
    out.push_str(
        "\thttpResp, err := c.httpClient.Do(httpReq)\n\tif err != nil {\n\t\treturn nil, err\n\t}\n\tdefer httpResp.Body.Close()\n\n\tbody, err := io.ReadAll(httpResp.Body)\n\tif err != nil {\n\t\treturn nil, err\n\t}\n\n\tif httpResp.StatusCode != http.StatusOK {\n\t\treturn nil, errors.Parse(httpResp.StatusCode, body)\n\t}\n\n",
    );
    out.push_str(&parse_call_response(names, calc, version, &resp_type, method));
    out.push_str("}\n\n");
    out
}
