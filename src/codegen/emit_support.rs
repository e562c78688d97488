// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Support Emitter: the two cross-version packages named by the Packages
//! Calculator (spec.md §4.3) but not owned by any single Version —
//! `HelpersPackage()` (path splitting and query parsing shared by every
//! Server Adapter and Client) and `ErrorsPackage()` (the `{"kind":"Error",
//! "id":"…","reason":"…"}` body spec.md §7 requires on every HTTP 500).
//!
//! Both are emitted exactly once per run, before any per-version emitter,
//! since every server/client file they run against imports these packages.

use crate::codegen::buffer::{Bindings, EmitError, FileRegistry, TemplateBuffer};
use crate::codegen::formatter::Formatter;
use crate::packages::PackagesCalculator;
use crate::reporter::Reporter;

const COMPONENT: &str = "support_emitter";

/// Emits the `helpers` and `errors` packages once per generator run.
pub struct SupportEmitter<'a> {
    packages: &'a PackagesCalculator,
}

impl<'a> SupportEmitter<'a> {
    pub fn new(packages: &'a PackagesCalculator) -> Self {
        Self { packages }
    }

    pub fn run(&self, registry: &FileRegistry, formatter: &dyn Formatter, reporter: &Reporter) {
        if let Err(e) = self.emit_helpers(registry, formatter) {
            reporter.error(COMPONENT, e.to_string());
        }
        if let Err(e) = self.emit_ordered_object(registry, formatter) {
            reporter.error(COMPONENT, e.to_string());
        }
        if let Err(e) = self.emit_errors(registry, formatter) {
            reporter.error(COMPONENT, e.to_string());
        }
    }

    fn emit_helpers(&self, registry: &FileRegistry, formatter: &dyn Formatter) -> Result<(), EmitError> {
        let package = self.packages.helpers_package();
        let body = r#"// SplitPath splits an HTTP request path into routing segments. A path of
// exactly "/" yields zero segments. A path ending in "/" (other than the
// root) is rejected: ok is false, and the caller must respond 404 without
// inspecting segments further.
func SplitPath(path string) (segments []string, ok bool) {
	trimmed := strings.TrimPrefix(path, "/")
	if trimmed == "" {
		return nil, true
	}
	if strings.HasSuffix(trimmed, "/") {
		return nil, false
	}
	return strings.Split(trimmed, "/"), true
}

// ParseIntQuery reads an integer query parameter, defaulting to zero when
// absent. ok is false only when the parameter is present but malformed,
// which callers translate to HTTP 400.
func ParseIntQuery(values url.Values, name string) (value int, ok bool) {
	raw := values.Get(name)
	if raw == "" {
		return 0, true
	}
	parsed, err := strconv.Atoi(raw)
	if err != nil {
		return 0, false
	}
	return parsed, true
}
"#
        .to_string();

        let mut bindings = Bindings::new();
        bindings.insert("body".to_string(), crate::codegen::buffer::Value::Str(body));

        TemplateBuffer::new(package, "path_helpers.go")
            .import("net/url", None)
            .import("strconv", None)
            .import("strings", None)
            .emit("{{body}}", &bindings)?
            .write(formatter, registry)
            .map_err(to_emit_error)?;
        Ok(())
    }

    fn emit_ordered_object(&self, registry: &FileRegistry, formatter: &dyn Formatter) -> Result<(), EmitError> {
        let package = self.packages.helpers_package();
        let body = r#"// OrderedObject builds a JSON object that preserves the insertion order of
// its keys. encoding/json sorts map[string]... keys alphabetically, which
// would scramble the fixed field order generated envelopes (a List
// response's "page"/"size"/"total"/"items", a class object's
// "kind"/"id"/"href") are required to have.
type OrderedObject struct {
	keys   []string
	values []json.RawMessage
}

// Set encodes value and appends it under key, preserving call order.
func (o *OrderedObject) Set(key string, value interface{}) error {
	encoded, err := json.Marshal(value)
	if err != nil {
		return err
	}
	o.keys = append(o.keys, key)
	o.values = append(o.values, encoded)
	return nil
}

// SetRaw appends an already-encoded value under key, preserving call order.
func (o *OrderedObject) SetRaw(key string, value json.RawMessage) {
	o.keys = append(o.keys, key)
	o.values = append(o.values, value)
}

// MarshalJSON renders the object with keys in the order they were Set.
func (o *OrderedObject) MarshalJSON() ([]byte, error) {
	var buf bytes.Buffer
	buf.WriteByte('{')
	for i, key := range o.keys {
		if i > 0 {
			buf.WriteByte(',')
		}
		encodedKey, err := json.Marshal(key)
		if err != nil {
			return nil, err
		}
		buf.Write(encodedKey)
		buf.WriteByte(':')
		buf.Write(o.values[i])
	}
	buf.WriteByte('}')
	return buf.Bytes(), nil
}
"#
        .to_string();

        let mut bindings = Bindings::new();
        bindings.insert("body".to_string(), crate::codegen::buffer::Value::Str(body));

        TemplateBuffer::new(package, "ordered_object.go")
            .import("bytes", None)
            .import("encoding/json", None)
            .emit("{{body}}", &bindings)?
            .write(formatter, registry)
            .map_err(to_emit_error)?;
        Ok(())
    }

    fn emit_errors(&self, registry: &FileRegistry, formatter: &dyn Formatter) -> Result<(), EmitError> {
        let package = self.packages.errors_package();
        let body = r#"// Error is the JSON body written for every HTTP 500 a generated server
// adapter returns when the user implementation reports an error (spec
// error taxonomy: "HTTP 500 with a JSON error body").
type Error struct {
	Kind   string `json:"kind"`
	ID     string `json:"id"`
	Reason string `json:"reason"`
}

// Write serializes err as the standard error body and writes it with the
// given HTTP status code.
func Write(w http.ResponseWriter, status int, reason string) {
	w.Header().Set("Content-Type", "application/json")
	w.WriteHeader(status)
	body := Error{Kind: "Error", ID: "", Reason: reason}
	encoded, err := json.Marshal(body)
	if err != nil {
		return
	}
	_, _ = w.Write(encoded)
}

// Parse turns a non-200 client response into a Go error, decoding the
// standard error body when present and falling back to the raw body text
// when it isn't JSON (a misbehaving or non-generated peer).
func Parse(status int, body []byte) error {
	var decoded Error
	if err := json.Unmarshal(body, &decoded); err != nil || decoded.Reason == "" {
		return fmt.Errorf("request failed with status %d: %s", status, string(body))
	}
	return fmt.Errorf("request failed with status %d: %s", status, decoded.Reason)
}
"#
        .to_string();

        let mut bindings = Bindings::new();
        bindings.insert("body".to_string(), crate::codegen::buffer::Value::Str(body));

        TemplateBuffer::new(package, "error_type.go")
            .import("encoding/json", None)
            .import("fmt", None)
            .import("net/http", None)
            .emit("{{body}}", &bindings)?
            .write(formatter, registry)
            .map_err(to_emit_error)?;
        Ok(())
    }
}

fn to_emit_error(e: crate::codegen::buffer::BufferError) -> EmitError {
    match e {
        crate::codegen::buffer::BufferError::Emit(emit_err) => emit_err,
        other => EmitError::Malformed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::formatter::GoFormatter;
    use std::fs;

    fn tmp_root(label: &str) -> String {
        format!(
            "{}/apimodel_codegen_test_support_{}_{}",
            std::env::temp_dir().display(),
            label,
            std::process::id()
        )
    }

    #[test]
    fn emits_helpers_and_errors_packages() {
        let root = tmp_root("ok");
        let _ = fs::remove_dir_all(&root);

        let packages = PackagesCalculator::new(root.as_str());
        let emitter = SupportEmitter::new(&packages);
        let registry = FileRegistry::new();
        let reporter = Reporter::new();
        emitter.run(&registry, &GoFormatter, &reporter);

        assert!(!reporter.has_errors(), "{:?}", reporter.records());
        let helpers = fs::read_to_string(format!("{root}/helpers/path_helpers.go")).unwrap();
        assert!(helpers.contains("package helpers"));
        assert!(helpers.contains("func SplitPath(path string)"));

        let ordered = fs::read_to_string(format!("{root}/helpers/ordered_object.go")).unwrap();
        assert!(ordered.contains("package helpers"));
        assert!(ordered.contains("type OrderedObject struct"));
        assert!(ordered.contains("func (o *OrderedObject) Set(key string, value interface{}) error"));
        assert!(ordered.contains("func (o *OrderedObject) MarshalJSON() ([]byte, error)"));
        assert!(helpers.contains("func ParseIntQuery("));

        let errors = fs::read_to_string(format!("{root}/errors/error_type.go")).unwrap();
        assert!(errors.contains("package errors"));
        assert!(errors.contains(r#"Kind   string `json:"kind"`"#));
        assert!(errors.contains("func Write(w http.ResponseWriter, status int, reason string)"));
        assert!(errors.contains("func Parse(status int, body []byte) error"));

        fs::remove_dir_all(&root).ok();
    }
}
