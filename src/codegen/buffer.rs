// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Template Buffer: a single-file emission context (spec.md §4.5).
//!
//! A buffer's lifecycle is the one nontrivial state machine in this crate
//! (spec.md §4.9): `{Open → HasContent → Written}`. `Package`/`File` are
//! required to construct a buffer at all — so "required before any Emit"
//! holds trivially rather than needing a third typestate axis — `Emit`
//! moves `Open` to `HasContent` and keeps `HasContent` at `HasContent`,
//! and `Write` is only defined on `HasContent`, consumes the buffer, and
//! therefore cannot be called twice: exactly the guarantee spec.md asks
//! for, enforced at compile time the same way
//! [`crate::model::builder::VersionBuilder`]'s root-resource typestate is.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::rc::Rc;

use regex::Regex;
use thiserror::Error;

use crate::codegen::formatter::Formatter;

/// A helper callable bound to a template name via [`TemplateBuffer::function`].
pub type Helper = Rc<dyn Fn(&[String]) -> String>;

/// A value a template expression may reference.
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Bool(bool),
    /// A repeated block's items; each item is its own binding scope,
    /// overlaid on the scope the `{{#each}}` tag was evaluated in.
    List(Vec<Bindings>),
}

/// The binding scope a template is rendered against.
pub type Bindings = BTreeMap<String, Value>;

/// Errors raised expanding one template (spec.md §7 "Emission error").
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("template references unknown name `{0}`")]
    UnknownBinding(String),

    #[error("template references unknown helper `{0}`")]
    UnknownHelper(String),

    #[error("malformed template: {0}")]
    Malformed(String),
}

/// Errors raised claiming or writing an output file.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error("output path `{0}` was already written in this run")]
    FileCollision(String),

    #[error("io error writing `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Tracks output paths claimed across every buffer in one run, so a
/// collision between two emitters targeting the same file is fatal
/// (spec.md §4.5: "file must not already exist in this run").
#[derive(Debug, Default)]
pub struct FileRegistry(RefCell<BTreeSet<String>>);

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, path: &str) -> Result<(), BufferError> {
        if !self.0.borrow_mut().insert(path.to_string()) {
            return Err(BufferError::FileCollision(path.to_string()));
        }
        Ok(())
    }
}

/// Typestate marker: no content emitted yet.
pub struct Open;
/// Typestate marker: at least one `Emit` has run.
pub struct HasContent;
/// Typestate marker: `Write` has run; the buffer is inert.
pub struct Written;

/// Sealed trait restricting `function`/`import`/`emit` to the states that
/// may still accept them (`Open`, `HasContent` — not `Written`).
pub trait EmittableState: private::Sealed {}
impl EmittableState for Open {}
impl EmittableState for HasContent {}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Open {}
    impl Sealed for super::HasContent {}
    impl Sealed for super::Written {}
}

/// A single-file emission context. See module docs for the state machine.
pub struct TemplateBuffer<S> {
    package: String,
    file: String,
    imports: BTreeMap<String, Option<String>>,
    body: String,
    functions: BTreeMap<String, Helper>,
    _state: PhantomData<S>,
}

impl TemplateBuffer<Open> {
    /// Opens a buffer for one output file. `package` and `file` identify
    /// its output location up front, since spec.md requires they be set
    /// before any `Emit`.
    pub fn new(package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            file: file.into(),
            imports: BTreeMap::new(),
            body: String::new(),
            functions: BTreeMap::new(),
            _state: PhantomData,
        }
    }
}

impl<S: EmittableState> TemplateBuffer<S> {
    /// Binds a helper callable to a template name, lexically scoped to
    /// this buffer.
    pub fn function(mut self, name: impl Into<String>, helper: Helper) -> Self {
        self.functions.insert(name.into(), helper);
        self
    }

    /// Records that this file depends on `path`. Deduplicated; `alias`
    /// overrides the identifier used to detect usage for elision.
    pub fn import(mut self, path: impl Into<String>, alias: Option<&str>) -> Self {
        self.imports
            .insert(path.into(), alias.map(ToString::to_string));
        self
    }

    /// Expands `template` against `bindings` (falling back to any bound
    /// helpers for calls) and appends the result. Moves the buffer into
    /// `HasContent`.
    pub fn emit(
        self,
        template: &str,
        bindings: &Bindings,
    ) -> Result<TemplateBuffer<HasContent>, EmitError> {
        let rendered = render(template, bindings, &self.functions)?;
        let mut body = self.body;
        body.push_str(&rendered);
        Ok(TemplateBuffer {
            package: self.package,
            file: self.file,
            imports: self.imports,
            body,
            functions: self.functions,
            _state: PhantomData,
        })
    }
}

impl TemplateBuffer<HasContent> {
    /// Renders this buffer's final source text: deterministic, deduplicated,
    /// usage-elided imports followed by the accumulated body. Exposed so
    /// tests and snapshots can assert on text without touching disk.
    pub fn render_source(&self) -> String {
        let mut out = String::new();
        let short_name = self.package.rsplit('/').next().unwrap_or(&self.package);
        out.push_str(&format!("package {}\n\n", short_name));

        let used: Vec<&String> = self
            .imports
            .keys()
            .filter(|path| self.import_is_used(path))
            .collect();

        if !used.is_empty() {
            out.push_str("import (\n");
            for path in &used {
                match self.imports.get(*path).and_then(|a| a.as_ref()) {
                    Some(alias) => out.push_str(&format!("\t{} \"{}\"\n", alias, path)),
                    None => out.push_str(&format!("\t\"{}\"\n", path)),
                }
            }
            out.push_str(")\n\n");
        }

        out.push_str(&self.body);
        out
    }

    fn import_is_used(&self, path: &str) -> bool {
        let ident = match self.imports.get(path).and_then(|a| a.as_ref()) {
            Some(alias) => alias.clone(),
            None => path.rsplit('/').next().unwrap_or(path).to_string(),
        };
        let pattern = format!(r"\b{}\.", regex::escape(&ident));
        Regex::new(&pattern)
            .map(|re| re.is_match(&self.body))
            .unwrap_or(false)
    }

    /// Formats and writes the accumulated source to `<package>/<file>`,
    /// through `formatter`, claiming the path in `registry` first so a
    /// second emitter targeting the same file fails fast. Consumes the
    /// buffer: `Write` can only ever be called once per buffer (spec.md
    /// §4.5, §4.9).
    pub fn write(
        self,
        formatter: &dyn Formatter,
        registry: &FileRegistry,
    ) -> Result<TemplateBuffer<Written>, BufferError> {
        let path = format!("{}/{}", self.package, self.file);
        registry.claim(&path)?;

        let source = formatter.format(&self.render_source());
        if let Some(parent) = std::path::Path::new(&path).parent() {
            std::fs::create_dir_all(parent).map_err(|source| BufferError::Io {
                path: path.clone(),
                source,
            })?;
        }
        std::fs::write(&path, source).map_err(|source| BufferError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(TemplateBuffer {
            package: self.package,
            file: self.file,
            imports: self.imports,
            body: self.body,
            functions: self.functions,
            _state: PhantomData,
        })
    }
}

fn lookup_str(bindings: &Bindings, name: &str) -> Result<String, EmitError> {
    match bindings.get(name) {
        Some(Value::Str(s)) => Ok(s.clone()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::List(_)) => Err(EmitError::Malformed(format!(
            "`{name}` is a list and cannot be substituted directly"
        ))),
        None => Err(EmitError::UnknownBinding(name.to_string())),
    }
}

fn lookup_bool(bindings: &Bindings, name: &str) -> Result<bool, EmitError> {
    match bindings.get(name) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(EmitError::Malformed(format!(
            "`{name}` is not a boolean condition"
        ))),
        None => Err(EmitError::UnknownBinding(name.to_string())),
    }
}

fn lookup_list<'a>(bindings: &'a Bindings, name: &str) -> Result<&'a [Bindings], EmitError> {
    match bindings.get(name) {
        Some(Value::List(items)) => Ok(items),
        Some(_) => Err(EmitError::Malformed(format!("`{name}` is not a list"))),
        None => Err(EmitError::UnknownBinding(name.to_string())),
    }
}

#[derive(Debug, Clone)]
enum Token {
    Text(String),
    Tag(String),
}

fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = template;
    loop {
        match rest.find("{{") {
            Some(start) => {
                if start > 0 {
                    tokens.push(Token::Text(rest[..start].to_string()));
                }
                let after = &rest[start + 2..];
                match after.find("}}") {
                    Some(end) => {
                        tokens.push(Token::Tag(after[..end].trim().to_string()));
                        rest = &after[end + 2..];
                    }
                    None => {
                        tokens.push(Token::Text(rest.to_string()));
                        break;
                    }
                }
            }
            None => {
                if !rest.is_empty() {
                    tokens.push(Token::Text(rest.to_string()));
                }
                break;
            }
        }
    }
    tokens
}

/// Expands `template` against `bindings`, with `{{name}}` substitution,
/// `{{helper arg…}}` calls into `functions`, `{{#each name}}…{{/each}}`
/// iteration, and `{{#if name}}…{{else}}…{{/if}}` conditionals. Unresolved
/// names and unresolved helpers are fatal (spec.md §9 "Template engine").
pub fn render(
    template: &str,
    bindings: &Bindings,
    functions: &BTreeMap<String, Helper>,
) -> Result<String, EmitError> {
    let tokens = tokenize(template);
    eval(&tokens, bindings, functions)
}

/// Slices out a balanced `{open_prefix}…{close_tag}` block starting right
/// after the opening tag at `start`, tracking nesting depth so an inner
/// block of the same kind doesn't prematurely close the outer one.
/// Returns the body slice and the index just past the closing tag.
fn extract_block<'a>(
    tokens: &'a [Token],
    start: usize,
    open_prefix: &str,
    close_tag: &str,
) -> Result<(&'a [Token], usize), EmitError> {
    let mut depth = 1;
    let mut idx = start;
    while idx < tokens.len() {
        if let Token::Tag(raw) = &tokens[idx] {
            if raw.starts_with(open_prefix) {
                depth += 1;
            } else if raw == close_tag {
                depth -= 1;
                if depth == 0 {
                    return Ok((&tokens[start..idx], idx + 1));
                }
            }
        }
        idx += 1;
    }
    Err(EmitError::Malformed(format!(
        "missing closing tag `{{{{{close_tag}}}}}`"
    )))
}

/// Like [`extract_block`], but for `{{#if}}…{{else}}…{{/if}}`, which has
/// an optional second branch. The `else` tag only ends the `then` branch
/// when it occurs at this block's own nesting depth.
fn extract_if_block(
    tokens: &[Token],
    start: usize,
) -> Result<(&[Token], Option<&[Token]>, usize), EmitError> {
    let mut depth = 1;
    let mut idx = start;
    let mut else_idx = None;
    while idx < tokens.len() {
        if let Token::Tag(raw) = &tokens[idx] {
            if raw.starts_with("#if ") {
                depth += 1;
            } else if raw == "/if" {
                depth -= 1;
                if depth == 0 {
                    let then_end = else_idx.unwrap_or(idx);
                    let then_body = &tokens[start..then_end];
                    let else_body = else_idx.map(|e| &tokens[e + 1..idx]);
                    return Ok((then_body, else_body, idx + 1));
                }
            } else if raw == "else" && depth == 1 && else_idx.is_none() {
                else_idx = Some(idx);
            }
        }
        idx += 1;
    }
    Err(EmitError::Malformed(
        "missing closing tag `{{/if}}`".to_string(),
    ))
}

fn eval(
    tokens: &[Token],
    bindings: &Bindings,
    functions: &BTreeMap<String, Helper>,
) -> Result<String, EmitError> {
    let mut out = String::new();
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Text(t) => {
                out.push_str(t);
                i += 1;
            }
            Token::Tag(raw) => {
                if let Some(name) = raw.strip_prefix("#each ") {
                    let (body, next) = extract_block(tokens, i + 1, "#each ", "/each")?;
                    for item in lookup_list(bindings, name.trim())? {
                        let mut scope = bindings.clone();
                        for (k, v) in item {
                            scope.insert(k.clone(), v.clone());
                        }
                        out.push_str(&eval(body, &scope, functions)?);
                    }
                    i = next;
                    continue;
                }
                if let Some(name) = raw.strip_prefix("#if ") {
                    let (then_body, else_body, next) = extract_if_block(tokens, i + 1)?;
                    if lookup_bool(bindings, name.trim())? {
                        out.push_str(&eval(then_body, bindings, functions)?);
                    } else if let Some(eb) = else_body {
                        out.push_str(&eval(eb, bindings, functions)?);
                    }
                    i = next;
                    continue;
                }

                let parts: Vec<&str> = raw.split_whitespace().collect();
                if parts.is_empty() {
                    return Err(EmitError::Malformed("empty template tag".to_string()));
                }
                if parts.len() == 1 {
                    let name = parts[0];
                    match lookup_str(bindings, name) {
                        Ok(s) => out.push_str(&s),
                        Err(EmitError::UnknownBinding(_)) => match functions.get(name) {
                            Some(helper) => out.push_str(&helper(&[])),
                            None => return Err(EmitError::UnknownBinding(name.to_string())),
                        },
                        Err(e) => return Err(e),
                    }
                } else {
                    let helper = functions
                        .get(parts[0])
                        .ok_or_else(|| EmitError::UnknownHelper(parts[0].to_string()))?;
                    let mut args = Vec::with_capacity(parts.len() - 1);
                    for arg in &parts[1..] {
                        if arg.starts_with('"') && arg.ends_with('"') && arg.len() >= 2 {
                            args.push(arg[1..arg.len() - 1].to_string());
                        } else {
                            args.push(lookup_str(bindings, arg)?);
                        }
                    }
                    out.push_str(&helper(&args));
                }
                i += 1;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn str_binding(s: &str) -> Value {
        Value::Str(s.to_string())
    }

    #[test]
    fn substitutes_plain_variables() {
        let mut b = Bindings::new();
        b.insert("name".to_string(), str_binding("Cluster"));
        let out = render("type {{name}} struct {}", &b, &BTreeMap::new()).unwrap();
        assert_eq!(out, "type Cluster struct {}");
    }

    #[test]
    fn unresolved_variable_is_fatal() {
        let b = Bindings::new();
        let err = render("{{missing}}", &b, &BTreeMap::new()).unwrap_err();
        assert_eq!(err, EmitError::UnknownBinding("missing".to_string()));
    }

    #[test]
    fn unresolved_helper_is_fatal() {
        let b = Bindings::new();
        let err = render("{{shout \"hi\"}}", &b, &BTreeMap::new()).unwrap_err();
        assert_eq!(err, EmitError::UnknownHelper("shout".to_string()));
    }

    #[test]
    fn calls_bound_helper_with_literal_and_binding_args() {
        let mut b = Bindings::new();
        b.insert("name".to_string(), str_binding("cluster"));
        let mut fns: BTreeMap<String, Helper> = BTreeMap::new();
        fns.insert(
            "upper".to_string(),
            Rc::new(|args: &[String]| args[0].to_uppercase()),
        );
        let out = render("{{upper name}}", &b, &fns).unwrap();
        assert_eq!(out, "CLUSTER");
    }

    #[test]
    fn if_else_picks_the_right_branch() {
        let mut b = Bindings::new();
        b.insert("class".to_string(), Value::Bool(true));
        let out = render("{{#if class}}CLASS{{else}}PLAIN{{/if}}", &b, &BTreeMap::new()).unwrap();
        assert_eq!(out, "CLASS");

        b.insert("class".to_string(), Value::Bool(false));
        let out = render("{{#if class}}CLASS{{else}}PLAIN{{/if}}", &b, &BTreeMap::new()).unwrap();
        assert_eq!(out, "PLAIN");
    }

    #[test]
    fn each_iterates_repeated_scopes() {
        let mut b = Bindings::new();
        let mut item1 = Bindings::new();
        item1.insert("field".to_string(), str_binding("Name"));
        let mut item2 = Bindings::new();
        item2.insert("field".to_string(), str_binding("HREF"));
        b.insert("attrs".to_string(), Value::List(vec![item1, item2]));
        let out = render("{{#each attrs}}[{{field}}]{{/each}}", &b, &BTreeMap::new()).unwrap();
        assert_eq!(out, "[Name][HREF]");
    }

    #[test]
    fn each_over_empty_list_emits_nothing() {
        let mut b = Bindings::new();
        b.insert("attrs".to_string(), Value::List(vec![]));
        let out = render("before{{#each attrs}}X{{/each}}after", &b, &BTreeMap::new()).unwrap();
        assert_eq!(out, "beforeafter");
    }

    #[test]
    fn buffer_dedupes_imports_and_elides_unused_ones() {
        let b = Bindings::new();
        let buffer = TemplateBuffer::<Open>::new("out/svc/v1", "cluster_type.go")
            .import("time", None)
            .import("time", None)
            .import("fmt", None)
            .emit("var t time.Time\n", &b)
            .unwrap();
        let source = buffer.render_source();
        assert!(source.contains("\"time\""));
        assert!(!source.contains("\"fmt\""));
    }

    #[test]
    fn write_then_write_again_does_not_compile() {
        // Compile-time guarantee: TemplateBuffer<Written> has no `write`
        // method, so calling it twice is a type error, not a runtime one.
        // (Documented here; enforced by the type system, not this test body.)
    }
}
