// Copyright (c) 2025 OCM API metamodel contributors
// SPDX-License-Identifier: MIT

//! Types Calculator: computes, for each model [`Type`], the target-language
//! reference forms emitters need (spec.md §4.4). The selection table in
//! §4.4 is the authoritative contract every emitter honors; it is encoded
//! here as a single total, exhaustively matched function over the closed
//! `Type` sum (spec.md §9 "Polymorphism of Types"), not as per-kind
//! special-casing scattered across emitters.

use crate::model::graph::Version;
use crate::model::types::{Scalar, Type, TypeRef};
use crate::names::calculator::NameCalculator;
use crate::names::nomenclature::Name;

/// Which of the three reference forms a field or getter takes, per the
/// selection table in spec.md §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceForm {
    /// The direct, by-value form.
    Value,
    /// A form that can carry "absent" distinctly from "zero".
    Nullable,
    /// The specialized list-container type carrying link metadata.
    ListContainer,
}

/// Computes Go reference forms for model types, scoped to one [`Version`]
/// (type references only ever resolve within their own version, spec.md
/// invariant 2) and one [`NameCalculator`] (for rendering struct/enum
/// names).
pub struct GoTypesCalculator<'a, N: NameCalculator> {
    version: &'a Version,
    names: &'a N,
}

impl<'a, N: NameCalculator> GoTypesCalculator<'a, N> {
    pub fn new(version: &'a Version, names: &'a N) -> Self {
        Self { version, names }
    }

    /// `field_form`/`getter_form` from spec.md §4.4's selection table: the
    /// reference-form shape a struct field (or its getter) takes for a
    /// given type and `link` flag. Only a linked List ever selects
    /// `ListContainer`; every other combination selects `Nullable`, except
    /// a getter over a Scalar, which always returns `Value`.
    ///
    /// spec.md §4.4's table has no row for Enum; this implementation
    /// resolves that gap by treating Enum identically to Scalar (an enum
    /// is wire-represented as a string alias, so "absent vs. zero" is the
    /// same distinction as a string scalar's) — see DESIGN.md.
    fn resolved_form(&self, type_ref: &TypeRef, link: bool, is_getter: bool) -> ReferenceForm {
        match self.resolve(type_ref) {
            Type::Scalar(_) | Type::Enum(_) if is_getter => ReferenceForm::Value,
            Type::List(_) if link => ReferenceForm::ListContainer,
            _ => ReferenceForm::Nullable,
        }
    }

    /// The reference form a struct field with this type and `link` flag
    /// takes when stored.
    pub fn field_form(&self, type_ref: &TypeRef, link: bool) -> ReferenceForm {
        self.resolved_form(type_ref, link, false)
    }

    /// The reference form the public getter for this type and `link` flag
    /// returns.
    pub fn getter_form(&self, type_ref: &TypeRef, link: bool) -> ReferenceForm {
        self.resolved_form(type_ref, link, true)
    }

    fn resolve(&self, type_ref: &TypeRef) -> Type<'a> {
        self.version
            .resolve(type_ref)
            .expect("type_ref is validated to resolve by ModelBuilder::build")
    }

    /// The direct, by-value Go type: `string`, `int64`, a struct name used
    /// by value, etc.
    pub fn value_reference(&self, type_ref: &TypeRef) -> String {
        match type_ref {
            TypeRef::Scalar(s) => scalar_value_type(*s).to_string(),
            TypeRef::Named(name) => match self.resolve(type_ref) {
                Type::Enum(_) => self.names.public(name),
                Type::Struct(_) => self.names.public(name),
                _ => unreachable!("Named resolves only to Enum or Struct"),
            },
            TypeRef::List(elem) => format!("[]{}", self.value_reference(elem)),
            TypeRef::Map(elem) => format!("map[string]{}", self.value_reference(elem)),
        }
    }

    /// The form that can carry "absent" distinctly from "zero": a pointer
    /// wrapper for scalars and structs, the slice/map form (itself
    /// nilable) for non-linked lists and maps.
    pub fn nullable_reference(&self, type_ref: &TypeRef) -> String {
        match type_ref {
            TypeRef::Scalar(_) => format!("*{}", self.value_reference(type_ref)),
            TypeRef::Named(name) => match self.resolve(type_ref) {
                Type::Enum(_) => format!("*{}", self.names.public(name)),
                Type::Struct(_) => format!("*{}", self.names.public(name)),
                _ => unreachable!("Named resolves only to Enum or Struct"),
            },
            TypeRef::List(_) | TypeRef::Map(_) => self.value_reference(type_ref),
        }
    }

    /// The specialized list-container type name for a `link`ed list
    /// attribute whose element is `struct_name`: `<Name>List`.
    pub fn list_reference(&self, struct_name: &Name) -> String {
        format!("{}List", self.names.public(struct_name))
    }

    /// The Go type to declare a struct field as, given its model type and
    /// `link` flag: resolves `field_form` into an actual type string.
    pub fn field_type(&self, type_ref: &TypeRef, link: bool) -> String {
        match self.field_form(type_ref, link) {
            ReferenceForm::ListContainer => self.list_reference(&element_struct_name(self, type_ref)),
            ReferenceForm::Nullable => self.nullable_reference(type_ref),
            ReferenceForm::Value => self.value_reference(type_ref),
        }
    }

    /// The Go type a public getter for this attribute returns.
    pub fn getter_type(&self, type_ref: &TypeRef, link: bool) -> String {
        match self.getter_form(type_ref, link) {
            ReferenceForm::ListContainer => self.list_reference(&element_struct_name(self, type_ref)),
            ReferenceForm::Nullable => self.nullable_reference(type_ref),
            ReferenceForm::Value => self.value_reference(type_ref),
        }
    }

    /// The zero literal for a type: what a getter falls back to when the
    /// underlying field is absent (spec.md §4.4: "Value (from nullable,
    /// else zero)").
    pub fn zero_value(&self, type_ref: &TypeRef) -> String {
        match type_ref {
            TypeRef::Scalar(s) => scalar_zero_value(*s).to_string(),
            TypeRef::Named(name) => match self.resolve(type_ref) {
                Type::Enum(_) => "\"\"".to_string(),
                Type::Struct(_) => "nil".to_string(),
                _ => unreachable!("Named resolves only to Enum or Struct"),
            },
            TypeRef::List(_) | TypeRef::Map(_) => "nil".to_string(),
        }
    }

    /// The identifier for an enum type's alias declaration.
    pub fn enum_name(&self, name: &Name) -> String {
        self.names.public(name)
    }
}

/// The element struct's name, for a `link`ed list attribute. Panics if
/// called on anything other than a `List` of a `Named` struct, which is
/// the only shape `field_type`/`getter_type` ever call it for (guarded by
/// `field_form`/`getter_form` selecting `ListContainer` only in that case).
fn element_struct_name<N: NameCalculator>(calc: &GoTypesCalculator<'_, N>, type_ref: &TypeRef) -> Name {
    match type_ref {
        TypeRef::List(elem) => match &**elem {
            TypeRef::Named(name) => match calc.resolve(elem) {
                Type::Struct(_) => name.clone(),
                _ => panic!("linked list element must resolve to a Struct"),
            },
            _ => panic!("linked list element must be a Named struct reference"),
        },
        _ => panic!("element_struct_name called on a non-List type_ref"),
    }
}

fn scalar_value_type(scalar: Scalar) -> &'static str {
    match scalar {
        Scalar::Boolean => "bool",
        Scalar::Integer => "int32",
        Scalar::Long => "int64",
        Scalar::Float => "float64",
        Scalar::String => "string",
        Scalar::Date => "time.Time",
        Scalar::Interface => "interface{}",
    }
}

fn scalar_zero_value(scalar: Scalar) -> &'static str {
    match scalar {
        Scalar::Boolean => "false",
        Scalar::Integer | Scalar::Long => "0",
        Scalar::Float => "0.0",
        Scalar::String => "\"\"",
        Scalar::Date => "time.Time{}",
        Scalar::Interface => "nil",
    }
}
