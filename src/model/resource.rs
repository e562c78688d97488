//! Resources, Locators, and Methods: the part of the Model Graph that
//! describes the API's addressable surface rather than its data shapes.

use crate::model::types::TypeRef;
use crate::names::nomenclature::Name;

/// Direction of data flow for a [`Parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

/// A literal default value for an `in` or `in-out` [`Parameter`].
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A named, directional, typed input or output of a [`Method`].
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Name,
    pub type_ref: TypeRef,
    pub direction: Direction,
    pub default: Option<DefaultValue>,
}

/// The fixed set of method kinds a [`Resource`] may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    List,
    Add,
    Get,
    Update,
    Delete,
    Action,
}

/// An operation exposed by a [`Resource`].
///
/// `name` is significant only for `Action` methods, where it becomes the
/// action's sub-path segment (spec.md §4.6.4: `POST "/<action-name>"`); for
/// the other five kinds the verb/sub-path pair is fixed by `kind` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: Name,
    pub kind: MethodKind,
    pub parameters: Vec<Parameter>,
}

/// A named transition from a [`Resource`] to a sub-[`Resource`], optionally
/// parameterized by an identifier segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub name: Name,
    /// The name of the target Resource, in the same Version.
    pub target: Name,
    /// `true` if this locator binds a path segment (`{id}`) that is passed
    /// to the locator function to obtain the sub-resource server, rather
    /// than being a fixed literal sub-path.
    pub identified: bool,
}

/// An addressable collection or entity exposing [`Method`]s and
/// [`Locator`]s to sub-resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: Name,
    pub methods: Vec<Method>,
    pub locators: Vec<Locator>,
}

impl Resource {
    pub fn method(&self, kind: MethodKind) -> Option<&Method> {
        self.methods.iter().find(|m| m.kind == kind)
    }

    pub fn locator(&self, name: &Name) -> Option<&Locator> {
        self.locators.iter().find(|l| l.name.equals(name))
    }
}
