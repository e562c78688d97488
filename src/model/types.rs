//! Type system of the Model Graph: the closed sum described in spec.md §9
//! ("Polymorphism of Types"), expressed as tagged variants so the Types
//! Calculator's selection table (§4.4) is a single total, exhaustively
//! matched function — not a class hierarchy.

use crate::names::nomenclature::Name;

/// The fixed set of built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Boolean,
    Integer,
    Long,
    Float,
    String,
    Date,
    /// An opaque, language-native "any" value — the metamodel's escape
    /// hatch for untyped JSON.
    Interface,
}

/// A reference to a [`Type`], as it appears in an attribute or parameter
/// declaration. List and Map element syntax (`[]T`, spec.md §6) is
/// anonymous — it is not a separately named declaration in a
/// [`crate::model::graph::Version`] — so those two variants carry their
/// element reference inline rather than by name. `Named` references are
/// resolved lazily through the owning Version's declaration table rather
/// than by direct ownership, which is what lets two structs refer to each
/// other cyclically (spec.md §9 "Cyclic references").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A reference to one of the built-in scalars.
    Scalar(Scalar),
    /// A reference to a named Enum or Struct declared in the same Version.
    Named(Name),
    /// An anonymous list of the given element type: `[]T`.
    List(Box<TypeRef>),
    /// An anonymous string-keyed map of the given element type.
    Map(Box<TypeRef>),
}

impl TypeRef {
    /// Shorthand for `TypeRef::List(Box::new(element))`.
    pub fn list_of(element: TypeRef) -> Self {
        TypeRef::List(Box::new(element))
    }

    /// Shorthand for `TypeRef::Map(Box::new(element))`.
    pub fn map_of(element: TypeRef) -> Self {
        TypeRef::Map(Box::new(element))
    }
}

/// One named value of an [`Enum`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: Name,
    pub doc: Option<String>,
}

/// An enumeration type: a closed set of named wire values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub name: Name,
    pub values: Vec<EnumValue>,
}

/// A named field of a [`Struct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Name,
    pub type_ref: TypeRef,
    pub doc: Option<String>,
    /// Marks the attribute as a reference to data served by another
    /// endpoint rather than embedded content. Spec.md invariant 3: only
    /// legal on list- or struct-typed attributes — enforced by
    /// [`crate::model::builder::ModelBuilder`], since validity depends on
    /// the attribute's resolved `type_ref`, not on this type alone.
    pub link: bool,
}

/// A struct type: a named, ordered set of attributes.
///
/// `class`-marked structs represent entities with identity and implicitly
/// gain `id`, `href`, and a kind discriminator (spec.md invariant 6); those
/// three fields are *not* stored here — they are synthesized by the
/// Types Emitter from the `class` flag, so the Model Graph stores only
/// what was actually declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub name: Name,
    pub attributes: Vec<Attribute>,
    pub class: bool,
}

/// A declaration registered by name in a Version's type table: the only
/// two kinds of type the metamodel DSL actually names with a keyword
/// (spec.md §6: `struct`, `class`, `enum`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Enum(Enum),
    Struct(Struct),
}

impl Declaration {
    pub fn name(&self) -> &Name {
        match self {
            Declaration::Enum(e) => &e.name,
            Declaration::Struct(s) => &s.name,
        }
    }
}

/// A fully resolved model type: the closed sum {Scalar, Enum, Struct,
/// List, Map} named in spec.md §3 and §9. Borrowed from the owning
/// [`crate::model::graph::Version`] rather than owned, since `List`/`Map`
/// resolve to an element [`TypeRef`] that may itself need further
/// resolution.
#[derive(Debug, Clone, Copy)]
pub enum Type<'a> {
    Scalar(Scalar),
    Enum(&'a Enum),
    Struct(&'a Struct),
    List(&'a TypeRef),
    Map(&'a TypeRef),
}

impl<'a> Type<'a> {
    /// `true` if this is a `class`-marked struct.
    pub fn is_class(&self) -> bool {
        matches!(self, Type::Struct(s) if s.class)
    }
}
