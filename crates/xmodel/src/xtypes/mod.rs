// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference X-Types/IDL type system built on the engine.
//!
//! Supplies the kinds of OMG DDS-XTypes (atoms, enumerations, structures,
//! unions, typedefs, modules, constants, annotations), the [`Classifier`]
//! that tells the engine how to treat each of them, and the [`XTypes`]
//! facade with one constructor per kind.
//!
//! # Example
//!
//! ```rust
//! use xmodel::xtypes::{Atom, XTypes};
//! use xmodel::{Bound, Length, Member, Value};
//!
//! let mut xt = XTypes::new();
//! let long = xt.atom(Atom::Long);
//! let point = xt
//!     .struct_type("Point", vec![Member::new("x", long).into(), Member::new("y", long).into()])
//!     .unwrap();
//! let seq = xt.sequence(Some(Bound::Size(3)));
//! let shape = xt
//!     .struct_type("Shape", vec![Member::new("pts", point).with_qualifier(seq).into()])
//!     .unwrap();
//!
//! let repo = xt.repo_mut();
//! let pts = repo.field(shape, "pts").and_then(Value::object).unwrap();
//! assert_eq!(repo.len(pts).unwrap(), Length::Accessor("pts#".into()));
//! let first = repo.element(pts, 1).unwrap().object().unwrap();
//! assert_eq!(repo.field(first, "x"), Some(&Value::Accessor("pts[1].x".into())));
//! ```

mod builder;

pub use builder::{XTypes, DISCRIMINATOR_ROLE};

use crate::classify::Classifier;

/// Datatype kinds of the X-Types type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XKind {
    /// Primitive or string type.
    Atom,
    /// Enumeration.
    Enum,
    /// Structure, optionally with a base structure.
    Struct,
    /// Discriminated union.
    Union,
    /// Alias of another datatype.
    Typedef,
    /// Namespace.
    Module,
    /// Named constant.
    Const,
    /// Plain annotation (`@key`, `@optional`...).
    Annotation,
    /// Annotation carrying collection dimensions (`Array`, `Sequence`).
    CollectionAnnotation,
}

impl XKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            XKind::Atom => "atom",
            XKind::Enum => "enum",
            XKind::Struct => "struct",
            XKind::Union => "union",
            XKind::Typedef => "typedef",
            XKind::Module => "module",
            XKind::Const => "const",
            XKind::Annotation => "annotation",
            XKind::CollectionAnnotation => "collection annotation",
        }
    }
}

/// Builtin atomic datatypes (IDL primitive and string types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Atom {
    Boolean,
    Octet,
    Char,
    WChar,
    Short,
    UnsignedShort,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    LongDouble,
    String,
    WString,
}

impl Atom {
    pub const ALL: [Atom; 15] = [
        Atom::Boolean,
        Atom::Octet,
        Atom::Char,
        Atom::WChar,
        Atom::Short,
        Atom::UnsignedShort,
        Atom::Long,
        Atom::UnsignedLong,
        Atom::LongLong,
        Atom::UnsignedLongLong,
        Atom::Float,
        Atom::Double,
        Atom::LongDouble,
        Atom::String,
        Atom::WString,
    ];

    /// IDL spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Atom::Boolean => "boolean",
            Atom::Octet => "octet",
            Atom::Char => "char",
            Atom::WChar => "wchar",
            Atom::Short => "short",
            Atom::UnsignedShort => "unsigned short",
            Atom::Long => "long",
            Atom::UnsignedLong => "unsigned long",
            Atom::LongLong => "long long",
            Atom::UnsignedLongLong => "unsigned long long",
            Atom::Float => "float",
            Atom::Double => "double",
            Atom::LongDouble => "long double",
            Atom::String => "string",
            Atom::WString => "wstring",
        }
    }
}

/// Classifier for [`XKind`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XTypesClassifier;

impl Classifier for XTypesClassifier {
    type Kind = XKind;

    fn is_qualifier_kind(&self, kind: &XKind) -> bool {
        matches!(kind, XKind::Annotation | XKind::CollectionAnnotation)
    }

    fn is_collection_kind(&self, kind: &XKind) -> bool {
        matches!(kind, XKind::CollectionAnnotation)
    }

    fn is_alias_kind(&self, kind: &XKind) -> bool {
        matches!(kind, XKind::Typedef)
    }

    fn is_leaf_kind(&self, kind: &XKind) -> bool {
        matches!(kind, XKind::Atom | XKind::Enum)
    }

    fn is_template_kind(&self, kind: &XKind) -> bool {
        matches!(
            kind,
            XKind::Atom
                | XKind::Enum
                | XKind::Struct
                | XKind::Union
                | XKind::Typedef
                | XKind::Module
        )
    }

    fn kind_name(&self, kind: &XKind) -> String {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests;
