// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance values and their structural snapshots.

use crate::model::{ObjectId, Scalar};
use std::fmt;

/// A field of a composite, an element of a collection, or a whole instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Leaf accessor path (`pts[1].x`).
    Accessor(String),
    /// Leaf data (enumerator ordinal, constant value, user-written element).
    Scalar(Scalar),
    /// Composite instance or template.
    Instance(ObjectId),
    /// Collection.
    Collection(ObjectId),
}

impl Value {
    /// Composite or collection, as opposed to a leaf.
    pub fn is_structured(&self) -> bool {
        matches!(self, Value::Instance(_) | Value::Collection(_))
    }

    /// Accessor path of a leaf.
    pub fn as_accessor(&self) -> Option<&str> {
        match self {
            Value::Accessor(path) => Some(path),
            _ => None,
        }
    }

    /// Object behind a structured value.
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Value::Instance(id) | Value::Collection(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(path: &str) -> Self {
        Value::Accessor(path.to_string())
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

/// Length of a collection.
///
/// Template-owned collections answer with the accessor of their length
/// (`pts#`); data-holding collections answer with their element count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Length {
    Accessor(String),
    Count(usize),
}

impl Length {
    pub fn count(&self) -> Option<usize> {
        match self {
            Length::Count(n) => Some(*n),
            Length::Accessor(_) => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Accessor(path) => f.write_str(path),
            Length::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Id-free structural copy of a value, for comparing shapes across instances.
///
/// Collections are captured by name and capacity; their lazily materialized
/// elements are not part of the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Accessor(String),
    Scalar(Scalar),
    Composite {
        /// Model name.
        datatype: String,
        /// Fields in declaration order.
        fields: Vec<(String, Snapshot)>,
    },
    Collection {
        name: String,
        capacity: Option<usize>,
        element: Box<Snapshot>,
    },
}

impl Snapshot {
    /// Field names of a composite snapshot.
    pub fn roles(&self) -> Vec<&str> {
        match self {
            Snapshot::Composite { fields, .. } => fields.iter().map(|(r, _)| r.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}
