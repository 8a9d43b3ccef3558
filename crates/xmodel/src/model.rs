// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Models: the hidden definition behind every datatype and collection shape.
//!
//! A [`Model`] carries the fixed set of [`Attribute`] slots (kind, name,
//! namespace, qualifiers, definition, instance registry, template). Objects
//! bound to a model get their entire behavior from it.

use std::collections::BTreeMap;
use std::fmt;

/// Index of a [`Model`] inside its repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) usize);

/// Index of an object (template, composite instance or collection) inside its repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

// ============================================================================
// Attribute keys
// ============================================================================

/// The metadata slots every model exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Classification tag, opaque to the engine.
    Kind,
    /// Local (unqualified) name.
    Name,
    /// Enclosing namespace model.
    Namespace,
    /// Datatype-level annotations.
    Qualifiers,
    /// Member/qualifier declaration list, or `{element, capacity}`.
    Definition,
    /// Registry of instances created from the model.
    Instances,
    /// Canonical instance.
    Template,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 7] = [
        Attribute::Kind,
        Attribute::Name,
        Attribute::Namespace,
        Attribute::Qualifiers,
        Attribute::Definition,
        Attribute::Instances,
        Attribute::Template,
    ];

    /// Stable symbolic key of the slot.
    pub const fn as_str(self) -> &'static str {
        match self {
            Attribute::Kind => "KIND",
            Attribute::Name => "NAME",
            Attribute::Namespace => "NS",
            Attribute::Qualifiers => "QUALIFIERS",
            Attribute::Definition => "DEFN",
            Attribute::Instances => "INSTANCES",
            Attribute::Template => "TEMPLATE",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Scalar data: enumerator ordinals, constant values, user-written leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Capacity of one collection dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// No upper bound.
    Unbounded,
    /// Fixed positive bound.
    Size(usize),
    /// Bound given by a named constant datatype.
    Constant(ObjectId),
}

/// An annotation attached to a datatype or inline on a member.
///
/// Only the collection qualifier (whose annotation classifies as a collection
/// kind) is interpreted by the engine, through its `dimensions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    /// Annotation datatype this qualifier instantiates.
    pub annotation: ObjectId,
    /// Collection dimensions, outermost first.
    pub dimensions: Vec<Bound>,
    /// Named annotation arguments.
    pub args: Vec<(String, Scalar)>,
}

impl Qualifier {
    /// Qualifier with no dimensions and no arguments.
    pub fn new(annotation: ObjectId) -> Self {
        Self {
            annotation,
            dimensions: Vec::new(),
            args: Vec::new(),
        }
    }

    /// Replace the collection dimensions.
    pub fn with_dimensions(mut self, dimensions: Vec<Bound>) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Append a named argument.
    pub fn with_arg(mut self, name: impl Into<String>, value: Scalar) -> Self {
        self.args.push((name.into(), value));
        self
    }

    /// Look up a named argument.
    pub fn arg(&self, name: &str) -> Option<&Scalar> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A named member declaration (struct member or union case).
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Role (field) name.
    pub role: String,
    /// Datatype template of the role.
    pub datatype: ObjectId,
    /// Inline qualifiers (key, optional, collection...).
    pub qualifiers: Vec<Qualifier>,
    /// Union case labels; empty for struct members.
    pub labels: Vec<Scalar>,
}

impl Member {
    /// Unqualified member `role` of type `datatype`.
    pub fn new(role: impl Into<String>, datatype: ObjectId) -> Self {
        Self {
            role: role.into(),
            datatype,
            qualifiers: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Append an inline qualifier.
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Set the union case labels.
    pub fn with_labels(mut self, labels: Vec<Scalar>) -> Self {
        self.labels = labels;
        self
    }
}

/// One ordered slot of a composite definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Positional datatype reference: alias target, base type, discriminator.
    Type(ObjectId),
    /// Annotation.
    Qualifier(Qualifier),
    /// Named member.
    Member(Member),
    /// Named scalar: enumerator, constant value.
    Value(String, Scalar),
}

impl From<Member> for Entry {
    fn from(member: Member) -> Self {
        Entry::Member(member)
    }
}

impl From<Qualifier> for Entry {
    fn from(qualifier: Qualifier) -> Self {
        Entry::Qualifier(qualifier)
    }
}

/// Contents of the definition slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// Ordered declaration list of a datatype.
    Composite(Vec<Entry>),
    /// Shape of a collection.
    Collection {
        /// Element template (a template or a nested collection).
        element: ObjectId,
        /// Bound, or `None` when unbounded.
        capacity: Option<usize>,
    },
}

impl Definition {
    /// Declaration list, empty for collections.
    pub fn entries(&self) -> &[Entry] {
        match self {
            Definition::Composite(entries) => entries,
            Definition::Collection { .. } => &[],
        }
    }

    /// Declaration of `role`, if any.
    pub fn member(&self, role: &str) -> Option<&Member> {
        self.entries().iter().find_map(|entry| match entry {
            Entry::Member(m) if m.role == role => Some(m),
            _ => None,
        })
    }
}

/// Where a collection's length semantics come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOrigin {
    /// Installed inside a canonical template; length is symbolic.
    TemplateOwned,
    /// Data-holding copy of another collection.
    Derived(ObjectId),
    /// Data-holding collection built directly.
    Free,
}

// ============================================================================
// Registry
// ============================================================================

/// Instances created from one model, with the name each was created with.
///
/// Ordered by creation, so propagation visits instances deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<ObjectId, String>,
}

impl Registry {
    /// Number of registered instances, template included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name an instance was registered with (empty for the template).
    pub fn name_of(&self, id: ObjectId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Registered instances with their names, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Register `id` under `name`, replacing any earlier name.
    pub(crate) fn insert(&mut self, id: ObjectId, name: &str) {
        self.entries.insert(id, name.to_string());
    }

    /// Unregister `id`, returning its name.
    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<String> {
        self.entries.remove(&id)
    }
}

// ============================================================================
// Model
// ============================================================================

/// Definition of one datatype or collection shape.
#[derive(Debug, Clone)]
pub struct Model<K> {
    pub(crate) kind: Option<K>,
    pub(crate) name: String,
    pub(crate) ns: Option<ModelId>,
    pub(crate) defn: Definition,
    pub(crate) qualifiers: Vec<Qualifier>,
    pub(crate) instances: Option<Registry>,
    pub(crate) template: Option<ObjectId>,
}

impl<K> Model<K> {
    pub(crate) fn datatype(name: &str, kind: K) -> Self {
        Self {
            kind: Some(kind),
            name: name.to_string(),
            ns: None,
            defn: Definition::Composite(Vec::new()),
            qualifiers: Vec::new(),
            instances: None,
            template: None,
        }
    }

    pub(crate) fn collection(name: &str, element: ObjectId, capacity: Option<usize>) -> Self {
        Self {
            kind: None,
            name: name.to_string(),
            ns: None,
            defn: Definition::Collection { element, capacity },
            qualifiers: Vec::new(),
            instances: None,
            template: None,
        }
    }

    /// Classification tag; `None` for collection models.
    pub fn kind(&self) -> Option<&K> {
        self.kind.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<ModelId> {
        self.ns
    }

    pub fn definition(&self) -> &Definition {
        &self.defn
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    pub fn instances(&self) -> Option<&Registry> {
        self.instances.as_ref()
    }

    pub fn template(&self) -> Option<ObjectId> {
        self.template
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.defn, Definition::Collection { .. })
    }

    /// Whether the given slot currently holds a value.
    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::Kind => self.kind.is_some(),
            Attribute::Name => !self.name.is_empty(),
            Attribute::Namespace => self.ns.is_some(),
            Attribute::Qualifiers => !self.qualifiers.is_empty(),
            Attribute::Definition => match &self.defn {
                Definition::Composite(entries) => !entries.is_empty(),
                Definition::Collection { .. } => true,
            },
            Attribute::Instances => self.instances.is_some(),
            Attribute::Template => self.template.is_some(),
        }
    }

    /// Slots currently holding a value, in declaration order.
    pub fn attributes(&self) -> Vec<Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(|a| self.has_attribute(*a))
            .collect()
    }
}
