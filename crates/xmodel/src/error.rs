// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for datatype definition and instance access.
//!
//! Every failure is a synchronous precondition violation: the offending call
//! aborts before a model or instance is left half-built, and the error is
//! returned to the immediate caller.

use crate::model::{ModelId, ObjectId};

/// Errors raised by the meta-model engine.
///
/// # Example
///
/// ```rust
/// use xmodel::xtypes::{Atom, XTypes};
/// use xmodel::{Bound, Error};
///
/// let mut xt = XTypes::new();
/// let long = xt.atom(Atom::Long);
/// let seq = xt.repo_mut().new_collection(long, Bound::Size(2), "v", false).unwrap();
///
/// match xt.repo_mut().element(seq, 3) {
///     Err(Error::CollectionBounds { index, capacity, .. }) => assert_eq!((index, capacity), (3, 2)),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    // ========================================================================
    // Definition Errors
    // ========================================================================
    /// A template was required but something else was supplied.
    TemplateKind(String),
    /// A role (member) name is not a valid identifier.
    RoleName(String),
    /// Namespace resolution input has no model.
    InvalidTemplate(String),
    /// A qualifier was required but something else was supplied.
    Qualifier(String),
    /// The concrete type system rejected a declaration for its kind.
    InvalidDeclaration {
        /// Name of the datatype being defined.
        datatype: String,
        /// Why the declaration was rejected.
        reason: String,
    },

    // ========================================================================
    // Collection Errors
    // ========================================================================
    /// Collection element template is neither a collection nor a template.
    CollectionContent(String),
    /// Collection capacity is not absent or a positive integer.
    CollectionCapacity(String),
    /// Indexed access beyond a bounded capacity (or at index 0).
    CollectionBounds {
        /// Collection name.
        collection: String,
        /// Requested 1-based index.
        index: usize,
        /// Bounded capacity (0 when the collection is unbounded).
        capacity: usize,
    },
    /// Attempt to overwrite a structured (composite or collection) element.
    NonLeafAssignment {
        /// Collection name.
        collection: String,
        /// Requested 1-based index.
        index: usize,
    },

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// Object id does not refer to a live object in this repository.
    UnknownObject(ObjectId),
    /// Model id does not refer to a model in this repository.
    UnknownModel(ModelId),
    /// Alias chain longer than the configured limit (usually a cycle).
    AliasDepthExceeded {
        /// Configured maximum depth.
        depth: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Engine configuration is invalid or could not be parsed.
    Config(String),
    /// Configuration file not found at specified path.
    ConfigFileNotFound(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Definition
            Error::TemplateKind(what) => write!(f, "Not a template: {}", what),
            Error::RoleName(role) => write!(f, "Invalid role name: {:?}", role),
            Error::InvalidTemplate(what) => write!(f, "Invalid template: {}", what),
            Error::Qualifier(what) => write!(f, "Not a qualifier: {}", what),
            Error::InvalidDeclaration { datatype, reason } => {
                write!(f, "Invalid declaration in {}: {}", datatype, reason)
            }
            // Collection
            Error::CollectionContent(what) => {
                write!(f, "Invalid collection element template: {}", what)
            }
            Error::CollectionCapacity(what) => write!(f, "Invalid collection capacity: {}", what),
            Error::CollectionBounds {
                collection,
                index,
                capacity,
            } => write!(
                f,
                "Index {} out of bounds for collection {:?} (capacity {})",
                index, collection, capacity
            ),
            Error::NonLeafAssignment { collection, index } => write!(
                f,
                "Cannot overwrite structured element {}[{}]",
                collection, index
            ),
            // Engine
            Error::UnknownObject(id) => write!(f, "Unknown object: {}", id),
            Error::UnknownModel(id) => write!(f, "Unknown model: {}", id),
            Error::AliasDepthExceeded { depth } => {
                write!(f, "Alias chain exceeds {} levels (cycle?)", depth)
            }
            // Configuration
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
