// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Classification interface supplied by a concrete type system.
//!
//! The engine never interprets a kind itself. It only asks the five questions
//! below; everything else about a type system (which kinds exist, what a
//! member of each kind may hold) stays in the implementing crate or module.

use std::fmt;

/// Five-predicate contract a concrete type system implements once.
///
/// The classifier is injected when a [`Repository`](crate::Repository) is
/// constructed and is shared by every model the repository holds.
pub trait Classifier {
    /// Classification tag stored in each model's `KIND` slot.
    type Kind: Clone + fmt::Debug + PartialEq;

    /// Annotations that may appear in a `QUALIFIERS` list.
    fn is_qualifier_kind(&self, kind: &Self::Kind) -> bool;

    /// Qualifiers that carry collection dimensions.
    fn is_collection_kind(&self, kind: &Self::Kind) -> bool;

    /// Named redirects (typedefs) to another template.
    fn is_alias_kind(&self, kind: &Self::Kind) -> bool;

    /// Datatypes whose instances are bare accessor paths.
    fn is_leaf_kind(&self, kind: &Self::Kind) -> bool;

    /// Datatypes that may seed instances.
    fn is_template_kind(&self, kind: &Self::Kind) -> bool;

    /// Human-readable kind name for diagnostics.
    fn kind_name(&self, kind: &Self::Kind) -> String {
        format!("{:?}", kind)
    }
}
