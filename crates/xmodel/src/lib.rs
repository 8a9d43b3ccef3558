// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # xmodel - Datatype Meta-Model Engine
//!
//! A meta-model engine in the style of OMG DDS-XTypes / IDL: datatypes are
//! *models* with one canonical *template* each, instances are trees of
//! accessor paths cloned from those templates, and every structural edit to a
//! model is propagated to the instances already issued from it.
//!
//! ## Quick Start
//!
//! ```rust
//! use xmodel::xtypes::{Atom, XTypes};
//! use xmodel::{Member, Result, Value};
//!
//! fn main() -> Result<()> {
//!     let mut xt = XTypes::new();
//!     let long = xt.atom(Atom::Long);
//!     let double = xt.atom(Atom::Double);
//!     let point = xt.struct_type(
//!         "Point",
//!         vec![Member::new("x", long).into(), Member::new("y", long).into()],
//!     )?;
//!
//!     let p = xt.repo_mut().new_instance(point, Some("p"), false)?;
//!     let p = p.object().unwrap_or(point);
//!
//!     // Redefinition reaches the existing instance.
//!     xt.define_member(point, Member::new("y", double))?;
//!     assert_eq!(xt.repo().field(p, "y"), Some(&Value::Accessor("p.y".into())));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |              Concrete type system (xtypes::XTypes)                  |
//! |   struct | union | enum | typedef | module | const | annotation    |
//! +------------------------------+--------------------------------------+
//! |    Classifier (5 predicates) |  Namespace resolver (nsname/nsroot)  |
//! +------------------------------+--------------------------------------+
//! |  Instance engine | Collection engine | Clone/propagation engine     |
//! +---------------------------------------------------------------------+
//! |         Repository: arena of models and objects (ids)              |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Repository`] | Owner of all models and objects, entry point for every operation |
//! | [`Classifier`] | Kind predicates supplied by the concrete type system |
//! | [`Model`] | Named, kind-tagged datatype or collection description |
//! | [`Value`] | Field, element or instance: accessor, scalar, composite or collection |
//! | [`SharedRepository`] | Lock-protected handle for multi-threaded callers |
//!
//! ## Modules Overview
//!
//! - [`xtypes`] - Reference X-Types/IDL type system (start here)
//! - [`config`] - Separators, limits and [`EngineConfig`]

mod classify;
mod collection;
/// Accessor separators, engine limits and runtime configuration.
pub mod config;
mod error;
mod instance;
mod model;
mod namespace;
mod propagate;
mod repository;
mod shared;
mod value;
/// Reference X-Types/IDL type system.
pub mod xtypes;

pub use classify::Classifier;
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use model::{
    Attribute, Bound, CollectionOrigin, Definition, Entry, Member, Model, ModelId, ObjectId,
    Qualifier, Registry, Scalar,
};
pub use namespace::Resolved;
pub use propagate::accessor_path;
pub use repository::Repository;
pub use shared::SharedRepository;
pub use value::{Length, Snapshot, Value};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
