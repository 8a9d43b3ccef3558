// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! X-Types facade: one constructor per datatype kind.
//!
//! Every constructor validates its whole declaration before allocating the
//! model, so a rejected declaration leaves the repository untouched.

use super::{Atom, XKind, XTypesClassifier};
use crate::config::{EngineConfig, DISCRIMINATOR_MARKER};
use crate::error::{Error, Result};
use crate::model::{Bound, Entry, Member, ObjectId, Qualifier, Scalar};
use crate::repository::{validate_role, Repository};
use crate::value::Value;
use std::collections::HashSet;

/// Role under which unions store their discriminator.
pub const DISCRIMINATOR_ROLE: &str = "_d";

/// Builtin annotations registered by every [`XTypes`] instance.
#[derive(Debug, Clone, Copy)]
struct Builtins {
    key: ObjectId,
    optional: ObjectId,
    id: ObjectId,
    extensibility: ObjectId,
    array: ObjectId,
    sequence: ObjectId,
}

/// X-Types type system over a [`Repository`].
#[derive(Debug)]
pub struct XTypes {
    repo: Repository<XTypesClassifier>,
    atoms: Vec<ObjectId>,
    builtins: Builtins,
}

impl Default for XTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl XTypes {
    /// Repository with every atom and builtin annotation registered.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut repo = Repository::with_config(XTypesClassifier, config);
        let atoms = Atom::ALL
            .iter()
            .map(|atom| repo.new_template(atom.name(), XKind::Atom).0)
            .collect();
        let mut annotation = |name: &str, kind: XKind| repo.new_template(name, kind).0;
        let builtins = Builtins {
            key: annotation("Key", XKind::Annotation),
            optional: annotation("Optional", XKind::Annotation),
            id: annotation("ID", XKind::Annotation),
            extensibility: annotation("Extensibility", XKind::Annotation),
            array: annotation("Array", XKind::CollectionAnnotation),
            sequence: annotation("Sequence", XKind::CollectionAnnotation),
        };
        log::debug!("[xtypes] {} atoms registered", Atom::ALL.len());
        Self {
            repo,
            atoms,
            builtins,
        }
    }

    pub fn repo(&self) -> &Repository<XTypesClassifier> {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut Repository<XTypesClassifier> {
        &mut self.repo
    }

    pub fn into_repository(self) -> Repository<XTypesClassifier> {
        self.repo
    }

    /// Template of a builtin atom.
    pub fn atom(&self, atom: Atom) -> ObjectId {
        self.atoms[atom as usize]
    }

    // ------------------------------------------------------------------------
    // Qualifiers
    // ------------------------------------------------------------------------

    /// `@key`
    pub fn key(&self) -> Qualifier {
        Qualifier::new(self.builtins.key)
    }

    /// `@optional`
    pub fn optional(&self) -> Qualifier {
        Qualifier::new(self.builtins.optional)
    }

    /// `@id(value)`
    pub fn id(&self, value: i64) -> Qualifier {
        Qualifier::new(self.builtins.id).with_arg("value", Scalar::Int(value))
    }

    /// `@extensibility(FINAL | APPENDABLE | MUTABLE)`
    pub fn extensibility(&self, kind: &str) -> Qualifier {
        Qualifier::new(self.builtins.extensibility).with_arg("kind", Scalar::Str(kind.to_string()))
    }

    /// Fixed-size array, one bound per dimension (outermost first).
    pub fn array(&self, dimensions: Vec<Bound>) -> Qualifier {
        Qualifier::new(self.builtins.array).with_dimensions(dimensions)
    }

    /// Sequence, unbounded when `bound` is `None`.
    pub fn sequence(&self, bound: Option<Bound>) -> Qualifier {
        Qualifier::new(self.builtins.sequence)
            .with_dimensions(vec![bound.unwrap_or(Bound::Unbounded)])
    }

    /// User-defined plain annotation.
    pub fn annotation(&mut self, name: &str) -> ObjectId {
        self.repo.new_template(name, XKind::Annotation).0
    }

    // ------------------------------------------------------------------------
    // Datatypes
    // ------------------------------------------------------------------------

    /// Structure. A `Type` entry names the base structure.
    pub fn struct_type(&mut self, name: &str, entries: Vec<Entry>) -> Result<ObjectId> {
        let mut base = None;
        let mut body = Vec::with_capacity(entries.len());
        let mut roles = HashSet::new();
        for entry in entries {
            match entry {
                Entry::Type(b) if base.is_none() => base = Some(self.struct_target(name, b)?),
                Entry::Type(_) => return Err(invalid(name, "more than one base")),
                Entry::Member(member) => {
                    if !member.labels.is_empty() {
                        return Err(invalid(name, format!("member {} has case labels", member.role)));
                    }
                    self.check_member(name, &member, &mut roles)?;
                    body.push(Entry::Member(member));
                }
                Entry::Qualifier(q) => {
                    self.repo.assert_qualifier_array(std::slice::from_ref(&q))?;
                    body.push(Entry::Qualifier(q));
                }
                Entry::Value(value, _) => {
                    return Err(invalid(name, format!("unexpected value {}", value)))
                }
            }
        }

        let (template, _) = self.repo.new_template(name, XKind::Struct);
        if base.is_some() {
            self.repo.set_base(template, base)?;
        }
        self.repo.populate_template(template, body)
    }

    /// Discriminated union. Members carry their case labels; at most one
    /// member may have none (the default case).
    pub fn union_type(
        &mut self,
        name: &str,
        discriminator: ObjectId,
        entries: Vec<Entry>,
    ) -> Result<ObjectId> {
        let disc = self.repo.resolve(discriminator)?;
        if !disc.qualifiers.is_empty()
            || !matches!(self.repo.kind(disc.target), Some(XKind::Atom | XKind::Enum))
        {
            return Err(invalid(name, "discriminator must be an atom or an enumeration"));
        }

        let mut roles = HashSet::new();
        roles.insert(DISCRIMINATOR_ROLE.to_string());
        let mut default_case = None;
        for entry in &entries {
            match entry {
                Entry::Member(member) => {
                    if member.labels.is_empty() {
                        if let Some(previous) = default_case.replace(member.role.as_str()) {
                            return Err(invalid(
                                name,
                                format!("{} and {} are both default cases", previous, member.role),
                            ));
                        }
                    }
                    self.check_member(name, member, &mut roles)?;
                }
                Entry::Qualifier(q) => self.repo.assert_qualifier_array(std::slice::from_ref(q))?,
                Entry::Type(_) | Entry::Value(..) => {
                    return Err(invalid(name, "unions only declare members and annotations"))
                }
            }
        }

        let (template, model) = self.repo.new_template(name, XKind::Union);
        self.repo.append_entry(template, Entry::Type(discriminator))?;
        self.repo.update_instances(
            model,
            DISCRIMINATOR_ROLE,
            Some(Value::Accessor(DISCRIMINATOR_MARKER.to_string())),
        )?;
        self.repo.populate_template(template, entries)
    }

    /// Enumeration. Unspecified ordinals continue from the previous one.
    pub fn enum_type(&mut self, name: &str, enumerators: &[(&str, Option<i64>)]) -> Result<ObjectId> {
        let mut seen = HashSet::new();
        let mut next = 0i64;
        let mut values = Vec::with_capacity(enumerators.len());
        for (label, ordinal) in enumerators {
            validate_role(label)?;
            if !seen.insert(*label) {
                return Err(invalid(name, format!("duplicate enumerator {}", label)));
            }
            let value = ordinal.unwrap_or(next);
            next = value
                .checked_add(1)
                .ok_or_else(|| invalid(name, format!("ordinal overflow after {}", label)))?;
            values.push((label.to_string(), value));
        }
        if values.is_empty() {
            return Err(invalid(name, "no enumerators"));
        }

        let (template, model) = self.repo.new_template(name, XKind::Enum);
        for (label, value) in values {
            self.repo
                .append_entry(template, Entry::Value(label.clone(), Scalar::Int(value)))?;
            self.repo
                .update_instances(model, &label, Some(Value::Scalar(Scalar::Int(value))))?;
        }
        Ok(template)
    }

    /// Alias of `target`, optionally qualified (`typedef long Vec[3];`).
    pub fn typedef(&mut self, name: &str, target: ObjectId, qualifiers: Vec<Qualifier>) -> Result<ObjectId> {
        self.repo.assert_template_kind(target)?;
        self.repo.assert_qualifier_array(&qualifiers)?;
        let (template, _) = self.repo.new_template(name, XKind::Typedef);
        self.repo.append_entry(template, Entry::Type(target))?;
        for qualifier in qualifiers {
            self.repo.append_entry(template, Entry::Qualifier(qualifier))?;
        }
        Ok(template)
    }

    /// Namespace, nested inside `parent` when given.
    pub fn module(&mut self, name: &str, parent: Option<ObjectId>) -> Result<ObjectId> {
        if let Some(parent) = parent {
            self.repo.assert_kind(&XKind::Module, parent)?;
        }
        let (template, _) = self.repo.new_template(name, XKind::Module);
        if let Some(parent) = parent {
            self.repo.add_to_namespace(parent, template)?;
        }
        Ok(template)
    }

    /// Declare `child` inside `module`.
    pub fn add(&mut self, module: ObjectId, child: ObjectId) -> Result<()> {
        self.repo.assert_kind(&XKind::Module, module)?;
        self.repo.add_to_namespace(module, child)
    }

    /// Named constant of an atomic type, usable as a collection bound.
    pub fn constant(&mut self, name: &str, datatype: ObjectId, value: Scalar) -> Result<ObjectId> {
        let resolved = self.repo.resolve(datatype)?;
        if !resolved.qualifiers.is_empty() || self.repo.kind(resolved.target) != Some(&XKind::Atom) {
            return Err(invalid(name, "constants must have an atomic type"));
        }
        let (template, _) = self.repo.new_template(name, XKind::Const);
        self.repo.append_entry(template, Entry::Type(datatype))?;
        self.repo.append_entry(template, Entry::Value(name.to_string(), value))?;
        Ok(template)
    }

    // ------------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------------

    /// Add or redefine a member of a structure or union.
    pub fn define_member(&mut self, template: ObjectId, member: Member) -> Result<()> {
        let name = self.repo.label(template);
        match self.repo.kind(template).copied() {
            Some(XKind::Struct) if !member.labels.is_empty() => Err(invalid(
                &name,
                format!("member {} has case labels", member.role),
            )),
            Some(XKind::Union) if member.role == DISCRIMINATOR_ROLE => {
                Err(Error::RoleName(member.role))
            }
            Some(XKind::Struct | XKind::Union) => self.repo.define_member(template, member),
            _ => Err(invalid(&name, "only structures and unions have members")),
        }
    }

    /// Replace (or clear) the base of a structure.
    pub fn set_base(&mut self, template: ObjectId, base: Option<ObjectId>) -> Result<()> {
        self.repo.assert_kind(&XKind::Struct, template)?;
        let name = self.repo.label(template);
        let base = base.map(|b| self.struct_target(&name, b)).transpose()?;
        let mut ancestor = base;
        let mut depth = 0usize;
        while let Some(current) = ancestor {
            depth += 1;
            if current == template || depth > self.repo.model_count() {
                return Err(invalid(&name, "cyclic inheritance"));
            }
            ancestor = self.base_of(current);
        }
        self.repo.set_base(template, base)
    }

    /// Declared base of a structure.
    pub fn base_of(&self, template: ObjectId) -> Option<ObjectId> {
        if self.repo.kind(template) != Some(&XKind::Struct) {
            return None;
        }
        let model = self.repo.model(template)?;
        match self.repo.model_ref(model).ok()?.definition().entries().first() {
            Some(Entry::Type(base)) => Some(*base),
            _ => None,
        }
    }

    fn struct_target(&self, name: &str, base: ObjectId) -> Result<ObjectId> {
        let resolved = self.repo.resolve(base)?;
        if !resolved.qualifiers.is_empty() || self.repo.kind(resolved.target) != Some(&XKind::Struct) {
            return Err(invalid(name, format!("base {} is not a structure", self.repo.label(base))));
        }
        Ok(resolved.target)
    }

    fn check_member(&self, name: &str, member: &Member, roles: &mut HashSet<String>) -> Result<()> {
        validate_role(&member.role)?;
        self.repo.assert_template_kind(member.datatype)?;
        self.repo.assert_qualifier_array(&member.qualifiers)?;
        if !roles.insert(member.role.clone()) {
            return Err(invalid(name, format!("duplicate member {}", member.role)));
        }
        Ok(())
    }
}

fn invalid(datatype: &str, reason: impl Into<String>) -> Error {
    Error::InvalidDeclaration {
        datatype: datatype.to_string(),
        reason: reason.into(),
    }
}
