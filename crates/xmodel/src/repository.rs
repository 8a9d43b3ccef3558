// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Repository: arena owner of every model and object, template constructor,
//! read-only helpers and structural builder operations.
//!
//! A repository is created once per concrete type system, with that type
//! system's [`Classifier`]. All structural edits go through the builder
//! operations here ([`Repository::define_member`], [`Repository::remove_member`],
//! [`Repository::set_base`]), each of which re-synchronizes every instance
//! already issued from the edited model.

use crate::classify::Classifier;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{Definition, Entry, Member, Model, ModelId, ObjectId, Qualifier, Registry};
use crate::value::Value;
use std::collections::BTreeMap;

/// Arena slot contents.
#[derive(Debug, Clone)]
pub(crate) enum Object {
    /// Template or composite instance.
    Composite {
        model: ModelId,
        fields: Vec<(String, Value)>,
    },
    /// Collection with its memoized elements (1-based).
    Collection {
        model: ModelId,
        elements: BTreeMap<usize, Value>,
    },
}

impl Object {
    pub(crate) fn model(&self) -> ModelId {
        match self {
            Object::Composite { model, .. } | Object::Collection { model, .. } => *model,
        }
    }
}

/// Owner of the models and objects of one type system.
#[derive(Debug)]
pub struct Repository<C: Classifier> {
    pub(crate) classifier: C,
    pub(crate) config: EngineConfig,
    pub(crate) models: Vec<Model<C::Kind>>,
    pub(crate) objects: Vec<Option<Object>>,
}

impl<C: Classifier> Repository<C> {
    /// Create an empty repository classified by `classifier`.
    pub fn new(classifier: C) -> Self {
        Self::with_config(classifier, EngineConfig::default())
    }

    /// Create an empty repository with explicit limits.
    pub fn with_config(classifier: C, config: EngineConfig) -> Self {
        Self {
            classifier,
            config,
            models: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------------

    pub(crate) fn object(&self, id: ObjectId) -> Result<&Object> {
        self.objects
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownObject(id))
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownObject(id))
    }

    pub(crate) fn alloc(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(Some(object));
        id
    }

    pub(crate) fn push_model(&mut self, model: Model<C::Kind>) -> ModelId {
        let id = ModelId(self.models.len());
        self.models.push(model);
        id
    }

    pub(crate) fn model_mut(&mut self, id: ModelId) -> Result<&mut Model<C::Kind>> {
        self.models.get_mut(id.0).ok_or(Error::UnknownModel(id))
    }

    pub(crate) fn model_of(&self, id: ObjectId) -> Result<ModelId> {
        Ok(self.object(id)?.model())
    }

    /// Model by id.
    pub fn model_ref(&self, id: ModelId) -> Result<&Model<C::Kind>> {
        self.models.get(id.0).ok_or(Error::UnknownModel(id))
    }

    /// Whether `id` is a live object of this repository.
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.object(id).is_ok()
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Diagnostic label of an object: its model name, or its id.
    pub(crate) fn label(&self, id: ObjectId) -> String {
        match self.model_of(id) {
            Ok(model) if !self.models[model.0].name.is_empty() => self.models[model.0].name.clone(),
            _ => id.to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Template/Model constructor
    // ------------------------------------------------------------------------

    /// Allocate a model of `kind` and its canonical template.
    ///
    /// The template is registered (under the empty name) in the new model's
    /// instance registry; alias models get no registry since they never hold
    /// instances of their own.
    pub fn new_template(&mut self, name: &str, kind: C::Kind) -> (ObjectId, ModelId) {
        let is_alias = self.classifier.is_alias_kind(&kind);
        let kind_name = self.classifier.kind_name(&kind);
        let model = self.push_model(Model::datatype(name, kind));
        let template = self.alloc(Object::Composite {
            model,
            fields: Vec::new(),
        });

        let slot = &mut self.models[model.0];
        slot.template = Some(template);
        if !is_alias {
            let mut registry = Registry::default();
            registry.insert(template, "");
            slot.instances = Some(registry);
        }
        log::debug!(
            "[xmodel::repository] new template {:?} kind={} ({})",
            name,
            kind_name,
            model
        );
        (template, model)
    }

    /// Install an ordered declaration list into a template.
    ///
    /// Qualifier entries are buffered and installed as the datatype's
    /// `QUALIFIERS` list; members are defined (and propagated); every other
    /// entry is appended positionally to the definition.
    pub fn populate_template(&mut self, template: ObjectId, defn: Vec<Entry>) -> Result<ObjectId> {
        let model = self.canonical_model(template)?;
        let mut qualifiers = Vec::new();
        for entry in defn {
            match entry {
                Entry::Qualifier(q) if self.is_qualifier(&q) => qualifiers.push(q),
                Entry::Member(member) => self.define_member(template, member)?,
                other => self.append_entry(template, other)?,
            }
        }
        self.models[model.0].qualifiers = qualifiers;
        Ok(template)
    }

    /// Append one raw entry to a template's definition.
    ///
    /// Member entries are routed through [`Repository::define_member`].
    pub fn append_entry(&mut self, template: ObjectId, entry: Entry) -> Result<()> {
        let model = self.canonical_model(template)?;
        if let Entry::Member(member) = entry {
            return self.define_member(template, member);
        }
        match &entry {
            Entry::Qualifier(q) => self.assert_qualifier_array(std::slice::from_ref(q))?,
            Entry::Type(target) => {
                self.model_of(*target)?;
            }
            Entry::Member(_) | Entry::Value(..) => {}
        }
        if let Definition::Composite(entries) = &mut self.model_mut(model)?.defn {
            entries.push(entry);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Read-only helpers
    // ------------------------------------------------------------------------

    /// Kind of the model behind `id`; `None` for collections and unknown ids.
    pub fn kind(&self, id: ObjectId) -> Option<&C::Kind> {
        let model = self.model_of(id).ok()?;
        self.models[model.0].kind.as_ref()
    }

    /// Require `id` to be of kind `expected`.
    pub fn assert_kind(&self, expected: &C::Kind, id: ObjectId) -> Result<ObjectId> {
        match self.kind(id) {
            Some(kind) if kind == expected => Ok(id),
            Some(kind) => Err(Error::TemplateKind(format!(
                "{} is {}, expected {}",
                self.label(id),
                self.classifier.kind_name(kind),
                self.classifier.kind_name(expected)
            ))),
            None => Err(Error::TemplateKind(format!(
                "{} has no kind, expected {}",
                self.label(id),
                self.classifier.kind_name(expected)
            ))),
        }
    }

    /// Require `id` to be a composite whose kind may seed instances.
    pub fn assert_template_kind(&self, id: ObjectId) -> Result<ObjectId> {
        let object = self
            .object(id)
            .map_err(|_| Error::TemplateKind(id.to_string()))?;
        if let Object::Composite { model, .. } = object {
            if let Some(kind) = &self.models[model.0].kind {
                if self.classifier.is_template_kind(kind) {
                    return Ok(id);
                }
            }
        }
        Err(Error::TemplateKind(self.label(id)))
    }

    /// Require every entry to be a qualifier.
    pub fn assert_qualifier_array(&self, qualifiers: &[Qualifier]) -> Result<()> {
        match qualifiers.iter().find(|q| !self.is_qualifier(q)) {
            Some(q) => Err(Error::Qualifier(self.label(q.annotation))),
            None => Ok(()),
        }
    }

    pub(crate) fn is_qualifier(&self, qualifier: &Qualifier) -> bool {
        self.kind(qualifier.annotation)
            .is_some_and(|k| self.classifier.is_qualifier_kind(k))
    }

    pub(crate) fn is_collection_qualifier(&self, qualifier: &Qualifier) -> bool {
        self.kind(qualifier.annotation)
            .is_some_and(|k| self.classifier.is_qualifier_kind(k) && self.classifier.is_collection_kind(k))
    }

    /// Whether `value` is a live collection.
    pub fn is_collection(&self, value: &Value) -> bool {
        match value {
            Value::Collection(id) => matches!(self.object(*id), Ok(Object::Collection { .. })),
            _ => false,
        }
    }

    /// Model an object is bound to.
    pub fn model(&self, id: ObjectId) -> Option<ModelId> {
        self.model_of(id).ok()
    }

    /// Canonical template of a model.
    pub fn template(&self, model: ModelId) -> Option<ObjectId> {
        self.models.get(model.0).and_then(|m| m.template)
    }

    /// Field `role` of a composite.
    pub fn field(&self, id: ObjectId, role: &str) -> Option<&Value> {
        match self.object(id).ok()? {
            Object::Composite { fields, .. } => {
                fields.iter().find(|(r, _)| r == role).map(|(_, v)| v)
            }
            Object::Collection { .. } => None,
        }
    }

    /// All fields of a composite, in installation order.
    pub fn fields(&self, id: ObjectId) -> Result<&[(String, Value)]> {
        match self.object(id)? {
            Object::Composite { fields, .. } => Ok(fields),
            Object::Collection { .. } => Err(Error::TemplateKind(self.label(id))),
        }
    }

    /// Name a composite instance was created with (empty for templates).
    pub fn instance_name(&self, id: ObjectId) -> Option<&str> {
        let model = self.model_of(id).ok()?;
        self.models[model.0].instances.as_ref()?.name_of(id)
    }

    /// Number of registered instances of a model, template included.
    pub fn instance_count(&self, model: ModelId) -> usize {
        self.models
            .get(model.0)
            .and_then(|m| m.instances.as_ref())
            .map_or(0, Registry::len)
    }

    pub(crate) fn registered_name(&self, id: ObjectId) -> String {
        self.instance_name(id).unwrap_or_default().to_string()
    }

    pub(crate) fn register(&mut self, model: ModelId, id: ObjectId, name: &str) {
        self.models[model.0]
            .instances
            .get_or_insert_with(Registry::default)
            .insert(id, name);
    }

    /// Model of a canonical datatype template; structural edits go through it.
    pub(crate) fn canonical_model(&self, template: ObjectId) -> Result<ModelId> {
        let model = self.model_of(template)?;
        let slot = &self.models[model.0];
        if slot.kind.is_none() || slot.template != Some(template) {
            return Err(Error::TemplateKind(format!(
                "{} is not a canonical template",
                self.label(template)
            )));
        }
        Ok(model)
    }

    // ------------------------------------------------------------------------
    // Builder operations
    // ------------------------------------------------------------------------

    /// Define (or redefine) a member and re-synchronize every instance.
    ///
    /// A redefinition keeps the member's position in the definition.
    pub fn define_member(&mut self, template: ObjectId, member: Member) -> Result<()> {
        let model = self.canonical_model(template)?;
        validate_role(&member.role)?;
        self.assert_qualifier_array(&member.qualifiers)?;
        if !member.qualifiers.iter().any(|q| self.is_collection_qualifier(q))
            && self.reaches_model(member.datatype, model)?
        {
            return Err(Error::InvalidDeclaration {
                datatype: self.models[model.0].name.clone(),
                reason: format!("member {} contains its own datatype", member.role),
            });
        }
        let role_value =
            self.create_role_instance(member.datatype, &member.role, &member.qualifiers)?;

        let role = member.role.clone();
        if let Definition::Composite(entries) = &mut self.models[model.0].defn {
            let existing = entries
                .iter()
                .position(|e| matches!(e, Entry::Member(m) if m.role == role));
            match existing {
                Some(pos) => entries[pos] = Entry::Member(member),
                None => entries.push(Entry::Member(member)),
            }
        }
        log::debug!(
            "[xmodel::repository] define {}.{}",
            self.models[model.0].name,
            role
        );
        self.update_instances(model, &role, Some(role_value))
    }

    /// Whether an instance of `datatype` would hold an instance of `model`
    /// outside any collection.
    pub(crate) fn reaches_model(&self, datatype: ObjectId, model: ModelId) -> Result<bool> {
        let resolved = self.resolve(datatype)?;
        if !resolved.qualifiers.is_empty() {
            return Ok(false);
        }
        let mut stack = vec![self.model_of(resolved.target)?];
        let mut seen = Vec::new();
        while let Some(current) = stack.pop() {
            if current == model {
                return Ok(true);
            }
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            let Some(seed) = self.template(current) else {
                continue;
            };
            if let Some(Object::Composite { fields, .. }) = self.objects.get(seed.0).and_then(Option::as_ref) {
                for (_, value) in fields {
                    // collections break containment
                    if let Value::Instance(id) = value {
                        stack.push(self.model_of(*id)?);
                    }
                }
            }
        }
        Ok(false)
    }

    /// Remove a member from the definition and from every instance.
    ///
    /// Returns whether the member existed.
    pub fn remove_member(&mut self, template: ObjectId, role: &str) -> Result<bool> {
        let model = self.canonical_model(template)?;
        let removed = match &mut self.models[model.0].defn {
            Definition::Composite(entries) => {
                let before = entries.len();
                entries.retain(|e| !matches!(e, Entry::Member(m) if m.role == role));
                entries.len() != before
            }
            Definition::Collection { .. } => false,
        };
        if removed {
            log::debug!(
                "[xmodel::repository] remove {}.{}",
                self.models[model.0].name,
                role
            );
            self.update_instances(model, role, None)?;
        }
        Ok(removed)
    }

    /// Replace the base datatype whose fields are inherited.
    ///
    /// Fields contributed by the previous base are removed (unless declared
    /// directly), then each field of the new base is installed into the
    /// template and every instance.
    pub fn set_base(&mut self, template: ObjectId, base: Option<ObjectId>) -> Result<()> {
        let model = self.canonical_model(template)?;
        let new_base_model = match base {
            Some(b) => Some(self.model_of(self.assert_template_kind(b)?)?),
            None => None,
        };
        if let Some(b) = base {
            if self.reaches_model(b, model)? {
                return Err(Error::InvalidDeclaration {
                    datatype: self.models[model.0].name.clone(),
                    reason: format!("base {} contains {}", self.label(b), self.models[model.0].name),
                });
            }
        }

        let old_base = match self.models[model.0].defn.entries().first() {
            Some(Entry::Type(b)) => Some(*b),
            _ => None,
        };
        if let Some(old) = old_base {
            let old_roles: Vec<String> = match self.model_of(old).ok().and_then(|m| self.template(m)) {
                Some(seed) => self.fields(seed)?.iter().map(|(r, _)| r.clone()).collect(),
                None => Vec::new(),
            };
            for role in old_roles {
                if self.models[model.0].defn.member(&role).is_none() {
                    self.update_instances(model, &role, None)?;
                }
            }
        }

        if let Definition::Composite(entries) = &mut self.models[model.0].defn {
            if old_base.is_some() {
                entries.remove(0);
            }
            if let Some(b) = base {
                entries.insert(0, Entry::Type(b));
            }
        }

        if let Some(base_model) = new_base_model {
            let seed = self
                .template(base_model)
                .ok_or_else(|| Error::TemplateKind(self.models[base_model.0].name.clone()))?;
            let inherited = self.fields(seed)?.to_vec();
            for (role, value) in inherited {
                let role_value = self.clone_value(&value, "", true)?;
                self.update_instances(model, &role, Some(role_value))?;
            }
        }
        Ok(())
    }

    /// Replace the datatype-level qualifiers.
    pub fn set_qualifiers(&mut self, template: ObjectId, qualifiers: Vec<Qualifier>) -> Result<()> {
        let model = self.canonical_model(template)?;
        self.assert_qualifier_array(&qualifiers)?;
        self.models[model.0].qualifiers = qualifiers;
        Ok(())
    }

    /// Set (or clear) the enclosing namespace of a datatype.
    pub fn set_namespace(&mut self, template: ObjectId, namespace: Option<ObjectId>) -> Result<()> {
        let model = self.canonical_model(template)?;
        let ns = match namespace {
            Some(ns) => Some(self.canonical_model(ns)?),
            None => None,
        };
        self.models[model.0].ns = ns;
        Ok(())
    }

    /// Nest `child` inside `namespace` and list it in the namespace definition.
    pub fn add_to_namespace(&mut self, namespace: ObjectId, child: ObjectId) -> Result<()> {
        self.set_namespace(child, Some(namespace))?;
        let model = self.canonical_model(namespace)?;
        if let Definition::Composite(entries) = &mut self.models[model.0].defn {
            if !entries.contains(&Entry::Type(child)) {
                entries.push(Entry::Type(child));
            }
        }
        Ok(())
    }

    /// Datatype named `name` declared directly inside `namespace`.
    pub fn scope_lookup(&self, namespace: ObjectId, name: &str) -> Option<ObjectId> {
        let model = self.model_of(namespace).ok()?;
        self.models[model.0]
            .defn
            .entries()
            .iter()
            .find_map(|entry| match entry {
                Entry::Type(child) if self.model(*child).is_some_and(|m| {
                    self.models[m.0].name == name && self.models[m.0].ns == Some(model)
                }) =>
                {
                    Some(*child)
                }
                _ => None,
            })
    }
}

/// Role names are identifiers: a letter or `_`, then letters, digits or `_`.
pub(crate) fn validate_role(role: &str) -> Result<()> {
    let mut chars = role.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::RoleName(role.to_string()))
    }
}
