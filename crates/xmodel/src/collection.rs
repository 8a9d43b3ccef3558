// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection engine: bounded or unbounded, possibly multi-dimensional,
//! lazily materialized indexed collections.
//!
//! Every collection has its own model whose definition is
//! `{element, capacity}`. Elements are cloned from the element template on
//! first access (named `<collection>[i]`) and memoized. Indices are 1-based.
//!
//! A collection installed in a canonical template is *template-owned*: its
//! length is the symbolic accessor `<name>#`. Data-holding collections report
//! their element count instead.

use crate::classify::Classifier;
use crate::config::{LENGTH_SUFFIX, MEMBER_SEPARATOR};
use crate::error::{Error, Result};
use crate::model::{Bound, CollectionOrigin, Definition, Entry, Model, ObjectId, Qualifier, Scalar};
use crate::repository::{Object, Repository};
use crate::value::{Length, Value};
use std::collections::BTreeMap;

impl<C: Classifier> Repository<C> {
    /// Create a collection of `content` elements.
    ///
    /// `content` must be a template or another collection; `capacity` must
    /// resolve to nothing (unbounded) or a positive size.
    pub fn new_collection(
        &mut self,
        content: ObjectId,
        capacity: Bound,
        name: &str,
        is_role_instance: bool,
    ) -> Result<ObjectId> {
        self.check_collection_content(content)?;
        let capacity = self.resolve_bound(&capacity)?;
        Ok(self.build_collection(content, capacity, name, is_role_instance))
    }

    /// Copy the shape of `source` under a new name.
    ///
    /// The new name is `prefix.<source name>` (either part dropped when
    /// empty). Data-holding copies remember `source` as their template.
    pub fn new_collection_instance(
        &mut self,
        source: ObjectId,
        prefix: &str,
        is_role_instance: bool,
    ) -> Result<ObjectId> {
        let (element, capacity, old_name) = self.collection_shape(source)?;
        let name = join_path(prefix, &old_name);
        let id = self.build_collection(element, capacity, &name, is_role_instance);
        if !is_role_instance {
            let model = self.model_of(id)?;
            self.model_mut(model)?.template = Some(source);
        }
        Ok(id)
    }

    /// Nested collections for a collection qualifier, innermost dimension first.
    ///
    /// Only the outermost level carries `name`; inner levels are anonymous so
    /// their elements are named `name[i][j]...`.
    pub(crate) fn new_collection_chain(
        &mut self,
        element: ObjectId,
        qualifier: &Qualifier,
        name: &str,
        is_role_instance: bool,
    ) -> Result<ObjectId> {
        self.check_collection_content(element)?;
        let dimensions = if qualifier.dimensions.is_empty() {
            vec![None]
        } else {
            qualifier
                .dimensions
                .iter()
                .map(|bound| self.resolve_bound(bound))
                .collect::<Result<Vec<_>>>()?
        };
        if dimensions.len() > self.config.max_dimensions {
            return Err(Error::CollectionCapacity(format!(
                "{} dimensions exceed the limit of {}",
                dimensions.len(),
                self.config.max_dimensions
            )));
        }

        let mut current = element;
        for (level, capacity) in dimensions.iter().enumerate().rev() {
            let level_name = if level == 0 { name } else { "" };
            current = self.build_collection(current, *capacity, level_name, is_role_instance);
        }
        Ok(current)
    }

    fn build_collection(
        &mut self,
        element: ObjectId,
        capacity: Option<usize>,
        name: &str,
        is_role_instance: bool,
    ) -> ObjectId {
        let model = self.push_model(Model::collection(name, element, capacity));
        let id = self.alloc(Object::Collection {
            model,
            elements: BTreeMap::new(),
        });
        if is_role_instance {
            self.models[model.0].template = Some(id);
        }
        id
    }

    fn check_collection_content(&self, content: ObjectId) -> Result<()> {
        match self.object(content) {
            Ok(Object::Collection { .. }) => Ok(()),
            Ok(Object::Composite { .. }) if self.assert_template_kind(content).is_ok() => Ok(()),
            _ => Err(Error::CollectionContent(self.label(content))),
        }
    }

    /// Resolve a dimension to a concrete capacity.
    pub(crate) fn resolve_bound(&self, bound: &Bound) -> Result<Option<usize>> {
        match bound {
            Bound::Unbounded => Ok(None),
            Bound::Size(0) => Err(Error::CollectionCapacity("0".into())),
            Bound::Size(n) => Ok(Some(*n)),
            Bound::Constant(constant) => {
                let model = self
                    .model_of(*constant)
                    .map_err(|_| Error::CollectionCapacity(constant.to_string()))?;
                let value = self.models[model.0]
                    .defn
                    .entries()
                    .iter()
                    .find_map(|entry| match entry {
                        Entry::Value(_, scalar) => Some(scalar),
                        _ => None,
                    });
                match value {
                    Some(Scalar::Int(n)) if *n > 0 => usize::try_from(*n)
                        .map(Some)
                        .map_err(|_| Error::CollectionCapacity(n.to_string())),
                    other => Err(Error::CollectionCapacity(format!(
                        "{} = {}",
                        self.label(*constant),
                        other.map_or_else(|| "<none>".to_string(), ToString::to_string)
                    ))),
                }
            }
        }
    }

    /// Element template, capacity and name of a collection.
    pub(crate) fn collection_shape(&self, id: ObjectId) -> Result<(ObjectId, Option<usize>, String)> {
        let model = match self.object(id)? {
            Object::Collection { model, .. } => *model,
            Object::Composite { .. } => return Err(Error::CollectionContent(self.label(id))),
        };
        let slot = &self.models[model.0];
        match slot.defn {
            Definition::Collection { element, capacity } => Ok((element, capacity, slot.name.clone())),
            Definition::Composite(_) => Err(Error::CollectionContent(self.label(id))),
        }
    }

    /// Whether a collection is template-owned, derived from another, or free.
    pub fn collection_origin(&self, id: ObjectId) -> Result<CollectionOrigin> {
        self.collection_shape(id)?;
        let model = self.model_of(id)?;
        Ok(match self.models[model.0].template {
            Some(t) if t == id => CollectionOrigin::TemplateOwned,
            Some(source) => CollectionOrigin::Derived(source),
            None => CollectionOrigin::Free,
        })
    }

    /// Bound of a collection, `None` when unbounded.
    pub fn capacity(&self, id: ObjectId) -> Result<Option<usize>> {
        Ok(self.collection_shape(id)?.1)
    }

    /// Symbolic length accessor (template-owned) or element count.
    ///
    /// The count is the run of occupied slots starting at index 1.
    pub fn len(&self, id: ObjectId) -> Result<Length> {
        let (_, _, name) = self.collection_shape(id)?;
        if self.collection_origin(id)? == CollectionOrigin::TemplateOwned {
            return Ok(Length::Accessor(format!("{}{}", name, LENGTH_SUFFIX)));
        }
        match self.object(id)? {
            Object::Collection { elements, .. } => {
                let mut count = 0;
                while elements.contains_key(&(count + 1)) {
                    count += 1;
                }
                Ok(Length::Count(count))
            }
            Object::Composite { .. } => Err(Error::CollectionContent(self.label(id))),
        }
    }

    /// Element `index` (1-based), materialized from the element template on first access.
    pub fn element(&mut self, id: ObjectId, index: usize) -> Result<Value> {
        let (element, capacity, name) = self.collection_shape(id)?;
        if index == 0 || capacity.is_some_and(|c| index > c) {
            return Err(Error::CollectionBounds {
                collection: name,
                index,
                capacity: capacity.unwrap_or(0),
            });
        }
        if let Object::Collection { elements, .. } = self.object(id)? {
            if let Some(value) = elements.get(&index) {
                return Ok(value.clone());
            }
        }

        let template_owned = self.collection_origin(id)? == CollectionOrigin::TemplateOwned;
        let path = format!("{}[{}]", name, index);
        let nested = matches!(self.object(element)?, Object::Collection { .. });
        let value = if nested {
            Value::Collection(self.new_collection_instance(element, &path, template_owned)?)
        } else {
            self.clone_value(&Value::Instance(element), &path, template_owned)?
        };
        log::trace!("[xmodel::collection] materialized {}", path);
        if let Object::Collection { elements, .. } = self.object_mut(id)? {
            elements.insert(index, value.clone());
        }
        Ok(value)
    }

    /// Overwrite element `index` (1-based).
    ///
    /// Only leaf elements may be overwritten; the current element is
    /// materialized first to find out.
    pub fn set_element(&mut self, id: ObjectId, index: usize, value: Value) -> Result<()> {
        let current = self.element(id, index)?;
        if current.is_structured() {
            let (_, _, name) = self.collection_shape(id)?;
            return Err(Error::NonLeafAssignment {
                collection: name,
                index,
            });
        }
        if let Object::Collection { elements, .. } = self.object_mut(id)? {
            elements.insert(index, value);
        }
        Ok(())
    }

    /// Human-readable form: leaves as-is, composites by datatype name,
    /// collections as `<name>{<element>}<capacity>`.
    pub fn describe(&self, value: &Value) -> Result<String> {
        match value {
            Value::Accessor(path) => Ok(path.clone()),
            Value::Scalar(scalar) => Ok(scalar.to_string()),
            Value::Instance(id) => {
                let model = self.model_of(*id)?;
                Ok(self.models[model.0].name.clone())
            }
            Value::Collection(id) => {
                let (element, capacity, name) = self.collection_shape(*id)?;
                let element = self.describe(&self.object_value(element)?)?;
                Ok(format!(
                    "{}{{{}}}{}",
                    name,
                    element,
                    capacity.map(|c| c.to_string()).unwrap_or_default()
                ))
            }
        }
    }

    /// Value referring to an object.
    pub(crate) fn object_value(&self, id: ObjectId) -> Result<Value> {
        Ok(match self.object(id)? {
            Object::Composite { .. } => Value::Instance(id),
            Object::Collection { .. } => Value::Collection(id),
        })
    }
}

/// Join two accessor segments with `.`, dropping the separator when either is empty.
pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}{}{}", prefix, MEMBER_SEPARATOR, name),
    }
}
