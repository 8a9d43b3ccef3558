// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clone and propagation engine.
//!
//! [`Repository::clone_value`] re-derives a field value under a new accessor
//! prefix. [`Repository::update_instances`] uses it to push a member change
//! into the canonical template and every instance registered against the
//! model, so a single edit re-synchronizes the whole instance population.

use crate::classify::Classifier;
use crate::config::{DISCRIMINATOR_MARKER, MEMBER_SEPARATOR};
use crate::error::{Error, Result};
use crate::model::{ModelId, ObjectId};
use crate::repository::{Object, Repository};
use crate::value::{Snapshot, Value};

/// Accessor path of leaf `leaf` under `prefix`.
///
/// The separator is dropped when the prefix is empty or the leaf is the
/// discriminator marker (`u#`).
pub fn accessor_path(prefix: &str, leaf: &str) -> String {
    if prefix.is_empty() || leaf == DISCRIMINATOR_MARKER {
        format!("{}{}", prefix, leaf)
    } else {
        format!("{}{}{}", prefix, MEMBER_SEPARATOR, leaf)
    }
}

impl<C: Classifier> Repository<C> {
    /// Re-derive `value` under `prefix`.
    ///
    /// - collections are copied with [`Repository::new_collection_instance`];
    /// - composites go through [`Repository::new_instance`], which names them
    ///   `prefix.<registered name>`;
    /// - accessors are re-prefixed with [`accessor_path`];
    /// - scalars are copied.
    pub fn clone_value(
        &mut self,
        value: &Value,
        prefix: &str,
        is_role_instance: bool,
    ) -> Result<Value> {
        match value {
            Value::Collection(id) => Ok(Value::Collection(self.new_collection_instance(
                *id,
                prefix,
                is_role_instance,
            )?)),
            Value::Instance(id) => self.new_instance(*id, Some(prefix), is_role_instance),
            Value::Accessor(leaf) => Ok(Value::Accessor(accessor_path(prefix, leaf))),
            Value::Scalar(scalar) => Ok(Value::Scalar(scalar.clone())),
        }
    }

    /// Install `role_template` as member `role` of `model`.
    ///
    /// The canonical template receives the value itself; every other live
    /// registered instance `n` receives `clone_value(role_template, n, true)`.
    /// `None` removes the member everywhere.
    pub fn update_instances(
        &mut self,
        model: ModelId,
        role: &str,
        role_template: Option<Value>,
    ) -> Result<()> {
        let slot = self.model_ref(model)?;
        let template = slot
            .template
            .ok_or_else(|| Error::TemplateKind(format!("{} has no template", model)))?;
        let targets: Vec<(ObjectId, String)> = slot
            .instances
            .as_ref()
            .map(|registry| {
                registry
                    .iter()
                    .filter(|(id, _)| *id != template)
                    .map(|(id, name)| (id, name.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        self.set_field(template, role, role_template.clone())?;
        let mut updated = 0usize;
        for (id, name) in &targets {
            if !self.is_live(*id) {
                continue;
            }
            let value = match &role_template {
                Some(v) => Some(self.clone_value(v, name, true)?),
                None => None,
            };
            self.set_field(*id, role, value)?;
            updated += 1;
        }
        log::debug!(
            "[xmodel::propagate] {}.{} -> {} instance(s)",
            self.models[model.0].name,
            role,
            updated
        );
        Ok(())
    }

    fn set_field(&mut self, id: ObjectId, role: &str, value: Option<Value>) -> Result<()> {
        match self.object_mut(id)? {
            Object::Composite { fields, .. } => {
                let position = fields.iter().position(|(r, _)| r == role);
                match (position, value) {
                    (Some(i), Some(v)) => fields[i].1 = v,
                    (None, Some(v)) => fields.push((role.to_string(), v)),
                    (Some(i), None) => {
                        fields.remove(i);
                    }
                    (None, None) => {}
                }
                Ok(())
            }
            Object::Collection { .. } => Err(Error::TemplateKind(id.to_string())),
        }
    }

    /// Unregister an instance and free it, along with every composite and
    /// collection it owns.
    ///
    /// Later propagation skips released instances. Canonical templates (and
    /// collections installed in them) cannot be released. Returns the number
    /// of objects freed.
    pub fn release_instance(&mut self, id: ObjectId) -> Result<usize> {
        let model = self.model_of(id)?;
        if self.models[model.0].template == Some(id) {
            return Err(Error::InvalidTemplate(format!(
                "{} is a canonical template",
                self.label(id)
            )));
        }

        let mut stack = vec![id];
        let mut released = 0usize;
        while let Some(current) = stack.pop() {
            // datatype templates written into a collection stay alive
            if current != id && self.is_template_object(current) {
                continue;
            }
            let Some(object) = self.objects.get_mut(current.0).and_then(Option::take) else {
                continue;
            };
            match &object {
                Object::Composite { fields, .. } => {
                    stack.extend(fields.iter().filter_map(|(_, v)| v.object()));
                }
                Object::Collection { elements, .. } => {
                    stack.extend(elements.values().filter_map(Value::object));
                }
            }
            if let Some(registry) = self.models[object.model().0].instances.as_mut() {
                registry.remove(current);
            }
            released += 1;
        }
        log::debug!("[xmodel::propagate] released {} ({} object(s))", id, released);
        Ok(released)
    }

    fn is_template_object(&self, id: ObjectId) -> bool {
        self.model_of(id).is_ok_and(|model| {
            let slot = &self.models[model.0];
            slot.kind.is_some() && slot.template == Some(id)
        })
    }

    /// Id-free structural copy of `value`.
    ///
    /// A composite already being captured further up (recursive datatypes
    /// reached through a collection) is captured without its fields.
    pub fn snapshot(&self, value: &Value) -> Result<Snapshot> {
        self.snapshot_within(value, &mut Vec::new())
    }

    fn snapshot_within(&self, value: &Value, open: &mut Vec<ModelId>) -> Result<Snapshot> {
        Ok(match value {
            Value::Accessor(path) => Snapshot::Accessor(path.clone()),
            Value::Scalar(scalar) => Snapshot::Scalar(scalar.clone()),
            Value::Instance(id) => {
                let model = self.model_of(*id)?;
                let datatype = self.models[model.0].name.clone();
                if open.contains(&model) {
                    return Ok(Snapshot::Composite {
                        datatype,
                        fields: Vec::new(),
                    });
                }
                open.push(model);
                let fields = self
                    .fields(*id)?
                    .iter()
                    .map(|(role, v)| Ok((role.clone(), self.snapshot_within(v, open)?)))
                    .collect::<Result<Vec<_>>>()?;
                open.pop();
                Snapshot::Composite { datatype, fields }
            }
            Value::Collection(id) => {
                let (element, capacity, name) = self.collection_shape(*id)?;
                let element = self.snapshot_within(&self.object_value(element)?, open)?;
                Snapshot::Collection {
                    name,
                    capacity,
                    element: Box::new(element),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bound, Member};
    use crate::xtypes::{Atom, XTypes};

    #[test]
    fn accessor_path_rules() {
        assert_eq!(accessor_path("p", "x"), "p.x");
        assert_eq!(accessor_path("", "x"), "x");
        assert_eq!(accessor_path("u", "#"), "u#");
        assert_eq!(accessor_path("", "#"), "#");
    }

    #[test]
    fn redefinition_reaches_existing_instances() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let double = xt.atom(Atom::Double);
        let point = xt
            .struct_type("Point", vec![Member::new("x", long).into()])
            .unwrap();
        let p1 = xt.repo_mut().new_instance(point, Some("p1"), false).unwrap();
        let p1 = p1.object().unwrap();

        xt.define_member(point, Member::new("z", double)).unwrap();
        let repo = xt.repo();
        assert_eq!(repo.field(p1, "z"), Some(&Value::Accessor("p1.z".into())));
        assert_eq!(repo.field(point, "z"), Some(&Value::Accessor("z".into())));
    }

    #[test]
    fn removal_reaches_existing_instances() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let point = xt
            .struct_type(
                "Point",
                vec![Member::new("x", long).into(), Member::new("y", long).into()],
            )
            .unwrap();
        let p1 = xt
            .repo_mut()
            .new_instance(point, Some("p1"), false)
            .unwrap()
            .object()
            .unwrap();
        assert!(xt.repo_mut().remove_member(point, "y").unwrap());
        assert!(!xt.repo_mut().remove_member(point, "y").unwrap());
        assert_eq!(xt.repo().field(p1, "y"), None);
        assert!(xt.repo().model_ref(xt.repo().model(point).unwrap()).unwrap().definition().member("y").is_none());
    }

    #[test]
    fn released_instances_are_skipped() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let seq = xt.sequence(Some(Bound::Size(4)));
        let point = xt
            .struct_type(
                "Point",
                vec![
                    Member::new("x", long).into(),
                    Member::new("hist", long).with_qualifier(seq).into(),
                ],
            )
            .unwrap();
        let model = xt.repo().model(point).unwrap();
        let p1 = xt
            .repo_mut()
            .new_instance(point, Some("p1"), false)
            .unwrap()
            .object()
            .unwrap();
        assert_eq!(xt.repo().instance_count(model), 2);

        // instance + its collection
        assert_eq!(xt.repo_mut().release_instance(p1).unwrap(), 2);
        assert_eq!(xt.repo().instance_count(model), 1);
        assert!(!xt.repo().is_live(p1));

        xt.define_member(point, Member::new("y", long)).unwrap();
        assert!(matches!(
            xt.repo_mut().release_instance(point),
            Err(Error::InvalidTemplate(_))
        ));
    }

    #[test]
    fn snapshot_ignores_ids() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let point = xt
            .struct_type("Point", vec![Member::new("x", long).into()])
            .unwrap();
        let repo = xt.repo_mut();
        let a = repo.new_instance(point, Some("p"), false).unwrap();
        let b = repo.new_instance(point, Some("p"), false).unwrap();
        assert_ne!(a, b);
        assert_eq!(repo.snapshot(&a).unwrap(), repo.snapshot(&b).unwrap());
        assert_eq!(repo.snapshot(&a).unwrap().roles(), vec!["x"]);
    }
}
