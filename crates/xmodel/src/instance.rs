// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance engine: manufactures instances from templates.
//!
//! An instance is either a bare accessor path (leaf datatypes), a composite
//! whose fields are cloned from the canonical template of its model, or a
//! collection (alias carrying a collection qualifier). Composites are
//! registered with their model so later structural edits reach them.

use crate::classify::Classifier;
use crate::collection::join_path;
use crate::error::{Error, Result};
use crate::model::{Entry, ModelId, ObjectId, Qualifier};
use crate::repository::{Object, Repository};
use crate::value::Value;

impl<C: Classifier> Repository<C> {
    /// Create an instance of `template`.
    ///
    /// `name` is the accessor prefix of the new instance; `None` (or empty)
    /// yields unprefixed accessors. When `template` is a registered instance
    /// rather than a canonical template, its registered name is appended to
    /// the prefix. `is_role_instance` marks an instance that
    /// will be installed inside an enclosing canonical template, which makes
    /// its collections report symbolic lengths.
    ///
    /// Typedef chains are unwrapped first; a typedef carrying a collection
    /// qualifier yields nested collections, one level per dimension. The
    /// returned composite matches the template's members at call time.
    pub fn new_instance(
        &mut self,
        template: ObjectId,
        name: Option<&str>,
        is_role_instance: bool,
    ) -> Result<Value> {
        let mut template = self.assert_template_kind(template)?;
        let mut depth = 0;
        while self.is_alias_model(self.model_of(template)?) {
            depth += 1;
            if depth > self.config.max_alias_depth {
                return Err(Error::AliasDepthExceeded {
                    depth: self.config.max_alias_depth,
                });
            }
            let (target, collections) = self.alias_definition(self.model_of(template)?)?;
            if let Some(qualifier) = collections.into_iter().next() {
                let id = self.new_collection_chain(
                    target,
                    &qualifier,
                    name.unwrap_or_default(),
                    is_role_instance,
                )?;
                return Ok(Value::Collection(id));
            }
            template = self.assert_template_kind(target)?;
        }

        let model = self.model_of(template)?;
        // a registered instance contributes its own name (`l` + `from` -> `l.from`)
        let prefix = join_path(name.unwrap_or_default(), &self.registered_name(template));
        if self.is_leaf_model(model) {
            return Ok(Value::Accessor(prefix));
        }

        let seed = self.models[model.0].template.unwrap_or(template);
        let source = self.fields(seed)?.to_vec();
        let mut fields = Vec::with_capacity(source.len());
        for (role, value) in source {
            let cloned = self.clone_value(&value, &prefix, is_role_instance)?;
            fields.push((role, cloned));
        }
        let id = self.alloc(Object::Composite { model, fields });
        self.register(model, id, &prefix);
        log::trace!(
            "[xmodel::instance] {} instance {:?} -> {}",
            self.models[model.0].name,
            prefix,
            id
        );
        Ok(Value::Instance(id))
    }

    /// Build the value installed for member `role` of a canonical template.
    ///
    /// A collection qualifier among `qualifiers` wraps the datatype in nested
    /// template-owned collections; otherwise this is a role instance of the
    /// datatype named `role`.
    pub fn create_role_instance(
        &mut self,
        datatype: ObjectId,
        role: &str,
        qualifiers: &[Qualifier],
    ) -> Result<Value> {
        let datatype = self.assert_template_kind(datatype)?;
        let collection = qualifiers
            .iter()
            .find(|q| self.is_collection_qualifier(q))
            .cloned();
        match collection {
            Some(qualifier) => Ok(Value::Collection(
                self.new_collection_chain(datatype, &qualifier, role, true)?,
            )),
            None => self.new_instance(datatype, Some(role), true),
        }
    }

    pub(crate) fn is_alias_model(&self, model: ModelId) -> bool {
        self.models[model.0]
            .kind
            .as_ref()
            .is_some_and(|k| self.classifier.is_alias_kind(k))
    }

    pub(crate) fn is_leaf_model(&self, model: ModelId) -> bool {
        self.models[model.0]
            .kind
            .as_ref()
            .is_some_and(|k| self.classifier.is_leaf_kind(k))
    }

    /// Target of an alias and the collection qualifiers that follow it.
    pub(crate) fn alias_definition(&self, model: ModelId) -> Result<(ObjectId, Vec<Qualifier>)> {
        let entries = self.models[model.0].defn.entries();
        let (position, target) = entries
            .iter()
            .enumerate()
            .find_map(|(i, e)| match e {
                Entry::Type(target) => Some((i, *target)),
                _ => None,
            })
            .ok_or_else(|| Error::InvalidDeclaration {
                datatype: self.models[model.0].name.clone(),
                reason: "alias has no target".into(),
            })?;
        let collections = entries[position + 1..]
            .iter()
            .filter_map(|e| match e {
                Entry::Qualifier(q) if self.is_collection_qualifier(q) => Some(q.clone()),
                _ => None,
            })
            .collect();
        Ok((target, collections))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Bound, Member};
    use crate::value::Value;
    use crate::xtypes::{Atom, XTypes};
    use crate::Error;

    fn point(xt: &mut XTypes) -> crate::ObjectId {
        let long = xt.atom(Atom::Long);
        xt.struct_type(
            "Point",
            vec![Member::new("x", long).into(), Member::new("y", long).into()],
        )
        .expect("Point")
    }

    #[test]
    fn leaf_instance_is_accessor() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let repo = xt.repo_mut();
        assert_eq!(
            repo.new_instance(long, Some("a.b"), false).unwrap(),
            Value::Accessor("a.b".into())
        );
        assert_eq!(
            repo.new_instance(long, None, false).unwrap(),
            Value::Accessor(String::new())
        );
    }

    #[test]
    fn composite_instance_prefixes_fields() {
        let mut xt = XTypes::new();
        let point = point(&mut xt);
        let repo = xt.repo_mut();
        let id = repo
            .new_instance(point, Some("p"), false)
            .unwrap()
            .object()
            .unwrap();
        assert_eq!(repo.field(id, "x"), Some(&Value::Accessor("p.x".into())));
        assert_eq!(repo.field(id, "y"), Some(&Value::Accessor("p.y".into())));
        assert_eq!(repo.instance_name(id), Some("p"));
        assert_eq!(repo.model(id), repo.model(point));
    }

    #[test]
    fn nested_composite_paths() {
        let mut xt = XTypes::new();
        let point = point(&mut xt);
        let line = xt
            .struct_type(
                "Line",
                vec![
                    Member::new("from", point).into(),
                    Member::new("to", point).into(),
                ],
            )
            .unwrap();
        let repo = xt.repo_mut();
        let l = repo.new_instance(line, Some("l"), false).unwrap().object().unwrap();
        let from = repo.field(l, "from").and_then(Value::object).unwrap();
        assert_eq!(repo.instance_name(from), Some("l.from"));
        assert_eq!(repo.field(from, "x"), Some(&Value::Accessor("l.from.x".into())));
    }

    #[test]
    fn role_template_keeps_its_name() {
        let mut xt = XTypes::new();
        let point = point(&mut xt);
        let line = xt.struct_type("Line", vec![]).unwrap();
        let l = xt
            .repo_mut()
            .new_instance(line, Some("l"), false)
            .unwrap()
            .object()
            .unwrap();
        xt.define_member(line, Member::new("from", point)).unwrap();

        let repo = xt.repo_mut();
        let role_template = repo.field(line, "from").and_then(Value::object).unwrap();
        assert_eq!(repo.instance_name(role_template), Some("from"));
        let fresh = repo.new_instance(role_template, Some("l"), true).unwrap();
        let fresh_id = fresh.object().unwrap();
        assert_eq!(repo.instance_name(fresh_id), Some("l.from"));
        assert_eq!(repo.field(fresh_id, "x"), Some(&Value::Accessor("l.from.x".into())));

        let propagated = repo.field(l, "from").cloned().unwrap();
        assert_eq!(repo.snapshot(&propagated).unwrap(), repo.snapshot(&fresh).unwrap());
    }

    #[test]
    fn non_template_rejected_before_allocation() {
        let mut xt = XTypes::new();
        let key = xt.key().annotation;
        let repo = xt.repo_mut();
        let before = repo.object_count();
        assert!(matches!(
            repo.new_instance(key, Some("k"), false),
            Err(Error::TemplateKind(_))
        ));
        assert_eq!(repo.object_count(), before);
    }

    #[test]
    fn role_instance_with_collection_qualifier() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let seq = xt.sequence(Some(Bound::Size(2)));
        let repo = xt.repo_mut();
        let value = repo.create_role_instance(long, "vals", &[seq]).unwrap();
        assert!(repo.is_collection(&value));
        let id = value.object().unwrap();
        assert_eq!(repo.capacity(id).unwrap(), Some(2));
    }

    #[test]
    fn typedef_with_multi_dimensional_array() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let dims = xt.array(vec![Bound::Size(2), Bound::Size(3)]);
        let matrix = xt.typedef("Matrix", long, vec![dims]).unwrap();
        let repo = xt.repo_mut();
        let outer = repo
            .new_instance(matrix, Some("m"), false)
            .unwrap()
            .object()
            .unwrap();
        assert_eq!(repo.capacity(outer).unwrap(), Some(2));
        let inner = repo.element(outer, 2).unwrap().object().unwrap();
        assert_eq!(repo.capacity(inner).unwrap(), Some(3));
        assert_eq!(
            repo.element(inner, 3).unwrap(),
            Value::Accessor("m[2][3]".into())
        );
        assert!(matches!(
            repo.element(inner, 4),
            Err(Error::CollectionBounds { .. })
        ));
    }
}
