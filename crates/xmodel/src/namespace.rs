// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Namespace resolver and alias resolution.

use crate::classify::Classifier;
use crate::config::SCOPE_SEPARATOR;
use crate::error::{Error, Result};
use crate::model::{ModelId, ObjectId, Qualifier};
use crate::repository::Repository;

/// Result of unwrapping an alias chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Collection qualifiers met along the chain, outermost alias first.
    pub qualifiers: Vec<Qualifier>,
    /// First non-alias datatype.
    pub target: ObjectId,
}

impl<C: Classifier> Repository<C> {
    /// Name of `template` scoped relative to `namespace` (`Outer::Inner`).
    ///
    /// Returns `None` when `template` is the namespace itself, and the bare
    /// local name when the template is declared directly in `namespace` (or
    /// has no enclosing namespace). `namespace = None` yields the fully
    /// qualified name.
    pub fn nsname(&self, template: ObjectId, namespace: Option<ObjectId>) -> Result<Option<String>> {
        let model = self.namespace_model(template)?;
        let target = namespace.map(|ns| self.namespace_model(ns)).transpose()?;
        if Some(model) == target {
            return Ok(None);
        }

        let mut scope = vec![self.models[model.0].name.as_str()];
        let mut current = model;
        let mut depth = 0usize;
        while let Some(parent) = self.models[current.0].ns {
            if Some(parent) == target {
                break;
            }
            depth += 1;
            if depth > self.models.len() {
                return Err(Error::InvalidTemplate(format!(
                    "namespace cycle at {}",
                    self.models[current.0].name
                )));
            }
            scope.push(self.models[parent.0].name.as_str());
            current = parent;
        }
        scope.reverse();
        Ok(Some(scope.join(SCOPE_SEPARATOR)))
    }

    /// Outermost enclosing namespace of `template` (possibly itself).
    pub fn nsroot(&self, template: ObjectId) -> Result<ObjectId> {
        let mut current = self.namespace_model(template)?;
        let mut depth = 0usize;
        while let Some(parent) = self.models[current.0].ns {
            depth += 1;
            if depth > self.models.len() {
                return Err(Error::InvalidTemplate(format!(
                    "namespace cycle at {}",
                    self.models[current.0].name
                )));
            }
            current = parent;
        }
        self.models[current.0]
            .template
            .ok_or_else(|| Error::InvalidTemplate(self.models[current.0].name.clone()))
    }

    /// Unwrap an alias chain.
    ///
    /// Every collection qualifier met on the way is returned in order,
    /// followed by the first non-alias target.
    pub fn resolve(&self, template: ObjectId) -> Result<Resolved> {
        let mut target = self.assert_template_kind(template)?;
        let mut qualifiers = Vec::new();
        let mut depth = 0usize;
        loop {
            let model = self.model_of(target)?;
            if !self.is_alias_model(model) {
                return Ok(Resolved { qualifiers, target });
            }
            depth += 1;
            if depth > self.config.max_alias_depth {
                return Err(Error::AliasDepthExceeded {
                    depth: self.config.max_alias_depth,
                });
            }
            let (next, collections) = self.alias_definition(model)?;
            qualifiers.extend(collections);
            target = self.assert_template_kind(next)?;
        }
    }

    fn namespace_model(&self, template: ObjectId) -> Result<ModelId> {
        let model = self
            .model_of(template)
            .map_err(|_| Error::InvalidTemplate(template.to_string()))?;
        if self.models[model.0].kind.is_none() {
            return Err(Error::InvalidTemplate(self.label(template)));
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bound, Member};
    use crate::xtypes::{Atom, XTypes};

    #[test]
    fn nested_names() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let outer = xt.module("Outer", None).unwrap();
        let inner = xt.module("Inner", Some(outer)).unwrap();
        let point = xt
            .struct_type("Point", vec![Member::new("x", long).into()])
            .unwrap();
        xt.repo_mut().add_to_namespace(inner, point).unwrap();
        let repo = xt.repo();

        assert_eq!(
            repo.nsname(point, None).unwrap().as_deref(),
            Some("Outer::Inner::Point")
        );
        assert_eq!(
            repo.nsname(point, Some(outer)).unwrap().as_deref(),
            Some("Inner::Point")
        );
        assert_eq!(repo.nsname(point, Some(inner)).unwrap().as_deref(), Some("Point"));
        assert_eq!(repo.nsname(outer, Some(outer)).unwrap(), None);
        assert_eq!(repo.nsroot(point).unwrap(), outer);
        assert_eq!(repo.nsroot(outer).unwrap(), outer);
        assert_eq!(repo.scope_lookup(inner, "Point"), Some(point));
        assert_eq!(repo.scope_lookup(outer, "Point"), None);
    }

    #[test]
    fn unrelated_namespace_yields_full_name() {
        let mut xt = XTypes::new();
        let a = xt.module("A", None).unwrap();
        let b = xt.module("B", Some(a)).unwrap();
        let c = xt.module("C", None).unwrap();
        assert_eq!(
            xt.repo().nsname(b, Some(c)).unwrap().as_deref(),
            Some("A::B")
        );
    }

    #[test]
    fn collections_have_no_namespace() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let seq = xt
            .repo_mut()
            .new_collection(long, Bound::Unbounded, "v", false)
            .unwrap();
        assert!(matches!(
            xt.repo().nsname(seq, None),
            Err(Error::InvalidTemplate(_))
        ));
        assert!(matches!(
            xt.repo().nsroot(seq),
            Err(Error::InvalidTemplate(_))
        ));
    }

    #[test]
    fn resolve_collects_collection_qualifiers() {
        let mut xt = XTypes::new();
        let long = xt.atom(Atom::Long);
        let seq = xt.sequence(Some(Bound::Size(5)));
        let arr = xt.array(vec![Bound::Size(2)]);
        let inner = xt.typedef("Inner", long, vec![seq.clone()]).unwrap();
        let outer = xt.typedef("Outer", inner, vec![arr.clone()]).unwrap();
        let key = xt.key();
        let plain = xt.typedef("Plain", outer, vec![key]).unwrap();

        let resolved = xt.repo().resolve(plain).unwrap();
        assert_eq!(resolved.target, long);
        assert_eq!(resolved.qualifiers, vec![arr, seq]);
        assert_eq!(xt.repo().resolve(long).unwrap().qualifiers, vec![]);
    }
}
