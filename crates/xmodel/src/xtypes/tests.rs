// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::builder::DISCRIMINATOR_ROLE;
use super::*;
use crate::model::{Bound, Entry, Member, Scalar};
use crate::value::{Length, Value};
use crate::Error;

#[test]
fn classifier_predicates() {
    let c = XTypesClassifier;
    assert!(c.is_leaf_kind(&XKind::Atom));
    assert!(c.is_leaf_kind(&XKind::Enum));
    assert!(!c.is_leaf_kind(&XKind::Struct));
    assert!(c.is_alias_kind(&XKind::Typedef));
    assert!(c.is_qualifier_kind(&XKind::Annotation));
    assert!(c.is_qualifier_kind(&XKind::CollectionAnnotation));
    assert!(c.is_collection_kind(&XKind::CollectionAnnotation));
    assert!(!c.is_collection_kind(&XKind::Annotation));
    assert!(!c.is_template_kind(&XKind::Const));
    assert!(!c.is_template_kind(&XKind::Annotation));
    assert!(c.is_template_kind(&XKind::Module));
    assert_eq!(c.kind_name(&XKind::Union), "union");
}

#[test]
fn atoms_are_registered_once() {
    let xt = XTypes::new();
    for atom in Atom::ALL {
        let id = xt.atom(atom);
        let model = xt.repo().model(id).unwrap();
        assert_eq!(xt.repo().model_ref(model).unwrap().name(), atom.name());
        assert_eq!(xt.repo().kind(id), Some(&XKind::Atom));
    }
    assert_ne!(xt.atom(Atom::Long), xt.atom(Atom::LongLong));
}

#[test]
fn struct_inherits_base_fields() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let base = xt
        .struct_type("Base", vec![Member::new("id", long).into()])
        .unwrap();
    let derived = xt
        .struct_type(
            "Derived",
            vec![Entry::Type(base), Member::new("extra", long).into()],
        )
        .unwrap();
    assert_eq!(xt.base_of(derived), Some(base));

    let repo = xt.repo_mut();
    let roles: Vec<_> = repo.fields(derived).unwrap().iter().map(|(r, _)| r.clone()).collect();
    assert_eq!(roles, vec!["id", "extra"]);
    let d = repo.new_instance(derived, Some("d"), false).unwrap().object().unwrap();
    assert_eq!(repo.field(d, "id"), Some(&Value::Accessor("d.id".into())));
}

#[test]
fn rebasing_replaces_inherited_fields() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let a = xt.struct_type("A", vec![Member::new("a", long).into()]).unwrap();
    let b = xt.struct_type("B", vec![Member::new("b", long).into()]).unwrap();
    let s = xt
        .struct_type("S", vec![Entry::Type(a), Member::new("own", long).into()])
        .unwrap();
    let i = xt.repo_mut().new_instance(s, Some("i"), false).unwrap().object().unwrap();

    xt.set_base(s, Some(b)).unwrap();
    let repo = xt.repo();
    assert_eq!(repo.field(i, "a"), None);
    assert_eq!(repo.field(i, "b"), Some(&Value::Accessor("i.b".into())));
    assert_eq!(repo.field(i, "own"), Some(&Value::Accessor("i.own".into())));

    xt.set_base(s, None).unwrap();
    assert_eq!(xt.repo().field(i, "b"), None);
    assert_eq!(xt.base_of(s), None);
}

#[test]
fn cyclic_inheritance_is_rejected() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let a = xt.struct_type("A", vec![Member::new("a", long).into()]).unwrap();
    let b = xt
        .struct_type("B", vec![Entry::Type(a)])
        .unwrap();
    assert!(matches!(
        xt.set_base(a, Some(b)),
        Err(Error::InvalidDeclaration { .. })
    ));
    assert!(matches!(
        xt.set_base(a, Some(a)),
        Err(Error::InvalidDeclaration { .. })
    ));
}

#[test]
fn rejected_declarations_allocate_nothing() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let key = xt.key();
    let models = xt.repo().model_count();

    assert!(matches!(
        xt.struct_type("Bad", vec![Member::new("1x", long).into()]),
        Err(Error::RoleName(_))
    ));
    assert!(matches!(
        xt.struct_type(
            "Bad",
            vec![Member::new("x", long).into(), Member::new("x", long).into()]
        ),
        Err(Error::InvalidDeclaration { .. })
    ));
    assert!(matches!(
        xt.struct_type("Bad", vec![Member::new("k", key.annotation).into()]),
        Err(Error::TemplateKind(_))
    ));
    assert!(matches!(
        xt.struct_type(
            "Bad",
            vec![Member::new("x", long).with_labels(vec![Scalar::Int(1)]).into()]
        ),
        Err(Error::InvalidDeclaration { .. })
    ));
    assert!(matches!(
        xt.struct_type("Bad", vec![Entry::Value("v".into(), Scalar::Int(1))]),
        Err(Error::InvalidDeclaration { .. })
    ));
    assert_eq!(xt.repo().model_count(), models);
}

#[test]
fn qualifiers_are_recorded_on_the_datatype() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let ext = xt.extensibility("APPENDABLE");
    let key = xt.key();
    let s = xt
        .struct_type(
            "S",
            vec![ext.clone().into(), Member::new("id", long).with_qualifier(key.clone()).into()],
        )
        .unwrap();
    let repo = xt.repo();
    let model = repo.model_ref(repo.model(s).unwrap()).unwrap();
    assert_eq!(model.qualifiers(), &[ext]);
    assert_eq!(model.definition().member("id").unwrap().qualifiers, vec![key]);
    assert_eq!(
        model.qualifiers()[0].arg("kind"),
        Some(&Scalar::Str("APPENDABLE".into()))
    );
}

#[test]
fn union_discriminator_accessor() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let double = xt.atom(Atom::Double);
    let u = xt
        .union_type(
            "U",
            long,
            vec![
                Member::new("a", long).with_labels(vec![Scalar::Int(1)]).into(),
                Member::new("b", double).into(),
            ],
        )
        .unwrap();
    let repo = xt.repo_mut();
    assert_eq!(repo.field(u, DISCRIMINATOR_ROLE), Some(&Value::Accessor("#".into())));
    let i = repo.new_instance(u, Some("u"), false).unwrap().object().unwrap();
    assert_eq!(repo.field(i, DISCRIMINATOR_ROLE), Some(&Value::Accessor("u#".into())));
    assert_eq!(repo.field(i, "a"), Some(&Value::Accessor("u.a".into())));
}

#[test]
fn union_declaration_errors() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let point = xt
        .struct_type("Point", vec![Member::new("x", long).into()])
        .unwrap();
    assert!(matches!(
        xt.union_type("U", point, vec![]),
        Err(Error::InvalidDeclaration { .. })
    ));
    assert!(matches!(
        xt.union_type(
            "U",
            long,
            vec![Member::new("a", long).into(), Member::new("b", long).into()]
        ),
        Err(Error::InvalidDeclaration { .. })
    ));
    assert!(matches!(
        xt.union_type("U", long, vec![Member::new("_d", long).into()]),
        Err(Error::InvalidDeclaration { .. })
    ));
}

#[test]
fn enum_ordinals_continue() {
    let mut xt = XTypes::new();
    let color = xt
        .enum_type("Color", &[("RED", None), ("GREEN", Some(5)), ("BLUE", None)])
        .unwrap();
    let repo = xt.repo_mut();
    assert_eq!(repo.field(color, "RED"), Some(&Value::Scalar(Scalar::Int(0))));
    assert_eq!(repo.field(color, "GREEN"), Some(&Value::Scalar(Scalar::Int(5))));
    assert_eq!(repo.field(color, "BLUE"), Some(&Value::Scalar(Scalar::Int(6))));
    assert_eq!(
        repo.new_instance(color, Some("c"), false).unwrap(),
        Value::Accessor("c".into())
    );
    assert!(matches!(
        xt.enum_type("Dup", &[("A", None), ("A", None)]),
        Err(Error::InvalidDeclaration { .. })
    ));
}

#[test]
fn constant_bounds_a_sequence() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let max = xt.constant("MAX", long, Scalar::Int(4)).unwrap();
    let zero = xt.constant("ZERO", long, Scalar::Int(0)).unwrap();
    let seq = xt.sequence(Some(Bound::Constant(max)));
    let s = xt
        .struct_type("S", vec![Member::new("v", long).with_qualifier(seq).into()])
        .unwrap();
    let v = xt.repo().field(s, "v").and_then(Value::object).unwrap();
    assert_eq!(xt.repo().capacity(v).unwrap(), Some(4));
    assert_eq!(xt.repo().len(v).unwrap(), Length::Accessor("v#".into()));

    let bad = xt.sequence(Some(Bound::Constant(zero)));
    assert!(matches!(
        xt.struct_type("T", vec![Member::new("v", long).with_qualifier(bad).into()]),
        Err(Error::CollectionCapacity(_))
    ));
    assert!(matches!(
        xt.repo_mut().new_instance(max, Some("m"), false),
        Err(Error::TemplateKind(_))
    ));
}

#[test]
fn members_only_on_structs_and_unions() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let alias = xt.typedef("Alias", long, vec![]).unwrap();
    let module = xt.module("M", None).unwrap();
    for target in [alias, module, long] {
        assert!(matches!(
            xt.define_member(target, Member::new("x", long)),
            Err(Error::InvalidDeclaration { .. })
        ));
    }
    assert!(matches!(
        xt.module("N", Some(alias)),
        Err(Error::TemplateKind(_))
    ));
}

#[test]
fn self_reference_needs_a_collection() {
    let mut xt = XTypes::new();
    let long = xt.atom(Atom::Long);
    let node = xt
        .struct_type("Node", vec![Member::new("value", long).into()])
        .unwrap();
    assert!(matches!(
        xt.define_member(node, Member::new("next", node)),
        Err(Error::InvalidDeclaration { .. })
    ));
    let seq = xt.sequence(None);
    xt.define_member(node, Member::new("children", node).with_qualifier(seq))
        .unwrap();
    let children = xt.repo().field(node, "children").and_then(Value::object).unwrap();
    assert_eq!(xt.repo().describe(&Value::Collection(children)).unwrap(), "children{Node}");
}
