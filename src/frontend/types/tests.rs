//! Type representation and comparison tests

use super::*;
use super::compare::pointer_shape;
use proptest::prelude::*;

fn ptr(inner: Type) -> Type {
    inner.pointer_to()
}

#[test]
fn test_null_is_append_identity() {
    let mut ty = Type::null();
    ty.append(TypeNode::Pointer);
    ty.append_type(&Type::atomic("i32"));
    assert_eq!(ty, ptr(Type::atomic("i32")));

    let before = ty.clone();
    ty.append_type(&Type::null());
    assert_eq!(ty, before);
}

#[test]
fn test_ids_are_fresh_and_ignored_by_equality() {
    let a = Type::atomic("u8");
    let b = Type::atomic("u8");
    assert_ne!(a.id(), b.id());
    assert_eq!(a, b);

    let mut c = a.clone();
    c.append(TypeNode::Pointer);
    assert!(c.id() > a.id());
}

#[test]
fn test_function_layout() {
    let f = Type::function(
        &[
            ("a".to_string(), Type::atomic("i32")),
            ("b".to_string(), ptr(Type::atomic("u8"))),
        ],
        &Type::atomic("bool"),
    );

    assert_eq!(f.to_string(), "(a: i32, b: ^u8) -> bool");
    assert_eq!(f.params().len(), 2);
    assert_eq!(f.params()[1].without_names(), ptr(Type::atomic("u8")));
    assert_eq!(f.param_names(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(f.return_type(), Some(Type::atomic("bool")));
}

#[test]
fn test_function_of_function() {
    let inner = Type::function(&[("x".to_string(), Type::atomic("i32"))], &Type::atomic("i32"));
    let outer = Type::function(&[("cb".to_string(), inner.clone())], &Type::atomic("void"));

    assert_eq!(outer.params().len(), 1);
    assert_eq!(outer.params()[0].without_names(), inner.without_names());
    assert_eq!(outer.return_type(), Some(Type::atomic("void")));
}

#[test]
fn test_no_params() {
    let f = Type::function(&[], &Type::atomic("i32"));
    assert!(f.params().is_empty());
    assert_eq!(f.return_type(), Some(Type::atomic("i32")));
}

#[test]
fn test_pointer_helpers() {
    let t = ptr(ptr(Type::atomic("f32")));
    assert_eq!(t.pointer_depth(), 2);
    assert_eq!(t.base(), Type::atomic("f32"));
    assert_eq!(t.deref(), Some(ptr(Type::atomic("f32"))));
    assert_eq!(Type::atomic("f32").deref(), None);
}

#[test]
fn test_exact_ignores_var_names() {
    let named = Type::from_nodes([TypeNode::VarName("x".into()), TypeNode::Atomic("i32".into())]);
    assert_eq!(compare(&named, &Type::atomic("i32"), Tier::Exact), Some(0));
}

#[test]
fn test_exact_requires_pointer_depth() {
    let a = ptr(Type::atomic("i32"));
    let b = Type::atomic("i32");
    assert_eq!(compare(&a, &b, Tier::Exact), None);
    assert_eq!(compare(&a, &b, Tier::AutoRef), Some(1));
}

#[test]
fn test_array_kinds_must_agree() {
    let arr = Type::from_nodes([TypeNode::Array, TypeNode::Atomic("i32".into())]);
    let sized = Type::from_nodes([TypeNode::SizedArray(4), TypeNode::Atomic("i32".into())]);
    assert_eq!(compare(&arr, &sized, Tier::Casting), None);
}

#[test]
fn test_casting_within_family_only() {
    let i32_ = Type::atomic("i32");
    assert_eq!(compare(&i32_, &Type::atomic("u64"), Tier::AutoRef), None);
    assert_eq!(compare(&i32_, &Type::atomic("u64"), Tier::Casting), Some(1));
    assert_eq!(compare(&Type::atomic("f32"), &Type::atomic("f64"), Tier::Casting), Some(1));
    assert_eq!(compare(&i32_, &Type::atomic("f64"), Tier::Casting), None);
    assert_eq!(compare(&i32_, &Type::atomic("bool"), Tier::Casting), None);
}

#[test]
fn test_best_match_ranks_tier_then_changes() {
    let exact = best_match(&Type::atomic("i32"), &Type::atomic("i32")).unwrap();
    let autoref = best_match(&ptr(Type::atomic("i32")), &Type::atomic("i32")).unwrap();
    let cast = best_match(&Type::atomic("i64"), &Type::atomic("i32")).unwrap();

    assert_eq!(exact.tier, Tier::Exact);
    assert_eq!(autoref.tier, Tier::AutoRef);
    assert_eq!(cast.tier, Tier::Casting);
    assert!(exact < autoref && autoref < cast);

    let two = Match {
        tier: Tier::AutoRef,
        changes: 2,
    };
    assert!(autoref < two);
}

#[test]
fn test_pointer_shape() {
    let a = ptr(Type::atomic("i32"));
    let b = ptr(Type::atomic("Node"));
    assert_eq!(pointer_shape(&a), pointer_shape(&b));
    assert_ne!(pointer_shape(&a), pointer_shape(&Type::atomic("i32")));
}

#[test]
fn test_display() {
    let t = Type::from_nodes([
        TypeNode::Pointer,
        TypeNode::SizedArray(3),
        TypeNode::Atomic("u8".into()),
    ]);
    assert_eq!(t.to_string(), "^[3]u8");
}

fn atom_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("i8"),
        Just("i32"),
        Just("u64"),
        Just("f32"),
        Just("f64"),
        Just("bool"),
        Just("Node"),
    ]
    .prop_map(str::to_string)
}

fn type_strategy() -> impl Strategy<Value = Type> {
    (0usize..3, prop::bool::ANY, atom_strategy()).prop_map(|(depth, array, atom)| {
        let mut ty = Type::null();
        for _ in 0..depth {
            ty.append(TypeNode::Pointer);
        }
        if array {
            ty.append(TypeNode::Array);
        }
        ty.append(TypeNode::Atomic(atom));
        ty
    })
}

proptest! {
    #[test]
    fn prop_compare_is_reflexive(ty in type_strategy()) {
        for tier in Tier::ALL {
            prop_assert_eq!(compare(&ty, &ty, tier), Some(0));
        }
    }

    #[test]
    fn prop_stricter_tier_implies_looser(a in type_strategy(), b in type_strategy()) {
        if compare(&a, &b, Tier::Exact).is_some() {
            prop_assert!(compare(&a, &b, Tier::AutoRef).is_some());
        }
        if compare(&a, &b, Tier::AutoRef).is_some() {
            prop_assert!(compare(&a, &b, Tier::Casting).is_some());
        }
    }

    #[test]
    fn prop_compare_is_symmetric(a in type_strategy(), b in type_strategy()) {
        for tier in Tier::ALL {
            prop_assert_eq!(compare(&a, &b, tier), compare(&b, &a, tier));
        }
    }

    #[test]
    fn prop_decimal_literals_are_signed(n in 0u64..u64::MAX) {
        let ty = literal_type(&n.to_string()).unwrap();
        let name = ty.atomic_name().unwrap().to_string();
        prop_assert!(name == "i32" || name == "i64" || name == "i128");
    }
}
