use super::*;
use crate::equivalence::structurally_equal;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

fn numbers(value: &Value) -> Vec<i64> {
    fn collect(value: &Value, out: &mut Vec<i64>) {
        match value {
            Value::Number(n) => out.push(i64::try_from(*n).unwrap_or(i64::MIN)),
            Value::Sequence(items) | Value::Tuple(items) | Value::Program(items) => {
                for item in items {
                    collect(item, out);
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    collect(value, &mut out);
    out
}

#[test]
fn test_normalize_flattens_nested_sequences() {
    let nested = Value::Sequence(vec![
        num(1),
        Value::Sequence(vec![num(2), Value::Sequence(vec![num(3), Value::Nil])]),
        Value::Nil,
    ]);

    let normalized = nested.normalize();
    let Value::Sequence(items) = &normalized else {
        panic!("expected a sequence, got {normalized:?}");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(numbers(&normalized), vec![1, 2, 3]);
}

#[test]
fn test_normalize_collapses_small_sequences() {
    assert!(Value::Sequence(vec![]).normalize().is_nil());
    assert!(Value::Sequence(vec![Value::Nil, Value::Sequence(vec![])])
        .normalize()
        .is_nil());
    assert!(matches!(
        Value::Sequence(vec![Value::Nil, num(7)]).normalize(),
        Value::Number(n) if n == Decimal::from(7)
    ));
}

#[test]
fn test_normalize_keeps_tuple_shape() {
    let tuple = Value::Tuple(vec![Value::Nil, Value::Sequence(vec![num(1)]), num(2)]);
    let Value::Tuple(items) = tuple.normalize() else {
        panic!("tuple lost its shape");
    };
    assert_eq!(items.len(), 3);
    assert!(items[0].is_nil());
    assert!(matches!(items[1], Value::Number(_)));
}

#[test]
fn test_boolean_is_one_or_zero() {
    assert!(matches!(Value::boolean(true), Value::Number(n) if n == Decimal::ONE));
    assert!(matches!(Value::boolean(false), Value::Number(n) if n.is_zero()));
}

#[test]
fn test_state_insert_keeps_position() {
    let a = Name::from_raw(10);
    let b = Name::from_raw(11);
    let state = StateRef::new();
    state.insert(a, num(1));
    state.insert(b, num(2));
    state.insert(a, num(3));

    let keys: Vec<Name> = state.borrow().iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![a, b]);
    assert!(matches!(state.get(a), Some(Value::Number(n)) if n == Decimal::from(3)));
    assert!(state.get(Name::from_raw(12)).is_none());
}

#[test]
fn test_state_handles_share_the_map() {
    let state = StateRef::new();
    let alias = state.clone();
    alias.insert(Name::from_raw(5), Value::Nil);

    assert_eq!(state.len(), 1);
    assert!(state.ptr_eq(&alias));
    assert!(!state.ptr_eq(&StateRef::new()));
}

#[test]
fn test_state_can_contain_itself() {
    let state = StateRef::new();
    state.insert(Name::from_raw(1), Value::State(state.clone()));
    // Debug must not recurse through the cycle.
    assert_eq!(format!("{state:?}"), "{Name(1)}");
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![Just(Value::Nil), (-50i64..50).prop_map(num)];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            prop::collection::vec(inner, 0..4).prop_map(Value::Tuple),
        ]
    })
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(value in arb_value()) {
        let once = value.normalize();
        let twice = once.clone().normalize();
        prop_assert!(structurally_equal(&once, &twice));
    }

    #[test]
    fn prop_normalize_preserves_numbers(value in arb_value()) {
        let before = numbers(&value);
        prop_assert_eq!(numbers(&value.normalize()), before);
    }
}
