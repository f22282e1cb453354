use super::*;
use crate::{
    schema::{ColumnMap, ColumnType},
    value::{Timestamp, Value},
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn columns() -> ColumnMap {
    [
        ("a".to_string(), ColumnType::Integer),
        ("b".to_string(), ColumnType::Text),
        ("c".to_string(), ColumnType::TextSet),
        ("d".to_string(), ColumnType::Timestamp),
    ]
    .into_iter()
    .collect()
}

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("c".to_string()),
        Just("d".to_string()),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<bool>().prop_map(Value::Bool),
        "[a-z0-9]{0,6}".prop_map(Value::Text),
        any::<i64>().prop_map(|ms| Value::Timestamp(Timestamp::from_millis(ms))),
        Just(Value::Null),
    ]
}

fn arb_scalar_op() -> impl Strategy<Value = CmpOp> {
    prop_oneof![
        Just(CmpOp::Eq),
        Just(CmpOp::Ne),
        Just(CmpOp::Gt),
        Just(CmpOp::Gte),
        Just(CmpOp::Lt),
        Just(CmpOp::Lte),
        Just(CmpOp::Like),
        Just(CmpOp::NLike),
        Just(CmpOp::Substr),
        Just(CmpOp::NSubstr),
    ]
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    let leaf = prop_oneof![
        Just(Filter::True),
        arb_field().prop_map(Filter::exists),
        arb_field().prop_map(Filter::missing),
        (arb_field(), arb_scalar_op(), arb_scalar()).prop_map(|(field, op, value)| {
            Filter::Cmp(CmpFilter {
                field,
                op,
                operand: Operand::Scalar(value),
            })
        }),
        (
            arb_field(),
            prop_oneof![Just(CmpOp::In), Just(CmpOp::Nin)],
            prop::collection::vec(arb_scalar(), 0..4),
        )
            .prop_map(|(field, op, values)| {
                Filter::Cmp(CmpFilter {
                    field,
                    op,
                    operand: Operand::List(values),
                })
            }),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Filter::And),
            prop::collection::vec(inner, 0..4).prop_map(Filter::Or),
        ]
    })
}

fn compile_ok(filter: &Filter) -> CompiledPredicate {
    compile(filter, &columns()).expect("generated filters are well-formed")
}

// Every `:p<n>` token in the statement, by occurrence.
fn placeholder_occurrences(statement: &str) -> Vec<String> {
    let mut out = Vec::new();
    let bytes = statement.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' && bytes.get(i + 1) == Some(&b'p') {
            let start = i + 1;
            let mut end = i + 2;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > i + 2 {
                out.push(statement[start..end].to_string());
            }
            i = end;
        } else {
            i += 1;
        }
    }

    out
}

proptest! {
    #[test]
    fn parameters_are_collision_free_and_fully_referenced(filter in arb_filter()) {
        let compiled = compile_ok(&filter);

        let occurrences = placeholder_occurrences(&compiled.statement);
        let distinct: BTreeSet<_> = occurrences.iter().cloned().collect();

        // every bound parameter appears exactly once in the statement
        prop_assert_eq!(distinct.len(), occurrences.len());
        prop_assert_eq!(distinct.len(), compiled.params.len());
        for name in compiled.params.keys() {
            prop_assert!(distinct.contains(name), "unreferenced parameter {}", name);
        }
    }

    #[test]
    fn compilation_is_deterministic(filter in arb_filter()) {
        prop_assert_eq!(compile_ok(&filter), compile_ok(&filter));
    }

    #[test]
    fn groups_are_balanced(filter in arb_filter()) {
        let compiled = compile_ok(&filter);
        let opens = compiled.statement.matches('(').count();
        let closes = compiled.statement.matches(')').count();

        prop_assert_eq!(opens, closes);
    }

    #[test]
    fn sibling_branches_never_share_parameters(
        branches in prop::collection::vec(arb_filter(), 0..5)
    ) {
        let per_branch: usize = branches
            .iter()
            .map(|branch| compile_ok(branch).params.len())
            .sum();
        let combined = compile_ok(&Filter::And(branches));

        // merged parameter count equals the sum over branches, so no name
        // was lost to a collision
        prop_assert_eq!(combined.params.len(), per_branch);
    }
}
