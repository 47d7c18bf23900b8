//! Structural diff: generate a patch that transforms one document into another.
//!
//! Traversal uses an explicit work stack instead of recursion, so document
//! depth is bounded by heap, not by the call stack. Compound nodes are never
//! compared with `==`, which would recurse.

use serde_json::{Map, Value};

use crate::types::{Op, Path};

/// A pending comparison of two compound nodes of the same kind.
struct Frame<'a> {
    origin: &'a Value,
    destination: &'a Value,
    path: Path,
}

/// Generate the operations that transform `origin` into `destination`.
///
/// The output order is a pure function of the inputs:
/// - sequences: tail `add`s or `remove`s from the highest index down, then
///   the overlapping prefix in ascending index order. The first tail `add`
///   targets the last destination index and the rest insert at the origin
///   length, ahead of the elements already added;
/// - maps: `remove`s in origin key order, shared keys in origin key order,
///   then `add`s in destination key order;
/// - nested compound pairs are queued and handled last-in first-out.
///
/// Nodes of different kinds are replaced wholesale.
pub fn diff(origin: &Value, destination: &Value) -> Vec<Op> {
    let mut ops = Vec::new();
    let mut stack = vec![Frame { origin, destination, path: Vec::new() }];

    while let Some(Frame { origin, destination, path }) = stack.pop() {
        if std::ptr::eq(origin, destination) {
            continue;
        }
        match (origin, destination) {
            (Value::Array(src), Value::Array(dst)) => {
                diff_arrays(&mut ops, &mut stack, &path, src, dst)
            }
            (Value::Object(src), Value::Object(dst)) => {
                diff_objects(&mut ops, &mut stack, &path, src, dst)
            }
            // At least one side is a scalar, so `==` does not descend.
            _ if origin == destination => {}
            _ => ops.push(Op::Replace { path, value: destination.clone() }),
        }
    }
    ops
}

fn child(path: &[String], step: impl Into<String>) -> Path {
    let mut p = Vec::with_capacity(path.len() + 1);
    p.extend_from_slice(path);
    p.push(step.into());
    p
}

fn same_compound_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_))
    )
}

/// Replace scalars and kind changes now; queue same-kind compound pairs.
fn compare_child<'a>(
    ops: &mut Vec<Op>,
    stack: &mut Vec<Frame<'a>>,
    path: Path,
    origin: &'a Value,
    destination: &'a Value,
) {
    if same_compound_kind(origin, destination) {
        stack.push(Frame { origin, destination, path });
    } else if origin != destination {
        ops.push(Op::Replace { path, value: destination.clone() });
    }
}

fn diff_arrays<'a>(
    ops: &mut Vec<Op>,
    stack: &mut Vec<Frame<'a>>,
    path: &[String],
    src: &'a [Value],
    dst: &'a [Value],
) {
    let overlap = src.len().min(dst.len());
    if dst.len() > src.len() {
        let last = dst.len() - 1;
        for i in (src.len()..dst.len()).rev() {
            let at = if i == last { last } else { src.len() };
            ops.push(Op::Add { path: child(path, at.to_string()), value: dst[i].clone() });
        }
    } else {
        for i in (dst.len()..src.len()).rev() {
            ops.push(Op::Remove { path: child(path, i.to_string()) });
        }
    }
    for i in 0..overlap {
        compare_child(ops, stack, child(path, i.to_string()), &src[i], &dst[i]);
    }
}

fn diff_objects<'a>(
    ops: &mut Vec<Op>,
    stack: &mut Vec<Frame<'a>>,
    path: &[String],
    src: &'a Map<String, Value>,
    dst: &'a Map<String, Value>,
) {
    for key in src.keys() {
        if !dst.contains_key(key) {
            ops.push(Op::Remove { path: child(path, key.as_str()) });
        }
    }
    for (key, src_val) in src {
        if let Some(dst_val) = dst.get(key) {
            compare_child(ops, stack, child(path, key.as_str()), src_val, dst_val);
        }
    }
    for (key, dst_val) in dst {
        if !src.contains_key(key) {
            ops.push(Op::Add { path: child(path, key.as_str()), value: dst_val.clone() });
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply_patch;
    use serde_json::json;

    fn p(steps: &[&str]) -> Path {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_equal_docs() {
        assert!(diff(&json!({"a": [1, {"b": null}]}), &json!({"a": [1, {"b": null}]})).is_empty());
    }

    #[test]
    fn diff_ignores_key_order() {
        assert!(diff(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})).is_empty());
    }

    #[test]
    fn diff_replace_scalar_root() {
        assert_eq!(diff(&json!(1), &json!("1")), vec![Op::Replace { path: vec![], value: json!("1") }]);
    }

    #[test]
    fn diff_array_tail_adds_highest_first() {
        let ops = diff(&json!(["a", "c"]), &json!(["b", "c", "a", 5]));
        assert_eq!(
            ops,
            vec![
                Op::Add { path: p(&["3"]), value: json!(5) },
                Op::Add { path: p(&["2"]), value: json!("a") },
                Op::Replace { path: p(&["0"]), value: json!("b") },
            ]
        );
    }

    #[test]
    fn diff_array_many_tail_adds_insert_in_order() {
        let ops = diff(&json!([]), &json!([1, 2, 3]));
        assert_eq!(
            ops,
            vec![
                Op::Add { path: p(&["2"]), value: json!(3) },
                Op::Add { path: p(&["0"]), value: json!(2) },
                Op::Add { path: p(&["0"]), value: json!(1) },
            ]
        );
        assert_eq!(apply_patch(json!([]), &ops).unwrap(), json!([1, 2, 3]));

        let src = json!(["x"]);
        let dst = json!(["x", 1, 2, 3, {"k": [4]}]);
        assert_eq!(apply_patch(src.clone(), &diff(&src, &dst)).unwrap(), dst);
    }

    #[test]
    fn diff_shared_subtrees_emit_nothing() {
        let shared = json!({"a": [1, {"b": [2, 3]}]});
        assert!(diff(&shared, &shared).is_empty());
        let ops = diff(&json!({"a": [1, {"b": [2, 3]}], "c": 1}), &json!({"a": [1, {"b": [2, 3]}], "c": 2}));
        assert_eq!(ops, vec![Op::Replace { path: p(&["c"]), value: json!(2) }]);
    }

    #[test]
    fn diff_array_tail_removes_highest_first() {
        let ops = diff(&json!([1, 2, 3, 4]), &json!([1]));
        assert_eq!(
            ops,
            vec![
                Op::Remove { path: p(&["3"]) },
                Op::Remove { path: p(&["2"]) },
                Op::Remove { path: p(&["1"]) },
            ]
        );
    }

    #[test]
    fn diff_object_order_remove_shared_add() {
        let ops = diff(&json!({"a": 1, "b": 2, "c": 3}), &json!({"b": 20, "d": 4, "c": 3}));
        assert_eq!(
            ops,
            vec![
                Op::Remove { path: p(&["a"]) },
                Op::Replace { path: p(&["b"]), value: json!(20) },
                Op::Add { path: p(&["d"]), value: json!(4) },
            ]
        );
    }

    #[test]
    fn diff_kind_change_replaces_whole_node() {
        let ops = diff(&json!({"a": [1, 2]}), &json!({"a": {"0": 1}}));
        assert_eq!(ops, vec![Op::Replace { path: p(&["a"]), value: json!({"0": 1}) }]);
    }

    #[test]
    fn diff_nested_compound_is_descended() {
        let ops = diff(
            &json!({"startingActions": [{"amount": 1, "currency": "CAD"}]}),
            &json!({"startingActions": [{"amount": 2, "currency": "CAD"}]}),
        );
        assert_eq!(
            ops,
            vec![Op::Replace { path: p(&["startingActions", "0", "amount"]), value: json!(2) }]
        );
    }

    #[test]
    fn diff_escapes_nothing_internally() {
        let ops = diff(&json!({}), &json!({"a/b": 1}));
        assert_eq!(ops[0].path(), &p(&["a/b"]));
        assert_eq!(ops[0].pointer(), "/a~1b");
    }

    #[test]
    fn diff_is_stable_across_runs() {
        let a = json!({"x": [1, {"y": [true, null]}], "z": {"k": "v"}});
        let b = json!({"x": [2, {"y": [false]}, 3], "z": {"k": "w", "n": 1}});
        assert_eq!(diff(&a, &b), diff(&a, &b));
    }

    #[test]
    fn diff_deep_nesting() {
        let mut a = json!(0);
        let mut b = json!(1);
        for _ in 0..1_000 {
            a = json!([a]);
            b = json!([b]);
        }
        let ops = diff(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].path().len(), 1_000);
    }

    #[test]
    fn diff_roundtrip_mixed() {
        let src = json!({"name": "Alice", "tags": ["a", "b", "c"], "meta": {"n": 1}});
        let dst = json!({"name": "Bob", "tags": ["b"], "meta": [1], "city": "NYC"});
        let result = apply_patch(src.clone(), &diff(&src, &dst)).unwrap();
        assert_eq!(result, dst);
    }
}
