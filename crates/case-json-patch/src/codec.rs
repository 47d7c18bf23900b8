//! Wire codec: `{ op, path, value?, from? }` objects with escaped pointers.

use case_json_pointer::{format_json_pointer, parse_json_pointer_strict};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::{Op, PatchError};

fn encode_path(path: &[String]) -> Value {
    Value::String(format_json_pointer(path))
}

fn decode_path(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, PatchError> {
    let s = obj
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp(format!("{field} must be a string")))?;
    parse_json_pointer_strict(s).map_err(|e| PatchError::InvalidOp(e.to_string()))
}

fn decode_value(obj: &Map<String, Value>) -> Result<Value, PatchError> {
    obj.get("value")
        .cloned()
        .ok_or_else(|| PatchError::InvalidOp("value is required".into()))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` to its wire object.
pub fn to_json(op: &Op) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), Value::String(op.op_name().into()));
    m.insert("path".into(), encode_path(op.path()));
    match op {
        Op::Add { value, .. } | Op::Replace { value, .. } | Op::Test { value, .. } => {
            m.insert("value".into(), value.clone());
        }
        Op::Move { from, .. } | Op::Copy { from, .. } => {
            m.insert("from".into(), encode_path(from));
        }
        Op::Remove { .. } => {}
    }
    Value::Object(m)
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Decode a wire object into an `Op`.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let name = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp("op must be a string".into()))?;
    let path = decode_path(obj, "path")?;
    match name {
        "add" => Ok(Op::Add { path, value: decode_value(obj)? }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace { path, value: decode_value(obj)? }),
        "move" => Ok(Op::Move { path, from: decode_path(obj, "from")? }),
        "copy" => Ok(Op::Copy { path, from: decode_path(obj, "from")? }),
        "test" => Ok(Op::Test { path, value: decode_value(obj)? }),
        other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Decode a JSON array of wire objects.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    v.as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?
        .iter()
        .map(from_json)
        .collect()
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        from_json(&raw).map_err(serde::de::Error::custom)
    }
}
