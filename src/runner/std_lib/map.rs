//! Map members. Keys are strings and iterate in sorted order.

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::{MapRef, Value};
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

use super::{arg, string_arg, MemberTable};

pub fn members() -> MemberTable {
    MemberTable::new("map")
        .add_property("size", map_size)
        .add_method("keys", map_keys)
        .add_method("values", map_values)
        .add_method("has", map_has)
        .add_method("remove", map_remove)
        .add_method("get", map_get)
}

fn entries(receiver: &Value) -> Result<&MapRef, ScriptError> {
    match receiver {
        Value::Map(entries) => Ok(entries),
        other => Err(ScriptError::type_error(format!(
            "expected a map, got {}",
            other.type_name()
        ))),
    }
}

fn map_size(receiver: &Value) -> ValueResult {
    Ok(Value::Number(entries(receiver)?.borrow().len() as f64))
}

fn map_keys(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    let keys = entries(receiver)?
        .borrow()
        .keys()
        .map(|k| Value::str(k.as_str()))
        .collect();
    Ok(Value::array(keys))
}

fn map_values(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    let values = entries(receiver)?.borrow().values().cloned().collect();
    Ok(Value::array(values))
}

fn map_has(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let key = string_arg(&args, 0, "has")?;
    Ok(Value::Bool(entries(receiver)?.borrow().contains_key(&key)))
}

/// Returns the removed value, `null` if the key was absent.
fn map_remove(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let key = string_arg(&args, 0, "remove")?;
    Ok(entries(receiver)?
        .borrow_mut()
        .remove(&key)
        .unwrap_or(Value::Null))
}

/// `get(key[, default])`
fn map_get(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let key = string_arg(&args, 0, "get")?;
    let found = entries(receiver)?.borrow().get(&key).cloned();
    Ok(found.unwrap_or_else(|| arg(&args, 1)))
}
