//! Array members.

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::{ArrayRef, Value};
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

use super::{arg, MemberTable};

pub fn members() -> MemberTable {
    MemberTable::new("array")
        .add_property("length", array_length)
        .add_method("push", array_push)
        .add_method("pop", array_pop)
        .add_method("contains", array_contains)
        .add_method("indexOf", array_index_of)
        .add_method("join", array_join)
        .add_method("first", array_first)
        .add_method("last", array_last)
}

fn items(receiver: &Value) -> Result<&ArrayRef, ScriptError> {
    match receiver {
        Value::Array(items) => Ok(items),
        other => Err(ScriptError::type_error(format!(
            "expected an array, got {}",
            other.type_name()
        ))),
    }
}

fn array_length(receiver: &Value) -> ValueResult {
    Ok(Value::Number(items(receiver)?.borrow().len() as f64))
}

/// Appends every argument; returns the new length.
fn array_push(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let items = items(receiver)?;
    let mut items = items.borrow_mut();
    items.extend(args);
    Ok(Value::Number(items.len() as f64))
}

fn array_pop(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    Ok(items(receiver)?.borrow_mut().pop().unwrap_or(Value::Null))
}

fn array_contains(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let needle = arg(&args, 0);
    Ok(Value::Bool(items(receiver)?.borrow().contains(&needle)))
}

fn array_index_of(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let needle = arg(&args, 0);
    let position = items(receiver)?.borrow().iter().position(|v| *v == needle);
    Ok(Value::Number(position.map(|p| p as f64).unwrap_or(-1.0)))
}

fn array_join(ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let separator = match arg(&args, 0) {
        Value::Null => ",".to_string(),
        other => other.to_string(),
    };
    let joined = items(receiver)?
        .borrow()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(&separator);
    ctx.governor.check_string(joined.len())?;
    Ok(Value::Str(joined))
}

fn array_first(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    Ok(items(receiver)?.borrow().first().cloned().unwrap_or(Value::Null))
}

fn array_last(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    Ok(items(receiver)?.borrow().last().cloned().unwrap_or(Value::Null))
}
