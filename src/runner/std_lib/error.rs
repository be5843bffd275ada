//! Members of the structured error value a catch block receives.

use std::rc::Rc;

use crate::runner::ds::error::{ErrorValue, ScriptError};
use crate::runner::ds::value::Value;
use crate::runner::eval::types::ValueResult;

use super::MemberTable;

pub fn members() -> MemberTable {
    MemberTable::new("error")
        .add_property("name", error_name)
        .add_property("message", error_message)
        .add_property("file", error_file)
        .add_property("line", error_line)
        .add_property("trace", error_trace)
}

fn error(receiver: &Value) -> Result<&Rc<ErrorValue>, ScriptError> {
    match receiver {
        Value::Error(e) => Ok(e),
        other => Err(ScriptError::type_error(format!(
            "expected an error, got {}",
            other.type_name()
        ))),
    }
}

fn error_name(receiver: &Value) -> ValueResult {
    Ok(Value::str(error(receiver)?.name.as_str()))
}

fn error_message(receiver: &Value) -> ValueResult {
    Ok(Value::str(error(receiver)?.message.as_str()))
}

fn error_file(receiver: &Value) -> ValueResult {
    Ok(Value::str(error(receiver)?.source_name.as_str()))
}

fn error_line(receiver: &Value) -> ValueResult {
    Ok(Value::Number(error(receiver)?.line as f64))
}

fn error_trace(receiver: &Value) -> ValueResult {
    let frames = error(receiver)?
        .trace
        .iter()
        .map(|f| Value::str(f.as_str()))
        .collect();
    Ok(Value::array(frames))
}
