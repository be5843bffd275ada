//! String members. Positions count characters, not bytes.

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::Value;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

use super::{arg, number_arg, string_arg, MemberTable};

pub fn members() -> MemberTable {
    MemberTable::new("string")
        .add_property("length", string_length)
        .add_method("upper", string_upper)
        .add_method("lower", string_lower)
        .add_method("trim", string_trim)
        .add_method("contains", string_contains)
        .add_method("startsWith", string_starts_with)
        .add_method("endsWith", string_ends_with)
        .add_method("split", string_split)
        .add_method("replace", string_replace)
        .add_method("substring", string_substring)
}

fn text(receiver: &Value) -> Result<&str, ScriptError> {
    receiver.as_str().ok_or_else(|| {
        ScriptError::type_error(format!("expected a string, got {}", receiver.type_name()))
    })
}

fn string_length(receiver: &Value) -> ValueResult {
    Ok(Value::Number(text(receiver)?.chars().count() as f64))
}

fn string_upper(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    Ok(Value::Str(text(receiver)?.to_uppercase()))
}

fn string_lower(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    Ok(Value::Str(text(receiver)?.to_lowercase()))
}

fn string_trim(_ctx: &mut EvalContext, receiver: &Value, _args: Vec<Value>) -> ValueResult {
    Ok(Value::str(text(receiver)?.trim()))
}

fn string_contains(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let needle = string_arg(&args, 0, "contains")?;
    Ok(Value::Bool(text(receiver)?.contains(needle.as_str())))
}

fn string_starts_with(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let prefix = string_arg(&args, 0, "startsWith")?;
    Ok(Value::Bool(text(receiver)?.starts_with(prefix.as_str())))
}

fn string_ends_with(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let suffix = string_arg(&args, 0, "endsWith")?;
    Ok(Value::Bool(text(receiver)?.ends_with(suffix.as_str())))
}

/// Without a separator, splits into characters.
fn string_split(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let s = text(receiver)?;
    let parts = match arg(&args, 0) {
        Value::Null => s.chars().map(|c| Value::Str(c.to_string())).collect(),
        Value::Str(sep) if sep.is_empty() => s.chars().map(|c| Value::Str(c.to_string())).collect(),
        Value::Str(sep) => s.split(sep.as_str()).map(Value::str).collect(),
        other => {
            return Err(ScriptError::type_error(format!(
                "split expects a string, got {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::array(parts))
}

fn string_replace(ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let from = string_arg(&args, 0, "replace")?;
    let to = string_arg(&args, 1, "replace")?;
    let replaced = text(receiver)?.replace(from.as_str(), &to);
    ctx.governor.check_string(replaced.len())?;
    Ok(Value::Str(replaced))
}

/// `substring(start[, end])`, clamped to the string.
fn string_substring(_ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult {
    let chars: Vec<char> = text(receiver)?.chars().collect();
    let clamp = |n: f64| (n.max(0.0) as usize).min(chars.len());
    let start = clamp(number_arg(&args, 0, "substring")?);
    let end = match arg(&args, 1) {
        Value::Null => chars.len(),
        _ => clamp(number_arg(&args, 1, "substring")?),
    };
    if start >= end {
        return Ok(Value::str(""));
    }
    Ok(Value::Str(chars[start..end].iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_clamps() {
        let mut ctx = EvalContext::new();
        let s = Value::str("héllo");
        let sub = string_substring(&mut ctx, &s, vec![Value::Number(1.0), Value::Number(99.0)]);
        assert_eq!(sub.unwrap(), Value::str("éllo"));
        assert_eq!(string_length(&s).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn test_split() {
        let mut ctx = EvalContext::new();
        let parts = string_split(&mut ctx, &Value::str("a,b"), vec![Value::str(",")]).unwrap();
        assert_eq!(parts.to_string(), "[\"a\", \"b\"]");
    }
}
