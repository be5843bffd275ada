//! Native functions installed in the global frame.

use chrono::{Local, NaiveDate};

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::{NativeFn, NativeFunction, Value};
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

use super::{arg, number_arg};

const NATIVES: [(&str, NativeFn); 6] = [
    ("print", native_print),
    ("len", native_len),
    ("str", native_str),
    ("num", native_num),
    ("date", native_date),
    ("typeOf", native_type_of),
];

/// Bind every native into the global frame.
pub fn install_core_natives(ctx: &mut EvalContext) {
    for (name, func) in NATIVES {
        ctx.scopes
            .define_global(name, Value::Native(NativeFunction { name, func }));
    }
}

/// Names of the installed natives.
pub fn native_names() -> impl Iterator<Item = &'static str> {
    NATIVES.iter().map(|(name, _)| *name)
}

/// Writes its arguments separated by spaces.
fn native_print(ctx: &mut EvalContext, args: Vec<Value>) -> ValueResult {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    ctx.emit(line);
    Ok(Value::Null)
}

fn native_len(_ctx: &mut EvalContext, args: Vec<Value>) -> ValueResult {
    let len = match arg(&args, 0) {
        Value::Str(s) => s.chars().count(),
        Value::Array(items) => items.borrow().len(),
        Value::Map(entries) => entries.borrow().len(),
        other => {
            return Err(ScriptError::type_error(format!(
                "len() is not defined for {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::Number(len as f64))
}

fn native_str(_ctx: &mut EvalContext, args: Vec<Value>) -> ValueResult {
    Ok(Value::Str(arg(&args, 0).to_string()))
}

fn native_num(_ctx: &mut EvalContext, args: Vec<Value>) -> ValueResult {
    match arg(&args, 0) {
        Value::Number(n) => Ok(Value::Number(n)),
        Value::Bool(b) => Ok(Value::Number(if b { 1.0 } else { 0.0 })),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Number).map_err(|_| {
            ScriptError::runtime("ConversionError", format!("'{}' is not a number", s))
        }),
        other => Err(ScriptError::runtime(
            "ConversionError",
            format!("cannot convert {} to a number", other.type_name()),
        )),
    }
}

/// `date()` is today; `date("2024-01-31")` parses ISO text; `date(y, m, d)` builds one.
fn native_date(_ctx: &mut EvalContext, args: Vec<Value>) -> ValueResult {
    match args.len() {
        0 => Ok(Value::Date(Local::now().date_naive())),
        1 => match arg(&args, 0) {
            Value::Str(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| {
                    ScriptError::runtime("ConversionError", format!("'{}' is not a date: {}", s, e))
                }),
            Value::Date(d) => Ok(Value::Date(d)),
            other => Err(ScriptError::type_error(format!(
                "date() cannot convert {}",
                other.type_name()
            ))),
        },
        _ => {
            let year = number_arg(&args, 0, "date")?;
            let month = number_arg(&args, 1, "date")?;
            let day = number_arg(&args, 2, "date")?;
            NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                .map(Value::Date)
                .ok_or_else(|| {
                    ScriptError::range_error(format!("invalid date {}-{}-{}", year, month, day))
                })
        }
    }
}

fn native_type_of(_ctx: &mut EvalContext, args: Vec<Value>) -> ValueResult {
    Ok(Value::str(arg(&args, 0).type_name()))
}
