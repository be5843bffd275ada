//! Built-in members and natives.
//!
//! Each value kind exposes a fixed [`MemberTable`] built once on first use. Member access
//! and member calls resolve through the table of the receiver's kind.

pub mod array;
pub mod core;
pub mod date;
pub mod error;
pub mod map;
pub mod string;

use std::collections::HashMap;

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::Value;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

pub use self::core::install_core_natives;

/// Method signature: receiver first, then the call arguments.
pub type MethodFn = fn(ctx: &mut EvalContext, receiver: &Value, args: Vec<Value>) -> ValueResult;

/// Property signature.
pub type PropertyFn = fn(receiver: &Value) -> ValueResult;

#[derive(Clone, Copy)]
pub enum Member {
    Property(PropertyFn),
    Method(MethodFn),
}

/// Members of one value kind.
pub struct MemberTable {
    kind: &'static str,
    members: HashMap<&'static str, Member>,
}

impl MemberTable {
    pub fn new(kind: &'static str) -> Self {
        MemberTable {
            kind,
            members: HashMap::new(),
        }
    }

    pub fn add_method(mut self, name: &'static str, func: MethodFn) -> Self {
        self.members.insert(name, Member::Method(func));
        self
    }

    pub fn add_property(mut self, name: &'static str, func: PropertyFn) -> Self {
        self.members.insert(name, Member::Property(func));
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<Member> {
        self.members.get(name).copied()
    }

    /// Member names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.members.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

lazy_static! {
    static ref ARRAY_MEMBERS: MemberTable = array::members();
    static ref STRING_MEMBERS: MemberTable = string::members();
    static ref MAP_MEMBERS: MemberTable = map::members();
    static ref DATE_MEMBERS: MemberTable = date::members();
    static ref ERROR_MEMBERS: MemberTable = error::members();
}

/// The member table for a value's kind, if the kind has members.
pub fn members_of(value: &Value) -> Option<&'static MemberTable> {
    match value {
        Value::Array(_) => Some(&*ARRAY_MEMBERS),
        Value::Str(_) => Some(&*STRING_MEMBERS),
        Value::Map(_) => Some(&*MAP_MEMBERS),
        Value::Date(_) => Some(&*DATE_MEMBERS),
        Value::Error(_) => Some(&*ERROR_MEMBERS),
        _ => None,
    }
}

fn no_member(value: &Value, name: &str) -> ScriptError {
    ScriptError::type_error(format!("{} has no member '{}'", value.type_name(), name))
}

/// `value.name`. Map keys shadow the map's own members; a missing key reads as `null`.
pub fn get_member(value: &Value, name: &str) -> ValueResult {
    if let Value::Map(entries) = value {
        if let Some(found) = entries.borrow().get(name) {
            return Ok(found.clone());
        }
    }
    match members_of(value).and_then(|table| table.get(name)) {
        Some(Member::Property(property)) => property(value),
        Some(Member::Method(_)) => Err(ScriptError::type_error(format!(
            "{}.{} is a method and must be called",
            value.type_name(),
            name
        ))),
        None if matches!(value, Value::Map(_)) => Ok(Value::Null),
        None => Err(no_member(value, name)),
    }
}

/// `value.name(args)`.
pub fn call_member(
    ctx: &mut EvalContext,
    value: &Value,
    name: &str,
    args: Vec<Value>,
) -> ValueResult {
    match members_of(value).and_then(|table| table.get(name)) {
        Some(Member::Method(method)) => method(ctx, value, args),
        Some(Member::Property(_)) => Err(ScriptError::type_error(format!(
            "{}.{} is not a method",
            value.type_name(),
            name
        ))),
        None => Err(no_member(value, name)),
    }
}

pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Null)
}

pub(crate) fn number_arg(args: &[Value], index: usize, what: &str) -> Result<f64, ScriptError> {
    match arg(args, index) {
        Value::Number(n) => Ok(n),
        other => Err(ScriptError::type_error(format!(
            "{} expects a number, got {}",
            what,
            other.type_name()
        ))),
    }
}

pub(crate) fn string_arg(args: &[Value], index: usize, what: &str) -> Result<String, ScriptError> {
    match arg(args, index) {
        Value::Str(s) => Ok(s),
        other => Err(ScriptError::type_error(format!(
            "{} expects a string, got {}",
            what,
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_built_per_kind() {
        let array = members_of(&Value::array(vec![])).unwrap();
        assert_eq!(array.kind(), "array");
        assert!(array.names().contains(&"push"));
        assert!(members_of(&Value::Number(1.0)).is_none());
    }

    #[test]
    fn test_map_key_shadows_member() {
        let map = Value::map(vec![("size".to_string(), Value::str("large"))]);
        assert_eq!(get_member(&map, "size").unwrap(), Value::str("large"));
        assert_eq!(get_member(&map, "missing").unwrap(), Value::Null);
    }

    #[test]
    fn test_unknown_member_is_type_error() {
        let err = get_member(&Value::str("abc"), "nope").unwrap_err();
        assert_eq!(err.name, "TypeError");
        assert!(err.is_recoverable());
    }
}
