use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::parser::ast::{FunctionDef, SyntaxTree};
use crate::runner::ds::error::ErrorValue;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

/// Signature of host functions installed in the global frame.
pub type NativeFn = fn(ctx: &mut EvalContext, args: Vec<Value>) -> ValueResult;

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

/// A script function value. The tree is shared so the callable outlives the parse that
/// produced it.
pub struct Callable {
    pub id: Uuid,
    pub def: Rc<FunctionDef>,
    pub tree: Rc<SyntaxTree>,
    /// Functions hoisted into the same non-global block, `None` for global declarations and
    /// literals. Weak, since each sibling holds the others.
    siblings: RefCell<Option<Vec<Weak<Callable>>>>,
}

impl Callable {
    pub fn new(def: Rc<FunctionDef>, tree: Rc<SyntaxTree>) -> Self {
        Callable {
            id: Uuid::new_v4(),
            def,
            tree,
            siblings: RefCell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.def.display_name()
    }

    pub fn set_siblings(&self, siblings: Vec<Weak<Callable>>) {
        *self.siblings.borrow_mut() = Some(siblings);
    }

    /// Whether this function was declared inside a block or another function.
    pub fn is_nested(&self) -> bool {
        self.siblings.borrow().is_some()
    }

    /// Siblings still alive.
    pub fn siblings(&self) -> Vec<Rc<Callable>> {
        self.siblings
            .borrow()
            .iter()
            .flatten()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type MapRef = Rc<RefCell<BTreeMap<String, Value>>>;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Date(NaiveDate),
    Array(ArrayRef),
    Map(MapRef),
    Function(Rc<Callable>),
    Native(NativeFunction),
    Error(Rc<ErrorValue>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn map(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Error(_) => "error",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", k)?;
                    v.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
            Value::Function(c) => write!(f, "<function {}>", c.name()),
            Value::Native(n) => write!(f, "<native {}>", n.name),
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Number(n) => write!(f, "Value::Number({})", n),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::Date(d) => write!(f, "Value::Date({})", d),
            Value::Array(_) | Value::Map(_) => write!(f, "Value::{}({})", self.type_name(), self),
            Value::Function(c) => write!(f, "Value::Function({})", c.name()),
            Value::Native(n) => write!(f, "Value::Native({})", n.name),
            Value::Error(e) => write!(f, "Value::Error({})", e),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Function(a), Value::Function(b)) => a.id == b.id,
            (Value::Native(a), Value::Native(b)) => a.name == b.name,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}
