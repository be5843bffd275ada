//! Expression evaluation.

use std::rc::Rc;

use chrono::Duration;

use crate::parser::ast::{BinaryOperator, Literal, NodeId, NodeKind, SyntaxTree, UnaryOperator};
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::{Callable, Value};
use crate::runner::std_lib;

use super::context::EvalContext;
use super::function::{call_value, resolve_arguments};
use super::types::ValueResult;

/// Evaluate an expression node to a value.
pub fn evaluate_expression(tree: &Rc<SyntaxTree>, id: NodeId, ctx: &mut EvalContext) -> ValueResult {
    let node = tree.node(id);
    match &node.kind {
        NodeKind::Literal(literal) => Ok(literal_value(literal)),

        NodeKind::Identifier(name) => ctx.get_binding(name),

        NodeKind::Array(items) => Ok(Value::array(resolve_arguments(tree, items, ctx)?)),

        NodeKind::Map(entries) => {
            let mut values = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                values.push((key.clone(), evaluate_expression(tree, *value, ctx)?));
            }
            Ok(Value::map(values))
        }

        NodeKind::Unary { operator, operand } => {
            let value = evaluate_expression(tree, *operand, ctx)?;
            match operator {
                UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
                UnaryOperator::Negate => match value {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    other => Err(ScriptError::type_error(format!(
                        "cannot negate a {}",
                        other.type_name()
                    ))),
                },
            }
        }

        NodeKind::Binary {
            operator: BinaryOperator::And,
            left,
            right,
        } => {
            if !evaluate_expression(tree, *left, ctx)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate_expression(tree, *right, ctx)?.is_truthy()))
        }

        NodeKind::Binary {
            operator: BinaryOperator::Or,
            left,
            right,
        } => {
            if evaluate_expression(tree, *left, ctx)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate_expression(tree, *right, ctx)?.is_truthy()))
        }

        NodeKind::Binary {
            operator,
            left,
            right,
        } => {
            let left = evaluate_expression(tree, *left, ctx)?;
            let right = evaluate_expression(tree, *right, ctx)?;
            apply_binary(ctx, *operator, left, right)
        }

        NodeKind::Member {
            object,
            name,
            optional,
        } => {
            let object = evaluate_expression(tree, *object, ctx)?;
            if *optional && object.is_null() {
                return Ok(Value::Null);
            }
            std_lib::get_member(&object, name)
        }

        NodeKind::Index { object, index } => {
            let object = evaluate_expression(tree, *object, ctx)?;
            let index = evaluate_expression(tree, *index, ctx)?;
            read_element(&object, &index)
        }

        NodeKind::Call { callee, args } => evaluate_call(tree, *callee, args, node.line, ctx),

        NodeKind::Assign {
            target,
            operator,
            value,
        } => {
            let target = resolve_target(tree, *target, ctx)?;
            let rhs = evaluate_expression(tree, *value, ctx)?;
            let value = match operator.binary() {
                Some(op) => {
                    let current = read_target(ctx, &target)?;
                    apply_binary(ctx, op, current, rhs)?
                }
                None => rhs,
            };
            store(ctx, &target, value.clone(), false)?;
            Ok(value)
        }

        NodeKind::FunctionLiteral(def) => Ok(Value::Function(Rc::new(Callable::new(
            def.clone(),
            tree.clone(),
        )))),

        NodeKind::Custom(custom) => custom.op.evaluate(tree, &custom.children, ctx),

        other => Err(ScriptError::runtime(
            "InternalError",
            format!("{:?} cannot be evaluated as an expression", other),
        )),
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Date(d) => Value::Date(*d),
    }
}

fn evaluate_call(
    tree: &Rc<SyntaxTree>,
    callee: NodeId,
    args: &[NodeId],
    line: usize,
    ctx: &mut EvalContext,
) -> ValueResult {
    if let NodeKind::Member {
        object,
        name,
        optional,
    } = &tree.node(callee).kind
    {
        let receiver = evaluate_expression(tree, *object, ctx)?;
        if *optional && receiver.is_null() {
            return Ok(Value::Null);
        }
        let args = resolve_arguments(tree, args, ctx)?;
        // A function stored under a map key takes priority over the map's own methods.
        if let Value::Map(entries) = &receiver {
            let stored = entries.borrow().get(name.as_str()).cloned();
            if let Some(function @ (Value::Function(_) | Value::Native(_))) = stored {
                return call_value(ctx, &function, args, line);
            }
        }
        return std_lib::call_member(ctx, &receiver, name, args);
    }
    let function = evaluate_expression(tree, callee, ctx)?;
    let args = resolve_arguments(tree, args, ctx)?;
    call_value(ctx, &function, args, line)
}

/// Apply a non-short-circuit binary operator.
pub fn apply_binary(
    ctx: &EvalContext,
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> ValueResult {
    use BinaryOperator::*;
    match (operator, &left, &right) {
        (Eq, _, _) => Ok(Value::Bool(left == right)),
        (NotEq, _, _) => Ok(Value::Bool(left != right)),
        (And, _, _) => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        (Or, _, _) => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),

        (Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Add, Value::Date(d), Value::Number(n)) | (Add, Value::Number(n), Value::Date(d)) => {
            shift_date(*d, *n)
        }
        (Add, Value::Str(_), _) | (Add, _, Value::Str(_)) => {
            let joined = format!("{}{}", left, right);
            ctx.governor.check_string(joined.len())?;
            Ok(Value::Str(joined))
        }

        (Sub, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (Sub, Value::Date(d), Value::Number(n)) => shift_date(*d, -n),
        (Sub, Value::Date(a), Value::Date(b)) => {
            Ok(Value::Number(a.signed_duration_since(*b).num_days() as f64))
        }

        (Mul, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (Div, Value::Number(_), Value::Number(b)) | (Rem, Value::Number(_), Value::Number(b))
            if *b == 0.0 =>
        {
            Err(ScriptError::range_error("division by zero"))
        }
        (Div, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        (Rem, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a % b)),

        (Lt | LtEq | Gt | GtEq, _, _) => compare(operator, &left, &right),

        _ => Err(ScriptError::type_error(format!(
            "operator '{}' is not defined for {} and {}",
            operator.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn compare(operator: BinaryOperator, left: &Value, right: &Value) -> ValueResult {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        _ => {
            return Err(ScriptError::type_error(format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            )))
        }
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    Ok(Value::Bool(match operator {
        BinaryOperator::Lt => ordering.is_lt(),
        BinaryOperator::LtEq => ordering.is_le(),
        BinaryOperator::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    }))
}

fn shift_date(date: chrono::NaiveDate, days: f64) -> ValueResult {
    if days.fract() != 0.0 {
        return Err(ScriptError::type_error("dates shift by whole days only"));
    }
    if days.abs() > 3_650_000.0 {
        return Err(ScriptError::range_error("date out of range"));
    }
    date.checked_add_signed(Duration::days(days as i64))
        .map(Value::Date)
        .ok_or_else(|| ScriptError::range_error("date out of range"))
}

/// Resolved left-hand side of an assignment or declaration.
pub enum Target {
    Variable(String),
    /// `object.name`
    Member(Value, String),
    /// `object[index]`
    Element(Value, Value),
}

/// Evaluate the sub-expressions of an assignment target, left to right.
fn resolve_target(tree: &Rc<SyntaxTree>, id: NodeId, ctx: &mut EvalContext) -> Result<Target, ScriptError> {
    let node = tree.node(id);
    if !node.assignable {
        return Err(ScriptError::type_error("invalid assignment target"));
    }
    match &node.kind {
        NodeKind::Identifier(name) => Ok(Target::Variable(name.clone())),
        NodeKind::Member { object, name, .. } => Ok(Target::Member(
            evaluate_expression(tree, *object, ctx)?,
            name.clone(),
        )),
        NodeKind::Index { object, index } => {
            let object = evaluate_expression(tree, *object, ctx)?;
            let index = evaluate_expression(tree, *index, ctx)?;
            Ok(Target::Element(object, index))
        }
        _ => Err(ScriptError::type_error("invalid assignment target")),
    }
}

fn read_target(ctx: &EvalContext, target: &Target) -> ValueResult {
    match target {
        Target::Variable(name) => ctx.get_binding(name),
        Target::Member(object, name) => std_lib::get_member(object, name),
        Target::Element(object, index) => read_element(object, index),
    }
}

/// Write `value` through a resolved target. `is_declaration` binds a fresh variable in the
/// innermost frame instead of updating the nearest one.
pub fn store(
    ctx: &mut EvalContext,
    target: &Target,
    value: Value,
    is_declaration: bool,
) -> Result<(), ScriptError> {
    match target {
        Target::Variable(name) => {
            ctx.scopes.set_value(name, value, is_declaration);
            Ok(())
        }
        Target::Member(Value::Map(entries), name) => {
            entries.borrow_mut().insert(name.clone(), value);
            Ok(())
        }
        Target::Member(other, name) => Err(ScriptError::type_error(format!(
            "cannot set property '{}' on a {}",
            name,
            other.type_name()
        ))),
        Target::Element(Value::Map(entries), Value::Str(key)) => {
            entries.borrow_mut().insert(key.clone(), value);
            Ok(())
        }
        Target::Element(Value::Array(items), index) => {
            let mut items = items.borrow_mut();
            let at = array_index(index, items.len() + 1)?;
            if at == items.len() {
                items.push(value);
            } else {
                items[at] = value;
            }
            Ok(())
        }
        Target::Element(other, index) => Err(ScriptError::type_error(format!(
            "cannot index a {} with a {}",
            other.type_name(),
            index.type_name()
        ))),
    }
}

fn read_element(object: &Value, index: &Value) -> ValueResult {
    match (object, index) {
        (Value::Array(items), _) => {
            let items = items.borrow();
            let at = array_index(index, items.len())?;
            Ok(items[at].clone())
        }
        (Value::Map(entries), Value::Str(key)) => {
            Ok(entries.borrow().get(key).cloned().unwrap_or(Value::Null))
        }
        (Value::Str(s), Value::Number(_)) => {
            let chars: Vec<char> = s.chars().collect();
            let at = array_index(index, chars.len())?;
            Ok(Value::Str(chars[at].to_string()))
        }
        _ => Err(ScriptError::type_error(format!(
            "cannot index a {} with a {}",
            object.type_name(),
            index.type_name()
        ))),
    }
}

/// A whole, non-negative number below `len`.
fn array_index(index: &Value, len: usize) -> Result<usize, ScriptError> {
    match index {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && (*n as usize) < len => Ok(*n as usize),
        Value::Number(n) => Err(ScriptError::range_error(format!(
            "index {} out of range",
            n
        ))),
        other => Err(ScriptError::type_error(format!(
            "index must be a number, not a {}",
            other.type_name()
        ))),
    }
}
