//! Function activation.

use std::rc::Rc;

use tracing::trace;

use crate::parser::ast::{NodeId, NodeKind, SyntaxTree};
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::{Callable, Value};

use super::context::EvalContext;
use super::expression::evaluate_expression;
use super::statement::execute_statement;
use super::types::{Completion, Flow, ValueResult};

/// Evaluate call arguments left to right.
pub fn resolve_arguments(
    tree: &Rc<SyntaxTree>,
    args: &[NodeId],
    ctx: &mut EvalContext,
) -> Result<Vec<Value>, ScriptError> {
    args.iter()
        .map(|arg| evaluate_expression(tree, *arg, ctx))
        .collect()
}

/// Define every declared function of a block, under all of its names, before the block's
/// first statement runs. Outside the global frame each function also remembers its
/// siblings, so activations can reach them past the call boundary.
pub fn hoist_functions(tree: &Rc<SyntaxTree>, functions: &[NodeId], ctx: &mut EvalContext) {
    let callables: Vec<Rc<Callable>> = functions
        .iter()
        .filter_map(|id| match &tree.node(*id).kind {
            NodeKind::Function(def) => Some(Rc::new(Callable::new(def.clone(), tree.clone()))),
            _ => None,
        })
        .collect();
    if ctx.scopes.depth() > 1 {
        for callable in &callables {
            let siblings = callables
                .iter()
                .filter(|other| !Rc::ptr_eq(other, callable))
                .map(Rc::downgrade)
                .collect();
            callable.set_siblings(siblings);
        }
    }
    for callable in callables {
        let value = Value::Function(callable.clone());
        for name in &callable.def.names {
            ctx.declare(name, value.clone());
        }
    }
}

/// Bind a nested `callable` under its own names and its block siblings under theirs.
fn bind_declaring_block(ctx: &mut EvalContext, callable: &Rc<Callable>) {
    if !callable.is_nested() {
        return;
    }
    for sibling in callable.siblings() {
        let value = Value::Function(sibling.clone());
        for name in &sibling.def.names {
            ctx.declare(name, value.clone());
        }
    }
    let own = Value::Function(callable.clone());
    for name in &callable.def.names {
        ctx.declare(name, own.clone());
    }
}

/// Call any callable value. Script functions yield their completion value, `null` when
/// they complete without one.
pub fn call_value(ctx: &mut EvalContext, function: &Value, args: Vec<Value>, line: usize) -> ValueResult {
    match function {
        Value::Function(callable) => Ok(call_function(ctx, callable, args, line)?.value),
        Value::Native(native) => (native.func)(ctx, args),
        other => Err(ScriptError::type_error(format!(
            "{} is not a function",
            other.type_name()
        ))),
    }
}

/// Activate a script function: push a boundary frame, bind parameters, run the body and
/// hand back its completion. Missing arguments bind `null`; extra ones are ignored.
pub fn call_function(
    ctx: &mut EvalContext,
    callable: &Rc<Callable>,
    args: Vec<Value>,
    line: usize,
) -> Result<Completion, ScriptError> {
    let def = &callable.def;
    let tree = &callable.tree;
    trace!(function = callable.name(), depth = ctx.governor.call_depth(), "call");
    ctx.governor.enter_call(line)?;

    let depth = ctx.scopes.depth();
    ctx.scopes.push_boundary();
    bind_declaring_block(ctx, callable);
    let mut args = args.into_iter();
    for param in &def.params {
        ctx.declare(param, args.next().unwrap_or(Value::Null));
    }
    let result = execute_statement(tree, def.body, ctx);
    ctx.scopes.unwind_to(depth);
    ctx.governor.exit_call();

    let frame = format!("at {} ({}:{})", callable.name(), ctx.source_name(), line);
    match result.map_err(|e| e.with_frame(frame))? {
        Flow::Return(target, completion) if target == def.node => Ok(completion),
        Flow::Normal(_) => Ok(Completion::empty()),
        Flow::Break(_) | Flow::Continue(_) | Flow::Return(..) => Err(ScriptError::structural(
            format!("control flow escaped function {}", callable.name()),
            tree.node(def.node).line,
        )),
    }
}
