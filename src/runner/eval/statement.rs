//! Statement execution.
//!
//! Every statement yields a [`Flow`]. Blocks and loops own the scope frames they push and
//! unwind them on every exit path, including faults.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::parser::ast::{Binding, NodeId, NodeKind, SyntaxTree};
use crate::runner::ds::error::{ErrorValue, ScriptError};
use crate::runner::ds::value::Value;

use super::context::EvalContext;
use super::expression::{evaluate_expression, store, Target};
use super::function::hoist_functions;
use super::types::{Completion, EvalResult, Flow, LoopState, ValueResult};

/// Run a whole script. The result is the value of the last expression statement.
pub fn execute_script(tree: &Rc<SyntaxTree>, ctx: &mut EvalContext) -> ValueResult {
    let root = tree
        .root()
        .ok_or_else(|| ScriptError::structural("script has no root block", 0))?;
    match execute_statement(tree, root, ctx)? {
        Flow::Normal(value) => Ok(value),
        Flow::Break(_) | Flow::Continue(_) | Flow::Return(..) => Err(ScriptError::structural(
            "control flow escaped the script",
            tree.node(root).line,
        )),
    }
}

/// Execute a statement and return its flow.
pub fn execute_statement(tree: &Rc<SyntaxTree>, id: NodeId, ctx: &mut EvalContext) -> EvalResult {
    let line = tree.node(id).line;
    dispatch(tree, id, ctx).map_err(|e| e.at_line(line).in_source(tree.source_name()))
}

fn dispatch(tree: &Rc<SyntaxTree>, id: NodeId, ctx: &mut EvalContext) -> EvalResult {
    match &tree.node(id).kind {
        NodeKind::Empty | NodeKind::Function(_) => Ok(Flow::normal()),

        NodeKind::Block {
            body,
            functions,
            scoped,
        } => execute_block(tree, body, functions, *scoped, ctx),

        NodeKind::ExpressionStatement(expression) => {
            evaluate_expression(tree, *expression, ctx).map(Flow::Normal)
        }

        NodeKind::Declaration(bindings) => execute_declaration(tree, bindings, ctx),

        NodeKind::If {
            test,
            consequent,
            alternate,
        } => {
            if evaluate_expression(tree, *test, ctx)?.is_truthy() {
                execute_statement(tree, *consequent, ctx)
            } else if let Some(alternate) = alternate {
                execute_statement(tree, *alternate, ctx)
            } else {
                Ok(Flow::normal())
            }
        }

        NodeKind::While { test, body } => execute_while(tree, id, *test, *body, ctx),

        NodeKind::For {
            init,
            test,
            update,
            body,
        } => {
            let depth = ctx.scopes.depth();
            ctx.scopes.push();
            let result = execute_for(tree, id, *init, *test, *update, *body, ctx);
            ctx.scopes.unwind_to(depth);
            result
        }

        NodeKind::ForEach {
            variable,
            iterable,
            body,
        } => execute_for_each(tree, id, variable, *iterable, *body, ctx),

        NodeKind::Break { target } => Ok(Flow::Break(*target)),

        NodeKind::Continue { target } => Ok(Flow::Continue(*target)),

        NodeKind::Return { value, function } => {
            let completion = match value {
                Some(value) => {
                    Completion::with_value(evaluate_expression(tree, *value, ctx)?)
                }
                None => Completion::empty(),
            };
            Ok(Flow::Return(*function, completion))
        }

        NodeKind::Try {
            body,
            catch_var,
            handler,
        } => execute_try(tree, *body, catch_var, *handler, ctx),

        NodeKind::Throw(expression) => {
            let value = evaluate_expression(tree, *expression, ctx)?;
            Err(thrown(value))
        }

        _ => evaluate_expression(tree, id, ctx).map(Flow::Normal),
    }
}

fn execute_block(
    tree: &Rc<SyntaxTree>,
    body: &[NodeId],
    functions: &[NodeId],
    scoped: bool,
    ctx: &mut EvalContext,
) -> EvalResult {
    let depth = ctx.scopes.depth();
    if scoped {
        ctx.scopes.push();
    }
    let result = execute_statements(tree, body, functions, ctx);
    ctx.scopes.unwind_to(depth);
    result
}

/// Hoist the block's function declarations, then run its statements in order until one
/// completes abruptly.
pub fn execute_statements(
    tree: &Rc<SyntaxTree>,
    body: &[NodeId],
    functions: &[NodeId],
    ctx: &mut EvalContext,
) -> EvalResult {
    hoist_functions(tree, functions, ctx);
    let mut last = Value::Null;
    for statement in body {
        match execute_statement(tree, *statement, ctx)? {
            Flow::Normal(value) => last = value,
            flow => return Ok(flow),
        }
    }
    Ok(Flow::Normal(last))
}

fn execute_declaration(
    tree: &Rc<SyntaxTree>,
    bindings: &[Binding],
    ctx: &mut EvalContext,
) -> EvalResult {
    for binding in bindings {
        let value = match binding.init {
            Some(init) => evaluate_expression(tree, init, ctx)?,
            None => Value::Null,
        };
        store(ctx, &Target::Variable(binding.name.clone()), value, true)
            .map_err(|e| e.at_line(binding.line))?;
    }
    Ok(Flow::normal())
}

fn execute_while(
    tree: &Rc<SyntaxTree>,
    id: NodeId,
    test: NodeId,
    body: NodeId,
    ctx: &mut EvalContext,
) -> EvalResult {
    let line = tree.node(id).line;
    let mut state = LoopState::new();
    while state.keep_running && evaluate_expression(tree, test, ctx)?.is_truthy() {
        ctx.governor.tick(line)?;
        state.begin_iteration();
        let flow = execute_statement(tree, body, ctx)?;
        if let Some(escaping) = state.observe(id, flow) {
            return Ok(escaping);
        }
    }
    Ok(Flow::normal())
}

fn execute_for(
    tree: &Rc<SyntaxTree>,
    id: NodeId,
    init: Option<NodeId>,
    test: Option<NodeId>,
    update: Option<NodeId>,
    body: NodeId,
    ctx: &mut EvalContext,
) -> EvalResult {
    let line = tree.node(id).line;
    if let Some(init) = init {
        execute_statement(tree, init, ctx)?;
    }
    let mut state = LoopState::new();
    while state.keep_running {
        if let Some(test) = test {
            if !evaluate_expression(tree, test, ctx)?.is_truthy() {
                break;
            }
        }
        ctx.governor.tick(line)?;
        state.begin_iteration();
        let flow = execute_statement(tree, body, ctx)?;
        if let Some(escaping) = state.observe(id, flow) {
            return Ok(escaping);
        }
        if state.break_requested {
            break;
        }
        if let Some(update) = update {
            evaluate_expression(tree, update, ctx)?;
        }
    }
    Ok(Flow::normal())
}

fn execute_for_each(
    tree: &Rc<SyntaxTree>,
    id: NodeId,
    variable: &str,
    iterable: NodeId,
    body: NodeId,
    ctx: &mut EvalContext,
) -> EvalResult {
    let line = tree.node(id).line;
    let items = iteration_items(evaluate_expression(tree, iterable, ctx)?)?;
    let mut state = LoopState::new();
    for item in items {
        if !state.keep_running {
            break;
        }
        ctx.governor.tick(line)?;
        state.begin_iteration();
        let depth = ctx.scopes.depth();
        ctx.scopes.push();
        ctx.declare(variable, item);
        let flow = execute_statement(tree, body, ctx);
        ctx.scopes.unwind_to(depth);
        if let Some(escaping) = state.observe(id, flow?) {
            return Ok(escaping);
        }
    }
    Ok(Flow::normal())
}

/// Snapshot of what a for-each walks: array elements, map keys or string characters.
fn iteration_items(value: Value) -> Result<Vec<Value>, ScriptError> {
    match value {
        Value::Array(items) => Ok(items.borrow().clone()),
        Value::Map(entries) => Ok(entries.borrow().keys().map(|k| Value::str(k.as_str())).collect()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        other => Err(ScriptError::type_error(format!(
            "cannot iterate over a {}",
            other.type_name()
        ))),
    }
}

fn execute_try(
    tree: &Rc<SyntaxTree>,
    body: NodeId,
    catch_var: &str,
    handler: NodeId,
    ctx: &mut EvalContext,
) -> EvalResult {
    let depth = ctx.scopes.depth();
    ctx.scopes.push();
    let result = execute_statement(tree, body, ctx);
    ctx.scopes.unwind_to(depth);

    let error = match result {
        Err(error) if error.is_recoverable() => error,
        Err(error) => {
            trace!(kind = %error.kind, "fault bypasses catch");
            return Err(error);
        }
        flow => return flow,
    };

    debug!(name = %error.name, line = error.line, "caught script fault");
    ctx.scopes.unwind_to(depth);
    ctx.scopes.push();
    ctx.declare(catch_var, Value::Error(Rc::new(ErrorValue::from(&error))));
    let outcome = execute_statement(tree, handler, ctx);
    ctx.scopes.unwind_to(depth);
    outcome
}

/// Turn a thrown value into a recoverable fault.
fn thrown(value: Value) -> ScriptError {
    match value {
        Value::Error(error) => error.to_error(),
        Value::Str(message) => ScriptError::runtime("Error", message),
        other => ScriptError::runtime("Error", other.to_string()),
    }
}
