//! Shared helpers for the integration tests.

#![allow(dead_code)]

use weft::runner::api::Engine;
use weft::runner::config::EngineConfig;
use weft::runner::ds::error::ScriptError;
use weft::runner::ds::governor::GovernorLimits;
use weft::runner::ds::value::Value;
use weft::runner::eval::context::EvalContext;

pub fn engine() -> Engine {
    Engine::new(EngineConfig::default()).expect("default grammar registers")
}

pub fn engine_with_limits(governor: GovernorLimits) -> Engine {
    Engine::new(EngineConfig {
        governor,
        ..EngineConfig::default()
    })
    .expect("default grammar registers")
}

/// Run `code` and return the value of its last expression statement.
pub fn run(code: &str) -> Result<Value, ScriptError> {
    engine().execute(code)
}

/// Run `code`, then read a global.
pub fn run_get_var(code: &str, name: &str) -> Value {
    let (ctx, result) = run_in_context(code);
    if let Err(e) = result {
        panic!("script failed: {} (line {})", e, e.line);
    }
    ctx.get_binding(name)
        .unwrap_or_else(|e| panic!("{} not bound: {}", name, e))
}

/// Run `code` and return everything it printed.
pub fn run_output(code: &str) -> Vec<String> {
    let (mut ctx, result) = run_in_context(code);
    if let Err(e) = result {
        panic!("script failed: {} (line {})", e, e.line);
    }
    ctx.take_output()
}

pub fn run_in_context(code: &str) -> (EvalContext, Result<Value, ScriptError>) {
    let engine = engine();
    let mut ctx = engine.new_context();
    let result = engine.execute_in(&mut ctx, code);
    (ctx, result)
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}
