//! Tree-walking evaluator.
//!
//! Statements produce a [`Flow`](types::Flow); expressions produce a value. Both fail with
//! a [`ScriptError`](crate::runner::ds::error::ScriptError) whose kind decides whether a
//! `try/catch` may intercept it.

pub mod context;
pub mod expression;
pub mod function;
pub mod statement;
pub mod types;

pub use context::EvalContext;
pub use types::{Completion, EvalResult, Flow, LoopState, ValueResult};
