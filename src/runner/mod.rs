//! Runtime: the engine API, configuration, grammar plugins and the tree-walking evaluator.

pub mod api;
pub mod config;
pub mod ds;
pub mod eval;
pub mod plugin;
pub mod std_lib;
