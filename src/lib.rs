//! # weft - embeddable scripting with a plugin-composed grammar
//!
//! weft runs small procedural scripts inside a host application. The language itself is
//! not fixed: every construct, from string literals to `try/catch`, is a grammar plugin
//! registered against trigger tokens, and a host picks which extensions a session gets.
//!
//! - A [`PluginRegistry`](runner::plugin::PluginRegistry) routes each token to the
//!   highest-precedence plugin that accepts it.
//! - A tree-walking evaluator runs the parsed script over a stack of scope frames, with
//!   loops, first-class functions and structured error recovery.
//! - A governor bounds iterations, call depth and string growth so a runaway script fails
//!   with a fault no `catch` can swallow.
//!
//! ## Quick Start
//!
//! ```
//! use weft::runner::api::Engine;
//! use weft::runner::config::EngineConfig;
//! use weft::runner::ds::value::Value;
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! let value = engine
//!     .execute("function double(n) { return n * 2; } double(21);")
//!     .unwrap();
//! assert_eq!(value, Value::Number(42.0));
//! ```
//!
//! ### Choosing the grammar
//!
//! ```
//! use weft::runner::api::Engine;
//! use weft::runner::config::EngineConfig;
//! use weft::runner::plugin::GrammarProfile;
//!
//! let config = EngineConfig {
//!     grammar: GrammarProfile::core(),
//!     ..EngineConfig::default()
//! };
//! let engine = Engine::new(config).unwrap();
//! // `unless` is an extension, so the core grammar reads it as an identifier.
//! assert!(engine.execute("unless (false) { print(1); }").is_err());
//! ```
//!
//! ### Calling script functions from the host
//!
//! ```
//! use weft::runner::api::Engine;
//! use weft::runner::config::EngineConfig;
//! use weft::runner::ds::value::Value;
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! let mut ctx = engine.new_context();
//! engine
//!     .execute_in(&mut ctx, "function hours, hour(n) { return n * 60; }")
//!     .unwrap();
//! let minutes = engine.call(&mut ctx, "hour", vec![Value::Number(2.0)]).unwrap();
//! assert_eq!(minutes.value, Value::Number(120.0));
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - pest lexer, token stream, syntax tree and the plugin-driven parser
//! - **[`runner`]** - engine API and configuration
//!   - **[`runner::plugin`]** - plugin contracts, registry, system and extension grammar
//!   - **[`runner::ds`]** - values, faults, scope stack and governor
//!   - **[`runner::eval`]** - tree-walking evaluator
//!   - **[`runner::std_lib`]** - native functions and built-in members

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;

pub use runner::api::{Engine, Script, ScriptFailure, ScriptOutcome};
pub use runner::config::{ConfigError, EngineConfig};
pub use runner::ds::error::{ErrorKind, ScriptError};
pub use runner::ds::value::Value;
