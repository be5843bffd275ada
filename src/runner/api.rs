//! Embedding surface: compile and run scripts against one grammar session.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::parser::ast::SyntaxTree;
use crate::parser::Parser;
use crate::runner::config::{ConfigError, EngineConfig};
use crate::runner::ds::error::{ErrorKind, ScriptError};
use crate::runner::ds::value::Value;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::function::call_function;
use crate::runner::eval::statement::execute_script;
use crate::runner::eval::types::{Completion, ValueResult};
use crate::runner::plugin::registry::{PluginRegistry, RegistryError};

/// A parsed script. The tree is shared with every function value it creates, so a script
/// can be run many times and its functions outlive the run.
#[derive(Debug, Clone)]
pub struct Script {
    tree: Rc<SyntaxTree>,
}

impl Script {
    pub fn tree(&self) -> &Rc<SyntaxTree> {
        &self.tree
    }

    pub fn source_name(&self) -> &str {
        self.tree.source_name()
    }
}

/// What the host sees when a run fails: no native call stack, just enough to display.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptFailure {
    pub kind: ErrorKind,
    pub name: String,
    pub message: String,
    pub line: usize,
    pub source_name: String,
    pub trace: Vec<String>,
}

impl From<ScriptError> for ScriptFailure {
    fn from(e: ScriptError) -> Self {
        ScriptFailure {
            kind: e.kind,
            name: e.name,
            message: e.message,
            line: e.line,
            source_name: e.source_name,
            trace: e.trace,
        }
    }
}

impl fmt::Display for ScriptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.source_name, self.line, self.name, self.message
        )?;
        for frame in &self.trace {
            write!(f, "\n    {}", frame)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOutcome {
    Success(Value),
    Failure(ScriptFailure),
}

impl ScriptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScriptOutcome::Success(_))
    }
}

/// One interpreter session: a registry built from the configured grammar profile plus the
/// configuration every run uses.
pub struct Engine {
    config: EngineConfig,
    registry: PluginRegistry,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let registry = config.grammar.build_registry()?;
        info!(source = %config.source_name, plugins = %registry.counts(), "engine ready");
        Ok(Engine { config, registry })
    }

    /// An engine over a registry the host assembled itself.
    pub fn with_registry(config: EngineConfig, registry: PluginRegistry) -> Self {
        Engine { config, registry }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn compile(&self, source: &str) -> Result<Script, ScriptError> {
        self.compile_named(source, &self.config.source_name)
    }

    pub fn compile_named(&self, source: &str, source_name: &str) -> Result<Script, ScriptError> {
        let parser = Parser::from_source(&self.registry, source, source_name)
            .map_err(|e| ScriptError::from(e).in_source(source_name))?;
        let tree = parser
            .parse_script()
            .map_err(|e| ScriptError::from(e).in_source(source_name))?;
        debug!(nodes = tree.len(), source = source_name, "compiled script");
        Ok(Script {
            tree: Rc::new(tree),
        })
    }

    /// A context with this engine's limits, source name and output settings.
    pub fn new_context(&self) -> EvalContext {
        let mut ctx = EvalContext::with_limits(self.config.governor);
        ctx.set_source_name(self.config.source_name.clone());
        ctx.set_echo(self.config.echo_output);
        ctx
    }

    /// Compile and run `source` in a fresh context.
    pub fn execute(&self, source: &str) -> ValueResult {
        let mut ctx = self.new_context();
        self.execute_in(&mut ctx, source)
    }

    /// Compile and run `source` in an existing context; bindings persist across calls.
    pub fn execute_in(&self, ctx: &mut EvalContext, source: &str) -> ValueResult {
        let script = self.compile_named(source, ctx.source_name())?;
        self.run_script(ctx, &script)
    }

    pub fn run_script(&self, ctx: &mut EvalContext, script: &Script) -> ValueResult {
        ctx.governor.reset();
        execute_script(&script.tree, ctx)
    }

    /// Compile and run `source`, folding every failure into a [`ScriptOutcome`].
    pub fn run(&self, source: &str) -> ScriptOutcome {
        match self.execute(source) {
            Ok(value) => ScriptOutcome::Success(value),
            Err(e) => {
                warn!(kind = %e.kind, line = e.line, "script failed: {}", e);
                ScriptOutcome::Failure(e.into())
            }
        }
    }

    /// Invoke the script function bound to `name` and return its completion. Each call gets
    /// a fresh governor budget.
    pub fn call(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Completion, ScriptError> {
        ctx.governor.reset();
        match ctx.get_binding(name)? {
            Value::Function(callable) => {
                let line = callable.tree.node(callable.def.node).line;
                call_function(ctx, &callable, args, line)
            }
            Value::Native(native) => (native.func)(ctx, args).map(Completion::with_value),
            other => Err(ScriptError::type_error(format!(
                "{} is a {}, not a function",
                name,
                other.type_name()
            ))),
        }
    }

    /// Dispose every plugin holding session resources.
    pub fn shutdown(mut self) -> Vec<RegistryError> {
        let failures = self.registry.dispose_all();
        info!(failures = failures.len(), "engine shut down");
        failures
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
