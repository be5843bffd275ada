//! Registry resolution, registration and teardown.

mod script_util;

use std::cell::Cell;
use std::rc::Rc;

use weft::parser::ast::{Literal, NodeId, NodeKind};
use weft::parser::{ParseResult, Parser};
use weft::runner::api::Engine;
use weft::runner::config::EngineConfig;
use weft::runner::ds::value::Value;
use weft::runner::plugin::types::{Disposable, TokenPlugin};
use weft::runner::plugin::{
    ExpressionPlugin, GrammarPlugin, Plugin, PluginCategory, PluginInfo, PluginRegistry,
    RegistryError, Trigger,
};
use weft::parser::token::{Token, TokenKind};

/// Prefix plugin that records how often it parsed and yields its own name as a string.
struct Probe {
    info: PluginInfo,
    accept: bool,
    calls: Rc<Cell<usize>>,
}

impl Probe {
    fn new(name: &str, trigger: &str, precedence: i32) -> Self {
        Probe {
            info: PluginInfo::new(name)
                .keyword(trigger)
                .precedence(precedence),
            accept: true,
            calls: Rc::new(Cell::new(0)),
        }
    }

    fn declining(mut self) -> Self {
        self.accept = false;
        self
    }
}

impl GrammarPlugin for Probe {
    fn info(&self) -> &PluginInfo {
        &self.info
    }
}

impl ExpressionPlugin for Probe {
    fn can_handle(&self, _parser: &Parser<'_>) -> bool {
        self.accept
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        self.calls.set(self.calls.get() + 1);
        let token = parser.advance();
        Ok(parser.add(
            NodeKind::Literal(Literal::Str(self.info.name.clone())),
            token.line(),
        ))
    }
}

/// An `if` statement that counts its parses.
struct CountingIf {
    info: PluginInfo,
    calls: Rc<Cell<usize>>,
}

impl CountingIf {
    fn new(name: &str, precedence: i32, calls: Rc<Cell<usize>>) -> Self {
        CountingIf {
            info: PluginInfo::new(name)
                .keyword("if")
                .statement()
                .precedence(precedence),
            calls,
        }
    }
}

impl GrammarPlugin for CountingIf {
    fn info(&self) -> &PluginInfo {
        &self.info
    }
}

impl ExpressionPlugin for CountingIf {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        self.calls.set(self.calls.get() + 1);
        let line = parser.line();
        parser.advance();
        let test = parser.parse_parenthesized()?;
        let consequent = self.parse_body(parser)?;
        Ok(parser.add(
            NodeKind::If {
                test,
                consequent,
                alternate: None,
            },
            line,
        ))
    }
}

/// Token plugin holding a session resource.
struct Resource {
    info: PluginInfo,
    fail: bool,
    disposed: Rc<Cell<usize>>,
}

impl Resource {
    fn new(name: &str, fail: bool, disposed: Rc<Cell<usize>>) -> Self {
        Resource {
            info: PluginInfo::new(name).trigger(Trigger::text(name)),
            fail,
            disposed,
        }
    }
}

impl GrammarPlugin for Resource {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl TokenPlugin for Resource {
    fn classify(&self, _token: &Token) -> Option<TokenKind> {
        None
    }
}

impl Disposable for Resource {
    fn dispose(&self) -> Result<(), String> {
        if self.fail {
            return Err("handle already closed".to_string());
        }
        self.disposed.set(self.disposed.get() + 1);
        Ok(())
    }
}

fn matched_expression(registry: &PluginRegistry, source: &str) -> Option<String> {
    let parser = Parser::from_source(registry, source, "test").unwrap();
    registry
        .match_expression(&parser)
        .map(|p| p.info().name.clone())
}

fn matched_statement(registry: &PluginRegistry, source: &str) -> Option<String> {
    let parser = Parser::from_source(registry, source, "test").unwrap();
    registry
        .match_statement(&parser)
        .map(|p| p.info().name.clone())
}

#[test]
fn test_lowest_precedence_matches_first() {
    let mut registry = PluginRegistry::new();
    registry
        .register(Plugin::expression(Probe::new("late", "answer", 50)))
        .unwrap();
    registry
        .register(Plugin::expression(Probe::new("early", "answer", 10)))
        .unwrap();
    registry
        .register(Plugin::expression(Probe::new("middle", "answer", 30)))
        .unwrap();
    assert_eq!(matched_expression(&registry, "answer").as_deref(), Some("early"));
}

#[test]
fn test_second_registration_appends() {
    let mut registry = PluginRegistry::new();
    registry
        .register(Plugin::expression(Probe::new("first", "answer", 10)))
        .unwrap();
    registry
        .register(Plugin::expression(Probe::new("second", "answer", 5).declining()))
        .unwrap();
    assert_eq!(registry.count(PluginCategory::Expression), 2);
    // The lower-precedence plugin declines, so the earlier one is still reachable.
    assert_eq!(matched_expression(&registry, "answer").as_deref(), Some("first"));
}

#[test]
fn test_declining_text_plugin_falls_back_to_generic_trigger() {
    let mut registry = PluginRegistry::with_system().unwrap();
    registry
        .register(Plugin::expression(Probe::new("greedy", "answer", 1).declining()))
        .unwrap();
    assert_eq!(matched_expression(&registry, "answer").as_deref(), Some("identifier"));

    registry
        .register(Plugin::expression(Probe::new("eager", "answer", 2)))
        .unwrap();
    assert_eq!(matched_expression(&registry, "answer").as_deref(), Some("eager"));
}

#[test]
fn test_equal_precedence_keeps_registration_order() {
    for _ in 0..3 {
        let mut registry = PluginRegistry::new();
        registry
            .register(Plugin::expression(Probe::new("a", "answer", 10)))
            .unwrap();
        registry
            .register(Plugin::expression(Probe::new("b", "answer", 10)))
            .unwrap();
        assert_eq!(matched_expression(&registry, "answer").as_deref(), Some("a"));
    }
}

#[test]
fn test_register_all_sorts_by_precedence() {
    let mut registry = PluginRegistry::new();
    registry
        .register_all(vec![
            Plugin::expression(Probe::new("slow", "answer", 90)),
            Plugin::expression(Probe::new("fast", "answer", 1)),
        ])
        .unwrap();
    let mut order = vec![];
    registry.for_each(PluginCategory::Expression, |info| order.push(info.name.clone()));
    assert_eq!(order, ["fast", "slow"]);
    assert_eq!(matched_expression(&registry, "answer").as_deref(), Some("fast"));
}

#[test]
fn test_only_the_winning_if_plugin_parses() {
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let mut registry = PluginRegistry::with_system().unwrap();
    registry
        .register(Plugin::expression(CountingIf::new("if-2", 2, second.clone())))
        .unwrap();
    registry
        .register(Plugin::expression(CountingIf::new("if-1", 1, first.clone())))
        .unwrap();

    let parser = Parser::from_source(&registry, "if (true) { x = 1; }", "test").unwrap();
    parser.parse_script().unwrap();
    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 0);

    let engine = Engine::with_registry(EngineConfig::default(), registry);
    let mut ctx = engine.new_context();
    engine
        .execute_in(&mut ctx, "var x = 0; if (true) { x = 1; }")
        .unwrap();
    assert_eq!(ctx.get_binding("x").unwrap(), Value::Number(1.0));
    assert_eq!(first.get(), 2);
    assert_eq!(second.get(), 0);
}

#[test]
fn test_statement_tier_tie_goes_to_system() {
    let calls = Rc::new(Cell::new(0));
    let mut registry = PluginRegistry::with_system().unwrap();
    let system_precedence = {
        let mut found = None;
        registry.for_each(PluginCategory::SystemStatement, |info| {
            if info.name == "if" {
                found = Some(info.precedence);
            }
        });
        found.unwrap()
    };
    registry
        .register(Plugin::expression(CountingIf::new(
            "tied-if",
            system_precedence,
            calls.clone(),
        )))
        .unwrap();
    assert_eq!(matched_statement(&registry, "if (x) y;").as_deref(), Some("if"));

    registry
        .register(Plugin::expression(CountingIf::new(
            "eager-if",
            system_precedence - 1,
            calls,
        )))
        .unwrap();
    assert_eq!(
        matched_statement(&registry, "if (x) y;").as_deref(),
        Some("eager-if")
    );
}

#[test]
fn test_last_matched_tracks_resolution() {
    let registry = PluginRegistry::with_system().unwrap();
    assert!(registry.last_matched().is_none());
    matched_statement(&registry, "while (x) y;");
    assert_eq!(registry.last_matched().unwrap().info().name, "while");
}

#[test]
fn test_unknown_plugin_type_is_rejected() {
    let mut registry = PluginRegistry::new();
    assert_eq!(
        registry.register_custom_by_type("macro"),
        Err(RegistryError::UnknownPluginType("macro".to_string()))
    );
}

#[test]
fn test_register_by_type() {
    let mut registry = PluginRegistry::with_system().unwrap();
    registry.register_custom_by_type("statement").unwrap();
    assert!(registry.is_registered("fail"));
    assert!(registry.is_registered("unless"));
    assert!(!registry.is_registered("date-literal"));
    assert_eq!(registry.count(PluginCategory::ExtensionStatement), 2);
}

#[test]
fn test_unknown_subset_name_registers_nothing() {
    let mut registry = PluginRegistry::new();
    let err = registry
        .register_custom_subset(&["unless", "macros"])
        .unwrap_err();
    assert_eq!(err, RegistryError::UnknownPlugin("macros".to_string()));
    assert_eq!(registry.counts().total(), 0);
}

#[test]
fn test_malformed_registration_is_rejected() {
    let mut registry = PluginRegistry::new();
    let nameless = Probe {
        info: PluginInfo::new("no-triggers"),
        accept: true,
        calls: Rc::new(Cell::new(0)),
    };
    let err = registry.register(Plugin::expression(nameless)).unwrap_err();
    assert!(matches!(err, RegistryError::Malformed { .. }));
}

#[test]
fn test_default_counts() {
    let engine = script_util::engine();
    let counts = engine.registry().counts();
    assert_eq!(counts.get(PluginCategory::Lexical), 1);
    assert_eq!(counts.get(PluginCategory::Token), 2);
    assert_eq!(counts.get(PluginCategory::Postfix), 6);
    assert_eq!(counts.get(PluginCategory::SystemStatement), 11);
    assert_eq!(counts.get(PluginCategory::ExtensionStatement), 2);
    assert_eq!(counts.get(PluginCategory::Expression), 10);
}

#[test]
fn test_disposal_continues_after_a_failure() {
    let disposed = Rc::new(Cell::new(0));
    let mut registry = PluginRegistry::new();
    registry
        .register(Plugin::token(Resource::new("alpha", false, disposed.clone())))
        .unwrap();
    registry
        .register(Plugin::token(Resource::new("broken", true, disposed.clone())))
        .unwrap();
    registry
        .register(Plugin::token(Resource::new("omega", false, disposed.clone())))
        .unwrap();

    let failures = registry.dispose_all();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0],
        RegistryError::DisposeFailed { plugin, .. } if plugin == "broken"
    ));
    assert_eq!(disposed.get(), 2);

    assert!(registry.dispose_all().is_empty());
    assert_eq!(disposed.get(), 2);
}

#[test]
fn test_engine_shutdown_disposes_extensions() {
    let engine = script_util::engine();
    engine.execute("var due = #2024-01-31#;").unwrap();
    assert!(engine.shutdown().is_empty());
}
