//! Parser driver.
//!
//! The driver owns the token stream and the tree under construction, asks the registry
//! which plugin handles the current token and invokes it. Plugins call back into
//! [`Parser::parse_expression`], [`Parser::parse_statement`] and [`Parser::parse_block`]
//! for nested constructs.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use super::ast::{Literal, NodeId, NodeKind, SyntaxTree};
use super::error::{ParseError, ParseResult};
use super::lexer;
use super::stream::TokenStream;
use super::token::{Token, TokenKind};
use crate::runner::plugin::registry::PluginRegistry;
use crate::runner::plugin::types::ExpressionPlugin;

/// How a parsed block treats runtime scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockScope {
    /// The block pushes and pops its own scope when evaluated.
    Push,
    /// The owning construct manages scopes itself (try/catch).
    Managed,
}

#[derive(Debug, Clone, Copy)]
enum Enclosing {
    Loop(NodeId),
    Function(NodeId),
}

/// Parse-time scope: collects the function declarations hoisted into its block.
#[derive(Debug, Default)]
struct ParseScope {
    functions: Vec<NodeId>,
    names: HashSet<String>,
}

pub struct Parser<'r> {
    registry: &'r PluginRegistry,
    stream: TokenStream,
    tree: SyntaxTree,
    enclosing: Vec<Enclosing>,
    scopes: Vec<ParseScope>,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r PluginRegistry, tokens: Vec<Token>, source_name: &str) -> Self {
        Parser {
            registry,
            stream: TokenStream::new(tokens),
            tree: SyntaxTree::new(source_name),
            enclosing: vec![],
            scopes: vec![],
        }
    }

    /// Lex `source`, apply the registry's lexical and token plugins, and return a parser
    /// positioned at the first token.
    pub fn from_source(
        registry: &'r PluginRegistry,
        source: &str,
        source_name: &str,
    ) -> ParseResult<Self> {
        let tokens = lexer::tokenize(source)?;
        let mut tokens = registry.apply_lexical(tokens);
        registry.classify_tokens(&mut tokens);
        debug!(tokens = tokens.len(), source = source_name, "lexed script");
        Ok(Self::new(registry, tokens, source_name))
    }

    /// Parse statements until end of input. The root is an unscoped block: script-level
    /// bindings live in the global frame.
    pub fn parse_script(mut self) -> ParseResult<SyntaxTree> {
        self.scopes.push(ParseScope::default());
        let mut body = vec![];
        while !self.stream.at_end() {
            body.push(self.parse_statement()?);
        }
        let scope = self.scopes.pop().unwrap_or_default();
        let root = self.tree.add(
            NodeKind::Block {
                body,
                functions: scope.functions,
                scoped: false,
            },
            1,
        );
        self.tree.set_root(root);
        self.tree.link_parents();
        debug!(nodes = self.tree.len(), "parsed script");
        Ok(self.tree)
    }

    pub fn registry(&self) -> &'r PluginRegistry {
        self.registry
    }

    pub fn current(&self) -> &Token {
        self.stream.current()
    }

    pub fn peek(&self, n: usize) -> &Token {
        self.stream.peek(n)
    }

    pub fn advance(&mut self) -> Token {
        self.stream.advance()
    }

    pub fn check(&self, text: &str) -> bool {
        self.stream.check(text)
    }

    pub fn eat(&mut self, text: &str) -> bool {
        self.stream.eat(text)
    }

    pub fn expect(&mut self, text: &str) -> ParseResult<Token> {
        self.stream.expect(text)
    }

    pub fn expect_identifier(&mut self) -> ParseResult<Token> {
        self.stream.expect_identifier()
    }

    pub fn line(&self) -> usize {
        self.current().line()
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn add(&mut self, kind: NodeKind, line: usize) -> NodeId {
        self.tree.add(kind, line)
    }

    /// Reserve a node id before its children exist, so they can refer to it.
    pub fn reserve(&mut self, line: usize) -> NodeId {
        self.tree.reserve(line)
    }

    pub fn replace(&mut self, id: NodeId, kind: NodeKind) {
        self.tree.replace(id, kind)
    }

    pub fn parse_statement(&mut self) -> ParseResult<NodeId> {
        let line = self.line();
        if self.current().kind == TokenKind::Eof {
            return Err(ParseError::unexpected(self.current(), "a statement", line));
        }
        if self.eat(";") {
            return Ok(self.add(NodeKind::Empty, line));
        }
        if self.check("{") {
            return self.parse_block(BlockScope::Push);
        }
        let registry = self.registry;
        if let Some(plugin) = registry.match_statement(self) {
            return self.invoke_statement(&plugin);
        }
        let expression = self.parse_expression(0)?;
        self.expect_terminator()?;
        Ok(self.add(NodeKind::ExpressionStatement(expression), line))
    }

    /// Run a statement plugin: parse, post-parse hook, then the terminator if it needs one.
    pub fn invoke_statement(&mut self, plugin: &Rc<dyn ExpressionPlugin>) -> ParseResult<NodeId> {
        let node = self.invoke(plugin)?;
        if plugin.info().requires_terminator {
            self.expect_terminator()?;
        }
        Ok(node)
    }

    fn invoke(&mut self, plugin: &Rc<dyn ExpressionPlugin>) -> ParseResult<NodeId> {
        let node = plugin.parse(self)?;
        plugin.after_parse(self, node)?;
        if plugin.info().supports_assignment {
            self.tree.node_mut(node).assignable = true;
        }
        Ok(node)
    }

    /// Parse an expression whose postfix forms bind tighter than `min_power`.
    pub fn parse_expression(&mut self, min_power: u8) -> ParseResult<NodeId> {
        let mut left = self.parse_prefix()?;
        let registry = self.registry;
        while let Some(plugin) = registry.match_postfix(self) {
            if plugin.binding_power(self.current()) <= min_power {
                break;
            }
            left = plugin.parse_suffix(self, left)?;
            plugin.after_parse(self, left)?;
            if plugin.info().supports_assignment {
                self.tree.node_mut(left).assignable = true;
            }
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<NodeId> {
        let is_number = self.current().kind == TokenKind::Number;
        let registry = self.registry;
        if is_number && !registry.has_literal_combinators() {
            return self.parse_number_literal();
        }
        match registry.match_expression(self) {
            Some(plugin) => self.invoke(&plugin),
            None if is_number => self.parse_number_literal(),
            None => {
                let token = self.current();
                Err(ParseError::unexpected(token, "an expression", token.line()))
            }
        }
    }

    /// Built-in number literal, used when no literal combinator claims the token.
    pub fn parse_number_literal(&mut self) -> ParseResult<NodeId> {
        let token = self.advance();
        let value: f64 = token.text.parse().map_err(|_| {
            ParseError::invalid(format!("invalid number '{}'", token.text), token.line())
        })?;
        Ok(self.add(NodeKind::Literal(Literal::Number(value)), token.line()))
    }

    /// `( expression )`
    pub fn parse_parenthesized(&mut self) -> ParseResult<NodeId> {
        self.expect("(")?;
        let expression = self.parse_expression(0)?;
        self.expect(")")?;
        Ok(expression)
    }

    /// `{ statement* }` with its own parse scope for hoisted functions.
    pub fn parse_block(&mut self, scope: BlockScope) -> ParseResult<NodeId> {
        let open = self.expect("{")?;
        self.scopes.push(ParseScope::default());
        let mut body = vec![];
        while !self.check("}") {
            if self.stream.at_end() {
                return Err(ParseError::unexpected(
                    self.current(),
                    "'}'",
                    self.current().line(),
                ));
            }
            body.push(self.parse_statement()?);
        }
        self.expect("}")?;
        let frame = self.scopes.pop().unwrap_or_default();
        Ok(self.add(
            NodeKind::Block {
                body,
                functions: frame.functions,
                scoped: scope == BlockScope::Push,
            },
            open.line(),
        ))
    }

    /// `;` ends a statement; it may be left out before `}` or at end of input.
    pub fn expect_terminator(&mut self) -> ParseResult<()> {
        if self.eat(";") || self.check("}") || self.stream.at_end() {
            Ok(())
        } else {
            let token = self.current();
            Err(ParseError::unexpected(token, "';'", token.line()))
        }
    }

    pub fn enter_loop(&mut self, node: NodeId) {
        self.enclosing.push(Enclosing::Loop(node));
    }

    pub fn enter_function(&mut self, node: NodeId) {
        self.enclosing.push(Enclosing::Function(node));
    }

    pub fn exit_enclosing(&mut self) {
        self.enclosing.pop();
    }

    /// Innermost loop, not looking past a function boundary.
    pub fn enclosing_loop(&self) -> Option<NodeId> {
        for e in self.enclosing.iter().rev() {
            match e {
                Enclosing::Loop(id) => return Some(*id),
                Enclosing::Function(_) => return None,
            }
        }
        None
    }

    pub fn enclosing_function(&self) -> Option<NodeId> {
        self.enclosing.iter().rev().find_map(|e| match e {
            Enclosing::Function(id) => Some(*id),
            Enclosing::Loop(_) => None,
        })
    }

    /// Bind a function declaration and its aliases into the innermost parse scope.
    pub fn declare_function(&mut self, node: NodeId, names: &[String]) -> ParseResult<()> {
        let line = self.tree.node(node).line;
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| ParseError::structural("function declared outside any scope", line))?;
        for name in names {
            if !scope.names.insert(name.clone()) {
                return Err(ParseError::invalid(
                    format!("function '{}' is already declared in this scope", name),
                    line,
                ));
            }
        }
        scope.functions.push(node);
        Ok(())
    }

    /// Names declared as functions in the innermost parse scope so far.
    pub fn declared_in_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|s| s.names.contains(name))
            .unwrap_or(false)
    }
}
