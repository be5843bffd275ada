//! Function declarations and function literals.

use std::rc::Rc;

use crate::parser::ast::{FunctionDef, NodeId, NodeKind};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::TokenKind;
use crate::parser::Parser;
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo};

/// `( name, ... )`
fn parse_params(parser: &mut Parser<'_>) -> ParseResult<Vec<String>> {
    parser.expect("(")?;
    let mut params: Vec<String> = vec![];
    while !parser.check(")") {
        let param = parser.expect_identifier()?;
        if params.contains(&param.text) {
            return Err(ParseError::invalid(
                format!("duplicate parameter '{}'", param.text),
                param.line(),
            ));
        }
        params.push(param.text);
        if !parser.eat(",") {
            break;
        }
    }
    parser.expect(")")?;
    Ok(params)
}

/// Parameters and body, with `node` registered as the `return` target. Loops outside the
/// function are not visible to `break`/`continue` inside it.
fn parse_function(
    plugin: &dyn ExpressionPlugin,
    parser: &mut Parser<'_>,
    node: NodeId,
    names: Vec<String>,
) -> ParseResult<Rc<FunctionDef>> {
    let params = parse_params(parser)?;
    parser.enter_function(node);
    let body = plugin.parse_block(parser);
    parser.exit_enclosing();
    Ok(Rc::new(FunctionDef {
        names,
        params,
        body: body?,
        node,
    }))
}

/// `function name[, alias]* ( params ) { body }`, hoisted into the enclosing block.
pub struct FunctionDeclaration {
    info: PluginInfo,
}

impl FunctionDeclaration {
    pub fn new() -> Self {
        FunctionDeclaration {
            info: PluginInfo::new("function-declaration")
                .system()
                .statement()
                .keyword("function")
                .grammar("function name (, name)* ( params ) { statements }")
                .example("function hours, hour(n) { return n * 60; }"),
        }
    }
}

impl ExpressionPlugin for FunctionDeclaration {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        parser.peek(1).kind == TokenKind::Identifier
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let node = parser.reserve(keyword.line());
        let mut names = vec![parser.expect_identifier()?.text];
        while parser.eat(",") {
            names.push(parser.expect_identifier()?.text);
        }
        let def = parse_function(self, parser, node, names)?;
        parser.replace(node, NodeKind::Function(def));
        Ok(node)
    }

    fn after_parse(&self, parser: &mut Parser<'_>, node: NodeId) -> ParseResult<()> {
        let names = match &parser.tree().node(node).kind {
            NodeKind::Function(def) => def.names.clone(),
            _ => return Ok(()),
        };
        parser.declare_function(node, &names)
    }
}

/// `function ( params ) { body }` as a value.
pub struct FunctionLiteral {
    info: PluginInfo,
}

impl FunctionLiteral {
    pub fn new() -> Self {
        FunctionLiteral {
            info: PluginInfo::new("function-literal")
                .system()
                .keyword("function")
                .grammar("function ( params ) { statements }")
                .example("var double = function (x) { return x * 2; };"),
        }
    }
}

impl ExpressionPlugin for FunctionLiteral {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        parser.peek(1).is("(")
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let node = parser.reserve(keyword.line());
        let def = parse_function(self, parser, node, vec![])?;
        parser.replace(node, NodeKind::FunctionLiteral(def));
        Ok(node)
    }
}

grammar_plugin!(FunctionDeclaration, FunctionLiteral);
