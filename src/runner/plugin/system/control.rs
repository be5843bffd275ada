//! Control-flow statements.

use crate::parser::ast::{NodeId, NodeKind};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::TokenKind;
use crate::parser::Parser;
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo};

/// `if (test) body [else body]`
pub struct IfStatement {
    info: PluginInfo,
}

impl IfStatement {
    pub fn new() -> Self {
        IfStatement {
            info: PluginInfo::new("if")
                .system()
                .statement()
                .keyword("if")
                .grammar("if ( expression ) statement [else statement]")
                .example("if (x > 1) { y = 2; } else y = 3;"),
        }
    }
}

impl ExpressionPlugin for IfStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let test = parser.parse_parenthesized()?;
        let consequent = self.parse_body(parser)?;
        let alternate = if parser.eat("else") {
            Some(self.parse_body(parser)?)
        } else {
            None
        };
        Ok(parser.add(
            NodeKind::If {
                test,
                consequent,
                alternate,
            },
            keyword.line(),
        ))
    }
}

/// Parse a loop body with `loop_node` registered as the break/continue target.
fn parse_loop_body(
    plugin: &dyn ExpressionPlugin,
    parser: &mut Parser<'_>,
    loop_node: NodeId,
) -> ParseResult<NodeId> {
    parser.enter_loop(loop_node);
    let body = plugin.parse_body(parser);
    parser.exit_enclosing();
    body
}

/// `while (test) body`
pub struct WhileStatement {
    info: PluginInfo,
}

impl WhileStatement {
    pub fn new() -> Self {
        WhileStatement {
            info: PluginInfo::new("while")
                .system()
                .statement()
                .keyword("while")
                .grammar("while ( expression ) statement")
                .example("while (n > 0) { n -= 1; }"),
        }
    }
}

impl ExpressionPlugin for WhileStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let node = parser.reserve(keyword.line());
        let test = parser.parse_parenthesized()?;
        let body = parse_loop_body(self, parser, node)?;
        parser.replace(node, NodeKind::While { test, body });
        Ok(node)
    }
}

/// `for (init; test; update) body`. Each clause may be empty.
pub struct ForStatement {
    info: PluginInfo,
}

impl ForStatement {
    pub fn new() -> Self {
        ForStatement {
            info: PluginInfo::new("for")
                .system()
                .statement()
                .keyword("for")
                .grammar("for ( [statement] ; [expression] ; [expression] ) statement")
                .example("for (var i = 0; i < 3; i += 1) { print(i); }"),
        }
    }
}

impl ExpressionPlugin for ForStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let node = parser.reserve(keyword.line());
        parser.expect("(")?;
        // The init clause is a full statement and consumes its own `;`.
        let init = if parser.eat(";") {
            None
        } else {
            Some(parser.parse_statement()?)
        };
        let test = if parser.check(";") {
            None
        } else {
            Some(parser.parse_expression(0)?)
        };
        parser.expect(";")?;
        let update = if parser.check(")") {
            None
        } else {
            Some(parser.parse_expression(0)?)
        };
        parser.expect(")")?;
        let body = parse_loop_body(self, parser, node)?;
        parser.replace(
            node,
            NodeKind::For {
                init,
                test,
                update,
                body,
            },
        );
        Ok(node)
    }
}

/// `for (x in xs) body` or `foreach (x in xs) body`. Ranked ahead of the counted `for`,
/// which it defers to unless the header matches `( name in`.
pub struct ForEachStatement {
    info: PluginInfo,
}

impl ForEachStatement {
    pub fn new() -> Self {
        ForEachStatement {
            info: PluginInfo::new("foreach")
                .system()
                .statement()
                .precedence(90)
                .keyword("for")
                .keyword("foreach")
                .grammar("(for | foreach) ( [var | let] name in expression ) statement")
                .example("foreach (item in order.items) total += item.price;"),
        }
    }
}

impl ExpressionPlugin for ForEachStatement {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        if parser.check("foreach") {
            return true;
        }
        if !parser.peek(1).is("(") {
            return false;
        }
        let name_at = if parser.peek(2).is("var") || parser.peek(2).is("let") {
            3
        } else {
            2
        };
        parser.peek(name_at).kind == TokenKind::Identifier && parser.peek(name_at + 1).is("in")
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let node = parser.reserve(keyword.line());
        parser.expect("(")?;
        if !parser.eat("var") {
            parser.eat("let");
        }
        let variable = parser.expect_identifier()?.text;
        parser.expect("in")?;
        let iterable = parser.parse_expression(0)?;
        parser.expect(")")?;
        let body = parse_loop_body(self, parser, node)?;
        parser.replace(
            node,
            NodeKind::ForEach {
                variable,
                iterable,
                body,
            },
        );
        Ok(node)
    }
}

pub struct BreakStatement {
    info: PluginInfo,
}

impl BreakStatement {
    pub fn new() -> Self {
        BreakStatement {
            info: PluginInfo::new("break")
                .system()
                .statement()
                .terminated()
                .keyword("break")
                .grammar("break ;"),
        }
    }
}

impl ExpressionPlugin for BreakStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let target = parser.enclosing_loop().ok_or_else(|| {
            ParseError::structural("'break' outside of a loop", keyword.line())
        })?;
        Ok(parser.add(NodeKind::Break { target }, keyword.line()))
    }
}

pub struct ContinueStatement {
    info: PluginInfo,
}

impl ContinueStatement {
    pub fn new() -> Self {
        ContinueStatement {
            info: PluginInfo::new("continue")
                .system()
                .statement()
                .terminated()
                .keyword("continue")
                .grammar("continue ;"),
        }
    }
}

impl ExpressionPlugin for ContinueStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let target = parser.enclosing_loop().ok_or_else(|| {
            ParseError::structural("'continue' outside of a loop", keyword.line())
        })?;
        Ok(parser.add(NodeKind::Continue { target }, keyword.line()))
    }
}

/// `return [expression];`
pub struct ReturnStatement {
    info: PluginInfo,
}

impl ReturnStatement {
    pub fn new() -> Self {
        ReturnStatement {
            info: PluginInfo::new("return")
                .system()
                .statement()
                .terminated()
                .keyword("return")
                .grammar("return [expression] ;")
                .example("return n * 60;"),
        }
    }
}

impl ExpressionPlugin for ReturnStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let function = parser.enclosing_function().ok_or_else(|| {
            ParseError::structural("'return' outside of a function", keyword.line())
        })?;
        let bare = parser.check(";") || parser.check("}") || parser.current().kind == TokenKind::Eof;
        let value = if bare {
            None
        } else {
            Some(parser.parse_expression(0)?)
        };
        Ok(parser.add(NodeKind::Return { value, function }, keyword.line()))
    }
}

grammar_plugin!(
    IfStatement,
    WhileStatement,
    ForStatement,
    ForEachStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
);
