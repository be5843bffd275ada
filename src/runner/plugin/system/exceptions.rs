//! `try/catch` and `throw`.

use crate::parser::ast::{NodeId, NodeKind};
use crate::parser::error::ParseResult;
use crate::parser::{BlockScope, Parser};
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo};

/// `try { ... } catch (e) { ... }`. Both blocks are parsed unscoped: the evaluator pushes
/// the try frame and, only on a fault, the catch frame binding `e`.
pub struct TryStatement {
    info: PluginInfo,
}

impl TryStatement {
    pub fn new() -> Self {
        TryStatement {
            info: PluginInfo::new("try")
                .system()
                .statement()
                .keyword("try")
                .grammar("try { statements } catch [(] name [)] { statements }")
                .example("try { risky(); } catch (e) { print(e.message); }"),
        }
    }
}

impl ExpressionPlugin for TryStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let body = self.parse_block(parser)?;
        parser.expect("catch")?;
        let parenthesized = parser.eat("(");
        let catch_var = parser.expect_identifier()?.text;
        if parenthesized {
            parser.expect(")")?;
        }
        let handler = self.parse_block(parser)?;
        Ok(parser.add(
            NodeKind::Try {
                body,
                catch_var,
                handler,
            },
            keyword.line(),
        ))
    }

    fn parse_block(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        parser.parse_block(BlockScope::Managed)
    }
}

/// `throw expression;` raises a recoverable fault.
pub struct ThrowStatement {
    info: PluginInfo,
}

impl ThrowStatement {
    pub fn new() -> Self {
        ThrowStatement {
            info: PluginInfo::new("throw")
                .system()
                .statement()
                .terminated()
                .keyword("throw")
                .grammar("throw expression ;")
                .example("throw \"quantity must be positive\";"),
        }
    }
}

impl ExpressionPlugin for ThrowStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let value = parser.parse_expression(0)?;
        Ok(parser.add(NodeKind::Throw(value), keyword.line()))
    }
}

grammar_plugin!(TryStatement, ThrowStatement);
