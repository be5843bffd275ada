use crate::parser::ast::{Binding, NodeId, NodeKind};
use crate::parser::error::ParseResult;
use crate::parser::Parser;
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo};

/// `var a = 1, b, c = a + 1;` binds fresh variables in the current scope.
pub struct VarDeclaration {
    info: PluginInfo,
}

impl VarDeclaration {
    pub fn new() -> Self {
        VarDeclaration {
            info: PluginInfo::new("declaration")
                .system()
                .statement()
                .terminated()
                .keyword("var")
                .keyword("let")
                .grammar("(var | let) name [= expression] (, name [= expression])* ;")
                .example("var total = 0, count;"),
        }
    }
}

impl ExpressionPlugin for VarDeclaration {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let mut bindings = vec![];
        loop {
            let name = parser.expect_identifier()?;
            let init = if parser.eat("=") {
                Some(parser.parse_expression(0)?)
            } else {
                None
            };
            bindings.push(Binding {
                line: name.line(),
                name: name.text,
                init,
            });
            if !parser.eat(",") {
                break;
            }
        }
        Ok(parser.add(NodeKind::Declaration(bindings), keyword.line()))
    }
}

grammar_plugin!(VarDeclaration);
