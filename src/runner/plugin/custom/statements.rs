//! Extension statements: `unless` and `fail`.

use std::rc::Rc;

use crate::parser::ast::{CustomEval, CustomNode, NodeId, NodeKind, SyntaxTree, UnaryOperator};
use crate::parser::error::ParseResult;
use crate::parser::token::TokenKind;
use crate::parser::Parser;
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::Value;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::expression::evaluate_expression;
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo};

/// `unless (test) body [else body]`, an `if` with the test negated.
pub struct UnlessStatement {
    info: PluginInfo,
}

impl UnlessStatement {
    pub fn new() -> Self {
        UnlessStatement {
            info: PluginInfo::new("unless")
                .statement()
                .keyword("unless")
                .grammar("unless ( expression ) statement [else statement]")
                .example("unless (paid) { remind(customer); }"),
        }
    }
}

impl ExpressionPlugin for UnlessStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let condition = parser.parse_parenthesized()?;
        let test = parser.add(
            NodeKind::Unary {
                operator: UnaryOperator::Not,
                operand: condition,
            },
            keyword.line(),
        );
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

/// Raises an explicit-fail fault. No `try/catch` intercepts it.
struct FailOp;

impl CustomEval for FailOp {
    fn name(&self) -> &str {
        "fail"
    }

    fn evaluate(
        &self,
        tree: &Rc<SyntaxTree>,
        children: &[NodeId],
        ctx: &mut EvalContext,
    ) -> ValueResult {
        let message = match children.first() {
            Some(message) => match evaluate_expression(tree, *message, ctx)? {
                Value::Str(s) => s,
                other => other.to_string(),
            },
            None => String::from("script failed"),
        };
        Err(ScriptError::explicit_fail(message))
    }
}

/// `fail [message];`
pub struct FailStatement {
    info: PluginInfo,
}

impl FailStatement {
    pub fn new() -> Self {
        FailStatement {
            info: PluginInfo::new("fail")
                .statement()
                .terminated()
                .keyword("fail")
                .grammar("fail [expression] ;")
                .example("fail \"ledger is unbalanced\";"),
        }
    }
}

impl ExpressionPlugin for FailStatement {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let keyword = parser.advance();
        let bare =
            parser.check(";") || parser.check("}") || parser.current().kind == TokenKind::Eof;
        let children = if bare {
            vec![]
        } else {
            vec![parser.parse_expression(0)?]
        };
        Ok(parser.add(
            NodeKind::Custom(CustomNode {
                op: Rc::new(FailOp),
                children,
            }),
            keyword.line(),
        ))
    }
}

grammar_plugin!(UnlessStatement, FailStatement);
