//! Unary, binary and assignment operators.

use crate::parser::ast::{AssignOperator, BinaryOperator, NodeId, NodeKind, UnaryOperator};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::{Token, TokenKind};
use crate::parser::Parser;
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo, Trigger, PRECEDENCE_HIGHEST};

/// Operand binding power of prefix operators: tighter than any binary operator, looser
/// than calls and member access.
const UNARY_POWER: u8 = 8;
const ASSIGNMENT_POWER: u8 = 1;

fn no_left_operand(info: &PluginInfo, parser: &Parser<'_>) -> ParseError {
    ParseError::invalid(
        format!("'{}' needs a left operand", info.name),
        parser.line(),
    )
}

/// `-x`, `!x`, `not x`
pub struct UnaryOperatorPlugin {
    info: PluginInfo,
}

impl UnaryOperatorPlugin {
    pub fn new() -> Self {
        UnaryOperatorPlugin {
            info: PluginInfo::new("unary")
                .system()
                .precedence(PRECEDENCE_HIGHEST)
                .keyword("-")
                .keyword("!")
                .keyword("not")
                .grammar("(- | ! | not) operand")
                .example("-x")
                .example("not done"),
        }
    }
}

impl ExpressionPlugin for UnaryOperatorPlugin {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let token = parser.advance();
        let operator = if token.text == "-" {
            UnaryOperator::Negate
        } else {
            UnaryOperator::Not
        };
        let operand = parser.parse_expression(UNARY_POWER)?;
        Ok(parser.add(NodeKind::Unary { operator, operand }, token.line()))
    }
}

/// Infix arithmetic, comparison and logical operators.
pub struct BinaryOperatorPlugin {
    info: PluginInfo,
}

impl BinaryOperatorPlugin {
    pub fn new() -> Self {
        BinaryOperatorPlugin {
            info: PluginInfo::new("binary")
                .system()
                .trigger(Trigger::Suffix)
                .grammar("operand (|| && == != < <= > >= + - * / %) operand")
                .example("a + b * c"),
        }
    }
}

fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    if token.kind == TokenKind::Symbol {
        BinaryOperator::from_symbol(&token.text)
    } else {
        None
    }
}

impl ExpressionPlugin for BinaryOperatorPlugin {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        binary_operator(parser.current()).is_some()
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        Err(no_left_operand(&self.info, parser))
    }

    fn binding_power(&self, token: &Token) -> u8 {
        binary_operator(token)
            .map(BinaryOperator::binding_power)
            .unwrap_or(0)
    }

    fn parse_suffix(&self, parser: &mut Parser<'_>, left: NodeId) -> ParseResult<NodeId> {
        let token = parser.advance();
        let operator = binary_operator(&token)
            .ok_or_else(|| ParseError::unexpected(&token, "a binary operator", token.line()))?;
        let right = parser.parse_expression(operator.binding_power())?;
        Ok(parser.add(
            NodeKind::Binary {
                operator,
                left,
                right,
            },
            token.line(),
        ))
    }
}

/// `target = value` and the compound forms. Right-associative.
pub struct AssignmentPlugin {
    info: PluginInfo,
}

impl AssignmentPlugin {
    pub fn new() -> Self {
        AssignmentPlugin {
            info: PluginInfo::new("assignment")
                .system()
                .trigger(Trigger::Suffix)
                .grammar("target (= | += | -= | *= | /=) expression")
                .example("total += price")
                .example("m[\"k\"] = xs[0] = 1"),
        }
    }
}

impl ExpressionPlugin for AssignmentPlugin {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        let token = parser.current();
        token.kind == TokenKind::Symbol && AssignOperator::from_symbol(&token.text).is_some()
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        Err(no_left_operand(&self.info, parser))
    }

    fn binding_power(&self, _token: &Token) -> u8 {
        ASSIGNMENT_POWER
    }

    fn parse_suffix(&self, parser: &mut Parser<'_>, left: NodeId) -> ParseResult<NodeId> {
        let token = parser.advance();
        if !parser.tree().node(left).assignable {
            return Err(ParseError::invalid("invalid assignment target", token.line()));
        }
        let operator = AssignOperator::from_symbol(&token.text)
            .ok_or_else(|| ParseError::unexpected(&token, "an assignment", token.line()))?;
        let value = parser.parse_expression(0)?;
        Ok(parser.add(
            NodeKind::Assign {
                target: left,
                operator,
                value,
            },
            token.line(),
        ))
    }
}

grammar_plugin!(UnaryOperatorPlugin, BinaryOperatorPlugin, AssignmentPlugin);
