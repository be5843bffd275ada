//! Calls, member access and indexing.

use crate::parser::ast::{NodeId, NodeKind};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::{Token, TokenKind};
use crate::parser::Parser;
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo, Trigger};

pub(crate) const ACCESS_POWER: u8 = 9;

/// The name after `.` or `?.`; keywords are allowed as member names.
pub(crate) fn member_name(parser: &mut Parser<'_>) -> ParseResult<String> {
    let token = parser.advance();
    match token.kind {
        TokenKind::Identifier | TokenKind::Keyword => Ok(token.text),
        _ => Err(ParseError::unexpected(&token, "a member name", token.line())),
    }
}

/// `callee(args)`
pub struct CallPlugin {
    info: PluginInfo,
}

impl CallPlugin {
    pub fn new() -> Self {
        CallPlugin {
            info: PluginInfo::new("call")
                .system()
                .trigger(Trigger::Suffix)
                .grammar("callee ( expression (, expression)* )")
                .example("hours(3)"),
        }
    }
}

impl ExpressionPlugin for CallPlugin {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        parser.check("(")
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        Err(ParseError::invalid("call without a callee", parser.line()))
    }

    fn binding_power(&self, _token: &Token) -> u8 {
        ACCESS_POWER
    }

    fn parse_suffix(&self, parser: &mut Parser<'_>, callee: NodeId) -> ParseResult<NodeId> {
        let open = parser.expect("(")?;
        let mut args = vec![];
        while !parser.check(")") {
            args.push(parser.parse_expression(0)?);
            if !parser.eat(",") {
                break;
            }
        }
        parser.expect(")")?;
        Ok(parser.add(NodeKind::Call { callee, args }, open.line()))
    }
}

/// `object.name`
pub struct MemberPlugin {
    info: PluginInfo,
}

impl MemberPlugin {
    pub fn new() -> Self {
        MemberPlugin {
            info: PluginInfo::new("member")
                .system()
                .trigger(Trigger::Suffix)
                .assignable()
                .grammar("object . name")
                .example("order.total")
                .example("xs.push(1)"),
        }
    }
}

impl ExpressionPlugin for MemberPlugin {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        parser.check(".")
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        Err(ParseError::invalid("member access without an object", parser.line()))
    }

    fn binding_power(&self, _token: &Token) -> u8 {
        ACCESS_POWER
    }

    fn parse_suffix(&self, parser: &mut Parser<'_>, object: NodeId) -> ParseResult<NodeId> {
        let dot = parser.expect(".")?;
        let name = member_name(parser)?;
        Ok(parser.add(
            NodeKind::Member {
                object,
                name,
                optional: false,
            },
            dot.line(),
        ))
    }
}

/// `object[index]`
pub struct IndexPlugin {
    info: PluginInfo,
}

impl IndexPlugin {
    pub fn new() -> Self {
        IndexPlugin {
            info: PluginInfo::new("index")
                .system()
                .trigger(Trigger::Suffix)
                .assignable()
                .grammar("object [ expression ]")
                .example("xs[0]")
                .example("m[\"key\"]"),
        }
    }
}

impl ExpressionPlugin for IndexPlugin {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        parser.check("[")
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        Err(ParseError::invalid("index without an object", parser.line()))
    }

    fn binding_power(&self, _token: &Token) -> u8 {
        ACCESS_POWER
    }

    fn parse_suffix(&self, parser: &mut Parser<'_>, object: NodeId) -> ParseResult<NodeId> {
        let open = parser.expect("[")?;
        let index = parser.parse_expression(0)?;
        parser.expect("]")?;
        Ok(parser.add(NodeKind::Index { object, index }, open.line()))
    }
}

grammar_plugin!(CallPlugin, MemberPlugin, IndexPlugin);
