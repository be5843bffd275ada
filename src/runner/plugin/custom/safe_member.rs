use crate::parser::ast::{NodeId, NodeKind};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::Token;
use crate::parser::Parser;
use crate::runner::plugin::system::access::{member_name, ACCESS_POWER};
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo, Trigger};

/// `object?.name` reads `null` instead of faulting when the object is `null`.
pub struct SafeMember {
    info: PluginInfo,
}

impl SafeMember {
    pub fn new() -> Self {
        SafeMember {
            info: PluginInfo::new("safe-member")
                .trigger(Trigger::Suffix)
                .grammar("object ?. name")
                .example("customer?.address?.city"),
        }
    }
}

impl ExpressionPlugin for SafeMember {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        parser.check("?.")
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        Err(ParseError::invalid("'?.' without an object", parser.line()))
    }

    fn binding_power(&self, _token: &Token) -> u8 {
        ACCESS_POWER
    }

    fn parse_suffix(&self, parser: &mut Parser<'_>, object: NodeId) -> ParseResult<NodeId> {
        let op = parser.expect("?.")?;
        let name = member_name(parser)?;
        Ok(parser.add(
            NodeKind::Member {
                object,
                name,
                optional: true,
            },
            op.line(),
        ))
    }
}

grammar_plugin!(SafeMember);
