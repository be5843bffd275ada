//! Literal and primary forms.

use crate::parser::ast::{Literal, NodeId, NodeKind};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::TokenKind;
use crate::parser::Parser;
use crate::runner::plugin::types::{ExpressionPlugin, PluginInfo, Trigger, PRECEDENCE_FALLBACK};

pub struct StringLiteral {
    info: PluginInfo,
}

impl StringLiteral {
    pub fn new() -> Self {
        StringLiteral {
            info: PluginInfo::new("string-literal")
                .system()
                .trigger(Trigger::String)
                .grammar("\"text\" | 'text'")
                .example("\"hello\\n\""),
        }
    }
}

impl ExpressionPlugin for StringLiteral {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let token = parser.advance();
        Ok(parser.add(NodeKind::Literal(Literal::Str(token.text)), token.pos.line))
    }
}

/// `true`, `false` and `null`.
pub struct ConstantLiteral {
    info: PluginInfo,
}

impl ConstantLiteral {
    pub fn new() -> Self {
        ConstantLiteral {
            info: PluginInfo::new("constant-literal")
                .system()
                .keyword("true")
                .keyword("false")
                .keyword("null")
                .grammar("true | false | null"),
        }
    }
}

impl ExpressionPlugin for ConstantLiteral {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let token = parser.advance();
        let literal = match token.text.as_str() {
            "true" => Literal::Bool(true),
            "false" => Literal::Bool(false),
            _ => Literal::Null,
        };
        Ok(parser.add(NodeKind::Literal(literal), token.line()))
    }
}

/// Variable reference. Tried after every other identifier-triggered form.
pub struct IdentifierReference {
    info: PluginInfo,
}

impl IdentifierReference {
    pub fn new() -> Self {
        IdentifierReference {
            info: PluginInfo::new("identifier")
                .system()
                .trigger(Trigger::Identifier)
                .precedence(PRECEDENCE_FALLBACK)
                .assignable()
                .grammar("name"),
        }
    }
}

impl ExpressionPlugin for IdentifierReference {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let token = parser.expect_identifier()?;
        Ok(parser.add(NodeKind::Identifier(token.text), token.pos.line))
    }
}

pub struct Grouping {
    info: PluginInfo,
}

impl Grouping {
    pub fn new() -> Self {
        Grouping {
            info: PluginInfo::new("grouping")
                .system()
                .keyword("(")
                .grammar("( expression )"),
        }
    }
}

impl ExpressionPlugin for Grouping {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        parser.parse_parenthesized()
    }
}

pub struct ArrayLiteral {
    info: PluginInfo,
}

impl ArrayLiteral {
    pub fn new() -> Self {
        ArrayLiteral {
            info: PluginInfo::new("array-literal")
                .system()
                .keyword("[")
                .grammar("[ expression (, expression)* ,? ]")
                .example("[1, 2, 3]"),
        }
    }
}

impl ExpressionPlugin for ArrayLiteral {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let open = parser.expect("[")?;
        let mut items = vec![];
        while !parser.check("]") {
            items.push(parser.parse_expression(0)?);
            if !parser.eat(",") {
                break;
            }
        }
        parser.expect("]")?;
        Ok(parser.add(NodeKind::Array(items), open.line()))
    }
}

/// `{ key: value, ... }` in expression position. Keys are names or strings.
pub struct MapLiteral {
    info: PluginInfo,
}

impl MapLiteral {
    pub fn new() -> Self {
        MapLiteral {
            info: PluginInfo::new("map-literal")
                .system()
                .keyword("{")
                .grammar("{ key : expression (, key : expression)* ,? }")
                .example("{name: \"Ada\", \"born\": 1815}"),
        }
    }
}

impl ExpressionPlugin for MapLiteral {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let open = parser.expect("{")?;
        let mut entries = vec![];
        while !parser.check("}") {
            let key = parser.advance();
            if !matches!(
                key.kind,
                TokenKind::Identifier | TokenKind::Keyword | TokenKind::String
            ) {
                return Err(ParseError::unexpected(&key, "a map key", key.line()));
            }
            parser.expect(":")?;
            entries.push((key.text, parser.parse_expression(0)?));
            if !parser.eat(",") {
                break;
            }
        }
        parser.expect("}")?;
        Ok(parser.add(NodeKind::Map(entries), open.line()))
    }
}

grammar_plugin!(
    StringLiteral,
    ConstantLiteral,
    IdentifierReference,
    Grouping,
    ArrayLiteral,
    MapLiteral,
);
