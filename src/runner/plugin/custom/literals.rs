//! Literal combinators: `#2024-01-31#` dates and `15 percent` style unit numbers.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::parser::ast::{Literal, NodeId, NodeKind};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::token::TokenKind;
use crate::parser::Parser;
use crate::runner::plugin::types::{
    Disposable, ExpressionPlugin, GrammarPlugin, PluginInfo, Trigger,
};

/// `#YYYY-MM-DD#`. Parsed dates are cached by text for the session.
pub struct DateLiteral {
    info: PluginInfo,
    cache: RefCell<HashMap<String, NaiveDate>>,
}

impl DateLiteral {
    pub fn new() -> Self {
        DateLiteral {
            info: PluginInfo::new("date-literal")
                .trigger(Trigger::Date)
                .grammar("#YYYY-MM-DD#")
                .example("due = #2024-01-31# + 30;"),
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn date(&self, text: &str, line: usize) -> ParseResult<NaiveDate> {
        if let Some(date) = self.cache.borrow().get(text) {
            return Ok(*date);
        }
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|e| ParseError::invalid(format!("invalid date #{}#: {}", text, e), line))?;
        self.cache.borrow_mut().insert(text.to_string(), date);
        Ok(date)
    }
}

impl GrammarPlugin for DateLiteral {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    fn as_disposable(&self) -> Option<&dyn Disposable> {
        Some(self)
    }
}

impl Disposable for DateLiteral {
    fn dispose(&self) -> Result<(), String> {
        let mut cache = self.cache.try_borrow_mut().map_err(|e| e.to_string())?;
        debug!(entries = cache.len(), "dropping date literal cache");
        cache.clear();
        Ok(())
    }
}

impl ExpressionPlugin for DateLiteral {
    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let token = parser.advance();
        let date = self.date(&token.text, token.line())?;
        Ok(parser.add(NodeKind::Literal(Literal::Date(date)), token.line()))
    }
}

/// Unit words a number literal may carry, with their multipliers.
pub const UNITS: &[(&str, f64)] = &[
    ("percent", 0.01),
    ("dozen", 12.0),
    ("thousand", 1_000.0),
    ("million", 1_000_000.0),
    ("day", 1.0),
    ("days", 1.0),
    ("week", 7.0),
    ("weeks", 7.0),
];

fn unit_factor(word: &str) -> Option<f64> {
    UNITS.iter().find(|(unit, _)| *unit == word).map(|(_, f)| *f)
}

/// `number unit`, folded to a plain number at parse time. Day and week units count days so
/// they combine with date arithmetic.
pub struct UnitLiteral {
    info: PluginInfo,
}

impl UnitLiteral {
    pub fn new() -> Self {
        UnitLiteral {
            info: PluginInfo::new("unit-literal")
                .trigger(Trigger::Number)
                .grammar("number (percent | dozen | thousand | million | day[s] | week[s])")
                .example("price * 15 percent")
                .example("#2024-01-01# + 2 weeks"),
        }
    }
}

impl GrammarPlugin for UnitLiteral {
    fn info(&self) -> &PluginInfo {
        &self.info
    }
}

impl ExpressionPlugin for UnitLiteral {
    fn can_handle(&self, parser: &Parser<'_>) -> bool {
        let next = parser.peek(1);
        next.kind == TokenKind::Identifier && unit_factor(&next.text).is_some()
    }

    fn parse(&self, parser: &mut Parser<'_>) -> ParseResult<NodeId> {
        let number = parser.advance();
        let unit = parser.advance();
        let value: f64 = number.text.parse().map_err(|_| {
            ParseError::invalid(format!("invalid number '{}'", number.text), number.line())
        })?;
        let factor = unit_factor(&unit.text)
            .ok_or_else(|| ParseError::unexpected(&unit, "a unit", unit.line()))?;
        Ok(parser.add(
            NodeKind::Literal(Literal::Number(value * factor)),
            number.line(),
        ))
    }
}
