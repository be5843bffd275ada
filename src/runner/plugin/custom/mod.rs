//! Extension catalog. Hosts enable these by name or by plugin type on top of the system
//! grammar.

pub mod lexical;
pub mod literals;
pub mod safe_member;
pub mod statements;

use super::types::Plugin;

/// Every extension, keyed by plugin name.
pub fn catalog() -> Vec<Plugin> {
    vec![
        Plugin::expression(literals::DateLiteral::new()),
        Plugin::expression(literals::UnitLiteral::new()),
        Plugin::expression(statements::FailStatement::new()),
        Plugin::expression(statements::UnlessStatement::new()),
        Plugin::expression(safe_member::SafeMember::new()),
        Plugin::lexical(lexical::WordOperators::new()),
        Plugin::token(lexical::ExtensionKeywords::new()),
    ]
}

/// Names of every catalog plugin, in catalog order.
pub fn catalog_names() -> Vec<String> {
    catalog().iter().map(|p| p.info().name.clone()).collect()
}
