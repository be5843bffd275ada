//! Core grammar: literals, operators, control flow, functions and exceptions.

pub mod access;
pub mod control;
pub mod declaration;
pub mod exceptions;
pub mod function;
pub mod keywords;
pub mod literals;
pub mod operators;

use super::types::Plugin;

/// Every system plugin, unsorted. Registration orders them by precedence.
pub fn plugins() -> Vec<Plugin> {
    vec![
        Plugin::token(keywords::KeywordClassifier::new()),
        Plugin::expression(literals::StringLiteral::new()),
        Plugin::expression(literals::ConstantLiteral::new()),
        Plugin::expression(literals::IdentifierReference::new()),
        Plugin::expression(literals::Grouping::new()),
        Plugin::expression(literals::ArrayLiteral::new()),
        Plugin::expression(literals::MapLiteral::new()),
        Plugin::expression(operators::UnaryOperatorPlugin::new()),
        Plugin::expression(function::FunctionLiteral::new()),
        Plugin::expression(operators::BinaryOperatorPlugin::new()),
        Plugin::expression(operators::AssignmentPlugin::new()),
        Plugin::expression(access::CallPlugin::new()),
        Plugin::expression(access::MemberPlugin::new()),
        Plugin::expression(access::IndexPlugin::new()),
        Plugin::expression(control::IfStatement::new()),
        Plugin::expression(control::WhileStatement::new()),
        Plugin::expression(control::ForStatement::new()),
        Plugin::expression(control::ForEachStatement::new()),
        Plugin::expression(control::BreakStatement::new()),
        Plugin::expression(control::ContinueStatement::new()),
        Plugin::expression(control::ReturnStatement::new()),
        Plugin::expression(exceptions::TryStatement::new()),
        Plugin::expression(exceptions::ThrowStatement::new()),
        Plugin::expression(declaration::VarDeclaration::new()),
        Plugin::expression(function::FunctionDeclaration::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::plugin::registry::PluginRegistry;
    use crate::runner::plugin::types::PluginCategory;

    #[test]
    fn test_system_plugins_register_cleanly() {
        let registry = PluginRegistry::with_system().unwrap();
        let counts = registry.counts();
        assert_eq!(counts.total(), plugins().len());
        assert_eq!(counts.token, 1);
        assert_eq!(counts.postfix, 5);
        assert_eq!(counts.get(PluginCategory::SystemStatement), 11);
        assert_eq!(counts.extension_statement, 0);
    }
}
