//! Lexing, token plugins and the shape of parsed trees.

mod script_util;

use pretty_assertions::assert_eq;

use script_util::engine;
use weft::parser::ast::{BinaryOperator, Literal, NodeId, NodeKind, SyntaxTree};
use weft::parser::lexer::tokenize;
use weft::parser::token::TokenKind;
use weft::parser::{ParseError, Parser};
use weft::runner::ds::error::ErrorKind;

fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    let engine = engine();
    Parser::from_source(engine.registry(), source, "<test>")?.parse_script()
}

fn statements(tree: &SyntaxTree) -> Vec<NodeId> {
    let root = tree.root().expect("root");
    match &tree.node(root).kind {
        NodeKind::Block { body, .. } => body.clone(),
        other => panic!("root is not a block: {:?}", other),
    }
}

fn expression_of(tree: &SyntaxTree, statement: NodeId) -> NodeId {
    match &tree.node(statement).kind {
        NodeKind::ExpressionStatement(e) => *e,
        other => panic!("not an expression statement: {:?}", other),
    }
}

fn binary(tree: &SyntaxTree, id: NodeId) -> (BinaryOperator, NodeId, NodeId) {
    match &tree.node(id).kind {
        NodeKind::Binary {
            operator,
            left,
            right,
        } => (*operator, *left, *right),
        other => panic!("not a binary node: {:?}", other),
    }
}

#[test]
fn test_tokens_carry_kind_and_line() {
    let tokens = tokenize("var when = #2024-05-01#;\nwhen?.day").unwrap();
    let kinds: Vec<(TokenKind, &str, usize)> = tokens
        .iter()
        .map(|t| (t.kind, t.text.as_str(), t.line()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (TokenKind::Identifier, "var", 1),
            (TokenKind::Identifier, "when", 1),
            (TokenKind::Symbol, "=", 1),
            (TokenKind::Date, "2024-05-01", 1),
            (TokenKind::Symbol, ";", 1),
            (TokenKind::Identifier, "when", 2),
            (TokenKind::Symbol, "?.", 2),
            (TokenKind::Identifier, "day", 2),
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    let tokens = tokenize("// heading\n/* block\ncomment */ x").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "x");
    assert_eq!(tokens[0].line(), 3);
}

#[test]
fn test_unrecognized_input_reports_its_line() {
    let err = tokenize("var a = 1;\nvar b = @;").unwrap_err();
    assert!(matches!(err, ParseError::Lex { line: 2, .. }), "{:?}", err);
}

#[test]
fn test_registry_merges_word_operators_and_marks_keywords() {
    let engine = engine();
    let registry = engine.registry();
    let tokens = registry.apply_lexical(tokenize("a is not b and c").unwrap());
    let mut tokens = tokens;
    registry.classify_tokens(&mut tokens);
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["a", "!=", "b", "&&", "c"]);

    let mut tokens = tokenize("while whilst unless").unwrap();
    registry.classify_tokens(&mut tokens);
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [TokenKind::Keyword, TokenKind::Identifier, TokenKind::Keyword]
    );
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let tree = parse("1 + 2 * 3;").unwrap();
    let body = statements(&tree);
    assert_eq!(body.len(), 1);
    let (operator, left, right) = binary(&tree, expression_of(&tree, body[0]));
    assert_eq!(operator, BinaryOperator::Add);
    assert!(matches!(
        tree.node(left).kind,
        NodeKind::Literal(Literal::Number(n)) if n == 1.0
    ));
    assert_eq!(binary(&tree, right).0, BinaryOperator::Mul);
}

#[test]
fn test_subtraction_is_left_associative() {
    let tree = parse("a - b - c;").unwrap();
    let (operator, left, right) = binary(&tree, expression_of(&tree, statements(&tree)[0]));
    assert_eq!(operator, BinaryOperator::Sub);
    assert_eq!(binary(&tree, left).0, BinaryOperator::Sub);
    assert!(matches!(&tree.node(right).kind, NodeKind::Identifier(name) if name == "c"));
}

#[test]
fn test_comparison_binds_tighter_than_logic() {
    let tree = parse("x < 1 or y == 2 and z;").unwrap();
    let (operator, left, right) = binary(&tree, expression_of(&tree, statements(&tree)[0]));
    assert_eq!(operator, BinaryOperator::Or);
    assert_eq!(binary(&tree, left).0, BinaryOperator::Lt);
    assert_eq!(binary(&tree, right).0, BinaryOperator::And);
}

#[test]
fn test_unit_literal_folds_into_a_number() {
    let tree = parse("3 dozen;").unwrap();
    let literal = expression_of(&tree, statements(&tree)[0]);
    assert!(matches!(
        tree.node(literal).kind,
        NodeKind::Literal(Literal::Number(n)) if n == 36.0
    ));
}

#[test]
fn test_break_targets_the_innermost_loop() {
    let tree = parse("while (a) {\n  foreach (x in xs) {\n    break;\n  }\n}").unwrap();
    let (id, node) = tree
        .iter()
        .find(|(_, node)| matches!(node.kind, NodeKind::Break { .. }))
        .expect("break node");
    assert_eq!(node.line, 3);
    let target = match node.kind {
        NodeKind::Break { target } => target,
        _ => unreachable!(),
    };
    assert!(matches!(tree.node(target).kind, NodeKind::ForEach { .. }));
    assert_eq!(tree.enclosing(id, NodeKind::is_loop), Some(target));
}

#[test]
fn test_function_declarations_are_collected_on_their_block() {
    let tree = parse("f();\nfunction f() { function g() {} }").unwrap();
    let root = tree.root().unwrap();
    let functions = match &tree.node(root).kind {
        NodeKind::Block { functions, scoped, .. } => {
            assert!(!scoped);
            functions.clone()
        }
        _ => unreachable!(),
    };
    assert_eq!(functions.len(), 1);
    match &tree.node(functions[0]).kind {
        NodeKind::Function(def) => assert_eq!(def.display_name(), "f"),
        other => panic!("not a function: {:?}", other),
    }
    assert_eq!(tree.node(functions[0]).line, 2);
}

#[test]
fn test_missing_terminator_is_unexpected() {
    let err = parse("var a = 1\nvar b = 2;").unwrap_err();
    assert!(matches!(err, ParseError::Unexpected { line: 2, .. }), "{:?}", err);
}

#[test]
fn test_unclosed_block_is_unexpected() {
    let err = parse("if (a) {\n  b();\n").unwrap_err();
    assert!(matches!(err, ParseError::Unexpected { .. }), "{:?}", err);
}

#[test]
fn test_return_outside_function_is_structural() {
    let err = parse("return 1;").unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.line(), 1);
}

#[test]
fn test_compiled_script_carries_source_name() {
    let engine = engine();
    let script = engine.compile_named("var a = 1;", "ledger.weft").unwrap();
    assert_eq!(script.source_name(), "ledger.weft");

    let err = engine.compile_named("var a = ;", "ledger.weft").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.source_name, "ledger.weft");
}
