//! Built-in members per value kind, the global natives and the extension literals.

mod script_util;

use rstest::rstest;

use script_util::{num, run, run_output};
use weft::runner::ds::value::Value;

// ============================================================================
// Member tables
// ============================================================================

#[rstest]
#[case("[3, 1, 2].length", "3")]
#[case("[1, 2].contains(2)", "true")]
#[case("[\"a\", \"b\"].indexOf(\"c\")", "-1")]
#[case("[1, 2, 3].join(\"-\")", "1-2-3")]
#[case("[].first()", "null")]
#[case("[4, 5].last()", "5")]
#[case("\"  Ada  \".trim().upper()", "ADA")]
#[case("\"weft\".length", "4")]
#[case("\"a,b,c\".split(\",\").length", "3")]
#[case("\"invoice-7\".replace(\"-\", \" #\")", "invoice #7")]
#[case("\"héllo\".substring(1, 3)", "él")]
#[case("\"report.pdf\".endsWith(\".pdf\") and \"report\".startsWith(\"rep\")", "true")]
#[case("{a: 1, b: 2}.size", "2")]
#[case("{b: 1, a: 2}.keys()", "[\"a\", \"b\"]")]
#[case("{a: 1}.get(\"z\", 9)", "9")]
#[case("{a: 1}.has(\"a\")", "true")]
#[case("{a: 1}.missing", "null")]
fn test_members(#[case] expression: &str, #[case] expected: &str) {
    let value = run(&format!("var result = {}; result;", expression))
        .unwrap_or_else(|e| panic!("{} failed: {}", expression, e));
    assert_eq!(value.to_string(), expected, "{}", expression);
}

#[test]
fn test_push_and_pop_mutate_in_place() {
    let output = run_output(
        "var xs = [1];
         xs.push(2, 3);
         var top = xs.pop();
         print(xs, top);",
    );
    assert_eq!(output, ["[1, 2] 3"]);
}

#[test]
fn test_map_remove_returns_the_value() {
    assert_eq!(
        run("var m = {a: 1, b: 2}; var gone = m.remove(\"a\"); gone + m.size;").unwrap(),
        num(2.0)
    );
}

#[test]
fn test_map_key_shadows_member() {
    assert_eq!(run("var m = {size: \"large\"}; m.size;").unwrap(), Value::str("large"));
}

#[test]
fn test_method_read_as_property_is_an_error() {
    let err = run("[1].push;").unwrap_err();
    assert_eq!(err.name, "TypeError");
}

#[test]
fn test_unknown_member_on_string() {
    let err = run("\"abc\".reverse();").unwrap_err();
    assert_eq!(err.name, "TypeError");
    assert_eq!(err.message, "string has no member 'reverse'");
}

// ============================================================================
// Natives
// ============================================================================

#[rstest]
#[case("len(\"abc\") + len([1, 2]) + len({a: 1})", "6")]
#[case("str(12) + str(true)", "12true")]
#[case("num(\" 2.5 \") * 2", "5")]
#[case("typeOf(date(\"2024-02-29\"))", "date")]
#[case("typeOf(function () {})", "function")]
#[case("typeOf(print)", "function")]
#[case("date(2024, 2, 29).weekday", "4")]
fn test_natives(#[case] expression: &str, #[case] expected: &str) {
    let value = run(&format!("{};", expression))
        .unwrap_or_else(|e| panic!("{} failed: {}", expression, e));
    assert_eq!(value.to_string(), expected, "{}", expression);
}

#[test]
fn test_print_joins_arguments() {
    assert_eq!(run_output("print(\"total\", 3, null, [1]);"), ["total 3 null [1]"]);
}

#[test]
fn test_invalid_date_is_a_conversion_error() {
    let err = run("date(\"2024-02-30\");").unwrap_err();
    assert_eq!(err.name, "ConversionError");
    assert!(err.is_recoverable());
}

#[test]
fn test_len_of_number_is_a_type_error() {
    assert_eq!(run("len(3);").unwrap_err().name, "TypeError");
}

// ============================================================================
// Extension literals and date arithmetic
// ============================================================================

#[rstest]
#[case("200 * 15 percent", 30.0)]
#[case("2 dozen", 24.0)]
#[case("3 thousand + 1", 3001.0)]
#[case("#2024-03-01# - #2024-02-01#", 29.0)]
#[case("(#2024-01-01# + 2 weeks).day", 15.0)]
#[case("#2024-01-31#.addDays(1).month", 2.0)]
fn test_extension_literals(#[case] expression: &str, #[case] expected: f64) {
    assert_eq!(run(&format!("{};", expression)).unwrap(), num(expected));
}

#[test]
fn test_dates_compare() {
    assert_eq!(
        run("#2024-01-01# < #2024-06-01# and date(\"2024-01-01\") == #2024-01-01#;").unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_safe_member_on_null() {
    let output = run_output(
        "var customer = {address: null};
         print(customer.address?.city);
         print(customer?.address);",
    );
    assert_eq!(output, ["null", "null"]);
}

#[test]
fn test_plain_member_on_null_fails() {
    let err = run("var customer = {address: null}; customer.address.city;").unwrap_err();
    assert_eq!(err.name, "TypeError");
}

#[test]
fn test_echoed_output_is_not_retained() {
    let engine = weft::Engine::new(weft::EngineConfig {
        echo_output: true,
        ..weft::EngineConfig::default()
    })
    .unwrap();
    let mut ctx = engine.new_context();
    for _ in 0..3 {
        engine.execute_in(&mut ctx, "print(\"tick\");").unwrap();
    }
    assert!(ctx.output().is_empty());
}
