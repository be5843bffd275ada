//! Declarations, assignment targets and compound operators.

mod script_util;

use rstest::rstest;

use script_util::{num, run, run_get_var};
use weft::runner::ds::error::ErrorKind;
use weft::runner::ds::value::Value;

#[rstest]
#[case("var x = 10; x += 5;", 15.0)]
#[case("var x = 10; x -= 4;", 6.0)]
#[case("var x = 10; x *= 3;", 30.0)]
#[case("var x = 10; x /= 4;", 2.5)]
#[case("var x = 1, y = 2; x = y = 7;", 7.0)]
fn test_variable_assignment(#[case] code: &str, #[case] expected: f64) {
    assert_eq!(run_get_var(code, "x"), num(expected));
}

#[test]
fn test_declaration_without_initializer_is_null() {
    assert_eq!(run_get_var("var a, b = 2;", "a"), Value::Null);
    assert_eq!(run_get_var("let a, b = 2;", "b"), num(2.0));
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let output = script_util::run_output(
        "var n = 1;
         { var n = 2; print(n); n = 3; print(n); }
         print(n);",
    );
    assert_eq!(output, ["2", "3", "1"]);
}

#[test]
fn test_member_and_key_targets() {
    let m = run_get_var(
        "var m = {count: 1};
         m.count += 1;
         m[\"label\"] = \"hits\";
         m.extra = m.count * 10;",
        "m",
    );
    assert_eq!(m.to_string(), "{count: 2, extra: 20, label: \"hits\"}");
}

#[test]
fn test_element_targets() {
    let xs = run_get_var(
        "var xs = [1, 2, 3];
         xs[0] = 10;
         xs[1] *= 5;
         xs[3] = 4;",
        "xs",
    );
    assert_eq!(xs.to_string(), "[10, 10, 3, 4]");
}

#[test]
fn test_chained_targets_share_the_value() {
    let m = run_get_var("var xs = [0]; var m = {}; m[\"k\"] = xs[0] = 1; m;", "m");
    assert_eq!(m.to_string(), "{k: 1}");
}

#[test]
fn test_out_of_range_element_is_a_range_error() {
    let err = run("var xs = [1];\nxs[5] = 2;").unwrap_err();
    assert_eq!(err.name, "RangeError");
    assert_eq!(err.line, 2);
}

#[test]
fn test_invalid_target_is_rejected_at_parse_time() {
    let err = run("var a = 1;\n(a + 1) = 2;").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.line, 2);
}

#[test]
fn test_property_on_a_number_is_a_type_error() {
    let err = run("var n = 1; n.size = 2;").unwrap_err();
    assert_eq!(err.name, "TypeError");
}

#[test]
fn test_compound_assignment_concatenates_strings() {
    assert_eq!(
        run_get_var("var s = \"a\"; s += 1; s += true;", "s"),
        Value::str("a1true")
    );
}

#[test]
fn test_arrays_are_shared_by_reference() {
    assert_eq!(
        run("var a = [1]; var b = a; b.push(2); a.length;").unwrap(),
        num(2.0)
    );
}

#[rstest]
#[case("1 + 2 * 3", 7.0)]
#[case("(1 + 2) * 3", 9.0)]
#[case("10 - 4 - 3", 3.0)]
#[case("-2 * 3", -6.0)]
#[case("7 % 4 + 1", 4.0)]
fn test_arithmetic_precedence(#[case] expression: &str, #[case] expected: f64) {
    assert_eq!(run(&format!("{};", expression)).unwrap(), num(expected));
}

#[rstest]
#[case("1 < 2 && 2 < 3", true)]
#[case("1 > 2 || not false", true)]
#[case("!(1 == 1)", false)]
#[case("\"a\" != \"b\" and 3 >= 3", true)]
#[case("null == false", false)]
fn test_logical_operators(#[case] expression: &str, #[case] expected: bool) {
    assert_eq!(run(&format!("{};", expression)).unwrap(), Value::Bool(expected));
}
