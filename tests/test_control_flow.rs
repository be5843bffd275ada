//! Loops, conditionals, structural misuse and scope lifetime.

mod script_util;

use rstest::rstest;

use script_util::{engine, engine_with_limits, num, run, run_get_var, run_output};
use weft::runner::ds::error::ErrorKind;
use weft::runner::ds::governor::GovernorLimits;
use weft::runner::ds::value::Value;

#[test]
fn test_for_continue_skips_one_iteration() {
    let sum = run_get_var(
        "var sum = 0;
         for (i = 0; i < 3; i += 1) { if (i == 1) continue; sum = sum + i; }",
        "sum",
    );
    assert_eq!(sum, num(2.0));
}

#[test]
fn test_break_halts_immediately() {
    let output = run_output(
        "var i = 0;
         while (true) {
             i = i + 1;
             if (i == 3) { break; }
             print(\"after\", i);
         }
         print(\"done\", i);",
    );
    assert_eq!(output, ["after 1", "after 2", "done 3"]);
}

#[test]
fn test_break_inside_nested_block_leaves_loop() {
    let output = run_output(
        "for (var i = 0; i < 10; i += 1) {
             { if (i == 2) { break; } }
             print(i);
         }",
    );
    assert_eq!(output, ["0", "1"]);
}

#[test]
fn test_continue_only_skips_rest_of_iteration() {
    let output = run_output(
        "foreach (x in [1, 2, 3, 4]) {
             if (x % 2 == 0) continue;
             print(x);
         }",
    );
    assert_eq!(output, ["1", "3"]);
}

#[test]
fn test_inner_break_does_not_stop_outer_loop() {
    let count = run_get_var(
        "var count = 0;
         for (var i = 0; i < 3; i += 1) {
             for (var j = 0; j < 10; j += 1) {
                 if (j == 2) break;
                 count += 1;
             }
         }",
        "count",
    );
    assert_eq!(count, num(6.0));
}

#[rstest]
#[case("var xs = [\"a\", \"b\"]; var out = \"\"; foreach (x in xs) out = out + x;", "ab")]
#[case("var out = \"\"; for (c in \"xyz\") out = c + out;", "zyx")]
#[case("var m = {b: 2, a: 1}; var out = \"\"; foreach (let k in m) out = out + k;", "ab")]
fn test_for_each_sources(#[case] code: &str, #[case] expected: &str) {
    assert_eq!(run_get_var(code, "out"), Value::str(expected));
}

#[test]
fn test_for_each_over_number_is_a_type_error() {
    let err = run("foreach (x in 5) print(x);").unwrap_err();
    assert_eq!(err.name, "TypeError");
    assert_eq!(err.kind, ErrorKind::Runtime);
}

#[test]
fn test_if_else_chain() {
    let output = run_output(
        "foreach (n in [1, 5, 10]) {
             if (n < 3) print(\"small\");
             else if (n < 7) print(\"medium\");
             else print(\"large\");
         }",
    );
    assert_eq!(output, ["small", "medium", "large"]);
}

#[rstest]
#[case("break;", "'break' outside of a loop", 1)]
#[case("var a = 1;\n\ncontinue;", "'continue' outside of a loop", 3)]
#[case("var a = 1;\nreturn a;", "'return' outside of a function", 2)]
#[case("while (true) {\n  var f = function () {\n    break;\n  };\n}", "'break' outside of a loop", 3)]
fn test_structural_errors_cite_the_line(
    #[case] code: &str,
    #[case] message: &str,
    #[case] line: usize,
) {
    let err = run(code).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!(err.message, message);
    assert_eq!(err.line, line);
}

#[test]
fn test_iteration_governor_stops_runaway_loops() {
    let engine = engine_with_limits(GovernorLimits {
        max_iterations: 100,
        ..GovernorLimits::default()
    });
    let err = engine.execute("while (true) { }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Governor);
    assert_eq!(err.line, 1);
}

#[test]
fn test_block_variable_does_not_leak() {
    let engine = engine();
    let mut ctx = engine.new_context();
    engine
        .execute_in(&mut ctx, "var outer = 1; { var inner = 2; outer = outer + inner; }")
        .unwrap();
    assert_eq!(ctx.get_binding("outer").unwrap(), num(3.0));
    let err = ctx.get_binding("inner").unwrap_err();
    assert_eq!(err.name, "ReferenceError");
}

#[test]
fn test_loop_variables_stay_in_the_loop() {
    let engine = engine();
    let mut ctx = engine.new_context();
    engine
        .execute_in(
            &mut ctx,
            "var total = 0; for (var i = 0; i < 3; i += 1) { var sq = i * i; total += sq; }
             foreach (item in [1]) { total += item; }",
        )
        .unwrap();
    assert_eq!(ctx.get_binding("total").unwrap(), num(6.0));
    assert!(ctx.get_binding("i").is_err());
    assert!(ctx.get_binding("sq").is_err());
    assert!(ctx.get_binding("item").is_err());
}

#[test]
fn test_script_level_variables_survive_across_runs() {
    let engine = engine();
    let mut ctx = engine.new_context();
    engine.execute_in(&mut ctx, "var counter = 1;").unwrap();
    engine.execute_in(&mut ctx, "counter += 1;").unwrap();
    assert_eq!(engine.execute_in(&mut ctx, "counter;").unwrap(), num(2.0));
}

#[test]
fn test_extension_statements() {
    let output = run_output(
        "var paid = false;
         unless (paid) { print(\"remind\"); } else { print(\"thanks\"); }
         if (paid is not true and 2 > 1) print(\"words\");",
    );
    assert_eq!(output, ["remind", "words"]);
}

#[test]
fn test_last_expression_is_the_script_value() {
    assert_eq!(run("var a = 2; a * 21;").unwrap(), num(42.0));
    assert_eq!(run("var a = 2;").unwrap(), Value::Null);
}
