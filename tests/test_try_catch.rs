//! Structured error recovery and the faults that bypass it.

mod script_util;

use script_util::{engine, engine_with_limits, num, run, run_get_var, run_in_context, run_output};
use weft::runner::api::ScriptOutcome;
use weft::runner::ds::error::ErrorKind;
use weft::runner::ds::governor::GovernorLimits;
use weft::runner::ds::value::Value;

#[test]
fn test_catch_binds_structured_error() {
    let output = run_output(
        "try {
             throw \"ledger is unbalanced\";
         } catch (e) {
             print(e.name, e.message, e.line, e.file);
         }",
    );
    assert_eq!(output, ["Error ledger is unbalanced 2 <script>"]);
}

#[test]
fn test_catch_message_matches_runtime_fault() {
    let message = run_get_var(
        "var message = \"\";
         try { var x = 1 / 0; } catch e { message = e.message; }",
        "message",
    );
    assert_eq!(message, Value::str("division by zero"));
}

#[test]
fn test_missing_member_is_catchable() {
    let name = run_get_var(
        "var name = null;
         try { [1, 2].shuffle(); } catch (e) { name = e.name; }",
        "name",
    );
    assert_eq!(name, Value::str("TypeError"));
}

#[test]
fn test_governor_fault_bypasses_catch() {
    let engine = engine_with_limits(GovernorLimits {
        max_iterations: 50,
        ..GovernorLimits::default()
    });
    let mut ctx = engine.new_context();
    let err = engine
        .execute_in(
            &mut ctx,
            "var caught = false;
             try {
                 while (true) { }
             } catch (e) {
                 caught = true;
             }",
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Governor);
    assert_eq!(ctx.get_binding("caught").unwrap(), Value::Bool(false));
    assert_eq!(ctx.scopes.depth(), 1);
}

#[test]
fn test_string_bound_bypasses_catch() {
    let engine = engine_with_limits(GovernorLimits {
        max_string_length: 16,
        ..GovernorLimits::default()
    });
    let err = engine
        .execute(
            "var s = \"x\";
             try { while (true) { s = s + s; } } catch (e) { s = \"\"; }",
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Governor);
}

#[test]
fn test_explicit_fail_bypasses_catch() {
    let (ctx, result) = run_in_context(
        "var caught = false;
         try { fail \"stop the run\"; } catch (e) { caught = true; }",
    );
    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExplicitFail);
    assert_eq!(err.message, "stop the run");
    assert_eq!(err.line, 2);
    assert_eq!(ctx.get_binding("caught").unwrap(), Value::Bool(false));
}

#[test]
fn test_uncaught_fault_reaches_the_host() {
    match engine().run("var a = 1;\nthrow \"boom\";") {
        ScriptOutcome::Failure(failure) => {
            assert_eq!(failure.kind, ErrorKind::Runtime);
            assert_eq!(failure.message, "boom");
            assert_eq!(failure.line, 2);
            assert_eq!(failure.source_name, "<script>");
        }
        ScriptOutcome::Success(value) => panic!("expected a failure, got {}", value),
    }
}

#[test]
fn test_rethrow_from_catch_keeps_the_error() {
    let output = run_output(
        "try {
             try { num(\"abc\"); } catch (inner) { throw inner; }
         } catch (outer) {
             print(outer.name, outer.line);
         }",
    );
    assert_eq!(output, ["ConversionError 2"]);
}

#[test]
fn test_try_scope_is_unwound() {
    let (ctx, result) = run_in_context(
        "try { var inside = 1; throw \"x\"; } catch (e) { var handled = e; }",
    );
    result.unwrap();
    assert!(ctx.get_binding("inside").is_err());
    assert!(ctx.get_binding("handled").is_err());
    assert!(ctx.get_binding("e").is_err());
    assert_eq!(ctx.scopes.depth(), 1);
}

#[test]
fn test_fault_inside_function_unwinds_to_the_catch() {
    let engine = engine();
    let mut ctx = engine.new_context();
    let trace = engine
        .execute_in(
            &mut ctx,
            "function check(n) {\n  if (n > 2) throw \"too big\";\n  return n;\n}
             var trace = null;
             try { foreach (n in [1, 2, 3]) { check(n); } } catch (e) { trace = e.trace; }
             trace;",
        )
        .unwrap();
    assert_eq!(trace.to_string(), "[\"at check (<script>:6)\"]");
    assert_eq!(ctx.scopes.depth(), 1);
    assert_eq!(ctx.governor.call_depth(), 0);
}

#[test]
fn test_error_value_rethrown_by_value() {
    assert_eq!(
        run("var saved = null;
             try { throw \"first\"; } catch (e) { saved = e; }
             var msg = \"\";
             try { throw saved; } catch (again) { msg = again.message; }
             msg;")
        .unwrap(),
        Value::str("first")
    );
}

#[test]
fn test_successful_try_skips_catch() {
    assert_eq!(
        run_get_var("var n = 0; try { n = 1; } catch (e) { n = 2; }", "n"),
        num(1.0)
    );
}
