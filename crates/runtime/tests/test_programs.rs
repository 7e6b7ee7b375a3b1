//! End-to-end programs on a single task
//!
//! Each test runs a small program through `Runtime::run` and inspects the
//! Stack it leaves behind.

mod common;

use blacklight_runtime::{MemoryLoader, Runtime, RuntimeConfig, RuntimeError, Value, dispatch};
use common::{numbers, ops, run};

#[test]
fn test_lifo_and_depth() {
    let rt = Runtime::default();
    assert_eq!(run(&rt, "1 2 3 4 5 drop drop"), numbers(&[1, 2, 3]));
    assert_eq!(run(&rt, "1 2 3 depth"), numbers(&[1, 2, 3, 3]));
    assert_eq!(run(&rt, "depth"), numbers(&[0]));
}

#[test]
fn test_shuffles() {
    let rt = Runtime::default();
    assert_eq!(run(&rt, "1 2 3 rot"), numbers(&[2, 3, 1]));
    assert_eq!(run(&rt, "1 2 over"), numbers(&[1, 2, 1]));
    assert_eq!(run(&rt, "1 2 swap dup"), numbers(&[2, 1, 1]));
    assert_eq!(run(&rt, "1 2 3 decap"), numbers(&[2, 3]));
    assert_eq!(run(&rt, "1 2 3 purge"), numbers(&[]));
}

#[test]
fn test_add_sub_round_trip() {
    let rt = Runtime::default();
    for (a, b) in [(10, 3), (-4, 9), (0, 0), (i64::MAX, 1)] {
        let src = format!("{} {} add {} sub", a, b, b);
        assert_eq!(run(&rt, &src), numbers(&[a]));
    }
}

#[test]
fn test_cat_associativity() {
    let rt = Runtime::default();
    let left = run(&rt, r#""ab" "cd" cat "ef" cat"#);
    let right = run(&rt, r#""ab" "cd" "ef" cat cat"#);
    assert_eq!(left, right);
    assert_eq!(left, vec![Value::text("abcdef")]);

    let left = run(&rt, "() 1 app () 2 app cat () 3 app cat");
    let right = run(&rt, "() 1 app () 2 app () 3 app cat cat");
    assert_eq!(left, right);
    assert_eq!(left, vec![Value::vector(numbers(&[1, 2, 3]))]);
}

#[test]
fn test_conversions() {
    let rt = Runtime::default();
    assert_eq!(
        run(&rt, "104 n-to-c c-to-cv 105 n-to-c app"),
        vec![Value::text("hi")]
    );
    assert_eq!(run(&rt, "-12 n-to-cv"), vec![Value::text("-12")]);
    assert_eq!(run(&rt, "'A' c-to-n"), numbers(&[65]));
    assert_eq!(run(&rt, "''"), vec![Value::text("")]);
}

#[test]
fn test_vector_access_keeps_receiver() {
    let rt = Runtime::default();
    let out = run(&rt, "v-new 10 app 20 app 30 app 1 ato swap len");
    assert_eq!(
        out,
        vec![
            Value::Number(20),
            Value::vector(numbers(&[10, 20, 30])),
            Value::Number(3),
        ]
    );

    let err = rt.run(&ops("() 1 app 5 ato")).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::IndexOutOfRange {
            op: "ato",
            index: 5,
            len: 1
        }
    );
}

#[test]
fn test_object_delegation_and_shadowing() {
    let rt = Runtime::default();
    let out = run(
        &rt,
        "o-new 1 :x set child :x fetch swap 2 :x set :x fetch swap drop rot :x fetch",
    );
    // inherited 1, shadowed 2, parent still 1
    assert_eq!(out[0], Value::Number(1));
    assert_eq!(out[1], Value::Number(2));
    assert!(matches!(out[2], Value::Object(_)));
    assert_eq!(out[3], Value::Number(1));
}

#[test]
fn test_missing_slot_is_an_error() {
    let rt = Runtime::default();
    assert_eq!(
        rt.run(&ops("o-new child :nope fetch")).unwrap_err(),
        RuntimeError::SlotNotFound("nope".into())
    );
}

#[test]
fn test_queue_fifo() {
    let rt = Runtime::default();
    assert_eq!(
        run(&rt, "newq 1 enq 2 enq 3 enq q-to-v"),
        vec![Value::vector(numbers(&[1, 2, 3]))]
    );
    let out = run(&rt, "newq 1 enq 2 enq deq swap deq swap drop");
    assert_eq!(out, numbers(&[1, 2]));
}

#[test]
fn test_eq_and_not() {
    let rt = Runtime::default();
    let out = run(&rt, "5 5 eq not");
    assert_eq!(out.len(), 2);
    assert!(out[1].is_nil());

    let out = run(&rt, r#""a" "b" eq"#);
    assert_eq!(out[0], Value::text("a"));
    assert!(out[1].is_nil());
}

#[test]
fn test_until_runs_action_exactly_three_times() {
    let rt = Runtime::default();
    // [actions counter] -- the action bumps actions and counts down
    let out = run(&rt, "0 3 [ swap 1 add swap 1 sub ] [ 0 eq ] until");
    assert_eq!(out, numbers(&[3, 0]));
}

#[test]
fn test_if_and_either() {
    let rt = Runtime::default();
    assert_eq!(run(&rt, "[ 1 ] [ true ] if"), numbers(&[1]));
    assert_eq!(run(&rt, "[ 1 ] [ nil ] if"), numbers(&[]));
    assert_eq!(run(&rt, "7 [ 1 ] [ 2 ] [ 7 eq swap drop ] either"), numbers(&[1]));
    assert_eq!(run(&rt, "8 [ 1 ] [ 2 ] [ 7 eq swap drop ] either"), numbers(&[2]));
}

#[test]
fn test_loop_ends_with_error() {
    let rt = Runtime::default();
    let err = rt.run(&ops("1 2 3 [ drop ] loop")).unwrap_err();
    assert!(matches!(err, RuntimeError::StackUnderflow { .. }));
}

#[test]
fn test_unimplemented_operation_continues() {
    let rt = Runtime::default();
    assert_eq!(run(&rt, "1 frobnicate 2"), numbers(&[1, 2]));
}

#[test]
fn test_type_mismatch_reports_operation_and_kind() {
    let rt = Runtime::default();
    assert_eq!(
        rt.run(&ops(r#"1 "x" add"#)).unwrap_err(),
        RuntimeError::TypeMismatch {
            op: "add",
            expected: "Number",
            found: "CharVector"
        }
    );
}

#[test]
fn test_context_switching() {
    let rt = Runtime::default();
    // push 7 from a child context onto the root Stack, then return to it
    assert_eq!(run(&rt, "$new 7 push $drop"), numbers(&[7]));

    let meta = rt.run(&ops("$new ^ @")).unwrap();
    assert_eq!(meta.depth(), 2);
    let child = meta.current().unwrap();
    assert_eq!(child.depth(), 3);
    let itself = child.pop().unwrap().into_stack("test").unwrap();
    assert!(itself.ptr_eq(&child));
}

#[test]
fn test_user_stacks() {
    let rt = Runtime::default();
    let out = run(&rt, "news 1 push 2 push size swap pop swap tail size");
    assert_eq!(out[0], Value::Number(2));
    assert_eq!(out[1], Value::Number(2));
    assert_eq!(out[3], Value::Number(0));
}

#[test]
fn test_self_and_get() {
    let rt = Runtime::default();
    let out = run(&rt, "o-new [ self ] :me set 9 :n set :me get :n get");
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], out[1]);
    assert_eq!(out[2], Value::Number(9));
}

#[test]
fn test_call_and_do() {
    let loader = MemoryLoader::new().with_unit("inc.bl", ops("1 add"));
    let rt = Runtime::new(RuntimeConfig::default(), loader);
    assert_eq!(run(&rt, r#"4 "inc.bl" do"#), numbers(&[5]));
    assert_eq!(run(&rt, "4 [ 2 mul ] call"), numbers(&[8]));
    assert!(matches!(
        rt.run(&ops(r#""nope.bl" do"#)),
        Err(RuntimeError::Load { .. })
    ));
}

#[test]
fn test_run_program() {
    let loader = MemoryLoader::new().with_unit("main.bl", ops("6 7 mul"));
    let rt = Runtime::new(RuntimeConfig::default(), loader);
    let meta = rt.run_program("main.bl").unwrap();
    assert_eq!(meta.current().unwrap().snapshot(), numbers(&[42]));
}

#[test]
fn test_vocabulary_is_dispatchable() {
    for name in dispatch::vocabulary() {
        assert!(dispatch::is_primitive(name) || dispatch::is_meta(name));
    }
    assert!(dispatch::vocabulary().any(|n| n == "q-to-cv"));
    assert!(dispatch::vocabulary().any(|n| n == "proq"));
}
