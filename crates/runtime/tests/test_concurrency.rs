//! Spawned tasks: work, co, bkg, wait and proq
//!
//! Programs that need a particular interleaving synchronize through queues,
//! so every assertion here is deterministic.

mod common;

use blacklight_runtime::{
    FailureCause, MemoryLoader, NoLoader, Runtime, RuntimeConfig, RuntimeError, Value,
};
use common::{numbers, ops, run};

#[test]
fn test_work_pipeline_adds_one() {
    let rt = Runtime::default();
    // worker: [out in] -> read in, add 1, write out
    let out = run(
        &rt,
        "newq newq [ deq 1 add rot swap enq ] work 5 enq swap deq swap drop swap drop",
    );
    assert_eq!(out, numbers(&[6]));
    assert!(rt.wait_all().is_empty());
}

#[test]
fn test_work_handles_many_items() {
    let rt = Runtime::default();
    let worker = "[ [ deq 10 mul rot swap enq swap ] loop ]";
    let src = format!(
        "newq newq {} work 1 enq 2 enq 3 enq swap deq swap deq swap deq",
        worker
    );
    let out = run(&rt, &src);
    // results come back interleaved with the out queue
    let results: Vec<Value> = out
        .into_iter()
        .filter(|v| matches!(v, Value::Number(_)))
        .collect();
    assert_eq!(results, numbers(&[10, 20, 30]));
}

#[test]
fn test_co_round_trip_doubles() {
    let loader =
        MemoryLoader::new().with_unit("double.bl", ops("swap deq 2 mul rot swap enq"));
    let rt = Runtime::new(RuntimeConfig::default(), loader);
    let out = run(&rt, r#""double.bl" co 3 enq swap deq"#);
    assert_eq!(out.len(), 3);
    assert!(matches!(out[0], Value::Queue(_)));
    assert!(matches!(out[1], Value::Queue(_)));
    assert_eq!(out[2], Value::Number(6));
    assert!(rt.wait_all().is_empty());
}

#[test]
fn test_bkg_runs_on_seed_and_returns_nothing() {
    let rt = Runtime::default();
    let out = run(&rt, "newq dup [ 42 enq ] bkg deq wait");
    assert_eq!(out.len(), 2);
    assert_eq!(out[1], Value::Number(42));
    assert_eq!(rt.stats().active, 0);
}

#[test]
fn test_wait_joins_every_task() {
    let rt = Runtime::default();
    let meta = rt
        .run(&ops(
            "newq 1 [ drop ] bkg 2 [ drop ] bkg 3 [ drop ] bkg 4 [ drop ] bkg wait",
        ))
        .unwrap();
    let stats = rt.stats();
    assert_eq!(stats.active, 0);
    assert_eq!(stats.spawned, 4);
    assert_eq!(stats.completed, 4);
    assert_eq!(meta.current().unwrap().depth(), 1);
}

#[test]
fn test_wait_inside_task_joins_its_children() {
    let rt = Runtime::default();
    // the outer task waits for its child before writing 6, so 5 comes first
    let out = run(&rt, "newq dup [ dup [ 5 enq ] bkg wait 6 enq ] bkg deq swap deq");
    assert_eq!(out[0], Value::Number(5));
    assert_eq!(out[2], Value::Number(6));
    assert!(rt.wait_all().is_empty());
}

#[test]
fn test_background_failure_is_reported_not_raised() {
    let rt = Runtime::default();
    let out = run(&rt, "1 [ drop drop ] bkg 7");
    assert_eq!(out, numbers(&[7]));

    let failures = rt.wait_all();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "bkg");
    assert!(matches!(
        failures[0].cause,
        FailureCause::Error(RuntimeError::StackUnderflow { needed: 1, depth: 0 })
    ));
    assert!(failures[0].to_string().contains("bkg"));
    assert_eq!(rt.stats().failed, 1);
}

#[test]
fn test_failure_does_not_stop_siblings() {
    let rt = Runtime::default();
    let out = run(&rt, "newq dup [ add ] bkg dup [ 1 enq ] bkg deq");
    assert_eq!(out.last(), Some(&Value::Number(1)));
    let failures = rt.wait_all();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0].cause,
        FailureCause::Error(RuntimeError::TypeMismatch { op: "add", .. })
    ));
}

#[test]
fn test_proq_processes_only_available_items() {
    let rt = Runtime::default();
    let out = run(&rt, "0 newq 1 enq 2 enq 3 enq [ add ] proq");
    assert_eq!(out, numbers(&[6]));

    // nothing queued: the block never runs
    let out = run(&rt, "0 newq [ add ] proq");
    assert_eq!(out, numbers(&[0]));
}

#[test]
fn test_proq_after_worker_finishes() {
    let rt = Runtime::default();
    let out = run(
        &rt,
        "newq dup [ 1 enq 2 enq 3 enq ] bkg wait 0 swap [ add ] proq",
    );
    assert_eq!(out, numbers(&[6]));
}

#[test]
fn test_root_queue_capacity_from_config() {
    let config = RuntimeConfig {
        queue_capacity: 2,
        ..RuntimeConfig::default()
    };
    let rt = Runtime::new(config, NoLoader);
    // a producer that outruns the capacity blocks until the root drains it
    let out = run(
        &rt,
        "newq dup [ 1 enq 2 enq 3 enq 4 enq ] bkg deq swap deq swap deq swap deq",
    );
    let got: Vec<Value> = out
        .into_iter()
        .filter(|v| matches!(v, Value::Number(_)))
        .collect();
    assert_eq!(got, numbers(&[1, 2, 3, 4]));
    assert!(rt.wait_all().is_empty());
}

#[test]
fn test_root_wait_joins_task_blocked_in_wait() {
    let rt = Runtime::default();
    // the outer task is still counting down after its own wait returns
    let src = "newq dup [ dup [ 5 enq ] bkg wait 2000 [ 1 sub ] [ 0 eq ] until drop 6 enq ] bkg wait q-to-v";
    for _ in 0..20 {
        let out = run(&rt, src);
        assert_eq!(out, vec![Value::vector(numbers(&[5, 6]))]);
        assert_eq!(rt.stats().active, 0);
    }
    assert!(rt.wait_all().is_empty());
}

#[test]
fn test_language_wait_leaves_failures_for_host() {
    let rt = Runtime::default();
    let out = run(&rt, "1 [ drop drop ] bkg wait 7");
    assert_eq!(out, numbers(&[7]));
    let failures = rt.wait_all();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "bkg");
}
