//! Policy layering as seen from the session crate.

use std::env;

use pagepilot::load_agent_policy;
use serial_test::serial;

#[test]
#[serial]
fn file_then_env_then_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pagepilot.yaml");
    std::fs::write(
        &path,
        "filter:\n  max_elements: 12\nexecutor:\n  wait_timeout_ms: 2000\n",
    )
    .expect("write policy");

    env::set_var("PAGEPILOT__EXECUTOR__WAIT_TIMEOUT_MS", "3000");
    let policy = load_agent_policy(Some(&path), &["executor.allow_evaluate=false".to_string()]);
    env::remove_var("PAGEPILOT__EXECUTOR__WAIT_TIMEOUT_MS");

    let policy = policy.expect("policy loads");
    assert_eq!(policy.filter.max_elements, 12);
    assert_eq!(policy.executor.wait_timeout_ms, 3000);
    assert!(!policy.executor.allow_evaluate);
}

#[test]
#[serial]
fn malformed_override_is_rejected() {
    let err = load_agent_policy(None, &["filter.max_elements".to_string()])
        .expect_err("override without a value");
    assert!(err.severity() > 0);
}
