use crate::apply::apply_override;
use crate::defaults::default_policy;
use crate::errors::PolicyError;
use crate::loader::{load_policy, load_policy_with_options, parse_env_value, LoadOptions};
use crate::model::PolicySource;
use serial_test::serial;
use std::env;

#[test]
fn default_policy_has_documented_values() {
    let policy = default_policy();
    assert_eq!(policy.filter.max_elements, 30);
    assert_eq!(policy.filter.priorities.form, 10);
    assert_eq!(policy.filter.viewport.hidden, 0);
    assert_eq!(policy.executor.batch_delay_ms, 100);
    assert_eq!(policy.executor.scroll_fraction, 0.8);
    assert_eq!(policy.locator.valid_confidence, 50);
    assert!(policy.validate().is_ok());
}

#[test]
#[serial]
fn load_policy_applies_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("pagepilot.yaml");
    std::fs::write(
        &file_path,
        r##"filter:
  max_elements: 12
  stop_words: [please, kindly]
  priorities:
    link: 5
executor:
  highlight_color: "#ff0000"
  allow_evaluate: false
regions:
  header_max_y: 120
"##,
    )
    .unwrap();

    let policy = load_policy(Some(&file_path)).unwrap();
    assert_eq!(policy.filter.max_elements, 12);
    assert_eq!(policy.filter.stop_words, vec!["please", "kindly"]);
    assert_eq!(policy.filter.priorities.link, 5);
    assert_eq!(policy.executor.highlight_color, "#ff0000");
    assert!(!policy.executor.allow_evaluate);
    assert_eq!(policy.regions.header_max_y, 120.0);
    assert_eq!(policy.source_of("filter.max_elements"), Some(PolicySource::File));
    assert_eq!(policy.source_of("filter.keyword_weight"), Some(PolicySource::Builtin));
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let policy = load_policy_with_options(&LoadOptions {
        paths: vec![dir.path().join("absent.yaml")],
        include_env: false,
        cli_overrides: Vec::new(),
    })
    .unwrap();
    assert_eq!(policy, {
        let mut expected = default_policy();
        expected.provenance = policy.provenance.clone();
        expected
    });
}

#[test]
#[serial]
fn env_overlay_wins_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("pagepilot.yaml");
    std::fs::write(&file_path, "executor:\n  wait_timeout_ms: 2000\n").unwrap();

    let key = "PAGEPILOT__EXECUTOR__WAIT_TIMEOUT_MS";
    env::set_var(key, "750");
    let policy = load_policy(Some(&file_path));
    env::remove_var(key);

    let policy = policy.expect("load policy");
    assert_eq!(policy.executor.wait_timeout_ms, 750);
    assert_eq!(
        policy.source_of("executor.wait_timeout_ms"),
        Some(PolicySource::Env)
    );
}

#[test]
#[serial]
fn json_override_env_is_flattened() {
    env::set_var(
        "PAGEPILOT_OVERRIDE_JSON",
        r#"{"locator": {"valid_confidence": 70, "proximity_px": 25.5}}"#,
    );
    let policy = load_policy(None);
    env::remove_var("PAGEPILOT_OVERRIDE_JSON");

    let policy = policy.expect("load policy");
    assert_eq!(policy.locator.valid_confidence, 70);
    assert_eq!(policy.locator.proximity_px, 25.5);
}

#[test]
#[serial]
fn cli_overrides_are_applied_last() {
    env::set_var("PAGEPILOT__FILTER__MAX_ELEMENTS", "5");
    let policy = load_policy_with_options(&LoadOptions {
        paths: Vec::new(),
        include_env: true,
        cli_overrides: vec![
            "filter.max_elements=8".into(),
            "filter.stop_words=foo, bar".into(),
        ],
    });
    env::remove_var("PAGEPILOT__FILTER__MAX_ELEMENTS");

    let policy = policy.expect("load policy");
    assert_eq!(policy.filter.max_elements, 8);
    assert_eq!(policy.filter.stop_words, vec!["foo", "bar"]);
    assert_eq!(policy.source_of("filter.max_elements"), Some(PolicySource::Cli));
}

#[test]
fn unknown_path_and_bad_value_are_rejected() {
    let mut policy = default_policy();
    assert!(matches!(
        apply_override(
            &mut policy,
            "filter.nope",
            &serde_json::json!(1),
            PolicySource::Cli
        ),
        Err(PolicyError::UnsupportedPath(_))
    ));
    assert!(matches!(
        apply_override(
            &mut policy,
            "executor.drag_steps",
            &serde_json::json!("many"),
            PolicySource::Cli
        ),
        Err(PolicyError::InvalidValue(_))
    ));
    assert!(matches!(
        apply_override(
            &mut policy,
            "locator.valid_confidence",
            &serde_json::json!(300),
            PolicySource::Cli
        ),
        Err(PolicyError::InvalidValue(_))
    ));
}

#[test]
fn validation_rejects_unusable_values() {
    let mut policy = default_policy();
    policy.executor.scroll_fraction = 1.5;
    assert!(matches!(policy.validate(), Err(PolicyError::Invalid(_))));

    let mut policy = default_policy();
    policy.filter.max_elements = 0;
    assert!(policy.validate().is_err());
}

#[test]
fn env_values_parse_by_shape() {
    assert_eq!(parse_env_value("true"), serde_json::json!(true));
    assert_eq!(parse_env_value("42"), serde_json::json!(42));
    assert_eq!(parse_env_value("0.5"), serde_json::json!(0.5));
    assert_eq!(parse_env_value("#1a73e8"), serde_json::json!("#1a73e8"));
    assert_eq!(parse_env_value(""), serde_json::Value::Null);
}
