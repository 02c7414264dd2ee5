use super::*;

fn rule() -> PrefixRule {
    PrefixRule::new(r"^TESTRUN : ", "on_testrun").expect("valid pattern")
}

#[test]
fn rejects_empty_service() {
    let err = LogDetail::new("", "/tmp/a.log", false, vec![rule()], 1.0, false).unwrap_err();
    assert!(matches!(err, LogDetailError::EmptyService));
}

#[test]
fn rejects_no_prefix_rules() {
    let err = LogDetail::new("svc", "/tmp/a.log", false, vec![], 1.0, false).unwrap_err();
    assert!(matches!(err, LogDetailError::NoPrefixRules));
}

#[yare::parameterized(
    zero = { 0.0 },
    negative = { -1.0 },
)]
fn rejects_non_positive_poll_timeout(timeout: f64) {
    let err = LogDetail::new("svc", "/tmp/a.log", false, vec![rule()], timeout, false).unwrap_err();
    assert!(matches!(err, LogDetailError::InvalidPollTimeout(_)));
}

#[test]
fn rejects_uncompilable_prefix_pattern() {
    let err = PrefixRule::new("(unclosed", "handler").unwrap_err();
    assert!(matches!(err, LogDetailError::InvalidPattern { .. }));
}

#[test]
fn accepts_valid_descriptor_and_preserves_rule_order() {
    let first = PrefixRule::new("^A", "handle_a").unwrap();
    let second = PrefixRule::new("^B", "handle_b").unwrap();
    let detail = LogDetail::new("svc", "/tmp/a.log", false, vec![first, second], 2.0, true).unwrap();

    assert_eq!(detail.prefix_rules().len(), 2);
    assert_eq!(detail.prefix_rules()[0].callable_name(), "handle_a");
    assert_eq!(detail.prefix_rules()[1].callable_name(), "handle_b");
    assert!(detail.critical);
    assert!(!detail.is_running);
}

#[test]
fn with_expanded_path_clears_the_glob_flag() {
    let detail = LogDetail::new("svc", "/tmp/*.log", true, vec![rule()], 1.0, false).unwrap();
    let expanded = detail.with_expanded_path("/tmp/a.log");

    assert_eq!(expanded.log_file_path, "/tmp/a.log");
    assert!(!expanded.log_file_path_is_regex);
    assert_eq!(expanded.service, "svc");
}

#[test]
fn config_deserializes_and_converts_to_log_detail() {
    let toml_src = r#"
        service = "svc"
        log_file_path = "/tmp/a.log"
        poll_timeout_seconds = 1.5

        [[prefixes]]
        pattern = "^TESTRUN : "
        callable_name = "on_testrun"
        timestamp_pattern = "(\\d{4}-\\d{2}-\\d{2})"
    "#;

    let config: LogDetailConfig = toml::from_str(toml_src).expect("valid toml");
    let detail = config.into_log_detail().expect("valid descriptor");

    assert_eq!(detail.service, "svc");
    assert_eq!(detail.prefix_rules()[0].callable_name(), "on_testrun");
    assert!(detail.prefix_rules()[0].timestamp_pattern().is_some());
}
