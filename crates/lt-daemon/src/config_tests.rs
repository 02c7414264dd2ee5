use super::*;

fn minimal_toml() -> String {
    r#"
regex_file_name = "suppress.re"
regex_lock_file_name = "suppress.lock"
transaction_counts_per_call_for_server = 100
transaction_counts_per_call_for_tail_ex = 20
transaction_timeout_secs = 2
sink_endpoint = "http://localhost:9000/ingest"

[[log_detail]]
service = "api"
log_file_path = "/var/log/api.log"
poll_timeout_seconds = 1.0

[[log_detail.prefixes]]
pattern = "^ERROR"
callable_name = "report_error"
"#
    .to_string()
}

#[test]
fn loads_minimal_config() {
    let parsed: ConfigToml = toml::from_str(&minimal_toml()).unwrap();
    let state_dir = std::path::PathBuf::from("/tmp/lt-state");
    let config = Config::from_toml(parsed, state_dir.clone()).unwrap();

    assert_eq!(config.log_details.len(), 1);
    assert_eq!(config.log_details[0].service, "api");
    assert_eq!(config.count_trigger, 20);
    assert_eq!(config.time_trigger, Duration::from_secs(2));
    assert_eq!(config.performance_callable_name, "report_performance");
    assert_eq!(config.regex_path, state_dir.join("suppress.re"));
    assert!(config.connection_refused_backoff.is_none());
}

#[test]
fn rejects_empty_log_details() {
    let mut parsed: ConfigToml = toml::from_str(&minimal_toml()).unwrap();
    parsed.log_details.clear();

    let err = Config::from_toml(parsed, std::path::PathBuf::from("/tmp")).unwrap_err();
    assert!(matches!(err, ConfigError::NoLogDetails));
}

#[test]
fn rejects_zero_connection_retry() {
    let mut toml_str = minimal_toml();
    toml_str.push_str("client_connection_fail_retry_secs = 0\n");
    let parsed: ConfigToml = toml::from_str(&toml_str).unwrap();

    let err = Config::from_toml(parsed, std::path::PathBuf::from("/tmp")).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroConnectionRetry));
}

#[test]
fn rejects_empty_sink_endpoint() {
    let mut parsed: ConfigToml = toml::from_str(&minimal_toml()).unwrap();
    parsed.sink_endpoint = "   ".to_string();

    let err = Config::from_toml(parsed, std::path::PathBuf::from("/tmp")).unwrap_err();
    assert!(matches!(err, ConfigError::EmptySinkEndpoint));
}

#[test]
fn custom_regex_dir_overrides_state_dir() {
    let mut toml_str = minimal_toml();
    toml_str.push_str("regex_file_dir_path = \"/etc/lt/regex\"\n");
    let parsed: ConfigToml = toml::from_str(&toml_str).unwrap();

    let config = Config::from_toml(parsed, std::path::PathBuf::from("/tmp/lt-state")).unwrap();
    assert_eq!(config.regex_path, std::path::PathBuf::from("/etc/lt/regex/suppress.re"));
}
