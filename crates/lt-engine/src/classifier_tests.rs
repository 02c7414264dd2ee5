use super::*;
use lt_core::PrefixRule;

fn detail_with_rule(rule: PrefixRule) -> LogDetail {
    LogDetail::new("svc", "/var/log/svc/app.log", false, vec![rule], 5.0, false).unwrap()
}

#[test]
fn no_match_when_prefix_absent() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error").unwrap();
    let detail = detail_with_rule(rule.clone());
    let outcome = classify_line("INFO: all fine", &rule, &detail);
    assert!(matches!(outcome, ClassifyOutcome::NoMatch));
}

#[test]
fn extracts_prefix_and_trimmed_body() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error").unwrap();
    let detail = detail_with_rule(rule.clone());
    match classify_line("ERROR:   disk full", &rule, &detail) {
        ClassifyOutcome::Matched { event, truncated } => {
            assert_eq!(event.log_prefix, "ERROR:");
            assert_eq!(event.log_message, "disk full");
            assert!(!truncated);
        }
        ClassifyOutcome::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn extracts_timestamp_when_pattern_matches() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error")
        .unwrap()
        .with_timestamp_pattern(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z)")
        .unwrap();
    let detail = detail_with_rule(rule.clone());
    let line = "2026-08-01T12:00:00Z ERROR: disk full";
    match classify_line(line, &rule, &detail) {
        ClassifyOutcome::Matched { event, .. } => {
            assert!(event.log_timestamp.is_some());
        }
        ClassifyOutcome::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn leaves_timestamp_empty_on_parse_failure() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error")
        .unwrap()
        .with_timestamp_pattern(r"TS=(\S+)")
        .unwrap();
    let detail = detail_with_rule(rule.clone());
    let line = "TS=not-a-date ERROR: disk full";
    match classify_line(line, &rule, &detail) {
        ClassifyOutcome::Matched { event, .. } => {
            assert!(event.log_timestamp.is_none());
        }
        ClassifyOutcome::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn extracts_source_file_basename_and_line() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error")
        .unwrap()
        .with_source_pattern(r"(/[\w/]+\.py):(\d+)")
        .unwrap();
    let detail = detail_with_rule(rule.clone());
    let line = "ERROR: boom at /opt/app/handlers/worker.py:42";
    match classify_line(line, &rule, &detail) {
        ClassifyOutcome::Matched { event, .. } => {
            assert_eq!(event.source_file.as_deref(), Some("worker.py"));
            assert_eq!(event.source_line_number, Some(42));
        }
        ClassifyOutcome::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn brief_at_the_limit_is_not_truncated() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error").unwrap();
    let detail = detail_with_rule(rule.clone());
    let body = "x".repeat(MAX_BRIEF_BYTES);
    let line = format!("ERROR: {body}");
    match classify_line(&line, &rule, &detail) {
        ClassifyOutcome::Matched { truncated, .. } => assert!(!truncated),
        ClassifyOutcome::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn brief_over_the_limit_is_truncated() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error").unwrap();
    let detail = detail_with_rule(rule.clone());
    let body = "x".repeat(MAX_BRIEF_BYTES + 1);
    let line = format!("ERROR: {body}");
    match classify_line(&line, &rule, &detail) {
        ClassifyOutcome::Matched { event, truncated } => {
            assert!(truncated);
            // The oversize notification fires, but the full body still
            // reaches the handler untouched.
            assert_eq!(event.log_message.len(), body.len());
        }
        ClassifyOutcome::NoMatch => panic!("expected a match"),
    }
}

#[test]
fn size_policy_applies_to_brief_not_whole_body() {
    let rule = PrefixRule::new(r"^ERROR:", "on_error").unwrap();
    let detail = detail_with_rule(rule.clone());
    let detail_half = "x".repeat(MAX_BRIEF_BYTES * 2);
    let line = format!("ERROR: short;;;{detail_half}");
    match classify_line(&line, &rule, &detail) {
        ClassifyOutcome::Matched { event, truncated } => {
            assert!(!truncated, "a short brief must not be truncated because of a long detail");
            assert_eq!(event.log_message, format!("short;;;{detail_half}"));
        }
        ClassifyOutcome::NoMatch => panic!("expected a match"),
    }
}
