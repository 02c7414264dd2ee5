use super::*;

fn executor_id() -> ExecutorId {
    ExecutorId::new("svc~a.log")
}

#[test]
fn brief_detail_splits_on_separator() {
    let event = Event::new(executor_id(), "PREFIX: ", "short;;;long detail here");
    assert_eq!(event.brief_detail(), ("short", Some("long detail here")));
}

#[test]
fn brief_detail_without_separator_is_whole_message() {
    let event = Event::new(executor_id(), "PREFIX: ", "just a brief");
    assert_eq!(event.brief_detail(), ("just a brief", None));
}

#[test]
fn with_timestamp_and_source_set_optional_fields() {
    let ts = Utc::now();
    let event = Event::new(executor_id(), "P: ", "m")
        .with_timestamp(ts)
        .with_source("mod.py", 42);

    assert_eq!(event.log_timestamp, Some(ts));
    assert_eq!(event.source_file.as_deref(), Some("mod.py"));
    assert_eq!(event.source_line_number, Some(42));
}
