use super::*;
use crate::notify::FakeNotifyAdapter;
use crate::sink::FakeSinkAdapter;
use chrono::Utc;
use lt_core::BatchRecordId;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}");
}

#[test]
#[serial(tracing)]
fn traced_notify_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeNotifyAdapter::new();
        let traced = TracedNotify::new(fake);
        traced.notify("Critical", "no activity").await
    });

    assert!(result.is_ok());
    assert_log(&logs, "span name", "notify.send");
    assert_log(&logs, "title", "Critical");
    assert_log(&logs, "entry", "starting");
    assert_log(&logs, "completion", "notification sent");
    assert_log(&logs, "timing", "elapsed_ms");
}

#[tokio::test]
async fn traced_notify_delegates_to_inner() {
    let fake = FakeNotifyAdapter::new();
    let traced = TracedNotify::new(fake.clone());

    traced.notify("t", "m").await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "t");
}

#[test]
#[serial(tracing)]
fn traced_sink_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeSinkAdapter::new();
        let traced = TracedSink::new(fake);
        let record = BatchRecord::new(BatchRecordId::new("r-1"), "on_perf", Utc::now(), 5.0);
        traced.send_batch(&[record]).await
    });

    assert!(result.is_ok());
    assert_log(&logs, "span name", "sink.send_batch");
    assert_log(&logs, "entry", "starting");
    assert_log(&logs, "completion", "batch delivered");
}

#[tokio::test]
async fn traced_sink_logs_error_on_failure() {
    let fake = FakeSinkAdapter::new();
    fake.push_result(Err(crate::sink::SinkError::ConnectionRefused));
    let traced = TracedSink::new(fake);

    let record = BatchRecord::new(BatchRecordId::new("r-1"), "on_perf", Utc::now(), 5.0);
    let result = traced.send_batch(&[record]).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn traced_sink_delegates_to_inner() {
    let fake = FakeSinkAdapter::new();
    let traced = TracedSink::new(fake.clone());

    let record = BatchRecord::new(BatchRecordId::new("r-1"), "on_perf", Utc::now(), 5.0);
    traced.send_batch(&[record]).await.unwrap();

    assert_eq!(fake.calls().len(), 1);
}
