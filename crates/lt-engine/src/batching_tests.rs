use super::*;
use chrono::Utc;
use lt_adapters::FakeSinkAdapter;
use lt_core::BatchRecordId;

fn sample(id: &str) -> BatchRecord {
    BatchRecord::new(BatchRecordId::new(id), "do_work", Utc::now(), 12.5)
}

fn handler(
    sink: Arc<FakeSinkAdapter>,
    count_trigger: usize,
    time_trigger: Duration,
    backoff: Duration,
) -> (BatchingHandler, mpsc::UnboundedReceiver<Vec<BatchRecord>>) {
    let queue = BatchQueue::new();
    let (tx, rx) = mpsc::unbounded_channel();
    (
        BatchingHandler::new(queue, sink, count_trigger, time_trigger, backoff, tx),
        rx,
    )
}

#[tokio::test(start_paused = true)]
async fn count_trigger_delivers_once_full() {
    let sink = Arc::new(FakeSinkAdapter::new());
    let (h, _rx) = handler(sink.clone(), 3, Duration::from_secs(60), Duration::from_secs(300));
    h.queue().push_back(sample("a"));
    h.queue().push_back(sample("b"));
    h.queue().push_back(sample("c"));

    let mut pending = Vec::new();
    let mut outcome = BatchOutcome::Pending;
    for _ in 0..3 {
        outcome = h.run_once(&mut pending).await;
        if outcome != BatchOutcome::Pending {
            break;
        }
    }
    assert_eq!(outcome, BatchOutcome::Delivered { count: 3 });
    assert_eq!(sink.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn time_trigger_delivers_a_partial_batch() {
    let sink = Arc::new(FakeSinkAdapter::new());
    let (h, _rx) = handler(sink.clone(), 5, Duration::from_secs(2), Duration::from_secs(300));
    h.queue().push_back(sample("a"));

    let mut pending = Vec::new();
    // First cycle picks up the record but stays under count_trigger.
    assert_eq!(h.run_once(&mut pending).await, BatchOutcome::Pending);
    assert_eq!(pending.len(), 1);

    tokio::time::advance(Duration::from_secs(3)).await;
    let outcome = h.run_once(&mut pending).await;
    assert_eq!(outcome, BatchOutcome::Delivered { count: 1 });
}

#[tokio::test(start_paused = true)]
async fn partial_miss_requeues_survivors_and_reports_the_rest() {
    let sink = Arc::new(FakeSinkAdapter::new());
    sink.push_result(Err(lt_adapters::SinkError::PartialMiss(vec!["b".to_string()])));
    let (h, mut rx) = handler(sink.clone(), 2, Duration::from_secs(60), Duration::from_secs(300));
    h.queue().push_back(sample("a"));
    h.queue().push_back(sample("b"));

    let mut pending = Vec::new();
    let outcome = h.run_once(&mut pending).await;
    assert_eq!(outcome, BatchOutcome::PartialMiss { delivered: 1, errored: 1 });

    let errored = rx.try_recv().unwrap();
    assert_eq!(errored.len(), 1);
    assert_eq!(errored[0].id.as_str(), "b");
    assert_eq!(h.queue().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn connection_refused_backs_off_and_drops_without_error_callback() {
    let sink = Arc::new(FakeSinkAdapter::new());
    sink.push_result(Err(lt_adapters::SinkError::ConnectionRefused));
    let (h, mut rx) = handler(sink.clone(), 1, Duration::from_secs(60), Duration::from_secs(2));
    h.queue().push_back(sample("a"));

    let mut pending = Vec::new();
    let outcome = h.run_once(&mut pending).await;
    assert_eq!(outcome, BatchOutcome::ConnectionRefused { dropped: 1 });
    assert!(rx.try_recv().is_err());
    assert_eq!(h.queue().len(), 0);
}

#[tokio::test(start_paused = true)]
async fn other_failure_routes_the_whole_batch_to_error_callback() {
    let sink = Arc::new(FakeSinkAdapter::new());
    sink.push_result(Err(lt_adapters::SinkError::Other("boom".to_string())));
    let (h, mut rx) = handler(sink.clone(), 1, Duration::from_secs(60), Duration::from_secs(300));
    h.queue().push_back(sample("a"));

    let mut pending = Vec::new();
    let outcome = h.run_once(&mut pending).await;
    assert_eq!(outcome, BatchOutcome::Other { errored: 1 });
    let errored = rx.try_recv().unwrap();
    assert_eq!(errored.len(), 1);
}
