use super::*;
use lt_core::PrefixRule;
use lt_engine::FakeHooks;
use tempfile::tempdir;
use tokio::time::Duration as TokioDuration;

fn literal_detail(path: &str, service: &str) -> LogDetail {
    let rule = PrefixRule::new("^ERROR", "report_error").unwrap();
    LogDetail::new(service, path, false, vec![rule], 1.0, true).unwrap()
}

fn watcher_with(hooks: Arc<dyn TailHooks>) -> Watcher {
    let suppression = SuppressionStore::new("/dev/null", "/dev/null");
    Watcher::new(hooks, HashMap::new(), suppression, Utc::now())
}

#[tokio::test]
async fn spawns_one_executor_per_existing_literal_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("svc.log");
    std::fs::write(&path, "").unwrap();

    let hooks: Arc<dyn TailHooks> = Arc::new(FakeHooks::new());
    let watcher = watcher_with(hooks);
    let detail = literal_detail(path.to_str().unwrap(), "svc-a");

    watcher.maybe_spawn(detail.clone()).await;
    assert_eq!(watcher.cache.lock().len(), 1);

    // Re-polling the same (service, path) pair must not spawn a duplicate.
    watcher.maybe_spawn(detail).await;
    assert_eq!(watcher.cache.lock().len(), 1);

    watcher.shutdown().await;
}

#[tokio::test]
async fn distinct_services_on_same_path_each_get_an_executor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shared.log");
    std::fs::write(&path, "").unwrap();

    let hooks: Arc<dyn TailHooks> = Arc::new(FakeHooks::new());
    let watcher = watcher_with(hooks);

    watcher.maybe_spawn(literal_detail(path.to_str().unwrap(), "svc-a")).await;
    watcher.maybe_spawn(literal_detail(path.to_str().unwrap(), "svc-b")).await;

    assert_eq!(watcher.cache.lock().len(), 2);
    watcher.shutdown().await;
}

#[tokio::test]
async fn clear_removes_entry_and_signals_shutdown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("svc.log");
    std::fs::write(&path, "").unwrap();

    let hooks: Arc<dyn TailHooks> = Arc::new(FakeHooks::new());
    let watcher = watcher_with(hooks);
    watcher.maybe_spawn(literal_detail(path.to_str().unwrap(), "svc-a")).await;
    assert_eq!(watcher.cache.lock().len(), 1);

    watcher.clear("svc-a", path.to_str().unwrap()).await;
    assert_eq!(watcher.cache.lock().len(), 0);

    // Clearing an unknown pair is a no-op, not a panic.
    watcher.clear("svc-a", path.to_str().unwrap()).await;
}

#[tokio::test]
async fn nonexistent_literal_path_is_not_spawned() {
    let hooks: Arc<dyn TailHooks> = Arc::new(FakeHooks::new());
    let watcher = watcher_with(hooks);
    let detail = literal_detail("/nonexistent/path/for/lt-daemon-tests.log", "svc-a");

    watcher.poll_one(&detail).await;
    assert_eq!(watcher.cache.lock().len(), 0);
}

#[tokio::test]
async fn glob_path_expands_and_spawns_each_match() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.log"), "").unwrap();
    std::fs::write(dir.path().join("b.log"), "").unwrap();
    let pattern = dir.path().join("*.log");

    let hooks: Arc<dyn TailHooks> = Arc::new(FakeHooks::new());
    let watcher = watcher_with(hooks);
    let rule = PrefixRule::new("^ERROR", "report_error").unwrap();
    let detail = LogDetail::new("svc-a", pattern.to_str().unwrap(), true, vec![rule], 1.0, true).unwrap();

    watcher.poll_one(&detail).await;

    assert_eq!(watcher.cache.lock().len(), 2);
    watcher.shutdown().await;
}

#[tokio::test]
async fn empty_descriptor_list_reports_config_error_but_keeps_polling() {
    let hooks = Arc::new(FakeHooks::new());
    let watcher = watcher_with(Arc::clone(&hooks) as Arc<dyn TailHooks>);
    let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();

    let run = tokio::spawn(async move {
        tokio::time::timeout(TokioDuration::from_millis(50), watcher.run(vec![], Duration::from_millis(10), rx)).await
    });
    let _ = run.await;

    assert!(hooks.calls().iter().any(|c| matches!(c, lt_engine::hooks::HookCall::Error { .. })));
}
