mod common;

use common::{healthy_backend, rows, status, summary, FakeBackend, FakeFactory, Reply};
use equipviz_core::api::Endpoint;
use equipviz_core::metrics::{stale_completions_total, ApiMetrics};
use equipviz_core::mock::{demo_summary, DemoFactory};
use equipviz_core::{ApiError, Dashboard, FetchError, Notice, SelectedFile, SummaryOutcome};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Datasett 1 svarer tregt, alle andre med en gang.
fn slow_first_backend() -> Arc<FakeBackend> {
    FakeBackend::new(|ep| match ep {
        Endpoint::History => Reply::History(vec![common::entry(2, "b.csv"), common::entry(1, "a.csv")]),
        Endpoint::Dataset(1) => {
            thread::sleep(Duration::from_millis(200));
            Reply::Rows(rows(1, 5))
        }
        Endpoint::Dataset(d) => Reply::Rows(rows(d, 2)),
        Endpoint::Summary(Some(1)) => Reply::Summary(summary(5)),
        Endpoint::Summary(_) => Reply::Summary(summary(2)),
        _ => Reply::Fail(status(404, "Not found")),
    })
}

#[test]
fn logout_clears_everything_and_is_idempotent() {
    let backend = healthy_backend(3);
    let mut dash = Dashboard::new(Arc::new(FakeFactory(Arc::clone(&backend))));
    dash.login("alice", "secret").expect("login");
    dash.open_dataset(3).expect("dataset");
    dash.select_file(SelectedFile::new("next.csv", b"x".to_vec()));
    assert!(!dash.view().is_empty());

    let before = backend.calls().len();
    dash.logout();
    dash.logout();

    assert!(!dash.is_authenticated());
    assert!(dash.credentials().is_none());
    assert!(dash.view().is_empty());
    assert!(dash.view().summary().is_none());
    assert!(dash.view().rows().is_none());
    assert!(dash.view().selected_file().is_none());
    assert!(dash.view().notice().is_none());
    assert_eq!(backend.calls().len(), before, "logout must not touch the network");
}

#[test]
fn operations_after_logout_require_login() {
    let backend = healthy_backend(3);
    let mut dash = Dashboard::new(Arc::new(FakeFactory(Arc::clone(&backend))));
    dash.login("alice", "secret").expect("login");
    dash.logout();

    assert!(matches!(dash.open_dataset(3), Err(FetchError::NotAuthenticated)));
    assert!(matches!(dash.download_report(3), Err(FetchError::NotAuthenticated)));
    assert_eq!(dash.refresh_summary(None), SummaryOutcome::Failed);
    assert!(matches!(dash.refresh_history(), Err(ApiError::NotAuthenticated)));
}

#[test]
fn summary_for_another_dataset_replaces_shown_rows() {
    let backend = healthy_backend(3);
    let mut dash = Dashboard::new(Arc::new(FakeFactory(Arc::clone(&backend))));
    dash.login("alice", "secret").expect("login");
    dash.open_dataset(3).expect("dataset");

    assert_eq!(dash.refresh_summary(Some(9)), SummaryOutcome::Loaded);

    let view = dash.view();
    assert_eq!(view.summary_dataset(), Some(9));
    assert_eq!(view.current_dataset(), view.summary_dataset());
    assert!(view.rows().is_none(), "rows of dataset 3 must not stay next to summary 9");

    dash.open_dataset(3).expect("dataset again");
    assert_eq!(dash.refresh_summary(Some(3)), SummaryOutcome::Loaded);
    assert_eq!(dash.view().current_dataset(), Some(3));
    assert_eq!(dash.view().rows().map(|r| r.len()), Some(3));
}

#[test]
fn last_requested_dataset_wins() {
    let backend = slow_first_backend();
    let metrics = ApiMetrics::new().expect("metrics");
    let mut dash =
        Dashboard::new(Arc::new(FakeFactory(Arc::clone(&backend)))).with_metrics(metrics.clone());
    dash.login("alice", "secret").expect("login");

    dash.request_dataset(1).expect("request 1");
    dash.request_dataset(2).expect("request 2");
    assert!(dash.has_pending());

    let applied = dash.wait_pending();

    assert_eq!(applied, 1);
    assert!(!dash.has_pending());
    assert_eq!(dash.view().current_dataset(), Some(2));
    assert_eq!(dash.view().rows().map(|r| r.len()), Some(2));
    assert_eq!(dash.view().summary().map(|s| s.total_count), Some(2));
    assert_eq!(stale_completions_total(&metrics).get(), 1);
}

#[test]
fn polling_eventually_applies_background_load() {
    let backend = slow_first_backend();
    let mut dash = Dashboard::new(Arc::new(FakeFactory(backend)));
    dash.login("alice", "secret").expect("login");

    dash.request_dataset(1).expect("request");
    let mut applied = 0;
    for _ in 0..100 {
        applied += dash.poll();
        if !dash.has_pending() {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(applied, 1);
    assert_eq!(dash.view().current_dataset(), Some(1));
    assert_eq!(dash.view().rows().map(|r| r.len()), Some(5));
}

#[test]
fn completion_after_logout_is_discarded() {
    let backend = slow_first_backend();
    let mut dash = Dashboard::new(Arc::new(FakeFactory(backend)));
    dash.login("alice", "secret").expect("login");

    dash.request_dataset(1).expect("request");
    dash.logout();
    thread::sleep(Duration::from_millis(300));

    assert_eq!(dash.poll(), 0);
    assert_eq!(dash.wait_pending(), 0);
    assert!(dash.view().is_empty());
}

#[test]
fn failed_background_load_keeps_selection_and_sets_notice() {
    let backend = FakeBackend::new(|ep| match ep {
        Endpoint::History => Reply::History(Vec::new()),
        Endpoint::Dataset(3) => Reply::Rows(rows(3, 1)),
        Endpoint::Summary(Some(3)) => Reply::Summary(summary(1)),
        _ => Reply::Fail(status(404, "Dataset not found")),
    });
    let mut dash = Dashboard::new(Arc::new(FakeFactory(backend)));
    dash.login("alice", "secret").expect("login");
    dash.open_dataset(3).expect("dataset 3");

    dash.request_dataset(7).expect("request");
    assert_eq!(dash.wait_pending(), 0);

    assert_eq!(dash.view().current_dataset(), Some(3));
    match dash.view().notice() {
        Some(Notice::Error(msg)) => assert!(msg.contains("Dataset not found"), "{msg}"),
        other => panic!("expected error notice, got {other:?}"),
    }
}

#[test]
fn open_without_id_falls_back_to_latest_upload() {
    let backend = slow_first_backend();
    let mut dash = Dashboard::new(Arc::new(FakeFactory(Arc::clone(&backend))));
    dash.login("alice", "secret").expect("login");

    assert!(dash.open_current_or_latest().expect("latest").is_some());
    assert_eq!(dash.view().current_dataset(), Some(2));
}

#[test]
fn demo_backend_end_to_end() {
    let mut dash = Dashboard::new(Arc::new(DemoFactory::new()));
    dash.login("demo", "demo").expect("demo login");

    assert_eq!(dash.view().history().len(), 1);
    assert_eq!(dash.view().summary(), Some(&demo_summary()));

    dash.select_file(SelectedFile::new("plant.csv", b"Equipment Name,Type\n".to_vec()));
    let report = dash.upload().expect("demo upload");
    assert_eq!(report.dataset_id, 2);
    assert_eq!(dash.view().current_dataset(), Some(2));
    assert_eq!(dash.view().rows().map(|r| r.len()), Some(5));
    assert_eq!(dash.view().history()[0].name, "plant.csv");

    let err = dash.download_report(2).unwrap_err();
    assert!(matches!(err, FetchError::ReportGenerationFailed { id: 2, .. }));
}
