//! Timing tests for optimistic engagement actions

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use updoot_core::engagement::DEFAULT_SETTLE_DELAY;
use updoot_core::{
    CoreError, EngagementAction, EngagementBackend, EngagementKind, EngagementState,
    EngagementTarget, PcKind, SnapshotPolicy, SyncOutcome, SyncReport,
};

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail,
    Hang,
}

struct RecordingBackend {
    behaviour: Behaviour,
    calls: Mutex<Vec<(EngagementKind, EngagementTarget, bool)>>,
}

impl RecordingBackend {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl EngagementBackend for RecordingBackend {
    async fn set_membership(
        &self,
        kind: EngagementKind,
        target: &EngagementTarget,
        add: bool,
    ) -> updoot_core::Result<()> {
        self.calls.lock().push((kind, target.clone(), add));
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err(CoreError::Request("503 Service Unavailable".into())),
            Behaviour::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

fn target() -> EngagementTarget {
    EngagementTarget::new("mina", "p1", PcKind::Proposal)
}

async fn settle() {
    tokio::time::sleep(DEFAULT_SETTLE_DELAY + Duration::from_millis(1)).await;
}

async fn run_single_toggle(behaviour: Behaviour) {
    let backend = RecordingBackend::new(behaviour);
    let action = EngagementAction::new(EngagementKind::Like, backend.clone());
    action.initialize(false);

    assert!(action.toggle(target()));
    assert_eq!(action.state(), EngagementState::Pending);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(action.state(), EngagementState::Pending);
    assert_eq!(backend.call_count(), 1);

    settle().await;
    assert_eq!(action.state(), EngagementState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_converges_when_request_succeeds() {
    run_single_toggle(Behaviour::Succeed).await;
}

#[tokio::test(start_paused = true)]
async fn test_toggle_converges_when_request_fails() {
    run_single_toggle(Behaviour::Fail).await;
}

#[tokio::test(start_paused = true)]
async fn test_toggle_converges_when_request_never_returns() {
    run_single_toggle(Behaviour::Hang).await;
}

#[tokio::test(start_paused = true)]
async fn test_second_toggle_while_pending_is_dropped() {
    let backend = RecordingBackend::new(Behaviour::Succeed);
    let action = EngagementAction::new(EngagementKind::Bookmark, backend.clone());
    action.initialize(false);

    assert!(action.toggle(target()));
    assert!(!action.toggle(target()));

    settle().await;
    assert_eq!(backend.call_count(), 1);
    assert_eq!(action.state(), EngagementState::Active);

    // once settled the action accepts the reverse toggle
    assert!(action.toggle(target()));
    settle().await;
    assert_eq!(action.state(), EngagementState::Inactive);

    let calls = backend.calls.lock();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].2, "first call adds");
    assert!(!calls[1].2, "second call removes");
    assert_eq!(calls[0].0, EngagementKind::Bookmark);
}

#[tokio::test(start_paused = true)]
async fn test_initialize_active_sends_nothing() {
    let backend = RecordingBackend::new(Behaviour::Succeed);
    let action = EngagementAction::new(EngagementKind::Like, backend.clone());

    assert_eq!(action.initialize(true), EngagementState::Active);
    settle().await;
    assert_eq!(action.state(), EngagementState::Active);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sync_callback_reports_outcome() {
    for (behaviour, expected_ok) in [(Behaviour::Succeed, true), (Behaviour::Fail, false)] {
        let reports: Arc<Mutex<Vec<SyncReport>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        let action = EngagementAction::new(EngagementKind::Like, RecordingBackend::new(behaviour))
            .on_sync(move |report| sink.lock().push(report));
        action.initialize(true);

        action.toggle(target());
        settle().await;

        assert_eq!(action.state(), EngagementState::Inactive);
        let reports = reports.lock();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].requested, EngagementState::Inactive);
        assert_eq!(reports[0].target, target());
        match &reports[0].outcome {
            SyncOutcome::Confirmed => assert!(expected_ok),
            SyncOutcome::Failed(reason) => {
                assert!(!expected_ok);
                assert!(reason.contains("503"));
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_late_snapshot_overwrites_by_default() {
    let action = EngagementAction::new(EngagementKind::Like, RecordingBackend::new(Behaviour::Succeed));
    action.initialize(false);
    action.toggle(target());
    settle().await;
    assert_eq!(action.state(), EngagementState::Active);

    // a snapshot fetched before the like landed still says "not liked"
    assert_eq!(action.initialize(false), EngagementState::Inactive);
}

#[tokio::test(start_paused = true)]
async fn test_seed_only_snapshot_keeps_manual_toggle() {
    let action = EngagementAction::new(EngagementKind::Like, RecordingBackend::new(Behaviour::Succeed))
        .with_snapshot_policy(SnapshotPolicy::SeedOnly);
    action.initialize(false);
    action.initialize(true);
    assert_eq!(action.state(), EngagementState::Active, "seeding is allowed before any toggle");

    action.toggle(target());
    settle().await;
    assert_eq!(action.initialize(true), EngagementState::Inactive);
}

#[tokio::test(start_paused = true)]
async fn test_custom_settle_delay() {
    let action = EngagementAction::new(EngagementKind::Like, RecordingBackend::new(Behaviour::Succeed))
        .with_settle_delay(Duration::from_millis(200));
    action.initialize(false);
    action.toggle(target());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(action.state(), EngagementState::Pending);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(action.state(), EngagementState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_action_before_settle_is_safe() {
    let backend = RecordingBackend::new(Behaviour::Hang);
    let action = EngagementAction::new(EngagementKind::Bookmark, backend.clone());
    action.initialize(false);
    action.toggle(target());
    drop(action);

    settle().await;
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_timer_keeps_newer_toggle_pending() {
    let backend = RecordingBackend::new(Behaviour::Hang);
    let action = EngagementAction::new(EngagementKind::Like, backend.clone());
    action.initialize(false);

    assert!(action.toggle(target()));
    tokio::time::sleep(Duration::from_millis(500)).await;
    // snapshot lands mid-flight and re-enables the control
    assert_eq!(action.initialize(true), EngagementState::Active);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(action.toggle(target()));

    // first toggle's timer fires here and must not settle the second one
    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(action.state(), EngagementState::Pending);
    assert!(!action.toggle(target()));
    assert_eq!(backend.call_count(), 2);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(action.state(), EngagementState::Inactive);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_during_pending_wins_over_timer() {
    let action = EngagementAction::new(EngagementKind::Like, RecordingBackend::new(Behaviour::Succeed));
    action.initialize(false);
    action.toggle(target());

    tokio::time::sleep(Duration::from_millis(300)).await;
    action.initialize(false);
    settle().await;
    assert_eq!(action.state(), EngagementState::Inactive);
}
