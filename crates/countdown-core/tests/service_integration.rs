//! Integration tests for the tick-driving service.
//!
//! Every test runs on a paused tokio clock, so sleeping advances time
//! instantly and deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use countdown_core::{
    AlertSignal, Event, Preset, TimerEngine, TimerError, TimerHandle, TimerPhase, TimerService,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::sleep;

#[derive(Default)]
struct RecordingAlert {
    calls: AtomicUsize,
}

impl AlertSignal for RecordingAlert {
    fn emit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn spawn() -> (TimerHandle, Arc<RecordingAlert>) {
    let alert = Arc::new(RecordingAlert::default());
    let (handle, _task) = TimerService::spawn(TimerEngine::new(Arc::clone(&alert)));
    (handle, alert)
}

async fn remaining(handle: &TimerHandle) -> u64 {
    handle.snapshot().await.unwrap().remaining_seconds
}

#[tokio::test(start_paused = true)]
async fn three_second_timer_expires_once() {
    let (handle, alert) = spawn();
    let mut events = handle.subscribe();

    handle.configure(0, 3).await.unwrap();
    handle.start().await.unwrap();
    sleep(Duration::from_millis(3500)).await;

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.remaining_seconds, 0);
    assert!(!snap.is_running);
    assert_eq!(snap.phase, TimerPhase::Expired);
    assert_eq!(snap.progress_fraction, 1.0);
    assert_eq!(alert.calls.load(Ordering::SeqCst), 1);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen[0], Event::TimerConfigured { total_seconds: 3, .. }));
    assert!(matches!(seen[1], Event::TimerStarted { remaining_seconds: 3, .. }));
    assert!(matches!(seen[2], Event::TimerTicked { remaining_seconds: 2, .. }));
    assert!(matches!(seen[3], Event::TimerTicked { remaining_seconds: 1, .. }));
    assert!(matches!(seen[4], Event::TimerExpired { total_seconds: 3, .. }));
    assert_eq!(seen.len(), 5);

    // Nothing keeps ticking after expiry.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(alert.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn start_then_pause_does_not_tick() {
    let (handle, _alert) = spawn();
    handle.configure(1, 0).await.unwrap();
    handle.start().await.unwrap();
    handle.pause().await.unwrap();
    assert_eq!(remaining(&handle).await, 60);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(remaining(&handle).await, 60);
}

#[tokio::test(start_paused = true)]
async fn resume_keeps_one_decrement_per_second() {
    let (handle, _alert) = spawn();
    handle.configure(0, 10).await.unwrap();
    handle.start().await.unwrap();

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(remaining(&handle).await, 8);

    handle.pause().await.unwrap();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(remaining(&handle).await, 8);

    handle.start().await.unwrap();
    // A repeated start must not add a second schedule.
    assert_eq!(handle.start().await, Ok(None));

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(remaining(&handle).await, 7);
    sleep(Duration::from_secs(1)).await;
    assert_eq!(remaining(&handle).await, 6);
    sleep(Duration::from_secs(3)).await;
    assert_eq!(remaining(&handle).await, 3);
}

#[tokio::test(start_paused = true)]
async fn reset_after_partial_countdown_is_silent() {
    let (handle, alert) = spawn();
    handle.apply_preset(Preset::new(5)).await.unwrap();
    handle.start().await.unwrap();
    sleep(Duration::from_millis(4500)).await;
    assert_eq!(remaining(&handle).await, 296);

    handle.reset().await.unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.remaining_seconds, 300);
    assert!(!snap.is_running);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(remaining(&handle).await, 300);
    assert_eq!(alert.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn validation_errors_reach_the_caller() {
    let (handle, _alert) = spawn();
    assert_eq!(handle.start().await, Err(TimerError::NotReady));
    assert!(matches!(handle.reset().await, Err(TimerError::NotConfigured)));
    assert!(matches!(
        handle.configure(0, 0).await,
        Err(TimerError::InvalidDuration { .. })
    ));

    handle.configure(0, 30).await.unwrap();
    handle.start().await.unwrap();
    assert!(matches!(handle.configure(2, 0).await, Err(TimerError::Running)));
    assert_eq!(handle.snapshot().await.unwrap().total_seconds, 30);
}

#[tokio::test(start_paused = true)]
async fn watch_sees_each_change() {
    let (handle, _alert) = spawn();
    let mut snapshots = handle.watch();
    assert_eq!(snapshots.borrow().phase, TimerPhase::Idle);

    handle.configure(0, 2).await.unwrap();
    snapshots.changed().await.unwrap();
    assert_eq!(snapshots.borrow_and_update().formatted_clock, "00:02");

    handle.start().await.unwrap();
    sleep(Duration::from_millis(1100)).await;
    assert_eq!(handle.latest().remaining_seconds, 1);
    assert_eq!(handle.latest().formatted_clock, "00:01");
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_service() {
    let (handle, _alert) = spawn();
    handle.shutdown().await.unwrap();
    assert_eq!(handle.start().await, Err(TimerError::ServiceStopped));
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_closed_after_shutdown() {
    let alert = Arc::new(RecordingAlert::default());
    let (handle, task) = TimerService::spawn(TimerEngine::new(Arc::clone(&alert)));
    let mut events = handle.subscribe();
    let mut cloned = handle.clone().subscribe();

    handle.configure(0, 2).await.unwrap();
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    assert!(matches!(
        events.recv().await,
        Ok(Event::TimerConfigured { total_seconds: 2, .. })
    ));
    assert!(matches!(events.recv().await, Err(RecvError::Closed)));
    assert!(matches!(cloned.recv().await, Ok(Event::TimerConfigured { .. })));
    assert!(matches!(cloned.recv().await, Err(RecvError::Closed)));
}
