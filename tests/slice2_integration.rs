//! Integration tests for Slice 2 - Responses and notifications
//!
//! Tests the notification contract:
//! - exactly one notification per terminal transition
//! - terminal states absorb every later input
//! - sink failures never reach the controller

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proposal::core::{ControllerConfig, NotificationSink, Notifier, ResponseController};
use proposal::types::{ControllerState, NotifyError, Response, ResponseOutcome};
use tokio::sync::mpsc;

/// Sink forwarding every notification to a channel
struct RecordingSink {
    tx: mpsc::UnboundedSender<Response>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, response: Response) -> Result<(), NotifyError> {
        let _ = self.tx.send(response);
        Ok(())
    }
}

/// Sink that always fails
struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn notify(&self, _response: Response) -> Result<(), NotifyError> {
        Err(NotifyError::Provider {
            status: 500,
            message: "provider down".to_string(),
        })
    }
}

/// Sink that takes a while before recording
struct SlowSink {
    delay: Duration,
    tx: mpsc::UnboundedSender<Response>,
}

#[async_trait]
impl NotificationSink for SlowSink {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn notify(&self, response: Response) -> Result<(), NotifyError> {
        tokio::time::sleep(self.delay).await;
        let _ = self.tx.send(response);
        Ok(())
    }
}

fn recording() -> (Notifier, mpsc::UnboundedReceiver<Response>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier::new(Arc::new(RecordingSink { tx })), rx)
}

/// Wait for `n` deliveries, then make sure no more arrive
async fn collect(rx: &mut mpsc::UnboundedReceiver<Response>, n: usize) -> Vec<Response> {
    let mut got = Vec::new();
    for _ in 0..n {
        let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("notification not delivered in time")
            .expect("channel closed");
        got.push(next);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "unexpected extra notification");
    got
}

// =============================================================================
// SCENARIO 1: three declines
// =============================================================================

#[tokio::test]
async fn test_scenario_three_declines() {
    let (notifier, mut rx) = recording();
    let mut controller = ResponseController::new(["a", "b", "c"], notifier).unwrap();

    controller.advance();
    let out = controller.advance();
    assert_eq!(out.state, ControllerState::AwaitingResponse);
    assert_eq!(controller.current_text(), "c");

    controller.decline();
    controller.decline();
    let out = controller.decline();
    assert_eq!(out.state, ControllerState::DeclinedFinal);
    assert_eq!(out.outcome, ResponseOutcome::DeclinedFinal);

    assert_eq!(collect(&mut rx, 1).await, vec![Response::No]);
}

// =============================================================================
// SCENARIO 2: affirm
// =============================================================================

#[tokio::test]
async fn test_scenario_affirm() {
    let (notifier, mut rx) = recording();
    let mut controller = ResponseController::new(["a", "b", "c"], notifier).unwrap();
    controller.advance();
    controller.advance();

    let out = controller.affirm();
    assert_eq!(out.state, ControllerState::Affirmed);

    let out = controller.decline();
    assert_eq!(out.state, ControllerState::Affirmed);
    assert_eq!(out.decline_count, 0);

    assert_eq!(collect(&mut rx, 1).await, vec![Response::Yes]);
}

// =============================================================================
// Terminal absorption
// =============================================================================

#[tokio::test]
async fn test_inputs_after_decline_final_do_nothing() {
    let (notifier, mut rx) = recording();
    let mut controller = ResponseController::new(["q"], notifier).unwrap();
    for _ in 0..3 {
        controller.decline();
    }
    let before = controller.session();

    for _ in 0..5 {
        controller.decline();
        controller.affirm();
        controller.advance();
    }

    assert_eq!(controller.session(), before);
    assert_eq!(controller.notifications(), &[Response::No]);
    assert_eq!(collect(&mut rx, 1).await, vec![Response::No]);
}

#[tokio::test]
async fn test_affirm_before_question_is_ignored() {
    let (notifier, mut rx) = recording();
    let mut controller = ResponseController::new(["a", "b"], notifier).unwrap();

    controller.affirm();
    controller.decline();
    assert_eq!(controller.outcome(), ResponseOutcome::Pending);
    assert_eq!(controller.decline_count(), 0);

    assert_eq!(collect(&mut rx, 0).await, Vec::<Response>::new());
}

// =============================================================================
// Policy
// =============================================================================

#[tokio::test]
async fn test_every_decline_policy_notifies_each_press() {
    let (notifier, mut rx) = recording();
    let config = ControllerConfig {
        notify_every_decline: true,
        messages: Some(vec!["q".to_string()]),
        ..ControllerConfig::default()
    };
    let mut controller = ResponseController::from_config(&config, notifier).unwrap();

    for _ in 0..5 {
        controller.decline();
    }

    assert_eq!(
        collect(&mut rx, 3).await,
        vec![Response::No, Response::No, Response::No]
    );
}

#[tokio::test]
async fn test_custom_threshold() {
    let (notifier, mut rx) = recording();
    let config = ControllerConfig {
        threshold: Some(5),
        messages: Some(vec!["q".to_string()]),
        ..ControllerConfig::default()
    };
    let mut controller = ResponseController::from_config(&config, notifier).unwrap();

    for _ in 0..4 {
        controller.decline();
    }
    assert_eq!(controller.state(), ControllerState::AwaitingResponse);
    assert!(controller.decline_available());

    controller.decline();
    assert_eq!(controller.state(), ControllerState::DeclinedFinal);
    assert_eq!(collect(&mut rx, 1).await, vec![Response::No]);
}

// =============================================================================
// Failure isolation
// =============================================================================

#[tokio::test]
async fn test_failing_sink_does_not_affect_controller() {
    let notifier = Notifier::new(Arc::new(FailingSink));
    let mut controller = ResponseController::new(["q"], notifier).unwrap();

    let out = controller.affirm();
    assert_eq!(out.state, ControllerState::Affirmed);
    assert_eq!(out.notified, Some(Response::Yes));

    // Let the detached delivery run and fail
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.state(), ControllerState::Affirmed);
}

#[test]
fn test_dispatch_outside_runtime() {
    let (notifier, mut rx) = recording();
    let mut controller = ResponseController::new(["q"], notifier).unwrap();
    controller.affirm();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let got = runtime.block_on(collect(&mut rx, 1));
    assert_eq!(got, vec![Response::Yes]);
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test]
async fn test_flush_keeps_slow_delivery_alive() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = Notifier::new(Arc::new(SlowSink {
        delay: Duration::from_millis(300),
        tx,
    }));
    let mut controller = ResponseController::new(["q"], notifier.clone()).unwrap();

    controller.affirm();
    assert_eq!(notifier.pending_count(), 1);

    assert_eq!(notifier.flush(Duration::from_secs(5)).await, 0);
    assert_eq!(rx.try_recv().unwrap(), Response::Yes);
}

#[tokio::test]
async fn test_flush_gives_up_after_limit() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let notifier = Notifier::new(Arc::new(SlowSink {
        delay: Duration::from_secs(60),
        tx,
    }));
    let mut controller = ResponseController::new(["q"], notifier.clone()).unwrap();

    controller.decline();
    controller.decline();
    controller.decline();

    assert_eq!(notifier.flush(Duration::from_millis(50)).await, 1);
    assert_eq!(controller.state(), ControllerState::DeclinedFinal);
}
