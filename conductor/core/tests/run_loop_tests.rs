//! Async run loop tests
//!
//! Run the Conductor's `tokio::select!` loop against the timer engine with
//! paused time, the way the demo binary drives it.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::Instant;

use checkout_conductor::{
    ChoreographyConfig, ChoreographyMessage, Conductor, Phase, SequenceState, SurfaceEvent,
    TextLayout, TimerEngine,
};

type Live = Conductor<TimerEngine, TextLayout>;

fn live(
    time_scale: f32,
) -> (
    Live,
    mpsc::Sender<SurfaceEvent>,
    mpsc::Receiver<SurfaceEvent>,
    mpsc::UnboundedReceiver<ChoreographyMessage>,
) {
    let config = ChoreographyConfig::new();
    let layout = TextLayout::new(config.layout.clone(), config.copy.clone());
    let engine = TimerEngine::new(Handle::current(), time_scale);
    let (tx, rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(8);
    (Conductor::new(engine, layout, config, tx), event_tx, event_rx, rx)
}

async fn wait_for(
    rx: &mut mpsc::UnboundedReceiver<ChoreographyMessage>,
    pred: impl Fn(&ChoreographyMessage) -> bool,
) -> Vec<ChoreographyMessage> {
    let mut seen = Vec::new();
    while let Some(msg) = rx.recv().await {
        let done = pred(&msg);
        seen.push(msg);
        if done {
            break;
        }
    }
    seen
}

fn is_completed(msg: &ChoreographyMessage) -> bool {
    matches!(msg, ChoreographyMessage::SequenceCompleted { .. })
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_plays_sequence_in_real_time() {
    let (conductor, event_tx, event_rx, mut rx) = live(1.0);
    let handle = tokio::spawn(conductor.run(event_rx));
    let start = Instant::now();

    event_tx.send(SurfaceEvent::PrimaryTap).await.unwrap();
    let seen = wait_for(&mut rx, is_completed).await;

    let phases: Vec<Phase> = seen
        .iter()
        .filter_map(ChoreographyMessage::completed_phase)
        .collect();
    assert_eq!(phases, Phase::ALL.to_vec());

    // 0.35 + 0.35 + 0.5 + 0.45 + 0.7 (panel) + 0.7 (button) + 0.5
    assert!(start.elapsed() >= Duration::from_millis(3550));

    drop(event_tx);
    let conductor = handle.await.unwrap().unwrap();
    assert_eq!(conductor.state(), SequenceState::Completed);
    assert_eq!(conductor.stats().runs_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_surface_hangup_lets_the_run_finish() {
    let (conductor, event_tx, event_rx, _rx) = live(1.0);
    let handle = tokio::spawn(conductor.run(event_rx));

    event_tx.send(SurfaceEvent::PrimaryTap).await.unwrap();
    drop(event_tx);

    let conductor = handle.await.unwrap().unwrap();
    assert_eq!(conductor.state(), SequenceState::Completed);
    assert!(conductor.panel().is_on_screen());
}

#[tokio::test(start_paused = true)]
async fn test_second_tap_during_run_is_ignored() {
    let (conductor, event_tx, event_rx, mut rx) = live(1.0);
    let handle = tokio::spawn(conductor.run(event_rx));

    event_tx.send(SurfaceEvent::PrimaryTap).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    event_tx.send(SurfaceEvent::PrimaryTap).await.unwrap();

    let seen = wait_for(&mut rx, is_completed).await;
    assert_eq!(
        seen.iter()
            .filter(|m| **m == ChoreographyMessage::TapIgnored)
            .count(),
        1
    );

    // Third tap resets
    event_tx.send(SurfaceEvent::PrimaryTap).await.unwrap();
    let seen = wait_for(&mut rx, |m| {
        matches!(m, ChoreographyMessage::ResetApplied { .. })
    })
    .await;
    assert_eq!(seen.len(), 1);

    drop(event_tx);
    let conductor = handle.await.unwrap().unwrap();
    assert_eq!(conductor.state(), SequenceState::Idle);
    assert_eq!(conductor.stats().taps_ignored, 1);
    assert_eq!(conductor.stats().resets, 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_time_scale_settles_immediately() {
    let (conductor, event_tx, event_rx, mut rx) = live(0.0);
    let handle = tokio::spawn(conductor.run(event_rx));
    let start = Instant::now();

    event_tx.send(SurfaceEvent::PrimaryTap).await.unwrap();
    wait_for(&mut rx, is_completed).await;
    assert!(start.elapsed() < Duration::from_millis(1));

    drop(event_tx);
    handle.await.unwrap().unwrap();
}
