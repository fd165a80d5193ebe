//! Integration tests for ChannelRegistry change events
//!
//! These tests verify that the registry:
//! - Emits an event for every increment and reset
//! - Emits TargetReached exactly once per crossing
//! - Supports multiple subscribers
//! - Emits nothing for rejected channel names

use pda_counter::{ChannelEvent, ChannelName, ChannelRegistry, PdaState};
use tokio::time::{Duration, timeout};

#[tokio::test]
async fn test_increment_event_emitted() {
    let mut registry = ChannelRegistry::new(5);
    let mut rx = registry.subscribe();

    registry.increment_channel("C").unwrap();

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert_eq!(
        event,
        ChannelEvent::Incremented {
            channel: ChannelName::C,
            count: 1,
            state: PdaState::Q1,
        }
    );
}

#[tokio::test]
async fn test_target_reached_once() {
    let mut registry = ChannelRegistry::new(2);
    let mut rx = registry.subscribe();

    for _ in 0..4 {
        registry.increment_channel("A").unwrap();
    }

    let mut reached = 0;
    let mut increments = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            ChannelEvent::TargetReached { channel, count } => {
                assert_eq!(channel, ChannelName::A);
                assert_eq!(count, 2);
                reached += 1;
            }
            ChannelEvent::Incremented { .. } => increments += 1,
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    assert_eq!(increments, 4);
    assert_eq!(reached, 1);
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let mut registry = ChannelRegistry::new(5);
    let mut rx1 = registry.subscribe();
    let mut rx2 = registry.subscribe();

    registry.reset_channel("B").unwrap();

    for rx in [&mut rx1, &mut rx2] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout")
            .expect("Channel closed");
        assert_eq!(event, ChannelEvent::Reset { channel: ChannelName::B });
    }
}

#[tokio::test]
async fn test_rejected_name_emits_nothing() {
    let mut registry = ChannelRegistry::new(5);
    let mut rx = registry.subscribe();

    assert!(registry.increment_channel("D").is_err());
    assert!(registry.reset_channel("AB").is_err());

    let result = timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(result.is_err(), "No event expected for invalid channel names");
}

#[test]
fn test_channels_are_independent() {
    let mut registry = ChannelRegistry::new(3);

    for _ in 0..3 {
        registry.increment_channel("A").unwrap();
    }
    registry.increment_channel("B").unwrap();

    assert!(registry.channel(ChannelName::A).is_complete());
    assert_eq!(registry.channel(ChannelName::B).state(), PdaState::Q1);
    assert_eq!(registry.channel(ChannelName::C).state(), PdaState::Q0);

    let snapshot = registry.snapshot();
    for (name, state) in snapshot.iter() {
        assert_eq!(state.count, registry.channel(*name).count());
        assert_eq!(state.stack.len() as u64, state.count);
    }
}
