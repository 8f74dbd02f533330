//! Result event bus: publish/subscribe fan-out of run progress and reports.
//!
//! Built on `tokio::sync::broadcast`: delivery is ordered per subscriber by
//! publish time, and a subscriber that falls behind the channel capacity
//! observes a `Lagged` gap instead of stalling the producer, so the engine's
//! liveness never depends on a consumer's rendering speed. A bounded replay
//! buffer lets late subscribers catch up on recent events before attaching to
//! the live stream.

use crate::domain::failure::UnitFailure;
use crate::domain::node::QualifiedName;
use crate::domain::report::ComponentReport;
use crate::app::pipeline::RunSummary;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Events published while a run is in flight and when results are ready.
/// Immutable once published; heavyweight payloads are shared via `Arc`.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    UnitCompleted {
        unit: QualifiedName,
        edges_added: usize,
    },
    UnitFailed {
        unit: QualifiedName,
        failure: UnitFailure,
    },
    Progress {
        processed: usize,
        failed: usize,
        submitted: usize,
    },
    RunCompleted(Arc<RunSummary>),
    ReportReady(Arc<ComponentReport>),
}

pub struct EventBus {
    sender: broadcast::Sender<AnalysisEvent>,
    replay: Mutex<VecDeque<AnalysisEvent>>,
    replay_capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256, 64)
    }
}

impl EventBus {
    pub fn new(capacity: usize, replay_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            replay: Mutex::new(VecDeque::with_capacity(replay_capacity)),
            replay_capacity,
        }
    }

    /// Publish to all current subscribers. Never blocks; publishing with no
    /// subscribers is a no-op apart from the replay buffer.
    pub fn publish(&self, event: AnalysisEvent) {
        if self.replay_capacity > 0 {
            let mut replay = self.replay.lock().unwrap();
            if replay.len() == self.replay_capacity {
                replay.pop_front();
            }
            replay.push_back(event.clone());
        }
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.sender.subscribe()
    }

    /// Subscribe and also receive a copy of the buffered recent events. The
    /// live receiver is created before the buffer is copied, so no event
    /// published in between is lost (it may appear in both).
    pub fn subscribe_with_replay(&self) -> (Vec<AnalysisEvent>, broadcast::Receiver<AnalysisEvent>) {
        let receiver = self.sender.subscribe();
        let replay = self.replay.lock().unwrap().iter().cloned().collect();
        (replay, receiver)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        for i in 0..3 {
            bus.publish(AnalysisEvent::Progress {
                processed: i,
                failed: 0,
                submitted: 3,
            });
        }
        for expected in 0..3 {
            match rx.recv().await.unwrap() {
                AnalysisEvent::Progress { processed, .. } => assert_eq!(processed, expected),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags_instead_of_blocking_producer() {
        let bus = EventBus::new(2, 0);
        let mut rx = bus.subscribe();
        for i in 0..5 {
            bus.publish(AnalysisEvent::Progress {
                processed: i,
                failed: 0,
                submitted: 5,
            });
        }
        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(missed)) => assert_eq!(missed, 3),
            other => panic!("expected lag, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replay_buffer_serves_late_subscribers() {
        let bus = EventBus::new(8, 2);
        for i in 0..4 {
            bus.publish(AnalysisEvent::Progress {
                processed: i,
                failed: 0,
                submitted: 4,
            });
        }
        let (replay, _rx) = bus.subscribe_with_replay();
        let processed: Vec<usize> = replay
            .iter()
            .map(|event| match event {
                AnalysisEvent::Progress { processed, .. } => *processed,
                other => panic!("unexpected event: {other:?}"),
            })
            .collect();
        // Only the most recent `replay_capacity` events are retained.
        assert_eq!(processed, vec![2, 3]);
    }
}
