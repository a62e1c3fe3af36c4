//! In-process domain event bus.

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::event::DomainEvent;

/// Broadcast channel for [`DomainEvent`]s.
///
/// Publishing never blocks; slow subscribers observe `Lagged` and should
/// recompute from current state.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Bus holding up to `capacity` undelivered events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Returns how many subscribers received it.
    pub fn publish(&self, event: impl Into<DomainEvent>) -> usize {
        let event = event.into();
        // No receivers is fine
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "No subscribers for event");
                0
            }
        }
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::MarketResolved;
    use crate::domain::id::MarketAddress;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let event = MarketResolved {
            address: MarketAddress::from("m1"),
            option: 1,
            tournament_id: None,
        };
        assert_eq!(bus.publish(event.clone()), 1);
        assert_eq!(rx.recv().await.unwrap(), DomainEvent::MarketResolved(event));
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::new(8);
        let sent = bus.publish(MarketResolved {
            address: MarketAddress::from("m1"),
            option: 0,
            tournament_id: None,
        });
        assert_eq!(sent, 0);
    }
}
