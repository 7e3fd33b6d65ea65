//! Broadcast fan-out of store change events.
//!
//! Stores publish while their write path is still serialized, so every
//! subscriber sees events in commit order. Publishing with no subscribers
//! is a no-op.

use chatrelay_types::StoreEvent;
use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receiver for all events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: StoreEvent) {
        tracing::trace!(chat_id = %event.chat_id(), "Publishing store event");
        let _ = self.sender.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_in_publish_order() {
        let bus = ChangeBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(StoreEvent::ChatCreated {
            chat_id: "a".to_string(),
        });
        bus.publish(StoreEvent::ChatDeleted {
            chat_id: "a".to_string(),
        });

        for rx in [&mut first, &mut second] {
            assert!(matches!(rx.recv().await.unwrap(), StoreEvent::ChatCreated { .. }));
            assert!(matches!(rx.recv().await.unwrap(), StoreEvent::ChatDeleted { .. }));
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = ChangeBus::new(4);
        bus.publish(StoreEvent::ChatCreated {
            chat_id: "a".to_string(),
        });
        assert_eq!(bus.receiver_count(), 0);
    }
}
