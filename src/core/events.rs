//! Change notifications for subsystems that cache stored data.
//!
//! Imports publish a [`DataEvent`] instead of restarting anything. Whoever
//! holds derived state (provider clients, model lists, open sessions)
//! subscribes and re-initializes when it sees one.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    /// Settings were written; values take effect once consumers re-read them.
    SettingsChanged { keys: Vec<String> },
    /// New credentials landed; consumers should rebuild from storage.
    ReinitializeRequested { reason: String },
    /// Chats were imported or deleted.
    ChatsChanged { count: usize },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DataEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }

    /// Publish immediately. Returns how many subscribers saw the event.
    pub fn publish(&self, event: DataEvent) -> usize {
        debug!(?event, "Publishing data event");
        // No subscribers is not an error: nothing needs refreshing.
        self.sender.send(event).unwrap_or(0)
    }

    /// Publish after `delay` on the current runtime.
    pub fn publish_after(&self, event: DataEvent, delay: Duration) -> JoinHandle<usize> {
        let bus = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.publish(event)
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(DataEvent::ChatsChanged { count: 2 }), 1);
        assert_eq!(rx.recv().await.unwrap(), DataEvent::ChatsChanged { count: 2 });
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(DataEvent::ChatsChanged { count: 0 }), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_events_arrive_after_the_delay() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let event = DataEvent::ReinitializeRequested {
            reason: "api keys".to_string(),
        };

        let handle = bus.publish_after(event.clone(), Duration::from_millis(1500));
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await.unwrap(), event);
        assert_eq!(handle.await.unwrap(), 1);
    }
}
