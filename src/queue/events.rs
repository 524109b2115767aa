use crate::models::PhotoUpload;
use tokio::sync::broadcast;
use tracing::trace;

/// Events that describe changes in the selection and upload lists.
///
/// Uploads carried by an event are snapshots taken after the change.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// Photos were added to the selection
    SelectionAdded(Vec<PhotoUpload>),
    /// Photos left the selection, either removed or promoted to uploads
    SelectionRemoved(Vec<PhotoUpload>),
    /// The upload list or the state of one of its entries changed
    UploadsModified,
}

impl QueueEvent {
    pub fn name(&self) -> &'static str {
        match self {
            QueueEvent::SelectionAdded(_) => "selection_added",
            QueueEvent::SelectionRemoved(_) => "selection_removed",
            QueueEvent::UploadsModified => "uploads_modified",
        }
    }
}

/// Sink for queue events.
///
/// The manager publishes while holding its state lock, so `publish` must
/// return promptly and must not call back into the manager.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: QueueEvent);
}

/// Event bus fanning out to any number of `tokio` subscribers
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<QueueEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: QueueEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            trace!("No subscribers for {} event", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_delivers_in_publish_order() {
        let bus = BroadcastEventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(QueueEvent::SelectionAdded(vec![PhotoUpload::new("a")]));
        bus.publish(QueueEvent::UploadsModified);

        assert_eq!(rx.recv().await.unwrap().name(), "selection_added");
        assert_eq!(rx.recv().await.unwrap(), QueueEvent::UploadsModified);
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let bus = BroadcastEventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(QueueEvent::UploadsModified);
    }
}
