use tokio::sync::broadcast;

/// Channel capacity; invalidations are rare, so lag means a stalled listener.
const DEFAULT_CAPACITY: usize = 16;

/// Notification published when stored credentials stop being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The service rejected the credential; stored copies have been cleared.
    /// Carries the classified failure message for display.
    Invalidated { message: String },
}

/// Broadcast channel for [`AuthEvent`]s.
///
/// The channel is an explicit dependency: it is handed to the pipeline at
/// construction and to whoever wants to listen, never reached through a
/// global. Cloned handles publish into the same channel. Publishing never
/// blocks; with no subscribers the event is dropped.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Delivers `event` to all current subscribers; returns how many there
    /// were.
    pub fn publish(&self, event: AuthEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
