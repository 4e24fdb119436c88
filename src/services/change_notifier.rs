//! Change Notifier for Marksync.
//!
//! Publishes the canonical address of a resource whose data changed. Observers
//! get the address only and re-query to learn what changed.

use tokio::sync::broadcast;
use tracing::trace;

/// Default number of buffered notifications per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of changed addresses to any number of observers.
///
/// A lagging subscriber loses the oldest addresses and sees
/// `RecvError::Lagged`, after which it should re-query everything it shows.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<String>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers an observer.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes `address`. Must only be called after the write is durable.
    pub fn notify(&self, address: &str) {
        match self.sender.send(address.to_string()) {
            Ok(n) => trace!("Notified {} observer(s) of {}", n, address),
            Err(_) => trace!("No observers for {}", address),
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
