//! Full-snapshot publish/subscribe for live record lists.
//!
//! Every committed mutation publishes the complete, freshly queried list to
//! each subscriber. Subscribers that have gone away are pruned on the next
//! publish; a missed delivery is never an error.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Mutex;
use std::time::Duration;

/// Fan-out point for one logical collection
pub struct Publisher<T> {
    subscribers: Mutex<Vec<Sender<Vec<T>>>>,
}

impl<T: Clone> Publisher<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a subscriber, seeding it with `initial`
    pub fn subscribe(&self, initial: Vec<T>) -> Subscription<T> {
        let (tx, rx) = channel::unbounded();
        // Receiver is alive, so this cannot fail
        let _ = tx.send(initial);
        self.lock().push(tx);
        Subscription { rx }
    }

    /// Deliver `snapshot` to every live subscriber
    pub fn publish(&self, snapshot: &[T]) {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(snapshot.to_vec()).is_ok());

        let dropped = before - subscribers.len();
        if dropped > 0 {
            tracing::debug!("Pruned {} cancelled subscribers", dropped);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Vec<T>>>> {
        // A panicking subscriber cannot leave the list half-updated
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle receiving snapshots of a live list
///
/// Dropping the handle (or calling [`Subscription::cancel`]) stops delivery.
pub struct Subscription<T> {
    rx: Receiver<Vec<T>>,
}

impl<T> Subscription<T> {
    /// Block until the next snapshot; `None` once the source is gone
    pub fn recv(&self) -> Option<Vec<T>> {
        self.rx.recv().ok()
    }

    /// Next pending snapshot without blocking
    pub fn try_recv(&self) -> Option<Vec<T>> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain pending snapshots, keeping only the newest
    pub fn latest(&self) -> Option<Vec<T>> {
        let mut newest = None;
        while let Some(snapshot) = self.try_recv() {
            newest = Some(snapshot);
        }
        newest
    }

    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_gets_initial_snapshot() {
        let publisher = Publisher::new();
        let sub = publisher.subscribe(vec![1, 2, 3]);
        assert_eq!(sub.try_recv(), Some(vec![1, 2, 3]));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let publisher = Publisher::new();
        let a = publisher.subscribe(vec![]);
        let b = publisher.subscribe(vec![]);

        publisher.publish(&["x".to_string()]);

        assert_eq!(a.latest(), Some(vec!["x".to_string()]));
        assert_eq!(b.latest(), Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_cancelled_subscriber_is_pruned() {
        let publisher = Publisher::new();
        let keep = publisher.subscribe(vec![0]);
        let gone = publisher.subscribe(vec![0]);
        assert_eq!(publisher.subscriber_count(), 2);

        gone.cancel();
        publisher.publish(&[1]);

        assert_eq!(publisher.subscriber_count(), 1);
        assert_eq!(keep.latest(), Some(vec![1]));
    }

    #[test]
    fn test_latest_keeps_newest() {
        let publisher = Publisher::new();
        let sub = publisher.subscribe(vec![0]);
        publisher.publish(&[1]);
        publisher.publish(&[2]);
        assert_eq!(sub.latest(), Some(vec![2]));
    }

    #[test]
    fn test_subscription_shared_between_threads() {
        let publisher = Publisher::new();
        let sub = std::sync::Arc::new(publisher.subscribe(vec![0u32]));
        assert_eq!(sub.recv(), Some(vec![0]));

        let reader = {
            let sub = std::sync::Arc::clone(&sub);
            std::thread::spawn(move || sub.recv_timeout(Duration::from_secs(5)))
        };
        publisher.publish(&[7]);

        assert_eq!(reader.join().unwrap(), Some(vec![7]));
    }

    #[test]
    fn test_recv_timeout_when_idle() {
        let publisher: Publisher<u8> = Publisher::new();
        let sub = publisher.subscribe(vec![]);
        assert_eq!(sub.recv_timeout(Duration::from_millis(10)), Some(vec![]));
        assert_eq!(sub.recv_timeout(Duration::from_millis(10)), None);
    }
}
