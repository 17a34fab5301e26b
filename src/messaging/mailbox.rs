//! FIFO mailboxes keyed by agent identity.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;
use uuid::Uuid;

/// One message in a mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: Uuid,
    pub sender: String,
    pub recipient: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Envelope {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            recipient: recipient.into(),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Renders the form agents see: `[From Alice]: hello`.
impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[From {}]: {}", self.sender, self.text)
    }
}

/// A thread-safe FIFO queue with an async wake-up for waiting receivers.
#[derive(Debug)]
pub struct Mailbox {
    owner: String,
    queue: Mutex<VecDeque<Envelope>>,
    arrivals: Notify,
}

impl Mailbox {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            queue: Mutex::new(VecDeque::new()),
            arrivals: Notify::new(),
        }
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned lock is still safe to use.
    fn queue(&self) -> MutexGuard<'_, VecDeque<Envelope>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, envelope: Envelope) {
        self.queue().push_back(envelope);
        self.arrivals.notify_one();
    }

    /// Take everything queued right now, oldest first.
    pub fn try_recv_all(&self) -> Vec<Envelope> {
        self.queue().drain(..).collect()
    }

    /// Take everything queued, waiting up to `timeout` for the first arrival.
    ///
    /// Returns as soon as at least one message is available. An empty vec
    /// means nothing arrived in time.
    pub async fn recv_timeout(&self, timeout: Duration) -> Vec<Envelope> {
        let deadline = Instant::now() + timeout;
        loop {
            let arrival = self.arrivals.notified();
            let batch = self.try_recv_all();
            if !batch.is_empty() {
                trace!(owner = %self.owner, count = batch.len(), "mailbox drained");
                return batch;
            }
            if tokio::time::timeout_at(deadline, arrival).await.is_err() {
                return self.try_recv_all();
            }
        }
    }

    /// Copy of the queued messages, leaving them in place.
    pub fn peek_all(&self) -> Vec<Envelope> {
        self.queue().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }
}

/// Shared map from agent identity to its [`Mailbox`].
///
/// Clones share the same mailboxes.
#[derive(Debug, Clone, Default)]
pub struct MailboxRegistry {
    mailboxes: Arc<Mutex<HashMap<String, Arc<Mailbox>>>>,
}

impl MailboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<Mailbox>>> {
        self.mailboxes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mailbox for `id`, created on first use.
    pub fn mailbox(&self, id: &str) -> Arc<Mailbox> {
        self.map()
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mailbox::new(id)))
            .clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map().contains_key(id)
    }

    /// Queue `text` for `recipient`, creating its mailbox if needed.
    pub fn send(&self, sender: &str, recipient: &str, text: &str) -> Envelope {
        let envelope = Envelope::new(sender, recipient, text);
        self.mailbox(recipient).push(envelope.clone());
        trace!(sender, recipient, id = %envelope.id, "message queued");
        envelope
    }

    /// Known identities, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.map().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drain every mailbox, returning `(identity, unread)` sorted by identity.
    pub fn drain_all(&self) -> Vec<(String, Vec<Envelope>)> {
        let mut boxes: Vec<(String, Arc<Mailbox>)> = self
            .map()
            .iter()
            .map(|(id, mailbox)| (id.clone(), Arc::clone(mailbox)))
            .collect();
        boxes.sort_by(|a, b| a.0.cmp(&b.0));
        boxes
            .into_iter()
            .map(|(id, mailbox)| (id, mailbox.try_recv_all()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(batch: &[Envelope]) -> Vec<&str> {
        batch.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn envelope_renders_with_sender() {
        let env = Envelope::new("Alice", "Bob", "Hi Bob!");
        assert_eq!(env.to_string(), "[From Alice]: Hi Bob!");
    }

    #[test]
    fn mailbox_is_fifo() {
        let mailbox = Mailbox::new("Bob");
        for text in ["one", "two", "three"] {
            mailbox.push(Envelope::new("Alice", "Bob", text));
        }

        assert_eq!(mailbox.len(), 3);
        assert_eq!(texts(&mailbox.try_recv_all()), vec!["one", "two", "three"]);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn peek_leaves_messages_queued() {
        let mailbox = Mailbox::new("Bob");
        mailbox.push(Envelope::new("Alice", "Bob", "still here"));

        assert_eq!(mailbox.peek_all().len(), 1);
        assert_eq!(mailbox.len(), 1);
    }

    #[test]
    fn send_creates_recipient_mailbox() {
        let registry = MailboxRegistry::new();
        assert!(!registry.contains("Carol"));

        let env = registry.send("Alice", "Carol", "are you there?");

        assert!(registry.contains("Carol"));
        assert_eq!(env.recipient, "Carol");
        assert_eq!(registry.mailbox("Carol").len(), 1);
    }

    #[test]
    fn clones_share_mailboxes() {
        let registry = MailboxRegistry::new();
        let clone = registry.clone();
        clone.send("Bob", "Alice", "hello");

        assert_eq!(registry.mailbox("Alice").len(), 1);
        assert_eq!(registry.ids(), vec!["Alice".to_string()]);
    }

    #[test]
    fn drain_all_empties_every_mailbox_in_id_order() {
        let registry = MailboxRegistry::new();
        registry.mailbox("Zed");
        registry.send("Alice", "Bob", "b1");
        registry.send("Bob", "Alice", "a1");
        registry.send("Bob", "Alice", "a2");

        let drained = registry.drain_all();

        let summary: Vec<(&str, usize)> = drained
            .iter()
            .map(|(id, batch)| (id.as_str(), batch.len()))
            .collect();
        assert_eq!(summary, vec![("Alice", 2), ("Bob", 1), ("Zed", 0)]);
        assert!(registry.mailbox("Alice").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn recv_timeout_returns_queued_messages_immediately() {
        let mailbox = Mailbox::new("Bob");
        mailbox.push(Envelope::new("Alice", "Bob", "first"));
        mailbox.push(Envelope::new("Alice", "Bob", "second"));
        let started = Instant::now();

        let batch = mailbox.recv_timeout(Duration::from_secs(5)).await;

        assert_eq!(texts(&batch), vec!["first", "second"]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn recv_timeout_expires_empty() {
        let mailbox = Mailbox::new("Bob");
        let started = Instant::now();

        let batch = mailbox.recv_timeout(Duration::from_secs(5)).await;

        assert!(batch.is_empty());
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn recv_timeout_wakes_on_arrival() {
        let registry = MailboxRegistry::new();
        let mailbox = registry.mailbox("Bob");
        let sender = registry.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            sender.send("Alice", "Bob", "late but here");
        });
        let started = Instant::now();

        let batch = mailbox.recv_timeout(Duration::from_secs(30)).await;

        assert_eq!(texts(&batch), vec!["late but here"]);
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_does_not_wait() {
        let mailbox = Mailbox::new("Bob");
        assert!(mailbox.recv_timeout(Duration::ZERO).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_lose_nothing() {
        let registry = MailboxRegistry::new();
        let mut handles = Vec::new();
        for producer in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..50 {
                    registry.send(&format!("p{producer}"), "sink", &n.to_string());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let received = registry.mailbox("sink").try_recv_all();
        assert_eq!(received.len(), 400);

        // per-producer order survives interleaving
        for producer in 0..8 {
            let sender = format!("p{producer}");
            let seq: Vec<u32> = received
                .iter()
                .filter(|e| e.sender == sender)
                .map(|e| e.text.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..50).collect::<Vec<u32>>());
        }
    }
}
