use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct SlotState<T> {
    key: Option<String>,
    value: Option<T>,
}

/// Last-request-wins holder for one on-screen insight. Responses that resolve
/// out of order are dropped unless they hold the newest ticket.
#[derive(Debug)]
pub struct InsightSlot<T> {
    latest: AtomicU64,
    state: Mutex<SlotState<T>>,
}

impl<T> Default for InsightSlot<T> {
    fn default() -> Self {
        Self {
            latest: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                key: None,
                value: None,
            }),
        }
    }
}

impl<T: Clone> InsightSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Starts a new request, superseding every ticket issued before.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// One-shot variant: issues a ticket only the first time `key` is seen in
    /// a row. Switching to another key clears the shown value; coming back to
    /// a key fires again. A failed request is not retried for the same key.
    pub fn begin_once(&self, key: &str) -> Option<Ticket> {
        let mut state = self.lock();
        if state.key.as_deref() == Some(key) {
            return None;
        }
        state.key = Some(key.to_string());
        state.value = None;
        Some(self.begin())
    }

    /// Stores `value` if `ticket` is still the newest. Returns whether it was
    /// kept.
    pub fn apply(&self, ticket: Ticket, value: T) -> bool {
        let mut state = self.lock();
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.seq(),
                latest = self.latest.load(Ordering::SeqCst),
                "discarding stale insight response"
            );
            return false;
        }
        state.value = Some(value);
        true
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn current(&self) -> Option<T> {
        self.lock().value.clone()
    }

    /// Key of the last [`begin_once`](Self::begin_once) call.
    pub fn key(&self) -> Option<String> {
        self.lock().key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn stale_response_is_discarded() {
        let slot = InsightSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        assert!(slot.apply(second, "fresh"));
        assert!(!slot.apply(first, "stale"));
        assert_eq!(slot.current(), Some("fresh"));
    }

    #[test]
    fn older_response_is_dropped_even_if_newer_is_pending() {
        let slot = InsightSlot::new();
        let first = slot.begin();
        let _pending = slot.begin();
        assert!(!slot.apply(first, 1));
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn begin_once_fires_once_per_key() {
        let slot: InsightSlot<String> = InsightSlot::new();
        let t = slot.begin_once("income").unwrap();
        assert!(slot.begin_once("income").is_none());
        assert!(slot.apply(t, "up 10%".to_string()));

        let t = slot.begin_once("expenses").unwrap();
        assert_eq!(slot.current(), None);
        assert_eq!(slot.key().as_deref(), Some("expenses"));
        assert!(slot.is_current(t));
        assert!(slot.begin_once("income").is_some());
    }

    #[tokio::test]
    async fn concurrent_requests_keep_only_the_newest() {
        let slot = Arc::new(InsightSlot::new());
        let tickets: Vec<Ticket> = (0..8).map(|_| slot.begin()).collect();
        let newest = *tickets.last().unwrap();

        let mut handles = Vec::new();
        for t in tickets.into_iter().rev() {
            let slot = slot.clone();
            handles.push(tokio::spawn(async move { slot.apply(t, t.seq()) }));
        }
        let kept = count_kept(handles).await;

        assert_eq!(kept, 1);
        assert_eq!(slot.current(), Some(newest.seq()));
    }

    async fn count_kept(handles: Vec<tokio::task::JoinHandle<bool>>) -> usize {
        let mut kept = 0;
        for h in handles {
            if h.await.unwrap() {
                kept += 1;
            }
        }
        kept
    }
}
