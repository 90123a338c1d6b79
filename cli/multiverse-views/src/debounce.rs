//! Deliver a value only after input has been quiet for a while.
//!
//! Used for search-as-you-type: every keystroke [schedules](Debouncer::schedule)
//! the current text, but only the text that was not followed by another
//! keystroke within the quiet period reaches the [Debounced] receiver.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Sending half, owned by whoever receives the raw input.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    sender: mpsc::UnboundedSender<(u64, T)>,
}

/// Receiving half, yields at most one value per quiet period.
#[derive(Debug)]
pub struct Debounced<T> {
    generation: Arc<AtomicU64>,
    receiver: mpsc::UnboundedReceiver<(u64, T)>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, Debounced<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        let debouncer = Self {
            delay,
            generation: generation.clone(),
            pending: None,
            sender,
        };
        (debouncer, Debounced {
            generation,
            receiver,
        })
    }

    /// Replace any pending value with `value`, restarting the quiet period.
    pub fn schedule(&mut self, value: T) {
        self.abort_pending();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let sender = self.sender.clone();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(generation, "quiet period elapsed");
            // the receiver may be gone already, nothing left to deliver to
            let _ = sender.send((generation, value));
        }));
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) {
        self.abort_pending();
        // a value that was sent but not yet received is stale now
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether a value is waiting for its quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> Debounced<T> {
    /// Wait for the next value that survived its quiet period.
    ///
    /// Returns `None` once the [Debouncer] is dropped.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            let (generation, value) = self.receiver.recv().await?;
            if generation == self.generation.load(Ordering::SeqCst) {
                return Some(value);
            }
            trace!(generation, "dropping superseded value");
        }
    }
}
