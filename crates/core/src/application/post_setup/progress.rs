// Progress Stream Multiplexer
//
// Fan-out of progress events to any number of subscribers. Every subscriber
// owns a bounded queue; when it is full the oldest pending event is dropped,
// so the producer never waits on a slow reader.

use crate::domain::ProgressEvent;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::Notify;
use tracing::debug;

/// Pending events kept per subscriber before the oldest is dropped
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

pub type SubscriberId = u64;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct QueueState {
    events: VecDeque<ProgressEvent>,
    closed: bool,
    dropped: u64,
}

/// Single-consumer bounded queue
#[derive(Default)]
struct SubscriberQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl SubscriberQueue {
    fn closed() -> Self {
        let queue = Self::default();
        lock(&queue.state).closed = true;
        queue
    }

    /// Returns true if an older event had to be dropped
    fn push(&self, event: ProgressEvent, capacity: usize) -> bool {
        let overflow = {
            let mut state = lock(&self.state);
            let overflow = state.events.len() >= capacity;
            if overflow {
                state.events.pop_front();
                state.dropped += 1;
            }
            state.events.push_back(event);
            overflow
        };
        self.notify.notify_one();
        overflow
    }

    fn close(&self) {
        lock(&self.state).closed = true;
        self.notify.notify_one();
    }

    async fn pop(&self) -> Option<ProgressEvent> {
        loop {
            {
                let mut state = lock(&self.state);
                if let Some(event) = state.events.pop_front() {
                    return Some(event);
                }
                if state.closed {
                    return None;
                }
            }
            // Single consumer: a notify_one issued between the check above and
            // this await leaves a permit, so no wakeup is lost.
            self.notify.notified().await;
        }
    }

    fn dropped(&self) -> u64 {
        lock(&self.state).dropped
    }
}

#[derive(Default)]
struct Registry {
    open: bool,
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, Arc<SubscriberQueue>>,
}

/// Registry of progress subscribers
#[derive(Clone)]
pub struct ProgressHub {
    registry: Arc<Mutex<Registry>>,
    capacity: usize,
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

impl ProgressHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            capacity: capacity.max(1),
        }
    }

    /// Start accepting live subscribers (a new event source is attached)
    pub fn open(&self) {
        lock(&self.registry).open = true;
    }

    /// End every subscription and reject live subscribers until reopened
    ///
    /// Events already queued are still delivered before each stream ends.
    pub fn close(&self) {
        let mut registry = lock(&self.registry);
        registry.open = false;
        for (_, queue) in registry.subscribers.drain() {
            queue.close();
        }
    }

    pub fn is_open(&self) -> bool {
        lock(&self.registry).open
    }

    /// Deliver `event` to every current subscriber. Never blocks.
    ///
    /// Returns the number of subscribers the event was queued for.
    pub fn publish(&self, event: &ProgressEvent) -> usize {
        let registry = lock(&self.registry);
        for (id, queue) in &registry.subscribers {
            if queue.push(event.clone(), self.capacity) {
                debug!(subscriber = id, "Progress subscriber lagging, dropped oldest event");
            }
        }
        registry.subscribers.len()
    }

    /// Join the live feed. Only events published from now on are seen.
    ///
    /// While the hub is closed the returned subscription is already finished.
    pub fn subscribe(&self) -> ProgressSubscription {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;

        if !registry.open {
            return ProgressSubscription {
                id,
                queue: Arc::new(SubscriberQueue::closed()),
                registry: Weak::new(),
            };
        }

        let queue = Arc::new(SubscriberQueue::default());
        registry.subscribers.insert(id, queue.clone());
        debug!(subscriber = id, total = registry.subscribers.len(), "Progress subscriber added");

        ProgressSubscription {
            id,
            queue,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        remove_subscriber(&self.registry, id)
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

fn remove_subscriber(registry: &Mutex<Registry>, id: SubscriberId) -> bool {
    let removed = lock(registry).subscribers.remove(&id);
    match removed {
        Some(queue) => {
            queue.close();
            debug!(subscriber = id, "Progress subscriber removed");
            true
        }
        None => false,
    }
}

/// One subscriber's view of the progress feed
///
/// Dropping it unsubscribes; [`ProgressSubscription::unsubscribe`] does the
/// same explicitly.
pub struct ProgressSubscription {
    id: SubscriberId,
    queue: Arc<SubscriberQueue>,
    registry: Weak<Mutex<Registry>>,
}

impl ProgressSubscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event in emission order, or None once the feed has ended
    pub async fn next(&mut self) -> Option<ProgressEvent> {
        self.queue.pop().await
    }

    /// Events discarded because this subscriber fell behind
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            remove_subscriber(&registry, self.id);
        }
        self.registry = Weak::new();
    }
}

impl Drop for ProgressSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}
