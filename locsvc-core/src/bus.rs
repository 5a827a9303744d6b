//! Multi-producer, single-consumer event bus
//!
//! The queue is an unbounded `VecDeque` behind a critical-section mutex, with a
//! [`Signal`] as doorbell for the consumer. `put` takes the lock only for
//! the push, so it is safe from interrupt handlers and from any task. All
//! producers share the one queue, so messages come out in the order they
//! were pushed, whichever producer pushed them.
//!
//! The doorbell may ring with nothing queued (the consumer already drained
//! the message that rang it). `get` re-checks the queue after every wake, so
//! a stale ring costs one extra poll and nothing more.

use alloc::collections::VecDeque;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::message::Message;

/// Ordered, unbounded MPSC queue of [`Message`]s
pub struct EventBus {
    queue: Mutex<CriticalSectionRawMutex, RefCell<VecDeque<Message>>>,
    ready: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty bus (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(VecDeque::new())),
            ready: Signal::new(),
        }
    }

    /// Enqueue `msg` without blocking
    pub fn put(&self, msg: Message) {
        log_trace!("bus: put {:?}", msg.kind());
        self.queue.lock(|q| q.borrow_mut().push_back(msg));
        self.ready.signal(());
    }

    /// Dequeue the oldest message if there is one
    pub fn try_get(&self) -> Option<Message> {
        self.queue.lock(|q| q.borrow_mut().pop_front())
    }

    /// Wait for and dequeue the oldest message
    ///
    /// Only one consumer may wait at a time.
    pub async fn get(&self) -> Message {
        loop {
            if let Some(msg) = self.try_get() {
                return msg;
            }
            self.ready.wait().await;
        }
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.queue.lock(|q| q.borrow().len())
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
