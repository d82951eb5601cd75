use crate::error::{Interrupted, PipelineError, Result};
use crate::flag::WorkFlag;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// The part of a queue a stage runner touches without knowing the item type
pub trait QueueEnd: Send + Sync {
    /// Wake every thread blocked on this object without changing its contents
    fn wake_all(&self);

    /// Mark the end of the stream. Queued items stay available to consumers;
    /// further enqueues fail and an emptied queue reports end-of-stream.
    fn close(&self);
}

struct Shared<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    // Written only under the `items` lock.
    closed: AtomicBool,
    block_count: AtomicU64,
    interrupt_count: AtomicU64,
}

/// A capacity-bounded FIFO queue with blocking, interruptible enqueue and dequeue.
///
/// Cloning yields another handle to the same queue, which is how the producing
/// and consuming stage share it. The queue is freed when the last handle drops.
pub struct BoundedBlockingQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BoundedBlockingQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBlockingQueue")
            .field("len", &self.len())
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}

impl<T> BoundedBlockingQueue<T> {
    /// Create a queue with no practical capacity limit
    pub fn new() -> Self {
        Self::build(usize::MAX)
    }

    /// Create a queue holding at most `capacity` items
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::ConfigError(
                "queue capacity must be at least 1".into(),
            ));
        }
        Ok(Self::build(capacity))
    }

    fn build(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(VecDeque::new()),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity,
                closed: AtomicBool::new(false),
                block_count: AtomicU64::new(0),
                interrupt_count: AtomicU64::new(0),
            }),
        }
    }

    /// Append `item` at the tail, waiting while the queue is full.
    ///
    /// Fails with [`Interrupted`] if the queue is full and `flag` is down, or
    /// if the queue has been [closed](QueueEnd::close) by either side.
    pub fn enqueue(&self, item: T, flag: &WorkFlag) -> std::result::Result<(), Interrupted> {
        let shared = &*self.shared;
        let mut items = shared.items.lock();

        let mut counted = false;
        loop {
            if shared.closed.load(Ordering::Relaxed) {
                shared.interrupt_count.fetch_add(1, Ordering::Relaxed);
                return Err(Interrupted);
            }
            if items.len() < shared.capacity {
                break;
            }
            if !flag.is_live() {
                shared.interrupt_count.fetch_add(1, Ordering::Relaxed);
                return Err(Interrupted);
            }
            if !counted {
                shared.block_count.fetch_add(1, Ordering::Relaxed);
                counted = true;
            }
            shared.not_full.wait(&mut items);
        }

        items.push_back(item);
        drop(items);
        shared.not_empty.notify_one();
        Ok(())
    }

    /// Remove and return the head, waiting while the queue is empty.
    ///
    /// Items already queued are returned even after `flag` went down; only an
    /// empty queue with a lowered flag, or an empty closed queue, fails with
    /// [`Interrupted`].
    pub fn dequeue(&self, flag: &WorkFlag) -> std::result::Result<T, Interrupted> {
        match self.recv(flag) {
            Ok(Some(item)) => Ok(item),
            Ok(None) => {
                self.shared.interrupt_count.fetch_add(1, Ordering::Relaxed);
                Err(Interrupted)
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`dequeue`](Self::dequeue), but tells end-of-stream apart from an
    /// interrupt: `Ok(None)` once the queue is closed and fully drained.
    pub fn recv(&self, flag: &WorkFlag) -> std::result::Result<Option<T>, Interrupted> {
        let shared = &*self.shared;
        let mut items = shared.items.lock();

        let item = loop {
            if let Some(item) = items.pop_front() {
                break item;
            }
            if shared.closed.load(Ordering::Relaxed) {
                return Ok(None);
            }
            if !flag.is_live() {
                shared.interrupt_count.fetch_add(1, Ordering::Relaxed);
                return Err(Interrupted);
            }
            shared.not_empty.wait(&mut items);
        };

        drop(items);
        shared.not_full.notify_one();
        Ok(Some(item))
    }

    /// Current number of queued items
    pub fn len(&self) -> usize {
        self.shared.items.lock().len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.shared.items.lock().is_empty()
    }

    /// Whether [`close`](QueueEnd::close) has been called
    pub fn is_closed(&self) -> bool {
        let _items = self.shared.items.lock();
        self.shared.closed.load(Ordering::Relaxed)
    }

    /// Maximum number of items the queue holds
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of enqueue calls that had to wait for free space
    pub fn block_count(&self) -> u64 {
        self.shared.block_count.load(Ordering::Relaxed)
    }

    /// Number of operations that returned [`Interrupted`]
    pub fn interrupt_count(&self) -> u64 {
        self.shared.interrupt_count.load(Ordering::Relaxed)
    }
}

impl<T> Default for BoundedBlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> QueueEnd for BoundedBlockingQueue<T> {
    fn wake_all(&self) {
        // Holding the lock orders this wake after any waiter's flag check.
        let _items = self.shared.items.lock();
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();
    }

    fn close(&self) {
        let _items = self.shared.items.lock();
        self.shared.closed.store(true, Ordering::Relaxed);
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();
    }
}
