// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Single-producer single-consumer queue with cooperative shutdown.
//!
//! The queue has four observable states:
//!
//! | state               | push                    | pop                           |
//! |---------------------|-------------------------|-------------------------------|
//! | running             | enqueue, wake consumer  | wait, return head             |
//! | shutdown when empty | asserts (must not push) | head while nonempty, then stop|
//! | producer shut down  | `Err(ProducerShutDown)` | stop, wake waiters            |
//! | consumer shut down  | `Err(ProducerShutDown)` | stop                          |
//!
//! "Stop" means `pop` returns [`ConsumerShutDown`] and records that the
//! consumer has been notified, releasing anyone blocked in [`wait`]. Shutdown
//! is ordinary control flow here, not an error: the signal types exist so
//! that both sides unwind by plain `Result` propagation.
//!
//! Within one queue the order is FIFO; there is no ordering across queues.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Signal to the producer: the queue no longer accepts pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerShutDown;

/// Signal to the consumer: the queue will never yield another task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerShutDown;

#[derive(Debug)]
struct Inner<T> {
    queue: VecDeque<T>,
    shutdown: bool,
    shutdown_when_empty: bool,
    consumer_notified: bool,
}

/// A mutex-and-condvar FIFO channel between one producer and one consumer.
#[derive(Debug)]
pub struct ConcurrentQueue<T> {
    inner: Mutex<Inner<T>>,
    /// Signaled when an item arrives or the state changes.
    items: Condvar,
    /// Signaled when the consumer has observed shutdown.
    drained: Condvar,
}

impl<T> ConcurrentQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                shutdown: false,
                shutdown_when_empty: false,
                consumer_notified: false,
            }),
            items: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Snapshot of the number of queued tasks.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether either side has fully shut the queue down.
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().unwrap().shutdown
    }

    /// Enqueue a task and wake the consumer.
    pub fn push(&self, task: T) -> Result<(), ProducerShutDown> {
        let mut inner = self.inner.lock().unwrap();
        assert!(
            !inner.shutdown_when_empty,
            "push after shutdown_when_empty"
        );
        if inner.shutdown {
            return Err(ProducerShutDown);
        }
        inner.queue.push_back(task);
        drop(inner);
        self.items.notify_one();
        Ok(())
    }

    /// Dequeue the head task, blocking while the queue is empty and running.
    pub fn pop(&self) -> Result<T, ConsumerShutDown> {
        let mut inner = self.inner.lock().unwrap();
        while inner.queue.is_empty() {
            if inner.shutdown || inner.shutdown_when_empty {
                inner.consumer_notified = true;
                self.drained.notify_all();
                return Err(ConsumerShutDown);
            }
            inner = self.items.wait(inner).unwrap();
        }
        if inner.shutdown {
            inner.consumer_notified = true;
            self.drained.notify_all();
            return Err(ConsumerShutDown);
        }
        Ok(inner.queue.pop_front().unwrap())
    }

    /// Dequeue the head task if one is immediately available.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().unwrap().queue.pop_front()
    }

    /// Stop the queue from the producer's side: queued tasks are abandoned
    /// and the consumer stops on its next pop.
    pub fn shutdown_from_producer_side(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.shutdown = true;
        drop(inner);
        self.items.notify_all();
    }

    /// Stop the queue from the consumer's side: further pushes fail and
    /// waiters are released immediately.
    pub fn shutdown_from_consumer_side(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.shutdown = true;
        inner.consumer_notified = true;
        drop(inner);
        self.items.notify_all();
        self.drained.notify_all();
    }

    /// Let the consumer drain the queue, then stop it. The producer must not
    /// push again after calling this.
    pub fn shutdown_when_empty(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.shutdown_when_empty = true;
        drop(inner);
        self.items.notify_all();
    }

    /// Block until the consumer has been told to stop. Only meaningful after
    /// one of the shutdown transitions.
    pub fn wait(&self) {
        let mut inner = self.inner.lock().unwrap();
        assert!(
            inner.shutdown || inner.shutdown_when_empty,
            "wait before any shutdown"
        );
        while !inner.consumer_notified {
            inner = self.drained.wait(inner).unwrap();
        }
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let q = ConcurrentQueue::new();
        for i in 0..5 {
            q.push(i).unwrap();
        }
        assert_eq!(q.len(), 5);
        for i in 0..5 {
            assert_eq!(q.pop(), Ok(i));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_try_pop_never_blocks() {
        let q = ConcurrentQueue::<u32>::new();
        assert_eq!(q.try_pop(), None);
        q.push(7).unwrap();
        assert_eq!(q.try_pop(), Some(7));
    }

    #[test]
    fn test_drain_mode_yields_tail_then_stops() {
        let q = ConcurrentQueue::new();
        q.push(1).unwrap();
        q.push(2).unwrap();
        q.shutdown_when_empty();
        assert_eq!(q.pop(), Ok(1));
        assert_eq!(q.pop(), Ok(2));
        assert_eq!(q.pop(), Err(ConsumerShutDown));
        // The failed pop notified the consumer, so wait returns at once.
        q.wait();
    }

    #[test]
    fn test_producer_shutdown_abandons_queue() {
        let q = ConcurrentQueue::new();
        q.push(1).unwrap();
        q.shutdown_from_producer_side();
        assert_eq!(q.pop(), Err(ConsumerShutDown));
        assert_eq!(q.push(2), Err(ProducerShutDown));
    }

    #[test]
    fn test_consumer_shutdown_rejects_pushes() {
        let q = ConcurrentQueue::<u32>::new();
        q.shutdown_from_consumer_side();
        assert_eq!(q.push(1), Err(ProducerShutDown));
        assert!(q.is_shut_down());
        q.wait();
    }

    #[test]
    fn test_blocked_consumer_wakes_on_shutdown() {
        let q = Arc::new(ConcurrentQueue::<u32>::new());
        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                let mut received = Vec::new();
                while let Ok(v) = q.pop() {
                    received.push(v);
                }
                received
            })
        };
        for i in 0..100 {
            q.push(i).unwrap();
        }
        q.shutdown_when_empty();
        q.wait();
        let received = consumer.join().unwrap();
        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }
}
