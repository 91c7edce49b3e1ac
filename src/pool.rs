// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Round-robin pool: N queues, N workers, one private state per worker.
//!
//! The producer pushes tasks through [`RoundRobinPool::push`], which rotates
//! across the per-worker queues. Each worker loops popping its own queue and
//! calling the shared `process` hook on its own state; worker state is
//! thread-private, so processing needs no locks. A worker that receives
//! [`ConsumerShutDown`], from its queue or from the hook itself, shuts its
//! queue down and exits, which makes the producer's next push to that queue
//! fail with [`ProducerShutDown`]: that is the whole cancellation protocol.
//!
//! Tasks are processed in an order dependent on dispatch and scheduling;
//! callers must not assume any cross-queue ordering.

use crate::queue::{ConcurrentQueue, ConsumerShutDown, ProducerShutDown};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// N queues, N workers, and the dispatch rotation.
pub struct RoundRobinPool<T> {
    queues: Vec<Arc<ConcurrentQueue<T>>>,
    workers: Vec<JoinHandle<()>>,
    processed: Vec<Arc<AtomicUsize>>,
    robin: usize,
}

impl<T: Send + 'static> RoundRobinPool<T> {
    /// A pool of `num_workers` queues with no threads running yet. Tasks may
    /// be pushed before [`start`](Self::start); they wait in the queues.
    pub fn new(num_workers: usize) -> Self {
        assert!(num_workers > 0, "pool needs at least one worker");
        Self {
            queues: (0..num_workers)
                .map(|_| Arc::new(ConcurrentQueue::new()))
                .collect(),
            workers: Vec::with_capacity(num_workers),
            processed: (0..num_workers)
                .map(|_| Arc::new(AtomicUsize::new(0)))
                .collect(),
            robin: 0,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.queues.len()
    }

    /// Spawn the worker threads. Each takes ownership of one entry of
    /// `states`; `process` is shared by all workers and returns
    /// `Err(ConsumerShutDown)` to stop the receiving worker.
    pub fn start<S, F>(&mut self, states: Vec<S>, process: F)
    where
        S: Send + 'static,
        F: Fn(&mut S, T) -> Result<(), ConsumerShutDown> + Send + Sync + 'static,
    {
        assert_eq!(states.len(), self.queues.len(), "one state per worker");
        assert!(self.workers.is_empty(), "workers already started");
        let process = Arc::new(process);
        for (i, mut state) in states.into_iter().enumerate() {
            let queue = Arc::clone(&self.queues[i]);
            let processed = Arc::clone(&self.processed[i]);
            let process = Arc::clone(&process);
            self.workers.push(thread::spawn(move || {
                loop {
                    let task = match queue.pop() {
                        Ok(task) => task,
                        Err(ConsumerShutDown) => break,
                    };
                    let outcome = process(&mut state, task);
                    processed.fetch_add(1, Ordering::Relaxed);
                    if outcome.is_err() {
                        break;
                    }
                }
                queue.shutdown_from_consumer_side();
            }));
        }
    }

    /// Hand a task to the next worker in rotation.
    pub fn push(&mut self, task: T) -> Result<(), ProducerShutDown> {
        self.robin = (self.robin + 1) % self.queues.len();
        self.queues[self.robin].push(task)
    }

    /// Drain the largest queue back through the round-robin dispatch.
    ///
    /// Only the producer may call this (no pushing elsewhere meanwhile);
    /// workers can keep popping throughout.
    pub fn rebalance_queues(&mut self) -> Result<(), ProducerShutDown> {
        let mut biggest = 0;
        let mut biggest_len = 0;
        for (i, queue) in self.queues.iter().enumerate() {
            let len = queue.len();
            if len > biggest_len {
                biggest = i;
                biggest_len = len;
            }
        }
        for _ in 0..biggest_len {
            let queue = Arc::clone(&self.queues[biggest]);
            match queue.try_pop() {
                Some(task) => self.push(task)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Total tasks processed so far, summed across workers.
    pub fn count_processed(&self) -> usize {
        self.processed
            .iter()
            .map(|p| p.load(Ordering::Relaxed))
            .sum()
    }

    /// Space-separated queue depths, for progress reporting.
    pub fn queue_sizes(&self) -> String {
        let mut out = String::new();
        for queue in &self.queues {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}", queue.len());
        }
        out
    }

    /// Whether any worker has already shut its queue down.
    pub fn is_shutting_down(&self) -> bool {
        self.queues.iter().any(|q| q.is_shut_down())
    }

    /// Let every worker drain its queue and then stop.
    pub fn shutdown_when_empty(&self) {
        for queue in &self.queues {
            queue.shutdown_when_empty();
        }
    }

    /// Stop every queue immediately, abandoning queued tasks.
    pub fn shutdown_from_producer_side(&self) {
        for queue in &self.queues {
            queue.shutdown_from_producer_side();
        }
    }

    /// Block until every worker has observed shutdown.
    pub fn wait(&self) {
        for queue in &self.queues {
            queue.wait();
        }
    }

    /// Join all worker threads.
    pub fn join(&mut self) {
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl<T> Drop for RoundRobinPool<T> {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            for queue in &self.queues {
                queue.shutdown_from_producer_side();
                queue.shutdown_from_consumer_side();
            }
            for worker in self.workers.drain(..) {
                let _ = worker.join();
            }
        }
    }
}
