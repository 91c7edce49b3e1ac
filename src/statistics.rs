// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters shared by the producer and the solver workers. The producer
//! ticks candidates as it emits them; workers record metasolutions. The
//! counters are atomic so one `Statistics` value can sit behind an `Arc`
//! without any further locking, and `increment` returns the post-increment
//! value so "am I the second metasolution?" is a single fetch-and-add.

use std::sync::atomic::{AtomicU64, Ordering};
use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

#[derive(EnumCountMacro, Copy, Clone, Debug)]
#[repr(u8)]
pub enum Counters {
    /// Candidate grids handed from the enumerator to the workers.
    CandidatesEmitted,
    /// Candidates whose Sudoku turned out to have exactly one solution.
    Metasolutions,
}

#[derive(Debug, Default)]
pub struct Statistics {
    stats: [AtomicU64; Counters::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Add 1 to the counter and return its new value.
    pub fn increment(&self, counter: Counters) -> u64 {
        self.stats[counter as usize].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current value of the counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize].load(Ordering::SeqCst)
    }
}
