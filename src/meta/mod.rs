// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The metasudoku search: does a clue *shape* admit exactly one digit
//! assignment whose Sudoku has a unique solution?
//!
//! The producer walks the odometer over all prefix-canonical digit
//! assignments (digits introduced in increasing order, so each labeling
//! class is enumerated once) and hands every candidate grid to a pool of
//! solver workers. A worker counts the candidate's Sudoku solutions with a
//! short-circuit at two; a count of exactly one is a metasolution. The
//! second metasolution anywhere decides the answer, so it shuts the pipeline
//! down: the finding worker stops, the producer's next push fails, and the
//! remaining workers drain.
//!
//! # Ordering
//!
//! Metasolutions are discovered in an order dependent on dispatch and worker
//! scheduling; only their total count matters. Printing is serialized under
//! one mutex.

mod workspace;

pub use workspace::Workspace;

use crate::odometer::Odometer;
use crate::pool::RoundRobinPool;
use crate::queue::{ConsumerShutDown, ProducerShutDown};
use crate::statistics::{Counters, Statistics};
use crate::sudoku::{self, Grid};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Size of the solver pool.
pub const NUM_THREADS: usize = 4;

/// Emit a progress line every time this many candidates have been produced.
const TICK_INTERVAL: u64 = 0x10000;

/// Back-pressure water marks, in outstanding candidates per worker: above
/// the high mark the producer sleeps; it resumes below the low mark.
const HIGH_WATER: u64 = 250_000;
const LOW_WATER: u64 = 50_000;

/// How long the producer naps while the workers catch up.
const BACK_PRESSURE_NAP: Duration = Duration::from_millis(500);

/// 9^k, the overcount factor when the last `k` wheels are cut off.
const fn pow9(mut k: usize) -> u64 {
    let mut result = 1u64;
    while k > 0 {
        result *= 9;
        k -= 1;
    }
    result
}

/// Walk every prefix-canonical digit assignment of `odometer`, calling
/// `emit` once per candidate.
///
/// `SHORT_CUT` is a diagnostic knob: 0 enumerates exactly; `k > 0` stops the
/// recursion `k` wheels early, overcounting by at most `9^k`, which measures
/// how tight the conflict pruning is. With `SHORT_CUT == 0` a candidate is
/// only emitted when at least eight distinct digits appear (the ninth digit
/// of any solvable Sudoku is forced by elimination).
///
/// An `Err` from `emit` unwinds the entire enumeration immediately.
pub fn enumerate_candidates<const SHORT_CUT: usize, F>(
    odometer: &mut Odometer,
    emit: &mut F,
) -> Result<(), ProducerShutDown>
where
    F: FnMut(&Odometer) -> Result<(), ProducerShutDown>,
{
    assert!(SHORT_CUT <= 16, "9^17 overflows the viable-grid counts");
    let stop_at = odometer.len().saturating_sub(SHORT_CUT);
    walk::<SHORT_CUT, F>(odometer, 0, 1, stop_at, emit)
}

fn walk<const SHORT_CUT: usize, F>(
    odometer: &mut Odometer,
    wheel: usize,
    next_unseen: u8,
    stop_at: usize,
    emit: &mut F,
) -> Result<(), ProducerShutDown>
where
    F: FnMut(&Odometer) -> Result<(), ProducerShutDown>,
{
    if wheel == stop_at {
        if SHORT_CUT != 0 || next_unseen >= 9 {
            emit(odometer)?;
        }
        return Ok(());
    }

    for value in 1..next_unseen {
        if odometer.has_prior_conflict(wheel, value) {
            continue;
        }
        odometer.set_value(wheel, value);
        walk::<SHORT_CUT, F>(odometer, wheel + 1, next_unseen, stop_at, emit)?;
    }
    if next_unseen <= 9 {
        // A fresh digit can never conflict with an earlier wheel.
        odometer.set_value(wheel, next_unseen);
        walk::<SHORT_CUT, F>(odometer, wheel + 1, next_unseen + 1, stop_at, emit)?;
    }
    Ok(())
}

/// Count the candidates the enumeration would visit, without solving any.
/// With `SHORT_CUT > 0` each emission stands for up to `9^SHORT_CUT` grids.
pub fn count_viable_grids<const SHORT_CUT: usize>(shape: &Grid) -> u64 {
    let mut odometer = Odometer::from_shape(shape);
    let mut count = 0u64;
    let _ = enumerate_candidates::<SHORT_CUT, _>(&mut odometer, &mut |_| {
        count += pow9(SHORT_CUT);
        Ok(())
    });
    count
}

/// Single-threaded metasolution count, stopping once `limit` are found.
/// Suits tests and small shapes; the full pipeline is
/// [`metasudoku_has_exactly_one_solution`].
pub fn count_metasolutions(shape: &Grid, limit: usize) -> usize {
    let mut workspace = Workspace::new(shape);
    let mut odometer = Odometer::from_shape(shape);
    let mut found = 0usize;
    let _ = enumerate_candidates::<0, _>(&mut odometer, &mut |odometer| {
        if workspace.count_candidate(&odometer.to_grid()) == 1 {
            found += 1;
            if found >= limit {
                return Err(ProducerShutDown);
            }
        }
        Ok(())
    });
    found
}

/// True when a line swap proves the shape cannot have exactly one
/// metasolution: two rows of one band, or two columns of one stack, are
/// empty at exactly the same positions, so swapping those lines in any
/// solution yields a distinct Sudoku with the same shape.
pub fn grid_obviously_has_multiple_solutions(shape: &Grid) -> bool {
    for band in 0..3 {
        for a in 0..3 {
            for b in (a + 1)..3 {
                let (r1, r2) = (3 * band + a, 3 * band + b);
                if (0..9).all(|c| (shape.get(r1, c) == 0) == (shape.get(r2, c) == 0)) {
                    return true;
                }
            }
        }
    }
    for stack in 0..3 {
        for a in 0..3 {
            for b in (a + 1)..3 {
                let (c1, c2) = (3 * stack + a, 3 * stack + b);
                if (0..9).all(|r| (shape.get(r, c1) == 0) == (shape.get(r, c2) == 0)) {
                    return true;
                }
            }
        }
    }
    false
}

/// One-line progress ticker: processed count, outstanding backlog, and the
/// processing rate since the search began.
struct ProgressTicker {
    start: Instant,
}

impl ProgressTicker {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    fn report(&self, processed: u64, outstanding: u64) {
        let rate = processed as f64 / self.start.elapsed().as_secs_f64().max(1e-9);
        print!("\rmeta {processed} (+{outstanding}) {rate:.0}/sec");
        let _ = io::stdout().flush();
    }
}

/// Run the full parallel pipeline for `shape` with [`NUM_THREADS`] workers.
pub fn metasudoku_has_exactly_one_solution(shape: &Grid) -> bool {
    metasudoku_has_exactly_one_solution_with(shape, NUM_THREADS)
}

/// As [`metasudoku_has_exactly_one_solution`], with an explicit worker count.
pub fn metasudoku_has_exactly_one_solution_with(shape: &Grid, num_workers: usize) -> bool {
    let statistics = Arc::new(Statistics::new());
    let print_lock = Arc::new(Mutex::new(()));

    let mut pool: RoundRobinPool<Grid> = RoundRobinPool::new(num_workers);
    let workspaces: Vec<Workspace> = (0..num_workers).map(|_| Workspace::new(shape)).collect();
    {
        let statistics = Arc::clone(&statistics);
        let print_lock = Arc::clone(&print_lock);
        pool.start(workspaces, move |workspace, candidate: Grid| {
            process_candidate(workspace, &candidate, &statistics, &print_lock)
        });
    }

    let mut odometer = Odometer::from_shape(shape);
    let ticker = ProgressTicker::new();
    let outcome = enumerate_candidates::<0, _>(&mut odometer, &mut |odometer| {
        let emitted = statistics.increment(Counters::CandidatesEmitted);
        if emitted % TICK_INTERVAL == 0 {
            let processed = pool.count_processed() as u64;
            ticker.report(processed, emitted - processed);
            apply_back_pressure(&mut pool, &ticker, emitted)?;
        }
        pool.push(odometer.to_grid())
    });

    if outcome.is_err() {
        println!(
            "\nshort-circuiting with {} metasolutions!",
            statistics.get(Counters::Metasolutions)
        );
    }
    // Either way the workers drain what is already queued.
    pool.shutdown_when_empty();
    pool.wait();
    pool.join();

    let num_solutions = statistics.get(Counters::Metasolutions);
    println!("num_solutions is {num_solutions}");
    num_solutions == 1
}

/// Worker hook: count one candidate, record and print a metasolution, and
/// stop the pipeline at the second one.
fn process_candidate(
    workspace: &mut Workspace,
    candidate: &Grid,
    statistics: &Statistics,
    print_lock: &Mutex<()>,
) -> Result<(), ConsumerShutDown> {
    if workspace.count_candidate(candidate) == 1 {
        let _guard = print_lock.lock().unwrap();
        println!("\nThis sudoku grid was a meta solution!");
        print!("{candidate}");
        if let Some(solution) = sudoku::unique_solution(candidate) {
            println!("The unique solution to the sudoku grid above is:");
            print!("{solution}");
        }
        if statistics.increment(Counters::Metasolutions) >= 2 {
            return Err(ConsumerShutDown);
        }
    }
    Ok(())
}

/// When the backlog tops the high-water mark, nap until the workers pull it
/// below the low-water mark (or the pipeline is cancelled), then respread
/// the queues.
fn apply_back_pressure(
    pool: &mut RoundRobinPool<Grid>,
    ticker: &ProgressTicker,
    emitted: u64,
) -> Result<(), ProducerShutDown> {
    let workers = pool.num_workers() as u64;
    if emitted - (pool.count_processed() as u64) <= HIGH_WATER * workers {
        return Ok(());
    }
    loop {
        thread::sleep(BACK_PRESSURE_NAP);
        let processed = pool.count_processed() as u64;
        ticker.report(processed, emitted - processed);
        if pool.is_shutting_down() {
            return Err(ProducerShutDown);
        }
        if emitted - processed < LOW_WATER * workers {
            break;
        }
    }
    pool.rebalance_queues()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal_shape() -> Grid {
        let mut shape = Grid::default();
        for i in 0..9 {
            shape.set(i, i, 1 + i as u8);
        }
        shape
    }

    #[test]
    fn test_pow9() {
        assert_eq!(pow9(0), 1);
        assert_eq!(pow9(1), 9);
        assert_eq!(pow9(3), 729);
    }

    #[test]
    fn test_single_clue_shape_has_no_viable_grid() {
        // One wheel can introduce only one distinct digit; canonical
        // candidates need at least eight.
        let mut shape = Grid::default();
        shape.set(4, 4, 7);
        assert_eq!(count_viable_grids::<0>(&shape), 0);
        assert_eq!(count_metasolutions(&shape, 2), 0);
    }

    #[test]
    fn test_empty_shape_has_no_viable_grid() {
        assert_eq!(count_viable_grids::<0>(&Grid::default()), 0);
    }

    #[test]
    fn test_diagonal_viable_grids() {
        // One all-distinct assignment plus 27 assignments reusing a single
        // earlier digit across box-diagonal triples.
        assert_eq!(count_viable_grids::<0>(&diagonal_shape()), 28);
    }

    #[test]
    fn test_short_cut_overcounts_by_a_factor_of_nine_at_most() {
        let exact = count_viable_grids::<0>(&diagonal_shape());
        let cut = count_viable_grids::<1>(&diagonal_shape());
        assert_eq!(cut % 9, 0);
        assert!(cut >= exact);
    }

    #[test]
    fn test_candidates_are_emitted_relabeled_and_conflict_free() {
        let mut odometer = Odometer::from_shape(&diagonal_shape());
        let mut candidates = Vec::new();
        enumerate_candidates::<0, _>(&mut odometer, &mut |odo| {
            candidates.push(odo.to_grid());
            Ok(())
        })
        .unwrap();
        assert_eq!(candidates.len(), 28);
        for grid in &candidates {
            // Canonical relabeling puts 1 in the first filled cell.
            assert_eq!(grid.at(0), 1);
            // Box-diagonal triples stay distinct.
            for boxed in 0..3usize {
                let cells: Vec<u8> = (0..3)
                    .map(|k| grid.get(3 * boxed + k, 3 * boxed + k))
                    .collect();
                assert!(cells[0] != cells[1] && cells[1] != cells[2] && cells[0] != cells[2]);
            }
        }
    }

    #[test]
    fn test_diagonal_shape_is_not_a_metasudoku() {
        // Every candidate leaves 72 free cells, so none completes uniquely.
        assert_eq!(count_metasolutions(&diagonal_shape(), 2), 0);
    }

    #[test]
    fn test_line_swap_detection() {
        // Rows 0 and 1 share the same clue columns.
        let mut shape = Grid::default();
        shape.set(0, 2, 1);
        shape.set(1, 2, 1);
        shape.set(0, 5, 1);
        shape.set(1, 5, 1);
        shape.set(4, 7, 1);
        assert!(grid_obviously_has_multiple_solutions(&shape));

        assert!(!grid_obviously_has_multiple_solutions(&diagonal_shape()));

        // The reference 17-clue shape has two stack columns clued in the
        // same rows.
        assert!(grid_obviously_has_multiple_solutions(
            &crate::sudoku::EXAMPLE_17_CLUE
        ));
    }
}
