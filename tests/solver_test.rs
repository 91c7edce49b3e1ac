// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exact-cover solver scenarios against the public API.

use metasudoku::{DanceMatrix, DanceResult};

fn count_all(mat: &mut DanceMatrix) -> usize {
    mat.solve(|_, _| DanceResult {
        count: 1,
        short_circuit: false,
    })
}

#[test]
fn test_trivial_identity_cover() {
    // [[1,0,0],[0,1,0],[0,0,1]] has exactly one cover: all three rows.
    let mut mat = DanceMatrix::new(3);
    mat.add_row(&[0]);
    mat.add_row(&[1]);
    mat.add_row(&[2]);
    let mut visits = 0;
    let mut solution_size = 0;
    let count = mat.solve(|_, sol| {
        visits += 1;
        solution_size = sol.len();
        DanceResult {
            count: 1,
            short_circuit: false,
        }
    });
    assert_eq!(count, 1);
    assert_eq!(visits, 1);
    assert_eq!(solution_size, 3);
}

#[test]
fn test_matrix_without_rows_has_no_cover() {
    let mut mat = DanceMatrix::new(5);
    let mut visits = 0;
    let count = mat.solve(|_, _| {
        visits += 1;
        DanceResult {
            count: 1,
            short_circuit: false,
        }
    });
    assert_eq!(count, 0);
    assert_eq!(visits, 0);
}

#[test]
fn test_solution_count_is_heuristic_independent() {
    // Four covers: three ways over two columns each plus pairings.
    let build = || {
        let mut mat = DanceMatrix::new(4);
        mat.add_row(&[0, 1]);
        mat.add_row(&[2, 3]);
        mat.add_row(&[0, 2]);
        mat.add_row(&[1, 3]);
        mat.add_row(&[0, 1, 2, 3]);
        mat
    };
    let mut with = build();
    with.set_min_size_heuristic(true);
    let mut without = build();
    without.set_min_size_heuristic(false);
    assert_eq!(count_all(&mut with), count_all(&mut without));
    assert_eq!(count_all(&mut with), 3);
}

#[test]
fn test_visitor_count_delta_is_aggregated() {
    let mut mat = DanceMatrix::new(2);
    mat.add_row(&[0]);
    mat.add_row(&[1]);
    mat.add_row(&[0, 1]);
    // Weight every cover by ten.
    let count = mat.solve(|_, _| DanceResult {
        count: 10,
        short_circuit: false,
    });
    assert_eq!(count, 20);
}

#[test]
fn test_short_circuit_skips_remaining_branches() {
    let mut mat = DanceMatrix::new(2);
    mat.add_row(&[0]);
    mat.add_row(&[1]);
    mat.add_row(&[0, 1]);
    let mut visits = 0;
    let count = mat.solve(|_, _| {
        visits += 1;
        DanceResult {
            count: 1,
            short_circuit: visits >= 1,
        }
    });
    assert_eq!(count, 1);
    assert_eq!(visits, 1);

    // The matrix is usable again after an abandoned search.
    assert_eq!(count_all(&mut mat), 2);
}
