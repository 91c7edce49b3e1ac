// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Sudoku as exact cover.
//!
//! A filled 9x9 grid is a selection of 81 rows from a 324-column 0/1 matrix,
//! each row covering four constraint columns exactly once:
//!
//! - `[0, 81)`: digit d appears in grid row r (`9*r + d-1`)
//! - `[81, 162)`: digit d appears in grid column c (`81 + 9*c + d-1`)
//! - `[162, 243)`: digit d appears in box b (`162 + 9*b + d-1`)
//! - `[243, 324)`: cell (r, c) holds some digit (`243 + 9*r + c`)
//!
//! A pre-filled cell contributes one matrix row; an empty cell contributes
//! one row per digit not already committed earlier in the same grid row (a
//! correctness-preserving pruning of obviously infeasible alternatives).

mod grid;

pub use grid::{Grid, ParseGridError};

use crate::dance::{DanceMatrix, DanceResult, NodeId};

/// Number of constraint columns in the Sudoku matrix.
pub const NUM_CONSTRAINTS: usize = 324;

/// The 3x3 box containing `(row, col)`.
fn box_of(row: usize, col: usize) -> usize {
    (row / 3) * 3 + col / 3
}

/// Append the matrix row asserting "cell (row, col) holds `digit`".
pub(crate) fn add_digit_row(mat: &mut DanceMatrix, row: usize, col: usize, digit: u8) {
    let d = digit as usize - 1;
    mat.add_row(&[
        9 * row + d,
        81 + 9 * col + d,
        162 + 9 * box_of(row, col) + d,
        243 + (9 * row + col),
    ]);
}

/// Build the full constraint matrix for `grid`: one row per clue, and one row
/// per empty cell and candidate digit not yet seen in that grid row.
pub fn build_matrix(grid: &Grid) -> DanceMatrix {
    let mut mat = DanceMatrix::new(NUM_CONSTRAINTS);
    for row in 0..9 {
        let mut seen_this_row = [false; 9];
        for col in 0..9 {
            let clue = grid.get(row, col);
            if clue != 0 {
                add_digit_row(&mut mat, row, col, clue);
                seen_this_row[clue as usize - 1] = true;
            } else {
                for digit in 1..=9u8 {
                    if seen_this_row[digit as usize - 1] {
                        continue;
                    }
                    add_digit_row(&mut mat, row, col, digit);
                }
            }
        }
    }
    mat
}

/// Count the completions of `grid`, short-circuiting at two.
///
/// Returns 0, 1, or 2, with 2 standing for "two or more".
pub fn count_solutions(grid: &Grid) -> usize {
    let mut mat = build_matrix(grid);
    count_solutions_in(&mut mat)
}

/// Run the count-and-short-circuit visitor over an already-built matrix.
pub(crate) fn count_solutions_in(mat: &mut DanceMatrix) -> usize {
    let mut seen = 0usize;
    mat.solve(|_, _| {
        seen += 1;
        DanceResult {
            count: 1,
            short_circuit: seen >= 2,
        }
    })
}

/// The completion of `grid`, if there is one. Callers that need uniqueness
/// check [`count_solutions`] first; this returns the first completion found.
pub fn unique_solution(grid: &Grid) -> Option<Grid> {
    let mut mat = build_matrix(grid);
    let mut found = None;
    mat.solve(|mat, sol| {
        found = Some(decode_solution(mat, sol));
        DanceResult {
            count: 1,
            short_circuit: true,
        }
    });
    found
}

/// Translate a solution's witness rows back into a grid by reading each
/// row's constraint columns.
pub(crate) fn decode_solution(mat: &DanceMatrix, witnesses: &[NodeId]) -> Grid {
    let mut grid = Grid::default();
    for &w in witnesses {
        let (mut row, mut col, mut digit) = (0, 0, 0u8);
        for c in mat.row_columns(w) {
            if c < 81 {
                row = c / 9;
                digit = (c % 9 + 1) as u8;
            } else if c < 162 {
                col = (c - 81) / 9;
            }
        }
        grid.set(row, col, digit);
    }
    grid
}

/// A newspaper puzzle with a unique solution.
pub const EXAMPLE_NEWSPAPER: Grid = Grid::new([
    4, 8, 0, 9, 2, 0, 3, 0, 0, //
    9, 5, 0, 0, 8, 0, 0, 0, 4, //
    0, 0, 2, 5, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 4, 0, 0, 7, //
    5, 4, 0, 0, 3, 0, 0, 9, 2, //
    8, 0, 0, 7, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 5, 2, 0, 0, //
    3, 0, 0, 0, 7, 0, 0, 6, 1, //
    0, 0, 5, 0, 1, 9, 0, 4, 3,
]);

/// A proper 17-clue puzzle.
pub const EXAMPLE_17_CLUE: Grid = Grid::new([
    0, 0, 0, 8, 0, 1, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 4, 3, //
    5, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 7, 0, 8, 0, 0, //
    0, 0, 0, 0, 0, 0, 1, 0, 0, //
    0, 2, 0, 0, 3, 0, 0, 0, 0, //
    6, 0, 0, 0, 0, 0, 0, 7, 5, //
    0, 0, 3, 4, 0, 0, 0, 0, 0, //
    0, 0, 0, 2, 0, 0, 6, 0, 0,
]);

/// A third reference puzzle with a unique solution.
pub const EXAMPLE_MOOSE: Grid = Grid::new([
    0, 0, 9, 0, 0, 0, 8, 0, 0, //
    0, 6, 0, 0, 0, 0, 0, 4, 0, //
    3, 0, 0, 1, 4, 2, 0, 0, 9, //
    0, 1, 4, 0, 0, 0, 9, 6, 0, //
    0, 0, 5, 6, 0, 9, 7, 0, 0, //
    0, 0, 8, 0, 0, 0, 2, 0, 0, //
    0, 0, 6, 0, 0, 0, 3, 0, 0, //
    0, 0, 0, 9, 0, 5, 0, 0, 0, //
    0, 0, 0, 0, 1, 0, 0, 0, 0,
]);
