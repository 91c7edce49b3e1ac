// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-worker solver state for candidate grids of one shape.
//!
//! All candidates of a shape share the same empty cells, so the matrix rows
//! for those cells never change. The template matrix is built once with the
//! nine alternative rows for every empty cell; per candidate the work matrix
//! is refilled from the template (one bulk arena copy) and only the rows for
//! the shape's filled cells are appended before solving.

use crate::dance::DanceMatrix;
use crate::sudoku::{self, Grid, NUM_CONSTRAINTS};

/// One worker's pair of matrices: the immutable template and the matrix that
/// is rebuilt from it for every candidate.
pub struct Workspace {
    mat_template: DanceMatrix,
    mat: DanceMatrix,
}

impl Workspace {
    /// Build the template for `shape`: nine candidate rows per empty cell,
    /// nothing for the clue positions.
    pub fn new(shape: &Grid) -> Workspace {
        let mut mat_template = DanceMatrix::new(NUM_CONSTRAINTS);
        for row in 0..9 {
            for col in 0..9 {
                if shape.get(row, col) != 0 {
                    continue;
                }
                for digit in 1..=9u8 {
                    sudoku::add_digit_row(&mut mat_template, row, col, digit);
                }
            }
        }
        let mat = DanceMatrix::new(NUM_CONSTRAINTS);
        Workspace { mat_template, mat }
    }

    /// Count the Sudoku solutions of one candidate, short-circuiting at two.
    ///
    /// `candidate` must fill exactly the cells the shape fills; its digit
    /// labeling is irrelevant to the count.
    pub fn count_candidate(&mut self, candidate: &Grid) -> usize {
        self.mat.reset_from(&self.mat_template);
        for row in 0..9 {
            for col in 0..9 {
                let digit = candidate.get(row, col);
                if digit != 0 {
                    sudoku::add_digit_row(&mut self.mat, row, col, digit);
                }
            }
        }
        sudoku::count_solutions_in(&mut self.mat)
    }
}
