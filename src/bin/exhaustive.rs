// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Runs the metasudoku search over a dictionary of shapes.
//!
//! The input file holds one shape per line: 81 characters from '0' to '9',
//! read left-to-right, top-to-bottom, with '0' for an empty cell. Every line
//! is expected to be a proper puzzle (unique solution); shapes that a line
//! swap proves non-unique are reported without searching.

use metasudoku::meta::{self, grid_obviously_has_multiple_solutions};
use metasudoku::sudoku::{self, EXAMPLE_17_CLUE, EXAMPLE_MOOSE, EXAMPLE_NEWSPAPER};
use metasudoku::Grid;
use std::{env, fs, process};

fn self_test() {
    for grid in [&EXAMPLE_NEWSPAPER, &EXAMPLE_17_CLUE, &EXAMPLE_MOOSE] {
        if sudoku::count_solutions(grid) != 1 {
            println!("FAILED SELF TEST");
            process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    assert_eq!(2, args.len(), "usage: {} <shape-file>", args[0]);

    self_test();

    let text = fs::read_to_string(&args[1])
        .unwrap_or_else(|e| panic!("cannot read {}: {}", args[1], e));
    let mut counter = 0;
    for line in text.lines() {
        let grid: Grid = line
            .parse()
            .unwrap_or_else(|e| panic!("line {}: {}", counter + 1, e));
        counter += 1;

        if sudoku::count_solutions(&grid) != 1 {
            println!("FAILED SELF TEST");
            process::exit(1);
        }

        let unique = if grid_obviously_has_multiple_solutions(&grid) {
            false
        } else {
            meta::metasudoku_has_exactly_one_solution(&grid)
        };
        println!(
            "metasudoku {} {} have exactly one solution",
            counter,
            if unique { "does" } else { "does not" }
        );
    }
    println!("Finished checking all {counter} configurations.");
}
