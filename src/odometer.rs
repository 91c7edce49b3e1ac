// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The odometer: a variable-base counter over a shape's clue positions.
//!
//! Each clue position becomes one wheel. A wheel remembers which *earlier*
//! wheels share its row, column, or box, so the enumeration can reject a
//! digit the moment it collides instead of after filling the whole grid.
//! Wheels are appended in [`GRID_FILL_ORDER`], a fixed permutation of the 81
//! cells chosen empirically so that infeasible prefixes prune early.
//!
//! An odometer is a plain value: construction appends wheels, enumeration
//! only rewrites the `value` fields.

use crate::sudoku::Grid;

/// Upper bound on how many earlier wheels can conflict with one position:
/// 8 in the row, 8 in the column, and 4 more in the box.
pub const MAX_CONFLICTS: usize = 20;

/// The order in which grid cells are visited when building an odometer.
///
/// Filling in non-reading order helps the solver reject unsolvable prefixes
/// quickly; the particular permutation is arbitrary but fixed, because the
/// canonical labeling of candidates depends on it.
pub const GRID_FILL_ORDER: [u8; 81] = [
    30, 71, 34, 51, 36, 9, 20, 53, 38, //
    33, 0, 31, 70, 57, 52, 37, 8, 21, //
    72, 29, 50, 35, 10, 19, 54, 39, 6, //
    49, 32, 1, 56, 69, 58, 7, 22, 61, //
    28, 73, 48, 11, 18, 55, 60, 5, 40, //
    47, 12, 27, 2, 59, 68, 41, 62, 23, //
    74, 15, 76, 79, 26, 17, 4, 65, 42, //
    77, 46, 13, 16, 3, 44, 67, 24, 63, //
    14, 75, 78, 45, 80, 25, 64, 43, 66,
];

/// One digit of the odometer: a clue position, its current value, and the
/// indices of earlier wheels it must differ from.
#[derive(Debug, Clone, Copy)]
pub struct OdometerWheel {
    /// Flat grid index of the clue position, `0..81`.
    pub idx: u8,
    /// Current digit, 0 while unassigned.
    pub value: u8,
    num_conflicts: u8,
    conflicts: [u8; MAX_CONFLICTS],
}

impl OdometerWheel {
    const fn new(idx: u8) -> OdometerWheel {
        OdometerWheel {
            idx,
            value: 0,
            num_conflicts: 0,
            conflicts: [0; MAX_CONFLICTS],
        }
    }

    fn add_conflict(&mut self, earlier_wheel: u8) {
        assert!((self.num_conflicts as usize) < MAX_CONFLICTS);
        self.conflicts[self.num_conflicts as usize] = earlier_wheel;
        self.num_conflicts += 1;
    }

    /// Indices of the earlier wheels sharing a row, column, or box.
    pub fn conflicts(&self) -> &[u8] {
        &self.conflicts[..self.num_conflicts as usize]
    }
}

/// All wheels of one shape, in fill order.
#[derive(Debug, Clone, Copy)]
pub struct Odometer {
    wheels: [OdometerWheel; 81],
    num_wheels: u8,
}

fn same_unit(a: usize, b: usize) -> bool {
    let (ar, ac) = (a / 9, a % 9);
    let (br, bc) = (b / 9, b % 9);
    ar == br || ac == bc || (ar / 3 == br / 3 && ac / 3 == bc / 3)
}

impl Odometer {
    /// Build the odometer for `shape`: one wheel per non-zero cell, visited
    /// in [`GRID_FILL_ORDER`], each recording its conflicts with the wheels
    /// before it.
    pub fn from_shape(shape: &Grid) -> Odometer {
        let mut odometer = Odometer {
            wheels: [OdometerWheel::new(0); 81],
            num_wheels: 0,
        };
        for &idx in GRID_FILL_ORDER.iter() {
            let idx = idx as usize;
            if shape.at(idx) == 0 {
                continue;
            }
            let mut wheel = OdometerWheel::new(idx as u8);
            for i in 0..odometer.num_wheels {
                if same_unit(odometer.wheels[i as usize].idx as usize, idx) {
                    wheel.add_conflict(i);
                }
            }
            odometer.wheels[odometer.num_wheels as usize] = wheel;
            odometer.num_wheels += 1;
        }
        odometer
    }

    /// Number of wheels (clue positions).
    pub fn len(&self) -> usize {
        self.num_wheels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.num_wheels == 0
    }

    pub fn wheels(&self) -> &[OdometerWheel] {
        &self.wheels[..self.num_wheels as usize]
    }

    pub fn set_value(&mut self, wheel: usize, value: u8) {
        debug_assert!((1..=9).contains(&value));
        self.wheels[wheel].value = value;
    }

    /// Would assigning `value` to `wheel` collide with an earlier wheel in
    /// the same row, column, or box?
    pub fn has_prior_conflict(&self, wheel: usize, value: u8) -> bool {
        self.wheels[wheel]
            .conflicts()
            .iter()
            .any(|&i| self.wheels[i as usize].value == value)
    }

    /// The candidate grid for the current wheel values, with digits
    /// renumbered in natural reading order so the upper-left-most digit is 1.
    ///
    /// Wheels are filled in non-reading order, so without the renumbering two
    /// enumerations of the same labeling class could print differently.
    pub fn to_grid(&self) -> Grid {
        let mut grid = Grid::default();
        for wheel in self.wheels() {
            grid.set_at(wheel.idx as usize, wheel.value);
        }
        let mut mapping = [0u8; 10];
        let mut next_unseen = 1u8;
        for idx in 0..81 {
            let value = grid.at(idx);
            if value == 0 {
                continue;
            }
            if mapping[value as usize] == 0 {
                mapping[value as usize] = next_unseen;
                next_unseen += 1;
            }
            grid.set_at(idx, mapping[value as usize]);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sudoku::EXAMPLE_17_CLUE;

    #[test]
    fn test_fill_order_is_a_permutation() {
        let mut seen = [false; 81];
        for &idx in GRID_FILL_ORDER.iter() {
            assert!(!seen[idx as usize]);
            seen[idx as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_one_wheel_per_clue() {
        let odometer = Odometer::from_shape(&EXAMPLE_17_CLUE);
        assert_eq!(odometer.len(), 17);
        let mut idxs: Vec<u8> = odometer.wheels().iter().map(|w| w.idx).collect();
        idxs.sort_unstable();
        let mut expected: Vec<u8> = (0..81u8)
            .filter(|&i| EXAMPLE_17_CLUE.at(i as usize) != 0)
            .collect();
        expected.sort_unstable();
        assert_eq!(idxs, expected);
    }

    #[test]
    fn test_conflicts_point_backwards_and_share_a_unit() {
        let odometer = Odometer::from_shape(&EXAMPLE_17_CLUE);
        for (w, wheel) in odometer.wheels().iter().enumerate() {
            for &c in wheel.conflicts() {
                assert!((c as usize) < w);
                let other = odometer.wheels()[c as usize];
                assert!(same_unit(other.idx as usize, wheel.idx as usize));
            }
        }
    }

    #[test]
    fn test_prior_conflict_probes_current_values() {
        // Cells 0 and 1 share row 0.
        let mut shape = Grid::default();
        shape.set_at(0, 1);
        shape.set_at(1, 1);
        let mut odometer = Odometer::from_shape(&shape);
        assert_eq!(odometer.len(), 2);
        let (first, second) = if odometer.wheels()[0].idx == 0 { (0, 1) } else { (1, 0) };
        odometer.set_value(first, 7);
        assert!(odometer.has_prior_conflict(second, 7));
        assert!(!odometer.has_prior_conflict(second, 3));
    }

    #[test]
    fn test_to_grid_relabels_in_reading_order() {
        // Two clues: cell 0 and cell 80. Assign them 9 and 4; the relabeled
        // grid must read 1 then 2.
        let mut shape = Grid::default();
        shape.set_at(0, 5);
        shape.set_at(80, 5);
        let mut odometer = Odometer::from_shape(&shape);
        for w in 0..odometer.len() {
            let idx = odometer.wheels()[w].idx;
            odometer.set_value(w, if idx == 0 { 9 } else { 4 });
        }
        let grid = odometer.to_grid();
        assert_eq!(grid.at(0), 1);
        assert_eq!(grid.at(80), 2);
    }
}
