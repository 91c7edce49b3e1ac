// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exact cover by dancing links (Knuth's Algorithm X).
//!
//! The matrix is a four-way doubly-linked circular mesh of 1-cells. Covering a
//! column unlinks it and every row that meets it in O(1) per link; uncovering
//! replays the exact same links in reverse order, so the depth-first search
//! backtracks without allocating. See Knuth, "Dancing links",
//! arXiv:cs/0011047.
//!
//! # Representation
//!
//! All records live in one [`Arena`] and links are slot indices ([`NodeId`]):
//! slot 0 is the root, slots `1..=ncols` the column headers, data nodes
//! follow. Reversibility of cover/uncover is a property of the iteration
//! order, not of pointer identity, so the index form is exact.
//!
//! # Searching
//!
//! [`DanceMatrix::solve`] runs the search and hands every exact cover to a
//! visitor as a stack of row-witness nodes. The visitor answers with a
//! [`DanceResult`]: how much to add to the solution count, and whether to
//! short-circuit the rest of the search.

mod node;

pub use node::NodeId;

use crate::arena::Arena;
use node::{Node, ROOT};

/// Default node-pool capacity. A 9x9 Sudoku matrix needs at most
/// `325 + 729*4` records; this leaves room to spare for any caller.
pub const DEFAULT_NODE_CAPACITY: usize = 8192;

/// A visitor's verdict on one discovered exact cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DanceResult {
    /// How many solutions this cover counts for.
    pub count: usize,
    /// Abandon all remaining branches of the search.
    pub short_circuit: bool,
}

/// A sparse 0/1 matrix threaded for Algorithm X.
#[derive(Debug)]
pub struct DanceMatrix {
    nodes: Arena<Node>,
    /// Live 1-count per column, indexed by column name.
    sizes: Vec<u32>,
    ncols: usize,
    nrows: usize,
    min_size_heuristic: bool,
}

impl DanceMatrix {
    /// A matrix with `ncols` columns, no rows, and the default node capacity.
    pub fn new(ncols: usize) -> Self {
        Self::with_capacity(ncols, DEFAULT_NODE_CAPACITY)
    }

    /// A matrix with `ncols` columns and room for `node_capacity` records
    /// (headers included).
    pub fn with_capacity(ncols: usize, node_capacity: usize) -> Self {
        assert!(ncols + 1 <= node_capacity, "capacity too small for headers");
        let mut nodes = Arena::with_capacity(node_capacity);
        nodes.alloc(Node::header(ROOT, 0));
        for c in 0..ncols {
            nodes.alloc(Node::header(NodeId::header(c), c as u32));
        }
        // Thread the headers into one horizontal ring through the root.
        for c in 0..ncols {
            let h = NodeId::header(c);
            nodes[h].left = if c == 0 { ROOT } else { NodeId::header(c - 1) };
            nodes[h].right = if c + 1 == ncols { ROOT } else { NodeId::header(c + 1) };
        }
        if ncols > 0 {
            nodes[ROOT].right = NodeId::header(0);
            nodes[ROOT].left = NodeId::header(ncols - 1);
        }
        Self {
            nodes,
            sizes: vec![0; ncols],
            ncols,
            nrows: 0,
            min_size_heuristic: true,
        }
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Live 1-count of column `col`.
    pub fn column_size(&self, col: usize) -> usize {
        self.sizes[col] as usize
    }

    /// Enable or disable the minimum-size column heuristic. The set of
    /// solutions is the same either way; only the branching order changes.
    pub fn set_min_size_heuristic(&mut self, on: bool) {
        self.min_size_heuristic = on;
    }

    /// Append one row with 1-cells in the given columns.
    ///
    /// Each new node is spliced in above its column header, i.e. at the
    /// bottom of the existing vertical ring, and the nodes are linked into
    /// one horizontal ring in the given order. An empty `cols` adds a no-op
    /// row that no search can ever select.
    pub fn add_row(&mut self, cols: &[usize]) {
        let mut first: Option<NodeId> = None;
        for &c in cols {
            assert!(c < self.ncols, "column {c} out of range");
            let header = NodeId::header(c);
            let up = self.nodes[header].up;
            let id = NodeId(self.nodes.alloc(Node {
                up,
                down: header,
                left: ROOT, // patched below
                right: ROOT,
                col: c as u32,
            }));
            self.nodes[header].up = id;
            self.nodes[up].down = id;
            match first {
                None => {
                    self.nodes[id].left = id;
                    self.nodes[id].right = id;
                    first = Some(id);
                }
                Some(h) => {
                    let left = self.nodes[h].left;
                    self.nodes[id].left = left;
                    self.nodes[id].right = h;
                    self.nodes[left].right = id;
                    self.nodes[h].left = id;
                }
            }
            self.sizes[c] += 1;
        }
        self.nrows += 1;
    }

    /// Make this matrix an exact copy of `template` in one bulk transfer,
    /// reusing this matrix's allocations.
    pub fn reset_from(&mut self, template: &DanceMatrix) {
        self.nodes.copy_from(&template.nodes);
        self.sizes.clone_from(&template.sizes);
        self.ncols = template.ncols;
        self.nrows = template.nrows;
        self.min_size_heuristic = template.min_size_heuristic;
    }

    /// The column names on `witness`'s horizontal ring, starting with the
    /// witness's own column. This is how visitors decode a solution row.
    pub fn row_columns(&self, witness: NodeId) -> RowColumns<'_> {
        RowColumns {
            mat: self,
            start: witness,
            next: Some(witness),
        }
    }

    /// Run Algorithm X, invoking `visitor` once per exact cover found.
    /// Returns the aggregated solution count.
    pub fn solve<F>(&mut self, mut visitor: F) -> usize
    where
        F: FnMut(&DanceMatrix, &[NodeId]) -> DanceResult,
    {
        let mut solution = Vec::with_capacity(self.ncols);
        self.search(0, &mut solution, &mut visitor).count
    }

    fn search<F>(&mut self, k: usize, solution: &mut Vec<NodeId>, visitor: &mut F) -> DanceResult
    where
        F: FnMut(&DanceMatrix, &[NodeId]) -> DanceResult,
    {
        if self.nodes[ROOT].right == ROOT {
            return visitor(self, &solution[..]);
        }

        let c = self.choose_column();
        let mut result = DanceResult::default();
        self.cover(c);

        let header = NodeId::header(c as usize);
        let mut r = self.nodes[header].down;
        while r != header {
            solution.truncate(k);
            solution.push(r);
            let mut j = self.nodes[r].right;
            while j != r {
                let col = self.nodes[j].col;
                self.cover(col);
                j = self.nodes[j].right;
            }

            let sub = self.search(k + 1, solution, visitor);
            result.count += sub.count;
            result.short_circuit = sub.short_circuit;

            // Undo in the exact reverse order: this row's other columns,
            // right-to-left.
            let mut j = self.nodes[r].left;
            while j != r {
                let col = self.nodes[j].col;
                self.uncover(col);
                j = self.nodes[j].left;
            }
            if result.short_circuit {
                break;
            }
            r = self.nodes[r].down;
        }

        self.uncover(c);
        result
    }

    /// Pick the column to branch on: under the heuristic, the first active
    /// column of minimal size (stopping early at size <= 1); otherwise the
    /// first active column.
    fn choose_column(&self) -> u32 {
        let mut j = self.nodes[ROOT].right;
        debug_assert!(j != ROOT, "choose_column on an empty matrix");
        if !self.min_size_heuristic {
            return self.nodes[j].col;
        }
        let mut best = self.nodes[j].col;
        let mut min_size = u32::MAX;
        while j != ROOT {
            let col = self.nodes[j].col;
            let size = self.sizes[col as usize];
            if size < min_size {
                best = col;
                min_size = size;
                if min_size <= 1 {
                    break;
                }
            }
            j = self.nodes[j].right;
        }
        best
    }

    /// Unlink column `c` from the header ring, then unlink every other node
    /// of every row that meets `c` from its own column's vertical ring.
    fn cover(&mut self, c: u32) {
        let header = NodeId::header(c as usize);
        let h = self.nodes[header];
        self.nodes[h.right].left = h.left;
        self.nodes[h.left].right = h.right;

        let mut i = self.nodes[header].down;
        while i != header {
            let mut j = self.nodes[i].right;
            while j != i {
                let n = self.nodes[j];
                self.nodes[n.down].up = n.up;
                self.nodes[n.up].down = n.down;
                self.sizes[n.col as usize] -= 1;
                j = n.right;
            }
            i = self.nodes[i].down;
        }
    }

    /// The exact inverse of [`cover`](Self::cover): rows bottom-to-top, each
    /// row's other nodes right-to-left, then relink the header.
    fn uncover(&mut self, c: u32) {
        let header = NodeId::header(c as usize);
        let mut i = self.nodes[header].up;
        while i != header {
            let mut j = self.nodes[i].left;
            while j != i {
                let n = self.nodes[j];
                self.sizes[n.col as usize] += 1;
                self.nodes[n.down].up = j;
                self.nodes[n.up].down = j;
                j = n.left;
            }
            i = self.nodes[i].up;
        }
        let h = self.nodes[header];
        self.nodes[h.left].right = header;
        self.nodes[h.right].left = header;
    }
}

/// Iterator over the column names of one row's horizontal ring.
pub struct RowColumns<'a> {
    mat: &'a DanceMatrix,
    start: NodeId,
    next: Option<NodeId>,
}

impl Iterator for RowColumns<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let cur = self.next?;
        let node = self.mat.nodes[cur];
        self.next = if node.right == self.start {
            None
        } else {
            Some(node.right)
        };
        Some(node.col as usize)
    }
}
