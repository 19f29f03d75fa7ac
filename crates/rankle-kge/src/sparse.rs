//! Sparse matrices in compressed-row (CSR) format.
//!
//! Co-occurrence and similarity structures over `num_entities`-sized (or
//! `num_entities^2`-sized) column spaces are far too wide for dense
//! storage, so construction goes through coordinate-list accumulation and
//! lands in compressed rows. Dense values only materialize per row, as
//! [`ndarray`] vectors, at scoring time.

use ndarray::{Array1, ArrayViewMut1};

/// Sparse f64 matrix in CSR format.
///
/// Rows are stored as sorted `(column, value)` runs delimited by
/// `row_ptr`. Stored entries are kept non-zero; structural zeros are
/// simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Build from coordinate-list entries.
    ///
    /// Duplicate `(row, col)` coordinates accumulate by summation
    /// (scatter-add), matching how co-occurrence counts are collected.
    /// Entries summing to zero are dropped from storage.
    pub fn from_coo(rows: usize, cols: usize, mut entries: Vec<(usize, usize, f64)>) -> Self {
        debug_assert!(entries.iter().all(|&(r, c, _)| r < rows && c < cols));
        entries.sort_unstable_by_key(|&(r, c, _)| (r, c));

        let mut row_counts = vec![0usize; rows];
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in entries {
            if last == Some((r, c)) {
                if let Some(tail) = values.last_mut() {
                    *tail += v;
                }
            } else {
                row_counts[r] += 1;
                col_idx.push(c);
                values.push(v);
                last = Some((r, c));
            }
        }

        let mut row_ptr = vec![0usize; rows + 1];
        for r in 0..rows {
            row_ptr[r + 1] = row_ptr[r] + row_counts[r];
        }

        let mut matrix = Self { rows, cols, row_ptr, col_idx, values };
        matrix.retain(|_, _, v| v != 0.0);
        matrix
    }

    /// An all-zero matrix with no stored entries.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Sorted `(columns, values)` slices of one row.
    pub fn row(&self, r: usize) -> (&[usize], &[f64]) {
        let span = self.row_ptr[r]..self.row_ptr[r + 1];
        (&self.col_idx[span.clone()], &self.values[span])
    }

    /// Stored value at `(r, c)`, or 0 if absent.
    pub fn get(&self, r: usize, c: usize) -> f64 {
        let (cols, vals) = self.row(r);
        match cols.binary_search(&c) {
            Ok(i) => vals[i],
            Err(_) => 0.0,
        }
    }

    /// Materialize one row as a dense vector.
    pub fn row_dense(&self, r: usize) -> Array1<f64> {
        let mut out = Array1::zeros(self.cols);
        self.scatter_row(r, 1.0, out.view_mut());
        out
    }

    /// Add `weight * row(r)` into a dense accumulator.
    pub fn scatter_row(&self, r: usize, weight: f64, mut out: ArrayViewMut1<f64>) {
        let (cols, vals) = self.row(r);
        for (&c, &v) in cols.iter().zip(vals) {
            out[c] += weight * v;
        }
    }

    /// L1 norm of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows)
            .map(|r| self.row(r).1.iter().sum())
            .collect()
    }

    /// Sum of all stored entries.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Divide each row by its L1 sum; zero rows are left untouched.
    pub fn normalize_rows_l1(&mut self) {
        for r in 0..self.rows {
            let span = self.row_ptr[r]..self.row_ptr[r + 1];
            let total: f64 = self.values[span.clone()].iter().sum();
            if total != 0.0 {
                for v in &mut self.values[span] {
                    *v /= total;
                }
            }
        }
    }

    /// Zero out entries strictly below `threshold` and compact storage.
    ///
    /// Afterwards every stored entry is `>= threshold`.
    pub fn prune_below(&mut self, threshold: f64) {
        self.retain(|_, _, v| v >= threshold);
    }

    /// Keep only entries satisfying the predicate, rebuilding row spans.
    fn retain(&mut self, mut keep: impl FnMut(usize, usize, f64) -> bool) {
        let mut write = 0usize;
        let mut new_ptr = vec![0usize; self.rows + 1];
        for r in 0..self.rows {
            for i in self.row_ptr[r]..self.row_ptr[r + 1] {
                if keep(r, self.col_idx[i], self.values[i]) {
                    self.col_idx[write] = self.col_idx[i];
                    self.values[write] = self.values[i];
                    write += 1;
                }
            }
            new_ptr[r + 1] = write;
        }
        self.col_idx.truncate(write);
        self.values.truncate(write);
        self.row_ptr = new_ptr;
    }

    /// Iterate stored entries as `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.rows).flat_map(move |r| {
            let (cols, vals) = self.row(r);
            cols.iter().zip(vals).map(move |(&c, &v)| (r, c, v))
        })
    }
}
