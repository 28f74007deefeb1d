//! Hash-indexed sparse matrix (C3): a [`CrossList`] plus a two-dimensional
//! bucket table `table[row % SR][column % SC]` of node references, kept
//! synchronous with the grid on every insertion and erasure.
//!
//! The pointer-based original wires this synchronization through four
//! virtual primitives the hash-indexed type overrides. Arena indices make
//! that unnecessary here: [`CrossList::insert_at`]/[`CrossList::erase_at`]
//! already are the grid's only two mutation chokepoints and both hand back
//! the [`NodeIndex`] they touched, so this wrapper just records that index
//! (together with the coordinates it was inserted at) in the right bucket
//! right after the call, instead of needing an observer hook into the grid
//! itself.

use std::io::Read;

use crate::error::{WafError, WafResult};
use crate::structures::cross_list::{CrossList, NodeIndex};
use crate::structures::serialization::GrammarValue;

#[derive(Debug, Clone)]
pub struct IndexedCrossList<T> {
    inner: CrossList<T>,
    sparse_rows: usize,
    sparse_columns: usize,
    buckets: Vec<Vec<(usize, usize, NodeIndex)>>,
}

impl<T: Clone> IndexedCrossList<T> {
    pub fn new(rows: usize, columns: usize, default_value: T) -> Self {
        IndexedCrossList {
            inner: CrossList::new(rows, columns, default_value),
            sparse_rows: 0,
            sparse_columns: 0,
            buckets: Vec::new(),
        }
    }

    /// Wraps an already-populated grid (typically just deserialized from a
    /// matrix file) with a hash overlay sized `(sr, sc)`, hashing every
    /// live node once.
    pub fn from_inner(inner: CrossList<T>, sr: usize, sc: usize) -> WafResult<Self> {
        let mut indexed = IndexedCrossList {
            inner,
            sparse_rows: 0,
            sparse_columns: 0,
            buckets: Vec::new(),
        };
        indexed.sparse(sr, sc)?;
        Ok(indexed)
    }

    pub fn inner(&self) -> &CrossList<T> {
        &self.inner
    }

    pub fn into_inner(self) -> CrossList<T> {
        self.inner
    }

    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    pub fn columns(&self) -> usize {
        self.inner.columns()
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn empty(&self) -> bool {
        self.inner.empty()
    }

    pub fn row_size(&self, row: usize) -> WafResult<usize> {
        self.inner.row_size(row)
    }

    pub fn column_size(&self, column: usize) -> WafResult<usize> {
        self.inner.column_size(column)
    }

    /// Sets the overlay shape. Must be called (with both dimensions
    /// non-zero) before the first insertion; every live node is re-hashed
    /// from scratch, so it is also the documented way to rebuild the
    /// overlay after reshaping.
    pub fn sparse(&mut self, sr: usize, sc: usize) -> WafResult<()> {
        if sr == 0 || sc == 0 {
            return Err(WafError::invalid_argument(
                "sparse",
                "overlay dimensions must both be non-zero",
            ));
        }
        self.sparse_rows = sr;
        self.sparse_columns = sc;
        self.rebuild_buckets()
    }

    pub fn sparse_shape(&self) -> (usize, usize) {
        (self.sparse_rows, self.sparse_columns)
    }

    fn check_sparse(&self) -> WafResult<()> {
        if self.sparse_rows == 0 || self.sparse_columns == 0 {
            Err(WafError::invalid_argument(
                "sparse",
                "sparse(SR, SC) must be called before mutating an indexed matrix",
            ))
        } else {
            Ok(())
        }
    }

    fn bucket_index(&self, row: usize, column: usize) -> usize {
        (row % self.sparse_rows) * self.sparse_columns + (column % self.sparse_columns)
    }

    fn rebuild_buckets(&mut self) -> WafResult<()> {
        let mut buckets = vec![Vec::new(); self.sparse_rows * self.sparse_columns];
        for cell in self.inner.iter() {
            if let Some(idx) = self.inner.locate_node(cell.row, cell.column)? {
                let bucket = (cell.row % self.sparse_rows) * self.sparse_columns
                    + (cell.column % self.sparse_columns);
                buckets[bucket].push((cell.row, cell.column, idx));
            }
        }
        self.buckets = buckets;
        Ok(())
    }

    fn bucket_remove(&mut self, row: usize, column: usize) {
        let bucket = self.bucket_index(row, column);
        self.buckets[bucket].retain(|(r, c, _)| !(*r == row && *c == column));
    }

    fn bucket_insert(&mut self, row: usize, column: usize, idx: NodeIndex) {
        let bucket = self.bucket_index(row, column);
        self.buckets[bucket].push((row, column, idx));
    }

    // -- ordinary cross-list surface (delegated, overlay kept in sync) ---

    pub fn insert(&mut self, row: usize, column: usize, value: T) -> WafResult<bool> {
        self.check_sparse()?;
        match self.inner.insert_at(row, column, value, false)? {
            Some(idx) => {
                self.bucket_insert(row, column, idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn rinsert(&mut self, row: usize, column: usize, value: T) -> WafResult<bool> {
        self.check_sparse()?;
        match self.inner.insert_at(row, column, value, true)? {
            Some(idx) => {
                self.bucket_insert(row, column, idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn erase(&mut self, row: usize, column: usize) -> WafResult<bool> {
        self.check_sparse()?;
        match self.inner.erase_at(row, column, false)? {
            Some(_) => {
                self.bucket_remove(row, column);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) -> WafResult<()> {
        self.check_sparse()?;
        let existed = self.inner.exist(row, column)?;
        self.inner.set(row, column, value)?;
        if !existed {
            if let Some(idx) = self.inner.locate_node(row, column)? {
                self.bucket_insert(row, column, idx);
            }
        }
        Ok(())
    }

    pub fn get(&self, row: usize, column: usize) -> WafResult<T> {
        self.inner.get(row, column)
    }

    pub fn at(&mut self, row: usize, column: usize) -> WafResult<&mut T> {
        self.check_sparse()?;
        let existed = self.inner.exist(row, column)?;
        if !existed {
            self.inner.at(row, column)?;
            if let Some(idx) = self.inner.locate_node(row, column)? {
                self.bucket_insert(row, column, idx);
            }
        }
        self.inner.at(row, column)
    }

    pub fn exist(&self, row: usize, column: usize) -> WafResult<bool> {
        self.inner.exist(row, column)
    }

    pub fn iter(&self) -> crate::structures::cross_list::CursorIter<'_, T> {
        self.inner.iter()
    }

    pub fn row_iter(
        &self,
        row: usize,
    ) -> WafResult<crate::structures::cross_list::RowIter<'_, T>> {
        self.inner.row_iter(row)
    }

    pub fn column_iter(
        &self,
        column: usize,
    ) -> WafResult<crate::structures::cross_list::ColumnIter<'_, T>> {
        self.inner.column_iter(column)
    }

    /// Shrinks or grows the addressable dimensions. Nodes that would be
    /// dropped by a shrink are pulled out of the overlay first so the
    /// bucket table never briefly points at a node the grid is about to
    /// unlink.
    pub fn reserve(&mut self, new_rows: usize, new_columns: usize) -> WafResult<()> {
        if new_rows < self.inner.rows() || new_columns < self.inner.columns() {
            for bucket in self.buckets.iter_mut() {
                bucket.retain(|(r, c, _)| *r < new_rows && *c < new_columns);
            }
        }
        self.inner.reserve(new_rows, new_columns)
    }

    pub fn row_reserve(&mut self, new_rows: usize) -> WafResult<()> {
        let columns = self.inner.columns();
        self.reserve(new_rows, columns)
    }

    pub fn column_reserve(&mut self, new_columns: usize) -> WafResult<()> {
        let rows = self.inner.rows();
        self.reserve(rows, new_columns)
    }

    pub fn clear(&mut self) {
        let rows = self.inner.rows();
        let columns = self.inner.columns();
        let default = self.inner.default_value();
        self.inner = CrossList::new(rows, columns, default);
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
    }

    /// Transposes the underlying grid, then reshapes the overlay with the
    /// sparse dimensions swapped (matching the grid's new shape) and
    /// re-hashes every surviving node.
    pub fn transpose(&mut self) -> WafResult<()> {
        self.inner.transpose();
        if self.sparse_rows != 0 && self.sparse_columns != 0 {
            std::mem::swap(&mut self.sparse_rows, &mut self.sparse_columns);
            self.rebuild_buckets()?;
        }
        Ok(())
    }

    // -- random-access (hash) surface -------------------------------------

    /// Scans the bucket for `(row, column)` and returns its node index, if
    /// any. Expected O(1) when buckets stay small, O(bucket size) worst
    /// case.
    pub fn ilocate(&self, row: usize, column: usize) -> WafResult<Option<NodeIndex>> {
        self.check_sparse()?;
        if row >= self.inner.rows() || column >= self.inner.columns() {
            return Err(WafError::out_of_range("ilocate", format!("({row}, {column})")));
        }
        let bucket = self.bucket_index(row, column);
        Ok(self
            .buckets
            .get(bucket)
            .and_then(|b| b.iter().find(|(r, c, _)| *r == row && *c == column))
            .map(|(_, _, idx)| *idx))
    }

    pub fn iexist(&self, row: usize, column: usize) -> WafResult<bool> {
        Ok(self.ilocate(row, column)?.is_some())
    }

    pub fn iget(&self, row: usize, column: usize) -> WafResult<T> {
        self.inner.get(row, column)
    }

    pub fn iset(&mut self, row: usize, column: usize, value: T) -> WafResult<()> {
        self.set(row, column, value)
    }

    pub fn iat(&mut self, row: usize, column: usize) -> WafResult<&mut T> {
        self.at(row, column)
    }

    pub fn ierase(&mut self, row: usize, column: usize) -> WafResult<bool> {
        self.erase(row, column)
    }
}

impl<T: GrammarValue + Clone> IndexedCrossList<T> {
    /// Serializes the underlying grid through the matrix envelope grammar
    /// (C1); the hash overlay is a pure read-path accelerator and carries
    /// no wire representation of its own.
    pub fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        self.inner.write_to(out)
    }

    pub fn to_wire_string(&self) -> String {
        self.inner.to_wire_string()
    }

    /// Parses a matrix envelope and wraps it with a hash overlay sized
    /// `(sr, sc)`, hashing every parsed node once.
    pub fn read_from<R: Read>(
        reader: R,
        default_value: T,
        sparse_rows: usize,
        sparse_columns: usize,
    ) -> WafResult<Self> {
        let inner = CrossList::read_from(reader, default_value)?;
        IndexedCrossList::from_inner(inner, sparse_rows, sparse_columns)
    }
}
