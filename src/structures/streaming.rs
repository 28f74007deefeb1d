//! Read-only, on-demand iteration over an externally stored cell stream
//! (C4): a single pass over the serialized matrix envelope builds three
//! small index arrays — row start offsets, row sizes, column sizes — and
//! every later iteration re-seeks the stream instead of holding the
//! matrix in memory.
//!
//! The pointer-based original embeds a mutable stream inside the matrix,
//! which is why concurrent iteration over one instance is undefined: only
//! one stream cursor exists. This rewrite keeps that single-reader
//! contract explicit with a [`RefCell`] around the [`Tokenizer`] rather
//! than pretending `&self` iteration is actually safe to interleave.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::marker::PhantomData;

use crate::error::{WafError, WafResult};
use crate::structures::serialization::{next_record, Cell, Dimension, GrammarValue, Record, Tokenizer};

pub struct StreamingMatrix<R, T> {
    tokens: RefCell<Tokenizer<R>>,
    /// `row_begins[r]` is the stream offset of the first cell of row `r`;
    /// an empty row shares the offset of the next non-empty row. Length
    /// `R + 1`; the trailing sentinel is the offset of the dimension line.
    row_begins: Vec<u64>,
    row_sizes: Vec<usize>,
    column_sizes: Vec<usize>,
    rows: usize,
    columns: usize,
    _marker: PhantomData<T>,
}

impl<R: Read + Seek, T: GrammarValue + Clone> StreamingMatrix<R, T> {
    /// Single pass over `reader`, indexing row-start offsets and row/column
    /// sizes without retaining a single cell's value.
    pub fn new(reader: R) -> WafResult<Self> {
        let mut tokens = Tokenizer::new(reader);
        let mut row_first_offset: HashMap<usize, u64> = HashMap::new();
        let mut row_counts: HashMap<usize, usize> = HashMap::new();
        let mut column_counts: HashMap<usize, usize> = HashMap::new();
        let dim = loop {
            let offset = tokens.pos();
            match next_record::<T, R>(&mut tokens)? {
                Some(Record::Cell(cell)) => {
                    row_first_offset.entry(cell.row).or_insert(offset);
                    *row_counts.entry(cell.row).or_insert(0) += 1;
                    *column_counts.entry(cell.column).or_insert(0) += 1;
                }
                Some(Record::Dimension(dim)) => break (dim, offset),
                None => {
                    return Err(WafError::parse(
                        "matrix stream ended before a dimension footer",
                    ))
                }
            }
        };
        let (Dimension { rows, columns }, dim_offset) = dim;

        let mut row_begins = vec![0u64; rows + 1];
        row_begins[rows] = dim_offset;
        for r in (0..rows).rev() {
            row_begins[r] = match row_first_offset.get(&r) {
                Some(offset) => *offset,
                None => row_begins[r + 1],
            };
        }
        let row_sizes = (0..rows).map(|r| *row_counts.get(&r).unwrap_or(&0)).collect();
        let column_sizes = (0..columns)
            .map(|c| *column_counts.get(&c).unwrap_or(&0))
            .collect();

        Ok(StreamingMatrix {
            tokens: RefCell::new(tokens),
            row_begins,
            row_sizes,
            column_sizes,
            rows,
            columns,
            _marker: PhantomData,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row_size(&self, row: usize) -> WafResult<usize> {
        self.row_sizes
            .get(row)
            .copied()
            .ok_or_else(|| WafError::out_of_range("row_size", row))
    }

    pub fn column_size(&self, column: usize) -> WafResult<usize> {
        self.column_sizes
            .get(column)
            .copied()
            .ok_or_else(|| WafError::out_of_range("column_size", column))
    }

    fn read_cell_at(&self, offset: u64) -> WafResult<Cell<T>> {
        let mut tokens = self.tokens.borrow_mut();
        tokens.seek_to(offset)?;
        match next_record::<T, R>(&mut tokens)? {
            Some(Record::Cell(cell)) => Ok(cell),
            Some(Record::Dimension(_)) => {
                Err(WafError::runtime("expected a cell, found the dimension footer"))
            }
            None => Err(WafError::runtime("expected a cell, found end of stream")),
        }
    }

    /// Linear forward scan over every cell in the matrix, in row-major
    /// order, bounded by the dimension footer's offset.
    pub fn iter(&self) -> CursorIter<'_, R, T> {
        CursorIter {
            matrix: self,
            offset: 0,
            end: self.row_begins[self.rows],
        }
    }

    /// Bounded scan over row `r` alone, using `row_begins[r+1]` (or the
    /// dimension offset, for the last row) as the stop condition.
    pub fn row_iter(&self, row: usize) -> WafResult<CursorIter<'_, R, T>> {
        if row >= self.rows {
            return Err(WafError::out_of_range("row_iter", row));
        }
        Ok(CursorIter {
            matrix: self,
            offset: self.row_begins[row],
            end: self.row_begins[row + 1],
        })
    }
}

pub struct CursorIter<'a, R, T> {
    matrix: &'a StreamingMatrix<R, T>,
    offset: u64,
    end: u64,
}

impl<'a, R: Read + Seek, T: GrammarValue + Clone> Iterator for CursorIter<'a, R, T> {
    type Item = WafResult<Cell<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.end {
            return None;
        }
        match self.matrix.read_cell_at(self.offset) {
            Ok(cell) => {
                self.offset = self.matrix.tokens.borrow().pos();
                Some(Ok(cell))
            }
            Err(e) => {
                self.offset = self.end;
                Some(Err(e))
            }
        }
    }
}
