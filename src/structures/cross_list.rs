//! Ordered sparse grid with row/column/cursor iteration in both directions.
//!
//! The original stored nodes as raw owning pointers threaded through four
//! links (`left`, `right`, `up`, `down`). This rewrite keeps the same ring
//! topology but stores nodes in an arena (`Vec<Slot<T>>`) addressed by a
//! stable [`NodeIndex`], per the arena-indexed-rewrite design note: row and
//! column links become index pairs instead of pointers, and header
//! sentinels are ordinary arena nodes whose coordinates are pinned to
//! `usize::MAX`. Iterators hold a non-owning reference to the matrix and
//! are invalidated by any erase of the node they point at, the same
//! contract the pointer-based original had.

use std::fmt::Write as _;
use std::io::Read;

use crate::error::{WafError, WafResult};
use crate::structures::serialization::{next_record, Cell, Dimension, GrammarValue, Record, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(u32);

#[derive(Debug, Clone)]
struct Node<T> {
    value: Option<T>,
    row: usize,
    column: usize,
    left: NodeIndex,
    right: NodeIndex,
    up: NodeIndex,
    down: NodeIndex,
}

#[derive(Debug, Clone)]
enum Slot<T> {
    Node(Node<T>),
    Free(Option<NodeIndex>),
}

/// The doubly-linked row/column grid. `R` and `C` are the live,
/// addressable dimensions; the header array never shrinks even when the
/// matrix does, so previously allocated header slots are simply left
/// unused rather than reclaimed.
#[derive(Debug, Clone)]
pub struct CrossList<T> {
    arena: Vec<Slot<T>>,
    free_head: Option<NodeIndex>,
    headers: Vec<NodeIndex>,
    rows: usize,
    columns: usize,
    row_sizes: Vec<usize>,
    column_sizes: Vec<usize>,
    size: usize,
    default_value: T,
}

impl<T: Clone> CrossList<T> {
    pub fn new(rows: usize, columns: usize, default_value: T) -> Self {
        let mut list = CrossList {
            arena: Vec::new(),
            free_head: None,
            headers: Vec::new(),
            rows: 0,
            columns: 0,
            row_sizes: Vec::new(),
            column_sizes: Vec::new(),
            size: 0,
            default_value,
        };
        list.reserve(rows, columns).expect("initial size is always valid");
        list
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn empty(&self) -> bool {
        self.size == 0
    }

    pub fn default_value(&self) -> T {
        self.default_value.clone()
    }

    pub fn row_size(&self, row: usize) -> WafResult<usize> {
        self.check_row(row)?;
        Ok(self.row_sizes[row])
    }

    pub fn column_size(&self, column: usize) -> WafResult<usize> {
        self.check_column(column)?;
        Ok(self.column_sizes[column])
    }

    fn check_row(&self, row: usize) -> WafResult<()> {
        if row < self.rows {
            Ok(())
        } else {
            Err(WafError::out_of_range("row index", row))
        }
    }

    fn check_column(&self, column: usize) -> WafResult<()> {
        if column < self.columns {
            Ok(())
        } else {
            Err(WafError::out_of_range("column index", column))
        }
    }

    fn check_coords(&self, row: usize, column: usize) -> WafResult<()> {
        self.check_row(row)?;
        self.check_column(column)
    }

    // -- arena access -----------------------------------------------------

    fn node(&self, idx: NodeIndex) -> &Node<T> {
        match &self.arena[idx.0 as usize] {
            Slot::Node(n) => n,
            Slot::Free(_) => panic!("dangling cross list node index"),
        }
    }

    fn node_mut(&mut self, idx: NodeIndex) -> &mut Node<T> {
        match &mut self.arena[idx.0 as usize] {
            Slot::Node(n) => n,
            Slot::Free(_) => panic!("dangling cross list node index"),
        }
    }

    fn is_header(&self, idx: NodeIndex) -> bool {
        self.node(idx).value.is_none()
    }

    fn alloc_node(&mut self, row: usize, column: usize, value: Option<T>) -> NodeIndex {
        let placeholder = NodeIndex(0);
        let node = Node {
            value,
            row,
            column,
            left: placeholder,
            right: placeholder,
            up: placeholder,
            down: placeholder,
        };
        match self.free_head.take() {
            Some(idx) => {
                let next_free = match &self.arena[idx.0 as usize] {
                    Slot::Free(n) => *n,
                    Slot::Node(_) => unreachable!(),
                };
                self.free_head = next_free;
                self.arena[idx.0 as usize] = Slot::Node(node);
                idx
            }
            None => {
                let idx = NodeIndex(self.arena.len() as u32);
                self.arena.push(Slot::Node(node));
                idx
            }
        }
    }

    fn free_slot(&mut self, idx: NodeIndex) {
        self.arena[idx.0 as usize] = Slot::Free(self.free_head);
        self.free_head = Some(idx);
    }

    fn alloc_header(&mut self) -> NodeIndex {
        let idx = self.alloc_node(usize::MAX, usize::MAX, None);
        let node = self.node_mut(idx);
        node.left = idx;
        node.right = idx;
        node.up = idx;
        node.down = idx;
        idx
    }

    fn ensure_headers(&mut self, len: usize) {
        while self.headers.len() < len {
            let idx = self.alloc_header();
            self.headers.push(idx);
        }
    }

    // -- locate -------------------------------------------------------------

    fn locate_row(&self, row: usize, column: usize) -> NodeIndex {
        let header = self.headers[row];
        let mut cur = self.node(header).right;
        while self.node(cur).column < column {
            cur = self.node(cur).right;
        }
        cur
    }

    fn locate_column(&self, column: usize, row: usize) -> NodeIndex {
        let header = self.headers[column];
        let mut cur = self.node(header).down;
        while self.node(cur).row < row {
            cur = self.node(cur).down;
        }
        cur
    }

    /// Forward locate: the node reached from `headers[row].right` with
    /// `column >= c`, and from `headers[column].down` with `row >= r`.
    /// A data node exists at `(r, c)` iff both walks land on the same
    /// node and that node carries a value.
    pub(crate) fn locate(&self, row: usize, column: usize) -> (NodeIndex, NodeIndex) {
        (self.locate_row(row, column), self.locate_column(column, row))
    }

    fn rlocate_row(&self, row: usize, column: usize) -> NodeIndex {
        let header = self.headers[row];
        let mut cur = self.node(header).left;
        while cur != header && self.node(cur).column > column {
            cur = self.node(cur).left;
        }
        cur
    }

    fn rlocate_column(&self, column: usize, row: usize) -> NodeIndex {
        let header = self.headers[column];
        let mut cur = self.node(header).up;
        while cur != header && self.node(cur).row > row {
            cur = self.node(cur).up;
        }
        cur
    }

    /// Reverse locate: walks from the tail of each ring looking for the
    /// last node with coordinate `<= target`, used for tail-biased
    /// insertion when values arrive in row-major order.
    pub(crate) fn rlocate(&self, row: usize, column: usize) -> (NodeIndex, NodeIndex) {
        (
            self.rlocate_row(row, column),
            self.rlocate_column(column, row),
        )
    }

    pub(crate) fn locate_node(&self, row: usize, column: usize) -> WafResult<Option<NodeIndex>> {
        self.check_coords(row, column)?;
        let (rp, cp) = self.locate(row, column);
        if rp == cp && !self.is_header(rp) {
            Ok(Some(rp))
        } else {
            Ok(None)
        }
    }

    fn rlocate_node(&self, row: usize, column: usize) -> WafResult<Option<NodeIndex>> {
        self.check_coords(row, column)?;
        let (rp, cp) = self.rlocate(row, column);
        if rp == cp && !self.is_header(rp) && self.node(rp).row == row && self.node(rp).column == column
        {
            Ok(Some(rp))
        } else {
            Ok(None)
        }
    }

    // -- splice ---------------------------------------------------------

    fn splice_before(&mut self, new_idx: NodeIndex, row_anchor: NodeIndex, col_anchor: NodeIndex) {
        let row_pred = self.node(row_anchor).left;
        let col_pred = self.node(col_anchor).up;
        {
            let n = self.node_mut(new_idx);
            n.left = row_pred;
            n.right = row_anchor;
            n.up = col_pred;
            n.down = col_anchor;
        }
        self.node_mut(row_pred).right = new_idx;
        self.node_mut(row_anchor).left = new_idx;
        self.node_mut(col_pred).down = new_idx;
        self.node_mut(col_anchor).up = new_idx;
    }

    fn splice_after(&mut self, new_idx: NodeIndex, row_anchor: NodeIndex, col_anchor: NodeIndex) {
        let row_succ = self.node(row_anchor).right;
        let col_succ = self.node(col_anchor).down;
        {
            let n = self.node_mut(new_idx);
            n.left = row_anchor;
            n.right = row_succ;
            n.up = col_anchor;
            n.down = col_succ;
        }
        self.node_mut(row_anchor).right = new_idx;
        self.node_mut(row_succ).left = new_idx;
        self.node_mut(col_anchor).down = new_idx;
        self.node_mut(col_succ).up = new_idx;
    }

    fn unlink(&mut self, idx: NodeIndex) -> T {
        let (left, right, up, down, row, column) = {
            let n = self.node(idx);
            (n.left, n.right, n.up, n.down, n.row, n.column)
        };
        self.node_mut(left).right = right;
        self.node_mut(right).left = left;
        self.node_mut(up).down = down;
        self.node_mut(down).up = up;
        self.row_sizes[row] -= 1;
        self.column_sizes[column] -= 1;
        self.size -= 1;
        let value = self.node_mut(idx).value.take().expect("erasing a data node");
        self.free_slot(idx);
        value
    }

    pub(crate) fn insert_at(
        &mut self,
        row: usize,
        column: usize,
        value: T,
        tail_biased: bool,
    ) -> WafResult<Option<NodeIndex>> {
        self.check_coords(row, column)?;
        if tail_biased {
            if self.rlocate_node(row, column)?.is_some() {
                return Ok(None);
            }
        } else if self.locate_node(row, column)?.is_some() {
            return Ok(None);
        }
        let idx = self.alloc_node(row, column, Some(value));
        if tail_biased {
            let (rp, cp) = self.rlocate(row, column);
            self.splice_after(idx, rp, cp);
        } else {
            let (rp, cp) = self.locate(row, column);
            self.splice_before(idx, rp, cp);
        }
        self.row_sizes[row] += 1;
        self.column_sizes[column] += 1;
        self.size += 1;
        Ok(Some(idx))
    }

    pub(crate) fn erase_at(
        &mut self,
        row: usize,
        column: usize,
        tail_biased: bool,
    ) -> WafResult<Option<(NodeIndex, T)>> {
        let found = if tail_biased {
            self.rlocate_node(row, column)?
        } else {
            self.locate_node(row, column)?
        };
        match found {
            Some(idx) => {
                let value = self.unlink(idx);
                Ok(Some((idx, value)))
            }
            None => Ok(None),
        }
    }

    // -- public mutation surface ----------------------------------------

    pub fn insert(&mut self, row: usize, column: usize, value: T) -> WafResult<bool> {
        Ok(self.insert_at(row, column, value, false)?.is_some())
    }

    pub fn rinsert(&mut self, row: usize, column: usize, value: T) -> WafResult<bool> {
        Ok(self.insert_at(row, column, value, true)?.is_some())
    }

    pub fn erase(&mut self, row: usize, column: usize) -> WafResult<bool> {
        Ok(self.erase_at(row, column, false)?.is_some())
    }

    pub fn rerase(&mut self, row: usize, column: usize) -> WafResult<bool> {
        Ok(self.erase_at(row, column, true)?.is_some())
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) -> WafResult<()> {
        self.check_coords(row, column)?;
        match self.locate_node(row, column)? {
            Some(idx) => {
                self.node_mut(idx).value = Some(value);
                Ok(())
            }
            None => {
                self.insert_at(row, column, value, false)?;
                Ok(())
            }
        }
    }

    pub fn rset(&mut self, row: usize, column: usize, value: T) -> WafResult<()> {
        self.check_coords(row, column)?;
        match self.rlocate_node(row, column)? {
            Some(idx) => {
                self.node_mut(idx).value = Some(value);
                Ok(())
            }
            None => {
                self.insert_at(row, column, value, true)?;
                Ok(())
            }
        }
    }

    pub fn get(&self, row: usize, column: usize) -> WafResult<T> {
        match self.locate_node(row, column)? {
            Some(idx) => Ok(self.node(idx).value.clone().expect("data node has a value")),
            None => Ok(self.default_value.clone()),
        }
    }

    pub fn rget(&self, row: usize, column: usize) -> WafResult<T> {
        match self.rlocate_node(row, column)? {
            Some(idx) => Ok(self.node(idx).value.clone().expect("data node has a value")),
            None => Ok(self.default_value.clone()),
        }
    }

    pub fn at(&mut self, row: usize, column: usize) -> WafResult<&mut T> {
        self.check_coords(row, column)?;
        if self.locate_node(row, column)?.is_none() {
            let default = self.default_value.clone();
            self.insert_at(row, column, default, false)?;
        }
        let idx = self.locate_node(row, column)?.expect("just inserted");
        Ok(self.node_mut(idx).value.as_mut().expect("data node has a value"))
    }

    pub fn rat(&mut self, row: usize, column: usize) -> WafResult<&mut T> {
        self.check_coords(row, column)?;
        if self.rlocate_node(row, column)?.is_none() {
            let default = self.default_value.clone();
            self.insert_at(row, column, default, true)?;
        }
        let idx = self.rlocate_node(row, column)?.expect("just inserted");
        Ok(self.node_mut(idx).value.as_mut().expect("data node has a value"))
    }

    pub fn at_const(&self, row: usize, column: usize) -> WafResult<&T> {
        match self.locate_node(row, column)? {
            Some(idx) => Ok(self.node(idx).value.as_ref().expect("data node has a value")),
            None => Err(WafError::not_found("at", format!("({row}, {column})"))),
        }
    }

    pub fn exist(&self, row: usize, column: usize) -> WafResult<bool> {
        Ok(self.locate_node(row, column)?.is_some())
    }

    pub fn rexist(&self, row: usize, column: usize) -> WafResult<bool> {
        Ok(self.rlocate_node(row, column)?.is_some())
    }

    pub fn clear(&mut self) {
        let rows = self.rows;
        let columns = self.columns;
        let default = self.default_value.clone();
        *self = CrossList::new(rows, columns, default);
    }

    pub fn reserve(&mut self, new_rows: usize, new_columns: usize) -> WafResult<()> {
        if new_rows < self.rows {
            self.drop_rows_from(new_rows);
        }
        if new_columns < self.columns {
            self.drop_columns_from(new_columns);
        }
        self.ensure_headers(new_rows.max(new_columns));
        self.row_sizes.resize(new_rows, 0);
        self.column_sizes.resize(new_columns, 0);
        self.rows = new_rows;
        self.columns = new_columns;
        Ok(())
    }

    pub fn row_reserve(&mut self, new_rows: usize) -> WafResult<()> {
        let columns = self.columns;
        self.reserve(new_rows, columns)
    }

    pub fn column_reserve(&mut self, new_columns: usize) -> WafResult<()> {
        let rows = self.rows;
        self.reserve(rows, new_columns)
    }

    fn drop_rows_from(&mut self, from_row: usize) {
        for row in from_row..self.rows {
            let header = self.headers[row];
            let mut victims = Vec::new();
            let mut cur = self.node(header).right;
            while cur != header {
                victims.push(cur);
                cur = self.node(cur).right;
            }
            for idx in victims {
                self.unlink(idx);
            }
        }
    }

    fn drop_columns_from(&mut self, from_column: usize) {
        for column in from_column..self.columns {
            let header = self.headers[column];
            let mut victims = Vec::new();
            let mut cur = self.node(header).down;
            while cur != header {
                victims.push(cur);
                cur = self.node(cur).down;
            }
            for idx in victims {
                self.unlink(idx);
            }
        }
    }

    /// Swaps row/column in every node and `(left, up)` / `(right, down)`
    /// in every node (including headers), then swaps the bookkeeping
    /// vectors. An O(n) in-place transpose: after the per-field swap, the
    /// ring that used to be the row ring is wired exactly like the column
    /// ring used to be, and vice versa.
    pub fn transpose(&mut self) {
        for slot in self.arena.iter_mut() {
            if let Slot::Node(n) = slot {
                std::mem::swap(&mut n.row, &mut n.column);
                std::mem::swap(&mut n.left, &mut n.up);
                std::mem::swap(&mut n.right, &mut n.down);
            }
        }
        std::mem::swap(&mut self.rows, &mut self.columns);
        std::mem::swap(&mut self.row_sizes, &mut self.column_sizes);
    }

    // -- iteration --------------------------------------------------------

    fn first_in_row_from(&self, mut row: usize) -> Option<(usize, NodeIndex)> {
        while row < self.rows {
            let header = self.headers[row];
            let first = self.node(header).right;
            if first != header {
                return Some((row, first));
            }
            row += 1;
        }
        None
    }

    fn last_in_row_from(&self, row: usize) -> Option<(usize, NodeIndex)> {
        let mut row = row as isize;
        while row >= 0 {
            let header = self.headers[row as usize];
            let last = self.node(header).left;
            if last != header {
                return Some((row as usize, last));
            }
            row -= 1;
        }
        None
    }

    /// Whole-matrix forward iteration in row-major order.
    pub fn iter(&self) -> CursorIter<'_, T> {
        CursorIter {
            list: self,
            next: self.first_in_row_from(0),
        }
    }

    /// Whole-matrix reverse iteration (reverse row-major order).
    pub fn iter_rev(&self) -> ReverseCursorIter<'_, T> {
        ReverseCursorIter {
            list: self,
            next: if self.rows == 0 {
                None
            } else {
                self.last_in_row_from(self.rows - 1)
            },
        }
    }

    pub fn row_iter(&self, row: usize) -> WafResult<RowIter<'_, T>> {
        self.check_row(row)?;
        let header = self.headers[row];
        Ok(RowIter {
            list: self,
            header,
            current: self.node(header).right,
        })
    }

    pub fn row_iter_rev(&self, row: usize) -> WafResult<ReverseRowIter<'_, T>> {
        self.check_row(row)?;
        let header = self.headers[row];
        Ok(ReverseRowIter {
            list: self,
            header,
            current: self.node(header).left,
        })
    }

    pub fn column_iter(&self, column: usize) -> WafResult<ColumnIter<'_, T>> {
        self.check_column(column)?;
        let header = self.headers[column];
        Ok(ColumnIter {
            list: self,
            header,
            current: self.node(header).down,
        })
    }

    pub fn column_iter_rev(&self, column: usize) -> WafResult<ReverseColumnIter<'_, T>> {
        self.check_column(column)?;
        let header = self.headers[column];
        Ok(ReverseColumnIter {
            list: self,
            header,
            current: self.node(header).up,
        })
    }

    fn entry_at(&self, idx: NodeIndex) -> Cell<T> {
        let n = self.node(idx);
        Cell {
            row: n.row,
            column: n.column,
            value: n.value.clone().expect("iterating over a data node"),
        }
    }
}

pub struct RowIter<'a, T> {
    list: &'a CrossList<T>,
    header: NodeIndex,
    current: NodeIndex,
}

impl<'a, T: Clone> Iterator for RowIter<'a, T> {
    type Item = Cell<T>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.header {
            return None;
        }
        let cell = self.list.entry_at(self.current);
        self.current = self.list.node(self.current).right;
        Some(cell)
    }
}

pub struct ReverseRowIter<'a, T> {
    list: &'a CrossList<T>,
    header: NodeIndex,
    current: NodeIndex,
}

impl<'a, T: Clone> Iterator for ReverseRowIter<'a, T> {
    type Item = Cell<T>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.header {
            return None;
        }
        let cell = self.list.entry_at(self.current);
        self.current = self.list.node(self.current).left;
        Some(cell)
    }
}

pub struct ColumnIter<'a, T> {
    list: &'a CrossList<T>,
    header: NodeIndex,
    current: NodeIndex,
}

impl<'a, T: Clone> Iterator for ColumnIter<'a, T> {
    type Item = Cell<T>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.header {
            return None;
        }
        let cell = self.list.entry_at(self.current);
        self.current = self.list.node(self.current).down;
        Some(cell)
    }
}

pub struct ReverseColumnIter<'a, T> {
    list: &'a CrossList<T>,
    header: NodeIndex,
    current: NodeIndex,
}

impl<'a, T: Clone> Iterator for ReverseColumnIter<'a, T> {
    type Item = Cell<T>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.header {
            return None;
        }
        let cell = self.list.entry_at(self.current);
        self.current = self.list.node(self.current).up;
        Some(cell)
    }
}

pub struct CursorIter<'a, T> {
    list: &'a CrossList<T>,
    next: Option<(usize, NodeIndex)>,
}

impl<'a, T: Clone> Iterator for CursorIter<'a, T> {
    type Item = Cell<T>;
    fn next(&mut self) -> Option<Self::Item> {
        let (row, idx) = self.next?;
        let cell = self.list.entry_at(idx);
        let header = self.list.headers[row];
        let next_in_row = self.list.node(idx).right;
        self.next = if next_in_row != header {
            Some((row, next_in_row))
        } else {
            self.list.first_in_row_from(row + 1)
        };
        Some(cell)
    }
}

pub struct ReverseCursorIter<'a, T> {
    list: &'a CrossList<T>,
    next: Option<(usize, NodeIndex)>,
}

impl<'a, T: Clone> Iterator for ReverseCursorIter<'a, T> {
    type Item = Cell<T>;
    fn next(&mut self) -> Option<Self::Item> {
        let (row, idx) = self.next?;
        let cell = self.list.entry_at(idx);
        let header = self.list.headers[row];
        let prev_in_row = self.list.node(idx).left;
        self.next = if prev_in_row != header {
            Some((row, prev_in_row))
        } else if row == 0 {
            None
        } else {
            self.list.last_in_row_from(row - 1)
        };
        Some(cell)
    }
}

impl<T: Clone + PartialEq> PartialEq for CrossList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && self.size == other.size
            && self.iter().eq(other.iter())
    }
}

impl<T: GrammarValue + Clone> CrossList<T> {
    /// Emits the matrix envelope: cells in row-major order, a newline
    /// after the last cell of each row, then the `[ R C ]` footer.
    pub fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        for row in 0..self.rows {
            let mut wrote_any = false;
            for cell in self.row_iter(row).expect("row is in range") {
                cell.write(out)?;
                wrote_any = true;
            }
            if wrote_any {
                writeln!(out)?;
            }
        }
        Dimension {
            rows: self.rows,
            columns: self.columns,
        }
        .write(out)?;
        writeln!(out)
    }

    pub fn to_wire_string(&self) -> String {
        let mut s = String::new();
        self.write_to(&mut s).expect("writing to a String never fails");
        s
    }

    /// Parses a matrix envelope (cells followed by one dimension line)
    /// into a freshly sized cross list. Cells are inserted tail-biased
    /// since the grammar guarantees row-major, non-decreasing arrival.
    pub fn read_from<R: Read>(reader: R, default_value: T) -> WafResult<Self> {
        let mut tokens = Tokenizer::new(reader);
        let mut buffered = Vec::new();
        loop {
            match next_record::<T, R>(&mut tokens)? {
                Some(Record::Cell(cell)) => buffered.push(cell),
                Some(Record::Dimension(dim)) => {
                    let mut list = CrossList::new(dim.rows, dim.columns, default_value);
                    for cell in buffered {
                        list.rset(cell.row, cell.column, cell.value)?;
                    }
                    return Ok(list);
                }
                None => {
                    return Err(WafError::parse(
                        "matrix stream ended before a dimension footer",
                    ))
                }
            }
        }
    }
}

/// Sums several same-shaped cross lists element-wise into `target`,
/// mirroring the free `accumulate_to` helper of the pointer-based
/// original: useful for merging co-occurrence matrices accumulated from
/// independent batches of termid streams.
pub fn accumulate_into<T>(target: &mut CrossList<T>, others: &[&CrossList<T>]) -> WafResult<()>
where
    T: Clone + std::ops::AddAssign,
{
    for other in others {
        if other.rows() != target.rows() || other.columns() != target.columns() {
            return Err(WafError::runtime(format!(
                "cannot accumulate a ({}, {}) matrix into a ({}, {}) one",
                other.rows(),
                other.columns(),
                target.rows(),
                target.columns()
            )));
        }
        for cell in other.iter() {
            let slot = target.at(cell.row, cell.column)?;
            *slot += cell.value;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> CrossList<i64> {
        let mut m = CrossList::new(3, 4, 0i64);
        m.insert(0, 0, 1).unwrap();
        m.insert(0, 2, 2).unwrap();
        m.insert(1, 1, 3).unwrap();
        m.insert(1, 3, 4).unwrap();
        m.insert(2, 1, 5).unwrap();
        m.insert(2, 2, 6).unwrap();
        m
    }

    #[test]
    fn sizes_sum_consistently() {
        let m = fixture();
        let row_total: usize = (0..m.rows()).map(|r| m.row_size(r).unwrap()).sum();
        let col_total: usize = (0..m.columns()).map(|c| m.column_size(c).unwrap()).sum();
        assert_eq!(row_total, m.size());
        assert_eq!(col_total, m.size());
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut m = CrossList::new(2, 2, 0i64);
        assert!(m.insert(0, 1, 42).unwrap());
        assert!(!m.insert(0, 1, 99).unwrap());
        assert_eq!(m.get(0, 1).unwrap(), 42);
        assert_eq!(m.get(1, 1).unwrap(), 0);
    }

    #[test]
    fn exist_matches_rexist_everywhere() {
        let m = fixture();
        for r in 0..m.rows() {
            for c in 0..m.columns() {
                assert_eq!(m.exist(r, c).unwrap(), m.rexist(r, c).unwrap());
            }
        }
    }

    #[test]
    fn cursor_iterates_row_major() {
        let m = fixture();
        let cells: Vec<_> = m.iter().map(|c| (c.row, c.column, c.value)).collect();
        assert_eq!(
            cells,
            vec![
                (0, 0, 1),
                (0, 2, 2),
                (1, 1, 3),
                (1, 3, 4),
                (2, 1, 5),
                (2, 2, 6),
            ]
        );
    }

    #[test]
    fn transpose_twice_is_identity() {
        let mut m = fixture();
        let original = m.clone();
        m.transpose();
        assert_eq!(m.rows(), 4);
        assert_eq!(m.columns(), 3);
        m.transpose();
        assert_eq!(m, original);
    }

    #[test]
    fn transpose_swaps_coordinates() {
        let mut m = fixture();
        m.transpose();
        let cells: Vec<_> = m.iter().map(|c| (c.row, c.column, c.value)).collect();
        assert_eq!(
            cells,
            vec![
                (0, 0, 1),
                (1, 1, 3),
                (1, 2, 5),
                (2, 0, 2),
                (2, 2, 6),
                (3, 1, 4),
            ]
        );
    }

    #[test]
    fn erase_removes_from_both_rings() {
        let mut m = fixture();
        assert!(m.erase(1, 1).unwrap());
        assert!(!m.exist(1, 1).unwrap());
        assert_eq!(m.row_size(1).unwrap(), 1);
        assert_eq!(m.column_size(1).unwrap(), 1);
        assert!(!m.erase(1, 1).unwrap());
    }

    #[test]
    fn shrinking_reserve_erases_vanished_nodes() {
        let mut m = fixture();
        m.reserve(2, 4).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.size(), 4);
        assert!(!m.exist(0, 0).unwrap() == false); // (0,0) still present
    }

    #[test]
    fn serialization_round_trips() {
        let m = fixture();
        let wire = m.to_wire_string();
        let parsed = CrossList::<i64>::read_from(std::io::Cursor::new(wire.into_bytes()), 0).unwrap();
        assert_eq!(m, parsed);
        let cells: Vec<_> = parsed.iter().map(|c| (c.row, c.column, c.value)).collect();
        assert_eq!(
            cells,
            vec![
                (0, 0, 1),
                (0, 2, 2),
                (1, 1, 3),
                (1, 3, 4),
                (2, 1, 5),
                (2, 2, 6),
            ]
        );
    }

    #[test]
    fn out_of_range_coordinates_fail() {
        let m = fixture();
        assert!(m.get(10, 0).is_err());
        assert!(m.get(0, 10).is_err());
    }

    #[test]
    fn accumulate_into_sums_matching_matrices() {
        let mut target = CrossList::new(2, 2, 0i64);
        target.insert(0, 0, 1).unwrap();
        let mut a = CrossList::new(2, 2, 0i64);
        a.insert(0, 0, 2).unwrap();
        a.insert(1, 1, 5).unwrap();
        accumulate_into(&mut target, &[&a]).unwrap();
        assert_eq!(target.get(0, 0).unwrap(), 3);
        assert_eq!(target.get(1, 1).unwrap(), 5);
    }
}
