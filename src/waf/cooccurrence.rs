//! Windowed directed co-occurrence accumulation (C6): sliding a fixed-width
//! window over a sequence of termids, recording for every ordered pair
//! `(left, right)` the number of times they co-occurred and the sum of the
//! distances between them.
//!
//! Each matrix cell stores `(d_sum, n)` rather than a precomputed mean: a
//! straight running average loses the fractional remainder every time a
//! new observation lands on an already-populated cell, and there is no way
//! to recover it afterwards. Keeping the sum and the count apart lets the
//! WAF engine divide once, at the very last step, off the exact totals.

use std::collections::HashMap;

use crate::error::WafResult;
use crate::structures::indexed::IndexedCrossList;
use crate::waf::{TermId, DELIM_TERMID};

/// `(row, column) -> (distance sum, occurrence count)`.
pub type CoOccurrenceMatrix = IndexedCrossList<(f64, u64)>;

/// Adds one `(d_sum, n)` observation to `matrix[left][right]`.
fn record(matrix: &mut CoOccurrenceMatrix, left: TermId, right: TermId, distance: f64) -> WafResult<()> {
    let row = left as usize;
    let column = right as usize;
    if row >= matrix.rows() || column >= matrix.columns() {
        matrix.reserve(matrix.rows().max(row + 1), matrix.columns().max(column + 1))?;
    }
    let cell = matrix.at(row, column)?;
    cell.0 += distance;
    cell.1 += 1;
    Ok(())
}

/// Slides a window of width `window` (the co-occurrence window `W`, so the
/// distance `d` between the two counted positions ranges over `1..W-1`)
/// over `terms`, where [`DELIM_TERMID`] marks a paragraph boundary a pair
/// must never be counted across. For every ordered pair `(t[left], t[right])`
/// with `care_f(t[left])` and `care_b(t[right])` both true, records one
/// observation at distance `right - left` in `matrix` — provided no
/// delimiter falls strictly between them, and provided neither `t[left]`
/// nor `t[right]` already occurs strictly between them. That last
/// condition is what keeps a pair from being counted at more than one
/// distance: if the same term recurs closer to its partner, only the
/// closer occurrence is counted.
pub fn accumulate<F, B>(
    terms: &[TermId],
    window: usize,
    care_f: F,
    care_b: B,
    matrix: &mut CoOccurrenceMatrix,
) -> WafResult<()>
where
    F: Fn(TermId) -> bool,
    B: Fn(TermId) -> bool,
{
    scan(terms, window, matrix, |l, r| care_f(l) && care_b(r))
}

/// The cross-set variant: a pair counts if either `left` is foreground and
/// `right` is foreground-or-background, or `left` is background and `right`
/// is foreground. Used to build the two asymmetric co-occurrence matrices a
/// cross-corpus affinity comparison needs.
pub fn accumulate_cross<F, Bg>(
    terms: &[TermId],
    window: usize,
    foreground: F,
    background: Bg,
    matrix: &mut CoOccurrenceMatrix,
) -> WafResult<()>
where
    F: Fn(TermId) -> bool,
    Bg: Fn(TermId) -> bool,
{
    scan(terms, window, matrix, |l, r| {
        (foreground(l) && (foreground(r) || background(r))) || (background(l) && foreground(r))
    })
}

/// Common sliding-window scaffold. For every distance `d` in `1..window`,
/// walks `left` from `0` to `terms.len() - 1 - d`, keeping a multiset `Q`
/// of the termids strictly between `left` and `right = left + d` (plus a
/// delimiter tally) updated incrementally as the window slides, so the
/// whole pass costs `O(N * window)` rather than re-scanning the gap for
/// every position.
fn scan(
    terms: &[TermId],
    window: usize,
    matrix: &mut CoOccurrenceMatrix,
    wants: impl Fn(TermId, TermId) -> bool,
) -> WafResult<()> {
    let n = terms.len();
    for d in 1..window {
        if d >= n {
            break;
        }

        if d == 1 {
            // Nothing can sit strictly between two adjacent positions, so
            // `Q` is always empty here; skip the generic slide bookkeeping
            // below, which assumes a gap of at least one term.
            for left in 0..n - 1 {
                let t_left = terms[left];
                let t_right = terms[left + 1];
                if t_left != DELIM_TERMID && t_right != DELIM_TERMID && wants(t_left, t_right) {
                    record(matrix, t_left, t_right, 1.0)?;
                }
            }
            continue;
        }

        let mut between: HashMap<TermId, u32> = HashMap::new();
        for &t in &terms[1..d] {
            *between.entry(t).or_insert(0) += 1;
        }

        let mut left = 0usize;
        loop {
            let right = left + d;
            if right >= n {
                break;
            }
            let t_left = terms[left];
            let t_right = terms[right];
            let delim_in_window = between.get(&DELIM_TERMID).copied().unwrap_or(0);

            if delim_in_window == 0
                && t_left != DELIM_TERMID
                && t_right != DELIM_TERMID
                && wants(t_left, t_right)
                && between.get(&t_left).copied().unwrap_or(0) == 0
                && between.get(&t_right).copied().unwrap_or(0) == 0
            {
                record(matrix, t_left, t_right, d as f64)?;
            }

            // Slide the window by one: `terms[left + 1]` (the new `left`)
            // leaves the gap, `terms[right]` (the old `right`) enters it.
            let leaving = terms[left + 1];
            if let Some(count) = between.get_mut(&leaving) {
                *count -= 1;
                if *count == 0 {
                    between.remove(&leaving);
                }
            }
            *between.entry(t_right).or_insert(0) += 1;

            left += 1;
        }
    }
    Ok(())
}

/// Divides `(d_sum, n)` into a plain mean distance, in place. Its own
/// inverse is [`total_distance`]; composing the two round-trips a cell
/// exactly as long as no further observations land on it in between.
pub fn mean_distance(matrix: &mut CoOccurrenceMatrix, row: usize, column: usize) -> WafResult<f64> {
    let cell = matrix.at(row, column)?;
    if cell.1 > 0 {
        cell.0 /= cell.1 as f64;
    }
    Ok(cell.0)
}

/// The inverse of [`mean_distance`]: multiplies the stored mean back out
/// into a sum, using the unchanged occurrence count.
pub fn total_distance(matrix: &mut CoOccurrenceMatrix, row: usize, column: usize) -> WafResult<f64> {
    let cell = matrix.at(row, column)?;
    cell.0 *= cell.1 as f64;
    Ok(cell.0)
}

/// Walks every populated cell of `matrix`, converting its stored `d_sum`
/// into a `d_mean` in place. Called once, after accumulation finishes and
/// before the matrix is handed to the WAF engine or written out.
pub fn mean_distance_matrix(matrix: &mut CoOccurrenceMatrix) -> WafResult<()> {
    let positions: Vec<(usize, usize)> = matrix.iter().map(|cell| (cell.row, cell.column)).collect();
    for (row, column) in positions {
        mean_distance(matrix, row, column)?;
    }
    Ok(())
}

/// The inverse of [`mean_distance_matrix`]: converts every populated cell's
/// `d_mean` back into a `d_sum`.
pub fn total_distance_matrix(matrix: &mut CoOccurrenceMatrix) -> WafResult<()> {
    let positions: Vec<(usize, usize)> = matrix.iter().map(|cell| (cell.row, cell.column)).collect();
    for (row, column) in positions {
        total_distance(matrix, row, column)?;
    }
    Ok(())
}
