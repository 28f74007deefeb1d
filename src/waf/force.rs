//! Word Activation Force (C7): `waf(i, j) = n^2 / (f_i * f_j * d_mean^2)`,
//! computed cell-by-cell from a co-occurrence matrix and a frequency
//! vector.

use crate::error::WafResult;
use crate::structures::indexed::IndexedCrossList;
use crate::waf::cooccurrence::CoOccurrenceMatrix;
use crate::waf::frequency::FrequencyVector;
use crate::waf::TermId;

pub type WafMatrix = IndexedCrossList<f64>;

/// The bare formula, given a mean distance rather than a `(sum, n)` pair —
/// exposed standalone so callers who already have a scalar mean (a single
/// reported pair, a test fixture) don't need to round-trip through a
/// matrix cell to use it.
pub fn scalar_waf(n: u64, d_mean: f64, f_i: u64, f_j: u64) -> f64 {
    if f_i == 0 || f_j == 0 || d_mean == 0.0 {
        return 0.0;
    }
    let n = n as f64;
    (n * n) / (f_i as f64 * f_j as f64 * d_mean * d_mean)
}

/// Builds the WAF matrix for every co-occurrence edge both of whose
/// endpoints satisfy `care`, keeping only values `>= precision`. `sparse_sr`
/// and `sparse_sc` size the result's hash overlay; a value close to the
/// square root of the expected edge count keeps buckets small.
pub fn waf(
    cooccurrence: &CoOccurrenceMatrix,
    frequency: &FrequencyVector,
    care: impl Fn(TermId) -> bool,
    precision: f64,
    sparse_sr: usize,
    sparse_sc: usize,
) -> WafResult<WafMatrix> {
    let mut out = IndexedCrossList::new(cooccurrence.rows(), cooccurrence.columns(), 0.0);
    out.sparse(sparse_sr.max(1), sparse_sc.max(1))?;
    for cell in cooccurrence.iter() {
        if !care(cell.row as TermId) || !care(cell.column as TermId) {
            continue;
        }
        let (d_sum, n) = cell.value;
        if n == 0 {
            continue;
        }
        let d_mean = d_sum / n as f64;
        let f_i = frequency.get(cell.row as u64);
        let f_j = frequency.get(cell.column as u64);
        let value = scalar_waf(n, d_mean, f_i, f_j);
        if value >= precision {
            out.rinsert(cell.row, cell.column, value)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_formula_matches_hand_computation() {
        // n=3, d_mean=2, f_i=5, f_j=4 -> 9 / (5*4*4) = 9/80
        let value = scalar_waf(3, 2.0, 5, 4);
        assert!((value - 9.0 / 80.0).abs() < 1e-12);
    }

    #[test]
    fn zero_frequency_yields_zero_force() {
        assert_eq!(scalar_waf(3, 2.0, 0, 4), 0.0);
    }

    #[test]
    fn engine_matches_scalar_formula_per_cell() {
        let mut cooc = IndexedCrossList::new(2, 2, (0.0, 0u64));
        cooc.sparse(2, 2).unwrap();
        cooc.insert(0, 1, (4.0, 2)).unwrap();

        let mut freq = FrequencyVector::new();
        freq.set(0, 3);
        freq.set(1, 5);

        let matrix = waf(&cooc, &freq, |_| true, 0.0, 2, 2).unwrap();
        let expected = scalar_waf(2, 2.0, 3, 5);
        assert!((matrix.iget(0, 1).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn edges_with_no_observations_are_skipped() {
        let cooc: CoOccurrenceMatrix = IndexedCrossList::new(2, 2, (0.0, 0));
        let freq = FrequencyVector::new();
        let matrix = waf(&cooc, &freq, |_| true, 0.0, 1, 1).unwrap();
        assert_eq!(matrix.size(), 0);
    }

    #[test]
    fn precision_floor_drops_weak_edges() {
        let mut cooc = IndexedCrossList::new(2, 2, (0.0, 0u64));
        cooc.sparse(2, 2).unwrap();
        cooc.insert(0, 1, (4.0, 2)).unwrap();

        let mut freq = FrequencyVector::new();
        freq.set(0, 3);
        freq.set(1, 5);

        let expected = scalar_waf(2, 2.0, 3, 5);
        let matrix = waf(&cooc, &freq, |_| true, expected + 0.01, 2, 2).unwrap();
        assert_eq!(matrix.size(), 0);
    }

    #[test]
    fn care_predicate_excludes_uncared_endpoints() {
        let mut cooc = IndexedCrossList::new(2, 2, (0.0, 0u64));
        cooc.sparse(2, 2).unwrap();
        cooc.insert(0, 1, (4.0, 2)).unwrap();

        let mut freq = FrequencyVector::new();
        freq.set(0, 3);
        freq.set(1, 5);

        let matrix = waf(&cooc, &freq, |t| t == 0, 0.0, 2, 2).unwrap();
        assert_eq!(matrix.size(), 0);
    }
}
