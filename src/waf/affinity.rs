//! Affinity (C8): the symmetric measure built from a [`WafMatrix`]:
//! `aff(i, j) = sqrt(K_mean(i, j) * L_mean(i, j))`, where `K_mean` averages
//! how similarly `i` and `j` are forced by the union of their in-neighbours,
//! and `L_mean` does the same over the union of their out-neighbours.
//!
//! `K_mean(i, j)` walks the union of in-neighbours of `i` and `j`: for a
//! term `k` that forces both, it contributes `min(w_ki, w_kj) / max(w_ki,
//! w_kj)`; for a `k` that forces only one of them, it contributes `0` but
//! still counts toward the union size in the denominator. `L_mean` is the
//! same walk over out-neighbours. A term with no in-edges at all forces
//! `K_mean` to `1` by convention (an empty union would otherwise collapse
//! every pair through it to zero), and symmetrically for `L_mean` and
//! out-edges — except a term with *neither* in- nor out-edges, which gets
//! affinity `0` with everything instead, per the fast path below.

use crate::error::WafResult;
use crate::structures::indexed::IndexedCrossList;
use crate::waf::force::WafMatrix;
use crate::waf::TermId;

pub type AffinityMatrix = IndexedCrossList<f64>;

/// Per-term in-/out-degree, restricted to the cared-about termids the
/// engine was asked to emit pairs for. Used only to compute the algebraic
/// upper bound below; the exact `K_mean`/`L_mean` walk always looks at the
/// matrix's real neighbourhoods, cared-about or not.
struct Degrees {
    in_degree: Vec<u64>,
    out_degree: Vec<u64>,
}

fn degrees(matrix: &WafMatrix, universe: usize) -> Degrees {
    let mut in_degree = vec![0u64; universe];
    let mut out_degree = vec![0u64; universe];
    for cell in matrix.iter() {
        if cell.row < universe {
            out_degree[cell.row] += 1;
        }
        if cell.column < universe {
            in_degree[cell.column] += 1;
        }
    }
    Degrees { in_degree, out_degree }
}

/// In-neighbours of `term`: `(k, w_k_term)` for every edge `k -> term`,
/// ascending by `k` (the cross list keeps a column ring sorted by row).
fn in_neighbors(matrix: &WafMatrix, term: usize) -> WafResult<Vec<(usize, f64)>> {
    if term >= matrix.columns() {
        return Ok(Vec::new());
    }
    Ok(matrix
        .column_iter(term)?
        .map(|cell| (cell.row, cell.value))
        .collect())
}

/// Two-finger merge over the sorted neighbour lists of `i` and `j`: `k`
/// present in both contributes `min/max`; `k` present in only one
/// contributes `0` but still counts toward the union size. Runs in
/// `O(|a| + |b|)`.
fn union_ratio_mean(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }
    let (mut ia, mut ib) = (0usize, 0usize);
    let mut sum = 0.0;
    let mut count = 0u64;
    while ia < a.len() || ib < b.len() {
        match (a.get(ia), b.get(ib)) {
            (Some(&(ka, wa)), Some(&(kb, wb))) => {
                if ka == kb {
                    let (mn, mx) = if wa <= wb { (wa, wb) } else { (wb, wa) };
                    if mx > 0.0 {
                        sum += mn / mx;
                    }
                    count += 1;
                    ia += 1;
                    ib += 1;
                } else if ka < kb {
                    count += 1;
                    ia += 1;
                } else {
                    count += 1;
                    ib += 1;
                }
            }
            (Some(_), None) => {
                count += 1;
                ia += 1;
            }
            (None, Some(_)) => {
                count += 1;
                ib += 1;
            }
            (None, None) => unreachable!(),
        }
    }
    if count == 0 {
        1.0
    } else {
        sum / count as f64
    }
}

/// The algebraic upper bound on `aff(i, j)`: each ratio factor collapses to
/// `1` whenever either side has no edges in that direction, matching the
/// `K_mean`/`L_mean` "no in-edges" convention so the bound never prunes a
/// pair the exact computation would still let through.
fn degree_ratio(a: u64, b: u64) -> f64 {
    if a == 0 || b == 0 {
        1.0
    } else {
        let (mn, mx) = if a <= b { (a, b) } else { (b, a) };
        mn as f64 / mx as f64
    }
}

/// Computes affinity over every pair of cared-about termids in `matrix`'s
/// term universe. `min_affinity` is both the emission floor and the value
/// the algebraic bound is tested against before the exact `O(|N_i|+|N_j|)`
/// computation runs.
pub fn affinity(
    matrix: &WafMatrix,
    care: impl Fn(TermId) -> bool,
    min_affinity: f64,
    sparse_sr: usize,
    sparse_sc: usize,
) -> WafResult<AffinityMatrix> {
    let universe = matrix.rows().max(matrix.columns());
    let cared: Vec<usize> = (0..universe).filter(|&i| care(i as TermId)).collect();
    let degrees = degrees(matrix, universe);
    let isolated: Vec<bool> = (0..universe)
        .map(|i| degrees.in_degree[i] == 0 && degrees.out_degree[i] == 0)
        .collect();

    let mut out = IndexedCrossList::new(universe, universe, 0.0);
    out.sparse(sparse_sr.max(1), sparse_sc.max(1))?;

    for &i in &cared {
        if !isolated[i] {
            out.insert(i, i, 1.0)?;
        }
    }

    for (pos, &i) in cared.iter().enumerate() {
        if isolated[i] {
            continue;
        }
        for &j in &cared[pos + 1..] {
            if isolated[j] {
                continue;
            }
            let bound = (degree_ratio(degrees.in_degree[i], degrees.in_degree[j])
                * degree_ratio(degrees.out_degree[i], degrees.out_degree[j]))
            .sqrt();
            if bound < min_affinity {
                continue;
            }
            let value = pair_affinity(matrix, i, j)?;
            if value >= min_affinity {
                out.insert(i, j, value)?;
                out.insert(j, i, value)?;
            }
        }
    }
    Ok(out)
}

fn pair_affinity(matrix: &WafMatrix, i: usize, j: usize) -> WafResult<f64> {
    let in_i = in_neighbors(matrix, i)?;
    let in_j = in_neighbors(matrix, j)?;
    let k_mean = union_ratio_mean(&in_i, &in_j);

    let out_i = out_neighbors(matrix, i)?;
    let out_j = out_neighbors(matrix, j)?;
    let l_mean = union_ratio_mean(&out_i, &out_j);

    Ok((k_mean * l_mean).sqrt())
}

fn out_neighbors(matrix: &WafMatrix, term: usize) -> WafResult<Vec<(usize, f64)>> {
    if term >= matrix.rows() {
        return Ok(Vec::new());
    }
    Ok(matrix
        .row_iter(term)?
        .map(|cell| (cell.column, cell.value))
        .collect())
}

/// Cross-matrix affinity diagonal: `a` and `b` are two WAF matrices over a
/// shared term universe (e.g. foreground vs. background corpora); computes
/// `aff_A_B(i, i)` — `i`'s own in-/out-neighbour profile in `a` compared
/// against its profile in `b` — for each cared-about `i`. When `a` and `b`
/// carry identical edges (the same matrix measured against itself), every
/// union ratio is `1` and the result is vacuously `1` for every live `i`;
/// the formula does not need to special-case that.
pub fn between_matrices_diagonal(
    a: &WafMatrix,
    b: &WafMatrix,
    care: impl Fn(TermId) -> bool,
) -> WafResult<Vec<(TermId, f64)>> {
    let universe = a.rows().max(a.columns()).max(b.rows()).max(b.columns());
    let mut out = Vec::new();
    for i in 0..universe {
        if !care(i as TermId) {
            continue;
        }
        let in_a = in_neighbors(a, i)?;
        let in_b = in_neighbors(b, i)?;
        if in_a.is_empty() && in_b.is_empty() && out_neighbors(a, i)?.is_empty() && out_neighbors(b, i)?.is_empty() {
            continue;
        }
        let k_mean = union_ratio_mean(&in_a, &in_b);
        let out_a = out_neighbors(a, i)?;
        let out_b = out_neighbors(b, i)?;
        let l_mean = union_ratio_mean(&out_a, &out_b);
        let value = (k_mean * l_mean).sqrt();
        out.push((i as TermId, value));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The seven-term fixture from the testable-properties section:
    /// `t->u=0.04, w->u=0.05, z->u=0.05, u->x=0.03, u->y=0.03, t->v=0.05,
    /// w->v=0.02, v->x=0.06, v->y=0.03, v->z=0.04`, terms numbered
    /// `t=0,u=1,v=2,w=3,x=4,y=5,z=6`.
    fn seven_term_fixture() -> WafMatrix {
        let mut m = IndexedCrossList::new(7, 7, 0.0);
        m.sparse(7, 7).unwrap();
        m.insert(0, 1, 0.04).unwrap(); // t->u
        m.insert(3, 1, 0.05).unwrap(); // w->u
        m.insert(6, 1, 0.05).unwrap(); // z->u
        m.insert(1, 4, 0.03).unwrap(); // u->x
        m.insert(1, 5, 0.03).unwrap(); // u->y
        m.insert(0, 2, 0.05).unwrap(); // t->v
        m.insert(3, 2, 0.02).unwrap(); // w->v
        m.insert(2, 4, 0.06).unwrap(); // v->x
        m.insert(2, 5, 0.03).unwrap(); // v->y
        m.insert(2, 6, 0.04).unwrap(); // v->z
        m
    }

    #[test]
    fn worked_fixture_matches_k_mean_l_mean_and_affinity() {
        let m = seven_term_fixture();
        let in_u = in_neighbors(&m, 1).unwrap();
        let in_v = in_neighbors(&m, 2).unwrap();
        let k_mean = union_ratio_mean(&in_u, &in_v);
        assert!((k_mean - 0.4).abs() < 1e-9, "K_mean was {k_mean}");

        let out_u = out_neighbors(&m, 1).unwrap();
        let out_v = out_neighbors(&m, 2).unwrap();
        let l_mean = union_ratio_mean(&out_u, &out_v);
        assert!((l_mean - 0.5).abs() < 1e-9, "L_mean was {l_mean}");

        let value = pair_affinity(&m, 1, 2).unwrap();
        assert!((value - 0.4472135955).abs() < 1e-6, "aff(u,v) was {value}");
    }

    #[test]
    fn diagonal_is_one_for_every_live_term() {
        let m = seven_term_fixture();
        let out = affinity(&m, |_| true, 0.0, 4, 4).unwrap();
        for i in 0..7usize {
            assert_eq!(out.iget(i, i).unwrap(), 1.0);
        }
    }

    #[test]
    fn affinity_is_symmetric() {
        let m = seven_term_fixture();
        let out = affinity(&m, |_| true, 0.0, 4, 4).unwrap();
        assert_eq!(out.iget(1, 2).unwrap(), out.iget(2, 1).unwrap());
        assert!((out.iget(1, 2).unwrap() - 0.4472135955).abs() < 1e-6);
    }

    #[test]
    fn isolated_term_has_zero_affinity_with_everything() {
        let mut m = seven_term_fixture();
        // Term id 10 has no edges in either direction at all.
        m.reserve(11, 11).unwrap();
        let out = affinity(&m, |_| true, 0.0, 4, 4).unwrap();
        for j in 0..11usize {
            assert!(!out.iexist(10, j).unwrap());
        }
    }

    #[test]
    fn min_affinity_floor_prunes_weak_pairs() {
        let m = seven_term_fixture();
        let out = affinity(&m, |_| true, 0.9, 4, 4).unwrap();
        // Nothing but the diagonal clears a 0.9 floor in this fixture.
        for i in 0..7usize {
            for j in 0..7usize {
                if i != j {
                    assert!(!out.iexist(i, j).unwrap());
                }
            }
        }
    }

    #[test]
    fn care_predicate_restricts_emitted_pairs() {
        let m = seven_term_fixture();
        let out = affinity(&m, |id| id != 2, 0.0, 4, 4).unwrap();
        // v (id 2) is never cared about, so it gets no row/column at all,
        // including its own diagonal.
        assert!(!out.iexist(2, 2).unwrap());
        assert!(!out.iexist(1, 2).unwrap());
    }

    #[test]
    fn diagonal_cross_matrix_affinity_is_vacuously_one_against_itself() {
        let a = seven_term_fixture();
        let diag = between_matrices_diagonal(&a, &a, |_| true).unwrap();
        assert!(diag.iter().all(|(_, v)| (*v - 1.0).abs() < 1e-9));
    }

    #[test]
    fn diagonal_cross_matrix_affinity_detects_a_shifted_profile() {
        let a = seven_term_fixture();
        let mut b = seven_term_fixture();
        // Change how strongly w forces u in the second corpus.
        b.set(3, 1, 0.5).unwrap();
        let diag = between_matrices_diagonal(&a, &b, |id| id == 1).unwrap();
        assert_eq!(diag.len(), 1);
        assert!(diag[0].1 < 1.0);
    }
}
