//! The analytics core proper: term accounting, the windowed co-occurrence
//! engine, the WAF measure and the affinity measure built from it.

pub mod affinity;
pub mod cooccurrence;
pub mod force;
pub mod frequency;
pub mod term_set;

/// A non-negative term identifier, unique within a run. Need not be dense.
pub type TermId = u64;

/// The sentinel termid ("all bits set") marking a paragraph boundary a
/// pair must never be counted across.
pub const DELIM_TERMID: TermId = TermId::MAX;

pub use affinity::{affinity, between_matrices_diagonal, AffinityMatrix};
pub use cooccurrence::{
    accumulate, accumulate_cross, mean_distance, mean_distance_matrix, total_distance,
    total_distance_matrix, CoOccurrenceMatrix,
};
pub use force::{scalar_waf, waf, WafMatrix};
pub use frequency::FrequencyVector;
pub use term_set::TermSet;
