//! The sparse linear-algebra substrate the analytics pipeline rests on:
//! the cross-list grid, its hash-indexed overlay, the streaming reader,
//! and the wire grammar that glues file-backed stages together.

pub mod cross_list;
pub mod indexed;
pub mod serialization;
pub mod streaming;

pub use cross_list::CrossList;
pub use indexed::IndexedCrossList;
pub use streaming::StreamingMatrix;
