pub mod affinity_measure;
pub mod analyze_matrix;
pub mod co_occurrence;
pub mod filter_termset;
pub mod help;
pub mod term_to_termid;
pub mod termid_frequency;
pub mod word_activation_force;
