#![allow(dead_code)]

macro_rules! svec[
    ($($x:expr),*) => (
        vec![$($x),*].into_iter()
                     .map(|s: &str| s.to_string())
                     .collect::<Vec<String>>()
    );
    ($($x:expr,)*) => (svec![$($x),*]);
];

mod workdir;

mod test_affinity_measure;
mod test_co_occurrence;
mod test_termid_frequency;
mod test_word_activation_force;
