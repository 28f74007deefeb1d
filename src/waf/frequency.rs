//! Frequency vector (C5, part 2): termid -> non-negative frequency, with
//! zero-default reads and auto-extending writes.

use std::io::Read;

use ahash::AHashMap;

use crate::error::WafResult;
use crate::structures::serialization::{read_pairs_until_eof, write_pairs, Tokenizer};
use crate::waf::TermId;

#[derive(Debug, Clone, Default)]
pub struct FrequencyVector {
    counts: AHashMap<TermId, u64>,
}

impl FrequencyVector {
    pub fn new() -> Self {
        FrequencyVector::default()
    }

    pub fn get(&self, id: TermId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, id: TermId, value: u64) {
        self.counts.insert(id, value);
    }

    pub fn increment(&mut self, id: TermId) {
        self.increment_by(id, 1);
    }

    pub fn increment_by(&mut self, id: TermId, amount: u64) {
        *self.counts.entry(id).or_insert(0) += amount;
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, u64)> + '_ {
        let mut ids: Vec<_> = self.counts.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| (id, self.counts[&id]))
    }

    /// Parses a frequency-vector file: one `(termid frequency)` pair per
    /// line, terminated by end-of-stream.
    pub fn read_from<R: Read>(reader: R) -> WafResult<Self> {
        let mut tokens = Tokenizer::new(reader);
        let pairs = read_pairs_until_eof::<TermId, u64, R>(&mut tokens)?;
        let mut vector = FrequencyVector::new();
        for (id, freq) in pairs {
            vector.set(id, freq);
        }
        Ok(vector)
    }

    pub fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write_pairs(self.iter(), out)
    }

    pub fn to_wire_string(&self) -> String {
        let mut s = String::new();
        self.write_to(&mut s).expect("writing to a String never fails");
        s
    }
}
