//! Term set (C5, part 1): a bijective mapping between [`TermId`] and an
//! opaque term string, plus the maximum live termid.

use std::io::Read;

use ahash::AHashMap;

use crate::error::{WafError, WafResult};
use crate::structures::serialization::{read_pairs_until_eof, write_pairs, Tokenizer};
use crate::waf::{TermId, DELIM_TERMID};

#[derive(Debug, Clone, Default)]
pub struct TermSet {
    term_to_id: AHashMap<String, TermId>,
    id_to_term: AHashMap<TermId, String>,
    max_termid: Option<TermId>,
}

impl TermSet {
    pub fn new() -> Self {
        TermSet::default()
    }

    pub fn len(&self) -> usize {
        self.id_to_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_term.is_empty()
    }

    pub fn max_termid(&self) -> Option<TermId> {
        self.max_termid
    }

    /// Next unused termid, for callers building a set incrementally (the
    /// `term-to-termid` pipeline stage).
    pub fn next_free_termid(&self) -> TermId {
        match self.max_termid {
            Some(id) => id + 1,
            None => 0,
        }
    }

    pub fn contains_id(&self, id: TermId) -> bool {
        self.id_to_term.contains_key(&id)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.term_to_id.contains_key(term)
    }

    pub fn id_of(&self, term: &str) -> Option<TermId> {
        self.term_to_id.get(term).copied()
    }

    pub fn term_of(&self, id: TermId) -> Option<&str> {
        self.id_to_term.get(&id).map(|s| s.as_str())
    }

    /// Establishes `id <-> term`. Succeeds (returns `true`) only if
    /// neither direction is already taken; `id` must not be the sentinel
    /// [`DELIM_TERMID`].
    pub fn insert(&mut self, id: TermId, term: &str) -> WafResult<bool> {
        if id == DELIM_TERMID {
            return Err(WafError::invalid_argument(
                "term_set.insert",
                "termid collides with the reserved delim_termid sentinel",
            ));
        }
        if self.id_to_term.contains_key(&id) || self.term_to_id.contains_key(term) {
            return Ok(false);
        }
        self.id_to_term.insert(id, term.to_string());
        self.term_to_id.insert(term.to_string(), id);
        self.max_termid = Some(self.max_termid.map_or(id, |m| m.max(id)));
        Ok(true)
    }

    /// Looks the term up, inserting it at the next free termid if absent.
    /// Returns the (possibly freshly minted) termid.
    pub fn intern(&mut self, term: &str) -> TermId {
        if let Some(id) = self.id_of(term) {
            return id;
        }
        let id = self.next_free_termid();
        self.insert(id, term)
            .expect("next_free_termid is always free");
        id
    }

    pub fn erase_by_id(&mut self, id: TermId) -> bool {
        match self.id_to_term.remove(&id) {
            Some(term) => {
                self.term_to_id.remove(&term);
                true
            }
            None => false,
        }
    }

    pub fn erase_by_term(&mut self, term: &str) -> bool {
        match self.term_to_id.remove(term) {
            Some(id) => {
                self.id_to_term.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Iterates `(termid, term)` sorted by termid.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &str)> {
        let mut ids: Vec<_> = self.id_to_term.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(move |id| (id, self.id_to_term[&id].as_str()))
    }

    /// Parses a term-set file: one `(termid term)` pair per line,
    /// terminated by end-of-stream (no dimension footer).
    pub fn read_from<R: Read>(reader: R) -> WafResult<Self> {
        let mut tokens = Tokenizer::new(reader);
        let pairs = read_pairs_until_eof::<TermId, String, R>(&mut tokens)?;
        let mut set = TermSet::new();
        for (id, term) in pairs {
            set.insert(id, &term)?;
        }
        Ok(set)
    }

    pub fn write_to(&self, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        write_pairs(
            self.iter().map(|(id, term)| (id, term.to_string())),
            out,
        )
    }

    pub fn to_wire_string(&self) -> String {
        let mut s = String::new();
        self.write_to(&mut s).expect("writing to a String never fails");
        s
    }
}
