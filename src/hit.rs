use std::cmp::{max, min};
use std::fmt;

/// Stable integer handle of a read inside a [`crate::registry::ReadRegistry`].
pub type ReadId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn from_char(c: char) -> Option<Strand> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn is_reverse(&self) -> bool {
        *self == Strand::Reverse
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// The trusted, half-open interval `[st, en)` of a read.
/// `st == en` marks a read without any usable sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubRange {
    pub st: u32,
    pub en: u32,
}

impl SubRange {
    pub fn new(st: u32, en: u32) -> SubRange {
        assert!(st <= en, "sub-range start must not exceed its end");
        SubRange { st, en }
    }

    /// The "no usable region" sentinel.
    pub fn empty() -> SubRange {
        SubRange { st: 0, en: 0 }
    }

    pub fn len(&self) -> u32 {
        self.en - self.st
    }

    pub fn is_empty(&self) -> bool {
        self.st == self.en
    }

    /// Intersection of two sub-ranges, the empty sentinel if they are disjoint.
    /// # Example
    /// ```
    /// use rustyovl::hit::SubRange;
    /// let a = SubRange::new(10, 100);
    /// let b = SubRange::new(50, 200);
    /// assert_eq!(a.intersect(&b), SubRange::new(50, 100));
    /// assert!(a.intersect(&SubRange::new(100, 150)).is_empty());
    /// ```
    pub fn intersect(&self, other: &SubRange) -> SubRange {
        let st = max(self.st, other.st);
        let en = min(self.en, other.en);
        if st >= en {
            SubRange::empty()
        } else {
            SubRange { st, en }
        }
    }

    pub fn contains(&self, st: u32, en: u32) -> bool {
        self.st <= st && en <= self.en
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.st, self.en)
    }
}

/// One sub-range per read, indexed by [`ReadId`].
pub type SubRanges = Vec<SubRange>;

/// A pairwise overlap between two distinct reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapHit {
    pub query: ReadId,
    pub q_st: u32,
    pub q_en: u32,
    pub target: ReadId,
    pub t_st: u32,
    pub t_en: u32,
    pub strand: Strand,
    pub nmatch: u32,
    pub aln_len: u32,
}

impl OverlapHit {
    pub fn q_span(&self) -> u32 {
        self.q_en - self.q_st
    }

    pub fn t_span(&self) -> u32 {
        self.t_en - self.t_st
    }

    /// Fraction of matching bases in the alignment block, 0 for an empty block.
    pub fn identity(&self) -> f64 {
        if self.aln_len == 0 {
            return 0.0;
        }
        self.nmatch as f64 / self.aln_len as f64
    }

    /// Sort key used to order the hit collection.
    pub fn query_key(&self) -> (ReadId, u32) {
        (self.query, self.q_st)
    }
}

/// Full-length sub-ranges for every read, the state before any trimming.
pub fn full_sub_ranges(lengths: impl Iterator<Item = u32>) -> SubRanges {
    lengths.map(|len| SubRange::new(0, len)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn make_hit(
        query: ReadId,
        q: (u32,
        u32),
        target: ReadId,
        t: (u32,
        u32),
        strand: char,
    ) -> OverlapHit {
        let span = (q.1 - q.0).max(t.1 - t.0);
        OverlapHit {
            query,
            q_st: q.0,
            q_en: q.1,
            target,
            t_st: t.0,
            t_en: t.1,
            strand: Strand::from_char(strand).unwrap(),
            nmatch: span * 9 / 10,
            aln_len: span,
        }
    }

    #[test]
    fn test_identity_of_empty_block() {
        let mut hit = make_hit(0, (0, 10), 1, (0, 10), '+');
        hit.aln_len = 0;
        hit.nmatch = 0;
        assert_eq!(hit.identity(), 0.0);
    }

    #[test]
    fn test_strand_round_trip() {
        assert_eq!(Strand::from_char('-'), Some(Strand::Reverse));
        assert_eq!(Strand::from_char('*'), None);
        assert_eq!(Strand::Forward.to_string(), "+");
    }

    #[test]
    fn test_full_sub_ranges() {
        let subs = full_sub_ranges(vec![10, 0, 5].into_iter());
        assert_eq!(subs[0], SubRange::new(0, 10));
        assert!(subs[1].is_empty());
        assert_eq!(subs[2].len(), 5);
    }
}
