//! Geometry of an overlap relative to the trusted sub-ranges of its two reads.
//!
//! With the query drawn on its forward strand and the target flipped to match,
//! an alignment leaves an unaligned overhang on each side. Small overhangs on both
//! sides mean the reads really overlap; the side with the longer prefix decides
//! which end of each read takes part.
use super::hit::{OverlapHit, SubRange};

/// One of the two ends of a read, in the read's forward orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadEnd {
    FivePrime,
    ThreePrime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    /// Long unaligned sequence on both reads, typically a repeat.
    Internal,
    QueryContained,
    TargetContained,
    /// A dovetail whose extended length is below the minimum overlap.
    Short,
    Dovetail {
        query_end: ReadEnd,
        target_end: ReadEnd,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    pub max_hang: u32,
    pub int_frac: f64,
    pub min_ovlp: u32,
}

/// Classify `hit` given the current sub-ranges of its query and target.
/// # Example
/// ```
/// use rustyovl::hit::{OverlapHit, Strand, SubRange};
/// use rustyovl::overlap::{classify, ClassifyOptions, OverlapKind, ReadEnd};
/// let opts = ClassifyOptions { max_hang: 100, int_frac: 0.8, min_ovlp: 500 };
/// // the tail of the query overlaps the head of the target
/// let hit = OverlapHit {
///     query: 0, q_st: 400, q_en: 1000,
///     target: 1, t_st: 0, t_en: 600,
///     strand: Strand::Forward, nmatch: 580, aln_len: 600,
/// };
/// let kind = classify(&hit, &SubRange::new(0, 1000), &SubRange::new(0, 1000), &opts);
/// assert_eq!(kind, OverlapKind::Dovetail {
///     query_end: ReadEnd::ThreePrime,
///     target_end: ReadEnd::FivePrime,
/// });
/// ```
pub fn classify(
    hit: &OverlapHit,
    rq: &SubRange,
    rt: &SubRange,
    opts: &ClassifyOptions,
) -> OverlapKind {
    // coordinates relative to the sub-ranges, signed so that overhangs can be compared freely
    let qs = hit.q_st as i64 - rq.st as i64;
    let qe = hit.q_en as i64 - rq.st as i64;
    let ql = rq.len() as i64;
    let ts = hit.t_st as i64 - rt.st as i64;
    let te = hit.t_en as i64 - rt.st as i64;
    let tl = rt.len() as i64;

    // target overhangs on the query's 5' and 3' sides
    let (tl5, tl3) = if hit.strand.is_reverse() {
        (tl - te, ts)
    } else {
        (ts, tl - te)
    };
    let ext5 = qs.min(tl5);
    let ext3 = (ql - qe).min(tl3);
    let aligned = qe - qs;
    let max_hang = opts.max_hang as i64;
    if ext5 > max_hang
        || ext3 > max_hang
        || (aligned as f64) < (aligned + ext5 + ext3) as f64 * opts.int_frac
    {
        return OverlapKind::Internal;
    }

    let (query_end, target_end) = if qs <= tl5 && ql - qe <= tl3 {
        return OverlapKind::QueryContained;
    } else if qs >= tl5 && ql - qe >= tl3 {
        return OverlapKind::TargetContained;
    } else if qs > tl5 {
        let target_end = if hit.strand.is_reverse() {
            ReadEnd::ThreePrime
        } else {
            ReadEnd::FivePrime
        };
        (ReadEnd::ThreePrime, target_end)
    } else {
        let target_end = if hit.strand.is_reverse() {
            ReadEnd::FivePrime
        } else {
            ReadEnd::ThreePrime
        };
        (ReadEnd::FivePrime, target_end)
    };

    let min_ovlp = opts.min_ovlp as i64;
    if aligned + ext5 + ext3 < min_ovlp || (te - ts) + ext5 + ext3 < min_ovlp {
        return OverlapKind::Short;
    }
    OverlapKind::Dovetail {
        query_end,
        target_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::tests::make_hit;

    const OPTS: ClassifyOptions = ClassifyOptions {
        max_hang: 100,
        int_frac: 0.8,
        min_ovlp: 500,
    };

    fn full(len: u32) -> SubRange {
        SubRange::new(0, len)
    }

    #[test]
    fn test_internal_match() {
        let hit = make_hit(0, (300, 700), 1, (300, 700), '+');
        assert_eq!(classify(&hit, &full(1000), &full(1000), &OPTS), OverlapKind::Internal);
    }

    #[test]
    fn test_containment_both_ways() {
        let hit = make_hit(0, (0, 200), 1, (1000, 1200), '+');
        assert_eq!(classify(&hit, &full(200), &full(5000), &OPTS), OverlapKind::QueryContained);
        let hit = make_hit(0, (1000, 1200), 1, (0, 200), '-');
        assert_eq!(classify(&hit, &full(5000), &full(200), &OPTS), OverlapKind::TargetContained);
    }

    #[test]
    fn test_reverse_dovetail_ends() {
        // query tail against the reverse complement of the target tail
        let hit = make_hit(0, (400, 1000), 1, (400, 1000), '-');
        assert_eq!(
            classify(&hit, &full(1000), &full(1000), &OPTS),
            OverlapKind::Dovetail {
                query_end: ReadEnd::ThreePrime,
                target_end: ReadEnd::ThreePrime,
            }
        );
        // query head against the reverse complement of the target head
        let hit = make_hit(0, (0, 600), 1, (0, 600), '-');
        assert_eq!(
            classify(&hit, &full(1000), &full(1000), &OPTS),
            OverlapKind::Dovetail {
                query_end: ReadEnd::FivePrime,
                target_end: ReadEnd::FivePrime,
            }
        );
    }

    #[test]
    fn test_short_dovetail() {
        let hit = make_hit(0, (700, 1000), 1, (0, 300), '+');
        assert_eq!(classify(&hit, &full(1000), &full(1000), &OPTS), OverlapKind::Short);
    }

    #[test]
    fn test_relative_to_sub_ranges() {
        // an internal match on full reads becomes a dovetail once the ends are trimmed away
        let hit = make_hit(0, (400, 1000), 1, (200, 800), '+');
        assert_eq!(classify(&hit, &full(1200), &full(1000), &OPTS), OverlapKind::Internal);
        assert_eq!(
            classify(&hit, &SubRange::new(0, 1000), &SubRange::new(200, 1000), &OPTS),
            OverlapKind::Dovetail {
                query_end: ReadEnd::ThreePrime,
                target_end: ReadEnd::FivePrime,
            }
        );
    }
}
