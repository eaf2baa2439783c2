use super::hit::{OverlapHit, SubRange};
use super::registry::ReadRegistry;
use super::utils::fmt_count;

/// Unaligned bases of `sub` on the left and right of the aligned interval `[st, en)`.
fn hangs(st: u32, en: u32, sub: &SubRange) -> (u32, u32) {
    (st.saturating_sub(sub.st), sub.en.saturating_sub(en))
}

/// Whether the read aligned over `[st, en)` adds nothing beyond a partner aligned over
/// `[p_st, p_en)`: the alignment covers the read's whole sub-range up to `tolerance`
/// bases on each side, while the partner keeps more unaligned sequence than the read.
pub fn is_contained(
    st: u32,
    en: u32,
    sub: &SubRange,
    p_st: u32,
    p_en: u32,
    p_sub: &SubRange,
    tolerance: u32,
) -> bool {
    let (left, right) = hangs(st, en, sub);
    let (p_left, p_right) = hangs(p_st, p_en, p_sub);
    left <= tolerance && right <= tolerance && p_left + p_right > left + right
}

/// Delete reads that are contained in one of their overlap partners, then drop every
/// hit that touches a deleted read. Returns the number of hits left.
///
/// All hits are inspected before anything is removed, so the outcome does not depend
/// on hit order and running it again changes nothing.
/// # Example
/// ```
/// use rustyovl::contained::resolve;
/// use rustyovl::hit::{OverlapHit, Strand, SubRange};
/// use rustyovl::registry::ReadRegistry;
/// let mut reads = ReadRegistry::new();
/// let c = reads.intern("C", 200);
/// let d = reads.intern("D", 5000);
/// let subs = vec![SubRange::new(0, 200), SubRange::new(0, 5000)];
/// let mut hits = vec![OverlapHit {
///     query: c, q_st: 0, q_en: 200,
///     target: d, t_st: 1000, t_en: 1200,
///     strand: Strand::Forward, nmatch: 195, aln_len: 200,
/// }];
/// assert_eq!(resolve(&mut hits, &subs, &mut reads, 0), 0);
/// assert!(reads.is_deleted(c));
/// assert!(!reads.is_deleted(d));
/// ```
pub fn resolve(
    hits: &mut Vec<OverlapHit>,
    subs: &[SubRange],
    reads: &mut ReadRegistry,
    tolerance: u32,
) -> usize {
    let before = hits.len();
    let mut contained = Vec::new();
    for hit in hits.iter() {
        if reads.is_deleted(hit.query) || reads.is_deleted(hit.target) {
            continue;
        }
        let rq = &subs[hit.query as usize];
        let rt = &subs[hit.target as usize];
        if is_contained(hit.q_st, hit.q_en, rq, hit.t_st, hit.t_en, rt, tolerance) {
            log::trace!("{} is contained in {}", reads.name(hit.query), reads.name(hit.target));
            contained.push(hit.query);
        } else if is_contained(hit.t_st, hit.t_en, rt, hit.q_st, hit.q_en, rq, tolerance) {
            log::trace!("{} is contained in {}", reads.name(hit.target), reads.name(hit.query));
            contained.push(hit.target);
        }
    }
    let mut n_contained = 0;
    for id in contained {
        if !reads.is_deleted(id) {
            reads.mark_deleted(id);
            n_contained += 1;
        }
    }
    hits.retain(|hit| !reads.is_deleted(hit.query) && !reads.is_deleted(hit.target));
    log::info!(
        "Removed {} contained reads: {} of {} hits remain.",
        fmt_count(n_contained),
        fmt_count(hits.len()),
        fmt_count(before)
    );
    hits.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::tests::make_hit;
    use crate::registry::tests::with_lengths;

    #[test]
    fn test_contained_read_and_its_hits_removed() {
        let mut reads = with_lengths(&[200, 5000, 3000]);
        let subs = vec![SubRange::new(0, 200), SubRange::new(0, 5000), SubRange::new(0, 3000)];
        let mut hits = vec![
            make_hit(0, (0, 200), 1, (1000, 1200), '+'),
            make_hit(2, (0, 100), 0, (100, 200), '+'),
            make_hit(1, (3000, 5000), 2, (0, 2000), '+'),
        ];
        assert_eq!(resolve(&mut hits, &subs, &mut reads, 0), 1);
        assert!(reads.is_deleted(0));
        assert!(!reads.is_deleted(1));
        assert!(!reads.is_deleted(2));
        assert_eq!((hits[0].query, hits[0].target), (1, 2));
    }

    #[test]
    fn test_equal_spans_are_not_containment() {
        // both reads are fully aligned, neither adds less than the other
        let mut reads = with_lengths(&[1000, 1000]);
        let subs = vec![SubRange::new(100, 900), SubRange::new(50, 850)];
        let mut hits = vec![make_hit(0, (100, 900), 1, (50, 850), '+')];
        assert_eq!(resolve(&mut hits, &subs, &mut reads, 0), 1);
        assert_eq!(reads.n_deleted(), 0);
    }

    #[test]
    fn test_tolerance() {
        let subs = vec![SubRange::new(0, 1000), SubRange::new(0, 5000)];
        let hit = make_hit(0, (30, 980), 1, (2000, 2950), '-');
        let mut strict = vec![hit];
        assert_eq!(resolve(&mut strict, &subs, &mut with_lengths(&[1000, 5000]), 0), 1);
        let mut loose = vec![hit];
        let mut reads = with_lengths(&[1000, 5000]);
        assert_eq!(resolve(&mut loose, &subs, &mut reads, 50), 0);
        assert!(reads.is_deleted(0));
    }

    #[test]
    fn test_idempotent() {
        let mut reads = with_lengths(&[200, 5000, 3000, 400]);
        let subs = vec![
            SubRange::new(0, 200),
            SubRange::new(0, 5000),
            SubRange::new(0, 3000),
            SubRange::new(0, 400),
        ];
        reads.mark_deleted(3);
        let mut hits = vec![
            make_hit(0, (0, 200), 1, (1000, 1200), '+'),
            make_hit(1, (3000, 5000), 2, (0, 2000), '+'),
            make_hit(2, (0, 400), 3, (0, 400), '+'),
            make_hit(1, (0, 200), 0, (0, 200), '-'),
        ];
        let first = resolve(&mut hits, &subs, &mut reads, 10);
        let deleted = reads.n_deleted();
        let snapshot = hits.clone();
        let second = resolve(&mut hits, &subs, &mut reads, 10);
        assert_eq!(first, second);
        assert_eq!(deleted, reads.n_deleted());
        assert_eq!(snapshot, hits);
        for hit in &hits {
            assert!(!reads.is_deleted(hit.query) && !reads.is_deleted(hit.target));
        }
    }
}
