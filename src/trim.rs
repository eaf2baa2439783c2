use super::hit::{OverlapHit, SubRange};
use super::registry::ReadRegistry;
use super::utils::fmt_count;
use std::cmp::{max, min};

/// Clip one hit to the sub-ranges of its reads.
///
/// Clipping one read also shortens the aligned interval on the other read by the same
/// number of bases, on the matching side given the strand. Returns `None` when either
/// side ends up empty or shorter than `min_span`.
/// # Example
/// ```
/// use rustyovl::hit::{OverlapHit, Strand, SubRange};
/// use rustyovl::trim::clip_hit;
/// let hit = OverlapHit {
///     query: 0, q_st: 0, q_en: 1000,
///     target: 1, t_st: 0, t_en: 1000,
///     strand: Strand::Forward, nmatch: 950, aln_len: 1000,
/// };
/// let clipped = clip_hit(&hit, &SubRange::new(100, 1000), &SubRange::new(0, 800), 100).unwrap();
/// assert_eq!((clipped.q_st, clipped.q_en), (100, 800));
/// assert_eq!((clipped.t_st, clipped.t_en), (100, 800));
/// ```
pub fn clip_hit(
    hit: &OverlapHit,
    rq: &SubRange,
    rt: &SubRange,
    min_span: u32,
) -> Option<OverlapHit> {
    // bases cut from each side of each read
    let q_lead = rq.st.saturating_sub(hit.q_st);
    let q_trail = hit.q_en.saturating_sub(rq.en);
    let t_lead = rt.st.saturating_sub(hit.t_st);
    let t_trail = hit.t_en.saturating_sub(rt.en);

    let (q_st, q_en, t_st, t_en) = if hit.strand.is_reverse() {
        (
            hit.q_st.saturating_add(t_trail),
            hit.q_en.saturating_sub(t_lead),
            hit.t_st.saturating_add(q_trail),
            hit.t_en.saturating_sub(q_lead),
        )
    } else {
        (
            hit.q_st.saturating_add(t_lead),
            hit.q_en.saturating_sub(t_trail),
            hit.t_st.saturating_add(q_lead),
            hit.t_en.saturating_sub(q_trail),
        )
    };

    let q_st = max(q_st, rq.st);
    let q_en = min(q_en, rq.en);
    let t_st = max(t_st, rt.st);
    let t_en = min(t_en, rt.en);
    if q_en <= q_st || t_en <= t_st || q_en - q_st < min_span || t_en - t_st < min_span {
        return None;
    }
    Some(OverlapHit {
        q_st,
        q_en,
        t_st,
        t_en,
        ..*hit
    })
}

/// Clip every hit to the current sub-ranges and drop the ones that no longer qualify.
/// Hits touching a deleted read are dropped. Survivors keep their relative order.
/// Returns the number of hits left.
pub fn cut(
    hits: &mut Vec<OverlapHit>,
    subs: &[SubRange],
    reads: &ReadRegistry,
    min_span: u32,
) -> usize {
    let before = hits.len();
    hits.retain_mut(|hit| {
        if reads.is_deleted(hit.query) || reads.is_deleted(hit.target) {
            return false;
        }
        match clip_hit(hit, &subs[hit.query as usize], &subs[hit.target as usize], min_span) {
            Some(clipped) => {
                *hit = clipped;
                true
            }
            None => false,
        }
    });
    log::info!(
        "Clipped hits to sub-ranges: {} of {} hits remain.",
        fmt_count(hits.len()),
        fmt_count(before)
    );
    hits.len()
}
