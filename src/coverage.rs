use super::contained::is_contained;
use super::hit::{OverlapHit, ReadId, SubRange};
use super::overlap::{classify, ClassifyOptions, OverlapKind, ReadEnd};
use super::registry::ReadRegistry;
use super::utils::fmt_count;
use itertools::Itertools;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub struct CoverageOptions {
    pub min_depth: u32,
    pub classify: ClassifyOptions,
    /// Candidates scoring within this fraction of the best one on a read end are kept.
    pub score_tolerance: f64,
    /// Overhang allowed at each end of a read that is contained in its partner.
    pub contain_tolerance: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    pub hits: usize,
    /// Aligned bases per trusted base, a rough sequencing depth.
    pub coverage: f64,
    /// Reads with fewer retained overlaps on their best end than the minimum depth.
    pub low_support: Vec<ReadId>,
    pub internal: usize,
    pub short: usize,
    pub dominated: usize,
}

/// A hit competing for one end of one read.
struct Candidate {
    read: ReadId,
    end: ReadEnd,
    score: f64,
    nmatch: u32,
    partner: ReadId,
    idx: usize,
}

fn score(hit: &OverlapHit) -> f64 {
    hit.identity() * hit.q_span().max(hit.t_span()) as f64
}

fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    (a.read, a.end)
        .cmp(&(b.read, b.end))
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        .then_with(|| b.nmatch.cmp(&a.nmatch))
        .then_with(|| a.partner.cmp(&b.partner))
        .then_with(|| a.idx.cmp(&b.idx))
}

/// Estimate coverage and prune overlaps that are dominated on either read end.
///
/// Internal matches and short overlaps are dropped. Containments within the containment
/// tolerance are kept for [`crate::contained::resolve`]. Every dovetail competes on
/// both reads it joins and survives only when it is among the best on both. A looser
/// containment competes on both ends of the contained read in the same way. This
/// stage never deletes reads.
pub fn filter(
    hits: &mut Vec<OverlapHit>,
    subs: &[SubRange],
    reads: &ReadRegistry,
    opts: &CoverageOptions,
) -> CoverageReport {
    let before = hits.len();
    // hits on deleted reads have no geometry left, they go away with the rest
    let kinds: Vec<Option<OverlapKind>> = hits
        .iter()
        .map(|hit| {
            if reads.is_deleted(hit.query) || reads.is_deleted(hit.target) {
                return None;
            }
            Some(classify(
                hit,
                &subs[hit.query as usize],
                &subs[hit.target as usize],
                &opts.classify,
            ))
        })
        .collect();

    // containments with more overhang than the containment step tolerates, by contained read
    let loose: Vec<Option<ReadId>> = hits
        .iter()
        .zip(kinds.iter())
        .map(|(hit, kind)| {
            let rq = &subs[hit.query as usize];
            let rt = &subs[hit.target as usize];
            let tol = opts.contain_tolerance;
            match kind {
                Some(OverlapKind::QueryContained)
                    if !is_contained(hit.q_st, hit.q_en, rq, hit.t_st, hit.t_en, rt, tol) =>
                {
                    Some(hit.query)
                }
                Some(OverlapKind::TargetContained)
                    if !is_contained(hit.t_st, hit.t_en, rt, hit.q_st, hit.q_en, rq, tol) =>
                {
                    Some(hit.target)
                }
                _ => None,
            }
        })
        .collect();

    let mut candidates = Vec::new();
    for (idx, (hit, kind)) in hits.iter().zip(kinds.iter()).enumerate() {
        let s = score(hit);
        let candidate = |read: ReadId, end: ReadEnd| Candidate {
            read,
            end,
            score: s,
            nmatch: hit.nmatch,
            partner: if read == hit.query {
                hit.target
            } else {
                hit.query
            },
            idx,
        };
        if let Some(OverlapKind::Dovetail {
            query_end,
            target_end,
        }) = kind
        {
            candidates.push(candidate(hit.query, *query_end));
            candidates.push(candidate(hit.target, *target_end));
        } else if let Some(read) = loose[idx] {
            candidates.push(candidate(read, ReadEnd::FivePrime));
            candidates.push(candidate(read, ReadEnd::ThreePrime));
        }
    }
    candidates.sort_unstable_by(rank);

    // number of ends each competing hit is kept on, it needs both
    let mut votes = vec![0u8; hits.len()];
    for (_key, group) in &candidates.iter().group_by(|c| (c.read, c.end)) {
        let mut best: Option<f64> = None;
        for c in group {
            let top = *best.get_or_insert(c.score);
            if c.score >= top * (1.0 - opts.score_tolerance) {
                votes[c.idx] += 1;
            }
        }
    }

    let mut report = CoverageReport {
        hits: 0,
        coverage: 0.0,
        low_support: Vec::new(),
        internal: 0,
        short: 0,
        dominated: 0,
    };
    let mut keep = Vec::with_capacity(hits.len());
    for (idx, kind) in kinds.iter().enumerate() {
        keep.push(match kind {
            None => false,
            Some(OverlapKind::Internal) => {
                report.internal += 1;
                false
            }
            Some(OverlapKind::Short) => {
                report.short += 1;
                false
            }
            Some(OverlapKind::QueryContained | OverlapKind::TargetContained)
                if loose[idx].is_none() =>
            {
                true
            }
            Some(_) => {
                if votes[idx] < 2 {
                    report.dominated += 1;
                }
                votes[idx] >= 2
            }
        });
    }
    let mut kept_kinds = Vec::with_capacity(hits.len());
    let mut flags = keep.iter();
    hits.retain(|_| *flags.next().unwrap_or(&false));
    for (kind, kept) in kinds.into_iter().zip(keep) {
        if let (Some(kind), true) = (kind, kept) {
            kept_kinds.push(kind);
        }
    }

    // per read end support among the retained hits
    let mut support = vec![[0u32; 2]; reads.len()];
    for (hit, kind) in hits.iter().zip(kept_kinds.iter()) {
        match kind {
            OverlapKind::Dovetail {
                query_end,
                target_end,
            } => {
                support[hit.query as usize][*query_end as usize] += 1;
                support[hit.target as usize][*target_end as usize] += 1;
            }
            _ => {
                for id in [hit.query, hit.target] {
                    support[id as usize][0] += 1;
                    support[id as usize][1] += 1;
                }
            }
        }
    }
    report.low_support = reads
        .iter()
        .filter(|(id, _, read)| {
            let s = support[*id as usize];
            !read.deleted && s[0].max(s[1]) < opts.min_depth
        })
        .map(|(id, _, _)| id)
        .collect();

    report.hits = hits.len();
    report.coverage = coverage(hits, subs, reads);
    log::info!(
        "Coverage filter: {} of {} hits remain ({} internal, {} short, {} dominated); crude coverage after filtering: {:.2}; {} reads below depth {}.",
        fmt_count(report.hits),
        fmt_count(before),
        fmt_count(report.internal),
        fmt_count(report.short),
        fmt_count(report.dominated),
        report.coverage,
        fmt_count(report.low_support.len()),
        opts.min_depth,
    );
    report
}

/// Matched bases of the hits per base of trusted sequence over all live reads.
/// Zero when there is no trusted sequence left.
/// # Example
/// ```
/// use rustyovl::coverage::coverage;
/// use rustyovl::registry::ReadRegistry;
/// let reads = ReadRegistry::new();
/// assert_eq!(coverage(&[], &[], &reads), 0.0);
/// ```
pub fn coverage(hits: &[OverlapHit], subs: &[SubRange], reads: &ReadRegistry) -> f64 {
    let matched: u64 = hits.iter().map(|hit| hit.nmatch as u64).sum();
    let trusted: u64 = reads
        .iter()
        .filter(|(_, _, read)| !read.deleted)
        .map(|(id, _, _)| subs[id as usize].len() as u64)
        .sum();
    if trusted == 0 {
        return 0.0;
    }
    matched as f64 / trusted as f64
}
