use super::hit::{OverlapHit, ReadId, SubRange, SubRanges};
use super::registry::ReadRegistry;
use super::utils::fmt_count;
use itertools::Itertools;
use rayon::prelude::*;

/// How a read's trusted interval is chosen from its depth profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// From the first position reaching the depth threshold to the last position holding it.
    #[default]
    Span,
    /// The longest single stretch holding the depth threshold.
    LongestRun,
}

#[derive(Debug, Clone, Copy)]
pub struct EstimateOptions {
    pub min_depth: u32,
    /// Bases ignored at both ends of every hit before counting depth.
    pub end_clip: u32,
    pub min_span: u32,
    pub policy: Policy,
}

/// End events order before start events at the same position,
/// so hits that merely abut do not stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    End,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct DepthEvent {
    read: ReadId,
    pos: u32,
    kind: EventKind,
}

fn push_interval(events: &mut Vec<DepthEvent>, read: ReadId, st: u32, en: u32, clip: u32) {
    let st = st.saturating_add(clip);
    let en = en.saturating_sub(clip);
    if en > st {
        events.push(DepthEvent {
            read,
            pos: st,
            kind: EventKind::Start,
        });
        events.push(DepthEvent {
            read,
            pos: en,
            kind: EventKind::End,
        });
    }
}

/// Sweep the sorted events of one read and return its supported interval, if any.
fn sweep<'a>(
    events: impl Iterator<Item = &'a DepthEvent>,
    min_depth: u32,
    policy: Policy,
) -> Option<SubRange> {
    let mut depth: u32 = 0;
    let mut run_st = 0;
    let mut first_st: Option<u32> = None;
    let mut last_en = 0;
    let mut longest: Option<SubRange> = None;
    for ev in events {
        let old = depth;
        match ev.kind {
            EventKind::Start => depth += 1,
            EventKind::End => depth -= 1,
        }
        if old < min_depth && depth >= min_depth {
            run_st = ev.pos;
            first_st.get_or_insert(ev.pos);
        } else if old >= min_depth && depth < min_depth {
            last_en = ev.pos;
            if ev.pos > run_st && longest.map_or(true, |l| ev.pos - run_st > l.len()) {
                longest = Some(SubRange::new(run_st, ev.pos));
            }
        }
    }
    match policy {
        Policy::Span => first_st
            .filter(|&st| last_en > st)
            .map(|st| SubRange::new(st, last_en)),
        Policy::LongestRun => longest,
    }
}

/// Compute every read's trusted sub-range from the depth of the hits touching it.
///
/// Both ends of a hit count: the query interval for the query read and the target
/// interval for the target read. Reads without a supported interval of at least
/// `min_span` bases collapse to the empty sentinel and are marked deleted.
/// # Example
/// ```
/// use rustyovl::hit::{OverlapHit, Strand, SubRange};
/// use rustyovl::registry::ReadRegistry;
/// use rustyovl::subrange::{estimate, EstimateOptions, Policy};
/// let mut reads = ReadRegistry::new();
/// let a = reads.intern("A", 1000);
/// let b = reads.intern("B", 1000);
/// let hits = vec![OverlapHit {
///     query: a, q_st: 100, q_en: 900,
///     target: b, t_st: 50, t_en: 850,
///     strand: Strand::Forward, nmatch: 800, aln_len: 800,
/// }];
/// let opts = EstimateOptions { min_depth: 1, end_clip: 0, min_span: 100, policy: Policy::Span };
/// let subs = estimate(&hits, &mut reads, &opts);
/// assert_eq!(subs[a as usize], SubRange::new(100, 900));
/// assert_eq!(subs[b as usize], SubRange::new(50, 850));
/// ```
pub fn estimate(
    hits: &[OverlapHit],
    reads: &mut ReadRegistry,
    opts: &EstimateOptions,
) -> SubRanges {
    let min_depth = opts.min_depth.max(1);
    let mut events = Vec::with_capacity(hits.len() * 4);
    for hit in hits {
        push_interval(&mut events, hit.query, hit.q_st, hit.q_en, opts.end_clip);
        push_interval(&mut events, hit.target, hit.t_st, hit.t_en, opts.end_clip);
    }
    events.par_sort_unstable();

    let mut subs = vec![SubRange::empty(); reads.len()];
    for (read, group) in &events.iter().group_by(|ev| ev.read) {
        if let Some(sub) = sweep(group, min_depth, opts.policy) {
            if sub.len() >= opts.min_span {
                subs[read as usize] = sub;
            }
        }
    }

    let newly_deleted = reads.delete_empty(&subs);
    log::info!(
        "Sub-ranges at depth {} (end clip {}): {} reads kept, {} newly deleted.",
        min_depth,
        opts.end_clip,
        fmt_count(subs.iter().filter(|s| !s.is_empty()).count()),
        fmt_count(newly_deleted),
    );
    subs
}

/// Intersect two sub-range sets read by read.
/// Reads whose intersection is empty are deleted and get the empty sentinel.
pub fn merge(a: &[SubRange], b: &[SubRange], reads: &mut ReadRegistry) -> SubRanges {
    assert_eq!(a.len(), b.len(), "sub-range sets must cover the same reads");
    let merged: SubRanges = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| x.intersect(y))
        .collect();
    let newly_deleted = reads.delete_empty(&merged);
    log::info!(
        "Merged two filtering rounds: {} reads newly deleted.",
        fmt_count(newly_deleted)
    );
    merged
}
