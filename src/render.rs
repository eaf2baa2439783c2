use super::hit::{OverlapHit, ReadId, SubRange};
use super::registry::ReadRegistry;
use std::fmt;
use std::io::{self, Write};

/// What the run writes out at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One PAF-like line per surviving overlap, in sub-range coordinates.
    #[default]
    Overlaps,
    /// One BED-like line per surviving read with its trusted interval.
    SubRanges,
}

/// A read as it appears in the overlap listing: its name tagged with the
/// 1-based inclusive sub-range, e.g. `read:101-900`.
struct Tagged<'a> {
    name: &'a str,
    sub: &'a SubRange,
}

impl<'a> fmt::Display for Tagged<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}", self.name, self.sub.st + 1, self.sub.en)
    }
}

fn tagged<'a>(reads: &'a ReadRegistry, subs: &'a [SubRange], id: ReadId) -> Tagged<'a> {
    Tagged {
        name: reads.name(id),
        sub: &subs[id as usize],
    }
}

/// Write `name\tstart\tend` for every read that was not deleted.
/// # Example
/// ```
/// use rustyovl::hit::SubRange;
/// use rustyovl::registry::ReadRegistry;
/// use rustyovl::render::write_sub_ranges;
/// let mut reads = ReadRegistry::new();
/// reads.intern("A", 1000);
/// let b = reads.intern("B", 1000);
/// reads.mark_deleted(b);
/// let mut out = Vec::new();
/// write_sub_ranges(&mut out, &reads, &[SubRange::new(100, 900), SubRange::empty()]).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "A\t100\t900\n");
/// ```
pub fn write_sub_ranges<W: Write>(
    out: &mut W,
    reads: &ReadRegistry,
    subs: &[SubRange],
) -> io::Result<()> {
    for (id, name, read) in reads.iter() {
        if read.deleted {
            continue;
        }
        let sub = &subs[id as usize];
        writeln!(out, "{}\t{}\t{}", name, sub.st, sub.en)?;
    }
    Ok(())
}

/// Write every hit with both reads renamed to their sub-range and the
/// coordinates shifted to match. Quality columns are placeholders.
pub fn write_hits<W: Write>(
    out: &mut W,
    hits: &[OverlapHit],
    reads: &ReadRegistry,
    subs: &[SubRange],
) -> io::Result<()> {
    for hit in hits {
        if reads.is_deleted(hit.query) || reads.is_deleted(hit.target) {
            continue;
        }
        let rq = &subs[hit.query as usize];
        let rt = &subs[hit.target as usize];
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t100\t1000\t255",
            tagged(reads, subs, hit.query),
            rq.len(),
            hit.q_st - rq.st,
            hit.q_en - rq.st,
            hit.strand,
            tagged(reads, subs, hit.target),
            rt.len(),
            hit.t_st - rt.st,
            hit.t_en - rt.st,
        )?;
    }
    Ok(())
}

/// Write the final result in the requested mode.
pub fn write<W: Write>(
    out: &mut W,
    mode: OutputMode,
    hits: &[OverlapHit],
    reads: &ReadRegistry,
    subs: &[SubRange],
) -> io::Result<()> {
    match mode {
        OutputMode::Overlaps => write_hits(out, hits, reads, subs),
        OutputMode::SubRanges => write_sub_ranges(out, reads, subs),
    }
}
