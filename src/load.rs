use super::hit::{OverlapHit, ReadId};
use super::paf::{self, PafRecord};
use super::registry::ReadRegistry;
use super::utils::fmt_count;
use rayon::prelude::*;

/// Admission thresholds applied while reading overlaps.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub min_match: u32,
    pub min_identity: f64,
}

/// Tally of what happened to every input record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub records: usize,
    pub malformed: usize,
    pub self_hits: usize,
    pub low_match: usize,
    pub low_identity: usize,
    pub inconsistent: usize,
    pub admitted: usize,
}

impl LoadStats {
    fn log(&self) {
        log::info!(
            "Read {} PAF records: {} admitted, {} malformed, {} self hits, {} below min match, {} below min identity, {} with inconsistent lengths.",
            fmt_count(self.records),
            fmt_count(self.admitted),
            fmt_count(self.malformed),
            fmt_count(self.self_hits),
            fmt_count(self.low_match),
            fmt_count(self.low_identity),
            fmt_count(self.inconsistent),
        );
    }
}

enum Admission {
    Hit(OverlapHit),
    SelfHit,
    LowMatch,
    LowIdentity,
    Inconsistent,
}

fn fits_read(reads: &ReadRegistry, id: ReadId, en: u64) -> bool {
    en <= reads.get(id).len as u64
}

fn admit(rec: &PafRecord, reads: &mut ReadRegistry, opts: &LoadOptions) -> Admission {
    let query = reads.intern(&rec.q_name, rec.q_len as u32);
    let target = reads.intern(&rec.t_name, rec.t_len as u32);
    if query == target {
        return Admission::SelfHit;
    }
    if rec.nmatch < opts.min_match as u64 {
        return Admission::LowMatch;
    }
    let identity = if rec.aln_len == 0 {
        0.0
    } else {
        rec.nmatch as f64 / rec.aln_len as f64
    };
    if identity < opts.min_identity {
        return Admission::LowIdentity;
    }
    // a read re-registered with another length keeps its first length
    if !fits_read(reads, query, rec.q_en) || !fits_read(reads, target, rec.t_en) {
        log::warn!(
            "Skipping record, coordinates exceed the first recorded read length:\n{}",
            rec
        );
        return Admission::Inconsistent;
    }
    Admission::Hit(OverlapHit {
        query,
        q_st: rec.q_st as u32,
        q_en: rec.q_en as u32,
        target,
        t_st: rec.t_st as u32,
        t_en: rec.t_en as u32,
        strand: rec.strand,
        nmatch: rec.nmatch.min(u32::MAX as u64) as u32,
        aln_len: rec.aln_len.min(u32::MAX as u64) as u32,
    })
}

/// Read overlap records into the hit collection, registering every read on the way.
///
/// Malformed records are skipped with a warning; only a failure of the underlying
/// stream aborts loading. The returned hits are ordered by query handle and query start.
/// # Example
/// ```
/// use rustyovl::{load, paf, registry};
/// let text = "A\t1000\t100\t900\t+\tB\t1000\t50\t850\t700\t800\t60\n\
///             A\t1000\t0\t600\t+\tC\t900\t300\t900\t300\t600\t60\n";
/// let mut reads = registry::ReadRegistry::new();
/// let opts = load::LoadOptions { min_match: 100, min_identity: 0.8 };
/// let records = paf::PafReader::new(text.as_bytes());
/// let (hits, stats) = load::load_hits(records, &mut reads, &opts).unwrap();
/// assert_eq!(hits.len(), 1);
/// assert_eq!(stats.low_identity, 1);
/// assert_eq!(reads.len(), 3);
/// ```
pub fn load_hits<I>(
    records: I,
    reads: &mut ReadRegistry,
    opts: &LoadOptions,
) -> Result<(Vec<OverlapHit>, LoadStats), paf::Error>
where
    I: IntoIterator<Item = Result<PafRecord, paf::Error>>,
{
    let mut hits = Vec::new();
    let mut stats = LoadStats::default();
    for rec in records {
        let rec = match rec {
            Ok(rec) => rec,
            Err(e) if e.is_recoverable() => {
                stats.malformed += 1;
                log::warn!("Unable to parse PAF record, skipping: {}", e);
                continue;
            }
            Err(e) => return Err(e),
        };
        stats.records += 1;
        match admit(&rec, reads, opts) {
            Admission::Hit(hit) => {
                stats.admitted += 1;
                hits.push(hit);
            }
            Admission::SelfHit => stats.self_hits += 1,
            Admission::LowMatch => stats.low_match += 1,
            Admission::LowIdentity => stats.low_identity += 1,
            Admission::Inconsistent => stats.inconsistent += 1,
        }
    }
    stats.records += stats.malformed;
    hits.par_sort_by_key(|hit| hit.query_key());
    stats.log();
    Ok((hits, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paf::PafReader;

    const OPTS: LoadOptions = LoadOptions {
        min_match: 100,
        min_identity: 0.8,
    };

    fn load_bytes(text: &[u8]) -> (Vec<OverlapHit>, LoadStats, ReadRegistry) {
        let mut reads = ReadRegistry::new();
        let (hits, stats) = load_hits(PafReader::new(text), &mut reads, &OPTS).unwrap();
        (hits, stats, reads)
    }

    fn load(text: &str) -> (Vec<OverlapHit>, LoadStats, ReadRegistry) {
        load_bytes(text.as_bytes())
    }

    #[test]
    fn test_low_identity_never_loaded() {
        let (hits, stats, reads) = load("A\t1000\t0\t1000\t+\tB\t1000\t0\t1000\t500\t1000\t60\n");
        assert!(hits.is_empty());
        assert_eq!(stats.low_identity, 1);
        // both reads are still known to the registry
        assert_eq!(reads.len(), 2);
    }

    #[test]
    fn test_self_and_short_hits_rejected() {
        let text = "A\t1000\t0\t1000\t+\tA\t1000\t0\t1000\t1000\t1000\t60\n\
                    A\t1000\t0\t90\t+\tB\t1000\t0\t90\t90\t90\t60\n";
        let (hits, stats, _) = load(text);
        assert!(hits.is_empty());
        assert_eq!(stats.self_hits, 1);
        assert_eq!(stats.low_match, 1);
        assert_eq!(stats.records, 2);
    }

    #[test]
    fn test_sorted_by_query_then_start() {
        let text = "B\t1000\t500\t1000\t+\tA\t1000\t0\t500\t500\t500\t60\n\
                    A\t1000\t400\t1000\t+\tC\t1000\t0\t600\t600\t600\t60\n\
                    B\t1000\t0\t400\t-\tC\t1000\t100\t500\t400\t400\t60\n\
                    A\t1000\t0\t500\t+\tB\t1000\t500\t1000\t500\t500\t60\n";
        let (hits, stats, reads) = load(text);
        assert_eq!(stats.admitted, 4);
        let keys: Vec<(&str, u32)> = hits
            .iter()
            .map(|h| (reads.name(h.query), h.q_st))
            .collect();
        assert_eq!(keys, vec![("B", 0), ("B", 500), ("A", 0), ("A", 400)]);
    }

    #[test]
    fn test_malformed_skipped_and_inconsistent_rejected() {
        let text = "A\t1000\t0\t500\t+\tB\t1000\t0\t500\t500\t500\t60\n\
                    garbage line\n\
                    A\t2000\t0\t1500\t+\tC\t1500\t0\t1500\t1500\t1500\t60\n";
        let (hits, stats, reads) = load(text);
        assert_eq!(hits.len(), 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.inconsistent, 1);
        assert_eq!(stats.records, 3);
        assert_eq!(reads.length_conflicts(), 1);
    }

    #[test]
    fn test_undecodable_line_skipped() {
        let text = b"A\t1000\t0\t500\t+\tB\t1000\t0\t500\t500\t500\t60\n\
                     R\xff\t1000\t0\t500\t+\tB\t1000\t0\t500\t500\t500\t60\n\
                     B\t1000\t500\t1000\t+\tC\t1000\t0\t500\t500\t500\t60\n";
        let (hits, stats, reads) = load_bytes(text);
        assert_eq!(hits.len(), 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.admitted, 2);
        assert_eq!(reads.len(), 3);
    }
}
