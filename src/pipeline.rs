//! Drives the filtering stages in order and owns their configuration.
//!
//! Stages run strictly one after another over a single hit collection:
//! loading, sub-range estimation and clipping, the coverage filter, an optional
//! second and tighter round whose sub-ranges are intersected with the first, and
//! finally containment removal. [`FilterConfig::stage`] stops the run early.
use super::contained;
use super::coverage::{self, CoverageOptions};
use super::hit::{full_sub_ranges, OverlapHit, ReadId, SubRanges};
use super::load::{self, LoadOptions, LoadStats};
use super::overlap::ClassifyOptions;
use super::paf::{self, PafRecord};
use super::registry::ReadRegistry;
use super::subrange::{self, EstimateOptions, Policy};
use super::trim;
use super::utils::fmt_count;
use thiserror::Error;

/// Stage numbers accepted by [`FilterConfig::stage`].
pub const STAGE_LOAD: u32 = 1;
pub const STAGE_TRIM: u32 = 2;
pub const STAGE_COVERAGE: u32 = 3;
pub const STAGE_SECOND_ROUND: u32 = 4;
pub const STAGE_CONTAINMENT: u32 = 5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    Fraction { name: &'static str, value: f64 },
    #[error("stage must be at least 1, got {0}")]
    Stage(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub min_match: u32,
    pub min_identity: f64,
    pub min_span: u32,
    pub min_depth: u32,
    /// Last stage to run, see the `STAGE_*` constants. Larger values run everything.
    pub stage: u32,
    pub second_round: bool,
    pub max_hang: u32,
    pub int_frac: f64,
    pub min_ovlp: u32,
    pub score_tolerance: f64,
    pub contain_tolerance: u32,
    pub policy: Policy,
}

impl Default for FilterConfig {
    fn default() -> FilterConfig {
        FilterConfig {
            min_match: 100,
            min_identity: 0.05,
            min_span: 2000,
            min_depth: 3,
            stage: 100,
            second_round: true,
            max_hang: 1000,
            int_frac: 0.8,
            min_ovlp: 2000,
            score_tolerance: 0.5,
            contain_tolerance: 100,
            policy: Policy::Span,
        }
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Fraction { name, value })
    }
}

impl FilterConfig {
    /// Reject settings that make no sense before any input is read.
    /// # Example
    /// ```
    /// use rustyovl::pipeline::{ConfigError, FilterConfig};
    /// assert!(FilterConfig::default().validate().is_ok());
    /// let cfg = FilterConfig { min_identity: 1.5, ..Default::default() };
    /// assert_eq!(
    ///     cfg.validate(),
    ///     Err(ConfigError::Fraction { name: "min-identity", value: 1.5 })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("min-identity", self.min_identity)?;
        check_fraction("int-frac", self.int_frac)?;
        check_fraction("score-tolerance", self.score_tolerance)?;
        if self.stage < STAGE_LOAD {
            return Err(ConfigError::Stage(self.stage));
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            min_match: self.min_match,
            min_identity: self.min_identity,
        }
    }

    fn first_round_options(&self) -> EstimateOptions {
        EstimateOptions {
            min_depth: self.min_depth,
            end_clip: 0,
            min_span: self.min_span,
            policy: self.policy,
        }
    }

    /// The second round trusts the coverage estimate of the first one.
    fn second_round_options(&self, coverage: f64) -> EstimateOptions {
        EstimateOptions {
            min_depth: second_round_depth(coverage),
            end_clip: self.min_span / 2,
            min_span: self.min_span,
            policy: self.policy,
        }
    }

    fn coverage_options(&self) -> CoverageOptions {
        CoverageOptions {
            min_depth: self.min_depth,
            classify: ClassifyOptions {
                max_hang: self.max_hang,
                int_frac: self.int_frac,
                min_ovlp: self.min_ovlp,
            },
            score_tolerance: self.score_tolerance,
            contain_tolerance: self.contain_tolerance,
        }
    }
}

/// Depth required in the second round: a tenth of the coverage, rounded, minus one.
/// Never below one.
/// # Example
/// ```
/// use rustyovl::pipeline::second_round_depth;
/// assert_eq!(second_round_depth(40.0), 3);
/// assert_eq!(second_round_depth(0.0), 1);
/// ```
pub fn second_round_depth(coverage: f64) -> u32 {
    let depth = (coverage * 0.1 + 0.499) as i64 - 1;
    depth.max(1) as u32
}

/// Everything the renderers need, plus what was learned on the way.
#[derive(Debug)]
pub struct PipelineOutput {
    pub reads: ReadRegistry,
    pub hits: Vec<OverlapHit>,
    pub subs: SubRanges,
    pub load: LoadStats,
    /// Set once the coverage filter has run.
    pub coverage: Option<f64>,
    pub low_support: Vec<ReadId>,
}

/// Run the stages up to `cfg.stage` over a stream of parsed PAF records.
///
/// Only a failure of the input stream is an error; malformed records are skipped
/// while loading. The returned hits never touch a deleted read.
pub fn run<I>(records: I, cfg: &FilterConfig) -> Result<PipelineOutput, paf::Error>
where
    I: IntoIterator<Item = Result<PafRecord, paf::Error>>,
{
    let mut reads = ReadRegistry::new();
    let (mut hits, stats) = load::load_hits(records, &mut reads, &cfg.load_options())?;
    let mut out = PipelineOutput {
        subs: full_sub_ranges(reads.lengths()),
        reads,
        hits: Vec::new(),
        load: stats,
        coverage: None,
        low_support: Vec::new(),
    };

    if cfg.stage >= STAGE_TRIM {
        out.subs = subrange::estimate(&hits, &mut out.reads, &cfg.first_round_options());
        trim::cut(&mut hits, &out.subs, &out.reads, cfg.min_span);
    }

    if cfg.stage >= STAGE_COVERAGE {
        let report = coverage::filter(&mut hits, &out.subs, &out.reads, &cfg.coverage_options());
        out.coverage = Some(report.coverage);
        out.low_support = report.low_support;
    }

    if cfg.stage >= STAGE_SECOND_ROUND && cfg.second_round {
        let opts = cfg.second_round_options(out.coverage.unwrap_or(0.0));
        let second = subrange::estimate(&hits, &mut out.reads, &opts);
        trim::cut(&mut hits, &second, &out.reads, cfg.min_span);
        out.subs = subrange::merge(&out.subs, &second, &mut out.reads);
    }

    if cfg.stage >= STAGE_CONTAINMENT {
        contained::resolve(&mut hits, &out.subs, &mut out.reads, cfg.contain_tolerance);
    }

    // a stage cutoff can leave hits on reads deleted by the last stage that ran
    let reads = &out.reads;
    hits.retain(|hit| !reads.is_deleted(hit.query) && !reads.is_deleted(hit.target));
    log::info!(
        "Finished with {} hits on {} of {} reads.",
        fmt_count(hits.len()),
        fmt_count(out.reads.len() - out.reads.n_deleted()),
        fmt_count(out.reads.len()),
    );
    out.hits = hits;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::SubRange;
    use crate::myio;
    use crate::paf::PafReader;

    fn run_text(text: &str, cfg: &FilterConfig) -> PipelineOutput {
        run(PafReader::new(text.as_bytes()), cfg).unwrap()
    }

    fn run_fixture(cfg: &FilterConfig) -> PipelineOutput {
        let reader = myio::reader(".test/small.paf").unwrap();
        run(PafReader::new(reader), cfg).unwrap()
    }

    fn small_config() -> FilterConfig {
        FilterConfig {
            min_identity: 0.5,
            min_span: 500,
            min_depth: 2,
            max_hang: 100,
            min_ovlp: 500,
            ..Default::default()
        }
    }

    fn assert_consistent(out: &PipelineOutput) {
        for hit in &out.hits {
            assert!(!out.reads.is_deleted(hit.query));
            assert!(!out.reads.is_deleted(hit.target));
            assert!(out.subs[hit.query as usize].contains(hit.q_st, hit.q_en));
            assert!(out.subs[hit.target as usize].contains(hit.t_st, hit.t_en));
        }
        if let Some(cov) = out.coverage {
            assert!(cov.is_finite() && cov >= 0.0);
        }
    }

    #[test]
    fn test_single_overlap_end_to_end() {
        let cfg = FilterConfig {
            min_identity: 0.0,
            min_depth: 1,
            min_span: 100,
            min_ovlp: 100,
            second_round: false,
            ..Default::default()
        };
        let out = run_text("A\t1000\t100\t900\t+\tB\t1000\t50\t850\t800\t800\t60\n", &cfg);
        let a = out.reads.id("A").unwrap();
        let b = out.reads.id("B").unwrap();
        assert_eq!(out.subs[a as usize], SubRange::new(100, 900));
        assert_eq!(out.subs[b as usize], SubRange::new(50, 850));
        assert_eq!(out.reads.n_deleted(), 0);
        assert_eq!(out.hits.len(), 1);
        assert_eq!((out.hits[0].q_st, out.hits[0].q_en), (100, 900));
        assert_eq!((out.hits[0].t_st, out.hits[0].t_en), (50, 850));
        assert_eq!(out.coverage, Some(0.5));
    }

    #[test]
    fn test_low_identity_rejected_before_trimming() {
        let cfg = FilterConfig {
            min_identity: 0.8,
            min_depth: 1,
            min_span: 100,
            ..Default::default()
        };
        let out = run_text("A\t1000\t0\t1000\t+\tB\t1000\t0\t1000\t500\t1000\t60\n", &cfg);
        assert_eq!(out.load.low_identity, 1);
        assert!(out.hits.is_empty());
        // nothing supports either read
        assert_eq!(out.reads.n_deleted(), 2);
        assert_eq!(out.coverage, Some(0.0));
    }

    #[test]
    fn test_stage_cutoff() {
        let text = "A\t1000\t100\t900\t+\tB\t1000\t50\t850\t800\t800\t60\n";
        let mut cfg = FilterConfig {
            min_identity: 0.0,
            min_depth: 1,
            min_span: 100,
            min_ovlp: 100,
            stage: STAGE_LOAD,
            ..Default::default()
        };
        let out = run_text(text, &cfg);
        assert_eq!(out.subs, vec![SubRange::new(0, 1000), SubRange::new(0, 1000)]);
        assert_eq!(out.coverage, None);
        assert_eq!((out.hits[0].q_st, out.hits[0].q_en), (100, 900));

        cfg.stage = STAGE_TRIM;
        let out = run_text(text, &cfg);
        assert_eq!(out.subs, vec![SubRange::new(100, 900), SubRange::new(50, 850)]);
        assert_eq!(out.coverage, None);
    }

    #[test]
    fn test_read_losing_all_hits_keeps_sub_range() {
        let cfg = FilterConfig {
            min_identity: 0.0,
            min_depth: 1,
            min_span: 100,
            max_hang: 100,
            min_ovlp: 100,
            stage: STAGE_COVERAGE,
            ..Default::default()
        };
        // both overlaps of X leave long overhangs on X and its partner: internal matches
        let text = "X\t1000\t0\t400\t+\tY\t1000\t300\t700\t400\t400\t60\n\
                    X\t1000\t600\t1000\t+\tZ\t1000\t300\t700\t400\t400\t60\n\
                    Y\t1000\t0\t1000\t+\tZ\t1000\t0\t1000\t1000\t1000\t60\n";
        let out = run_text(text, &cfg);
        let x = out.reads.id("X").unwrap();
        assert!(!out.reads.is_deleted(x));
        assert_eq!(out.subs[x as usize], SubRange::new(0, 1000));
        assert!(out.hits.iter().all(|hit| hit.query != x && hit.target != x));
        assert!(out.low_support.contains(&x));
        assert_eq!(out.hits.len(), 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(FilterConfig::default().validate().is_ok());
        let cfg = FilterConfig {
            stage: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::Stage(0)));
        let cfg = FilterConfig {
            score_tolerance: -0.1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_second_round_depth() {
        assert_eq!(second_round_depth(25.0), 1);
        assert_eq!(second_round_depth(14.9), 1);
        assert_eq!(second_round_depth(35.0), 2);
        assert_eq!(second_round_depth(45.0), 3);
        assert_eq!(second_round_depth(f64::NAN), 1);
    }

    #[test]
    fn test_fixture_full_run() {
        let out = run_fixture(&small_config());
        assert_eq!(out.load.malformed, 1);
        assert_eq!(out.load.low_identity, 1);
        assert_consistent(&out);
        assert!(out.coverage.unwrap() > 0.0);
        // the short read lies inside its partners and is removed
        let contained = out.reads.id("read_c").unwrap();
        assert!(out.reads.is_deleted(contained));
        assert!(!out.hits.is_empty());
    }

    #[test]
    fn test_fixture_second_round_only_narrows() {
        let one = run_fixture(&FilterConfig {
            second_round: false,
            stage: STAGE_SECOND_ROUND,
            ..small_config()
        });
        let two = run_fixture(&FilterConfig {
            stage: STAGE_SECOND_ROUND,
            ..small_config()
        });
        assert_consistent(&one);
        assert_consistent(&two);
        for (id, _, read) in two.reads.iter() {
            if read.deleted {
                continue;
            }
            assert!(!one.reads.is_deleted(id));
            let narrow = two.subs[id as usize];
            assert!(one.subs[id as usize].contains(narrow.st, narrow.en));
        }
        // containment removal has not run yet
        assert!(!two.reads.is_deleted(two.reads.id("read_c").unwrap()));
    }
}
