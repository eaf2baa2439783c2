use super::pipeline::FilterConfig;
use super::render::OutputMode;
use super::subrange::Policy;
use clap::IntoApp;
use clap::{AppSettings, Parser};

///
/// Filter, trim and prune all-vs-all long-read overlaps before graph construction.
///
/// Reads PAF from a file or stdin (plain or gzipped) and writes either the surviving
/// overlaps in sub-range coordinates or the trusted interval of every surviving read.
///
#[derive(Parser, Debug)]
#[clap(author, version, about, help_expected = true)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
pub struct Cli {
    /// PAF file of all-vs-all read overlaps.
    #[clap(default_value = "-")]
    pub paf: String,

    /// Drop overlaps with fewer matching bases.
    #[clap(short = 'm', long, default_value_t = 100, help_heading = "LOADING")]
    pub min_match: u32,
    /// Drop overlaps whose matching bases per aligned base are lower.
    #[clap(short = 'i', long, default_value_t = 0.05, help_heading = "LOADING")]
    pub min_identity: f64,

    /// Minimum span of a trusted read interval and of a clipped overlap.
    #[clap(short = 's', long, default_value_t = 2000, help_heading = "TRIMMING")]
    pub min_span: u32,
    /// Overlap depth a position needs in the first round to be trusted.
    #[clap(short = 'd', long, default_value_t = 3, help_heading = "TRIMMING")]
    pub min_depth: u32,
    /// Keep the longest well supported stretch of each read instead of the outermost span.
    #[clap(long, help_heading = "TRIMMING")]
    pub longest_run: bool,
    /// Skip the second round of trimming driven by the coverage estimate.
    #[clap(short = '2', long, help_heading = "TRIMMING")]
    pub no_second_round: bool,

    /// Longest overhang allowed before an overlap counts as an internal match.
    #[clap(long, default_value_t = 1000, help_heading = "OVERLAPS")]
    pub max_hang: u32,
    /// Minimum aligned fraction of the overlap before it counts as an internal match.
    #[clap(long, default_value_t = 0.8, help_heading = "OVERLAPS")]
    pub int_frac: f64,
    /// Drop dovetail overlaps shorter than this.
    #[clap(long, default_value_t = 2000, help_heading = "OVERLAPS")]
    pub min_ovlp: u32,
    /// Keep overlaps scoring within this fraction of the best one on the same read end.
    #[clap(long, default_value_t = 0.5, help_heading = "OVERLAPS")]
    pub score_tolerance: f64,
    /// Unaligned bases tolerated at each end of a read considered contained.
    #[clap(long, default_value_t = 100, help_heading = "OVERLAPS")]
    pub contain_hang: u32,

    /// Last stage to run [1: load, 2: trim, 3: coverage filter, 4: second round, 5: containment].
    #[clap(short = 'S', long, default_value_t = 100)]
    pub stage: u32,
    /// Write the trusted interval of every read instead of the overlaps.
    #[clap(short = 'B', long)]
    pub bed: bool,
    /// Output file, a `.gz` extension compresses it.
    #[clap(short, long, default_value = "-")]
    pub output: String,

    /// Threads for sorting.
    #[clap(short, long, default_value_t = 8)]
    pub threads: usize,
    /// Logging level [-v: Debug, -vv: Trace].
    #[clap(short, long, parse(from_occurrences), help_heading = "DEBUG")]
    pub verbose: usize,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.bed {
            OutputMode::SubRanges
        } else {
            OutputMode::Overlaps
        }
    }
}

impl From<&Cli> for FilterConfig {
    fn from(cli: &Cli) -> FilterConfig {
        FilterConfig {
            min_match: cli.min_match,
            min_identity: cli.min_identity,
            min_span: cli.min_span,
            min_depth: cli.min_depth,
            stage: cli.stage,
            second_round: !cli.no_second_round,
            max_hang: cli.max_hang,
            int_frac: cli.int_frac,
            min_ovlp: cli.min_ovlp,
            score_tolerance: cli.score_tolerance,
            contain_tolerance: cli.contain_hang,
            policy: if cli.longest_run {
                Policy::LongestRun
            } else {
                Policy::Span
            },
        }
    }
}

pub fn make_cli_parse() -> Cli {
    Cli::parse()
}

pub fn make_cli_app() -> clap::Command<'static> {
    Cli::command()
}
