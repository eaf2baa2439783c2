//! # Command line interface for rustyovl
//! [rustyovl command line interface and options.](cli::Cli)
//! # README for rustyovl
#![doc = include_str!("../README.md")]
/// Command line interface for rustyovl.
pub mod cli;
/// Removal of reads contained in another read.
pub mod contained;
/// Coverage estimate and pruning of dominated overlaps.
pub mod coverage;
/// Overlap hits, read handles and trusted sub-ranges.
pub mod hit;
/// Turning PAF records into the sorted hit collection.
pub mod load;
/// Module for automatically reading a writing compressed or uncompressed files.
pub mod myio;
/// Overlap geometry relative to trusted sub-ranges.
pub mod overlap;
/// PAF file utilities.
pub mod paf;
/// Stage driver and its configuration.
pub mod pipeline;
/// Read names, lengths and deletion flags.
pub mod registry;
/// Output of the final overlaps or sub-ranges.
pub mod render;
/// Trusted sub-ranges from overlap depth.
pub mod subrange;
/// Clipping overlaps to sub-ranges.
pub mod trim;
/// Formatting and timing helpers.
pub mod utils;
