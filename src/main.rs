use anyhow::{Context, Result};
use colored::Colorize;
use env_logger::{Builder, Target};
use log::LevelFilter;
use rustyovl::paf::PafReader;
use rustyovl::pipeline::{self, FilterConfig};
use rustyovl::*;
use std::io::Write;
use std::time::Instant;

fn main() -> Result<()> {
    let pg_start = Instant::now();
    let real_start = utils::realtime();
    let args = cli::make_cli_parse();

    // set the logging level
    let min_log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .target(Target::Stderr)
        .filter(None, min_log_level)
        .init();

    log::debug!("DEBUG logging enabled");
    log::trace!("TRACE logging enabled");

    let cfg = FilterConfig::from(&args);
    cfg.validate().context("invalid filtering options")?;
    log::debug!("{:?}", cfg);

    // set up number of threads to use globally
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .context("couldn't start the thread pool")?;

    let reader = myio::reader(&args.paf)?;
    let out = pipeline::run(PafReader::new(reader), &cfg)
        .with_context(|| format!("failed reading overlaps from {}", args.paf))?;

    let mut writer = myio::writer(&args.output)?;
    render::write(
        &mut writer,
        args.output_mode(),
        &out.hits,
        &out.reads,
        &out.subs,
    )
    .and_then(|_| writer.flush())
    .with_context(|| format!("failed writing to {}", args.output))?;
    drop(writer);

    log::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "CMD: {}",
        std::env::args().collect::<Vec<String>>().join(" ")
    );
    log::info!(
        "Real time: {:.3} sec; CPU: {:.3} sec",
        utils::realtime() - real_start,
        utils::cputime()
    );
    let duration = pg_start.elapsed();
    log::info!(
        "{} done! Time elapsed: {}",
        "rustyovl".bright_green().bold(),
        format!("{:.2?}", duration).bright_yellow().bold()
    );
    Ok(())
}
