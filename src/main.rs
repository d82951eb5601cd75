//! quad-pipeline CLI: solve coefficient triples given on the command line.

use anyhow::{Context, Result};
use clap::Parser;
use quad_pipeline::cli::Cli;
use quad_pipeline::logger::setup_logging;
use quad_pipeline::{build_quad_pipeline, QuadPipeline};
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let QuadPipeline { mut pipeline, .. } =
        build_quad_pipeline(cli.coeffs, cli.capacity, std::io::stdout())
            .context("build pipeline")?;

    let stop_handles = pipeline.stop_handles();
    ctrlc::set_handler(move || {
        for handle in &stop_handles {
            handle.request_stop();
        }
    })
    .context("set Ctrl+C handler")?;

    pipeline.start().context("start pipeline")?;
    pipeline.wait().context("run pipeline")?;

    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
