use anyhow::{Context as _, Result};
use clap::Parser;
use env_logger::Env;
use manet::{Experiment, config::DEFAULT_NODES};
use std::{fs::File, io::BufWriter, path::Path};

/// Where the animation trace is written.
const ANIMATION_TRACE: &str = "animation.xml";

/// Throughput of a mobile ad-hoc network
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// number of nodes, at least twice the number of sinks
    #[arg(long = "nNodes", default_value_t = DEFAULT_NODES)]
    n_nodes: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut experiment = Experiment::new(args.n_nodes)?;

    let path = Path::new(ANIMATION_TRACE);
    let trace = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    experiment.write_animation_trace(BufWriter::new(trace))?;
    log::info!("animation trace written to {}", path.display());

    let report = experiment.run()?;
    log::info!(
        "{packets} packets ({bytes} bytes) received by the sinks",
        packets = report.total_packets,
        bytes = report.total_bytes
    );

    Ok(())
}
