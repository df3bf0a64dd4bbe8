//! `pedigree` - timed pedigree retrievals against a simulated slow API.

mod runs;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use pedigree_core::{GraphStore, PedigreeConfig, PedigreeGenerator, PedigreeTraverser};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::runs::{Part, Run};

/// Retrieves generated family pedigrees depth-first or breadth-first and
/// reports how well the calls were overlapped.
#[derive(Parser, Debug)]
#[command(name = "pedigree")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file (defaults to ./pedigree.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Runs file with one `part,generations` per line
    #[arg(short, long, conflicts_with_all = ["part", "generations"])]
    runs: Option<PathBuf>,

    /// 1 = depth-first, 2 = breadth-first, 3 = limited breadth-first
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    part: u8,

    /// Generations of the generated pedigree
    #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..))]
    generations: u32,

    /// Per-call latency of the simulated API, overrides the config
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Generator seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PedigreeConfig::load_from(path)?,
        None => PedigreeConfig::load()?,
    };
    if let Some(latency_ms) = args.latency_ms {
        config.source.latency_ms = latency_ms;
    }
    if let Some(seed) = args.seed {
        config.source.seed = seed;
    }

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .init();

    let runs = match &args.runs {
        Some(path) => runs::load_runs(path)?,
        None => {
            // value_parser restricts --part to 1..=3
            let part = Part::from_number(args.part).unwrap_or(Part::DepthFirst);
            vec![Run {
                part,
                generations: args.generations,
            }]
        }
    };
    if runs.is_empty() {
        anyhow::bail!("no valid runs to perform");
    }

    for run in runs {
        run_part(&config, run);
    }
    Ok(())
}

/// Generates a pedigree, retrieves it and logs the comparison with the source.
fn run_part(config: &PedigreeConfig, run: Run) {
    let pedigree = PedigreeGenerator::from_settings(&config.source)
        .generations(run.generations)
        .generate();
    let source = pedigree.to_source(config.source.latency());
    let store = GraphStore::new();
    let strategy = run.part.strategy(&config.traversal);

    info!(
        part = %run.part,
        generations = run.generations,
        start = %pedigree.start,
        "run started"
    );
    let report = PedigreeTraverser::new(&source).run(Some(pedigree.start), &store, strategy);
    let server = source.stats();

    let total_time = format!("{:.5}", report.elapsed.as_secs_f64());
    let records_per_second = format!("{:.5}", report.records_per_second());
    info!(
        total_time = %total_time,
        generations = run.generations,
        records_per_second = %records_per_second,
        "{} finished",
        run.part
    );
    info!(
        retrieved = report.persons,
        source = server.persons,
        "people"
    );
    info!(
        retrieved = report.families,
        source = server.families,
        "families"
    );
    info!(
        api_calls = server.api_calls,
        max_concurrent_calls = server.peak_concurrency,
        store_hits = report.fetch.store_hits,
        failures = report.fetch.failures,
        "source statistics"
    );
}
