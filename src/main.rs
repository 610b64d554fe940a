use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use std::path::PathBuf;

use lockstep_detector::{
    data, storage, ClusterDriver, Config, RunStatus, Seed, SubspaceStrategy,
};

#[derive(Parser, Debug)]
#[clap(
    name = "lockstep-detector",
    about = "Find groups of users acting on the same pages in the same time window"
)]
struct Cli {
    /// Number of users expected in the ring
    n: usize,

    /// Number of pages attributed to the ring
    m: usize,

    /// Width of the time window in which the ring acts
    dt: f64,

    /// Minimum fraction of the m pages a suspected user must match
    phi: f64,

    /// Interaction log (.txt/.csv rows, .bin cache, or .parquet events)
    #[clap(long)]
    input: PathBuf,

    /// Binary cache written after parsing a text log and reused afterwards
    #[clap(long)]
    cache: Option<PathBuf>,

    /// Output directory for results
    #[clap(long, default_value = "lockstep_results")]
    output_dir: String,

    /// How winning pages enter the subspace
    #[clap(long, value_enum, default_value = "replace")]
    strategy: SubspaceStrategy,

    /// Seed for a random initial subspace (default: every page)
    #[clap(long)]
    seed: Option<u64>,

    /// Iteration bound before giving up on convergence
    #[clap(long, default_value = "100")]
    max_iterations: usize,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = Config::new(args.n, args.m, args.dt, args.phi)
        .with_strategy(args.strategy)
        .with_max_iterations(args.max_iterations);
    config.validate()?;

    log::info!(
        "Initiated lockstep search with n={}, m={}, dt={} and phi={}",
        config.n,
        config.m,
        config.dt,
        config.phi
    );

    // 1. Load data
    let labeled = data::load_interaction_log(&args.input, args.cache.as_deref())?;
    log::info!(
        "Loaded log with {} users, {} pages and {} interactions",
        labeled.log.user_count(),
        labeled.log.page_count(),
        labeled.log.interaction_count()
    );

    // 2. Seed the hypothesis
    let seed = match args.seed {
        Some(seed) => Seed::Random { seed },
        None => Seed::FullSubspace,
    };
    let initial = seed.initial_state(&labeled.log, &config)?;

    // 3. Search
    let driver = ClusterDriver::new(&labeled.log, &config)?;
    let report = driver.run(initial)?;

    if report.status == RunStatus::NonConverged {
        println!("\nExiting due to non-convergence\n");
    }

    let state = &report.state;
    println!("c:");
    println!("[{}]", state.center.iter().join(", "));
    println!("\nP_:");
    println!(
        "{{{}}}",
        state.subspace.iter().map(|&p| &labeled.page_ids[p]).join(", ")
    );
    println!("\nU_:");
    println!(
        "{{{}}}",
        state.suspected_users.iter().map(|&u| &labeled.user_ids[u]).join(", ")
    );

    // 4. Save results
    storage::save_results(&report, &labeled, &config, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
