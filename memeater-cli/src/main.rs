use std::fmt::Display;
use std::process;
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use memeater_core::identity::base_identity;
use memeater_core::{readable_size, Params, Supervisor, ThreadSleeper, Worker};
use memeater_io::{ForkControl, HeapSource, MemoryTopology, ProcessTable};
use log::{info, warn};

mod config;

use config::Args;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .try_init()
        .context("Failed to install logger")?;

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => fail_with_usage(&e),
    };
    let params = match Params::try_from(args.to_raw()) {
        Ok(params) => params,
        Err(e) => fail_with_usage(&e),
    };

    let whoami = base_identity(&ProcessTable);
    println!(
        "{}[{}]: forks: {}; block size: {}; count: {}; sleep: {}; chill: {}; lock: {}; no fill: {}",
        whoami,
        process::id(),
        params.fork_count(),
        readable_size(params.block_size() as u64),
        params.iterations(),
        params.interval().as_secs(),
        params.chill().as_secs(),
        params.lock_memory(),
        params.no_fill()
    );

    let topology = MemoryTopology::detect();
    topology.print_summary();
    match params.projected_demand() {
        Some(demand) if topology.exceeds_available(demand) => warn!(
            "Projected demand of {} exceeds the {} available. Expect swap or the OOM killer.",
            readable_size(demand),
            readable_size(topology.available_ram())
        ),
        Some(demand) => info!("Projected demand: {}", readable_size(demand)),
        None => info!("Unbounded count: eating until stopped."),
    }

    let eat = |who: &str| {
        Worker::new(who, &params, HeapSource::new(), ThreadSleeper).run();
    };

    if params.fork_count() == 0 {
        eat(whoami.as_str());
    } else {
        Supervisor::new(&whoami, params.fork_count(), ForkControl, ProcessTable).run(eat);
    }

    Ok(())
}

fn fail_with_usage(err: &dyn Display) -> ! {
    eprintln!("{}", config::usage_failure(err));
    process::exit(1);
}
