use std::fmt::Display;
use clap::{value_parser, CommandFactory, Parser};
use memeater_core::params::*;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Eats memory on purpose and watches what the host does about it"
)]
pub struct Args {
    /// Interval sleep between allocations, in seconds
    #[arg(short, long, value_name = "SECS", default_value_t = INTERVAL_DEFAULT,
        value_parser = value_parser!(u64).range(INTERVAL_MIN..=INTERVAL_MAX))]
    pub interval: u64,

    /// Number of worker processes to fork, 0 to eat inline
    #[arg(short, long, value_name = "FORKS", default_value_t = FORKS_DEFAULT,
        value_parser = value_parser!(u64).range(FORKS_MIN..=FORKS_MAX))]
    pub forks: u64,

    /// Bytes per allocation
    #[arg(short, long, value_name = "BYTES", default_value_t = BLOCK_SIZE_DEFAULT,
        value_parser = value_parser!(u64).range(BLOCK_SIZE_MIN..=BLOCK_SIZE_MAX))]
    pub block_size: u64,

    /// Number of allocations, 0 for infinity
    #[arg(short, long, value_name = "COUNT", default_value_t = ITERATIONS_DEFAULT,
        value_parser = value_parser!(u64).range(ITERATIONS_MIN..=ITERATIONS_MAX))]
    pub count: u64,

    /// Seconds to sleep once all allocations are done
    #[arg(short = 'w', long, value_name = "SECS", default_value_t = CHILL_DEFAULT,
        value_parser = value_parser!(u64).range(CHILL_MIN..=CHILL_MAX))]
    pub chill: u64,

    /// Lock current and future pages into RAM
    #[arg(short, long)]
    pub lock: bool,

    /// Allocate without writing into the memory
    #[arg(short, long)]
    pub no_fill: bool,
}

impl Args {
    pub fn to_raw(&self) -> RawParams {
        RawParams {
            block_size: self.block_size,
            fork_count: self.forks,
            interval: self.interval,
            iterations: self.count,
            chill: self.chill,
            lock_memory: self.lock,
            no_fill: self.no_fill,
        }
    }
}

/// The error followed by the usage line, for anything the user typed wrong.
pub fn usage_failure(err: &dyn Display) -> String {
    let message = err.to_string();
    let message = message.trim_end();
    if message.contains("Usage:") {
        return message.to_string();
    }
    format!("{}\n{}", message, Args::command().render_usage())
}
