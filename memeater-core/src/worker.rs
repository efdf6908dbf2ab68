use std::thread;
use std::time::Duration;
use memeater_io::BlockSource;
use log::{info, warn};

use crate::fill::FillPattern;
use crate::format::readable_size;
use crate::params::Params;

/// Blocking pause between allocations and after the run.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Tally of one worker's run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub attempts: u64,
    pub failures: u64,
    pub bytes: u64,
}

/// The allocation worker: allocate, fill, sleep, repeat.
///
/// # Logic
/// Each iteration requests exactly `block_size` bytes. Unless `no_fill` is set
/// the block is overwritten with the next byte of the worker's fill pattern so
/// the pages become resident instead of merely reserved. Blocks are never freed.
///
/// Nothing here is fatal. A failed allocation or a refused page lock is
/// narrated and the loop moves on; running out of memory is the expected end.
pub struct Worker<'a, B, S> {
    identity: &'a str,
    params: &'a Params,
    source: B,
    sleeper: S,
    pattern: FillPattern,
}

impl<'a, B: BlockSource, S: Sleeper> Worker<'a, B, S> {
    pub fn new(identity: &'a str, params: &'a Params, source: B, sleeper: S) -> Self {
        Self {
            identity,
            params,
            source,
            sleeper,
            pattern: FillPattern::new(params.iterations()),
        }
    }

    /// Runs the loop to completion. With an unbounded count this never returns.
    pub fn run(&mut self) -> WorkerStats {
        let who = self.identity;
        if self.params.lock_memory() {
            match self.source.pin_pages() {
                Ok(()) => info!("{}: mlockall() pinned current and future pages", who),
                Err(e) => warn!("{}: mlockall() failed with {}", who, e),
            }
        }

        let mut stats = WorkerStats::default();
        let iterations = u64::from(self.params.iterations());
        let mut i: u64 = 0;
        while self.params.is_unbounded() || i < iterations {
            self.eat(i, &mut stats);
            if !self.params.is_single_shot() && !self.params.interval().is_zero() {
                self.sleeper.sleep(self.params.interval());
            }
            i += 1;
        }

        info!("{}: ate {} in {} blocks ({} failed)",
            who,
            readable_size(stats.bytes),
            stats.attempts - stats.failures,
            stats.failures
        );

        let chill = self.params.chill();
        if !chill.is_zero() {
            info!("{}: chilling for {} seconds", who, chill.as_secs());
            self.sleeper.sleep(chill);
        }
        stats
    }

    fn eat(&mut self, i: u64, stats: &mut WorkerStats) {
        let who = self.identity;
        if self.params.is_single_shot() {
            info!("{}: malloc()", who);
        } else {
            info!("{}: malloc() iteration {}", who, i);
        }

        stats.attempts += 1;
        match self.source.allocate(self.params.block_size()) {
            Ok(mut block) => {
                if !self.params.no_fill() {
                    block.fill(self.pattern.next_byte());
                }
                stats.bytes += block.len() as u64;
            }
            Err(e) => {
                stats.failures += 1;
                warn!("{}: malloc() failed with {}", who, e);
            }
        }
    }
}
