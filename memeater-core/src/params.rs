use std::time::Duration;
use thiserror::Error;

pub const BLOCK_SIZE_MIN: u64 = 1 << 12; // 4KiB
pub const BLOCK_SIZE_MAX: u64 = 1 << 30; // 1GiB
pub const BLOCK_SIZE_DEFAULT: u64 = 1 << 25; // 32MiB
pub const FORKS_MIN: u64 = 0;
pub const FORKS_MAX: u64 = 3600;
pub const FORKS_DEFAULT: u64 = 0;
pub const INTERVAL_MIN: u64 = 0;
pub const INTERVAL_MAX: u64 = 3600;
pub const INTERVAL_DEFAULT: u64 = 5;
pub const ITERATIONS_MIN: u64 = 0;
pub const ITERATIONS_MAX: u64 = 2600;
pub const ITERATIONS_DEFAULT: u64 = 1;
pub const CHILL_MIN: u64 = 0;
pub const CHILL_MAX: u64 = 86_400;
pub const CHILL_DEFAULT: u64 = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Unchecked parameters, as they come off the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParams {
    pub block_size: u64,
    pub fork_count: u64,
    pub interval: u64,
    pub iterations: u64,
    pub chill: u64,
    pub lock_memory: bool,
    pub no_fill: bool,
}

impl Default for RawParams {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE_DEFAULT,
            fork_count: FORKS_DEFAULT,
            interval: INTERVAL_DEFAULT,
            iterations: ITERATIONS_DEFAULT,
            chill: CHILL_DEFAULT,
            lock_memory: false,
            no_fill: false,
        }
    }
}

/// The validated parameter set. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    block_size: usize,
    fork_count: u32,
    interval: u64,
    iterations: u32,
    chill: u64,
    lock_memory: bool,
    no_fill: bool,
}

fn bounded(field: &'static str, value: u64, min: u64, max: u64) -> Result<u64, ParamError> {
    if value < min || value > max {
        return Err(ParamError::OutOfRange { field, value, min, max });
    }
    Ok(value)
}

impl TryFrom<RawParams> for Params {
    type Error = ParamError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        let block_size = bounded("block size", raw.block_size, BLOCK_SIZE_MIN, BLOCK_SIZE_MAX)?;
        let fork_count = bounded("forks", raw.fork_count, FORKS_MIN, FORKS_MAX)?;
        let interval = bounded("interval", raw.interval, INTERVAL_MIN, INTERVAL_MAX)?;
        let iterations = bounded("count", raw.iterations, ITERATIONS_MIN, ITERATIONS_MAX)?;
        let chill = bounded("chill", raw.chill, CHILL_MIN, CHILL_MAX)?;

        // The bounds above keep every narrowing cast lossless.
        Ok(Self {
            block_size: block_size as usize,
            fork_count: fork_count as u32,
            interval,
            iterations: iterations as u32,
            chill,
            lock_memory: raw.lock_memory,
            no_fill: raw.no_fill,
        })
    }
}

impl Params {
    /// Bytes requested per allocation.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Worker processes to fork; 0 runs the worker inline.
    pub fn fork_count(&self) -> u32 {
        self.fork_count
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Allocations per worker; 0 means forever.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn chill(&self) -> Duration {
        Duration::from_secs(self.chill)
    }

    pub fn lock_memory(&self) -> bool {
        self.lock_memory
    }

    pub fn no_fill(&self) -> bool {
        self.no_fill
    }

    pub fn is_unbounded(&self) -> bool {
        self.iterations == 0
    }

    /// A single allocation has nothing to wait between.
    pub fn is_single_shot(&self) -> bool {
        self.iterations == 1
    }

    /// Total bytes the whole run asks for, `None` when it never stops asking.
    pub fn projected_demand(&self) -> Option<u64> {
        if self.is_unbounded() {
            return None;
        }
        let workers = u64::from(self.fork_count.max(1));
        Some(self.block_size as u64 * u64::from(self.iterations) * workers)
    }
}
