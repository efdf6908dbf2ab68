//! memeater core: the allocation loop and the fan-out supervisor.

pub mod params;
pub mod fill;
pub mod format;
pub mod identity;
pub mod worker;
pub mod supervisor;

pub use params::{ParamError, Params, RawParams};
pub use fill::FillPattern;
pub use format::readable_size;
pub use worker::{Sleeper, ThreadSleeper, Worker, WorkerStats};
pub use supervisor::{FanOutReport, Phase, Supervisor};
