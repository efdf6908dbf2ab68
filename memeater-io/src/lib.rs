//! memeater I/O: the platform layer.
//!
//! Everything that talks to the kernel lives here: the heap block source,
//! page pinning, process-table naming, host memory topology and the
//! fork/wait process control used by the fan-out supervisor.

pub mod platform;
pub mod memory;
pub mod process;

// Re-exports for easier access by memeater-core
pub use memory::{Block, BlockSource, HeapSource, MemoryError};
pub use process::{ForkControl, ProcessControl, ProcessError, Reaped};
pub use platform::name::{ProcessLabel, ProcessTable, LABEL_MAX};
pub use platform::topology::MemoryTopology;
pub use platform::PlatformError;

pub use nix::errno::Errno;
pub use nix::sys::signal::Signal;
pub use nix::unistd::Pid;
