pub mod name;
pub mod topology;

use nix::errno::Errno;
use nix::sys::mman::{mlockall, MlockAllFlags};
use thiserror::Error;

use crate::memory::MemoryError;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("prctl() failed with {} ({})", *.0 as i32, .0.desc())]
    Prctl(Errno),
    #[error("process label {0:?} contains a NUL byte")]
    InvalidLabel(String),
    #[error("process labels are not supported on this platform")]
    Unsupported,
}

/// Locks all current and future memory pages into physical RAM.
///
/// # Logic
/// Calls `mlockall(MCL_CURRENT | MCL_FUTURE)` so that every page the worker
/// faults in afterwards is pinned as well. Unlike a database that must avoid
/// swap, a memory eater wants exactly this: locked pages cannot be pushed out,
/// so the pressure lands on everything else.
///
/// # Errors
/// Returns `MemoryError::LockFailed` if the OS refuses the lock (usually
/// `ulimit -l` or a missing `CAP_IPC_LOCK`). Reporting the failure is left to
/// the caller, which treats it as non-fatal.
pub fn lock_memory_pages() -> Result<(), MemoryError> {
    let flags = MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE;

    if let Err(errno) = mlockall(flags) {
        log::warn!("Fix: Run 'ulimit -l unlimited' or run with capability CAP_IPC_LOCK.");
        return Err(MemoryError::LockFailed(errno));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_failure_carries_errno_for_the_caller() {
        let err = MemoryError::LockFailed(Errno::EPERM);
        assert_eq!(err.to_string(), format!("{} ({})", libc::EPERM, Errno::EPERM.desc()));
    }
}
