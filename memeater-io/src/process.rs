use std::io::{self, Write};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{wait, WaitStatus};
use nix::unistd::{fork, getpid, ForkResult, Pid};
use thiserror::Error;
use log::debug;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{} ({})", *.0 as i32, .0.desc())]
    Fork(Errno),
    #[error("no children left to wait for")]
    NoChildren,
    #[error("{} ({})", *.0 as i32, .0.desc())]
    Wait(Errno),
}

/// What `wait()` told us about one terminated child.
///
/// Exit and signal are kept as independent facts; a status may carry
/// either, or neither for a plain state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub exit_code: Option<i32>,
    pub signal: Option<Signal>,
}

impl Reaped {
    pub fn exited(pid: Pid, code: i32) -> Self {
        Self { pid, exit_code: Some(code), signal: None }
    }

    pub fn signaled(pid: Pid, signal: Signal) -> Self {
        Self { pid, exit_code: None, signal: Some(signal) }
    }

    /// Classifies a wait status. `None` for `StillAlive`, which carries no pid.
    pub fn from_status(status: WaitStatus) -> Option<Self> {
        let pid = status.pid()?;
        let reaped = match status {
            WaitStatus::Exited(_, code) => Self::exited(pid, code),
            WaitStatus::Signaled(_, signal, _) => Self::signaled(pid, signal),
            _ => Self { pid, exit_code: None, signal: None },
        };
        Some(reaped)
    }
}

/// Spawning and reaping of worker processes.
pub trait ProcessControl {
    /// Starts a child that runs `child` with its own pid and then exits.
    /// Returns the child's pid in the parent.
    fn spawn(&mut self, child: &mut dyn FnMut(Pid)) -> Result<Pid, ProcessError>;

    /// Blocks until any child changes state.
    ///
    /// # Errors
    /// `ProcessError::NoChildren` once every child has been reaped.
    fn wait_any(&mut self) -> Result<Reaped, ProcessError>;
}

/// `fork(2)` / `wait(2)` process control.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForkControl;

impl ProcessControl for ForkControl {
    fn spawn(&mut self, child: &mut dyn FnMut(Pid)) -> Result<Pid, ProcessError> {
        // Anything still buffered would be written twice, once by each process.
        let _ = io::stdout().flush();

        // SAFETY: the caller is single-threaded. The child never returns into the
        // caller's stack: it runs the job and leaves through process::exit.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child: pid }) => Ok(pid),
            Ok(ForkResult::Child) => {
                child(getpid());
                std::process::exit(0);
            }
            Err(errno) => Err(ProcessError::Fork(errno)),
        }
    }

    fn wait_any(&mut self) -> Result<Reaped, ProcessError> {
        loop {
            match wait() {
                Ok(status) => match Reaped::from_status(status) {
                    Some(reaped) => return Ok(reaped),
                    None => debug!("wait() returned {:?}, waiting again", status),
                },
                Err(Errno::ECHILD) => return Err(ProcessError::NoChildren),
                Err(errno) => return Err(ProcessError::Wait(errno)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_classification() {
        let pid = Pid::from_raw(4242);
        let reaped = Reaped::from_status(WaitStatus::Exited(pid, 3)).unwrap();
        assert_eq!(reaped, Reaped::exited(pid, 3));
        assert_eq!(reaped.signal, None);
    }

    #[test]
    fn test_signal_status_classification() {
        let pid = Pid::from_raw(4243);
        let status = WaitStatus::Signaled(pid, Signal::SIGKILL, false);
        let reaped = Reaped::from_status(status).unwrap();
        assert_eq!(reaped.exit_code, None);
        assert_eq!(reaped.signal, Some(Signal::SIGKILL));
    }

    #[test]
    fn test_still_alive_has_no_child() {
        assert_eq!(Reaped::from_status(WaitStatus::StillAlive), None);
    }

    #[test]
    fn test_stopped_child_is_neither_exited_nor_signaled() {
        let pid = Pid::from_raw(4244);
        let reaped = Reaped::from_status(WaitStatus::Stopped(pid, Signal::SIGSTOP)).unwrap();
        assert_eq!(reaped.exit_code, None);
        assert_eq!(reaped.signal, None);
    }

    #[test]
    fn test_wait_without_children() {
        // The test harness never forks, so this thread's process has no children.
        assert!(matches!(ForkControl.wait_any(), Err(ProcessError::NoChildren)));
    }
}
