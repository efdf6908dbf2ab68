use memeater_io::{Pid, ProcessControl, ProcessError, ProcessLabel, Reaped};
use log::{debug, info, log, warn, Level};

use crate::identity::child_identity;

/// Where the supervisor is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Spawning,
    Reaping,
    Done,
}

/// What a fan-out run produced.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub spawned: Vec<Pid>,
    pub spawn_failures: usize,
    pub reaped: Vec<Reaped>,
}

/// Fans a job out into `fork_count` child processes and reaps every one of them.
///
/// # Logic
/// Spawning is sequential. Each child derives its identity from the base name
/// and its own pid, tries to publish it in the process table and runs the job.
/// A failed spawn is reported and the remaining spawns still happen.
///
/// Reaping waits for any child until the OS says none are left. Children finish
/// in whatever order they like; an unexpected wait error is reported and the
/// loop keeps going.
pub struct Supervisor<'a, P, L> {
    base: &'a str,
    fork_count: u32,
    procs: P,
    labels: L,
    phase: Phase,
}

impl<'a, P: ProcessControl, L: ProcessLabel> Supervisor<'a, P, L> {
    pub fn new(base: &'a str, fork_count: u32, procs: P, labels: L) -> Self {
        Self {
            base,
            fork_count,
            procs,
            labels,
            phase: Phase::Spawning,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Spawns every child, then blocks until all of them are reaped.
    pub fn run<F: FnMut(&str)>(&mut self, mut job: F) -> FanOutReport {
        let mut report = FanOutReport::default();

        self.spawn_all(&mut job, &mut report);
        self.enter(Phase::Reaping);
        self.reap_all(&mut report);
        self.enter(Phase::Done);

        info!("{}: fan-out done: {} spawned, {} spawn failures, {} reaped",
            self.base,
            report.spawned.len(),
            report.spawn_failures,
            report.reaped.len()
        );
        report
    }

    fn enter(&mut self, next: Phase) {
        debug!("{}: supervisor {:?} -> {:?}", self.base, self.phase, next);
        self.phase = next;
    }

    fn spawn_all<F: FnMut(&str)>(&mut self, job: &mut F, report: &mut FanOutReport) {
        let base = self.base;
        let labels = &self.labels;

        for i in 1..=self.fork_count {
            let mut child = |pid: Pid| {
                let identity = child_identity(base, pid);
                if let Err(e) = labels.set_label(&identity) {
                    warn!(
                        "Unable to change fork name for child {} to \"{}\": {}",
                        pid, identity, e
                    );
                }
                job(&identity);
            };

            match self.procs.spawn(&mut child) {
                Ok(pid) => {
                    info!("{}: forked {} ...", base, pid);
                    report.spawned.push(pid);
                }
                Err(e) => {
                    // Spawn failures go to stderr, not the narration stream.
                    eprintln!("{}: fork() for iteration {} failed with {}", base, i, e);
                    report.spawn_failures += 1;
                }
            }
        }
    }

    fn reap_all(&mut self, report: &mut FanOutReport) {
        let base = self.base;
        loop {
            match self.procs.wait_any() {
                Ok(reaped) => {
                    Self::narrate(base, &reaped);
                    report.reaped.push(reaped);
                }
                Err(ProcessError::NoChildren) => {
                    info!("{}: no more children to wait()", base);
                    break;
                }
                Err(e) => eprintln!("{}: wait() failed with {} ... huh???", base, e),
            }
        }
    }

    fn narrate(base: &str, reaped: &Reaped) {
        for (level, line) in reap_report_lines(base, reaped) {
            log!(level, "{}", line);
        }
    }
}

/// Lines reported for one reaped child. Exit and signal are checked
/// independently, so a status carrying both yields both lines.
fn reap_report_lines(base: &str, reaped: &Reaped) -> Vec<(Level, String)> {
    let mut lines = Vec::new();
    if let Some(code) = reaped.exit_code {
        lines.push((
            Level::Info,
            format!("{}: reaped {} which exited with {}", base, reaped.pid, code),
        ));
    }
    if let Some(signal) = reaped.signal {
        lines.push((
            Level::Warn,
            format!(
                "{}: reaped {} terminated by a signal {} ({})",
                base,
                reaped.pid,
                signal as i32,
                signal.as_str()
            ),
        ));
    }
    if lines.is_empty() {
        lines.push((
            Level::Debug,
            format!("{}: reaped {} without an exit or a signal", base, reaped.pid),
        ));
    }
    lines
}
