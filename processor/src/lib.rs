//! A processor simulation library
//!
//! This is used for running the policies from the [`scheduler`] crate over
//! a list of processes. A run produces the Gantt trace of the CPU, the
//! finished processes with their timings, and the averaged [`Metrics`].

use std::error::Error;
use std::fmt::{self, Display};

use log::{debug, error, info};
use serde::Serialize;

use scheduler::{
    Fault, InvalidInput, Pid, Policy, Process, ProcessSpec, ProcessState, ProcessTable,
    Scheduler, SchedulingDecision, Slot, StopReason, Ticks,
};

mod metrics;

pub use metrics::Metrics;

/// A maximal span of time during which one process occupies the CPU.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub pid: Pid,
    /// Inclusive.
    pub start: Ticks,
    /// Exclusive.
    pub end: Ticks,
    /// The queue level the process ran from, 0 unless the policy has
    /// several levels.
    pub level: usize,
}

impl Interval {
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

/// What the CPU did during one entry of the trace.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Activity {
    Run(Interval),
    Idle { start: Ticks, end: Ticks },
}

impl Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Run(interval) => write!(
                f,
                "Run {} from {} to {} (level {})",
                interval.pid, interval.start, interval.end, interval.level
            ),
            Activity::Idle { start, end } => write!(f, "Idle from {} to {}", start, end),
        }
    }
}

/// Running iteration log
#[derive(Debug, PartialEq)]
pub struct Log {
    /// What the CPU did.
    pub activity: Activity,

    /// Why the process left the CPU at the end of the activity.
    pub stop_reason: Option<StopReason>,
}

impl Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.activity)?;
        if let Some(reason) = self.stop_reason {
            writeln!(f, "{}", reason)?;
        }
        Ok(())
    }
}

/// The outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    /// Name of the policy that produced the run.
    pub policy: String,

    /// The Gantt trace, ordered by start time.
    pub intervals: Vec<Interval>,

    /// The finished processes, ordered by PID.
    pub processes: Vec<Process>,

    pub metrics: Metrics,
}

impl Simulation {
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.processes
            .binary_search_by_key(&pid, Process::pid)
            .ok()
            .map(|index| &self.processes[index])
    }

    /// Time at which the last process finished.
    pub fn makespan(&self) -> Ticks {
        self.intervals.last().map_or(0, |interval| interval.end)
    }

    /// The trace as a list of log entries, with the idle gaps between
    /// intervals made explicit.
    pub fn logs(&self) -> Vec<Log> {
        let mut logs = Vec::with_capacity(self.intervals.len());
        let mut clock = 0;
        for interval in &self.intervals {
            if interval.start > clock {
                logs.push(Log {
                    activity: Activity::Idle {
                        start: clock,
                        end: interval.start,
                    },
                    stop_reason: None,
                });
            }
            let finished = self
                .process(interval.pid)
                .and_then(Process::completion)
                .is_some_and(|completion| completion == interval.end);
            logs.push(Log {
                activity: Activity::Run(*interval),
                stop_reason: Some(if finished {
                    StopReason::Exited
                } else {
                    StopReason::Expired
                }),
            });
            clock = interval.end;
        }
        logs
    }
}

fn ticks(value: Option<Ticks>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

impl Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (iteration, log) in self.logs().iter().enumerate() {
            write!(f, "===== Iteration: {} =====\n{}\n", iteration + 1, log)?;
        }
        writeln!(f, "===== Summary: {} =====", self.policy)?;
        writeln!(f, "PID\tARRIVAL\tBURST\tSTART\tFINISH\tTAT\tWAIT\tRESP")?;
        for process in &self.processes {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                process.pid(),
                process.arrival(),
                process.burst(),
                ticks(process.start()),
                ticks(process.completion()),
                ticks(process.turnaround()),
                ticks(process.waiting()),
                ticks(process.response())
            )?;
        }
        writeln!(f, "Total time {}", self.makespan())?;
        write!(f, "{}", self.metrics)
    }
}

/// The reasons a simulation does not produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The input was rejected before the simulation started.
    InvalidInput(InvalidInput),

    /// The scheduler broke an invariant and the run was aborted.
    Fault(Fault),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidInput(err) => write!(f, "invalid input: {}", err),
            SimulationError::Fault(fault) => write!(f, "scheduler fault: {}", fault),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationError::InvalidInput(err) => Some(err),
            SimulationError::Fault(fault) => Some(fault),
        }
    }
}

impl From<InvalidInput> for SimulationError {
    fn from(err: InvalidInput) -> Self {
        SimulationError::InvalidInput(err)
    }
}

impl From<Fault> for SimulationError {
    fn from(fault: Fault) -> Self {
        SimulationError::Fault(fault)
    }
}

/// The processor simulator.
pub struct Processor<S: Scheduler> {
    scheduler: S,
    table: ProcessTable,
    intervals: Vec<Interval>,
}

impl<S: Scheduler> Processor<S> {
    /// Runs a simulation.
    ///
    /// * `scheduler` - the scheduler to use for the simulation.
    /// * `processes` - the processes to run. The processor works on its own
    ///                 copy, so the same list can be run again under any
    ///                 other scheduler.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use processor::Processor;
    /// use scheduler::ProcessSpec;
    /// use std::num::NonZeroU64;
    ///
    /// let processes = [
    ///     ProcessSpec::new(1, 0, 5),
    ///     ProcessSpec::new(2, 2, 3),
    ///     ProcessSpec::new(3, 4, 1),
    /// ];
    /// let quantum = NonZeroU64::new(2).unwrap();
    /// let simulation = Processor::run(scheduler::round_robin(quantum), &processes).unwrap();
    /// assert_eq!(simulation.makespan(), 9);
    /// ```
    pub fn run(scheduler: S, processes: &[ProcessSpec]) -> Result<Simulation, SimulationError> {
        let table = ProcessTable::new(processes)?;
        let mut processor = Processor {
            scheduler,
            table,
            intervals: vec![],
        };

        let name = processor.scheduler.name();
        info!("{}: simulating {} processes", name, processor.table.len());
        processor.scheduler.init(&mut processor.table);
        if let Err(fault) = processor.simulate() {
            error!("{}: aborted, {}", name, fault);
            return Err(fault.into());
        }
        processor.finish()
    }

    fn simulate(&mut self) -> Result<(), Fault> {
        self.admit_arrivals()?;
        while !self.table.all_finished() {
            match self.scheduler.next(&mut self.table)? {
                SchedulingDecision::Run {
                    slot,
                    timeslice,
                    level,
                } => self.execute(slot, timeslice.get(), level)?,
                SchedulingDecision::Idle => self.idle()?,
            }
        }
        Ok(())
    }

    fn admit_arrivals(&mut self) -> Result<(), Fault> {
        for slot in self.table.take_arrivals() {
            debug!(
                "t={} process {} arrived",
                self.table.now(),
                self.table.process(slot).pid()
            );
            self.scheduler.admit(&mut self.table, slot)?;
        }
        Ok(())
    }

    fn execute(&mut self, slot: Slot, timeslice: Ticks, level: usize) -> Result<(), Fault> {
        let start = self.table.now();
        self.table.dispatch(slot)?;
        self.table.execute(slot, timeslice)?;

        let pid = self.table.process(slot).pid();
        let end = self.table.now();
        debug!("t={} run {} until {} from level {}", start, pid, end, level);
        self.record(Interval {
            pid,
            start,
            end,
            level,
        });

        // Everything that arrived during the run is queued before the
        // process that ran is handed back to the scheduler.
        self.admit_arrivals()?;
        let reason = self.table.release(slot);
        debug!("t={} process {} stopped: {}", end, pid, reason);
        self.scheduler.stop(&mut self.table, slot, reason)
    }

    fn record(&mut self, interval: Interval) {
        if self.scheduler.coalesces() {
            if let Some(last) = self.intervals.last_mut() {
                if last.pid == interval.pid
                    && last.end == interval.start
                    && last.level == interval.level
                {
                    last.end = interval.end;
                    return;
                }
            }
        }
        self.intervals.push(interval);
    }

    fn idle(&mut self) -> Result<(), Fault> {
        let now = self.table.now();
        let ready = self.table.pids_in(ProcessState::Ready);
        // An unfinished process that is not ready is still pending, so
        // there is always a next arrival when nothing is ready.
        let (true, Some(arrival)) = (ready.is_empty(), self.table.next_arrival()) else {
            return Err(Fault::IdleWhileReady { now, ready });
        };
        debug!("t={} idle until {}", now, arrival);
        self.table.advance_to(arrival);
        self.admit_arrivals()
    }

    fn finish(self) -> Result<Simulation, SimulationError> {
        let policy = self.scheduler.name().to_string();
        let mut processes = self.table.into_processes();
        processes.sort_by_key(Process::pid);
        let metrics = Metrics::from_processes(&processes)?;

        info!(
            "{}: done at t={}, average waiting {:.2}",
            policy,
            self.intervals.last().map_or(0, |interval| interval.end),
            metrics.waiting
        );
        Ok(Simulation {
            policy,
            intervals: self.intervals,
            processes,
            metrics,
        })
    }
}

/// Runs `policy` over its own copy of `processes`.
pub fn simulate(policy: &Policy, processes: &[ProcessSpec]) -> Result<Simulation, SimulationError> {
    Processor::run(policy.scheduler(), processes)
}

/// Format a [`Simulation`] to a [`String`]: one entry per interval or idle
/// gap, followed by the per-process timings and the averages.
///
/// ## Example
///
/// ```rust
/// use processor::{format_logs, simulate};
/// use scheduler::{Policy, ProcessSpec};
///
/// let simulation = simulate(&Policy::Fcfs, &[ProcessSpec::new(1, 0, 5)]).unwrap();
///
/// println!("{}", format_logs(&simulation));
/// ```
pub fn format_logs(simulation: &Simulation) -> String {
    simulation.to_string()
}
