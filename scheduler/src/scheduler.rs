use std::fmt::{self, Display};
use std::num::NonZeroU64;

use serde::Serialize;

use crate::error::Fault;
use crate::table::{ProcessTable, Slot};

/// Simulated time, in ticks.
pub type Ticks = u64;

/// The PID of a process
///
/// PIDs are chosen by whoever builds the process list and must be
/// unique within one simulation.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Ord, PartialOrd, Serialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Pid(usize);

impl Pid {
    pub fn new(pid: usize) -> Pid {
        Pid(pid)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl PartialEq<usize> for Pid {
    fn eq(&self, other: &usize) -> bool {
        self.0 == *other
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The action that the scheduler asks the processor to take.
///
/// This is returned by the [`Scheduler::next`] function.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SchedulingDecision {
    /// Run the process in `slot` for exactly `timeslice` time units.
    ///
    /// The timeslice must not exceed the work the process has left.
    Run {
        slot: Slot,
        timeslice: NonZeroU64,
        /// The queue level the process was taken from. Single queue
        /// policies always report level 0.
        level: usize,
    },

    /// No process is ready. The CPU stays idle until the next arrival.
    Idle,
}

impl Display for SchedulingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingDecision::Run {
                slot,
                timeslice,
                level,
            } => {
                write!(f, "Run {} for {} slices from level {}", slot, timeslice, level)
            }
            SchedulingDecision::Idle => {
                write!(f, "Idle until the next arrival")
            }
        }
    }
}

/// The reason that a process has stopped and the processor
/// has called the scheduler.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The timeslice allocated for the process has expired and the
    /// process still has work left.
    Expired,

    /// The process has no work left and will never be scheduled again.
    Exited,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Expired => write!(f, "Expired"),
            StopReason::Exited => write!(f, "Exited"),
        }
    }
}

/// The state of a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ProcessState {
    /// The arrival time of the process has not been reached yet.
    Pending,

    /// The process has arrived and waits to be scheduled.
    Ready,

    /// The process is currently scheduled.
    Running,

    /// The process has received all the CPU time it asked for.
    Finished,
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Pending => write!(f, "PENDING"),
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Finished => write!(f, "FINISHED"),
        }
    }
}

/// The trait that any scheduling policy has to implement.
///
/// A scheduler never touches the clock or the process timings. It only
/// keeps its ready queues (created inside the [`ProcessTable`] of the run)
/// and answers the processor's questions:
///
/// 1. [`Scheduler::admit`] for every process whose arrival time has been
///    reached, in `(arrival, pid)` order;
/// 2. [`Scheduler::next`] whenever the CPU is free;
/// 3. [`Scheduler::stop`] after the dispatched process has run. Processes
///    that arrived while it was running are admitted *before* this call.
pub trait Scheduler: Send {
    /// Short name of the policy.
    fn name(&self) -> &'static str;

    /// Creates the ready queues of the policy inside `table`.
    fn init(&mut self, table: &mut ProcessTable);

    /// The process in `slot` has arrived.
    fn admit(&mut self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault>;

    /// Returns the action that the processor has to perform next.
    fn next(&mut self, table: &mut ProcessTable) -> Result<SchedulingDecision, Fault>;

    /// The scheduler is informed about the stopping of the process it
    /// picked last and the reason.
    fn stop(&mut self, table: &mut ProcessTable, slot: Slot, reason: StopReason)
        -> Result<(), Fault>;

    /// Whether consecutive runs of the same process, with nothing in
    /// between, are reported as a single interval.
    fn coalesces(&self) -> bool {
        false
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn init(&mut self, table: &mut ProcessTable) {
        (**self).init(table)
    }

    fn admit(&mut self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault> {
        (**self).admit(table, slot)
    }

    fn next(&mut self, table: &mut ProcessTable) -> Result<SchedulingDecision, Fault> {
        (**self).next(table)
    }

    fn stop(
        &mut self,
        table: &mut ProcessTable,
        slot: Slot,
        reason: StopReason,
    ) -> Result<(), Fault> {
        (**self).stop(table, slot, reason)
    }

    fn coalesces(&self) -> bool {
        (**self).coalesces()
    }
}
