use std::error::Error;
use std::fmt::{self, Display};

use crate::{Pid, ProcessState, Ticks};

/// Input that is rejected before any simulated time passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// The process list is empty.
    NoProcesses,

    /// Two processes share the same PID.
    DuplicatePid(Pid),

    /// A process asks for no CPU time at all.
    ZeroBurst(Pid),

    /// The Round Robin quantum is 0.
    ZeroQuantum,

    /// The MLFQ has no queue levels.
    NoQueueLevels,

    /// The quantum of an MLFQ level is 0.
    ZeroLevelQuantum(
        /// The level index.
        usize,
    ),

    /// Averages were requested over a process that has not finished.
    Unfinished(Pid),

    /// The last arrival plus the total work does not fit in [`Ticks`].
    TimeOverflow,
}

impl Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidInput::NoProcesses => write!(f, "no processes to schedule"),
            InvalidInput::DuplicatePid(pid) => write!(f, "PID {} is used more than once", pid),
            InvalidInput::ZeroBurst(pid) => write!(f, "process {} has a burst of 0", pid),
            InvalidInput::ZeroQuantum => write!(f, "the quantum must be positive"),
            InvalidInput::NoQueueLevels => write!(f, "at least one queue level is required"),
            InvalidInput::ZeroLevelQuantum(level) => {
                write!(f, "the quantum of level {} must be positive", level)
            }
            InvalidInput::Unfinished(pid) => write!(f, "process {} has not finished", pid),
            InvalidInput::TimeOverflow => write!(f, "the schedule does not fit in the clock"),
        }
    }
}

impl Error for InvalidInput {}

/// An internal invariant of the simulation was broken.
///
/// This never happens with the policies of this crate; it means a
/// [`Scheduler`](crate::Scheduler) implementation is defective. The run is
/// aborted and the fault carries what is needed to find the defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// A process was pushed to a queue while it already sits in one.
    AlreadyQueued {
        pid: Pid,
        now: Ticks,
        /// Contents of the queue the process was pushed to.
        target: Vec<Pid>,
        /// Contents of the queue that already holds the process.
        holder: Vec<Pid>,
    },

    /// A process was queued or dispatched in the wrong state.
    NotReady {
        pid: Pid,
        now: Ticks,
        state: ProcessState,
    },

    /// A process was dispatched while still sitting in a queue.
    StillQueued {
        pid: Pid,
        now: Ticks,
        queue: Vec<Pid>,
    },

    /// A process was given more time than it has work left.
    Overrun {
        pid: Pid,
        now: Ticks,
        timeslice: Ticks,
        remaining: Ticks,
    },

    /// The scheduler left the CPU idle while processes were ready.
    IdleWhileReady { now: Ticks, ready: Vec<Pid> },

    /// The scheduler was told about a process it never admitted.
    Untracked { pid: Pid, now: Ticks },

    /// The scheduler used a queue that does not exist in this run.
    UnknownQueue { now: Ticks },

    /// A process was pushed to a ranked queue without a rank.
    Unranked { pid: Pid, now: Ticks },
}

impl Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::AlreadyQueued {
                pid,
                now,
                target,
                holder,
            } => write!(
                f,
                "t={now}: process {pid} pushed to {target:?} while queued in {holder:?}"
            ),
            Fault::NotReady { pid, now, state } => {
                write!(f, "t={now}: process {pid} is {state}, expected READY")
            }
            Fault::StillQueued { pid, now, queue } => {
                write!(f, "t={now}: process {pid} dispatched while queued in {queue:?}")
            }
            Fault::Overrun {
                pid,
                now,
                timeslice,
                remaining,
            } => write!(
                f,
                "t={now}: process {pid} given {timeslice} slices with {remaining} remaining"
            ),
            Fault::IdleWhileReady { now, ready } => {
                write!(f, "t={now}: CPU idle while {ready:?} are ready")
            }
            Fault::Untracked { pid, now } => {
                write!(f, "t={now}: process {pid} was never admitted")
            }
            Fault::UnknownQueue { now } => write!(f, "t={now}: unknown queue"),
            Fault::Unranked { pid, now } => {
                write!(f, "t={now}: process {pid} pushed to a ranked queue without a rank")
            }
        }
    }
}

impl Error for Fault {}
