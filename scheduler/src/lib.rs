//! A CPU scheduling policy library.
//!
//! This library provides the process table, the [`Scheduler`] trait and
//! five classical policies: first come first served, shortest job first,
//! shortest remaining time first, Round Robin and a multi-level feedback
//! queue. The [`processor`](../processor/index.html) crate drives them.
//!

use std::num::NonZeroU64;

mod error;
mod policy;
mod process;
mod scheduler;
mod table;

pub mod schedulers;

use schedulers::{Fcfs, Mlfq, RoundRobin, Sjf, Srtf};

pub use crate::error::{Fault, InvalidInput};
pub use crate::policy::{Policy, Quanta};
pub use crate::process::{Process, ProcessSpec};
pub use crate::scheduler::{
    Pid, ProcessState, Scheduler, SchedulingDecision, StopReason, Ticks,
};
pub use crate::table::{ProcessTable, QueueId, Rank, RunQueue, Slot};

/// Returns a structure that implements the `Scheduler` trait with a first
/// come, first served policy.
pub fn fcfs() -> impl Scheduler {
    Fcfs::new()
}

/// Returns a structure that implements the `Scheduler` trait with a
/// non-preemptive shortest job first policy.
pub fn sjf() -> impl Scheduler {
    Sjf::new()
}

/// Returns a structure that implements the `Scheduler` trait with a
/// shortest remaining time first policy.
pub fn srtf() -> impl Scheduler {
    Srtf::new()
}

/// Returns a structure that implements the `Scheduler` trait with a round
/// robin policy
///
/// * `quantum` - the time quanta that a process can run before it is preempted
pub fn round_robin(quantum: NonZeroU64) -> impl Scheduler {
    RoundRobin::new(quantum)
}

/// Returns a structure that implements the `Scheduler` trait with a
/// multi-level feedback queue policy
///
/// * `quanta` - the time quanta of every level, from the highest priority
///              level to the lowest. A process that uses up its quanta is
///              moved one level down.
pub fn mlfq(quanta: Quanta) -> impl Scheduler {
    Mlfq::new(quanta)
}
