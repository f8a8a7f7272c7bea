//! The scheduling policies.
//!
//! Every policy keeps its ready queues inside the
//! [`ProcessTable`](crate::ProcessTable) of the run and refers to processes
//! by [`Slot`](crate::Slot) only.

use std::num::NonZeroU64;

use crate::{Fault, ProcessTable, Slot};

mod fcfs;
pub use fcfs::Fcfs;

mod sjf;
pub use sjf::Sjf;

mod srtf;
pub use srtf::Srtf;

mod round_robin;
pub use round_robin::RoundRobin;

mod mlfq;
pub use mlfq::Mlfq;

/// The time the process in `slot` may run, capped by `quantum` if any.
fn timeslice(
    table: &ProcessTable,
    slot: Slot,
    quantum: Option<NonZeroU64>,
) -> Result<NonZeroU64, Fault> {
    let process = table.process(slot);
    let remaining = NonZeroU64::new(process.remaining()).ok_or(Fault::NotReady {
        pid: process.pid(),
        now: table.now(),
        state: process.state(),
    })?;
    Ok(quantum.map_or(remaining, |quantum| quantum.min(remaining)))
}
