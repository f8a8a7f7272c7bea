use std::num::NonZeroU64;

use crate::SchedulingDecision::{Idle, Run};
use crate::{Fault, ProcessTable, QueueId, Scheduler, SchedulingDecision, Slot, StopReason};

/// Shortest remaining time first.
///
/// The preemptive version of [`Sjf`](crate::schedulers::Sjf). The CPU is
/// handed out one tick at a time to the ready process with the least
/// remaining work (ties: earlier arrival, then lower PID). The process that
/// ran the previous tick competes again with everyone else; consecutive
/// ticks of the same process are reported as one interval.
#[derive(Debug, Default)]
pub struct Srtf {
    ready: QueueId,
}

impl Srtf {
    pub fn new() -> Self {
        Srtf::default()
    }

    fn enqueue(&self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault> {
        let remaining = table.process(slot).remaining();
        table.queue_push_ranked(self.ready, slot, remaining)
    }
}

impl Scheduler for Srtf {
    fn name(&self) -> &'static str {
        "SRTF"
    }

    fn init(&mut self, table: &mut ProcessTable) {
        self.ready = table.create_queue_ranked();
    }

    fn admit(&mut self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault> {
        self.enqueue(table, slot)
    }

    fn next(&mut self, table: &mut ProcessTable) -> Result<SchedulingDecision, Fault> {
        match table.queue_pop(self.ready)? {
            Some(slot) => Ok(Run {
                slot,
                timeslice: NonZeroU64::MIN,
                level: 0,
            }),
            None => Ok(Idle),
        }
    }

    fn stop(
        &mut self,
        table: &mut ProcessTable,
        slot: Slot,
        reason: StopReason,
    ) -> Result<(), Fault> {
        match reason {
            StopReason::Exited => Ok(()),
            StopReason::Expired => self.enqueue(table, slot),
        }
    }

    fn coalesces(&self) -> bool {
        true
    }
}
