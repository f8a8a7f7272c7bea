use crate::schedulers::timeslice;
use crate::SchedulingDecision::{Idle, Run};
use crate::{Fault, ProcessTable, QueueId, Scheduler, SchedulingDecision, Slot, StopReason};

/// Shortest job first, without preemption.
///
/// Whenever the CPU is free, the ready process with the smallest burst
/// runs to completion. Ties go to the earlier arrival, then the lower PID.
#[derive(Debug, Default)]
pub struct Sjf {
    ready: QueueId,
}

impl Sjf {
    pub fn new() -> Self {
        Sjf::default()
    }

    fn enqueue(&self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault> {
        let burst = table.process(slot).burst();
        table.queue_push_ranked(self.ready, slot, burst)
    }
}

impl Scheduler for Sjf {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn init(&mut self, table: &mut ProcessTable) {
        self.ready = table.create_queue_ranked();
    }

    fn admit(&mut self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault> {
        self.enqueue(table, slot)
    }

    fn next(&mut self, table: &mut ProcessTable) -> Result<SchedulingDecision, Fault> {
        let Some(slot) = table.queue_pop(self.ready)? else {
            return Ok(Idle);
        };
        Ok(Run {
            slot,
            timeslice: timeslice(table, slot, None)?,
            level: 0,
        })
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
}
