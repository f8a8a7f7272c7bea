use crate::schedulers::timeslice;
use crate::SchedulingDecision::{Idle, Run};
use crate::{Fault, ProcessTable, QueueId, Scheduler, SchedulingDecision, Slot, StopReason};

/// First come, first served.
///
/// Processes run to completion in the order they arrived. Processes that
/// arrive at the same time run in PID order.
#[derive(Debug, Default)]
pub struct Fcfs {
    ready: QueueId,
}

impl Fcfs {
    pub fn new() -> Self {
        Fcfs::default()
    }
}

impl Scheduler for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn init(&mut self, table: &mut ProcessTable) {
        self.ready = table.create_queue_fifo();
    }

    fn admit(&mut self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault> {
        table.queue_push(self.ready, slot)
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
            StopReason::Expired => table.queue_push(self.ready, slot),
        }
    }
}
