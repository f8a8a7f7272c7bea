use std::num::NonZeroU64;

use log::debug;

use crate::schedulers::timeslice;
use crate::SchedulingDecision::{Idle, Run};
use crate::{Fault, ProcessTable, QueueId, Scheduler, SchedulingDecision, Slot, StopReason};

/// Round Robin with a fixed quantum.
///
/// A single FIFO queue. The head runs for at most `quantum` time units and,
/// if it still has work, goes to the back of the queue behind every process
/// that arrived while it was running.
#[derive(Debug)]
pub struct RoundRobin {
    ready: QueueId,
    quantum: NonZeroU64,
}

impl RoundRobin {
    pub fn new(quantum: NonZeroU64) -> Self {
        RoundRobin {
            ready: QueueId::default(),
            quantum,
        }
    }
}

impl Scheduler for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
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
            timeslice: timeslice(table, slot, Some(self.quantum))?,
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
            StopReason::Expired => {
                debug!(
                    "t={} process {} back of the queue behind {:?}",
                    table.now(),
                    table.process(slot).pid(),
                    table.queue_pids(self.ready)
                );
                table.queue_push(self.ready, slot)
            }
        }
    }
}
