use log::debug;
use rustc_hash::FxHashMap;

use crate::schedulers::timeslice;
use crate::SchedulingDecision::{Idle, Run};
use crate::{
    Fault, ProcessTable, Quanta, QueueId, Scheduler, SchedulingDecision, Slot, StopReason,
};

/// Multi-level feedback queue.
///
/// One FIFO queue per level, level 0 being the highest priority. New
/// arrivals always enter level 0. The head of the first non-empty level runs
/// for at most the quantum of that level; if it still has work it is
/// demoted one level, and stays on the last level once it gets there.
#[derive(Debug)]
pub struct Mlfq {
    quanta: Quanta,
    levels: Vec<QueueId>,
    // Level of every admitted, unfinished process
    level_of: FxHashMap<Slot, usize>,
}

impl Mlfq {
    pub fn new(quanta: Quanta) -> Self {
        Mlfq {
            quanta,
            levels: Vec::new(),
            level_of: FxHashMap::default(),
        }
    }

    fn enqueue(&mut self, table: &mut ProcessTable, slot: Slot, level: usize) -> Result<(), Fault> {
        let queue = self
            .levels
            .get(level)
            .copied()
            .ok_or(Fault::UnknownQueue { now: table.now() })?;
        table.queue_push(queue, slot)?;
        self.level_of.insert(slot, level);
        Ok(())
    }
}

impl Scheduler for Mlfq {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn init(&mut self, table: &mut ProcessTable) {
        self.levels = (0..self.quanta.levels())
            .map(|_| table.create_queue_fifo())
            .collect();
        self.level_of.clear();
    }

    fn admit(&mut self, table: &mut ProcessTable, slot: Slot) -> Result<(), Fault> {
        self.enqueue(table, slot, 0)
    }

    fn next(&mut self, table: &mut ProcessTable) -> Result<SchedulingDecision, Fault> {
        for (level, &queue) in self.levels.iter().enumerate() {
            if let Some(slot) = table.queue_pop(queue)? {
                return Ok(Run {
                    slot,
                    timeslice: timeslice(table, slot, Some(self.quanta.get(level)))?,
                    level,
                });
            }
        }
        Ok(Idle)
    }

    fn stop(
        &mut self,
        table: &mut ProcessTable,
        slot: Slot,
        reason: StopReason,
    ) -> Result<(), Fault> {
        let level = self.level_of.remove(&slot).ok_or(Fault::Untracked {
            pid: table.process(slot).pid(),
            now: table.now(),
        })?;

        match reason {
            StopReason::Exited => Ok(()),
            StopReason::Expired => {
                let demoted = (level + 1).min(self.quanta.levels() - 1);
                debug!(
                    "t={} process {} from level {} to level {}",
                    table.now(),
                    table.process(slot).pid(),
                    level,
                    demoted
                );
                self.enqueue(table, slot, demoted)
            }
        }
    }
}
