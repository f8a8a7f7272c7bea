use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt::{self, Display};

use keyed_priority_queue::KeyedPriorityQueue;
use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};

use crate::error::{Fault, InvalidInput};
use crate::process::{Process, ProcessSpec};
use crate::{Pid, ProcessState, StopReason, Ticks};

/// Index of a process inside its [`ProcessTable`].
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug, Ord, PartialOrd)]
pub struct Slot(usize);

impl Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

new_key_type! {
    /// Handle of a ready queue created inside a [`ProcessTable`].
    pub struct QueueId;
}

/// Position of a process in a ranked queue. The smallest rank is served
/// first; ties on `key` go to the earlier arrival, then to the lower PID.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Rank {
    pub key: Ticks,
    pub arrival: Ticks,
    pub pid: Pid,
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop Rank's Ord
impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.key, other.arrival, other.pid).cmp(&(self.key, self.arrival, self.pid))
    }
}

/// A ready queue.
#[derive(Debug)]
pub enum RunQueue {
    Fifo { slots: VecDeque<Slot> },
    Ranked { slots: KeyedPriorityQueue<Slot, Rank> },
}

impl RunQueue {
    fn new_fifo() -> Self {
        Self::Fifo {
            slots: VecDeque::new(),
        }
    }

    fn new_ranked() -> Self {
        Self::Ranked {
            slots: KeyedPriorityQueue::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { slots } => slots.len(),
            Self::Ranked { slots } => slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The queued slots, in the order they would be served.
    pub fn slots(&self) -> Vec<Slot> {
        match self {
            Self::Fifo { slots } => slots.iter().copied().collect(),
            Self::Ranked { slots } => {
                let mut ranked: Vec<(Slot, Rank)> =
                    slots.iter().map(|(slot, rank)| (*slot, *rank)).collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1));
                ranked.into_iter().map(|(slot, _)| slot).collect()
            }
        }
    }

    // Returns false when a ranked queue gets no rank
    fn push(&mut self, slot: Slot, rank: Option<Rank>) -> bool {
        match self {
            Self::Fifo { slots } => slots.push_back(slot),
            Self::Ranked { slots } => match rank {
                Some(rank) => {
                    slots.push(slot, rank);
                }
                None => return false,
            },
        }
        true
    }

    fn pop(&mut self) -> Option<Slot> {
        match self {
            Self::Fifo { slots } => slots.pop_front(),
            Self::Ranked { slots } => slots.pop().map(|(slot, _)| slot),
        }
    }
}

/// The processes of one simulation run together with the ready queues of
/// the policy that runs them.
///
/// A fresh table is built for every run from the caller's process list, so
/// two runs never share any state. Queues hold [`Slot`]s, never processes,
/// and the table remembers which queue every slot sits in: a slot can be in
/// at most one queue, and only while it is [`ProcessState::Ready`].
#[derive(Debug)]
pub struct ProcessTable {
    now: Ticks,
    processes: Vec<Process>,
    queues: SlotMap<QueueId, RunQueue>,
    slot_to_queue: FxHashMap<Slot, QueueId>,

    // Slots sorted by (arrival, pid)
    arrivals: Vec<Slot>,
    // First entry of `arrivals` that has not been admitted
    arrival_cursor: usize,
}

impl ProcessTable {
    /// Validates `specs` and builds a table holding a copy of them, all
    /// processes [`ProcessState::Pending`] and the clock at 0.
    pub fn new(specs: &[ProcessSpec]) -> Result<Self, InvalidInput> {
        if specs.is_empty() {
            return Err(InvalidInput::NoProcesses);
        }

        let mut pids = FxHashSet::default();
        for spec in specs {
            if !pids.insert(spec.pid) {
                return Err(InvalidInput::DuplicatePid(spec.pid));
            }
            if spec.burst == 0 {
                return Err(InvalidInput::ZeroBurst(spec.pid));
            }
        }

        // The clock never passes the last arrival plus all the work.
        let last_arrival = specs.iter().map(|spec| spec.arrival).max().unwrap_or(0);
        specs
            .iter()
            .try_fold(last_arrival, |end, spec| end.checked_add(spec.burst))
            .ok_or(InvalidInput::TimeOverflow)?;

        let processes: Vec<Process> = specs.iter().map(|spec| Process::new(*spec)).collect();
        let mut arrivals: Vec<Slot> = (0..processes.len()).map(Slot).collect();
        arrivals.sort_by_key(|slot| {
            let process = &processes[slot.0];
            (process.arrival(), process.pid())
        });

        Ok(Self {
            now: 0,
            processes,
            queues: SlotMap::with_key(),
            slot_to_queue: FxHashMap::default(),
            arrivals,
            arrival_cursor: 0,
        })
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn advance_to(&mut self, time: Ticks) {
        debug_assert!(time >= self.now, "Time cannot go back from {} to {}", self.now, time);
        self.now = time;
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn process(&self, slot: Slot) -> &Process {
        &self.processes[slot.0]
    }

    fn process_mut(&mut self, slot: Slot) -> &mut Process {
        &mut self.processes[slot.0]
    }

    pub fn into_processes(self) -> Vec<Process> {
        self.processes
    }

    pub fn all_finished(&self) -> bool {
        self.processes.iter().all(Process::is_finished)
    }

    /// Arrival time of the first process that has not been admitted yet.
    pub fn next_arrival(&self) -> Option<Ticks> {
        self.arrivals
            .get(self.arrival_cursor)
            .map(|slot| self.process(*slot).arrival())
    }

    /// Marks every process that has arrived by now as ready and returns
    /// them in `(arrival, pid)` order. Each process is returned once.
    pub fn take_arrivals(&mut self) -> Vec<Slot> {
        let mut arrived = Vec::new();
        while let Some(&slot) = self.arrivals.get(self.arrival_cursor) {
            if self.process(slot).arrival() > self.now {
                break;
            }
            self.process_mut(slot).set_state(ProcessState::Ready);
            self.arrival_cursor += 1;
            arrived.push(slot);
        }
        arrived
    }

    pub fn pids_in(&self, state: ProcessState) -> Vec<Pid> {
        self.processes
            .iter()
            .filter(|process| process.state() == state)
            .map(Process::pid)
            .collect()
    }

    pub fn create_queue_fifo(&mut self) -> QueueId {
        self.queues.insert(RunQueue::new_fifo())
    }

    pub fn create_queue_ranked(&mut self) -> QueueId {
        self.queues.insert(RunQueue::new_ranked())
    }

    pub fn queue(&self, id: QueueId) -> Option<&RunQueue> {
        self.queues.get(id)
    }

    /// The queue that currently holds `slot`.
    pub fn queue_of(&self, slot: Slot) -> Option<QueueId> {
        self.slot_to_queue.get(&slot).copied()
    }

    /// PIDs in the queue, in service order.
    pub fn queue_pids(&self, id: QueueId) -> Vec<Pid> {
        self.queues
            .get(id)
            .map(|queue| {
                queue
                    .slots()
                    .into_iter()
                    .map(|slot| self.process(slot).pid())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Appends `slot` to a FIFO queue.
    pub fn queue_push(&mut self, id: QueueId, slot: Slot) -> Result<(), Fault> {
        self.push(id, slot, None)
    }

    /// Inserts `slot` into a ranked queue, ordered by `key`.
    pub fn queue_push_ranked(&mut self, id: QueueId, slot: Slot, key: Ticks) -> Result<(), Fault> {
        let process = self.process(slot);
        let rank = Rank {
            key,
            arrival: process.arrival(),
            pid: process.pid(),
        };
        self.push(id, slot, Some(rank))
    }

    fn push(&mut self, id: QueueId, slot: Slot, rank: Option<Rank>) -> Result<(), Fault> {
        let now = self.now;
        let pid = self.process(slot).pid();

        if !self.queues.contains_key(id) {
            return Err(Fault::UnknownQueue { now });
        }
        if let Some(holder) = self.queue_of(slot) {
            return Err(Fault::AlreadyQueued {
                pid,
                now,
                target: self.queue_pids(id),
                holder: self.queue_pids(holder),
            });
        }
        let state = self.process(slot).state();
        if state != ProcessState::Ready {
            return Err(Fault::NotReady { pid, now, state });
        }

        let queue = self
            .queues
            .get_mut(id)
            .ok_or(Fault::UnknownQueue { now })?;
        if !queue.push(slot, rank) {
            return Err(Fault::Unranked { pid, now });
        }
        self.slot_to_queue.insert(slot, id);
        trace!("t={now} queued {pid}");
        Ok(())
    }

    /// Removes the head of the queue.
    pub fn queue_pop(&mut self, id: QueueId) -> Result<Option<Slot>, Fault> {
        let now = self.now;
        let queue = self
            .queues
            .get_mut(id)
            .ok_or(Fault::UnknownQueue { now })?;
        let Some(slot) = queue.pop() else {
            return Ok(None);
        };

        let removed = self.slot_to_queue.remove(&slot);
        debug_assert!(removed.is_some(), "Slot {slot} missing queue membership");
        trace!("t={now} dequeued {}", self.process(slot).pid());
        Ok(Some(slot))
    }

    /// Puts the process in `slot` on the CPU. The first dispatch of a
    /// process records its start time.
    pub fn dispatch(&mut self, slot: Slot) -> Result<(), Fault> {
        let now = self.now;
        let pid = self.process(slot).pid();

        if let Some(queue) = self.queue_of(slot) {
            return Err(Fault::StillQueued {
                pid,
                now,
                queue: self.queue_pids(queue),
            });
        }
        let state = self.process(slot).state();
        if state != ProcessState::Ready {
            return Err(Fault::NotReady { pid, now, state });
        }

        let process = self.process_mut(slot);
        process.set_state(ProcessState::Running);
        process.mark_started(now);
        Ok(())
    }

    /// Runs the dispatched process for `timeslice` and advances the clock.
    pub fn execute(&mut self, slot: Slot, timeslice: Ticks) -> Result<(), Fault> {
        let now = self.now;
        let process = self.process(slot);
        let pid = process.pid();

        if process.state() != ProcessState::Running {
            return Err(Fault::NotReady {
                pid,
                now,
                state: process.state(),
            });
        }
        if timeslice > process.remaining() {
            return Err(Fault::Overrun {
                pid,
                now,
                timeslice,
                remaining: process.remaining(),
            });
        }

        self.process_mut(slot).consume(timeslice);
        self.now += timeslice;
        Ok(())
    }

    /// Takes the running process off the CPU. It finishes if it has no work
    /// left, otherwise it is ready again.
    pub fn release(&mut self, slot: Slot) -> StopReason {
        let now = self.now;
        let process = self.process_mut(slot);
        if process.remaining() == 0 {
            process.mark_completed(now);
            StopReason::Exited
        } else {
            process.set_state(ProcessState::Ready);
            StopReason::Expired
        }
    }
}
