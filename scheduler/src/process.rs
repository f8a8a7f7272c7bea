use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::{Pid, ProcessState, Ticks};

/// The immutable description of a job: who it is, when it shows up and
/// how much CPU time it needs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessSpec {
    pub pid: Pid,
    pub arrival: Ticks,
    pub burst: Ticks,
}

impl ProcessSpec {
    pub fn new(pid: usize, arrival: Ticks, burst: Ticks) -> ProcessSpec {
        ProcessSpec {
            pid: Pid::new(pid),
            arrival,
            burst,
        }
    }
}

/// The Process Control Block of a simulated job.
///
/// `start` and `completion` are set exactly once, by the
/// [`ProcessTable`](crate::ProcessTable) that owns the process. The
/// waiting, turnaround and response times are derived from them and are
/// only known once the process has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pid: Pid,
    arrival: Ticks,
    burst: Ticks,
    remaining: Ticks,
    start: Option<Ticks>,
    completion: Option<Ticks>,
    state: ProcessState,
}

impl Process {
    pub(crate) fn new(spec: ProcessSpec) -> Process {
        Process {
            pid: spec.pid,
            arrival: spec.arrival,
            burst: spec.burst,
            remaining: spec.burst,
            start: None,
            completion: None,
            state: ProcessState::Pending,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival(&self) -> Ticks {
        self.arrival
    }

    pub fn burst(&self) -> Ticks {
        self.burst
    }

    /// CPU time the process is still owed.
    pub fn remaining(&self) -> Ticks {
        self.remaining
    }

    /// Time of the first CPU occupancy.
    pub fn start(&self) -> Option<Ticks> {
        self.start
    }

    /// Time at which the remaining work reached 0.
    pub fn completion(&self) -> Option<Ticks> {
        self.completion
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == ProcessState::Finished
    }

    /// `completion - arrival`
    pub fn turnaround(&self) -> Option<Ticks> {
        self.completion.map(|completion| completion - self.arrival)
    }

    /// `turnaround - burst`, the time spent ready but not running.
    pub fn waiting(&self) -> Option<Ticks> {
        self.turnaround().map(|turnaround| turnaround - self.burst)
    }

    /// `start - arrival`
    pub fn response(&self) -> Option<Ticks> {
        self.start.map(|start| start - self.arrival)
    }

    pub(crate) fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    pub(crate) fn mark_started(&mut self, now: Ticks) {
        if self.start.is_none() {
            self.start = Some(now);
        }
    }

    pub(crate) fn consume(&mut self, amount: Ticks) {
        self.remaining -= amount;
    }

    pub(crate) fn mark_completed(&mut self, now: Ticks) {
        debug_assert!(self.completion.is_none(), "Process {} completed twice", self.pid);
        self.completion = Some(now);
        self.state = ProcessState::Finished;
    }
}

impl Serialize for Process {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut process = serializer.serialize_struct("Process", 9)?;
        process.serialize_field("pid", &self.pid)?;
        process.serialize_field("arrival", &self.arrival)?;
        process.serialize_field("burst", &self.burst)?;
        process.serialize_field("start", &self.start)?;
        process.serialize_field("completion", &self.completion)?;
        process.serialize_field("waiting", &self.waiting())?;
        process.serialize_field("turnaround", &self.turnaround())?;
        process.serialize_field("response", &self.response())?;
        process.serialize_field("state", &self.state)?;
        process.end()
    }
}
