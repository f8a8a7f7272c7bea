use std::fmt::{self, Display};
use std::num::NonZeroU64;

use crate::error::InvalidInput;
use crate::{Scheduler, Ticks};

/// The per-level quanta of a multi-level feedback queue.
///
/// Level 0 is the highest priority. There is always at least one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quanta(Vec<NonZeroU64>);

impl Quanta {
    pub fn new(quanta: &[Ticks]) -> Result<Quanta, InvalidInput> {
        if quanta.is_empty() {
            return Err(InvalidInput::NoQueueLevels);
        }
        quanta
            .iter()
            .enumerate()
            .map(|(level, &quantum)| {
                NonZeroU64::new(quantum).ok_or(InvalidInput::ZeroLevelQuantum(level))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Quanta)
    }

    pub fn levels(&self) -> usize {
        self.0.len()
    }

    /// The quantum of `level`. Levels past the last one use the last quantum.
    pub fn get(&self, level: usize) -> NonZeroU64 {
        let last = self.0.len() - 1;
        self.0[level.min(last)]
    }

    pub fn iter(&self) -> impl Iterator<Item = NonZeroU64> + '_ {
        self.0.iter().copied()
    }
}

impl Display for Quanta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (level, quantum) in self.0.iter().enumerate() {
            if level > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", quantum)?;
        }
        Ok(())
    }
}

/// A scheduling policy together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// First come, first served.
    Fcfs,

    /// Shortest job first, non-preemptive.
    Sjf,

    /// Shortest remaining time first, preemptive.
    Srtf,

    /// Round Robin.
    RoundRobin {
        /// The time a process can run before it is preempted.
        quantum: NonZeroU64,
    },

    /// Multi-level feedback queue.
    Mlfq {
        /// The time a process can run on each level before it is demoted.
        quanta: Quanta,
    },
}

impl Policy {
    pub fn round_robin(quantum: Ticks) -> Result<Policy, InvalidInput> {
        let quantum = NonZeroU64::new(quantum).ok_or(InvalidInput::ZeroQuantum)?;
        Ok(Policy::RoundRobin { quantum })
    }

    pub fn mlfq(quanta: &[Ticks]) -> Result<Policy, InvalidInput> {
        Ok(Policy::Mlfq {
            quanta: Quanta::new(quanta)?,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Sjf => "SJF",
            Policy::Srtf => "SRTF",
            Policy::RoundRobin { .. } => "RR",
            Policy::Mlfq { .. } => "MLFQ",
        }
    }

    /// Builds a fresh scheduler for one run of this policy.
    pub fn scheduler(&self) -> Box<dyn Scheduler> {
        match self {
            Policy::Fcfs => Box::new(crate::fcfs()),
            Policy::Sjf => Box::new(crate::sjf()),
            Policy::Srtf => Box::new(crate::srtf()),
            Policy::RoundRobin { quantum } => Box::new(crate::round_robin(*quantum)),
            Policy::Mlfq { quanta } => Box::new(crate::mlfq(quanta.clone())),
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::RoundRobin { quantum } => write!(f, "RR (quantum {})", quantum),
            Policy::Mlfq { quanta } => write!(f, "MLFQ (quanta {})", quanta),
            other => write!(f, "{}", other.name()),
        }
    }
}
